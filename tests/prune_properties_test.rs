use cvdprune::document::{
    DEFAULT_DENY_LIST, DenyList, XmlElement, parse_document, prune_document, write_document,
};

const EQUIPS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- exported equipment table -->
<equips version="12">
  <item id="1">
    <name>Iron Sword</name>
    <itemSource>shop</itemSource>
    <stats atk="12" def="0">
      <asset>models/sword.mdl</asset>
      <slot>hand</slot>
    </stats>
    <StorePercent>40</StorePercent>
  </item>
  <item id="2">
    <name>Leather Cap</name>
    <cargoAssetRef>
      <asset>models/cap.mdl</asset>
      <slot>head</slot>
    </cargoAssetRef>
    <itemTypeString>helm</itemTypeString>
    <group>
      <set>
        <assetRef><asset/></assetRef>
        <bonus>1</bonus>
      </set>
    </group>
  </item>
  <itemSource/>
</equips>
"#;

fn prune(xml: &str) -> String {
    let mut doc = parse_document(xml.as_bytes()).unwrap();
    prune_document(&mut doc, &DenyList::default());
    String::from_utf8(write_document(&doc).unwrap()).unwrap()
}

fn names(element: &XmlElement) -> Vec<String> {
    element
        .descendants()
        .iter()
        .map(|e| e.name_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_no_deny_listed_element_survives_at_any_depth() {
        let pruned = parse_document(prune(EQUIPS).as_bytes()).unwrap();

        for tag in DEFAULT_DENY_LIST {
            assert_eq!(pruned.count_elements(tag), 0, "<{tag}> survived pruning");
        }
    }

    #[test]
    fn test_surviving_elements_keep_relative_order() {
        let original = parse_document(EQUIPS.as_bytes()).unwrap();
        let pruned = parse_document(prune(EQUIPS).as_bytes()).unwrap();

        assert_eq!(
            names(&pruned.root),
            [
                "item", "name", "stats", "slot", "item", "name", "group", "set", "bonus"
            ]
        );

        // Every survivor appears in the original in the same order
        let original_names = names(&original.root);
        let mut cursor = 0;
        for name in names(&pruned.root) {
            let offset = original_names[cursor..]
                .iter()
                .position(|candidate| *candidate == name)
                .unwrap_or_else(|| panic!("<{name}> out of order"));
            cursor += offset + 1;
        }
    }

    #[test]
    fn test_descendants_of_removed_elements_are_gone() {
        let pruned = parse_document(prune(EQUIPS).as_bytes()).unwrap();

        // <slot>head</slot> lived under <cargoAssetRef>; only the <stats> one remains
        assert_eq!(pruned.count_elements("slot"), 1);
        let text = pruned.root.text();
        assert!(text.contains("hand"));
        assert!(!text.contains("head"));
        assert!(!text.contains("models/"));
    }

    #[test]
    fn test_attributes_and_prolog_are_preserved() {
        let out = prune(EQUIPS);

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(out.contains("<!-- exported equipment table -->"));
        assert!(out.contains("<equips version=\"12\">"));
        assert!(out.contains("<stats atk=\"12\" def=\"0\">"));
    }

    #[test]
    fn test_pruning_twice_equals_pruning_once() {
        let once = prune(EQUIPS);
        let twice = prune(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_document_round_trips_unchanged() {
        let clean = r#"<?xml version="1.0"?>
<equips>
  <!-- nothing to strip -->
  <item id="3"><name>Bow &amp; Quiver</name><note><![CDATA[<range> 30]]></note></item>
  <?editor keep?>
  <empty/>
</equips>
"#;
        assert_eq!(prune(clean), clean);
    }

    #[test]
    fn test_empty_deny_list_changes_nothing() {
        let mut doc = parse_document(EQUIPS.as_bytes()).unwrap();
        let report = prune_document(&mut doc, &DenyList::new(Vec::<String>::new()));

        assert_eq!(report.removed, 0);
        assert_eq!(String::from_utf8(write_document(&doc).unwrap()).unwrap(), EQUIPS);
    }

    #[test]
    fn test_report_counts_subtree_roots() {
        let mut doc = parse_document(EQUIPS.as_bytes()).unwrap();
        let report = prune_document(&mut doc, &DenyList::default());

        assert_eq!(report.by_tag.get("itemSource"), Some(&2));
        assert_eq!(report.by_tag.get("asset"), Some(&1));
        assert_eq!(report.by_tag.get("cargoAssetRef"), Some(&1));
        assert_eq!(report.by_tag.get("assetRef"), Some(&1));
        assert_eq!(report.removed, 7);
    }
}
