//! Deny-list pruning
//!
//! Removes every element whose tag is deny-listed, together with its whole
//! subtree, at any depth below the root.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{XmlDocument, XmlElement, XmlNode};

/// Tags stripped from `doc/equips.xml` when no other list is configured
pub const DEFAULT_DENY_LIST: [&str; 6] = [
    "itemSource",
    "cargoAssetRef",
    "StorePercent",
    "itemTypeString",
    "assetRef",
    "asset",
];

/// Ordered set of element names to remove. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DenyList {
    tags: Vec<String>,
}

impl DenyList {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        DenyList { tags: unique }
    }

    pub fn contains(&self, name: &[u8]) -> bool {
        self.tags.iter().any(|tag| tag.as_bytes() == name)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for DenyList {
    fn default() -> Self {
        DenyList::new(DEFAULT_DENY_LIST)
    }
}

impl From<Vec<String>> for DenyList {
    fn from(tags: Vec<String>) -> Self {
        DenyList::new(tags)
    }
}

impl From<DenyList> for Vec<String> {
    fn from(list: DenyList) -> Self {
        list.tags
    }
}

/// What a prune pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Subtree roots removed; descendants of a removed element are not counted
    pub removed: usize,
    pub by_tag: BTreeMap<String, usize>,
}

impl PruneReport {
    fn record(&mut self, element: &XmlElement) {
        self.removed += 1;
        *self
            .by_tag
            .entry(element.name_lossy().into_owned())
            .or_default() += 1;
    }
}

/// Prune below the document root. The root itself is never removed.
pub fn prune_document(document: &mut XmlDocument, deny: &DenyList) -> PruneReport {
    let mut report = PruneReport::default();
    prune_element(&mut document.root, deny, &mut report);
    report
}

pub fn prune_element(element: &mut XmlElement, deny: &DenyList, report: &mut PruneReport) {
    element.children.retain_mut(|child| match child {
        XmlNode::Element(el) if deny.contains(el.name()) => {
            report.record(el);
            false
        }
        XmlNode::Element(el) => {
            prune_element(el, deny, report);
            true
        }
        XmlNode::Other(_) => true,
    });
}
