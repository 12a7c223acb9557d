//! Translation data: nested key trees per language.
//!
//! The table is supplied by an external JSON file shaped like
//! `{"en": {"hero": {"title": "..."}}, "zh": {...}}` and is read-only once
//! loaded. Lookups descend one dotted segment at a time over the tagged tree;
//! a path only resolves when it ends on a non-empty leaf.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A dotted translation key (e.g., `hero.title`) split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: Vec<String>,
}

impl KeyPath {
    /// Split a dotted key. Empty segments are kept so that malformed keys
    /// like `a..b` simply fail to resolve.
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One node of a translation tree: either a display string or a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Leaf(String),
    Branch(TranslationTree),
}

/// Mapping from key segment to node, for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree(BTreeMap<String, TranslationNode>);

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf at a dotted path, creating intermediate branches.
    /// An existing leaf on the way is replaced by a branch.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        let key = KeyPath::parse(path);
        self.insert_segments(key.segments(), text.into());
    }

    fn insert_segments(&mut self, segments: &[String], text: String) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };

        if rest.is_empty() {
            self.0.insert(head.clone(), TranslationNode::Leaf(text));
            return;
        }

        let node = self
            .0
            .entry(head.clone())
            .or_insert_with(|| TranslationNode::Branch(TranslationTree::new()));
        if matches!(node, TranslationNode::Leaf(_)) {
            *node = TranslationNode::Branch(TranslationTree::new());
        }
        if let TranslationNode::Branch(sub) = node {
            sub.insert_segments(rest, text);
        }
    }

    /// Resolve a key path to its display string.
    ///
    /// Returns `None` when a segment is missing, when the path ends on a
    /// branch, when it tries to descend through a leaf, or when the leaf is
    /// empty.
    pub fn resolve(&self, path: &KeyPath) -> Option<&str> {
        self.descend(path.segments())
    }

    fn descend(&self, segments: &[String]) -> Option<&str> {
        let (head, rest) = segments.split_first()?;

        match (self.0.get(head)?, rest.is_empty()) {
            (TranslationNode::Leaf(text), true) if !text.is_empty() => Some(text),
            (TranslationNode::Branch(sub), false) => sub.descend(rest),
            _ => None,
        }
    }

    /// All leaves as `(dotted path, text)`, in key order.
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a str)>) {
        for (segment, node) in &self.0 {
            let path = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{}.{}", prefix, segment)
            };
            match node {
                TranslationNode::Leaf(text) => out.push((path, text.as_str())),
                TranslationNode::Branch(sub) => sub.collect_leaves(&path, out),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Translation trees keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(BTreeMap<String, TranslationTree>);

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse translation table JSON")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations from {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid translations file {}", path.display()))
    }

    /// Add (or replace) the tree for one language.
    pub fn with_language(mut self, code: &str, tree: TranslationTree) -> Self {
        self.0.insert(code.to_string(), tree);
        self
    }

    pub fn for_code(&self, code: &str) -> Option<&TranslationTree> {
        self.0.get(code)
    }

    pub fn resolve(&self, code: &str, path: &KeyPath) -> Option<&str> {
        self.for_code(code)?.resolve(path)
    }

    /// Language codes present in the table.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
