//! Path parsing and resolution.
//!
//! # Invariants
//! - Both `\` and `/` separate segments; empty segments are skipped.
//! - A trailing separator asks for the children of the last node.
//! - Resolution is a pure function of (store contents, path).

use super::node::NavNode;
use super::NavResult;
use crate::repo::store::DomainStore;
use std::fmt::{Display, Formatter};

const SEPARATORS: [char; 2] = ['\\', '/'];

/// A parsed namespace path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavPath {
    segments: Vec<String>,
    lists_children: bool,
}

impl NavPath {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        Self {
            segments: trimmed
                .split(SEPARATORS)
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            lists_children: trimmed.ends_with(SEPARATORS),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether resolution yields the children of the last node.
    pub fn lists_children(&self) -> bool {
        self.lists_children
    }

    /// Same path, resolving to the children of its last node.
    pub fn children(mut self) -> Self {
        self.lists_children = true;
        self
    }

    /// Same path, resolving to its last node itself.
    pub fn node(mut self) -> Self {
        self.lists_children = false;
        self
    }

    /// Splits off the last segment. `None` for the root path.
    pub fn split_leaf(&self) -> Option<(NavPath, &str)> {
        let (leaf, parent) = self.segments.split_last()?;
        Some((
            NavPath {
                segments: parent.to_vec(),
                lists_children: false,
            },
            leaf.as_str(),
        ))
    }
}

impl Display for NavPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("\\"))?;
        if self.lists_children {
            f.write_str("\\")?;
        }
        Ok(())
    }
}

/// Walks `path` from the root node one segment at a time.
///
/// Returns an empty vector as soon as one segment does not resolve. The empty
/// path resolves to the root node itself.
pub fn resolve<S: DomainStore>(store: &S, path: &NavPath) -> NavResult<Vec<NavNode>> {
    let mut current = NavNode::Root;
    for segment in &path.segments {
        match current.resolve(store, Some(segment))?.pop() {
            Some(next) => current = next,
            None => return Ok(Vec::new()),
        }
    }

    if path.lists_children {
        return current.child_nodes(store);
    }
    Ok(vec![current])
}
