// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Noise removal on a detached copy of a candidate node

use ego_tree::{NodeId, Tree};
use scraper::{ElementRef, Node, Selector};
use tracing::warn;

/// A candidate container with its noise sub-elements removed.
///
/// Pruning works on a clone of the document tree so the parsed page stays
/// intact for the next selector or strategy.
pub struct PrunedNode {
    tree: Tree<Node>,
    root: NodeId,
}

impl PrunedNode {
    /// Copy `node`'s tree and detach every descendant matching `noise`.
    /// The candidate itself is never removed.
    pub fn new(node: ElementRef<'_>, noise: &[Selector]) -> Self {
        let mut tree = node.tree().clone();
        let root = node.id();

        let doomed: Vec<NodeId> = match tree.get(root).and_then(ElementRef::wrap) {
            Some(scope) => noise
                .iter()
                .flat_map(|selector| scope.select(selector).map(|el| el.id()))
                .collect(),
            None => Vec::new(),
        };

        for id in doomed {
            if let Some(mut node) = tree.get_mut(id) {
                node.detach();
            }
        }

        Self { tree, root }
    }

    pub fn element(&self) -> Option<ElementRef<'_>> {
        self.tree.get(self.root).and_then(ElementRef::wrap)
    }

    /// Every text node, trimmed, one per line
    pub fn text_lines(&self) -> String {
        self.element()
            .map(|el| {
                el.text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    /// Text of each element matching `tags`, one block per element
    pub fn text_of_tags(&self, tags: &Selector) -> String {
        let Some(el) = self.element() else {
            return String::new();
        };
        el.select(tags)
            .map(|block| collapse_inline(block.text()))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Join an element's text nodes into one space-separated run
pub(crate) fn collapse_inline<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compile CSS selectors, skipping (and logging) any that fail to parse
pub fn compile_selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|pattern| match Selector::parse(pattern) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Skipping invalid selector '{}': {:?}", pattern, e);
                None
            }
        })
        .collect()
}

pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}
