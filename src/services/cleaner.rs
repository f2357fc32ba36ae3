// src/services/cleaner.rs

//! Content cleaning.
//!
//! Strips page chrome (bylines, report buttons, footers, share widgets,
//! scripts, styles) from a matched content node. Works on a private copy:
//! the source document is never mutated.

use scraper::{ElementRef, Html, Node, Selector};

use crate::models::ExtractedContent;
use crate::utils::normalize_whitespace;

/// Elements whose boundaries become line breaks in plain text.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Elements whose text is never visible.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Removes unwanted substructures from content nodes.
#[derive(Debug, Clone)]
pub struct ContentCleaner {
    unwanted: Vec<Selector>,
}

impl ContentCleaner {
    /// Cleaner over a compiled unwanted list, keeping its order.
    pub fn new(unwanted: &[Selector]) -> Self {
        Self {
            unwanted: unwanted.to_vec(),
        }
    }

    /// Clean a node's content.
    ///
    /// Every descendant matching an unwanted selector is detached, selector by
    /// selector in list order. A selector with no match is a no-op. Both
    /// outputs come from the same cleaned tree.
    pub fn clean(&self, node: ElementRef<'_>) -> ExtractedContent {
        let mut fragment = Html::parse_fragment(&node.inner_html());
        let root_id = fragment.root_element().id();

        for selector in &self.unwanted {
            let matched: Vec<_> = fragment
                .root_element()
                .select(selector)
                .map(|element| element.id())
                .filter(|id| *id != root_id)
                .collect();

            for id in matched {
                if let Some(mut target) = fragment.tree.get_mut(id) {
                    target.detach();
                }
            }
        }

        let root = fragment.root_element();
        ExtractedContent {
            html: root.inner_html().trim().to_string(),
            plain_text: flatten_text(root),
        }
    }
}

/// Visible text of a node, one line per block.
fn flatten_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in root.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|el| INVISIBLE_TAGS.contains(&el.value().name()));
                if !hidden {
                    raw.push_str(text);
                }
            }
            Node::Element(element) if BLOCK_TAGS.contains(&element.name()) => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
