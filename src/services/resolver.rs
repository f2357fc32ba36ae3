// src/services/resolver.rs

//! Selector chain resolution.
//!
//! Candidates are evaluated in declared order and the first one that matches
//! wins outright; later candidates are never consulted or merged in. New site
//! variants are supported by appending candidates, not by branching code.

use scraper::{ElementRef, Html};

use crate::models::SelectorChain;

/// A chain candidate's match.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub node: ElementRef<'a>,

    /// Index of the winning candidate within the chain
    pub candidate: usize,
}

/// First element matched by the highest-priority matching candidate.
///
/// Searches descendants of `scope`. `None` means the chain was exhausted,
/// which callers treat as a recoverable gap.
pub fn resolve<'a>(scope: ElementRef<'a>, chain: &SelectorChain) -> Option<Resolved<'a>> {
    chain
        .iter()
        .enumerate()
        .find_map(|(candidate, (_, selector))| {
            scope
                .select(selector)
                .next()
                .map(|node| Resolved { node, candidate })
        })
}

/// Every element matched by the highest-priority matching candidate.
pub fn resolve_all<'a>(
    scope: ElementRef<'a>,
    chain: &SelectorChain,
) -> Option<(usize, Vec<ElementRef<'a>>)> {
    chain
        .iter()
        .enumerate()
        .find_map(|(candidate, (_, selector))| {
            let nodes: Vec<_> = scope.select(selector).collect();
            (!nodes.is_empty()).then_some((candidate, nodes))
        })
}

/// [`resolve`] over a whole document.
pub fn resolve_in<'a>(document: &'a Html, chain: &SelectorChain) -> Option<Resolved<'a>> {
    resolve(document.root_element(), chain)
}
