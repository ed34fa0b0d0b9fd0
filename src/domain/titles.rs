//! Title composer: breadcrumb titles from parent chains.
//!
//! `title_full` reads outer to inner, e.g.
//! "Energy generation through renewable energy sources > Solar thermal
//! energy > Heat exchange systems". The ascent stops before any node
//! shallower than the floor level, so structural titles (section, class,
//! subclass) never leak into the breadcrumb.

use std::collections::HashMap;

use crate::domain::entities::HierarchyNode;
use crate::domain::error::{DomainError, DomainResult};

/// Separator between breadcrumb segments.
pub const TITLE_SEPARATOR: &str = " > ";

/// Upper bound on parent-chain length. Real trees are a handful of levels
/// deep; hitting this means the builder produced a cycle.
const MAX_ASCENT: usize = 64;

/// Fill `title_full` on every node by walking parent pointers upward from
/// each node down to (and including) `floor_level`.
///
/// Nodes shallower than the floor, and nodes whose qualifying chain is
/// empty, fall back to their own `title_en`.
pub fn compose_full_titles(nodes: &mut [HierarchyNode], floor_level: u32) -> DomainResult<()> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.symbol.as_str(), i))
        .collect();

    let mut composed = Vec::with_capacity(nodes.len());
    for node in nodes.iter() {
        composed.push(compose_one(node, nodes, &index, floor_level)?);
    }

    for (node, title_full) in nodes.iter_mut().zip(composed) {
        node.title_full = title_full;
    }
    Ok(())
}

fn compose_one(
    node: &HierarchyNode,
    nodes: &[HierarchyNode],
    index: &HashMap<&str, usize>,
    floor_level: u32,
) -> DomainResult<String> {
    let mut chain = Vec::new();
    let mut current = node;
    let mut steps = 0;

    while current.level >= floor_level {
        if !current.title_en.is_empty() {
            chain.push(current.title_en.as_str());
        }

        steps += 1;
        if steps > MAX_ASCENT {
            return Err(DomainError::CycleDetected(node.symbol.clone()));
        }

        current = match index.get(current.parent.as_str()) {
            Some(&i) => &nodes[i],
            None => break,
        };
    }

    if chain.is_empty() {
        return Ok(node.title_en.clone());
    }

    chain.reverse();
    Ok(chain.join(TITLE_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Kind;

    fn node(symbol: &str, parent: &str, level: u32, title: &str) -> HierarchyNode {
        HierarchyNode {
            symbol: symbol.to_string(),
            symbol_short: symbol.to_string(),
            symbol_external: None,
            kind: Kind::from_level(level).unwrap_or(Kind::Root),
            parent: parent.to_string(),
            level,
            title_en: title.to_string(),
            title_full: String::new(),
            not_allocatable: false,
            additional_only: false,
            status: "published".to_string(),
        }
    }

    #[test]
    fn given_cyclic_parents_when_composing_then_cycle_error() {
        // Two level-8 nodes pointing at each other: a builder defect.
        let mut nodes = vec![
            node("X0000001000000", "X0000001010000", 8, "a"),
            node("X0000001010000", "X0000001000000", 8, "b"),
        ];

        let result = compose_full_titles(&mut nodes, 7);

        assert!(matches!(result, Err(DomainError::CycleDetected(_))));
    }

    #[test]
    fn given_empty_titles_in_chain_when_composing_then_skipped() {
        let mut nodes = vec![
            node("A01B", "A01", 5, "subclass title"),
            node("A01B0001000000", "A01B", 7, ""),
            node("A01B0001020000", "A01B0001000000", 8, "leaf"),
        ];

        compose_full_titles(&mut nodes, 7).unwrap();

        // Main group has no title; breadcrumb is just the leaf's own text.
        assert_eq!(nodes[2].title_full, "leaf");
        // Empty chain falls back to the node's own (empty) title.
        assert_eq!(nodes[1].title_full, "");
    }
}
