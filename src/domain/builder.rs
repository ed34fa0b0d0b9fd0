//! Hierarchy builder: one forward pass over the sorted symbol stream.
//!
//! Parentage is resolved without lookahead. Structural levels (section,
//! class, subclass, main group) derive their parent from a prefix of the
//! symbol itself; subgroup levels have no structural formula and resolve
//! against the most recent symbol seen one level up, which is why the input
//! order precondition is load-bearing.

use std::collections::HashMap;

use crate::domain::entities::{ClassificationSymbol, HierarchyNode, ROOT_SYMBOL};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::symbol::{to_short, to_zero_padded, Kind};

/// Result of a completed build pass.
#[derive(Debug)]
pub struct BuildOutcome {
    /// All nodes: the synthetic root first, then one per input row in order
    pub nodes: Vec<HierarchyNode>,
    /// How often subgroup parent resolution fell back to the subclass prefix
    /// because no symbol had been seen at `level - 1` yet
    pub subgroup_fallbacks: usize,
}

/// Accumulates hierarchy nodes from an ordered symbol stream.
///
/// All build state lives here and is created fresh per invocation, so a
/// builder is safely re-runnable and never shares state across calls.
pub struct HierarchyBuilder<'t> {
    titles: &'t HashMap<String, String>,
    last_seen_at: HashMap<u32, String>,
    nodes: Vec<HierarchyNode>,
    subgroup_fallbacks: usize,
}

impl<'t> HierarchyBuilder<'t> {
    /// Create a builder; the synthetic root node is inserted immediately.
    pub fn new(titles: &'t HashMap<String, String>) -> Self {
        Self {
            titles,
            last_seen_at: HashMap::new(),
            nodes: vec![HierarchyNode::root()],
            subgroup_fallbacks: 0,
        }
    }

    /// Consume one release row, appending its node.
    ///
    /// Fails the whole build on a level outside the known brackets: a
    /// misclassified node would corrupt the tree for all its descendants.
    pub fn push(&mut self, row: &ClassificationSymbol) -> DomainResult<()> {
        let symbol = row.symbol.trim();
        let short = to_short(symbol);

        let kind = Kind::from_level(row.level).ok_or_else(|| DomainError::UnclassifiableLevel {
            symbol: symbol.to_string(),
            level: row.level,
        })?;

        let parent = self.resolve_parent(&short, row.level, kind)?;

        // Group-bearing symbols keep the office slash form for joins against
        // external tables; structural nodes do not carry one.
        let symbol_external = if symbol.contains('/') {
            Some(symbol.to_string())
        } else {
            None
        };

        let title_en = self
            .titles
            .get(&short)
            .or_else(|| self.titles.get(symbol))
            .cloned()
            .unwrap_or_default();

        self.nodes.push(HierarchyNode {
            symbol: to_zero_padded(symbol),
            symbol_short: short,
            symbol_external,
            kind,
            parent,
            level: row.level,
            title_en,
            title_full: String::new(),
            not_allocatable: row.not_allocatable,
            additional_only: row.additional_only,
            status: row.status.clone(),
        });

        // Must happen after parent resolution so a row never resolves
        // against itself, and before the next row so deeper rows can.
        self.last_seen_at.insert(row.level, symbol.to_string());

        Ok(())
    }

    /// Finish the pass and hand back the accumulated nodes.
    pub fn finish(self) -> BuildOutcome {
        BuildOutcome {
            nodes: self.nodes,
            subgroup_fallbacks: self.subgroup_fallbacks,
        }
    }

    fn resolve_parent(&mut self, short: &str, level: u32, kind: Kind) -> DomainResult<String> {
        let parent = match kind {
            Kind::Section => ROOT_SYMBOL.to_string(),
            Kind::Class => self.prefix_parent(short, level, 1)?,
            Kind::Subclass => self.prefix_parent(short, level, 3)?,
            Kind::MainGroup => self.prefix_parent(short, level, 4)?,
            Kind::SubgroupDepth(_) => match self.last_seen_at.get(&(level - 1)) {
                Some(seen) => to_zero_padded(seen),
                None => {
                    self.subgroup_fallbacks += 1;
                    self.prefix_parent(short, level, 4)?
                }
            },
            Kind::Root => unreachable!("release rows are never classified as root"),
        };
        Ok(parent)
    }

    fn prefix_parent(&self, short: &str, level: u32, len: usize) -> DomainResult<String> {
        short
            .get(..len)
            .map(str::to_string)
            .ok_or_else(|| DomainError::MalformedSymbol {
                symbol: short.to_string(),
                level,
            })
    }
}

/// Build the full node set from an ordered symbol stream.
pub fn build_hierarchy(
    rows: &[ClassificationSymbol],
    titles: &HashMap<String, String>,
) -> DomainResult<BuildOutcome> {
    let mut builder = HierarchyBuilder::new(titles);
    for row in rows {
        builder.push(row)?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, level: u32) -> ClassificationSymbol {
        ClassificationSymbol {
            symbol: symbol.to_string(),
            level,
            not_allocatable: false,
            additional_only: false,
            status: "published".to_string(),
        }
    }

    #[test]
    fn given_empty_stream_when_built_then_only_root() {
        let titles = HashMap::new();
        let outcome = build_hierarchy(&[], &titles).unwrap();

        assert_eq!(outcome.nodes.len(), 1);
        assert!(outcome.nodes[0].is_root());
        assert_eq!(outcome.nodes[0].parent, "");
    }

    #[test]
    fn given_unknown_level_when_built_then_whole_build_fails() {
        let titles = HashMap::new();
        let result = build_hierarchy(&[row("A", 2), row("A01", 3)], &titles);

        assert!(matches!(
            result,
            Err(DomainError::UnclassifiableLevel { level: 3, .. })
        ));
    }

    #[test]
    fn given_subgroup_without_prior_sibling_when_built_then_prefix_fallback_counted() {
        let titles = HashMap::new();
        // Level 9 with nothing recorded at level 8 exercises the fallback.
        let outcome = build_hierarchy(&[row("A01B   1/06", 9)], &titles).unwrap();

        assert_eq!(outcome.subgroup_fallbacks, 1);
        assert_eq!(outcome.nodes[1].parent, "A01B");
    }
}
