//! Symbol codec: pure conversions between CPC symbol representations.
//!
//! Three encodings are in play:
//! - office/padded: `"A01B   1/02"` (as published in the release)
//! - short/compact: `"A01B1/02"` (whitespace stripped)
//! - zero-padded:   `"A01B0001020000"` (fixed width, lexically ordered)
//!
//! All functions are stateless; none perform I/O.

use std::fmt;
use std::str::FromStr;

/// Depth role of a hierarchy node, derived from its level alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Root,
    Section,
    Class,
    Subclass,
    MainGroup,
    /// Subgroup nesting depth below the main group, capped at 9
    SubgroupDepth(u8),
}

impl Kind {
    /// Classify a release level. Returns `None` for levels outside the
    /// known brackets (callers treat that as a hard error).
    pub fn from_level(level: u32) -> Option<Kind> {
        match level {
            2 => Some(Kind::Section),
            4 => Some(Kind::Class),
            5 => Some(Kind::Subclass),
            7 => Some(Kind::MainGroup),
            l if l > 7 => Some(Kind::SubgroupDepth((l - 7).min(9) as u8)),
            _ => None,
        }
    }

    /// Single-character wire code used in the persisted table.
    pub fn code(&self) -> String {
        match self {
            Kind::Root => "r".to_string(),
            Kind::Section => "s".to_string(),
            Kind::Class => "c".to_string(),
            Kind::Subclass => "u".to_string(),
            Kind::MainGroup => "m".to_string(),
            Kind::SubgroupDepth(d) => d.to_string(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Kind::Root),
            "s" => Ok(Kind::Section),
            "c" => Ok(Kind::Class),
            "u" => Ok(Kind::Subclass),
            "m" => Ok(Kind::MainGroup),
            _ => s
                .parse::<u8>()
                .map(Kind::SubgroupDepth)
                .map_err(|_| format!("unknown kind code: '{s}'")),
        }
    }
}

/// Strip all whitespace from a symbol.
///
/// `"A01B   1/02"` → `"A01B1/02"`. Idempotent.
pub fn to_short(symbol: &str) -> String {
    symbol.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Convert any symbol representation to the fixed-width zero-padded key.
///
/// Symbols without a `/` (sections, classes, subclasses) pass through
/// unchanged. Group-bearing symbols become `subclass (4) + group zero-padded
/// left to 4 + subgroup zero-padded right to 6`:
/// `"A01B1/02"` → `"A01B0001020000"`.
///
/// The fixed width is what makes lexical ordering match hierarchical
/// ordering, so this form is the primary key everywhere downstream.
pub fn to_zero_padded(symbol: &str) -> String {
    let short = to_short(symbol);
    match short.split_once('/') {
        None => short,
        Some((head, subgroup)) => {
            let cut = floor_char_boundary(head, 4);
            let (subclass, group) = head.split_at(cut);
            format!("{subclass}{group:0>4}{subgroup:0<6}")
        }
    }
}

/// Largest char boundary in `s` not past `at`.
fn floor_char_boundary(s: &str, at: usize) -> usize {
    let mut idx = at.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A01B   1/02", "A01B1/02")]
    #[case("A01B1/02", "A01B1/02")]
    #[case("A", "A")]
    #[case("Y02E  10/44", "Y02E10/44")]
    fn given_symbol_when_shortened_then_whitespace_is_gone(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(to_short(input), expected);
    }

    #[test]
    fn given_short_form_when_shortened_again_then_unchanged() {
        let once = to_short("A01B   1/02");
        assert_eq!(to_short(&once), once);
    }

    #[rstest]
    #[case("A01B   1/02", "A01B0001020000")]
    #[case("A01B1/02", "A01B0001020000")]
    #[case("A01B1/00", "A01B0001000000")]
    #[case("Y02E  10/44", "Y02E0010440000")]
    #[case("A", "A")]
    #[case("A01", "A01")]
    #[case("A01B", "A01B")]
    fn given_symbol_when_zero_padded_then_fixed_width_key(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(to_zero_padded(input), expected);
    }

    #[rstest]
    #[case("A01B   1/02")]
    #[case("A01B33/08")]
    #[case("H01L")]
    fn given_any_representation_when_zero_padded_then_round_trips(#[case] input: &str) {
        assert_eq!(to_zero_padded(&to_short(input)), to_zero_padded(input));
    }

    #[rstest]
    #[case(2, Kind::Section)]
    #[case(4, Kind::Class)]
    #[case(5, Kind::Subclass)]
    #[case(7, Kind::MainGroup)]
    #[case(8, Kind::SubgroupDepth(1))]
    #[case(12, Kind::SubgroupDepth(5))]
    #[case(30, Kind::SubgroupDepth(9))]
    fn given_known_level_when_classified_then_expected_kind(
        #[case] level: u32,
        #[case] expected: Kind,
    ) {
        assert_eq!(Kind::from_level(level), Some(expected));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    #[case(6)]
    fn given_unknown_level_when_classified_then_none(#[case] level: u32) {
        assert_eq!(Kind::from_level(level), None);
    }

    #[test]
    fn given_kind_when_round_tripped_through_code_then_identical() {
        for kind in [
            Kind::Root,
            Kind::Section,
            Kind::Class,
            Kind::Subclass,
            Kind::MainGroup,
            Kind::SubgroupDepth(3),
            Kind::SubgroupDepth(9),
        ] {
            assert_eq!(kind.code().parse::<Kind>().unwrap(), kind);
        }
    }
}
