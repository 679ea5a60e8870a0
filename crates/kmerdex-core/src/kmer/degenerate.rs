//! Deterministic expansion of a degenerate (four-bit) k-mer window into its
//! concrete canonical k-mers, bounded by a combinatorial budget.

use crate::codec::dna4;

/// Maximum number of canonical k-mers a single degenerate window may expand
/// into before it is dropped instead.
pub const EXPANSION_LIMIT: usize = 10;

/// Per-window degenerate-base class counts used for the cheap bound check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ClassCounts {
    /// Count of 4-way codes (`N`).
    n: u32,
    /// Count of 3-way codes (`V, H, D, B`).
    vhdb: u32,
    /// Count of 2-way codes (`M, R, W, S, Y, K`).
    mrwsyk: u32,
}

impl ClassCounts {
    fn tally(window: &[u8]) -> Self {
        let mut counts = Self::default();
        for &code in window {
            match code.count_ones() {
                2 => counts.mrwsyk += 1,
                3 => counts.vhdb += 1,
                4 => counts.n += 1,
                // count_ones() == 1 is a canonical base; contributes no
                // ambiguity. count_ones() == 0 is the forbidden zero code,
                // handled as an error by the codec before extraction ever
                // sees it.
                _ => {}
            }
        }
        counts
    }

    /// Whether the window's expansion product would exceed
    /// [`EXPANSION_LIMIT`], checked without computing the product.
    fn exceeds_limit(self) -> bool {
        self.n >= 2
            || (self.n >= 1 && self.vhdb >= 1)
            || (self.n >= 1 && self.mrwsyk >= 2)
            || self.vhdb >= 3
            || (self.vhdb >= 2 && self.mrwsyk >= 1)
            || (self.vhdb >= 1 && self.mrwsyk >= 2)
            || self.mrwsyk >= 4
    }
}

/// Expand a window of four-bit codes into the Cartesian product of its
/// canonical two-bit base assignments, in position order, `A < C < G < T`
/// per position. Returns `None` if the window's degenerate-base class
/// counts would produce more than [`EXPANSION_LIMIT`] combinations, in
/// which case the caller must drop the window entirely.
///
/// # Errors
///
/// Propagates [`crate::error::KmerError::InvalidFourBitCode`] if any code
/// in the window is the forbidden all-zero value.
pub fn expand_window(window: &[u8]) -> crate::error::KmerResult<Option<Vec<Vec<u8>>>> {
    if ClassCounts::tally(window).exceeds_limit() {
        return Ok(None);
    }

    let mut combinations: Vec<Vec<u8>> = vec![Vec::with_capacity(window.len())];
    for &code in window {
        let choices = dna4::expand_code(code)?;
        let mut next = Vec::with_capacity(combinations.len() * choices.len());
        for existing in &combinations {
            for &choice in &choices {
                let mut extended = existing.clone();
                extended.push(choice);
                next.push(extended);
            }
        }
        combinations = next;
    }
    Ok(Some(combinations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_2_nnna_drops() {
        // N N N A -> nN=3 -> 4^3=64 > 10, dropped.
        let window = [0b1111, 0b1111, 0b1111, 0b0001];
        assert_eq!(expand_window(&window).unwrap(), None);
    }

    #[test]
    fn single_canonical_window_expands_to_itself() {
        let window = [0b0001, 0b0010, 0b0100, 0b1000]; // A C G T
        let expanded = expand_window(&window).unwrap().unwrap();
        assert_eq!(expanded, vec![vec![0b00, 0b01, 0b10, 0b11]]);
    }

    #[test]
    fn single_m_expands_to_two_combinations() {
        let window = [0b0011, 0b0010, 0b0100, 0b1000]; // M C G T
        let expanded = expand_window(&window).unwrap().unwrap();
        assert_eq!(expanded.len(), 2);
        assert!(expanded.contains(&vec![0b00, 0b01, 0b10, 0b11]));
        assert!(expanded.contains(&vec![0b01, 0b01, 0b10, 0b11]));
    }

    #[test]
    fn exactly_at_limit_boundary_is_kept() {
        // Two MRWSYK codes: 2*2 = 4 <= 10, kept.
        let window = [0b0011, 0b0101, 0b0100, 0b1000];
        assert!(expand_window(&window).unwrap().is_some());
    }

    #[test]
    fn one_vhdb_and_two_mrwsyk_is_dropped() {
        // 3 * 2 * 2 = 12 > 10.
        let window = [0b0111, 0b0011, 0b0101, 0b1000];
        assert_eq!(expand_window(&window).unwrap(), None);
    }

    #[test]
    fn zero_code_in_window_is_an_error() {
        let window = [0b0000, 0b0010, 0b0100, 0b1000];
        assert!(expand_window(&window).is_err());
    }
}
