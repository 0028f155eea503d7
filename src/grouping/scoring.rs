//! Triple compatibility scoring.
//!
//! # Rule
//!
//! | Condition | Score | Common slot |
//! |-----------|-------|-------------|
//! | A ∩ B ∩ C ≠ ∅ | 3.0 | lowest slot of A ∩ B ∩ C |
//! | some pairwise intersection ≠ ∅ | 2.0 | lowest slot of the largest pairwise intersection |
//! | otherwise | 0.0 | none |
//!
//! Equal-sized pairwise intersections are ordered by their lowest slot.
//! When the triple intersection is empty no slot can sit in two pairwise
//! intersections, so this order never ties and the result does not depend
//! on the order the three sets are given in.

use crate::models::{GroupScore, Pair, SlotSet, SlotToken};

/// Score of one triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub score: GroupScore,
    pub common_slot: Option<SlotToken>,
    /// Position (0..3) of the member outside the common slot, for partial scores.
    pub uncovered: Option<usize>,
}

impl Compatibility {
    const INCOMPATIBLE: Self = Self {
        score: GroupScore::Incompatible,
        common_slot: None,
        uncovered: None,
    };
}

/// Scores three availability sets.
pub fn score_triple(a: &SlotSet, b: &SlotSet, c: &SlotSet) -> Compatibility {
    let ab = a.intersection(b);
    if let Some(slot) = ab.intersection(c).first() {
        return Compatibility {
            score: GroupScore::Perfect,
            common_slot: Some(slot),
            uncovered: None,
        };
    }

    // (intersection, member left out)
    let pairwise = [(ab, 2), (a.intersection(c), 1), (b.intersection(c), 0)];

    let mut best: Option<(usize, SlotToken, usize)> = None;
    for (set, uncovered) in pairwise {
        let Some(first) = set.first() else {
            continue;
        };
        let len = set.len();
        let better = match best {
            None => true,
            Some((best_len, best_first, _)) => {
                len > best_len || (len == best_len && first < best_first)
            }
        };
        if better {
            best = Some((len, first, uncovered));
        }
    }

    match best {
        Some((_, slot, uncovered)) => Compatibility {
            score: GroupScore::Partial,
            common_slot: Some(slot),
            uncovered: Some(uncovered),
        },
        None => Compatibility::INCOMPATIBLE,
    }
}

/// Scores three pairs.
pub fn score_pairs(a: &Pair, b: &Pair, c: &Pair) -> Compatibility {
    score_triple(&a.available_slots, &b.available_slots, &c.available_slots)
}
