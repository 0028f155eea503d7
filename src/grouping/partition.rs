//! Category partitioning.
//!
//! Splits a roster into one bucket per configured category. Categories
//! never interact, so each bucket can be optimized independently.

use crate::models::Pair;

/// Pairs of one category, in roster order.
#[derive(Debug, Clone)]
pub struct CategoryBucket<'a> {
    pub category: &'a str,
    pub pairs: Vec<&'a Pair>,
}

impl CategoryBucket<'_> {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Buckets pairs by category.
///
/// Returns one bucket per entry of `categories`, in that order, even when
/// a bucket is empty. Pairs whose category is not listed are skipped;
/// validation rejects them before a run gets here.
pub fn partition_by_category<'a>(categories: &'a [String], pairs: &'a [Pair]) -> Vec<CategoryBucket<'a>> {
    categories
        .iter()
        .map(|category| CategoryBucket {
            category: category.as_str(),
            pairs: pairs.iter().filter(|p| &p.category == category).collect(),
        })
        .collect()
}
