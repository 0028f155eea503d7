//! Group optimizer.
//!
//! Partitions one category bucket into disjoint triples maximizing the
//! total compatibility score. Pairs not placed in any triple are left
//! over.
//!
//! # Algorithm
//!
//! Mode is chosen from the implied group count `g = n / 3`:
//!
//! - `g == 0`: nothing to do, every pair is left over.
//! - `min_groups <= g <= max_groups`: exact branch-and-bound.
//! - otherwise: greedy.
//!
//! **Greedy** repeatedly scans all triples of the remaining pairs in
//! lexicographic index order and keeps the first one with the strictly
//! highest score. It stops when fewer than 3 pairs remain, or when the
//! best score is 0 and incompatible groups are not allowed.
//!
//! **Exact** branches on the lowest remaining pair: either it joins one of
//! the triples containing it (best score first), or it is left over. A
//! branch is pruned when `points + 3 * (remaining / 3)` cannot beat the
//! incumbent. The incumbent starts as the greedy partition, so the exact
//! result is never worse than greedy, and the search stops as soon as the
//! global maximum `3 * (n / 3)` is reached.
//!
//! # Complexity
//! Greedy: O(n⁴) scoring calls. Exact: exponential, capped by the
//! [`SearchBudget`].

use std::time::Instant;

use tracing::debug;

use super::scoring::{score_triple, Compatibility};
use crate::config::{EngineConfig, SearchBudget};
use crate::models::{GroupScore, SearchMode, SlotSet, GROUP_SIZE};

/// A triple chosen by the optimizer, by bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftGroup {
    /// Bucket indices, ascending.
    pub members: [usize; GROUP_SIZE],
    pub compatibility: Compatibility,
}

impl DraftGroup {
    fn points(&self) -> u32 {
        self.compatibility.score.points()
    }
}

/// A partition of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub groups: Vec<DraftGroup>,
    /// Bucket indices not in any group, ascending.
    pub leftovers: Vec<usize>,
    /// Sum of group points (3 per perfect group, 2 per partial).
    pub total_points: u32,
}

impl Partition {
    fn all_left_over(n: usize) -> Self {
        Self {
            groups: Vec::new(),
            leftovers: (0..n).collect(),
            total_points: 0,
        }
    }
}

/// Optimizer output for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub partition: Partition,
    pub mode: SearchMode,
    /// Exact search hit its budget; the partition is the best found so far.
    pub truncated: bool,
    pub nodes_explored: u64,
}

/// Partitions buckets into triples.
#[derive(Debug, Clone)]
pub struct GroupOptimizer {
    min_groups: usize,
    max_groups: usize,
    budget: SearchBudget,
    allow_incompatible: bool,
}

impl GroupOptimizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_groups: config.exact_search_min_groups,
            max_groups: config.exact_search_max_groups,
            budget: config.search_budget,
            allow_incompatible: config.allow_incompatible_groups,
        }
    }

    /// Mode used for a bucket of `n` pairs.
    pub fn select_mode(&self, n: usize) -> SearchMode {
        let groups = n / GROUP_SIZE;
        if groups == 0 {
            SearchMode::None
        } else if (self.min_groups..=self.max_groups).contains(&groups) {
            SearchMode::Exact
        } else {
            SearchMode::Greedy
        }
    }

    /// Partitions a bucket given each pair's availability.
    pub fn optimize(&self, slots: &[SlotSet]) -> Optimized {
        let mode = self.select_mode(slots.len());
        match mode {
            SearchMode::None => Optimized {
                partition: Partition::all_left_over(slots.len()),
                mode,
                truncated: false,
                nodes_explored: 0,
            },
            SearchMode::Greedy => Optimized {
                partition: self.greedy(slots),
                mode,
                truncated: false,
                nodes_explored: 0,
            },
            SearchMode::Exact => {
                let (partition, truncated, nodes_explored) = self.exact(slots);
                Optimized {
                    partition,
                    mode,
                    truncated,
                    nodes_explored,
                }
            }
        }
    }

    /// Greedy partition.
    pub fn greedy(&self, slots: &[SlotSet]) -> Partition {
        let mut pool: Vec<usize> = (0..slots.len()).collect();
        let mut groups = Vec::new();

        while pool.len() >= GROUP_SIZE {
            let Some((x, y, z, compatibility)) = best_triple(slots, &pool) else {
                break;
            };
            if compatibility.score == GroupScore::Incompatible && !self.allow_incompatible {
                break;
            }

            groups.push(DraftGroup {
                members: [pool[x], pool[y], pool[z]],
                compatibility,
            });
            // x < y < z, so remove from the back
            pool.remove(z);
            pool.remove(y);
            pool.remove(x);
        }

        let total_points = groups.iter().map(DraftGroup::points).sum();
        Partition {
            groups,
            leftovers: pool,
            total_points,
        }
    }

    /// Exact partition. Returns the partition, whether the budget cut the
    /// search short, and the number of nodes explored.
    pub fn exact(&self, slots: &[SlotSet]) -> (Partition, bool, u64) {
        let n = slots.len();
        let seed = self.greedy(slots);
        let ceiling = GroupScore::MAX_POINTS * (n / GROUP_SIZE) as u32;

        if seed.total_points >= ceiling {
            debug!(pairs = n, points = seed.total_points, "greedy seed is optimal");
            return (seed, false, 0);
        }

        let mut search = ExactSearch {
            slots,
            allow_incompatible: self.allow_incompatible,
            max_nodes: self.budget.max_nodes,
            deadline: self.budget.time_limit().map(|limit| Instant::now() + limit),
            ceiling,
            nodes: 0,
            truncated: false,
            best: seed,
            groups: Vec::new(),
            leftovers: Vec::new(),
        };
        let remaining: Vec<usize> = (0..n).collect();
        search.run(&remaining, 0);

        debug!(
            pairs = n,
            points = search.best.total_points,
            nodes = search.nodes,
            truncated = search.truncated,
            "exact search finished"
        );
        (search.best, search.truncated, search.nodes)
    }
}

/// First strictly best triple of `pool`, as positions into `pool`.
fn best_triple(slots: &[SlotSet], pool: &[usize]) -> Option<(usize, usize, usize, Compatibility)> {
    let mut best: Option<(usize, usize, usize, Compatibility)> = None;
    let len = pool.len();

    'scan: for x in 0..len {
        for y in (x + 1)..len {
            for z in (y + 1)..len {
                let c = score_triple(&slots[pool[x]], &slots[pool[y]], &slots[pool[z]]);
                if best.map_or(true, |(_, _, _, b)| c.score > b.score) {
                    best = Some((x, y, z, c));
                    if c.score == GroupScore::Perfect {
                        break 'scan;
                    }
                }
            }
        }
    }
    best
}

/// Wall time is checked once every this many nodes.
const CLOCK_INTERVAL: u64 = 1024;

struct ExactSearch<'a> {
    slots: &'a [SlotSet],
    allow_incompatible: bool,
    max_nodes: Option<u64>,
    deadline: Option<Instant>,
    ceiling: u32,
    nodes: u64,
    truncated: bool,
    best: Partition,
    groups: Vec<DraftGroup>,
    leftovers: Vec<usize>,
}

impl ExactSearch<'_> {
    fn done(&self) -> bool {
        self.truncated || self.best.total_points >= self.ceiling
    }

    fn out_of_budget(&self) -> bool {
        if self.max_nodes.is_some_and(|max| self.nodes > max) {
            return true;
        }
        match self.deadline {
            // root node included, so an already expired limit stops at once
            Some(deadline) if self.nodes == 1 || self.nodes % CLOCK_INTERVAL == 0 => {
                Instant::now() >= deadline
            }
            _ => false,
        }
    }

    /// `remaining` is ascending.
    fn run(&mut self, remaining: &[usize], points: u32) {
        self.nodes += 1;
        if self.out_of_budget() {
            self.truncated = true;
            return;
        }

        if remaining.len() < GROUP_SIZE {
            if points > self.best.total_points {
                let mut leftovers = self.leftovers.clone();
                leftovers.extend_from_slice(remaining);
                leftovers.sort_unstable();
                self.best = Partition {
                    groups: self.groups.clone(),
                    leftovers,
                    total_points: points,
                };
            }
            return;
        }

        let bound = points + GroupScore::MAX_POINTS * (remaining.len() / GROUP_SIZE) as u32;
        if bound <= self.best.total_points {
            return;
        }

        let first = remaining[0];
        let rest = &remaining[1..];

        let mut candidates = Vec::new();
        for (x, &j) in rest.iter().enumerate() {
            for &k in &rest[x + 1..] {
                let compatibility = score_triple(&self.slots[first], &self.slots[j], &self.slots[k]);
                if compatibility.score == GroupScore::Incompatible && !self.allow_incompatible {
                    continue;
                }
                candidates.push(DraftGroup {
                    members: [first, j, k],
                    compatibility,
                });
            }
        }
        // stable: equal scores keep index order
        candidates.sort_by(|a, b| b.compatibility.score.cmp(&a.compatibility.score));

        for candidate in candidates {
            let [_, j, k] = candidate.members;
            let next: Vec<usize> = rest.iter().copied().filter(|&p| p != j && p != k).collect();
            let gained = candidate.points();

            self.groups.push(candidate);
            self.run(&next, points + gained);
            self.groups.pop();

            if self.done() {
                return;
            }
        }

        self.leftovers.push(first);
        self.run(rest, points);
        self.leftovers.pop();
    }
}
