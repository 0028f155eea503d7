//! Time slot model.
//!
//! Slots are fixed (day, time) windows taken from a configured, ordered
//! label list. Labels are interned once into [`SlotToken`] indices so that
//! availability sets become fixed-size bitsets.
//!
//! # Ordering
//! Tokens compare by catalog index. "Lowest slot" always means the
//! earliest entry of the configured list, never label order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of slots a catalog may hold.
pub const MAX_SLOTS: usize = 256;

const WORDS: usize = MAX_SLOTS / 64;

/// Interned index of a slot label.
///
/// Serialized as the bare index; deserializing an index of
/// [`MAX_SLOTS`] or more fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SlotToken(u16);

impl SlotToken {
    /// Creates a token from a raw catalog index.
    ///
    /// # Panics
    /// Panics if `index >= MAX_SLOTS`.
    pub fn new(index: usize) -> Self {
        assert!(index < MAX_SLOTS, "slot index {index} out of range");
        Self(index as u16)
    }

    /// Catalog index of this token.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u16> for SlotToken {
    type Error = String;

    fn try_from(index: u16) -> Result<Self, Self::Error> {
        if usize::from(index) < MAX_SLOTS {
            Ok(Self(index))
        } else {
            Err(format!("slot index {index} out of range (max {})", MAX_SLOTS - 1))
        }
    }
}

impl From<SlotToken> for u16 {
    fn from(token: SlotToken) -> Self {
        token.0
    }
}

/// A set of slots backed by a 256-bit bitset.
///
/// Intersection and emptiness tests are a handful of word operations,
/// and iteration always yields tokens in ascending index order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<SlotToken>", into = "Vec<SlotToken>")]
pub struct SlotSet {
    words: [u64; WORDS],
}

impl SlotSet {
    /// Creates an empty set.
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Creates a set from raw indices.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        indices.into_iter().map(SlotToken::new).collect()
    }

    /// Adds a slot.
    pub fn insert(&mut self, token: SlotToken) {
        let i = token.index();
        self.words[i / 64] |= 1 << (i % 64);
    }

    /// Whether the set contains a slot.
    #[inline]
    pub fn contains(&self, token: SlotToken) -> bool {
        let i = token.index();
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of slots in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Slots present in both sets.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut words = [0; WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = self.words[i] & other.words[i];
        }
        Self { words }
    }

    /// Lowest-index slot, if any.
    pub fn first(&self) -> Option<SlotToken> {
        self.words
            .iter()
            .enumerate()
            .find(|&(_, &w)| w != 0)
            .map(|(i, w)| SlotToken((i * 64 + w.trailing_zeros() as usize) as u16))
    }

    /// Highest-index slot, if any.
    pub fn last(&self) -> Option<SlotToken> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &w)| w != 0)
            .map(|(i, w)| SlotToken((i * 64 + 63 - w.leading_zeros() as usize) as u16))
    }

    /// Iterates slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = SlotToken> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(SlotToken((i * 64 + bit) as u16))
            })
        })
    }
}

impl FromIterator<SlotToken> for SlotSet {
    fn from_iter<I: IntoIterator<Item = SlotToken>>(iter: I) -> Self {
        let mut set = Self::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl From<Vec<SlotToken>> for SlotSet {
    fn from(tokens: Vec<SlotToken>) -> Self {
        tokens.into_iter().collect()
    }
}

impl From<SlotSet> for Vec<SlotToken> {
    fn from(set: SlotSet) -> Self {
        set.iter().collect()
    }
}

/// Ordered catalog of slot labels.
///
/// The position of a label in the catalog is its token index.
#[derive(Debug, Clone, Default)]
pub struct SlotCatalog {
    labels: Vec<String>,
    index: HashMap<String, SlotToken>,
}

impl SlotCatalog {
    /// Builds a catalog from labels in their configured order.
    ///
    /// Labels are trimmed. Duplicate labels keep their first position.
    /// Labels past [`MAX_SLOTS`] are ignored; config validation rejects
    /// such lists.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut catalog = Self::default();
        for label in labels.iter().take(MAX_SLOTS) {
            let label = label.as_ref().trim();
            if catalog.index.contains_key(label) {
                continue;
            }
            let token = SlotToken::new(catalog.labels.len());
            catalog.labels.push(label.to_string());
            catalog.index.insert(label.to_string(), token);
        }
        catalog
    }

    /// Token for a label.
    pub fn token(&self, label: &str) -> Option<SlotToken> {
        self.index.get(label.trim()).copied()
    }

    /// Label for a token.
    pub fn label(&self, token: SlotToken) -> Option<&str> {
        self.labels.get(token.index()).map(String::as_str)
    }

    /// Whether the token belongs to this catalog.
    pub fn contains(&self, token: SlotToken) -> bool {
        token.index() < self.labels.len()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels in catalog order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Interns a list of labels into a set.
    ///
    /// Returns the first unknown label on failure.
    pub fn resolve<S: AsRef<str>>(&self, labels: &[S]) -> Result<SlotSet, String> {
        let mut set = SlotSet::new();
        for label in labels {
            let label = label.as_ref();
            match self.token(label) {
                Some(token) => set.insert(token),
                None => return Err(label.to_string()),
            }
        }
        Ok(set)
    }
}
