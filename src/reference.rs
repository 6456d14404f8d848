//! Chromosome dictionary shared by every bin table, footer, and selector.
//!
//! Pairs a `HashMap<String, u64>` with a `Vec<String>` to preserve file
//! order while keeping name lookup fast.

use crate::error::{HicError, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// The id reserved for "no chromosome" / the end-of-list sentinel.
pub const NULL_CHROM_ID: u32 = u32::MAX;

/// One sequence in the reference genome dictionary.
///
/// Equality and ordering are both defined purely by `id`: two chromosomes
/// from the same `Reference` with equal ids are always equal, and a
/// `Reference`'s chromosomes are always listed in `id` order.
#[derive(Debug, Clone)]
pub struct Chromosome {
    id: u32,
    name: Arc<str>,
    length: u32,
}

impl Chromosome {
    pub fn new(id: u32, name: impl Into<Arc<str>>, length: u32) -> Self {
        Self {
            id,
            name: name.into(),
            length,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// `true` for the "All"/"all" whole-genome pseudo-chromosome.
    #[inline]
    pub fn is_all(&self) -> bool {
        self.name.eq_ignore_ascii_case("all")
    }
}

impl PartialEq for Chromosome {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Chromosome {}

impl PartialOrd for Chromosome {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Chromosome {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Immutable, shared chromosome dictionary.
///
/// Invariants: ids are contiguous from 0, chromosomes are sorted by id,
/// names are unique, no chromosome has zero length.
#[derive(Debug, Clone)]
pub struct Reference {
    chromosomes: Arc<Vec<Chromosome>>,
    by_name: Arc<FxHashMap<String, u32>>,
}

impl Reference {
    /// Build a `Reference` from `(name, length)` pairs in file order.
    /// The resulting `id` of each chromosome is its position in `entries`.
    pub fn new(entries: Vec<(String, u32)>) -> Result<Self> {
        let mut chromosomes = Vec::with_capacity(entries.len());
        let mut by_name = FxHashMap::default();
        by_name.reserve(entries.len());

        for (id, (name, length)) in entries.into_iter().enumerate() {
            let id = id as u32;
            if length == 0 {
                return Err(HicError::invalid_format(format!(
                    "chromosome '{name}' has zero length"
                )));
            }
            if by_name.insert(name.clone(), id).is_some() {
                return Err(HicError::invalid_format(format!(
                    "duplicate chromosome name '{name}'"
                )));
            }
            chromosomes.push(Chromosome::new(id, name, length));
        }

        Ok(Self {
            chromosomes: Arc::new(chromosomes),
            by_name: Arc::new(by_name),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Chromosome> {
        self.chromosomes.get(id as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Chromosome> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chromosome> {
        self.chromosomes.iter()
    }

    /// The chromosome with the greatest `length`.
    pub fn longest_chromosome(&self) -> Option<&Chromosome> {
        self.chromosomes.iter().max_by_key(|c| c.length())
    }

    /// The chromosome whose `name` is longest in bytes.
    pub fn chromosome_with_longest_name(&self) -> Option<&Chromosome> {
        self.chromosomes.iter().max_by_key(|c| c.name().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Reference {
        Reference::new(vec![
            ("chr1".into(), 1000),
            ("chr2".into(), 500),
            ("chrX".into(), 2000),
        ])
        .unwrap()
    }

    #[test]
    fn ids_match_position() {
        let r = sample();
        for (i, c) in r.iter().enumerate() {
            assert_eq!(c.id() as usize, i);
            assert_eq!(r.by_name(c.name()).unwrap().id(), i as u32);
        }
    }

    #[test]
    fn longest_chromosome() {
        let r = sample();
        assert_eq!(r.longest_chromosome().unwrap().name(), "chrX");
        assert_eq!(r.chromosome_with_longest_name().unwrap().name(), "chr1");
    }

    #[test]
    fn rejects_zero_length() {
        let err = Reference::new(vec![("chr1".into(), 0)]).unwrap_err();
        assert!(matches!(err, HicError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Reference::new(vec![("chr1".into(), 10), ("chr1".into(), 20)]).unwrap_err();
        assert!(matches!(err, HicError::InvalidFormat(_)));
    }
}
