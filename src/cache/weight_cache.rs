//! Weight cache: per-(chromosome, normalization) vectors, lazily
//! populated on first request via a `get_or_init` pattern.

use crate::normalization::{Normalization, WeightVectorType, Weights};
use rustc_hash::FxHashMap;

type Key = (u32, Normalization);

#[derive(Default)]
pub struct WeightCache {
    entries: FxHashMap<Key, Weights>,
}

impl WeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chrom_id: u32, method: Normalization) -> Option<&Weights> {
        self.entries.get(&(chrom_id, method))
    }

    /// Insert a freshly parsed vector, truncating trailing padding to
    /// `expected_len` first.
    pub fn insert(
        &mut self,
        chrom_id: u32,
        method: Normalization,
        mut values: Vec<f64>,
        kind: WeightVectorType,
        expected_len: usize,
    ) -> (&Weights, Option<String>) {
        let mut diagnostic = None;
        if values.len() > expected_len {
            diagnostic = Some(format!(
                "weight vector for chromosome {chrom_id} ({method}) has {} entries, expected {expected_len}; truncating trailing padding",
                values.len()
            ));
            values.truncate(expected_len);
        }
        let weights = Weights::new(values, kind);
        self.entries.insert((chrom_id, method), weights);
        (self.entries.get(&(chrom_id, method)).unwrap(), diagnostic)
    }

    pub fn get_or_try_init<F>(
        &mut self,
        chrom_id: u32,
        method: Normalization,
        init: F,
    ) -> crate::error::Result<&Weights>
    where
        F: FnOnce() -> crate::error::Result<(Vec<f64>, WeightVectorType, usize)>,
    {
        if !self.entries.contains_key(&(chrom_id, method)) {
            let (values, kind, expected_len) = init()?;
            self.insert(chrom_id, method, values, kind, expected_len);
        }
        Ok(self.entries.get(&(chrom_id, method)).expect("just inserted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_truncates_and_warns() {
        let mut cache = WeightCache::new();
        let (weights, diag) = cache.insert(
            0,
            Normalization::Kr,
            vec![1.0, 2.0, 0.0, 0.0],
            WeightVectorType::Divisive,
            2,
        );
        assert_eq!(weights.len(), 2);
        assert!(diag.is_some());
    }

    #[test]
    fn get_or_try_init_only_calls_init_once() {
        let mut cache = WeightCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_try_init(1, Normalization::Vc, || {
                    calls += 1;
                    Ok((vec![1.0, 1.0], WeightVectorType::Divisive, 2))
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }
}
