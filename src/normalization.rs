//! Normalization methods and per-chromosome weight vectors.
//!
//! The method name set is spelled out concretely as named constructors
//! rather than left as `INTER_*`/`GW_*` shorthand.

use std::fmt;

/// A named balancing method. The core only ever consumes a precomputed
/// `Weights` vector for one of these; it never computes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalization {
    None,
    Vc,
    VcSqrt,
    Kr,
    Scale,
    Ice,
    InterVc,
    InterKr,
    InterScale,
    GwVc,
    GwKr,
    GwScale,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::None => "NONE",
            Normalization::Vc => "VC",
            Normalization::VcSqrt => "VC_SQRT",
            Normalization::Kr => "KR",
            Normalization::Scale => "SCALE",
            Normalization::Ice => "ICE",
            Normalization::InterVc => "INTER_VC",
            Normalization::InterKr => "INTER_KR",
            Normalization::InterScale => "INTER_SCALE",
            Normalization::GwVc => "GW_VC",
            Normalization::GwKr => "GW_KR",
            Normalization::GwScale => "GW_SCALE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "NONE" => Normalization::None,
            "VC" => Normalization::Vc,
            "VC_SQRT" => Normalization::VcSqrt,
            "KR" => Normalization::Kr,
            "SCALE" => Normalization::Scale,
            "ICE" => Normalization::Ice,
            "INTER_VC" => Normalization::InterVc,
            "INTER_KR" => Normalization::InterKr,
            "INTER_SCALE" => Normalization::InterScale,
            "GW_VC" => Normalization::GwVc,
            "GW_KR" => Normalization::GwKr,
            "GW_SCALE" => Normalization::GwScale,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Normalization::None)
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a `Weights` vector combines with a raw count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightVectorType {
    /// `normalized = raw / (w1[bin1] * w2[bin2])`
    Divisive,
    /// `normalized = raw * w1[bin1] * w2[bin2]`
    Multiplicative,
}

/// A per-chromosome normalization vector, one entry per bin in that
/// chromosome at the vector's resolution.
#[derive(Debug, Clone)]
pub struct Weights {
    values: Vec<f64>,
    kind: WeightVectorType,
}

impl Weights {
    pub fn new(values: Vec<f64>, kind: WeightVectorType) -> Self {
        Self { values, kind }
    }

    #[inline]
    pub fn kind(&self) -> WeightVectorType {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The weight for a chromosome-relative bin id, or `NaN` if out of
    /// range (treated the same as an on-disk NaN: masks the pixel).
    #[inline]
    pub fn get(&self, rel_bin_id: u64) -> f64 {
        self.values
            .get(rel_bin_id as usize)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Truncate a longer-than-needed vector to `expected_len`, discarding
    /// trailing padding. Observed in real files; handled silently.
    pub fn truncate_to(&mut self, expected_len: usize) -> bool {
        if self.values.len() > expected_len {
            self.values.truncate(expected_len);
            true
        } else {
            false
        }
    }

    /// Combine a raw count with this vector's weight at `bin1`/`bin2`
    /// (both chromosome-relative). A missing (`NaN`) weight on either
    /// side masks the result.
    pub fn apply_pair(&self, other: &Weights, rel_bin1: u64, rel_bin2: u64, raw: f64) -> f64 {
        let w1 = self.get(rel_bin1);
        let w2 = other.get(rel_bin2);
        match self.kind {
            WeightVectorType::Divisive => raw / (w1 * w2),
            WeightVectorType::Multiplicative => raw * w1 * w2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_all_variants() {
        let all = [
            Normalization::None,
            Normalization::Vc,
            Normalization::VcSqrt,
            Normalization::Kr,
            Normalization::Scale,
            Normalization::Ice,
            Normalization::InterVc,
            Normalization::InterKr,
            Normalization::InterScale,
            Normalization::GwVc,
            Normalization::GwKr,
            Normalization::GwScale,
        ];
        for n in all {
            assert_eq!(Normalization::parse(n.as_str()), Some(n));
        }
    }

    #[test]
    fn divisive_pair() {
        let w1 = Weights::new(vec![2.0, 4.0], WeightVectorType::Divisive);
        let w2 = Weights::new(vec![1.0, 5.0], WeightVectorType::Divisive);
        assert_eq!(w1.apply_pair(&w2, 0, 1, 100.0), 100.0 / (2.0 * 5.0));
    }

    #[test]
    fn missing_weight_masks_to_nan() {
        let w1 = Weights::new(vec![2.0], WeightVectorType::Divisive);
        let w2 = Weights::new(vec![1.0], WeightVectorType::Divisive);
        assert!(w1.apply_pair(&w2, 5, 0, 10.0).is_nan());
    }

    #[test]
    fn truncate_discards_trailing_padding() {
        let mut w = Weights::new(vec![1.0, 2.0, 0.0, 0.0], WeightVectorType::Divisive);
        assert!(w.truncate_to(2));
        assert_eq!(w.len(), 2);
        assert!(!w.truncate_to(2));
    }
}
