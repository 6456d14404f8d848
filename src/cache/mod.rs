//! Caches owned by `HicFile`: the decompressed-block pixel cache and the
//! per-chromosome normalization weight cache.

pub mod block_cache;
pub mod weight_cache;

pub use block_cache::{BlockCache, BlockKey, CacheStats};
pub use weight_cache::WeightCache;
