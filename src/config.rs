//! Global configuration for reader runtime behavior.
//!
//! Process-global tunables for default construction only; an explicit
//! argument to `HicFile::open` always wins. Atomic-flag storage, holding
//! the handful of numeric knobs a caller can configure process-wide
//! (pixel cache byte budget, remote prefetch chunk size).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Default pixel cache byte budget, used when `HicFile::open` is called
/// without an explicit `cache_bytes`. 32 MiB is a middle ground between
/// the two presets `estimate_optimal_cache_size` can compute.
const DEFAULT_CACHE_BYTES_INITIAL: u64 = 32 * 1024 * 1024;

/// Default remote byte-stream prefetch chunk size (~64 KiB).
const DEFAULT_PREFETCH_CHUNK_BYTES_INITIAL: u64 = 64 * 1024;

/// Smaller prefetch window for memory-constrained environments.
pub const LOW_MEMORY_PREFETCH_CHUNK_BYTES: u64 = 16 * 1024;

static DEFAULT_CACHE_BYTES: AtomicU64 = AtomicU64::new(DEFAULT_CACHE_BYTES_INITIAL);
static DEFAULT_PREFETCH_CHUNK_BYTES: AtomicU64 = AtomicU64::new(DEFAULT_PREFETCH_CHUNK_BYTES_INITIAL);
static LOW_MEMORY: AtomicBool = AtomicBool::new(false);

/// Set the default pixel cache byte budget used by `HicFile::open` when no
/// explicit `cache_bytes` is given.
#[inline]
pub fn set_default_cache_bytes(bytes: u64) {
    DEFAULT_CACHE_BYTES.store(bytes, Ordering::Release);
}

/// Current default pixel cache byte budget.
#[inline]
pub fn default_cache_bytes() -> u64 {
    DEFAULT_CACHE_BYTES.load(Ordering::Acquire)
}

/// Set the default remote prefetch chunk size.
#[inline]
pub fn set_default_prefetch_chunk_bytes(bytes: u64) {
    DEFAULT_PREFETCH_CHUNK_BYTES.store(bytes, Ordering::Release);
}

/// Current default remote prefetch chunk size.
#[inline]
pub fn default_prefetch_chunk_bytes() -> u64 {
    DEFAULT_PREFETCH_CHUNK_BYTES.load(Ordering::Acquire)
}

/// Enable or disable low-memory mode process-wide.
#[inline]
pub fn set_low_memory(enabled: bool) {
    LOW_MEMORY.store(enabled, Ordering::Release);
}

#[inline]
pub fn is_low_memory() -> bool {
    LOW_MEMORY.load(Ordering::Acquire)
}

/// The prefetch chunk size to use, honoring the process-wide low-memory
/// flag. Mirrors `streaming::buffers::output_buffer_size`.
#[inline]
pub fn prefetch_chunk_size(low_memory: bool) -> u64 {
    if low_memory {
        LOW_MEMORY_PREFETCH_CHUNK_BYTES
    } else {
        default_prefetch_chunk_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_round_trip() {
        set_default_cache_bytes(DEFAULT_CACHE_BYTES_INITIAL);
        assert_eq!(default_cache_bytes(), DEFAULT_CACHE_BYTES_INITIAL);
        set_default_cache_bytes(1024);
        assert_eq!(default_cache_bytes(), 1024);
        set_default_cache_bytes(DEFAULT_CACHE_BYTES_INITIAL);
    }

    #[test]
    #[serial]
    fn low_memory_picks_smaller_chunk() {
        set_low_memory(false);
        assert_eq!(
            prefetch_chunk_size(true),
            LOW_MEMORY_PREFETCH_CHUNK_BYTES
        );
        assert_eq!(
            prefetch_chunk_size(false),
            default_prefetch_chunk_bytes()
        );
    }
}
