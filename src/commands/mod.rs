//! CLI subcommands: thin wrappers over the library query surface, one
//! module per subcommand. None of these hold format-parsing logic of their
//! own; they all go through [`crate::file::HicFile`] and the transformers
//! the same way a caller embedding this crate would.

pub mod coarsen;
pub mod dump;
pub mod header;
pub mod merge;
pub mod weights;

pub use coarsen::CoarsenCommand;
pub use dump::DumpCommand;
pub use header::HeaderCommand;
pub use merge::MergeCommand;
pub use weights::WeightsCommand;
