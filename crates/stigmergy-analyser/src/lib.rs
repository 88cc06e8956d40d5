//! Help Analyser (spec §4.B): probes a CLI's help output, extracts a
//! family-specific [`CliPattern`], and persists it to a TTL'd on-disk cache.

pub mod analyser;
pub mod cache;
pub mod families;
pub mod types;

pub use analyser::{analyse, analyse_all, AnalyseOptions, ProbeSpec};
pub use cache::{default_cache_path, PatternCache};
pub use types::{CliPattern, Family, InteractionMode};
