//! Storage backends, configuration and seeding for transparency.
//!
//! Implements the `transparency-core` storage traits in memory and on top of
//! a single JSON file, and loads the `transparency.toml` configuration.

pub mod clock;
pub mod config;
pub mod file;
pub mod memory;
pub mod seed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_config, load_config_from, OutputFormat, TransparencyConfig};
pub use file::FileStore;
pub use memory::{MemoryStore, StoreSnapshot};
pub use seed::{apply_seed, SeedOutcome, SeedSummary};
