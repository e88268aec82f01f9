pub mod load;
pub mod save;
pub mod types;

pub use types::{Config, EncoderPreset, MAX_RECENT_PATHS, MergeSettings};
