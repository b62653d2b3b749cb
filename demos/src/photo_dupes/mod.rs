//! Near-duplicate photo detection.
//!
//! The mapper buckets images by the top 16 bits of their perceptual hash;
//! the reducer clusters each bucket by Hamming distance.

pub mod hashing;
pub mod mapper;
pub mod reducer;

pub const COUNTER_GROUP: &str = "PhotoDupes";

pub use mapper::PhotoMapper;
pub use reducer::PhotoReducer;
