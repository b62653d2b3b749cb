pub mod photo_dupes;
pub mod word_count;

use ferrum_stream::JobRegistry;

/// Registry of every job shipped in this crate, keyed by type name.
pub fn registry() -> JobRegistry {
    let mut registry = JobRegistry::new();
    registry
        .register_mapper("WordCountMapper", word_count::WordCountMapper::default)
        .register_reducer("WordCountReducer", word_count::WordCountReducer::default)
        .register_mapper("PhotoMapper", photo_dupes::PhotoMapper::new)
        .register_reducer("PhotoReducer", photo_dupes::PhotoReducer::default);
    registry
}
