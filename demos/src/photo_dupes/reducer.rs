use crate::photo_dupes::hashing::hamming;
use crate::photo_dupes::COUNTER_GROUP;
use ferrum_stream::{Context, Reducer, Values};

pub const DEFAULT_HAMMING_THRESHOLD: u32 = 4;

/// Clusters the photos of one hash-prefix bucket and emits
/// `(group id, "path1,path2,...")` for every cluster of two or more.
///
/// A cluster is seeded by the first unvisited photo and takes every later
/// unvisited photo within the Hamming threshold of the seed. The comparison is
/// quadratic in the bucket size; the prefix keeps buckets small.
#[derive(Debug, Clone)]
pub struct PhotoReducer {
    hamming_threshold: u32,
}

impl Default for PhotoReducer {
    fn default() -> Self {
        PhotoReducer {
            hamming_threshold: DEFAULT_HAMMING_THRESHOLD,
        }
    }
}

impl PhotoReducer {
    pub fn with_threshold(hamming_threshold: u32) -> Self {
        PhotoReducer { hamming_threshold }
    }
}

/// Parses `"<path>|<hash hex>"`.
fn parse_photo(value: &str) -> Option<(String, u64)> {
    let (path, hash) = value.split_once('|')?;
    let hash = u64::from_str_radix(hash, 16).ok()?;
    Some((path.to_string(), hash))
}

impl Reducer for PhotoReducer {
    type KeyIn = u16;
    type ValueIn = String;
    type KeyOut = u64;
    type ValueOut = String;

    fn reduce(&mut self, _key: u16, values: Values<String>, ctx: &mut Context<'_, u64, String>) {
        let mut photos = Vec::with_capacity(values.len());
        for value in values {
            match parse_photo(&value) {
                Some(photo) => photos.push(photo),
                None => ctx.increment(COUNTER_GROUP, "invalid_format"),
            }
        }
        if photos.is_empty() {
            return;
        }

        let mut visited = vec![false; photos.len()];
        let mut group_id = 0u64;

        for i in 0..photos.len() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            let mut cluster = vec![photos[i].0.as_str()];

            for j in i + 1..photos.len() {
                if !visited[j] && hamming(photos[i].1, photos[j].1) <= self.hamming_threshold {
                    visited[j] = true;
                    cluster.push(photos[j].0.as_str());
                }
            }

            if cluster.len() > 1 {
                ctx.emit(group_id, cluster.join(","));
                ctx.increment(COUNTER_GROUP, "duplicate_groups");
                ctx.increment_counter(COUNTER_GROUP, "duplicate_images", cluster.len() as u64);
                group_id += 1;
            }
        }

        ctx.increment(COUNTER_GROUP, "processed_buckets");
        ctx.increment_counter(COUNTER_GROUP, "total_photos_in_bucket", photos.len() as u64);
    }
}
