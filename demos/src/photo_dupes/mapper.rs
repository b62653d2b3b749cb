use crate::photo_dupes::hashing::{DynamicImageHasher, ImageHasher, ImageHashingError};
use crate::photo_dupes::COUNTER_GROUP;
use ferrum_stream::{Context, Mapper};
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "heic", "pgm"];

/// Hashes the image whose path is the input value and emits
/// `(top 16 bits of the hash, "<path>|<hash hex>")`, so that candidates for
/// duplication meet in the same reduce group.
#[derive(Debug, Default, Clone)]
pub struct PhotoMapper<H: ImageHasher = DynamicImageHasher> {
    hasher: H,
}

impl PhotoMapper {
    pub fn new() -> Self {
        PhotoMapper {
            hasher: DynamicImageHasher,
        }
    }
}

impl<H: ImageHasher> PhotoMapper<H> {
    pub fn with_hasher(hasher: H) -> Self {
        PhotoMapper { hasher }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl<H: ImageHasher> Mapper for PhotoMapper<H> {
    type KeyOut = u16;
    type ValueOut = String;

    fn map(&mut self, _key: &str, value: &str, ctx: &mut Context<'_, u16, String>) {
        let file_path = value.trim();
        let path = Path::new(file_path);

        if !is_image(path) {
            ctx.increment(COUNTER_GROUP, "skipped_non_image");
            return;
        }
        if !path.exists() {
            ctx.increment(COUNTER_GROUP, "missing_file");
            return;
        }

        match self.hasher.dhash(path) {
            Ok(hash) => {
                let prefix = (hash >> 48) as u16;
                ctx.emit(prefix, format!("{}|{:x}", file_path, hash));
                ctx.increment(COUNTER_GROUP, "processed_images");
            }
            Err(err) => {
                tracing::debug!(?err, file_path, "cannot hash image");
                ctx.increment(COUNTER_GROUP, "corrupt_images");
                let reason = match err {
                    ImageHashingError::CannotLoadImage(_) => "cannot_load",
                    ImageHashingError::CannotCreateGrayscale(_) => "cannot_process",
                    ImageHashingError::InvalidImageData(_) => "invalid_data",
                    ImageHashingError::UnsupportedFormat(_) => "unknown_error",
                };
                ctx.increment(COUNTER_GROUP, reason);
            }
        }
    }
}
