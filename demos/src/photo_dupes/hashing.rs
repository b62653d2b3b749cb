//! Difference hashing (dHash).
//!
//! An image is reduced to a 9x8 grayscale grid and each row contributes
//! eight bits, one per horizontal neighbour pair: bit `y * 8 + x` is set when
//! pixel `(x, y)` is darker than pixel `(x + 1, y)`. Visually similar images
//! (rescaled, recompressed, slightly recoloured) end up a small Hamming
//! distance apart.

use image::imageops::FilterType;
use image::ImageError;
use std::path::Path;

pub const GRID_WIDTH: usize = 9;
pub const GRID_HEIGHT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageHashingError {
    CannotLoadImage(String),
    CannotCreateGrayscale(String),
    InvalidImageData(String),
    UnsupportedFormat(String),
}

/// Computes the perceptual hash of the image stored at `path`.
pub trait ImageHasher {
    fn dhash(&self, path: &Path) -> Result<u64, ImageHashingError>;
}

/// dHash of an already reduced 9x8 grayscale grid, row-major.
pub fn dhash_grid(pixels: &[u8; GRID_WIDTH * GRID_HEIGHT]) -> u64 {
    let mut hash = 0u64;
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH - 1 {
            let left = pixels[y * GRID_WIDTH + x];
            let right = pixels[y * GRID_WIDTH + x + 1];
            if left < right {
                hash |= 1 << (y * (GRID_WIDTH - 1) + x);
            }
        }
    }
    hash
}

pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Hashes any format the `image` crate can decode (JPEG, PNG, PNM, ...),
/// picking the decoder from the file extension. Formats it has no decoder
/// for, HEIC among them, are reported as unsupported.
#[derive(Debug, Default, Clone)]
pub struct DynamicImageHasher;

impl ImageHasher for DynamicImageHasher {
    fn dhash(&self, path: &Path) -> Result<u64, ImageHashingError> {
        let image = image::open(path).map_err(|err| image_error(path, err))?;
        let grid = image
            .grayscale()
            .resize_exact(GRID_WIDTH as u32, GRID_HEIGHT as u32, FilterType::Triangle)
            .to_luma8()
            .into_raw();
        let grid: [u8; GRID_WIDTH * GRID_HEIGHT] = grid.try_into().map_err(|_| {
            ImageHashingError::CannotCreateGrayscale(format!(
                "{}: resize did not produce a {}x{} grid",
                path.display(),
                GRID_WIDTH,
                GRID_HEIGHT
            ))
        })?;
        Ok(dhash_grid(&grid))
    }
}

fn image_error(path: &Path, err: ImageError) -> ImageHashingError {
    let msg = format!("{}: {}", path.display(), err);
    match err {
        ImageError::IoError(_) => ImageHashingError::CannotLoadImage(msg),
        ImageError::Decoding(_) | ImageError::Limits(_) => ImageHashingError::InvalidImageData(msg),
        ImageError::Unsupported(_) => ImageHashingError::UnsupportedFormat(msg),
        _ => ImageHashingError::CannotCreateGrayscale(msg),
    }
}

/// Hashes binary PGM (`P5`) grayscale images with a small built-in decoder.
/// Any other format is reported as unsupported.
#[derive(Debug, Default, Clone)]
pub struct PgmHasher;

impl ImageHasher for PgmHasher {
    fn dhash(&self, path: &Path) -> Result<u64, ImageHashingError> {
        let bytes = std::fs::read(path).map_err(|err| {
            ImageHashingError::CannotLoadImage(format!("{}: {}", path.display(), err))
        })?;
        let image = GrayImage::decode_pgm(&bytes)?;
        Ok(dhash_grid(&image.reduce()?))
    }
}

/// 8-bit grayscale raster.
#[derive(Debug)]
struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    fn decode_pgm(bytes: &[u8]) -> Result<Self, ImageHashingError> {
        if !bytes.starts_with(b"P5") {
            return Err(ImageHashingError::UnsupportedFormat(
                "not a binary PGM image".to_string(),
            ));
        }

        let mut header = PgmHeader { bytes, pos: 2 };
        let width = header.next_number()?;
        let height = header.next_number()?;
        let max_value = header.next_number()?;
        // exactly one whitespace byte separates the header from the raster
        let start = header.pos + 1;

        if width == 0 || height == 0 {
            return Err(ImageHashingError::CannotCreateGrayscale(format!(
                "empty image {}x{}",
                width, height
            )));
        }
        if max_value == 0 || max_value > 255 {
            return Err(ImageHashingError::CannotCreateGrayscale(format!(
                "unsupported max value {}",
                max_value
            )));
        }

        let end = width
            .checked_mul(height)
            .and_then(|len| start.checked_add(len))
            .ok_or_else(|| {
                ImageHashingError::InvalidImageData(format!(
                    "image {}x{} is too large",
                    width, height
                ))
            })?;
        let pixels = bytes
            .get(start..end)
            .ok_or_else(|| {
                ImageHashingError::InvalidImageData(format!(
                    "expected {} pixels, found {}",
                    end - start,
                    bytes.len().saturating_sub(start)
                ))
            })?
            .to_vec();

        Ok(GrayImage {
            width,
            height,
            pixels,
        })
    }

    /// Box-averages the image down to the 9x8 hashing grid.
    fn reduce(&self) -> Result<[u8; GRID_WIDTH * GRID_HEIGHT], ImageHashingError> {
        if self.width < GRID_WIDTH || self.height < GRID_HEIGHT {
            return Err(ImageHashingError::CannotCreateGrayscale(format!(
                "image {}x{} is smaller than the {}x{} grid",
                self.width, self.height, GRID_WIDTH, GRID_HEIGHT
            )));
        }

        let mut grid = [0u8; GRID_WIDTH * GRID_HEIGHT];
        for gy in 0..GRID_HEIGHT {
            let y0 = gy * self.height / GRID_HEIGHT;
            let y1 = (gy + 1) * self.height / GRID_HEIGHT;
            for gx in 0..GRID_WIDTH {
                let x0 = gx * self.width / GRID_WIDTH;
                let x1 = (gx + 1) * self.width / GRID_WIDTH;

                let mut sum = 0u64;
                for y in y0..y1 {
                    let row = &self.pixels[y * self.width..(y + 1) * self.width];
                    sum += row[x0..x1].iter().map(|&p| p as u64).sum::<u64>();
                }
                let count = ((y1 - y0) * (x1 - x0)) as u64;
                grid[gy * GRID_WIDTH + gx] = (sum / count) as u8;
            }
        }
        Ok(grid)
    }
}

struct PgmHeader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl PgmHeader<'_> {
    /// Reads the next decimal field, skipping whitespace and `#` comments.
    fn next_number(&mut self) -> Result<usize, ImageHashingError> {
        loop {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') => {
                    while !matches!(self.bytes.get(self.pos), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }

        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| {
                ImageHashingError::InvalidImageData(format!("bad PGM header at byte {}", start))
            })
    }
}
