use crate::framework::errors::{FerrumStreamError, Result};

/// Renders a key or value to the text written on the wire.
///
/// The rendering must be deterministic and must round-trip through
/// [`Parsable::parse`] for types that implement both.
pub trait Renderable {
    fn render(&self) -> String;
}

/// Parses a key or value from the text read off the wire.
///
/// Malformed text is reported as a `ConversionError`, never a panic.
pub trait Parsable: Sized {
    fn parse(text: &str) -> Result<Self>;
}

impl Renderable for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl Parsable for String {
    fn parse(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

impl Renderable for &str {
    fn render(&self) -> String {
        self.to_string()
    }
}

macro_rules! display_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Renderable for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }

            impl Parsable for $ty {
                fn parse(text: &str) -> Result<Self> {
                    text.parse::<$ty>().map_err(|err| {
                        FerrumStreamError::ConversionError(format!(
                            "'{}' is not a valid {}: {}",
                            text,
                            stringify!($ty),
                            err
                        ))
                    })
                }
            }
        )*
    };
}

display_from_str!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);

/// A typed (key, value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Record<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Record { key, value }
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
