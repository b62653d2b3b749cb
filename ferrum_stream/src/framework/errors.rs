use std::fmt;

#[derive(Debug, PartialEq)]
pub enum FerrumStreamError {
    InputFormatError(String),
    KeyConversionError(String),
    ValueConversionError(String),
    ConversionError(String),
    ConfigError(String),
    IOError(String),
    UnknownJob(String),
    InvalidMode(String),
}

impl fmt::Display for FerrumStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FerrumStreamError::InputFormatError(line) => {
                write!(f, "invalid input format: '{}', expected 'key\\tvalue'", line)
            }
            FerrumStreamError::KeyConversionError(msg) => write!(f, "key conversion failed: {}", msg),
            FerrumStreamError::ValueConversionError(msg) => {
                write!(f, "value conversion failed: {}", msg)
            }
            FerrumStreamError::ConversionError(msg) => write!(f, "conversion failed: {}", msg),
            FerrumStreamError::ConfigError(msg) => write!(f, "config error: {}", msg),
            FerrumStreamError::IOError(msg) => write!(f, "io error: {}", msg),
            FerrumStreamError::UnknownJob(msg) => write!(f, "unknown job: {}", msg),
            FerrumStreamError::InvalidMode(msg) => write!(f, "invalid mode: {}", msg),
        }
    }
}

impl std::error::Error for FerrumStreamError {}

impl From<serde_xml_rs::Error> for FerrumStreamError {
    fn from(value: serde_xml_rs::Error) -> Self {
        FerrumStreamError::ConfigError(value.to_string())
    }
}

impl From<std::io::Error> for FerrumStreamError {
    fn from(value: std::io::Error) -> Self {
        FerrumStreamError::IOError(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FerrumStreamError>;
