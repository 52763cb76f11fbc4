use std::{error::Error, fmt, io, path::PathBuf};

use crate::domain::KnobKind;

/// The tuner's result type.
pub type Result<T> = std::result::Result<T, TunerError>;

/// All errors that can occur while snapping, generating or scoring series.
#[derive(Debug)]
pub enum TunerError {
    /// A requested knob value is not a finite number.
    InvalidParameter { knob: KnobKind, value: f64 },
    /// The domain declares a knob the parameter set does not carry.
    MissingKnob(KnobKind),
    /// Metrics were requested over a series without points.
    EmptySeries,
    /// The actual and predicted series differ in length.
    LengthMismatch { actual: usize, predicted: usize },
    /// A charges fixture holds fewer records than the requested sample count.
    FixtureTooShort { needed: usize, available: usize },
    /// Two tuples of a domain encode to the same cache key.
    DuplicateKey(String),
    /// Invalid configuration, caught before any cache is built.
    InvalidConfig(String),
    /// A fixture or config file could not be decoded.
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    /// A fixture or config file could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for TunerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { knob, value } => {
                write!(f, "invalid value for {knob}: {value}")
            }
            Self::MissingKnob(knob) => write!(f, "missing field: {knob}"),
            Self::EmptySeries => write!(f, "cannot compute metrics over an empty series"),
            Self::LengthMismatch { actual, predicted } => write!(
                f,
                "series length mismatch: {actual} actual values, {predicted} predicted values"
            ),
            Self::FixtureTooShort { needed, available } => write!(
                f,
                "charges fixture has {available} record(s), {needed} needed"
            ),
            Self::DuplicateKey(key) => {
                write!(f, "more than one parameter tuple encodes as {key}")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Json {
                path: Some(path),
                source,
            } => write!(f, "invalid JSON in '{}': {source}", path.display()),
            Self::Json { path: None, source } => write!(f, "invalid JSON: {source}"),
            Self::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
        }
    }
}

impl Error for TunerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TunerError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { path: None, source }
    }
}

impl TunerError {
    /// Whether the error was caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. } | Self::MissingKnob(_))
    }
}
