//! Crate-level error types.

use std::fmt;

/// Errors produced by the viso-postfx crate.
///
/// Everything here is raised at setup time or when a frame's inputs are
/// handed over. Per-pixel numerical edge cases never produce errors; the
/// passes degrade gracefully instead.
#[derive(Debug)]
pub enum PostFxError {
    /// A pass is enabled but no variant flag selects its branch.
    MissingVariant(&'static str),
    /// More than one mutually exclusive variant flag is set.
    ConflictingVariants(String),
    /// A variant flag carries a value no branch recognizes.
    UnknownVariant {
        /// Name of the flag.
        flag: String,
        /// Offending value, formatted.
        value: String,
    },
    /// A numeric tunable is outside its valid range.
    InvalidParameter {
        /// Dotted option path, e.g. `shadows.steps`.
        name: &'static str,
        /// Human-readable constraint that was violated.
        reason: String,
    },
    /// The selected background variant needs an asset that was not
    /// attached.
    MissingAsset(&'static str),
    /// More lights than the shadow pass supports.
    TooManyLights {
        /// Lights requested.
        requested: usize,
        /// Fixed capacity.
        capacity: usize,
    },
    /// An input buffer does not match the pipeline resolution.
    BufferSize {
        /// Which buffer was rejected.
        buffer: &'static str,
        /// Expected `(width, height)`.
        expected: (u32, u32),
        /// Actual `(width, height)`.
        actual: (u32, u32),
    },
    /// A depth buffer's encoding disagrees with the resolved decode path.
    DepthEncoding(&'static str),
    /// Camera matrices or clip planes are unusable.
    InvalidCamera(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML/JSON options parsing or serialization failure.
    OptionsParse(String),
}

impl fmt::Display for PostFxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariant(pass) => {
                write!(f, "no variant selected for {pass}")
            }
            Self::ConflictingVariants(flags) => {
                write!(f, "conflicting variant flags: {flags}")
            }
            Self::UnknownVariant { flag, value } => {
                write!(f, "unknown value {value} for variant flag {flag}")
            }
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter {name}: {reason}")
            }
            Self::MissingAsset(asset) => {
                write!(f, "background asset not attached: {asset}")
            }
            Self::TooManyLights {
                requested,
                capacity,
            } => write!(
                f,
                "{requested} lights requested, shadow pass supports \
                 {capacity}"
            ),
            Self::BufferSize {
                buffer,
                expected,
                actual,
            } => write!(
                f,
                "{buffer} buffer is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::DepthEncoding(msg) => write!(f, "depth encoding: {msg}"),
            Self::InvalidCamera(msg) => write!(f, "invalid camera: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for PostFxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PostFxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Check `value` against an inclusive range, naming the option on failure.
pub(crate) fn check_range(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), PostFxError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(PostFxError::InvalidParameter {
            name,
            reason: format!("{value} is outside [{min}, {max}]"),
        })
    }
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn check_positive(
    name: &'static str,
    value: f32,
) -> Result<(), PostFxError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PostFxError::InvalidParameter {
            name,
            reason: format!("{value} must be positive"),
        })
    }
}
