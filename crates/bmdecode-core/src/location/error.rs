use thiserror::Error;

use super::vocabulary::DataTypeName;

/// Errors raised while deriving channels for a single datum.
///
/// # Examples
/// ```
/// use bmdecode_core::{DataTypeName, FormatError};
///
/// let err = FormatError::MissingChannelData { name: DataTypeName::SpeedStd };
/// assert!(err.to_string().contains("aanderaa_abs_speed_std_15bits"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing channel data: {name}")]
    MissingChannelData { name: DataTypeName },
}
