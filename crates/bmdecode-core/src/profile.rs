use serde::Deserialize;
use thiserror::Error;

use crate::binary::layout;
use crate::{DecodeError, DecodedChannel, DescriptorError, StructDescriptor, decode_payload_to_structs};

/// Names accepted by [`DecoderProfile::builtin`].
pub const BUILTIN_PROFILES: [&str; 2] = ["dvt1", "rbr-coda"];

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid profile descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("profile declares no channels")]
    NoChannels,
}

/// A struct descriptor paired with the channel names it decodes into.
///
/// # Examples
/// ```
/// use bmdecode_core::DecoderProfile;
///
/// let profile = DecoderProfile::from_json(r#"{
///     "name": "counter",
///     "fields": [["uint16_t", "sample_count"], ["float", "mean"]],
///     "channels": ["A", "B"]
/// }"#)?;
/// assert_eq!(profile.descriptor.size_bytes(), 6);
/// assert_eq!(profile.payload_hex_len(), 24);
/// # Ok::<(), bmdecode_core::ProfileError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderProfile {
    pub name: String,
    pub descriptor: StructDescriptor,
    pub channels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    name: Option<String>,
    fields: Vec<(String, String)>,
    channels: Vec<String>,
}

impl DecoderProfile {
    /// Aanderaa adapter DVT1: nine channels of float32 statistics.
    pub fn dvt1() -> Self {
        Self {
            name: "dvt1".to_string(),
            descriptor: StructDescriptor::dvt1(),
            channels: layout::DVT1_CHANNELS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// RBR CODA: one channel of float64 statistics.
    pub fn rbr_coda() -> Self {
        Self {
            name: "rbr-coda".to_string(),
            descriptor: StructDescriptor::rbr_coda(),
            channels: layout::RBR_CODA_CHANNELS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "dvt1" => Some(Self::dvt1()),
            "rbr-coda" => Some(Self::rbr_coda()),
            _ => None,
        }
    }

    /// Parse a profile from its JSON form.
    ///
    /// # Errors
    /// Malformed JSON, an invalid descriptor, or an empty channel list.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let file: ProfileFile = serde_json::from_str(json)?;
        if file.channels.is_empty() {
            return Err(ProfileError::NoChannels);
        }
        Ok(Self {
            name: file.name.unwrap_or_else(|| "custom".to_string()),
            descriptor: StructDescriptor::from_tags(file.fields)?,
            channels: file.channels,
        })
    }

    /// Expected hex length of a full payload for this profile.
    pub fn payload_hex_len(&self) -> usize {
        self.channels.len() * self.descriptor.hex_len()
    }

    pub fn decode(&self, hex_payload: &str) -> Result<Vec<DecodedChannel>, DecodeError> {
        decode_payload_to_structs(hex_payload, &self.channels, &self.descriptor)
    }
}
