//! Versioned share-code codec.
//!
//! Wire format: `v1_` + urlsafe-base64(gzip(compact-JSON(EmbeddedEvent))),
//! with `+`→`-`, `/`→`_` and no `=` padding so the code survives URLs and
//! QR scanners. Codes from the first app generation carry no prefix and
//! are decoded as v1. `v2` is reserved for a binary format and fails
//! closed until it exists; so does any other recognized version prefix.

use crate::codec::compress::{Compressor, GzipCompressor};
use crate::error::{ClaqueError, Result};
use crate::event::{EmbeddedEvent, Event};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::HashSet;
use tracing::debug;

const V1_PREFIX: &str = "v1_";

/// Known share-code format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecVersion {
    /// JSON + gzip + urlsafe base64.
    V1,
    /// Reserved binary format. Defined so the dispatch is explicit, but
    /// deliberately unimplemented: decoding fails closed.
    V2,
}

/// Size diagnostics for a would-be share code. Not load-bearing; used to
/// regression-test payloads against the QR capacity budget.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    pub original_size: usize,
    pub compressed_size: usize,
    pub ratio: f64,
    pub code_length: usize,
}

/// Event ↔ share-code codec over a pluggable compressor.
pub struct EventCodec {
    compressor: Box<dyn Compressor>,
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new(Box::new(GzipCompressor))
    }
}

impl EventCodec {
    pub fn new(compressor: Box<dyn Compressor>) -> Self {
        Self { compressor }
    }

    /// Encode an event into a URL-safe share code.
    pub fn encode(&self, event: &Event) -> Result<String> {
        let embedded = event.to_embedded();
        let json = serde_json::to_vec(&embedded)?;
        let packed = self.compressor.compress(&json)?;
        let code = format!("{V1_PREFIX}{}", URL_SAFE_NO_PAD.encode(&packed));
        debug!(
            json_bytes = json.len(),
            packed_bytes = packed.len(),
            code_chars = code.len(),
            "event encoded"
        );
        Ok(code)
    }

    /// Decode a share code into a validated event with defaults applied.
    ///
    /// Fails with a typed error, never a partial event: unrecognized
    /// version, bad base64, corrupt payload, malformed JSON and missing
    /// required fields each surface distinctly.
    pub fn decode(&self, code: &str) -> Result<Event> {
        let (version, payload) = split_version(code.trim())?;
        match version {
            CodecVersion::V1 => self.decode_v1(payload),
            CodecVersion::V2 => Err(ClaqueError::ShareCodeVersion {
                version: "v2".to_string(),
            }),
        }
    }

    fn decode_v1(&self, payload: &str) -> Result<Event> {
        // Tolerate padding some URL handlers re-add.
        let trimmed = payload.trim_end_matches('=');
        let packed =
            URL_SAFE_NO_PAD
                .decode(trimmed)
                .map_err(|e| ClaqueError::ShareCodeEncoding {
                    message: e.to_string(),
                })?;
        let json = self.compressor.decompress(&packed)?;
        let embedded: EmbeddedEvent = serde_json::from_slice(&json)?;
        validate(&embedded)?;
        debug!(
            packed_bytes = packed.len(),
            json_bytes = json.len(),
            actions = embedded.timeline.len(),
            "event decoded"
        );
        Ok(Event::from_embedded(embedded))
    }

    /// Size diagnostics for an event's share code.
    pub fn stats(&self, event: &Event) -> Result<CompressionStats> {
        let json = serde_json::to_vec(&event.to_embedded())?;
        let packed = self.compressor.compress(&json)?;
        let code_length = V1_PREFIX.len() + URL_SAFE_NO_PAD.encode(&packed).len();
        Ok(CompressionStats {
            original_size: json.len(),
            compressed_size: packed.len(),
            ratio: if json.is_empty() {
                1.0
            } else {
                packed.len() as f64 / json.len() as f64
            },
            code_length,
        })
    }
}

/// Encode with the default gzip codec.
pub fn encode_event(event: &Event) -> Result<String> {
    EventCodec::default().encode(event)
}

/// Decode with the default gzip codec.
pub fn decode_event(code: &str) -> Result<Event> {
    EventCodec::default().decode(code)
}

/// Split a recognized version prefix off the payload. A prefix shaped
/// `v<digits>_` that is not a known version fails closed; anything else is
/// a legacy unprefixed v1 payload.
fn split_version(code: &str) -> Result<(CodecVersion, &str)> {
    if let Some(payload) = code.strip_prefix(V1_PREFIX) {
        return Ok((CodecVersion::V1, payload));
    }
    if let Some(payload) = code.strip_prefix("v2_") {
        return Ok((CodecVersion::V2, payload));
    }
    if let Some(version) = version_prefix(code) {
        return Err(ClaqueError::ShareCodeVersion {
            version: version.to_string(),
        });
    }
    Ok((CodecVersion::V1, code))
}

/// `v<digits>` when the string starts with a version tag, else None.
fn version_prefix(code: &str) -> Option<&str> {
    let rest = code.strip_prefix('v')?;
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    if rest[digits..].starts_with('_') {
        Some(&code[..1 + digits])
    } else {
        None
    }
}

fn validate(embedded: &EmbeddedEvent) -> Result<()> {
    if embedded.title.trim().is_empty() {
        return Err(invalid("title", "must not be empty"));
    }
    if embedded.timezone.trim().is_empty() {
        return Err(invalid("timezone", "must not be empty"));
    }
    if embedded.timeline.is_empty() {
        return Err(invalid("timeline", "must contain at least one action"));
    }
    let mut ids = HashSet::new();
    for action in &embedded.timeline {
        if action.id.trim().is_empty() {
            return Err(invalid("timeline", "action id must not be empty"));
        }
        if !ids.insert(action.id.as_str()) {
            return Err(invalid(
                "timeline",
                &format!("duplicate action id: {}", action.id),
            ));
        }
        if action.action.trim().is_empty() {
            return Err(invalid(
                "timeline",
                &format!("action {} has no text", action.id),
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> ClaqueError {
    ClaqueError::EventValidation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
