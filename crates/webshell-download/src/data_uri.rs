// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `data:` URI parsing and base64 payload decoding.
//
// The payload is everything after the first comma. Decoding uses the standard
// alphabet and is lenient the same way the platform's default decoder is:
// padding may be present or absent, non-zero trailing bits in the last symbol
// are dropped, and line breaks or spaces inside the payload are skipped.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use webshell_core::error::{Result, ShellError};

/// Standard alphabet, padding optional, trailing bits ignored.
pub const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A `data:` URI split into its header and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Everything between `data:` and the comma, e.g. `application/pdf;base64`.
    pub header: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a `data:` URI. The caller has already checked the scheme.
    pub fn parse(source: &'a str) -> Result<Self> {
        let rest = source.get(5..).unwrap_or_default();
        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            ShellError::Decode("data URI has no ',' separating header and payload".into())
        })?;
        Ok(Self { header, payload })
    }

    /// Media type from the header, when one is declared.
    pub fn media_type(&self) -> Option<&'a str> {
        let media = self.header.split(';').next().unwrap_or_default().trim();
        (!media.is_empty()).then_some(media)
    }

    /// Decode the payload as base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_payload(self.payload)
    }
}

/// Decode a base64 payload, skipping ASCII whitespace.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let decoded = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        LENIENT_STANDARD.decode(compact)
    } else {
        LENIENT_STANDARD.decode(payload)
    };
    decoded.map_err(|e| ShellError::Decode(e.to_string()))
}
