//! Color palette and its on-chain encoding.
//!
//! The client works in `#rrggbb` hex strings while the contract stores each
//! palette entry as a single byte. The byte is treated as 3-3-2 quantized
//! RGB (`rrrgggbb`): encoding keeps the top 3/3/2 bits of each channel,
//! decoding expands by bit replication. The quantization is lossy for
//! arbitrary client colors, but `encode(decode(byte)) == byte` holds for
//! every byte, so on-chain values survive a read/edit/write round trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Landing page color scheme, as hex color strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPalette {
    pub background: String,
    pub primary: String,
    pub secondary: String,
    pub text: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            primary: "#007bff".to_string(),
            secondary: "#6c757d".to_string(),
            text: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must be a #rrggbb hex string, got {0:?}")]
    Malformed(String),
}

/// Quantize a `#rrggbb` color into one on-chain byte (`rrrgggbb`).
pub fn encode_color(color: &str) -> Result<u8, ColorError> {
    let hex_part = color
        .strip_prefix('#')
        .ok_or_else(|| ColorError::Malformed(color.to_string()))?;
    if hex_part.len() != 6 {
        return Err(ColorError::Malformed(color.to_string()));
    }
    let channels = hex::decode(hex_part).map_err(|_| ColorError::Malformed(color.to_string()))?;

    let r = channels[0] >> 5;
    let g = channels[1] >> 5;
    let b = channels[2] >> 6;
    Ok((r << 5) | (g << 2) | b)
}

/// Expand an on-chain color byte back into a `#rrggbb` hex string.
pub fn decode_color(byte: u8) -> String {
    let r3 = byte >> 5;
    let g3 = (byte >> 2) & 0b111;
    let b2 = byte & 0b11;

    // bit replication: abc -> abcabcab, ab -> abababab
    let r = (r3 << 5) | (r3 << 2) | (r3 >> 1);
    let g = (g3 << 5) | (g3 << 2) | (g3 >> 1);
    let b = (b2 << 6) | (b2 << 4) | (b2 << 2) | b2;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

impl ColorPalette {
    /// Encode the palette as the four on-chain bytes
    /// `(text, secondary, primary, background)`.
    pub fn to_onchain(&self) -> Result<(u8, u8, u8, u8), ColorError> {
        Ok((
            encode_color(&self.text)?,
            encode_color(&self.secondary)?,
            encode_color(&self.primary)?,
            encode_color(&self.background)?,
        ))
    }

    /// Rebuild a palette from the four on-chain bytes.
    pub fn from_onchain(text: u8, secondary: u8, primary: u8, background: u8) -> Self {
        Self {
            background: decode_color(background),
            primary: decode_color(primary),
            secondary: decode_color(secondary),
            text: decode_color(text),
        }
    }
}
