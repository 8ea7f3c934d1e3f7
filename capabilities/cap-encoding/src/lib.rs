//! # cap-encoding
//!
//! Text/byte conversions for guest code: UTF-8 in both directions and
//! standard base64 for byte transport.
//!
//! All operations are synchronous, bounded, CPU-only and hard-available;
//! the only per-call failure is [`OpError::InvalidInput`] on malformed input.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use glyphgate_runtime::{
    CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier, OpError, OpResult,
};
use std::any::Any;
use std::sync::Arc;

/// Export surface of the encoding capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "encoding",
    operations: &["encode_utf8", "decode_utf8", "encode_base64", "decode_base64"],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "encoding")
}

/// Default factory.
pub fn factory() -> CapabilityFactory {
    Box::new(|| Ok(Arc::new(EncodingCapability::new())))
}

/// Text/byte conversion operations.
pub struct EncodingCapability;

impl EncodingCapability {
    /// Create the capability.
    pub fn new() -> Self {
        Self
    }

    /// Encode text as UTF-8 bytes. Infallible.
    pub fn encode_utf8(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    /// Decode UTF-8 bytes into text.
    ///
    /// Errors: `InvalidInput` naming the byte offset of the first malformed
    /// sequence.
    pub fn decode_utf8(&self, bytes: &[u8]) -> OpResult<String> {
        String::from_utf8(bytes.to_vec()).map_err(|err| {
            OpError::InvalidInput(format!(
                "invalid UTF-8 at byte {}",
                err.utf8_error().valid_up_to()
            ))
        })
    }

    /// Encode bytes as standard base64 text. Infallible.
    pub fn encode_base64(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    /// Decode standard base64 text into bytes.
    ///
    /// Errors: `InvalidInput` for malformed base64.
    pub fn decode_base64(&self, text: &str) -> OpResult<Vec<u8>> {
        STANDARD
            .decode(text)
            .map_err(|err| OpError::InvalidInput(format!("invalid base64: {err}")))
    }
}

impl Default for EncodingCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityModule for EncodingCapability {
    fn contract(&self) -> &'static CapabilityContract {
        &CONTRACT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_is_valid() {
        assert!(CONTRACT.validate().is_ok());
        assert!(CONTRACT.has_operation("decode_base64"));
    }

    #[test]
    fn test_utf8_decode_accepts_valid_text() {
        let encoding = EncodingCapability::new();
        let bytes = encoding.encode_utf8("héllo wörld");
        assert_eq!(encoding.decode_utf8(&bytes).unwrap(), "héllo wörld");
    }

    #[test]
    fn test_utf8_decode_rejects_malformed_bytes() {
        let encoding = EncodingCapability::new();
        let err = encoding.decode_utf8(&[b'o', b'k', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, OpError::InvalidInput(_)));
        // The offset of the first bad byte is part of the message.
        assert!(err.to_string().contains("byte 2"));
    }

    #[test]
    fn test_base64_known_vector() {
        let encoding = EncodingCapability::new();
        assert_eq!(encoding.encode_base64(b"glyphgate"), "Z2x5cGhnYXRl");
        assert_eq!(
            encoding.decode_base64("Z2x5cGhnYXRl").unwrap(),
            b"glyphgate"
        );
    }

    #[test]
    fn test_base64_rejects_malformed_text() {
        let encoding = EncodingCapability::new();
        let err = encoding.decode_base64("not@base64!").unwrap_err();
        assert!(matches!(err, OpError::InvalidInput(_)));
        assert_eq!(err.kind(), "invalid_input");
    }
}
