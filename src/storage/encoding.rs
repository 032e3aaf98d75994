//! Encoding-tolerant reads
//!
//! Sources arrive as UTF-8 or as one of the legacy 8-bit encodings used by
//! older Korean Oracle installations. UTF-8 is tried first, then each
//! configured legacy encoding in order.

use crate::{Error, Result};
use encoding_rs::Encoding;
use std::path::Path;

/// Ordered chain of fallback encodings
#[derive(Debug, Clone)]
pub struct Decoder {
    fallbacks: Vec<&'static Encoding>,
}

impl Decoder {
    /// Build a decoder from WHATWG labels.
    ///
    /// Labels resolving to an encoding already in the chain are tried once
    /// (`windows-949` resolves to the same decoder as `euc-kr`).
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut fallbacks: Vec<&'static Encoding> = Vec::new();
        for label in labels {
            match Encoding::for_label(label.as_ref().as_bytes()) {
                Some(encoding) if !fallbacks.contains(&encoding) => fallbacks.push(encoding),
                Some(_) => {}
                None => tracing::warn!("Ignoring unknown encoding label: {}", label.as_ref()),
            }
        }
        Self { fallbacks }
    }

    pub fn fallbacks(&self) -> &[&'static Encoding] {
        &self.fallbacks
    }

    /// Decode bytes, returning None when every encoding rejects them
    pub fn decode(&self, bytes: Vec<u8>) -> Option<String> {
        let bytes = match String::from_utf8(bytes) {
            Ok(text) => return Some(text),
            Err(err) => err.into_bytes(),
        };

        self.fallbacks.iter().find_map(|encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(&bytes)
                .map(|text| {
                    tracing::debug!("Decoded with fallback encoding {}", encoding.name());
                    text.into_owned()
                })
        })
    }

    /// Read and decode a file
    pub fn read(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        self.decode(bytes).ok_or_else(|| Error::Decode {
            path: path.to_path_buf(),
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::from_labels(crate::config::DEFAULT_ENCODINGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let decoder = Decoder::default();
        assert_eq!(decoder.decode("주문 SELECT".as_bytes().to_vec()).as_deref(), Some("주문 SELECT"));
    }

    #[test]
    fn test_euc_kr_fallback() {
        let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode("-- 주문 처리\nCREATE PROCEDURE p1 IS");
        assert!(!had_errors);
        assert!(std::str::from_utf8(&bytes).is_err());

        let decoded = Decoder::default().decode(bytes.into_owned()).unwrap();
        assert_eq!(decoded, "-- 주문 처리\nCREATE PROCEDURE p1 IS");
    }

    #[test]
    fn test_all_encodings_fail() {
        assert!(Decoder::default().decode(vec![b'a', 0xFF, 0xFF]).is_none());
    }

    #[test]
    fn test_duplicate_and_unknown_labels() {
        let decoder = Decoder::from_labels(&["euc-kr", "windows-949", "no-such-encoding"]);
        assert_eq!(decoder.fallbacks().len(), 1);
        assert_eq!(decoder.fallbacks()[0], encoding_rs::EUC_KR);
    }
}
