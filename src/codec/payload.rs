//! Binary spectrogram payload.
//!
//! ```text
//! [0, 4)        u32 LE  metadata length M
//! [4, 4+M)      UTF-8 JSON {n_freq_bins, n_frames, duration, sample_rate}
//! [4+M, ...)    n_freq_bins * n_frames binary16 values, LE, row-major by frequency
//! ```
//!
//! The sample section may start at an odd offset. Codes are assembled from
//! byte pairs, so no aligned copy is needed.

use serde::Deserialize;
use crate::codec::half::decode_f16_le;
use crate::error::DecodeError;

const HEADER_LEN: usize = 4;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpectrogramMeta {
    pub n_freq_bins: usize,
    pub n_frames: usize,
    /// Seconds covered by all frames.
    pub duration: f64,
    #[serde(default)]
    pub sample_rate: Option<f64>,
}

impl SpectrogramMeta {
    /// Highest represented frequency, if the sample rate is known.
    pub fn nyquist(&self) -> Option<f64> {
        self.sample_rate.filter(|sr| *sr > 0.0).map(|sr| sr / 2.0)
    }
}

/// Decoded payload: `values[freq * n_frames + frame]`.
#[derive(Clone, Debug)]
pub struct SpectrogramPayload {
    pub meta: SpectrogramMeta,
    pub values: Vec<f32>,
}

impl SpectrogramPayload {
    #[inline]
    pub fn value(&self, freq: usize, frame: usize) -> f32 {
        self.values[freq * self.meta.n_frames + frame]
    }
}

/// Decode a complete payload buffer.
pub fn decode_payload(bytes: &[u8]) -> Result<SpectrogramPayload, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::MissingHeader(bytes.len()));
    }
    let meta_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let truncated = DecodeError::MetadataTruncated {
        expected: meta_len,
        available: bytes.len() - HEADER_LEN,
    };
    let data_offset = match HEADER_LEN.checked_add(meta_len) {
        Some(end) if end <= bytes.len() => end,
        _ => return Err(truncated),
    };

    let meta: SpectrogramMeta = serde_json::from_slice(&bytes[HEADER_LEN..data_offset])?;

    let count = meta
        .n_freq_bins
        .checked_mul(meta.n_frames)
        .filter(|n| n.checked_mul(2).is_some())
        .ok_or(DecodeError::DimensionOverflow {
            n_freq_bins: meta.n_freq_bins,
            n_frames: meta.n_frames,
        })?;
    let expected = count * 2;
    let data = &bytes[data_offset..];
    if data.len() < expected {
        return Err(DecodeError::DataTruncated { expected, available: data.len() });
    }
    if data.len() > expected {
        log::warn!(
            "Spectrogram payload has {} trailing bytes, ignoring",
            data.len() - expected
        );
    }

    let values = decode_f16_le(&data[..expected]);
    Ok(SpectrogramPayload { meta, values })
}

/// Collects a streamed response body and reports download progress.
#[derive(Debug, Default)]
pub struct PayloadAccumulator {
    buf: Vec<u8>,
    expected_len: Option<usize>,
}

impl PayloadAccumulator {
    pub fn new(expected_len: Option<usize>) -> Self {
        let buf = match expected_len {
            Some(n) => Vec::with_capacity(n),
            None => Vec::new(),
        };
        Self { buf, expected_len }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub fn received(&self) -> usize {
        self.buf.len()
    }

    /// Fraction in `[0, 1]`, or `None` when the total size is unknown.
    pub fn progress(&self) -> Option<f32> {
        match self.expected_len {
            Some(total) if total > 0 => Some((self.buf.len() as f32 / total as f32).min(1.0)),
            _ => None,
        }
    }

    pub fn finish(self) -> Result<SpectrogramPayload, DecodeError> {
        decode_payload(&self.buf)
    }
}

/// Build a payload buffer.
#[cfg(test)]
pub(crate) fn encode_payload(meta_json: &str, codes: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + meta_json.len() + codes.len() * 2);
    out.extend_from_slice(&(meta_json.len() as u32).to_le_bytes());
    out.extend_from_slice(meta_json.as_bytes());
    for code in codes {
        out.extend_from_slice(&code.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"{"n_freq_bins":2,"n_frames":3,"duration":1.5,"sample_rate":48000}"#;

    #[test]
    fn test_decode_row_major() {
        let codes = [0x0000, 0x3C00, 0x4000, 0x3800, 0x4200, 0x4400];
        let payload = decode_payload(&encode_payload(META, &codes)).unwrap();
        assert_eq!(payload.meta.n_freq_bins, 2);
        assert_eq!(payload.meta.n_frames, 3);
        assert_eq!(payload.meta.nyquist(), Some(24_000.0));
        assert_eq!(payload.value(0, 1), 1.0);
        assert_eq!(payload.value(1, 0), 0.5);
        assert_eq!(payload.value(1, 2), 4.0);
    }

    #[test]
    fn test_odd_data_offset() {
        // 4 + 65 = 69: odd offset
        let meta = r#"{"n_freq_bins":1,"n_frames":2,"duration":1.0,"sample_rate":null} "#;
        assert_eq!((4 + meta.len()) % 2, 1);
        let payload = decode_payload(&encode_payload(meta, &[0x3C00, 0xC000])).unwrap();
        assert_eq!(payload.values, vec![1.0, -2.0]);
        assert_eq!(payload.meta.nyquist(), None);
    }

    #[test]
    fn test_truncated_data_rejected() {
        let mut bytes = encode_payload(META, &[0x3C00; 6]);
        bytes.pop();
        match decode_payload(&bytes) {
            Err(DecodeError::DataTruncated { expected: 12, available: 11 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncated_header_and_metadata() {
        assert!(matches!(decode_payload(&[1, 0]), Err(DecodeError::MissingHeader(2))));
        let mut bytes = encode_payload(META, &[]);
        bytes.truncate(10);
        assert!(matches!(decode_payload(&bytes), Err(DecodeError::MetadataTruncated { .. })));
    }

    #[test]
    fn test_huge_metadata_length_is_an_error() {
        let mut bytes = 0xFFFF_FFFEu32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        match decode_payload(&bytes) {
            Err(DecodeError::MetadataTruncated { expected: 0xFFFF_FFFE, available: 2 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_metadata_json() {
        let bytes = encode_payload("{not json", &[]);
        assert!(matches!(decode_payload(&bytes), Err(DecodeError::Metadata(_))));
    }

    #[test]
    fn test_accumulator_progress() {
        let bytes = encode_payload(META, &[0x3C00; 6]);
        let mut acc = PayloadAccumulator::new(Some(bytes.len()));
        assert_eq!(acc.progress(), Some(0.0));
        let (a, b) = bytes.split_at(bytes.len() / 2);
        acc.push(a);
        let p = acc.progress().unwrap();
        assert!(p > 0.4 && p < 0.6);
        acc.push(b);
        assert_eq!(acc.progress(), Some(1.0));
        let payload = acc.finish().unwrap();
        assert_eq!(payload.values.len(), 6);
        assert_eq!(PayloadAccumulator::new(None).progress(), None);
    }
}
