/// Failure while decoding the binary spectrogram payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload too short for header: {0} bytes")]
    MissingHeader(usize),

    #[error("metadata truncated: need {expected} bytes, have {available}")]
    MetadataTruncated { expected: usize, available: usize },

    #[error("invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("spectrogram dimensions overflow: {n_freq_bins} x {n_frames}")]
    DimensionOverflow { n_freq_bins: usize, n_frames: usize },

    #[error("sample data truncated: need {expected} bytes, have {available}")]
    DataTruncated { expected: usize, available: usize },
}

/// Failure talking to the recording / segmentation service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("spectrogram decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("no browser window")]
    NoWindow,
}

impl ApiError {
    /// Convert a JS exception into a network error.
    pub fn from_js(value: wasm_bindgen::JsValue) -> Self {
        ApiError::Network(format!("{value:?}"))
    }
}

/// A selection that cannot become a segment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection needs both a start and an end")]
    Incomplete,

    #[error("selection is empty")]
    Empty,

    #[error("selection overlaps an existing segment")]
    Overlap,
}
