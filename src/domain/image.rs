use {serde::Serialize, thiserror::Error};

/// An accepted promotion logo and its derivatives.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    #[serde(skip)]
    pub original: Vec<u8>,
    #[serde(skip)]
    pub large: Vec<u8>,
    #[serde(skip)]
    pub small: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("original", &self.original.len())
            .field("large", &self.large.len())
            .field("small", &self.small.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedImage {
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),

    #[error("image content does not match declared type {declared}")]
    ContentMismatch { declared: String },

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Decides whether an upload is an acceptable logo and produces its
/// derivatives. Synchronous so that intake validation stays free of I/O.
pub trait ImageIntake: Send + Sync {
    fn process(&self, bytes: &[u8], declared_name: &str) -> Result<ImageAsset, RejectedImage>;
}
