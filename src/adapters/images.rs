use {
    crate::domain::image::{ImageAsset, ImageIntake, RejectedImage},
    std::{path::Path, sync::Arc},
};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";

pub const DEFAULT_MAX_LOGO_BYTES: usize = 256 * 1024;

/// Produces the `(large, small)` derivatives of an accepted image.
pub trait Thumbnailer: Send + Sync {
    fn derive(&self, original: &[u8], mime_type: &str) -> Result<(Vec<u8>, Vec<u8>), RejectedImage>;
}

/// Uses the original bytes for both derivatives; resizing happens downstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOriginal;

impl Thumbnailer for KeepOriginal {
    fn derive(&self, original: &[u8], _mime_type: &str) -> Result<(Vec<u8>, Vec<u8>), RejectedImage> {
        Ok((original.to_vec(), original.to_vec()))
    }
}

/// Accepts PNG and JPEG logos. The declared file extension picks the type
/// and the leading bytes must agree with it.
#[derive(Clone)]
pub struct SniffingImageIntake {
    max_bytes: usize,
    thumbnailer: Arc<dyn Thumbnailer>,
}

impl Default for SniffingImageIntake {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOGO_BYTES)
    }
}

impl SniffingImageIntake {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            thumbnailer: Arc::new(KeepOriginal),
        }
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn Thumbnailer>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }
}

fn declared_type(declared_name: &str) -> Result<(&'static str, &'static [u8]), RejectedImage> {
    let extension = Path::new(declared_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok(("image/png", PNG_MAGIC)),
        "jpg" | "jpeg" => Ok(("image/jpeg", JPEG_MAGIC)),
        "" => Err(RejectedImage::UnsupportedFormat(format!(
            "no extension on {declared_name:?}"
        ))),
        other => Err(RejectedImage::UnsupportedFormat(other.to_string())),
    }
}

impl ImageIntake for SniffingImageIntake {
    fn process(&self, bytes: &[u8], declared_name: &str) -> Result<ImageAsset, RejectedImage> {
        let (mime_type, magic) = declared_type(declared_name)?;

        if bytes.len() > self.max_bytes {
            return Err(RejectedImage::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }
        if !bytes.starts_with(magic) {
            return Err(RejectedImage::ContentMismatch {
                declared: mime_type.to_string(),
            });
        }

        let (large, small) = self.thumbnailer.derive(bytes, mime_type)?;
        Ok(ImageAsset {
            original: bytes.to_vec(),
            large,
            small,
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(b"\0\0\0\rIHDR");
        bytes
    }

    #[test]
    fn accepts_png() {
        let asset = SniffingImageIntake::default().process(&png(), "logo.png").unwrap();
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.original, png());
    }

    #[test]
    fn accepts_uppercase_jpeg_extension() {
        let asset = SniffingImageIntake::default()
            .process(b"\xff\xd8\xff\xe0rest", "LOGO.JPG")
            .unwrap();
        assert_eq!(asset.mime_type, "image/jpeg");
    }

    #[test]
    fn rejects_gif_even_with_png_bytes() {
        let err = SniffingImageIntake::default()
            .process(&png(), "logo.gif")
            .unwrap_err();
        assert_eq!(err, RejectedImage::UnsupportedFormat("gif".into()));
    }

    #[test]
    fn rejects_mismatched_content() {
        let err = SniffingImageIntake::default()
            .process(b"GIF89a", "logo.png")
            .unwrap_err();
        assert!(matches!(err, RejectedImage::ContentMismatch { .. }));
    }

    #[test]
    fn rejects_oversized_upload() {
        let err = SniffingImageIntake::new(4).process(&png(), "logo.png").unwrap_err();
        assert!(matches!(err, RejectedImage::TooLarge { limit: 4, .. }));
    }

    struct Halves;

    impl Thumbnailer for Halves {
        fn derive(&self, original: &[u8], _: &str) -> Result<(Vec<u8>, Vec<u8>), RejectedImage> {
            let half = original.len() / 2;
            Ok((original[..half].to_vec(), original[..half / 2].to_vec()))
        }
    }

    #[test]
    fn uses_configured_thumbnailer() {
        let intake = SniffingImageIntake::default().with_thumbnailer(Arc::new(Halves));
        let asset = intake.process(&png(), "logo.png").unwrap();
        assert_eq!(asset.large.len(), png().len() / 2);
        assert_eq!(asset.small.len(), png().len() / 4);
    }
}
