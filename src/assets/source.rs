use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{StripError, StripResult};
use crate::foundation::math::Fnv1a64;

/// Stable identity of an [`ImageSource`], used as the decode cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(pub u64);

#[derive(Clone, Debug)]
enum SourceKind {
    Encoded(Arc<[u8]>),
    File(PathBuf),
    Decoded(DecodedImage),
}

/// Where an image comes from: encoded bytes, a file on disk, or an already-decoded bitmap.
///
/// The identity key is computed once at construction so repeated cache lookups stay cheap.
#[derive(Clone, Debug)]
pub struct ImageSource {
    key: SourceKey,
    kind: SourceKind,
}

impl ImageSource {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let mut h = Fnv1a64::new_default();
        h.write_u8(1);
        h.write_u64(bytes.len() as u64);
        h.write_bytes(&bytes);
        Self {
            key: SourceKey(h.finish()),
            kind: SourceKind::Encoded(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut h = Fnv1a64::new_default();
        h.write_u8(2);
        h.write_bytes(path.to_string_lossy().as_bytes());
        Self {
            key: SourceKey(h.finish()),
            kind: SourceKind::File(path),
        }
    }

    pub fn from_decoded(image: DecodedImage) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u8(3);
        h.write_u64(u64::from(image.width));
        h.write_u64(u64::from(image.height));
        h.write_bytes(&image.rgba8_premul);
        Self {
            key: SourceKey(h.finish()),
            kind: SourceKind::Decoded(image),
        }
    }

    pub fn key(&self) -> SourceKey {
        self.key
    }

    /// File path, for sources read from disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            SourceKind::File(p) => Some(p),
            _ => None,
        }
    }

    /// Bitmap that needs no decoding, if this source carries one.
    pub fn decoded(&self) -> Option<&DecodedImage> {
        match &self.kind {
            SourceKind::Decoded(img) => Some(img),
            _ => None,
        }
    }

    /// Read and decode the source. Blocking; run it off the interactive thread.
    pub fn load(&self) -> StripResult<DecodedImage> {
        match &self.kind {
            SourceKind::Encoded(bytes) => decode_image(bytes),
            SourceKind::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    StripError::decode(format!("read image '{}': {e}", path.display()))
                })?;
                decode_image(&bytes).map_err(|e| match e {
                    StripError::Decode(msg) => {
                        StripError::decode(format!("'{}': {msg}", path.display()))
                    }
                    other => other,
                })
            }
            SourceKind::Decoded(img) => Ok(img.clone()),
        }
    }
}

impl From<DecodedImage> for ImageSource {
    fn from(image: DecodedImage) -> Self {
        Self::from_decoded(image)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::from_path(path)
    }
}
