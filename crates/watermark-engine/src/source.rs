//! Logo pixel sources and the decode cache shared by preview and export.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use image::DynamicImage;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::EngineError;

/// Encoded logo bytes plus a content-derived identity.
///
/// Two sources with identical bytes share an id, so the decode cache never
/// decodes the same logo twice.
#[derive(Clone)]
pub struct PixelSource {
    id: String,
    name: String,
    bytes: Arc<[u8]>,
}

impl PixelSource {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let id = hex::encode(Sha256::digest(&bytes));
        Self {
            id,
            name: name.into(),
            bytes,
        }
    }

    /// Wrap an already-decoded image by encoding it as PNG.
    pub fn from_image(name: impl Into<String>, img: &DynamicImage) -> Result<Self, EngineError> {
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .map_err(|error| EngineError::Decode {
                source_id: String::from("<in-memory>"),
                error,
            })?;
        Ok(Self::from_bytes(name, buf.into_inner()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode without consulting any cache.
    pub fn decode(&self) -> Result<DynamicImage, EngineError> {
        image::load_from_memory(&self.bytes).map_err(|error| EngineError::Decode {
            source_id: self.id.clone(),
            error,
        })
    }
}

impl fmt::Debug for PixelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelSource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PartialEq for PixelSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Default)]
struct CacheState {
    images: HashMap<String, Arc<DynamicImage>>,
    order: VecDeque<String>,
}

/// Bounded cache of decoded logos keyed by source identity.
///
/// Oldest entries are evicted first once `limit` is exceeded. Failed decodes
/// are not cached.
pub struct DecodeCache {
    state: Mutex<CacheState>,
    limit: usize,
}

impl DecodeCache {
    pub const DEFAULT_LIMIT: usize = 64;

    pub fn new(limit: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            limit: limit.max(1),
        }
    }

    /// Return the decoded image for `source`, decoding on a miss.
    pub fn get_or_decode(&self, source: &PixelSource) -> Result<Arc<DynamicImage>, EngineError> {
        if let Some(hit) = self.lock().images.get(source.id()) {
            return Ok(Arc::clone(hit));
        }

        // Decode outside the lock; a concurrent miss on the same id just
        // decodes twice and the second insert is a no-op.
        let decoded = Arc::new(source.decode()?);
        debug!(
            id = source.id(),
            name = source.name(),
            w = decoded.width(),
            h = decoded.height(),
            "Decoded logo source"
        );

        let mut state = self.lock();
        if !state.images.contains_key(source.id()) {
            state
                .images
                .insert(source.id().to_string(), Arc::clone(&decoded));
            state.order.push_back(source.id().to_string());
            trim(&mut state, self.limit);
        }
        Ok(decoded)
    }

    pub fn len(&self) -> usize {
        self.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().images.contains_key(id)
    }

    /// Drop one entry, e.g. after its logo was removed.
    pub fn evict(&self, id: &str) {
        let mut state = self.lock();
        if state.images.remove(id).is_some() {
            state.order.retain(|k| k != id);
        }
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.images.clear();
        state.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DecodeCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

fn trim(state: &mut CacheState, limit: usize) {
    while state.order.len() > limit {
        let Some(oldest) = state.order.pop_front() else {
            break;
        };
        state.images.remove(&oldest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_source(name: &str, color: [u8; 4]) -> PixelSource {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba(color)));
        PixelSource::from_image(name, &img).unwrap()
    }

    #[test]
    fn identical_bytes_share_identity() {
        let a = png_source("a.png", [1, 2, 3, 255]);
        let b = PixelSource::from_bytes("renamed.png", a.bytes().to_vec());
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn cache_decodes_once_per_source() {
        let cache = DecodeCache::new(4);
        let src = png_source("logo.png", [10, 20, 30, 255]);

        let first = cache.get_or_decode(&src).unwrap();
        let second = cache.get_or_decode(&src).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((first.width(), first.height()), (3, 2));
    }

    #[test]
    fn cache_evicts_oldest_past_limit() {
        let cache = DecodeCache::new(2);
        let a = png_source("a", [1, 0, 0, 255]);
        let b = png_source("b", [2, 0, 0, 255]);
        let c = png_source("c", [3, 0, 0, 255]);

        cache.get_or_decode(&a).unwrap();
        cache.get_or_decode(&b).unwrap();
        cache.get_or_decode(&c).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(a.id()));
        assert!(cache.contains(c.id()));
    }

    #[test]
    fn corrupt_source_is_an_error_and_not_cached() {
        let cache = DecodeCache::default();
        let bad = PixelSource::from_bytes("bad.png", vec![0u8, 1, 2, 3]);
        assert!(matches!(
            cache.get_or_decode(&bad),
            Err(EngineError::Decode { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn evict_removes_entry() {
        let cache = DecodeCache::default();
        let src = png_source("x", [5, 5, 5, 255]);
        cache.get_or_decode(&src).unwrap();
        cache.evict(src.id());
        assert!(cache.is_empty());
    }
}
