//! Runtime configuration.

use std::path::PathBuf;

use mindmap_canvas::DVec2;
use tracing::warn;

/// Collection and id of the single shared document.
pub const DEFAULT_DOCUMENT_ID: &str = "mindMaps/defaultMap";

/// Viewport assumed when the caller does not say.
pub const DEFAULT_VIEWPORT: DVec2 = DVec2::new(1280.0, 800.0);

/// Configuration for a mind map session.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Data directory for RocksDB storage
    pub data_dir: PathBuf,

    /// Remote document address
    pub document_id: String,

    /// Viewport size in device pixels, for zoom-to-fit
    pub viewport: DVec2,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./mindmap-data"),
            document_id: DEFAULT_DOCUMENT_ID.to_string(),
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl SyncConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// - `MINDMAP_DATA_DIR`
    /// - `MINDMAP_DOCUMENT`
    /// - `MINDMAP_VIEWPORT` as `WIDTHxHEIGHT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("MINDMAP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let document_id = lookup("MINDMAP_DOCUMENT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.document_id);

        let viewport = match lookup("MINDMAP_VIEWPORT") {
            Some(raw) => parse_viewport(&raw).unwrap_or_else(|| {
                warn!("Invalid MINDMAP_VIEWPORT {:?}, using {}x{}", raw, DEFAULT_VIEWPORT.x, DEFAULT_VIEWPORT.y);
                defaults.viewport
            }),
            None => defaults.viewport,
        };

        Self {
            data_dir,
            document_id,
            viewport,
        }
    }
}

/// Parse `WIDTHxHEIGHT` with both sides positive.
pub fn parse_viewport(raw: &str) -> Option<DVec2> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()).then(|| DVec2::new(w, h))
}
