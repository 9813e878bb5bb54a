//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("WATERMARK_INPUT_DIR", "input", "Directory of base images for the batch run"),
    ("WATERMARK_LOGOS", "", "Comma-separated logo file paths, in paint order"),
    ("WATERMARK_OUTPUT_DIR", "output", "Directory the watermarked files are written to"),
    ("WATERMARK_PATTERN_MODE", "false", "Tile every logo as a repeating pattern"),
    ("WATERMARK_LOGO_SETTINGS", "", "Optional JSON file with per-logo parameter updates"),
    ("WATERMARK_MAX_IMAGE_BYTES", "10MiB", "Upload size limit for images and logos"),
    ("WATERMARK_DECODE_CACHE_LIMIT", "64", "Decoded logos kept in memory"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
