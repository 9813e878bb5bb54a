//! Runtime configuration loaded from the environment.

use std::path::PathBuf;

use watermark_engine::DecodeCache;

use super::defaults::get_default;
use super::validation::{parse_byte_size, split_list, validate_setting};
use crate::media::{MAX_IMAGE_BYTES, UploadPolicy};

/// Runtime configuration for the batch runner.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub logos: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub pattern_mode: bool,
    pub logo_settings: Option<PathBuf>,
    pub max_image_bytes: usize,
    pub decode_cache_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: "input".into(),
            logos: Vec::new(),
            output_dir: "output".into(),
            pattern_mode: false,
            logo_settings: None,
            max_image_bytes: MAX_IMAGE_BYTES,
            decode_cache_limit: DecodeCache::DEFAULT_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or empty keys take their
    /// default; invalid values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            let default = get_default(key).unwrap_or_default();
            let value = lookup(key).unwrap_or_default();
            if value.is_empty() {
                return default.to_string();
            }
            match validate_setting(key, &value) {
                Ok(()) => value,
                Err(e) => {
                    tracing::warn!("Invalid {key}={value:?} ({e}), using default {default:?}");
                    default.to_string()
                }
            }
        };

        let logos = g("WATERMARK_LOGOS");
        let settings = g("WATERMARK_LOGO_SETTINGS");

        Self {
            input_dir: g("WATERMARK_INPUT_DIR").into(),
            logos: if logos.is_empty() {
                Vec::new()
            } else {
                split_list(&logos).map(PathBuf::from).collect()
            },
            output_dir: g("WATERMARK_OUTPUT_DIR").into(),
            pattern_mode: g("WATERMARK_PATTERN_MODE") == "true",
            logo_settings: (!settings.is_empty()).then(|| settings.into()),
            max_image_bytes: parse_byte_size(&g("WATERMARK_MAX_IMAGE_BYTES"))
                .ok()
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(MAX_IMAGE_BYTES),
            decode_cache_limit: g("WATERMARK_DECODE_CACHE_LIMIT")
                .parse()
                .unwrap_or(DecodeCache::DEFAULT_LIMIT),
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::default().with_max_bytes(self.max_image_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), AppConfig::default());
    }

    #[test]
    fn values_are_parsed() {
        let c = config(&[
            ("WATERMARK_INPUT_DIR", "photos"),
            ("WATERMARK_LOGOS", "brand.png, mark.webp"),
            ("WATERMARK_PATTERN_MODE", "true"),
            ("WATERMARK_LOGO_SETTINGS", "logos.json"),
            ("WATERMARK_MAX_IMAGE_BYTES", "2MiB"),
            ("WATERMARK_DECODE_CACHE_LIMIT", "8"),
        ]);
        assert_eq!(c.input_dir, PathBuf::from("photos"));
        assert_eq!(c.logos, [PathBuf::from("brand.png"), PathBuf::from("mark.webp")]);
        assert!(c.pattern_mode);
        assert_eq!(c.logo_settings, Some(PathBuf::from("logos.json")));
        assert_eq!(c.max_image_bytes, 2 * 1024 * 1024);
        assert_eq!(c.decode_cache_limit, 8);
        assert_eq!(c.upload_policy().max_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let c = config(&[
            ("WATERMARK_PATTERN_MODE", "maybe"),
            ("WATERMARK_MAX_IMAGE_BYTES", "lots"),
            ("WATERMARK_DECODE_CACHE_LIMIT", "0"),
        ]);
        assert!(!c.pattern_mode);
        assert_eq!(c.max_image_bytes, MAX_IMAGE_BYTES);
        assert_eq!(c.decode_cache_limit, 64);
    }
}
