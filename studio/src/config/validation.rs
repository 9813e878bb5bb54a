//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_BYTE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*([KMG]i?B|B)?\s*$").unwrap());

/// Largest accepted upload limit (1 GiB).
const MAX_BYTE_LIMIT: u64 = 1024 * 1024 * 1024;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "WATERMARK_INPUT_DIR" | "WATERMARK_OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("directory must not be empty".into());
            }
        }
        "WATERMARK_LOGOS" => {
            if !value.is_empty() && split_list(value).any(|entry| entry.is_empty()) {
                return Err("list contains an empty entry".into());
            }
        }
        "WATERMARK_LOGO_SETTINGS" => {
            if !value.is_empty() && !value.to_ascii_lowercase().ends_with(".json") {
                return Err("must be a .json file".into());
            }
        }
        "WATERMARK_MAX_IMAGE_BYTES" => {
            let v = parse_byte_size(value)?;
            if v == 0 || v > MAX_BYTE_LIMIT {
                return Err(format!("must be between 1 and {MAX_BYTE_LIMIT} bytes"));
            }
        }
        "WATERMARK_DECODE_CACHE_LIMIT" => validate_int_range(value, 1, 4096)?,
        // Boolean settings
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

/// Parse sizes like `1048576`, `512KB` or `10MiB`. Decimal and binary
/// suffixes are both treated as powers of 1024.
pub fn parse_byte_size(value: &str) -> Result<u64, String> {
    let caps = RE_BYTE_SIZE
        .captures(value)
        .ok_or("expected a size such as 10MiB")?;
    let n: u64 = caps[1].parse().map_err(|_| "size is too large")?;
    let unit = match caps.get(2).map(|m| m.as_str().chars().next()) {
        Some(Some('K')) => 1024,
        Some(Some('M')) => 1024 * 1024,
        Some(Some('G')) => 1024 * 1024 * 1024,
        _ => 1,
    };
    n.checked_mul(unit).ok_or_else(|| "size is too large".into())
}

/// Split a comma-separated list, trimming each entry.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim)
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "WATERMARK_PATTERN_MODE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting("WATERMARK_PATTERN_MODE", "true").is_ok());
        assert!(validate_setting("WATERMARK_PATTERN_MODE", "false").is_ok());
        assert!(validate_setting("WATERMARK_PATTERN_MODE", "yes").is_err());
    }

    #[test]
    fn test_byte_sizes() {
        assert_eq!(parse_byte_size("1048576"), Ok(1_048_576));
        assert_eq!(parse_byte_size("10MiB"), Ok(10 * 1024 * 1024));
        assert_eq!(parse_byte_size("512KB"), Ok(512 * 1024));
        assert_eq!(parse_byte_size(" 2 GiB "), Ok(2 * 1024 * 1024 * 1024));
        assert!(parse_byte_size("ten megs").is_err());
        assert!(parse_byte_size("-1").is_err());

        assert!(validate_setting("WATERMARK_MAX_IMAGE_BYTES", "10MiB").is_ok());
        assert!(validate_setting("WATERMARK_MAX_IMAGE_BYTES", "0").is_err());
        assert!(validate_setting("WATERMARK_MAX_IMAGE_BYTES", "2GiB").is_err());
    }

    #[test]
    fn test_cache_limit_range() {
        assert!(validate_setting("WATERMARK_DECODE_CACHE_LIMIT", "64").is_ok());
        assert!(validate_setting("WATERMARK_DECODE_CACHE_LIMIT", "0").is_err());
        assert!(validate_setting("WATERMARK_DECODE_CACHE_LIMIT", "many").is_err());
    }

    #[test]
    fn test_logo_list() {
        assert!(validate_setting("WATERMARK_LOGOS", "").is_ok());
        assert!(validate_setting("WATERMARK_LOGOS", "a.png, b.png").is_ok());
        assert!(validate_setting("WATERMARK_LOGOS", "a.png,,b.png").is_err());
        assert_eq!(split_list(" a.png , b.png").collect::<Vec<_>>(), ["a.png", "b.png"]);
    }

    #[test]
    fn test_dirs_and_settings_file() {
        assert!(validate_setting("WATERMARK_OUTPUT_DIR", "out").is_ok());
        assert!(validate_setting("WATERMARK_OUTPUT_DIR", "  ").is_err());
        assert!(validate_setting("WATERMARK_LOGO_SETTINGS", "logos.JSON").is_ok());
        assert!(validate_setting("WATERMARK_LOGO_SETTINGS", "logos.toml").is_err());
        assert!(validate_setting("UNKNOWN_KEY", "anything").is_ok());
    }
}
