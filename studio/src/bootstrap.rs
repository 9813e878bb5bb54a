use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use watermark_engine::{LogoUpdate, PatternPreset};

use crate::config::AppConfig;
use crate::state::WorkspaceState;

/// Per-logo entry of the settings file. An optional preset is applied
/// before the explicit fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogoSettingsEntry {
    #[serde(default)]
    pub preset: Option<PatternPreset>,
    #[serde(flatten)]
    pub update: LogoUpdate,
}

/// Foundation init: environment, configuration, output directory (fatal on error).
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();
    let config = AppConfig::load();
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    tracing::info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        logos = config.logos.len(),
        pattern_mode = config.pattern_mode,
        "Settings loaded"
    );
    Ok(config)
}

/// Build the workspace the batch runner exports: every file in the input
/// directory, then the configured logos with their optional settings.
pub fn load_workspace(config: &AppConfig) -> Result<WorkspaceState, anyhow::Error> {
    let mut state = WorkspaceState::new(config.upload_policy());

    let images = read_dir_sorted(&config.input_dir)?;
    let report = state.add_images(images);
    for (name, e) in &report.rejected {
        tracing::warn!("Skipping input {name}: {e}");
    }

    // One slot per configured logo so settings entries keep their index
    // when a logo is rejected.
    let mut logo_ids = Vec::with_capacity(config.logos.len());
    for path in &config.logos {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read logo {}", path.display()))?;
        match state.add_logo(file_name(path), bytes) {
            Ok(id) => logo_ids.push(Some(id)),
            Err(e) => {
                tracing::warn!("Skipping logo {}: {e}", path.display());
                logo_ids.push(None);
            }
        }
    }

    if let Some(path) = &config.logo_settings {
        let entries = read_logo_settings(path)?;
        if entries.len() > logo_ids.len() {
            tracing::warn!(
                "{} has {} entries for {} logos; extra entries ignored",
                path.display(),
                entries.len(),
                logo_ids.len()
            );
        }
        for (id, entry) in logo_ids.iter().zip(&entries) {
            let Some(id) = id else {
                continue;
            };
            if let Some(preset) = entry.preset {
                state.apply_preset(id, preset)?;
            }
            state.update_logo(id, &entry.update)?;
        }
    }

    state.set_pattern_mode(config.pattern_mode);
    Ok(state)
}

pub fn read_logo_settings(path: &Path) -> Result<Vec<LogoSettingsEntry>, anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid logo settings in {}", path.display()))
}

/// Regular, non-hidden files in `dir`, sorted by name.
fn read_dir_sorted(dir: &Path) -> Result<Vec<(String, Vec<u8>)>, anyhow::Error> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && !file_name(&path).starts_with('.') {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let bytes =
                std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok((file_name(&path), bytes))
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
