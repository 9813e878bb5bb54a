//! Headless batch binary: watermark every image in the input directory.
//!
//! Configured through environment variables (or a `.env` file) only.

use tracing_subscriber::EnvFilter;

use watermark_engine::Compositor;
use watermark_studio_lib::export::{self, ExportAdapter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting watermark batch");

    let config = watermark_studio_lib::init_foundation()?;
    let state = watermark_studio_lib::load_workspace(&config)?;
    if state.images().is_empty() {
        tracing::warn!(
            input = %config.input_dir.display(),
            "No images to watermark"
        );
        return Ok(());
    }

    let compositor = Compositor::with_cache_limit(config.decode_cache_limit);
    let report = ExportAdapter::new(&compositor).export_all(&state.snapshot());
    for failure in &report.failures {
        tracing::warn!(
            file = %failure.file_name,
            error = %failure.error,
            "Image was not exported"
        );
    }

    let written = export::write_to_dir(&config.output_dir, &report.files)?;
    tracing::info!(
        written = written.len(),
        failed = report.failures.len(),
        output = %config.output_dir.display(),
        "Batch complete"
    );
    Ok(())
}
