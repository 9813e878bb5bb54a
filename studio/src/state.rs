//! Editable workspace: base images, ordered logos and the global pattern mode.
//!
//! Every mutation bumps a revision counter. Renderers never see the mutable
//! state directly; they take a [`StateSnapshot`], which is immutable and
//! cheap to clone.

use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info, warn};
use uuid::Uuid;
use watermark_engine::{Compositor, Logo, LogoSettings, LogoUpdate, PatternPreset, PixelSource};

use crate::StudioError;
use crate::media::{ImageFile, UploadPolicy};

/// Outcome of a multi-file image upload.
#[derive(Debug, Default)]
pub struct AddImagesReport {
    pub added: Vec<String>,
    pub rejected: Vec<(String, StudioError)>,
}

#[derive(Debug, Default)]
pub struct WorkspaceState {
    images: Vec<ImageFile>,
    logos: Vec<Logo>,
    pattern_mode: bool,
    policy: UploadPolicy,
    revision: u64,
}

impl WorkspaceState {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn images(&self) -> &[ImageFile] {
        &self.images
    }

    pub fn logos(&self) -> &[Logo] {
        &self.logos
    }

    pub fn pattern_mode(&self) -> bool {
        self.pattern_mode
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn logo(&self, id: &str) -> Option<&Logo> {
        self.logos.iter().find(|l| l.id == id)
    }

    /// Add base images in the given order. Invalid files are rejected
    /// individually; the rest are still added.
    pub fn add_images<I, N, B>(&mut self, files: I) -> AddImagesReport
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<Arc<[u8]>>,
    {
        let mut report = AddImagesReport::default();
        for (name, bytes) in files {
            let name = name.into();
            let id = Uuid::new_v4().to_string();
            match ImageFile::load(id.clone(), name.clone(), bytes, &self.policy) {
                Ok(file) => {
                    self.images.push(file);
                    report.added.push(id);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "Rejected image upload");
                    report.rejected.push((name, e));
                }
            }
        }
        if !report.added.is_empty() {
            self.touch();
        }
        info!(
            added = report.added.len(),
            rejected = report.rejected.len(),
            total = self.images.len(),
            "Images added"
        );
        report
    }

    pub fn remove_image(&mut self, id: &str) -> Result<ImageFile, StudioError> {
        let idx = self
            .images
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StudioError::ImageNotFound(id.to_string()))?;
        self.touch();
        Ok(self.images.remove(idx))
    }

    /// Append a logo with default settings; it paints on top of existing logos.
    pub fn add_logo(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<String, StudioError> {
        let source = self.checked_source(name.into(), bytes.into())?;
        let id = Uuid::new_v4().to_string();
        debug!(logo = %id, source = source.id(), "Adding logo");
        self.logos
            .push(Logo::new(id.clone(), source).with_settings(LogoSettings::default()));
        self.touch();
        Ok(id)
    }

    pub fn update_logo(&mut self, id: &str, update: &LogoUpdate) -> Result<(), StudioError> {
        self.logo_mut(id)?.settings.apply(update);
        self.touch();
        Ok(())
    }

    pub fn apply_preset(&mut self, id: &str, preset: PatternPreset) -> Result<(), StudioError> {
        self.logo_mut(id)?.settings.apply_preset(preset);
        self.touch();
        Ok(())
    }

    /// Swap a logo's image, keeping its id, position in the list and settings.
    pub fn replace_logo_source(
        &mut self,
        id: &str,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<(), StudioError> {
        let source = self.checked_source(name.into(), bytes.into())?;
        self.logo_mut(id)?.source = source;
        self.touch();
        Ok(())
    }

    /// Move the logo at `from` so it ends up at index `to` (paint order).
    pub fn move_logo(&mut self, from: usize, to: usize) -> Result<(), StudioError> {
        let len = self.logos.len();
        for index in [from, to] {
            if index >= len {
                return Err(StudioError::LogoIndexOutOfRange { index, len });
            }
        }
        if from != to {
            let logo = self.logos.remove(from);
            self.logos.insert(to, logo);
            self.touch();
        }
        Ok(())
    }

    pub fn remove_logo(&mut self, id: &str) -> Result<Logo, StudioError> {
        let idx = self
            .logos
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StudioError::LogoNotFound(id.to_string()))?;
        self.touch();
        Ok(self.logos.remove(idx))
    }

    /// Switch every logo between single overlay and tiled pattern.
    /// Stored logo settings are left as they are.
    pub fn set_pattern_mode(&mut self, enabled: bool) {
        if self.pattern_mode != enabled {
            self.pattern_mode = enabled;
            self.touch();
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            images: Arc::from(self.images.as_slice()),
            logos: Arc::from(self.logos.as_slice()),
            pattern_mode: self.pattern_mode,
            revision: self.revision,
        }
    }

    fn logo_mut(&mut self, id: &str) -> Result<&mut Logo, StudioError> {
        self.logos
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StudioError::LogoNotFound(id.to_string()))
    }

    fn checked_source(&self, name: String, bytes: Arc<[u8]>) -> Result<PixelSource, StudioError> {
        self.policy.check(&name, &bytes)?;
        Ok(PixelSource::from_bytes(name, bytes))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// Immutable view of the workspace at one revision.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub images: Arc<[ImageFile]>,
    pub logos: Arc<[Logo]>,
    pub pattern_mode: bool,
    pub revision: u64,
}

impl StateSnapshot {
    /// Decode `image` and composite this snapshot's logos onto it.
    ///
    /// Both preview and export go through here.
    pub fn render_image(
        &self,
        compositor: &Compositor,
        image: &ImageFile,
    ) -> Result<RgbaImage, StudioError> {
        let base = image.decode()?;
        Ok(compositor.render(&base, &self.logos, self.pattern_mode))
    }
}
