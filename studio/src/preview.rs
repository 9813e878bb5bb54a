//! Preview adapter: renders the selected image through the shared compositor
//! and keeps the read-only zoom/pan view used to inspect it.

use glam::DVec2;
use image::RgbaImage;
use tracing::{debug, trace};
use watermark_engine::Compositor;

use crate::StudioError;
use crate::state::StateSnapshot;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;

/// Display-only zoom and pan. Never feeds back into rendering.
///
/// `pan` is measured in frame pixels and bounded so the zoomed frame cannot
/// be dragged past its own edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    zoom: f64,
    pan: DVec2,
    content: DVec2,
    pinch: Option<PinchStart>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchStart {
    distance: f64,
    midpoint: DVec2,
    zoom: f64,
    pan: DVec2,
}

/// Where the frame lands inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: DVec2::ZERO,
            content: DVec2::ZERO,
            pinch: None,
        }
    }
}

impl ViewTransform {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> DVec2 {
        self.pan
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom > 1.0
    }

    pub fn set_content_size(&mut self, width: u32, height: u32) {
        self.content = DVec2::new(f64::from(width), f64::from(height));
        self.clamp_pan();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.clamp_pan();
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = DVec2::ZERO;
        self.pinch = None;
    }

    /// Pointer drag. Ignored unless zoomed in beyond 1x.
    pub fn drag(&mut self, delta: DVec2) -> bool {
        if !self.is_zoomed() || !delta.is_finite() {
            return false;
        }
        self.pan += delta;
        self.clamp_pan();
        true
    }

    pub fn begin_pinch(&mut self, distance: f64, midpoint: DVec2) {
        if distance > 0.0 && distance.is_finite() {
            self.pinch = Some(PinchStart {
                distance,
                midpoint,
                zoom: self.zoom,
                pan: self.pan,
            });
        }
    }

    /// Scale relative to the pinch start and pan with the finger midpoint.
    pub fn update_pinch(&mut self, distance: f64, midpoint: DVec2) {
        let Some(start) = self.pinch else {
            return;
        };
        self.set_zoom(start.zoom * distance / start.distance);
        if self.is_zoomed() && midpoint.is_finite() {
            self.pan = start.pan + (midpoint - start.midpoint);
            self.clamp_pan();
        }
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    /// Fit the frame inside `viewport`, then apply zoom around the center and
    /// the pan offset.
    pub fn display_rect(&self, viewport: DVec2) -> DisplayRect {
        if self.content.x <= 0.0 || self.content.y <= 0.0 {
            return DisplayRect {
                origin: viewport / 2.0,
                size: DVec2::ZERO,
            };
        }
        let fit = (viewport / self.content).min_element();
        let size = self.content * fit * self.zoom;
        DisplayRect {
            origin: (viewport - size) / 2.0 + self.pan * fit,
            size,
        }
    }

    fn clamp_pan(&mut self) {
        if self.zoom <= 1.0 {
            self.pan = DVec2::ZERO;
            return;
        }
        let limit = self.content * (self.zoom - 1.0) / 2.0;
        self.pan = self.pan.clamp(-limit, limit);
    }
}

/// A render job for one image at one generation.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub generation: u64,
    pub index: usize,
    pub snapshot: StateSnapshot,
}

#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub generation: u64,
    pub image_id: String,
    pub frame: RgbaImage,
}

#[derive(Debug, Default)]
pub struct PreviewAdapter {
    selected: usize,
    count: usize,
    generation: u64,
    current: Option<PreviewFrame>,
    view: ViewTransform,
}

impl PreviewAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Last presented frame.
    pub fn current(&self) -> Option<&PreviewFrame> {
        self.current.as_ref()
    }

    /// One-based `(n, m)` for the selected image, or `None` with no images.
    pub fn position(&self) -> Option<(usize, usize)> {
        (self.count > 0).then(|| (self.selected + 1, self.count))
    }

    pub fn position_label(&self) -> String {
        match self.position() {
            Some((n, m)) => format!("{n} of {m}"),
            None => String::new(),
        }
    }

    pub fn next(&mut self) -> bool {
        if self.selected + 1 < self.count {
            self.change_selection(self.selected + 1);
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.selected > 0 {
            self.change_selection(self.selected - 1);
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped to the known collection.
    pub fn select(&mut self, index: usize) {
        let index = index.min(self.count.saturating_sub(1));
        if index != self.selected {
            self.change_selection(index);
        }
    }

    /// Start a new render for `snapshot`, superseding any request in flight.
    ///
    /// Returns `None` when there is nothing to show; the current frame is
    /// cleared in that case.
    pub fn request(&mut self, snapshot: StateSnapshot) -> Option<PreviewRequest> {
        self.generation += 1;
        self.count = snapshot.images.len();
        if self.count == 0 {
            self.selected = 0;
            self.current = None;
            return None;
        }
        if self.selected >= self.count {
            self.change_selection(self.count - 1);
        }
        trace!(
            generation = self.generation,
            index = self.selected,
            revision = snapshot.revision,
            "Preview requested"
        );
        Some(PreviewRequest {
            generation: self.generation,
            index: self.selected,
            snapshot,
        })
    }

    /// Render a request. Holds no adapter state, so it can run on any thread.
    pub fn render(
        compositor: &Compositor,
        request: &PreviewRequest,
    ) -> Result<PreviewFrame, StudioError> {
        let image = request
            .snapshot
            .images
            .get(request.index)
            .ok_or_else(|| StudioError::ImageNotFound(format!("#{}", request.index)))?;
        let frame = request.snapshot.render_image(compositor, image)?;
        Ok(PreviewFrame {
            generation: request.generation,
            image_id: image.id.clone(),
            frame,
        })
    }

    /// Show `frame` if it belongs to the latest request. Stale frames are
    /// dropped and `false` is returned.
    pub fn present(&mut self, frame: PreviewFrame) -> bool {
        if frame.generation != self.generation {
            debug!(
                stale = frame.generation,
                latest = self.generation,
                "Dropping superseded preview"
            );
            return false;
        }
        self.view
            .set_content_size(frame.frame.width(), frame.frame.height());
        self.current = Some(frame);
        true
    }

    /// Request, render and present in one go.
    pub fn refresh(
        &mut self,
        compositor: &Compositor,
        snapshot: StateSnapshot,
    ) -> Result<bool, StudioError> {
        let Some(request) = self.request(snapshot) else {
            return Ok(false);
        };
        let frame = Self::render(compositor, &request)?;
        Ok(self.present(frame))
    }

    fn change_selection(&mut self, index: usize) {
        self.selected = index;
        self.view.reset();
    }
}
