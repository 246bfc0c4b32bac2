//! Rectangle editor: crop window and image window manipulation.

pub mod drag;
pub mod model;
pub mod raster;
pub mod render;
pub mod resolve;

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{ImageSize, Point, Rect, SurfaceSize};
use crate::state::{DragEvent, DragState, DragStateMachine, PressTarget};
use crate::submit::Submission;

pub use drag::{apply_drag_delta, DragSession};
pub use hit_test::{handle_at, region_at, HandleKind, PointerRegion, HANDLE_RADIUS};
pub use model::{fit_image_in_crop, GeometryModel};
pub use raster::{pixmap_to_rgba_image, rasterize, RasterError, RasterResult};
pub use render::{
    cursor_hint, render, CursorHint, DisplayList, DrawCommand, OverflowSide, RenderPalette,
};
pub use resolve::{crop_bitmap, resolve, CropResolution, SourceRegion};

pub const DEFAULT_CROP: Rect = Rect::new(100.0, 100.0, 400.0, 300.0);

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no image has been loaded into the editor yet")]
    NotReady,
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Receives a fresh display list after every geometry change.
pub type RedrawSubscriber = Box<dyn FnMut(&DisplayList)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub surface: SurfaceSize,
    pub default_crop: Rect,
    pub palette: RenderPalette,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            surface: SurfaceSize::default(),
            default_crop: DEFAULT_CROP,
            palette: RenderPalette::default(),
        }
    }
}

/// Owns the geometry, the drag session and the loaded bitmap.
///
/// All mutation goes through pointer handlers or preset/image changes; each
/// committed change is followed by exactly one synchronous redraw.
pub struct RectangleEditor {
    settings: EditorSettings,
    model: GeometryModel,
    machine: DragStateMachine,
    session: Option<DragSession>,
    bitmap: Option<RgbaImage>,
    crop_template: Rect,
    subscriber: Option<RedrawSubscriber>,
}

impl std::fmt::Debug for RectangleEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RectangleEditor")
            .field("model", &self.model)
            .field("drag", &self.machine.state())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl RectangleEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            crop_template: settings.default_crop,
            model: GeometryModel::new(settings.default_crop, settings.default_crop),
            settings,
            machine: DragStateMachine::new(),
            session: None,
            bitmap: None,
            subscriber: None,
        }
    }

    pub fn subscribe(&mut self, subscriber: RedrawSubscriber) {
        self.subscriber = Some(subscriber);
    }

    pub fn is_ready(&self) -> bool {
        self.bitmap.is_some()
    }

    pub fn geometry(&self) -> &GeometryModel {
        &self.model
    }

    pub fn drag_state(&self) -> DragState {
        self.machine.state()
    }

    pub fn surface(&self) -> SurfaceSize {
        self.settings.surface
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    pub fn natural_size(&self) -> Option<ImageSize> {
        self.bitmap
            .as_ref()
            .map(|bitmap| ImageSize::new(bitmap.width(), bitmap.height()))
    }

    /// Image-ready callback: replaces the bitmap and re-fits the image window
    /// inside the current crop template.
    pub fn load_bitmap(&mut self, bitmap: RgbaImage) {
        let natural = ImageSize::new(bitmap.width(), bitmap.height());
        tracing::info!(
            width = natural.width,
            height = natural.height,
            "image ready; initializing editor geometry"
        );
        self.bitmap = Some(bitmap);
        self.end_session();
        self.model.initialize_from_preset(self.crop_template, natural);
        self.redraw();
    }

    /// Replaces the crop window with `crop`; when an image is loaded the image
    /// window is re-fitted inside it.
    pub fn apply_preset(&mut self, crop: Rect) {
        self.crop_template = crop;
        let Some(natural) = self.natural_size() else {
            tracing::debug!(?crop, "preset stored until an image is ready");
            return;
        };
        tracing::debug!(?crop, "applying preset crop window");
        self.end_session();
        self.model.initialize_from_preset(crop, natural);
        self.redraw();
    }

    pub fn pointer_press(&mut self, point: Point) -> DragState {
        if !self.is_ready() {
            return self.machine.state();
        }
        if self.machine.state().is_dragging() {
            tracing::warn!(
                state = ?self.machine.state(),
                "press received while dragging; restarting drag session"
            );
            self.end_session();
        }

        let Some(target) = self.press_target(point) else {
            return self.machine.state();
        };
        match self.machine.transition(DragEvent::Press(target)) {
            Ok(state) => {
                tracing::debug!(
                    ?state,
                    handle = state.active_handle().map(HandleKind::label),
                    x = point.x,
                    y = point.y,
                    "drag started"
                );
                self.session = Some(DragSession::new(point));
                state
            }
            Err(err) => {
                tracing::warn!(?err, "press ignored");
                self.machine.state()
            }
        }
    }

    /// Applies the delta since the previous sample and returns the cursor to show.
    pub fn pointer_move(&mut self, point: Point) -> CursorHint {
        let state = self.machine.state();
        if let Some(session) = self.session.as_mut() {
            let (dx, dy) = session.advance(point);
            if apply_drag_delta(&mut self.model, state, dx, dy) {
                self.redraw();
            }
        }
        self.cursor_at(point)
    }

    pub fn pointer_release(&mut self) {
        self.finish_drag(DragEvent::Release);
    }

    /// Leaving the surface ends the drag exactly like a release.
    pub fn pointer_leave(&mut self) {
        self.finish_drag(DragEvent::Leave);
    }

    pub fn cursor_at(&self, point: Point) -> CursorHint {
        cursor_hint(&self.model, point, self.machine.state())
    }

    /// Current frame; `None` until a bitmap is loaded.
    pub fn render(&self) -> Option<DisplayList> {
        self.bitmap.as_ref()?;
        Some(render(&self.model, self.settings.surface, &self.settings.palette))
    }

    /// Paints the current frame, or `None` until a bitmap is loaded.
    pub fn rasterize_frame(&self) -> RasterResult<Option<RgbaImage>> {
        let Some(list) = self.render() else {
            return Ok(None);
        };
        let pixmap = rasterize(&list, self.bitmap.as_ref())?;
        Ok(Some(pixmap_to_rgba_image(&pixmap)))
    }

    pub fn resolve(&self) -> EditorResult<CropResolution> {
        let natural = self.natural_size().ok_or(EditorError::NotReady)?;
        Ok(resolve(&self.model.crop(), &self.model.image(), natural))
    }

    /// Builds the artifact for the submission sink. Geometry is left untouched.
    pub fn submission(&self) -> EditorResult<Submission> {
        let bitmap = self.bitmap.as_ref().ok_or(EditorError::NotReady)?;
        let resolution = self.resolve()?;
        let cropped = crop_bitmap(bitmap, &resolution);
        tracing::info!(
            width = cropped.width(),
            height = cropped.height(),
            margins = ?resolution.margins,
            "resolved crop for submission"
        );
        Ok(Submission::from_resolution(cropped, resolution.margins))
    }

    fn press_target(&self, point: Point) -> Option<PressTarget> {
        let crop = self.model.crop();
        let image = self.model.image();
        if let Some(kind) = handle_at(point, &crop, &image) {
            return Some(PressTarget::Handle(kind));
        }
        let region = region_at(point, &crop, &image);
        if region.over_image {
            Some(PressTarget::Image)
        } else if region.over_crop {
            Some(PressTarget::Crop)
        } else {
            None
        }
    }

    fn finish_drag(&mut self, event: DragEvent) {
        if !self.machine.can_transition(event) {
            return;
        }
        if let Err(err) = self.machine.transition(event) {
            tracing::warn!(?err, "failed to end drag");
            self.machine.reset();
        }
        self.session = None;
    }

    fn end_session(&mut self) {
        self.machine.reset();
        self.session = None;
    }

    fn redraw(&mut self) {
        let Some(list) = self.render() else {
            return;
        };
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber(&list);
        }
    }
}

impl Default for RectangleEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
