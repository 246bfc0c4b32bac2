use crate::geometry::{ImageSize, Rect, MIN_WINDOW_SIZE};

/// Crop window and image window sharing one surface coordinate space.
///
/// The two rectangles are independent: the image window may be smaller,
/// larger or offset relative to the crop window, including fully outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryModel {
    crop: Rect,
    image: Rect,
}

impl GeometryModel {
    pub const fn new(crop: Rect, image: Rect) -> Self {
        Self { crop, image }
    }

    /// Places the crop window at `crop` and aspect-fits an image of `natural`
    /// size inside it, centered on both axes.
    pub fn initialize_from_preset(&mut self, crop: Rect, natural: ImageSize) {
        self.crop = crop;
        self.image = fit_image_in_crop(crop, natural);
    }

    pub const fn crop(&self) -> Rect {
        self.crop
    }

    pub const fn image(&self) -> Rect {
        self.image
    }

    pub fn commit_crop(&mut self, crop: Rect) {
        self.crop = crop;
    }

    pub fn commit_image(&mut self, image: Rect) {
        self.image = image;
    }

    /// Image height is not floored.
    pub fn apply_minimum_size_floor(&mut self) {
        self.crop.width = self.crop.width.max(MIN_WINDOW_SIZE);
        self.crop.height = self.crop.height.max(MIN_WINDOW_SIZE);
        self.image.width = self.image.width.max(MIN_WINDOW_SIZE);
    }

    pub fn image_overflows_crop(&self) -> bool {
        !self.crop.contains_rect(&self.image)
    }
}

impl Default for GeometryModel {
    fn default() -> Self {
        Self::new(Rect::default(), Rect::default())
    }
}

/// Letterboxes an image of `natural` size inside `crop`.
pub fn fit_image_in_crop(crop: Rect, natural: ImageSize) -> Rect {
    let image_aspect = natural.aspect_ratio();
    let (width, height) = if image_aspect > crop.aspect_ratio() {
        (crop.width, crop.width / image_aspect)
    } else {
        (crop.height * image_aspect, crop.height)
    };
    Rect::new(
        crop.x + (crop.width - width) / 2.0,
        crop.y + (crop.height - height) / 2.0,
        width,
        height,
    )
}
