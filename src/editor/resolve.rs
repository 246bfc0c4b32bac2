//! Final crop computation on submit.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::geometry::{ImageSize, Margins, Rect};

/// Region of the source bitmap to extract, in natural pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRegion {
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropResolution {
    /// Overlap of crop and image windows in surface space; zero-sized when
    /// the windows do not overlap.
    pub intersection: Rect,
    pub source: SourceRegion,
    pub margins: Margins,
}

impl CropResolution {
    pub fn is_empty(&self) -> bool {
        self.intersection.width <= 0.0 || self.intersection.height <= 0.0 || self.source.is_empty()
    }

    /// Output bitmap dimensions, in surface units.
    pub fn output_size(&self) -> (u32, u32) {
        if self.is_empty() {
            return (0, 0);
        }
        (
            self.intersection.width.round().max(1.0) as u32,
            self.intersection.height.round().max(1.0) as u32,
        )
    }
}

pub fn resolve(crop: &Rect, image: &Rect, natural: ImageSize) -> CropResolution {
    let left = crop.x.max(image.x);
    let top = crop.y.max(image.y);
    let right = crop.right().min(image.right());
    let bottom = crop.bottom().min(image.bottom());
    let cropped_width = (right - left).max(0.0);
    let cropped_height = (bottom - top).max(0.0);
    let intersection = Rect::new(left, top, cropped_width, cropped_height);

    let margins = Margins::new(
        (image.x - crop.x).max(0.0),
        (image.y - crop.y).max(0.0),
        (crop.right() - image.right()).max(0.0),
        (crop.bottom() - image.bottom()).max(0.0),
    );

    let source = if cropped_width > 0.0 && cropped_height > 0.0 {
        source_region(crop, image, natural, cropped_width, cropped_height)
    } else {
        SourceRegion {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        }
    };

    CropResolution {
        intersection,
        source,
        margins,
    }
}

fn source_region(
    crop: &Rect,
    image: &Rect,
    natural: ImageSize,
    cropped_width: f64,
    cropped_height: f64,
) -> SourceRegion {
    let sx = (crop.x - image.x).max(0.0);
    let sy = (crop.y - image.y).max(0.0);
    let scale_x = f64::from(natural.width) / image.width;
    let scale_y = f64::from(natural.height) / image.height;

    let x = clamp_to_axis(sx * scale_x, natural.width);
    let y = clamp_to_axis(sy * scale_y, natural.height);
    let right = clamp_to_axis((sx + cropped_width) * scale_x, natural.width);
    let bottom = clamp_to_axis((sy + cropped_height) * scale_y, natural.height);

    SourceRegion {
        x,
        y,
        width: right.saturating_sub(x),
        height: bottom.saturating_sub(y),
    }
}

fn clamp_to_axis(value: f64, limit: u32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(limit)) as u32
}

/// Extracts the overlapping pixels and scales them to the output size.
///
/// A degenerate resolution yields a 0x0 bitmap.
pub fn crop_bitmap(source: &RgbaImage, resolution: &CropResolution) -> RgbaImage {
    let (width, height) = resolution.output_size();
    if width == 0 || height == 0 {
        return RgbaImage::new(0, 0);
    }
    let region = resolution.source;
    let view = imageops::crop_imm(source, region.x, region.y, region.width, region.height);
    if region.width == width && region.height == height {
        return view.to_image();
    }
    imageops::resize(&view.to_image(), width, height, FilterType::Triangle)
}
