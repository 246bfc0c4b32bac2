use image::RgbaImage;
use thiserror::Error;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pattern, Pixmap, SpreadMode,
    Stroke, Transform,
};

use crate::geometry::{Color, Rect};

use super::render::{DisplayList, DrawCommand};

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },
}

pub type RasterResult<T> = std::result::Result<T, RasterError>;

/// Paints a display list onto a fresh pixmap the size of its surface.
///
/// `bitmap` is the source image referenced by `DrawImage`; when absent those
/// commands are skipped.
pub fn rasterize(list: &DisplayList, bitmap: Option<&RgbaImage>) -> RasterResult<Pixmap> {
    let width = list.surface.width;
    let height = list.surface.height;
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RasterError::PixmapAllocation { width, height })?;
    let source = bitmap.map(rgba_image_to_pixmap).transpose()?;
    // `None` marks a clip region that could not be built; nothing inside it paints.
    let mut clips: Vec<Option<Mask>> = Vec::new();

    for command in list.iter() {
        match *command {
            DrawCommand::PushClip(rect) => {
                clips.push(clip_mask(rect, width, height));
                continue;
            }
            DrawCommand::PopClip => {
                clips.pop();
                continue;
            }
            _ => {}
        }
        let clip = match clips.last() {
            Some(None) => continue,
            Some(Some(mask)) => Some(mask),
            None => None,
        };

        match *command {
            DrawCommand::Clear => pixmap.fill(tiny_skia::Color::TRANSPARENT),
            DrawCommand::FillRect { rect, color } => {
                if let Some(rect) = skia_rect(rect) {
                    pixmap.fill_rect(rect, &solid_paint(color), Transform::identity(), clip);
                }
            }
            DrawCommand::StrokeRect { rect, color, width } => {
                if let Some(rect) = skia_rect(rect) {
                    let path = PathBuilder::from_rect(rect);
                    pixmap.stroke_path(
                        &path,
                        &solid_paint(color),
                        &stroke(width),
                        Transform::identity(),
                        clip,
                    );
                }
            }
            DrawCommand::PushClip(_) | DrawCommand::PopClip => {}
            DrawCommand::DrawImage { dest } => {
                if let (Some(source), Some(rect)) = (source.as_ref(), skia_rect(dest)) {
                    let scale_x = dest.width as f32 / source.width() as f32;
                    let scale_y = dest.height as f32 / source.height() as f32;
                    let paint = Paint {
                        shader: Pattern::new(
                            source.as_ref(),
                            SpreadMode::Pad,
                            FilterQuality::Bilinear,
                            1.0,
                            Transform::from_row(
                                scale_x,
                                0.0,
                                0.0,
                                scale_y,
                                dest.x as f32,
                                dest.y as f32,
                            ),
                        ),
                        anti_alias: true,
                        ..Paint::default()
                    };
                    pixmap.fill_rect(rect, &paint, Transform::identity(), clip);
                }
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                if let Some(path) =
                    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
                {
                    pixmap.fill_path(
                        &path,
                        &solid_paint(color),
                        FillRule::Winding,
                        Transform::identity(),
                        clip,
                    );
                }
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                if let Some(path) =
                    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
                {
                    pixmap.stroke_path(
                        &path,
                        &solid_paint(color),
                        &stroke(width),
                        Transform::identity(),
                        clip,
                    );
                }
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                let mut builder = PathBuilder::new();
                builder.move_to(from.x as f32, from.y as f32);
                builder.line_to(to.x as f32, to.y as f32);
                if let Some(path) = builder.finish() {
                    pixmap.stroke_path(
                        &path,
                        &solid_paint(color),
                        &stroke(width),
                        Transform::identity(),
                        clip,
                    );
                }
            }
        }
    }

    Ok(pixmap)
}

pub fn rgba_image_to_pixmap(image: &RgbaImage) -> RasterResult<Pixmap> {
    let width = image.width();
    let height = image.height();
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RasterError::PixmapAllocation { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
    image
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

fn clip_mask(rect: Rect, width: u32, height: u32) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let path = PathBuilder::from_rect(skia_rect(rect)?);
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let (r, g, b, a) = color.components();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        ..Stroke::default()
    }
}
