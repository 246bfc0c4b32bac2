//! Display-list renderer for the rectangle editor.
//!
//! `render` is a pure function of the geometry; painting the resulting list is
//! left to a backend such as [`super::raster`].

use crate::geometry::{Color, Point, Rect, SurfaceSize};
use crate::state::DragState;

use super::hit_test::{handle_at, region_at, HandleKind, HANDLE_RADIUS};
use super::model::GeometryModel;

const CROP_OUTLINE_WIDTH: f64 = 2.0;
const OVERFLOW_LINE_WIDTH: f64 = 1.0;
const CORNER_OUTLINE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPalette {
    pub overlay: Color,
    pub crop_outline: Color,
    pub edge_handle_fill: Color,
    pub corner_handle_fill: Color,
    pub corner_handle_outline: Color,
    pub overflow_line: Color,
}

impl Default for RenderPalette {
    fn default() -> Self {
        Self {
            overlay: Color::rgba(0x00, 0x00, 0x00, 0x80),
            crop_outline: Color::rgb(0x44, 0x66, 0xFF),
            edge_handle_fill: Color::rgb(0x44, 0x66, 0xFF),
            corner_handle_fill: Color::rgb(0xFF, 0xFF, 0xFF),
            corner_handle_outline: Color::rgb(0x00, 0x00, 0x00),
            overflow_line: Color::rgb(0x00, 0x00, 0x00),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
    },
    PushClip(Rect),
    PopClip,
    DrawImage {
        dest: Rect,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        color: Color,
        width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub surface: SurfaceSize,
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Side of the crop window the image window spills past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowSide {
    Left,
    Top,
    Right,
    Bottom,
}

pub fn overflow_sides(crop: &Rect, image: &Rect) -> Vec<OverflowSide> {
    let mut sides = Vec::with_capacity(4);
    if image.x < crop.x {
        sides.push(OverflowSide::Left);
    }
    if image.y < crop.y {
        sides.push(OverflowSide::Top);
    }
    if image.right() > crop.right() {
        sides.push(OverflowSide::Right);
    }
    if image.bottom() > crop.bottom() {
        sides.push(OverflowSide::Bottom);
    }
    sides
}

/// Three segments per side: crop edge to image corner, along the image edge,
/// and back to the crop edge.
fn overflow_connectors(side: OverflowSide, crop: &Rect, image: &Rect) -> [(Point, Point); 3] {
    match side {
        OverflowSide::Left => [
            (Point::new(crop.x, image.y), image.top_left()),
            (image.top_left(), image.bottom_left()),
            (image.bottom_left(), Point::new(crop.x, image.bottom())),
        ],
        OverflowSide::Top => [
            (Point::new(image.x, crop.y), image.top_left()),
            (image.top_left(), image.top_right()),
            (image.top_right(), Point::new(image.right(), crop.y)),
        ],
        OverflowSide::Right => [
            (Point::new(crop.right(), image.y), image.top_right()),
            (image.top_right(), image.bottom_right()),
            (image.bottom_right(), Point::new(crop.right(), image.bottom())),
        ],
        OverflowSide::Bottom => [
            (Point::new(image.x, crop.bottom()), image.bottom_left()),
            (image.bottom_left(), image.bottom_right()),
            (image.bottom_right(), Point::new(image.right(), crop.bottom())),
        ],
    }
}

pub fn render(model: &GeometryModel, surface: SurfaceSize, palette: &RenderPalette) -> DisplayList {
    let crop = model.crop();
    let image = model.image();
    let mut commands = vec![
        DrawCommand::Clear,
        DrawCommand::FillRect {
            rect: surface.bounds(),
            color: palette.overlay,
        },
        DrawCommand::StrokeRect {
            rect: crop,
            color: palette.crop_outline,
            width: CROP_OUTLINE_WIDTH,
        },
        DrawCommand::PushClip(crop),
        DrawCommand::DrawImage { dest: image },
        DrawCommand::PopClip,
    ];

    for kind in HandleKind::EDGES {
        commands.push(DrawCommand::FillCircle {
            center: kind.anchor(&crop, &image),
            radius: HANDLE_RADIUS,
            color: palette.edge_handle_fill,
        });
    }
    for kind in HandleKind::CORNERS {
        let center = kind.anchor(&crop, &image);
        commands.push(DrawCommand::FillCircle {
            center,
            radius: HANDLE_RADIUS,
            color: palette.corner_handle_fill,
        });
        commands.push(DrawCommand::StrokeCircle {
            center,
            radius: HANDLE_RADIUS,
            color: palette.corner_handle_outline,
            width: CORNER_OUTLINE_WIDTH,
        });
    }

    for side in overflow_sides(&crop, &image) {
        for (from, to) in overflow_connectors(side, &crop, &image) {
            commands.push(DrawCommand::Line {
                from,
                to,
                color: palette.overflow_line,
                width: OVERFLOW_LINE_WIDTH,
            });
        }
    }

    DisplayList { surface, commands }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Grab,
    Grabbing,
    MoveAll,
    ResizeVertical,
    ResizeHorizontal,
}

impl CursorHint {
    /// CSS cursor name, handy for hosts that speak CSS or X cursor names.
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::MoveAll => "all-scroll",
            Self::ResizeVertical => "ns-resize",
            Self::ResizeHorizontal => "ew-resize",
        }
    }
}

pub fn cursor_hint(model: &GeometryModel, point: Point, drag: DragState) -> CursorHint {
    if drag.is_dragging() {
        return CursorHint::Grabbing;
    }
    let crop = model.crop();
    let image = model.image();
    match handle_at(point, &crop, &image) {
        Some(HandleKind::CropTop | HandleKind::CropBottom) => return CursorHint::ResizeVertical,
        Some(HandleKind::CropLeft | HandleKind::CropRight) => {
            return CursorHint::ResizeHorizontal
        }
        Some(_) => return CursorHint::MoveAll,
        None => {}
    }
    let region = region_at(point, &crop, &image);
    if region.over_image {
        CursorHint::MoveAll
    } else if region.over_crop {
        CursorHint::Grab
    } else {
        CursorHint::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contained_model() -> GeometryModel {
        GeometryModel::new(
            Rect::new(100.0, 100.0, 400.0, 300.0),
            Rect::new(150.0, 150.0, 200.0, 100.0),
        )
    }

    fn line_count(list: &DisplayList) -> usize {
        list.iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count()
    }

    #[test]
    fn render_is_idempotent_for_unchanged_geometry() {
        let model = contained_model();
        let palette = RenderPalette::default();
        let first = render(&model, SurfaceSize::default(), &palette);
        let second = render(&model, SurfaceSize::default(), &palette);
        assert_eq!(first, second);
    }

    #[test]
    fn render_orders_overlay_outline_then_clipped_image() {
        let model = contained_model();
        let list = render(&model, SurfaceSize::default(), &RenderPalette::default());
        assert_eq!(list.commands[0], DrawCommand::Clear);
        assert!(matches!(
            list.commands[1],
            DrawCommand::FillRect { rect, .. } if rect == Rect::new(0.0, 0.0, 800.0, 600.0)
        ));
        assert!(matches!(list.commands[2], DrawCommand::StrokeRect { .. }));
        assert_eq!(list.commands[3], DrawCommand::PushClip(model.crop()));
        assert_eq!(
            list.commands[4],
            DrawCommand::DrawImage {
                dest: model.image()
            }
        );
        assert_eq!(list.commands[5], DrawCommand::PopClip);
    }

    #[test]
    fn contained_image_draws_handles_without_overflow_lines() {
        let list = render(
            &contained_model(),
            SurfaceSize::default(),
            &RenderPalette::default(),
        );
        let fills = list
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillCircle { .. }))
            .count();
        let strokes = list
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeCircle { .. }))
            .count();
        assert_eq!(fills, 8);
        assert_eq!(strokes, 4);
        assert_eq!(line_count(&list), 0);
    }

    #[test]
    fn overflow_lines_trace_each_overflowing_side() {
        let model = GeometryModel::new(
            Rect::new(100.0, 100.0, 400.0, 300.0),
            Rect::new(50.0, 80.0, 200.0, 100.0),
        );
        assert_eq!(
            overflow_sides(&model.crop(), &model.image()),
            vec![OverflowSide::Left, OverflowSide::Top]
        );
        let list = render(&model, SurfaceSize::default(), &RenderPalette::default());
        assert_eq!(line_count(&list), 6);
        let first_line = list
            .iter()
            .find(|command| matches!(command, DrawCommand::Line { .. }))
            .copied();
        assert_eq!(
            first_line,
            Some(DrawCommand::Line {
                from: Point::new(100.0, 80.0),
                to: Point::new(50.0, 80.0),
                color: RenderPalette::default().overflow_line,
                width: OVERFLOW_LINE_WIDTH,
            })
        );
    }

    #[test]
    fn cursor_hint_follows_handle_and_region_priority() {
        let model = contained_model();
        let crop = model.crop();
        let image = model.image();
        assert_eq!(
            cursor_hint(&model, crop.top_mid(), DragState::Idle),
            CursorHint::ResizeVertical
        );
        assert_eq!(
            cursor_hint(&model, crop.left_mid(), DragState::Idle),
            CursorHint::ResizeHorizontal
        );
        assert_eq!(
            cursor_hint(&model, image.top_left(), DragState::Idle),
            CursorHint::MoveAll
        );
        assert_eq!(
            cursor_hint(&model, Point::new(200.0, 200.0), DragState::Idle),
            CursorHint::MoveAll
        );
        assert_eq!(
            cursor_hint(&model, Point::new(450.0, 350.0), DragState::Idle),
            CursorHint::Grab
        );
        assert_eq!(
            cursor_hint(&model, Point::new(10.0, 10.0), DragState::Idle),
            CursorHint::Default
        );
        assert_eq!(
            cursor_hint(&model, Point::new(10.0, 10.0), DragState::DraggingCrop),
            CursorHint::Grabbing
        );
        assert_eq!(CursorHint::MoveAll.css_name(), "all-scroll");
    }
}
