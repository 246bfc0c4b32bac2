use crate::geometry::{Point, Rect};
use crate::state::DragState;

use super::hit_test::HandleKind;
use super::model::GeometryModel;

/// Pointer samples for one press-to-release manipulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start: Point,
    pub last: Point,
}

impl DragSession {
    pub const fn new(start: Point) -> Self {
        Self { start, last: start }
    }

    /// Delta from the previous sample; the sample becomes the new reference.
    pub fn advance(&mut self, point: Point) -> (f64, f64) {
        let delta = point.delta_from(self.last);
        self.last = point;
        delta
    }
}

/// Applies one pointer-move delta to the model for the given drag state.
///
/// Returns `false` when the state is idle and nothing changed.
pub fn apply_drag_delta(model: &mut GeometryModel, state: DragState, dx: f64, dy: f64) -> bool {
    match state {
        DragState::Idle => return false,
        DragState::DraggingCrop => {
            model.commit_crop(model.crop().translated(dx, dy));
            model.commit_image(model.image().translated(dx, dy));
        }
        DragState::DraggingImage => {
            model.commit_image(model.image().translated(dx, dy));
        }
        DragState::DraggingHandle(kind) if kind.is_crop_edge() => {
            model.commit_crop(resize_crop_edge(model.crop(), kind, dx, dy));
        }
        DragState::DraggingHandle(kind) => {
            model.commit_image(resize_image_corner(model.image(), kind, dx, dy));
        }
    }
    model.apply_minimum_size_floor();
    true
}

fn resize_crop_edge(crop: Rect, kind: HandleKind, dx: f64, dy: f64) -> Rect {
    let mut next = crop;
    match kind {
        HandleKind::CropTop => {
            next.y += dy;
            next.height -= dy;
        }
        HandleKind::CropRight => next.width += dx,
        HandleKind::CropBottom => next.height += dy,
        HandleKind::CropLeft => {
            next.x += dx;
            next.width -= dx;
        }
        _ => {}
    }
    next
}

fn resize_image_corner(image: Rect, kind: HandleKind, dx: f64, dy: f64) -> Rect {
    let mut next = image;
    match kind {
        HandleKind::ImageTopLeft => {
            next.x += dx;
            next.y += dy;
            next.width -= dx;
            next.height -= dy;
        }
        HandleKind::ImageTopRight => {
            next.y += dy;
            next.width += dx;
            next.height -= dy;
        }
        HandleKind::ImageBottomRight => {
            next.width += dx;
            next.height += dy;
        }
        HandleKind::ImageBottomLeft => {
            next.x += dx;
            next.width -= dx;
            next.height += dy;
        }
        _ => {}
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MIN_WINDOW_SIZE;

    fn model() -> GeometryModel {
        GeometryModel::new(
            Rect::new(100.0, 100.0, 400.0, 300.0),
            Rect::new(150.0, 150.0, 200.0, 100.0),
        )
    }

    #[test]
    fn session_deltas_are_relative_to_previous_sample() {
        let mut session = DragSession::new(Point::new(10.0, 10.0));
        assert_eq!(session.advance(Point::new(15.0, 12.0)), (5.0, 2.0));
        assert_eq!(session.advance(Point::new(13.0, 20.0)), (-2.0, 8.0));
        assert_eq!(session.start, Point::new(10.0, 10.0));
    }

    #[test]
    fn crop_drag_moves_both_windows_as_a_pair() {
        let mut model = model();
        assert!(apply_drag_delta(&mut model, DragState::DraggingCrop, -120.0, 15.0));
        assert_eq!(model.crop(), Rect::new(-20.0, 115.0, 400.0, 300.0));
        assert_eq!(model.image(), Rect::new(30.0, 165.0, 200.0, 100.0));
    }

    #[test]
    fn image_drag_moves_only_the_image() {
        let mut model = model();
        apply_drag_delta(&mut model, DragState::DraggingImage, 10.0, -5.0);
        assert_eq!(model.crop(), Rect::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(model.image(), Rect::new(160.0, 145.0, 200.0, 100.0));
    }

    #[test]
    fn top_edge_drag_up_grows_crop_upwards() {
        let mut model = model();
        let before_image = model.image();
        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::CropTop),
            0.0,
            -20.0,
        );
        assert_eq!(model.crop(), Rect::new(100.0, 80.0, 400.0, 320.0));
        assert_eq!(model.image(), before_image);
    }

    #[test]
    fn edge_handles_only_touch_their_own_fields() {
        let mut model = model();
        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::CropRight),
            30.0,
            99.0,
        );
        assert_eq!(model.crop(), Rect::new(100.0, 100.0, 430.0, 300.0));

        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::CropBottom),
            99.0,
            -40.0,
        );
        assert_eq!(model.crop(), Rect::new(100.0, 100.0, 430.0, 260.0));

        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::CropLeft),
            25.0,
            99.0,
        );
        assert_eq!(model.crop(), Rect::new(125.0, 100.0, 405.0, 260.0));
    }

    #[test]
    fn corner_handles_resize_image_on_owned_axes() {
        let cases = [
            (
                HandleKind::ImageTopLeft,
                Rect::new(160.0, 155.0, 190.0, 95.0),
            ),
            (
                HandleKind::ImageTopRight,
                Rect::new(150.0, 155.0, 210.0, 95.0),
            ),
            (
                HandleKind::ImageBottomRight,
                Rect::new(150.0, 150.0, 210.0, 105.0),
            ),
            (
                HandleKind::ImageBottomLeft,
                Rect::new(160.0, 150.0, 190.0, 105.0),
            ),
        ];
        for (kind, expected) in cases {
            let mut model = model();
            apply_drag_delta(&mut model, DragState::DraggingHandle(kind), 10.0, 5.0);
            assert_eq!(model.image(), expected, "{kind:?}");
            assert_eq!(model.crop(), Rect::new(100.0, 100.0, 400.0, 300.0));
        }
    }

    #[test]
    fn shrinking_below_floor_clamps_in_place_while_origin_keeps_moving() {
        let mut model = model();
        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::ImageTopLeft),
            180.0,
            0.0,
        );
        let image = model.image();
        assert_eq!(image.x, 330.0);
        assert_eq!(image.width, MIN_WINDOW_SIZE);

        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::CropLeft),
            390.0,
            0.0,
        );
        let crop = model.crop();
        assert_eq!(crop.x, 490.0);
        assert_eq!(crop.width, MIN_WINDOW_SIZE);
    }

    #[test]
    fn image_height_is_not_floored() {
        let mut model = model();
        apply_drag_delta(
            &mut model,
            DragState::DraggingHandle(HandleKind::ImageBottomRight),
            0.0,
            -90.0,
        );
        assert_eq!(model.image().height, 10.0);
    }

    #[test]
    fn floors_hold_across_a_long_drag_sequence() {
        let mut model = model();
        let states = [
            DragState::DraggingHandle(HandleKind::CropTop),
            DragState::DraggingHandle(HandleKind::CropRight),
            DragState::DraggingHandle(HandleKind::CropBottom),
            DragState::DraggingHandle(HandleKind::CropLeft),
            DragState::DraggingHandle(HandleKind::ImageTopLeft),
            DragState::DraggingHandle(HandleKind::ImageTopRight),
            DragState::DraggingHandle(HandleKind::ImageBottomRight),
            DragState::DraggingHandle(HandleKind::ImageBottomLeft),
            DragState::DraggingCrop,
            DragState::DraggingImage,
        ];
        for step in 0..200 {
            let state = states[step % states.len()];
            let dx = f64::from((step * 37 % 91) as u32) - 45.0;
            let dy = f64::from((step * 53 % 83) as u32) - 41.0;
            apply_drag_delta(&mut model, state, dx, dy);
            assert!(model.crop().width >= MIN_WINDOW_SIZE);
            assert!(model.crop().height >= MIN_WINDOW_SIZE);
            assert!(model.image().width >= MIN_WINDOW_SIZE);
        }
    }

    #[test]
    fn idle_state_leaves_model_untouched() {
        let mut model = model();
        assert!(!apply_drag_delta(&mut model, DragState::Idle, 50.0, 50.0));
        assert_eq!(model, self::model());
    }
}
