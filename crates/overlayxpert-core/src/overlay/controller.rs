//! Per-overlay edit state machine.
//!
//! A controller is `Locked` (click-through) until edit mode is switched on.
//! While `Editing`, pointer presses near an edge resize the surface, presses
//! elsewhere drag it, and plain hovering only updates the cursor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Bounds, CursorHint, MIN_SIZE, Point, RenderableSurface};
use crate::Error;

/// Width of the resize band along every edge, in pixels.
pub const DEFAULT_EDGE_MARGIN: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeDirection {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeDirection {
    /// Which resize zone `pos` (surface-local) falls in, if any.
    ///
    /// Corners need proximity to both adjacent edges and win over a plain
    /// edge. The left and top bands are checked before right and bottom, so
    /// on a surface narrower than two margins the left/top side wins.
    pub fn hit_test(pos: Point, width: i32, height: i32, margin: i32) -> Option<Self> {
        let near_top = pos.y <= margin;
        let near_bottom = pos.y >= height.saturating_sub(margin);

        if pos.x <= margin {
            Some(if near_top {
                Self::TopLeft
            } else if near_bottom {
                Self::BottomLeft
            } else {
                Self::Left
            })
        } else if pos.x >= width.saturating_sub(margin) {
            Some(if near_top {
                Self::TopRight
            } else if near_bottom {
                Self::BottomRight
            } else {
                Self::Right
            })
        } else if near_top {
            Some(Self::Top)
        } else if near_bottom {
            Some(Self::Bottom)
        } else {
            None
        }
    }

    pub fn has_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub fn has_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub fn has_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub fn has_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    pub fn cursor(self) -> CursorHint {
        match self {
            Self::TopLeft | Self::BottomRight => CursorHint::SizeFDiagonal,
            Self::TopRight | Self::BottomLeft => CursorHint::SizeBDiagonal,
            Self::Left | Self::Right => CursorHint::SizeHorizontal,
            Self::Top | Self::Bottom => CursorHint::SizeVertical,
        }
    }

    /// Geometry after the pointer moved to `pos` (surface-local) while
    /// resizing from `bounds`.
    ///
    /// Left/top edges treat the pointer offset as a delta from the edge;
    /// right/bottom edges treat it as the new extent. Pointer input comes
    /// over IPC unchecked, so the arithmetic saturates.
    pub fn apply(self, bounds: Bounds, pos: Point) -> Bounds {
        let mut next = bounds;
        if self.has_left() {
            next.x = bounds.x.saturating_add(pos.x).max(0);
            next.width = bounds.width.saturating_sub(pos.x).max(MIN_SIZE);
        }
        if self.has_right() {
            next.width = pos.x.max(MIN_SIZE);
        }
        if self.has_top() {
            next.y = bounds.y.saturating_add(pos.y).max(0);
            next.height = bounds.height.saturating_sub(pos.y).max(MIN_SIZE);
        }
        if self.has_bottom() {
            next.height = pos.y.max(MIN_SIZE);
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Pointer input in surface-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PointerEvent {
    Down {
        pos: Point,
        #[serde(default)]
        button: PointerButton,
    },
    Move {
        pos: Point,
    },
    Up {
        pos: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Dragging { press: Point },
    Resizing { direction: ResizeDirection, press: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Locked,
    Editing(Gesture),
}

/// What the owning collection has to react to after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A press arrived in edit mode; the sweep must pause.
    GestureStarted,
    /// Geometry moved mid-gesture; sync and persist.
    GeometryChanged,
    /// The press ended; sync final geometry, persist, resume the sweep.
    GestureEnded,
}

pub struct OverlayController<S> {
    surface: S,
    state: EditState,
    margin: i32,
}

impl<S: RenderableSurface> OverlayController<S> {
    pub fn new(surface: S, margin: i32) -> Self {
        Self {
            surface,
            state: EditState::Locked,
            margin,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn is_gesture_active(&self) -> bool {
        matches!(
            self.state,
            EditState::Editing(Gesture::Dragging { .. } | Gesture::Resizing { .. })
        )
    }

    /// Switch between click-through and editable. Any gesture in progress is
    /// dropped.
    pub fn set_edit_mode(&mut self, editing: bool) -> Result<(), Error> {
        if editing == self.is_editing() {
            return Ok(());
        }
        self.surface.set_input_transparent(!editing)?;
        if editing {
            self.state = EditState::Editing(Gesture::Idle);
            self.surface.set_cursor(CursorHint::OpenHand)?;
        } else {
            self.state = EditState::Locked;
            self.surface.set_cursor(CursorHint::Arrow)?;
        }
        Ok(())
    }

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
    ) -> Result<Option<ControllerEvent>, Error> {
        let EditState::Editing(gesture) = self.state else {
            return Ok(None);
        };

        match event {
            PointerEvent::Down { pos, button } => Ok(Some(self.pointer_down(pos, button))),
            PointerEvent::Move { pos } => self.pointer_move(gesture, pos),
            PointerEvent::Up { .. } => self.pointer_up(gesture).map(Some),
        }
    }

    /// Report a geometry change made outside the gesture path, e.g. by the
    /// editor panel. Only matters while editing.
    pub fn surface_resized(&self) -> Option<ControllerEvent> {
        self.is_editing().then_some(ControllerEvent::GeometryChanged)
    }

    /// Move/resize the surface programmatically, clamped to the invariants.
    pub fn apply_bounds(&mut self, bounds: Bounds) -> Result<Bounds, Error> {
        let bounds = bounds.clamped();
        if bounds != self.surface.bounds() {
            self.surface.set_bounds(bounds)?;
        }
        Ok(bounds)
    }

    fn pointer_down(&mut self, pos: Point, button: PointerButton) -> ControllerEvent {
        if button == PointerButton::Primary {
            let bounds = self.surface.bounds();
            let gesture =
                match ResizeDirection::hit_test(pos, bounds.width, bounds.height, self.margin) {
                    Some(direction) => Gesture::Resizing {
                        direction,
                        press: pos,
                    },
                    None => Gesture::Dragging { press: pos },
                };
            debug!(?gesture, "gesture started");
            self.state = EditState::Editing(gesture);
        }
        ControllerEvent::GestureStarted
    }

    fn pointer_move(
        &mut self,
        gesture: Gesture,
        pos: Point,
    ) -> Result<Option<ControllerEvent>, Error> {
        let bounds = self.surface.bounds();
        match gesture {
            Gesture::Dragging { press } => {
                self.surface.set_cursor(CursorHint::SizeAll)?;
                let x = bounds.x.saturating_add(pos.x.saturating_sub(press.x)).max(0);
                let y = bounds.y.saturating_add(pos.y.saturating_sub(press.y)).max(0);
                self.surface.set_bounds(bounds.with_position(x, y))?;
                // Every drag step is reported, moved or not, so the store
                // tracks the gesture live.
                Ok(Some(ControllerEvent::GeometryChanged))
            }
            Gesture::Resizing { direction, .. } => {
                self.surface.set_cursor(direction.cursor())?;
                let next = direction.apply(bounds, pos);
                if next == bounds {
                    return Ok(None);
                }
                self.surface.set_bounds(next)?;
                Ok(Some(ControllerEvent::GeometryChanged))
            }
            Gesture::Idle => {
                let cursor =
                    ResizeDirection::hit_test(pos, bounds.width, bounds.height, self.margin)
                        .map_or(CursorHint::OpenHand, ResizeDirection::cursor);
                self.surface.set_cursor(cursor)?;
                Ok(None)
            }
        }
    }

    fn pointer_up(&mut self, gesture: Gesture) -> Result<ControllerEvent, Error> {
        if let Gesture::Resizing { .. } = gesture {
            self.surface.set_cursor(CursorHint::Arrow)?;
        }
        if gesture != Gesture::Idle {
            debug!(?gesture, "gesture ended");
        }
        self.state = EditState::Editing(Gesture::Idle);
        Ok(ControllerEvent::GestureEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeSurface {
        bounds: Bounds,
        transparent: bool,
        cursor: CursorHint,
        set_bounds_calls: usize,
    }

    impl FakeSurface {
        fn at(x: i32, y: i32, width: i32, height: i32) -> Self {
            Self {
                bounds: Bounds::new(x, y, width, height),
                transparent: true,
                cursor: CursorHint::Arrow,
                set_bounds_calls: 0,
            }
        }
    }

    impl RenderableSurface for FakeSurface {
        fn set_bounds(&mut self, bounds: Bounds) -> Result<(), Error> {
            self.bounds = bounds;
            self.set_bounds_calls += 1;
            Ok(())
        }

        fn bounds(&self) -> Bounds {
            self.bounds
        }

        fn set_opacity(&mut self, _opacity: f64) -> Result<(), Error> {
            Ok(())
        }

        fn set_input_transparent(&mut self, transparent: bool) -> Result<(), Error> {
            self.transparent = transparent;
            Ok(())
        }

        fn set_cursor(&mut self, cursor: CursorHint) -> Result<(), Error> {
            self.cursor = cursor;
            Ok(())
        }

        fn show(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn hide(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn is_visible(&self) -> bool {
            true
        }

        fn request_redraw(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn destroy(self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn editing(surface: FakeSurface) -> OverlayController<FakeSurface> {
        let mut controller = OverlayController::new(surface, DEFAULT_EDGE_MARGIN);
        controller.set_edit_mode(true).unwrap();
        controller
    }

    fn down(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Down {
            pos: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    fn move_to(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Move {
            pos: Point::new(x, y),
        }
    }

    fn up(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Up {
            pos: Point::new(x, y),
        }
    }

    #[test]
    fn hit_test_prefers_corners() {
        let hit = |x, y| ResizeDirection::hit_test(Point::new(x, y), 100, 100, 10);
        assert_eq!(hit(2, 3), Some(ResizeDirection::TopLeft));
        assert_eq!(hit(95, 3), Some(ResizeDirection::TopRight));
        assert_eq!(hit(5, 95), Some(ResizeDirection::BottomLeft));
        assert_eq!(hit(99, 99), Some(ResizeDirection::BottomRight));
        assert_eq!(hit(0, 50), Some(ResizeDirection::Left));
        assert_eq!(hit(90, 50), Some(ResizeDirection::Right));
        assert_eq!(hit(50, 10), Some(ResizeDirection::Top));
        assert_eq!(hit(50, 90), Some(ResizeDirection::Bottom));
        assert_eq!(hit(50, 50), None);
        assert_eq!(hit(11, 11), None);
    }

    #[test]
    fn locked_controller_ignores_pointer_input() {
        let mut controller = OverlayController::new(FakeSurface::at(0, 0, 100, 100), 10);
        assert_eq!(controller.handle_pointer(down(50, 50)).unwrap(), None);
        assert_eq!(controller.handle_pointer(move_to(80, 80)).unwrap(), None);
        assert_eq!(controller.handle_pointer(up(80, 80)).unwrap(), None);
        assert_eq!(controller.surface().bounds, Bounds::new(0, 0, 100, 100));
    }

    #[test]
    fn edit_mode_toggles_input_transparency() {
        let mut controller = OverlayController::new(FakeSurface::at(0, 0, 100, 100), 10);
        controller.set_edit_mode(true).unwrap();
        assert!(!controller.surface().transparent);
        assert_eq!(controller.state(), EditState::Editing(Gesture::Idle));
        controller.set_edit_mode(false).unwrap();
        assert!(controller.surface().transparent);
        assert_eq!(controller.state(), EditState::Locked);
    }

    #[test]
    fn resize_left_moves_origin_and_shrinks() {
        let mut controller = editing(FakeSurface::at(50, 50, 100, 100));
        controller.handle_pointer(down(2, 50)).unwrap();
        let event = controller.handle_pointer(move_to(15, 50)).unwrap();
        assert_eq!(event, Some(ControllerEvent::GeometryChanged));
        assert_eq!(controller.surface().bounds, Bounds::new(65, 50, 85, 100));
    }

    #[test]
    fn resize_right_floors_at_min_size() {
        let mut controller = editing(FakeSurface::at(50, 50, 100, 100));
        controller.handle_pointer(down(98, 50)).unwrap();
        controller.handle_pointer(move_to(5, 50)).unwrap();
        assert_eq!(controller.surface().bounds.width, 10);
    }

    #[test]
    fn resize_top_left_clamps_position_and_size() {
        let mut controller = editing(FakeSurface::at(5, 5, 40, 40));
        controller.handle_pointer(down(1, 1)).unwrap();
        controller.handle_pointer(move_to(-20, 35)).unwrap();
        let bounds = controller.surface().bounds;
        assert_eq!(bounds, Bounds::new(0, 40, 60, 10));
        assert!(bounds.is_valid());
    }

    #[test]
    fn resize_without_change_is_not_reported() {
        let mut controller = editing(FakeSurface::at(0, 0, 100, 100));
        controller.handle_pointer(down(99, 50)).unwrap();
        assert_eq!(controller.handle_pointer(move_to(100, 50)).unwrap(), None);
        assert_eq!(controller.surface().set_bounds_calls, 0);
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let mut controller = editing(FakeSurface::at(0, 10, 100, 100));
        controller.handle_pointer(down(50, 50)).unwrap();
        controller.handle_pointer(move_to(70, 45)).unwrap();
        assert_eq!(controller.surface().bounds, Bounds::new(20, 5, 100, 100));
        assert_eq!(controller.surface().cursor, CursorHint::SizeAll);
    }

    #[test]
    fn drag_clamps_at_screen_origin() {
        let mut controller = editing(FakeSurface::at(0, 10, 100, 100));
        controller.handle_pointer(down(50, 50)).unwrap();
        controller.handle_pointer(move_to(70, 35)).unwrap();
        assert_eq!(controller.surface().bounds, Bounds::new(20, 0, 100, 100));
    }

    #[test]
    fn drag_reports_every_move() {
        let mut controller = editing(FakeSurface::at(0, 0, 100, 100));
        controller.handle_pointer(down(50, 50)).unwrap();
        let event = controller.handle_pointer(move_to(50, 50)).unwrap();
        assert_eq!(event, Some(ControllerEvent::GeometryChanged));
    }

    #[test]
    fn hover_only_updates_cursor() {
        let mut controller = editing(FakeSurface::at(0, 0, 100, 100));
        assert_eq!(controller.handle_pointer(move_to(2, 98)).unwrap(), None);
        assert_eq!(controller.surface().cursor, CursorHint::SizeBDiagonal);
        assert_eq!(controller.handle_pointer(move_to(50, 2)).unwrap(), None);
        assert_eq!(controller.surface().cursor, CursorHint::SizeVertical);
        assert_eq!(controller.handle_pointer(move_to(50, 50)).unwrap(), None);
        assert_eq!(controller.surface().cursor, CursorHint::OpenHand);
        assert_eq!(controller.surface().set_bounds_calls, 0);
    }

    #[test]
    fn release_always_reports_and_returns_to_idle() {
        let mut controller = editing(FakeSurface::at(0, 0, 100, 100));
        assert_eq!(
            controller.handle_pointer(up(0, 0)).unwrap(),
            Some(ControllerEvent::GestureEnded)
        );

        controller.handle_pointer(down(99, 99)).unwrap();
        assert!(controller.is_gesture_active());
        assert_eq!(
            controller.handle_pointer(up(99, 99)).unwrap(),
            Some(ControllerEvent::GestureEnded)
        );
        assert_eq!(controller.state(), EditState::Editing(Gesture::Idle));
        assert_eq!(controller.surface().cursor, CursorHint::Arrow);
    }

    #[test]
    fn secondary_press_pauses_without_gesture() {
        let mut controller = editing(FakeSurface::at(0, 0, 100, 100));
        let event = controller
            .handle_pointer(PointerEvent::Down {
                pos: Point::new(50, 50),
                button: PointerButton::Secondary,
            })
            .unwrap();
        assert_eq!(event, Some(ControllerEvent::GestureStarted));
        assert_eq!(controller.state(), EditState::Editing(Gesture::Idle));
    }

    #[test]
    fn extreme_pointer_positions_saturate() {
        let mut controller = editing(FakeSurface::at(0, 10, 100, 100));
        controller.handle_pointer(down(50, 50)).unwrap();
        controller.handle_pointer(move_to(-2_147_483_600, 50)).unwrap();
        assert_eq!(controller.surface().bounds, Bounds::new(0, 10, 100, 100));
        controller.handle_pointer(move_to(i32::MAX, i32::MIN)).unwrap();
        assert_eq!(
            controller.surface().bounds,
            Bounds::new(i32::MAX - 50, 0, 100, 100)
        );
        controller.handle_pointer(up(0, 0)).unwrap();

        let mut controller = editing(FakeSurface::at(50, 50, 100, 100));
        controller.handle_pointer(down(2, 2)).unwrap();
        controller.handle_pointer(move_to(i32::MIN, i32::MAX)).unwrap();
        assert_eq!(controller.surface().bounds, Bounds::new(0, i32::MAX, i32::MAX, 10));
    }

    #[test]
    fn surface_resize_only_reported_while_editing() {
        let mut controller = OverlayController::new(FakeSurface::at(0, 0, 100, 100), 10);
        assert_eq!(controller.surface_resized(), None);
        controller.set_edit_mode(true).unwrap();
        assert_eq!(
            controller.surface_resized(),
            Some(ControllerEvent::GeometryChanged)
        );
    }

    #[test]
    fn apply_bounds_clamps_input() {
        let mut controller = OverlayController::new(FakeSurface::at(0, 0, 100, 100), 10);
        let applied = controller.apply_bounds(Bounds::new(-5, 20, 3, 40)).unwrap();
        assert_eq!(applied, Bounds::new(0, 20, 10, 40));
        assert_eq!(controller.surface().bounds, applied);
    }

    #[test]
    fn pointer_events_deserialize_from_tagged_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"down","pos":{"x":3,"y":4}}"#).unwrap();
        assert_eq!(event, down(3, 4));
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"move","pos":{"x":-1,"y":9}}"#).unwrap();
        assert_eq!(event, move_to(-1, 9));
    }
}
