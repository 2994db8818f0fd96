//! Show/hide decisions for overlays.

use super::OverlayRecord;

/// Whether `record` should be on screen while `current` owns the focused
/// window. `None` means the foreground process is unknown, which only the
/// `All` filter accepts.
pub fn should_show(record: &OverlayRecord, current: Option<&str>) -> bool {
    record.active && record.process.matches(current)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    Show,
    Hide,
}

/// The surface call needed to bring `visible` in line with `wanted`, if any.
pub fn reconcile(wanted: bool, visible: bool) -> Option<VisibilityChange> {
    match (wanted, visible) {
        (true, false) => Some(VisibilityChange::Show),
        (false, true) => Some(VisibilityChange::Hide),
        _ => None,
    }
}
