//! Editor-panel inputs and the manager table's row view.

use serde::{Deserialize, Serialize};

use super::{Bounds, MIN_SIZE, OverlayRecord, ProcessFilter, Rgb};

/// Screen extent the editor's numeric inputs are bounded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenBounds {
    /// Clamp typed geometry the way the editor's spin boxes do: position
    /// within the screen, size between [`MIN_SIZE`] and the screen extent.
    pub fn clamp(&self, bounds: Bounds) -> Bounds {
        let max_w = self.width.max(MIN_SIZE);
        let max_h = self.height.max(MIN_SIZE);
        Bounds {
            x: bounds.x.clamp(0, max_w),
            y: bounds.y.clamp(0, max_h),
            width: bounds.width.clamp(MIN_SIZE, max_w),
            height: bounds.height.clamp(MIN_SIZE, max_h),
        }
    }
}

/// One change from the editor panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "kebab-case")]
pub enum OverlayEdit {
    Geometry(Bounds),
    /// Slider position, 0–100.
    OpacityPercent(u8),
    Process(ProcessFilter),
    Color(Rgb),
    Border(u32),
}

pub fn opacity_from_percent(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayStatus {
    Active,
    Disabled,
}

/// One line of the manager table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRow {
    pub index: usize,
    pub app: String,
    pub process: String,
    pub status: OverlayStatus,
}

impl OverlayRow {
    pub fn new(display_index: usize, record: &OverlayRecord) -> Self {
        Self {
            index: display_index,
            app: "Overlay".to_string(),
            process: record.process.to_string(),
            status: if record.active {
                OverlayStatus::Active
            } else {
                OverlayStatus::Disabled
            },
        }
    }
}
