//! The persisted overlay entity and the value types it is built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Smallest width or height an overlay may take, in pixels.
pub const MIN_SIZE: i32 = 10;

/// Side length of a freshly added overlay.
pub const DEFAULT_SIZE: i32 = 100;

/// Process filter sentinel that matches every foreground process.
pub const ALL_PROCESSES: &str = "All";

/// Stable identity of one record/surface pair for the lifetime of the process.
///
/// Unlike the display index, an id never changes when other overlays are
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

impl FromStr for OverlayId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("overlay-")
            .and_then(|n| n.parse().ok())
            .map(OverlayId)
            .ok_or_else(|| Error::Surface(format!("not an overlay label: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pull the rectangle back inside the geometry invariants: non-negative
    /// position and at least [`MIN_SIZE`] on both axes.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0),
            y: self.y.max(0),
            width: self.width.max(MIN_SIZE),
            height: self.height.max(MIN_SIZE),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x >= 0 && self.y >= 0 && self.width >= MIN_SIZE && self.height >= MIN_SIZE
    }

    pub fn with_position(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0, 0, DEFAULT_SIZE, DEFAULT_SIZE)
    }
}

/// 8-bit RGB color, persisted as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness on a 0–255 scale (ITU-R BT.601 weights).
    pub fn luminance(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `#rrggbb` and the short `#rgb` form, in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                Ok(Self::new(
                    channel(0).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                    channel(4).map_err(|_| invalid())?,
                ))
            }
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(
                    channel(0).map_err(|_| invalid())?,
                    channel(1).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                ))
            }
            _ => Err(invalid()),
        }
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which foreground process an overlay is restricted to.
///
/// Matching is exact and case-sensitive against the executable name the OS
/// reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessFilter {
    #[default]
    All,
    Process(String),
}

impl ProcessFilter {
    pub fn matches(&self, current: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Process(name) => current == Some(name.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_PROCESSES,
            Self::Process(name) => name,
        }
    }
}

impl fmt::Display for ProcessFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProcessFilter {
    fn from(value: String) -> Self {
        if value == ALL_PROCESSES {
            Self::All
        } else {
            Self::Process(value)
        }
    }
}

impl From<&str> for ProcessFilter {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProcessFilter> for String {
    fn from(filter: ProcessFilter) -> Self {
        match filter {
            ProcessFilter::All => ALL_PROCESSES.to_string(),
            ProcessFilter::Process(name) => name,
        }
    }
}

/// One user-defined overlay as stored in `overlays.json`.
///
/// The display index is deliberately absent: it is derived from the record's
/// position in the owning collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    #[serde(flatten)]
    pub bounds: Bounds,
    pub color: Rgb,
    pub border: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub process: ProcessFilter,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for OverlayRecord {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            color: Rgb::BLACK,
            border: 0,
            opacity: 1.0,
            process: ProcessFilter::All,
            active: true,
        }
    }
}

impl OverlayRecord {
    /// Clamp every field into its documented range. Applied to anything read
    /// from disk so hand-edited files cannot break the invariants.
    pub fn normalized(self) -> Self {
        let opacity = if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        };
        Self {
            bounds: self.bounds.clamped(),
            opacity,
            ..self
        }
    }
}
