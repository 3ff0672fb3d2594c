use crate::foundation::error::{StageError, StageResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Design aspect ratio of the presentation surface.
pub const STAGE_ASPECT: f64 = 16.0 / 9.0;

/// Logical size of the presentation surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageSize {
    pub width: f64,
    pub height: f64,
}

impl StageSize {
    pub fn new(width: f64, height: f64) -> StageResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(StageError::validation(
                "stage size must be finite and > 0 in both dimensions",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn as_size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Map a normalized (0..1) stage coordinate to pixels.
    pub fn to_pixels(self, normalized: Point) -> Point {
        Point::new(normalized.x * self.width, normalized.y * self.height)
    }
}

impl Default for StageSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Largest 16:9 stage that fits inside `viewport` (letterboxed or pillarboxed).
pub fn fit_stage(viewport: Size) -> StageResult<StageSize> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Err(StageError::validation("viewport must be > 0 in both dimensions"));
    }
    if viewport.width / viewport.height > STAGE_ASPECT {
        StageSize::new(viewport.height * STAGE_ASPECT, viewport.height)
    } else {
        StageSize::new(viewport.width, viewport.width / STAGE_ASPECT)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` / `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> StageResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| -> StageResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| StageError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(StageError::validation(format!("invalid hex color '{s}'"))),
        }
    }

    /// Premultiplied channels, rounded like the decoder's premultiply.
    pub fn premultiplied(self) -> [u8; 4] {
        let premul = |c: u8| -> u8 { ((u16::from(c) * u16::from(self.a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
