//! Geometry value types
//!
//! Plain-old-data types that controllers keep as presentation state. Each
//! type can be flattened into animation channels and rebuilt from them, so
//! a single interpolation task can drive every component in lock-step.

// ─────────────────────────────────────────────────────────────────────────────
// Core Geometry Types
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn mid_x(&self) -> f32 {
        self.origin.x + self.size.width / 2.0
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.origin.y + self.size.height / 2.0)
    }

    /// Flatten into `[x, y, width, height]` channel order
    pub fn to_array(&self) -> [f32; 4] {
        [
            self.origin.x,
            self.origin.y,
            self.size.width,
            self.size.height,
        ]
    }

    /// Rebuild from `[x, y, width, height]`; missing trailing values are zero
    pub fn from_slice(values: &[f32]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Rect::new(at(0), at(1), at(2), at(3))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color (linear space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Rebuild from `[r, g, b, a]`; a missing alpha is opaque
    pub fn from_slice(values: &[f32]) -> Self {
        let at = |i: usize, fallback: f32| values.get(i).copied().unwrap_or(fallback);
        Color::rgba(at(0, 0.0), at(1, 0.0), at(2, 0.0), at(3, 1.0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_accessors() {
        let r = Rect::new(30.0, 10.0, 20.0, 60.0);

        assert_eq!(r.mid_x(), 40.0);
        assert_eq!(r.max_y(), 70.0);
        assert_eq!(r.center(), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_rect_channel_layout() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.to_array(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Rect::from_slice(&r.to_array()), r);

        // Short slices pad with zero
        assert_eq!(Rect::from_slice(&[5.0]), Rect::new(5.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_color() {
        let c = Color::from_hex(0x3b82ea);
        assert!((c.r - 59.0 / 255.0).abs() < 0.001);
        assert!((c.b - 234.0 / 255.0).abs() < 0.001);
        assert_eq!(c.a, 1.0);

        let c2 = c.with_alpha(0.5);
        assert_eq!(c2.a, 0.5);
        assert_eq!(Color::from_slice(&c2.to_array()), c2);
        assert_eq!(Color::from_slice(&[1.0, 1.0, 1.0]), Color::WHITE);
    }
}
