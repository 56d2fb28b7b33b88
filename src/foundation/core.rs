use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// 0-based index of an input image slot referenced by a formula (`I0`, `I1`, ...).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ImageIndex(pub u32);

impl ImageIndex {
    /// Return `true` when this index addresses one of `num_images` sources.
    pub fn is_within(self, num_images: usize) -> bool {
        (self.0 as usize) < num_images
    }
}

impl fmt::Display for ImageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// Half-open byte range `[start, end)` into formula source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Inclusive start byte.
    pub start: usize,
    /// Exclusive end byte.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of bytes covered.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Return `true` when the span covers no bytes.
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Straight-alpha linear RGBA sample, one `f32` per channel.
///
/// Formulas operate component-wise on these, the same way a fragment shader operates on
/// `vec4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::splat(0.0);

    /// Build a sample from its four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Broadcast one value into all four channels.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Apply `f` to every channel.
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b), f(self.a))
    }

    /// Combine two samples channel by channel.
    pub fn zip(self, other: Rgba, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
            f(self.a, other.a),
        )
    }

    /// Combine three samples channel by channel.
    pub fn zip3(self, b: Rgba, c: Rgba, mut f: impl FnMut(f32, f32, f32) -> f32) -> Self {
        Self::new(
            f(self.r, b.r, c.r),
            f(self.g, b.g, c.g),
            f(self.b, b.b, c.b),
            f(self.a, b.a, c.a),
        )
    }

    /// Clamp every channel into `[0, 1]`. NaN becomes 0.
    pub fn saturate(self) -> Self {
        self.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
    }

    /// Convert to straight-alpha RGBA8 with rounding.
    pub fn to_rgba8(self) -> [u8; 4] {
        let s = self.saturate();
        let q = |c: f32| (c * 255.0 + 0.5) as u8;
        [q(s.r), q(s.g), q(s.b), q(s.a)]
    }

    /// Convert from straight-alpha RGBA8.
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        let f = |c: u8| f32::from(c) / 255.0;
        Self::new(f(px[0]), f(px[1]), f(px[2]), f(px[3]))
    }
}

impl Add for Rgba {
    type Output = Rgba;

    fn add(self, rhs: Rgba) -> Rgba {
        self.zip(rhs, |a, b| a + b)
    }
}

impl Sub for Rgba {
    type Output = Rgba;

    fn sub(self, rhs: Rgba) -> Rgba {
        self.zip(rhs, |a, b| a - b)
    }
}

impl Mul for Rgba {
    type Output = Rgba;

    fn mul(self, rhs: Rgba) -> Rgba {
        self.zip(rhs, |a, b| a * b)
    }
}

impl Div for Rgba {
    type Output = Rgba;

    fn div(self, rhs: Rgba) -> Rgba {
        self.zip(rhs, |a, b| a / b)
    }
}

impl Neg for Rgba {
    type Output = Rgba;

    fn neg(self) -> Rgba {
        self.map(|c| -c)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
