use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of `size` centered inside `outer`.
    ///
    /// When `size` exceeds `outer` the result is pinned to `outer`'s origin.
    #[inline]
    pub fn centered_in(outer: Rect, size: Vec2) -> Self {
        let x = outer.origin.x + ((outer.size.x - size.x) * 0.5).max(0.0);
        let y = outer.origin.y + ((outer.size.y - size.y) * 0.5).max(0.0);
        Rect::new(x, y, size.x, size.y)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        let max = r.max();
        p.is_finite() && p.x >= r.origin.x && p.y >= r.origin.y && p.x < max.x && p.y < max.y
    }
}
