//! Geometry APIs
//!
//! DOMRect and the rect arithmetic intersection observation needs.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get intersection rect, `None` when the overlap has no area
    pub fn intersection(&self, other: &DOMRect) -> Option<DOMRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(DOMRect::from_xywh(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Check if rects overlap or touch
    pub fn touches(&self, other: &DOMRect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Grow on every side by `margin` (negative shrinks)
    pub fn expand(&self, margin: f64) -> DOMRect {
        DOMRect {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + margin * 2.0).max(0.0),
            height: (self.height + margin * 2.0).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = DOMRect::from_xywh(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(DOMRect::from_xywh(50.0, 50.0, 50.0, 50.0)));

        let c = DOMRect::from_xywh(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&c), None);
        assert!(a.touches(&c));
    }

    #[test]
    fn test_expand() {
        let viewport = DOMRect::from_xywh(100.0, 100.0, 400.0, 300.0);
        let expanded = viewport.expand(50.0);

        assert_eq!(expanded.x, 50.0);
        assert_eq!(expanded.y, 50.0);
        assert_eq!(expanded.width, 500.0);
        assert_eq!(expanded.height, 400.0);
    }
}
