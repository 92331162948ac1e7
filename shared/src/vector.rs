/// A point or velocity on the playfield, in pixels (or pixels per second).
///
/// `x` grows to the right and `y` grows downward, matching screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn scale(&self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_magnitude() {
        assert_approx_eq!(Vec2::new(3.0, -4.0).magnitude(), 5.0);
        assert_eq!(Vec2::new(0.0, 0.0).magnitude(), 0.0);
    }

    #[test]
    fn test_integrates_position() {
        // One 1/60 s tick at 300 px/s to the left.
        let position = Vec2::new(400.0, 300.0);
        let velocity = Vec2::new(-300.0, 60.0);
        let next = position.add(&velocity.scale(1.0 / 60.0));
        assert_approx_eq!(next.x, 395.0);
        assert_approx_eq!(next.y, 301.0);
    }
}
