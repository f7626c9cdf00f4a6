use itertools::Itertools;
use nalgebra_glm as glm;

/// Lasso drawn by the user, in normalized device coordinates. Points are
/// added while dragging and the polygon is frozen by `complete`.
#[derive(Clone, Debug, Default)]
pub struct SelectionPolygon {
    points: Vec<glm::Vec2>,
    completed: bool,
    epsilon: f32,
}

impl SelectionPolygon {
    /// `epsilon` is the distance below which a new point is treated as a
    /// duplicate of the previous one
    #[must_use]
    pub const fn new(epsilon: f32) -> Self {
        Self {
            points: Vec::new(),
            completed: false,
            epsilon,
        }
    }

    /// Builds a completed polygon from a list of points, dropping near
    /// duplicates
    #[must_use]
    pub fn from_points(points: &[glm::Vec2], epsilon: f32) -> Self {
        let mut polygon = Self::new(epsilon);
        for p in points {
            polygon.push(*p);
        }
        polygon.complete();
        polygon
    }

    /// Adds a point while dragging. Ignored once completed, and ignored if it
    /// is within `epsilon` of the previous point. Returns true if the point
    /// was kept.
    pub fn push(&mut self, point: glm::Vec2) -> bool {
        if self.completed {
            return false;
        }
        if self
            .points
            .last()
            .is_some_and(|last| glm::distance(last, &point) < self.epsilon)
        {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Freezes the polygon. A closing point that repeats the first point is
    /// dropped.
    pub fn complete(&mut self) {
        if self.points.len() > 1 {
            if let (Some(first), Some(last)) =
                (self.points.first(), self.points.last())
            {
                if glm::distance(first, last) < self.epsilon {
                    self.points.pop();
                }
            }
        }
        self.completed = true;
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.completed = false;
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Fewer than 3 distinct points encloses nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    #[must_use]
    pub fn points(&self) -> &[glm::Vec2] {
        &self.points
    }

    /// Even-odd test of a point in NDC. Always false for an empty polygon.
    #[must_use]
    pub fn contains(&self, point: &glm::Vec2) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.points.iter().circular_tuple_windows() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionPolygon;
    use nalgebra_glm as glm;

    #[test]
    fn near_duplicates_dropped() {
        let mut polygon = SelectionPolygon::new(0.01);
        assert!(polygon.push(glm::vec2(0.0, 0.0)));
        assert!(!polygon.push(glm::vec2(0.001, 0.0)));
        assert!(polygon.push(glm::vec2(0.5, 0.0)));
        assert!(polygon.push(glm::vec2(0.5, 0.5)));
        assert!(polygon.push(glm::vec2(0.0, 0.001)));
        polygon.complete();
        // Closing point duplicates the first
        assert_eq!(polygon.points().len(), 3);
        assert!(!polygon.push(glm::vec2(-0.5, -0.5)));
    }

    #[test]
    fn contains_square() {
        let polygon = SelectionPolygon::from_points(
            &[
                glm::vec2(-0.5, -0.5),
                glm::vec2(0.5, -0.5),
                glm::vec2(0.5, 0.5),
                glm::vec2(-0.5, 0.5),
            ],
            1.0e-3,
        );
        assert!(polygon.contains(&glm::vec2(0.0, 0.0)));
        assert!(!polygon.contains(&glm::vec2(0.7, 0.0)));
    }

    #[test]
    fn two_points_are_empty() {
        let polygon = SelectionPolygon::from_points(
            &[glm::vec2(0.0, 0.0), glm::vec2(0.5, 0.5)],
            1.0e-3,
        );
        assert!(polygon.is_empty());
        assert!(!polygon.contains(&glm::vec2(0.25, 0.25)));
    }
}
