//! Convex polygon representation and in-place transforms.
//!
//! Vertices are an ordered closed loop (vertex `i` connects to
//! `i + 1 mod n`) kept in world coordinates; bodies move their shape by
//! translating/rotating the vertices directly rather than composing a
//! separate transform. Construction validates the loop once so that
//! `area` and `centroid` are infallible afterwards.

use glam::DVec2;

use crate::error::GeometryError;

/// Area below which a vertex loop is considered degenerate.
const AREA_EPS: f64 = 1e-9;

/// An ordered, validated, closed convex vertex loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec2>,
}

impl Polygon {
    /// Build a polygon from an ordered vertex loop.
    ///
    /// Rejects loops with fewer than 3 vertices, coincident consecutive
    /// vertices (an edge without a normal), or (near-)zero enclosed area.
    /// Winding may be either direction; it affects the sign of nothing
    /// observable.
    pub fn new(vertices: Vec<DVec2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        for i in 0..vertices.len() {
            let next = vertices[(i + 1) % vertices.len()];
            if (next - vertices[i]).length_squared() == 0.0 {
                return Err(GeometryError::ZeroLengthEdge(i));
            }
        }
        let polygon = Self { vertices };
        if polygon.area() <= AREA_EPS {
            return Err(GeometryError::DegenerateArea);
        }
        Ok(polygon)
    }

    /// Axis-aligned rectangle centered on `center`, counter-clockwise from
    /// the lower-left corner.
    pub fn rectangle(width: f64, height: f64, center: DVec2) -> Self {
        let half = DVec2::new(width, height) * 0.5;
        Self {
            vertices: vec![
                center + DVec2::new(-half.x, -half.y),
                center + DVec2::new(half.x, -half.y),
                center + DVec2::new(half.x, half.y),
                center + DVec2::new(-half.x, half.y),
            ],
        }
    }

    /// Regular `sides`-gon of the given radius centered on `center`,
    /// starting at angle 0 and winding counter-clockwise. Used as the
    /// circle approximation for pellets and glow halos. `sides` must be
    /// at least 3.
    pub fn circle(sides: usize, radius: f64, center: DVec2) -> Result<Self, GeometryError> {
        if sides < 3 {
            return Err(GeometryError::TooFewVertices(sides));
        }
        let step = std::f64::consts::TAU / sides as f64;
        let vertices = (0..sides)
            .map(|i| {
                let angle = step * i as f64;
                center + DVec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        Ok(Self { vertices })
    }

    /// The vertex loop in order.
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Number of vertices (== number of edges).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Iterate edges as `(start, end)` vertex pairs, wrapping at the end.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Enclosed area via the shoelace formula, winding-independent.
    pub fn area(&self) -> f64 {
        let mut area = 0.0;
        for (v1, v2) in self.edges() {
            area += 0.5 * (v2.x + v1.x) * (v2.y - v1.y);
        }
        area.abs()
    }

    /// Centroid of the enclosed region.
    pub fn centroid(&self) -> DVec2 {
        let mut acc = DVec2::ZERO;
        let mut signed_area = 0.0;
        for (v1, v2) in self.edges() {
            let cross = v1.x * v2.y - v2.x * v1.y;
            acc += (v1 + v2) * cross;
            signed_area += 0.5 * cross;
        }
        acc / (6.0 * signed_area)
    }

    /// Add `delta` to every vertex in place.
    pub fn translate(&mut self, delta: DVec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    /// Rotate every vertex about `pivot` by `angle` radians (CCW) in place.
    pub fn rotate(&mut self, angle: f64, pivot: DVec2) {
        let rotation = DVec2::from_angle(angle);
        for v in &mut self.vertices {
            *v = pivot + rotation.rotate(*v - pivot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn unit_square_at(center: DVec2) -> Polygon {
        Polygon::rectangle(1.0, 1.0, center)
    }

    #[test]
    fn test_new_rejects_degenerate_loops() {
        assert_eq!(
            Polygon::new(vec![DVec2::ZERO, DVec2::X]),
            Err(GeometryError::TooFewVertices(2))
        );
        assert_eq!(
            Polygon::new(vec![DVec2::ZERO, DVec2::ZERO, DVec2::X]),
            Err(GeometryError::ZeroLengthEdge(0))
        );
        // Collinear loop encloses nothing.
        assert_eq!(
            Polygon::new(vec![DVec2::ZERO, DVec2::X, DVec2::X * 2.0]),
            Err(GeometryError::DegenerateArea)
        );
    }

    #[test]
    fn test_rectangle_area_and_centroid() {
        let center = DVec2::new(3.0, -2.0);
        let rect = Polygon::rectangle(4.0, 6.0, center);
        assert!((rect.area() - 24.0).abs() < EPS);
        assert!((rect.centroid() - center).length() < EPS);
    }

    #[test]
    fn test_area_is_winding_independent() {
        let ccw = Polygon::rectangle(2.0, 2.0, DVec2::ZERO);
        let mut vertices: Vec<_> = ccw.vertices().to_vec();
        vertices.reverse();
        let cw = Polygon::new(vertices).unwrap();
        assert!((ccw.area() - cw.area()).abs() < EPS);
        assert!((ccw.centroid() - cw.centroid()).length() < EPS);
    }

    #[test]
    fn test_triangle_centroid_matches_vertex_mean() {
        let tri = Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(0.0, 3.0),
        ])
        .unwrap();
        assert!((tri.centroid() - DVec2::new(1.0, 1.0)).length() < EPS);
        assert!((tri.area() - 4.5).abs() < EPS);
    }

    #[test]
    fn test_translate_moves_centroid() {
        let mut square = unit_square_at(DVec2::ZERO);
        square.translate(DVec2::new(5.0, -1.0));
        assert!((square.centroid() - DVec2::new(5.0, -1.0)).length() < EPS);
        assert!((square.area() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_about_pivot() {
        let mut square = unit_square_at(DVec2::new(1.0, 0.0));
        square.rotate(std::f64::consts::FRAC_PI_2, DVec2::ZERO);
        // Centroid swings from (1,0) to (0,1); area is preserved.
        assert!((square.centroid() - DVec2::new(0.0, 1.0)).length() < EPS);
        assert!((square.area() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_circle_builder() {
        let circle = Polygon::circle(64, 2.0, DVec2::new(1.0, 1.0)).unwrap();
        assert_eq!(circle.len(), 64);
        assert!((circle.centroid() - DVec2::new(1.0, 1.0)).length() < 1e-6);
        // A 64-gon is close to the true disc area.
        let disc = std::f64::consts::PI * 4.0;
        assert!((circle.area() - disc).abs() / disc < 0.01);
        assert_eq!(
            Polygon::circle(2, 1.0, DVec2::ZERO),
            Err(GeometryError::TooFewVertices(2))
        );
    }
}
