//! MediaPipe Pose Landmark Indices and Geometry
//!
//! Landmarks arrive from an external pose detector as normalized image
//! coordinates. This module holds the index contract for the 33-point
//! MediaPipe Pose topology and the pixel-space distance primitive every
//! measurement is derived from.

use serde::{Deserialize, Serialize};

/// MediaPipe Pose 33 landmark indices
pub mod indices {
    /// Nose tip
    pub const NOSE: usize = 0;
    /// Left ear
    pub const LEFT_EAR: usize = 7;
    /// Right ear
    pub const RIGHT_EAR: usize = 8;
    /// Left shoulder
    pub const LEFT_SHOULDER: usize = 11;
    /// Right shoulder
    pub const RIGHT_SHOULDER: usize = 12;
    /// Left elbow
    pub const LEFT_ELBOW: usize = 13;
    /// Right elbow
    pub const RIGHT_ELBOW: usize = 14;
    /// Left wrist
    pub const LEFT_WRIST: usize = 15;
    /// Right wrist
    pub const RIGHT_WRIST: usize = 16;
    /// Left hip
    pub const LEFT_HIP: usize = 23;
    /// Right hip
    pub const RIGHT_HIP: usize = 24;
    /// Left ankle
    pub const LEFT_ANKLE: usize = 27;
    /// Right ankle
    pub const RIGHT_ANKLE: usize = 28;

    /// Number of points emitted by the reference pose model
    pub const POSE_LANDMARK_COUNT: usize = 33;
}

/// A single pose landmark.
///
/// `x` and `y` are normalized to the image width and height, `z` is a
/// relative depth on roughly the same scale as `x`, and `visibility` is the
/// detector's confidence that the point is visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Landmark in the image plane with zero depth and full visibility
    pub const fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }
}

/// Distance between two landmarks in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelDistance {
    /// Euclidean distance in the image plane (pixels)
    pub planar: f64,
    /// Planar distance with the normalized depth delta folded in
    pub spatial: f64,
}

/// Compute planar and spatial distance between two landmarks.
///
/// Planar coordinates are scaled by the image dimensions; depth stays
/// normalized, so `spatial` mixes pixel and relative units exactly as the
/// detector reports them.
pub fn landmark_distance(a: &Landmark, b: &Landmark, width: u32, height: u32) -> PixelDistance {
    let dx = (b.x - a.x) * width as f64;
    let dy = (b.y - a.y) * height as f64;
    let dz = b.z - a.z;

    let planar_sq = dx * dx + dy * dy;
    PixelDistance {
        planar: planar_sq.sqrt(),
        spatial: (planar_sq + dz * dz).sqrt(),
    }
}

/// Ordered landmark collection as produced by the pose detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get landmark by index (None if the detector returned fewer points)
    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.points.get(idx)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.points.iter()
    }

    /// Distance between two indexed landmarks, or None if either is absent
    pub fn distance(&self, idx1: usize, idx2: usize, width: u32, height: u32) -> Option<PixelDistance> {
        let a = self.get(idx1)?;
        let b = self.get(idx2)?;
        Some(landmark_distance(a, b, width, height))
    }

    /// Count landmarks whose visibility is strictly above `threshold`
    pub fn visible_count(&self, threshold: f64) -> usize {
        self.points.iter().filter(|p| p.visibility > threshold).count()
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Landmark> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LandmarkSet {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planar_distance_scales_by_image_size() {
        let a = Landmark::planar(0.1, 0.1);
        let b = Landmark::planar(0.4, 0.5);
        // dx = 0.3 * 100 = 30, dy = 0.4 * 100 = 40
        let d = landmark_distance(&a, &b, 100, 100);
        assert_relative_eq!(d.planar, 50.0, epsilon = 1e-9);
        assert_relative_eq!(d.spatial, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spatial_distance_adds_unscaled_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(0.0, 0.0, 2.0, 1.0);
        let d = landmark_distance(&a, &b, 640, 480);
        assert_eq!(d.planar, 0.0);
        assert_relative_eq!(d.spatial, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_square_image() {
        let a = Landmark::planar(0.0, 0.0);
        let b = Landmark::planar(1.0, 1.0);
        let d = landmark_distance(&a, &b, 300, 400);
        assert_relative_eq!(d.planar, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_index_yields_none() {
        let set = LandmarkSet::new(vec![Landmark::planar(0.5, 0.5); 12]);
        assert!(set.distance(indices::LEFT_SHOULDER, indices::RIGHT_SHOULDER, 10, 10).is_none());
        assert!(set.distance(indices::NOSE, indices::LEFT_SHOULDER, 10, 10).is_some());
    }

    #[test]
    fn test_visible_count_is_strict() {
        let set: LandmarkSet = [0.2, 0.5, 0.51, 0.9]
            .iter()
            .map(|&v| Landmark::new(0.0, 0.0, 0.0, v))
            .collect();
        assert_eq!(set.visible_count(0.5), 2);
    }

    #[test]
    fn test_deserialize_defaults_depth_and_visibility() {
        let set: LandmarkSet = serde_json::from_str(r#"[{"x": 0.25, "y": 0.75}]"#).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0), Some(&Landmark::new(0.25, 0.75, 0.0, 0.0)));
    }
}
