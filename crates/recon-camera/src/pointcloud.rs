/// A point cloud in world coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from points.
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Consume the point cloud and return its points.
    pub fn into_points(self) -> Vec<[f64; 3]> {
        self.points
    }

    /// Get the component-wise minimum of the points, `None` when empty.
    pub fn min_bound(&self) -> Option<[f64; 3]> {
        self.fold_bound(f64::min)
    }

    /// Get the component-wise maximum of the points, `None` when empty.
    pub fn max_bound(&self) -> Option<[f64; 3]> {
        self.fold_bound(f64::max)
    }

    fn fold_bound(&self, pick: fn(f64, f64) -> f64) -> Option<[f64; 3]> {
        let (first, rest) = self.points.split_first()?;
        Some(rest.iter().fold(*first, |acc, p| {
            [pick(acc[0], p[0]), pick(acc[1], p[1]), pick(acc[2], p[2])]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(vec![[0.0, 5.0, -1.0], [1.0, 0.0, 2.0], [-3.0, 1.0, 0.0]]);

        assert_eq!(pointcloud.len(), 3);
        assert!(!pointcloud.is_empty());
        assert_eq!(pointcloud.min_bound(), Some([-3.0, 0.0, -1.0]));
        assert_eq!(pointcloud.max_bound(), Some([1.0, 5.0, 2.0]));

        let points = pointcloud.into_points();
        assert_eq!(points[1], [1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_empty_pointcloud() {
        let pointcloud = PointCloud::default();
        assert!(pointcloud.is_empty());
        assert_eq!(pointcloud.min_bound(), None);
        assert_eq!(pointcloud.max_bound(), None);
    }
}
