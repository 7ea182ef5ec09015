use crate::types::Feature;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

// Wrapper for RTree indexing
#[derive(Debug, Clone)]
struct FeaturePoint {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for FeaturePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for FeaturePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Point lookup over the loaded features, the local `queryRenderedFeatures`.
#[derive(Default)]
pub struct HitIndex {
    tree: RTree<FeaturePoint>,
}

impl HitIndex {
    pub fn build(features: &[Feature]) -> Self {
        let items = features
            .iter()
            .enumerate()
            .map(|(index, feature)| FeaturePoint {
                index,
                position: feature.coordinates(),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of every feature within `tolerance` of `[lng, lat]`, in dataset order.
    pub fn query(&self, lng: f64, lat: f64, tolerance: f64) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .tree
            .locate_within_distance([lng, lat], tolerance * tolerance)
            .map(|p| p.index)
            .collect();
        hits.sort_unstable();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn at(id: &str, lng: f64, lat: f64) -> Feature {
        Feature::new(id, serde_json::Map::new(), Point::new(lng, lat))
    }

    #[test]
    fn finds_overlapping_points() {
        let features = vec![
            at("a", 127.0, 40.0),
            at("b", 125.0, 39.0),
            at("c", 127.001, 40.0),
        ];
        let index = HitIndex::build(&features);
        assert_eq!(index.len(), 3);
        assert_eq!(index.query(127.0, 40.0, 0.01), vec![0, 2]);
    }

    #[test]
    fn misses_empty_area() {
        let index = HitIndex::build(&[at("a", 127.0, 40.0)]);
        assert!(index.query(120.0, 30.0, 0.02).is_empty());
    }

    #[test]
    fn empty_index_never_hits() {
        let index = HitIndex::default();
        assert!(index.is_empty());
        assert!(index.query(127.0, 40.0, 1.0).is_empty());
    }
}
