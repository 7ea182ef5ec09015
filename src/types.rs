use geo::Point;
use serde_json::{Map, Value};

/// Flat GeoJSON property mapping (string key -> string/number/null).
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    // Assigned at load time, never changed afterwards
    pub id: String,
    pub properties: Properties,
    pub location: Point<f64>,
}

impl Feature {
    pub fn new(id: impl Into<String>, properties: Properties, location: Point<f64>) -> Self {
        Self {
            id: id.into(),
            properties,
            location,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }

    /// `[lng, lat]`, the order map popups expect.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.location.x(), self.location.y()]
    }
}
