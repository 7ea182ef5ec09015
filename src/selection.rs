use crate::aggregate::SelectionAggregator;
use crate::types::Feature;

/// Ordered selection, unique by display key.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    features: Vec<Feature>,
    keys: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Plain click: the hit features become the whole selection.
    pub fn replace(&mut self, hits: Vec<Feature>, aggregator: &SelectionAggregator) {
        self.clear();
        self.extend(hits, aggregator);
    }

    /// Modifier click: appends hits whose key is not selected yet.
    ///
    /// Returns the number of features added.
    pub fn extend(&mut self, hits: Vec<Feature>, aggregator: &SelectionAggregator) -> usize {
        let before = self.len();
        for feature in hits {
            let key = aggregator.selection_key(&feature);
            if self.contains_key(&key) {
                continue;
            }
            self.keys.push(key);
            self.features.push(feature);
        }
        self.len() - before
    }

    pub fn clear(&mut self) {
        self.features.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use serde_json::json;

    fn located(id: &str, location: Option<&str>) -> Feature {
        let mut properties = serde_json::Map::new();
        if let Some(location) = location {
            properties.insert("Location Where the Violation Occurred".into(), json!(location));
        }
        properties.insert("A_count".into(), json!(1));
        Feature::new(id, properties, Point::new(127.5, 40.25))
    }

    #[test]
    fn plain_click_replaces() {
        let aggregator = SelectionAggregator::default();
        let mut selection = SelectionSet::new();
        selection.replace(vec![located("a", Some("Camp 14"))], &aggregator);
        selection.replace(vec![located("b", Some("Camp 15"))], &aggregator);
        assert_eq!(selection.keys(), ["Camp 15"]);
    }

    #[test]
    fn modifier_click_is_additive_and_deduplicating() {
        let aggregator = SelectionAggregator::default();
        let mut selection = SelectionSet::new();
        selection.replace(vec![located("a", Some("Camp 14"))], &aggregator);
        assert_eq!(selection.extend(vec![located("b", Some("Camp 15"))], &aggregator), 1);
        assert_eq!(selection.extend(vec![located("a", Some("Camp 14"))], &aggregator), 0);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.keys(), ["Camp 14", "Camp 15"]);
    }

    #[test]
    fn duplicates_by_display_key_not_by_id() {
        let aggregator = SelectionAggregator::default();
        let mut selection = SelectionSet::new();
        selection.replace(
            vec![located("a", Some("Camp 14")), located("b", Some("Camp 14"))],
            &aggregator,
        );
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.features()[0].id, "a");
    }

    #[test]
    fn missing_display_key_falls_back_to_coordinates() {
        let aggregator = SelectionAggregator::default();
        let feature = located("a", None);
        assert_eq!(aggregator.selection_key(&feature), "temporary-id-127.5,40.25");

        let mut selection = SelectionSet::new();
        selection.replace(vec![feature.clone(), located("b", None)], &aggregator);
        assert_eq!(selection.len(), 1);
        assert_eq!(aggregator.highlight(selection.features()).into_iter().collect::<Vec<_>>(), selection.keys());
    }

    #[test]
    fn clear_empties() {
        let aggregator = SelectionAggregator::default();
        let mut selection = SelectionSet::new();
        selection.replace(vec![located("a", Some("Camp 14"))], &aggregator);
        selection.clear();
        assert!(selection.is_empty());
        assert!(selection.keys().is_empty());
    }
}
