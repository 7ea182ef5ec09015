//! Derives chart series, statistics text and highlight sets from a selection.

use crate::config::SelectionConfig;
use crate::types::{Feature, Properties};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const NO_SELECTION_TITLE: &str = "No Location Selected";
pub const NO_SELECTION_DESCRIPTION: &str = "<p>Select a point on the map to see details.</p>";
pub const NO_SELECTION_STATISTICS: &str = "<p>No data available for statistics.</p>";

/// Label/value pairs as two parallel sequences, sorted by label.
///
/// An empty series means "nothing selected"; it is distinct from a series
/// whose entries are all zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregatedSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, index: usize) -> Option<(&str, f64)> {
        Some((self.labels.get(index)?.as_str(), *self.values.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub title: String,
    pub description: String,
    pub statistics_html: String,
}

#[derive(Debug, Clone)]
pub struct SelectionAggregator {
    display_key: String,
    count_suffix: String,
}

impl SelectionAggregator {
    pub fn new(display_key: impl Into<String>, count_suffix: impl Into<String>) -> Self {
        Self {
            display_key: display_key.into(),
            count_suffix: count_suffix.into(),
        }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(&config.display_key, &config.count_suffix)
    }

    pub fn display_key(&self) -> &str {
        &self.display_key
    }

    pub fn count_suffix(&self) -> &str {
        &self.count_suffix
    }

    /// Entries whose key carries the count suffix and whose value is not null.
    pub fn extract_count_properties<'a>(&self, properties: &'a Properties) -> BTreeMap<&'a str, &'a Value> {
        properties
            .iter()
            .filter(|(key, value)| key.ends_with(&self.count_suffix) && !value.is_null())
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }

    /// Key with the count suffix removed.
    pub fn label_for<'a>(&self, key: &'a str) -> &'a str {
        key.strip_suffix(self.count_suffix.as_str()).unwrap_or(key)
    }

    /// Property key for a chart label, the inverse of [`Self::label_for`].
    pub fn count_key(&self, label: &str) -> String {
        format!("{}{}", label, self.count_suffix)
    }

    pub fn aggregate<'a, I>(&self, features: I) -> AggregatedSeries
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        // BTreeMap keeps labels in code-point order
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for feature in features {
            for (key, value) in self.extract_count_properties(&feature.properties) {
                *totals.entry(self.label_for(key).to_string()).or_insert(0.0) += count_value(value);
            }
        }

        let (labels, values) = totals.into_iter().unzip();
        AggregatedSeries { labels, values }
    }

    /// Display-key value of a feature, empty when the property is absent.
    pub fn display_name(&self, feature: &Feature) -> String {
        match feature.property(&self.display_key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Identity used to de-duplicate and highlight selections.
    ///
    /// Falls back to `temporary-id-<lng>,<lat>` when the display key is missing.
    pub fn selection_key(&self, feature: &Feature) -> String {
        let name = self.display_name(feature);
        if name.is_empty() {
            let [lng, lat] = feature.coordinates();
            format!("temporary-id-{},{}", lng, lat)
        } else {
            name
        }
    }

    pub fn describe_selection(&self, features: &[Feature]) -> SelectionSummary {
        if features.is_empty() {
            return SelectionSummary {
                title: NO_SELECTION_TITLE.to_string(),
                description: NO_SELECTION_DESCRIPTION.to_string(),
                statistics_html: NO_SELECTION_STATISTICS.to_string(),
            };
        }

        let locations: Vec<String> = features.iter().map(|f| self.display_name(f)).collect();
        let title = if locations.len() > 1 {
            "Details for Multiple Locations".to_string()
        } else {
            format!("Details for {}", locations[0])
        };
        let description = format!(
            "<p>This chart shows the combined violation counts for the selected locations: <strong>{}</strong>.</p>",
            locations.join(", ")
        );

        let mut statistics_html = String::from("<h4>Statistics</h4><ul>");
        for (label, value) in self.aggregate(features).iter() {
            statistics_html.push_str(&format!("<li>{}: {}</li>", label, format_count(value)));
        }
        statistics_html.push_str("</ul>");

        SelectionSummary {
            title,
            description,
            statistics_html,
        }
    }

    /// Display keys to paint in the selected color.
    pub fn highlight(&self, features: &[Feature]) -> BTreeSet<String> {
        features.iter().map(|f| self.selection_key(f)).collect()
    }

    /// Hover popup body for one feature.
    pub fn tooltip_html(&self, feature: &Feature) -> String {
        let counts: Vec<String> = self
            .extract_count_properties(&feature.properties)
            .into_iter()
            .map(|(key, value)| format!("<strong>{}:</strong> {}", self.label_for(key), display_value(value)))
            .collect();

        format!(
            "<div><h4>{}</h4>{}</div>",
            self.display_name(feature),
            counts.join("<br>")
        )
    }
}

impl Default for SelectionAggregator {
    fn default() -> Self {
        Self::from_config(&SelectionConfig::default())
    }
}

/// Numeric contribution of a count property; non-numeric values add nothing.
///
/// Only finite numbers count, so text like `"NaN"` or `"inf"` adds 0.
pub fn count_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Renders `5.0` as `5` and keeps fractional values as they are.
pub fn format_count(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
