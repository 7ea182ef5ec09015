//! Map style expressions for the point layer.
//!
//! Values are Mapbox GL expressions (`["case", ...]`), handed unchanged to
//! the map collaborator.

use crate::aggregate::count_value;
use crate::config::MapConfig;
use crate::types::Feature;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const CIRCLE_COLOR: &str = "circle-color";
pub const CIRCLE_RADIUS: &str = "circle-radius";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintUpdate {
    pub layer: String,
    pub property: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct MapPainter {
    config: MapConfig,
    display_key: String,
}

impl MapPainter {
    pub fn new(config: MapConfig, display_key: impl Into<String>) -> Self {
        Self {
            config,
            display_key: display_key.into(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    fn update(&self, property: &str, value: Value) -> PaintUpdate {
        PaintUpdate {
            layer: self.config.layer_id.clone(),
            property: property.to_string(),
            value,
        }
    }

    /// Points whose display key is in `selected` get the selected color.
    pub fn highlight(&self, selected: &BTreeSet<String>) -> PaintUpdate {
        let keys: Vec<&str> = selected.iter().map(String::as_str).collect();
        self.update(
            CIRCLE_COLOR,
            json!([
                "case",
                ["in", ["get", self.display_key], ["literal", keys]],
                self.config.selected_color,
                self.config.default_color
            ]),
        )
    }

    pub fn default_color(&self) -> PaintUpdate {
        self.update(CIRCLE_COLOR, json!(self.config.default_color))
    }

    pub fn default_radius(&self) -> PaintUpdate {
        self.update(CIRCLE_RADIUS, json!(self.config.base_radius))
    }

    /// Radius proportional to `count_key / bar_value`, baseline where null.
    pub fn scaled_radius(&self, count_key: &str, bar_value: f64, scale: f64) -> PaintUpdate {
        self.update(
            CIRCLE_RADIUS,
            json!([
                "case",
                ["==", ["get", count_key], null],
                self.config.base_radius,
                ["*", ["/", ["get", count_key], bar_value], scale]
            ]),
        )
    }

    pub fn source_definition(&self) -> Value {
        json!({
            "type": "vector",
            "url": self.config.tileset_url
        })
    }

    /// Visible circle layer followed by the transparent hit area.
    pub fn layer_definitions(&self) -> Vec<Value> {
        let mut paint = json!({
            CIRCLE_RADIUS: self.config.base_radius,
            CIRCLE_COLOR: self.config.default_color
        });
        if let Some(stroke) = &self.config.stroke {
            paint["circle-stroke-width"] = json!(stroke.width);
            paint["circle-stroke-color"] = json!(stroke.color);
        }

        vec![
            json!({
                "id": self.config.layer_id,
                "type": "circle",
                "source": self.config.source_id,
                "source-layer": self.config.source_layer,
                "paint": paint
            }),
            json!({
                "id": self.config.hit_layer_id,
                "type": "circle",
                "source": self.config.source_id,
                "source-layer": self.config.source_layer,
                "paint": {
                    CIRCLE_RADIUS: self.config.hit_radius,
                    CIRCLE_COLOR: "rgba(0, 0, 0, 0)"
                }
            }),
        ]
    }

    /// Local evaluation of [`Self::scaled_radius`] for one feature.
    pub fn evaluate_radius(&self, feature: &Feature, count_key: &str, bar_value: f64, scale: f64) -> f64 {
        match feature.property(count_key) {
            None => self.config.base_radius,
            Some(value) => {
                let radius = count_value(value) / bar_value * scale;
                if radius.is_finite() {
                    radius
                } else {
                    self.config.base_radius
                }
            }
        }
    }
}
