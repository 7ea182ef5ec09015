use serde::Deserialize;
use std::path::Path;
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub selection: SelectionConfig,
    pub map: MapConfig,
    pub chart: ChartConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// GeoJSON FeatureCollection, either an http(s) URL or a local path.
    pub source: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: "https://Synn-Arch.github.io/NorthKoreanPrisons/Data/rev_filtered_north_korea_data.geojson"
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    pub display_key: String,
    pub count_suffix: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            display_key: "Location Where the Violation Occurred".to_string(),
            count_suffix: "_count".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub style: String,
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub source_id: String,
    pub tileset_url: String,
    pub source_layer: String,
    pub layer_id: String,
    pub hit_layer_id: String,
    pub default_color: String, // Hex code
    pub selected_color: String,
    pub stroke: Option<StrokeConfig>,
    pub base_radius: f64,
    pub hit_radius: f64,
    /// Pointer hit tolerance in degrees, used for local hit testing.
    pub hit_tolerance: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrokeConfig {
    pub width: f64,
    pub color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/synngatech/cm2tit89i00ix01qi8cq205c3".to_string(),
            center: [127.05593, 40.34743],
            zoom: 6.33,
            min_zoom: None,
            max_zoom: None,
            source_id: "north-korea-tileset".to_string(),
            tileset_url: "mapbox://synngatech.9srkza8x".to_string(),
            source_layer: "rev_filtered_north_korea_data-2c9c11".to_string(),
            layer_id: "north-korea-layer".to_string(),
            hit_layer_id: "north-korea-hit-area".to_string(),
            default_color: "#007cbf".to_string(),
            selected_color: "#FF0000".to_string(),
            stroke: None,
            base_radius: 6.0,
            hit_radius: 6.2,
            hit_tolerance: 0.02,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub dataset_label: String,
    pub background_color: String,
    pub border_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dataset_label: "Violation Counts".to_string(),
            background_color: "rgba(75, 192, 192, 0.5)".to_string(),
            border_color: "rgba(75, 192, 192, 1)".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnimationConfig {
    pub steps: u32,
    pub start_radius: f64,
    pub end_radius_scale: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            steps: 30,
            start_radius: 6.0,
            end_radius_scale: 100.0,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
