use crate::config::InputConfig;
use crate::types::Feature;
use anyhow::{Context, Result, anyhow};
use geo::Point;
use geojson::{feature::Id, GeoJson, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Fetches the configured dataset once and turns it into features.
///
/// `http://` and `https://` sources are fetched with a single GET; anything
/// else is read as a local file. There is no retry.
pub async fn load_features(input: &InputConfig) -> Result<Vec<Feature>> {
    let source = input.source.as_str();
    info!(source, "Loading dataset");

    let geojson = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_geojson(source).await?
    } else {
        read_geojson(Path::new(source))?
    };

    let features = features_from_geojson(geojson)?;
    info!(count = features.len(), "Loaded features");
    Ok(features)
}

async fn fetch_geojson(url: &str) -> Result<GeoJson> {
    reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch dataset: {}", url))?
        .error_for_status()
        .with_context(|| format!("Dataset request failed: {}", url))?
        .json::<GeoJson>()
        .await
        .context("Failed to parse GeoJSON")
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    // Parse the GeoJSON. warning: this loads the whole file into memory.
    GeoJson::from_reader(reader).context("Failed to parse GeoJSON")
}

/// Converts a FeatureCollection into point features.
///
/// Source ids are kept when unique; the first feature carrying an id wins it.
/// Every other feature gets `feature-<index>`, where the index is the position
/// in the collection, suffixed with `-<n>` if a source id already took that name.
pub fn features_from_geojson(geojson: GeoJson) -> Result<Vec<Feature>> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    // (position, source id, properties, location) for point features only
    let mut points = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let location = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(coords)) if coords.len() >= 2 => Point::new(coords[0], coords[1]),
            _ => {
                warn!(index, "Skipping feature without point geometry");
                continue;
            }
        };

        let source_id = match &feature.id {
            Some(Id::String(s)) => Some(s.clone()),
            Some(Id::Number(n)) => Some(n.to_string()),
            None => None,
        };
        points.push((index, source_id, feature.properties.unwrap_or_default(), location));
    }

    // Reserve source ids first so generated names can step around them
    let mut taken = HashSet::new();
    let kept: Vec<bool> = points
        .iter()
        .map(|(_, source_id, _, _)| source_id.as_ref().is_some_and(|id| taken.insert(id.clone())))
        .collect();

    let mut features = Vec::with_capacity(points.len());
    for ((index, source_id, properties, location), kept) in points.into_iter().zip(kept) {
        let id = match source_id {
            Some(id) if kept => id,
            _ => generated_id(index, &mut taken),
        };
        features.push(Feature::new(id, properties, location));
    }

    Ok(features)
}

fn generated_id(index: usize, taken: &mut HashSet<String>) -> String {
    let base = format!("feature-{}", index);
    let mut id = base.clone();
    let mut n = 1;
    while !taken.insert(id.clone()) {
        id = format!("{}-{}", base, n);
        n += 1;
    }
    id
}
