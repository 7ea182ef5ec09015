//! Dashboard state owner.
//!
//! The controller is the only place that mutates the selection. It consumes
//! [`DashboardEvent`]s from the front end and answers with the
//! [`ViewCommand`]s the map, charts and statistics panel should apply.

use crate::aggregate::{AggregatedSeries, SelectionAggregator, SelectionSummary};
use crate::animation::{FrameScheduler, RadiusRamp};
use crate::config::{AnimationConfig, AppConfig, ChartConfig};
use crate::paint::{MapPainter, PaintUpdate};
use crate::selection::SelectionSet;
use crate::spatial::HitIndex;
use crate::types::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// Click on the map at a coordinate; the controller hit-tests it.
    Click {
        lng: f64,
        lat: f64,
        #[serde(default)]
        modifier: bool,
    },
    /// Click already resolved to features by the map (per-layer click).
    ClickFeatures {
        ids: Vec<String>,
        #[serde(default)]
        modifier: bool,
    },
    KeyDown { key: String },
    /// Click on the overview chart; `bar` is `None` when no bar was hit.
    BarClick { bar: Option<usize> },
    PointerEnter { id: String },
    PointerLeave,
    DragStart,
    DragEnd,
    Frame,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Overview,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewCommand {
    CreateMap {
        style: String,
        center: [f64; 2],
        zoom: f64,
        min_zoom: Option<f64>,
        max_zoom: Option<f64>,
    },
    CreateChart {
        chart: ChartId,
        label: String,
        background_color: String,
        border_color: String,
    },
    AddSource { id: String, source: Value },
    AddLayer { layer: Value },
    SetPaint(PaintUpdate),
    UpdateChart {
        chart: ChartId,
        #[serde(flatten)]
        series: AggregatedSeries,
    },
    SetStatistics(SelectionSummary),
    ShowPopup { lng_lat: [f64; 2], html: String },
    RemovePopup,
    SetCursor { cursor: String },
}

pub struct DashboardController {
    aggregator: SelectionAggregator,
    painter: MapPainter,
    chart: ChartConfig,
    animation: AnimationConfig,
    hit_tolerance: f64,
    features: Vec<Feature>,
    ids: HashMap<String, usize>,
    index: HitIndex,
    selection: SelectionSet,
    overview: AggregatedSeries,
    detail: AggregatedSeries,
    scheduler: FrameScheduler,
    popup_open: bool,
}

impl DashboardController {
    pub fn new(config: &AppConfig) -> Self {
        let aggregator = SelectionAggregator::from_config(&config.selection);
        let painter = MapPainter::new(config.map.clone(), aggregator.display_key());
        Self {
            aggregator,
            painter,
            chart: config.chart.clone(),
            animation: config.animation.clone(),
            hit_tolerance: config.map.hit_tolerance,
            features: Vec::new(),
            ids: HashMap::new(),
            index: HitIndex::default(),
            selection: SelectionSet::new(),
            overview: AggregatedSeries::default(),
            detail: AggregatedSeries::default(),
            scheduler: FrameScheduler::new(),
            popup_open: false,
        }
    }

    pub fn aggregator(&self) -> &SelectionAggregator {
        &self.aggregator
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn overview(&self) -> &AggregatedSeries {
        &self.overview
    }

    pub fn detail(&self) -> &AggregatedSeries {
        &self.detail
    }

    pub fn pending_animations(&self) -> usize {
        self.scheduler.pending()
    }

    /// Map viewport and the two empty bar charts.
    pub fn init(&self) -> Vec<ViewCommand> {
        let map = self.painter.config();
        let mut commands = vec![ViewCommand::CreateMap {
            style: map.style.clone(),
            center: map.center,
            zoom: map.zoom,
            min_zoom: map.min_zoom,
            max_zoom: map.max_zoom,
        }];
        for chart in [ChartId::Overview, ChartId::Detail] {
            commands.push(ViewCommand::CreateChart {
                chart,
                label: self.chart.dataset_label.clone(),
                background_color: self.chart.background_color.clone(),
                border_color: self.chart.border_color.clone(),
            });
        }
        commands
    }

    /// Map `load`: registers the source and layers.
    pub fn map_loaded(&self) -> Vec<ViewCommand> {
        let mut commands = vec![ViewCommand::AddSource {
            id: self.painter.config().source_id.clone(),
            source: self.painter.source_definition(),
        }];
        commands.extend(
            self.painter
                .layer_definitions()
                .into_iter()
                .map(|layer| ViewCommand::AddLayer { layer }),
        );
        commands
    }

    /// Installs the fetched dataset and fills the overview chart.
    pub fn load(&mut self, features: Vec<Feature>) -> Vec<ViewCommand> {
        self.index = HitIndex::build(&features);
        self.ids = HashMap::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            // first feature with an id wins
            self.ids.entry(feature.id.clone()).or_insert(i);
        }
        self.features = features;
        self.selection.clear();
        self.overview = self.aggregator.aggregate(&self.features);
        info!(
            features = self.features.len(),
            labels = self.overview.len(),
            "Dataset installed"
        );

        vec![ViewCommand::UpdateChart {
            chart: ChartId::Overview,
            series: self.overview.clone(),
        }]
    }

    pub fn handle(&mut self, event: DashboardEvent) -> Vec<ViewCommand> {
        debug!(?event, "Handling event");
        match event {
            DashboardEvent::Click { lng, lat, modifier } => {
                let hits = self.index.query(lng, lat, self.hit_tolerance);
                if hits.is_empty() {
                    return self.reset();
                }
                let features = hits.into_iter().map(|i| self.features[i].clone()).collect();
                self.select(features, modifier)
            }
            DashboardEvent::ClickFeatures { ids, modifier } => {
                let features: Vec<Feature> = ids
                    .iter()
                    .filter_map(|id| self.feature_by_id(id).cloned())
                    .collect();
                if features.is_empty() {
                    return self.reset();
                }
                self.select(features, modifier)
            }
            DashboardEvent::KeyDown { key } if key == "Escape" => self.reset(),
            DashboardEvent::KeyDown { .. } => Vec::new(),
            DashboardEvent::BarClick { bar } => self.bar_clicked(bar),
            DashboardEvent::PointerEnter { id } => self.pointer_enter(&id),
            DashboardEvent::PointerLeave => {
                let mut commands = self.close_popup();
                commands.push(cursor(""));
                commands
            }
            DashboardEvent::DragStart => vec![cursor("grab")],
            DashboardEvent::DragEnd => vec![cursor("")],
            DashboardEvent::Frame => self
                .scheduler
                .on_frame(&self.painter)
                .into_iter()
                .map(ViewCommand::SetPaint)
                .collect(),
            DashboardEvent::Reset => self.reset(),
        }
    }

    pub fn feature_by_id(&self, id: &str) -> Option<&Feature> {
        self.ids.get(id).map(|&i| &self.features[i])
    }

    /// Selects every feature whose display key is in `keys`, as a plain click
    /// on the first key that matches and modifier clicks on the rest.
    ///
    /// Returns the keys that matched nothing. The selection is left untouched
    /// when none match.
    pub fn select_by_display_keys(&mut self, keys: &[String]) -> (Vec<ViewCommand>, Vec<String>) {
        let mut commands = Vec::new();
        let mut missing = Vec::new();
        let mut matched_any = false;
        for key in keys {
            let ids: Vec<String> = self
                .features
                .iter()
                .filter(|f| self.aggregator.display_name(f) == *key)
                .map(|f| f.id.clone())
                .collect();
            if ids.is_empty() {
                missing.push(key.clone());
                continue;
            }
            commands = self.handle(DashboardEvent::ClickFeatures {
                ids,
                modifier: matched_any,
            });
            matched_any = true;
        }
        (commands, missing)
    }

    fn select(&mut self, hits: Vec<Feature>, modifier: bool) -> Vec<ViewCommand> {
        if modifier {
            self.selection.extend(hits, &self.aggregator);
        } else {
            self.selection.replace(hits, &self.aggregator);
        }
        info!(selected = ?self.selection.keys(), "Selection changed");
        self.sync_selection()
    }

    /// Recomputes every view derived from the selection.
    fn sync_selection(&mut self) -> Vec<ViewCommand> {
        let features = self.selection.features();
        self.detail = self.aggregator.aggregate(features);
        let highlight = self.aggregator.highlight(features);

        vec![
            ViewCommand::SetPaint(self.painter.highlight(&highlight)),
            ViewCommand::UpdateChart {
                chart: ChartId::Detail,
                series: self.detail.clone(),
            },
            ViewCommand::SetStatistics(self.aggregator.describe_selection(features)),
        ]
    }

    fn reset(&mut self) -> Vec<ViewCommand> {
        self.selection.clear();
        self.scheduler.cancel_all();
        self.detail = self.aggregator.aggregate(self.selection.features());

        let commands = vec![
            ViewCommand::UpdateChart {
                chart: ChartId::Detail,
                series: self.detail.clone(),
            },
            ViewCommand::SetStatistics(self.aggregator.describe_selection(&[])),
            ViewCommand::SetPaint(self.painter.default_color()),
            ViewCommand::SetPaint(self.painter.default_radius()),
        ];
        info!("Selection cleared");
        commands
    }

    fn bar_clicked(&mut self, bar: Option<usize>) -> Vec<ViewCommand> {
        let hit = bar
            .and_then(|i| self.overview.get(i))
            .map(|(label, value)| (label.to_string(), value));
        let Some((label, value)) = hit else {
            let mut commands = self.reset();
            commands.extend(self.close_popup());
            return commands;
        };

        let ramp = RadiusRamp::new(self.aggregator.count_key(&label), value, &self.animation);
        info!(label = %label, value, "Scaling points by bar");
        self.scheduler
            .start(ramp, &self.painter)
            .map(ViewCommand::SetPaint)
            .into_iter()
            .collect()
    }

    fn pointer_enter(&mut self, id: &str) -> Vec<ViewCommand> {
        let mut commands = vec![cursor("pointer")];
        let Some(feature) = self.feature_by_id(id) else {
            return commands;
        };
        let popup = ViewCommand::ShowPopup {
            lng_lat: feature.coordinates(),
            html: self.aggregator.tooltip_html(feature),
        };
        commands.extend(self.close_popup());
        commands.push(popup);
        self.popup_open = true;
        commands
    }

    fn close_popup(&mut self) -> Vec<ViewCommand> {
        if std::mem::take(&mut self.popup_open) {
            vec![ViewCommand::RemovePopup]
        } else {
            Vec::new()
        }
    }
}

fn cursor(cursor: &str) -> ViewCommand {
    ViewCommand::SetCursor {
        cursor: cursor.to_string(),
    }
}
