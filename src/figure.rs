use crate::data::filter::{filter_single, Coord};
use crate::data::model::{DiagDataset, TimeSeries, COPY_NPOSS, COPY_NUSED, COPY_RMSE};
use crate::data::stats::{
    apply_mask, max_of, max_valid, mean_valid, min_valid, round_to, validity_mask,
};

/// Fraction of the valid time span added on each side of the x axis.
pub const X_PAD_FRACTION: f64 = 0.10;
/// Fraction of the largest value added above the y axis maximum.
pub const Y_PAD_FRACTION: f64 = 0.20;

pub const NO_DATA_MESSAGE: &str = "No valid rmse data in this region";
pub const COUNT_AXIS_LABEL: &str = "# of obs: o = poss, x = used";

// ---------------------------------------------------------------------------
// Figure model – everything the renderer needs, computed up front
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<RegionPanel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionPanel {
    /// 1-based region number.
    pub region: usize,
    pub region_name: String,
    pub title: String,
    pub content: PanelContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// No valid forecast value in the region.
    Placeholder { message: String },
    Chart(RegionChart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionChart {
    pub forecast: Vec<[f64; 2]>,
    pub analysis: Vec<[f64; 2]>,
    /// Observation counts in their own units; see [`CountAxis`].
    pub possible: Vec<[f64; 2]>,
    pub used: Vec<[f64; 2]>,
    pub x_range: (f64, f64),
    pub y_max: f64,
    pub count_axis: CountAxis,
    /// Heights of the dotted horizontal gridlines.
    pub gridlines: Vec<f64>,
    pub y_label: String,
}

/// Secondary y axis for observation counts, drawn on the rmse axis by scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountAxis {
    pub max: f64,
    /// rmse-axis units per observation.
    scale: f64,
}

impl CountAxis {
    pub fn new(count_max: f64, y_max: f64) -> Self {
        Self {
            max: count_max,
            scale: y_max / count_max,
        }
    }

    pub fn to_plot(&self, count: f64) -> f64 {
        count * self.scale
    }

    pub fn to_count(&self, y: f64) -> f64 {
        y / self.scale
    }
}

// ---------------------------------------------------------------------------
// Axis arithmetic
// ---------------------------------------------------------------------------

/// Valid time range widened by [`X_PAD_FRACTION`] of its span on both sides.
/// A zero span is widened by half a time unit so the axis stays drawable.
pub fn padded_x_range(times: &[f64]) -> Option<(f64, f64)> {
    let lo = min_valid(times)?;
    let hi = max_valid(times)?;
    let pad = X_PAD_FRACTION * (hi - lo);
    if pad > 0.0 {
        Some((lo - pad, hi + pad))
    } else {
        Some((lo - 0.5, hi + 0.5))
    }
}

/// Upper axis limit: the maximum padded by [`Y_PAD_FRACTION`]. Falls back to
/// 1.0 when the maximum is absent or not positive.
pub fn padded_y_max(max: Option<f64>) -> f64 {
    match max {
        Some(m) if m > 0.0 => m + Y_PAD_FRACTION * m,
        _ => 1.0,
    }
}

/// Dotted gridlines at every whole unit strictly between 0 and `floor(y_max)`.
pub fn unit_gridlines(y_max: f64) -> Vec<f64> {
    let top = y_max.floor() as i64;
    (1..top).map(|i| i as f64).collect()
}

fn format_mean(mean: Option<f64>, decimals: Option<i32>) -> String {
    match (mean, decimals) {
        (Some(m), Some(d)) => format!("{}", round_to(m, d)),
        (Some(m), None) => format!("{m}"),
        (None, _) => "nan".to_string(),
    }
}

fn panel_title(
    region_name: &str,
    forecast: Option<f64>,
    analysis: Option<f64>,
    decimals: Option<i32>,
) -> String {
    format!(
        "{region_name}     forecast: mean = {}     analysis: mean = {}",
        format_mean(forecast, decimals),
        format_mean(analysis, decimals)
    )
}

fn points(times: &[f64], values: &[f64]) -> Vec<[f64; 2]> {
    times
        .iter()
        .zip(values)
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| [t, v])
        .collect()
}

// ---------------------------------------------------------------------------
// Figure construction
// ---------------------------------------------------------------------------

/// The four series the figure is drawn from, already restricted to one level.
#[derive(Debug, Clone)]
pub struct LevelSeries {
    pub forecast: TimeSeries,
    pub analysis: TimeSeries,
    pub possible: TimeSeries,
    pub used: TimeSeries,
}

impl LevelSeries {
    /// Restrict cached forecast/analysis series to one level and split out
    /// rmse and observation counts. Counts come from the forecast series.
    pub fn at_level(forecast: &TimeSeries, analysis: &TimeSeries, level: f64) -> Self {
        let forecast = filter_single(forecast, Coord::Level(level));
        let analysis = filter_single(analysis, Coord::Level(level));
        Self {
            possible: filter_single(&forecast, Coord::Copy(COPY_NPOSS)),
            used: filter_single(&forecast, Coord::Copy(COPY_NUSED)),
            forecast: filter_single(&forecast, Coord::Copy(COPY_RMSE)),
            analysis: filter_single(&analysis, Coord::Copy(COPY_RMSE)),
        }
    }

    fn region(&self, region: usize) -> Self {
        Self {
            forecast: filter_single(&self.forecast, Coord::Region(region)),
            analysis: filter_single(&self.analysis, Coord::Region(region)),
            possible: filter_single(&self.possible, Coord::Region(region)),
            used: filter_single(&self.used, Coord::Region(region)),
        }
    }
}

/// Lay out the whole figure: one panel per region of the dataset.
pub fn build_figure(
    dataset: &DiagDataset,
    obs_type: &str,
    level: f64,
    series: &LevelSeries,
) -> Figure {
    let panels = (1..=dataset.region_count())
        .map(|region| build_panel(region, dataset.region_name(region), &series.region(region)))
        .collect();
    Figure {
        title: format!("{obs_type} @ {level}"),
        panels,
    }
}

/// Lay out a single region panel from series already restricted to it.
pub fn build_panel(region: usize, region_name: String, series: &LevelSeries) -> RegionPanel {
    let fc_values = series.forecast.values();
    let an_values = series.analysis.values();
    let fc_mean = mean_valid(&fc_values);
    let an_mean = mean_valid(&an_values);

    let fc_mask = validity_mask(&fc_values);
    let fc_valid = apply_mask(&fc_values, &fc_mask);
    let fc_times = apply_mask(&series.forecast.times(), &fc_mask);

    if fc_valid.is_empty() {
        return RegionPanel {
            region,
            title: panel_title(&region_name, fc_mean, an_mean, None),
            region_name,
            content: PanelContent::Placeholder {
                message: NO_DATA_MESSAGE.to_string(),
            },
        };
    }

    let an_mask = validity_mask(&an_values);
    let an_valid = apply_mask(&an_values, &an_mask);
    let an_times = apply_mask(&series.analysis.times(), &an_mask);

    // fc_times is non-empty here.
    let x_range = padded_x_range(&fc_times).unwrap_or((0.0, 1.0));
    let y_max = padded_y_max(max_of(max_valid(&fc_valid), max_valid(&an_valid)));

    let poss_values = series.possible.values();
    let used_values = series.used.values();
    let count_max = padded_y_max(max_of(max_valid(&poss_values), max_valid(&used_values)));

    let chart = RegionChart {
        forecast: points(&fc_times, &fc_valid),
        analysis: points(&an_times, &an_valid),
        possible: points(&series.possible.times(), &poss_values),
        used: points(&series.used.times(), &used_values),
        x_range,
        y_max,
        count_axis: CountAxis::new(count_max, y_max),
        gridlines: unit_gridlines(y_max),
        y_label: format!("{region_name}\nrmse"),
    };

    RegionPanel {
        region,
        title: panel_title(&region_name, fc_mean, an_mean, Some(5)),
        region_name,
        content: PanelContent::Chart(chart),
    }
}
