use crate::data::error::DiagError;
use crate::data::filter::{filter_single, unique_levels, Coord};
use crate::data::model::{strip_enum_punctuation, DiagDataset, TimeSeries, COPY_RMSE};
use crate::data::stats::mean_valid;

/// Appended to a level label when every rmse value at that level is missing.
pub const NO_DATA_SUFFIX: &str = ": No data found for this level, will not plot";

// ---------------------------------------------------------------------------
// Observation type menu
// ---------------------------------------------------------------------------

/// Menu labels for the dataset's observation types.
pub fn obs_type_labels(dataset: &DiagDataset) -> Vec<String> {
    dataset
        .obs_types()
        .iter()
        .map(|name| strip_enum_punctuation(name))
        .collect()
}

// ---------------------------------------------------------------------------
// Level menu
// ---------------------------------------------------------------------------

/// One row of the level menu.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEntry {
    pub label: String,
    pub has_data: bool,
}

/// Build the level menu from a forecast series: one entry per distinct level,
/// flagged when its rmse values are all missing.
pub fn level_entries(forecast: &TimeSeries) -> Vec<LevelEntry> {
    let mut entries: Vec<LevelEntry> = unique_levels(forecast)
        .into_iter()
        .map(|level| {
            let at_level = filter_single(forecast, Coord::Level(level));
            let rmse = filter_single(&at_level, Coord::Copy(COPY_RMSE));
            let has_data = mean_valid(&rmse.values()).is_some();
            let label = if has_data {
                format!("{level}")
            } else {
                log::warn!("{} has no rmse data at level {level}", forecast.obs_type);
                format!("{level}{NO_DATA_SUFFIX}")
            };
            LevelEntry { label, has_data }
        })
        .collect();
    strip_stray_brackets(&mut entries);
    entries
}

/// Remove list-literal brackets leaking into the first and last labels.
pub fn strip_stray_brackets(entries: &mut Vec<LevelEntry>) {
    if entries.first().is_some_and(|e| e.label == "[") {
        entries.remove(0);
    }
    if let Some(first) = entries.first_mut() {
        if let Some(rest) = first.label.strip_prefix('[') {
            first.label = rest.to_string();
        }
    }
    if let Some(last) = entries.last_mut() {
        if let Some(rest) = last.label.strip_suffix(']') {
            last.label = rest.to_string();
        }
    }
}

/// Recover the numeric level from a menu label (text up to the first `:`).
pub fn parse_level_label(label: &str) -> Result<f64, DiagError> {
    let head = label.split(':').next().unwrap_or(label).trim();
    head.parse::<f64>()
        .map_err(|_| DiagError::InvalidLevelLabel(label.to_string()))
}
