use super::model::{Record, TimeSeries};

// ---------------------------------------------------------------------------
// Coordinate predicates
// ---------------------------------------------------------------------------

/// A single coordinate value to select records by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord<'a> {
    /// Vertical level value (exact match).
    Level(f64),
    /// Copy label such as `rmse`, `Nposs` or `Nused`.
    Copy(&'a str),
    /// 1-based region number.
    Region(usize),
}

impl Coord<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        match *self {
            Coord::Level(level) => record.level == level,
            Coord::Copy(copy) => record.copy == copy,
            Coord::Region(region) => record.region == region,
        }
    }
}

/// Return a new series holding only the records matching `coord`.
/// Record order is preserved.
pub fn filter_single(series: &TimeSeries, coord: Coord<'_>) -> TimeSeries {
    TimeSeries {
        obs_type: series.obs_type.clone(),
        role: series.role,
        level_kind: series.level_kind,
        records: series
            .records
            .iter()
            .filter(|r| coord.matches(r))
            .cloned()
            .collect(),
    }
}

/// Distinct level values of a series, ascending. `NaN` levels are dropped.
pub fn unique_levels(series: &TimeSeries) -> Vec<f64> {
    let mut levels: Vec<f64> = series
        .records
        .iter()
        .map(|r| r.level)
        .filter(|l| !l.is_nan())
        .collect();
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    levels
}
