use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;

use super::error::{DiagError, Result};

/// Copy labels used by the viewer.
pub const COPY_RMSE: &str = "rmse";
pub const COPY_NPOSS: &str = "Nposs";
pub const COPY_NUSED: &str = "Nused";

// ---------------------------------------------------------------------------
// Role – which half of the assimilation cycle a series describes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Forecast,
    Analysis,
}

impl Role {
    /// Suffix of the diagnostic variable holding this role's time series.
    pub fn variable_suffix(self) -> &'static str {
        match self {
            Role::Forecast => "guess",
            Role::Analysis => "analy",
        }
    }

    /// Full variable name for an observation type, e.g. `RADIOSONDE_U_WIND_COMPONENT_guess`.
    pub fn variable_name(self, obs_type: &str) -> String {
        format!("{obs_type}_{}", self.variable_suffix())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Forecast => write!(f, "forecast"),
            Role::Analysis => write!(f, "analysis"),
        }
    }
}

// ---------------------------------------------------------------------------
// LevelKind – vertical coordinate flavour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum LevelKind {
    #[serde(rename = "plevel")]
    Pressure,
    #[serde(rename = "hlevel")]
    Height,
    #[serde(rename = "surface")]
    Surface,
}

impl LevelKind {
    #[cfg(any(feature = "netcdf", test))]
    pub const ALL: [LevelKind; 3] = [LevelKind::Pressure, LevelKind::Height, LevelKind::Surface];

    /// Coordinate (dimension) name in the diagnostic file.
    pub fn coord_name(self) -> &'static str {
        match self {
            LevelKind::Pressure => "plevel",
            LevelKind::Height => "hlevel",
            LevelKind::Surface => "surface",
        }
    }

    /// Match a dimension name, case-insensitively.
    #[cfg(any(feature = "netcdf", test))]
    pub fn from_coord_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.coord_name().eq_ignore_ascii_case(name))
    }

    pub fn description(self) -> &'static str {
        match self {
            LevelKind::Pressure => "pressure level",
            LevelKind::Height => "height level",
            LevelKind::Surface => "surface",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coord_name())
    }
}

// ---------------------------------------------------------------------------
// Record – one statistic value
// ---------------------------------------------------------------------------

/// A single value of a diagnostic variable. `value` is `NaN` when missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: f64,
    pub copy: String,
    pub level: f64,
    /// 1-based region number.
    pub region: usize,
    pub value: f64,
}

impl Record {
    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

// ---------------------------------------------------------------------------
// Grid – dense coordinate axes of a diagnostic variable
// ---------------------------------------------------------------------------

/// Coordinate axes of a dense `[time][copy][level][region]` variable.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub times: Vec<f64>,
    pub copies: Vec<String>,
    pub levels: Vec<f64>,
    pub regions: usize,
}

impl Grid {
    pub fn len(&self) -> usize {
        self.times.len() * self.copies.len() * self.levels.len() * self.regions
    }
}

// ---------------------------------------------------------------------------
// TimeSeries – one observation type, one role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub obs_type: String,
    pub role: Role,
    /// Vertical coordinate in use, `None` when the variable has no level dimension.
    pub level_kind: Option<LevelKind>,
    pub records: Vec<Record>,
}

impl TimeSeries {
    /// Flatten a dense variable into records. `values` is row-major over
    /// `[time][copy][level][region]`.
    pub fn from_grid(
        obs_type: &str,
        role: Role,
        level_kind: Option<LevelKind>,
        grid: &Grid,
        values: &[f64],
    ) -> Result<Self> {
        if values.len() != grid.len() {
            return Err(DiagError::ShapeMismatch {
                variable: role.variable_name(obs_type),
                expected: grid.len(),
                found: values.len(),
            });
        }

        let mut records = Vec::with_capacity(values.len());
        let mut it = values.iter();
        for &time in &grid.times {
            for copy in &grid.copies {
                for &level in &grid.levels {
                    for region in 1..=grid.regions {
                        // Length checked above.
                        let value = it.next().copied().unwrap_or(f64::NAN);
                        records.push(Record {
                            time,
                            copy: copy.clone(),
                            level,
                            region,
                            value,
                        });
                    }
                }
            }
        }

        Ok(Self {
            obs_type: obs_type.to_string(),
            role,
            level_kind,
            records,
        })
    }

    /// The vertical coordinate, falling back to surface when none is present.
    pub fn level_kind_or_surface(&self) -> LevelKind {
        self.level_kind.unwrap_or(LevelKind::Surface)
    }

    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.value).collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TimeUnits – CF style "<unit> since <epoch>"
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub epoch: NaiveDateTime,
    /// Length of one time unit in seconds.
    pub unit_seconds: f64,
}

impl Default for TimeUnits {
    /// DART's `days since 1601-01-01 00:00:00`.
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(1601, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            unit_seconds: 86_400.0,
        }
    }
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let bad = || DiagError::InvalidTimeUnits(units.to_string());

        let (unit, epoch) = units.trim().split_once(" since ").ok_or_else(bad)?;
        let unit_seconds = match unit.trim().to_ascii_lowercase().as_str() {
            "days" | "day" => 86_400.0,
            "hours" | "hour" => 3_600.0,
            "minutes" | "minute" => 60.0,
            "seconds" | "second" => 1.0,
            _ => return Err(bad()),
        };

        let epoch = epoch.trim().trim_end_matches(" UTC");
        let epoch = NaiveDateTime::parse_from_str(epoch, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(epoch, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| {
                NaiveDate::parse_from_str(epoch, "%Y-%m-%d")
                    .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
            })
            .map_err(|_| bad())?;

        Ok(Self {
            epoch,
            unit_seconds,
        })
    }

    /// Convert a time coordinate value to a calendar date.
    pub fn to_datetime(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit_seconds * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

// ---------------------------------------------------------------------------
// DiagDataset – the complete loaded file
// ---------------------------------------------------------------------------

/// A loaded diagnostic file. Immutable after construction.
#[derive(Debug, Clone)]
pub struct DiagDataset {
    obs_types: Vec<String>,
    region_names: Vec<String>,
    time_units: TimeUnits,
    series: Vec<TimeSeries>,
}

impl DiagDataset {
    pub fn new(
        obs_types: Vec<String>,
        region_names: Vec<String>,
        time_units: TimeUnits,
        series: Vec<TimeSeries>,
    ) -> Self {
        Self {
            obs_types,
            region_names,
            time_units,
            series,
        }
    }

    /// Observation type names in file order.
    pub fn obs_types(&self) -> &[String] {
        &self.obs_types
    }

    pub fn region_count(&self) -> usize {
        self.region_names.len()
    }

    /// Display name of a 1-based region number.
    pub fn region_name(&self, region: usize) -> String {
        region
            .checked_sub(1)
            .and_then(|i| self.region_names.get(i))
            .cloned()
            .unwrap_or_else(|| format!("region {region}"))
    }

    pub fn time_units(&self) -> TimeUnits {
        self.time_units
    }

    /// The time series of `obs_type` for the given role. Labels are compared
    /// after stripping enumeration punctuation, so menu text can be passed
    /// straight through.
    pub fn series(&self, obs_type: &str, role: Role) -> Result<TimeSeries> {
        let wanted = strip_enum_punctuation(obs_type);
        self.series
            .iter()
            .find(|s| s.role == role && strip_enum_punctuation(&s.obs_type) == wanted)
            .cloned()
            .ok_or_else(|| {
                if self.obs_types.iter().any(|o| strip_enum_punctuation(o) == wanted) {
                    DiagError::MissingVariable(role.variable_name(&wanted))
                } else {
                    DiagError::UnknownObsType(wanted)
                }
            })
    }
}

/// Remove the `[`, `]`, `,` and `'` characters a stringified name list leaves behind.
pub fn strip_enum_punctuation(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | ',' | '\''))
        .collect()
}
