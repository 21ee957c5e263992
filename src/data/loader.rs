use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::error::DiagError;
use super::model::{DiagDataset, Grid, LevelKind, Role, TimeSeries, TimeUnits};

/// DART's missing-value marker for real-valued diagnostics.
pub const DART_MISSING_R4: f64 = -888_888.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a diagnostic dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.nc` / `.nc4` / `.cdf` – DART `obs_diag` output (needs the `netcdf` feature)
/// * `.json`                 – the viewer's own exchange format, see [`JsonDiag`]
pub fn load_file(path: &Path) -> Result<DiagDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => load_json(path)?,
        "nc" | "nc4" | "cdf" => load_netcdf(path)?,
        other => return Err(DiagError::UnsupportedExtension(other.to_string()).into()),
    };

    log::info!(
        "Loaded {} observation types, {} regions from {}",
        dataset.obs_types().len(),
        dataset.region_count(),
        path.display()
    );
    Ok(dataset)
}

#[cfg(feature = "netcdf")]
fn load_netcdf(path: &Path) -> Result<DiagDataset> {
    super::nc::load(path).with_context(|| format!("reading netCDF file {}", path.display()))
}

#[cfg(not(feature = "netcdf"))]
fn load_netcdf(path: &Path) -> Result<DiagDataset> {
    Err(DiagError::FeatureDisabled("netCDF"))
        .with_context(|| format!("cannot open {} (rebuild with --features netcdf)", path.display()))
}

/// Map a raw stored value to the in-memory representation (`NaN` when missing).
pub fn normalize_missing(value: f64, fill_value: Option<f64>) -> f64 {
    if !value.is_finite() || value == DART_MISSING_R4 || Some(value) == fill_value {
        f64::NAN
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// JSON exchange format:
///
/// ```json
/// {
///   "time_units": "days since 1601-01-01 00:00:00",
///   "region_names": ["Northern Hemisphere", "Tropics", "Southern Hemisphere"],
///   "obs_types": ["RADIOSONDE_TEMPERATURE"],
///   "times": [150000.5, 150001.5],
///   "copies": ["Nposs", "Nused", "rmse"],
///   "variables": [
///     {
///       "obs_type": "RADIOSONDE_TEMPERATURE",
///       "role": "forecast",
///       "level_kind": "plevel",
///       "levels": [850.0, 500.0],
///       "values": [[[[1.2, null, 0.9], ...], ...], ...]
///     }
///   ]
/// }
/// ```
///
/// `values` is indexed `[time][copy][level][region]`; `null` marks a missing value.
/// `level_kind` may be `null` (no vertical dimension); `levels` then defaults to `[1.0]`.
#[derive(Debug, Deserialize)]
pub struct JsonDiag {
    #[serde(default)]
    pub time_units: Option<String>,
    pub region_names: Vec<String>,
    pub obs_types: Vec<String>,
    pub times: Vec<f64>,
    pub copies: Vec<String>,
    pub variables: Vec<JsonVariable>,
}

#[derive(Debug, Deserialize)]
pub struct JsonVariable {
    pub obs_type: String,
    pub role: Role,
    #[serde(default)]
    pub level_kind: Option<LevelKind>,
    #[serde(default = "surface_levels")]
    pub levels: Vec<f64>,
    pub values: Vec<Vec<Vec<Vec<Option<f64>>>>>,
}

fn surface_levels() -> Vec<f64> {
    vec![1.0]
}

fn load_json(path: &Path) -> Result<DiagDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text).context("parsing JSON diagnostic file")
}

/// Parse the JSON exchange format into a dataset.
pub fn parse_json(text: &str) -> Result<DiagDataset, DiagError> {
    let doc: JsonDiag = serde_json::from_str(text)?;

    let time_units = match &doc.time_units {
        Some(units) => TimeUnits::parse(units)?,
        None => TimeUnits::default(),
    };

    let mut series = Vec::with_capacity(doc.variables.len());
    for var in &doc.variables {
        let grid = Grid {
            times: doc.times.clone(),
            copies: doc.copies.clone(),
            levels: var.levels.clone(),
            regions: doc.region_names.len(),
        };
        let values = flatten_values(&var.values, &grid)
            .map_err(|found| DiagError::ShapeMismatch {
                variable: var.role.variable_name(&var.obs_type),
                expected: grid.len(),
                found,
            })?;
        series.push(TimeSeries::from_grid(
            &var.obs_type,
            var.role,
            var.level_kind,
            &grid,
            &values,
        )?);
    }

    Ok(DiagDataset::new(
        doc.obs_types,
        doc.region_names,
        time_units,
        series,
    ))
}

/// Flatten nested `[time][copy][level][region]` values, checking every axis
/// length against the grid. On mismatch returns the number of values seen.
fn flatten_values(
    values: &[Vec<Vec<Vec<Option<f64>>>>],
    grid: &Grid,
) -> std::result::Result<Vec<f64>, usize> {
    let total = || {
        values
            .iter()
            .flatten()
            .flatten()
            .map(|regions| regions.len())
            .sum::<usize>()
    };

    if values.len() != grid.times.len() {
        return Err(total());
    }
    let mut out = Vec::with_capacity(grid.len());
    for per_copy in values {
        if per_copy.len() != grid.copies.len() {
            return Err(total());
        }
        for per_level in per_copy {
            if per_level.len() != grid.levels.len() {
                return Err(total());
            }
            for per_region in per_level {
                if per_region.len() != grid.regions {
                    return Err(total());
                }
                out.extend(
                    per_region
                        .iter()
                        .map(|v| v.map_or(f64::NAN, |v| normalize_missing(v, None))),
                );
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LevelKind;

    const DOC: &str = r#"{
        "time_units": "days since 1601-01-01 00:00:00",
        "region_names": ["North", "Tropics"],
        "obs_types": ["RADIOSONDE_TEMPERATURE", "METAR_ALTIMETER"],
        "times": [150000.0, 150001.0],
        "copies": ["rmse", "Nposs"],
        "variables": [
            {
                "obs_type": "RADIOSONDE_TEMPERATURE",
                "role": "forecast",
                "level_kind": "plevel",
                "levels": [500.0],
                "values": [
                    [[[1.0, null]], [[10.0, 0.0]]],
                    [[[1.5, -888888.0]], [[12.0, 0.0]]]
                ]
            },
            {
                "obs_type": "METAR_ALTIMETER",
                "role": "analysis",
                "level_kind": null,
                "values": [
                    [[[0.5, 0.6]], [[3.0, 4.0]]],
                    [[[0.7, 0.8]], [[3.0, 4.0]]]
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_exchange_format() {
        let ds = parse_json(DOC).unwrap();
        assert_eq!(ds.obs_types().len(), 2);
        assert_eq!(ds.region_count(), 2);

        let fc = ds.series("RADIOSONDE_TEMPERATURE", Role::Forecast).unwrap();
        assert_eq!(fc.level_kind, Some(LevelKind::Pressure));
        assert_eq!(fc.len(), 8);
        assert_eq!(fc.records[0].value, 1.0);
        assert!(fc.records[1].is_missing());
        // DART missing marker becomes NaN, zero stays zero.
        assert!(fc.records[5].is_missing());
        assert_eq!(fc.records[3].value, 0.0);

        let an = ds.series("METAR_ALTIMETER", Role::Analysis).unwrap();
        assert_eq!(an.level_kind, None);
        assert!(an.records.iter().all(|r| r.level == 1.0));
    }

    #[test]
    fn rejects_ragged_values() {
        let ragged = DOC.replace("[[[1.0, null]], [[10.0, 0.0]]]", "[[[1.0]], [[10.0, 0.0]]]");
        let err = parse_json(&ragged).unwrap_err();
        assert!(matches!(err, DiagError::ShapeMismatch { expected: 8, .. }));
    }

    #[test]
    fn missing_markers() {
        assert!(normalize_missing(DART_MISSING_R4, None).is_nan());
        assert!(normalize_missing(9.96e36, Some(9.96e36)).is_nan());
        assert!(normalize_missing(f64::INFINITY, None).is_nan());
        assert_eq!(normalize_missing(0.0, Some(9.96e36)), 0.0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("diag.parquet")).unwrap_err();
        assert!(err.to_string().contains("parquet"));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn netcdf_needs_feature() {
        let err = load_file(Path::new("obs_diag_output.nc")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagError>(),
            Some(DiagError::FeatureDisabled(_))
        ));
    }
}
