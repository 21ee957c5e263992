//! Reader for DART `obs_diag` netCDF output.
//!
//! Layout consumed:
//! - global attributes: every attribute after `comment` names an observation type
//! - `time(time)` with CF `units`
//! - `region_names(region, stringlength)` and `CopyMetaData(copy, stringlength)` char arrays
//! - `<TYPE>_guess` / `<TYPE>_analy` over `time`, `copy`, one of `plevel`/`hlevel`/`surface`,
//!   and `region`, in any order

use std::path::Path;

use netcdf::AttributeValue;

use super::error::{DiagError, Result};
use super::layout::{classify_dimensions, decode_name, obs_types_after_comment, Axis};
use super::loader::normalize_missing;
use super::model::{DiagDataset, Grid, Role, TimeSeries, TimeUnits};

pub fn load(path: &Path) -> Result<DiagDataset> {
    let file = netcdf::open(path)?;

    let obs_types = obs_types_after_comment(file.attributes().map(|a| a.name().to_string()));
    let times = read_coord(&file, "time")?;
    let time_units = match file.variable("time").and_then(|v| string_attribute(&v, "units")) {
        Some(units) => TimeUnits::parse(&units)?,
        None => TimeUnits::default(),
    };
    let region_names = read_names(&file, "region_names")?;
    let copies = read_names(&file, "CopyMetaData")?;

    let mut series = Vec::new();
    for obs_type in &obs_types {
        for role in [Role::Forecast, Role::Analysis] {
            let name = role.variable_name(obs_type);
            let Some(var) = file.variable(&name) else {
                log::warn!("{name} not present in {}", path.display());
                continue;
            };
            let grid = Grid {
                times: times.clone(),
                copies: copies.clone(),
                levels: Vec::new(),
                regions: region_names.len(),
            };
            match read_series(&file, &var, obs_type, role, grid) {
                Ok(s) => series.push(s),
                Err(e @ DiagError::UnsupportedDimension { .. }) => {
                    log::warn!("Skipping {name}: {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(DiagDataset::new(obs_types, region_names, time_units, series))
}

fn read_series(
    file: &netcdf::File,
    var: &netcdf::Variable,
    obs_type: &str,
    role: Role,
    mut grid: Grid,
) -> Result<TimeSeries> {
    let name = var.name();

    let dims = var.dimensions();
    let dim_names: Vec<String> = dims.iter().map(|d| d.name()).collect();
    let lens: Vec<usize> = dims.iter().map(|d| d.len()).collect();
    let (axes, level_kind) = classify_dimensions(&name, &dim_names)?;

    grid.levels = match level_kind {
        Some(kind) => read_coord(file, kind.coord_name())?,
        None => vec![1.0],
    };

    let fill_value = ["_FillValue", "missing_value"]
        .iter()
        .find_map(|attr| numeric_attribute(var, attr));
    let raw: Vec<f64> = var.get_values::<f64, _>(..)?;

    // Row-major strides of the stored layout.
    let mut strides = vec![1usize; lens.len()];
    for i in (0..lens.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * lens[i + 1];
    }
    let stride_of = |axis: Axis| {
        axes.iter()
            .position(|&a| a == axis)
            .map_or(0, |i| strides[i])
    };
    let (st, sc, sl, sr) = (
        stride_of(Axis::Time),
        stride_of(Axis::Copy),
        stride_of(Axis::Level),
        stride_of(Axis::Region),
    );

    let mut values = Vec::with_capacity(grid.len());
    for t in 0..grid.times.len() {
        for c in 0..grid.copies.len() {
            for l in 0..grid.levels.len() {
                for r in 0..grid.regions {
                    let offset = t * st + c * sc + l * sl + r * sr;
                    let value = raw.get(offset).copied().ok_or_else(|| {
                        DiagError::ShapeMismatch {
                            variable: name.clone(),
                            expected: grid.len(),
                            found: raw.len(),
                        }
                    })?;
                    values.push(normalize_missing(value, fill_value));
                }
            }
        }
    }

    TimeSeries::from_grid(obs_type, role, level_kind, &grid, &values)
}

fn read_coord(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| DiagError::MissingVariable(name.to_string()))?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read a `(n, stringlength)` char variable as `n` strings.
fn read_names(file: &netcdf::File, name: &str) -> Result<Vec<String>> {
    let var = file
        .variable(name)
        .ok_or_else(|| DiagError::MissingVariable(name.to_string()))?;
    let width = var.dimensions().last().map_or(1, |d| d.len()).max(1);
    let raw = var.get_raw_values(..)?;
    Ok(raw.chunks(width).map(decode_name).collect())
}

fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(d) => Some(d),
        AttributeValue::Float(f) => Some(f as f64),
        AttributeValue::Int(i) => Some(i as f64),
        _ => None,
    }
}
