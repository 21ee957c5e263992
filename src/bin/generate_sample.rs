//! Writes `sample_diag.json`, a small diagnostic file for trying the viewer:
//! two observation types, three regions, fourteen daily analysis times.
//! `RADIOSONDE_TEMPERATURE` has no data at 250 hPa, and the Tropics region of
//! `METAR_ALTIMETER` has no forecast data at all.

use serde_json::{json, Value};

const REGIONS: [&str; 3] = ["Northern Hemisphere", "Tropics", "Southern Hemisphere"];
const COPIES: [&str; 4] = ["Nposs", "Nused", "rmse", "bias"];
const N_TIMES: usize = 14;
/// 2008-08-01 in days since 1601-01-01.
const FIRST_DAY: f64 = 148_880.0;

/// Number of possible observations at time `t`, level `l`, region `r`.
fn possible_at(t: usize, l: usize, r: usize) -> f64 {
    200.0 + 40.0 * r as f64 + 15.0 * ((t + l) as f64).sin()
}

/// Values for one variable, indexed `[time][copy][level][region]`.
/// `rmse_at` returns `None` for a missing value.
fn variable_values(
    levels: &[f64],
    rmse_at: impl Fn(usize, usize, usize) -> Option<f64>,
) -> Value {
    let times: Vec<Value> = (0..N_TIMES)
        .map(|t| {
            let copies: Vec<Value> = COPIES
                .iter()
                .map(|&copy| {
                    let per_level: Vec<Value> = (0..levels.len())
                        .map(|l| {
                            let per_region: Vec<Value> = (0..REGIONS.len())
                                .map(|r| {
                                    let rmse = rmse_at(t, l, r);
                                    let possible = possible_at(t, l, r);
                                    match (copy, rmse) {
                                        ("Nposs", _) => json!(possible.round()),
                                        ("Nused", Some(_)) => json!((0.85 * possible).round()),
                                        ("Nused", None) => json!(0.0),
                                        ("rmse", Some(v)) => json!(v),
                                        ("bias", Some(v)) => json!(0.1 * v),
                                        _ => Value::Null,
                                    }
                                })
                                .collect();
                            Value::Array(per_region)
                        })
                        .collect();
                    Value::Array(per_level)
                })
                .collect();
            Value::Array(copies)
        })
        .collect();
    Value::Array(times)
}

fn wave(t: usize, phase: f64, base: f64, amplitude: f64) -> f64 {
    base + amplitude * (t as f64 * 0.7 + phase).sin()
}

fn main() {
    let sonde_levels = [1000.0, 850.0, 700.0, 500.0, 300.0, 250.0];
    let sonde = |analysis: bool| {
        let shrink = if analysis { 0.7 } else { 1.0 };
        variable_values(&sonde_levels, move |t, l, r| {
            if sonde_levels[l] == 250.0 || (t == 3 && r == 0) {
                return None;
            }
            Some(shrink * wave(t, (l + r) as f64, 1.6 + 0.2 * l as f64, 0.4))
        })
    };

    let metar_levels = [1.0];
    let metar = |analysis: bool| {
        let shrink = if analysis { 0.6 } else { 1.0 };
        variable_values(&metar_levels, move |t, _, r| {
            if r == 1 && !analysis {
                return None;
            }
            Some(shrink * wave(t, r as f64, 120.0, 25.0))
        })
    };

    let doc = json!({
        "time_units": "days since 1601-01-01 00:00:00",
        "region_names": REGIONS,
        "obs_types": ["RADIOSONDE_TEMPERATURE", "METAR_ALTIMETER"],
        "times": (0..N_TIMES).map(|t| FIRST_DAY + t as f64 + 0.5).collect::<Vec<_>>(),
        "copies": COPIES,
        "variables": [
            { "obs_type": "RADIOSONDE_TEMPERATURE", "role": "forecast", "level_kind": "plevel",
              "levels": sonde_levels, "values": sonde(false) },
            { "obs_type": "RADIOSONDE_TEMPERATURE", "role": "analysis", "level_kind": "plevel",
              "levels": sonde_levels, "values": sonde(true) },
            { "obs_type": "METAR_ALTIMETER", "role": "forecast", "level_kind": "surface",
              "levels": metar_levels, "values": metar(false) },
            { "obs_type": "METAR_ALTIMETER", "role": "analysis", "level_kind": "surface",
              "levels": metar_levels, "values": metar(true) },
        ],
    });

    let output_path = "sample_diag.json";
    let text = serde_json::to_string_pretty(&doc).expect("Failed to serialize sample");
    std::fs::write(output_path, text).expect("Failed to write output file");

    println!(
        "Wrote {} observation types × {} regions × {N_TIMES} times to {output_path}",
        2,
        REGIONS.len()
    );
}
