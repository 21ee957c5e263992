//! How `obs_diag` output lays out its metadata and variables.

use super::error::DiagError;
use super::model::LevelKind;

/// Role of one stored dimension of a diagnostic variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Time,
    Copy,
    Level,
    Region,
}

/// Classify a variable's dimensions, in stored order. Also returns the
/// vertical coordinate, if the variable has one.
pub fn classify_dimensions<S: AsRef<str>>(
    variable: &str,
    dimensions: &[S],
) -> Result<(Vec<Axis>, Option<LevelKind>), DiagError> {
    let mut level_kind = None;
    let mut axes = Vec::with_capacity(dimensions.len());
    for dim in dimensions {
        let axis = match dim.as_ref() {
            "time" => Axis::Time,
            "copy" => Axis::Copy,
            "region" => Axis::Region,
            other => match LevelKind::from_coord_name(other) {
                Some(kind) => {
                    level_kind = Some(kind);
                    Axis::Level
                }
                None => {
                    return Err(DiagError::UnsupportedDimension {
                        variable: variable.to_string(),
                        dimension: other.to_string(),
                    })
                }
            },
        };
        axes.push(axis);
    }
    Ok((axes, level_kind))
}

/// Observation type names from an ordered list of global attribute names.
/// Every attribute after `comment` names one type.
pub fn obs_types_after_comment<I, S>(attribute_names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    attribute_names
        .into_iter()
        .skip_while(|name| name.as_ref() != "comment")
        .skip(1)
        .map(|name| name.as_ref().to_string())
        .collect()
}

/// Decode a fixed-width character field (NUL or blank padded) to text.
pub fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_obs_diag_dimensions() {
        let dims = ["time", "copy", "plevel", "region"];
        let (axes, kind) = classify_dimensions("RADIOSONDE_TEMPERATURE_guess", &dims).unwrap();
        assert_eq!(axes, vec![Axis::Time, Axis::Copy, Axis::Level, Axis::Region]);
        assert_eq!(kind, Some(LevelKind::Pressure));
    }

    #[test]
    fn surface_variables_may_lack_a_level() {
        let (axes, kind) = classify_dimensions("METAR_ALTIMETER_guess", &["region", "time", "copy"])
            .unwrap();
        assert_eq!(axes, vec![Axis::Region, Axis::Time, Axis::Copy]);
        assert_eq!(kind, None);
    }

    #[test]
    fn unknown_dimension_names_the_variable() {
        let err = classify_dimensions("MODEL_T_guess", &["time", "copy", "mlevel", "region"])
            .unwrap_err();
        match err {
            DiagError::UnsupportedDimension {
                variable,
                dimension,
            } => {
                assert_eq!(variable, "MODEL_T_guess");
                assert_eq!(dimension, "mlevel");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn obs_types_follow_comment_attribute() {
        let names = [
            "creation_date",
            "obs_diag_source",
            "comment",
            "RADIOSONDE_U_WIND_COMPONENT",
            "ACARS_TEMPERATURE",
        ];
        assert_eq!(
            obs_types_after_comment(names),
            vec!["RADIOSONDE_U_WIND_COMPONENT", "ACARS_TEMPERATURE"]
        );
        assert!(obs_types_after_comment(["title"]).is_empty());
    }

    #[test]
    fn decodes_padded_names() {
        assert_eq!(decode_name(b"Northern Hemisphere   "), "Northern Hemisphere");
        assert_eq!(decode_name(b"Tropics\0\0\0junk"), "Tropics");
    }
}
