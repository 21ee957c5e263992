use thiserror::Error;

/// Errors raised by the diagnostic data layer.
#[derive(Debug, Error)]
pub enum DiagError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON diagnostic file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Unknown observation type: {0}")]
    UnknownObsType(String),

    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// A variable is laid out over a dimension the reader does not understand.
    #[cfg(any(feature = "netcdf", test))]
    #[error("Variable {variable} has unsupported dimension '{dimension}'")]
    UnsupportedDimension { variable: String, dimension: String },

    #[error("Variable {variable}: expected {expected} values, found {found}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid time units: '{0}'")]
    InvalidTimeUnits(String),

    #[error("Invalid level label: '{0}'")]
    InvalidLevelLabel(String),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// Feature not enabled at build time
    #[error("{0} support not enabled in this build")]
    FeatureDisabled(&'static str),
}

pub type Result<T> = std::result::Result<T, DiagError>;
