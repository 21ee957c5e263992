/// Data layer: core types, loading, filtering and statistics.
///
/// Architecture:
/// ```text
///  .nc / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DiagDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  DiagDataset  │  obs types, regions, Vec<TimeSeries>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  select records by level / copy / region
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  missing-aware mean / max / masks
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
#[cfg(any(feature = "netcdf", test))]
pub mod layout;
pub mod loader;
pub mod model;
#[cfg(feature = "netcdf")]
mod nc;
pub mod stats;
