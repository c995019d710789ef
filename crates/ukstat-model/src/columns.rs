//! Canonical column names for raw and tidy frames.
//!
//! Raw observations arrive from upstream under whatever names the API
//! uses; the client layer renames them to these before anything in the
//! core touches a frame. Keep this module in sync with the reshape
//! pipeline's identity-column handling.

/// Nine-character ONS area code.
pub const AREA_CODE: &str = "area_code";
/// Human-readable area name.
pub const AREA_NAME: &str = "area_name";
/// Observation date (year), present on time-series datasets only.
pub const DATE: &str = "date";
/// Long-format category label (the pivot source).
pub const CATEGORY: &str = "category";
/// Measure name: `Value` or `Percent`.
pub const MEASURE: &str = "measure";
/// Observation value.
pub const VALUE: &str = "value";
/// Rural/urban qualifier on England & Wales census tables.
pub const RURAL_URBAN: &str = "rural_urban";
/// Raw Nomis single-year-of-age code (offset 101).
pub const AGE_CODE: &str = "age_code";

/// Unified geography-lookup schema.
pub const PARENT_CODE: &str = "parent_code";
/// Unified geography-lookup schema.
pub const PARENT_NAME: &str = "parent_name";
