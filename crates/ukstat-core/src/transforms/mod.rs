//! Table-specific derivation rules layered on the reshape pipeline.

pub mod age_bands;
pub mod birth_country;
pub mod ethnicity;
pub mod tenure;

pub use age_bands::{sum_age_range, ten_year_bands};
pub use birth_country::birth_country_buckets;
pub use ethnicity::ethnic_groups;
pub use tenure::regroup_tenure;
