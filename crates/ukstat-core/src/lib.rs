pub mod classify;
pub mod data_utils;
pub mod lookup;
pub mod pipeline;
pub mod ports;
pub mod reshape;
pub mod resolver;
pub mod transforms;

pub use classify::{Classification, classify};
pub use data_utils::{
    any_to_string, cell_string, column_numeric_values, column_string_values, select_expected,
    snake_case, snake_case_unique,
};
pub use lookup::assemble;
pub use pipeline::{
    DATASET_LOCAL_AUTHORITY, DATASET_SMALL_AREA, LookupEndpoint, census_table, population,
    population_age_range, unified_lookup,
};
pub use ports::{FeatureService, ObservationSource, TableCatalog};
pub use reshape::{pivot_categories, reshape};
pub use resolver::resolve;
pub use transforms::{
    birth_country_buckets, ethnic_groups, regroup_tenure, sum_age_range, ten_year_bands,
};
