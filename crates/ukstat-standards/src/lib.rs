pub mod cob;
pub mod entity_key;
pub mod error;
pub mod lookups;

pub use cob::{CobBucket, CobBucketTable};
pub use entity_key::GeographyKey;
pub use error::StandardsError;
pub use lookups::{ConstituencyRegion, ConstituencyRegionKey, MergeHistory, MergeRecord};
