pub mod error;
pub mod nomis;
pub mod opengeo;

pub use error::ClientError;
pub use nomis::{DEFAULT_BASE_URL, NomisClient};
pub use opengeo::OpenGeoClient;
