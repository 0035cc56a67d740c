pub mod error;
pub mod models;

pub use error::{GatewayError, StoreError};
pub use models::{Credentials, ObjectLocator, ObjectMetadata};
