// Library exports for integration tests
pub mod app_state;
pub mod config;
pub mod delegation;
pub mod handlers;
pub mod locator;
pub mod response;
pub mod server;
pub mod signing;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use app_state::AppState;
pub use config::{Config, StoreKind, Strategy};
pub use delegation::{Delegate, Delegation, DelegationSettings, build_strategy};
pub use locator::{LocatorResolver, parse_location};
pub use signing::Signer;
pub use storage::{InMemoryStore, ObjectStore, S3Store};
pub use types::{Credentials, GatewayError, ObjectLocator, StoreError};

// Re-export server creation function
pub use server::create_app;
