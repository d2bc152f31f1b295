// Torii image gateway library

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod signature;
pub mod storage;
pub mod transform;
pub mod urlbuilder;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use middleware::{Handler, ImageGateway};
pub use signature::Signer;
pub use urlbuilder::UrlBuilder;
