// Core library for the Ossature web-application runtime
// This crate contains the request-dispatch core: pattern routing, the
// service registry, handler argument resolution, and the server glue

pub mod action;
pub mod application;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod route;
pub mod router;
pub mod url;

// Re-export commonly used types
pub use action::*;
pub use application::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use http::*;
pub use middleware::*;
pub use registry::*;
pub use route::*;
pub use router::*;
pub use url::*;
