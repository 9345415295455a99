// Error types for the Ossature runtime

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid handler reference: {0}")]
    InvalidHandlerReference(String),

    #[error("Unbound parameter `{parameter}` for handler {handler}")]
    UnboundParameter { handler: String, parameter: String },

    #[error("Middleware not found: {0}")]
    MiddlewareNotFound(String),

    #[error("Missing URI parameter `{parameter}` for route {route}")]
    MissingUriParameter { route: String, parameter: String },

    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => 404,
            Error::Deserialization(_) => 400,
            // Wiring mistakes are server-side faults, not client errors
            Error::ServiceNotFound(_)
            | Error::InvalidHandlerReference(_)
            | Error::UnboundParameter { .. }
            | Error::MiddlewareNotFound(_)
            | Error::MissingUriParameter { .. }
            | Error::InvalidPattern { .. }
            | Error::Serialization(_)
            | Error::Internal(_)
            | Error::Io(_) => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_is_client_error() {
        let err = Error::RouteNotFound("GET /missing".to_string());
        assert_eq!(err.status_code(), 404);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_wiring_errors_are_server_errors() {
        let err = Error::ServiceNotFound("db".to_string());
        assert_eq!(err.status_code(), 500);
        assert!(err.is_server_error());

        let err = Error::InvalidHandlerReference("HomeController".to_string());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_error_display_names_the_subject() {
        let err = Error::ServiceNotFound("db".to_string());
        assert!(err.to_string().contains("db"));

        let err = Error::UnboundParameter {
            handler: "HomeController@show".to_string(),
            parameter: "name".to_string(),
        };
        assert!(err.to_string().contains("name"));
        assert!(err.to_string().contains("HomeController@show"));
    }
}
