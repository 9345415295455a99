// Absolute URL generation over reverse routing

use crate::router::Router;
use crate::Error;

/// Builds absolute URLs from a host and reversed route paths.
///
/// The dispatch core only produces paths; scheme and host live here.
#[derive(Debug, Clone)]
pub struct UrlGenerator {
    host: String,
    secure: bool,
}

impl UrlGenerator {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_matches('/').to_string(),
            secure: false,
        }
    }

    /// Generate `https://` URLs instead of `http://`
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// Absolute URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}/{}", self.scheme(), self.host, path.trim_matches('/'))
    }

    /// Absolute URL for a named route
    pub fn route(
        &self,
        router: &Router,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<String, Error> {
        let route = router
            .named(name)
            .ok_or_else(|| Error::RouteNotFound(name.to_string()))?;
        Ok(self.url(&route.build_uri(params)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_host_and_path() {
        let urls = UrlGenerator::new("example.com/");
        assert_eq!(urls.url("/css/app.css"), "http://example.com/css/app.css");
        assert_eq!(urls.url("/"), "http://example.com/");
    }

    #[test]
    fn test_secure_scheme() {
        let urls = UrlGenerator::new("example.com").secure(true);
        assert_eq!(urls.url("home"), "https://example.com/home");
    }

    #[test]
    fn test_route_url() {
        let mut router = Router::new();
        router
            .get("/{name}", "HomeController@show", Some("show"))
            .unwrap();

        let urls = UrlGenerator::new("example.com");
        let url = urls.route(&router, "show", &[("name", "thomas")]).unwrap();
        assert_eq!(url, "http://example.com/thomas");

        let err = urls.route(&router, "ghost", &[]).unwrap_err();
        assert!(matches!(err, Error::RouteNotFound(_)));
    }
}
