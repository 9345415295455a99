// Route table with grouped registration and ordered matching

use crate::logging::debug;
use crate::route::{Route, RouteMatch};
use crate::{Error, HttpMethod};
use std::collections::HashSet;

/// Shared configuration for a group of routes.
///
/// `prefix` is joined to each member path with exactly one separator;
/// `name_prefix` is concatenated verbatim before each member name (include
/// the delimiter yourself, e.g. `"admin."`); middleware tags select
/// registered middleware for every member route.
#[derive(Debug, Clone, Default)]
pub struct GroupConfig {
    prefix: Option<String>,
    name_prefix: Option<String>,
    middleware: Vec<String>,
}

impl GroupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn middleware(mut self, tag: impl Into<String>) -> Self {
        self.middleware.push(tag.into());
        self
    }
}

/// The group context active while registering routes. Exactly one context
/// is active at a time; `group` installs one and restores the empty context
/// when its callback returns.
#[derive(Debug, Clone, Default)]
struct GroupContext {
    prefix: Option<String>,
    name_prefix: Option<String>,
    middleware: Vec<String>,
}

impl GroupContext {
    fn from_config(config: GroupConfig) -> Self {
        Self {
            prefix: config
                .prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            name_prefix: config
                .name_prefix
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            middleware: config.middleware,
        }
    }
}

/// Ordered collection of registered routes.
///
/// Registration is a one-time boot-phase activity; matching scans routes in
/// registration order, so the first structurally matching route wins.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    keys: HashSet<String>,
    group: GroupContext,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a GET route
    pub fn get(&mut self, uri: &str, action: &str, name: Option<&str>) -> Result<&mut Self, Error> {
        self.add_route(HttpMethod::Get, uri, action, name)
    }

    /// Register a POST route
    pub fn post(
        &mut self,
        uri: &str,
        action: &str,
        name: Option<&str>,
    ) -> Result<&mut Self, Error> {
        self.add_route(HttpMethod::Post, uri, action, name)
    }

    /// Register a route.
    ///
    /// The active group context's prefixes are applied first. A duplicate
    /// (method, final path) registration is silently dropped: the first
    /// registration's name and handler stay authoritative. An action
    /// reference that does not parse fails here, at registration time.
    pub fn add_route(
        &mut self,
        method: HttpMethod,
        uri: &str,
        action: &str,
        name: Option<&str>,
    ) -> Result<&mut Self, Error> {
        let uri = self.parse_uri(uri);
        let name = self.parse_name(name);
        let key = format!("{}@{}", method.as_str(), uri);

        if self.keys.contains(&key) {
            debug!(route = %key, "Duplicate route registration ignored");
            return Ok(self);
        }

        let route = Route::new(method, &uri, action, name, self.group.middleware.clone())?;
        debug!(route = %key, action = action, "Route registered");
        self.keys.insert(key);
        self.routes.push(route);

        Ok(self)
    }

    /// Register a group of routes under a shared context.
    ///
    /// The context applies to every route registered inside `register` and
    /// is reset to empty afterwards, even when `register` fails. Contexts do
    /// not nest: a `group` call inside `register` would replace the active
    /// context rather than stack on it.
    pub fn group<F>(&mut self, config: GroupConfig, register: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut Router) -> Result<(), Error>,
    {
        self.group = GroupContext::from_config(config);
        let result = register(self);
        self.group = GroupContext::default();
        result?;

        Ok(self)
    }

    /// Find the first route matching the request, in registration order.
    pub fn find(&self, method: &str, path: &str) -> Option<(&Route, RouteMatch)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(method, path).map(|matched| (route, matched)))
    }

    /// Find the first route carrying the given name.
    pub fn named(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.is_named(name))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn parse_uri(&self, uri: &str) -> String {
        match &self.group.prefix {
            Some(prefix) => format!("/{}/{}", prefix, uri.trim_start_matches('/')),
            None => uri.to_string(),
        }
    }

    fn parse_name(&self, name: Option<&str>) -> Option<String> {
        let name = name?;
        match &self.group.name_prefix {
            Some(prefix) => Some(format!("{prefix}{name}")),
            None => Some(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_find() {
        let mut router = Router::new();
        router
            .get("/", "HomeController@index", Some("home"))
            .unwrap()
            .get("/{name}", "HomeController@show", Some("show"))
            .unwrap();

        let (route, matched) = router.find("GET", "/thomas").unwrap();
        assert_eq!(route.action().to_string(), "HomeController@show");
        assert_eq!(matched.get("name"), Some("thomas"));
    }

    #[test]
    fn test_first_matching_route_wins() {
        let mut router = Router::new();
        router
            .get("/redirect", "HomeController@redirect", None)
            .unwrap()
            .get("/{name}", "HomeController@show", Some("show"))
            .unwrap();

        // "/redirect" also matches "/{name}" structurally; registration
        // order decides
        let (route, _) = router.find("GET", "/redirect").unwrap();
        assert_eq!(route.action().to_string(), "HomeController@redirect");
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut router = Router::new();
        router
            .get("/home", "FirstController@index", Some("first"))
            .unwrap()
            .get("/home", "SecondController@index", Some("second"))
            .unwrap();

        assert_eq!(router.len(), 1);
        let (route, _) = router.find("GET", "/home").unwrap();
        assert_eq!(route.action().to_string(), "FirstController@index");
        assert!(router.named("first").is_some());
        assert!(router.named("second").is_none());
    }

    #[test]
    fn test_same_path_different_method_is_not_a_duplicate() {
        let mut router = Router::new();
        router
            .get("/home", "HomeController@index", None)
            .unwrap()
            .post("/home", "HomeController@store", None)
            .unwrap();

        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_group_applies_prefixes() {
        let mut router = Router::new();
        router
            .group(
                GroupConfig::new()
                    .prefix("admin")
                    .name_prefix("admin.")
                    .middleware("auth"),
                |router| {
                    router.get("/home", "AdminController@index", Some("home"))?;
                    Ok(())
                },
            )
            .unwrap();

        let route = router.named("admin.home").unwrap();
        assert_eq!(route.pattern(), "/admin/home");
        assert_eq!(route.middleware(), &["auth".to_string()]);
        assert!(router.find("GET", "/admin/home").is_some());
        assert!(router.find("GET", "/home").is_none());
    }

    #[test]
    fn test_group_name_prefix_is_trimmed_of_whitespace() {
        let mut router = Router::new();
        router
            .group(GroupConfig::new().name_prefix(" admin. "), |router| {
                router.get("/home", "AdminController@index", Some("home"))?;
                Ok(())
            })
            .unwrap();

        assert!(router.named("admin.home").is_some());
        assert!(router.named(" admin. home").is_none());
    }

    #[test]
    fn test_group_prefix_is_trimmed_of_separators() {
        let mut router = Router::new();
        router
            .group(GroupConfig::new().prefix("/admin/"), |router| {
                router.get("/home", "AdminController@index", None)?;
                Ok(())
            })
            .unwrap();

        assert_eq!(router.routes()[0].pattern(), "/admin/home");
    }

    #[test]
    fn test_group_context_is_restored() {
        let mut router = Router::new();
        router
            .group(GroupConfig::new().prefix("admin").middleware("auth"), |router| {
                router.get("/home", "AdminController@index", None)?;
                Ok(())
            })
            .unwrap()
            .get("/about", "HomeController@about", Some("about"))
            .unwrap();

        let route = router.named("about").unwrap();
        assert_eq!(route.pattern(), "/about");
        assert!(route.middleware().is_empty());
    }

    #[test]
    fn test_group_context_is_restored_on_error() {
        let mut router = Router::new();
        let result = router.group(GroupConfig::new().prefix("admin"), |router| {
            router.get("/home", "not-a-reference", None)?;
            Ok(())
        });
        assert!(result.is_err());

        router.get("/about", "HomeController@about", None).unwrap();
        assert_eq!(router.routes()[0].pattern(), "/about");
    }

    #[test]
    fn test_named_lookup_missing() {
        let router = Router::new();
        assert!(router.named("home").is_none());
    }

    #[test]
    fn test_custom_verb() {
        let mut router = Router::new();
        router
            .add_route(HttpMethod::from("PURGE"), "/cache", "CacheController@purge", None)
            .unwrap();

        assert!(router.find("PURGE", "/cache").is_some());
        assert!(router.find("GET", "/cache").is_none());
    }
}
