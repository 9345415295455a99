// Request dispatch: route lookup, argument resolution, action invocation

use crate::action::{Action, ActionRegistry, Arg, ParamSpec};
use crate::logging::{debug, trace};
use crate::middleware::{EndpointFn, Middleware, MiddlewareChain};
use crate::registry::{ServiceInstance, ServiceRegistry};
use crate::route::{Route, RouteMatch};
use crate::router::Router;
use crate::{Error, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;

/// What to do when a declared action parameter cannot be bound.
///
/// `Permissive` mirrors the historical behavior: the argument is handed to
/// the action as [`Arg::Unbound`]. `Strict` fails the request instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InjectionPolicy {
    #[default]
    Permissive,
    Strict,
}

/// Turns an incoming request into an invoked action.
///
/// Built once after the boot phase from a populated router, service
/// registry, and action registry; safe to share across concurrently handled
/// requests.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    services: Arc<ServiceRegistry>,
    actions: Arc<ActionRegistry>,
    middleware: Arc<HashMap<String, Arc<dyn Middleware>>>,
    policy: InjectionPolicy,
}

impl Dispatcher {
    pub fn new(router: Router, services: ServiceRegistry, actions: ActionRegistry) -> Self {
        Self {
            router: Arc::new(router),
            services: Arc::new(services),
            actions: Arc::new(actions),
            middleware: Arc::new(HashMap::new()),
            policy: InjectionPolicy::default(),
        }
    }

    /// Install the tagged middleware that route groups refer to
    pub fn with_middleware(mut self, middleware: HashMap<String, Arc<dyn Middleware>>) -> Self {
        self.middleware = Arc::new(middleware);
        self
    }

    pub fn with_policy(mut self, policy: InjectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Ad hoc service lookup, re-exported from the registry
    pub fn resolve(&self, name: &str) -> Result<ServiceInstance, Error> {
        self.services.resolve(name)
    }

    /// Dispatch a request to the first matching route's action.
    ///
    /// The query string is split off before matching. No match fails with
    /// [`Error::RouteNotFound`]; a matched route whose action reference is
    /// not registered fails with [`Error::InvalidHandlerReference`]. The
    /// action's result or failure is propagated untouched.
    pub async fn dispatch(&self, mut req: HttpRequest) -> Result<HttpResponse, Error> {
        let (path, query) = match req.path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (req.path.clone(), None),
        };
        if let Some(query) = query {
            req.query_params = parse_query_string(&query);
        }

        let (route, matched) = self
            .router
            .find(&req.method, &path)
            .ok_or_else(|| Error::RouteNotFound(format!("{} {}", req.method, path)))?;
        debug!(method = %req.method, path = %path, route = %route.pattern(), "Route matched");

        let action = self
            .actions
            .get(route.action())
            .ok_or_else(|| Error::InvalidHandlerReference(route.action().to_string()))?;

        let args = self.resolve_args(route, action, &matched)?;
        let chain = self.chain_for(route)?;

        req.path = path;
        req.path_params = matched.into_map();

        let func = action.func.clone();
        let endpoint: EndpointFn = Arc::new(move |req| func(req, args.clone()));
        chain.apply(req, endpoint).await
    }

    /// Produce the path for a named route (reverse routing).
    ///
    /// Composition with a base URL is the caller's concern; see
    /// [`crate::UrlGenerator`].
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, Error> {
        let route = self
            .router
            .named(name)
            .ok_or_else(|| Error::RouteNotFound(name.to_string()))?;
        route.build_uri(params)
    }

    /// Resolve the action's declared argument list, in declaration order.
    fn resolve_args(
        &self,
        route: &Route,
        action: &Action,
        matched: &RouteMatch,
    ) -> Result<Vec<Arg>, Error> {
        let mut args = Vec::with_capacity(action.params.len());

        for spec in &action.params {
            let arg = match spec {
                ParamSpec::Path(name) => match matched.get(name) {
                    Some(value) => Arg::Value(value.to_string()),
                    None => {
                        if self.policy == InjectionPolicy::Strict {
                            return Err(Error::UnboundParameter {
                                handler: route.action().to_string(),
                                parameter: name.clone(),
                            });
                        }
                        debug!(
                            handler = %route.action(),
                            parameter = %name,
                            "No extracted value for path parameter, leaving argument unbound"
                        );
                        Arg::Unbound
                    }
                },
                ParamSpec::Service(name) => match self.services.resolve(name) {
                    Ok(instance) => Arg::Service(instance),
                    Err(err) => {
                        if self.policy == InjectionPolicy::Strict {
                            return Err(err);
                        }
                        debug!(
                            handler = %route.action(),
                            service = %name,
                            "Service resolution failed, leaving argument unbound"
                        );
                        Arg::Unbound
                    }
                },
            };
            args.push(arg);
        }

        Ok(args)
    }

    /// Collect the route's middleware chain from its group tags.
    fn chain_for(&self, route: &Route) -> Result<MiddlewareChain, Error> {
        if route.middleware().is_empty() {
            return Ok(MiddlewareChain::default());
        }

        let mut selected = Vec::with_capacity(route.middleware().len());
        for tag in route.middleware() {
            trace!(middleware = %tag, route = %route.pattern(), "Selecting middleware");
            let middleware = self
                .middleware
                .get(tag)
                .cloned()
                .ok_or_else(|| Error::MiddlewareNotFound(tag.clone()))?;
            selected.push(middleware);
        }

        Ok(MiddlewareChain::new(selected))
    }
}

/// Parse a query string into a map of parameters
pub(crate) fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
