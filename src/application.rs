// Application boot context and HTTP server

use crate::action::ActionRegistry;
use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, InjectionPolicy};
use crate::logging::{error, info};
use crate::middleware::Middleware;
use crate::registry::ServiceRegistry;
use crate::router::Router;
use crate::url::UrlGenerator;
use crate::{Error, HttpRequest, HttpResponse};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Incoming as IncomingBody, Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

/// The application boot context.
///
/// Explicitly constructed and passed around rather than reachable as a
/// process-wide global, so multiple isolated instances can coexist (one per
/// test, for example). Populate the registries during boot, then freeze them
/// into a [`Dispatcher`] with [`App::build`] or serve directly with
/// [`App::listen`].
pub struct App {
    config: AppConfig,
    services: ServiceRegistry,
    router: Router,
    actions: ActionRegistry,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            services: ServiceRegistry::new(),
            router: Router::new(),
            actions: ActionRegistry::new(),
            middleware: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The service registry, for boot-phase bindings
    pub fn services(&mut self) -> &mut ServiceRegistry {
        &mut self.services
    }

    /// The route table, for boot-phase registration
    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    /// The action registry, for boot-phase registration
    pub fn actions(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    /// Install a middleware under a tag; route groups refer to it by tag
    pub fn middleware<M: Middleware + 'static>(&mut self, tag: &str, middleware: M) -> &mut Self {
        self.middleware.insert(tag.to_string(), Arc::new(middleware));
        self
    }

    /// URL generator for the configured base URL, if one is set
    pub fn url_generator(&self) -> Option<UrlGenerator> {
        self.config.base_url.as_deref().map(UrlGenerator::new)
    }

    /// Freeze the boot phase into a shareable dispatcher
    pub fn build(self) -> Dispatcher {
        let policy = if self.config.strict_injection {
            InjectionPolicy::Strict
        } else {
            InjectionPolicy::Permissive
        };

        Dispatcher::new(self.router, self.services, self.actions)
            .with_middleware(self.middleware)
            .with_policy(policy)
    }

    /// Start the HTTP server on the configured host and port
    pub async fn listen(self) -> Result<(), Error> {
        let host: IpAddr = self
            .config
            .host
            .parse()
            .map_err(|e| Error::Internal(format!("invalid host `{}`: {e}", self.config.host)))?;
        let addr = SocketAddr::new(host, self.config.port);

        let dispatcher = Arc::new(self.build());
        let listener = TcpListener::bind(addr).await?;

        info!(address = %addr, "Server listening");

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let dispatcher = dispatcher.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let dispatcher = dispatcher.clone();
                    async move { handle_request(req, dispatcher).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(error = ?err, "Error serving connection");
                }
            });
        }
    }
}

/// Handle an incoming HTTP request
async fn handle_request(
    req: Request<IncomingBody>,
    dispatcher: Arc<Dispatcher>,
) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut request = HttpRequest::new(method, path);

    for (name, value) in req.headers() {
        if let Ok(value_str) = value.to_str() {
            request
                .headers
                .insert(name.to_string(), value_str.to_string());
        }
    }

    let body_bytes = req.collect().await?.to_bytes();
    request.body = body_bytes.to_vec();

    let response = match dispatcher.dispatch(request).await {
        Ok(response) => response,
        Err(err) => {
            // A failed match renders as an error response, never a crash
            let status = err.status_code();
            error!(status = status, error = %err, "Request failed");
            let body = serde_json::json!({
                "error": err.to_string(),
                "status": status,
            });
            HttpResponse::new(status)
                .with_json(&body)
                .unwrap_or_else(|_| HttpResponse::internal_server_error())
        }
    };

    let mut builder = Response::builder().status(response.status);
    for (key, value) in response.headers {
        builder = builder.header(key, value);
    }

    match builder.body(Full::new(bytes::Bytes::from(response.body))) {
        Ok(response) => Ok(response),
        Err(err) => {
            error!(error = %err, "Failed to assemble response");
            let mut fallback = Response::new(Full::new(bytes::Bytes::new()));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            Ok(fallback)
        }
    }
}
