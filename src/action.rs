// Action registry: handler references, declared parameter specs, invocables

use crate::{Error, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A parsed handler reference in `Controller@method` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    controller: String,
    method: String,
}

impl ActionRef {
    /// Parse a `Controller@method` reference.
    ///
    /// Anything that does not decompose into exactly two non-empty parts
    /// fails with [`Error::InvalidHandlerReference`].
    pub fn parse(reference: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = reference.split('@').collect();
        match parts.as_slice() {
            [controller, method] if !controller.is_empty() && !method.is_empty() => Ok(Self {
                controller: controller.to_string(),
                method: method.to_string(),
            }),
            _ => Err(Error::InvalidHandlerReference(reference.to_string())),
        }
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.method)
    }
}

/// A declared action parameter: either a path parameter bound from the
/// matched route, or a service resolved by name from the registry.
///
/// Parameter lists are declared once at registration time; no signature
/// inspection happens during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSpec {
    Path(String),
    Service(String),
}

/// A resolved argument handed to an action, in declared order.
#[derive(Clone)]
pub enum Arg {
    Value(String),
    Service(crate::ServiceInstance),
    Unbound,
}

impl Arg {
    /// The extracted path-parameter value, if this argument is one
    pub fn value(&self) -> Option<&str> {
        match self {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Downcast a resolved service argument to a concrete type
    pub fn service<T: std::any::Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Arg::Service(instance) => instance.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, Arg::Unbound)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Service(_) => f.write_str("Service(..)"),
            Arg::Unbound => f.write_str("Unbound"),
        }
    }
}

/// Type alias for async action functions
pub type ActionFn = Arc<
    dyn Fn(HttpRequest, Vec<Arg>) -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
        + Send
        + Sync,
>;

/// An invocable action together with its declared parameter list.
pub struct Action {
    pub params: Vec<ParamSpec>,
    pub func: ActionFn,
}

/// Maps handler references to actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<ActionRef, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under a `Controller@method` reference.
    ///
    /// `params` declares the action's argument list in order; the dispatcher
    /// supplies one [`Arg`] per entry at call time.
    pub fn register<F, Fut>(
        &mut self,
        reference: &str,
        params: Vec<ParamSpec>,
        func: F,
    ) -> Result<&mut Self, Error>
    where
        F: Fn(HttpRequest, Vec<Arg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let reference = ActionRef::parse(reference)?;
        let func: ActionFn = Arc::new(move |req, args| Box::pin(func(req, args)));
        self.actions.insert(reference, Action { params, func });
        Ok(self)
    }

    pub fn get(&self, reference: &ActionRef) -> Option<&Action> {
        self.actions.get(reference)
    }

    pub fn has(&self, reference: &ActionRef) -> bool {
        self.actions.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
