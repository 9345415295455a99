// Compiled routes: pattern matching and URI building

use crate::action::ActionRef;
use crate::{Error, HttpMethod};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex"));

/// Parameter values extracted from a matched path, in placeholder
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteMatch {
    params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.params.into_iter().collect()
    }
}

/// A single compiled route, immutable once constructed.
///
/// Matching returns a [`RouteMatch`] value rather than storing extraction
/// state on the route, so a route is safe to share across concurrent
/// dispatches.
#[derive(Debug)]
pub struct Route {
    method: HttpMethod,
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    name: Option<String>,
    action: ActionRef,
    middleware: Vec<String>,
}

impl Route {
    pub fn new(
        method: HttpMethod,
        pattern: &str,
        action: &str,
        name: Option<String>,
        middleware: Vec<String>,
    ) -> Result<Self, Error> {
        let action = ActionRef::parse(action)?;
        let (regex, param_names) = compile(pattern)?;

        Ok(Self {
            method,
            pattern: pattern.to_string(),
            regex,
            param_names,
            name,
            action,
            middleware,
        })
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn action(&self) -> &ActionRef {
        &self.action
    }

    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Check the route against a request, extracting path parameters.
    ///
    /// The method must match exactly; the path must match the whole compiled
    /// pattern (case-insensitively). Capture group `i` binds to
    /// `param_names[i]`. A failed attempt has no observable effect.
    pub fn matches(&self, method: &str, path: &str) -> Option<RouteMatch> {
        if method != self.method.as_str() {
            return None;
        }

        let captures = self.regex.captures(path)?;
        let params = self
            .param_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = captures
                    .get(i + 1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        Some(RouteMatch { params })
    }

    /// Build a concrete URI from this route's pattern.
    ///
    /// Substitution is keyed by placeholder name: every `{name}` is replaced
    /// with the value registered under `name` in `params`. A pattern without
    /// placeholders is returned unchanged.
    pub fn build_uri(&self, params: &[(&str, &str)]) -> Result<String, Error> {
        if self.param_names.is_empty() {
            return Ok(self.pattern.clone());
        }

        let mut uri = self.pattern.clone();
        for name in &self.param_names {
            let value = params
                .iter()
                .find(|(key, _)| *key == name.as_str())
                .map(|(_, value)| *value)
                .ok_or_else(|| Error::MissingUriParameter {
                    route: self.pattern.clone(),
                    parameter: name.clone(),
                })?;
            uri = uri.replace(&format!("{{{name}}}"), value);
        }

        Ok(uri)
    }
}

/// Compile a raw pattern into an anchored, case-insensitive matcher.
///
/// Every `{identifier}` placeholder becomes a `(\w+)` capture; static parts
/// are escaped verbatim. Placeholder names are recorded left to right.
fn compile(pattern: &str) -> Result<(Regex, Vec<String>), Error> {
    let mut source = String::from("(?i)^");
    let mut param_names = Vec::new();
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(pattern) {
        let whole = captures.get(0).expect("capture 0 always present");
        source.push_str(&regex::escape(&pattern[last..whole.start()]));
        source.push_str(r"(\w+)");
        param_names.push(captures[1].to_string());
        last = whole.end();
    }
    source.push_str(&regex::escape(&pattern[last..]));
    source.push('$');

    let regex = Regex::new(&source).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok((regex, param_names))
}
