//! Route entity and path template compiler.

use crate::binding::Action;
use crate::error::{RegisterError, UrlError};
use crate::middleware::Middleware;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::ParamVec;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

enum Segment {
    Literal(String),
    Param(Arc<str>),
}

/// A compiled path template.
///
/// `/users/{id}/posts/{post}` compiles to an anchored regex with one
/// `([^/]+)` capture per `{param}` segment; a parameter therefore matches
/// exactly one non-empty segment. Matching is full-path only, never a
/// prefix.
pub struct PathPattern {
    template: Arc<str>,
    regex: Regex,
    params: Vec<Arc<str>>,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a template, validating its shape.
    ///
    /// Parameter names are `[A-Za-z_][A-Za-z0-9_]*` and must be unique
    /// within the template; braces must span a whole segment.
    pub fn compile(template: &str) -> Result<Self, RegisterError> {
        if !template.starts_with('/') {
            return Err(RegisterError::InvalidTemplate {
                template: template.to_string(),
                reason: "must begin with '/'".to_string(),
            });
        }

        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut params: Vec<Arc<str>> = Vec::new();
        let mut segments: Vec<Segment> = Vec::new();

        for segment in template.split('/') {
            if segment.is_empty() {
                continue;
            }
            if let Some(inner) = segment.strip_prefix('{') {
                let Some(name) = inner.strip_suffix('}') else {
                    return Err(RegisterError::InvalidTemplate {
                        template: template.to_string(),
                        reason: format!("unclosed '{{' in segment '{segment}'"),
                    });
                };
                if !IDENT_RE.is_match(name) {
                    return Err(RegisterError::InvalidTemplate {
                        template: template.to_string(),
                        reason: format!("invalid parameter name '{name}'"),
                    });
                }
                if params.iter().any(|p| p.as_ref() == name) {
                    return Err(RegisterError::DuplicateParam {
                        template: template.to_string(),
                        param: name.to_string(),
                    });
                }
                let name: Arc<str> = Arc::from(name);
                params.push(Arc::clone(&name));
                segments.push(Segment::Param(name));
                pattern.push_str("/([^/]+)");
            } else if segment.contains('{') || segment.contains('}') {
                return Err(RegisterError::InvalidTemplate {
                    template: template.to_string(),
                    reason: format!("braces must span a whole segment, got '{segment}'"),
                });
            } else {
                segments.push(Segment::Literal(segment.to_string()));
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        if segments.is_empty() {
            pattern.push('/');
        }
        pattern.push('$');
        let regex = Regex::new(&pattern).map_err(|err| RegisterError::InvalidTemplate {
            template: template.to_string(),
            reason: err.to_string(),
        })?;

        Ok(PathPattern {
            template: Arc::from(template),
            regex,
            params,
            segments,
        })
    }

    /// Match `path` against the template, returning captured parameters in
    /// template order. Values are still percent-encoded.
    #[must_use]
    pub fn capture(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut out = ParamVec::new();
        for (i, name) in self.params.iter().enumerate() {
            let value = caps
                .get(i + 1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            out.push((Arc::clone(name), value));
        }
        Some(out)
    }

    /// Substitute parameter values back into the template, percent-encoding
    /// each value. Fails if a `{param}` has no value in `params`.
    pub fn fill(&self, params: &[(&str, &str)]) -> Result<String, UrlError> {
        let mut out = String::with_capacity(self.template.len() + 16);
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Param(name) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| *k == name.as_ref())
                        .map(|(_, v)| *v)
                        .ok_or_else(|| UrlError::MissingParam {
                            route: self.template.to_string(),
                            param: name.to_string(),
                        })?;
                    out.push_str(&urlencoding::encode(value));
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.params
    }
}

impl std::fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathPattern")
            .field("template", &self.template)
            .field("params", &self.params)
            .finish()
    }
}

/// Fixed-window budget attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests per window; zero means unlimited.
    pub max: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimit {
    pub fn new(max: u32, window_secs: u64) -> Self {
        Self { max, window_secs }
    }
}

/// Summary of the matched route, threaded through the request.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Route name, when one was assigned at registration.
    pub name: Option<Arc<str>>,
    /// Registered method (the effective method after any override).
    pub method: Method,
    /// The path template the route was registered under.
    pub pattern: Arc<str>,
}

/// One registered endpoint: matcher, handler, and per-route behavior.
pub struct Route {
    pub(crate) method: Method,
    pub(crate) pattern: PathPattern,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) action: Action,
    pub(crate) limit: Option<RateLimit>,
}

impl Route {
    pub(crate) fn new(method: Method, pattern: PathPattern, action: Action) -> Self {
        Self {
            method,
            pattern,
            name: None,
            middleware: Vec::new(),
            action,
            limit: None,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn limit(&self) -> Option<RateLimit> {
        self.limit
    }

    #[must_use]
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub(crate) fn action(&self) -> &Action {
        &self.action
    }

    /// Identifier used in rate-limit cache keys: the route name when one is
    /// set, otherwise the path template.
    #[must_use]
    pub fn rate_key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.pattern.template)
    }

    #[must_use]
    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            name: self.name.clone(),
            method: self.method.clone(),
            pattern: Arc::clone(&self.pattern.template),
        }
    }
}
