//! Route-level access policy.
//!
//! Routes matching a public pattern are always let through. Every other route
//! requires an authenticated [`SecurityContext`], optionally narrowed further
//! by role rules.
//!
//! # Pattern syntax
//!
//! Patterns are absolute paths compared segment by segment:
//!
//! | Pattern | Matches | Does not match |
//! |---------|---------|----------------|
//! | `/health` | `/health`, `/health/live` | `/healthz` |
//! | `/api/*/status` | `/api/v1/status` | `/api/v1/x/status` |
//! | `/api/v1/auth/**` | `/api/v1/auth`, `/api/v1/auth/login` | `/api/v1/authx` |
//!
//! A pattern without wildcards is a prefix; a pattern with wildcards must
//! match the whole path.
//!
//! Routes are matched as received. A route containing a `.` or `..` segment,
//! plain or percent-encoded, never matches as public and is refused outright,
//! since a downstream resolver could land it outside the pattern it matched.

use crate::auth::context::SecurityContext;
use crate::types::{AppError, AuthorizationError, Result, Role};
use crate::utils::toml_config::AuthConfig;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard(glob::Pattern),
    AnyDepth,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    prefix: bool,
}

impl PathPattern {
    /// Compiles an absolute pattern, rejecting malformed globs.
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('/') {
            return Err(AppError::Config(format!(
                "Path pattern '{}' must start with '/'",
                raw
            )));
        }

        let segments = split_path(raw)
            .into_iter()
            .map(|segment| parse_segment(raw, segment))
            .collect::<Result<Vec<_>>>()?;
        let prefix = segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)));

        Ok(Self {
            raw: raw.to_string(),
            segments,
            prefix,
        })
    }

    /// Whether `path` falls under this pattern. Empty segments are ignored.
    pub fn matches(&self, path: &str) -> bool {
        let path = split_path(path);

        if self.prefix {
            return path.len() >= self.segments.len()
                && self
                    .segments
                    .iter()
                    .zip(&path)
                    .all(|(segment, part)| matches!(segment, Segment::Literal(lit) if lit.as_str() == *part));
        }

        match_segments(&self.segments, &path)
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True if any segment of `route` is `.` or `..` once `%2e`, `%2f` and
/// backslash escapes are decoded.
fn has_dot_segment(route: &str) -> bool {
    let decoded = route
        .to_ascii_lowercase()
        .replace("%2e", ".")
        .replace("%2f", "/")
        .replace("%5c", "/")
        .replace('\\', "/");

    decoded.split('/').any(|segment| segment == "." || segment == "..")
}

fn parse_segment(raw: &str, segment: &str) -> Result<Segment> {
    if segment == "**" {
        return Ok(Segment::AnyDepth);
    }
    if segment.contains("**") {
        return Err(AppError::Config(format!(
            "Path pattern '{}': '**' must be a whole segment",
            raw
        )));
    }
    if !segment.contains(['*', '?', '[']) {
        return Ok(Segment::Literal(segment.to_string()));
    }

    glob::Pattern::new(segment)
        .map(Segment::Wildcard)
        .map_err(|e| AppError::Config(format!("Path pattern '{}': {}", raw, e)))
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((part, tail)) => {
                let head_matches = match segment {
                    Segment::Literal(lit) => lit.as_str() == *part,
                    Segment::Wildcard(glob) => glob.matches(part),
                    Segment::AnyDepth => true,
                };
                head_matches && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

/// Restricts a set of protected routes to principals holding one of `roles`.
#[derive(Debug, Clone)]
pub struct RoleRule {
    /// Routes the rule applies to
    pub pattern: PathPattern,
    /// Roles allowed through
    pub roles: BTreeSet<Role>,
}

/// Decides whether a request may reach its handler.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    public: Vec<PathPattern>,
    role_rules: Vec<RoleRule>,
}

impl AccessPolicy {
    /// Builds a policy from an ordered list of public path patterns.
    pub fn new<S: AsRef<str>>(public_paths: &[S]) -> Result<Self> {
        let public = public_paths
            .iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            public,
            role_rules: Vec::new(),
        })
    }

    /// Builds a policy from the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let mut policy = Self::new(&config.public_paths)?;
        for rule in &config.role_rules {
            policy = policy.with_role_rule(&rule.pattern, rule.roles.iter().copied())?;
        }
        Ok(policy)
    }

    /// Appends a role rule. Rules are evaluated in insertion order and the
    /// first matching rule decides.
    pub fn with_role_rule(
        mut self,
        pattern: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(AppError::Config(format!(
                "Role rule for '{}' names no roles",
                pattern
            )));
        }

        self.role_rules.push(RoleRule {
            pattern: PathPattern::parse(pattern)?,
            roles,
        });
        Ok(self)
    }

    /// Public patterns, in configuration order.
    pub fn public_patterns(&self) -> &[PathPattern] {
        &self.public
    }

    /// Role rules, in evaluation order.
    pub fn role_rules(&self) -> &[RoleRule] {
        &self.role_rules
    }

    /// Whether `route` may be reached anonymously.
    pub fn is_public(&self, route: &str) -> bool {
        !has_dot_segment(route) && self.public.iter().any(|p| p.matches(route))
    }

    /// Evaluates a route against the request's security context.
    ///
    /// Anything not matched as public requires a principal. Routes with dot
    /// segments are refused for everyone.
    pub fn is_permitted(
        &self,
        route: &str,
        context: &SecurityContext,
    ) -> std::result::Result<(), AuthorizationError> {
        if has_dot_segment(route) {
            return Err(AuthorizationError::Forbidden);
        }
        if self.is_public(route) {
            return Ok(());
        }

        let principal = context.get().ok_or(AuthorizationError::Forbidden)?;

        match self.role_rules.iter().find(|rule| rule.pattern.matches(route)) {
            Some(rule) if !rule.roles.contains(&principal.role) => {
                Err(AuthorizationError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

/// Axum middleware enforcing an [`AccessPolicy`].
///
/// Must run after [`authentication_filter`](crate::auth::middleware::authentication_filter);
/// a request without a [`SecurityContext`] is treated as anonymous.
pub async fn access_policy(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let decision = {
        let anonymous = SecurityContext::default();
        let context = req
            .extensions()
            .get::<SecurityContext>()
            .unwrap_or(&anonymous);
        policy.is_permitted(req.uri().path(), context)
    };

    if let Err(e) = decision {
        debug!(path = %req.uri().path(), "Access denied");
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
