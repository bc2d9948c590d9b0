use http::Method;

use crate::domain::auth::models::SecurityContext;
use crate::domain::user::models::Role;

/// Access level required by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a token.
    Public,
    /// Any active principal.
    Authenticated,
    /// Active principal whose role is in the set.
    RoleIn(Vec<Role>),
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No principal bound to the request (maps to 401).
    Unauthenticated,
    /// Principal present but not allowed (maps to 403).
    Forbidden,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}`: exactly one non-empty segment.
    Param,
    /// `**`: any remaining segments, including none. Only valid last.
    Rest,
}

/// URL path pattern such as `/api/news/{id}/comments` or `/api/noticias/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| {
                if segment == "**" {
                    Segment::Rest
                } else if segment.starts_with('{') && segment.ends_with('}') {
                    Segment::Param
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_path(path);

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.next() != Some(literal.as_str()) {
                        return false;
                    }
                }
            }
        }

        parts.next().is_none()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// A single entry of the route table. `method: None` matches every method.
#[derive(Debug, Clone)]
pub struct RouteRule {
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl RouteRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

/// Ordered route table deciding who may reach which endpoint.
///
/// Built once before the server starts and shared read-only. Rules are checked in
/// insertion order and the first match decides; unmatched requests fall back to
/// [`Access::Authenticated`].
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// Access level governing `method path`.
    pub fn access_for(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(&self.fallback, |rule| &rule.access)
    }

    /// Decide whether the request may proceed to its handler.
    pub fn evaluate(&self, method: &Method, path: &str, context: &SecurityContext) -> Decision {
        let roles = match self.access_for(method, path) {
            Access::Public => return Decision::Allow,
            Access::Authenticated => None,
            Access::RoleIn(roles) => Some(roles),
        };

        let Some(principal) = context.principal() else {
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        match roles {
            Some(roles) if !principal.has_role_in(roles) => Decision::Deny(DenyReason::Forbidden),
            _ => Decision::Allow,
        }
    }

    /// Route table of the news backend.
    pub fn news_defaults() -> Self {
        use Role::Admin;
        use Role::Journalist;

        RoutePolicy::builder()
            // Authentication
            .any("/api/auth/**", Access::Public)
            // Articles
            .route(Method::GET, "/api/noticias/manage", Access::RoleIn(vec![Admin, Journalist]))
            .route(Method::GET, "/api/noticias/**", Access::Public)
            .route(Method::POST, "/api/noticias", Access::RoleIn(vec![Admin, Journalist]))
            .route(Method::PUT, "/api/noticias/{id}", Access::RoleIn(vec![Admin, Journalist]))
            .route(Method::DELETE, "/api/noticias/{id}", Access::RoleIn(vec![Admin, Journalist]))
            // Engagement
            .route(Method::POST, "/api/news/{news_id}/view", Access::Public)
            .route(Method::POST, "/api/news/{news_id}/comments", Access::Authenticated)
            .route(
                Method::DELETE,
                "/api/news/{news_id}/comments/{comment_id}",
                Access::Authenticated,
            )
            .route(Method::POST, "/api/news/{news_id}/like", Access::Authenticated)
            .route(Method::GET, "/api/news/**", Access::Public)
            // Dashboard
            .route(Method::GET, "/api/dashboard/admin-stats", Access::RoleIn(vec![Admin]))
            .route(
                Method::GET,
                "/api/dashboard/news/{news_id}",
                Access::RoleIn(vec![Admin, Journalist]),
            )
            // Users
            .route(Method::GET, "/api/users/perfil/{username}", Access::Public)
            .route(Method::GET, "/api/users/me", Access::Authenticated)
            .route(Method::PUT, "/api/users/me", Access::Authenticated)
            .any("/api/users/**", Access::RoleIn(vec![Admin]))
            .build()
    }
}

#[derive(Debug)]
pub struct RoutePolicyBuilder {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl Default for RoutePolicyBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Access::Authenticated,
        }
    }
}

impl RoutePolicyBuilder {
    /// Add a rule for a single method.
    pub fn route(mut self, method: Method, pattern: &str, access: Access) -> Self {
        self.rules.push(RouteRule {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    /// Add a rule for every method.
    pub fn any(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(RouteRule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    /// Access applied when no rule matches.
    pub fn fallback(mut self, access: Access) -> Self {
        self.fallback = access;
        self
    }

    pub fn build(self) -> RoutePolicy {
        RoutePolicy {
            rules: self.rules,
            fallback: self.fallback,
        }
    }
}
