//! Route table: names, path patterns, titles and access classes.
//!
//! DESIGN
//! ======
//! Routes are matched in declaration order, so the catch-all must come last.
//! Access classification lives on the route itself; the guard never keeps
//! its own list of protected names, which is how the two can drift apart.

use super::NavigationError;
use super::location::Location;

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Only with a signed-in session; otherwise redirected to login.
    RequiresAuth,
    /// Only without a session; signed-in users are sent home.
    LoginOnly,
}

/// When the route's view is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLoading {
    /// Bundled with the shell so first paint is instant.
    Eager,
    /// Loaded on first visit.
    Lazy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePattern {
    /// Matches exactly this path (a trailing slash is tolerated).
    Exact(&'static str),
    /// Matches any path.
    CatchAll,
}

impl RoutePattern {
    /// Paths are percent-decoded and compared case-insensitively, so
    /// `/Journal` and `/jour%6Eal` both match `/journal`.
    fn matches(self, path: &str) -> bool {
        match self {
            Self::CatchAll => true,
            Self::Exact(pattern) => {
                let decoded = urlencoding::decode(path).unwrap_or(std::borrow::Cow::Borrowed(path));
                let decoded: &str = &decoded;
                let trimmed = if decoded.len() > 1 { decoded.trim_end_matches('/') } else { decoded };
                trimmed.eq_ignore_ascii_case(pattern) || (trimmed.is_empty() && pattern == "/")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub pattern: RoutePattern,
    pub title: Option<&'static str>,
    pub access: RouteAccess,
    pub loading: ViewLoading,
}

impl RouteDef {
    const fn lazy(name: &'static str, path: &'static str, title: &'static str, access: RouteAccess) -> Self {
        Self { name, pattern: RoutePattern::Exact(path), title: Some(title), access, loading: ViewLoading::Lazy }
    }
}

/// Where a navigation should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLocation {
    /// A raw in-app location such as `/journal?tab=2`.
    Path(String),
    Named { name: String, query: Vec<(String, String)> },
}

impl RouteLocation {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into(), query: Vec::new() }
    }

    /// Append a query pair. A `Path` location is re-encoded with the pair.
    #[must_use]
    pub fn with_query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Self::Named { name, mut query } => {
                query.push((key.into(), value.into()));
                Self::Named { name, query }
            }
            Self::Path(raw) => Self::Path(Location::parse(&raw).with_query(key, value).full_path()),
        }
    }
}

impl From<&str> for RouteLocation {
    fn from(raw: &str) -> Self {
        Self::Path(raw.to_owned())
    }
}

impl From<String> for RouteLocation {
    fn from(raw: String) -> Self {
        Self::Path(raw)
    }
}

/// A location matched against the table. This is what hooks see for the
/// navigation target and what the router records as the current route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: &'static str,
    pub location: Location,
    pub title: Option<&'static str>,
    pub access: RouteAccess,
    pub loading: ViewLoading,
}

impl ResolvedRoute {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.location.path
    }

    #[must_use]
    pub fn full_path(&self) -> String {
        self.location.full_path()
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.location.query_value(key)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate route names.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::DuplicateRoute`] on a repeated name.
    pub fn new(routes: Vec<RouteDef>) -> Result<Self, NavigationError> {
        for (i, route) in routes.iter().enumerate() {
            if routes[..i].iter().any(|r| r.name == route.name) {
                return Err(NavigationError::DuplicateRoute(route.name.to_owned()));
            }
        }
        Ok(Self { routes })
    }

    /// The Unify app routes.
    #[must_use]
    pub fn unify() -> Self {
        use RouteAccess::{LoginOnly, Public, RequiresAuth};

        Self {
            routes: vec![
                RouteDef {
                    name: "home",
                    pattern: RoutePattern::Exact("/"),
                    title: Some("Home"),
                    access: Public,
                    loading: ViewLoading::Eager,
                },
                RouteDef::lazy("journal", "/journal", "Journal", RequiresAuth),
                RouteDef::lazy("wellbeing", "/wellbeing", "Wellbeing", RequiresAuth),
                RouteDef::lazy("study", "/study", "Study", RequiresAuth),
                RouteDef::lazy("nutrition", "/nutrition", "Nutrition", RequiresAuth),
                RouteDef::lazy("calendar", "/calendar", "Calendar", RequiresAuth),
                // Old path, kept reachable for existing links.
                RouteDef::lazy("recommendations", "/recommendations", "Recommendations", RequiresAuth),
                RouteDef::lazy("login", "/login", "Log in", LoginOnly),
                RouteDef::lazy("register", "/register", "Register", Public),
                RouteDef::lazy("settings", "/settings", "Settings", RequiresAuth),
                RouteDef {
                    name: "not-found",
                    pattern: RoutePattern::CatchAll,
                    title: Some("Not Found"),
                    access: Public,
                    loading: ViewLoading::Lazy,
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDef> {
        self.routes.iter()
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// First route whose pattern matches `path`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.pattern.matches(path))
    }

    /// Resolve a navigation target to a concrete route.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown route names, named catch-all routes and
    /// paths no route matches.
    pub fn resolve(&self, target: &RouteLocation) -> Result<ResolvedRoute, NavigationError> {
        let (route, location) = match target {
            RouteLocation::Path(raw) => {
                let location = Location::parse(raw);
                let route = self
                    .match_path(&location.path)
                    .ok_or_else(|| NavigationError::NoMatch(location.path.clone()))?;
                (route, location)
            }
            RouteLocation::Named { name, query } => {
                let route = self
                    .by_name(name)
                    .ok_or_else(|| NavigationError::UnknownRoute(name.clone()))?;
                let RoutePattern::Exact(path) = route.pattern else {
                    return Err(NavigationError::NoStaticPath(name.clone()));
                };
                let location = Location { path: path.to_owned(), query: query.clone(), hash: String::new() };
                (route, location)
            }
        };

        Ok(ResolvedRoute { name: route.name, location, title: route.title, access: route.access, loading: route.loading })
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
