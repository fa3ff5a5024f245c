//! Fragment-based view router.
//!
//! Routes are `/`-separated patterns. A `:name` segment captures the matching
//! path segment (percent-decoded) as a parameter, a trailing `*` captures the
//! rest of the path, and everything else must match literally.
//!
//! Patterns are tried in registration order and the first match wins, so
//! specific patterns must be registered before the ones that would shadow
//! them. A path that matches nothing is redirected to `/`.

use std::collections::BTreeMap;

use crate::location::Location;

/// Parameters captured from a matched path.
pub type Params = BTreeMap<String, String>;

/// Name under which a trailing `*` stores the unmatched remainder.
pub const WILDCARD_PARAM: &str = "*";

/// A handler chosen by [`Router::handle_route_change`], ready to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<H> {
    pub pattern: String,
    pub handler: H,
    pub params: Params,
}

struct Route<H> {
    pattern: String,
    segments: Vec<String>,
    handler: H,
}

/// Maps the location fragment to registered handlers.
pub struct Router<H> {
    routes: Vec<Route<H>>,
    location: Box<dyn Location>,
    current_route: Option<String>,
    params: Params,
}

impl<H: Clone> Router<H> {
    pub fn new(location: impl Location + 'static) -> Self {
        Self {
            routes: Vec::new(),
            location: Box::new(location),
            current_route: None,
            params: Params::new(),
        }
    }

    /// Register a pattern. Order of registration is match order.
    pub fn on(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.routes.push(Route {
            pattern: pattern.to_string(),
            segments: split_path(pattern),
            handler,
        });
        self
    }

    /// Point the location at `path`. Dispatch happens when the location
    /// reports the change, not here.
    pub fn navigate(&mut self, path: &str) {
        self.location.set_fragment(path);
    }

    /// Ask the location for the previous entry in its history.
    pub fn back(&mut self) {
        self.location.back();
    }

    /// Consume a pending location-change notification, if any.
    pub fn take_change(&mut self) -> bool {
        self.location.take_change()
    }

    /// Current path, `/` when the fragment is empty.
    pub fn current_path(&self) -> String {
        let fragment = self.location.fragment();
        let path = fragment.strip_prefix('#').unwrap_or(&fragment);
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }

    /// Resolve the current location to a handler.
    ///
    /// Updates [`current_route`](Self::current_route) and
    /// [`params`](Self::params) on a match. When nothing matches, navigates
    /// to `/` and returns `None`.
    pub fn handle_route_change(&mut self) -> Option<RouteMatch<H>> {
        let path = self.current_path();

        let found = self.routes.iter().find_map(|route| {
            match_segments(&route.segments, &path).map(|params| RouteMatch {
                pattern: route.pattern.clone(),
                handler: route.handler.clone(),
                params,
            })
        });

        match found {
            Some(matched) => {
                tracing::debug!(path = %path, pattern = %matched.pattern, "Route matched");
                self.current_route = Some(matched.pattern.clone());
                self.params = matched.params.clone();
                Some(matched)
            }
            None => {
                tracing::debug!(path = %path, "No route matched, redirecting to /");
                self.navigate("/");
                None
            }
        }
    }

    pub fn current_route(&self) -> Option<&str> {
        self.current_route.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Match a single pattern against a path, returning its parameters.
pub fn match_route(pattern: &str, path: &str) -> Option<Params> {
    match_segments(&split_path(pattern), path)
}

fn match_segments(pattern: &[String], path: &str) -> Option<Params> {
    let parts = split_path(path);
    let has_wildcard = pattern.last().is_some_and(|s| s == WILDCARD_PARAM);
    let fixed = if has_wildcard {
        &pattern[..pattern.len() - 1]
    } else {
        pattern
    };

    if has_wildcard {
        if parts.len() < fixed.len() {
            return None;
        }
    } else if parts.len() != fixed.len() {
        return None;
    }

    let mut params = Params::new();
    for (expected, actual) in fixed.iter().zip(&parts) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), decode_segment(actual));
        } else if expected != actual {
            return None;
        }
    }

    if has_wildcard {
        let rest: Vec<String> = parts[fixed.len()..]
            .iter()
            .map(|p| decode_segment(p))
            .collect();
        params.insert(WILDCARD_PARAM.to_string(), rest.join("/"));
    }

    Some(params)
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

/// Build `/worry/<id>` with the id percent-encoded.
pub fn worry_path(id: &str) -> String {
    format!("/worry/{}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::MemoryLocation;
    use rstest::rstest;

    #[rstest]
    #[case("/", "/", true)]
    #[case("/", "", true)]
    #[case("/worry/:id", "/worry/abc", true)]
    #[case("/worry/:id", "/worry", false)]
    #[case("/worry/:id", "/worry/abc/extra", false)]
    #[case("/worry/:id", "/other/abc", false)]
    #[case("/about", "/about/", true)]
    #[case("/files/*", "/files", true)]
    #[case("/files/*", "/files/a/b", true)]
    #[case("/files/*", "/nope/a", false)]
    fn pattern_matching(#[case] pattern: &str, #[case] path: &str, #[case] matches: bool) {
        assert_eq!(match_route(pattern, path).is_some(), matches);
    }

    #[test]
    fn params_are_percent_decoded() {
        let params = match_route("/worry/:id", "/worry/a%20b%2Fc").unwrap();
        assert_eq!(params["id"], "a b/c");
    }

    #[test]
    fn undecodable_segment_is_kept_raw() {
        let params = match_route("/worry/:id", "/worry/%FF").unwrap();
        assert_eq!(params["id"], "%FF");
    }

    #[test]
    fn wildcard_captures_rest() {
        let params = match_route("/files/*", "/files/a/b%20c").unwrap();
        assert_eq!(params[WILDCARD_PARAM], "a/b c");
        let params = match_route("/files/*", "/files").unwrap();
        assert_eq!(params[WILDCARD_PARAM], "");
    }

    #[test]
    fn worry_path_round_trips_through_matching() {
        let path = worry_path("id with/slash");
        let params = match_route("/worry/:id", &path).unwrap();
        assert_eq!(params["id"], "id with/slash");
    }

    #[test]
    fn first_registered_match_wins() {
        let mut router = Router::new(MemoryLocation::at("/worry/new"));
        router.on("/worry/:id", "editor").on("/worry/new", "creator");
        let matched = router.handle_route_change().unwrap();
        assert_eq!(matched.handler, "editor");
        assert_eq!(matched.params["id"], "new");
        assert_eq!(router.current_route(), Some("/worry/:id"));
    }

    #[test]
    fn empty_fragment_is_root() {
        let mut router = Router::new(MemoryLocation::new());
        router.on("/", "index");
        assert_eq!(router.current_path(), "/");
        assert_eq!(router.handle_route_change().unwrap().handler, "index");
    }

    #[test]
    fn unmatched_path_redirects_home() {
        let mut router = Router::new(MemoryLocation::at("/unknown"));
        router.on("/worry/:id", "editor").on("/", "index");
        assert!(router.take_change());

        assert!(router.handle_route_change().is_none());
        assert_eq!(router.current_path(), "/");
        assert!(router.take_change());
        assert_eq!(router.handle_route_change().unwrap().handler, "index");
    }
}
