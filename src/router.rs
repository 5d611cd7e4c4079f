//! Radix-tree routing table.
//!
//! One tree per HTTP method, O(path-length) lookup. Filled once by
//! [`ApiBuilder::build`](crate::ApiBuilder::build) with resolved handlers and
//! read concurrently afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::error::{Error, Result};
use crate::handler::BoxedHandler;

#[derive(Default)]
pub(crate) struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method + path pair.
    ///
    /// Paths use the specification's `{name}` template syntax.
    pub(crate) fn insert(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<()> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .map_err(|e| Error::Route { path: path.to_owned(), message: e.to_string() })
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::Request;

    async fn noop(_req: Request) -> &'static str { "" }

    #[test]
    fn lookup_matches_method_and_extracts_params() {
        let mut router = Router::new();
        router.insert(Method::GET, "/pets/{id}", noop.into_boxed_handler()).unwrap();

        let (_, params) = router.lookup(&Method::GET, "/pets/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(router.lookup(&Method::DELETE, "/pets/42").is_none());
        assert!(router.lookup(&Method::GET, "/owners/42").is_none());
    }

    #[test]
    fn conflicting_routes_are_errors() {
        let mut router = Router::new();
        router.insert(Method::GET, "/pets/{id}", noop.into_boxed_handler()).unwrap();
        let err = router.insert(Method::GET, "/pets/{id}", noop.into_boxed_handler()).unwrap_err();
        assert!(matches!(err, Error::Route { ref path, .. } if path == "/pets/{id}"));
    }
}
