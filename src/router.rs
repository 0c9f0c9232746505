//! Ordered route registry and exact-match lookup.
//!
//! Routes are kept in registration order and scanned linearly. The first
//! route whose method and lowercased path equal the request's wins, so a
//! duplicate registration never shadows an earlier one. The table is built
//! once before the server listens and only read afterwards, so lookups need
//! no locking.

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// A registered `(method, path, handler)` triple.
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: BoxedHandler,
}

/// Append-only route table.
#[derive(Default)]
pub(crate) struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub(crate) fn push(&mut self, method: Method, path: &str, handler: impl Handler) {
        self.routes.push(Route {
            method,
            path: path.to_lowercase(),
            handler: handler.into_boxed_handler(),
        });
    }

    /// Finds the earliest route registered for `method` and `path`, both
    /// compared case-insensitively. Unknown methods and empty paths never match.
    pub(crate) fn find(&self, method: &str, path: &str) -> Option<&Route> {
        let method = Method::from_wire(method)?;
        if path.is_empty() {
            return None;
        }
        let path = path.to_lowercase();
        self.routes.iter().find(|r| r.method == method && r.path == path)
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Request, Response};

    async fn noop(_req: Request, _res: Response) {}

    fn router() -> Router {
        let mut router = Router::default();
        router.push(Method::Get, "/", noop);
        router.push(Method::Post, "/api/posts", noop);
        router.push(Method::Get, "/API/Mixed", noop);
        router
    }

    #[test]
    fn matches_method_and_path_exactly() {
        let router = router();
        assert_eq!(router.find("GET", "/").map(|r| r.method), Some(Method::Get));
        assert_eq!(router.find("POST", "/api/posts").map(|r| r.path.as_str()), Some("/api/posts"));
        assert!(router.find("GET", "/api/posts").is_none());
        assert!(router.find("POST", "/api/posts/").is_none());
        assert!(router.find("POST", "/api").is_none());
    }

    #[test]
    fn lookup_ignores_case_on_both_sides() {
        let router = router();
        assert!(router.find("get", "/api/mixed").is_some());
        assert!(router.find("GET", "/Api/MIXED").is_some());
        assert!(router.find("Post", "/API/POSTS").is_some());
    }

    #[test]
    fn unknown_method_or_empty_path_never_matches() {
        let router = router();
        assert!(router.find("PATCH", "/").is_none());
        assert!(router.find("", "/").is_none());
        assert!(router.find("GET", "").is_none());
    }

    #[test]
    fn earliest_registration_wins() {
        let first: BoxedHandler = (|_: Request, _: Response| async {}).into_boxed_handler();
        let mut router = Router::default();
        router.routes.push(Route { method: Method::Get, path: "/a".into(), handler: Arc::clone(&first) });
        router.push(Method::Get, "/a", noop);

        assert_eq!(router.len(), 2);
        let found = router.find("GET", "/a").unwrap();
        assert!(Arc::ptr_eq(&found.handler, &first));
    }
}
