//! Incoming request wrapper handed to handlers.

use std::borrow::Cow;

use bytes::Bytes;

use crate::method::Method;

/// An incoming HTTP request, reduced to what routing cares about.
///
/// Built fresh for every request and owned by the handler invocation.
/// `body` is only populated for methods that carry one (POST, PUT), and only
/// once the whole payload has arrived.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    body: Option<Bytes>,
}

impl Request {
    pub(crate) fn new(method: Method, path: String, body: Option<Bytes>) -> Self {
        Self { method, path, body }
    }

    pub fn method(&self) -> Method { self.method }

    /// The request path exactly as the client sent it, without the query.
    pub fn path(&self) -> &str { &self.path }

    /// The fully buffered payload, or `None` for GET and DELETE.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The payload decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodyless_request_has_no_text() {
        let req = Request::new(Method::Get, "/".into(), None);
        assert_eq!(req.body(), None);
        assert!(req.text().is_none());
    }

    #[test]
    fn text_decodes_lossily() {
        let req = Request::new(Method::Post, "/p".into(), Some(Bytes::from_static(b"hi\xff")));
        assert_eq!(req.text().as_deref(), Some("hi\u{fffd}"));
        assert_eq!(req.body(), Some(&b"hi\xff"[..]));
    }
}
