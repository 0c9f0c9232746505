//! HTTP method as a typed enum.
//!
//! Only the four methods a route can be registered for exist here. Anything
//! else on the wire never matches a route and is answered with `404`.

use std::fmt;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get    => "GET",
            Self::Post   => "POST",
            Self::Put    => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a method token, ignoring ASCII case.
    pub fn from_wire(s: &str) -> Option<Self> {
        [Self::Get, Self::Post, Self::Put, Self::Delete]
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Whether the request body is buffered and handed to the handler.
    pub fn carries_body(self) -> bool {
        match self {
            Self::Post | Self::Put  => true,
            Self::Get | Self::Delete => false,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
