//! Per-request dispatch: match, buffer the body if needed, call the handler.
//!
//! Every request ends in exactly one of:
//!
//! | outcome                         | reply                          |
//! |---------------------------------|--------------------------------|
//! | no route                        | `404`                          |
//! | body over `max_body_bytes`      | `413`, connection closed       |
//! | body idle past `read_timeout`   | `408`, connection closed       |
//! | body stream aborted             | `Err`, hyper drops the socket  |
//! | handler never sent (or panicked)| `500`                          |
//! | handler sent a response         | whatever it sent               |
//!
//! The handler is invoked at most once, and only after its body is complete.

use http::StatusCode;
use http_body::Body;
use tokio::task::AbortHandle;
use tracing::{debug, error, warn};

use crate::config::Limits;
use crate::error::{BoxError, Error};
use crate::request::Request;
use crate::response::{Reply, Response, bare};
use crate::router::Router;

pub(crate) async fn dispatch<B>(
    router: &Router,
    limits: Limits,
    req: http::Request<B>,
) -> Result<Reply, Error>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    let Some(route) = router.find(parts.method.as_str(), path) else {
        debug!(method = %parts.method, path, status = 404, "no route matched");
        return Ok(bare(StatusCode::NOT_FOUND, false));
    };

    let body = if route.method.carries_body() {
        match crate::body::accumulate(body, limits).await {
            Ok(bytes) => Some(bytes),
            Err(Error::BodyTooLarge { limit }) => {
                warn!(method = %route.method, path, limit, "request body too large");
                return Ok(bare(StatusCode::PAYLOAD_TOO_LARGE, true));
            }
            Err(Error::BodyTimeout) => {
                warn!(method = %route.method, path, "request body stalled");
                return Ok(bare(StatusCode::REQUEST_TIMEOUT, true));
            }
            Err(e) => {
                debug!(method = %route.method, path, "dropping request: {e}");
                return Err(e);
            }
        }
    } else {
        None
    };

    // The handler runs as its own task so that `send` releases the reply at
    // once, even if the handler keeps working afterwards. Only the channel
    // is awaited here: it resolves on `send`, or errors once every copy of
    // the wrapper is gone (handler returned or panicked without sending).
    let (response, outcome) = Response::channel();
    let task = tokio::spawn(route.handler.call(Request::new(route.method, path.to_owned(), body), response));
    let guard = AbortUnanswered(Some(task.abort_handle()));

    let reply = outcome.await;
    guard.disarm();

    let reply = match reply {
        Ok(reply) => reply,
        Err(_) => {
            error!(method = %route.method, path, "handler finished without sending a response");
            bare(StatusCode::INTERNAL_SERVER_ERROR, false)
        }
    };

    debug!(method = %route.method, path, status = reply.status().as_u16(), "dispatched");
    Ok(reply)
}

/// Aborts the handler task if dispatch is dropped before a reply arrived,
/// i.e. the request deadline fired or the connection went away.
///
/// Once a reply is in hand the guard is disarmed and the handler may finish
/// whatever it does after `send` on its own.
struct AbortUnanswered(Option<AbortHandle>);

impl AbortUnanswered {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for AbortUnanswered {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}
