//! Outgoing response wrapper handed to handlers.
//!
//! A [`Response`] owns the sending half of a one-shot channel whose receiver
//! sits in the dispatcher. `send` moves the finished reply through that
//! channel, which is why it can only ever happen once.

use std::fmt;

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::Error;

/// The concrete response type written back to hyper.
pub(crate) type Reply = http::Response<Full<Bytes>>;

/// Fluent handle for answering one request.
///
/// ```rust
/// # use sprig::{Request, Response, StatusCode};
/// async fn home(_req: Request, mut res: Response) {
///     res.status(StatusCode::OK).send("Home page");
/// }
/// ```
pub struct Response {
    status: StatusCode,
    outcome: Option<oneshot::Sender<Reply>>,
}

impl Response {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Self { status: StatusCode::OK, outcome: Some(tx) }, rx)
    }

    /// Sets the status code. The last call before [`send`](Self::send) wins.
    pub fn status(&mut self, code: StatusCode) -> &mut Self {
        if self.is_sent() {
            warn!(status = %code, "status() called after the response was sent, ignoring");
        } else {
            self.status = code;
        }
        self
    }

    /// Writes `body` and terminates the response.
    ///
    /// Calling it again is a no-op that logs a warning; the reply already on
    /// its way to the client is never touched. Use [`try_send`](Self::try_send)
    /// to get an error instead.
    pub fn send(&mut self, body: impl Into<Bytes>) -> &mut Self {
        if let Err(e) = self.try_send(body) {
            warn!("send() ignored: {e}");
        }
        self
    }

    /// Like [`send`](Self::send), but reports a second call as
    /// [`Error::AlreadySent`].
    pub fn try_send(&mut self, body: impl Into<Bytes>) -> Result<(), Error> {
        let tx = self.outcome.take().ok_or(Error::AlreadySent)?;
        if tx.send(text(self.status, body.into())).is_err() {
            // The dispatcher gave up on this request (deadline or shutdown).
            debug!(status = %self.status, "response sent after the request was abandoned");
        }
        Ok(())
    }

    pub fn is_sent(&self) -> bool {
        self.outcome.is_none()
    }

    /// The status the response carries, or will carry once sent.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("sent", &self.is_sent())
            .finish()
    }
}

fn text(status: StatusCode, body: Bytes) -> Reply {
    let mut reply = http::Response::new(Full::new(body));
    *reply.status_mut() = status;
    reply
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    reply
}

/// An empty reply produced by the framework itself (404, 413, …).
///
/// `close` asks hyper to drop the connection afterwards, used when the
/// request body was left unread.
pub(crate) fn bare(status: StatusCode, close: bool) -> Reply {
    let mut reply = http::Response::new(Full::new(Bytes::new()));
    *reply.status_mut() = status;
    if close {
        reply.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
    }
    reply
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(reply: Reply) -> Bytes {
        reply.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn defaults_to_200() {
        let (mut res, rx) = Response::channel();
        res.send("ok");

        let reply = rx.await.unwrap();
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body_of(reply).await, "ok");
    }

    #[tokio::test]
    async fn last_status_wins() {
        let (mut res, rx) = Response::channel();
        res.status(StatusCode::CREATED).status(StatusCode::ACCEPTED).send("x");

        assert_eq!(rx.await.unwrap().status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn second_send_does_not_alter_the_reply() {
        let (mut res, rx) = Response::channel();
        res.status(StatusCode::OK).send("first");
        assert!(res.is_sent());

        res.status(StatusCode::IM_A_TEAPOT).send("second");
        assert!(matches!(res.try_send("third"), Err(Error::AlreadySent)));
        assert_eq!(res.status_code(), StatusCode::OK);

        let reply = rx.await.unwrap();
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(body_of(reply).await, "first");
    }

    #[test]
    fn send_after_receiver_dropped_still_terminates() {
        let (mut res, rx) = Response::channel();
        drop(rx);
        assert!(res.try_send("late").is_ok());
        assert!(res.is_sent());
    }

    #[test]
    fn bare_reply_can_close_the_connection() {
        let reply = bare(StatusCode::PAYLOAD_TOO_LARGE, true);
        assert_eq!(reply.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(reply.headers()[CONNECTION], "close");
        assert!(bare(StatusCode::NOT_FOUND, false).headers().get(CONNECTION).is_none());
    }
}
