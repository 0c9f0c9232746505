//! # sprig
//!
//! A tiny HTTP/1.1 server core. You register `(method, path, handler)`
//! triples, call `listen`, and every request is matched against them in
//! registration order.
//!
//! ## The contract
//!
//! - **Routing** is exact equality on method and path, ignoring case. No
//!   wildcards, no parameters, no query parsing. The first registration wins.
//! - **GET and DELETE** handlers run immediately with no body.
//! - **POST and PUT** handlers run once the whole body is buffered, subject to
//!   `max_body_bytes` (413) and an idle `read_timeout` (408).
//! - **Handlers run exactly once** and answer through a [`Response`] that can
//!   be sent only once. Unmatched requests get `404`, never a hung socket.
//! - **Registration closes** when the server starts listening.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sprig::{Request, Response, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sprig::Error> {
//!     let mut server = Server::new(3000);
//!     server
//!         .get("/", home)?
//!         .post("/api/posts", create_post)?;
//!
//!     server.serve().await
//! }
//!
//! async fn home(_req: Request, mut res: Response) {
//!     res.status(StatusCode::OK).send("Home page");
//! }
//!
//! async fn create_post(req: Request, mut res: Response) {
//!     match req.text() {
//!         Some(post) if !post.is_empty() => res.status(StatusCode::CREATED).send(post.into_owned()),
//!         _ => res.status(StatusCode::BAD_REQUEST).send("empty post"),
//!     };
//! }
//! ```

mod body;
mod config;
mod dispatch;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub use config::Config;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use http::StatusCode;
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use server::{Listening, Server};
