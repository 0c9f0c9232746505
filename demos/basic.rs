//! Minimal sprig application: a home page and a posts endpoint.
//!
//! Run with:
//!   RUST_LOG=sprig=debug,info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -X POST http://localhost:3000/api/posts -d 'hello'
//!   curl -X PUT http://localhost:3000/api/posts -d 'edited'
//!   curl -X DELETE http://localhost:3000/api/posts
//!   curl -i http://localhost:3000/missing      # 404

use sprig::{Request, Response, Server, StatusCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), sprig::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut server = Server::new(3000);
    server
        .get("/", home)?
        .post("/api/posts", create_post)?
        .put("/api/posts", update_post)?
        .delete("/api/posts", delete_post)?;

    server.serve().await
}

// GET /
async fn home(_req: Request, mut res: Response) {
    res.status(StatusCode::OK).send("Home page");
}

// POST /api/posts echoes the posted body back
async fn create_post(req: Request, mut res: Response) {
    match req.text() {
        Some(post) if !post.is_empty() => res.status(StatusCode::OK).send(post.into_owned()),
        _ => res.status(StatusCode::BAD_REQUEST).send("empty post"),
    };
}

// PUT /api/posts
async fn update_post(req: Request, mut res: Response) {
    let len = req.body().map_or(0, <[u8]>::len);
    res.status(StatusCode::OK).send(format!("updated ({len} bytes)"));
}

// DELETE /api/posts
async fn delete_post(_req: Request, mut res: Response) {
    res.status(StatusCode::NO_CONTENT).send("");
}
