//! HTTP server lifecycle: registration, listening, graceful shutdown.
//!
//! Routes are registered on a [`Server`] before it listens. [`Server::listen`]
//! binds the socket, freezes the route table, and spawns the accept loop.
//! From then on registration fails with [`Error::RegistrationClosed`].
//!
//! The accept loop stops on [`Listening::shutdown`]. It then:
//! 1. Stops accepting. The listening socket is closed.
//! 2. Tells every open connection to close once its in-flight request has
//!    been answered, and lets them finish for up to `shutdown_grace`.
//! 3. Aborts whatever is still running.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{Instrument, debug, debug_span, error, info, warn};

use crate::config::{Config, Limits};
use crate::dispatch::dispatch;
use crate::error::Error;
use crate::handler::Handler;
use crate::method::Method;
use crate::response::{Reply, bare};
use crate::router::Router;

// ── Server ───────────────────────────────────────────────────────────────────

/// The HTTP server.
///
/// ```rust,no_run
/// use sprig::{Request, Response, Server, StatusCode};
///
/// # async fn run() -> Result<(), sprig::Error> {
/// let mut server = Server::new(3000);
/// server.get("/", |_req: Request, mut res: Response| async move {
///     res.status(StatusCode::OK).send("Home page");
/// })?;
/// server.serve().await
/// # }
/// ```
pub struct Server {
    config: Config,
    router: Router,
    started: bool,
}

impl Server {
    /// A server on `port` with every other setting at its default.
    pub fn new(port: u16) -> Self {
        Self::with_config(Config { port, ..Config::default() })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config, router: Router::default(), started: false }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> Result<&mut Self, Error> {
        self.route(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> Result<&mut Self, Error> {
        self.route(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> Result<&mut Self, Error> {
        self.route(Method::Put, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> Result<&mut Self, Error> {
        self.route(Method::Delete, path, handler)
    }

    /// Appends a route. Paths are matched exactly, ignoring case; when the
    /// same method and path are registered twice the first one wins.
    pub fn route(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<&mut Self, Error> {
        if self.started {
            return Err(Error::RegistrationClosed);
        }
        self.router.push(method, path, handler);
        Ok(self)
    }

    /// Binds the configured address and starts accepting connections in the
    /// background.
    ///
    /// A bind failure (port taken, permission denied) is returned as
    /// [`Error::Bind`] and leaves the server unstarted.
    pub async fn listen(&mut self) -> Result<Listening, Error> {
        if self.started {
            return Err(Error::AlreadyListening);
        }

        let addr = self.config.addr();
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                error!(addr = %addr, cause = %source, "bind server error");
                return Err(Error::Bind { addr, source });
            }
        };
        let local_addr = listener.local_addr()?;

        self.started = true;
        let router = Arc::new(std::mem::take(&mut self.router));
        info!(addr = %local_addr, routes = router.len(), "sprig listening");

        let (stop, stopped) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, router, self.config.clone(), stopped));

        Ok(Listening { local_addr, stop, task })
    }

    /// Listens, then runs until SIGTERM or Ctrl-C and shuts down gracefully.
    pub async fn serve(mut self) -> Result<(), Error> {
        let listening = self.listen().await?;
        shutdown_signal().await;
        info!("shutdown signal received");
        listening.shutdown().await;
        Ok(())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

// ── Listening handle ─────────────────────────────────────────────────────────

/// Handle to a running accept loop, returned by [`Server::listen`].
///
/// Dropping it leaves the server running for as long as the runtime lives.
pub struct Listening {
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Listening {
    /// The bound address. Useful when the configured port was `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, drains in-flight connections, and waits for the loop
    /// to exit.
    pub async fn shutdown(self) {
        self.stop.send_replace(true);
        self.wait().await;
    }

    /// Waits for the accept loop to exit without asking it to.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            error!("accept loop failed: {e}");
        }
    }
}

// ── Accept loop ──────────────────────────────────────────────────────────────

async fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    config: Config,
    stopped: watch::Receiver<bool>,
) {
    let limits = config.limits();
    let deadline = config.request_timeout();
    let mut tasks = JoinSet::new();

    // Polled again on every loop iteration, so it must stay put in memory
    // after the first poll. `tokio::pin!` pins it on the stack.
    let shutdown = stop_requested(stopped.clone());
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Arms are checked top to bottom. Shutdown goes first so a stop
            // request takes effect even while connections are still queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutting down, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                let io = TokioIo::new(stream);
                let stopping = stop_requested(stopped.clone());

                tasks.spawn(async move {
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { handle(&router, limits, deadline, req).await }
                    });

                    // Pinned so it can still be driven to completion after
                    // `graceful_shutdown` is called on it.
                    let conn = http1::Builder::new().timer(TokioTimer::new()).serve_connection(io, svc);
                    tokio::pin!(conn);

                    let outcome = tokio::select! {
                        res = conn.as_mut() => res,
                        () = stopping => {
                            // Finish the in-flight request, then close instead
                            // of waiting for the next one on a keep-alive socket.
                            conn.as_mut().graceful_shutdown();
                            conn.await
                        }
                    };
                    if let Err(e) = outcome {
                        debug!(peer = %peer, "connection error: {e}");
                    }
                });
            }

            // Reap finished connections so the set does not grow for the
            // whole life of the server.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);

    let drained = tokio::time::timeout(config.shutdown_grace(), async {
        while tasks.join_next().await.is_some() {}
    })
    .await
    .is_ok();

    if !drained {
        warn!(remaining = tasks.len(), "grace period elapsed, aborting connections");
        tasks.shutdown().await;
    }

    info!("sprig stopped");
}

/// Resolves once a stop is requested. Never resolves if the [`Listening`]
/// handle was dropped without asking for one.
async fn stop_requested(mut stopped: watch::Receiver<bool>) {
    if stopped.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ── Request handling ─────────────────────────────────────────────────────────

/// Runs one request under the per-request deadline.
async fn handle(
    router: &Router,
    limits: Limits,
    deadline: Option<Duration>,
    req: hyper::Request<Incoming>,
) -> Result<Reply, Error> {
    let span = debug_span!("request", method = %req.method(), path = req.uri().path());

    let Some(deadline) = deadline else {
        return dispatch(router, limits, req).instrument(span).await;
    };

    // `dispatch` returns as soon as the handler sends, so the deadline only
    // bounds the wait for a reply, never what the handler does afterwards.
    match tokio::time::timeout(deadline, dispatch(router, limits, req)).instrument(span.clone()).await {
        Ok(outcome) => outcome,
        Err(_) => {
            span.in_scope(|| warn!(?deadline, "request deadline elapsed"));
            Ok(bare(StatusCode::SERVICE_UNAVAILABLE, true))
        }
    }
}

// ── Shutdown signal ──────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C the process receives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
