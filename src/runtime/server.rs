use std::{
    future::Future,
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tokio::{
    net::{TcpListener, TcpSocket},
    sync::{Semaphore, watch},
    task::{JoinError, JoinHandle},
};

use crate::{
    config::{ServerConfig, StaticPolicy},
    http::request::HttpError,
    routing::router::Router,
    runtime::{connection::serve_connection, static_files::StaticFiles},
};

/// Listen backlog handed to the OS. The kernel clamps it to its own maximum.
const LISTEN_BACKLOG: u32 = i32::MAX.unsigned_abs();

/// Errors that stop the server as a whole.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listening socket could not be created or bound.
    #[error("failed to bind: {0}")]
    Bind(#[source] io::Error),

    /// Accepting a connection failed. The accept loop does not retry.
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    /// The configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A route template in the table is invalid.
    #[error("invalid route table: {0}")]
    Route(#[from] HttpError),

    /// The accept loop task could not be joined.
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
}

/// State shared read-only by every connection.
#[derive(Debug)]
pub struct ServerState {
    pub(crate) router: Arc<Router>,
    pub(crate) static_files: StaticFiles,
    pub(crate) static_policy: StaticPolicy,
    pub(crate) canonical_reasons: bool,
    pub(crate) read_timeout: Option<Duration>,
}

impl ServerState {
    /// Combines a frozen route table with the serving options from `config`.
    #[must_use]
    pub fn new(router: Arc<Router>, config: &ServerConfig) -> Self {
        Self {
            router,
            static_files: StaticFiles::new(config.public_dir.clone()),
            static_policy: config.static_policy,
            canonical_reasons: config.canonical_reasons,
            read_timeout: config.read_timeout(),
        }
    }
}

/// A bound server that has not started accepting yet.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
    connection_limit: Option<Arc<Semaphore>>,
}

impl Server {
    /// Binds the configured IPv4 address and port.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the host is not an IPv4 address or the socket cannot be bound.
    pub async fn bind(config: &ServerConfig, router: Router) -> Result<Self, ServerError> {
        let ip: Ipv4Addr = config
            .host
            .parse()
            .map_err(|e| ServerError::Bind(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let address = SocketAddrV4::new(ip, config.port);

        let socket = TcpSocket::new_v4().map_err(ServerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ServerError::Bind)?;
        socket.bind(address.into()).map_err(ServerError::Bind)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            routes = router.len(),
            public_dir = %config.public_dir.display(),
            max_connections = ?config.max_connections,
            "server listening"
        );

        Ok(Self {
            listener,
            state: Arc::new(ServerState::new(Arc::new(router), config)),
            connection_limit: config
                .max_connections
                .map(|limit| Arc::new(Semaphore::new(limit))),
        })
    }

    /// The address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the OS cannot report the address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until an accept fails.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Accept` on the first failed accept.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes or an accept fails.
    ///
    /// Every accepted connection is served on its own task; the loop never waits for one to
    /// finish. With `max_connections` set, the loop waits for a free slot before accepting.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Accept` on the first failed accept.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let permit = match &self.connection_limit {
                Some(limit) => tokio::select! {
                    biased;
                    () = &mut shutdown => break,
                    permit = Arc::clone(limit).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                },
                None => None,
            };

            let (stream, peer) = tokio::select! {
                biased;
                () = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(error) => {
                        tracing::error!(%error, "accept failed, stopping server");
                        return Err(ServerError::Accept(error));
                    }
                },
            };

            tracing::trace!(%peer, "accepted connection");
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(error) = serve_connection(stream, &state).await {
                    tracing::warn!(%peer, %error, "connection aborted");
                }
            });
        }

        tracing::info!("server stopped accepting connections");
        Ok(())
    }

    /// Runs the accept loop on a background task.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the bound address cannot be read.
    pub fn spawn(self) -> Result<ServerHandle, ServerError> {
        let local_addr = self.local_addr().map_err(ServerError::Bind)?;
        let (closed_tx, mut closed_rx) = watch::channel(false);
        let task = tokio::spawn(self.run_until(async move {
            // An Err means the handle was dropped, which also stops the server.
            let _ = closed_rx.wait_for(|closed| *closed).await;
        }));

        Ok(ServerHandle {
            local_addr,
            closed: closed_tx,
            task,
        })
    }
}

/// Handle to a server running on a background task.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    closed: watch::Sender<bool>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// The address the server is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections. Connections already accepted are still served.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Stops accepting and waits for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the accept loop, if any.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.close();
        self.task.await?
    }
}
