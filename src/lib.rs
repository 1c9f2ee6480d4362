//! # Xebec
//!
//! A minimal embeddable HTTP/1.1 server.
//!
//! Each accepted connection serves one request: the request line is parsed, the path is
//! matched against a table of registered routes (templates such as `/post/:id` bind named
//! parameters), the handler fills in the response, and requests no route claims fall back to
//! files under a public directory.
//!
//! ```no_run
//! use xebec::{Request, Response, Router, Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::builder()
//!     .get("/post/:id", |req: &mut Request, res: &mut Response| {
//!         res.send("post ").send(req.param("id").unwrap_or_default());
//!     })?
//!     .build();
//!
//! Server::bind(&ServerConfig::default(), router).await?.run().await?;
//! # Ok(())
//! # }
//! ```
/// Server configuration
pub mod config;
/// HTTP parsing and serialization
pub mod http;
/// Logging setup
pub mod logging;
/// Route templates and the route table
pub mod routing;
/// Listener, connection handling and static files
pub mod runtime;

pub use config::{ServerConfig, StaticPolicy};
pub use http::{
    request::{HttpError, Request},
    request_line::Method,
    response::Response,
    status::StatusCode,
};
pub use routing::router::{Router, RouterBuilder};
pub use runtime::{
    handler::Handler,
    server::{Server, ServerError, ServerHandle},
};
