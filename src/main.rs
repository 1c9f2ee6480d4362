//! # Xebec Server
//!
//! This binary serves a handful of example routes with the library in this crate, plus the
//! files under the configured public directory.
//!
//! Usage: `xebec [config-file]`. Settings can also come from `XEBEC_*` environment variables.
use std::path::PathBuf;

use xebec::{Request, Response, Router, Server, ServerConfig, ServerError, StatusCode, logging};

fn router(config: &ServerConfig) -> Result<Router, xebec::HttpError> {
    let index = config.public_dir.join("index.html");

    Ok(Router::builder()
        .get("/", move |_: &mut Request, res: &mut Response| {
            res.html(&index);
        })?
        .get("/about", |_: &mut Request, res: &mut Response| {
            res.status(StatusCode::MOVED_PERMANENTLY).send("About page");
        })?
        .get("/contact", |_: &mut Request, res: &mut Response| {
            res.send("Contact page");
        })?
        .post("/post", |_: &mut Request, res: &mut Response| {
            res.send("POST request");
        })?
        .post("/post/:id", |req: &mut Request, res: &mut Response| {
            res.send("POST request with id: ")
                .send(req.param("id").unwrap_or_default());
        })?
        .get("/json", |_: &mut Request, res: &mut Response| {
            res.json(r#"{"name": "John", "age": 30, "city": "New York"}"#);
        })?
        .build())
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ServerConfig::load(config_path.as_deref())?;
    logging::init(&config.log_level);

    let server = Server::bind(&config, router(&config)?).await?;
    server
        .run_until(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(%error, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
}
