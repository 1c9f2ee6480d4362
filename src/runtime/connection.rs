use std::{sync::Arc, time::Duration};

use bytes::BytesMut;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    task,
    time::timeout,
};

use crate::{
    config::StaticPolicy,
    http::{
        request::{HttpError, Request, read_request},
        request_line::Method,
        response::{Response, html_response, write_response},
        status::StatusCode,
    },
    runtime::server::ServerState,
};

/// Serves exactly one request on `stream` and closes it.
///
/// Malformed requests are answered with 400 and slow clients, when a read timeout is
/// configured, with 408. A client that closes without sending anything gets no response.
///
/// # Errors
///
/// Returns an `HttpError` if reading from or writing to the stream fails.
pub async fn serve_connection<S>(mut stream: S, state: &ServerState) -> Result<(), HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let parsed = read_with_deadline(&mut stream, state.read_timeout)
        .await
        .and_then(|raw| Request::parse(&raw));

    let response = match parsed {
        Ok(request) => {
            let is_head = request.method == Method::Head;
            let mut response = respond(request, state).await;
            if is_head {
                response.head_only();
            }
            response
        }
        Err(HttpError::UnexpectedEOF) => return Ok(()),
        Err(HttpError::Io(error)) => return Err(HttpError::Io(error)),
        Err(HttpError::Timeout) => {
            tracing::debug!("client did not send a request in time");
            html_response(
                StatusCode::REQUEST_TIMEOUT,
                "<html><body><h1>Request timed out</h1></body></html>",
            )
        }
        Err(error) => {
            tracing::debug!(%error, "rejecting malformed request");
            html_response(
                StatusCode::BAD_REQUEST,
                "<html><body><h1>Bad Request</h1></body></html>",
            )
        }
    };

    write_response(&mut stream, response, state.canonical_reasons).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn read_with_deadline<R: AsyncRead + Unpin>(
    reader: &mut R,
    deadline: Option<Duration>,
) -> Result<BytesMut, HttpError> {
    match deadline {
        Some(limit) => timeout(limit, read_request(reader))
            .await
            .map_err(|_| HttpError::Timeout)?,
        None => read_request(reader).await,
    }
}

/// Routes the request, runs the handler and applies the static file policy.
///
/// Handlers are synchronous and may block, so they run on the blocking pool and never hold up
/// the tasks serving other connections.
async fn respond(mut request: Request, state: &ServerState) -> Response {
    let mut response = Response::new();

    let matched = match state.router.find(&request.method, &request.path) {
        Some(entry) => {
            entry
                .template
                .extract_params(&request.path, &mut request.params);
            let method = request.method.clone();
            let path = request.path.clone();
            let handler = Arc::clone(&entry.handler);

            let handled = task::spawn_blocking(move || {
                handler.call(&mut request, &mut response);
                (request, response)
            })
            .await;

            match handled {
                Ok(handled) => (request, response) = handled,
                Err(error) => {
                    tracing::error!(
                        %method,
                        %path,
                        template = entry.template.as_str(),
                        panicked = error.is_panic(),
                        "route handler failed"
                    );
                    return html_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "<html><body><h1>Internal Server Error</h1></body></html>",
                    );
                }
            }
            true
        }
        None => false,
    };

    let consult_files = !matched || state.static_policy == StaticPolicy::Overlay;
    let served_file = consult_files && state.static_files.apply(&request.path, &mut response).await;

    if !matched && !served_file {
        response = html_response(
            StatusCode::NOT_FOUND,
            "<html><body><h1>Not Found</h1></body></html>",
        );
    }

    tracing::debug!(
        method = %request.method,
        path = %request.path,
        status = response.status.as_u16(),
        matched,
        served_file,
        "handled request"
    );
    response
}
