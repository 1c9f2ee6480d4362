use std::collections::HashMap;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::{
    headers::Headers,
    query::{parse_query, split_target},
    request_line::{Method, parse_request_line},
};

/// Size of a single socket read while collecting the request.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Representation of a HTTP request as seen by route handlers.
///
/// Built once per connection and dropped when the connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The request path with the query string stripped.
    pub path: String,
    /// The HTTP version token without the `HTTP/` prefix.
    pub http_version: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Named path parameters bound by the matched route template.
    pub params: HashMap<String, String>,
    /// Header lines following the request line. Names are stored lowercase.
    pub headers: Headers,
    /// Everything after the blank line that ends the head (can be empty).
    pub body: Vec<u8>,
}

/// Represents the kind of error that can occur while serving a connection
#[derive(Error, Debug)]
pub enum HttpError {
    /// The request contains an unsupported / invalid HTTP method.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// The request line is missing its method or target.
    #[error("request line is malformed")]
    MalformedRequestLine,

    /// The client closed the connection before sending anything.
    #[error("unexpected end of file")]
    UnexpectedEOF,

    /// The client did not send its request within the configured read timeout.
    #[error("timed out waiting for the request")]
    Timeout,

    /// A route template could not be compiled.
    #[error("invalid route template {template:?}: {reason}")]
    InvalidTemplate {
        /// The template as passed at registration.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// There was a generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Request {
    /// Parses a raw request.
    ///
    /// Only the request line is mandatory. Header lines are parsed leniently and everything
    /// after the first blank line is kept as the body.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if the request line is missing or malformed.
    pub fn parse(raw: &[u8]) -> Result<Self, HttpError> {
        if raw.is_empty() {
            return Err(HttpError::UnexpectedEOF);
        }

        let (head, body) = match find_head_end(raw) {
            Some(end) => (&raw[..end], raw[end + 4..].to_vec()),
            None => (raw, Vec::new()),
        };
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split("\r\n");

        let first = lines.next().ok_or(HttpError::MalformedRequestLine)?;
        let request_line = parse_request_line(first)?;

        let mut headers = Headers::new();
        headers.parse_lines(lines);

        let (path, query) = split_target(&request_line.request_target);
        let query = query.map(parse_query).unwrap_or_default();

        Ok(Self {
            method: request_line.method,
            path: path.to_string(),
            http_version: request_line.http_version,
            query,
            params: HashMap::new(),
            headers,
            body,
        })
    }

    /// Returns a path parameter bound by the matched route.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns a query string parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns a request header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Position of the `\r\n\r\n` separating the head from the body.
fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Reads a request from the passed reader.
///
/// Reads in chunks of [`READ_CHUNK_SIZE`] bytes and stops as soon as a read returns less than
/// a full chunk. This is a byte-count heuristic rather than a `Content-Length` aware read:
/// a request whose size is an exact multiple of the chunk size costs one extra read, and a
/// request split across slow TCP segments may be cut short.
///
/// # Errors
///
/// Returns `HttpError::UnexpectedEOF` if the peer sent nothing and `HttpError::Io` if reading fails.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<BytesMut, HttpError> {
    let mut buffer = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk).await?;
        buffer.extend_from_slice(&chunk[..read]);
        if read < READ_CHUNK_SIZE {
            break;
        }
    }

    if buffer.is_empty() {
        return Err(HttpError::UnexpectedEOF);
    }
    Ok(buffer)
}

/// Reads and parses a request from the passed reader.
///
/// # Errors
///
/// Throws a `HttpError` if reading fails or the request line is invalid.
pub async fn request_from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, HttpError> {
    let raw = read_request(reader).await?;
    Request::parse(&raw)
}
