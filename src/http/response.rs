use std::{fmt::Write as _, path::Path, time::Instant};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::{headers::Headers, request::HttpError, status::StatusCode};

/// Value of the identifying header added to every response.
pub const POWERED_BY: &str = concat!("Xebec-Server/", env!("CARGO_PKG_VERSION"));

/// Representation of a HTTP response with status code, headers and body.
///
/// Created when handling starts, filled in by the route handler and the static file resolver,
/// and consumed once by [`Response::into_bytes`].
#[derive(Debug, Clone)]
pub struct Response {
    /// The status code, 200 unless the handler says otherwise.
    pub status: StatusCode,
    /// Headers set by the handler, in insertion order.
    pub headers: Headers,
    /// The response body.
    pub body: Vec<u8>,
    started: Instant,
    omit_body: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an empty 200 response and starts its timing clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Headers::new(),
            body: Vec::new(),
            started: Instant::now(),
            omit_body: false,
        }
    }

    /// Sets the status code.
    pub fn status(&mut self, code: impl Into<StatusCode>) -> &mut Self {
        self.status = code.into();
        self
    }

    /// Adds a header line. Repeated calls with the same name produce repeated lines.
    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.add(key, value);
        self
    }

    /// Sets a header, replacing any earlier value of the same name.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key, value);
        self
    }

    /// Appends data to the body.
    pub fn send(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.body.extend_from_slice(data.as_ref());
        self
    }

    /// Replaces the body with a plain text payload.
    pub fn text(&mut self, data: impl Into<String>) -> &mut Self {
        self.set_header("Content-Type", "text/plain");
        self.body = data.into().into_bytes();
        self
    }

    /// Replaces the body with a JSON payload.
    pub fn json(&mut self, data: impl Into<String>) -> &mut Self {
        self.set_header("Content-Type", "application/json");
        self.body = data.into().into_bytes();
        self
    }

    /// Replaces the body with the contents of an HTML file.
    ///
    /// If the file cannot be read the status becomes 404 and `File Not Found` is appended.
    pub fn html(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.set_header("Content-Type", "text/html");
        match std::fs::read(path.as_ref()) {
            Ok(contents) => self.body = contents,
            Err(error) => {
                tracing::debug!(path = %path.as_ref().display(), %error, "html file not readable");
                self.status(StatusCode::NOT_FOUND).send("File Not Found");
            }
        }
        self
    }

    /// Turns the response into a redirect to `location`.
    pub fn redirect(&mut self, location: impl Into<String>) -> &mut Self {
        self.status(StatusCode::MOVED_PERMANENTLY)
            .set_header("Location", location)
    }

    /// Leaves the body off the wire while `Content-Length` still reports its size, as a
    /// response to `HEAD` must.
    pub fn head_only(&mut self) -> &mut Self {
        self.omit_body = true;
        self
    }

    /// Serializes the response into a wire-ready buffer.
    ///
    /// Adds `Content-Length`, `X-Powered-By`, `Server-Timing` and `Connection: close` after the
    /// handler's headers, since every connection serves a single request.
    /// With `canonical_reasons` unset every status line carries the reason phrase `OK`.
    #[must_use]
    pub fn into_bytes(mut self, canonical_reasons: bool) -> Vec<u8> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.headers.insert("Content-Length", self.body.len().to_string());
        self.headers.insert("X-Powered-By", POWERED_BY);
        self.headers
            .insert("Server-Timing", format!("total;dur={elapsed_ms:.3}"));
        self.headers.insert("Connection", "close");

        let reason = if canonical_reasons {
            self.status.reason_phrase()
        } else {
            "OK"
        };

        let mut head = String::with_capacity(128);
        // Writing into a String cannot fail.
        let _ = write!(head, "HTTP/1.1 {} {reason}\r\n", self.status);
        for (key, value) in self.headers.iter() {
            let _ = write!(head, "{key}: {value}\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        if !self.omit_body {
            bytes.extend_from_slice(&self.body);
        }
        bytes
    }
}

/// Helper function to remove boilerplate for creating html responses.
#[must_use]
pub fn html_response(status_code: StatusCode, html: &str) -> Response {
    let mut response = Response::new();
    response
        .status(status_code)
        .set_header("Content-Type", "text/html")
        .send(html);
    response
}

/// Serializes the response and writes it to the stream in a single buffer.
///
/// # Errors
///
/// Throws an `HttpError` if the write process fails.
pub async fn write_response<W: AsyncWrite + Unpin>(
    stream: &mut W,
    response: Response,
    canonical_reasons: bool,
) -> Result<(), HttpError> {
    let bytes = response.into_bytes(canonical_reasons);
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::http::{
        response::{POWERED_BY, Response, html_response, write_response},
        status::StatusCode,
    };

    fn split(bytes: &[u8]) -> (String, Vec<u8>) {
        let end = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        (
            String::from_utf8(bytes[..end].to_vec()).unwrap(),
            bytes[end + 4..].to_vec(),
        )
    }

    #[test]
    fn default_response_is_200_with_empty_body() {
        let (head, body) = split(&Response::new().into_bytes(true));

        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("\r\nContent-Length: 0"));
        assert!(body.is_empty());
    }

    #[test]
    fn standard_headers_follow_handler_headers() {
        let mut response = Response::new();
        response.header("X-Custom", "1").send("hello");
        let (head, body) = split(&response.into_bytes(true));
        let names: Vec<&str> = head
            .lines()
            .skip(1)
            .map(|line| line.split(':').next().unwrap())
            .collect();

        assert_eq!(names, vec!["X-Custom", "Content-Length", "X-Powered-By", "Server-Timing", "Connection"]);
        assert!(head.contains(&format!("X-Powered-By: {POWERED_BY}")));
        assert!(head.contains("Server-Timing: total;dur="));
        assert_eq!(body, b"hello");
    }

    #[test]
    fn content_length_matches_body_bytes() {
        let mut response = Response::new();
        response.send("héllo ").send([0u8, 1, 2]);
        let (head, body) = split(&response.into_bytes(true));

        assert_eq!(body.len(), 10);
        assert!(head.contains("Content-Length: 10"));
    }

    #[test]
    fn handler_content_length_is_replaced() {
        let mut response = Response::new();
        response.header("Content-Length", "999").send("abc");
        let (head, _) = split(&response.into_bytes(true));

        assert_eq!(head.matches("Content-Length").count(), 1);
        assert!(head.contains("Content-Length: 3"));
    }

    #[test]
    fn literal_ok_reason_when_not_canonical() {
        let mut response = Response::new();
        response.status(StatusCode::MOVED_PERMANENTLY);
        let (head, _) = split(&response.clone().into_bytes(false));
        assert!(head.starts_with("HTTP/1.1 301 OK\r\n"));

        let (head, _) = split(&response.into_bytes(true));
        assert!(head.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
    }

    #[test]
    fn head_only_keeps_content_length_without_body() {
        let mut response = Response::new();
        response.send("twelve bytes").head_only();
        let (head, body) = split(&response.into_bytes(true));

        assert!(head.contains("Content-Length: 12"));
        assert!(body.is_empty());
    }

    #[test]
    fn json_sets_content_type_and_body() {
        let mut response = Response::new();
        response.json(r#"{"name": "John"}"#);

        assert_eq!(response.headers.get("content-type"), Some("application/json"));
        assert_eq!(response.body, br#"{"name": "John"}"#);
    }

    #[test]
    fn html_missing_file_is_404() {
        let mut response = Response::new();
        response.html("/definitely/not/here.html");

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, b"File Not Found");
    }

    #[test]
    fn html_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<h1>hi</h1>").unwrap();

        let mut response = Response::new();
        response.html(&path);

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.get("content-type"), Some("text/html"));
        assert_eq!(response.body, b"<h1>hi</h1>");
    }

    #[test]
    fn redirect_sets_location() {
        let mut response = Response::new();
        response.redirect("/new");

        assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers.get("location"), Some("/new"));
    }

    #[test]
    fn html_response_builds_status_and_body() {
        let response = html_response(StatusCode::BAD_REQUEST, "<h1>Bad Request</h1>");

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.headers.get("content-type"), Some("text/html"));
        assert_eq!(response.body, b"<h1>Bad Request</h1>");
    }

    #[tokio::test]
    async fn write_response_writes_whole_buffer() {
        let mut buffer = Vec::new();
        let mut response = Response::new();
        response.send("payload");

        write_response(&mut buffer, response, true).await.unwrap();

        let (head, body) = split(&buffer);
        assert!(head.starts_with("HTTP/1.1 200 OK"));
        assert_eq!(body, b"payload");
    }
}
