use std::{fmt, str::FromStr};

use crate::http::{headers::is_valid_char, request::HttpError};

/// A request method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `CONNECT`
    Connect,
    /// `TRACE`
    Trace,
    /// Any other well-formed method token. No route can be registered for it, so such requests
    /// go straight to the static file resolver.
    Extension(String),
}

impl Method {
    /// The method token as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Extension(token) => token,
        }
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "CONNECT" => Ok(Self::Connect),
            "TRACE" => Ok(Self::Trace),
            other if !other.is_empty() && other.chars().all(is_valid_char) => {
                Ok(Self::Extension(other.to_string()))
            }
            other => Err(HttpError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Http Request Line representation with method, target and http version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The method of the parsed request
    pub method: Method,
    /// The raw request target, query string included
    pub request_target: String,
    /// The HTTP version token without the `HTTP/` prefix, empty if the client sent none
    pub http_version: String,
}

/// Parses the first line of a request head.
///
/// The method is the token before the first space and the target is the token between the
/// first and the second space. A missing version token is tolerated.
///
/// # Errors
///
/// Returns `HttpError::MalformedRequestLine` if there is no space or the method or target is
/// empty, and `HttpError::InvalidMethod` if the method contains characters not allowed in a token.
pub fn parse_request_line(line: &str) -> Result<RequestLine, HttpError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (method, rest) = line.split_once(' ').ok_or(HttpError::MalformedRequestLine)?;
    if method.is_empty() {
        return Err(HttpError::MalformedRequestLine);
    }

    let (request_target, version) = rest.split_once(' ').unwrap_or((rest, ""));
    if request_target.is_empty() {
        return Err(HttpError::MalformedRequestLine);
    }

    let method = method.parse::<Method>()?;
    let http_version = version
        .trim()
        .strip_prefix("HTTP/")
        .unwrap_or_default()
        .to_string();

    Ok(RequestLine {
        method,
        request_target: request_target.to_string(),
        http_version,
    })
}

#[cfg(test)]
mod tests {
    use crate::http::{
        request::HttpError,
        request_line::{Method, parse_request_line},
    };

    #[test]
    fn get_request_line_valid() {
        let request_line = parse_request_line("GET / HTTP/1.1\r\n").unwrap();

        assert_eq!(request_line.method, Method::Get);
        assert_eq!(request_line.request_target, "/");
        assert_eq!(request_line.http_version, "1.1");
    }

    #[test]
    fn get_request_line_with_path_valid() {
        let request_line = parse_request_line("GET /coffee?size=large HTTP/1.1").unwrap();

        assert_eq!(request_line.method, Method::Get);
        assert_eq!(request_line.request_target, "/coffee?size=large");
        assert_eq!(request_line.http_version, "1.1");
    }

    #[test]
    fn request_line_without_version_is_tolerated() {
        let request_line = parse_request_line("POST /post/7").unwrap();

        assert_eq!(request_line.method, Method::Post);
        assert_eq!(request_line.request_target, "/post/7");
        assert!(request_line.http_version.is_empty());
    }

    #[test]
    fn request_line_without_space_is_malformed() {
        let result = parse_request_line("GET/coffeeHTTP/1.1\r\n");
        assert!(
            matches!(result, Err(HttpError::MalformedRequestLine)),
            "Expected Err(HttpError::MalformedRequestLine), got {result:?}"
        );
    }

    #[test]
    fn request_line_with_empty_method_is_malformed() {
        let result = parse_request_line(" / HTTP/1.1");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine)));
    }

    #[test]
    fn request_line_with_empty_target_is_malformed() {
        let result = parse_request_line("GET  HTTP/1.1");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine)));
    }

    #[test]
    fn unknown_method_token_is_an_extension() {
        let request_line = parse_request_line("TAKE /coffee HTTP/1.1\r\n").unwrap();

        assert_eq!(request_line.method, Method::Extension("TAKE".to_string()));
        assert_eq!(request_line.method.to_string(), "TAKE");
    }

    #[test]
    fn request_line_return_throw_invalid_method() {
        let result = parse_request_line("GE{T} /coffee HTTP/1.1\r\n");
        assert!(
            matches!(result, Err(HttpError::InvalidMethod(ref m)) if m == "GE{T}"),
            "Expected Err(HttpError::InvalidMethod), got {result:?}"
        );
    }

    #[test]
    fn method_display_round_trips_wire_token() {
        for token in ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"] {
            assert_eq!(token.parse::<Method>().unwrap().to_string(), token);
        }
    }
}
