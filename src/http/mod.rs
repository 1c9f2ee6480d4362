/// Module containing the ordered header map
pub mod headers;
/// Module containing logic to parse query strings
pub mod query;
/// Module containing logic to parse requests
pub mod request;
/// Module containing logic to parse HTTP request lines
pub mod request_line;
/// Module formatting the response.
pub mod response;
/// Module containing status codes and reason phrases
pub mod status;
