use std::collections::HashMap;

use regex::Regex;

use crate::http::request::HttpError;

/// A compiled route template such as `/post/:id`.
///
/// Literal segments match themselves, `:name` segments match one or more characters other
/// than `/`, and a single trailing slash is optional. The regex is built once at registration.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    template: String,
    matcher: Regex,
    /// Parameter names with the index of the `/`-separated segment they occupy.
    params: Vec<(String, usize)>,
}

impl RouteTemplate {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not start with `/`, a parameter
    /// name is empty or not made of word characters, or a name is used twice.
    pub fn compile(template: &str) -> Result<Self, HttpError> {
        let invalid = |reason: &str| HttpError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if !template.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let trimmed = template.strip_suffix('/').unwrap_or(template);
        let mut pattern = String::with_capacity(trimmed.len() + 8);
        let mut params: Vec<(String, usize)> = Vec::new();

        pattern.push('^');
        for (index, segment) in trimmed.split('/').enumerate() {
            if index > 0 {
                pattern.push('/');
            }
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(invalid("parameter names must be non-empty word characters"));
                }
                if params.iter().any(|(existing, _)| existing == name) {
                    return Err(invalid("duplicate parameter name"));
                }
                params.push((name.to_string(), index));
                pattern.push_str("[^/]+");
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }
        pattern.push_str("/?$");

        let matcher = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            matcher,
            params,
        })
    }

    /// The template as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Names of the parameters in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.params.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true if the template matches the whole path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Binds each parameter to the path segment at the same position.
    ///
    /// Only meaningful for a path accepted by [`RouteTemplate::matches`], which fixes the
    /// segment count. A parameter whose segment is missing is left unbound.
    pub fn extract_params(&self, path: &str, into: &mut HashMap<String, String>) {
        let segments: Vec<&str> = path.split('/').collect();
        for (name, position) in &self.params {
            if let Some(value) = segments.get(*position) {
                into.insert(name.clone(), (*value).to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{http::request::HttpError, routing::template::RouteTemplate};

    fn params_of(template: &str, path: &str) -> HashMap<String, String> {
        let template = RouteTemplate::compile(template).unwrap();
        assert!(template.matches(path), "{} should match {path}", template.as_str());
        let mut params = HashMap::new();
        template.extract_params(path, &mut params);
        params
    }

    #[test]
    fn literal_template_matches_exactly() {
        let template = RouteTemplate::compile("/about").unwrap();

        assert!(template.matches("/about"));
        assert!(template.matches("/about/"));
        assert!(!template.matches("/about/us"));
        assert!(!template.matches("/abou"));
        assert!(!template.matches("/aboutx"));
    }

    #[test]
    fn root_template_matches_root_only() {
        let template = RouteTemplate::compile("/").unwrap();

        assert!(template.matches("/"));
        assert!(!template.matches("/index.html"));
    }

    #[test]
    fn single_param_is_extracted() {
        let params = params_of("/post/:id", "/post/42");

        assert_eq!(params.len(), 1);
        assert_eq!(params["id"], "42");
    }

    #[test]
    fn multiple_params_bind_by_position() {
        let params = params_of("/users/:user/posts/:post", "/users/ada/posts/7");

        assert_eq!(params.len(), 2);
        assert_eq!(params["user"], "ada");
        assert_eq!(params["post"], "7");
    }

    #[test]
    fn param_content_may_hold_any_non_separator() {
        let params = params_of("/file/:name", "/file/a.b-c~d%20e:f");

        assert_eq!(params["name"], "a.b-c~d%20e:f");
    }

    #[test]
    fn trailing_slash_is_optional_with_params() {
        let params = params_of("/post/:id", "/post/9/");

        assert_eq!(params["id"], "9");
    }

    #[test]
    fn param_does_not_span_separator() {
        let template = RouteTemplate::compile("/post/:id").unwrap();

        assert!(!template.matches("/post/1/2"));
        assert!(!template.matches("/post/"));
        assert!(!template.matches("/post"));
    }

    #[test]
    fn literal_segments_are_escaped() {
        let template = RouteTemplate::compile("/v1.0/items").unwrap();

        assert!(template.matches("/v1.0/items"));
        assert!(!template.matches("/v1x0/items"));
    }

    #[test]
    fn param_names_are_in_template_order() {
        let template = RouteTemplate::compile("/a/:x/b/:y").unwrap();

        assert_eq!(template.param_names().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn duplicate_param_names_are_rejected() {
        let result = RouteTemplate::compile("/a/:id/b/:id");
        assert!(matches!(result, Err(HttpError::InvalidTemplate { .. })));
    }

    #[test]
    fn empty_param_name_is_rejected() {
        let result = RouteTemplate::compile("/a/:");
        assert!(matches!(result, Err(HttpError::InvalidTemplate { .. })));
    }

    #[test]
    fn relative_template_is_rejected() {
        let result = RouteTemplate::compile("about");
        assert!(matches!(result, Err(HttpError::InvalidTemplate { .. })));
    }
}
