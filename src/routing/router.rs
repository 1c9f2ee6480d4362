use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    http::{request::HttpError, request_line::Method},
    routing::template::RouteTemplate,
    runtime::handler::Handler,
};

/// A registered route: a compiled template and the handler it dispatches to.
pub struct RouteEntry {
    /// The compiled template.
    pub template: RouteTemplate,
    /// The handler to invoke on a match.
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("template", &self.template.as_str())
            .finish_non_exhaustive()
    }
}

/// Collects route registrations before the server starts.
///
/// Calling [`RouterBuilder::build`] freezes the table; a [`Router`] cannot be modified, so
/// registration always happens before serving.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: HashMap<Method, Vec<RouteEntry>>,
}

impl RouterBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `method` and `template`.
    ///
    /// Routes are tried in registration order and the first match wins.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not compile.
    pub fn route<H>(mut self, method: Method, template: &str, handler: H) -> Result<Self, HttpError>
    where
        H: Handler + 'static,
    {
        let template = RouteTemplate::compile(template)?;
        tracing::debug!(%method, template = template.as_str(), "registered route");
        self.routes.entry(method).or_default().push(RouteEntry {
            template,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not compile.
    pub fn get<H: Handler + 'static>(self, template: &str, handler: H) -> Result<Self, HttpError> {
        self.route(Method::Get, template, handler)
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not compile.
    pub fn post<H: Handler + 'static>(self, template: &str, handler: H) -> Result<Self, HttpError> {
        self.route(Method::Post, template, handler)
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not compile.
    pub fn put<H: Handler + 'static>(self, template: &str, handler: H) -> Result<Self, HttpError> {
        self.route(Method::Put, template, handler)
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidTemplate` if the template does not compile.
    pub fn delete<H: Handler + 'static>(self, template: &str, handler: H) -> Result<Self, HttpError> {
        self.route(Method::Delete, template, handler)
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
        }
    }
}

/// The frozen route table, shared read-only by every connection.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<RouteEntry>>,
}

impl Router {
    /// Starts a new table.
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Returns the first route registered for `method` whose template matches `path`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.routes
            .get(method)?
            .iter()
            .find(|entry| entry.template.matches(path))
    }

    /// Number of registered routes across all methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Returns true if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
