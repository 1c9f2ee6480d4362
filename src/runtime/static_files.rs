use std::path::{Component, Path, PathBuf};

use crate::http::response::Response;

/// File served for a path that names a directory.
const INDEX_FILE: &str = "index.html";

/// Serves files from a root directory configured before the server starts.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Creates a resolver rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The configured root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path onto the root directory.
    ///
    /// Returns None for paths that try to leave the root (`..`, absolute or prefixed components).
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }

    /// Reads the file a request path resolves to.
    ///
    /// A path naming a directory resolves to its `index.html`. Returns None if nothing can be read.
    pub async fn load(&self, url_path: &str) -> Option<(Vec<u8>, &'static str)> {
        let mut path = self.map_path(url_path)?;
        if tokio::fs::metadata(&path).await.ok()?.is_dir() {
            path.push(INDEX_FILE);
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Some((bytes, content_type(&path))),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "static file not readable");
                None
            }
        }
    }

    /// Puts the file for `url_path` into the response, replacing its body and `Content-Type`.
    ///
    /// Leaves the response untouched and returns false if there is no such file.
    pub async fn apply(&self, url_path: &str, response: &mut Response) -> bool {
        let Some((bytes, content_type)) = self.load(url_path).await else {
            return false;
        };
        response.body = bytes;
        response.set_header("Content-Type", content_type);
        true
    }
}

/// Infers the MIME type from a file extension.
#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
