/// An ordered list of header name / value pairs used for both requests and responses.
///
/// Lookups are case-insensitive. Insertion order is preserved so serialized responses
/// list headers in the order the handler added them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Returns an empty header list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a header, replacing every existing entry with the same name.
    ///
    /// # Examples
    /// ```
    /// let mut headers = xebec::http::headers::Headers::new();
    /// headers.insert("Content-Type", "text/plain");
    /// headers.insert("content-type", "text/html");
    /// assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    /// assert_eq!(headers.len(), 1);
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.0.push((key, value.into()));
    }

    /// Adds a header line without touching existing entries of the same name.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Retrieves the value of the first entry with the given name.
    ///
    /// Returns None if the specified key was not found.
    ///
    /// # Examples
    /// ```
    /// let mut headers = xebec::http::headers::Headers::new();
    /// headers.insert("Host", "localhost");
    /// assert_eq!(headers.get("host"), Some("localhost"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Appends a value to an existing header, joining with `", "`, or inserts it.
    ///
    /// # Examples
    /// ```
    /// let mut headers = xebec::http::headers::Headers::new();
    /// headers.append("accept", "text/html");
    /// headers.append("Accept", "application/json");
    /// assert_eq!(headers.get("accept"), Some("text/html, application/json"));
    /// ```
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some((_, existing)) = self
            .0
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
        {
            if !existing.is_empty() {
                existing.push_str(", ");
            }
            existing.push_str(&value);
        } else {
            self.0.push((key, value));
        }
    }

    /// Removes every entry with the given name.
    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(name, _)| !name.eq_ignore_ascii_case(key));
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the header section of a request head, one `Name: value` pair per line.
    ///
    /// Parsing is lenient: lines without a colon or with an invalid field name are skipped.
    /// Repeated names are merged with [`Headers::append`]. Stops at the first empty line.
    pub fn parse_lines<'a>(&mut self, lines: impl Iterator<Item = &'a str>) {
        for line in lines {
            if line.is_empty() {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || !key.chars().all(is_valid_char) {
                continue;
            }
            self.append(key.to_ascii_lowercase(), value.trim());
        }
    }
}

/// Helper method to determine whether the passed character is valid according to <https://www.rfc-editor.org/rfc/rfc9110#section-5.6.2>
pub(crate) const fn is_valid_char(c: char) -> bool {
    if c.is_ascii_alphanumeric() {
        return true;
    }

    matches!(
        c,
        '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
    )
}
