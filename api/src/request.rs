//! Outbound request descriptors

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Header carrying the user's language preference
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";

/// HTTP method used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// One outbound request: method, URL, optional JSON body and extra headers
///
/// Descriptors are values; the `with_*` methods return a new descriptor.
///
/// # Example
///
/// ```
/// use servir_api::{Method, RequestDescriptor};
/// use serde_json::json;
///
/// let request = RequestDescriptor::post("/users", json!({ "name": "Ana" }))
///     .with_header("Accept-Language", "pt-BR");
///
/// assert_eq!(request.method(), Method::Post);
/// assert_eq!(request.header("accept-language"), Some("pt-BR"));
/// assert_eq!(request.route(), "POST /users");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    body: Option<Value>,
    headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Descriptor without a body
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    /// `GET url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// `POST url` with a JSON body
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    /// `PUT url` with a JSON body
    #[must_use]
    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, url).with_body(body)
    }

    /// `DELETE url`
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Same request with a JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Same request with one more header; an existing header of the same
    /// name (case-insensitive) is replaced
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// HTTP method
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// URL or path, as given
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body, if any
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Extra headers
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `"METHOD url"`, used for logging and mock routing
    #[must_use]
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        assert_eq!(RequestDescriptor::get("/a").method(), Method::Get);
        assert_eq!(RequestDescriptor::delete("/a").body(), None);
        assert_eq!(
            RequestDescriptor::put("/a", json!({ "x": 1 })).body(),
            Some(&json!({ "x": 1 }))
        );
    }

    #[test]
    fn test_with_header_replaces_case_insensitively() {
        let request = RequestDescriptor::get("/users")
            .with_header("accept-language", "en")
            .with_header(ACCEPT_LANGUAGE, "pt-BR");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("ACCEPT-LANGUAGE"), Some("pt-BR"));
    }

    #[test]
    fn test_with_header_leaves_original_untouched() {
        let original = RequestDescriptor::get("/users");
        let localized = original.clone().with_header(ACCEPT_LANGUAGE, "es");

        assert_eq!(original.header(ACCEPT_LANGUAGE), None);
        assert_eq!(localized.header(ACCEPT_LANGUAGE), Some("es"));
    }

    #[test]
    fn test_reqwest_method() {
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(Method::Put.to_string(), "PUT");
    }
}
