use std::fmt;

use reqwest::{header, Method};
use serde::Serialize;

use crate::{FidoError, Result};

/// Request configuration passed unchanged to every attempt of a fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Header name/value pairs, applied in order.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

impl RequestOptions {
    /// Plain `GET` without headers or body.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header. Invalid names or values surface as a transport
    /// error when the request is sent.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds an `Authorization` header from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let authorization = normalize_bearer_authorization(token.as_ref());
        self.header(header::AUTHORIZATION.as_str(), authorization)
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the body and sets `content-type: application/json`.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_string(value)
            .map_err(|err| FidoError::Decode(format!("request body is not serializable: {err}")))?;
        Ok(self
            .header(header::CONTENT_TYPE.as_str(), "application/json")
            .body(body))
    }

    pub(crate) fn apply(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        builder
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
