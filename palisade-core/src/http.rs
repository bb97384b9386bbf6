// HTTP request and response types

use crate::form;
use cookie::Cookie;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, header};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Typed per-request values attached by middleware
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a header. Names or values that are not valid HTTP are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set a URL-encoded form body and the matching content type.
    pub fn with_form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.body = form::encode_form(pairs).unwrap_or_default().into_bytes();
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(FORM_CONTENT_TYPE),
        );
        self
    }

    /// Set a `multipart/form-data` body of text fields and the matching content type.
    pub fn with_multipart(mut self, boundary: &str, fields: &[(&str, &str)]) -> Self {
        let (body, content_type) = form::encode_multipart(boundary, fields);
        self.body = body;
        if let Ok(value) = HeaderValue::try_from(content_type) {
            self.headers.insert(header::CONTENT_TYPE, value);
        }
        self
    }

    /// Append a cookie to the request's `Cookie` header.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        let pair = Cookie::new(name, value).stripped().to_string();
        let joined = match self.header(header::COOKIE.as_str()) {
            Some(existing) if !existing.is_empty() => format!("{existing}; {pair}"),
            _ => pair,
        };
        if let Ok(value) = HeaderValue::try_from(joined) {
            self.headers.insert(header::COOKIE, value);
        }
        self
    }

    /// Get a header value as text (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    fn has_mime(&self, mime: &str) -> bool {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|m| m.trim().eq_ignore_ascii_case(mime))
    }

    /// Whether the body is URL-encoded form data
    pub fn is_form(&self) -> bool {
        self.has_mime(FORM_CONTENT_TYPE)
    }

    /// Whether the body is `multipart/form-data`
    pub fn is_multipart(&self) -> bool {
        self.has_mime(MULTIPART_CONTENT_TYPE)
    }

    /// First value of a submitted form field.
    ///
    /// Reads URL-encoded and multipart bodies; any other body, or one that
    /// fails to parse, yields `None`.
    pub async fn form_value(&self, name: &str) -> Option<String> {
        if self.is_form() {
            return form::form_value(&self.body, name).ok().flatten();
        }
        if self.is_multipart() {
            let content_type = self.content_type()?;
            return form::multipart_value(content_type, self.body.clone(), name)
                .await
                .ok()
                .flatten();
        }
        None
    }

    /// Value of the first request cookie named `name`
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value_trimmed().to_string())
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn forbidden() -> Self {
        Self::new(403)
    }

    /// Plain-text response
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    /// HTML response
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set a header, replacing earlier values. Invalid values are ignored.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::try_from(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Append a `Set-Cookie` header
    pub fn set_cookie(&mut self, cookie: &Cookie<'_>) -> Result<(), crate::Error> {
        let value = HeaderValue::try_from(cookie.to_string())
            .map_err(|e| crate::Error::Http(format!("invalid cookie header: {}", e)))?;
        self.headers.append(header::SET_COOKIE, value);
        Ok(())
    }

    /// Cookies set by this response
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value.to_string()).ok())
            .collect()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
