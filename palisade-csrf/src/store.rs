//! Persistence of the per-client secret.
//!
//! The secret travels back to the client in a cookie; the masked token goes
//! out through the page. Only the cookie backend is implemented.

use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::token::Secret;
use cookie::Cookie;
use cookie::time::Duration;
use palisade_core::{HttpRequest, HttpResponse};
use palisade_log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage backend for the secret
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Secret stored in a client cookie
    #[default]
    Cookie,
    /// Secret stored in server-side session state (not available)
    Session,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cookie" => Some(StoreBackend::Cookie),
            "session" => Some(StoreBackend::Session),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Cookie => "cookie",
            StoreBackend::Session => "session",
        }
    }
}

/// Loads and persists the secret for a client.
pub trait TokenStore: Send + Sync {
    /// Stored secret, if present and well-formed.
    fn load(&self, req: &HttpRequest) -> Option<Secret>;

    /// Persist `secret` on the outgoing response.
    fn save(&self, res: &mut HttpResponse, secret: &Secret) -> Result<()>;
}

/// Keeps the secret in a cookie on the client.
#[derive(Debug, Clone)]
pub struct CookieTokenStore {
    name: String,
    path: String,
    domain: Option<String>,
    max_age: i64,
    secure: bool,
    http_only: bool,
    same_site: Option<cookie::SameSite>,
}

impl CookieTokenStore {
    pub fn from_config(config: &CsrfConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            path: config.cookie_path.clone(),
            domain: config.cookie_domain.clone(),
            max_age: config.cookie_max_age,
            secure: config.cookie_secure,
            http_only: config.cookie_http_only,
            same_site: config.cookie_same_site.map(Into::into),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `Set-Cookie` value for `secret`.
    pub fn cookie(&self, secret: &Secret) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), secret.as_str().to_owned()))
            .path(self.path.clone())
            .max_age(Duration::seconds(self.max_age))
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }

        builder.build()
    }
}

impl TokenStore for CookieTokenStore {
    fn load(&self, req: &HttpRequest) -> Option<Secret> {
        let raw = req.cookie(&self.name)?;
        let secret = Secret::parse(&raw);
        if secret.is_none() {
            debug!(cookie = %self.name, "Discarding malformed CSRF cookie");
        }
        secret
    }

    fn save(&self, res: &mut HttpResponse, secret: &Secret) -> Result<()> {
        res.set_cookie(&self.cookie(secret))
            .map_err(|e| CsrfError::Store(e.to_string()))
    }
}

/// Build the store selected by `config.backend`.
pub fn store_for(config: &CsrfConfig) -> Result<Arc<dyn TokenStore>> {
    match config.backend {
        StoreBackend::Cookie => Ok(Arc::new(CookieTokenStore::from_config(config))),
        StoreBackend::Session => Err(CsrfError::NotImplemented("session-backed token storage")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SameSite;

    #[test]
    fn test_backend_parse() {
        assert_eq!(StoreBackend::parse("Cookie"), Some(StoreBackend::Cookie));
        assert_eq!(StoreBackend::parse(" session "), Some(StoreBackend::Session));
        assert_eq!(StoreBackend::parse("redis"), None);
        assert_eq!(StoreBackend::default().as_str(), "cookie");
    }

    #[test]
    fn test_session_backend_not_implemented() {
        let config = CsrfConfig::default().with_backend(StoreBackend::Session);
        assert!(matches!(store_for(&config), Err(CsrfError::NotImplemented(_))));
    }

    #[test]
    fn test_load_valid_cookie() {
        let store = CookieTokenStore::from_config(&CsrfConfig::default());
        let secret = Secret::generate().unwrap();
        let req = HttpRequest::get("/").with_cookie("CSRFToken", secret.as_str());
        assert_eq!(store.load(&req), Some(secret));
    }

    #[test]
    fn test_load_ignores_malformed_cookie() {
        let store = CookieTokenStore::from_config(&CsrfConfig::default());

        let short = HttpRequest::get("/").with_cookie("CSRFToken", "abc");
        assert!(store.load(&short).is_none());

        let foreign = HttpRequest::get("/").with_cookie("CSRFToken", &"+".repeat(32));
        assert!(store.load(&foreign).is_none());

        let missing = HttpRequest::get("/").with_cookie("other", &"A".repeat(32));
        assert!(store.load(&missing).is_none());
    }

    #[test]
    fn test_default_cookie_attributes() {
        let store = CookieTokenStore::from_config(&CsrfConfig::default());
        let secret = Secret::generate().unwrap();
        let cookie = store.cookie(&secret);

        assert_eq!(cookie.name(), "CSRFToken");
        assert_eq!(cookie.value(), secret.as_str());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
        assert_ne!(cookie.secure(), Some(true));
        assert_ne!(cookie.http_only(), Some(true));
        assert!(cookie.same_site().is_none());
        assert!(cookie.domain().is_none());
    }

    #[test]
    fn test_configured_cookie_attributes() {
        let config = CsrfConfig::default()
            .with_cookie_name("xsrf")
            .with_cookie_domain("example.com")
            .with_cookie_secure(true)
            .with_cookie_http_only(true)
            .with_cookie_same_site(SameSite::Strict)
            .with_cookie_max_age(60);
        let store = CookieTokenStore::from_config(&config);
        let cookie = store.cookie(&Secret::generate().unwrap());

        assert_eq!(cookie.name(), "xsrf");
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(cookie::SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));
    }

    #[test]
    fn test_save_sets_cookie_header() {
        let store = CookieTokenStore::from_config(&CsrfConfig::default());
        let secret = Secret::generate().unwrap();
        let mut res = HttpResponse::ok();
        store.save(&mut res, &secret).unwrap();

        let cookies = res.cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name(), "CSRFToken");
        assert_eq!(cookies[0].value(), secret.as_str());
    }
}
