use crate::error::{CsrfError, Result};
use crate::store::StoreBackend;
use palisade_core::HeaderName;
use serde::{Deserialize, Serialize};
use std::env;

/// Default name of the cookie holding the secret
pub const DEFAULT_COOKIE_NAME: &str = "CSRFToken";

/// Default header carrying the masked token
pub const DEFAULT_HEADER_NAME: &str = "X-CSRFToken";

/// Default form field carrying the masked token
pub const DEFAULT_FIELD_NAME: &str = "csrftoken";

/// Default cookie lifetime: one day
pub const DEFAULT_COOKIE_MAX_AGE: i64 = 86400;

const ENV_PREFIX: &str = "PALISADE_CSRF";

/// CSRF protection configuration
///
/// Built once at startup and handed to [`crate::CsrfMiddleware::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Cookie (or session key) holding the unmasked secret
    pub cookie_name: String,

    /// Header checked when the form field is absent
    pub header_name: String,

    /// Form field checked first
    pub field_name: String,

    /// Cookie max-age in seconds
    pub cookie_max_age: i64,

    /// Cookie path
    pub cookie_path: String,

    /// Cookie domain
    pub cookie_domain: Option<String>,

    /// Cookie secure flag (HTTPS only)
    pub cookie_secure: bool,

    /// Cookie HttpOnly flag
    pub cookie_http_only: bool,

    /// Cookie SameSite policy
    pub cookie_same_site: Option<SameSite>,

    /// Where the secret is persisted
    pub backend: StoreBackend,

    /// Methods that require a valid token
    pub protected_methods: Vec<String>,

    /// Path prefixes exempt from verification
    pub exclude_paths: Vec<String>,

    /// Explain rejections in the 403 body
    pub verbose_failures: bool,
}

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            cookie_max_age: DEFAULT_COOKIE_MAX_AGE,
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_secure: false,
            cookie_http_only: false,
            cookie_same_site: None,
            backend: StoreBackend::Cookie,
            protected_methods: vec!["POST".to_string(), "PUT".to_string(), "DELETE".to_string()],
            exclude_paths: Vec::new(),
            verbose_failures: palisade_log::is_debug_enabled(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, key)).ok()
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match env_var(key) {
        None => Ok(None),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(CsrfError::Env(format!(
                "{}_{} must be a boolean, got '{}'",
                ENV_PREFIX, key, value
            ))),
        },
    }
}

impl CsrfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from defaults and apply `PALISADE_CSRF_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(name) = env_var("COOKIE_NAME") {
            config.cookie_name = name;
        }
        if let Some(name) = env_var("HEADER_NAME") {
            config.header_name = name;
        }
        if let Some(name) = env_var("FIELD_NAME") {
            config.field_name = name;
        }
        if let Some(age) = env_var("COOKIE_AGE") {
            config.cookie_max_age = age.trim().parse().map_err(|_| {
                CsrfError::Env(format!(
                    "{}_COOKIE_AGE must be a number of seconds, got '{}'",
                    ENV_PREFIX, age
                ))
            })?;
        }
        if let Some(backend) = env_var("BACKEND") {
            config.backend = StoreBackend::parse(&backend).ok_or_else(|| {
                CsrfError::Env(format!(
                    "{}_BACKEND must be 'cookie' or 'session', got '{}'",
                    ENV_PREFIX, backend
                ))
            })?;
        }
        if let Some(same_site) = env_var("COOKIE_SAME_SITE") {
            config.cookie_same_site = Some(SameSite::parse(&same_site).ok_or_else(|| {
                CsrfError::Env(format!(
                    "{}_COOKIE_SAME_SITE must be strict, lax or none, got '{}'",
                    ENV_PREFIX, same_site
                ))
            })?);
        }
        if let Some(secure) = env_bool("COOKIE_SECURE")? {
            config.cookie_secure = secure;
        }
        if let Some(http_only) = env_bool("COOKIE_HTTP_ONLY")? {
            config.cookie_http_only = http_only;
        }
        if let Some(debug) = env_bool("DEBUG")? {
            config.verbose_failures = debug;
        }

        Ok(config)
    }

    /// Check names and lifetimes before the middleware is built.
    pub fn validate(&self) -> Result<()> {
        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
        {
            return Err(CsrfError::Configuration(format!(
                "cookie name '{}' is not a valid cookie token",
                self.cookie_name
            )));
        }

        if HeaderName::try_from(self.header_name.as_str()).is_err() {
            return Err(CsrfError::Configuration(format!(
                "header name '{}' is not a valid HTTP header",
                self.header_name
            )));
        }

        if self.field_name.is_empty() {
            return Err(CsrfError::Configuration(
                "form field name must not be empty".to_string(),
            ));
        }

        if self.cookie_max_age <= 0 {
            return Err(CsrfError::Configuration(format!(
                "cookie max-age must be positive, got {}",
                self.cookie_max_age
            )));
        }

        if self.protected_methods.is_empty() {
            return Err(CsrfError::Configuration(
                "at least one protected method is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Set cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set header name
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set cookie max-age in seconds
    pub fn with_cookie_max_age(mut self, seconds: i64) -> Self {
        self.cookie_max_age = seconds;
        self
    }

    /// Set cookie path
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set cookie domain
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Set cookie secure flag
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Set cookie HttpOnly flag
    pub fn with_cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    /// Set cookie SameSite policy
    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = Some(same_site);
        self
    }

    /// Select the storage backend
    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the methods that require verification
    pub fn with_protected_methods(mut self, methods: Vec<String>) -> Self {
        self.protected_methods = methods;
        self
    }

    /// Exempt path prefixes from verification
    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    /// Explain rejections in the response body
    pub fn with_verbose_failures(mut self, verbose: bool) -> Self {
        self.verbose_failures = verbose;
        self
    }
}
