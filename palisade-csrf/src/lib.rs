//! # Palisade CSRF Protection
//!
//! Cross-Site Request Forgery protection for Palisade applications.
//!
//! Each client gets a 32-symbol secret, persisted in a cookie. Pages embed a
//! 64-symbol *masked* form of it: a fresh random salt followed by the secret
//! shifted symbol by symbol by that salt. Every rendered token is different,
//! yet all of them unmask to the same secret. POST, PUT and DELETE requests
//! must send one back in the `csrftoken` form field or the `X-CSRFToken`
//! header; anything else is answered with `403 Forbidden`.
//!
//! ## Features
//!
//! - **Masked tokens** - per-render salts, constant-time verification
//! - **Cookie store** - name, path, domain, SameSite, secure and HttpOnly are configurable
//! - **Middleware integration** - plugs into [`palisade_core::MiddlewareChain`]
//! - **Template helpers** - [`csrf_token`] and [`csrf_html`] for handlers
//! - **Path exclusion** - skip verification below configured prefixes
//! - **Rotation** - [`CsrfContext::rotate`] issues a new secret mid-request
//!
//! ## Quick Start
//!
//! ```rust
//! use palisade_csrf::{CsrfConfig, CsrfMiddleware, SameSite};
//!
//! let config = CsrfConfig::default()
//!     .with_cookie_max_age(3600)
//!     .with_cookie_same_site(SameSite::Lax);
//!
//! let csrf = CsrfMiddleware::new(config).unwrap();
//! assert_eq!(csrf.config().cookie_name, "CSRFToken");
//! ```
//!
//! ## Masking
//!
//! ```rust
//! use palisade_csrf::{Secret, mask, unmask, verify_token};
//!
//! let secret = Secret::generate().unwrap();
//! let a = mask(&secret).unwrap();
//! let b = mask(&secret).unwrap();
//!
//! assert_ne!(a, b);
//! assert_eq!(unmask(&a), secret);
//! assert!(verify_token(b.as_str(), secret.as_str()));
//! ```
//!
//! ## Usage in a handler
//!
//! ```rust
//! use palisade_core::{Error, HttpRequest, HttpResponse, MiddlewareChain, handler};
//! use palisade_csrf::{CsrfConfig, CsrfMiddleware, csrf_html};
//!
//! # tokio_test::block_on(async {
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(CsrfMiddleware::new(CsrfConfig::default()).unwrap());
//!
//! let form = handler(|req: HttpRequest| async move {
//!     let field = csrf_html(&req)?;
//!     Ok::<_, Error>(HttpResponse::html(format!(r#"<form method="post">{field}</form>"#)))
//! });
//!
//! let res = chain.apply(HttpRequest::get("/form"), form).await.unwrap();
//! assert!(res.body_text().contains(r#"name="csrftoken""#));
//! assert_eq!(res.cookies()[0].name(), "CSRFToken");
//! # });
//! ```

pub mod alphabet;
pub mod config;
pub mod context;
pub mod error;
pub mod html;
pub mod mask;
pub mod middleware;
pub mod store;
pub mod token;
pub mod verify;

pub use config::{CsrfConfig, SameSite};
pub use context::{CsrfContext, csrf_html, csrf_token};
pub use error::{CsrfError, Result};
pub use mask::{mask, mask_with_salt, unmask};
pub use middleware::{CsrfMiddleware, FAILURE_MESSAGE};
pub use store::{CookieTokenStore, StoreBackend, TokenStore, store_for};
pub use token::{MASKED_TOKEN_LEN, MaskedToken, SALT_LEN, SECRET_LEN, Salt, Secret};
pub use verify::{TokenState, verify_token};
