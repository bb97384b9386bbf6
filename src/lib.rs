// Palisade - CSRF protection for Rust web applications
//
// This library bundles the request model, the middleware chain and the CSRF
// middleware behind one dependency.

// Re-export core functionality
pub use palisade_core::*;

// Re-export logging
pub use palisade_log as log;

// Re-export optional crates
#[cfg(feature = "csrf")]
pub use palisade_csrf as csrf;

/// Everything a typical application needs
pub mod prelude {
    pub use crate::{
        Error, HttpRequest, HttpResponse, LoggerMiddleware, Method, Middleware, MiddlewareChain,
        Next, handler,
    };

    #[cfg(feature = "csrf")]
    pub use palisade_csrf::{
        CsrfConfig, CsrfContext, CsrfError, CsrfMiddleware, SameSite, StoreBackend, csrf_html,
        csrf_token,
    };
}
