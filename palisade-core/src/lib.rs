//! Request/response model and middleware chain shared by the Palisade crates.

pub mod error;
pub mod form;
pub mod http;
pub mod middleware;

pub use crate::http::{HttpRequest, HttpResponse};
pub use error::Error;
pub use middleware::{BoxFuture, HandlerFn, LoggerMiddleware, Middleware, MiddlewareChain, Next, handler};

// The `http` crate's method and header types appear in the public API.
pub use ::http::{HeaderMap, HeaderName, Method, header};
