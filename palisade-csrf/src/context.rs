//! Request-scoped CSRF state shared between the middleware and handlers.

use crate::error::{CsrfError, Result};
use crate::html;
use crate::mask;
use crate::token::{MaskedToken, Secret};
use palisade_core::HttpRequest;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

struct ContextState {
    secret: Secret,
    masked: Option<MaskedToken>,
    persist: bool,
}

/// Handle to the current request's secret and cached masked token.
///
/// The middleware attaches one to every request it sees. Clones share state,
/// so a token derived or a secret rotated in the handler is visible to the
/// middleware when it finishes the response.
#[derive(Clone)]
pub struct CsrfContext {
    inner: Arc<Mutex<ContextState>>,
    field_name: Arc<str>,
}

impl CsrfContext {
    pub(crate) fn new(secret: Secret, persist: bool, field_name: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ContextState {
                secret,
                masked: None,
                persist,
            })),
            field_name: Arc::from(field_name),
        }
    }

    /// Context attached to `req` by [`crate::CsrfMiddleware`].
    pub fn from_request(req: &HttpRequest) -> Option<&CsrfContext> {
        req.extensions.get::<CsrfContext>()
    }

    /// Masked form of the current secret.
    ///
    /// Computed on first use and cached, so every call within one request
    /// returns the same token.
    pub fn masked_token(&self) -> Result<MaskedToken> {
        let mut state = self.inner.lock();
        if let Some(token) = &state.masked {
            return Ok(token.clone());
        }
        let token = mask::mask(&state.secret)?;
        state.masked = Some(token.clone());
        Ok(token)
    }

    /// Hidden form field carrying [`Self::masked_token`].
    pub fn hidden_input(&self) -> Result<String> {
        let token = self.masked_token()?;
        Ok(html::hidden_input(&self.field_name, &token))
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Replace the secret, for example after a login.
    ///
    /// Tokens handed out earlier stop verifying. The new secret is persisted
    /// on the response.
    pub fn rotate(&self) -> Result<()> {
        let secret = Secret::generate()?;
        let mut state = self.inner.lock();
        state.secret = secret;
        state.masked = None;
        state.persist = true;
        Ok(())
    }

    pub(crate) fn secret(&self) -> Secret {
        self.inner.lock().secret.clone()
    }

    /// Secret still waiting to be written to the store, if any.
    pub(crate) fn take_pending(&self) -> Option<Secret> {
        let mut state = self.inner.lock();
        if state.persist {
            state.persist = false;
            Some(state.secret.clone())
        } else {
            None
        }
    }
}

impl fmt::Debug for CsrfContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CsrfContext")
            .field("field_name", &self.field_name)
            .field("has_masked", &state.masked.is_some())
            .field("persist", &state.persist)
            .finish()
    }
}

/// Current masked token for `req`.
pub fn csrf_token(req: &HttpRequest) -> Result<MaskedToken> {
    CsrfContext::from_request(req)
        .ok_or(CsrfError::MissingContext)?
        .masked_token()
}

/// Hidden form field for `req`.
pub fn csrf_html(req: &HttpRequest) -> Result<String> {
    CsrfContext::from_request(req)
        .ok_or(CsrfError::MissingContext)?
        .hidden_input()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_token;

    fn attached(secret: &Secret) -> HttpRequest {
        let mut req = HttpRequest::get("/form");
        req.extensions
            .insert(CsrfContext::new(secret.clone(), false, "csrftoken"));
        req
    }

    #[test]
    fn test_masked_token_is_idempotent() {
        let secret = Secret::generate().unwrap();
        let ctx = CsrfContext::new(secret.clone(), false, "csrftoken");

        let first = ctx.masked_token().unwrap();
        let second = ctx.masked_token().unwrap();
        assert_eq!(first, second);
        assert_eq!(mask::unmask(&first), secret);
    }

    #[test]
    fn test_clones_share_cache() {
        let ctx = CsrfContext::new(Secret::generate().unwrap(), false, "csrftoken");
        let clone = ctx.clone();
        assert_eq!(ctx.masked_token().unwrap(), clone.masked_token().unwrap());
    }

    #[test]
    fn test_hidden_input_uses_cached_token() {
        let ctx = CsrfContext::new(Secret::generate().unwrap(), false, "token_field");
        let html = ctx.hidden_input().unwrap();
        let token = ctx.masked_token().unwrap();
        assert!(html.contains(r#"name="token_field""#));
        assert!(html.contains(token.as_str()));
    }

    #[test]
    fn test_rotate_replaces_secret() {
        let original = Secret::generate().unwrap();
        let ctx = CsrfContext::new(original.clone(), false, "csrftoken");
        let before = ctx.masked_token().unwrap();
        assert!(ctx.take_pending().is_none());

        ctx.rotate().unwrap();
        let after = ctx.masked_token().unwrap();
        let rotated = ctx.secret();

        assert_ne!(rotated, original);
        assert_ne!(before, after);
        assert!(verify_token(after.as_str(), rotated.as_str()));
        assert!(!verify_token(before.as_str(), rotated.as_str()));
        assert_eq!(ctx.take_pending(), Some(rotated));
        assert!(ctx.take_pending().is_none());
    }

    #[test]
    fn test_request_helpers() {
        let secret = Secret::generate().unwrap();
        let req = attached(&secret);

        let token = csrf_token(&req).unwrap();
        assert!(verify_token(token.as_str(), secret.as_str()));
        assert!(csrf_html(&req).unwrap().contains(token.as_str()));
    }

    #[test]
    fn test_missing_context() {
        let req = HttpRequest::get("/");
        assert!(CsrfContext::from_request(&req).is_none());
        assert!(matches!(csrf_token(&req), Err(CsrfError::MissingContext)));
        assert!(matches!(csrf_html(&req), Err(CsrfError::MissingContext)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = Secret::parse(&"k".repeat(32)).unwrap();
        let ctx = CsrfContext::new(secret, true, "csrftoken");
        assert!(!format!("{:?}", ctx).contains("kkkk"));
    }
}
