use crate::config::CsrfConfig;
use crate::context::CsrfContext;
use crate::error::CsrfError;
use crate::store::{self, TokenStore};
use crate::token::Secret;
use crate::verify::TokenState;
use async_trait::async_trait;
use palisade_core::{Error as CoreError, HttpRequest, HttpResponse, Middleware, Next};
use palisade_log::{debug, info, trace};
use std::sync::Arc;

/// Body of the 403 response when verbose failures are enabled
pub const FAILURE_MESSAGE: &str = "CSRF verification failed! Request aborted.";

/// CSRF protection middleware
#[derive(Clone)]
pub struct CsrfMiddleware {
    config: Arc<CsrfConfig>,
    store: Arc<dyn TokenStore>,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware
    ///
    /// Fails if the configuration is invalid or names a backend that is not
    /// available.
    pub fn new(config: CsrfConfig) -> Result<Self, CsrfError> {
        config.validate()?;
        let store = store::store_for(&config)?;

        info!(
            backend = config.backend.as_str(),
            cookie = %config.cookie_name,
            header = %config.header_name,
            verbose_failures = config.verbose_failures,
            "CSRF protection enabled"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// Replace the token store
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Check if request needs CSRF protection
    pub fn needs_protection(&self, request: &HttpRequest) -> bool {
        let method = request.method.as_str();
        if !self
            .config
            .protected_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
        {
            return false;
        }

        !self
            .config
            .exclude_paths
            .iter()
            .any(|excluded| request.path.starts_with(excluded.as_str()))
    }

    /// Token supplied by the client: form field first, then header.
    ///
    /// The form field is read from URL-encoded and multipart bodies. Empty
    /// values count as absent.
    pub async fn request_token(&self, request: &HttpRequest) -> Option<String> {
        let field = request
            .form_value(&self.config.field_name)
            .await
            .filter(|v| !v.is_empty());
        if field.is_some() {
            return field;
        }

        request
            .header(&self.config.header_name)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    /// Load the stored secret, issuing one if needed, and attach the context.
    fn prepare(&self, request: &mut HttpRequest) -> Result<(TokenState, CsrfContext), CsrfError> {
        let stored = self.store.load(request);
        let state = TokenState::begin(stored.as_ref());

        let (secret, state, persist) = match stored {
            Some(secret) => (secret, state, false),
            None => {
                debug!(path = %request.path, "Issuing new CSRF secret");
                (Secret::generate()?, state.issue(), true)
            }
        };

        let context = CsrfContext::new(secret, persist, &self.config.field_name);
        request.extensions.insert(context.clone());
        Ok((state, context))
    }

    fn persist(&self, context: &CsrfContext, response: &mut HttpResponse) -> Result<(), CsrfError> {
        if let Some(secret) = context.take_pending() {
            self.store.save(response, &secret)?;
        }
        Ok(())
    }

    fn rejection(&self) -> HttpResponse {
        if self.config.verbose_failures {
            HttpResponse::text(FAILURE_MESSAGE).with_status(403)
        } else {
            HttpResponse::forbidden()
        }
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, CoreError> {
        let (state, context) = self.prepare(&mut req)?;

        if self.needs_protection(&req) {
            let supplied = self.request_token(&req).await;
            let state = state.check(supplied.as_deref(), &context.secret());

            if !state.allows_request() {
                debug!(
                    method = %req.method,
                    path = %req.path,
                    "CSRF verification failed"
                );
                let mut response = self.rejection();
                self.persist(&context, &mut response)?;
                return Ok(response);
            }

            trace!(method = %req.method, path = %req.path, "CSRF token verified");
        }

        match next(req).await {
            Ok(mut response) => {
                self.persist(&context, &mut response)?;
                Ok(response)
            }
            // A pending secret must reach the client even when the handler fails.
            Err(error) => match context.take_pending() {
                Some(secret) => {
                    let mut response = error.to_response();
                    self.store.save(&mut response, &secret)?;
                    debug!(status = response.status, "Handler failed, CSRF cookie kept");
                    Ok(response)
                }
                None => Err(error),
            },
        }
    }
}
