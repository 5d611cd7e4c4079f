//! The routing table built from a set of operations.
//!
//! [`ApiBuilder::build`] is where the pieces meet: each operation is resolved,
//! its handler is wrapped in a [`ResponseValidator`], and the result is
//! registered under the operation's method and path. Any resolution failure
//! aborts the build, so a misconfigured specification never serves traffic.

use std::sync::Arc;

use http::StatusCode;
use tracing::info;

use crate::error::Result;
use crate::operation::Operation;
use crate::request::Request;
use crate::resolver::Resolver;
use crate::response::Response;
use crate::router::Router;
use crate::validator::ResponseValidator;

/// Resolved, validated routes for a set of operations.
pub struct Api {
    router: Router,
    operation_ids: Vec<String>,
}

impl Api {
    pub fn builder(resolver: impl Into<Resolver>) -> ApiBuilder {
        ApiBuilder {
            resolver: resolver.into(),
            mimetype: "application/json".to_owned(),
            validate_responses: true,
            operations: Vec::new(),
        }
    }

    /// Operation ids in registration order.
    pub fn operation_ids(&self) -> &[String] {
        &self.operation_ids
    }

    /// Routes one request. Unknown method/path pairs get `404 Not Found`.
    pub async fn dispatch(&self, req: Request) -> Response {
        match self.router.lookup(req.method(), req.path()) {
            Some((handler, params)) => handler.call(req.with_params(params)).await,
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

/// Configures and builds an [`Api`].
///
/// Defaults: mimetype `application/json`, response validation on.
pub struct ApiBuilder {
    resolver: Resolver,
    mimetype: String,
    validate_responses: bool,
    operations: Vec<Operation>,
}

impl ApiBuilder {
    /// Mimetype assumed for operations that do not list `produces`.
    pub fn mimetype(mut self, mimetype: &str) -> Self {
        self.mimetype = mimetype.to_owned();
        self
    }

    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn build(self) -> Result<Api> {
        let mut router = Router::new();
        let mut operation_ids = Vec::with_capacity(self.operations.len());

        for operation in self.operations {
            let resolution = self.resolver.resolve(&operation)?;
            let operation = Arc::new(operation);

            let mut handler = Arc::clone(resolution.function());
            if self.validate_responses {
                let mimetype = operation
                    .produces()
                    .first()
                    .map_or_else(|| self.mimetype.clone(), |m| (*m).to_owned());
                let validator = ResponseValidator::new(Arc::clone(&operation), &mimetype)?;
                handler = Arc::new(validator).wrap(handler);
            }

            router.insert(operation.method().clone(), operation.path(), handler)?;
            operation_ids.push(resolution.operation_id().to_owned());
        }

        info!(
            routes = operation_ids.len(),
            validate_responses = self.validate_responses,
            "api routes built"
        );
        Ok(Api { router, operation_ids })
    }
}
