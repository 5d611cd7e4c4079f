//! Operation resolution.
//!
//! Resolving an operation is two independent steps:
//!
//! 1. derive an **operation id** from the specification fragment, then
//! 2. look that id up to get a **handler**.
//!
//! The three strategies differ in one step or the other:
//!
//! | Strategy | Id from | Handler from |
//! |---|---|---|
//! | [`Resolver::Default`] | `operationId` (+ router controller) | a [`FunctionResolver`] |
//! | [`Resolver::Resty`] | REST conventions when no `operationId` | a [`FunctionResolver`] |
//! | [`Resolver::Object`] | controller + `operationId` or path | registered controllers |
//!
//! Resolution runs once per route, before any traffic. Every failure is a
//! [`ResolverError`] and is meant to abort startup.

mod function;
mod object;
mod resty;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{LookupError, ResolverError};
use crate::handler::BoxedHandler;
use crate::operation::Operation;

pub use function::{FunctionResolver, HandlerRegistry};
pub use object::{ControllerRegistry, ObjectResolver};
pub use resty::RestyResolver;

/// A resolved handler and the operation id that found it.
#[derive(Clone)]
pub struct Resolution {
    function: BoxedHandler,
    operation_id: String,
}

impl Resolution {
    pub fn new(function: BoxedHandler, operation_id: String) -> Self {
        Self { function, operation_id }
    }

    pub fn function(&self) -> &BoxedHandler { &self.function }
    pub fn operation_id(&self) -> &str { &self.operation_id }

    pub fn into_function(self) -> BoxedHandler {
        self.function
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

/// Strategy turning an [`Operation`] into a [`Resolution`].
///
/// ```rust
/// use http::Method;
/// use opresolve::{HandlerRegistry, Operation, Request, Resolver};
/// use serde_json::json;
///
/// async fn list_pets(_req: Request) -> &'static str { "[]" }
///
/// let resolver = Resolver::new(HandlerRegistry::new().register("api.pets.list", list_pets));
/// let op = Operation::new(
///     Method::GET,
///     "/pets",
///     json!({"operationId": "list", "x-swagger-router-controller": "api.pets"}),
/// );
///
/// let resolution = resolver.resolve(&op).unwrap();
/// assert_eq!(resolution.operation_id(), "api.pets.list");
/// ```
#[derive(Clone)]
pub enum Resolver {
    Default(Arc<dyn FunctionResolver>),
    Resty(RestyResolver),
    Object(ObjectResolver),
}

impl Resolver {
    /// The default strategy over the given function resolver.
    pub fn new(functions: impl FunctionResolver + 'static) -> Self {
        Self::Default(Arc::new(functions))
    }

    pub fn resolve(&self, operation: &Operation) -> Result<Resolution, ResolverError> {
        let operation_id = self.resolve_operation_id(operation)?;
        let function = self.resolve_function_from_operation_id(&operation_id)?;
        debug!(
            operation_id = %operation_id,
            method = %operation.method(),
            path = operation.path(),
            "operation resolved"
        );
        Ok(Resolution::new(function, operation_id))
    }

    pub fn resolve_operation_id(&self, operation: &Operation) -> Result<String, ResolverError> {
        match self {
            Self::Default(_) => Ok(default_operation_id(operation)),
            Self::Resty(resty) => Ok(resty.resolve_operation_id(operation)),
            Self::Object(object) => object.resolve_operation_id(operation),
        }
    }

    pub fn resolve_function_from_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<BoxedHandler, ResolverError> {
        match self {
            Self::Default(functions) => lookup(functions.as_ref(), operation_id),
            Self::Resty(resty) => lookup(resty.functions(), operation_id),
            Self::Object(object) => object.resolve_function_from_operation_id(operation_id),
        }
    }
}

impl From<RestyResolver> for Resolver {
    fn from(resty: RestyResolver) -> Self {
        Self::Resty(resty)
    }
}

impl From<ObjectResolver> for Resolver {
    fn from(object: ObjectResolver) -> Self {
        Self::Object(object)
    }
}

/// `operationId`, prefixed with `x-swagger-router-controller` when present.
pub(crate) fn default_operation_id(operation: &Operation) -> String {
    let operation_id = operation.operation_id().unwrap_or_default();
    match operation.router_controller() {
        Some(controller) => format!("{controller}.{operation_id}"),
        None => operation_id.to_owned(),
    }
}

fn lookup(functions: &dyn FunctionResolver, operation_id: &str) -> Result<BoxedHandler, ResolverError> {
    functions.resolve_function(operation_id).map_err(|e| match e {
        LookupError::ModuleNotFound(_) => ResolverError::Import {
            operation_id: operation_id.to_owned(),
            source: e,
        },
        other => ResolverError::Lookup(other),
    })
}
