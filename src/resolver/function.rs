//! Operation id → handler lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::LookupError;
use crate::handler::{BoxedHandler, Handler};

/// Maps an operation id to a handler.
///
/// Implemented by [`HandlerRegistry`] and by any
/// `Fn(&str) -> Result<BoxedHandler, LookupError>`.
pub trait FunctionResolver: Send + Sync {
    fn resolve_function(&self, operation_id: &str) -> Result<BoxedHandler, LookupError>;
}

impl<F> FunctionResolver for F
where
    F: Fn(&str) -> Result<BoxedHandler, LookupError> + Send + Sync,
{
    fn resolve_function(&self, operation_id: &str) -> Result<BoxedHandler, LookupError> {
        self(operation_id)
    }
}

/// Handlers keyed by dotted operation id, built once at startup.
///
/// Ids read as `module.name`: everything before the last dot is the module.
/// That split only matters for error reporting: a module nobody registered
/// under is a [`LookupError::ModuleNotFound`], a known module without the
/// requested name is a [`LookupError::NameNotFound`].
///
/// ```rust
/// use opresolve::{HandlerRegistry, Request};
///
/// async fn search(_req: Request) -> &'static str { "[]" }
/// async fn get(_req: Request) -> &'static str { "{}" }
///
/// let registry = HandlerRegistry::new()
///     .register("api.pets.search", search)
///     .register("api.pets.get", get);
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, BoxedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `operation_id`. Returns `self` for chaining.
    pub fn register(mut self, operation_id: &str, handler: impl Handler) -> Self {
        self.handlers.insert(operation_id.to_owned(), handler.into_boxed_handler());
        self
    }

    pub fn len(&self) -> usize { self.handlers.len() }
    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }

    fn has_module(&self, module: &str) -> bool {
        self.handlers.keys().any(|id| {
            id.strip_prefix(module).is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

impl FunctionResolver for HandlerRegistry {
    fn resolve_function(&self, operation_id: &str) -> Result<BoxedHandler, LookupError> {
        if operation_id.is_empty() {
            return Err(LookupError::Empty);
        }
        if let Some(handler) = self.handlers.get(operation_id) {
            return Ok(Arc::clone(handler));
        }

        let (module, name) = operation_id
            .rsplit_once('.')
            .filter(|(module, name)| !module.is_empty() && !name.is_empty())
            .ok_or_else(|| LookupError::Malformed(operation_id.to_owned()))?;

        if self.has_module(module) {
            Err(LookupError::NameNotFound { module: module.to_owned(), name: name.to_owned() })
        } else {
            Err(LookupError::ModuleNotFound(module.to_owned()))
        }
    }
}
