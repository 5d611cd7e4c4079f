//! Controllers: stateful objects that group operation handlers by name.
//!
//! A controller binds its operations once, when it is registered, into an
//! [`Operations`] table. Lookups afterwards are plain map reads; there is no
//! reflection and no per-request work.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! use opresolve::{Controller, Operations, Request};
//!
//! struct GreetingController {
//!     was_called: AtomicBool,
//! }
//!
//! impl GreetingController {
//!     fn post_greeting(&self, req: &Request) -> String {
//!         self.was_called.store(true, Ordering::SeqCst);
//!         format!("Hello {}", req.param("name").unwrap_or("stranger"))
//!     }
//! }
//!
//! impl Controller for GreetingController {
//!     fn controller_name(&self) -> &str { "greeting" }
//!
//!     fn operations(self: Arc<Self>) -> Operations {
//!         Operations::new().on("post_greeting", move |req: Request| {
//!             let this = Arc::clone(&self);
//!             async move { this.post_greeting(&req) }
//!         })
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ResolverError;
use crate::handler::{BoxedHandler, Handler};

/// An object exposing named operation handlers.
///
/// Any state lives on the implementor; handlers run concurrently, so that
/// state must be safe to share (atomics, locks).
pub trait Controller: Send + Sync + 'static {
    /// Key the controller is registered under.
    fn controller_name(&self) -> &str;

    /// Binds this instance's operations by name.
    fn operations(self: Arc<Self>) -> Operations;
}

/// Name → handler table produced by [`Controller::operations`].
#[derive(Clone, Default)]
pub struct Operations {
    handlers: HashMap<String, BoxedHandler>,
}

impl Operations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under an operation name. Returns `self` for chaining.
    pub fn on(mut self, name: &str, handler: impl Handler) -> Self {
        self.handlers.insert(name.to_owned(), handler.into_boxed_handler());
        self
    }

    pub fn get(&self, name: &str) -> Option<BoxedHandler> {
        self.handlers.get(name).map(Arc::clone)
    }

    pub fn len(&self) -> usize { self.handlers.len() }
    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }
}

/// A registered controller with its operations already bound.
#[derive(Clone)]
pub struct BoundController {
    type_name: &'static str,
    operations: Operations,
}

impl BoundController {
    pub fn bind<C: Controller>(controller: Arc<C>) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<C>()),
            operations: controller.operations(),
        }
    }

    /// Unqualified type name of the controller, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the handler bound to `operation`.
    pub fn get_method_for_operation(&self, operation: &str) -> Result<BoxedHandler, ResolverError> {
        self.operations.get(operation).ok_or_else(|| ResolverError::MethodNotFound {
            controller_type: self.type_name.to_owned(),
            operation: operation.to_owned(),
        })
    }
}

// `my_app::api::GreetingController` → `GreetingController`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}
