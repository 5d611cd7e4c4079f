//! Operation resolution against registered controller instances.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::controller::{BoundController, Controller};
use crate::error::{LookupError, ResolverError};
use crate::handler::BoxedHandler;
use crate::operation::Operation;

/// Controllers keyed by their declared name.
///
/// Owned by whoever builds the routes and handed to [`ObjectResolver::new`].
/// Registering a second controller under an existing name replaces the first.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, BoundController>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under [`Controller::controller_name`].
    pub fn add_controller<C: Controller>(&mut self, controller: Arc<C>) {
        let name = controller.controller_name().to_owned();
        let bound = BoundController::bind(controller);
        if let Some(previous) = self.controllers.insert(name.clone(), bound) {
            warn!(
                controller = %name,
                replaced = previous.type_name(),
                "controller name registered twice, keeping the latest"
            );
        }
    }

    /// Chaining form of [`add_controller`](Self::add_controller).
    pub fn with_controller<C: Controller>(mut self, controller: Arc<C>) -> Self {
        self.add_controller(controller);
        self
    }

    pub fn get(&self, name: &str) -> Option<&BoundController> {
        self.controllers.get(name)
    }

    pub fn len(&self) -> usize { self.controllers.len() }
    pub fn is_empty(&self) -> bool { self.controllers.is_empty() }

    /// The only registered name, if exactly one controller is registered.
    fn sole_name(&self) -> Option<&str> {
        match self.controllers.len() {
            1 => self.controllers.keys().next().map(String::as_str),
            _ => None,
        }
    }

    /// Splits `controller.method` on the longest registered controller name.
    fn split_operation_id<'a>(&self, operation_id: &'a str) -> Option<(&BoundController, &'a str)> {
        self.controllers
            .iter()
            .filter_map(|(name, controller)| {
                let method = operation_id.strip_prefix(name.as_str())?.strip_prefix('.')?;
                Some((name.len(), controller, method))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, controller, method)| (controller, method))
    }
}

/// Resolves operations to bound methods of registered controllers.
///
/// Ids have the form `controller.method`. The controller is taken from
/// `x-swagger-router-controller`, or inferred when exactly one controller is
/// registered. The method is the `operationId`, or `{method}_{path}` without
/// one (`POST /greeting` → `post_greeting`).
#[derive(Clone, Default)]
pub struct ObjectResolver {
    controllers: ControllerRegistry,
}

impl ObjectResolver {
    pub fn new(controllers: ControllerRegistry) -> Self {
        Self { controllers }
    }

    pub fn add_controller<C: Controller>(&mut self, controller: Arc<C>) {
        self.controllers.add_controller(controller);
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn resolve_operation_id(&self, operation: &Operation) -> Result<String, ResolverError> {
        let controller_name = match operation.router_controller() {
            Some(controller) if !controller.is_empty() => controller,
            _ => self.controllers.sole_name().ok_or(ResolverError::AmbiguousController)?,
        };

        let method_name = match operation.operation_id() {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => Self::method_from_operation(operation),
        };

        Ok(format!("{controller_name}.{method_name}"))
    }

    /// `{method}_{path}` with the path's outer slashes trimmed.
    ///
    /// Inner slashes and template braces are kept: `GET /pets/{id}` gives
    /// `get_pets/{id}`, which a controller can still bind verbatim.
    pub fn method_from_operation(operation: &Operation) -> String {
        format!("{}_{}", operation.method_name(), operation.path().trim_matches('/'))
    }

    pub fn resolve_function_from_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<BoxedHandler, ResolverError> {
        let (controller, method) = match self.controllers.split_operation_id(operation_id) {
            Some(found) => found,
            None => {
                let (name, _) = operation_id
                    .rsplit_once('.')
                    .ok_or_else(|| LookupError::Malformed(operation_id.to_owned()))?;
                return Err(ResolverError::ControllerNotFound(name.to_owned()));
            }
        };
        controller.get_method_for_operation(method)
    }
}
