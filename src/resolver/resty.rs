//! Operation ids from REST conventions.

use std::sync::{Arc, LazyLock};

use http::Method;
use regex::Regex;

use crate::operation::Operation;
use crate::resolver::{FunctionResolver, default_operation_id};

/// Leading resource segment, any slashes after it, and whatever follows.
static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^/?(?P<resource_name>[\w\-]*)(?P<trailing_slash>/*)(?P<extended_path>.*)$")
        .expect("path pattern is a valid regex")
});

/// Derives operation ids from the path and method when the specification
/// does not declare an `operationId`.
///
/// | Method | Path | Id (default module `api`) |
/// |---|---|---|
/// | `GET` | `/pets` | `api.pets.search` |
/// | `GET` | `/pets/{id}` | `api.pets.get` |
/// | `POST` | `/pets` | `api.pets.post` |
/// | `GET` | `/` | `api.get` |
#[derive(Clone)]
pub struct RestyResolver {
    functions: Arc<dyn FunctionResolver>,
    default_module_name: String,
    collection_endpoint_name: String,
}

impl RestyResolver {
    pub fn new(default_module_name: &str, functions: impl FunctionResolver + 'static) -> Self {
        Self {
            functions: Arc::new(functions),
            default_module_name: default_module_name.to_owned(),
            collection_endpoint_name: "search".to_owned(),
        }
    }

    /// Function name used for `GET` on a collection root. Defaults to `search`.
    pub fn collection_endpoint_name(mut self, name: &str) -> Self {
        self.collection_endpoint_name = name.to_owned();
        self
    }

    pub(crate) fn functions(&self) -> &dyn FunctionResolver {
        self.functions.as_ref()
    }

    /// An explicit, non-empty `operationId` wins; otherwise REST semantics apply.
    pub fn resolve_operation_id(&self, operation: &Operation) -> String {
        match operation.operation_id() {
            Some(id) if !id.is_empty() => default_operation_id(operation),
            _ => self.resolve_operation_id_using_rest_semantics(operation),
        }
    }

    pub fn resolve_operation_id_using_rest_semantics(&self, operation: &Operation) -> String {
        let captures = PATH_PATTERN.captures(operation.path());
        let group = |name: &str| {
            captures
                .as_ref()
                .and_then(|c| c.name(name))
                .map_or("", |m| m.as_str())
        };
        let resource_name = group("resource_name");
        let extended_path = group("extended_path");

        let controller_name = match operation.router_controller() {
            Some(controller) if !controller.is_empty() => controller.to_owned(),
            _ if !resource_name.is_empty() => format!(
                "{}.{}",
                self.default_module_name,
                resource_name.replace('-', "_")
            ),
            _ => self.default_module_name.clone(),
        };

        let is_collection_endpoint = *operation.method() == Method::GET
            && !resource_name.is_empty()
            && extended_path.is_empty();

        let function_name = if is_collection_endpoint {
            self.collection_endpoint_name.clone()
        } else {
            operation.method_name()
        };

        format!("{controller_name}.{function_name}")
    }
}
