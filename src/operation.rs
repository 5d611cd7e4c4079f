//! Operation descriptors.
//!
//! An [`Operation`] is one method + path pair from an API specification,
//! together with its raw fragment (`operationId`, `responses`, vendor
//! extensions, ...). Loading and merging specification files happens
//! elsewhere; this crate only reads what the loader hands over.

use std::collections::HashSet;
use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::error::{Error, Result};

/// Vendor extension naming the controller (module) that owns an operation.
pub const ROUTER_CONTROLLER: &str = "x-swagger-router-controller";

/// One operation of an API specification. Immutable once built.
#[derive(Debug, Clone)]
pub struct Operation {
    method: Method,
    path: String,
    operation: Value,
    document: Arc<Value>,
}

impl Operation {
    /// `method` may be spelled the way specifications key operations
    /// (`"get"`); it is stored in its canonical uppercase form.
    pub fn new(method: Method, path: impl Into<String>, operation: Value) -> Self {
        Self {
            method: canonical_method(method),
            path: path.into(),
            operation,
            document: Arc::new(Value::Null),
        }
    }

    /// Attaches the specification document that `$ref` pointers refer into.
    pub fn with_document(mut self, document: Arc<Value>) -> Self {
        self.document = document;
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }

    /// The raw specification fragment for this operation.
    pub fn operation(&self) -> &Value { &self.operation }

    /// The specification document this operation belongs to.
    pub fn document(&self) -> &Value { &self.document }

    /// Lowercase HTTP verb, the form specifications key operations by.
    pub fn method_name(&self) -> String {
        self.method.as_str().to_ascii_lowercase()
    }

    /// A string-valued key of the fragment. Non-string values count as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.operation.get(key).and_then(Value::as_str)
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.get_str("operationId")
    }

    pub fn router_controller(&self) -> Option<&str> {
        self.get_str(ROUTER_CONTROLLER)
    }

    /// Mimetypes listed under `produces`, in declaration order.
    pub fn produces(&self) -> Vec<&str> {
        self.operation
            .get("produces")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Follows `$ref` pointers until a concrete object is reached.
    ///
    /// Only document-local references (`#/...`) are supported. A value
    /// without `$ref` is returned as-is.
    pub fn resolve_reference<'a>(&'a self, mut obj: &'a Value) -> Result<&'a Value> {
        let mut seen = HashSet::new();
        while let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            if !seen.insert(reference) {
                return Err(Error::Reference(reference.to_owned()));
            }
            obj = reference
                .strip_prefix('#')
                .and_then(|pointer| self.document.pointer(pointer))
                .ok_or_else(|| Error::Reference(reference.to_owned()))?;
        }
        Ok(obj)
    }
}

// `Method::from_bytes(b"get")` is an extension method, not `Method::GET`.
fn canonical_method(method: Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    if upper == method.as_str() {
        return method;
    }
    Method::from_bytes(upper.as_bytes()).unwrap_or(method)
}
