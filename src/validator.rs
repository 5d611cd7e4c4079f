//! Response validation.
//!
//! [`ResponseValidator`] wraps a resolved handler. After the handler runs, the
//! response is checked against the operation's response definition for the
//! returned status code:
//!
//! - the body, decoded as JSON, must satisfy the definition's `schema`
//!   (only for JSON mimetypes and `text/plain`);
//! - every header named under `headers` must be present, by exact name.
//!
//! A mismatch never reaches the client as-is. The handler's response is
//! dropped and a `500` problem response describing the mismatch is returned
//! instead.
//!
//! Definitions under the `default` key are not consulted.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, ResponseError, Result};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::operation::Operation;
use crate::problem::problem;
use crate::request::Request;
use crate::response::Response;

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_mimetype(mimetype: &str) -> bool {
    let essence = mimetype.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// One response definition, ready to check against.
struct CompiledResponse {
    schema: Option<Validator>,
    headers: Vec<String>,
}

/// Validates handler responses for one `(operation, mimetype)` pair.
///
/// Built once per route; immutable afterwards and shared by every request to
/// that route. Schemas are compiled at construction, so a broken schema fails
/// route setup rather than a request.
///
/// ```rust
/// use std::sync::Arc;
///
/// use http::{Method, StatusCode};
/// use opresolve::{Operation, ResponseValidator};
/// use serde_json::json;
///
/// let op = Operation::new(Method::GET, "/greeting", json!({
///     "responses": {"200": {"schema": {
///         "type": "object",
///         "properties": {"greeting": {"type": "string"}},
///         "required": ["greeting"],
///     }}}
/// }));
/// let validator = ResponseValidator::new(Arc::new(op), "application/json").unwrap();
///
/// assert!(validator.validate_response(&json!({"greeting": "Hello Bob"}), StatusCode::OK, &[]).is_ok());
/// assert!(validator.validate_response(&json!({"greeting": 123}), StatusCode::OK, &[]).is_err());
/// ```
pub struct ResponseValidator {
    operation: Arc<Operation>,
    mimetype: String,
    responses: HashMap<String, CompiledResponse>,
}

impl ResponseValidator {
    pub fn new(operation: Arc<Operation>, mimetype: &str) -> Result<Self> {
        let validates_body = is_json_mimetype(mimetype) || mimetype == "text/plain";
        let mut responses = HashMap::new();

        let definitions = operation.operation().get("responses").and_then(Value::as_object);
        for (status, definition) in definitions.into_iter().flatten() {
            if status == "default" {
                debug!(path = operation.path(), "default response definitions are not validated");
                continue;
            }
            let definition = operation.resolve_reference(definition)?;

            let schema = match definition.get("schema") {
                Some(schema) if validates_body => Some(compile_schema(&operation, status, schema)?),
                _ => None,
            };
            let headers = definition
                .get("headers")
                .and_then(Value::as_object)
                .map(|headers| headers.keys().cloned().collect())
                .unwrap_or_default();

            responses.insert(status.clone(), CompiledResponse { schema, headers });
        }

        Ok(Self { operation, mimetype: mimetype.to_owned(), responses })
    }

    pub fn operation(&self) -> &Operation { &self.operation }
    pub fn mimetype(&self) -> &str { &self.mimetype }

    /// Checks `data`, `status_code` and `headers` against the definition
    /// declared for `status_code`. Statuses without a definition pass.
    ///
    /// `data` goes through a JSON encode/decode cycle first, so a custom
    /// [`Serialize`] type and the plain JSON it serializes to validate the
    /// same way.
    pub fn validate_response<T: Serialize + ?Sized>(
        &self,
        data: &T,
        status_code: StatusCode,
        headers: &[(String, String)],
    ) -> Result<(), ResponseError> {
        let Some(definition) = self.responses.get(status_code.as_str()) else {
            return Ok(());
        };
        if let Some(schema) = &definition.schema {
            let data = serde_json::to_value(data).map_err(|e| non_conforming_body(e.to_string()))?;
            check_body(schema, &data)?;
        }
        check_headers(&definition.headers, headers)
    }

    /// Checks a handler's response.
    pub fn validate(&self, response: &Response) -> Result<(), ResponseError> {
        let (body, status_code, headers) = response.full_response();
        let Some(definition) = self.responses.get(status_code.as_str()) else {
            return Ok(());
        };
        if let Some(schema) = &definition.schema {
            check_body(schema, &self.decode_body(body)?)?;
        }
        check_headers(&definition.headers, headers)
    }

    /// Wraps `handler` so every response it produces is validated.
    pub fn wrap(self: Arc<Self>, handler: BoxedHandler) -> BoxedHandler {
        Arc::new(Validated { inner: handler, validator: self })
    }

    fn decode_body(&self, body: &[u8]) -> Result<Value, ResponseError> {
        if !is_json_mimetype(&self.mimetype) {
            return Ok(Value::String(String::from_utf8_lossy(body).into_owned()));
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(body)
            .map_err(|e| non_conforming_body(format!("response body is not valid JSON: {e}")))
    }
}

impl fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("method", self.operation.method())
            .field("path", &self.operation.path())
            .field("mimetype", &self.mimetype)
            .finish_non_exhaustive()
    }
}

fn compile_schema(operation: &Operation, status: &str, schema: &Value) -> Result<Validator> {
    let mut schema = operation.resolve_reference(schema)?.clone();
    // Local `$ref`s inside the schema point into the whole document.
    if let Value::Object(map) = &mut schema {
        for key in ["definitions", "components"] {
            if let Some(shared) = operation.document().get(key) {
                map.entry(key).or_insert_with(|| shared.clone());
            }
        }
    }
    jsonschema::draft4::new(&schema).map_err(|e| Error::InvalidSchema {
        status: status.to_owned(),
        message: e.to_string(),
    })
}

fn check_body(schema: &Validator, data: &Value) -> Result<(), ResponseError> {
    match schema.iter_errors(data).next() {
        Some(error) => Err(non_conforming_body(error.to_string())),
        None => Ok(()),
    }
}

fn check_headers(expected: &[String], actual: &[(String, String)]) -> Result<(), ResponseError> {
    let actual: BTreeSet<&str> = actual.iter().map(|(name, _)| name.as_str()).collect();
    if expected.iter().all(|name| actual.contains(name.as_str())) {
        return Ok(());
    }
    let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let difference: Vec<&str> = actual.symmetric_difference(&expected).copied().collect();
    Err(ResponseError::NonConformingResponseHeaders {
        message: format!(
            "Keys in header don't match response specification. Difference: {difference:?}"
        ),
    })
}

fn non_conforming_body(message: String) -> ResponseError {
    ResponseError::NonConformingResponseBody { message }
}

/// A handler whose responses pass through a [`ResponseValidator`].
struct Validated {
    inner: BoxedHandler,
    validator: Arc<ResponseValidator>,
}

impl ErasedHandler for Validated {
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self.inner.call(req);
        let validator = Arc::clone(&self.validator);
        Box::pin(async move {
            let response = fut.await;
            match validator.validate(&response) {
                Ok(()) => response,
                Err(e) => {
                    warn!(
                        method = %validator.operation.method(),
                        path = validator.operation.path(),
                        status = response.status_code().as_u16(),
                        reason = e.reason(),
                        detail = e.message(),
                        "handler response does not conform"
                    );
                    problem(StatusCode::INTERNAL_SERVER_ERROR, e.reason(), e.message())
                }
            }
        })
    }
}
