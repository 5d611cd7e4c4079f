//! # opresolve
//!
//! Turns the operations of an API specification (Swagger / OpenAPI style)
//! into handlers, and checks that what those handlers return matches what
//! the specification promises.
//!
//! ## The contract
//!
//! Loading the specification, parsing requests and owning the socket all
//! happen elsewhere. opresolve does two things:
//!
//! - **Resolution** — at startup, map every operation to a handler through a
//!   [`Resolver`] strategy: explicit `operationId`s, REST conventions, or
//!   registered [`Controller`] instances. Failures are errors, and startup
//!   should stop.
//! - **Response validation** — at request time, a [`ResponseValidator`]
//!   checks body and headers against the response definition. A handler that
//!   breaks its contract produces a `500` problem response, never a crash.
//!
//! ## Quick start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use opresolve::{Api, HandlerRegistry, Operation, Request, Response, RestyResolver};
//! use serde_json::json;
//!
//! async fn search(_req: Request) -> Response {
//!     Response::json(br#"[{"name":"Rex"}]"#.to_vec())
//! }
//!
//! async fn get(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("0");
//!     Response::json(format!(r#"{{"name":"pet {id}"}}"#).into_bytes())
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let functions = HandlerRegistry::new()
//!     .register("api.pets.search", search)
//!     .register("api.pets.get", get);
//!
//! let pet = json!({"type": "object", "required": ["name"]});
//! let api = Api::builder(RestyResolver::new("api", functions))
//!     .operation(Operation::new(Method::GET, "/pets", json!({
//!         "responses": {"200": {"schema": {"type": "array", "items": pet}}}
//!     })))
//!     .operation(Operation::new(Method::GET, "/pets/{id}", json!({
//!         "responses": {"200": {"schema": pet}}
//!     })))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(api.operation_ids(), ["api.pets.search", "api.pets.get"]);
//!
//! let res = api.dispatch(Request::new(Method::GET, "/pets/7")).await;
//! assert_eq!(res.status_code(), StatusCode::OK);
//! # }
//! ```

mod api;
mod controller;
mod error;
mod handler;
mod operation;
mod problem;
mod request;
mod resolver;
mod response;
mod router;
mod validator;

pub use api::{Api, ApiBuilder};
pub use controller::{BoundController, Controller, Operations};
pub use error::{Error, LookupError, ResolverError, ResponseError, Result};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use operation::{Operation, ROUTER_CONTROLLER};
pub use problem::problem;
pub use request::Request;
pub use resolver::{
    ControllerRegistry, FunctionResolver, HandlerRegistry, ObjectResolver, Resolution, Resolver,
    RestyResolver,
};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use validator::{ResponseValidator, is_json_mimetype};
