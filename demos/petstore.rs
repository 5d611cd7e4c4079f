//! Petstore — REST-convention resolution with response validation.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example petstore
//!
//! `GET /pets/{id}` returns a pet without its required `name` for id 0, so
//! the third request comes back as a 500 problem response.

use std::sync::Arc;

use http::Method;
use opresolve::{Api, HandlerRegistry, Operation, Request, Response, RestyResolver};
use serde_json::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let document = Arc::new(json!({
        "definitions": {
            "Pet": {
                "type": "object",
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}},
                "required": ["id", "name"],
            }
        }
    }));
    let pets = json!({"200": {"schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}}});
    let pet = json!({"200": {"schema": {"$ref": "#/definitions/Pet"}}});

    let functions = HandlerRegistry::new()
        .register("api.pets.search", search)
        .register("api.pets.get", get);

    let api = Api::builder(RestyResolver::new("api", functions))
        .operation(
            Operation::new(Method::GET, "/pets", json!({"responses": pets}))
                .with_document(Arc::clone(&document)),
        )
        .operation(
            Operation::new(Method::GET, "/pets/{id}", json!({"responses": pet}))
                .with_document(document),
        )
        .build()
        .expect("petstore operations resolve");

    for path in ["/pets", "/pets/1", "/pets/0", "/owners"] {
        let res = api.dispatch(Request::new(Method::GET, path)).await;
        println!(
            "GET {path} -> {} {}",
            res.status_code(),
            String::from_utf8_lossy(res.body())
        );
    }
}

// GET /pets
async fn search(_req: Request) -> Response {
    Response::json(br#"[{"id":1,"name":"Rex"},{"id":2,"name":"Tom"}]"#.to_vec())
}

// GET /pets/{id}
async fn get(req: Request) -> Response {
    match req.param("id") {
        Some("0") => Response::json(br#"{"id":0}"#.to_vec()),
        Some(id) => Response::json(format!(r#"{{"id":{id},"name":"pet {id}"}}"#).into_bytes()),
        None => Response::json(b"null".to_vec()),
    }
}
