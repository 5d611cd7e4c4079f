//! End-to-end: operations → resolver → validated routes → dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use http::{Method, StatusCode};
use opresolve::{
    Api, Controller, ControllerRegistry, Error, HandlerRegistry, ObjectResolver, Operation,
    Operations, Request, Resolver, ResolverError, Response, RestyResolver,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

struct GreetingController {
    was_called: AtomicBool,
}

impl GreetingController {
    fn new() -> Arc<Self> {
        Arc::new(Self { was_called: AtomicBool::new(false) })
    }

    fn post_greeting(&self, req: &Request) -> Value {
        self.was_called.store(true, Ordering::SeqCst);
        let name = req.param("name").unwrap_or("stranger");
        json!({"greeting": format!("Hello {name}")})
    }

    fn get_greeting(&self, _req: &Request) -> Value {
        json!({"greeting": 123})
    }
}

impl Controller for GreetingController {
    fn controller_name(&self) -> &str { "greeting" }

    fn operations(self: Arc<Self>) -> Operations {
        let get = Arc::clone(&self);
        Operations::new()
            .on("post_greeting", move |req: Request| {
                let this = Arc::clone(&self);
                async move { this.post_greeting(&req) }
            })
            .on("get_greeting", move |req: Request| {
                let this = Arc::clone(&get);
                async move { this.get_greeting(&req) }
            })
    }
}

fn greeting_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"greeting": {"type": "string"}},
        "required": ["greeting"],
    })
}

fn greeting_operation(method: Method, operation_id: &str) -> Operation {
    Operation::new(
        method,
        "/greeting/{name}",
        json!({
            "operationId": operation_id,
            "responses": {"200": {"description": "greeting", "schema": greeting_schema()}},
        }),
    )
}

fn body_json(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn single_controller_serves_conforming_responses() {
    let controller = GreetingController::new();
    let registry = ControllerRegistry::new().with_controller(Arc::clone(&controller));

    let api = Api::builder(ObjectResolver::new(registry))
        .operation(greeting_operation(Method::POST, "post_greeting"))
        .build()
        .unwrap();

    assert_eq!(api.operation_ids(), ["greeting.post_greeting"]);
    assert!(!controller.was_called.load(Ordering::SeqCst));

    let res = api.dispatch(Request::new(Method::POST, "/greeting/Bob")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body_json(&res), json!({"greeting": "Hello Bob"}));
    assert!(controller.was_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn non_conforming_body_becomes_a_problem_response() {
    let registry = ControllerRegistry::new().with_controller(GreetingController::new());
    let api = Api::builder(ObjectResolver::new(registry))
        .operation(greeting_operation(Method::GET, "get_greeting"))
        .build()
        .unwrap();

    let res = api.dispatch(Request::new(Method::GET, "/greeting/Bob")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.header("content-type"), Some("application/problem+json"));

    let body = body_json(&res);
    assert_eq!(body["type"], "about:blank");
    assert_eq!(body["title"], "Response body does not conform to specification");
    assert_eq!(body["status"], 500);
    assert!(body["detail"].as_str().unwrap().contains("123"));
}

#[tokio::test]
async fn disabling_validation_passes_responses_through() {
    let registry = ControllerRegistry::new().with_controller(GreetingController::new());
    let api = Api::builder(ObjectResolver::new(registry))
        .validate_responses(false)
        .operation(greeting_operation(Method::GET, "get_greeting"))
        .build()
        .unwrap();

    let res = api.dispatch(Request::new(Method::GET, "/greeting/Bob")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body_json(&res), json!({"greeting": 123}));
}

#[tokio::test]
async fn missing_declared_header_becomes_a_problem_response() {
    async fn limited(_req: Request) -> Response {
        Response::builder().status(StatusCode::CREATED).no_body()
    }
    async fn unlimited(_req: Request) -> Response {
        Response::builder()
            .status(StatusCode::CREATED)
            .header("X-Rate-Limit", "100")
            .no_body()
    }

    let responses = json!({"201": {"headers": {"X-Rate-Limit": {"type": "integer"}}}});
    let functions = HandlerRegistry::new()
        .register("api.limits.post", limited)
        .register("api.limits.put", unlimited);
    let api = Api::builder(RestyResolver::new("api", functions))
        .operation(Operation::new(Method::POST, "/limits", json!({"responses": responses.clone()})))
        .operation(Operation::new(Method::PUT, "/limits", json!({"responses": responses})))
        .build()
        .unwrap();

    let res = api.dispatch(Request::new(Method::POST, "/limits")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(&res);
    assert_eq!(body["title"], "Response headers do not conform to specification");
    assert_eq!(
        body["detail"],
        r#"Keys in header don't match response specification. Difference: ["X-Rate-Limit"]"#
    );

    let res = api.dispatch(Request::new(Method::PUT, "/limits")).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("X-Rate-Limit"), Some("100"));
}

#[tokio::test]
async fn produces_selects_the_mimetype() {
    async fn xml(_req: Request) -> Response {
        Response::builder().bytes(opresolve::ContentType::Xml, b"<pet/>".to_vec())
    }

    let api = Api::builder(Resolver::new(HandlerRegistry::new().register("api.pets.xml", xml)))
        .operation(Operation::new(
            Method::GET,
            "/pets.xml",
            json!({
                "operationId": "api.pets.xml",
                "produces": ["application/xml"],
                "responses": {"200": {"schema": {"type": "object"}}},
            }),
        ))
        .build()
        .unwrap();

    // The schema only applies to JSON bodies.
    let res = api.dispatch(Request::new(Method::GET, "/pets.xml")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"<pet/>");
}

#[tokio::test]
async fn lowercase_operation_methods_route_standard_requests() {
    async fn search(_req: Request) -> Response {
        Response::json(b"[]".to_vec())
    }
    async fn get(req: Request) -> Response {
        let id = req.param("id").unwrap_or("0");
        Response::json(format!(r#"{{"id":{id}}}"#).into_bytes())
    }

    let functions = HandlerRegistry::new()
        .register("api.pets.search", search)
        .register("api.pets.get", get);
    let verb = Method::from_bytes(b"get").unwrap();
    let api = Api::builder(RestyResolver::new("api", functions))
        .operation(Operation::new(verb.clone(), "/pets", json!({})))
        .operation(Operation::new(verb, "/pets/{id}", json!({})))
        .build()
        .unwrap();

    assert_eq!(api.operation_ids(), ["api.pets.search", "api.pets.get"]);

    let res = api.dispatch(Request::new(Method::GET, "/pets/1")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body_json(&res), json!({"id": 1}));

    let res = api.dispatch(Request::new(Method::GET, "/pets")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let registry = ControllerRegistry::new().with_controller(GreetingController::new());
    let api = Api::builder(ObjectResolver::new(registry))
        .operation(greeting_operation(Method::POST, "post_greeting"))
        .build()
        .unwrap();

    let res = api.dispatch(Request::new(Method::DELETE, "/greeting/Bob")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let res = api.dispatch(Request::new(Method::POST, "/farewell")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[test]
fn resolution_failures_abort_the_build() {
    struct Farewell;
    impl Controller for Farewell {
        fn controller_name(&self) -> &str { "farewell" }
        fn operations(self: Arc<Self>) -> Operations { Operations::new() }
    }

    let registry = ControllerRegistry::new()
        .with_controller(GreetingController::new())
        .with_controller(Arc::new(Farewell));
    let result = Api::builder(ObjectResolver::new(registry.clone()))
        .operation(greeting_operation(Method::POST, "post_greeting"))
        .build();
    assert!(matches!(result, Err(Error::Resolver(ResolverError::AmbiguousController))));

    let routed = Operation::new(
        Method::POST,
        "/greeting/{name}",
        json!({"operationId": "post_greeting", "x-swagger-router-controller": "farewell"}),
    );
    let result = Api::builder(ObjectResolver::new(registry)).operation(routed).build();
    match result {
        Err(Error::Resolver(err @ ResolverError::MethodNotFound { .. })) => {
            assert_eq!(err.to_string(), "Controller Farewell has no operation 'post_greeting'");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("build should fail"),
    }
}

#[test]
fn duplicate_routes_abort_the_build() {
    async fn noop(_req: Request) -> &'static str { "" }

    let functions = HandlerRegistry::new().register("api.pets.search", noop);
    let result = Api::builder(RestyResolver::new("api", functions))
        .operations([
            Operation::new(Method::GET, "/pets", json!({})),
            Operation::new(Method::GET, "/pets", json!({})),
        ])
        .build();
    assert!(matches!(result, Err(Error::Route { .. })));
}
