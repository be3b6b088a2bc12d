#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_core::Request;
use crux_kv::value::Value as StoredValue;
use crux_kv::{KeyValueOperation, KeyValueResponse, KeyValueResult};
use serde_json::{json, Value};

use shared::capabilities::{
    HttpBody, HttpHeaders, HttpOperation, HttpResponse, HttpResult, TimerOperation,
};
use shared::{App, Effect, Event, IssuedToken, Model};

pub type Tester = AppTester<App, Effect>;

pub fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn kv_requests(effects: Vec<Effect>) -> Vec<Request<KeyValueOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// Shell answer to a storage read.
pub fn stored(bytes: Option<&[u8]>) -> KeyValueResult {
    let value = match bytes {
        Some(bytes) => StoredValue::Bytes(bytes.to_vec()),
        None => StoredValue::None,
    };
    KeyValueResult::Ok {
        response: KeyValueResponse::Get { value },
    }
}

pub fn timer_requests(effects: Vec<Effect>) -> Vec<Request<TimerOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// `"METHOD url"` of an HTTP effect.
pub fn describe(request: &Request<HttpOperation>) -> String {
    let HttpOperation::Execute(http) = &request.operation;
    format!("{} {}", http.method().as_str(), http.url().as_str())
}

pub fn json_body(request: &Request<HttpOperation>) -> Value {
    let HttpOperation::Execute(http) = &request.operation;
    match http.body() {
        Some(HttpBody::Json(bytes)) => serde_json::from_slice(bytes).unwrap(),
        _ => panic!("expected a JSON body on {}", describe(request)),
    }
}

pub fn json_response(status: u16, body: &Value) -> HttpResult {
    Ok(HttpResponse::new(
        status,
        HttpHeaders::new(),
        serde_json::to_vec(body).unwrap(),
        "test".into(),
    ))
}

pub fn text_response(status: u16, body: &str) -> HttpResult {
    Ok(HttpResponse::new(
        status,
        HttpHeaders::new(),
        body.as_bytes().to_vec(),
        "test".into(),
    ))
}

/// Resolves an HTTP effect and runs the events it produces, returning the
/// effects those events requested.
pub fn resolve_http(
    app: &Tester,
    model: &mut Model,
    mut request: Request<HttpOperation>,
    result: HttpResult,
) -> Vec<Effect> {
    let update = app.resolve(&mut request, result).expect("resolves");
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "ana@example.com",
        "displayName": "Ana",
        "avatarUrl": null,
        "bio": "Walks a lot"
    })
}

pub fn trips_json(count: usize, title: impl Fn(usize) -> String) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({"id": i + 1, "title": title(i), "description": format!("Day {i}")}))
            .collect(),
    )
}

/// A model after a successful login whose trip list fetch returned `trips`.
pub fn signed_in_with(app: &Tester, trips: &Value) -> Model {
    let mut model = Model::default();
    let update = app.update(
        Event::TokenIssued {
            token: IssuedToken::new("tok"),
        },
        &mut model,
    );
    for request in http_requests(update.effects) {
        let result = match describe(&request).as_str() {
            "GET /api/auth/me" => json_response(200, &user_json()),
            "GET /api/trips/mine" => json_response(200, trips),
            other => panic!("unexpected request {other}"),
        };
        resolve_http(app, &mut model, request, result);
    }
    model
}
