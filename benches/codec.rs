use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::{HeaderMap, HeaderValue, StatusCode, Version};
use requestninja::http::headers::HeaderStore;
use requestninja::http::requestbody::{self, Payload};
use requestninja::http::responsebody::{self, ResponseHead};
use requestninja::urlrequest::settings::Settings;
use serde_json::json;

fn sample_payload() -> Payload {
    Payload::from(json!({
        "id": 42,
        "name": "requestninja",
        "tags": ["http", "client", "json"],
        "owner": { "login": "someone", "site_admin": false },
        "description": "a single-request HTTP client",
    }))
}

fn benchmark_encode_json(c: &mut Criterion) {
    let payload = sample_payload();
    let headers: HeaderStore = [("content-type", "application/json")].into_iter().collect();
    let settings = Settings::default();

    c.bench_function("encode_json_body", |b| {
        b.iter(|| requestbody::encode(black_box(&payload), &headers, &settings))
    });
}

fn benchmark_encode_form(c: &mut Criterion) {
    let payload = sample_payload();
    let headers = HeaderStore::new();
    let settings = Settings::default();

    c.bench_function("encode_form_body", |b| {
        b.iter(|| requestbody::encode(black_box(&payload), &headers, &settings))
    });
}

fn benchmark_decode_json(c: &mut Criterion) {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    let head = ResponseHead {
        status: StatusCode::OK,
        version: Version::HTTP_11,
        headers,
    };
    let body = Bytes::from(
        serde_json::to_vec(&json!({
            "items": (0..64).map(|i| json!({"id": i, "done": i % 2 == 0})).collect::<Vec<_>>(),
        }))
        .unwrap(),
    );
    let settings = Settings::default();

    c.bench_function("decode_json_response", |b| {
        b.iter(|| responsebody::decode(head.clone(), black_box(body.clone()), &settings))
    });
}

criterion_group!(
    benches,
    benchmark_encode_json,
    benchmark_encode_form,
    benchmark_decode_json
);
criterion_main!(benches);
