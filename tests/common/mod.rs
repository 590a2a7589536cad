//! Shared fixtures for the HTTP-level tests

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use springapi::prelude::*;
use std::sync::Arc;

pub const SECRET: &str = "test-signing-secret";
pub const PUBLIC_URL: &str = "http://api.test/";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryDocumentStore,
}

/// Client-secret document as carried in `AUTH`
pub fn auth_uri() -> String {
    encode_json_uri(
        "google",
        &json!({"web": {"client_id": "test-client", "client_secret": "test-secret"}}),
    )
}

pub fn test_config() -> AppConfig {
    AppConfig::new(SECRET)
        .with_environment(Environment::Testing)
        .with_auth(auth_uri())
        .with_public_url(PUBLIC_URL)
        .with_authorized_emails([ADMIN_EMAIL])
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Server over a fresh in-memory store holding one admin token
pub fn spawn_app() -> TestApp {
    spawn_app_with(ServerBuilder::new(test_config()))
}

/// Server with the given builder; the store is always a fresh in-memory one
pub fn spawn_app_with(builder: ServerBuilder) -> TestApp {
    let store = InMemoryDocumentStore::new();
    store
        .insert_raw("tokens", "t1", record(json!({"token": ADMIN_TOKEN})))
        .expect("seed admin token");

    let router = builder
        .with_store(Arc::new(store.clone()))
        .build()
        .expect("build router");
    let server = TestServer::new(router);

    TestApp { server, store }
}

pub fn submission_body() -> Value {
    json!({
        "name": "Ada",
        "message": "Hello there",
        "location": "London",
    })
}
