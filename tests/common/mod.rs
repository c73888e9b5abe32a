//! Shared fixtures for integration tests.
//!
//! Every test gets its own in-memory SQLite database with the real migration
//! applied, and, where needed, an in-process fake of the Oura sleep endpoint.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

use oura_sleep::config::Config;
use oura_sleep::entity::sleep_data;

pub const TOKEN: &str = "test-token";

/// Fresh in-memory database with `sleep_data` created.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection, otherwise each pooled connection sees its own empty database
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn test_config(oura_base_url: &str) -> Config {
    let mut config = Config::new("sqlite::memory:", TOKEN);
    config.oura_base_url = oura_base_url.to_string();
    config.oura_timeout_seconds = 5;
    config.sync_retry_max = 0;
    config.sync_retry_delay_seconds = 0;
    config.disable_rate_limiting = true;
    config
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A fully populated record with the literal values used across tests.
pub fn sample_record(id: Uuid) -> sleep_data::Model {
    sleep_data::Model {
        id,
        day: Some(day("2024-01-15")),
        average_breath: Some(14.625),
        average_heart_rate: Some(58.3),
        average_hrv: Some(41),
        awake_time: Some(2_460),
        bedtime_start: Some(DateTime::parse_from_rfc3339("2024-01-14T23:10:00-08:00").unwrap()),
        bedtime_end: Some(DateTime::parse_from_rfc3339("2024-01-15T07:31:00-08:00").unwrap()),
        deep_sleep_duration: Some(4_800),
        efficiency: Some(91),
        latency: Some(540),
        light_sleep_duration: Some(14_400),
        lowest_heart_rate: Some(49),
        rem_sleep_duration: Some(6_000),
        restless_periods: Some(212),
        sleep_score_delta: Some(-2),
        time_in_bed: Some(30_060),
        total_sleep_duration: Some(25_200),
        sleep_type: Some("long_sleep".to_string()),
    }
}

/// Oura-shaped JSON for one sleep period.
pub fn sleep_json(id: &str, day: &str, total_sleep_duration: i64) -> Value {
    json!({
        "id": id,
        "day": day,
        "average_breath": 14.625,
        "average_heart_rate": 58.3,
        "average_hrv": 41,
        "awake_time": 2460,
        "bedtime_start": format!("{day}T00:10:00+02:00"),
        "bedtime_end": format!("{day}T07:31:00+02:00"),
        "deep_sleep_duration": 4800,
        "efficiency": 91,
        "heart_rate": { "interval": 300.0, "items": [60.0, 58.0, null], "timestamp": format!("{day}T00:10:00+02:00") },
        "latency": 540,
        "light_sleep_duration": 14400,
        "low_battery_alert": false,
        "lowest_heart_rate": 49,
        "movement_30_sec": "1111211",
        "period": 0,
        "readiness_score_delta": 1.0,
        "rem_sleep_duration": 6000,
        "restless_periods": 212,
        "sleep_phase_5_min": "4422211",
        "sleep_score_delta": 2.0,
        "sleep_algorithm_version": "v2",
        "time_in_bed": 30060,
        "total_sleep_duration": total_sleep_duration,
        "type": "long_sleep"
    })
}

/// Canned behavior for the fake Oura server.
#[derive(Clone)]
pub enum FakeReply {
    /// Pages served in order, linked by `next_token`
    Pages(Vec<Vec<Value>>),
    Status(StatusCode),
    RawBody(String),
}

#[derive(Clone)]
struct FakeOura {
    reply: Arc<Mutex<FakeReply>>,
    requests: Arc<AtomicUsize>,
    seen_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Handle to a running fake Oura server.
pub struct FakeOuraServer {
    pub base_url: String,
    reply: Arc<Mutex<FakeReply>>,
    requests: Arc<AtomicUsize>,
    seen_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeOuraServer {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.seen_queries.lock().unwrap().clone()
    }

    pub fn set_reply(&self, reply: FakeReply) {
        *self.reply.lock().unwrap() = reply;
    }
}

#[derive(Deserialize)]
struct PageQuery {
    next_token: Option<String>,
}

async fn fake_sleep(
    State(fake): State<FakeOura>,
    headers: HeaderMap,
    Query(raw): Query<HashMap<String, String>>,
) -> Response {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    fake.seen_queries.lock().unwrap().push(raw.clone());

    let expected = format!("Bearer {TOKEN}");
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let query = PageQuery {
        next_token: raw.get("next_token").cloned(),
    };
    let reply = fake.reply.lock().unwrap().clone();

    match reply {
        FakeReply::Status(status) => (status, "upstream says no").into_response(),
        FakeReply::RawBody(body) => (StatusCode::OK, body).into_response(),
        FakeReply::Pages(pages) => {
            let index: usize = query
                .next_token
                .as_deref()
                .and_then(|t| t.strip_prefix("page-"))
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            let data = pages.get(index).cloned().unwrap_or_default();
            let next_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
            Json(json!({ "data": data, "next_token": next_token })).into_response()
        }
    }
}

/// Start a fake Oura API on an ephemeral port.
pub async fn spawn_fake_oura(reply: FakeReply) -> FakeOuraServer {
    let fake = FakeOura {
        reply: Arc::new(Mutex::new(reply)),
        requests: Arc::new(AtomicUsize::new(0)),
        seen_queries: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/v2/usercollection/sleep", get(fake_sleep))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeOuraServer {
        base_url: format!("http://{addr}"),
        reply: fake.reply,
        requests: fake.requests,
        seen_queries: fake.seen_queries,
    }
}
