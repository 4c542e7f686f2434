#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use stock_alerts::{
    error::AlertError,
    models::{AlertCategory, AlertId, AlertPatch, AlertRecord, HitSide, NewAlert},
    services::{AlertApiClient, AlertStore},
};

// ---------------- Mock alert service over HTTP ----------------

#[derive(Clone)]
pub struct MockService {
    alerts: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicU64>,
    list_status: Arc<AtomicI64>,
}

impl MockService {
    pub fn new(seed: Vec<Value>) -> Self {
        Self {
            alerts: Arc::new(Mutex::new(seed)),
            next_id: Arc::new(AtomicU64::new(100)),
            list_status: Arc::new(AtomicI64::new(200)),
        }
    }

    pub fn records(&self) -> Vec<Value> {
        self.alerts.lock().unwrap().clone()
    }

    /// 200 answers normally, 502 answers with a plain-text gateway error,
    /// anything else with an error envelope.
    pub fn set_list_status(&self, code: i64) {
        self.list_status.store(code, Ordering::SeqCst);
    }

    /// Starts the service on an ephemeral port and returns its base url.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/stocks/alert/get-all", get(get_all))
            .route("/stocks/alert/create", post(create))
            .route("/stocks/alert/update/:id", put(update))
            .route("/stocks/alert/delete/:id", delete(remove))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }
}

pub fn seeded() -> MockService {
    MockService::new(vec![
        json!({ "_id": "a1", "script_name": "NIFTY", "alert_for": 1, "hit_side": "BUY", "price": 22000, "comment": "breakout" }),
        json!({ "_id": "a2", "script_name": "DABUR", "alert_for": "0", "hit_side": "SHORT", "price": "512.5" }),
        json!({ "_id": "a3", "script_name": "SENSEX" }),
    ])
}

pub fn http_client(base: &str) -> AlertApiClient {
    AlertApiClient::with_client(reqwest::Client::new(), base).unwrap()
}

async fn get_all(State(svc): State<MockService>) -> Response {
    match svc.list_status.load(Ordering::SeqCst) {
        200 => Json(json!({ "statusCode": 200, "data": svc.records() })).into_response(),
        502 => (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response(),
        code => Json(json!({ "statusCode": code, "message": "Internal server error" })).into_response(),
    }
}

async fn create(State(svc): State<MockService>, Json(body): Json<Value>) -> Response {
    let name = body["stockName"].as_str().unwrap_or("").to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "statusCode": 400, "message": "stockName is required" })),
        )
            .into_response();
    }

    let id = format!("{:024x}", svc.next_id.fetch_add(1, Ordering::SeqCst));
    let side = match body["direction"].as_str() {
        Some("UPPER") => "BUY",
        _ => "SHORT",
    };
    let record = json!({
        "_id": id,
        "script_name": name,
        "alert_for": body["alertFor"],
        "hit_side": side,
        "price": body["price"],
        "comment": body["comment"],
    });
    svc.alerts.lock().unwrap().push(record.clone());

    Json(json!({ "statusCode": 200, "data": record })).into_response()
}

async fn update(
    State(svc): State<MockService>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut alerts = svc.alerts.lock().unwrap();
    let Some(existing) = alerts.iter_mut().find(|a| a["_id"] == id.as_str()) else {
        return Json(json!({ "statusCode": 404, "message": "Alert not found" }));
    };

    if let (Some(target), Some(patch)) = (existing.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            if k != "_id" {
                target.insert(k.clone(), v.clone());
            }
        }
    }

    Json(json!({ "statusCode": 200, "data": existing.clone() }))
}

async fn remove(State(svc): State<MockService>, Path(id): Path<String>) -> Json<Value> {
    let mut alerts = svc.alerts.lock().unwrap();
    let before = alerts.len();
    alerts.retain(|a| a["_id"] != id.as_str());

    if alerts.len() == before {
        Json(json!({ "statusCode": 404, "message": "Alert not found" }))
    } else {
        Json(json!({ "statusCode": 200, "message": "Alert deleted" }))
    }
}

// ---------------- In-memory store ----------------

#[derive(Default)]
struct MemoryInner {
    alerts: Vec<AlertRecord>,
    next_id: u64,
    calls: Vec<&'static str>,
    fail_next: Option<AlertError>,
}

/// Store double whose calls can be held at a gate until the test releases them.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
    gate: Arc<Semaphore>,
}

impl MemoryStore {
    pub fn new(alerts: Vec<AlertRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                alerts,
                ..Default::default()
            })),
            gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
        }
    }

    pub fn gated(alerts: Vec<AlertRecord>) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            ..Self::new(alerts)
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn fail_next(&self, err: AlertError) {
        self.inner.lock().unwrap().fail_next = Some(err);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.inner.lock().unwrap().alerts.clone()
    }

    async fn enter(&self, call: &'static str) -> Result<(), AlertError> {
        self.inner.lock().unwrap().calls.push(call);
        // each release lets exactly one call through
        self.gate.acquire().await.unwrap().forget();
        match self.inner.lock().unwrap().fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn not_found() -> AlertError {
    AlertError::Application {
        status: 404,
        message: Some("Alert not found".into()),
    }
}

impl AlertStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<AlertRecord>, AlertError> {
        self.enter("fetch_all").await?;
        Ok(self.alerts())
    }

    async fn create(&self, draft: &NewAlert) -> Result<AlertRecord, AlertError> {
        self.enter("create").await?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let record = AlertRecord {
            id: AlertId::new(format!("mem-{}", inner.next_id)),
            instrument: draft.instrument.clone(),
            category: Some(draft.category),
            side: Some(draft.direction.into()),
            price: Some(draft.price),
            comment: draft.comment.clone(),
        };
        inner.alerts.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &AlertId,
        patch: &AlertPatch,
    ) -> Result<Option<AlertRecord>, AlertError> {
        self.enter("update").await?;
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .alerts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(not_found)?;

        if let Some(v) = &patch.instrument {
            record.instrument = v.clone();
        }
        if let Some(v) = patch.category {
            record.category = Some(v);
        }
        if let Some(v) = patch.side {
            record.side = Some(v);
        }
        if let Some(v) = patch.price {
            record.price = Some(v);
        }
        if let Some(v) = &patch.comment {
            record.comment = v.clone();
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &AlertId) -> Result<(), AlertError> {
        self.enter("delete").await?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.alerts.len();
        inner.alerts.retain(|a| &a.id != id);
        if inner.alerts.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

pub fn record(id: &str, instrument: &str, price: f64) -> AlertRecord {
    AlertRecord {
        id: AlertId::new(id),
        instrument: instrument.to_string(),
        category: Some(AlertCategory::Swing),
        side: Some(HitSide::Buy),
        price: Some(price),
        comment: String::new(),
    }
}
