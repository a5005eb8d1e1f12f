//! In-process stand-in for the BigQuery emulator REST API.
//!
//! It records every call it receives, keeps datasets, tables and rows in memory and
//! understands just enough SQL to answer the queries issued by the tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
struct Inner {
    calls: Vec<&'static str>,
    datasets: HashMap<String, Value>,
    tables: HashMap<(String, String), Table>,
    jobs: HashMap<String, Job>,
    failures: HashMap<&'static str, u16>,
    hangs: HashSet<&'static str>,
    rejected_rows: HashMap<usize, String>,
    incomplete_polls: usize,
    job_seq: usize,
}

struct Table {
    metadata: Value,
    rows: Vec<Value>,
}

struct Job {
    project_id: String,
    schema: Value,
    rows: Vec<Value>,
    remaining_polls: usize,
}

#[derive(Clone, Default)]
pub struct StubEmulator {
    inner: Arc<Mutex<Inner>>,
}

impl StubEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Answers `call` with an error of the given status.
    pub fn fail(&self, call: &'static str, status: u16) {
        self.lock().failures.insert(call, status);
    }

    /// Never answers `call`.
    pub fn hang(&self, call: &'static str) {
        self.lock().hangs.insert(call);
    }

    /// Reports the row at `index` of the next insertAll calls as rejected.
    pub fn reject_row(&self, index: usize, message: &str) {
        self.lock().rejected_rows.insert(index, message.to_string());
    }

    /// Query jobs keep running for this many `getQueryResults` calls.
    pub fn incomplete_polls(&self, polls: usize) {
        self.lock().incomplete_polls = polls;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn has_dataset(&self, dataset_id: &str) -> bool {
        self.lock().datasets.contains_key(dataset_id)
    }

    pub fn rows(&self, dataset_id: &str, table_id: &str) -> Vec<Value> {
        self.lock()
            .tables
            .get(&(dataset_id.to_string(), table_id.to_string()))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Serves the API on an ephemeral port and returns its `host:port`.
    pub async fn start(&self) -> String {
        let base = "/bigquery/v2/projects/{project_id}";
        let app = Router::new()
            .route(&format!("{base}/datasets"), post(insert_dataset))
            .route(
                &format!("{base}/datasets/{{dataset_id}}"),
                get(get_dataset).delete(delete_dataset),
            )
            .route(&format!("{base}/datasets/{{dataset_id}}/tables"), post(insert_table))
            .route(&format!("{base}/datasets/{{dataset_id}}/tables/{{table_id}}"), get(get_table))
            .route(
                &format!("{base}/datasets/{{dataset_id}}/tables/{{table_id}}/insertAll"),
                post(insert_all),
            )
            .route(&format!("{base}/queries"), post(query))
            .route(&format!("{base}/queries/{{job_id}}"), get(get_query_results))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr.to_string()
    }

    /// Records the call, then hangs or fails when configured to.
    async fn enter(&self, call: &'static str) -> Result<(), Response> {
        let (hang, failure) = {
            let mut inner = self.lock();
            inner.calls.push(call);
            (inner.hangs.contains(call), inner.failures.get(call).copied())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        match failure {
            Some(status) => Err(error(status, &format!("injected failure of {call}"))),
            None => Ok(()),
        }
    }
}

fn error(status: u16, message: &str) -> Response {
    let code = StatusCode::from_u16(status).unwrap();
    (code, Json(json!({"error": {"code": status, "message": message}}))).into_response()
}

async fn insert_dataset(
    State(stub): State<StubEmulator>,
    Path(project_id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(e) = stub.enter("datasets.insert").await {
        return e;
    }
    let dataset_id = body["datasetReference"]["datasetId"].as_str().unwrap_or_default().to_string();
    let mut inner = stub.lock();
    if inner.datasets.contains_key(&dataset_id) {
        return error(409, &format!("dataset {dataset_id} is already created"));
    }
    body["kind"] = json!("bigquery#dataset");
    body["id"] = json!(format!("{project_id}:{dataset_id}"));
    body["creationTime"] = json!("1690000000000");
    body["lastModifiedTime"] = json!("1690000000000");
    inner.datasets.insert(dataset_id, body.clone());
    Json(body).into_response()
}

async fn get_dataset(State(stub): State<StubEmulator>, Path((_, dataset_id)): Path<(String, String)>) -> Response {
    if let Err(e) = stub.enter("datasets.get").await {
        return e;
    }
    match stub.lock().datasets.get(&dataset_id) {
        Some(dataset) => Json(dataset.clone()).into_response(),
        None => error(404, &format!("dataset {dataset_id} is not found")),
    }
}

async fn delete_dataset(
    State(stub): State<StubEmulator>,
    Path((_, dataset_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(e) = stub.enter("datasets.delete").await {
        return e;
    }
    let mut inner = stub.lock();
    if !inner.datasets.contains_key(&dataset_id) {
        return error(404, &format!("dataset {dataset_id} is not found"));
    }
    let has_tables = inner.tables.keys().any(|(d, _)| *d == dataset_id);
    if has_tables && params.get("deleteContents").map(String::as_str) != Some("true") {
        return error(400, &format!("dataset {dataset_id} is still in use"));
    }
    inner.datasets.remove(&dataset_id);
    inner.tables.retain(|(d, _), _| *d != dataset_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn insert_table(
    State(stub): State<StubEmulator>,
    Path((project_id, dataset_id)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(e) = stub.enter("tables.insert").await {
        return e;
    }
    let table_id = body["tableReference"]["tableId"].as_str().unwrap_or_default().to_string();
    let mut inner = stub.lock();
    if !inner.datasets.contains_key(&dataset_id) {
        return error(404, &format!("dataset {dataset_id} is not found"));
    }
    let key = (dataset_id.clone(), table_id.clone());
    if inner.tables.contains_key(&key) {
        return error(409, &format!("table {table_id} is already created"));
    }
    body["kind"] = json!("bigquery#table");
    body["id"] = json!(format!("{project_id}:{dataset_id}.{table_id}"));
    body["creationTime"] = json!("1690000000000");
    inner.tables.insert(
        key,
        Table {
            metadata: body.clone(),
            rows: vec![],
        },
    );
    Json(body).into_response()
}

async fn get_table(
    State(stub): State<StubEmulator>,
    Path((_, dataset_id, table_id)): Path<(String, String, String)>,
) -> Response {
    if let Err(e) = stub.enter("tables.get").await {
        return e;
    }
    match stub.lock().tables.get(&(dataset_id, table_id.clone())) {
        Some(table) => {
            let mut body = table.metadata.clone();
            body["numRows"] = json!(table.rows.len().to_string());
            Json(body).into_response()
        }
        None => error(404, &format!("table {table_id} is not found")),
    }
}

async fn insert_all(
    State(stub): State<StubEmulator>,
    Path((_, dataset_id, table_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(e) = stub.enter("tabledata.insertAll").await {
        return e;
    }
    let mut inner = stub.lock();
    let rejected = inner.rejected_rows.clone();
    let Some(table) = inner.tables.get_mut(&(dataset_id, table_id.clone())) else {
        return error(404, &format!("table {table_id} is not found"));
    };
    let rows = body["rows"].as_array().cloned().unwrap_or_default();
    if !rejected.is_empty() {
        let errors: Vec<Value> = rejected
            .iter()
            .map(|(index, message)| json!({"index": index, "errors": [{"reason": "invalid", "message": message}]}))
            .collect();
        return Json(json!({"kind": "bigquery#tableDataInsertAllResponse", "insertErrors": errors})).into_response();
    }
    table.rows.extend(rows.into_iter().map(|row| row["json"].clone()));
    Json(json!({"kind": "bigquery#tableDataInsertAllResponse"})).into_response()
}

/// Parses `SELECT <columns> FROM `p.d.t` [WHERE labels.event_id="<value>"]`.
fn parse_query(sql: &str) -> Option<(bool, String, String, Option<String>)> {
    let (select, rest) = sql.split_once(" FROM ")?;
    let full_record = select.contains("jsonPayload");
    let (path, filter) = match rest.split_once(" WHERE ") {
        Some((path, filter)) => (path, Some(filter)),
        None => (rest, None),
    };
    let mut parts = path.trim().trim_matches('`').split('.');
    let (_, dataset_id, table_id) = (parts.next()?, parts.next()?, parts.next()?);
    let label = match filter {
        Some(filter) => {
            let value = filter.trim().strip_prefix("labels.event_id=")?;
            Some(value.trim_matches('"').to_string())
        }
        None => None,
    };
    Some((full_record, dataset_id.to_string(), table_id.to_string(), label))
}

fn tuple_of_strings(values: &[&Value]) -> Value {
    json!({"f": values.iter().map(|v| json!({"v": v})).collect::<Vec<_>>()})
}

fn to_tuple(row: &Value, full_record: bool) -> Value {
    if full_record {
        let payload = match &row["jsonPayload"] {
            Value::Null => Value::Null,
            v => tuple_of_strings(&[&v["message"]]),
        };
        let labels = match &row["labels"] {
            Value::Null => Value::Null,
            v => tuple_of_strings(&[&v["event_id"]]),
        };
        json!({"f": [{"v": payload}, {"v": labels}]})
    } else {
        tuple_of_strings(&[&row["labels"]["event_id"]])
    }
}

fn page(rows: &[Value], start: usize, max_results: Option<usize>) -> (Vec<Value>, Option<String>) {
    let end = match max_results {
        Some(max) => (start + max).min(rows.len()),
        None => rows.len(),
    };
    let token = (end < rows.len()).then(|| end.to_string());
    (rows[start.min(end)..end].to_vec(), token)
}

async fn query(
    State(stub): State<StubEmulator>,
    Path(project_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(e) = stub.enter("jobs.query").await {
        return e;
    }
    let sql = body["query"].as_str().unwrap_or_default();
    let Some((full_record, dataset_id, table_id, label)) = parse_query(sql) else {
        return error(400, &format!("unsupported query {sql}"));
    };
    let mut inner = stub.lock();
    let Some(table) = inner.tables.get(&(dataset_id, table_id.clone())) else {
        return error(404, &format!("table {table_id} is not found"));
    };
    let rows: Vec<Value> = table
        .rows
        .iter()
        .filter(|row| match &label {
            Some(label) => row["labels"]["event_id"].as_str() == Some(label.as_str()),
            None => true,
        })
        .map(|row| to_tuple(row, full_record))
        .collect();
    let schema = if full_record {
        table.metadata["schema"].clone()
    } else {
        json!({"fields": [{"name": "event_id", "type": "STRING", "mode": "NULLABLE"}]})
    };

    inner.job_seq += 1;
    let job_id = format!("job_{}", inner.job_seq);
    let remaining_polls = inner.incomplete_polls;
    let max_results = body["maxResults"].as_u64().map(|v| v as usize);
    let mut response = json!({
        "kind": "bigquery#queryResponse",
        "jobReference": {"projectId": project_id, "jobId": job_id},
        "jobComplete": remaining_polls == 0,
    });
    if remaining_polls == 0 {
        let (first, token) = page(&rows, 0, max_results);
        response["schema"] = schema.clone();
        response["totalRows"] = json!(rows.len().to_string());
        response["rows"] = json!(first);
        if let Some(token) = token {
            response["pageToken"] = json!(token);
        }
    }
    inner.jobs.insert(
        job_id,
        Job {
            project_id,
            schema,
            rows,
            remaining_polls,
        },
    );
    Json(response).into_response()
}

async fn get_query_results(
    State(stub): State<StubEmulator>,
    Path((_, job_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(e) = stub.enter("jobs.getQueryResults").await {
        return e;
    }
    let mut inner = stub.lock();
    let Some(job) = inner.jobs.get_mut(&job_id) else {
        return error(404, &format!("job {job_id} is not found"));
    };
    let reference = json!({"projectId": job.project_id, "jobId": job_id});
    if job.remaining_polls > 0 {
        job.remaining_polls -= 1;
        return Json(json!({"jobReference": reference, "jobComplete": false})).into_response();
    }
    let start = params.get("pageToken").and_then(|v| v.parse().ok()).unwrap_or(0);
    let max_results = params.get("maxResults").and_then(|v| v.parse().ok());
    let (rows, token) = page(&job.rows, start, max_results);
    let mut response = json!({
        "kind": "bigquery#getQueryResultsResponse",
        "jobReference": reference,
        "jobComplete": true,
        "schema": job.schema,
        "totalRows": job.rows.len().to_string(),
        "rows": rows,
    });
    if let Some(token) = token {
        response["pageToken"] = json!(token);
    }
    Json(response).into_response()
}
