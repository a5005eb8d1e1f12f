#![allow(clippy::result_large_err)]
//! # gcloud-bigquery-emulator
//!
//! Creates a dataset and a table with a nested schema on a local BigQuery emulator
//! (for example [bigquery-emulator](https://github.com/goccy/bigquery-emulator)),
//! inserts a few rows, queries them back and deletes everything on exit.
//!
//! ## Quick Start
//!
//! ### Run the whole sample
//!
//! The emulator address is read from `BIGQUERY_EMULATOR_HOST` (for example `localhost:9050`).
//! Requests go over plain `http` and carry no credentials.
//!
//! ```rust
//! use gcloud_bigquery_emulator::config::{EmulatorConfig, WorkflowConfig};
//! use gcloud_bigquery_emulator::workflow;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn run() {
//!     let emulator = EmulatorConfig::from_env().unwrap();
//!     let outcome = workflow::run(CancellationToken::new(), &emulator, &WorkflowConfig::default()).await.unwrap();
//!     for labels in outcome.matched {
//!         println!("{:?}", labels.event_id);
//!     }
//! }
//! ```
//!
//! ### Use the client directly
//!
//! ```rust
//! use gcloud_bigquery_emulator::client::{Client, ClientConfig};
//! use gcloud_bigquery_emulator::http::dataset::Dataset;
//! use gcloud_bigquery_emulator::http::job::query::QueryRequest;
//! use gcloud_bigquery_emulator::query::row::Row;
//!
//! async fn run() {
//!     let client = Client::new(ClientConfig::new_with_emulator("localhost:9050")).unwrap();
//!     client.dataset().create(&Dataset::new("test-project", "dataset")).await.unwrap();
//!     let request = QueryRequest {
//!         query: "SELECT 'A' AS col1".to_string(),
//!         ..Default::default()
//!     };
//!     let mut iter = client.query("test-project", request).await.unwrap();
//!     while let Some(row) = iter.next::<Row>().await.unwrap() {
//!         let col1 = row.column::<String>(0);
//!     }
//!     client.dataset().delete_with_contents("test-project", "dataset").await.unwrap();
//! }
//! ```
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod query;
pub mod workflow;

pub use error::{Error, Step};
