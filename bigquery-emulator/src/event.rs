//! Log event rows stored by the sample: a `jsonPayload` record and a `labels` record.
//!
//! See https://cloud.google.com/bigquery/docs/samples/bigquery-nested-repeated-schema for nested schemas.

use crate::http::table::{TableFieldSchema, TableFieldType, TableSchema};
use crate::http::tabledata::Tuple;
use crate::query::row::{Error, Row};

/// Static schema of the event table.
pub fn event_schema() -> TableSchema {
    TableSchema {
        fields: vec![
            TableFieldSchema::record(
                "jsonPayload",
                vec![TableFieldSchema::nullable("message", TableFieldType::String)],
            ),
            TableFieldSchema::record(
                "labels",
                vec![TableFieldSchema::nullable("event_id", TableFieldType::String)],
            ),
        ],
    }
}

#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, Debug, Default)]
pub struct Record {
    #[serde(rename = "jsonPayload")]
    pub json_payload: Option<JsonPayload>,
    pub labels: Option<Labels>,
}

#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, Debug, Default)]
pub struct JsonPayload {
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, Debug, Default)]
pub struct Labels {
    pub event_id: Option<String>,
}

impl Record {
    pub fn new(message: &str, event_id: &str) -> Self {
        Self {
            json_payload: Some(JsonPayload {
                message: Some(message.to_string()),
            }),
            labels: Some(Labels {
                event_id: Some(event_id.to_string()),
            }),
        }
    }
}

/// The rows inserted by the full workflow.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("new user created!", "user_created"),
        Record::new("new article created!", "article_created"),
        Record::new("article updated!", "article_updated"),
    ]
}

/// Decodes a row whose first column is `event_id`, as returned by `SELECT labels.event_id ...`.
impl TryFrom<Tuple> for Labels {
    type Error = Error;

    fn try_from(value: Tuple) -> Result<Self, Self::Error> {
        let row = Row::try_from(value)?;
        Ok(Self {
            event_id: row.column(0)?,
        })
    }
}

/// Decodes a `SELECT jsonPayload, labels ...` row.
impl TryFrom<Tuple> for Record {
    type Error = Error;

    fn try_from(value: Tuple) -> Result<Self, Self::Error> {
        let row = Row::try_from(value)?;
        let json_payload = match row.column::<Option<&Tuple>>(0)? {
            Some(payload) => Some(JsonPayload {
                message: Row::try_from(payload.clone())?.column(0)?,
            }),
            None => None,
        };
        let labels = match row.column::<Option<&Tuple>>(1)? {
            Some(labels) => Some(Labels::try_from(labels.clone())?),
            None => None,
        };
        Ok(Self { json_payload, labels })
    }
}
