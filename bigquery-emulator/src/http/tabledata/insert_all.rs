use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};
use serde::Serialize;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Row<T: Serialize> {
    /// [Optional] A unique ID for each row. BigQuery uses this
    /// property to detect duplicate insertion requests on a best-effort basis.
    pub insert_id: Option<String>,

    /// [Required] A JSON object that contains a row of data. The
    /// object's properties and values must match the destination table's schema.
    pub json: T,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRequest<T: Serialize> {
    /// Optional. Insert all valid rows of a request, even if invalid rows exist.
    pub skip_invalid_rows: Option<bool>,
    /// Optional. Accept rows that contain values that do not match the schema.
    pub ignore_unknown_values: Option<bool>,
    /// Data to insert
    pub rows: Vec<Row<T>>,
}

impl<T: Serialize> Default for InsertAllRequest<T> {
    fn default() -> Self {
        Self {
            skip_invalid_rows: None,
            ignore_unknown_values: None,
            rows: vec![],
        }
    }
}

impl<T: Serialize> InsertAllRequest<T> {
    pub fn new(rows: impl IntoIterator<Item = T>) -> Self {
        Self {
            rows: rows.into_iter().map(|json| Row { insert_id: None, json }).collect(),
            ..Default::default()
        }
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorMessage {
    /// A short error code that summarizes the error.
    pub reason: String,
    /// Specifies where the error occurred, if present.
    pub location: String,
    /// A human-readable description of the error.
    pub message: String,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct InsertError {
    /// The index of the rejected row in the request.
    pub index: i32,
    pub errors: Vec<ErrorMessage>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllResponse {
    #[serde(default)]
    pub kind: String,
    pub insert_errors: Option<Vec<InsertError>>,
}

pub fn build<T: Serialize>(
    base_url: &str,
    client: &Client,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
    data: &InsertAllRequest<T>,
) -> RequestBuilder {
    let url = format!(
        "{}/projects/{}/datasets/{}/tables/{}/insertAll",
        base_url, project_id, dataset_id, table_id
    );
    client.post(url).json(data)
}
