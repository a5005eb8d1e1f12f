use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::dataset::DatasetReference;
use crate::http::job::{ErrorProto, JobReference};
use crate::http::table::TableSchema;
use crate::http::tabledata::Tuple;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Required. A query string to execute, using Google Standard SQL or legacy SQL syntax.
    pub query: String,
    /// Optional. The maximum number of rows of data to return per page of results.
    pub max_results: Option<i64>,
    /// Optional. Specifies the default datasetId and projectId to assume for any unqualified table names in the query.
    pub default_dataset: Option<DatasetReference>,
    /// Optional. How long to wait for the query to complete, in milliseconds, before the request times out and returns.
    /// When the query does not complete within the wait time, `jobComplete` is false in the response.
    pub timeout_ms: Option<i64>,
    /// Specifies whether to use BigQuery's legacy SQL dialect for this query.
    pub use_legacy_sql: bool,
    /// Optional. Whether to look for the result in the query cache.
    pub use_query_cache: Option<bool>,
    /// The geographic location where the job should run.
    pub location: Option<String>,
    /// Optional. A unique user provided identifier to ensure idempotent behavior for queries.
    pub request_id: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub kind: String,
    /// The schema of the results. Present only when the query completes successfully.
    pub schema: Option<TableSchema>,
    /// Reference to the Job that was created to run the query.
    pub job_reference: JobReference,
    /// The total number of rows in the complete query result set.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    pub total_rows: Option<i64>,
    /// A token used for paging results.
    pub page_token: Option<String>,
    /// An object with as many results as can be contained within the maximum permitted reply size.
    pub rows: Option<Vec<Tuple>>,
    /// Whether the query has completed or not.
    #[serde(default)]
    pub job_complete: bool,
    /// Output only. The first errors or warnings encountered during the running of the job.
    pub errors: Option<Vec<ErrorProto>>,
}

pub fn build(base_url: &str, client: &Client, project_id: &str, data: &QueryRequest) -> RequestBuilder {
    let url = format!("{}/projects/{}/queries", base_url, project_id);
    client.post(url).json(data)
}
