use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::http::bigquery_client::BigqueryClient;
use crate::http::bigquery_dataset_client::BigqueryDatasetClient;
use crate::http::bigquery_job_client::BigqueryJobClient;
use crate::http::bigquery_table_client::BigqueryTableClient;
use crate::http::bigquery_tabledata_client::BigqueryTabledataClient;
use crate::http::job::get_query_results::GetQueryResultsRequest;
use crate::http::job::query::QueryRequest;
use crate::query;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug)]
pub struct ClientConfig {
    http: Option<reqwest_middleware::ClientWithMiddleware>,
    endpoint: String,
    connect_timeout: Duration,
    debug: bool,
}

impl ClientConfig {
    /// Configuration for a local emulator.
    ///
    /// `host` is either `host:port`, which is reached over plain `http`, or a full URL.
    /// No credentials are attached to the requests.
    pub fn new_with_emulator(host: &str) -> Self {
        let endpoint = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        Self {
            http: None,
            endpoint,
            connect_timeout: Duration::from_secs(10),
            debug: false,
        }
    }

    pub fn with_http_client(mut self, value: reqwest_middleware::ClientWithMiddleware) -> Self {
        self.http = Some(value);
        self
    }

    pub fn with_connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Logs every response body.
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[derive(Clone)]
pub struct Client {
    dataset_client: BigqueryDatasetClient,
    table_client: BigqueryTableClient,
    tabledata_client: BigqueryTabledataClient,
    job_client: BigqueryJobClient,
}

impl Client {
    /// New client
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let url = reqwest::Url::parse(config.endpoint.as_str()).map_err(|e| Error::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidEndpoint {
                endpoint: config.endpoint,
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        let http = match config.http {
            Some(http) => http,
            None => {
                let inner = reqwest::Client::builder()
                    .connect_timeout(config.connect_timeout)
                    .build()?;
                reqwest_middleware::ClientBuilder::new(inner).build()
            }
        };
        let client = Arc::new(BigqueryClient::new(config.endpoint.as_str(), http, config.debug));
        Ok(Self {
            dataset_client: BigqueryDatasetClient::new(client.clone()),
            table_client: BigqueryTableClient::new(client.clone()),
            tabledata_client: BigqueryTabledataClient::new(client.clone()),
            job_client: BigqueryJobClient::new(client),
        })
    }

    pub fn dataset(&self) -> &BigqueryDatasetClient {
        &self.dataset_client
    }

    pub fn table(&self) -> &BigqueryTableClient {
        &self.table_client
    }

    pub fn tabledata(&self) -> &BigqueryTabledataClient {
        &self.tabledata_client
    }

    pub fn job(&self) -> &BigqueryJobClient {
        &self.job_client
    }

    /// Runs a query and returns an iterator over its rows.
    ///
    /// When the job does not finish within the request's wait time the results are polled until it does.
    pub async fn query(&self, project_id: &str, request: QueryRequest) -> Result<query::Iterator, query::Error> {
        let result = self.job_client.query(project_id, &request).await?;
        let mut iterator = query::Iterator {
            client: self.job_client.clone(),
            project_id: result.job_reference.project_id,
            job_id: result.job_reference.job_id,
            request: GetQueryResultsRequest {
                start_index: None,
                page_token: result.page_token,
                max_results: request.max_results,
                timeout_ms: request.timeout_ms,
                location: result.job_reference.location.or(request.location),
            },
            chunk: VecDeque::from(result.rows.unwrap_or_default()),
            total_size: result.total_rows.unwrap_or_default(),
        };
        if !result.job_complete {
            iterator.wait_for_completion().await?;
        }
        Ok(iterator)
    }
}
