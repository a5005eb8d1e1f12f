use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, ClientConfig};
use crate::config::{EmulatorConfig, Mode, WorkflowConfig};
use crate::error::{Error, Step, StepContext};
use crate::event::{event_schema, sample_records, Labels};
use crate::http::dataset::Dataset;
use crate::http::job::query::QueryRequest;
use crate::http::table::Table;
use crate::http::tabledata::insert_all::InsertAllRequest;

/// What a successful run created and read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Dataset metadata fetched back after creation.
    pub dataset: Dataset,
    /// Table metadata fetched back after creation.
    pub table: Table,
    /// Number of inserted records, zero in `Mode::Provision`.
    pub inserted: usize,
    /// Rows returned by the filter query, empty in `Mode::Provision`.
    pub matched: Vec<Labels>,
}

/// Runs the sample once against the emulator.
///
/// Every remote call is aborted when `ctx` is cancelled or `config.timeout` elapses.
/// Once the dataset creation has been attempted the dataset is deleted on every exit path.
pub async fn run(ctx: CancellationToken, emulator: &EmulatorConfig, config: &WorkflowConfig) -> Result<Outcome, Error> {
    let client_config = ClientConfig::new_with_emulator(emulator.host()).with_debug(config.debug);
    let client = Client::new(client_config).map_err(|e| e.at(Step::NewClient))?;
    tracing::debug!(host = emulator.host(), "client created");
    Workflow::new(&client, config, ctx).run().await
}

pub struct Workflow<'a> {
    client: &'a Client,
    config: &'a WorkflowConfig,
    ctx: CancellationToken,
    /// `None` when the timeout is too large to be represented, the run is then unbounded.
    deadline: Option<Instant>,
}

impl<'a> Workflow<'a> {
    /// The run deadline starts counting now.
    pub fn new(client: &'a Client, config: &'a WorkflowConfig, ctx: CancellationToken) -> Self {
        Self {
            client,
            config,
            ctx,
            deadline: Instant::now().checked_add(config.timeout),
        }
    }

    pub async fn run(&self) -> Result<Outcome, Error> {
        let result = self.with_dataset().await;
        self.teardown().await;
        result
    }

    async fn with_dataset(&self) -> Result<Outcome, Error> {
        let (dataset, table) = self.provision().await?;
        let mut outcome = Outcome {
            dataset,
            table,
            inserted: 0,
            matched: vec![],
        };
        if self.config.mode == Mode::Full {
            outcome.inserted = self.insert_records().await?;
            outcome.matched = self.query_events().await?;
        }
        Ok(outcome)
    }

    async fn provision(&self) -> Result<(Dataset, Table), Error> {
        let config = self.config;
        let metadata = Dataset::new(&config.project_id, &config.dataset_id);
        self.invoke(Step::CreateDataset, self.client.dataset().create(&metadata))
            .await?;
        let dataset = self
            .invoke(
                Step::GetDataset,
                self.client.dataset().get(&config.project_id, &config.dataset_id),
            )
            .await?;
        tracing::debug!(?dataset, "dataset created");

        let metadata = Table::new(config.table_reference(), event_schema());
        self.invoke(Step::CreateTable, self.client.table().create(&metadata))
            .await?;
        let table = self
            .invoke(
                Step::GetTable,
                self.client
                    .table()
                    .get(&config.project_id, &config.dataset_id, &config.table_id),
            )
            .await?;
        tracing::debug!(?table, "table created");
        Ok((dataset, table))
    }

    async fn insert_records(&self) -> Result<usize, Error> {
        let config = self.config;
        let request = InsertAllRequest::new(sample_records());
        let response = self
            .invoke(
                Step::InsertRecords,
                self.client
                    .tabledata()
                    .insert(&config.project_id, &config.dataset_id, &config.table_id, &request),
            )
            .await?;
        if let Some(errors) = response.insert_errors.filter(|errors| !errors.is_empty()) {
            let reason = errors
                .iter()
                .flat_map(|e| e.errors.iter())
                .map(|e| e.message.clone())
                .next()
                .unwrap_or_default();
            return Err(Error::InsertRejected {
                step: Step::InsertRecords,
                rejected: errors.len(),
                total: request.rows.len(),
                reason,
            });
        }
        tracing::debug!("inserted {} records", request.rows.len());
        Ok(request.rows.len())
    }

    async fn query_events(&self) -> Result<Vec<Labels>, Error> {
        let request = QueryRequest {
            query: self.config.query(),
            use_legacy_sql: false,
            ..Default::default()
        };
        tracing::debug!(query = request.query.as_str(), "run query");
        let mut iterator = self
            .invoke(Step::RunQuery, self.client.query(&self.config.project_id, request))
            .await?;
        let mut matched = vec![];
        while let Some(labels) = self.invoke(Step::ReadRow, iterator.next::<Labels>()).await? {
            tracing::info!(?labels, "got record");
            matched.push(labels);
        }
        Ok(matched)
    }

    /// Races a remote call against the cancellation token and the run deadline.
    async fn invoke<T, E: StepContext>(&self, step: Step, f: impl Future<Output = Result<T, E>>) -> Result<T, Error> {
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.ctx.cancelled() => Err(Error::Cancelled { step }),
            _ = expired => Err(Error::DeadlineExceeded { step, timeout: self.config.timeout }),
            v = f => v.map_err(|e| e.at(step)),
        }
    }

    /// Deletes the dataset and its tables. Failures are logged, never returned.
    ///
    /// Runs under its own timeout and ignores the cancellation token, which may already be cancelled.
    async fn teardown(&self) {
        let config = self.config;
        let delete = self
            .client
            .dataset()
            .delete_with_contents(&config.project_id, &config.dataset_id);
        match tokio::time::timeout(config.teardown_timeout, delete).await {
            Ok(Ok(())) => tracing::debug!(dataset_id = config.dataset_id.as_str(), "dataset is deleted"),
            Ok(Err(e)) => tracing::error!("{}", e.at(Step::DeleteDataset)),
            Err(_) => tracing::error!(
                "{}",
                Error::DeadlineExceeded {
                    step: Step::DeleteDataset,
                    timeout: config.teardown_timeout,
                }
            ),
        }
    }
}
