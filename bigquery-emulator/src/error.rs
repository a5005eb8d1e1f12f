use std::fmt;
use std::time::Duration;

use crate::client;
use crate::http::error::Error as HttpError;
use crate::query;

/// A stage of the workflow, carried by every error it raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    NewClient,
    CreateDataset,
    GetDataset,
    CreateTable,
    GetTable,
    InsertRecords,
    RunQuery,
    ReadRow,
    DeleteDataset,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::NewClient => "new client",
            Step::CreateDataset => "create dataset",
            Step::GetDataset => "get dataset metadata",
            Step::CreateTable => "create table",
            Step::GetTable => "get table metadata",
            Step::InsertRecords => "insert records",
            Step::RunQuery => "run query",
            Step::ReadRow => "read query row",
            Step::DeleteDataset => "delete dataset",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} must not be empty")]
    MissingConfig(&'static str),

    #[error("error {step}: {source}")]
    Client { step: Step, source: client::Error },

    #[error("error {step}: {source}")]
    Http { step: Step, source: HttpError },

    #[error("error {step}: {source}")]
    Query { step: Step, source: query::Error },

    #[error("error {step}: {rejected} of {total} rows rejected: {reason}")]
    InsertRejected {
        step: Step,
        rejected: usize,
        total: usize,
        reason: String,
    },

    #[error("error {step}: cancelled")]
    Cancelled { step: Step },

    #[error("error {step}: deadline of {timeout:?} exceeded")]
    DeadlineExceeded { step: Step, timeout: Duration },
}

impl Error {
    /// The step that failed, `None` for configuration errors raised before any step.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::MissingConfig(_) => None,
            Error::Client { step, .. }
            | Error::Http { step, .. }
            | Error::Query { step, .. }
            | Error::InsertRejected { step, .. }
            | Error::Cancelled { step }
            | Error::DeadlineExceeded { step, .. } => Some(*step),
        }
    }

    /// True when the step was aborted by an interrupt or by the run deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. } | Error::DeadlineExceeded { .. })
    }
}

/// Attaches the failed step to a lower level error.
pub(crate) trait StepContext {
    fn at(self, step: Step) -> Error;
}

impl StepContext for client::Error {
    fn at(self, step: Step) -> Error {
        Error::Client { step, source: self }
    }
}

impl StepContext for HttpError {
    fn at(self, step: Step) -> Error {
        Error::Http { step, source: self }
    }
}

impl StepContext for query::Error {
    fn at(self, step: Step) -> Error {
        Error::Query { step, source: self }
    }
}
