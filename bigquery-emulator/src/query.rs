use std::collections::VecDeque;
use std::time::Duration;

use crate::http::bigquery_job_client::BigqueryJobClient;
use crate::http::error::Error as HttpError;
use crate::http::job::get_query_results::GetQueryResultsRequest;
use crate::http::tabledata::Tuple;

/// Pause between two `getQueryResults` calls while the job is still running.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Row(#[from] row::Error),
}

/// Rows of a completed query job.
///
/// `next` yields `Ok(None)` once every page has been consumed.
pub struct Iterator {
    pub(crate) client: BigqueryJobClient,
    pub(crate) project_id: String,
    pub(crate) job_id: String,
    pub(crate) request: GetQueryResultsRequest,
    pub(crate) chunk: VecDeque<Tuple>,
    pub total_size: i64,
}

impl Iterator {
    pub async fn next<T: TryFrom<Tuple, Error = row::Error>>(&mut self) -> Result<Option<T>, Error> {
        loop {
            if let Some(v) = self.chunk.pop_front() {
                return Ok(T::try_from(v).map(Some)?);
            }
            if self.request.page_token.is_none() {
                return Ok(None);
            }
            let response = self
                .client
                .get_query_results(self.project_id.as_str(), self.job_id.as_str(), &self.request)
                .await?;
            let rows = match response.rows {
                Some(rows) => rows,
                None => return Ok(None),
            };
            self.chunk = VecDeque::from(rows);
            self.request.page_token = response.page_token;
        }
    }

    pub fn job_id(&self) -> &str {
        self.job_id.as_str()
    }

    /// Polls `getQueryResults` until the job reports completion and loads its first page.
    pub(crate) async fn wait_for_completion(&mut self) -> Result<(), Error> {
        let request = GetQueryResultsRequest {
            page_token: None,
            ..self.request.clone()
        };
        loop {
            let response = self
                .client
                .get_query_results(self.project_id.as_str(), self.job_id.as_str(), &request)
                .await?;
            if response.job_complete {
                self.chunk = VecDeque::from(response.rows.unwrap_or_default());
                self.request.page_token = response.page_token;
                self.total_size = response.total_rows.unwrap_or_default();
                return Ok(());
            }
            tracing::trace!(job_id = self.job_id.as_str(), "query job is still running");
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

pub mod row {
    use crate::http::tabledata::{Cell, Tuple, Value};

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("no data found")]
        NoDataFound,
        #[error("invalid type")]
        InvalidType,
        #[error("unexpected null value")]
        UnexpectedNullValue,
        #[error("invalid number {0}")]
        InvalidNumber(String),
    }

    /// Untyped query row, columns are decoded on access.
    pub struct Row {
        inner: Vec<Cell>,
    }

    impl Row {
        pub fn column<'a, T: TryFrom<&'a Value, Error = Error>>(&'a self, index: usize) -> Result<T, Error> {
            let cell: &Cell = self.inner.get(index).ok_or(Error::NoDataFound)?;
            T::try_from(&cell.v)
        }

        pub fn len(&self) -> usize {
            self.inner.len()
        }

        pub fn is_empty(&self) -> bool {
            self.inner.is_empty()
        }
    }

    impl TryFrom<Tuple> for Row {
        type Error = Error;

        fn try_from(value: Tuple) -> Result<Self, Self::Error> {
            Ok(Self { inner: value.f })
        }
    }

    impl<'a> TryFrom<&'a Value> for &'a str {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            match value {
                Value::String(v) => Ok(v.as_str()),
                Value::Null => Err(Error::UnexpectedNullValue),
                _ => Err(Error::InvalidType),
            }
        }
    }

    impl<'a> TryFrom<&'a Value> for String {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            <&str>::try_from(value).map(|v| v.to_string())
        }
    }

    impl<'a> TryFrom<&'a Value> for Option<String> {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            match value {
                Value::Null => Ok(None),
                v => String::try_from(v).map(Some),
            }
        }
    }

    impl<'a> TryFrom<&'a Value> for i64 {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            let v = <&str>::try_from(value)?;
            v.parse().map_err(|_| Error::InvalidNumber(v.to_string()))
        }
    }

    impl<'a> TryFrom<&'a Value> for &'a Tuple {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            match value {
                Value::Struct(v) => Ok(v),
                Value::Null => Err(Error::UnexpectedNullValue),
                _ => Err(Error::InvalidType),
            }
        }
    }

    impl<'a> TryFrom<&'a Value> for Option<&'a Tuple> {
        type Error = Error;

        fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
            match value {
                Value::Null => Ok(None),
                v => <&Tuple>::try_from(v).map(Some),
            }
        }
    }
}
