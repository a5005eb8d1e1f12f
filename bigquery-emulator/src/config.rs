use std::time::Duration;

use crate::error::Error;
use crate::http::table::TableReference;

/// Environment variable holding the emulator address, e.g. `localhost:9050`.
pub const EMULATOR_HOST_ENV: &str = "BIGQUERY_EMULATOR_HOST";

pub const DEFAULT_PROJECT_ID: &str = "test-project";
pub const DEFAULT_DATASET_ID: &str = "test_dataset";
pub const DEFAULT_TABLE_ID: &str = "test_table";
pub const DEFAULT_LABEL: &str = "article_created";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the emulator listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmulatorConfig {
    host: String,
}

impl EmulatorConfig {
    pub fn new(host: impl Into<String>) -> Result<Self, Error> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::MissingConfig(EMULATOR_HOST_ENV));
        }
        Ok(Self { host })
    }

    /// Reads `BIGQUERY_EMULATOR_HOST`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        match lookup(EMULATOR_HOST_ENV) {
            Some(host) => Self::new(host),
            None => Err(Error::MissingConfig(EMULATOR_HOST_ENV)),
        }
    }

    pub fn host(&self) -> &str {
        self.host.as_str()
    }
}

/// Which steps a run performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Create the dataset and the table, then tear them down.
    Provision,
    /// Additionally insert the sample records and query them back.
    #[default]
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    /// `labels.event_id` value the query filters on.
    pub label: String,
    /// Bound of the whole run, teardown excluded.
    pub timeout: Duration,
    /// Bound of the dataset deletion.
    pub teardown_timeout: Duration,
    pub mode: Mode,
    /// Logs every response body.
    pub debug: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            dataset_id: DEFAULT_DATASET_ID.to_string(),
            table_id: DEFAULT_TABLE_ID.to_string(),
            label: DEFAULT_LABEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            teardown_timeout: DEFAULT_TEARDOWN_TIMEOUT,
            mode: Mode::default(),
            debug: false,
        }
    }
}

impl WorkflowConfig {
    pub fn with_project_id(mut self, value: impl Into<String>) -> Self {
        self.project_id = value.into();
        self
    }

    pub fn with_dataset_id(mut self, value: impl Into<String>) -> Self {
        self.dataset_id = value.into();
        self
    }

    pub fn with_table_id(mut self, value: impl Into<String>) -> Self {
        self.table_id = value.into();
        self
    }

    pub fn with_label(mut self, value: impl Into<String>) -> Self {
        self.label = value.into();
        self
    }

    pub fn with_timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn with_teardown_timeout(mut self, value: Duration) -> Self {
        self.teardown_timeout = value;
        self
    }

    pub fn with_mode(mut self, value: Mode) -> Self {
        self.mode = value;
        self
    }

    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    pub fn table_reference(&self) -> TableReference {
        TableReference {
            project_id: self.project_id.clone(),
            dataset_id: self.dataset_id.clone(),
            table_id: self.table_id.clone(),
        }
    }

    /// The statically formatted filter query run by the full workflow.
    ///
    /// The label is escaped into a double-quoted string literal.
    pub fn query(&self) -> String {
        format!(
            r#"SELECT labels.event_id FROM {} WHERE labels.event_id="{}""#,
            self.table_reference().sql_path(),
            escape_string_literal(&self.label)
        )
    }
}

fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}
