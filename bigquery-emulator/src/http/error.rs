use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error returned from the BigQuery emulator.
    #[error(transparent)]
    Response(#[from] ErrorResponse),

    /// An error from the HTTP client.
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    /// An error raised by a middleware of the HTTP client.
    #[error("http middleware failed: {0}")]
    HttpMiddleware(String),

    /// A response body that does not match the expected resource.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest_middleware::Error> for Error {
    fn from(value: reqwest_middleware::Error) -> Self {
        match value {
            reqwest_middleware::Error::Reqwest(e) => Error::HttpClient(e),
            reqwest_middleware::Error::Middleware(e) => Error::HttpMiddleware(format!("{e:#}")),
        }
    }
}

impl Error {
    /// The HTTP status reported by the emulator, if the request reached it.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Response(e) => Some(e.code),
            Error::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// An HTTP status value, without the textual description.
    ///
    /// Example values include: `400` (Bad Request), `404` (Not Found) and `409` (Conflict).
    pub code: u16,

    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.code)
    }
}

impl std::error::Error for ErrorResponse {}

#[derive(serde::Deserialize)]
pub(crate) struct ErrorWrapper {
    pub(crate) error: ErrorResponse,
}
