use thiserror::Error;

/// Failure taxonomy for a single fetch/search call.
///
/// Every variant is terminal for the call that produced it: the core
/// never retries internally. Callers that want retry/backoff (a query
/// cache, a refresh button) can consult [`ForecastError::is_retryable`].
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider call exceeded the fetch deadline and was cancelled.
    #[error("forecast request timed out")]
    Timeout,

    /// Transport-level failure: DNS, connection, or an unreadable body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status}")]
    Provider { status: u16 },

    /// The provider accepted the request but reported a logical
    /// failure (bad service key, malformed params, no-data sentinel).
    /// `message` is the provider's `resultMsg`, surfaced verbatim.
    #[error("provider rejected request (code {code}): {message}")]
    Rejected { code: String, message: String },

    /// Well-formed response with no usable temperature data.
    #[error("no forecast data for the requested period")]
    NoForecastData,

    /// The static district dataset is missing or corrupt.
    #[error("district dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A hierarchical place key whose region has no known centroid.
    #[error("no coordinates known for place '{0}'")]
    UnknownPlace(String),
}

impl ForecastError {
    /// Whether a blind retry by the caller can plausibly succeed.
    ///
    /// `Rejected` is excluded: a bad key or malformed request fails the
    /// same way every time. `NoForecastData` is retryable because the
    /// next publication cycle may fill the gap.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network(_) | Self::Provider { .. } | Self::NoForecastData
        )
    }
}
