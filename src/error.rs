use thiserror::Error;

/// Failures talking to one of the HTTP backends (OpenAI, OpenWeatherMap, Google).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    pub fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ServiceError::Http { service, source }
    }

    pub fn decode(service: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| ServiceError::Decode { service, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Status { status, .. } if *status == reqwest::StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unexpected finish reason: {0}")]
    UnexpectedFinish(String),

    #[error("no final answer after {0} completions")]
    HopLimit(usize),

    #[error("the model returned an empty response")]
    EmptyResponse,
}

/// Rejections and failures of ad-hoc read-only SQL.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("only a single SELECT, WITH or PRAGMA statement is allowed")]
    NotReadOnly,

    #[error("missing value for parameter {0}")]
    MissingParameter(String),

    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}
