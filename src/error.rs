use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum OpsError {
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("schema verification failed for table `{table}`: {source}")]
    SchemaVerificationFailed {
        table: &'static str,
        #[source]
        source: SqlxError,
    },

    #[error("unsupported database URL scheme `{0}`; only sqlite databases are handled")]
    UnsupportedDatabase(String),

    #[error("database file not found: {}", .0.display())]
    DatabaseNotFound(std::path::PathBuf),
}

impl From<figment::Error> for OpsError {
    fn from(e: figment::Error) -> Self {
        OpsError::Config(Box::new(e))
    }
}

impl OpsError {
    /// Connectivity failures (database or HTTP unreachable) as opposed to
    /// configuration or data problems.
    pub fn is_connectivity(&self) -> bool {
        match self {
            OpsError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            OpsError::Database(SqlxError::Io(_))
            | OpsError::Database(SqlxError::PoolTimedOut)
            | OpsError::Database(SqlxError::PoolClosed) => true,
            _ => false,
        }
    }
}
