/// Errors raised while fetching and aggregating project items.
#[derive(Debug, thiserror::Error)]
pub enum BurndownError {
    /// The endpoint answered with top-level query errors
    #[error("GraphQL query failed: {0}")]
    Protocol(String),

    /// The response is missing part of the expected envelope
    #[error("unexpected response structure: {0}")]
    Schema(String),

    /// No project with the requested title exists in the organization
    #[error("project '{project}' not found in organization '{org}'")]
    NotFound { org: String, project: String },

    /// A closure timestamp did not match `YYYY-MM-DDTHH:MM:SSZ`
    #[error("malformed closure timestamp '{value}': {source}")]
    Format {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A weighted field holds text that is not a number
    #[error("field '{field}' on '{item}' is not numeric: '{value}'")]
    NonNumeric { field: String, item: String, value: String },

    /// Transport failure or non-success HTTP status
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Required configuration is absent or invalid
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BurndownError>;
