use std::path::PathBuf;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} is not a valid http(s) url: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("ollama returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(thiserror::Error, Debug)]
pub enum FrontmatterError {
    #[error("frontmatter is not valid yaml: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("frontmatter is not a key/value mapping")]
    NotAMapping,
}

#[derive(thiserror::Error, Debug)]
pub enum RatingError {
    #[error("response is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing the \"{0}\" key")]
    MissingKey(&'static str),

    #[error("rating must be a number, got {0}")]
    InvalidRating(String),

    #[error("feedback must be a string, got {0}")]
    InvalidFeedback(String),
}

#[derive(thiserror::Error, Debug)]
pub enum LinkerError {
    #[error(
        "embedding for {path:?} has {got} dimensions, expected {expected}; \
         was the embedding model changed mid-run?"
    )]
    DimensionMismatch {
        path: PathBuf,
        expected: usize,
        got: usize,
    },
}
