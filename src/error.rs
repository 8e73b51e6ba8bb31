use thiserror::Error;

#[derive(Error, Debug)]
pub enum YagdError {
    #[error("Package `{0}` is not installed. Run `brew install gh` or visit https://cli.github.com")]
    MissingDependency(String),

    #[error("No repositories specified. Pass --repos or set `repos` in the saved config.")]
    MissingConfiguration,

    #[error("Failed to run `{program}`: {source}")]
    ExternalTool {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    ExternalToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` produced output that is not valid UTF-8: {source}")]
    NonUtf8Output {
        program: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Malformed output from {context} (line {line}): {source}")]
    MalformedOutput {
        context: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, YagdError>;
