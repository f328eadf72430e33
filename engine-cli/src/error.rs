use thiserror::Error;

use engine::EngineError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Input(String),
}
