pub mod app_config;
pub mod config;
pub mod entity;
pub mod location;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entity::{load_candidates, CandidateEntity};
pub use location::{
    FailureStage, MatchMethod, Outline, OutlineFormat, OutlineSet, OutlineSource, Resolution,
    ResolvedLocation, UnresolvedReason,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read candidates file {path}: {source}")]
    CandidatesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse candidates file {path}: {reason}")]
    CandidatesParse { path: String, reason: String },
}
