pub mod cli;
pub mod job;
pub mod toml_config;

#[cfg(feature = "lambda")]
pub mod lambda;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use cli::LocalStorage;
pub use job::JobConfig;
