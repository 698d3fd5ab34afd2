//! Process configuration for the Richie adapters.
//!
//! The [`RichieContext`] is the context object the CMS injects once at
//! startup; it is passed explicitly to the adapter factories.

pub mod config;
pub mod context;
pub mod logging;

pub use config::{default_logging_config, AppConfig, CliArgs, HttpConfig, LoggingConfig, Section};
pub use context::{
    AuthenticationBackend, JoanieBackend, LmsBackendConfig, LmsBackendKind, RichieContext,
};
