use std::fmt::{Display, Formatter};

use tabtune_lib::catalog::CatalogError;
use tabtune_lib::settings::SettingsError;

/// Error type for CLI commands.
#[derive(Debug)]
pub enum CliError {
    Settings(SettingsError),
    Catalog(CatalogError),
    Io(std::io::Error),
    Json(serde_json::Error),
    NoDataDir,
    InvalidArgument { name: &'static str, value: String },
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settings(err) => write!(f, "{}", err),
            Self::Catalog(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
            Self::NoDataDir => write!(f, "no data directory found; pass --data-dir"),
            Self::InvalidArgument { name, value } => {
                write!(f, "invalid value for {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<SettingsError> for CliError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<CatalogError> for CliError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
