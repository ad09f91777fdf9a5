pub mod ledger;
pub mod resolver;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Exactly one of the working/publish flags must be set")]
    AmbiguousExportKind,
    #[error("Unknown entity kind '{0}', expected 'asset' or 'shot'")]
    UnknownEntityKind(String),
    #[error("Placeholder {{{0}}} not found in folder template")]
    TokenNotFound(String),
    #[error("Template still contains unresolved placeholders after substitution: {0}")]
    UnresolvedPlaceholder(String),
    #[error("Version number has not been resolved yet")]
    UnsetRevision,
    #[error("Project '{0}' has no path-template document")]
    NoFileTree(String),
}
