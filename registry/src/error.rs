use thiserror::Error;

/// Errors raised by a component registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{category} component '{name}' is already registered")]
    DuplicateName {
        category: &'static str,
        name: String,
    },

    #[error("no {category} component registered under '{name}'")]
    UnknownComponent {
        category: &'static str,
        name: String,
    },

    #[error("failed to construct {category} component '{name}': {reason}")]
    Construction {
        category: &'static str,
        name: String,
        reason: String,
    },

    #[error("{category} registry is frozen, registration is closed")]
    Frozen { category: &'static str },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
