use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure of the response generator collaborator. The session state is left
/// untouched when one of these surfaces.
#[derive(Error, Debug, Clone)]
pub enum GeneratorError {
    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Generator returned an empty reply")]
    EmptyReply,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Rejections of a rename request. State is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    #[error("No session at that index")]
    NotFound,

    #[error("Session name cannot be empty")]
    EmptyName,

    #[error("A session named '{0}' already exists")]
    NameTaken(String),
}
