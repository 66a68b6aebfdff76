//! Error types for Lumina

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LuminaError>;

#[derive(Error, Debug)]
pub enum LuminaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not authenticated: sign in with `lum-account login` first")]
    NotAuthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl LuminaError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LuminaError::NotAuthenticated => 2,
            LuminaError::InvalidInput(_) => 3,
            LuminaError::NotFound(_) => 4,
            LuminaError::Config(_) => 1,
            LuminaError::Database(_) => 1,
            LuminaError::Catalog(_) => 1,
            LuminaError::Storage(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt document field '{field}': {reason}")]
    CorruptDocument { field: &'static str, reason: String },
}

/// Failures talking to the external book-metadata API.
///
/// These never reach callers of `CatalogService`; they are logged there and
/// turned into empty results.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Catalog is not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse local state: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize local state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_not_authenticated() {
        assert_eq!(LuminaError::NotAuthenticated.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_invalid_input() {
        let error = LuminaError::InvalidInput("Review text cannot be empty".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_not_found() {
        let error = LuminaError::NotFound("book 9780000000000".to_string());
        assert_eq!(error.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_infrastructure_errors() {
        let config = LuminaError::Config(ConfigError::MissingField("database.path".to_string()));
        assert_eq!(config.exit_code(), 1);

        let db = LuminaError::Database(DbError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        )));
        assert_eq!(db.exit_code(), 1);

        let catalog = LuminaError::Catalog(CatalogError::Network("timed out".to_string()));
        assert_eq!(catalog.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_invalid_input() {
        let error = LuminaError::InvalidInput("Rating must be between 0 and 5".to_string());
        assert_eq!(
            format!("{}", error),
            "Invalid input: Rating must be between 0 and 5"
        );
    }

    #[test]
    fn test_error_message_formatting_catalog_status() {
        let error: LuminaError = CatalogError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into();
        assert_eq!(
            format!("{}", error),
            "Catalog error: Catalog returned HTTP 401: Unauthorized"
        );
    }

    #[test]
    fn test_not_authenticated_message_mentions_login() {
        let message = format!("{}", LuminaError::NotAuthenticated);
        assert!(message.contains("lum-account login"));
    }

    #[test]
    fn test_error_conversion_from_db_error() {
        let db_error = DbError::CorruptDocument {
            field: "book_data",
            reason: "expected object".to_string(),
        };
        let error: LuminaError = db_error.into();

        match error {
            LuminaError::Database(DbError::CorruptDocument { field, .. }) => {
                assert_eq!(field, "book_data");
            }
            _ => panic!("Expected LuminaError::Database"),
        }
    }

    #[test]
    fn test_catalog_error_clone() {
        let original = CatalogError::Decode("missing field `books`".to_string());
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }
}
