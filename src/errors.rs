// Error types for ultraplan

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum UltraplanError {
    // Allocator and form input errors
    #[snafu(display("Invalid input: {field} - {reason}"))]
    InvalidInput { field: String, reason: String },

    // Planning flow errors
    #[snafu(display("Cannot {action} while in the {from} step"))]
    InvalidStageTransition { from: String, action: String },
    #[snafu(display("A signed-in user is required to save a race plan"))]
    NotSignedIn,

    // Saved race errors
    #[snafu(display("A race named \"{race_name}\" already exists"))]
    DuplicateRaceName { race_name: String },
    #[snafu(display("Saved race not found: {id}"))]
    RaceNotFound { id: String },
    #[snafu(display("Saved race validation failed: {reason}"))]
    StorageValidationError { reason: String },
    #[snafu(display("File operation failed: {operation} - {reason}"))]
    FileOperationError { operation: String, reason: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // CLI input errors
    #[snafu(display("Invalid race plan file: {path}"))]
    InvalidPlanFile { path: String },
}

impl UltraplanError {
    /// Shorthand for the most common error raised by the allocator and parsers.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        UltraplanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
