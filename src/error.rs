use std::fs::File;
use std::io::BufReader;

/// Error types that can occur during model operations
///
/// # Variants
///
/// - `NotCompiled` - the operation requires a compiled model (optimizer and
///   loss bound via `compile`)
/// - `ConfigError` - the model or training configuration is invalid (unknown
///   optimizer/loss/metric name, layer appended after compile, missing input
///   shape, out-of-range fit parameter)
/// - `InputValidationError` - the input data provided does not meet the
///   expected format, shape, or validation rules
/// - `ProcessingError` - something went wrong while processing (forward or
///   backward pass run out of order, tensor reshaping failure)
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    NotCompiled,
    ConfigError(String),
    InputValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NotCompiled => {
                write!(
                    f,
                    "Model has not been compiled. Call compile() with an optimizer and a loss function before training."
                )
            }
            ModelError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Input/Output error types that can occur during weight serialization and
/// file operations
///
/// # Variants
///
/// - `StdIoError` - wraps standard I/O errors from file system operations
/// - `JsonError` - wraps JSON serialization/deserialization errors
/// - `StructureMismatch` - the saved model structure does not match the
///   model the weights are being loaded into
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    JsonError(serde_json::Error),
    StructureMismatch(String),
}

impl IoError {
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, IoError> {
        let file = File::open(path).map_err(IoError::StdIoError)?;
        Ok(BufReader::new(file))
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::JsonError(e) => write!(f, "JSON error: {}", e),
            IoError::StructureMismatch(msg) => write!(f, "Model structure mismatch: {}", msg),
        }
    }
}

impl std::error::Error for IoError {}
