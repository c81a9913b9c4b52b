use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Invalid label position {0}: expected a value between 1 and 24")]
    InvalidPosition(u32),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to generate QR code: {0}")]
    QrCode(String),
    #[error("Failed to export sheet: {0}")]
    Export(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
