use thiserror::Error;

#[derive(Error, Debug)]
pub enum VietQrError {
    #[error("Missing required parameter: {0}")]
    MissingField(&'static str),

    #[error("Field {tag} value is {len} bytes, the limit is 99")]
    FieldTooLong { tag: String, len: usize },

    #[error("Invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("Logo ratio must be a positive number, got: {0}")]
    InvalidLogoRatio(String),

    #[error("QR size must be positive")]
    InvalidQrSize,

    #[error("QR encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VietQrError {
    /// Errors caused by the caller's input rather than by rendering.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VietQrError::MissingField(_)
                | VietQrError::FieldTooLong { .. }
                | VietQrError::InvalidAssetName(_)
                | VietQrError::InvalidLogoRatio(_)
                | VietQrError::InvalidQrSize
        )
    }
}

pub type VietQrResult<T> = Result<T, VietQrError>;
