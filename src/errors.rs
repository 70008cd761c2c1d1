use thiserror::Error;

/// Application-level error type.
///
/// Skills enhancement never surfaces here: its failures are absorbed into the
/// empty-skills fallback. Everything below is fatal and propagates to `main`,
/// which exits non-zero with the diagnostic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Skeleton error: {0}")]
    Skeleton(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Docx error: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
