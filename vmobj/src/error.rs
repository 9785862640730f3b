use thiserror::Error;

/// Container-level failures. Every variant carries the offending file path
/// so the message is usable without surrounding context.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("File too small: {0}")]
    TooSmall(String),

    #[error("Bad magic: {0}")]
    BadMagic(String),

    #[error("Unsupported version {1}: {0}")]
    Version(String, u16),

    #[error("{1} section out of range: {0}")]
    SectionRange(String, crate::section::Section),

    #[error("Symbol table truncated: {0}")]
    SymbolTruncated(String),

    #[error("Symbol name truncated: {0}")]
    SymbolNameTruncated(String),

    #[error("Reloc table truncated: {0}")]
    RelocTruncated(String),

    #[error("Reloc name truncated: {0}")]
    RelocNameTruncated(String),

    #[error("Bad section tag {1}: {0}")]
    BadSection(String, u16),

    #[error("Missing entry trailer: {0}")]
    NoTrailer(String),
}
