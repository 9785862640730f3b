use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Duplicate symbol: {0} defined in {1} and {2}")]
    DuplicateSymbol(String, String, String),

    #[error("Undefined symbols: {0}")]
    UndefinedSymbols(String),

    #[error("Relocation refers to undefined symbol: {0}")]
    SymbolNotFound(String),

    #[error("Unknown relocation section in {0}")]
    BadRelocSection(String),

    #[error("Unsupported reloc type {0} in object {1}")]
    UnsupportedRelocType(u16, String),

    #[error("Relocation write out of range in object {0} for symbol {1}")]
    RelocOutOfRange(String, String),

    #[error(transparent)]
    Format(#[from] vmobj::error::FormatError),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
