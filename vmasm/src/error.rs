use crate::token::Kind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsmError {
    // Lexer
    #[error("Unknown token at {0}:{1}")]
    UnknownToken(usize, usize),

    // Parser
    #[error("Expected {0:?}, got {1:?} at {2}:{3}")]
    Expected(Kind, Kind, usize, usize),

    #[error("Expected integer at {0}:{1}")]
    ExpectedInt(usize, usize),

    #[error("Cannot parse integer `{0}` at {1}:{2}")]
    BadInt(String, usize, usize),

    #[error("Unknown mnemonic `{0}` at {1}:{2}")]
    UnknownMnemonic(String, usize, usize),

    #[error("Register out of range at {0}:{1}")]
    RegisterRange(usize, usize),

    #[error("`{0}` is only allowed in the data section ({1}:{2})")]
    DirectiveOutsideData(String, usize, usize),

    #[error("`.byte` cannot take a symbolic operand at {0}:{1}")]
    ByteWithSymbol(usize, usize),

    #[error("Duplicate symbol `{0}` at {1}:{2}")]
    DuplicateSymbol(String, usize, usize),

    // Macro expander
    #[error("`.macro` without a name at line {0}")]
    MacroMissingName(usize),

    #[error("Bad macro arity `{0}` at line {1}")]
    MacroBadArity(String, usize),

    #[error("`.macro` inside a macro definition at line {0}")]
    NestedMacro(usize),

    #[error("Unterminated macro `{0}` (missing `.endm`)")]
    UnterminatedMacro(String),

    #[error("Macro `{0}` expects {1} argument(s), got {2} at line {3}")]
    MacroArity(String, usize, usize, usize),

    // File boundary
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
