pub mod dump;
pub mod error;
pub mod expand;
pub mod lexer;
pub mod parser;
pub mod token;

use error::AsmError;
use vmobj::object::Object;

/// Full assembler pipeline: macro expansion, lexing, the single parsing
/// pass, then the in-memory object. `path` labels the result and any
/// diagnostics downstream.
pub fn assemble(path: &str, src: &str) -> Result<Object, AsmError> {
    let expanded = expand::expand(src)?;
    let tokens = lexer::lex(&expanded)?;
    let parsed = parser::Parser::new(tokens).parse()?;
    Ok(parsed.into_object(path))
}
