use crate::error::AsmError;
use crate::token::{Kind, Token};

/// Tokenize a whole source file. The token list always ends with exactly
/// one `Eof`.
pub fn lex(src: &str) -> Result<Vec<Token>, AsmError> {
    Lexer::new(src).run()
}

struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            input: src.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self, n: usize) -> char {
        self.input.get(self.pos + n).copied().unwrap_or('\0')
    }

    fn bump(&mut self) {
        self.pos += 1;
        self.col += 1;
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while !self.at_end() && pred(self.peek(0)) {
            self.bump();
        }
        self.input[start..self.pos].iter().collect()
    }

    /// Whitespace and `;` comments are discarded, but columns keep advancing
    /// so error positions stay exact.
    fn skip_blank(&mut self) {
        loop {
            match self.peek(0) {
                ' ' | '\t' => self.bump(),
                ';' => {
                    while !self.at_end() && self.peek(0) != '\n' {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Rules
// ----------------------------------------------------------------------------

impl Lexer {
    fn run(mut self) -> Result<Vec<Token>, AsmError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blank();
            let (line, col) = (self.line, self.col);
            if self.at_end() {
                tokens.push(Token::new(Kind::Eof, "", line, col));
                return Ok(tokens);
            }
            let tok = match self.peek(0) {
                '\n' => {
                    let run = self.take_while(|c| c == '\n');
                    self.line += run.len();
                    self.col = 1;
                    Token::new(Kind::Newline, "\n", line, col)
                }
                ',' => self.punct(Kind::Comma),
                '[' => self.punct(Kind::LBrack),
                ']' => self.punct(Kind::RBrack),
                '+' => self.punct(Kind::Plus),
                '.' => self.directive()?,
                '"' => self.string()?,
                '-' => self.number()?,
                c if c.is_ascii_digit() => self.number()?,
                c if is_ident_start(c) => self.word(),
                _ => return Err(AsmError::UnknownToken(line, col)),
            };
            tokens.push(tok);
        }
    }

    fn punct(&mut self, kind: Kind) -> Token {
        let (line, col) = (self.line, self.col);
        let c = self.peek(0);
        self.bump();
        Token::new(kind, c.to_string(), line, col)
    }

    fn directive(&mut self) -> Result<Token, AsmError> {
        let (line, col) = (self.line, self.col);
        if !is_ident_start(self.peek(1)) {
            return Err(AsmError::UnknownToken(line, col));
        }
        self.bump(); // '.'
        let name = self.take_while(is_ident_char);
        Ok(Token::new(Kind::Directive, format!(".{name}"), line, col))
    }

    /// An identifier-shaped word becomes a Label when a `:` follows, a
    /// Register when it spells `r`/`x` plus 0-31, and an Ident otherwise.
    fn word(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let text = self.take_while(is_ident_char);
        if self.peek(0) == ':' {
            self.bump();
            return Token::new(Kind::Label, format!("{text}:"), line, col);
        }
        if is_register(&text) {
            return Token::new(Kind::Register, text, line, col);
        }
        Token::new(Kind::Ident, text, line, col)
    }

    fn number(&mut self) -> Result<Token, AsmError> {
        let (line, col) = (self.line, self.col);
        let neg = self.peek(0) == '-';
        if neg {
            if !self.peek(1).is_ascii_digit() {
                return Err(AsmError::UnknownToken(line, col));
            }
            self.bump();
        }
        // 0x / 0b need at least one digit of the base, else the 0 lexes as
        // a plain decimal and the rest starts a new token
        if !neg && self.peek(0) == '0' && self.peek(1) == 'x' && self.peek(2).is_ascii_hexdigit() {
            self.bump();
            self.bump();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            return Ok(Token::new(Kind::HexInt, format!("0x{digits}"), line, col));
        }
        if !neg && self.peek(0) == '0' && self.peek(1) == 'b' && matches!(self.peek(2), '0' | '1') {
            self.bump();
            self.bump();
            let digits = self.take_while(|c| matches!(c, '0' | '1'));
            return Ok(Token::new(Kind::BinInt, format!("0b{digits}"), line, col));
        }
        let digits = self.take_while(|c| c.is_ascii_digit());
        let text = if neg { format!("-{digits}") } else { digits };
        Ok(Token::new(Kind::DecInt, text, line, col))
    }

    /// Strings are lexed (with `\` escapes kept raw) but no current
    /// directive consumes them.
    fn string(&mut self) -> Result<Token, AsmError> {
        let (line, col) = (self.line, self.col);
        let mut text = String::from('"');
        self.bump();
        loop {
            if self.at_end() || self.peek(0) == '\n' {
                return Err(AsmError::UnknownToken(line, col));
            }
            match self.peek(0) {
                '\\' => {
                    if self.pos + 1 >= self.input.len() {
                        return Err(AsmError::UnknownToken(line, col));
                    }
                    text.push('\\');
                    text.push(self.peek(1));
                    self.bump();
                    self.bump();
                }
                '"' => {
                    text.push('"');
                    self.bump();
                    return Ok(Token::new(Kind::Str, text, line, col));
                }
                c => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `r`/`x` followed by a decimal 0-31 without leading zeros. Anything
/// longer (`r32`, `r007`, `r1a`) stays an identifier.
fn is_register(word: &str) -> bool {
    let Some(digits) = word.strip_prefix(['r', 'x']) else {
        return false;
    };
    matches!(
        digits.as_bytes(),
        [b'0'..=b'9'] | [b'1'..=b'2', b'0'..=b'9'] | [b'3', b'0'..=b'1']
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Kind> {
        lex(src).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_single_eof() {
        for src in ["", "\n", "ldi r1, 5\nhalt\n", "; only a comment"] {
            let toks = lex(src).unwrap();
            let eofs = toks.iter().filter(|t| t.kind == Kind::Eof).count();
            assert_eq!(eofs, 1, "source: {src:?}");
            assert_eq!(toks.last().unwrap().kind, Kind::Eof);
        }
    }

    #[test]
    fn smoke() {
        use Kind::*;
        assert_eq!(
            kinds("main:\n  ldi r1, 0x2A ; load\n  beq r0, r0, main\n"),
            vec![
                Label, Newline, Ident, Register, Comma, HexInt, Newline, Ident, Register, Comma,
                Register, Comma, Ident, Newline, Eof
            ]
        );
    }

    #[test]
    fn register_boundaries() {
        use Kind::*;
        assert_eq!(kinds("r0 x31 r32 r05 r1a R5"), vec![
            Register, Register, Ident, Ident, Ident, Ident, Eof
        ]);
    }

    #[test]
    fn label_wins_over_register() {
        let toks = lex("r1: mov r1, r2\n").unwrap();
        assert_eq!(toks[0].kind, Kind::Label);
        assert_eq!(toks[0].text, "r1:");
    }

    #[test]
    fn int_forms() {
        use Kind::*;
        assert_eq!(kinds("42 -7 0x2A 0b101 0xg 0b2"), vec![
            DecInt, DecInt, HexInt, BinInt, DecInt, Ident, DecInt, Ident, Eof
        ]);
    }

    #[test]
    fn newline_runs_collapse() {
        let toks = lex("halt\n\n\nhalt\n").unwrap();
        let newlines = toks.iter().filter(|t| t.kind == Kind::Newline).count();
        assert_eq!(newlines, 2);
        // the second halt sits on line 4
        assert_eq!(toks[2].line, 4);
    }

    #[test]
    fn positions() {
        let toks = lex("  ldi r1, 5").unwrap();
        assert_eq!((toks[0].line, toks[0].col), (1, 3));
        assert_eq!((toks[1].line, toks[1].col), (1, 7));
        assert_eq!((toks[2].line, toks[2].col), (1, 9));
        assert_eq!((toks[3].line, toks[3].col), (1, 11));
    }

    #[test]
    fn unknown_token_position() {
        match lex("ldi r1, 5\n  ?") {
            Err(AsmError::UnknownToken(2, 3)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn strings_lex() {
        let toks = lex("\"hi \\\" there\"").unwrap();
        assert_eq!(toks[0].kind, Kind::Str);
        assert_eq!(toks[0].text, "\"hi \\\" there\"");
        assert!(lex("\"unterminated").is_err());
    }
}
