use arch::inst::{Inst, INST_SIZE};
use arch::op::Op;
use arch::reg;
use indexmap::IndexMap;
use vmobj::object::{Object, Reloc, Symbol, RELOC_ABS32};
use vmobj::section::Section;

use crate::error::AsmError;
use crate::token::{Kind, Token};

// ----------------------------------------------------------------------------
// Output
// ----------------------------------------------------------------------------

/// One parsed text-section instruction. `label_ref` keeps the symbolic
/// operand that produced the matching relocation.
#[derive(Debug, Clone)]
pub struct TextInst {
    pub inst: Inst,
    pub label_ref: Option<String>,
    pub line: usize,
}

/// Everything a single source file assembles to.
#[derive(Debug)]
pub struct Parsed {
    pub insts: Vec<TextInst>,
    pub data: Vec<u8>,
    pub symbols: IndexMap<String, Symbol>,
    pub relocs: Vec<Reloc>,
}

impl Parsed {
    pub fn text_bytes(&self) -> Vec<u8> {
        let mut text = Vec::with_capacity(self.insts.len() * INST_SIZE);
        for ti in &self.insts {
            text.extend_from_slice(&ti.inst.encode());
        }
        text
    }

    pub fn into_object(self, path: &str) -> Object {
        let text = self.text_bytes();
        Object {
            path: path.to_string(),
            text,
            data: self.data,
            symbols: self.symbols.into_values().collect(),
            relocs: self.relocs,
        }
    }
}

// ----------------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------------

/// Single pass over the token stream. The current section starts at Text;
/// labels and forward references never need a second pass because symbolic
/// operands become relocations for the linker.
pub struct Parser {
    toks: Vec<Token>,
    i: usize,
    section: Section,
    insts: Vec<TextInst>,
    data: Vec<u8>,
    symbols: IndexMap<String, Symbol>,
    relocs: Vec<Reloc>,
}

impl Parser {
    pub fn new(toks: Vec<Token>) -> Self {
        Parser {
            toks,
            i: 0,
            section: Section::Text,
            insts: Vec::new(),
            data: Vec::new(),
            symbols: IndexMap::new(),
            relocs: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Parsed, AsmError> {
        while !self.at(Kind::Eof) {
            if self.at(Kind::Newline) {
                self.i += 1;
                continue;
            }
            if self.at(Kind::Label) {
                self.label()?;
                continue;
            }
            if self.at(Kind::Directive) {
                self.directive()?;
                continue;
            }
            if self.at(Kind::Ident) {
                if self.section == Section::Text {
                    self.instruction()?;
                    self.maybe(Kind::Newline);
                } else {
                    // identifiers outside Text are ignored; advance one
                    // token so the loop cannot stall
                    self.i += 1;
                }
                continue;
            }
            // stray token, skip
            self.i += 1;
        }
        Ok(Parsed {
            insts: self.insts,
            data: self.data,
            symbols: self.symbols,
            relocs: self.relocs,
        })
    }
}

// ----------------------------------------------------------------------------
// Token plumbing
// ----------------------------------------------------------------------------

impl Parser {
    fn cur(&self) -> &Token {
        // the stream always ends with Eof and `i` never passes it
        &self.toks[self.i.min(self.toks.len() - 1)]
    }

    fn at(&self, kind: Kind) -> bool {
        self.cur().kind == kind
    }

    fn eat(&mut self, kind: Kind) -> Result<Token, AsmError> {
        let t = self.cur().clone();
        if t.kind != kind {
            return Err(AsmError::Expected(kind, t.kind, t.line, t.col));
        }
        self.i += 1;
        Ok(t)
    }

    fn maybe(&mut self, kind: Kind) -> bool {
        if self.at(kind) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    fn skip_line(&mut self) {
        while !self.at(Kind::Newline) && !self.at(Kind::Eof) {
            self.i += 1;
        }
        self.maybe(Kind::Newline);
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl Parser {
    fn section_size(&self) -> u32 {
        match self.section {
            Section::Text => (self.insts.len() * INST_SIZE) as u32,
            _ => self.data.len() as u32,
        }
    }

    fn label(&mut self) -> Result<(), AsmError> {
        let t = self.eat(Kind::Label)?;
        let name = t.text[..t.text.len() - 1].to_string();
        let value = self.section_size();
        self.define(name, self.section, value, t.line, t.col)?;
        self.maybe(Kind::Newline);
        Ok(())
    }

    /// Defining a name that `.global` already announced upgrades the Undef
    /// placeholder in place; a second real definition is an error.
    fn define(
        &mut self,
        name: String,
        section: Section,
        value: u32,
        line: usize,
        col: usize,
    ) -> Result<(), AsmError> {
        match self.symbols.get_mut(&name) {
            Some(sym) if sym.section == Section::Undef => {
                sym.section = section;
                sym.value = value;
                Ok(())
            }
            Some(_) => Err(AsmError::DuplicateSymbol(name, line, col)),
            None => {
                self.symbols.insert(
                    name.clone(),
                    Symbol {
                        name,
                        section,
                        value,
                        global: false,
                    },
                );
                Ok(())
            }
        }
    }

    fn mark_global(&mut self, name: &str) {
        match self.symbols.get_mut(name) {
            Some(sym) => sym.global = true,
            None => {
                self.symbols.insert(
                    name.to_string(),
                    Symbol {
                        name: name.to_string(),
                        section: Section::Undef,
                        value: 0,
                        global: true,
                    },
                );
            }
        }
    }

    fn directive(&mut self) -> Result<(), AsmError> {
        let t = self.eat(Kind::Directive)?;
        match t.text.to_ascii_lowercase().as_str() {
            ".text" => self.section = Section::Text,
            ".data" => self.section = Section::Data,
            ".global" => loop {
                let id = self.eat(Kind::Ident)?;
                self.mark_global(&id.text);
                if !self.maybe(Kind::Comma) {
                    break;
                }
            },
            ".byte" => {
                if self.section != Section::Data {
                    return Err(AsmError::DirectiveOutsideData(t.text, t.line, t.col));
                }
                loop {
                    let cur = self.cur();
                    if cur.kind == Kind::Ident {
                        return Err(AsmError::ByteWithSymbol(cur.line, cur.col));
                    }
                    let v = self.parse_int()?;
                    self.data.push(v as u8);
                    if !self.maybe(Kind::Comma) {
                        break;
                    }
                }
            }
            ".word" => {
                if self.section != Section::Data {
                    return Err(AsmError::DirectiveOutsideData(t.text, t.line, t.col));
                }
                if self.at(Kind::Ident) {
                    // placeholder now, patched by the linker
                    let id = self.eat(Kind::Ident)?;
                    let offset = self.data.len() as u32;
                    self.data.extend_from_slice(&0u32.to_le_bytes());
                    self.relocs.push(Reloc {
                        section: Section::Data,
                        kind: RELOC_ABS32,
                        offset,
                        name: id.text,
                    });
                } else {
                    let v = self.parse_int()?;
                    self.data.extend_from_slice(&v.to_le_bytes());
                }
            }
            // unrecognized directives are skipped wholesale
            _ => {}
        }
        self.skip_line();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Instructions
// ----------------------------------------------------------------------------

impl Parser {
    fn parse_reg(&mut self) -> Result<u8, AsmError> {
        let t = self.eat(Kind::Register)?;
        reg::parse(&t.text).map_err(|_| AsmError::RegisterRange(t.line, t.col))
    }

    /// Integer literals wrap to 32 bits the way the encoded immediate does
    /// (`0xFFFFFFFF` is -1).
    fn parse_int(&mut self) -> Result<i32, AsmError> {
        let t = self.cur().clone();
        let parsed = match t.kind {
            Kind::HexInt => i64::from_str_radix(&t.text[2..], 16),
            Kind::BinInt => i64::from_str_radix(&t.text[2..], 2),
            Kind::DecInt => t.text.parse::<i64>(),
            _ => return Err(AsmError::ExpectedInt(t.line, t.col)),
        };
        let v = parsed.map_err(|_| AsmError::BadInt(t.text.clone(), t.line, t.col))?;
        self.i += 1;
        Ok(v as i32)
    }

    fn comma(&mut self) -> Result<(), AsmError> {
        self.eat(Kind::Comma).map(|_| ())
    }

    /// An identifier defers resolution to the linker; anything else must be
    /// an integer literal.
    fn label_or_int(&mut self) -> Result<(i32, Option<String>), AsmError> {
        if self.at(Kind::Ident) {
            let t = self.eat(Kind::Ident)?;
            Ok((0, Some(t.text)))
        } else {
            Ok((self.parse_int()?, None))
        }
    }

    fn instruction(&mut self) -> Result<(), AsmError> {
        let t = self.eat(Kind::Ident)?;
        let op = Op::parse(&t.text)
            .map_err(|_| AsmError::UnknownMnemonic(t.text.clone(), t.line, t.col))?;

        let (mut rd, mut rs1, mut rs2) = (0u8, 0u8, 0u8);
        let mut imm = 0i32;
        let mut label_ref = None;

        match op {
            Op::Ldi => {
                rd = self.parse_reg()?;
                self.comma()?;
                imm = self.parse_int()?;
            }
            Op::Mov => {
                rd = self.parse_reg()?;
                self.comma()?;
                rs1 = self.parse_reg()?;
            }
            Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor => {
                rd = self.parse_reg()?;
                self.comma()?;
                rs1 = self.parse_reg()?;
                self.comma()?;
                rs2 = self.parse_reg()?;
            }
            Op::Lw => {
                rd = self.parse_reg()?;
                self.comma()?;
                self.eat(Kind::LBrack)?;
                rs1 = self.parse_reg()?;
                self.eat(Kind::RBrack)?;
            }
            Op::Sw => {
                rs2 = self.parse_reg()?;
                self.comma()?;
                self.eat(Kind::LBrack)?;
                rs1 = self.parse_reg()?;
                self.eat(Kind::RBrack)?;
            }
            Op::Jmp | Op::Call => {
                (imm, label_ref) = self.label_or_int()?;
            }
            Op::Beq | Op::Bne => {
                rs1 = self.parse_reg()?;
                self.comma()?;
                rs2 = self.parse_reg()?;
                self.comma()?;
                (imm, label_ref) = self.label_or_int()?;
            }
            Op::Ret | Op::Halt => {}
        }

        let idx = self.insts.len();
        self.insts.push(TextInst {
            inst: Inst {
                op,
                rd,
                rs1,
                rs2,
                imm,
            },
            label_ref: label_ref.clone(),
            line: t.line,
        });
        if let Some(name) = label_ref {
            // the immediate field starts at byte 4 of the 8-byte word
            self.relocs.push(Reloc {
                section: Section::Text,
                kind: RELOC_ABS32,
                offset: (idx * INST_SIZE + 4) as u32,
                name,
            });
        }
        Ok(())
    }
}
