use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// Opcode byte of the fixed-width instruction word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum Op {
    Ldi = 1,
    Mov = 2,
    Add = 3,
    Sub = 4,
    And = 5,
    Or = 6,
    Xor = 7,
    Lw = 8,
    Sw = 9,
    Jmp = 10,
    Beq = 11,
    Bne = 12,
    Call = 13,
    Ret = 14,
    Halt = 15,
}

impl Op {
    /// Mnemonics are case-insensitive in source.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Unknown mnemonic: {s}")),
        }
    }
}
