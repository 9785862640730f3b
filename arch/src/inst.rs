use crate::op::Op;

/// Every instruction encodes to exactly this many bytes.
pub const INST_SIZE: usize = 8;

/// One fixed-width instruction word: `[op][rd][rs1][rs2][imm:i32 LE]`.
/// Unused register slots stay 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inst {
    pub op: Op,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm: i32,
}

impl Inst {
    pub fn encode(&self) -> [u8; INST_SIZE] {
        let mut b = [0u8; INST_SIZE];
        b[0] = self.op.into();
        b[1] = self.rd;
        b[2] = self.rs1;
        b[3] = self.rs2;
        b[4..8].copy_from_slice(&self.imm.to_le_bytes());
        b
    }

    pub fn decode(b: &[u8; INST_SIZE]) -> Result<Inst, String> {
        let op = Op::try_from(b[0]).map_err(|_| format!("Unknown opcode: 0x{:02X}", b[0]))?;
        Ok(Inst {
            op,
            rd: b[1],
            rs1: b[2],
            rs2: b[3],
            imm: i32::from_le_bytes([b[4], b[5], b[6], b[7]]),
        })
    }
}
