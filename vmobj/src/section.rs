use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

/// Section tag as stored in symbol and relocation records. `Undef` marks
/// external references and never carries bytes of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Display)]
#[repr(u16)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Undef = 0,
    Text = 1,
    Data = 2,
}
