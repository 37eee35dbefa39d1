use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// General purpose registers touched by the code generator.
///
/// `AL` aliases the low byte of `RAX`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
    Eq,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Reg {
    #[default]
    RAX,
    RBX,
    RCX,
    RDX,
    RSI,
    RDI,
    AL,
}

impl Reg {
    pub const COUNT: usize = 6;

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    /// Slot in the register file. Byte registers share the slot of their parent.
    pub fn slot(self) -> usize {
        match self {
            Reg::AL => Reg::RAX.into_index(),
            reg => reg.into_index(),
        }
    }

    pub fn is_byte(self) -> bool {
        matches!(self, Reg::AL)
    }

    fn into_index(self) -> usize {
        let idx: u8 = self.into();
        idx as usize
    }
}

/// Condition codes for `setcc` / `jcc`. Comparisons are unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Cond {
    E,
    NE,
    B,
    A,
    BE,
    AE,
}

impl Cond {
    /// Evaluate against the zero and carry flags left by `cmp`.
    pub fn holds(self, zf: bool, cf: bool) -> bool {
        match self {
            Cond::E => zf,
            Cond::NE => !zf,
            Cond::B => cf,
            Cond::A => !cf && !zf,
            Cond::BE => cf || zf,
            Cond::AE => !cf,
        }
    }
}
