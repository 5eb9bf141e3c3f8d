use bitflags::bitflags;

use crate::spv::Id;

/// Register bank an operand's number is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterBank {
    Temp,
    PrimAttr,
    SecAttr,
    Output,
    FpInternal,
    Immediate,
    Invalid,
}

impl RegisterBank {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Temp => "r",
            Self::PrimAttr => "pa",
            Self::SecAttr => "sa",
            Self::Output => "o",
            Self::FpInternal => "i",
            Self::Immediate => "#",
            Self::Invalid => "?",
        }
    }
}

/// Element type of an operand or texture component.
///
/// `Unk` is a placeholder produced by the destination-format table; it must be
/// replaced by the bound sampler's declared component type before any IR value
/// is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F32,
    F16,
    C10,
    U8,
    S8,
    Unk,
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::U8 | Self::S8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::C10 => "c10",
            Self::U8 => "u8",
            Self::S8 => "s8",
            Self::Unk => "unk",
        }
    }

    /// Stable code carried as the literal operand of `Op::Unpack`.
    pub fn format_code(&self) -> u32 {
        match self {
            Self::F32 => 0,
            Self::F16 => 1,
            Self::C10 => 2,
            Self::U8 => 3,
            Self::S8 => 4,
            Self::Unk => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    X,
    Y,
    Z,
    W,
}

impl Channel {
    pub fn index(&self) -> u8 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::W => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        }
    }
}

/// Per-operand permutation of the 4-wide register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swizzle(pub [Channel; 4]);

impl Swizzle {
    pub fn identity() -> Self {
        Self([Channel::X, Channel::Y, Channel::Z, Channel::W])
    }
}

/// One source or destination operand: a 4-wide window into a register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub bank: RegisterBank,
    pub num: u8,
    pub ty: DataType,
    pub swizzle: Swizzle,
}

/// A texture coordinate value plus the element type it was loaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    pub value: Id,
    pub ty: DataType,
}

/// Instruction predicate (3-bit field, closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtPredicate {
    None,
    P0,
    P1,
    P2,
    P3,
    NegP0,
    NegP1,
    PerChannel,
}

impl ExtPredicate {
    pub fn from_raw(raw: u8) -> Self {
        match raw & 0x7 {
            0 => Self::None,
            1 => Self::P0,
            2 => Self::P1,
            3 => Self::P2,
            4 => Self::P3,
            5 => Self::NegP0,
            6 => Self::NegP1,
            _ => Self::PerChannel,
        }
    }
}

bitflags! {
    /// Scheduling flags shared by every USSE instruction word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SmpFlags: u8 {
        const SKIPINV   = 1 << 0;
        const NOSCHED   = 1 << 1;
        const SYNCSTART = 1 << 2;
        const MINPACK   = 1 << 3;
    }
}

/// Mip-level selection strategy (2-bit field, closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodMode {
    None,
    /// Encoded but not implemented by this translator; instructions using it
    /// translate as no-ops.
    Bias,
    Replace,
    Gradient,
}

impl LodMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw & 0x3 {
            0 => Self::None,
            1 => Self::Bias,
            2 => Self::Replace,
            _ => Self::Gradient,
        }
    }
}

/// SMP sideband write-back selector (2-bit field, closed).
///
/// Modes 0 and 1 are observed to behave identically: the fetched texel is
/// written to the destination. Mode 3 appears in real shaders but its extra
/// payload is undocumented; the fetched texel is stored unchanged and the
/// instruction is flagged for hardware-accuracy review. Mode 2 has not been
/// observed and is treated as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebandMode {
    Fetch,
    FetchAlt,
    Reserved,
    Undocumented,
}

impl SidebandMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw & 0x3 {
            0 => Self::Fetch,
            1 => Self::FetchAlt,
            2 => Self::Reserved,
            _ => Self::Undocumented,
        }
    }
}

/// Texture dimensionality, stored 0-based in the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexDim {
    OneD,
    TwoD,
    ThreeD,
}

impl TexDim {
    /// `None` for the reserved encoding 3.
    pub fn from_encoded(raw: u8) -> Option<Self> {
        match raw & 0x3 {
            0 => Some(Self::OneD),
            1 => Some(Self::TwoD),
            2 => Some(Self::ThreeD),
            _ => None,
        }
    }

    pub fn components(&self) -> u8 {
        match self {
            Self::OneD => 1,
            Self::TwoD => 2,
            Self::ThreeD => 3,
        }
    }

    /// Component mask of the coordinate operand.
    pub fn coord_mask(&self) -> u8 {
        match self {
            Self::OneD => 0b0001,
            Self::TwoD => 0b0011,
            Self::ThreeD => 0b0111,
        }
    }
}
