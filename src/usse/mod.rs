//! USSE instruction decoding and IR lowering.

pub mod decode;
pub mod disasm;
pub mod registers;
pub mod samplers;
pub mod texture;
pub mod translator;
pub mod types;

pub use decode::{decode_smp, decode_src0, decode_src12, SmpFields};
pub use registers::RegisterFile;
pub use samplers::{SamplerBinding, SamplerTable};
pub use texture::{resolve_dest_type, SampleMode, TextureQuery};
pub use translator::{TranslateError, Translator};
pub use types::{
    Coord, DataType, ExtPredicate, LodMode, Operand, RegisterBank, SidebandMode, SmpFlags,
    Swizzle, TexDim,
};
