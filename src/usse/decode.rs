//! SMP instruction-word decoding.
//!
//! USSE instructions are 64-bit words. Field extraction is driven by the
//! declarative [`BitField`] table in [`smp`], shared with the disassembly
//! helpers and with the encoder side of the test suite so the two can never
//! drift. The decoder extracts bits only; it never validates semantics.
//! Logically impossible combinations (e.g. the reserved dimensionality
//! encoding) are detected by the translator.

use crate::usse::types::{
    DataType, ExtPredicate, LodMode, Operand, RegisterBank, SidebandMode, SmpFlags, Swizzle,
};

/// One named bitfield of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    /// LSB position within the 64-bit word.
    pub offset: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(name: &'static str, offset: u8, width: u8) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    pub const fn mask(self) -> u64 {
        ((1u64 << self.width) - 1) << self.offset
    }

    pub const fn extract(self, word: u64) -> u32 {
        ((word >> self.offset) & ((1u64 << self.width) - 1)) as u32
    }

    /// Returns `word` with this field set to `value` (truncated to width).
    pub const fn insert(self, word: u64, value: u32) -> u64 {
        (word & !self.mask()) | (((value as u64) << self.offset) & self.mask())
    }
}

/// Field layout of the SMP (texture sample) instruction word.
///
/// Bits 58..64 carry the opcode and are consumed by the upstream dispatcher;
/// everything below is operand payload, allocated MSB-first.
pub mod smp {
    use super::BitField;

    pub const PRED: BitField = BitField::new("pred", 55, 3);
    pub const SKIPINV: BitField = BitField::new("skipinv", 54, 1);
    pub const NOSCHED: BitField = BitField::new("nosched", 53, 1);
    pub const SYNCSTART: BitField = BitField::new("syncstart", 52, 1);
    pub const MINPACK: BitField = BitField::new("minpack", 51, 1);
    pub const SRC0_EXT: BitField = BitField::new("src0_ext", 50, 1);
    pub const SRC1_EXT: BitField = BitField::new("src1_ext", 49, 1);
    pub const SRC2_EXT: BitField = BitField::new("src2_ext", 48, 1);
    pub const FCONV_TYPE: BitField = BitField::new("fconv_type", 46, 2);
    pub const MASK_COUNT: BitField = BitField::new("mask_count", 44, 2);
    pub const DIM: BitField = BitField::new("dim", 42, 2);
    pub const LOD_MODE: BitField = BitField::new("lod_mode", 40, 2);
    pub const DEST_USE_PA: BitField = BitField::new("dest_use_pa", 39, 1);
    pub const SB_MODE: BitField = BitField::new("sb_mode", 37, 2);
    pub const SRC0_TYPE: BitField = BitField::new("src0_type", 35, 2);
    pub const SRC0_BANK: BitField = BitField::new("src0_bank", 34, 1);
    pub const DRC_SEL: BitField = BitField::new("drc_sel", 32, 2);
    pub const SRC1_BANK: BitField = BitField::new("src1_bank", 30, 2);
    pub const SRC2_BANK: BitField = BitField::new("src2_bank", 28, 2);
    pub const DEST_N: BitField = BitField::new("dest_n", 21, 7);
    pub const SRC0_N: BitField = BitField::new("src0_n", 14, 7);
    pub const SRC1_N: BitField = BitField::new("src1_n", 7, 7);
    pub const SRC2_N: BitField = BitField::new("src2_n", 0, 7);

    pub const ALL: &[BitField] = &[
        PRED, SKIPINV, NOSCHED, SYNCSTART, MINPACK, SRC0_EXT, SRC1_EXT, SRC2_EXT, FCONV_TYPE,
        MASK_COUNT, DIM, LOD_MODE, DEST_USE_PA, SB_MODE, SRC0_TYPE, SRC0_BANK, DRC_SEL, SRC1_BANK,
        SRC2_BANK, DEST_N, SRC0_N, SRC1_N, SRC2_N,
    ];
}

/// Decoded fields of one SMP instruction word.
///
/// Closed 2- and 3-bit fields are decoded to their enums; fields with
/// reserved encodings (`dim`, `src0_type`, `fconv_type`) stay raw and are
/// resolved by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmpFields {
    pub pred: ExtPredicate,
    pub flags: SmpFlags,
    pub src0_ext: bool,
    pub src1_ext: bool,
    pub src2_ext: bool,
    pub fconv_type: u8,
    pub mask_count: u8,
    pub dim: u8,
    pub lod_mode: LodMode,
    pub dest_use_pa: bool,
    pub sb_mode: SidebandMode,
    pub src0_type: u8,
    pub src0_bank: u8,
    pub drc_sel: u8,
    pub src1_bank: u8,
    pub src2_bank: u8,
    pub dest_n: u8,
    pub src0_n: u8,
    pub src1_n: u8,
    pub src2_n: u8,
}

pub fn decode_smp(word: u64) -> SmpFields {
    let mut flags = SmpFlags::empty();
    flags.set(SmpFlags::SKIPINV, smp::SKIPINV.extract(word) != 0);
    flags.set(SmpFlags::NOSCHED, smp::NOSCHED.extract(word) != 0);
    flags.set(SmpFlags::SYNCSTART, smp::SYNCSTART.extract(word) != 0);
    flags.set(SmpFlags::MINPACK, smp::MINPACK.extract(word) != 0);

    SmpFields {
        pred: ExtPredicate::from_raw(smp::PRED.extract(word) as u8),
        flags,
        src0_ext: smp::SRC0_EXT.extract(word) != 0,
        src1_ext: smp::SRC1_EXT.extract(word) != 0,
        src2_ext: smp::SRC2_EXT.extract(word) != 0,
        fconv_type: smp::FCONV_TYPE.extract(word) as u8,
        mask_count: smp::MASK_COUNT.extract(word) as u8,
        dim: smp::DIM.extract(word) as u8,
        lod_mode: LodMode::from_raw(smp::LOD_MODE.extract(word) as u8),
        dest_use_pa: smp::DEST_USE_PA.extract(word) != 0,
        sb_mode: SidebandMode::from_raw(smp::SB_MODE.extract(word) as u8),
        src0_type: smp::SRC0_TYPE.extract(word) as u8,
        src0_bank: smp::SRC0_BANK.extract(word) as u8,
        drc_sel: smp::DRC_SEL.extract(word) as u8,
        src1_bank: smp::SRC1_BANK.extract(word) as u8,
        src2_bank: smp::SRC2_BANK.extract(word) as u8,
        dest_n: smp::DEST_N.extract(word) as u8,
        src0_n: smp::SRC0_N.extract(word) as u8,
        src1_n: smp::SRC1_N.extract(word) as u8,
        src2_n: smp::SRC2_N.extract(word) as u8,
    }
}

/// A secondary program addresses the secondary-attribute bank wherever a
/// primary program would address primary attributes.
fn resolve_program_bank(bank: RegisterBank, second_program: bool) -> RegisterBank {
    if second_program && bank == RegisterBank::PrimAttr {
        RegisterBank::SecAttr
    } else {
        bank
    }
}

/// Decode the first source operand.
///
/// Source 0 carries a 1-bit bank selector; its extension flag selects an
/// alternate bank table rather than widening the register number.
pub fn decode_src0(num: u8, bank: u8, ext: bool, second_program: bool) -> Operand {
    let bank = match (ext, bank & 1) {
        (false, 0) => RegisterBank::Temp,
        (false, _) => RegisterBank::PrimAttr,
        (true, 0) => RegisterBank::Output,
        (true, _) => RegisterBank::SecAttr,
    };
    Operand {
        bank: resolve_program_bank(bank, second_program),
        num,
        ty: DataType::Unk,
        swizzle: Swizzle::identity(),
    }
}

/// Decode a second or third source operand.
///
/// Sources 1/2 carry a 2-bit bank selector; the extension flag widens the
/// 7-bit register number to the full 8-bit window.
pub fn decode_src12(num: u8, bank: u8, ext: bool, second_program: bool) -> Operand {
    let bank = match bank & 3 {
        0 => RegisterBank::Temp,
        1 => RegisterBank::Output,
        2 => RegisterBank::PrimAttr,
        _ => RegisterBank::SecAttr,
    };
    let num = (num & 0x7F) | (u8::from(ext) << 7);
    Operand {
        bank: resolve_program_bank(bank, second_program),
        num,
        ty: DataType::Unk,
        swizzle: Swizzle::identity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn smp_fields_are_disjoint() {
        for (i, a) in smp::ALL.iter().enumerate() {
            assert!(a.offset + a.width <= 58, "{} overlaps the opcode bits", a.name);
            for b in &smp::ALL[i + 1..] {
                assert_eq!(a.mask() & b.mask(), 0, "{} overlaps {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn bitfield_insert_extract_round_trips() {
        let mut word = 0u64;
        word = smp::DIM.insert(word, 2);
        word = smp::LOD_MODE.insert(word, 3);
        word = smp::SRC0_N.insert(word, 0x55);
        assert_eq!(smp::DIM.extract(word), 2);
        assert_eq!(smp::LOD_MODE.extract(word), 3);
        assert_eq!(smp::SRC0_N.extract(word), 0x55);

        // Inserting truncates to the field width.
        word = smp::DIM.insert(word, 0b111);
        assert_eq!(smp::DIM.extract(word), 0b11);
        assert_eq!(smp::LOD_MODE.extract(word), 3);
    }

    #[test]
    fn decode_smp_extracts_named_fields() {
        let mut word = 0u64;
        word = smp::PRED.insert(word, 5);
        word = smp::SKIPINV.insert(word, 1);
        word = smp::SYNCSTART.insert(word, 1);
        word = smp::FCONV_TYPE.insert(word, 1);
        word = smp::DIM.insert(word, 1);
        word = smp::LOD_MODE.insert(word, 2);
        word = smp::DEST_USE_PA.insert(word, 1);
        word = smp::SB_MODE.insert(word, 3);
        word = smp::SRC1_BANK.insert(word, 2);
        word = smp::DEST_N.insert(word, 17);
        word = smp::SRC0_N.insert(word, 4);
        word = smp::SRC1_N.insert(word, 3);

        let fields = decode_smp(word);
        assert_eq!(fields.pred, ExtPredicate::NegP0);
        assert_eq!(fields.flags, SmpFlags::SKIPINV | SmpFlags::SYNCSTART);
        assert_eq!(fields.fconv_type, 1);
        assert_eq!(fields.dim, 1);
        assert_eq!(fields.lod_mode, LodMode::Replace);
        assert!(fields.dest_use_pa);
        assert_eq!(fields.sb_mode, SidebandMode::Undocumented);
        assert_eq!(fields.src1_bank, 2);
        assert_eq!(fields.dest_n, 17);
        assert_eq!(fields.src0_n, 4);
        assert_eq!(fields.src1_n, 3);
    }

    #[test]
    fn src0_extension_selects_the_alternate_bank_table() {
        assert_eq!(decode_src0(9, 0, false, false).bank, RegisterBank::Temp);
        assert_eq!(decode_src0(9, 1, false, false).bank, RegisterBank::PrimAttr);
        assert_eq!(decode_src0(9, 0, true, false).bank, RegisterBank::Output);
        assert_eq!(decode_src0(9, 1, true, false).bank, RegisterBank::SecAttr);
        // The extension never touches the register number for source 0.
        assert_eq!(decode_src0(9, 1, true, false).num, 9);
    }

    #[test]
    fn src12_extension_widens_the_register_number() {
        let op = decode_src12(0x25, 2, false, false);
        assert_eq!(op.bank, RegisterBank::PrimAttr);
        assert_eq!(op.num, 0x25);
        assert_eq!(op.swizzle, Swizzle::identity());

        let op = decode_src12(0x25, 2, true, false);
        assert_eq!(op.num, 0xA5);
    }

    #[test]
    fn secondary_program_resolves_primary_attributes_to_secondary() {
        assert_eq!(decode_src0(0, 1, false, true).bank, RegisterBank::SecAttr);
        assert_eq!(decode_src12(0, 2, false, true).bank, RegisterBank::SecAttr);
        // Other banks are untouched.
        assert_eq!(decode_src12(0, 0, false, true).bank, RegisterBank::Temp);
    }
}
