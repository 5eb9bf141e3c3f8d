//! Human-readable formatting for the per-instruction trace sink.

use crate::usse::types::{ExtPredicate, Operand, TexDim};

pub fn predicate_str(pred: ExtPredicate) -> &'static str {
    match pred {
        ExtPredicate::None => "",
        ExtPredicate::P0 => "p0 ",
        ExtPredicate::P1 => "p1 ",
        ExtPredicate::P2 => "p2 ",
        ExtPredicate::P3 => "p3 ",
        ExtPredicate::NegP0 => "!p0 ",
        ExtPredicate::NegP1 => "!p1 ",
        ExtPredicate::PerChannel => "pN ",
    }
}

/// `pa4.xy` form: bank short name, register number, then the swizzle channels
/// selected by `mask` (no suffix when the mask is empty).
pub fn operand_to_str(op: &Operand, mask: u8) -> String {
    let mut s = format!("{}{}", op.bank.short_name(), op.num);
    if mask & 0xF != 0 {
        s.push('.');
        for i in 0..4 {
            if mask & (1 << i) != 0 {
                s.push_str(op.swizzle.0[i as usize].name());
            }
        }
    }
    s
}

/// One SMP disassembly line. The trailing LOD/gradient operand is printed
/// only when the instruction carries one.
pub fn smp_line(
    pc: u32,
    pred: ExtPredicate,
    dim: TexDim,
    dest: &Operand,
    src0: &Operand,
    src1: &Operand,
    lod: Option<&Operand>,
) -> String {
    let mut s = format!(
        "{:#010x}: {}SMP{}d.{}.{} {} {} {}",
        pc,
        predicate_str(pred),
        dim.components(),
        dest.ty.name(),
        src0.ty.name(),
        operand_to_str(dest, 0b0001),
        operand_to_str(src0, dim.coord_mask()),
        operand_to_str(src1, 0),
    );
    if let Some(lod) = lod {
        s.push(' ');
        s.push_str(&operand_to_str(lod, 0b0001));
    }
    s
}
