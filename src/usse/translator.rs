//! Translation session and the operand load/store model.

use thiserror::Error;
use tracing::{error, warn};

use crate::spv::{Builder, Id, Op, Token, TypeKind};
use crate::usse::registers::RegisterFile;
use crate::usse::samplers::SamplerTable;
use crate::usse::types::{DataType, Operand, RegisterBank};

/// Per-instruction translation failure.
///
/// No variant ever unwinds a whole compilation. `UnresolvedResource` and
/// `InvalidLoad` are returned to the caller (the instruction emitted no
/// complete IR; the documented caller policy is log-and-continue).
/// `Unsupported` and `MalformedEncoding` are handled inside the translator as
/// logged no-ops so partially-faithful shaders still compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unsupported feature: {0}")]
    Unsupported(&'static str),
    #[error("sampler register s{index} has no binding")]
    UnresolvedResource { index: u8 },
    #[error("source operand {operand} failed to load")]
    InvalidLoad { operand: String },
    #[error("malformed encoding: {0}")]
    MalformedEncoding(&'static str),
}

/// One shader compilation's translation session.
///
/// Owns the register-file backing store and the current program counter;
/// borrows the IR module under construction and the read-only sampler table.
/// Everything the original threaded through ambient builder state is an
/// explicit field here. Sessions are independent: separate shader
/// compilations share nothing and may run in parallel.
pub struct Translator<'a> {
    pub(crate) b: &'a mut Builder,
    pub(crate) samplers: &'a SamplerTable,
    pub(crate) regs: RegisterFile,
    pub(crate) second_program: bool,
    pub(crate) cur_pc: u32,
}

impl<'a> Translator<'a> {
    pub fn new(b: &'a mut Builder, samplers: &'a SamplerTable, second_program: bool) -> Self {
        Self {
            b,
            samplers,
            regs: RegisterFile::new(),
            second_program,
            cur_pc: 0,
        }
    }

    /// Program counter of the instruction about to be translated; recorded on
    /// emitted IR via the builder's line state.
    pub fn set_pc(&mut self, pc: u32) {
        self.cur_pc = pc;
    }

    pub(crate) fn degrade(&self, err: TranslateError) {
        warn!(pc = self.cur_pc, error = %err, "instruction translated as a no-op");
    }

    /// Load the components of `op` selected by `mask`, as a float value.
    ///
    /// Set mask bits map to consecutive components of the result: bit `i`
    /// reads scalar lane `num + offset + swizzle[i]`. Non-F32 element types
    /// are unpacked to float before the value is returned. `None` means the
    /// operand cannot be loaded (unbacked bank or out-of-range lane).
    pub fn load(&mut self, op: &Operand, mask: u8, offset: u8) -> Option<Id> {
        debug_assert!(mask != 0 && mask <= 0xF);
        let mut comps = Vec::new();
        for i in 0..4u8 {
            if mask & (1 << i) == 0 {
                continue;
            }
            let chan = op.swizzle.0[i as usize].index();
            let lane = op.num as u16 + offset as u16 + chan as u16;
            let var = self.regs.lane(self.b, op.bank, lane)?;
            comps.push(self.b.create_load(var));
        }

        let mut value = if comps.len() == 1 {
            comps[0]
        } else {
            let f32t = self.b.type_f32();
            let vt = self.b.make_vector_type(f32t, comps.len() as u8);
            self.b.create_composite_construct(vt, &comps)
        };
        if op.ty != DataType::F32 && op.ty != DataType::Unk {
            value = self.unpack_to_f32(value, op.ty);
        }
        Some(value)
    }

    /// Store consecutive components of `value` into the lanes of `op`
    /// selected by `mask`; lanes outside the mask are left unmodified.
    /// Non-float component types are reinterpreted into the f32 lanes.
    pub fn store(&mut self, op: &Operand, value: Id, mask: u8) {
        if matches!(op.bank, RegisterBank::Immediate | RegisterBank::Invalid) {
            error!(pc = self.cur_pc, bank = op.bank.short_name(), "store to unwritable bank dropped");
            return;
        }
        let value_comps = self.b.num_components(value);
        let comp_ty = self.b.component_type(self.b.type_of(value));
        let f32t = self.b.type_f32();

        let mut src_comp = 0u32;
        for i in 0..4u8 {
            if mask & (1 << i) == 0 {
                continue;
            }
            let mut comp = if value_comps > 1 {
                self.b.create_op(
                    Op::CompositeExtract,
                    comp_ty,
                    vec![Token::Id(value), Token::Literal(src_comp)],
                )
            } else {
                value
            };
            if self.b.type_kind(comp_ty) != TypeKind::Float32 {
                comp = self.b.create_op(Op::Bitcast, f32t, vec![Token::Id(comp)]);
            }
            let chan = op.swizzle.0[i as usize].index();
            let lane = op.num as u16 + chan as u16;
            match self.regs.lane(self.b, op.bank, lane) {
                Some(var) => self.b.create_store(var, comp),
                None => {
                    error!(pc = self.cur_pc, lane, "store lane out of range; channel dropped")
                }
            }
            src_comp += 1;
        }
    }

    /// Emit the unpack of a packed non-F32 value into a float value of the
    /// same component count.
    pub(crate) fn unpack_to_f32(&mut self, value: Id, from: DataType) -> Id {
        let n = self.b.num_components(value);
        let f32t = self.b.type_f32();
        let vt = self.b.make_vector_type(f32t, n);
        self.b.create_op(
            Op::Unpack,
            vt,
            vec![Token::Id(value), Token::Literal(from.format_code())],
        )
    }
}
