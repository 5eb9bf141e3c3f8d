//! Texture sampling: the fetch emitter, the SMP instruction handler and the
//! non-dependent texture-query handler.

use tracing::{error, trace, warn};

use crate::spv::{Id, Op, Token, IMAGE_OPERANDS_GRAD, IMAGE_OPERANDS_LOD};
use crate::usse::decode::{decode_src0, decode_src12, SmpFields};
use crate::usse::disasm;
use crate::usse::translator::{TranslateError, Translator};
use crate::usse::types::{
    Coord, DataType, LodMode, Operand, RegisterBank, SidebandMode, Swizzle, TexDim,
};

/// Which IR sampling variant to emit, with its extra operands already loaded.
///
/// Exhaustive by construction: the SMP handler builds this from the decoded
/// LOD mode, so the fetch emitter has no unreachable mode/operand
/// combinations left to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Implicit { project: bool },
    ExplicitLod { lod: Id },
    Gradient { ddx: Id, ddy: Id },
}

/// Destination element type by the 2-bit `fconv_type` field. The `Unk` entry
/// defers to the bound sampler's declared component type.
const TB_DEST_FMT: [DataType; 4] = [DataType::F32, DataType::Unk, DataType::F16, DataType::F32];

/// Resolve the destination element type for an SMP instruction. Never
/// returns `Unk`.
pub fn resolve_dest_type(fconv_type: u8, sampler_type: DataType) -> DataType {
    let ty = TB_DEST_FMT[(fconv_type & 3) as usize];
    if ty == DataType::Unk {
        sampler_type
    } else {
        ty
    }
}

/// A pending non-dependent texture query, produced by the earlier decode
/// phase. Queries carry no predicate: once decoded they are evaluated
/// unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct TextureQuery {
    /// IR variable holding the combined image/sampler.
    pub sampler: Id,
    pub coord: Coord,
    /// When present, the coordinate is re-shuffled to three components with
    /// this lane substituted at the third position, and the sample is forced
    /// projective.
    pub proj_pos: Option<u8>,
    /// Explicit store type; `Unk` falls back to `component_type`.
    pub store_type: DataType,
    pub component_type: DataType,
    pub component_count: u8,
    /// Primary-attribute register the result is written to.
    pub dest_offset: u8,
}

impl<'a> Translator<'a> {
    /// Emit the IR for one texture fetch and return the sampled value.
    ///
    /// A coordinate that is not already 32-bit float is unpacked to float and
    /// truncated to its first two components when wider; a coordinate already
    /// in 2-component float form passes through untouched.
    pub fn fetch_texture(
        &mut self,
        image: Id,
        coord: Coord,
        dest_type: DataType,
        mode: SampleMode,
    ) -> Id {
        let f32t = self.b.type_f32();
        let mut coord_id = coord.value;

        if coord.ty != DataType::F32 {
            if self.b.is_variable(coord_id) {
                coord_id = self.b.create_load(coord_id);
            }
            coord_id = self.unpack_to_f32(coord_id, coord.ty);
            if self.b.num_components(coord_id) > 2 {
                // Deliberate truncation to channels 0,1; see the SMP handler
                // for how 3D coordinates reach the sampler.
                let v2 = self.b.make_vector_type(f32t, 2);
                coord_id = self.b.create_op(
                    Op::VectorShuffle,
                    v2,
                    vec![
                        Token::Id(coord_id),
                        Token::Id(coord_id),
                        Token::Literal(0),
                        Token::Literal(1),
                    ],
                );
            }
        }
        if self.b.is_variable(coord_id) {
            coord_id = self.b.create_load(coord_id);
        }

        let image_val = if self.b.is_variable(image) {
            self.b.create_load(image)
        } else {
            image
        };

        let v4 = self.b.make_vector_type(f32t, 4);
        let mut sample = match mode {
            SampleMode::Implicit { project: true } => self.b.create_op(
                Op::ImageSampleProjImplicitLod,
                v4,
                vec![Token::Id(image_val), Token::Id(coord_id)],
            ),
            SampleMode::Implicit { project: false } => self.b.create_op(
                Op::ImageSampleImplicitLod,
                v4,
                vec![Token::Id(image_val), Token::Id(coord_id)],
            ),
            SampleMode::ExplicitLod { lod } => self.b.create_op(
                Op::ImageSampleExplicitLod,
                v4,
                vec![
                    Token::Id(image_val),
                    Token::Id(coord_id),
                    Token::Literal(IMAGE_OPERANDS_LOD),
                    Token::Id(lod),
                ],
            ),
            SampleMode::Gradient { ddx, ddy } => self.b.create_op(
                Op::ImageSampleExplicitLod,
                v4,
                vec![
                    Token::Id(image_val),
                    Token::Id(coord_id),
                    Token::Literal(IMAGE_OPERANDS_GRAD),
                    Token::Id(ddx),
                    Token::Id(ddy),
                ],
            ),
        };

        if dest_type.is_integer() {
            sample = self.convert_to_int(sample, dest_type);
        }
        sample
    }

    /// Rescale a normalized float sample into an integer representation.
    fn convert_to_int(&mut self, value: Id, ty: DataType) -> Id {
        let (range, int_ty, op) = match ty {
            DataType::U8 => (255.0, self.b.type_u32(), Op::ConvertFToU),
            DataType::S8 => (127.0, self.b.type_i32(), Op::ConvertFToS),
            _ => return value,
        };
        let n = self.b.num_components(value);
        let f32t = self.b.type_f32();
        let vt = self.b.make_vector_type(f32t, n);
        let scale = self.b.make_float_constant(range);
        let scaled = self
            .b
            .create_op(Op::FMul, vt, vec![Token::Id(value), Token::Id(scale)]);
        let ivt = self.b.make_vector_type(int_ty, n);
        self.b.create_op(op, ivt, vec![Token::Id(scaled)])
    }

    /// Translate one SMP (texture sample) instruction.
    ///
    /// Degraded-mode conditions (bias LOD, reserved sideband mode, malformed
    /// dimensionality) are logged and translate as no-ops returning `Ok`.
    /// `Err` means the instruction emitted no complete IR (unbound sampler,
    /// failed operand load); callers should log and continue with the next
    /// instruction.
    pub fn translate_smp(&mut self, fields: &SmpFields) -> Result<(), TranslateError> {
        if fields.lod_mode == LodMode::Bias {
            self.degrade(TranslateError::Unsupported("SMP bias LOD mode"));
            return Ok(());
        }

        let Some(mut dim) = TexDim::from_encoded(fields.dim) else {
            debug_assert!(false, "reserved SMP dim encoding reached the translator");
            self.degrade(TranslateError::MalformedEncoding("reserved SMP dim encoding"));
            return Ok(());
        };

        let mut src0 = decode_src0(
            fields.src0_n,
            fields.src0_bank,
            fields.src0_ext,
            self.second_program,
        );
        src0.ty = match fields.src0_type {
            0 => DataType::F32,
            1 => DataType::F16,
            _ => DataType::C10,
        };
        let src1 = decode_src12(
            fields.src1_n,
            fields.src1_bank,
            fields.src1_ext,
            self.second_program,
        );

        let Some(&sampler) = self.samplers.lookup(src1.num) else {
            error!(pc = self.cur_pc, index = src1.num, "SMP references an unbound sampler");
            return Err(TranslateError::UnresolvedResource { index: src1.num });
        };

        let dest = Operand {
            bank: if fields.dest_use_pa {
                RegisterBank::PrimAttr
            } else {
                RegisterBank::Temp
            },
            num: fields.dest_n,
            ty: resolve_dest_type(fields.fconv_type, sampler.component_type),
            swizzle: Swizzle::identity(),
        };

        let coord_mask = dim.coord_mask();

        // The LOD/gradient source exists only for the explicit modes.
        let lod_src = match fields.lod_mode {
            LodMode::None => None,
            _ => Some(self.decode_lod_source(fields, src0.ty)),
        };

        trace!(
            target: "usse::disasm",
            "{}",
            disasm::smp_line(
                self.cur_pc,
                fields.pred,
                dim,
                &dest,
                &src0,
                &src1,
                lod_src.as_ref(),
            ),
        );

        self.b.set_line(self.cur_pc);

        let Some(mut coord) = self.load(&src0, coord_mask, 0) else {
            error!(pc = self.cur_pc, "SMP coordinate operand failed to load");
            return Err(TranslateError::InvalidLoad {
                operand: disasm::operand_to_str(&src0, coord_mask),
            });
        };

        if dim == TexDim::OneD {
            // Sampled as a line of a two-dimensional texture: complete the
            // coordinate with Y = 0.
            let zero = self.b.make_float_constant(0.0);
            let f32t = self.b.type_f32();
            let v2 = self.b.make_vector_type(f32t, 2);
            coord = self.b.create_composite_construct(v2, &[coord, zero]);
            dim = TexDim::TwoD;
        }

        let mode = match fields.lod_mode {
            LodMode::None => SampleMode::Implicit { project: false },
            LodMode::Bias => {
                // Rejected on entry.
                debug_assert!(false, "bias LOD mode reached the fetch emitter");
                SampleMode::Implicit { project: false }
            }
            LodMode::Replace => {
                let src2 = self.decode_lod_source(fields, src0.ty);
                let Some(lod) = self.load(&src2, 0b0001, 0) else {
                    error!(pc = self.cur_pc, "SMP LOD operand failed to load");
                    return Err(TranslateError::InvalidLoad {
                        operand: disasm::operand_to_str(&src2, 0b0001),
                    });
                };
                SampleMode::ExplicitLod { lod }
            }
            LodMode::Gradient => {
                let src2 = self.decode_lod_source(fields, src0.ty);
                // A single encoded register pair carries both derivatives:
                // 2D packs ddx in .xy and ddy in .zw, 3D reads two
                // overlapping 3-component slices one lane apart.
                let (ddx_mask, ddy_mask, ddy_offset) = match dim {
                    TexDim::OneD | TexDim::TwoD => (0b0011, 0b1100, 0),
                    TexDim::ThreeD => (0b0111, 0b0111, 1),
                };
                let loaded = self
                    .load(&src2, ddx_mask, 0)
                    .and_then(|ddx| self.load(&src2, ddy_mask, ddy_offset).map(|ddy| (ddx, ddy)));
                let Some((ddx, ddy)) = loaded else {
                    error!(pc = self.cur_pc, "SMP gradient operands failed to load");
                    return Err(TranslateError::InvalidLoad {
                        operand: disasm::operand_to_str(&src2, ddx_mask),
                    });
                };
                SampleMode::Gradient { ddx, ddy }
            }
        };

        let result = self.fetch_texture(
            sampler.id,
            Coord {
                value: coord,
                ty: DataType::F32,
            },
            DataType::F32,
            mode,
        );

        let dest_mask = (1u8 << sampler.component_count) - 1;
        match fields.sb_mode {
            SidebandMode::Fetch | SidebandMode::FetchAlt => {
                self.store(&dest, result, dest_mask);
            }
            SidebandMode::Undocumented => {
                // Observed in real shaders; the extra sideband payload is
                // undocumented on hardware. Store the fetched texel unchanged.
                warn!(
                    pc = self.cur_pc,
                    "SMP sideband mode 3 semantics unverified; storing fetched texel"
                );
                self.store(&dest, result, dest_mask);
            }
            SidebandMode::Reserved => {
                self.degrade(TranslateError::Unsupported("SMP sideband mode 2"));
            }
        }
        Ok(())
    }

    fn decode_lod_source(&self, fields: &SmpFields, coord_ty: DataType) -> Operand {
        let mut src2 = decode_src12(
            fields.src2_n,
            fields.src2_bank,
            fields.src2_ext,
            self.second_program,
        );
        src2.ty = coord_ty;
        src2
    }

    /// Evaluate pending non-dependent texture queries.
    ///
    /// Queries are unconditional; per-query failures are logged and the
    /// remaining queries still run.
    pub fn translate_texture_queries(&mut self, queries: &[TextureQuery]) {
        for query in queries {
            let store_ty = if query.store_type == DataType::Unk {
                query.component_type
            } else {
                query.store_type
            };
            let dest = Operand {
                bank: RegisterBank::PrimAttr,
                num: query.dest_offset,
                ty: store_ty,
                swizzle: Swizzle::identity(),
            };

            let mut coord = query.coord;
            let mut project = false;
            if let Some(lane) = query.proj_pos {
                let loaded = if self.b.is_variable(coord.value) {
                    self.b.create_load(coord.value)
                } else {
                    coord.value
                };
                let f32t = self.b.type_f32();
                let v3 = self.b.make_vector_type(f32t, 3);
                coord.value = self.b.create_op(
                    Op::VectorShuffle,
                    v3,
                    vec![
                        Token::Id(loaded),
                        Token::Id(loaded),
                        Token::Literal(0),
                        Token::Literal(1),
                        Token::Literal(lane as u32),
                    ],
                );
                project = true;
            }

            let result =
                self.fetch_texture(query.sampler, coord, store_ty, SampleMode::Implicit { project });

            if !(1..=4).contains(&query.component_count) {
                self.degrade(TranslateError::MalformedEncoding(
                    "texture query component count out of range",
                ));
                continue;
            }
            let mask = (1u8 << query.component_count) - 1;
            self.store(&dest, result, mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dest_type_table_falls_back_to_the_sampler_type() {
        assert_eq!(resolve_dest_type(0, DataType::U8), DataType::F32);
        assert_eq!(resolve_dest_type(1, DataType::U8), DataType::U8);
        assert_eq!(resolve_dest_type(1, DataType::F16), DataType::F16);
        assert_eq!(resolve_dest_type(2, DataType::U8), DataType::F16);
        assert_eq!(resolve_dest_type(3, DataType::U8), DataType::F32);
        // The fallback never yields Unk: sampler component types are concrete.
        assert_ne!(resolve_dest_type(1, DataType::F32), DataType::Unk);
    }
}
