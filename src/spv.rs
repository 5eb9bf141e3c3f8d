//! Minimal SPIR-V-shaped SSA module builder.
//!
//! The translator never manages IR value lifetimes itself: it asks this
//! builder to intern a type, materialize a constant or append an instruction,
//! and gets back an opaque [`Id`]. Types and constants are deduplicated;
//! variables and constants live outside the instruction stream, so the number
//! of appended instructions reflects exactly what a translation call emitted.

use std::collections::HashMap;

/// Handle of one SSA value (constant, variable or instruction result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub u32);

/// Handle of one interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Float32,
    Int32,
    Uint32,
    Vector { base: TypeId, count: u8 },
    Image2D,
    SampledImage { image: TypeId },
}

/// Image-operands literal selecting an explicit scalar LOD.
pub const IMAGE_OPERANDS_LOD: u32 = 0x2;
/// Image-operands literal selecting an explicit (ddx, ddy) gradient pair.
pub const IMAGE_OPERANDS_GRAD: u32 = 0x4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Load,
    Store,
    CompositeConstruct,
    CompositeExtract,
    VectorShuffle,
    ImageSampleImplicitLod,
    ImageSampleProjImplicitLod,
    ImageSampleExplicitLod,
    Bitcast,
    /// Widen a packed non-F32 register value to float. The literal operand is
    /// the source format code (see `DataType::format_code`); the runtime
    /// lowers this to its format-conversion helpers.
    Unpack,
    FMul,
    ConvertFToU,
    ConvertFToS,
}

/// One instruction operand: either an SSA value or an immediate literal
/// (shuffle selectors, extract indices, image-operand masks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Id(Id),
    Literal(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: Op,
    pub result: Option<Id>,
    pub result_type: Option<TypeId>,
    pub operands: Vec<Token>,
    /// Program counter of the source instruction, from [`Builder::set_line`].
    pub line: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Builder {
    types: Vec<TypeKind>,
    type_cache: HashMap<TypeKind, TypeId>,
    instructions: Vec<Instruction>,
    /// Type of every id this builder has produced. Variables record the type
    /// of the value behind them, not a pointer type.
    value_types: HashMap<Id, TypeId>,
    variables: HashMap<Id, TypeId>,
    float_consts: HashMap<u32, Id>,
    uint_consts: HashMap<u32, Id>,
    next_id: u32,
    cur_line: Option<u32>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self, ty: TypeId) -> Id {
        self.next_id += 1;
        let id = Id(self.next_id);
        self.value_types.insert(id, ty);
        id
    }

    pub fn get_type(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&ty) = self.type_cache.get(&kind) {
            return ty;
        }
        let ty = TypeId(self.types.len() as u32);
        self.types.push(kind);
        self.type_cache.insert(kind, ty);
        ty
    }

    pub fn type_f32(&mut self) -> TypeId {
        self.get_type(TypeKind::Float32)
    }

    pub fn type_i32(&mut self) -> TypeId {
        self.get_type(TypeKind::Int32)
    }

    pub fn type_u32(&mut self) -> TypeId {
        self.get_type(TypeKind::Uint32)
    }

    pub fn type_image_2d(&mut self) -> TypeId {
        self.get_type(TypeKind::Image2D)
    }

    pub fn type_sampled_image_2d(&mut self) -> TypeId {
        let image = self.type_image_2d();
        self.get_type(TypeKind::SampledImage { image })
    }

    /// A `count` of 1 resolves to the scalar base type itself.
    pub fn make_vector_type(&mut self, base: TypeId, count: u8) -> TypeId {
        debug_assert!((1..=4).contains(&count));
        if count <= 1 {
            base
        } else {
            self.get_type(TypeKind::Vector { base, count })
        }
    }

    pub fn type_kind(&self, ty: TypeId) -> TypeKind {
        self.types[ty.0 as usize]
    }

    /// Component count of a type (1 for scalars and opaque types).
    pub fn type_components(&self, ty: TypeId) -> u8 {
        match self.type_kind(ty) {
            TypeKind::Vector { count, .. } => count,
            _ => 1,
        }
    }

    /// Scalar base of a vector type; identity for everything else.
    pub fn component_type(&self, ty: TypeId) -> TypeId {
        match self.type_kind(ty) {
            TypeKind::Vector { base, .. } => base,
            _ => ty,
        }
    }

    /// Type of a value produced by this builder.
    ///
    /// The id must originate from this builder; anything else is a caller bug.
    pub fn type_of(&self, id: Id) -> TypeId {
        *self
            .value_types
            .get(&id)
            .expect("id was not created by this builder")
    }

    pub fn num_components(&self, id: Id) -> u8 {
        self.type_components(self.type_of(id))
    }

    pub fn make_float_constant(&mut self, value: f32) -> Id {
        let bits = value.to_bits();
        if let Some(&id) = self.float_consts.get(&bits) {
            return id;
        }
        let ty = self.type_f32();
        let id = self.alloc_id(ty);
        self.float_consts.insert(bits, id);
        id
    }

    pub fn make_uint_constant(&mut self, value: u32) -> Id {
        if let Some(&id) = self.uint_consts.get(&value) {
            return id;
        }
        let ty = self.type_u32();
        let id = self.alloc_id(ty);
        self.uint_consts.insert(value, id);
        id
    }

    /// Declare a module-level variable holding a value of `value_type`.
    /// Reading it requires a [`Op::Load`]; see [`Builder::create_load`].
    pub fn create_variable(&mut self, value_type: TypeId) -> Id {
        let id = self.alloc_id(value_type);
        self.variables.insert(id, value_type);
        id
    }

    pub fn is_variable(&self, id: Id) -> bool {
        self.variables.contains_key(&id)
    }

    pub fn create_load(&mut self, var: Id) -> Id {
        debug_assert!(self.is_variable(var), "load target is not a variable");
        let ty = self.type_of(var);
        let result = self.alloc_id(ty);
        self.instructions.push(Instruction {
            op: Op::Load,
            result: Some(result),
            result_type: Some(ty),
            operands: vec![Token::Id(var)],
            line: self.cur_line,
        });
        result
    }

    pub fn create_store(&mut self, var: Id, value: Id) {
        debug_assert!(self.is_variable(var), "store target is not a variable");
        self.instructions.push(Instruction {
            op: Op::Store,
            result: None,
            result_type: None,
            operands: vec![Token::Id(var), Token::Id(value)],
            line: self.cur_line,
        });
    }

    pub fn create_op(&mut self, op: Op, result_type: TypeId, operands: Vec<Token>) -> Id {
        let result = self.alloc_id(result_type);
        self.instructions.push(Instruction {
            op,
            result: Some(result),
            result_type: Some(result_type),
            operands,
            line: self.cur_line,
        });
        result
    }

    pub fn create_composite_construct(&mut self, result_type: TypeId, parts: &[Id]) -> Id {
        debug_assert_eq!(self.type_components(result_type) as usize, parts.len());
        let operands = parts.iter().copied().map(Token::Id).collect();
        self.create_op(Op::CompositeConstruct, result_type, operands)
    }

    /// Record the program counter attached to subsequently emitted
    /// instructions. Current-line context is explicit builder state, not
    /// ambient; the translation session updates it per instruction.
    pub fn set_line(&mut self, pc: u32) {
        self.cur_line = Some(pc);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn count_ops(&self, op: Op) -> usize {
        self.instructions.iter().filter(|i| i.op == op).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constants_and_types_are_deduplicated() {
        let mut b = Builder::new();
        let a = b.make_float_constant(0.5);
        let c = b.make_float_constant(0.5);
        assert_eq!(a, c);
        assert_ne!(a, b.make_float_constant(-0.5));

        let f32t = b.type_f32();
        let v2 = b.make_vector_type(f32t, 2);
        assert_eq!(v2, b.make_vector_type(f32t, 2));
        assert_eq!(f32t, b.make_vector_type(f32t, 1));
        assert!(b.instructions().is_empty());
    }

    #[test]
    fn loads_carry_the_variable_value_type_and_line() {
        let mut b = Builder::new();
        let f32t = b.type_f32();
        let v4 = b.make_vector_type(f32t, 4);
        let var = b.create_variable(v4);
        assert!(b.is_variable(var));

        b.set_line(0x40);
        let loaded = b.create_load(var);
        assert!(!b.is_variable(loaded));
        assert_eq!(b.type_of(loaded), v4);
        assert_eq!(b.num_components(loaded), 4);
        assert_eq!(b.instructions()[0].line, Some(0x40));
    }
}
