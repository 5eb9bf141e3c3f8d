use pretty_assertions::assert_eq;

use usse_translate::spv::{Builder, Id, Op, Token};
use usse_translate::usse::{
    Coord, DataType, SamplerTable, TextureQuery, Translator,
};

fn sampled_image(b: &mut Builder) -> Id {
    let ty = b.type_sampled_image_2d();
    b.create_variable(ty)
}

fn coord_variable(b: &mut Builder, components: u8) -> Id {
    let f32t = b.type_f32();
    let vt = b.make_vector_type(f32t, components);
    b.create_variable(vt)
}

fn query(sampler: Id, coord_value: Id, coord_ty: DataType) -> TextureQuery {
    TextureQuery {
        sampler,
        coord: Coord {
            value: coord_value,
            ty: coord_ty,
        },
        proj_pos: None,
        store_type: DataType::F32,
        component_type: DataType::F32,
        component_count: 2,
        dest_offset: 0,
    }
}

#[test]
fn plain_query_samples_implicitly_and_stores_two_channels() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 2);
    let samplers = SamplerTable::new();

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[query(image, coord, DataType::F32)]);
    drop(tr);

    assert_eq!(b.count_ops(Op::ImageSampleImplicitLod), 1);
    assert_eq!(b.count_ops(Op::ImageSampleProjImplicitLod), 0);
    assert_eq!(b.count_ops(Op::VectorShuffle), 0);
    assert_eq!(b.count_ops(Op::Store), 2);
}

#[test]
fn projective_query_reshuffles_the_coordinate() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 4);
    let samplers = SamplerTable::new();

    let mut q = query(image, coord, DataType::F32);
    q.proj_pos = Some(3);

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[q]);
    drop(tr);

    let shuffle = b
        .instructions()
        .iter()
        .find(|i| i.op == Op::VectorShuffle)
        .cloned()
        .expect("projective queries re-shuffle the coordinate");
    // (x, y, w): the projector lane lands in the third position.
    assert_eq!(shuffle.operands[2..], [
        Token::Literal(0),
        Token::Literal(1),
        Token::Literal(3),
    ]);
    assert_eq!(b.count_ops(Op::ImageSampleProjImplicitLod), 1);
    assert_eq!(b.count_ops(Op::ImageSampleImplicitLod), 0);
}

#[test]
fn unknown_store_type_falls_back_to_the_component_type() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 2);
    let samplers = SamplerTable::new();

    let mut q = query(image, coord, DataType::F32);
    q.store_type = DataType::Unk;
    q.component_type = DataType::U8;
    q.component_count = 4;

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[q]);
    drop(tr);

    // U8 results are rescaled to 0..255 and converted to unsigned integers,
    // then reinterpreted into the f32 destination lanes.
    assert_eq!(b.count_ops(Op::FMul), 1);
    assert_eq!(b.count_ops(Op::ConvertFToU), 1);
    assert_eq!(b.count_ops(Op::ConvertFToS), 0);
    assert_eq!(b.count_ops(Op::Bitcast), 4);
    assert_eq!(b.count_ops(Op::Store), 4);
}

#[test]
fn packed_coordinates_are_unpacked_before_sampling() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 2);
    let samplers = SamplerTable::new();

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[query(image, coord, DataType::F16)]);
    drop(tr);

    assert_eq!(b.count_ops(Op::Unpack), 1);
    // Already two components wide, so no truncation shuffle.
    assert_eq!(b.count_ops(Op::VectorShuffle), 0);
    assert_eq!(b.count_ops(Op::ImageSampleImplicitLod), 1);
}

#[test]
fn wide_packed_coordinates_are_truncated_to_two_components() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 4);
    let samplers = SamplerTable::new();

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[query(image, coord, DataType::U8)]);
    drop(tr);

    assert_eq!(b.count_ops(Op::Unpack), 1);
    assert_eq!(b.count_ops(Op::VectorShuffle), 1);
}

#[test]
fn out_of_range_component_count_stores_nothing() {
    let mut b = Builder::new();
    let image = sampled_image(&mut b);
    let coord = coord_variable(&mut b, 2);
    let samplers = SamplerTable::new();

    let mut q = query(image, coord, DataType::F32);
    q.component_count = 0;
    let bad = q;
    let good = query(image, coord, DataType::F32);

    let mut tr = Translator::new(&mut b, &samplers, false);
    tr.translate_texture_queries(&[bad, good]);
    drop(tr);

    // The malformed query is skipped; the one after it still runs.
    assert_eq!(b.count_ops(Op::ImageSampleImplicitLod), 2);
    assert_eq!(b.count_ops(Op::Store), 2);
}
