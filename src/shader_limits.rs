//! Centralized limits for USSE operand decoding.
//!
//! Guest shader microcode is untrusted input. Register numbers and sampler
//! indices come straight out of instruction words, so every lazily-allocated
//! table in this crate is bounded by the constants below; an index past its
//! bank's capacity makes the operand fail to load instead of growing a map
//! without bound.

/// Scalar lanes addressable in the temporary register bank (`r#`).
pub(crate) const MAX_TEMP_LANES: u16 = 128;

/// Scalar lanes addressable in the primary-attribute bank (`pa#`).
pub(crate) const MAX_PRIMATTR_LANES: u16 = 128;

/// Scalar lanes addressable in the secondary-attribute bank (`sa#`).
///
/// The extended source encoding widens register numbers to 8 bits, and
/// secondary attributes are the bank that legitimately uses the full window.
pub(crate) const MAX_SECATTR_LANES: u16 = 256;

/// Scalar lanes addressable in the output bank (`o#`).
pub(crate) const MAX_OUTPUT_LANES: u16 = 128;

/// Scalar lanes in the floating-point internal bank (`i#`).
pub(crate) const MAX_FPINTERNAL_LANES: u16 = 8;

/// Highest sampler register index a shader may bind a texture to.
pub(crate) const MAX_SAMPLER_REGISTER_INDEX: u8 = 15;
