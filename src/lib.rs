//! USSE shader-microcode → IR translation core.
//!
//! Decodes the fixed-width USSE texture-sampling instruction family and lowers
//! it to a typed, SSA-style IR module (`spv`), following the
//! decode → operand-resolution → emission pipeline shared by every USSE
//! instruction family.
//!
//! The crate is a library consumed by the surrounding recompiler driver: the
//! driver fetches one 64-bit instruction word, decodes it
//! ([`usse::decode_smp`]) and calls the per-family entry point
//! ([`usse::Translator::translate_smp`]) in program order. Errors are local to
//! one instruction: a failed instruction emits no IR and the compilation of
//! the rest of the shader continues.

mod shader_limits;
pub mod spv;
pub mod usse;
