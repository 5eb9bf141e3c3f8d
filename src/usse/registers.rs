//! Register-file backing store.
//!
//! Each addressable scalar lane `(bank, index)` is backed by a lazily created
//! f32 variable in the IR module, so operand loads and stores resolve to
//! plain IR loads/stores regardless of whether the lane was touched before.
//! Banks that cannot back a value (immediates, the invalid bank) and lanes
//! past a bank's capacity resolve to `None`, which surfaces as a failed
//! operand load.

use std::collections::HashMap;

use crate::shader_limits::{
    MAX_FPINTERNAL_LANES, MAX_OUTPUT_LANES, MAX_PRIMATTR_LANES, MAX_SECATTR_LANES, MAX_TEMP_LANES,
};
use crate::spv::{Builder, Id};
use crate::usse::types::RegisterBank;

fn bank_capacity(bank: RegisterBank) -> u16 {
    match bank {
        RegisterBank::Temp => MAX_TEMP_LANES,
        RegisterBank::PrimAttr => MAX_PRIMATTR_LANES,
        RegisterBank::SecAttr => MAX_SECATTR_LANES,
        RegisterBank::Output => MAX_OUTPUT_LANES,
        RegisterBank::FpInternal => MAX_FPINTERNAL_LANES,
        RegisterBank::Immediate | RegisterBank::Invalid => 0,
    }
}

#[derive(Debug, Default)]
pub struct RegisterFile {
    lanes: HashMap<(RegisterBank, u16), Id>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The variable backing one scalar lane, creating it on first use.
    pub fn lane(&mut self, b: &mut Builder, bank: RegisterBank, index: u16) -> Option<Id> {
        if index >= bank_capacity(bank) {
            return None;
        }
        let var = *self.lanes.entry((bank, index)).or_insert_with(|| {
            let f32t = b.type_f32();
            b.create_variable(f32t)
        });
        Some(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_are_created_once_and_bounded() {
        let mut b = Builder::new();
        let mut regs = RegisterFile::new();

        let a = regs.lane(&mut b, RegisterBank::Temp, 7);
        let c = regs.lane(&mut b, RegisterBank::Temp, 7);
        assert_eq!(a, c);
        assert!(a.is_some());
        assert_ne!(a, regs.lane(&mut b, RegisterBank::PrimAttr, 7));

        assert_eq!(regs.lane(&mut b, RegisterBank::Temp, 1000), None);
        assert_eq!(regs.lane(&mut b, RegisterBank::Immediate, 0), None);
        assert_eq!(regs.lane(&mut b, RegisterBank::Invalid, 0), None);
    }
}
