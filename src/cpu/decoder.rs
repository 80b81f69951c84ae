//! Turns the opcode word at IP into operand descriptors

use super::Cpu;
use super::bus::BusPtr;
use crate::opcodes::*;

/// A decoded instruction: handler index, both operand descriptors, and how
/// many extra bytes past the opcode word the operands consumed (2 when an
/// immediate word follows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub inst: u8,
    pub op1: BusPtr,
    pub op2: BusPtr,
    pub advance: u16,
}

/// Decode the word at IP. `None` means the word does not name an
/// instruction and the step driver should resynchronise.
pub fn decode(cpu: &Cpu) -> Option<Decoded> {
    let word = cpu.mem_read16(cpu.ip);
    let inst = word >> OPCODE_SHIFT;
    if usize::from(inst) >= INST_COUNT {
        return None;
    }

    let immediate = word & MODE_IMMEDIATE != 0;
    let r1 = BusPtr::Register(((word >> OP1_SHIFT) & REG_MASK) as u8);
    let r2 = BusPtr::Register(((word >> OP2_SHIFT) & REG_MASK) as u8);
    // In immediate mode the operand lives in the word after the opcode.
    let imm_slot = BusPtr::Memory(cpu.ip.wrapping_add(2));

    let (op1, op2, advance) = match inst {
        INST_JNZ if immediate => (imm_slot, r2, 2),
        INST_ST if immediate => (imm_slot, r2, 2),
        INST_LD if immediate => (r1, imm_slot, 2),
        INST_INT => (imm_slot, r2, 2),
        _ => (r1, r2, 0),
    };

    Some(Decoded {
        inst: inst as u8,
        op1,
        op2,
        advance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_word(word: u16) -> Decoded {
        let mut cpu = Cpu::new();
        cpu.mem_write16(0, word);
        decode(&cpu).unwrap()
    }

    #[test]
    fn extracts_register_fields() {
        // add %c, %d
        let decoded = decode_word(0x1000 | 2 << OP1_SHIFT | 3 << OP2_SHIFT);
        assert_eq!(decoded.inst, 1);
        assert_eq!(decoded.op1, BusPtr::Register(2));
        assert_eq!(decoded.op2, BusPtr::Register(3));
        assert_eq!(decoded.advance, 0);
    }

    #[test]
    fn immediate_load_points_past_the_opcode() {
        let decoded = decode_word(0x7000 | MODE_IMMEDIATE | 1 << OP1_SHIFT);
        assert_eq!(decoded.op1, BusPtr::Register(1));
        assert_eq!(decoded.op2, BusPtr::Memory(2));
        assert_eq!(decoded.advance, 2);
    }

    #[test]
    fn immediate_store_mirrors_the_jump_rule() {
        let decoded = decode_word(0x6000 | MODE_IMMEDIATE | 2 << OP2_SHIFT);
        assert_eq!(decoded.op1, BusPtr::Memory(2));
        assert_eq!(decoded.op2, BusPtr::Register(2));
        assert_eq!(decoded.advance, 2);
    }

    #[test]
    fn register_mode_jump_has_no_advance() {
        let decoded = decode_word(0x3000 | 1 << OP1_SHIFT);
        assert_eq!(decoded.op1, BusPtr::Register(1));
        assert_eq!(decoded.advance, 0);
    }

    #[test]
    fn int_always_reads_the_immediate_slot() {
        let decoded = decode_word(0xF000 | MODE_IMMEDIATE);
        assert_eq!(decoded.op1, BusPtr::Memory(2));
        assert_eq!(decoded.advance, 2);
    }

    #[test]
    fn the_slot_follows_ip() {
        let mut cpu = Cpu::new();
        cpu.ip = 0x0100;
        cpu.mem_write16(0x0100, 0x7000 | MODE_IMMEDIATE);
        let decoded = decode(&cpu).unwrap();
        assert_eq!(decoded.op2, BusPtr::Memory(0x0102));
    }
}
