//! The MSC-16 opcode encoding, shared by the assembler and the emulator
//!
//! An instruction is one 16-bit little-endian word, optionally followed by a
//! second word carrying an immediate or absolute operand:
//!
//! ```text
//! bits 15-12  opcode nibble
//! bits 11-8   reserved
//! bits  7-6   operand 1 register index
//! bits  5-4   operand 2 register index
//! bit   3     addressing mode (0 = register, 1 = immediate)
//! bits  2-0   unused
//! ```
//!
//! Both sides of the toolchain must read the fields from these exact
//! positions or the emulator miscomputes.

pub const INST_CMP: u16 = 0x0;
pub const INST_ADD: u16 = 0x1;
pub const INST_SUB: u16 = 0x2;
pub const INST_JNZ: u16 = 0x3;
pub const INST_PUSH: u16 = 0x4;
pub const INST_POP: u16 = 0x5;
pub const INST_ST: u16 = 0x6;
pub const INST_LD: u16 = 0x7;
pub const INST_OR: u16 = 0x8;
pub const INST_AND: u16 = 0x9;
pub const INST_XOR: u16 = 0xA;
pub const INST_LSH: u16 = 0xB;
pub const INST_RSH: u16 = 0xC;
pub const INST_CLI: u16 = 0xD;
pub const INST_STI: u16 = 0xE;
pub const INST_INT: u16 = 0xF;

/// Number of instructions in the ISA; also the size of the handler table.
pub const INST_COUNT: usize = 16;

/// Addressing-mode bit: set for an immediate/absolute operand.
pub const MODE_IMMEDIATE: u16 = 0x0008;

pub const OPCODE_SHIFT: u32 = 12;
pub const OP1_SHIFT: u32 = 6;
pub const OP2_SHIFT: u32 = 4;
pub const REG_MASK: u16 = 0x3;

pub const FLAG_Z: u8 = 0x1;
pub const FLAG_N: u8 = 0x2;
pub const FLAG_V: u8 = 0x4;
pub const FLAG_I: u8 = 0x8;
