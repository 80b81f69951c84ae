//! An MSC-16 toolchain written in Rust, featuring:
//! - assembler
//! - disassembler
//! - emulator

pub mod assembler;
pub mod cpu;
pub mod logging;
pub mod opcodes;
