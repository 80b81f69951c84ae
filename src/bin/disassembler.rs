use std::{env, fs};
use msc16vm::logging::error;
use msc16vm::opcodes::*;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <image.bin> <output.s>", args[0]);
        return;
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let image = fs::read(input_path)
        .unwrap_or_else(|e| {
            error(format!("failed to read input file: {}", e));
            std::process::exit(1);
        });
    let asm = disassemble(&image);

    fs::write(output_path, asm)
        .unwrap_or_else(|e| {
            error(format!("failed to write to output file: {}", e));
            std::process::exit(2);
        });
}

fn disassemble(image: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i + 1 < image.len() {
        let word = u16::from(image[i]) | u16::from(image[i + 1]) << 8;
        i += 2;

        let value = if takes_value_word(word) && i + 1 < image.len() {
            let value = u16::from(image[i]) | u16::from(image[i + 1]) << 8;
            i += 2;
            Some(value)
        } else {
            None
        };

        result.push_str(&decode_instruction(word, value));
        result.push('\n');
    }

    if i < image.len() {
        result.push_str(&format!("# stray byte ${:02X}\n", image[i]));
    }

    result
}

fn takes_value_word(word: u16) -> bool {
    let inst = word >> OPCODE_SHIFT;
    word & MODE_IMMEDIATE != 0
        && matches!(inst, INST_JNZ | INST_ST | INST_LD | INST_INT)
}

fn decode_instruction(word: u16, value: Option<u16>) -> String {
    const REG_NAMES: [&str; 4] = ["%a", "%b", "%c", "%d"];

    let inst = word >> OPCODE_SHIFT;
    let r1 = REG_NAMES[usize::from(word >> OP1_SHIFT & REG_MASK)];
    let r2 = REG_NAMES[usize::from(word >> OP2_SHIFT & REG_MASK)];
    let value = value.map(|value| format!("${:X}", value));

    match inst {
        INST_CMP => format!("cmp {}, {}", r1, r2),
        INST_ADD => format!("add {}, {}", r1, r2),
        INST_SUB => format!("sub {}, {}", r1, r2),
        INST_JNZ => match value {
            Some(target) => format!("jnz {}", target),
            None => format!("jnz {}", r1),
        },
        INST_PUSH => format!("push {}", r1),
        INST_POP => format!("pop {}", r1),
        INST_ST => match value {
            Some(dst) => format!("st {}, {}", dst, r2),
            None => format!("st {}, {}", r1, r2),
        },
        INST_LD => match value {
            Some(src) => format!("ld {}, {}", r1, src),
            None => format!("ld {}, {}", r1, r2),
        },
        INST_OR => format!("or {}, {}", r1, r2),
        INST_AND => format!("and {}, {}", r1, r2),
        INST_XOR => format!("xor {}, {}", r1, r2),
        INST_LSH => format!("lsh {}, {}", r1, r2),
        INST_RSH => format!("rsh {}, {}", r1, r2),
        INST_CLI => "cli".to_string(),
        INST_STI => "sti".to_string(),
        INST_INT => match value {
            Some(vector) => format!("int {}", vector),
            None => "int 0".to_string(),
        },
        _ => format!("# word ${:04X}", word),
    }
}
