use std::{env, fs};
use msc16vm::logging::error;
use msc16vm::assembler;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input.s> <output.bin>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let source = fs::read_to_string(input_path)
        .unwrap_or_else(|e| {
            error(format!("failed to read input file: {}", e));
            std::process::exit(2);
        });

    let image = assembler::assemble(&source);
    if image.is_empty() {
        error("assembly produced no output".to_string());
        std::process::exit(3);
    }

    fs::write(output_path, image)
        .unwrap_or_else(|e| {
            error(format!("failed to write to output file: {}", e));
            std::process::exit(4);
        });
}
