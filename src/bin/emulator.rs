use std::time::Duration;
use std::{env, fs, thread};
use msc16vm::cpu::Cpu;
use msc16vm::logging::error;

const STEP_DELAY: Duration = Duration::from_millis(10);

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <image.bin> [steps]", args[0]);
        std::process::exit(1);
    }

    let image = fs::read(&args[1])
        .unwrap_or_else(|e| {
            error(format!("failed to read image file: {}", e));
            std::process::exit(2);
        });

    let mut cpu = Cpu::new();
    cpu.load_image(&image);

    println!("Loaded {} bytes into memory (address 0)", image.len());

    match args.get(2) {
        Some(raw) => {
            let steps: u64 = raw.parse().unwrap_or_else(|_| {
                error(format!("invalid step count: {}", raw));
                std::process::exit(1);
            });
            for _ in 0..steps {
                cpu.step();
            }
            dump_registers(&cpu);
        }
        None => loop {
            cpu.step();
            thread::sleep(STEP_DELAY);
        },
    }
}

fn dump_registers(cpu: &Cpu) {
    println!(
        "a={:04X} b={:04X} c={:04X} d={:04X} sp={:04X} ip={:04X} flags={:04b}",
        cpu.r[0], cpu.r[1], cpu.r[2], cpu.r[3], cpu.sp, cpu.ip, cpu.flags
    );
}
