//! Converts MSC-16 assembly into a flat binary image in a single forward pass
//!
//! Each line is lexed into typed tokens, the preprocessor expands
//! user-defined macros in place, and the encoder appends code to a 64 KiB
//! stream while recording label positions. A forward label reference is
//! emitted as a 2-byte placeholder and backpatched the moment the label is
//! defined, so one pass over the source suffices.
//!
//! Comments start with a hash (`#`) and continue to the end of the line.
//! Whitespace and commas both separate lexemes. Registers are `%a` through
//! `%d`; immediates are decimal (digit-led) or hex with a `$` prefix;
//! strings are double-quoted and a backslash makes the next character
//! literal. A label is defined with a trailing colon on a line of its own
//! and referenced by bare name, before or after its definition:
//!
//! ```ignore
//! ld %a, $A          # countdown start
//! ld %b, 1
//! loop:
//!     sub %a, %b
//!     jnz loop       # falls through once %a reaches zero
//! ```
//!
//! The assembler supports the following instructions:
//! - cmp r1, r2: compare (subtract without writeback), setting flags
//! - add r1, r2 / sub r1, r2: 16-bit wrapping arithmetic into r1
//! - or / and / xor r1, r2: bitwise operations into r1
//! - lsh / rsh r1, r2: shift r1 by a register count (a count >= 16 gives 0)
//! - jnz target: jump to a register, immediate or label while Z is clear
//! - push reg / pop reg: move a word across the descending stack
//! - st dst, reg: store a register through a register or absolute operand
//! - ld reg, src: load a register from a register or immediate operand
//! - cli / sti: clear / set the interrupt-enable flag
//! - int vector: vector IP to an immediate or label while I is set
//!
//! and the following directives:
//! - str "text": emit the unescaped bytes of the string
//! - zst "text": `str` plus a terminating zero byte
//! - org addr: move the write cursor without emitting
//! - def name / end: define a macro; every line between the two becomes the
//!   body, substituted verbatim wherever `name` starts a line

pub mod encoder;
pub mod keywords;
pub mod lexer;
pub mod preprocessor;

use std::fmt;

use crate::logging;
use encoder::Encoder;
use lexer::{Lexer, TokenKind};
use preprocessor::{Line, preprocess};

/// Assemble source text into a flat binary image addressed from 0.
///
/// Diagnostics are printed to stderr; any recorded error yields an empty
/// image, signalling failure without an error surface.
pub fn assemble(source: &str) -> Vec<u8> {
    let (image, errors) = Assembler::new().run(source);
    for error in &errors {
        logging::error(error.to_string());
    }
    image
}

/// One assembly run, owning the output stream and every symbol table.
pub struct Assembler {
    lexer: Lexer,
    encoder: Encoder,
    errors: Vec<Error>,
}

impl Assembler {
    pub fn new() -> Assembler {
        Assembler {
            lexer: Lexer::new(),
            encoder: Encoder::new(),
            errors: Vec::new(),
        }
    }

    /// Run lex, preprocess and encode over the source, returning the
    /// trimmed image (empty if any error was recorded) together with the
    /// collected diagnostics.
    pub fn run(mut self, source: &str) -> (Vec<u8>, Vec<Error>) {
        let mut lines: Vec<Line> = source
            .lines()
            .enumerate()
            .map(|(index, text)| Line {
                text: text.to_string(),
                number: index + 1,
            })
            .collect();

        preprocess(&self.lexer, &mut lines, &mut self.errors);

        for line in &lines {
            let tokens = match self.lexer.lex_line(&line.text, line.number) {
                Ok(tokens) => tokens,
                Err(error) => {
                    self.errors.push(error);
                    continue;
                }
            };
            let Some(first) = tokens.first() else { continue };

            let result = match first.kind {
                // labels stand alone on their line
                TokenKind::LabelDef if tokens.len() != 1 => Err(Error::WrongOperandCount {
                    instruction: first.text.clone(),
                    expected: 0,
                    found: tokens.len() - 1,
                    line_number: line.number,
                }),
                TokenKind::LabelDef => {
                    let name = first.text.strip_suffix(':').unwrap_or(&first.text);
                    self.encoder.define_label(name, line.number)
                }
                TokenKind::Opcode => self.encoder.encode(&tokens),
                _ => Err(Error::UnknownInstruction {
                    instruction: first.text.clone(),
                    line_number: line.number,
                }),
            };
            if let Err(error) = result {
                self.errors.push(error);
            }
        }

        let (image, unresolved) = self.encoder.finish();
        self.errors.extend(unresolved);

        if self.errors.is_empty() {
            (image, self.errors)
        } else {
            (Vec::new(), self.errors)
        }
    }
}

/// An error that can occur during the assembly process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A string literal did not close before the end of its line
    UnterminatedString { line_number: usize },
    /// A line started with something that is neither a keyword nor a label
    UnknownInstruction {
        instruction: String,
        line_number: usize,
    },
    /// The operand count does not match the keyword's declared arity
    WrongOperandCount {
        instruction: String,
        expected: usize,
        found: usize,
        line_number: usize,
    },
    /// A `%`-lexeme that is not one of `%a` through `%d`
    InvalidRegister { lexeme: String, line_number: usize },
    /// An operand that could not be parsed as a number
    InvalidOperand { lexeme: String, line_number: usize },
    /// An immediate was passed where only a register is legal
    ExpectedRegister { lexeme: String, line_number: usize },
    /// A register was passed where only an immediate is legal
    ExpectedImmediate { lexeme: String, line_number: usize },
    /// A directive that takes a string literal got something else
    ExpectedString { lexeme: String, line_number: usize },
    /// A label was defined twice
    DuplicateLabel { label: String, line_number: usize },
    /// A referenced label was still undefined at end of input
    UnresolvedLabel { label: String, line_number: usize },
    /// `def` inside an open macro definition
    NestedMacroDefinition { line_number: usize },
    /// `end` with no open macro definition
    EndOutsideMacro { line_number: usize },
    /// A macro name was defined twice
    RedefinedMacro { name: String, line_number: usize },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnterminatedString { line_number } => {
                write!(f, "unterminated string literal at line {}", line_number)
            }
            Error::UnknownInstruction {
                instruction,
                line_number,
            } => {
                write!(
                    f,
                    "unknown instruction \"{}\" at line {}",
                    instruction, line_number
                )
            }
            Error::WrongOperandCount {
                instruction,
                expected,
                found,
                line_number,
            } => {
                write!(
                    f,
                    "wrong operand count for \"{}\" at line {}: expected {}, got {}",
                    instruction, line_number, expected, found
                )
            }
            Error::InvalidRegister { lexeme, line_number } => {
                write!(f, "invalid register \"{}\" at line {}", lexeme, line_number)
            }
            Error::InvalidOperand { lexeme, line_number } => {
                write!(f, "invalid operand \"{}\" at line {}", lexeme, line_number)
            }
            Error::ExpectedRegister { lexeme, line_number } => {
                write!(
                    f,
                    "expected a register, got \"{}\" at line {}",
                    lexeme, line_number
                )
            }
            Error::ExpectedImmediate { lexeme, line_number } => {
                write!(
                    f,
                    "expected an immediate, got \"{}\" at line {}",
                    lexeme, line_number
                )
            }
            Error::ExpectedString { lexeme, line_number } => {
                write!(
                    f,
                    "expected a string literal, got \"{}\" at line {}",
                    lexeme, line_number
                )
            }
            Error::DuplicateLabel { label, line_number } => {
                write!(f, "duplicate label \"{}\" at line {}", label, line_number)
            }
            Error::UnresolvedLabel { label, line_number } => {
                write!(
                    f,
                    "unresolved label \"{}\" referenced at line {}",
                    label, line_number
                )
            }
            Error::NestedMacroDefinition { line_number } => {
                write!(f, "nested macro definition at line {}", line_number)
            }
            Error::EndOutsideMacro { line_number } => {
                write!(
                    f,
                    "end without an open macro definition at line {}",
                    line_number
                )
            }
            Error::RedefinedMacro { name, line_number } => {
                write!(f, "macro \"{}\" redefined at line {}", name, line_number)
            }
        }
    }
}
