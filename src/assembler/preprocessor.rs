//! Expands user-defined macro bodies in place
//!
//! `def NAME` opens a macro and every following raw line is captured
//! verbatim into its body until `end`. A line whose first token names a
//! defined macro is replaced by the body lines, which keep the caller's
//! line number for diagnostics; scanning resumes at the first inserted
//! line, so bodies may themselves invoke other macros.

use std::collections::HashMap;

use crate::assembler::Error;
use crate::assembler::keywords::{self, DIR_DEF, DIR_END};
use crate::assembler::lexer::{Lexer, TokenKind};

/// One source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub number: usize,
}

struct OpenMacro {
    name: String,
    body: Vec<String>,
    discard: bool,
}

/// Rewrite the line list, expanding macros and removing their definitions.
/// Lines that fail to lex pass through untouched; the main pass reports
/// those errors once.
pub fn preprocess(lexer: &Lexer, lines: &mut Vec<Line>, errors: &mut Vec<Error>) {
    let mut macros: HashMap<String, Vec<String>> = HashMap::new();
    let mut open: Option<OpenMacro> = None;
    let mut i = 0;

    while i < lines.len() {
        let line_number = lines[i].number;
        let Ok(tokens) = lexer.lex_line(&lines[i].text, line_number) else {
            // unlexable lines are still captured verbatim into an open
            // body; elsewhere the main pass reports them
            if let Some(current) = open.as_mut() {
                current.body.push(lines.remove(i).text);
            } else {
                i += 1;
            }
            continue;
        };
        let Some(first) = tokens.first() else {
            i += 1;
            continue;
        };

        let keyword = (first.kind == TokenKind::Opcode)
            .then(|| keywords::lookup(&first.text))
            .flatten();

        match keyword {
            Some(keyword) if keyword.opcode == DIR_DEF => {
                lines.remove(i);
                if open.is_some() {
                    errors.push(Error::NestedMacroDefinition { line_number });
                    continue;
                }
                if tokens.len() != 2 {
                    errors.push(Error::WrongOperandCount {
                        instruction: first.text.clone(),
                        expected: 1,
                        found: tokens.len() - 1,
                        line_number,
                    });
                    continue;
                }
                let name = tokens[1].text.clone();
                let discard = macros.contains_key(&name);
                if discard {
                    errors.push(Error::RedefinedMacro {
                        name: name.clone(),
                        line_number,
                    });
                }
                open = Some(OpenMacro {
                    name,
                    body: Vec::new(),
                    discard,
                });
            }
            Some(keyword) if keyword.opcode == DIR_END => {
                lines.remove(i);
                match open.take() {
                    Some(closed) if !closed.discard => {
                        macros.insert(closed.name, closed.body);
                    }
                    Some(_) => {}
                    None => errors.push(Error::EndOutsideMacro { line_number }),
                }
            }
            _ if open.is_some() => {
                let text = lines.remove(i).text;
                if let Some(current) = open.as_mut() {
                    current.body.push(text);
                }
            }
            _ if macros.contains_key(&first.text) => {
                let body = macros[&first.text].clone();
                lines.splice(
                    i..=i,
                    body.into_iter().map(|text| Line {
                        text,
                        number: line_number,
                    }),
                );
            }
            _ => i += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (Vec<Line>, Vec<Error>) {
        let lexer = Lexer::new();
        let mut lines: Vec<Line> = source
            .lines()
            .enumerate()
            .map(|(index, text)| Line {
                text: text.to_string(),
                number: index + 1,
            })
            .collect();
        let mut errors = Vec::new();
        preprocess(&lexer, &mut lines, &mut errors);
        (lines, errors)
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|line| line.text.trim()).collect()
    }

    #[test]
    fn expands_each_invocation() {
        let (lines, errors) = run("def inc\n add %a, %b\nend\ninc\ninc");
        assert!(errors.is_empty());
        assert_eq!(texts(&lines), vec!["add %a, %b", "add %a, %b"]);
    }

    #[test]
    fn body_lines_keep_the_caller_line_number() {
        let (lines, _) = run("def inc\n add %a, %b\nend\ninc");
        assert_eq!(lines[0].number, 4);
    }

    #[test]
    fn bodies_invoke_other_macros() {
        let source = "def one\n cli\nend\ndef two\n one\n one\nend\ntwo";
        let (lines, errors) = run(source);
        assert!(errors.is_empty());
        assert_eq!(texts(&lines), vec!["cli", "cli"]);
    }

    #[test]
    fn nested_definition_is_an_error() {
        let (_, errors) = run("def outer\ndef inner\nend");
        assert_eq!(errors, vec![Error::NestedMacroDefinition { line_number: 2 }]);
    }

    #[test]
    fn end_outside_a_definition_is_an_error() {
        let (lines, errors) = run("cli\nend");
        assert_eq!(errors, vec![Error::EndOutsideMacro { line_number: 2 }]);
        assert_eq!(texts(&lines), vec!["cli"]);
    }

    #[test]
    fn redefinition_keeps_the_first_body() {
        let source = "def m\n cli\nend\ndef m\n sti\nend\nm";
        let (lines, errors) = run(source);
        assert_eq!(
            errors,
            vec![Error::RedefinedMacro {
                name: "m".to_string(),
                line_number: 4,
            }]
        );
        assert_eq!(texts(&lines), vec!["cli"]);
    }

    #[test]
    fn untouched_lines_pass_through() {
        let (lines, errors) = run("cli\nadd %a, %b");
        assert!(errors.is_empty());
        assert_eq!(texts(&lines), vec!["cli", "add %a, %b"]);
    }

    #[test]
    fn open_definition_at_end_of_input_is_discarded() {
        let (lines, errors) = run("def m\n cli");
        assert!(errors.is_empty());
        assert!(lines.is_empty());
    }
}
