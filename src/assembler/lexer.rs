//! Splits a source line into typed tokens

use regex::Regex;

use crate::assembler::Error;
use crate::assembler::keywords;

/// What kind of lexeme a token is, decided by the first applicable rule of
/// [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Opcode,
    ImmDec,
    ImmHex,
    Register,
    LabelDef,
    LabelRef,
    Str,
}

/// A lexed lexeme with its raw text and 1-based source line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line_number: usize,
}

pub struct Lexer {
    lexeme_re: Regex,
}

impl Lexer {
    pub fn new() -> Lexer {
        // Alternatives in match order: complete string, unterminated string
        // tail, comment, plain lexeme. Strings keep separators and `#`
        // literal; a backslash escapes the next character.
        let lexeme_re =
            Regex::new(r#""(?:\\.|[^"\\])*"|"(?:\\.|[^"\\])*|#.*|[^\s,#]+"#).unwrap();
        Lexer { lexeme_re }
    }

    /// Lex one line into tokens. Separators are space, tab and comma; a `#`
    /// outside a string stops the scan.
    pub fn lex_line(&self, line: &str, line_number: usize) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        for found in self.lexeme_re.find_iter(line) {
            let lexeme = found.as_str();
            if lexeme.starts_with('#') {
                break;
            }
            if lexeme.starts_with('"') && unescape_string(lexeme).is_none() {
                return Err(Error::UnterminatedString { line_number });
            }
            tokens.push(Token {
                kind: classify(lexeme),
                text: lexeme.to_string(),
                line_number,
            });
        }
        Ok(tokens)
    }
}

/// Classify a lexeme by the first applicable rule.
fn classify(lexeme: &str) -> TokenKind {
    if lexeme.starts_with('%') {
        TokenKind::Register
    } else if lexeme.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        TokenKind::ImmDec
    } else if lexeme.starts_with('$') {
        TokenKind::ImmHex
    } else if lexeme.ends_with(':') {
        TokenKind::LabelDef
    } else if keywords::lookup(lexeme).is_some() {
        TokenKind::Opcode
    } else if lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"') {
        TokenKind::Str
    } else {
        TokenKind::LabelRef
    }
}

/// Strip the quotes of a string lexeme and resolve its escapes: a backslash
/// makes the following character literal. `None` if the lexeme never closes.
pub fn unescape_string(lexeme: &str) -> Option<String> {
    let mut chars = lexeme.strip_prefix('"')?.chars();
    let mut unescaped = String::new();
    loop {
        match chars.next()? {
            '\\' => unescaped.push(chars.next()?),
            '"' => return chars.next().is_none().then_some(unescaped),
            c => unescaped.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        Lexer::new()
            .lex_line(line, 1)
            .unwrap()
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn classifies_instruction_operands() {
        assert_eq!(
            kinds("add %a, %b"),
            vec![TokenKind::Opcode, TokenKind::Register, TokenKind::Register]
        );
        assert_eq!(
            kinds("ld %a, $1234"),
            vec![TokenKind::Opcode, TokenKind::Register, TokenKind::ImmHex]
        );
        assert_eq!(kinds("jnz 100"), vec![TokenKind::Opcode, TokenKind::ImmDec]);
    }

    #[test]
    fn separators_are_interchangeable() {
        assert_eq!(kinds("add,%a,%b"), kinds("add \t %a  %b"));
    }

    #[test]
    fn labels_and_references() {
        assert_eq!(kinds("loop:"), vec![TokenKind::LabelDef]);
        assert_eq!(kinds("jnz loop"), vec![TokenKind::Opcode, TokenKind::LabelRef]);
    }

    #[test]
    fn comments_stop_the_scan() {
        assert_eq!(kinds("add %a, %b # into a").len(), 3);
        assert!(kinds("# whole line").is_empty());
        assert_eq!(kinds("cli# glued"), vec![TokenKind::Opcode]);
    }

    #[test]
    fn strings_keep_separators_and_hashes() {
        let tokens = Lexer::new().lex_line(r#"str "a b,#c""#, 1).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].text, r#""a b,#c""#);
    }

    #[test]
    fn escaped_quotes_stay_inside_the_string() {
        let tokens = Lexer::new().lex_line(r#"str "say \"hi\"""#, 1).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            unescape_string(&tokens[1].text),
            Some(r#"say "hi""#.to_string())
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(
            Lexer::new().lex_line(r#"str "oops"#, 7),
            Err(Error::UnterminatedString { line_number: 7 })
        );
    }

    #[test]
    fn tokens_remember_their_line() {
        let tokens = Lexer::new().lex_line("push %a", 42).unwrap();
        assert!(tokens.iter().all(|token| token.line_number == 42));
    }

    #[test]
    fn digit_led_lexemes_are_decimal_immediates() {
        // even a malformed one; the encoder rejects it when parsing
        assert_eq!(kinds("jnz 9lives"), vec![TokenKind::Opcode, TokenKind::ImmDec]);
    }
}
