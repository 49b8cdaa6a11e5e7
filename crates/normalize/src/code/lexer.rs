//! Line- and indentation-aware lexer for Python-like source.
//!
//! Produces a flat lexeme stream with explicit `Newline`, `Indent` and
//! `Dedent` markers. Newlines inside brackets and after a backslash are
//! joined into one logical line. The first logical line fixes the base
//! indentation, so a paragraph cut out of the middle of a block still lexes.

use crate::error::CodeParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexKind {
    Name,
    Number,
    Str,
    Op,
    Open,
    Close,
    Newline,
    Indent,
    Dedent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lexeme<'s> {
    pub kind: LexKind,
    pub text: &'s str,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Lexeme<'_> {
    pub(crate) fn is_op(&self, op: &str) -> bool {
        self.kind == LexKind::Op && self.text == op
    }

    pub(crate) fn is_name(&self, name: &str) -> bool {
        self.kind == LexKind::Name && self.text == name
    }
}

const OPS_3: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const OPS_2: [&str; 19] = [
    "**", "//", "==", "!=", "<=", ">=", "->", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "@=", "<<", ">>", ":=",
];
const OPS_1: &str = "+-*/%@&|^~<>=.,:;";

pub(crate) fn lex(source: &str) -> Result<Vec<Lexeme<'_>>, CodeParseError> {
    Lexer::new(source).run()
}

struct Lexer<'s> {
    src: &'s str,
    chars: Vec<(usize, char)>,
    i: usize,
    line: usize,
    at_line_start: bool,
    brackets: Vec<char>,
    indents: Vec<usize>,
    out: Vec<Lexeme<'s>>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            i: 0,
            line: 1,
            at_line_start: true,
            brackets: Vec::new(),
            indents: Vec::new(),
            out: Vec::new(),
        }
    }

    fn byte_pos(&self, idx: usize) -> usize {
        self.chars.get(idx).map_or(self.src.len(), |&(pos, _)| pos)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.i + offset).map(|&(_, c)| c)
    }

    fn push(&mut self, kind: LexKind, start_idx: usize, end_idx: usize) {
        let start = self.byte_pos(start_idx);
        let end = self.byte_pos(end_idx);
        self.out.push(Lexeme {
            kind,
            text: &self.src[start..end],
            start,
            end,
            line: self.line,
        });
    }

    fn push_marker(&mut self, kind: LexKind) {
        let pos = self.byte_pos(self.i);
        self.out.push(Lexeme {
            kind,
            text: "",
            start: pos,
            end: pos,
            line: self.line,
        });
    }

    fn run(mut self) -> Result<Vec<Lexeme<'s>>, CodeParseError> {
        while self.i < self.chars.len() {
            if self.at_line_start && self.brackets.is_empty() {
                if !self.line_start()? {
                    continue;
                }
            }
            let c = self.chars[self.i].1;
            match c {
                '\n' => {
                    if self.brackets.is_empty() {
                        self.end_logical_line();
                        self.at_line_start = true;
                    }
                    self.line += 1;
                    self.i += 1;
                }
                ' ' | '\t' | '\r' | '\x0c' => self.i += 1,
                '#' => self.skip_to_eol(),
                '\\' => self.continuation()?,
                '"' | '\'' => self.string(self.i)?,
                '(' | '[' | '{' => {
                    self.brackets.push(c);
                    self.push(LexKind::Open, self.i, self.i + 1);
                    self.i += 1;
                }
                ')' | ']' | '}' => self.close(c)?,
                c if c.is_alphabetic() || c == '_' => {
                    if let Some(quote_at) = self.string_prefix() {
                        self.string_from(self.i, quote_at)?;
                    } else {
                        self.name();
                    }
                }
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
                _ => self.operator(c)?,
            }
        }

        if let Some(&open) = self.brackets.last() {
            return Err(CodeParseError::UnbalancedBracket {
                line: self.line,
                bracket: open,
            });
        }
        self.end_logical_line();
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_marker(LexKind::Dedent);
        }
        Ok(self.out)
    }

    /// Measures indentation at the start of a physical line. Returns `false`
    /// when the line was blank or comment-only and has been consumed.
    fn line_start(&mut self) -> Result<bool, CodeParseError> {
        let mut col = 0usize;
        let mut j = self.i;
        while let Some(&(_, c)) = self.chars.get(j) {
            match c {
                ' ' => col += 1,
                '\t' => col += 8 - col % 8,
                _ => break,
            }
            j += 1;
        }
        match self.chars.get(j).map(|&(_, c)| c) {
            None => {
                self.i = j;
                Ok(false)
            }
            Some('\n') | Some('\r') | Some('#') => {
                self.i = j;
                self.skip_to_eol();
                if self.i < self.chars.len() {
                    self.i += 1;
                    self.line += 1;
                }
                Ok(false)
            }
            Some(_) => {
                self.i = j;
                self.at_line_start = false;
                self.indent_to(col)?;
                Ok(true)
            }
        }
    }

    fn indent_to(&mut self, col: usize) -> Result<(), CodeParseError> {
        let Some(&top) = self.indents.last() else {
            self.indents.push(col);
            return Ok(());
        };
        if col > top {
            self.indents.push(col);
            self.push_marker(LexKind::Indent);
            return Ok(());
        }
        while self.indents.len() > 1 && self.indents.last().is_some_and(|&t| t > col) {
            self.indents.pop();
            self.push_marker(LexKind::Dedent);
        }
        match self.indents.last() {
            Some(&t) if t == col => Ok(()),
            // Dedent past the paragraph's first line: the paragraph began
            // inside a block, so the outer level becomes the new base.
            Some(&t) if t > col && self.indents.len() == 1 => {
                self.indents[0] = col;
                Ok(())
            }
            _ => Err(CodeParseError::InconsistentDedent { line: self.line }),
        }
    }

    fn end_logical_line(&mut self) {
        let needs_newline = self.out.last().is_some_and(|l| {
            !matches!(l.kind, LexKind::Newline | LexKind::Indent | LexKind::Dedent)
        });
        if needs_newline {
            self.push_marker(LexKind::Newline);
        }
    }

    fn skip_to_eol(&mut self) {
        while self.i < self.chars.len() && self.chars[self.i].1 != '\n' {
            self.i += 1;
        }
    }

    fn continuation(&mut self) -> Result<(), CodeParseError> {
        let mut j = self.i + 1;
        if self.chars.get(j).map(|&(_, c)| c) == Some('\r') {
            j += 1;
        }
        if self.chars.get(j).map(|&(_, c)| c) == Some('\n') {
            self.i = j + 1;
            self.line += 1;
            Ok(())
        } else {
            Err(CodeParseError::UnexpectedChar {
                line: self.line,
                ch: '\\',
            })
        }
    }

    fn close(&mut self, c: char) -> Result<(), CodeParseError> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        if self.brackets.pop() != Some(expected) {
            return Err(CodeParseError::UnbalancedBracket {
                line: self.line,
                bracket: c,
            });
        }
        self.push(LexKind::Close, self.i, self.i + 1);
        self.i += 1;
        Ok(())
    }

    /// Returns the index of the opening quote when the identifier at the
    /// cursor is a string prefix such as `r`, `b`, `f` or `rb`.
    fn string_prefix(&self) -> Option<usize> {
        let mut j = self.i;
        while j < self.chars.len() && j - self.i < 2 {
            let c = self.chars[j].1;
            if "rRbBuUfF".contains(c) {
                j += 1;
            } else {
                break;
            }
        }
        match self.chars.get(j).map(|&(_, c)| c) {
            Some('"') | Some('\'') if j > self.i => Some(j),
            _ => None,
        }
    }

    fn string(&mut self, quote_at: usize) -> Result<(), CodeParseError> {
        self.string_from(quote_at, quote_at)
    }

    fn string_from(&mut self, start: usize, quote_at: usize) -> Result<(), CodeParseError> {
        let quote = self.chars[quote_at].1;
        let start_line = self.line;
        let triple = self.chars.get(quote_at + 1).map(|&(_, c)| c) == Some(quote)
            && self.chars.get(quote_at + 2).map(|&(_, c)| c) == Some(quote);
        let mut j = quote_at + if triple { 3 } else { 1 };
        let mut lines = 0usize;

        loop {
            let Some(&(_, c)) = self.chars.get(j) else {
                return Err(CodeParseError::UnterminatedString { line: start_line });
            };
            match c {
                '\\' => {
                    if self.chars.get(j + 1).map(|&(_, n)| n) == Some('\n') {
                        lines += 1;
                    }
                    j += 2;
                }
                '\n' if !triple => {
                    return Err(CodeParseError::UnterminatedString { line: start_line });
                }
                '\n' => {
                    lines += 1;
                    j += 1;
                }
                c if c == quote => {
                    if !triple {
                        j += 1;
                        break;
                    }
                    let closes = self.chars.get(j + 1).map(|&(_, n)| n) == Some(quote)
                        && self.chars.get(j + 2).map(|&(_, n)| n) == Some(quote);
                    if closes {
                        j += 3;
                        break;
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        }

        self.push(LexKind::Str, start, j);
        self.line += lines;
        self.i = j;
        Ok(())
    }

    fn name(&mut self) {
        let start = self.i;
        while self
            .peek(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.i += 1;
        }
        self.push(LexKind::Name, start, self.i);
    }

    fn number(&mut self) {
        let start = self.i;
        let mut prev = '\0';
        while let Some(c) = self.peek(0) {
            let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                prev = c;
                self.i += 1;
            } else {
                break;
            }
        }
        self.push(LexKind::Number, start, self.i);
    }

    fn operator(&mut self, c: char) -> Result<(), CodeParseError> {
        let rest = &self.src[self.byte_pos(self.i)..];
        let len = if OPS_3.iter().any(|op| rest.starts_with(op)) {
            3
        } else if OPS_2.iter().any(|op| rest.starts_with(op)) {
            2
        } else if OPS_1.contains(c) {
            1
        } else {
            return Err(CodeParseError::UnexpectedChar { line: self.line, ch: c });
        };
        self.push(LexKind::Op, self.i, self.i + len);
        self.i += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<LexKind> {
        lex(src).expect("lexes").into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn simple_statement() {
        assert_eq!(
            kinds("x = 1"),
            vec![LexKind::Name, LexKind::Op, LexKind::Number, LexKind::Newline]
        );
    }

    #[test]
    fn indentation_markers() {
        let k = kinds("def f():\n    return 1\nx = 2");
        assert!(k.contains(&LexKind::Indent));
        assert!(k.contains(&LexKind::Dedent));
    }

    #[test]
    fn newlines_inside_brackets_are_joined() {
        let k = kinds("f(1,\n  2)\n");
        assert_eq!(k.iter().filter(|&&k| k == LexKind::Newline).count(), 1);
    }

    #[test]
    fn strings_with_prefix_and_triple_quotes() {
        let lexemes = lex("s = rb'x'\nt = \"\"\"a\nb\"\"\"").expect("lexes");
        let strs: Vec<&str> = lexemes
            .iter()
            .filter(|l| l.kind == LexKind::Str)
            .map(|l| l.text)
            .collect();
        assert_eq!(strs, vec!["rb'x'", "\"\"\"a\nb\"\"\""]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            lex("x = 'oops"),
            Err(CodeParseError::UnterminatedString { line: 1 })
        ));
    }

    #[test]
    fn mismatched_brackets_are_an_error() {
        assert!(matches!(
            lex("f(1]"),
            Err(CodeParseError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            lex("f(1"),
            Err(CodeParseError::UnbalancedBracket { .. })
        ));
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        assert!(matches!(
            lex("if x:\n        y = 1\n    z = 2"),
            Err(CodeParseError::InconsistentDedent { line: 3 })
        ));
    }

    #[test]
    fn paragraph_starting_inside_a_block_lexes() {
        assert!(lex("    return x\nclass A:\n    pass").is_ok());
    }

    #[test]
    fn unknown_characters_rejected() {
        assert!(matches!(
            lex("price is $5"),
            Err(CodeParseError::UnexpectedChar { ch: '$', .. })
        ));
    }
}
