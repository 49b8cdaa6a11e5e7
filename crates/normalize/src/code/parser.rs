//! Structural validator over the lexeme stream.
//!
//! Walks logical lines, checks statement and expression shape, and emits
//! one token per syntax node kind. Identifier spellings are never emitted,
//! so renaming locals leaves the token stream unchanged. Imported module
//! paths are emitted as `mod:<dotted.path>` because they carry meaning
//! independent of naming choices.

use super::lexer::{LexKind, Lexeme};
use crate::error::CodeParseError;
use crate::token::Token;

const KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

fn is_identifier(lx: &Lexeme<'_>) -> bool {
    lx.kind == LexKind::Name && !is_keyword(lx.text)
}

fn invalid(lx: &Lexeme<'_>) -> CodeParseError {
    CodeParseError::InvalidSyntax {
        line: lx.line,
        near: lx.text.to_string(),
    }
}

/// Index of the bracket closing the one opened at `open`.
fn matching(lx: &[Lexeme<'_>], open: usize) -> Result<usize, CodeParseError> {
    let mut depth = 0usize;
    for (idx, l) in lx.iter().enumerate().skip(open) {
        match l.kind {
            LexKind::Open => depth += 1,
            LexKind::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            _ => {}
        }
    }
    Err(CodeParseError::UnbalancedBracket {
        line: lx[open].line,
        bracket: lx[open].text.chars().next().unwrap_or('('),
    })
}

/// First index at bracket depth zero where `pred` holds.
fn find_top(lx: &[Lexeme<'_>], pred: impl Fn(&Lexeme<'_>) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, l) in lx.iter().enumerate() {
        match l.kind {
            LexKind::Open => depth += 1,
            LexKind::Close => depth = depth.saturating_sub(1),
            _ if depth == 0 && pred(l) => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Splits at every depth-zero lexeme matching `pred`, dropping the separators.
fn split_top<'a, 's>(
    lx: &'a [Lexeme<'s>],
    pred: impl Fn(&Lexeme<'_>) -> bool,
) -> Vec<&'a [Lexeme<'s>]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut from = 0usize;
    for (idx, l) in lx.iter().enumerate() {
        match l.kind {
            LexKind::Open => depth += 1,
            LexKind::Close => depth = depth.saturating_sub(1),
            _ if depth == 0 && pred(l) => {
                parts.push(&lx[from..idx]);
                from = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&lx[from..]);
    parts
}

/// Splits a block header at its depth-zero colon into head and inline body.
fn split_header<'a, 's>(line: &'a [Lexeme<'s>]) -> Option<(&'a [Lexeme<'s>], &'a [Lexeme<'s>])> {
    let colon = find_top(line, |l| l.is_op(":"))?;
    Some((&line[..colon], &line[colon + 1..]))
}

fn is_augassign(l: &Lexeme<'_>) -> bool {
    l.kind == LexKind::Op
        && l.text.len() >= 2
        && l.text.ends_with('=')
        && !matches!(l.text, "==" | "!=" | "<=" | ">=" | ":=")
}

pub(crate) fn parse(lexemes: &[Lexeme<'_>]) -> Result<Vec<Token>, CodeParseError> {
    let mut parser = Parser { out: Vec::new() };
    parser.module(lexemes)?;
    if parser.out.is_empty() {
        return Err(CodeParseError::Empty);
    }
    Ok(parser.out)
}

struct Parser {
    out: Vec<Token>,
}

impl Parser {
    fn emit(&mut self, kind: &str, at: &Lexeme<'_>) {
        self.out.push(Token::new(kind, at.start, at.end));
    }

    fn module(&mut self, lx: &[Lexeme<'_>]) -> Result<(), CodeParseError> {
        let mut expect_block: Option<usize> = None;
        let mut i = 0;
        while i < lx.len() {
            match lx[i].kind {
                LexKind::Indent => {
                    if expect_block.take().is_none() {
                        return Err(CodeParseError::UnexpectedIndent { line: lx[i].line });
                    }
                    i += 1;
                }
                LexKind::Dedent => {
                    if let Some(line) = expect_block {
                        return Err(CodeParseError::ExpectedBlock { line });
                    }
                    i += 1;
                }
                LexKind::Newline => i += 1,
                _ => {
                    if let Some(line) = expect_block.take() {
                        return Err(CodeParseError::ExpectedBlock { line });
                    }
                    let end = lx[i..]
                        .iter()
                        .position(|l| l.kind == LexKind::Newline)
                        .map_or(lx.len(), |p| i + p);
                    let line = &lx[i..end];
                    if self.statement(line)? {
                        expect_block = Some(line[0].line);
                    }
                    i = end;
                }
            }
        }
        // A header on the last line is fine: its body is in the next paragraph.
        Ok(())
    }

    /// Returns `true` when the statement is a block header awaiting an
    /// indented body.
    fn statement(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let Some(first) = line.first() else {
            return Ok(false);
        };
        if first.is_op("@") {
            self.emit("decorator", first);
            self.require_expr(&line[1..], first)?;
            return Ok(false);
        }
        if first.kind != LexKind::Name {
            return self.simple(line);
        }
        match first.text {
            "def" => self.funcdef(line, "funcdef"),
            "class" => self.classdef(line),
            "async" => match line.get(1) {
                Some(next) if next.is_name("def") => self.funcdef(&line[1..], "asyncfuncdef"),
                Some(next) if next.is_name("for") || next.is_name("with") => {
                    self.statement(&line[1..])
                }
                _ => Err(invalid(first)),
            },
            "if" | "elif" | "while" => {
                let kind = if first.text == "while" { "while" } else { "if" };
                self.emit(kind, first);
                let (head, body) = split_header(line).ok_or_else(|| invalid(first))?;
                self.require_expr(&head[1..], first)?;
                self.header_body(body)
            }
            "else" | "try" | "finally" => {
                if first.text != "else" {
                    self.emit(first.text, first);
                }
                let (head, body) = split_header(line).ok_or_else(|| invalid(first))?;
                if head.len() != 1 {
                    return Err(invalid(&head[1]));
                }
                self.header_body(body)
            }
            "for" => self.for_stmt(line),
            "with" => self.with_stmt(line),
            "except" => {
                self.emit("excepthandler", first);
                let (head, body) = split_header(line).ok_or_else(|| invalid(first))?;
                let clause = &head[1..];
                match find_top(clause, |l| l.is_name("as")) {
                    Some(as_at) => {
                        self.require_expr(&clause[..as_at], first)?;
                        self.single_identifier(&clause[as_at + 1..], &clause[as_at])?;
                    }
                    None => self.expr(clause, false)?,
                }
                self.header_body(body)
            }
            "return" => {
                self.emit("return", first);
                self.expr(&line[1..], false)?;
                Ok(false)
            }
            "pass" | "break" | "continue" => {
                if let Some(extra) = line.get(1) {
                    return Err(invalid(extra));
                }
                self.emit(first.text, first);
                Ok(false)
            }
            "raise" => {
                self.emit("raise", first);
                let rest = &line[1..];
                match find_top(rest, |l| l.is_name("from")) {
                    Some(from_at) => {
                        self.require_expr(&rest[..from_at], first)?;
                        self.require_expr(&rest[from_at + 1..], &rest[from_at])?;
                    }
                    None => self.expr(rest, false)?,
                }
                Ok(false)
            }
            "import" => {
                self.emit("import", first);
                self.import_names(&line[1..], first, true)?;
                Ok(false)
            }
            "from" => self.import_from(line),
            "global" | "nonlocal" => {
                self.emit(first.text, first);
                for part in split_top(&line[1..], |l| l.is_op(",")) {
                    self.single_identifier(part, first)?;
                }
                Ok(false)
            }
            "assert" => {
                self.emit("assert", first);
                self.require_expr(&line[1..], first)?;
                Ok(false)
            }
            "del" => {
                self.emit("delete", first);
                self.require_expr(&line[1..], first)?;
                Ok(false)
            }
            kw if is_keyword(kw)
                && !matches!(
                    kw,
                    "not" | "lambda" | "await" | "yield" | "True" | "False" | "None"
                ) =>
            {
                Err(invalid(first))
            }
            _ => self.simple(line),
        }
    }

    /// Inline body after a header colon, or a pending indented block.
    fn header_body(&mut self, body: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        if body.is_empty() {
            return Ok(true);
        }
        self.simple(body)?;
        Ok(false)
    }

    fn funcdef(&mut self, line: &[Lexeme<'_>], kind: &str) -> Result<bool, CodeParseError> {
        let head = &line[0];
        let name = line.get(1).ok_or_else(|| invalid(head))?;
        if !is_identifier(name) {
            return Err(invalid(name));
        }
        let open = line.get(2).ok_or_else(|| invalid(name))?;
        if !(open.kind == LexKind::Open && open.text == "(") {
            return Err(invalid(open));
        }
        self.emit(kind, head);
        let close = matching(line, 2)?;
        self.parameters(&line[3..close])?;

        let (returns, body) =
            split_header(&line[close + 1..]).ok_or_else(|| invalid(&line[close]))?;
        if let Some(arrow) = returns.first() {
            if !arrow.is_op("->") {
                return Err(invalid(arrow));
            }
            self.emit("returns", arrow);
            self.require_expr(&returns[1..], arrow)?;
        }
        self.header_body(body)
    }

    fn parameters(&mut self, params: &[Lexeme<'_>]) -> Result<(), CodeParseError> {
        if params.is_empty() {
            return Ok(());
        }
        for param in split_top(params, |l| l.is_op(",")) {
            let Some(first) = param.first() else {
                continue;
            };
            let name_at = if first.is_op("*") || first.is_op("**") {
                1
            } else if first.is_op("/") && param.len() == 1 {
                continue;
            } else {
                0
            };
            match param.get(name_at) {
                Some(name) if is_identifier(name) => self.emit("arg", name),
                Some(_) | None if name_at == 1 && param.len() == 1 => {
                    // bare `*` separating keyword-only parameters
                    continue;
                }
                Some(other) => return Err(invalid(other)),
                None => return Err(invalid(first)),
            }
            let rest = &param[name_at + 1..];
            let default_at = find_top(rest, |l| l.is_op("="));
            let annotation = match default_at {
                Some(at) => &rest[..at],
                None => rest,
            };
            if let Some(colon) = annotation.first() {
                if !colon.is_op(":") {
                    return Err(invalid(colon));
                }
                self.require_expr(&annotation[1..], colon)?;
            }
            if let Some(at) = default_at {
                self.require_expr(&rest[at + 1..], &rest[at])?;
            }
        }
        Ok(())
    }

    fn classdef(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let head = &line[0];
        let name = line.get(1).ok_or_else(|| invalid(head))?;
        if !is_identifier(name) {
            return Err(invalid(name));
        }
        self.emit("classdef", head);
        let (rest, body) = split_header(&line[2..]).ok_or_else(|| invalid(name))?;
        if let Some(open) = rest.first() {
            if !(open.kind == LexKind::Open && open.text == "(") {
                return Err(invalid(open));
            }
            let close = matching(rest, 0)?;
            if close + 1 != rest.len() {
                return Err(invalid(&rest[close + 1]));
            }
            self.group(&rest[1..close])?;
        }
        self.header_body(body)
    }

    fn for_stmt(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let head_kw = &line[0];
        self.emit("for", head_kw);
        let (head, body) = split_header(line).ok_or_else(|| invalid(head_kw))?;
        let clause = &head[1..];
        let in_at = find_top(clause, |l| l.is_name("in")).ok_or_else(|| invalid(head_kw))?;
        self.require_expr(&clause[..in_at], head_kw)?;
        self.require_expr(&clause[in_at + 1..], &clause[in_at])?;
        self.header_body(body)
    }

    fn with_stmt(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let head_kw = &line[0];
        self.emit("with", head_kw);
        let (head, body) = split_header(line).ok_or_else(|| invalid(head_kw))?;
        for item in split_top(&head[1..], |l| l.is_op(",")) {
            match find_top(item, |l| l.is_name("as")) {
                Some(as_at) => {
                    self.require_expr(&item[..as_at], head_kw)?;
                    self.require_expr(&item[as_at + 1..], &item[as_at])?;
                }
                None => self.require_expr(item, head_kw)?,
            }
        }
        self.header_body(body)
    }

    fn import_from(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let head = &line[0];
        let import_at = line
            .iter()
            .position(|l| l.is_name("import"))
            .ok_or_else(|| invalid(head))?;
        let module = &line[1..import_at];
        let mut path = String::new();
        let mut expect_name = true;
        for part in module {
            match part.kind {
                LexKind::Op if part.text == "." || part.text == "..." => {
                    path.push_str(part.text);
                    expect_name = true;
                }
                LexKind::Name if expect_name && is_identifier(part) => {
                    path.push_str(part.text);
                    expect_name = false;
                }
                _ => return Err(invalid(part)),
            }
        }
        if path.is_empty() {
            return Err(invalid(&line[import_at]));
        }
        self.emit("importfrom", head);
        self.out
            .push(Token::new(format!("mod:{path}"), module[0].start, module[module.len() - 1].end));

        let mut names = &line[import_at + 1..];
        if let [star] = names {
            if star.is_op("*") {
                self.emit("alias", star);
                return Ok(false);
            }
        }
        if let (Some(open), Some(close)) = (names.first(), names.last()) {
            if open.kind == LexKind::Open && open.text == "(" {
                if close.kind != LexKind::Close || matching(names, 0)? != names.len() - 1 {
                    return Err(invalid(close));
                }
                names = &names[1..names.len() - 1];
            }
        }
        self.import_names(names, &line[import_at], false)?;
        Ok(false)
    }

    /// `a.b as c, d` after `import`, or `x as y, z` after `from m import`.
    fn import_names(
        &mut self,
        names: &[Lexeme<'_>],
        anchor: &Lexeme<'_>,
        dotted: bool,
    ) -> Result<(), CodeParseError> {
        if names.is_empty() {
            return Err(invalid(anchor));
        }
        for (idx, item) in split_top(names, |l| l.is_op(",")).into_iter().enumerate() {
            if item.is_empty() {
                // trailing comma is only legal inside parentheses
                if dotted || idx == 0 {
                    return Err(invalid(anchor));
                }
                continue;
            }
            let (target, alias) = match item.iter().position(|l| l.is_name("as")) {
                Some(as_at) => (&item[..as_at], Some(&item[as_at + 1..])),
                None => (item, None),
            };
            let mut path = String::new();
            for (pos, part) in target.iter().enumerate() {
                let ok = if pos % 2 == 0 {
                    is_identifier(part)
                } else {
                    dotted && part.is_op(".")
                };
                if !ok {
                    return Err(invalid(part));
                }
                path.push_str(part.text);
            }
            if target.is_empty() || path.ends_with('.') {
                return Err(invalid(anchor));
            }
            if dotted {
                self.out.push(Token::new(
                    format!("mod:{path}"),
                    target[0].start,
                    target[target.len() - 1].end,
                ));
            } else {
                self.emit("alias", &target[0]);
            }
            if let Some(alias) = alias {
                self.single_identifier(alias, anchor)?;
            }
        }
        Ok(())
    }

    fn single_identifier(
        &mut self,
        lx: &[Lexeme<'_>],
        anchor: &Lexeme<'_>,
    ) -> Result<(), CodeParseError> {
        match lx {
            [name] if is_identifier(name) => Ok(()),
            [other, ..] => Err(invalid(other)),
            [] => Err(invalid(anchor)),
        }
    }

    /// Expression statements, assignments and `;`-separated sequences.
    fn simple(&mut self, line: &[Lexeme<'_>]) -> Result<bool, CodeParseError> {
        let statements = split_top(line, |l| l.is_op(";"));
        if statements.len() > 1 {
            for (idx, stmt) in statements.iter().enumerate() {
                if stmt.is_empty() {
                    if idx + 1 == statements.len() {
                        continue;
                    }
                    return Err(invalid(&line[0]));
                }
                if self.statement(stmt)? {
                    return Err(invalid(&stmt[0]));
                }
            }
            return Ok(false);
        }

        if let Some(aug) = find_top(line, is_augassign) {
            self.emit("augassign", &line[aug]);
            self.require_expr(&line[..aug], &line[aug])?;
            self.require_expr(&line[aug + 1..], &line[aug])?;
            return Ok(false);
        }

        let assigned = split_top(line, |l| l.is_op("="));
        if assigned.len() > 1 {
            let eq = find_top(line, |l| l.is_op("=")).unwrap_or(0);
            let first = assigned[0];
            if let Some(colon) = find_top(first, |l| l.is_op(":")) {
                self.emit("annassign", &line[eq]);
                self.require_expr(&first[..colon], &line[eq])?;
                self.require_expr(&first[colon + 1..], &first[colon])?;
            } else {
                self.emit("assign", &line[eq]);
                self.require_expr(first, &line[eq])?;
            }
            for part in &assigned[1..] {
                self.require_expr(part, &line[eq])?;
            }
            return Ok(false);
        }

        if let Some(colon) = find_top(line, |l| l.is_op(":")) {
            if !line[..colon].iter().any(|l| l.is_name("lambda")) {
                self.emit("annassign", &line[colon]);
                self.require_expr(&line[..colon], &line[colon])?;
                self.require_expr(&line[colon + 1..], &line[colon])?;
                return Ok(false);
            }
        }

        self.emit("expr", &line[0]);
        self.expr(line, false)?;
        Ok(false)
    }

    fn require_expr(
        &mut self,
        lx: &[Lexeme<'_>],
        anchor: &Lexeme<'_>,
    ) -> Result<(), CodeParseError> {
        if lx.is_empty() {
            return Err(invalid(anchor));
        }
        self.expr(lx, false)
    }

    fn group(&mut self, inner: &[Lexeme<'_>]) -> Result<(), CodeParseError> {
        if inner.is_empty() {
            return Ok(());
        }
        self.expr(inner, true)
    }

    /// Operand/operator alternation check over a flat expression.
    fn expr(&mut self, lx: &[Lexeme<'_>], in_group: bool) -> Result<(), CodeParseError> {
        let mut expect_operand = true;
        let mut prev_kind: Option<LexKind> = None;
        let mut i = 0;
        while i < lx.len() {
            let t = &lx[i];
            if expect_operand {
                match t.kind {
                    LexKind::Name => match t.text {
                        "not" => self.emit("unaryop", t),
                        "await" => self.emit("await", t),
                        "lambda" => {
                            self.emit("lambda", t);
                            let colon = find_top(&lx[i..], |l| l.is_op(":"))
                                .ok_or_else(|| invalid(t))?;
                            i += colon;
                        }
                        "yield" => {
                            self.emit("yield", t);
                            if lx.get(i + 1).is_some_and(|n| n.is_name("from")) {
                                i += 1;
                            }
                            if i + 1 == lx.len() {
                                expect_operand = false;
                            }
                        }
                        "True" | "False" | "None" => {
                            self.emit("const", t);
                            expect_operand = false;
                        }
                        kw if is_keyword(kw) => return Err(invalid(t)),
                        _ => {
                            self.emit("name", t);
                            expect_operand = false;
                        }
                    },
                    LexKind::Number => {
                        self.emit("num", t);
                        expect_operand = false;
                    }
                    LexKind::Str => {
                        self.emit("str", t);
                        expect_operand = false;
                    }
                    LexKind::Open => {
                        let close = matching(lx, i)?;
                        match t.text {
                            "[" => self.emit("list", t),
                            "{" => self.emit("dict", t),
                            _ => {}
                        }
                        self.group(&lx[i + 1..close])?;
                        i = close;
                        expect_operand = false;
                    }
                    LexKind::Op => match t.text {
                        "-" | "+" | "~" => self.emit("unaryop", t),
                        "*" | "**" => self.emit("starred", t),
                        "..." => {
                            self.emit("const", t);
                            expect_operand = false;
                        }
                        ":" if in_group => {}
                        _ => return Err(invalid(t)),
                    },
                    _ => return Err(invalid(t)),
                }
            } else {
                match t.kind {
                    LexKind::Open => {
                        let close = matching(lx, i)?;
                        match t.text {
                            "(" => self.emit("call", t),
                            "[" => self.emit("subscript", t),
                            _ => return Err(invalid(t)),
                        }
                        self.group(&lx[i + 1..close])?;
                        i = close;
                    }
                    LexKind::Str if prev_kind == Some(LexKind::Str) => {}
                    LexKind::Op => match t.text {
                        "." => match lx.get(i + 1) {
                            Some(attr) if attr.kind == LexKind::Name => {
                                self.emit("attr", t);
                                i += 1;
                            }
                            _ => return Err(invalid(t)),
                        },
                        "+" | "-" | "*" | "/" | "//" | "%" | "**" | "@" | "&" | "|" | "^"
                        | "<<" | ">>" => {
                            self.emit("binop", t);
                            expect_operand = true;
                        }
                        "==" | "!=" | "<" | ">" | "<=" | ">=" => {
                            self.emit("compare", t);
                            expect_operand = true;
                        }
                        ":=" => {
                            self.emit("namedexpr", t);
                            expect_operand = true;
                        }
                        "," => expect_operand = true,
                        ":" if in_group => expect_operand = true,
                        "=" if in_group => {
                            self.emit("keyword", t);
                            expect_operand = true;
                        }
                        _ => return Err(invalid(t)),
                    },
                    LexKind::Name => {
                        match t.text {
                            "and" | "or" => self.emit("boolop", t),
                            "in" => self.emit("compare", t),
                            "not" => match lx.get(i + 1) {
                                Some(next) if next.is_name("in") => {
                                    self.emit("compare", t);
                                    i += 1;
                                }
                                _ => return Err(invalid(t)),
                            },
                            "is" => {
                                self.emit("compare", t);
                                if lx.get(i + 1).is_some_and(|n| n.is_name("not")) {
                                    i += 1;
                                }
                            }
                            "if" => self.emit("ifexp", t),
                            "else" => {}
                            "for" if in_group => self.emit("comprehension", t),
                            "async"
                                if in_group && lx.get(i + 1).is_some_and(|n| n.is_name("for")) =>
                            {
                                self.emit("comprehension", t);
                                i += 1;
                            }
                            _ => return Err(invalid(t)),
                        }
                        expect_operand = true;
                    }
                    _ => return Err(invalid(t)),
                }
            }
            prev_kind = Some(lx[i].kind);
            i += 1;
        }

        if expect_operand {
            if let Some(last) = lx.last() {
                let trailing_ok = last.is_op(",")
                    || last.is_name("yield")
                    || (in_group && last.is_op(":"));
                if !trailing_ok {
                    return Err(invalid(last));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::lexer::lex;

    fn kinds(src: &str) -> Result<Vec<String>, CodeParseError> {
        let lexemes = lex(src)?;
        parse(&lexemes).map(|tokens| tokens.into_iter().map(|t| t.text).collect())
    }

    #[test]
    fn function_definition_emits_node_kinds() {
        let out = kinds("def add(a, b):\n    return a + b").expect("parses");
        assert_eq!(out, vec!["funcdef", "arg", "arg", "return", "name", "binop", "name"]);
    }

    #[test]
    fn renaming_identifiers_does_not_change_output() {
        let a = kinds("def total(items):\n    s = 0\n    for x in items:\n        s += x\n    return s");
        let b = kinds("def acc(values):\n    r = 0\n    for v in values:\n        r += v\n    return r");
        assert_eq!(a.expect("parses"), b.expect("parses"));
    }

    #[test]
    fn imports_keep_module_paths() {
        let out = kinds("import os.path as p, sys\nfrom collections import (OrderedDict, deque)")
            .expect("parses");
        assert!(out.contains(&"mod:os.path".to_string()));
        assert!(out.contains(&"mod:sys".to_string()));
        assert!(out.contains(&"mod:collections".to_string()));
        assert_eq!(out.iter().filter(|k| *k == "alias").count(), 2);
    }

    #[test]
    fn class_with_decorated_method() {
        let src = "class Box(Base, metaclass=Meta):\n    @property\n    def size(self) -> int:\n        return len(self.items[1:])";
        let out = kinds(src).expect("parses");
        assert_eq!(out[0], "classdef");
        assert!(out.contains(&"decorator".to_string()));
        assert!(out.contains(&"returns".to_string()));
        assert!(out.contains(&"subscript".to_string()));
        assert!(out.contains(&"attr".to_string()));
    }

    #[test]
    fn comprehensions_lambdas_and_conditionals() {
        let src = "ys = [f(x) for x in xs if x is not None]\nkey = lambda p: p[0] if p else -1";
        let out = kinds(src).expect("parses");
        assert!(out.contains(&"comprehension".to_string()));
        assert!(out.contains(&"lambda".to_string()));
        assert!(out.contains(&"ifexp".to_string()));
    }

    #[test]
    fn prose_that_starts_like_code_is_rejected() {
        assert!(kinds("def is a keyword in some languages").is_err());
        assert!(kinds("import the data from the file").is_err());
        assert!(kinds("class notes are due tomorrow").is_err());
    }

    #[test]
    fn missing_block_is_reported() {
        assert!(matches!(
            kinds("if x:\ny = 1"),
            Err(CodeParseError::ExpectedBlock { line: 1 })
        ));
    }

    #[test]
    fn unexpected_indent_is_reported() {
        assert!(matches!(
            kinds("x = 1\n    y = 2"),
            Err(CodeParseError::UnexpectedIndent { line: 2 })
        ));
    }

    #[test]
    fn header_at_end_of_paragraph_is_accepted() {
        assert!(kinds("for row in rows:").is_ok());
    }

    #[test]
    fn token_offsets_point_into_the_source() {
        let src = "def f(a):\n    return a";
        let lexemes = lex(src).expect("lexes");
        let tokens = parse(&lexemes).expect("parses");
        assert_eq!(&src[tokens[0].start..tokens[0].end], "def");
        assert_eq!(&src[tokens[1].start..tokens[1].end], "a");
    }
}
