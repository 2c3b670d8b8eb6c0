//! Context-aware erasure of `console.*` calls.
//!
//! The tree is never mutated. The walk collects byte-range [`Edit`]s against the original
//! text and [`splice`] applies them, so everything the rewrite does not touch (layout,
//! comments, quoting) survives byte-for-byte.

use tree_sitter::{Node, Tree};

use crate::classifier::{is_console_call, strip_parens};
use crate::dialect::Dialect;
use crate::error::TransformError;

/// Neutral value substituted for calls that sit inside a larger expression.
pub const PLACEHOLDER: &str = "undefined";

/// Replacement for a statement that must keep its slot (`if (x) console.log()`).
const EMPTY_BLOCK: &str = "{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Whole statement removal; may be widened to swallow its line.
    Statement,
    /// Exact byte-range replacement.
    Splice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: &'static str,
    pub kind: EditKind,
}

impl Edit {
    fn splice(start: usize, end: usize, replacement: &'static str) -> Self {
        Self {
            start,
            end,
            replacement,
            kind: EditKind::Splice,
        }
    }

    fn statement(node: Node<'_>, replacement: &'static str) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            replacement,
            kind: EditKind::Statement,
        }
    }
}

/// What a node means to the rewrite. Each node maps to exactly one site.
enum Site<'t> {
    /// Expression statement made only of console calls.
    Statement { stmt: Node<'t>, calls: usize },
    /// Console call in expression position.
    Call(Node<'t>),
    /// Comma sequence, flattened.
    Sequence { node: Node<'t>, elements: Vec<Node<'t>> },
    Other,
}

/// How the walk continues after a node has been handled.
enum Walk<'t> {
    /// The node was consumed; nothing below it is visited.
    Skip,
    Children,
    /// Visit only these nodes (the survivors of a filtered sequence).
    Only(Vec<Node<'t>>),
}

/// Collected edits plus the number of console calls they erase.
#[derive(Debug, Default)]
pub struct Rewrite {
    pub edits: Vec<Edit>,
    pub removed: usize,
}

struct Rewriter<'s> {
    source: &'s [u8],
    out: Rewrite,
}

/// Walk `tree` in document order and collect the edits that erase every console call.
pub fn collect_edits(tree: &Tree, source: &str) -> Rewrite {
    let mut rw = Rewriter {
        source: source.as_bytes(),
        out: Rewrite::default(),
    };

    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        match rw.visit(node) {
            Walk::Skip => {}
            Walk::Children => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
            Walk::Only(nodes) => stack.extend(nodes.into_iter().rev()),
        }
    }

    rw.out.edits = widen_statement_edits(source, rw.out.edits);
    rw.out
}

impl<'s> Rewriter<'s> {
    fn visit<'t>(&mut self, node: Node<'t>) -> Walk<'t> {
        match self.site_of(node) {
            Site::Statement { stmt, calls } => {
                self.erase_statement(stmt);
                self.out.removed += calls;
                Walk::Skip
            }
            Site::Call(call) => {
                self.out
                    .edits
                    .push(Edit::splice(call.start_byte(), call.end_byte(), PLACEHOLDER));
                self.out.removed += 1;
                Walk::Skip
            }
            Site::Sequence { node, elements } => self.filter_sequence(node, elements),
            Site::Other => Walk::Children,
        }
    }

    fn site_of<'t>(&self, node: Node<'t>) -> Site<'t> {
        match node.kind() {
            "expression_statement" if !is_for_header(node) => match statement_expression(node) {
                Some(expr) => match self.erasable_calls(expr) {
                    Some(calls) => Site::Statement { stmt: node, calls },
                    None => Site::Other,
                },
                None => Site::Other,
            },
            "call_expression" if is_console_call(node, self.source) => Site::Call(node),
            "sequence_expression" => Site::Sequence {
                node,
                elements: sequence_elements(node),
            },
            _ => Site::Other,
        }
    }

    fn is_console_element(&self, node: Node<'_>) -> bool {
        is_console_call(strip_parens(node), self.source)
    }

    /// Number of calls when `expr` consists solely of console calls, else `None`.
    fn erasable_calls(&self, expr: Node<'_>) -> Option<usize> {
        let expr = strip_parens(expr);
        if is_console_call(expr, self.source) {
            return Some(1);
        }
        if expr.kind() == "sequence_expression" {
            let elements = sequence_elements(expr);
            if !elements.is_empty() && elements.iter().all(|e| self.is_console_element(*e)) {
                return Some(elements.len());
            }
        }
        None
    }

    /// Remove `stmt` in a way that keeps its parent well-formed.
    fn erase_statement(&mut self, stmt: Node<'_>) {
        let Some(parent) = stmt.parent() else {
            self.out.edits.push(Edit::statement(stmt, ""));
            return;
        };

        match parent.kind() {
            // Single-statement slots cannot be left empty.
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
            | "with_statement" => {
                self.out
                    .edits
                    .push(Edit::splice(stmt.start_byte(), stmt.end_byte(), EMPTY_BLOCK));
            }
            "else_clause" => {
                let start = parent
                    .prev_sibling()
                    .map(|p| p.end_byte())
                    .unwrap_or(parent.start_byte());
                self.out.edits.push(Edit::splice(start, parent.end_byte(), ""));
            }
            "labeled_statement" => self.erase_statement(parent),
            _ => {
                let separator = self.statement_separator(stmt);
                self.out.edits.push(Edit::statement(stmt, separator));
            }
        }
    }

    fn is_erased_statement(&self, node: Node<'_>) -> bool {
        node.kind() == "expression_statement"
            && statement_expression(node)
                .and_then(|expr| self.erasable_calls(expr))
                .is_some()
    }

    /// `";"` when removing `stmt` would let automatic semicolon insertion join the
    /// surviving neighbours (`a = b` followed by `(x)` or `[y]`), else `""`.
    ///
    /// Only the last statement of a run of erased statements carries the separator.
    fn statement_separator(&self, stmt: Node<'_>) -> &'static str {
        let Some(next) = next_non_comment(stmt) else {
            return "";
        };
        if self.is_erased_statement(next) {
            return "";
        }
        if !matches!(
            self.source.get(next.start_byte()),
            Some(b'(' | b'[' | b'`' | b'+' | b'-' | b'/')
        ) {
            return "";
        }

        let mut prev = stmt.prev_named_sibling();
        while let Some(p) = prev {
            if p.kind() == "comment" || self.is_erased_statement(p) {
                prev = p.prev_named_sibling();
                continue;
            }
            break;
        }
        let Some(prev) = prev else {
            return "";
        };
        // `case x:` labels are not statements.
        if stmt.parent().and_then(|p| p.child_by_field_name("value")) == Some(prev) {
            return "";
        }

        match self.source[..prev.end_byte()].last() {
            Some(b';') => "",
            _ => ";",
        }
    }

    fn filter_sequence<'t>(&mut self, node: Node<'t>, elements: Vec<Node<'t>>) -> Walk<'t> {
        let erase: Vec<bool> = elements.iter().map(|e| self.is_console_element(*e)).collect();
        let dropped = erase.iter().filter(|d| **d).count();
        if dropped == 0 {
            return Walk::Only(elements);
        }
        self.out.removed += dropped;

        let Some(last_kept) = erase.iter().rposition(|d| !d) else {
            // Nothing survives: the whole sequence behaves like one call.
            self.out
                .edits
                .push(Edit::splice(node.start_byte(), node.end_byte(), PLACEHOLDER));
            return Walk::Skip;
        };

        // Leading/interior drops take their trailing comma; a trailing run takes the
        // comma after the last survivor.
        for i in 0..last_kept {
            if erase[i] {
                self.out.edits.push(Edit::splice(
                    elements[i].start_byte(),
                    elements[i + 1].start_byte(),
                    "",
                ));
            }
        }
        if last_kept + 1 < elements.len() {
            let tail_end = elements[elements.len() - 1].end_byte();
            self.out
                .edits
                .push(Edit::splice(elements[last_kept].end_byte(), tail_end, ""));
        }

        Walk::Only(
            elements
                .into_iter()
                .zip(erase)
                .filter_map(|(e, d)| (!d).then_some(e))
                .collect(),
        )
    }
}

fn next_non_comment(node: Node<'_>) -> Option<Node<'_>> {
    let mut next = node.next_named_sibling();
    while let Some(n) = next {
        if n.kind() != "comment" {
            return Some(n);
        }
        next = n.next_named_sibling();
    }
    None
}

/// The expression an expression statement wraps.
fn statement_expression(stmt: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = stmt.walk();
    let expr = stmt.named_children(&mut cursor).find(|c| c.kind() != "comment");
    expr
}

/// `for (init; cond; ...)` headers are expression statements in the grammar but
/// expressions semantically.
fn is_for_header(stmt: Node<'_>) -> bool {
    match stmt.parent() {
        Some(parent) if parent.kind() == "for_statement" => parent.child_by_field_name("body") != Some(stmt),
        _ => false,
    }
}

/// Elements of a comma sequence, flattening right-nested sequence nodes.
fn sequence_elements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {}
            "sequence_expression" => out.extend(sequence_elements(child)),
            _ => out.push(child),
        }
    }
    out
}

fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Merge statement removals that share a line, then widen each one: a statement alone
/// on its line(s) takes the whole line with it; otherwise the trailing blanks go.
fn widen_statement_edits(source: &str, mut edits: Vec<Edit>) -> Vec<Edit> {
    edits.sort_by_key(|e| (e.start, e.end));

    let mut merged: Vec<Edit> = Vec::with_capacity(edits.len());
    for e in edits {
        if let Some(prev) = merged.last_mut() {
            if prev.kind == EditKind::Statement
                && e.kind == EditKind::Statement
                && prev.end <= e.start
                && is_blank(&source[prev.end..e.start])
            {
                prev.end = e.end;
                if !e.replacement.is_empty() {
                    prev.replacement = e.replacement;
                }
                continue;
            }
        }
        merged.push(e);
    }

    merged
        .into_iter()
        .map(|e| match e.kind {
            EditKind::Statement => widen(source, e),
            EditKind::Splice => e,
        })
        .collect()
}

fn widen(source: &str, e: Edit) -> Edit {
    let mut line_start = source[..e.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    // A byte-order mark stays in place and does not count as line content.
    if line_start == 0 && source.starts_with('\u{FEFF}') {
        line_start = '\u{FEFF}'.len_utf8();
    }
    let line_end = source[e.end..]
        .find('\n')
        .map(|i| e.end + i)
        .unwrap_or(source.len());

    let before = &source[line_start..e.start];
    let after = source[e.end..line_end].trim_end_matches('\r');

    if is_blank(before) && is_blank(after) {
        let end = if line_end < source.len() { line_end + 1 } else { line_end };
        return Edit { start: line_start, end, ..e };
    }

    let trailing = source[e.end..line_end]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    Edit {
        end: e.end + trailing,
        ..e
    }
}

/// Apply edits to `source`. Overlapping edits mean the rewrite lost track of what it
/// consumed; that is reported instead of guessing.
pub fn splice(source: &str, dialect: Dialect, mut edits: Vec<Edit>) -> Result<String, TransformError> {
    edits.sort_by_key(|e| (e.start, e.end));

    let mut out = source.to_string();
    let mut last_start: Option<usize> = None;

    // Apply from end -> start so byte offsets remain valid.
    for edit in edits.into_iter().rev() {
        if edit.start > edit.end || edit.end > source.len() {
            return Err(TransformError::Serialization {
                dialect,
                reason: format!("edit {}..{} is out of bounds", edit.start, edit.end),
            });
        }
        if let Some(ls) = last_start {
            if edit.end > ls {
                return Err(TransformError::Serialization {
                    dialect,
                    reason: format!("overlapping edits at byte {}..{}", edit.start, edit.end),
                });
            }
        }

        out.replace_range(edit.start..edit.end, edit.replacement);
        last_start = Some(edit.start);
    }

    Ok(out)
}
