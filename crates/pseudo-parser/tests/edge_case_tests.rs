//! Grammar edge cases.
//!
//! Covers:
//! 1. Operator precedence and associativity
//! 2. Atom forms (casts, MOD/DIV prefix calls, dates, parentheses)
//! 3. Placement rules (routines only at top level, stray terminators)
//! 4. Error recovery and the error cap

use pseudo_lexer::Lexer;
use pseudo_parser::{ParseResult, Parser};
use pseudo_types::ast::*;
use pseudo_types::{SourceFile, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.pseudo", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse `x <- <expr>` and return the expression.
fn expr(source: &str) -> Expr {
    let result = parse(&format!("x <- {source}"));
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {e}");
        }
        panic!("unexpected parse errors (see above)");
    }
    let program = result.program.expect("no program returned");
    match program.body.stmts.into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Assign { value, .. }) => value,
        other => panic!("expected assignment, got {other:?}"),
    }
}

/// Render an expression fully parenthesised, for precedence checks.
fn show(e: &Expr) -> String {
    match &e.kind {
        ExprKind::IntegerLit(n) => n.to_string(),
        ExprKind::RealLit(n) => n.to_string(),
        ExprKind::BoolLit(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        ExprKind::CharLit(c) => format!("'{c}'"),
        ExprKind::StringLit(s) => format!("\"{s}\""),
        ExprKind::DateLit { day, month, year } => format!("{day}/{month}/{year}"),
        ExprKind::Access(path) => show_path(path),
        ExprKind::Call { name, args } => {
            let args: Vec<String> = args.iter().map(show).collect();
            format!("{}({})", name.name, args.join(", "))
        }
        ExprKind::Cast { target, operand } => format!("{target}({})", show(operand)),
        ExprKind::Binary { left, op, right } => {
            format!("({} {op} {})", show(left), show(right))
        }
        ExprKind::Unary { op, operand } => format!("({op} {})", show(operand)),
        ExprKind::Paren(inner) => show(inner),
    }
}

fn show_path(path: &AccessPath) -> String {
    match &path.kind {
        AccessKind::Name(ident) => ident.name.clone(),
        AccessKind::Deref(base) => format!("{}^", show_path(base)),
        AccessKind::Member { base, member } => format!("{}.{}", show_path(base), member.name),
        AccessKind::Index { base, indices } => {
            let indices: Vec<String> = indices.iter().map(show).collect();
            format!("{}[{}]", show_path(base), indices.join(", "))
        }
    }
}

fn messages(source: &str) -> Vec<String> {
    parse(source)
        .errors
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(show(&expr("1 + 2 * 3")), "(1 + (2 * 3))");
    assert_eq!(show(&expr("1 * 2 + 3")), "((1 * 2) + 3)");
}

#[test]
fn mod_and_div_share_the_term_level() {
    assert_eq!(show(&expr("a MOD b DIV c * d")), "(((a MOD b) DIV c) * d)");
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(show(&expr("10 - 4 - 3")), "((10 - 4) - 3)");
}

#[test]
fn concat_sits_between_additive_and_comparison() {
    assert_eq!(show(&expr("a & b + 1 = c")), "((a & (b + 1)) = c)");
}

#[test]
fn and_or_share_a_level() {
    assert_eq!(show(&expr("a OR b AND c")), "((a OR b) AND c)");
}

#[test]
fn not_binds_looser_than_comparison() {
    assert_eq!(show(&expr("NOT a = b")), "(NOT (a = b))");
    assert_eq!(show(&expr("NOT a AND b")), "((NOT a) AND b)");
}

#[test]
fn unary_minus_binds_tightest() {
    assert_eq!(show(&expr("-a * b")), "((- a) * b)");
    assert_eq!(show(&expr("--3")), "(- (- 3))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(show(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
}

#[test]
fn comparisons_do_not_chain() {
    assert_eq!(
        messages("x <- 1 < y < 3"),
        vec!["comparison operators cannot be chained; combine them with AND".to_string()]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Atoms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn cast_forms() {
    assert_eq!(show(&expr("INTEGER(3.7) + REAL(n)")), "(INTEGER(3.7) + REAL(n))");
    assert_eq!(
        messages("x <- STRING"),
        vec!["expected '(' after type name, got 'end of file'".to_string()]
    );
}

#[test]
fn mod_div_prefix_form() {
    assert_eq!(show(&expr("MOD(7, 3) + DIV(7, 2)")), "((7 MOD 3) + (7 DIV 2))");
}

#[test]
fn function_calls_nest() {
    assert_eq!(
        show(&expr("LEFT(TO_UPPER(s), LENGTH(s) - 1)")),
        "LEFT(TO_UPPER(s), (LENGTH(s) - 1))"
    );
    assert_eq!(show(&expr("TODAY()")), "TODAY()");
}

#[test]
fn date_literal_atom() {
    assert_eq!(show(&expr("25/12/2024")), "25/12/2024");
    assert_eq!(show(&expr("25 / 12")), "(25 / 12)");
}

#[test]
fn access_paths_compose() {
    assert_eq!(show(&expr("head^.next^.value")), "head^.next^.value");
    assert_eq!(show(&expr("rows[i].cells[j, k + 1]")), "rows[i].cells[j, (k + 1)]");
}

#[test]
fn missing_operand() {
    assert_eq!(
        messages("x <- 1 +"),
        vec!["expected expression, got 'end of file'".to_string()]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────

#[test]
fn procedure_inside_block_is_rejected() {
    let errors = messages("IF TRUE THEN\n  PROCEDURE P\n  ENDPROCEDURE\nENDIF");
    assert_eq!(errors[0], "Procedures can only be defined in the global scope");
}

#[test]
fn function_inside_routine_is_rejected() {
    let errors = messages(
        "PROCEDURE Outer\n  FUNCTION Inner RETURNS INTEGER\n    RETURN 1\n  ENDFUNCTION\nENDPROCEDURE",
    );
    assert_eq!(errors[0], "Functions can only be defined in the global scope");
}

#[test]
fn stray_terminator_at_top_level() {
    assert_eq!(messages("OUTPUT 1\nENDIF\nOUTPUT 2"), vec!["unexpected 'ENDIF'".to_string()]);
    let program = parse("OUTPUT 1\nENDIF\nOUTPUT 2").program.expect("program");
    assert_eq!(program.body.stmts.len(), 2);
}

#[test]
fn trailing_tokens_after_statement() {
    assert_eq!(
        messages("OUTPUT 1 2"),
        vec!["expected newline, got '2'".to_string()]
    );
}

#[test]
fn type_without_definition() {
    assert_eq!(
        messages("TYPE T = 5"),
        vec!["Expected definition for type".to_string()]
    );
}

#[test]
fn parameter_without_type() {
    let errors = messages("PROCEDURE P(a, b)\nENDPROCEDURE");
    assert_eq!(errors[0], "expected ':', got ')'");
}

// ─────────────────────────────────────────────────────────────────────
// Recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn recovers_at_next_line() {
    let result = parse("x <- \nOUTPUT 1\ny <- * 2\nOUTPUT 2");
    assert_eq!(result.errors.total_errors, 2);
    let program = result.program.expect("program");
    let outputs = program
        .body
        .stmts
        .iter()
        .filter(|s| matches!(s.kind, StmtKind::Output(_)))
        .count();
    assert_eq!(outputs, 2);
}

#[test]
fn error_positions() {
    let result = parse("OUTPUT 1\n  x <- )");
    let error = &result.errors.errors[0];
    assert_eq!(error.span.start_line, 2);
    assert_eq!(error.span.start_col, 8);
    assert_eq!(error.source_line, "  x <- )");
}

#[test]
fn error_cap() {
    let source = "x <- )\n".repeat(MAX_ERRORS + 10);
    let result = parse(&source);
    assert_eq!(result.errors.errors.len(), MAX_ERRORS);
}
