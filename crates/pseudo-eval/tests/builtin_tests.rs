//! The built-in function library, called from programs.

use pretty_assertions::assert_eq;
use pseudo_eval::{CapturedConsole, Interpreter, InterpreterOptions, MemoryFiles};
use pseudo_lexer::Lexer;
use pseudo_parser::Parser;
use pseudo_types::ast::Program;
use pseudo_types::SourceFile;

fn parse(source: &str) -> Program {
    let sf = SourceFile::new("test.pseudo", source);
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(!lex.errors.has_errors(), "{:?}", lex.errors.errors);
    assert!(!result.errors.has_errors(), "{:?}", result.errors.errors);
    result.program.expect("no program returned")
}

/// Evaluate one expression and return what OUTPUT prints for it.
fn eval(expr: &str) -> Result<String, String> {
    let console = CapturedConsole::new();
    let mut interp = Interpreter::with_io(
        InterpreterOptions::default(),
        Box::new(console.clone()),
        Box::new(MemoryFiles::new()),
    );
    interp
        .run(&parse(&format!("OUTPUT {expr}")))
        .map_err(|e| e.to_string())?;
    Ok(console.output().concat())
}

fn ok(expr: &str) -> String {
    match eval(expr) {
        Ok(out) => out,
        Err(e) => panic!("{expr}: {e}"),
    }
}

fn err(expr: &str) -> String {
    match eval(expr) {
        Ok(out) => panic!("{expr}: expected an error, got {out}"),
        Err(e) => e,
    }
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn length_left_right_mid() {
    assert_eq!(ok("LENGTH(\"hello\")"), "5");
    assert_eq!(ok("LENGTH(\"\")"), "0");
    assert_eq!(ok("LEFT(\"hello\", 2)"), "he");
    assert_eq!(ok("RIGHT(\"hello\", 3)"), "llo");
    assert_eq!(ok("RIGHT(\"hello\", 0)"), "");
    assert_eq!(ok("MID(\"hello\", 2, 3)"), "ell");
    assert_eq!(ok("MID(\"hello\", 5, 1)"), "o");
}

#[test]
fn substring_bounds() {
    assert_eq!(err("LEFT(\"abc\", -1)"), "Length for 'LEFT' function cannot be negative");
    assert_eq!(err("LEFT(\"abc\", 4)"), "Length for 'LEFT' function cannot exceed string length");
    assert_eq!(err("RIGHT(\"abc\", -1)"), "Length for 'RIGHT' function cannot be negative");
    assert_eq!(err("RIGHT(\"abc\", 9)"), "Length for 'RIGHT' function cannot exceed string length");
    assert_eq!(err("MID(\"abc\", 0, 1)"), "Index for 'MID' function cannot be negative");
    assert_eq!(err("MID(\"abc\", 4, 1)"), "Index for 'MID' function cannot exceed string length");
    assert_eq!(err("MID(\"abc\", 1, -1)"), "Length for 'MID' function cannot be negative");
    assert_eq!(
        err("MID(\"abc\", 2, 3)"),
        "Substring length in 'MID' function cannot exceed string length"
    );
}

#[test]
fn case_conversion() {
    assert_eq!(ok("TO_UPPER(\"Mixed 1\")"), "MIXED 1");
    assert_eq!(ok("TO_LOWER(\"Mixed 1\")"), "mixed 1");
    assert_eq!(ok("UCASE('q')"), "Q");
    assert_eq!(ok("LCASE('Q')"), "q");
    assert_eq!(ok("UCASE('7')"), "7");
}

#[test]
fn number_text_conversion() {
    assert_eq!(ok("NUM_TO_STR(3)"), "3.0");
    assert_eq!(ok("NUM_TO_STR(2.5) & \"!\""), "2.5!");
    assert_eq!(ok("STR_TO_NUM(\"12.5\") * 2"), "25.0");
    assert!(err("STR_TO_NUM(\"abc\")").contains("abc"));
}

#[test]
fn is_num() {
    assert_eq!(ok("IS_NUM(\"123\")"), "TRUE");
    assert_eq!(ok("IS_NUM(\"1.5\")"), "TRUE");
    assert_eq!(ok("IS_NUM(\"1.2.3\")"), "FALSE");
    assert_eq!(ok("IS_NUM(\"-4\")"), "FALSE");
    assert_eq!(ok("IS_NUM(\"\")"), "FALSE");
}

#[test]
fn character_codes() {
    assert_eq!(ok("ASC('A')"), "65");
    assert_eq!(ok("CHR(97)"), "a");
    assert_eq!(ok("CHR(ASC('x'))"), "x");
    assert!(err("CHR(-1)").contains("-1"));
}

#[test]
fn char_argument_accepts_one_character_string() {
    assert_eq!(ok("ASC(\"B\")"), "66");
}

// ─────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────

#[test]
fn date_parts() {
    assert_eq!(ok("DAY(15/08/2021)"), "15");
    assert_eq!(ok("MONTH(15/08/2021)"), "8");
    assert_eq!(ok("YEAR(15/08/2021)"), "2021");
}

#[test]
fn day_index_starts_on_sunday() {
    // 3 March 2024 was a Sunday.
    assert_eq!(ok("DAYINDEX(03/03/2024)"), "1");
    assert_eq!(ok("DAYINDEX(09/03/2024)"), "7");
}

#[test]
fn set_date() {
    assert_eq!(ok("SETDATE(29, 2, 2024)"), "29/02/2024");
    assert_eq!(err("SETDATE(29, 2, 2023)"), "Invalid Date!");
    assert_eq!(err("SETDATE(1, 13, 2023)"), "Invalid Date!");
}

#[test]
fn today_is_a_date() {
    let today = ok("TODAY()");
    let parts: Vec<&str> = today.split('/').collect();
    assert_eq!(parts.len(), 3, "{today}");
    assert_eq!(parts[2].len(), 4, "{today}");
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn int_floors() {
    assert_eq!(ok("INT(3.7)"), "3");
    assert_eq!(ok("INT(-3.2)"), "-4");
    assert_eq!(ok("INT(5)"), "5");
}

#[test]
fn rand_rejects_non_positive_bound() {
    assert_eq!(err("RAND(0)"), "RAND argument must be greater than 0");
}

#[test]
fn maths() {
    assert_eq!(ok("POW(2, 10)"), "1024.0");
    assert_eq!(ok("SQRT(16)"), "4.0");
    assert_eq!(ok("LOG(100)"), "2.0");
    assert_eq!(ok("LN(1)"), "0.0");
    assert_eq!(ok("EXP(0)"), "1.0");
    assert_eq!(ok("SIN(0)"), "0.0");
    assert_eq!(ok("COS(0)"), "1.0");
    assert_eq!(ok("ATAN2(0, 1)"), "0.0");
}

#[test]
fn builtins_are_functions_not_procedures() {
    assert_eq!(err("0\nCALL LENGTH(\"a\")"), "Procedure 'LENGTH' is not defined");
}

#[test]
fn user_function_names_cannot_shadow_builtins() {
    let console = CapturedConsole::new();
    let mut interp = Interpreter::with_io(
        InterpreterOptions::default(),
        Box::new(console),
        Box::new(MemoryFiles::new()),
    );
    let e = interp
        .run(&parse("FUNCTION LENGTH(s : STRING) RETURNS INTEGER\n  RETURN 0\nENDFUNCTION"))
        .expect_err("redefinition accepted");
    assert_eq!(e.to_string(), "Redefinition of 'LENGTH'");
}
