//! End-to-end execution of programs.
//!
//! Covers:
//! 1. Declarations, implicit declarations and constants
//! 2. Operators, coercions and casts
//! 3. Control flow (IF, CASE, WHILE, REPEAT, FOR, BREAK, CONTINUE)
//! 4. Routines, parameter passing and recursion
//! 5. Arrays, records, enums and pointers
//! 6. Console input and REPL echo

use pretty_assertions::assert_eq;
use pseudo_eval::{
    CapturedConsole, Interpreter, InterpreterOptions, MemoryFiles, RuntimeError, Value,
};
use pseudo_lexer::Lexer;
use pseudo_parser::Parser;
use pseudo_types::ast::Program;
use pseudo_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> Program {
    let sf = SourceFile::new("test.pseudo", source);
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).parse();
    let mut errors = lex.errors.errors;
    errors.extend(result.errors.errors);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {e}");
        }
        panic!("unexpected syntax errors (see above)");
    }
    result.program.expect("no program returned")
}

fn interpreter(console: &CapturedConsole, options: InterpreterOptions) -> Interpreter {
    Interpreter::with_io(
        options,
        Box::new(console.clone()),
        Box::new(MemoryFiles::new()),
    )
}

/// Run `source` and return the interpreter for inspection.
fn run(source: &str) -> (Interpreter, CapturedConsole) {
    let console = CapturedConsole::new();
    let mut interp = interpreter(&console, InterpreterOptions::default());
    if let Err(e) = interp.run(&parse(source)) {
        panic!("runtime error at {}: {e}", e.span);
    }
    (interp, console)
}

/// Run `source` and return its OUTPUT lines.
fn output(source: &str) -> Vec<String> {
    run(source).1.output()
}

fn run_err(source: &str) -> RuntimeError {
    let console = CapturedConsole::new();
    let mut interp = interpreter(&console, InterpreterOptions::default());
    match interp.run(&parse(source)) {
        Ok(()) => panic!("expected a runtime error"),
        Err(e) => e,
    }
}

// ─────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn declare_then_assign() {
    let (interp, _) = run("DECLARE x : INTEGER\nx <- 5");
    assert_eq!(interp.global("x"), Some(Value::Integer(5)));
}

#[test]
fn defaults_by_type() {
    let out = output(
        "DECLARE i : INTEGER\nDECLARE r : REAL\nDECLARE b : BOOLEAN\nDECLARE s : STRING\n\
         OUTPUT i\nOUTPUT r\nOUTPUT b\nOUTPUT \"[\", s, \"]\"",
    );
    assert_eq!(out, vec!["0", "0.0", "FALSE", "[]"]);
}

#[test]
fn first_assignment_declares_with_value_type() {
    let (interp, _) = run("total <- 2.5\nname <- \"Ada\"\ncount <- 3");
    assert_eq!(interp.global("total"), Some(Value::Real(2.5)));
    assert_eq!(interp.global("name"), Some(Value::String("Ada".into())));
    assert_eq!(interp.global("count"), Some(Value::Integer(3)));
}

#[test]
fn integer_widens_into_real_variable() {
    let (interp, _) = run("DECLARE r : REAL\nr <- 4");
    assert_eq!(interp.global("r"), Some(Value::Real(4.0)));
}

#[test]
fn constants_are_readable() {
    assert_eq!(output("CONSTANT Max = 10\nOUTPUT Max * 2"), vec!["20"]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn integer_arithmetic_stays_integer() {
    let out = output("OUTPUT 7 / 2\nOUTPUT 7 MOD 3\nOUTPUT 7 DIV 2\nOUTPUT MOD(9, 4)");
    assert_eq!(out, vec!["3", "1", "3", "1"]);
}

#[test]
fn mixed_arithmetic_promotes_to_real() {
    let out = output("OUTPUT 1 + 2.5\nOUTPUT 7.0 / 2\nOUTPUT 2 * 1.5");
    assert_eq!(out, vec!["3.5", "3.5", "3.0"]);
}

#[test]
fn concatenation_formats_primitives() {
    let out = output("d <- 03/07/2024\nOUTPUT \"n=\" & 1 & \" \" & TRUE & \" \" & 2.0 & \" \" & d");
    assert_eq!(out, vec!["n=1 TRUE 2.0 03/07/2024"]);
}

#[test]
fn comparisons() {
    let out = output(
        "OUTPUT 2 = 2.0\nOUTPUT 'a' < 'b'\nOUTPUT \"x\" <> \"y\"\nOUTPUT 01/01/2024 > 31/12/2023",
    );
    assert_eq!(out, vec!["TRUE", "TRUE", "TRUE", "TRUE"]);
}

#[test]
fn logical_operators() {
    let out = output("OUTPUT TRUE AND NOT FALSE\nOUTPUT FALSE OR FALSE");
    assert_eq!(out, vec!["TRUE", "FALSE"]);
}

#[test]
fn casts() {
    let out = output(
        "OUTPUT INTEGER(3.9)\nOUTPUT STRING(12) & \"!\"\nOUTPUT REAL(2)\nOUTPUT INTEGER(\"41\") + 1\nOUTPUT CHAR(65)",
    );
    assert_eq!(out, vec!["3", "12!", "2.0", "42", "A"]);
}

#[test]
fn char_and_single_char_string_interconvert() {
    let (interp, _) = run("DECLARE c : CHAR\nc <- \"A\"\nDECLARE s : STRING\ns <- c");
    assert_eq!(interp.global("c"), Some(Value::Char('A')));
    assert_eq!(interp.global("s"), Some(Value::String("A".into())));
}

// ─────────────────────────────────────────────────────────────────────
// Control flow
// ─────────────────────────────────────────────────────────────────────

#[test]
fn if_else_if_chain() {
    let source = |x: i64| {
        format!(
            "x <- {x}\nIF x > 0 THEN\n  OUTPUT \"pos\"\nELSE IF x < 0 THEN\n  OUTPUT \"neg\"\nELSE\n  OUTPUT \"zero\"\nENDIF"
        )
    };
    assert_eq!(output(&source(4)), vec!["pos"]);
    assert_eq!(output(&source(-4)), vec!["neg"]);
    assert_eq!(output(&source(0)), vec!["zero"]);
}

#[test]
fn case_executes_only_the_range_arm() {
    let out = output(
        "x <- 3\nCASE OF x\n  1 : OUTPUT \"one\"\n  2 TO 5 : OUTPUT \"few\"\n  OTHERWISE : OUTPUT \"many\"\nENDCASE",
    );
    assert_eq!(out, vec!["few"]);
}

#[test]
fn case_falls_to_otherwise_and_matches_strings() {
    let out = output(
        "x <- 9\nCASE OF x\n  1 : OUTPUT \"one\"\n  OTHERWISE : OUTPUT \"other\"\nENDCASE\n\
         c <- 'b'\nCASE OF c\n  \"a\" : OUTPUT \"A\"\n  \"b\" : OUTPUT \"B\"\nENDCASE",
    );
    assert_eq!(out, vec!["other", "B"]);
}

#[test]
fn while_and_repeat() {
    let out = output(
        "i <- 0\nWHILE i < 3 DO\n  i <- i + 1\nENDWHILE\nOUTPUT i\n\
         REPEAT\n  i <- i - 1\nUNTIL i = 0\nOUTPUT i",
    );
    assert_eq!(out, vec!["3", "0"]);
}

#[test]
fn repeat_runs_body_at_least_once() {
    assert_eq!(output("n <- 10\nREPEAT\n  OUTPUT n\nUNTIL TRUE"), vec!["10"]);
}

#[test]
fn for_loops_count_both_ways() {
    let out = output(
        "FOR i <- 1 TO 3\n  OUTPUT i\nNEXT i\nFOR j <- 10 TO 4 STEP -3\n  OUTPUT j\nNEXT j",
    );
    assert_eq!(out, vec!["1", "2", "3", "10", "7", "4"]);
}

#[test]
fn for_loop_with_empty_range_never_runs() {
    assert_eq!(output("FOR i <- 5 TO 1\n  OUTPUT i\nNEXT i\nOUTPUT \"done\""), vec!["done"]);
}

#[test]
fn break_and_continue() {
    let out = output(
        "FOR i <- 1 TO 10\n  IF i = 2 THEN\n    CONTINUE\n  ENDIF\n  IF i = 4 THEN\n    BREAK\n  ENDIF\n  OUTPUT i\nNEXT i",
    );
    assert_eq!(out, vec!["1", "3"]);
}

// ─────────────────────────────────────────────────────────────────────
// Routines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn by_reference_writes_are_seen_by_the_caller() {
    let out = output(
        "PROCEDURE Bump(BYREF a : INTEGER)\n  a <- a + 1\nENDPROCEDURE\n\
         PROCEDURE Keep(BYVAL a : INTEGER)\n  a <- a + 100\nENDPROCEDURE\n\
         n <- 1\nCALL Bump(n)\nCALL Keep(n)\nOUTPUT n",
    );
    assert_eq!(out, vec!["2"]);
}

#[test]
fn by_reference_array_element() {
    let out = output(
        "PROCEDURE Zero(BYREF v : INTEGER)\n  v <- 0\nENDPROCEDURE\n\
         DECLARE a : ARRAY[1:3] OF INTEGER\na[2] <- 9\nCALL Zero(a[2])\nOUTPUT a[2]",
    );
    assert_eq!(out, vec!["0"]);
}

#[test]
fn by_reference_chains_through_nested_calls() {
    let out = output(
        "PROCEDURE Inner(BYREF v : INTEGER)\n  v <- v * 2\nENDPROCEDURE\n\
         PROCEDURE Outer(BYREF v : INTEGER)\n  CALL Inner(v)\n  v <- v + 1\nENDPROCEDURE\n\
         n <- 5\nCALL Outer(n)\nOUTPUT n",
    );
    assert_eq!(out, vec!["11"]);
}

#[test]
fn recursive_function() {
    let out = output(
        "FUNCTION Fact(n : INTEGER) RETURNS INTEGER\n  IF n <= 1 THEN\n    RETURN 1\n  ENDIF\n  RETURN n * Fact(n - 1)\nENDFUNCTION\n\
         OUTPUT Fact(5)",
    );
    assert_eq!(out, vec!["120"]);
}

#[test]
fn return_value_is_coerced_to_declared_type() {
    let (interp, _) = run("FUNCTION Half(n : INTEGER) RETURNS REAL\n  RETURN n\nENDFUNCTION\nh <- Half(3)");
    assert_eq!(interp.global("h"), Some(Value::Real(3.0)));
}

#[test]
fn routines_see_their_locals_and_the_root() {
    let out = output(
        "DECLARE g : INTEGER\ng <- 7\n\
         PROCEDURE Show\n  DECLARE g : INTEGER\n  g <- 1\n  OUTPUT g\nENDPROCEDURE\n\
         PROCEDURE Global\n  OUTPUT g\nENDPROCEDURE\n\
         CALL Show\nCALL Global",
    );
    assert_eq!(out, vec!["1", "7"]);
}

#[test]
fn call_scopes_are_released() {
    let (interp, _) = run(
        "FUNCTION Sq(n : INTEGER) RETURNS INTEGER\n  DECLARE t : INTEGER\n  t <- n * n\n  RETURN t\nENDFUNCTION\n\
         FOR i <- 1 TO 5\n  x <- Sq(i)\nNEXT i",
    );
    assert_eq!(interp.live_scopes(), 1);
    assert_eq!(interp.global("x"), Some(Value::Integer(25)));
}

// ─────────────────────────────────────────────────────────────────────
// Arrays, records, enums, pointers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn two_dimensional_array() {
    let out = output(
        "DECLARE g : ARRAY[1:2, 1:3] OF INTEGER\n\
         FOR i <- 1 TO 2\n  FOR j <- 1 TO 3\n    g[i, j] <- i * 10 + j\n  NEXT j\nNEXT i\n\
         OUTPUT g[2, 3]\nOUTPUT g[1, 2]",
    );
    assert_eq!(out, vec!["23", "12"]);
}

#[test]
fn whole_array_assignment_copies_elements() {
    let out = output(
        "DECLARE a : ARRAY[1:3] OF INTEGER\nDECLARE b : ARRAY[1:3] OF INTEGER\n\
         a[2] <- 7\nb <- a\na[2] <- 0\nOUTPUT b[2]\nOUTPUT a[2]",
    );
    assert_eq!(out, vec!["7", "0"]);
}

#[test]
fn records_copy_by_value() {
    let out = output(
        "TYPE Point\n  DECLARE x : INTEGER\n  DECLARE y : INTEGER\nENDTYPE\n\
         DECLARE p : Point\np.x <- 3\nq <- p\nq.x <- 9\nOUTPUT p.x\nOUTPUT q.x",
    );
    assert_eq!(out, vec!["3", "9"]);
}

#[test]
fn record_with_array_member() {
    let out = output(
        "TYPE Student\n  DECLARE name : STRING\n  DECLARE marks : ARRAY[1:3] OF INTEGER\nENDTYPE\n\
         DECLARE s : Student\ns.name <- \"Ann\"\ns.marks[3] <- 88\nOUTPUT s.name & \" \" & s.marks[3]",
    );
    assert_eq!(out, vec!["Ann 88"]);
}

#[test]
fn enum_arithmetic_wraps_both_ways() {
    let out = output(
        "TYPE Season = (Spring, Summer, Autumn, Winter)\nDECLARE s : Season\n\
         OUTPUT s\ns <- s - 1\nOUTPUT s\ns <- s + 5\nOUTPUT s\nOUTPUT 2 + Spring",
    );
    assert_eq!(out, vec!["Spring", "Winter", "Spring", "Autumn"]);
}

#[test]
fn enum_values_compare() {
    let out = output("TYPE Light = (Red, Amber, Green)\nl <- Amber\nOUTPUT l = Amber\nOUTPUT l = Red");
    assert_eq!(out, vec!["TRUE", "FALSE"]);
}

#[test]
fn pointer_writes_through_to_target() {
    let out = output(
        "TYPE IntPtr = ^INTEGER\nDECLARE n : INTEGER\nDECLARE p : IntPtr\n\
         p <- ^n\np^ <- 42\nOUTPUT n\nn <- 7\nOUTPUT p^",
    );
    assert_eq!(out, vec!["42", "7"]);
}

#[test]
fn pointer_into_record_member() {
    let out = output(
        "TYPE Box\n  DECLARE v : INTEGER\nENDTYPE\nTYPE IntPtr = ^INTEGER\n\
         DECLARE b : Box\nDECLARE p : IntPtr\np <- ^b.v\np^ <- 5\nOUTPUT b.v",
    );
    assert_eq!(out, vec!["5"]);
}

#[test]
fn dates() {
    let out = output(
        "DECLARE d : DATE\nd <- 25/12/2023\nOUTPUT d\nOUTPUT DAY(d)\nOUTPUT MONTH(d)\nOUTPUT YEAR(d)",
    );
    assert_eq!(out, vec!["25/12/2023", "25", "12", "2023"]);
}

// ─────────────────────────────────────────────────────────────────────
// Console
// ─────────────────────────────────────────────────────────────────────

#[test]
fn input_parses_by_target_type() {
    let console = CapturedConsole::with_input(["42", "Alice", "TRUE", "05/06/2022"]);
    let mut interp = interpreter(&console, InterpreterOptions::default());
    let program = parse(
        "DECLARE n : INTEGER\nINPUT n\nINPUT name\nDECLARE ok : BOOLEAN\nINPUT ok\n\
         DECLARE d : DATE\nREAD d\nOUTPUT n + 1\nOUTPUT name\nOUTPUT ok\nOUTPUT MONTH(d)",
    );
    interp.run(&program).expect("program failed");
    assert_eq!(console.output(), vec!["43", "Alice", "TRUE", "6"]);
    assert_eq!(interp.global("name"), Some(Value::String("Alice".into())));
}

#[test]
fn repl_echoes_top_level_expressions() {
    let console = CapturedConsole::new();
    let options = InterpreterOptions {
        echo_expressions: true,
        ..InterpreterOptions::default()
    };
    let mut interp = interpreter(&console, options);
    interp
        .run(&parse("TYPE Light = (Red, Amber, Green)\n1 + 2\n\"hi\"\n'c'\nAmber\n2.0"))
        .expect("program failed");
    assert_eq!(
        console.take_output(),
        vec!["3", "\"hi\"", "'c'", "Light: Amber", "2.0"]
    );

    interp.run(&parse("x <- 10")).expect("assignment failed");
    interp.run(&parse("x * 2")).expect("echo failed");
    assert_eq!(console.take_output(), vec!["20"]);
}

#[test]
fn repl_echo_shows_pointer_targets() {
    let console = CapturedConsole::new();
    let options = InterpreterOptions {
        echo_expressions: true,
        ..InterpreterOptions::default()
    };
    let mut interp = interpreter(&console, options);
    interp
        .run(&parse(
            "TYPE IntPtr = ^INTEGER\nDECLARE p : IntPtr\np\nDECLARE n : INTEGER\np <- ^n\np",
        ))
        .expect("program failed");
    assert_eq!(console.output(), vec!["IntPtr: null", "IntPtr: n"]);
}

#[test]
fn no_echo_without_repl_mode() {
    assert!(output("1 + 2").is_empty());
}

#[test]
fn seeded_rand_is_reproducible() {
    let draw = || {
        let console = CapturedConsole::new();
        let options = InterpreterOptions {
            seed: Some(7),
            ..InterpreterOptions::default()
        };
        let mut interp = interpreter(&console, options);
        interp
            .run(&parse("FOR i <- 1 TO 5\n  OUTPUT RAND(10)\nNEXT i"))
            .expect("program failed");
        console.output()
    };
    let first = draw();
    assert_eq!(first.len(), 5);
    assert_eq!(first, draw());
    for line in &first {
        let x: f64 = line.parse().expect("RAND output is a real");
        assert!((0.0..10.0).contains(&x), "{x} out of range");
    }
}

#[test]
fn runtime_error_reports_scope() {
    let e = run_err("PROCEDURE Boom\n  x <- 1 / 0\nENDPROCEDURE\nCALL Boom");
    assert_eq!(e.scope, "Boom");
}
