use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use pseudo_cli::cli::{Cli, Command};
use pseudo_cli::repl::Repl;
use pseudo_cli::{diagnostics, driver, logging};
use pseudo_eval::{Interpreter, InterpreterOptions, StdConsole};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    diagnostics::init_color(cli.color);

    match cli.command() {
        Command::Run { file, json, seed } => run(&file, json, seed),
        Command::Repl { seed } => repl(seed),
    }
}

fn run(path: &Path, json: bool, seed: Option<u64>) -> ExitCode {
    let file = path.display().to_string();
    let source = match driver::load(path) {
        Ok(source) => source,
        Err(e) => {
            if json {
                println!("{}", driver::render_json(&e, &file));
            } else {
                eprint!("{}", driver::render(&e, None));
            }
            return ExitCode::FAILURE;
        }
    };

    let mut interp = Interpreter::new(InterpreterOptions {
        seed,
        echo_expressions: false,
    });
    match driver::execute(&source, &mut interp) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                println!("{}", driver::render_json(&e, &file));
            } else {
                eprint!("{}", driver::render(&e, Some(&source)));
            }
            ExitCode::FAILURE
        }
    }
}

fn repl(seed: Option<u64>) -> ExitCode {
    let mut session = Repl::new(InterpreterOptions {
        seed,
        echo_expressions: true,
    });
    match session.run(&mut StdConsole, &mut io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", diagnostics::error_label());
            ExitCode::FAILURE
        }
    }
}
