use std::{env, process};

use r_lox::error::{ErrorKind, LoxError};
use r_lox::interpreter::Interpreter;
use r_lox::resolver::Resolver;
use r_lox::sample;

pub struct Lox {}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self {}
    }

    /// Declares the sample classes, then runs `<class_name>().cook();`.
    pub fn run_sample(&self, class_name: &str) {
        let mut program = sample::program();
        program.push(sample::cook(class_name));

        if let Err(error) = self.run(&program) {
            error.report();
            process::exit(match error.kind() {
                ErrorKind::CompileError => 65,
                _ => 70,
            });
        }
    }

    pub fn print_usage(&self) {
        eprintln!("Usage: r_lox [class]");
        process::exit(64);
    }

    fn run(&self, program: &[r_lox::ast::Stmt]) -> Result<(), LoxError> {
        Resolver::new().resolve(program)?;
        Interpreter::new().interpret(program)
    }
}

pub fn main() {
    let lox = Lox::new();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => lox.run_sample("B"),
        2 => lox.run_sample(&args[1]),
        _ => lox.print_usage(),
    }
}
