//! Tree-walking runtime for the class object model of a small Lox-style
//! language: class declarations with single inheritance, `init`
//! constructors, instance fields, bound methods and `super` dispatch.

/// Execution tracing, compiled in with the `debug_trace_execution` feature.
macro_rules! trace {
    ($tag:literal, $($arg:tt)*) => {
        #[cfg(feature = "debug_trace_execution")]
        {
            use colored::Colorize;
            eprintln!("{} {}", concat!("[", $tag, "]").cyan(), format!($($arg)*));
        }
    };
}

pub mod ast;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod heap;
pub mod interpreter;
pub mod resolver;
pub mod sample;
pub mod span;
pub mod token;
pub mod value;

#[cfg(test)]
mod testing;
