// Console interface

mod examples;
mod repl;

pub use examples::EXAMPLE_QUERIES;
pub use repl::Repl;
