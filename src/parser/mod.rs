mod api;
pub mod ast;

pub use api::{parse_to_ast, parse_to_token_tree, ModuleParser, Rule};
