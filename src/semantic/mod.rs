//! Semantic state: types, symbol table, block stack, expression inference

mod blocks;
mod symbols;
mod type_infer;
mod types;

pub use blocks::*;
pub use symbols::*;
pub use type_infer::*;
pub use types::*;
