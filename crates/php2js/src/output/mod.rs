//! Output writer - emit the typed AST as a JavaScript module.

mod buffer;
mod expr;
pub mod javascript;
pub mod literal;
mod phpdoc;
mod scope;

pub use javascript::JavaScriptWriter;
pub use phpdoc::to_jsdoc;
