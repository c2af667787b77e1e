//! Input readers - parse source code into the typed AST.

#[cfg(feature = "read-php")]
pub mod php;

#[cfg(feature = "read-php")]
mod heredoc;

#[cfg(feature = "read-php")]
mod strings;

#[cfg(feature = "read-php")]
pub use php::{PHP_READER, PhpReader, read_php};
