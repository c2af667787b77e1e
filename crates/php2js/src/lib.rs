//! PHP to JavaScript transpilation.
//!
//! `php2js` parses PHP with tree-sitter, lowers the concrete syntax tree into a
//! closed, typed AST and walks it to emit an ES module. It maps syntax, not
//! PHP's runtime semantics: constructs without a JavaScript counterpart are
//! approximated (helpers like `__empty`) or annotated with comments.
//!
//! # Architecture
//!
//! ```text
//! PHP source ──> Reader ──> Program ──> JavaScriptWriter ──> JavaScript
//!               (input/)    (ast.rs)       (output/)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use php2js::{Config, transpile};
//!
//! let js = transpile("<?php echo 'hi';", &Config::default())?;
//! assert!(js.contains("console.log('hi');"));
//! ```
//!
//! Batch callers share helper usage across files through a
//! [`UtilityRegistry`], then write the helper module once:
//!
//! ```ignore
//! let registry = Arc::new(UtilityRegistry::new());
//! let js = Transpiler::new(&config)
//!     .with_registry(registry.clone())
//!     .transpile(source, "index.php")?;
//! ensure_utility_module(out_dir, &config, &registry)?;
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod superglobals;
pub mod traits;
pub mod utility;

pub mod input;
pub mod output;

use std::sync::Arc;

// Re-exports: AST
pub use ast::{Expr, Program, Stmt};

// Re-exports: configuration and errors
pub use config::{Config, DefineStyle, InterfaceStyle, UnsetStyle, UtilityStyle};
pub use error::TranspileError;
pub use traits::{ReadError, Reader};

// Re-exports: helpers
pub use utility::{UtilityRegistry, ensure_utility_module, generate_utility_module};

// Re-exports: built-in reader and writer
#[cfg(feature = "read-php")]
pub use input::{PHP_READER, PhpReader, read_php};
pub use output::JavaScriptWriter;

/// Transpile one PHP source string with a private helper registry.
pub fn transpile(source: &str, config: &Config) -> Result<String, TranspileError> {
    Transpiler::new(config).transpile(source, "<input>")
}

/// Configured transpilation of individual files.
pub struct Transpiler<'c> {
    config: &'c Config,
    registry: Option<Arc<UtilityRegistry>>,
    reader: Option<&'static dyn Reader>,
}

impl<'c> Transpiler<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            registry: None,
            reader: default_reader(),
        }
    }

    /// Record helper usage in a registry shared with other transpilations.
    pub fn with_registry(mut self, registry: Arc<UtilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Parse with a different reader.
    pub fn with_reader(mut self, reader: &'static dyn Reader) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Transpile `source`; `file_name` only labels errors.
    pub fn transpile(&self, source: &str, file_name: &str) -> Result<String, TranspileError> {
        let reader = self.reader.ok_or(TranspileError::NoReader)?;
        let program = reader
            .read(source)
            .map_err(|source| TranspileError::Read {
                file: file_name.to_string(),
                source,
            })?;
        tracing::debug!(
            file = file_name,
            statements = program.body.len(),
            "parsed"
        );

        let mut writer = JavaScriptWriter::new(self.config);
        if let Some(registry) = &self.registry {
            writer = writer.with_registry(Arc::clone(registry));
        }
        Ok(writer.emit(&program))
    }
}

#[cfg(feature = "read-php")]
fn default_reader() -> Option<&'static dyn Reader> {
    Some(&PHP_READER)
}

#[cfg(not(feature = "read-php"))]
fn default_reader() -> Option<&'static dyn Reader> {
    None
}
