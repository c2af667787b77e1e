//! Runtime helpers for PHP built-ins with no JavaScript equivalent.
//!
//! A helper is materialized one of three ways (see [`UtilityStyle`]):
//! inlined as `function __name(...)` at the end of each file, imported from a
//! shared generated module, or not at all (a bare approximation is emitted at
//! the call site).
//!
//! In batch mode every transpile call records the helpers it referenced in a
//! shared [`UtilityRegistry`]; the caller then writes the shared module once
//! with [`ensure_utility_module`].

use crate::config::{Config, UtilityStyle};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// A helper definition.
#[derive(Debug, Clone, Copy)]
pub struct Helper {
    pub name: &'static str,
    pub params: &'static str,
    pub body: &'static [&'static str],
}

/// Every helper the module generator knows how to write.
pub const CATALOG: &[Helper] = &[
    Helper {
        name: "empty",
        params: "val",
        body: &[
            "if (val === null || val === undefined || val === false) return true;",
            "if (val === 0 || val === \"0\" || val === \"\") return true;",
            "if (Array.isArray(val) && val.length === 0) return true;",
            "if (typeof val === 'object' && Object.keys(val).length === 0) return true;",
            "return false;",
        ],
    },
    Helper {
        name: "isset",
        params: "...vars",
        body: &["return vars.every(v => v !== null && v !== undefined);"],
    },
    Helper {
        name: "array_key_exists",
        params: "key, obj",
        body: &[
            "if (obj === null || obj === undefined) return false;",
            "if (obj instanceof Map) return obj.has(key);",
            "return Object.prototype.hasOwnProperty.call(obj, key);",
        ],
    },
    Helper {
        name: "in_array",
        params: "needle, haystack, strict = false",
        body: &[
            "const values = Array.isArray(haystack) ? haystack : Object.values(haystack ?? {});",
            "return strict ? values.includes(needle) : values.some(v => v == needle);",
        ],
    },
    Helper {
        name: "is_array",
        params: "val",
        body: &[
            "if (Array.isArray(val)) return true;",
            "return val !== null && typeof val === 'object' && val.constructor === Object;",
        ],
    },
];

pub fn helper(name: &str) -> Option<&'static Helper> {
    CATALOG.iter().find(|h| h.name == name)
}

impl Helper {
    fn definition(&self, prefix: &str, name: &str) -> String {
        let mut out = format!("{prefix}function {name}({}) {{\n", self.params);
        for line in self.body {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    /// `function __name(...) { ... }` for inline style.
    pub fn inline_definition(&self) -> String {
        self.definition("", &format!("__{}", self.name))
    }

    /// `export function name(...) { ... }` for the shared module.
    pub fn export_definition(&self) -> String {
        self.definition("export ", self.name)
    }
}

/// Append-only set of helper names shared across parallel transpile calls.
#[derive(Debug, Default)]
pub struct UtilityRegistry {
    used: RwLock<BTreeSet<String>>,
}

impl UtilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str) {
        let mut used = self.used.write().unwrap_or_else(PoisonError::into_inner);
        if !used.contains(name) {
            used.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.used
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.used
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// Per-file helper usage, optionally mirrored into a shared registry.
#[derive(Debug)]
pub struct Utilities {
    style: UtilityStyle,
    namespace: String,
    file_name: String,
    used: BTreeSet<&'static str>,
    shared: Option<Arc<UtilityRegistry>>,
}

impl Utilities {
    pub fn new(config: &Config, shared: Option<Arc<UtilityRegistry>>) -> Self {
        Self {
            style: config.utility_style,
            namespace: config.utility_namespace(),
            file_name: config.utility_file_name(),
            used: BTreeSet::new(),
            shared,
        }
    }

    pub fn style(&self) -> UtilityStyle {
        self.style
    }

    /// Render a call to `name`, recording the use.
    ///
    /// With [`UtilityStyle::None`] the caller supplies the bare approximation.
    pub fn call(&mut self, name: &'static str, args: &str) -> String {
        match self.style {
            UtilityStyle::Inline => {
                self.register(name);
                format!("__{name}({args})")
            }
            UtilityStyle::Module => {
                self.register(name);
                format!("{}.{name}({args})", self.namespace)
            }
            UtilityStyle::None => format!("{name}({args})"),
        }
    }

    fn register(&mut self, name: &'static str) {
        self.used.insert(name);
        if let Some(shared) = &self.shared {
            shared.register(name);
        }
    }

    pub fn is_used(&self) -> bool {
        !self.used.is_empty()
    }

    /// Namespace import for module style, when any helper was used.
    pub fn module_import(&self) -> Option<String> {
        (self.style == UtilityStyle::Module && self.is_used()).then(|| {
            format!(
                "import * as {} from './{}';",
                self.namespace, self.file_name
            )
        })
    }

    /// Definitions of every used helper, for inline style.
    pub fn inline_definitions(&self) -> Option<String> {
        if self.style != UtilityStyle::Inline || !self.is_used() {
            return None;
        }
        let defs: Vec<String> = self
            .used
            .iter()
            .filter_map(|name| helper(name))
            .map(Helper::inline_definition)
            .collect();
        Some(defs.join("\n"))
    }
}

const MODULE_HEADER: &str = "/**
 * PHP Utility Functions Module
 *
 * Approximations of PHP built-ins used by transpiled code.
 * Generated by php2js; helpers are merged in, never removed.
 */
";

/// Split an existing module into its `export function NAME(` blocks.
fn existing_functions(content: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String)> = None;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("export function ") {
            if let Some(done) = current.take() {
                blocks.push(done);
            }
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                .collect();
            current = Some((name, format!("{line}\n")));
            continue;
        }
        if let Some((_, text)) = current.as_mut() {
            text.push_str(line);
            text.push('\n');
            if line == "}" {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
            }
        }
    }
    if let Some(done) = current {
        blocks.push(done);
    }
    blocks
}

/// Write `<dir>/<module>.js` with the requested helpers.
///
/// `None` writes the whole catalog. Helpers already present in the file are
/// kept, including ones this version does not know.
pub fn generate_utility_module(
    dir: &Path,
    config: &Config,
    names: Option<&[&str]>,
) -> io::Result<PathBuf> {
    let path = dir.join(config.utility_file_name());

    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => existing_functions(&content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(err),
    };

    let mut wanted: BTreeSet<&str> = match names {
        Some(names) => names.iter().copied().collect(),
        None => CATALOG.iter().map(|h| h.name).collect(),
    };
    for (name, _) in &existing {
        wanted.insert(name.as_str());
    }

    let mut exported = Vec::new();
    let mut body = String::new();
    for helper in CATALOG.iter().filter(|h| wanted.contains(h.name)) {
        body.push('\n');
        body.push_str(&helper.export_definition());
        exported.push(helper.name.to_string());
    }
    for (name, block) in &existing {
        if helper(name).is_some() || exported.contains(name) {
            continue;
        }
        body.push('\n');
        body.push_str(block);
        exported.push(name.clone());
    }
    for name in &wanted {
        if !exported.iter().any(|e| e.as_str() == *name) {
            tracing::debug!(helper = *name, "unknown utility helper, skipped");
        }
    }

    let mut out = String::from(MODULE_HEADER);
    out.push_str(&body);
    out.push_str("\nexport default {\n");
    for name in &exported {
        out.push_str(&format!("    {name},\n"));
    }
    out.push_str("};\n");

    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, out)?;
    Ok(path)
}

/// Merge the registry's helpers into the shared module.
///
/// Returns `None` unless the configured style is `module`.
pub fn ensure_utility_module(
    dir: &Path,
    config: &Config,
    registry: &UtilityRegistry,
) -> io::Result<Option<PathBuf>> {
    if config.utility_style != UtilityStyle::Module {
        return Ok(None);
    }
    let names = registry.names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    generate_utility_module(dir, config, Some(&names)).map(Some)
}
