//! Request and environment superglobals.
//!
//! `$_GET` and friends become properties of an ambient `_` object, which a
//! post-pass defines once near the top of the module.

const SUPERGLOBALS: &[&str] = &[
    "_GET", "_POST", "_SERVER", "_COOKIE", "_SESSION", "_REQUEST", "_FILES", "_ENV",
];

const SHIM: [&str; 3] = [
    "// Superglobal reference for $_GET, $_POST, $_SERVER, etc.",
    "const _ = typeof globalThis !== 'undefined' ? globalThis : (typeof window !== 'undefined' ? window : global);",
    "",
];

/// `_GET` → `Some("_.GET")`.
pub fn superglobal(name: &str) -> Option<String> {
    SUPERGLOBALS
        .contains(&name)
        .then(|| format!("_.{}", &name[1..]))
}

/// Insert the `_` definition before the first line that is neither blank
/// nor a `//` comment.
pub fn inject_shim(code: &str) -> String {
    let mut out = Vec::new();
    let mut injected = false;
    for line in code.split('\n') {
        let trimmed = line.trim();
        if !injected && !trimmed.is_empty() && !line.starts_with("//") {
            out.extend(SHIM);
            injected = true;
        }
        out.push(line);
    }
    out.join("\n")
}
