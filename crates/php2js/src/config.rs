//! Transpiler configuration.
//!
//! Every option is defaulted, and style strings parse leniently: an unknown
//! value logs a warning and falls back to the default instead of failing.
//!
//! ```toml
//! interface-style = "jsdoc"
//! utility-style = "module"
//! utility-module = "php-utils"
//! unset-style = "delete"
//! define-style = "export-const"
//! ```

use serde::Deserialize;
use std::fmt;

/// Declares a string-backed style enum with lenient parsing.
macro_rules! style_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $option:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
        #[serde(from = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Exact parse; `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                match value.trim() {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Parse, warning and falling back to the default on unknown values.
            pub fn parse_or_default(value: &str) -> Self {
                Self::parse(value).unwrap_or_else(|| {
                    tracing::warn!(
                        option = $option,
                        value,
                        fallback = $name::$default.as_str(),
                        "invalid style, using default"
                    );
                    $name::$default
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::parse_or_default(&value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

style_enum! {
    /// How interfaces are rendered.
    InterfaceStyle, "interface-style" {
        AbstractClass => "abstract-class",
        Comment => "comment",
        JsDoc => "jsdoc",
        EmptyClass => "empty-class",
    }
    default = AbstractClass
}

style_enum! {
    /// How runtime helpers such as `empty` are materialized.
    UtilityStyle, "utility-style" {
        /// Helper definitions appended to each file.
        Inline => "inline",
        /// Helpers imported from a shared generated module.
        Module => "module",
        /// Bare approximations, no helpers.
        None => "none",
    }
    default = Inline
}

style_enum! {
    UnsetStyle, "unset-style" {
        Delete => "delete",
        Comment => "comment",
    }
    default = Comment
}

style_enum! {
    /// Placement of `define('NAME', value)` constants.
    DefineStyle, "define-style" {
        Const => "const",
        ExportConst => "export-const",
        Comment => "comment",
    }
    default = Const
}

pub const DEFAULT_UTILITY_MODULE: &str = "php-utils";

fn default_utility_module() -> String {
    DEFAULT_UTILITY_MODULE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub interface_style: InterfaceStyle,
    pub utility_style: UtilityStyle,
    /// Helper module file name, without the `.js` extension.
    #[serde(default = "default_utility_module")]
    pub utility_module: String,
    pub unset_style: UnsetStyle,
    pub define_style: DefineStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface_style: InterfaceStyle::default(),
            utility_style: UtilityStyle::default(),
            utility_module: default_utility_module(),
            unset_style: UnsetStyle::default(),
            define_style: DefineStyle::default(),
        }
    }
}

impl Config {
    /// Identifier used for the helper module namespace import.
    ///
    /// `php-utils` becomes `php_utils`.
    pub fn utility_namespace(&self) -> String {
        let mut ns: String = self
            .utility_module
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if ns.is_empty() || ns.starts_with(|c: char| c.is_ascii_digit()) {
            ns.insert(0, '_');
        }
        ns
    }

    /// File name of the helper module (`php-utils.js`).
    pub fn utility_file_name(&self) -> String {
        let module = self.utility_module.trim();
        let module = if module.is_empty() {
            DEFAULT_UTILITY_MODULE
        } else {
            module
        };
        if module.ends_with(".js") {
            module.to_string()
        } else {
            format!("{module}.js")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.interface_style, InterfaceStyle::AbstractClass);
        assert_eq!(config.utility_style, UtilityStyle::Inline);
        assert_eq!(config.utility_module, "php-utils");
        assert_eq!(config.unset_style, UnsetStyle::Comment);
        assert_eq!(config.define_style, DefineStyle::Const);
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!(InterfaceStyle::parse("jsdoc"), Some(InterfaceStyle::JsDoc));
        assert_eq!(UtilityStyle::parse("module"), Some(UtilityStyle::Module));
        assert_eq!(UnsetStyle::parse("delete"), Some(UnsetStyle::Delete));
        assert_eq!(DefineStyle::parse("export-const"), Some(DefineStyle::ExportConst));
        assert_eq!(DefineStyle::parse("bogus"), None);
    }

    #[test]
    fn test_invalid_style_falls_back() {
        assert_eq!(
            InterfaceStyle::parse_or_default("typescript"),
            InterfaceStyle::AbstractClass
        );
        assert_eq!(UtilityStyle::parse_or_default(""), UtilityStyle::Inline);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(
            r#"{"utility-style": "module", "unset-style": "nonsense"}"#,
        )
        .unwrap();
        assert_eq!(config.utility_style, UtilityStyle::Module);
        assert_eq!(config.unset_style, UnsetStyle::Comment);
        assert_eq!(config.utility_module, "php-utils");
    }

    #[test]
    fn test_utility_namespace() {
        let mut config = Config::default();
        assert_eq!(config.utility_namespace(), "php_utils");
        assert_eq!(config.utility_file_name(), "php-utils.js");
        config.utility_module = "9lib".into();
        assert_eq!(config.utility_namespace(), "_9lib");
    }

    #[test]
    fn test_display_round_trip() {
        for style in InterfaceStyle::ALL {
            assert_eq!(InterfaceStyle::parse(&style.to_string()), Some(*style));
        }
    }
}
