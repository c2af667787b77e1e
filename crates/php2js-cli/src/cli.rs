//! Command-line arguments and configuration resolution.

use anyhow::{Context, bail};
use clap::Parser;
use php2js::{Config, DefineStyle, InterfaceStyle, UnsetStyle, UtilityStyle};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = ".php2js/config.toml";

/// Transpile PHP files to JavaScript modules.
#[derive(Parser, Debug, Clone)]
#[command(name = "php2js", version, about)]
pub struct Cli {
    /// Source file or directory
    #[arg(long = "src", value_name = "PATH")]
    pub src_flag: Option<PathBuf>,

    /// Destination file or directory
    #[arg(long = "dst", value_name = "PATH")]
    pub dst_flag: Option<PathBuf>,

    /// Source file or directory (positional form)
    #[arg(value_name = "SRC", conflicts_with = "src_flag")]
    pub src: Option<PathBuf>,

    /// Destination file or directory (positional form)
    #[arg(value_name = "DST", conflicts_with = "dst_flag")]
    pub dst: Option<PathBuf>,

    /// Only process files directly inside the source directory
    #[arg(long)]
    pub no_recurse: bool,

    /// Print per-file timing statistics after the run
    #[arg(long)]
    pub stats: bool,

    /// Default log level (RUST_LOG overrides)
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// TOML config file (default: .php2js/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// abstract-class | comment | jsdoc | empty-class
    #[arg(long, value_name = "STYLE")]
    pub interface_style: Option<String>,

    /// inline | module | none
    #[arg(long, value_name = "STYLE")]
    pub utility_style: Option<String>,

    /// Helper module name, without `.js`
    #[arg(long, value_name = "NAME")]
    pub utility_module: Option<String>,

    /// delete | comment
    #[arg(long, value_name = "STYLE")]
    pub unset_style: Option<String>,

    /// const | export-const | comment
    #[arg(long, value_name = "STYLE")]
    pub define_style: Option<String>,
}

impl Cli {
    /// Source and destination, from flags or positionals.
    pub fn paths(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let src = self.src_flag.clone().or_else(|| self.src.clone());
        let dst = self.dst_flag.clone().or_else(|| self.dst.clone());
        match (src, dst) {
            (Some(src), Some(dst)) => Ok((src, dst)),
            (None, _) => bail!("missing source path (--src <file|dir> or positional <SRC>)"),
            (_, None) => bail!("missing destination path (--dst <file|dir> or positional <DST>)"),
        }
    }

    /// Resolve the transpiler config: defaults, then the config file, then flags.
    pub fn resolve_config(&self, cwd: &Path) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let path = cwd.join(CONFIG_FILE);
                if path.is_file() {
                    load_config(&path)?
                } else {
                    Config::default()
                }
            }
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(style) = &self.interface_style {
            config.interface_style = InterfaceStyle::parse_or_default(&style.to_lowercase());
        }
        if let Some(style) = &self.utility_style {
            config.utility_style = UtilityStyle::parse_or_default(&style.to_lowercase());
        }
        if let Some(module) = &self.utility_module {
            config.utility_module = module.clone();
        }
        if let Some(style) = &self.unset_style {
            config.unset_style = UnsetStyle::parse_or_default(&style.to_lowercase());
        }
        if let Some(style) = &self.define_style {
            config.define_style = DefineStyle::parse_or_default(&style.to_lowercase());
        }
    }
}

/// Read a TOML config file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("php2js").chain(args.iter().copied()))
    }

    #[test]
    fn test_flag_and_positional_paths() {
        let cli = parse(&["--src", "in", "--dst", "out"]);
        assert_eq!(cli.paths().unwrap(), (PathBuf::from("in"), PathBuf::from("out")));

        let cli = parse(&["in.php", "out.js"]);
        assert_eq!(cli.paths().unwrap(), (PathBuf::from("in.php"), PathBuf::from("out.js")));

        assert!(parse(&["--src", "in"]).paths().is_err());
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse(&["a", "b"]).resolve_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".php2js")).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "utility-style = \"module\"\ninterface-style = \"jsdoc\"\n",
        )
        .unwrap();

        let config = parse(&["a", "b", "--interface-style", "comment"])
            .resolve_config(dir.path())
            .unwrap();
        assert_eq!(config.utility_style, UtilityStyle::Module);
        assert_eq!(config.interface_style, InterfaceStyle::Comment);
    }

    #[test]
    fn test_invalid_flag_value_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse(&["a", "b", "--unset-style", "erase"])
            .resolve_config(dir.path())
            .unwrap();
        assert_eq!(config.unset_style, UnsetStyle::Comment);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = parse(&["a", "b", "--config", missing.to_str().unwrap()]);
        assert!(cli.resolve_config(dir.path()).is_err());
    }
}
