//! Batch transpilation of a file or directory tree.

use php2js::{Config, PHP_READER, Reader, Transpiler, UtilityRegistry, ensure_utility_module};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// What to transpile and where to put it.
#[derive(Debug, Clone)]
pub struct Job {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub recurse: bool,
}

/// Outcome of one file.
#[derive(Debug)]
pub struct FileResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub elapsed: Duration,
    pub error: Option<String>,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct Summary {
    pub processed: usize,
    pub written: usize,
    pub errors: usize,
    pub files: Vec<FileResult>,
    pub utility_module: Option<PathBuf>,
}

impl Summary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Timing statistics over the processed files.
    pub fn timings(&self) -> Option<Timings> {
        Timings::from_durations(self.files.iter().map(|f| f.elapsed).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub count: usize,
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
    pub p90: Duration,
}

impl Timings {
    fn from_durations(mut times: Vec<Duration>) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        times.sort();
        let count = times.len();
        let total: Duration = times.iter().sum();
        let p90_index = (count * 9).div_ceil(10).saturating_sub(1);
        Some(Self {
            count,
            average: total / count as u32,
            min: times[0],
            max: times[count - 1],
            p90: times[p90_index],
        })
    }
}

fn is_php(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            PHP_READER
                .extensions()
                .iter()
                .any(|ext| e.eq_ignore_ascii_case(ext))
        })
}

/// `*.php` files (case-insensitive) under `src`, or `src` itself when it is
/// a PHP file. Sorted for stable output.
pub fn collect_php_files(src: &Path, recurse: bool) -> Vec<PathBuf> {
    if src.is_file() {
        return if is_php(src) {
            vec![src.to_path_buf()]
        } else {
            Vec::new()
        };
    }
    let walker = WalkDir::new(src).max_depth(if recurse { usize::MAX } else { 1 });
    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_php(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn js_name(path: &Path) -> PathBuf {
    path.with_extension("js")
}

/// Output path for `file`.
///
/// Directory mode (`src_root` set) mirrors the relative path under `dst`.
/// Single-file mode writes to `dst` when it names a `.js` file, otherwise
/// into the `dst` directory.
pub fn output_path(src_root: Option<&Path>, file: &Path, dst: &Path) -> PathBuf {
    match src_root {
        Some(root) => {
            let rel = file.strip_prefix(root).unwrap_or(file);
            dst.join(js_name(rel))
        }
        None => {
            let is_js = dst
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("js"));
            if is_js {
                dst.to_path_buf()
            } else {
                let name = file.file_name().map(Path::new).unwrap_or(file);
                dst.join(js_name(name))
            }
        }
    }
}

/// Directory that receives the shared helper module.
fn module_dir(job: &Job, single_file: bool) -> PathBuf {
    if single_file && output_path(None, &job.src, &job.dst) == job.dst {
        job.dst
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    } else {
        job.dst.clone()
    }
}

fn transpile_file(transpiler: &Transpiler<'_>, input: &Path, output: &Path) -> Result<(), String> {
    let source = std::fs::read_to_string(input).map_err(|e| e.to_string())?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let js = transpiler.transpile(&source, &name).map_err(|e| match e.location() {
        Some((line, column)) => format!("{e} (line {line}, column {column})"),
        None => e.to_string(),
    })?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(output, js).map_err(|e| e.to_string())
}

/// Transpile every PHP file of the job in parallel.
///
/// Per-file failures are logged and counted; they never abort the batch.
pub fn run(job: &Job, config: &Config) -> anyhow::Result<Summary> {
    if !job.src.exists() {
        anyhow::bail!("source not found: {}", job.src.display());
    }
    let single_file = job.src.is_file();
    let src_root = (!single_file).then_some(job.src.as_path());
    let files = collect_php_files(&job.src, job.recurse);
    tracing::info!(
        files = files.len(),
        recurse = job.recurse,
        src = %job.src.display(),
        dst = %job.dst.display(),
        "starting transpilation"
    );

    let registry = Arc::new(UtilityRegistry::new());
    let transpiler = Transpiler::new(config).with_registry(Arc::clone(&registry));

    let results: Vec<FileResult> = files
        .par_iter()
        .map(|input| {
            let output = output_path(src_root, input, &job.dst);
            let start = Instant::now();
            tracing::debug!(file = %input.display(), "processing");
            let error = transpile_file(&transpiler, input, &output).err();
            match &error {
                None => tracing::info!("Converted: {} -> {}", input.display(), output.display()),
                Some(err) => tracing::error!("Failed: {} -> {}: {err}", input.display(), output.display()),
            }
            FileResult {
                input: input.clone(),
                output,
                elapsed: start.elapsed(),
                error,
            }
        })
        .collect();

    let mut summary = Summary {
        processed: results.len(),
        written: results.iter().filter(|r| r.error.is_none()).count(),
        errors: results.iter().filter(|r| r.error.is_some()).count(),
        files: results,
        utility_module: None,
    };

    if !registry.is_empty() {
        match ensure_utility_module(&module_dir(job, single_file), config, &registry) {
            Ok(Some(path)) => {
                tracing::info!(path = %path.display(), "utility module written");
                summary.utility_module = Some(path);
            }
            Ok(None) => {}
            Err(err) => tracing::error!("failed to generate utility module: {err}"),
        }
    }

    tracing::info!(
        processed = summary.processed,
        written = summary.written,
        errors = summary.errors,
        "transpilation complete"
    );
    Ok(summary)
}
