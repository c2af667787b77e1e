//! Batch runs over temporary source trees.

use php2js::{Config, UtilityStyle};
use php2js_cli::{Job, run};
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn job(src: &Path, dst: &Path, recurse: bool) -> Job {
    Job {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        recurse,
    }
}

#[test]
fn mirrors_directory_structure() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "index.php", "<?php echo 'home';");
    write(src.path(), "lib/Util.PHP", "<?php function util() { return 1; }");
    write(src.path(), "readme.md", "# not php");

    let summary = run(&job(src.path(), dst.path(), true), &Config::default()).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.written, 2);
    assert!(!summary.has_errors());

    let index = fs::read_to_string(dst.path().join("index.js")).unwrap();
    assert!(index.contains("console.log('home');"));
    let util = fs::read_to_string(dst.path().join("lib/Util.js")).unwrap();
    assert!(util.contains("export function util() {"));
    assert!(!dst.path().join("readme.js").exists());
}

#[test]
fn no_recurse_skips_subdirectories() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "a.php", "<?php echo 1;");
    write(src.path(), "nested/b.php", "<?php echo 2;");

    let summary = run(&job(src.path(), dst.path(), false), &Config::default()).unwrap();
    assert_eq!(summary.processed, 1);
    assert!(dst.path().join("a.js").exists());
    assert!(!dst.path().join("nested/b.js").exists());
}

#[test]
fn failures_do_not_stop_the_batch() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "good.php", "<?php echo 'ok';");
    write(src.path(), "bad.php", "<?php\nfunction broken( {\n");

    let summary = run(&job(src.path(), dst.path(), true), &Config::default()).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.errors, 1);
    assert!(summary.has_errors());
    assert!(dst.path().join("good.js").exists());
    assert!(!dst.path().join("bad.js").exists());

    let failed = summary.files.iter().find(|f| f.error.is_some()).unwrap();
    assert!(failed.input.ends_with("bad.php"));
}

#[test]
fn single_file_to_named_output() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "page.php", "<?php echo 'page';");
    let out = dst.path().join("bundle/main.js");

    let summary = run(&job(&src.path().join("page.php"), &out, true), &Config::default()).unwrap();
    assert_eq!(summary.written, 1);
    assert!(fs::read_to_string(out).unwrap().contains("console.log('page');"));
}

#[test]
fn module_style_writes_shared_helpers() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "a.php", "<?php if (empty($a)) { echo 'a'; }");
    write(src.path(), "b.php", "<?php if (empty($b)) { echo 'b'; }");
    let config = Config {
        utility_style: UtilityStyle::Module,
        ..Config::default()
    };

    let summary = run(&job(src.path(), dst.path(), true), &config).unwrap();
    let module = summary.utility_module.expect("helper module");
    assert_eq!(module, dst.path().join("php-utils.js"));
    let content = fs::read_to_string(module).unwrap();
    assert_eq!(content.matches("export function empty(val) {").count(), 1);

    let a = fs::read_to_string(dst.path().join("a.js")).unwrap();
    assert!(a.contains("import * as php_utils from './php-utils.js';"));
}

#[test]
fn inline_style_writes_no_module() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write(src.path(), "a.php", "<?php if (empty($a)) { echo 'a'; }");

    let summary = run(&job(src.path(), dst.path(), true), &Config::default()).unwrap();
    assert!(summary.utility_module.is_none());
    assert!(!dst.path().join("php-utils.js").exists());
}

#[test]
fn missing_source_is_an_error() {
    let dst = tempfile::tempdir().unwrap();
    let missing = dst.path().join("nowhere");
    assert!(run(&job(&missing, dst.path(), true), &Config::default()).is_err());
}
