//! End-to-end tests: PHP source in, JavaScript module out.

use php2js::{
    Config, DefineStyle, Expr, InterfaceStyle, Program, ReadError, Reader, Stmt, Transpiler,
    UnsetStyle, UtilityRegistry, UtilityStyle, ensure_utility_module, transpile,
};
use std::sync::Arc;

const PRELUDE_END: &str = "function __outputHtml(lines) {\n    console.log(lines.join('\\n'));\n}\n";
const FOOTER: &str = "export { __ENV__, __outputHtml };\n";

fn js(php: &str) -> String {
    js_with(php, &Config::default())
}

fn js_with(php: &str, config: &Config) -> String {
    transpile(php, config).expect("transpile failed")
}

/// The part of the module between the prelude and the footer.
fn body(out: &str) -> &str {
    let start = out.find(PRELUDE_END).map_or(0, |i| i + PRELUDE_END.len());
    let end = out.rfind(FOOTER).unwrap_or(out.len());
    out[start..end].trim()
}

fn config(update: impl FnOnce(&mut Config)) -> Config {
    let mut config = Config::default();
    update(&mut config);
    config
}

mod scenarios {
    use super::*;

    #[test]
    fn exported_function_with_echo() {
        let out = js("<?php\nfunction greet($name) {\n    echo $name;\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        export function greet(name) {
            console.log(name);
        }
        ");
    }

    #[test]
    fn foreach_with_key() {
        let out = js("<?php\nforeach ($items as $key => $value) {\n    echo $value;\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        for (const [key, value] of Object.entries(items)) {
            console.log(value);
        }
        ");
    }

    #[test]
    fn define_as_comment() {
        let config = config(|c| c.define_style = DefineStyle::Comment);
        let out = js_with("<?php define('APP_VERSION', '1.0');", &config);
        assert!(out.contains("// define('APP_VERSION', '1.0');"));
        assert!(!out.contains("const APP_VERSION"));
        assert!(!out.contains("let APP_VERSION"));
    }

    #[test]
    fn sibling_branch_functions_not_exported() {
        let php = r#"<?php
if ($debug) {
    function log_line($msg) { echo $msg; }
} else {
    function log_line($msg) { }
}
"#;
        let out = js(php);
        assert_eq!(out.matches("function log_line(msg) {").count(), 2);
        assert!(!out.contains("export function log_line"));
    }

    #[test]
    fn empty_without_helpers() {
        let config = config(|c| c.utility_style = UtilityStyle::None);
        let out = js_with("<?php\nif (empty($x)) {\n    echo 'none';\n}\n", &config);
        assert!(out.contains("if (!x) {"));
        assert!(!out.contains("__empty"));
        assert!(!out.contains("import"));
    }

    #[test]
    fn superglobal_shim_once() {
        let out = js("<?php\n$id = $_GET['id'];\n$name = $_POST['name'];\n");
        assert_eq!(out.matches("const _ = typeof globalThis").count(), 1);
        assert!(out.contains("id = _.GET['id'];"));
        assert!(out.contains("name = _.POST['name'];"));

        let lines: Vec<&str> = out.lines().collect();
        let shim = lines
            .iter()
            .position(|l| l.starts_with("const _ ="))
            .unwrap();
        assert!(lines[..shim - 1]
            .iter()
            .all(|l| l.is_empty() || l.starts_with("//")));
        let first_code = lines
            .iter()
            .position(|l| !l.is_empty() && !l.starts_with("//"))
            .unwrap();
        assert_eq!(first_code, shim);
    }
}

mod expressions {
    use super::*;

    #[test]
    fn concatenation_is_left_to_right() {
        let out = js("<?php $s = $a . ' ' . $b;");
        assert!(out.contains("s = a + ' ' + b;"));
    }

    #[test]
    fn loose_comparison_becomes_strict() {
        let out = js("<?php if ($a == 1 && $b != 2) { }");
        assert!(out.contains("if (a === 1 && b !== 2) {"));
    }

    #[test]
    fn string_escapes_survive() {
        let out = js(r#"<?php $s = 'It\'s'; $t = "say \"hi\"";"#);
        assert!(out.contains(r"s = 'It\'s';"));
        assert!(out.contains(r#"t = "say \"hi\"";"#));
    }

    #[test]
    fn interpolation_becomes_template() {
        let out = js(r#"<?php echo "Hello {$user->name}, you have $count items";"#);
        assert!(out.contains("console.log(`Hello ${user.name}, you have ${count} items`);"));
    }

    #[test]
    fn arrays_by_shape() {
        let out = js("<?php $list = [1, 2, 3]; $map = ['a' => 1, 'b' => 2];");
        assert!(out.contains("list = [1, 2, 3];"));
        assert!(out.contains("map = { 'a': 1, 'b': 2 };"));
    }

    #[test]
    fn isset_checks_typeof() {
        let out = js("<?php if (isset($a, $b)) { }");
        assert!(out.contains("if ((typeof a !== 'undefined' && typeof b !== 'undefined')) {"));
    }

    #[test]
    fn static_and_instance_access() {
        let out = js("<?php $x = Foo::BAR; $y = $obj->prop; $z = Foo::class;");
        assert!(out.contains("x = Foo.BAR;"));
        assert!(out.contains("y = obj.prop;"));
        assert!(out.contains("z = Foo.name;"));
    }

    #[test]
    fn reserved_variable_names_escaped() {
        let out = js("<?php $class = 'x'; echo $class;");
        assert!(out.contains("class_ = 'x';"));
        assert!(out.contains("console.log(class_);"));
    }

    #[test]
    fn closure_body_indented() {
        let out = js("<?php $f = function ($x) use ($y) {\n    return $x + $y;\n};\n");
        insta::assert_snapshot!(body(&out), @r"
        f = (x) => { /* use (y) */
            return x + y;
        };
        ");
    }

    #[test]
    fn match_becomes_ternary_chain() {
        let out = js("<?php $label = match ($code) { 1, 2 => 'low', default => 'high' };");
        assert!(out.contains("label = (code === 1 || code === 2 ? 'low' : 'high');"));
    }

    #[test]
    fn array_append_becomes_push() {
        let out = js("<?php $items[] = $item;");
        assert!(out.contains("items.push(item);"));
    }
}

mod statements {
    use super::*;

    #[test]
    fn elseif_chain() {
        let out = js("<?php\nif ($a) {\n    echo 1;\n} elseif ($b) {\n    echo 2;\n} else {\n    echo 3;\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        if (a) {
            console.log(1);
        } else if (b) {
            console.log(2);
        } else {
            console.log(3);
        }
        ");
    }

    #[test]
    fn alternative_syntax_matches_braces() {
        let braces = js("<?php if ($a) { echo 1; } else { echo 2; }");
        let colon = js("<?php if ($a): echo 1; else: echo 2; endif;");
        assert_eq!(
            braces.matches("} else {").count(),
            colon.matches("} else {").count()
        );
        assert!(colon.contains("if (a) {"));
    }

    #[test]
    fn switch_layout() {
        let out = js("<?php\nswitch ($x) {\n    case 1:\n        echo 'one';\n        break;\n    default:\n        echo 'other';\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        switch (x) {
            case 1:
                console.log('one');
                break;
            default:
                console.log('other');
        }
        ");
    }

    #[test]
    fn try_catch_finally() {
        let out = js("<?php\ntry {\n    run();\n} catch (InvalidArgumentException $e) {\n    echo $e->getMessage();\n} finally {\n    cleanup();\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        try {
            run();
        } catch (e) {
            // Catch InvalidArgumentException
            console.log(e.getMessage());
        } finally {
            cleanup();
        }
        ");
    }

    #[test]
    fn multiple_catch_clauses() {
        let out = js("<?php\ntry {\n    run();\n} catch (InvalidArgumentException | TypeError $e) {\n    echo 'bad';\n} catch (Exception $ex) {\n    echo $ex->getMessage();\n}\n");
        insta::assert_snapshot!(body(&out), @r"
        try {
            run();
        } catch (e) {
            if (e instanceof InvalidArgumentException || e instanceof TypeError) {
                console.log('bad');
            } else {
                let ex = e;
                console.log(ex.getMessage());
            }
        }
        ");
    }

    #[test]
    fn unmatched_catch_rethrows() {
        let out = js("<?php try { run(); } catch (A $a) { } catch (B $b) { }");
        assert!(out.contains("if (a instanceof A) {"));
        assert!(out.contains("} else if (a instanceof B) {\n        let b = a;"));
        assert!(out.contains("} else {\n        throw a;\n    }"));
    }

    #[test]
    fn declarations_in_loops_are_not_exported() {
        let out = js("<?php\nwhile (true) {\n    function g() {}\n    break;\n}\nforeach ($xs as $x) {\n    class Item {}\n}\ntry {\n    function h() {}\n} finally {\n}\n");
        assert!(out.contains("while (true) {\n    function g() {"));
        assert!(out.contains("    class Item {"));
        assert!(out.contains("    function h() {"));
        assert!(!out.contains("export function"));
        assert!(!out.contains("export class"));
    }

    #[test]
    fn heredoc_and_nowdoc() {
        let out = js("<?php\n$name = 'Ann';\n$msg = <<<EOT\n    Hello $name\n    Bye\n    EOT;\n$sql = <<<'SQL'\nSELECT * FROM \"users\"\nSQL;\necho $msg, $sql;\n");
        assert!(out.contains("`Hello ${name}\\nBye`"));
        assert!(out.contains(r#""SELECT * FROM \"users\"""#));
        assert!(out.contains("console.log(msg, sql);"));
    }

    #[test]
    fn top_level_return_wraps_module() {
        let out = js("<?php\n$config = ['debug' => true];\nreturn $config;\n");
        assert!(out.contains("// WARNING: Top-level return not supported in ES6 modules"));
        assert!(out.contains("// Original: return config;"));
        assert!(out.contains("(function() {\n"));
        assert!(out.contains("    return config;\n})();"));
    }

    #[test]
    fn unset_styles() {
        let out = js("<?php unset($cache['key']);");
        assert!(out.contains("// unset(cache['key']);"));

        let config = config(|c| c.unset_style = UnsetStyle::Delete);
        let out = js_with("<?php unset($cache['key']);", &config);
        assert!(out.contains("delete cache['key'];"));
    }

    #[test]
    fn static_and_global_are_annotated() {
        let out = js("<?php\nfunction counter() {\n    global $total;\n    static $n = 0;\n    $n++;\n}\n");
        assert!(out.contains("    // global total"));
        assert!(out.contains("    let n = 0; // static"));
        assert!(out.contains("    n++;"));
    }

    #[test]
    fn includes_become_imports() {
        let out = js("<?php require_once 'lib/helpers.php'; include $path;");
        assert!(out.contains("import './lib/helpers.js';"));
        assert!(out.contains("// Unresolved import: path (from include)"));
    }

    #[test]
    fn inline_html_output() {
        let out = js("<h1><?= $title ?></h1>\n<?php echo 'x'; ?>\n<p>Done</p>\n");
        assert!(out.contains("__outputHtml(["));
        assert!(out.contains("`<p>Done</p>`,"));
        assert!(out.contains("console.log('x');"));
    }

    #[test]
    fn namespace_and_use() {
        let out = js("<?php\nnamespace App\\Models;\nuse App\\Support\\Str as S;\nclass User {}\n");
        assert!(out.contains("// Namespace: App\\Models"));
        assert!(out.contains("import S from './App/Support/Str.js';"));
        assert!(out.contains("class User {"));
        assert!(!out.contains("export class User"));
    }

    #[test]
    fn define_default_is_const() {
        let out = js("<?php define('MAX_ITEMS', 10);");
        assert!(out.contains("const MAX_ITEMS = 10;"));
        assert!(!out.contains("export const MAX_ITEMS"));
    }

    #[test]
    fn define_export_only_at_top_level() {
        let config = config(|c| c.define_style = DefineStyle::ExportConst);
        let out = js_with(
            "<?php define('A', 1);\nif ($x) { define('B', 2); }\n",
            &config,
        );
        assert!(out.contains("export const A = 1;"));
        assert!(out.contains("    const B = 2;"));
    }
}

mod classes {
    use super::*;

    #[test]
    fn class_with_members() {
        let php = r#"<?php
class User extends Model {
    const TABLE = 'users';
    public static $count = 0;
    private $name;

    public function __construct($name) {
        $this->name = $name;
    }

    public static function create($name) {
        return new static($name);
    }
}
"#;
        let out = js(php);
        assert!(out.contains("export class User extends Model {"));
        assert!(out.contains("    static TABLE = 'users';"));
        assert!(out.contains("    static count = 0;"));
        assert!(out.contains("    name;"));
        assert!(out.contains("    __construct(name) {\n        this.name = name;\n    }"));
        assert!(out.contains("    static create(name) {"));
    }

    #[test]
    fn promoted_constructor_params() {
        let out = js("<?php class Point { public function __construct(private $x, private $y) {} }");
        assert!(out.contains("__construct(x, y) {\n        this.x = x;\n        this.y = y;\n    }"));
    }

    #[test]
    fn abstract_methods_throw() {
        let out = js("<?php abstract class Shape { abstract public function area(); }");
        assert!(out.contains("area() {\n        throw new Error('Method area() must be implemented');\n    }"));
    }

    #[test]
    fn phpdoc_becomes_jsdoc() {
        let php = "<?php\n/**\n * Add two numbers.\n * @param int $a\n * @return int\n */\nfunction add($a, $b) { return $a + $b; }\n";
        let out = js(php);
        assert!(out.contains(" * @param {int} a"));
        assert!(out.contains(" * @returns {int}"));
        assert!(out.contains("export function add(a, b) {"));
    }

    #[test]
    fn interface_styles() {
        let php = "<?php interface Shape { public function area($scale); }";
        let out = js(php);
        assert!(out.contains("export class Shape {"));
        assert!(out.contains("throw new Error('Method area() must be implemented');"));

        let style = |s| config(|c| c.interface_style = s);
        let out = js_with(php, &style(InterfaceStyle::Comment));
        assert!(out.contains("// interface Shape {\n//     area(scale);\n// }"));

        let out = js_with(php, &style(InterfaceStyle::JsDoc));
        assert!(out.contains(" * @interface Shape"));
        assert!(out.contains(" * @method area({*} scale)"));
        assert!(out.contains("export class Shape {}"));

        let out = js_with(php, &style(InterfaceStyle::EmptyClass));
        assert!(out.contains("export class Shape {}"));
        assert!(!out.contains("area"));
    }

    #[test]
    fn interface_constants_and_parent() {
        let out = js("<?php\ninterface Shape extends Drawable {\n    const SIDES = 3;\n    public function area();\n}\n");
        assert!(out.contains("export class Shape extends Drawable {\n    static SIDES = 3;\n"));
        assert!(out.contains("    area() {"));

        let out = js_with(
            "<?php interface Shape extends Drawable, Sized {}",
            &config(|c| c.interface_style = InterfaceStyle::JsDoc),
        );
        assert!(out.contains(" * @extends Drawable\n * @extends Sized\n"));
    }

    #[test]
    fn backed_enum_cases() {
        let out = js("<?php enum Status: string { case Active = 'active'; case Off = 'off'; }");
        assert!(out.contains("export class Status {"));
        assert!(out.contains("    static Active = 'active';"));
        assert!(out.contains("    static Off = 'off';"));
    }
}

mod utilities {
    use super::*;

    #[test]
    fn inline_helper_defined_once() {
        let out = js("<?php\nif (empty($a)) echo \"a\";\nif (empty($b)) echo \"b\";\n");
        assert_eq!(out.matches("function __empty(val) {").count(), 1);
        assert!(out.contains("if (__empty(a)) {"));
        assert!(out.contains("if (__empty(b)) {"));
    }

    #[test]
    fn no_helper_when_unused() {
        let out = js("<?php if ($value) { echo 'x'; }");
        assert!(!out.contains("__empty"));
    }

    #[test]
    fn module_style_imports() {
        let config = config(|c| {
            c.utility_style = UtilityStyle::Module;
            c.utility_module = "my-helpers".into();
        });
        let out = js_with("<?php if (empty($value)) { echo 'e'; }", &config);
        assert!(out.contains("import * as my_helpers from './my-helpers.js';"));
        assert!(out.contains("if (my_helpers.empty(value)) {"));
        assert!(!out.contains("function __empty"));
    }

    #[test]
    fn module_import_only_when_used() {
        let config = config(|c| c.utility_style = UtilityStyle::Module);
        let out = js_with("<?php echo 1;", &config);
        assert!(!out.contains("import * as"));
    }

    #[test]
    fn registry_shared_across_files() {
        let config = config(|c| c.utility_style = UtilityStyle::Module);
        let registry = Arc::new(UtilityRegistry::new());
        let transpiler = Transpiler::new(&config).with_registry(registry.clone());
        transpiler
            .transpile("<?php if (empty($a)) {}", "a.php")
            .unwrap();
        transpiler.transpile("<?php echo 1;", "b.php").unwrap();
        assert_eq!(registry.names(), vec!["empty".to_string()]);
    }

    #[test]
    fn module_merge_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(|c| c.utility_style = UtilityStyle::Module);

        let first = UtilityRegistry::new();
        first.register("empty");
        ensure_utility_module(dir.path(), &config, &first).unwrap();

        let both = UtilityRegistry::new();
        both.register("empty");
        both.register("isset");
        ensure_utility_module(dir.path(), &config, &both).unwrap();

        let path = ensure_utility_module(dir.path(), &config, &first)
            .unwrap()
            .unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.matches("export function empty(val) {").count(), 1);
        assert_eq!(content.matches("export function isset(...vars) {").count(), 1);
    }
}

mod errors {
    use super::*;

    #[test]
    fn syntax_error_has_location() {
        let err = Transpiler::new(&Config::default())
            .transpile("<?php\nfunction broken( {\n", "broken.php")
            .unwrap_err();
        assert!(err.to_string().starts_with("broken.php: "));
        assert!(err.location().is_some());
    }

    struct FixedReader;

    impl Reader for FixedReader {
        fn language(&self) -> &'static str {
            "fixed"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &[]
        }

        fn read(&self, _source: &str) -> Result<Program, ReadError> {
            Ok(Program::new(vec![Stmt::echo(vec![Expr::single("fixed")])]))
        }
    }

    static FIXED_READER: FixedReader = FixedReader;

    #[test]
    fn custom_reader_replaces_php() {
        let out = Transpiler::new(&Config::default())
            .with_reader(&FIXED_READER)
            .transpile("<?php echo 'ignored';", "any.php")
            .unwrap();
        assert!(out.contains("console.log('fixed');"));
        assert!(!out.contains("ignored"));
    }

    #[test]
    fn untagged_source_is_a_snippet() {
        let out = js("$x = 1;\necho $x;\n");
        assert!(out.contains("x = 1;"));
        assert!(out.contains("console.log(x);"));
    }
}
