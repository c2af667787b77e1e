//! JavaScript writer.
//!
//! Walks the typed AST, emitting indented lines into a [`Buffer`], then
//! assembles the ES module around them: header, environment shims, body,
//! helper definitions and footer.

use super::buffer::Buffer;
use super::expr::import_path;
use super::literal;
use super::phpdoc;
use super::scope::{Scope, ScopeState};
use crate::ast::*;
use crate::config::{Config, DefineStyle, InterfaceStyle, UnsetStyle};
use crate::superglobals;
use crate::utility::{UtilityRegistry, Utilities};
use std::sync::Arc;

const HEADER: &str = "//
// Transpiled from PHP using AST-based transpiler
//

";

const ENV_SHIMS: &str = "// Environment shims
const __ENV__ = {
    isNode: typeof process !== 'undefined' && process.versions?.node,
    isBrowser: typeof window !== 'undefined'
};

// HTML output helper
function __outputHtml(lines) {
    console.log(lines.join('\\n'));
}

";

const FOOTER: &str = "export { __ENV__, __outputHtml };\n";

/// Exception types a catch clause treats as catching everything.
const GENERIC_EXCEPTIONS: &[&str] = &["Exception", "Error", "Throwable"];

fn is_catch_all(catch: &Catch) -> bool {
    catch
        .types
        .iter()
        .all(|t| GENERIC_EXCEPTIONS.contains(&t.as_str()))
}

/// Emits a [`Program`] as a JavaScript module.
pub struct JavaScriptWriter<'c> {
    pub(super) config: &'c Config,
    pub(super) buf: Buffer,
    pub(super) scope: ScopeState,
    pub(super) utilities: Utilities,
    pub(super) uses_ambient_globals: bool,
    has_exports: bool,
    has_top_level_return: bool,
}

impl<'c> JavaScriptWriter<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            buf: Buffer::new(),
            scope: ScopeState::default(),
            utilities: Utilities::new(config, None),
            uses_ambient_globals: false,
            has_exports: false,
            has_top_level_return: false,
        }
    }

    /// Mirror helper usage into a registry shared across files.
    pub fn with_registry(mut self, registry: Arc<UtilityRegistry>) -> Self {
        self.utilities = Utilities::new(self.config, Some(registry));
        self
    }

    /// Emit a program to JavaScript source.
    pub fn emit(mut self, program: &Program) -> String {
        self.visit_stmts(&program.body);
        self.assemble()
    }

    fn assemble(self) -> String {
        let mut out = String::from(HEADER);
        if let Some(import) = self.utilities.module_import() {
            out.push_str(&import);
            out.push('\n');
        }
        out.push_str(ENV_SHIMS);

        if self.has_top_level_return && !self.has_exports {
            out.push_str("// Module wrapped in function to support top-level return\n");
            out.push_str("(function() {\n");
            out.push_str(&self.buf.render(1, true));
            out.push_str("})();\n");
        } else {
            out.push_str(&self.buf.render(0, false));
        }

        if let Some(defs) = self.utilities.inline_definitions() {
            out.push('\n');
            out.push_str(&defs);
        }
        out.push('\n');
        out.push_str(FOOTER);

        if self.uses_ambient_globals {
            superglobals::inject_shim(&out)
        } else {
            out
        }
    }

    /// `export ` when the declaration is exportable here.
    fn export_prefix(&mut self) -> &'static str {
        if self.scope.can_export() {
            self.has_exports = true;
            "export "
        } else {
            ""
        }
    }

    pub(super) fn visit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit(stmt);
        }
    }

    /// Statements that may run zero or more times: branches, loop bodies
    /// and try/catch/finally blocks. Nothing declared in them is exported.
    fn visit_branch(&mut self, stmts: &[Stmt]) {
        self.buf.indent();
        self.scope.enter_conditional();
        self.visit_stmts(stmts);
        self.scope.exit_conditional();
        self.buf.dedent();
    }

    fn visit_block(&mut self, stmts: &[Stmt]) {
        self.buf.indent();
        self.visit_stmts(stmts);
        self.buf.dedent();
    }

    fn visit(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.visit_expr_stmt(expr),
            Stmt::Echo(args) => {
                let args: Vec<String> = args.iter().map(|a| self.transform_expr(a)).collect();
                self.buf.line(format!("console.log({});", args.join(", ")));
            }
            Stmt::Return(value) => self.visit_return(value.as_ref()),
            Stmt::If(stmt) => self.visit_if(stmt),
            Stmt::While { test, body } => {
                let test = self.transform_expr(test);
                self.buf.line(format!("while ({test}) {{"));
                self.visit_branch(body);
                self.buf.line("}");
            }
            Stmt::DoWhile { body, test } => {
                self.buf.line("do {");
                self.visit_branch(body);
                let test = self.transform_expr(test);
                self.buf.line(format!("}} while ({test});"));
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let init = self.expr_list(init);
                let test = self.expr_list(test);
                let update = self.expr_list(update);
                self.buf.line(format!("for ({init}; {test}; {update}) {{"));
                self.visit_branch(body);
                self.buf.line("}");
            }
            Stmt::Foreach(foreach) => self.visit_foreach(foreach),
            Stmt::Switch { test, cases } => {
                let test = self.transform_expr(test);
                self.buf.line(format!("switch ({test}) {{"));
                self.buf.indent();
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            let test = self.transform_expr(test);
                            self.buf.line(format!("case {test}:"));
                        }
                        None => self.buf.line("default:"),
                    }
                    self.visit_branch(&case.body);
                }
                self.buf.dedent();
                self.buf.line("}");
            }
            Stmt::Break(_) => self.buf.line("break;"),
            Stmt::Continue(_) => self.buf.line("continue;"),
            Stmt::Try {
                body,
                catches,
                finally,
            } => self.visit_try(body, catches, finally.as_deref()),
            Stmt::Throw(value) => {
                let value = self.transform_expr(value);
                self.buf.line(format!("throw {value};"));
            }
            Stmt::Exit(message) => {
                let error = self.exit_error(message.as_ref());
                self.buf.line(format!("throw {error};"));
            }

            Stmt::Function(func) => self.visit_function(func),
            Stmt::Class(class) => self.visit_class(class),
            Stmt::Interface(interface) => self.visit_interface(interface),
            Stmt::Enum(en) => {
                let export = self.export_prefix();
                self.buf.line(format!("{export}class {} {{", literal::php_name(&en.name)));
                self.visit_members(&en.members);
                self.buf.line("}");
                self.buf.blank();
            }

            Stmt::Namespace { name, body } => {
                let name = name.as_deref().unwrap_or("(global)");
                self.buf.line(format!("// Namespace: {name}"));
                let saved = self.scope.enter_namespace();
                self.visit_stmts(body);
                self.scope.restore(saved);
            }
            Stmt::Use(items) => {
                for item in items {
                    let path = format!("./{}.js", item.path.replace('\\', "/"));
                    match &item.alias {
                        Some(alias) => self.buf.line(format!(
                            "import {} from '{path}';",
                            literal::identifier(alias)
                        )),
                        None => self.buf.line(format!("import '{path}';")),
                    }
                }
            }
            Stmt::Const(items) => {
                for item in items {
                    let value = self.transform_expr(&item.value);
                    let keyword = if self.scope.scope() == Scope::None {
                        self.has_exports = true;
                        "export const"
                    } else {
                        "const"
                    };
                    self.buf.line(format!("{keyword} {} = {value};", item.name));
                }
            }
            Stmt::Global(vars) => {
                let vars: Vec<String> = vars.iter().map(|v| self.transform_expr(v)).collect();
                self.buf.line(format!("// global {}", vars.join(", ")));
            }
            Stmt::Static(vars) => {
                for var in vars {
                    let name = literal::identifier(&var.name);
                    match &var.value {
                        Some(value) => {
                            let value = self.transform_expr(value);
                            self.buf.line(format!("let {name} = {value}; // static"));
                        }
                        None => self.buf.line(format!("let {name}; // static")),
                    }
                }
            }
            Stmt::Unset(vars) => {
                for var in vars {
                    let var = self.transform_expr(var);
                    match self.config.unset_style {
                        UnsetStyle::Delete => self.buf.line(format!("delete {var};")),
                        UnsetStyle::Comment => self.buf.line(format!("// unset({var});")),
                    }
                }
            }
            Stmt::Declare { directives, body } => {
                let directives: Vec<String> =
                    directives.iter().map(|(k, v)| format!("{k}={v}")).collect();
                self.buf.line(format!("// declare({})", directives.join(", ")));
                self.visit_stmts(body);
            }
            Stmt::InlineHtml(html) => self.visit_inline_html(html),
            Stmt::Comment { text, trailing } => self.visit_comment(text, *trailing),
            Stmt::Block(stmts) => self.visit_stmts(stmts),
            Stmt::Noop => {}
            Stmt::Unknown { kind, children } => {
                tracing::warn!(kind = kind.as_str(), "unsupported statement, visiting children");
                self.visit_stmts(children);
            }
        }
    }

    fn expr_list(&mut self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| self.transform_expr(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn visit_expr_stmt(&mut self, expr: &Expr) {
        match expr {
            Expr::Call { callee, args } if is_define(callee) => {
                if let [Expr::String { value: name, .. }, value, ..] = args.as_slice() {
                    self.visit_define(name, value);
                    return;
                }
            }
            Expr::Assign { target, op, value } if op == "=" => {
                if let Expr::Index {
                    object,
                    index: None,
                } = target.as_ref()
                {
                    let object = self.transform_expr(object);
                    let value = self.transform_expr(value);
                    self.buf.line(format!("{object}.push({value});"));
                    return;
                }
            }
            Expr::Include { kind, target } => {
                match target.unparen() {
                    Expr::String { value, .. } => {
                        self.buf.line(format!("import '{}';", import_path(value)));
                    }
                    other => {
                        let target = self.transform_expr(other);
                        self.buf.line(format!(
                            "// Unresolved import: {target} (from {})",
                            kind.as_str()
                        ));
                    }
                }
                return;
            }
            Expr::Print(inner) => {
                let inner = self.transform_expr(inner);
                self.buf.line(format!("console.log({inner});"));
                return;
            }
            _ => {}
        }
        let expr = self.transform_expr(expr);
        self.buf.line(format!("{expr};"));
    }

    fn visit_define(&mut self, name: &str, value: &Expr) {
        let js_value = self.transform_expr(value);
        let const_name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let keyword = match self.config.define_style {
            DefineStyle::Comment => {
                self.buf.line(format!("// define('{name}', {js_value});"));
                return;
            }
            DefineStyle::ExportConst if self.scope.can_export() => {
                self.has_exports = true;
                "export const"
            }
            DefineStyle::ExportConst | DefineStyle::Const => "const",
        };
        self.buf.line(format!("{keyword} {const_name} = {js_value};"));
    }

    fn visit_return(&mut self, value: Option<&Expr>) {
        let statement = match value {
            Some(value) => format!("return {};", self.transform_expr(value)),
            None => "return;".to_string(),
        };
        if self.scope.scope() == Scope::None {
            self.has_top_level_return = true;
            self.buf.line("// WARNING: Top-level return not supported in ES6 modules");
            self.buf.line(format!("// Original: {statement}"));
            self.buf.top_level_return(statement);
        } else {
            self.buf.line(statement);
        }
    }

    fn visit_if(&mut self, stmt: &If) {
        let test = self.transform_expr(&stmt.test);
        self.buf.line(format!("if ({test}) {{"));
        self.visit_branch(&stmt.body);

        let mut alternate = stmt.alternate.as_ref();
        while let Some(alt) = alternate {
            match alt {
                Else::If(inner) => {
                    let test = self.transform_expr(&inner.test);
                    self.buf.line(format!("}} else if ({test}) {{"));
                    self.visit_branch(&inner.body);
                    alternate = inner.alternate.as_ref();
                }
                Else::Block(body) => {
                    self.buf.line("} else {");
                    self.visit_branch(body);
                    alternate = None;
                }
            }
        }
        self.buf.line("}");
    }

    fn visit_foreach(&mut self, foreach: &Foreach) {
        let source = self.transform_expr(&foreach.source);
        let value = self.transform_expr(&foreach.value);
        match &foreach.key {
            Some(key) => {
                let key = self.transform_expr(key);
                self.buf.line(format!(
                    "for (const [{key}, {value}] of Object.entries({source})) {{"
                ));
            }
            None => self.buf.line(format!("for (const {value} of {source}) {{")),
        }
        self.visit_branch(&foreach.body);
        self.buf.line("}");
    }

    fn visit_try(&mut self, body: &[Stmt], catches: &[Catch], finally: Option<&[Stmt]>) {
        self.buf.line("try {");
        self.visit_branch(body);

        if let Some(first) = catches.first() {
            let var = first
                .var
                .as_deref()
                .map(literal::identifier)
                .unwrap_or_else(|| "e".to_string());
            self.buf.line(format!("}} catch ({var}) {{"));
            self.buf.indent();
            if let [only] = catches {
                if !is_catch_all(only) {
                    self.buf.line(format!("// Catch {}", only.types.join(" | ")));
                }
                self.visit_catch_body(&var, only);
            } else {
                self.visit_catch_chain(&var, catches);
            }
            self.buf.dedent();
        }

        if let Some(finally) = finally {
            self.buf.line("} finally {");
            self.visit_branch(finally);
        }
        self.buf.line("}");
    }

    /// Several PHP catch clauses dispatch on `instanceof` inside the single
    /// JavaScript catch. A catch-all clause ends the chain; without one the
    /// error is rethrown.
    fn visit_catch_chain(&mut self, var: &str, catches: &[Catch]) {
        for (i, catch) in catches.iter().enumerate() {
            let catch_all = is_catch_all(catch);
            match (i, catch_all) {
                (0, true) => {
                    self.visit_catch_body(var, catch);
                    return;
                }
                (_, true) => self.buf.line("} else {"),
                (_, false) => {
                    let test = catch
                        .types
                        .iter()
                        .map(|t| format!("{var} instanceof {}", literal::php_name(t)))
                        .collect::<Vec<_>>()
                        .join(" || ");
                    let keyword = if i == 0 { "if" } else { "} else if" };
                    self.buf.line(format!("{keyword} ({test}) {{"));
                }
            }
            self.buf.indent();
            self.visit_catch_body(var, catch);
            self.buf.dedent();
            if catch_all {
                self.buf.line("}");
                return;
            }
        }
        self.buf.line("} else {");
        self.buf.line(format!("    throw {var};"));
        self.buf.line("}");
    }

    fn visit_catch_body(&mut self, var: &str, catch: &Catch) {
        let own = catch.var.as_deref().map(literal::identifier);
        if let Some(own) = own.filter(|own| own != var) {
            self.buf.line(format!("let {own} = {var};"));
        }
        self.scope.enter_conditional();
        self.visit_stmts(&catch.body);
        self.scope.exit_conditional();
    }

    fn visit_doc(&mut self, doc: Option<&str>) {
        if let Some(doc) = doc {
            for line in phpdoc::to_jsdoc(doc) {
                self.buf.line(line);
            }
        }
    }

    fn visit_function(&mut self, func: &Function) {
        self.visit_doc(func.doc.as_deref());
        let export = self.export_prefix();
        let params = self.params(&func.params);
        self.buf.line(format!(
            "{export}function {}({params}) {{",
            literal::php_name(&func.name)
        ));
        let saved = self.scope.enter_body(Scope::Function);
        self.visit_block(&func.body);
        self.scope.restore(saved);
        self.buf.line("}");
        self.buf.blank();
    }

    fn visit_class(&mut self, class: &Class) {
        let export = self.export_prefix();
        let extends = class
            .extends
            .as_deref()
            .map(|base| format!(" extends {}", literal::php_name(base)))
            .unwrap_or_default();
        self.buf.line(format!(
            "{export}class {}{extends} {{",
            literal::php_name(&class.name)
        ));
        self.visit_members(&class.members);
        self.buf.line("}");
        self.buf.blank();
    }

    fn visit_members(&mut self, members: &[Member]) {
        self.buf.indent();
        for member in members {
            match member {
                Member::Property(prop) => {
                    let prefix = if prop.is_static { "static " } else { "" };
                    match &prop.value {
                        Some(value) => {
                            let value = self.transform_expr(value);
                            self.buf.line(format!("{prefix}{} = {value};", prop.name));
                        }
                        None => self.buf.line(format!("{prefix}{};", prop.name)),
                    }
                }
                Member::Const(items) => {
                    for item in items {
                        let value = self.transform_expr(&item.value);
                        self.buf.line(format!("static {} = {value};", item.name));
                    }
                }
                Member::Method(method) => self.visit_method(method),
                Member::TraitUse(traits) => {
                    self.buf.line(format!("// use {}", traits.join(", ")));
                }
                Member::Case(case) => {
                    let value = match &case.value {
                        Some(value) => self.transform_expr(value),
                        None => literal::single_quoted(&case.name),
                    };
                    self.buf.line(format!("static {} = {value};", case.name));
                }
                Member::Comment(text) => self.visit_comment(text, false),
                Member::Unknown(kind) => {
                    tracing::warn!(kind = kind.as_str(), "unsupported class member");
                    self.buf.line(format!("/* TODO: {kind} */"));
                }
            }
        }
        self.buf.dedent();
    }

    fn visit_method(&mut self, method: &Method) {
        self.visit_doc(method.doc.as_deref());
        let prefix = if method.is_static { "static " } else { "" };
        let params = self.params(&method.params);
        self.buf.line(format!("{prefix}{}({params}) {{", method.name));
        self.buf.indent();
        let saved = self.scope.enter_body(Scope::ClassMethod);
        match &method.body {
            Some(body) => {
                for param in method.params.iter().filter(|p| p.promoted) {
                    let name = literal::identifier(&param.name);
                    self.buf.line(format!("this.{} = {name};", param.name));
                }
                self.visit_stmts(body);
            }
            None => self.buf.line(format!(
                "throw new Error('Method {}() must be implemented');",
                method.name
            )),
        }
        self.scope.restore(saved);
        self.buf.dedent();
        self.buf.line("}");
        self.buf.blank();
    }

    fn visit_interface(&mut self, interface: &Interface) {
        let name = literal::php_name(&interface.name);
        let parents: Vec<String> = interface.extends.iter().map(|p| literal::php_name(p)).collect();
        // JavaScript classes have one parent; the rest only survive as docs.
        let extends = parents
            .first()
            .map(|base| format!(" extends {base}"))
            .unwrap_or_default();
        match self.config.interface_style {
            InterfaceStyle::AbstractClass => {
                let export = self.export_prefix();
                self.buf.line(format!("{export}class {name}{extends} {{"));
                self.buf.indent();
                for item in &interface.constants {
                    let value = self.transform_expr(&item.value);
                    self.buf.line(format!("static {} = {value};", item.name));
                }
                for method in &interface.methods {
                    let prefix = if method.is_static { "static " } else { "" };
                    let params = self.params(&method.params);
                    self.buf.line(format!("{prefix}{}({params}) {{", method.name));
                    self.buf.indent();
                    self.buf.line(format!(
                        "throw new Error('Method {}() must be implemented');",
                        method.name
                    ));
                    self.buf.dedent();
                    self.buf.line("}");
                    self.buf.blank();
                }
                self.buf.dedent();
                self.buf.line("}");
            }
            InterfaceStyle::Comment => {
                let extends = if parents.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", parents.join(", "))
                };
                self.buf.line(format!("// interface {name}{extends} {{"));
                for method in &interface.methods {
                    let prefix = if method.is_static { "static " } else { "" };
                    let params = self.params(&method.params);
                    self.buf
                        .line(format!("//     {prefix}{}({params});", method.name));
                }
                self.buf.line("// }");
            }
            InterfaceStyle::JsDoc => {
                self.buf.line("/**");
                self.buf.line(format!(" * @interface {name}"));
                for parent in &parents {
                    self.buf.line(format!(" * @extends {parent}"));
                }
                for method in &interface.methods {
                    let params: Vec<String> = method
                        .params
                        .iter()
                        .map(|p| format!("{{*}} {}", literal::identifier(&p.name)))
                        .collect();
                    self.buf
                        .line(format!(" * @method {}({})", method.name, params.join(", ")));
                }
                self.buf.line(" */");
                let export = self.export_prefix();
                self.buf.line(format!("{export}class {name}{extends} {{}}"));
            }
            InterfaceStyle::EmptyClass => {
                let export = self.export_prefix();
                self.buf.line(format!("{export}class {name}{extends} {{}}"));
            }
        }
        self.buf.blank();
    }

    fn visit_inline_html(&mut self, html: &str) {
        let lines: Vec<&str> = html
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return;
        }
        self.buf.line("__outputHtml([");
        self.buf.indent();
        for line in lines {
            self.buf.line(format!("`{}`,", literal::template_text(line)));
        }
        self.buf.dedent();
        self.buf.line("]);");
    }

    fn visit_comment(&mut self, text: &str, trailing: bool) {
        if trailing && !text.contains('\n') && self.buf.append(&format!(" {text}")) {
            return;
        }
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if i > 0 && line.starts_with('*') {
                self.buf.line(format!(" {line}"));
            } else {
                self.buf.line(line);
            }
        }
    }
}

fn is_define(callee: &Expr) -> bool {
    matches!(callee, Expr::Name(name) if name.trim_start_matches('\\').eq_ignore_ascii_case("define"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_with(config: &Config, body: Vec<Stmt>) -> String {
        JavaScriptWriter::new(config).emit(&Program::new(body))
    }

    fn emit(body: Vec<Stmt>) -> String {
        emit_with(&Config::default(), body)
    }

    fn echo_fn(name: &str) -> Stmt {
        Stmt::Function(Function::new(
            name,
            vec![Param::new("name")],
            vec![Stmt::echo(vec![Expr::var("name")])],
        ))
    }

    #[test]
    fn test_module_layout() {
        let out = emit(vec![]);
        assert!(out.starts_with("//\n// Transpiled from PHP using AST-based transpiler\n//\n\n"));
        assert!(out.contains("const __ENV__ = {"));
        assert!(out.contains("function __outputHtml(lines) {\n    console.log(lines.join('\\n'));\n}"));
        assert!(out.ends_with("export { __ENV__, __outputHtml };\n"));
    }

    #[test]
    fn test_top_level_function_is_exported() {
        let out = emit(vec![echo_fn("greet")]);
        assert!(out.contains("export function greet(name) {\n    console.log(name);\n}\n"));
    }

    #[test]
    fn test_conditional_functions_are_not_exported() {
        let out = emit(vec![Stmt::if_stmt(
            Expr::var("a"),
            vec![echo_fn("helper")],
            Some(Else::Block(vec![echo_fn("helper")])),
        )]);
        assert_eq!(out.matches("    function helper(name) {").count(), 2);
        assert!(!out.contains("export function"));
    }

    #[test]
    fn test_nested_function_is_not_exported() {
        let outer = Stmt::Function(Function::new("outer", vec![], vec![echo_fn("inner")]));
        let out = emit(vec![outer]);
        assert!(out.contains("export function outer() {"));
        assert!(out.contains("    function inner(name) {"));
    }

    #[test]
    fn test_loop_and_try_bodies_are_not_exported() {
        let out = emit(vec![
            Stmt::While {
                test: Expr::Bool(true),
                body: vec![echo_fn("g")],
            },
            Stmt::Try {
                body: vec![echo_fn("h")],
                catches: vec![],
                finally: Some(vec![echo_fn("k")]),
            },
        ]);
        assert!(out.contains("while (true) {\n    function g(name) {"));
        assert!(out.contains("try {\n    function h(name) {"));
        assert!(out.contains("} finally {\n    function k(name) {"));
        assert!(!out.contains("export function"));
    }

    #[test]
    fn test_define_styles() {
        let define = || {
            vec![Stmt::expr(Expr::call(
                Expr::name("define"),
                vec![Expr::single("APP_NAME"), Expr::single("demo")],
            ))]
        };
        let out = emit(define());
        assert!(out.contains("const APP_NAME = 'demo';"));

        let config = Config {
            define_style: DefineStyle::ExportConst,
            ..Config::default()
        };
        assert!(emit_with(&config, define()).contains("export const APP_NAME = 'demo';"));

        let config = Config {
            define_style: DefineStyle::Comment,
            ..Config::default()
        };
        let out = emit_with(&config, define());
        assert!(out.contains("// define('APP_NAME', 'demo');"));
        assert!(!out.contains("const APP_NAME"));
    }

    #[test]
    fn test_array_push() {
        let out = emit(vec![Stmt::expr(Expr::assign(
            Expr::Index {
                object: Box::new(Expr::var("items")),
                index: None,
            },
            Expr::number("1"),
        ))]);
        assert!(out.contains("items.push(1);"));
    }

    #[test]
    fn test_top_level_return_wraps_module() {
        let out = emit(vec![Stmt::Return(Some(Expr::number("1")))]);
        assert!(out.contains("// WARNING: Top-level return not supported in ES6 modules"));
        assert!(out.contains("// Original: return 1;"));
        assert!(out.contains("// Module wrapped in function to support top-level return\n(function() {\n"));
        assert!(out.contains("    return 1;\n})();"));
    }

    #[test]
    fn test_top_level_return_dropped_with_exports() {
        let out = emit(vec![echo_fn("f"), Stmt::Return(None)]);
        assert!(out.contains("// Original: return;"));
        assert!(!out.contains("(function() {"));
        assert!(!out.contains("\nreturn;"));
    }

    #[test]
    fn test_interface_styles() {
        let interface = || {
            let mut method = Method {
                name: "area".into(),
                params: vec![Param::new("scale")],
                body: None,
                is_static: false,
                doc: None,
            };
            method.params.push(Param::new("unit"));
            vec![Stmt::Interface(Interface {
                name: "Shape".into(),
                extends: vec![],
                methods: vec![method],
                constants: vec![],
            })]
        };

        let out = emit(interface());
        assert!(out.contains("export class Shape {"));
        assert!(out.contains("throw new Error('Method area() must be implemented');"));

        let style = |interface_style| Config {
            interface_style,
            ..Config::default()
        };
        let out = emit_with(&style(InterfaceStyle::Comment), interface());
        assert!(out.contains("// interface Shape {\n//     area(scale, unit);\n// }"));

        let out = emit_with(&style(InterfaceStyle::JsDoc), interface());
        assert!(out.contains("/**\n * @interface Shape\n * @method area({*} scale, {*} unit)\n */\nexport class Shape {}"));

        let out = emit_with(&style(InterfaceStyle::EmptyClass), interface());
        assert!(out.contains("export class Shape {}"));
    }

    #[test]
    fn test_interface_extends() {
        let interface = || {
            vec![Stmt::Interface(Interface {
                name: "Square".into(),
                extends: vec!["Shape".into(), "Sized".into()],
                methods: vec![],
                constants: vec![ConstItem {
                    name: "SIDES".into(),
                    value: Expr::number("4"),
                }],
            })]
        };
        let style = |interface_style| Config {
            interface_style,
            ..Config::default()
        };

        let out = emit(interface());
        assert!(out.contains("export class Square extends Shape {\n    static SIDES = 4;\n}"));

        let out = emit_with(&style(InterfaceStyle::JsDoc), interface());
        assert!(out.contains(" * @interface Square\n * @extends Shape\n * @extends Sized\n */\nexport class Square extends Shape {}"));

        let out = emit_with(&style(InterfaceStyle::Comment), interface());
        assert!(out.contains("// interface Square extends Shape, Sized {\n// }"));

        let out = emit_with(&style(InterfaceStyle::EmptyClass), interface());
        assert!(out.contains("export class Square extends Shape {}"));
    }

    #[test]
    fn test_catch_comment() {
        let out = emit(vec![Stmt::Try {
            body: vec![],
            catches: vec![Catch {
                types: vec!["InvalidArgumentException".into()],
                var: Some("ex".into()),
                body: vec![],
            }],
            finally: Some(vec![]),
        }]);
        assert!(out.contains("try {\n} catch (ex) {\n    // Catch InvalidArgumentException\n} finally {\n}"));
    }

    #[test]
    fn test_multiple_catches_dispatch_on_type() {
        let catch = |types: &[&str], var: &str| Catch {
            types: types.iter().map(|t| t.to_string()).collect(),
            var: Some(var.into()),
            body: vec![Stmt::echo(vec![Expr::var(var)])],
        };
        let out = emit(vec![Stmt::Try {
            body: vec![],
            catches: vec![
                catch(&["InvalidArgumentException"], "ex"),
                catch(&["RuntimeException", "LogicException"], "err"),
            ],
            finally: None,
        }]);
        assert!(out.contains(
            "try {\n} catch (ex) {\n    if (ex instanceof InvalidArgumentException) {\n        console.log(ex);\n    } else if (ex instanceof RuntimeException || ex instanceof LogicException) {\n        let err = ex;\n        console.log(err);\n    } else {\n        throw ex;\n    }\n}"
        ));

        let out = emit(vec![Stmt::Try {
            body: vec![],
            catches: vec![catch(&["TypeError"], "e"), catch(&["Exception"], "e")],
            finally: None,
        }]);
        assert!(out.contains(
            "} catch (e) {\n    if (e instanceof TypeError) {\n        console.log(e);\n    } else {\n        console.log(e);\n    }\n}"
        ));
        assert!(!out.contains("throw e;"));
    }

    #[test]
    fn test_inline_html() {
        let out = emit(vec![Stmt::InlineHtml("  <p>`${x}`</p>\n\n  <br>\n".into())]);
        assert!(out.contains("__outputHtml([\n    `<p>\\`\\${x}\\`</p>`,\n    `<br>`,\n]);"));
    }

    #[test]
    fn test_trailing_comment() {
        let out = emit(vec![
            Stmt::expr(Expr::assign(Expr::var("a"), Expr::number("1"))),
            Stmt::Comment {
                text: "// one".into(),
                trailing: true,
            },
        ]);
        assert!(out.contains("a = 1; // one\n"));
    }
}
