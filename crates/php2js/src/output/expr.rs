//! Expression transformer: `Expr` → JavaScript source text.

use super::buffer::Buffer;
use super::javascript::JavaScriptWriter;
use super::literal;
use super::scope::Scope;
use crate::ast::*;
use crate::config::UtilityStyle;
use crate::superglobals::superglobal;

/// Rewrite a PHP include path for a JavaScript import.
///
/// Relative paths gain `./`, backslashes become slashes and `.php`
/// becomes `.js`.
pub(super) fn import_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    if !path.starts_with('.') && !path.starts_with('/') {
        path.insert_str(0, "./");
    }
    if path.to_ascii_lowercase().ends_with(".php") {
        path.truncate(path.len() - 4);
        path.push_str(".js");
    }
    path
}

fn binary_op(op: &str) -> &str {
    match op {
        "." => "+",
        "==" => "===",
        "!=" | "<>" => "!==",
        "and" => "&&",
        "or" => "||",
        other => other,
    }
}

fn throw_iife(value: &str) -> String {
    format!("(() => {{ throw {value}; }})()")
}

impl JavaScriptWriter<'_> {
    pub(super) fn transform_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Variable(name) => self.variable(name),
            Expr::Name(name) => literal::php_name(name),
            Expr::String {
                value,
                double_quoted,
            } => {
                if *double_quoted {
                    literal::interpolate_sigils(value)
                        .unwrap_or_else(|| literal::double_quoted(value))
                } else {
                    literal::single_quoted(value)
                }
            }
            Expr::Interpolated(fragments) => {
                let mut out = String::from("`");
                for fragment in fragments {
                    match fragment {
                        Fragment::Text(text) => out.push_str(&literal::template_text(text)),
                        Fragment::Expr(expr) => {
                            out.push_str("${");
                            out.push_str(&self.transform_expr(expr));
                            out.push('}');
                        }
                    }
                }
                out.push('`');
                out
            }
            Expr::Number(text) => literal::number(text),
            Expr::Bool(value) => value.to_string(),
            Expr::Null => "null".into(),
            Expr::MagicConst(name) => match name.as_str() {
                "__DIR__" => "__dirname".into(),
                "__FILE__" => "__filename".into(),
                other => other.to_string(),
            },

            Expr::Binary { left, op, right } => {
                let l = self.transform_expr(left);
                let r = self.transform_expr(right);
                match op.as_str() {
                    "xor" => format!("Boolean({l}) !== Boolean({r})"),
                    "<=>" => format!("({l} > {r}) - ({l} < {r})"),
                    "," => format!("{l}, {r}"),
                    op => format!("{l} {} {r}", binary_op(op)),
                }
            }
            Expr::Unary { op, operand } => {
                let operand = self.transform_expr(operand);
                format!("{op}{operand}")
            }
            Expr::Suppress(inner) => {
                format!("/* @suppress-errors */ {}", self.transform_expr(inner))
            }
            Expr::Update {
                op,
                prefix,
                operand,
            } => {
                let operand = self.transform_expr(operand);
                if *prefix {
                    format!("{op}{operand}")
                } else {
                    format!("{operand}{op}")
                }
            }
            Expr::Assign { target, op, value } => {
                let target = self.transform_expr(target);
                let value = self.transform_expr(value);
                let op = if op == ".=" { "+=" } else { op.as_str() };
                format!("{target} {op} {value}")
            }
            Expr::AssignRef { target, value } => {
                let target = self.transform_expr(target);
                let value = self.transform_expr(value);
                format!("{target} = {value} /* ref */")
            }
            Expr::Ternary {
                test,
                consequent,
                alternate,
            } => {
                let test = self.transform_expr(test);
                let alternate = self.transform_expr(alternate);
                match consequent {
                    Some(consequent) => {
                        let consequent = self.transform_expr(consequent);
                        format!("{test} ? {consequent} : {alternate}")
                    }
                    None => format!("{test} || {alternate}"),
                }
            }

            Expr::Call { callee, args } => {
                let callee = match callee.as_ref() {
                    closure @ (Expr::Closure { .. } | Expr::ArrowFn { .. }) => {
                        format!("({})", self.transform_expr(closure))
                    }
                    other => self.transform_expr(other),
                };
                let args = self.args(args);
                format!("{callee}({args})")
            }
            Expr::Spread(inner) => format!("...{}", self.transform_expr(inner)),
            Expr::Member {
                object,
                property,
                nullsafe,
            } => {
                let object = self.transform_expr(object);
                let dot = if *nullsafe { "?." } else { "." };
                match property {
                    MemberName::Ident(name) => format!("{object}{dot}{name}"),
                    MemberName::Dynamic(expr) => {
                        let key = self.transform_expr(expr);
                        let dot = if *nullsafe { "?." } else { "" };
                        format!("{object}{dot}[{key}]")
                    }
                }
            }
            Expr::StaticMember { scope, member } => {
                let scope = self.transform_expr(scope);
                match member {
                    MemberName::Ident(name) if name.eq_ignore_ascii_case("class") => {
                        format!("{scope}.name")
                    }
                    MemberName::Ident(name) => format!("{scope}.{name}"),
                    MemberName::Dynamic(expr) => {
                        let key = self.transform_expr(expr);
                        format!("{scope}[{key}]")
                    }
                }
            }
            Expr::Index { object, index } => {
                let object = self.transform_expr(object);
                match index {
                    Some(index) => format!("{object}[{}]", self.transform_expr(index)),
                    None => format!("{object}[]"),
                }
            }
            Expr::Array(items) => self.array(items),
            Expr::List(slots) => self.pattern(slots),
            Expr::New { class, args } => {
                let class = self.transform_expr(class);
                let args = self.args(args);
                format!("new {class}({args})")
            }

            Expr::Closure { params, uses, body } => self.closure(params, uses, body),
            Expr::ArrowFn { params, body } => {
                let params = self.params(params);
                let body = match body.as_ref() {
                    Expr::Array(items) if items.iter().any(|i| i.key.is_some()) => {
                        format!("({})", self.transform_expr(body))
                    }
                    other => self.transform_expr(other),
                };
                format!("({params}) => {body}")
            }

            Expr::Isset(vars) => {
                let checks: Vec<String> = vars
                    .iter()
                    .map(|v| format!("typeof {} !== 'undefined'", self.transform_expr(v)))
                    .collect();
                format!("({})", checks.join(" && "))
            }
            Expr::Empty(inner) => {
                let inner = self.transform_expr(inner);
                match self.utilities.style() {
                    UtilityStyle::None => format!("!{inner}"),
                    _ => self.utilities.call("empty", &inner),
                }
            }
            Expr::Cast { expr, .. } => self.transform_expr(expr),
            Expr::Clone(inner) => format!("Object.assign({{}}, {})", self.transform_expr(inner)),
            Expr::Print(inner) => format!("(console.log({}), 1)", self.transform_expr(inner)),
            Expr::Exit(message) => throw_iife(&self.exit_error(message.as_deref())),
            Expr::Include { target, .. } => match target.unparen() {
                Expr::String { value, .. } => {
                    format!("import({})", literal::single_quoted(&import_path(value)))
                }
                other => format!("import({})", self.transform_expr(other)),
            },
            Expr::Match { subject, arms } => self.match_expr(subject, arms),
            Expr::Throw(value) => {
                let value = self.transform_expr(value);
                throw_iife(&value)
            }

            Expr::SelfRef | Expr::StaticRef => "this.constructor".into(),
            Expr::ParentRef => "super".into(),
            Expr::Paren(inner) => format!("({})", self.transform_expr(inner)),
            Expr::Unknown(kind) => {
                tracing::warn!(kind = kind.as_str(), "unsupported expression");
                format!("/* TODO: {kind} */")
            }
        }
    }

    fn variable(&mut self, name: &str) -> String {
        if name == "GLOBALS" {
            return "globalThis".into();
        }
        if let Some(mapped) = superglobal(name) {
            self.uses_ambient_globals = true;
            return mapped;
        }
        literal::identifier(name)
    }

    fn args(&mut self, args: &[Expr]) -> String {
        args.iter()
            .map(|arg| self.transform_expr(arg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `new Error(msg)` for `exit`/`die`.
    pub(super) fn exit_error(&mut self, message: Option<&Expr>) -> String {
        match message {
            Some(message) => format!("new Error({})", self.transform_expr(message)),
            None => "new Error(\"Script terminated\")".into(),
        }
    }

    pub(super) fn params(&mut self, params: &[Param]) -> String {
        params
            .iter()
            .map(|param| {
                let name = literal::identifier(&param.name);
                match (&param.default, param.variadic) {
                    (_, true) => format!("...{name}"),
                    (Some(default), false) => {
                        format!("{name} = {}", self.transform_expr(default))
                    }
                    (None, false) => name,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn is_string_key(key: &Expr) -> bool {
        matches!(
            key.unparen(),
            Expr::String { .. } | Expr::Interpolated(_)
        )
    }

    fn object_key(&mut self, key: &Expr) -> String {
        match key.unparen() {
            Expr::String { .. } | Expr::Interpolated(_) | Expr::Number(_) => {
                let key = self.transform_expr(key);
                if key.starts_with('`') {
                    format!("[{key}]")
                } else {
                    key
                }
            }
            other => format!("[{}]", self.transform_expr(other)),
        }
    }

    fn array(&mut self, items: &[ArrayItem]) -> String {
        let keyed = items
            .iter()
            .any(|item| item.key.as_ref().is_some_and(Self::is_string_key));

        if !keyed {
            let values: Vec<String> = items
                .iter()
                .map(|item| {
                    let value = self.transform_expr(&item.value);
                    if item.spread {
                        format!("...{value}")
                    } else {
                        value
                    }
                })
                .collect();
            return format!("[{}]", values.join(", "));
        }

        let entries: Vec<String> = items
            .iter()
            .map(|item| {
                let value = self.transform_expr(&item.value);
                match &item.key {
                    _ if item.spread => format!("...{value}"),
                    Some(key) => format!("{}: {value}", self.object_key(key)),
                    None => format!("{value}: undefined"),
                }
            })
            .collect();
        if entries.is_empty() {
            "{}".into()
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }

    /// Destructuring pattern for `list(...)` and `[...] =`.
    pub(super) fn pattern(&mut self, slots: &[Option<ArrayItem>]) -> String {
        let keyed = slots.iter().flatten().any(|item| item.key.is_some());
        let mut parts = Vec::with_capacity(slots.len());
        for slot in slots {
            let Some(item) = slot else {
                parts.push(String::new());
                continue;
            };
            let value = self.transform_expr(&item.value);
            match &item.key {
                Some(key) if keyed => parts.push(format!("{}: {value}", self.object_key(key))),
                _ => parts.push(value),
            }
        }
        if keyed {
            let parts: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
            format!("{{ {} }}", parts.join(", "))
        } else {
            format!("[{}]", parts.join(", "))
        }
    }

    fn closure(&mut self, params: &[Param], uses: &[ClosureUse], body: &[Stmt]) -> String {
        let params = self.params(params);
        let uses_comment = if uses.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = uses
                .iter()
                .map(|u| {
                    let name = literal::identifier(&u.name);
                    if u.by_ref { format!("&{name}") } else { name }
                })
                .collect();
            format!(" /* use ({}) */", names.join(", "))
        };

        let depth = self.buf.depth();
        let outer = std::mem::replace(&mut self.buf, Buffer::new());
        self.buf.indent();
        let saved = self.scope.enter_body(Scope::Function);
        self.visit_stmts(body);
        self.scope.restore(saved);
        let inner = std::mem::replace(&mut self.buf, outer);

        format!(
            "({params}) => {{{uses_comment}\n{}{}}}",
            inner.render(depth, false),
            Buffer::indentation(depth)
        )
    }

    fn match_expr(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        let subject = self.transform_expr(subject);
        let mut default = None;
        let mut branches = Vec::new();
        for arm in arms {
            let body = self.transform_expr(&arm.body);
            if arm.conditions.is_empty() {
                default = Some(body);
                continue;
            }
            let tests: Vec<String> = arm
                .conditions
                .iter()
                .map(|c| format!("{subject} === {}", self.transform_expr(c)))
                .collect();
            branches.push((tests.join(" || "), body));
        }

        let mut out = default
            .unwrap_or_else(|| throw_iife("new Error(\"UnhandledMatchError\")"));
        for (test, body) in branches.into_iter().rev() {
            out = format!("{test} ? {body} : {out}");
        }
        format!("({out})")
    }
}
