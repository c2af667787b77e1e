//! Tree-sitter based PHP reader.

use super::heredoc::lower_heredocs;
use super::strings::{decode_double, decode_single};
use crate::ast::*;
use crate::traits::{ReadError, Reader};
use std::borrow::Cow;
use tree_sitter::{Node, Parser, Tree};

/// Static instance of the PHP reader.
pub static PHP_READER: PhpReader = PhpReader;

/// PHP reader using tree-sitter.
pub struct PhpReader;

impl Reader for PhpReader {
    fn language(&self) -> &'static str {
        "php"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php"]
    }

    fn read(&self, source: &str) -> Result<Program, ReadError> {
        read_php(source)
    }
}

/// Parse PHP source into the typed AST.
///
/// Code without any `<?php` / `<?=` tag is treated as a bare PHP snippet.
/// Heredocs and nowdocs are lowered to double-quoted literals first.
pub fn read_php(source: &str) -> Result<Program, ReadError> {
    let (tagged, line_offset) = with_open_tag(source);
    let source = lower_heredocs(&tagged);

    let mut parser = Parser::new();
    parser
        .set_language(&arborium_php::language().into())
        .map_err(|err| ReadError::Language(err.to_string()))?;

    let tree = parser
        .parse(source.as_ref(), None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))?;

    let ctx = ReadContext::new(&source, line_offset);
    ctx.read_program(&tree)
}

fn with_open_tag(source: &str) -> (Cow<'_, str>, usize) {
    let tagged = source.trim_start().starts_with("<?")
        || source.contains("<?php")
        || source.contains("<?=");
    if tagged {
        (Cow::Borrowed(source), 0)
    } else {
        (Cow::Owned(format!("<?php\n{source}")), 1)
    }
}

const MAGIC_CONSTANTS: &[&str] = &[
    "__DIR__",
    "__FILE__",
    "__LINE__",
    "__CLASS__",
    "__FUNCTION__",
    "__METHOD__",
    "__NAMESPACE__",
    "__TRAIT__",
];

/// Statement kinds an unknown container may still hold.
const STATEMENT_KINDS: &[&str] = &[
    "expression_statement",
    "echo_statement",
    "return_statement",
    "if_statement",
    "while_statement",
    "do_statement",
    "for_statement",
    "foreach_statement",
    "switch_statement",
    "try_statement",
    "function_definition",
    "class_declaration",
    "compound_statement",
];

/// Node kinds that carry literal text inside interpolated strings.
const TEXT_KINDS: &[&str] = &[
    "string_content",
    "string_value",
    "escape_sequence",
    "string",
    "text",
];

/// Declarations a `/** ... */` block attaches to.
const DOC_TARGETS: &[&str] = &["function_definition", "method_declaration"];

struct ReadContext<'a> {
    source: &'a str,
    line_offset: usize,
}

fn named<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn all_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str, line_offset: usize) -> Self {
        Self {
            source,
            line_offset,
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ReadError> {
        node.child_by_field_name(name)
            .ok_or_else(|| ReadError::UnexpectedNode {
                expected: format!("`{name}` in {}", node.kind()),
                got: self.node_text(node).chars().take(40).collect(),
            })
    }

    fn syntax_error(&self, root: Node) -> ReadError {
        let Some(node) = first_error(root) else {
            return ReadError::Parse("syntax error in source".into());
        };
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let snippet: String = self
                .node_text(node)
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(24)
                .collect();
            if snippet.trim().is_empty() {
                "syntax error".to_string()
            } else {
                format!("unexpected `{}`", snippet.trim())
            }
        };
        ReadError::Syntax {
            line: (pos.row + 1).saturating_sub(self.line_offset).max(1),
            column: pos.column + 1,
            message,
        }
    }

    fn read_program(&self, tree: &Tree) -> Result<Program, ReadError> {
        let root = tree.root_node();

        if root.has_error() {
            return Err(self.syntax_error(root));
        }

        let mut body = Vec::new();
        // `namespace X;` owns every following statement up to the next namespace.
        let mut open_namespace: Option<(String, Vec<Stmt>)> = None;
        let mut short_echo = false;

        for child in all_children(root) {
            if !child.is_named() {
                continue;
            }
            if child.kind() == "namespace_definition" && child.child_by_field_name("body").is_none() {
                if let Some((name, stmts)) = open_namespace.take() {
                    body.push(Stmt::Namespace {
                        name: Some(name),
                        body: stmts,
                    });
                }
                let name = child
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default();
                open_namespace = Some((name, Vec::new()));
                continue;
            }

            let target = match open_namespace.as_mut() {
                Some((_, stmts)) => stmts,
                None => &mut body,
            };
            if child.kind() == "php_tag" {
                short_echo = self.node_text(child).starts_with("<?=");
                continue;
            }
            if let Some(stmt) = self.read_item(child)? {
                target.push(match stmt {
                    Stmt::Expr(expr) if short_echo => Stmt::Echo(vec![expr]),
                    other => other,
                });
            }
            short_echo = child.kind() == "text_interpolation"
                && named(child)
                    .iter()
                    .any(|c| c.kind() == "php_tag" && self.node_text(*c).starts_with("<?="));
        }

        if let Some((name, stmts)) = open_namespace {
            body.push(Stmt::Namespace {
                name: Some(name),
                body: stmts,
            });
        }

        Ok(Program::new(body))
    }

    /// Read one child of a statement list, handling comments.
    fn read_item(&self, node: Node) -> Result<Option<Stmt>, ReadError> {
        if node.kind() == "comment" {
            return Ok(self.read_comment(node));
        }
        self.read_stmt(node)
    }

    fn read_items<'t>(&self, nodes: impl IntoIterator<Item = Node<'t>>) -> Result<Vec<Stmt>, ReadError> {
        let mut stmts = Vec::new();
        for node in nodes {
            if !node.is_named() {
                continue;
            }
            if let Some(stmt) = self.read_item(node)? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    fn read_comment(&self, node: Node) -> Option<Stmt> {
        let text = self.node_text(node).trim_end();
        if text.starts_with("/**")
            && node
                .next_named_sibling()
                .is_some_and(|next| DOC_TARGETS.contains(&next.kind()))
        {
            return None;
        }
        let text = match text.strip_prefix('#') {
            Some(rest) => format!("//{rest}"),
            None => text.to_string(),
        };
        let trailing = node.prev_named_sibling().is_some_and(|prev| {
            !matches!(prev.kind(), "comment" | "php_tag" | "text" | "text_interpolation")
                && prev.end_position().row == node.start_position().row
        });
        Some(Stmt::Comment { text, trailing })
    }

    fn doc_comment(&self, node: Node) -> Option<String> {
        let prev = node.prev_named_sibling()?;
        let text = self.node_text(prev);
        (prev.kind() == "comment" && text.starts_with("/**")).then(|| text.to_string())
    }

    /// Statements of a body node: a block, a colon block, or a single statement.
    fn read_body(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        match node.kind() {
            "compound_statement" | "colon_block" | "declaration_list" => {
                self.read_items(all_children(node))
            }
            "empty_statement" => Ok(Vec::new()),
            _ => Ok(self.read_item(node)?.into_iter().collect()),
        }
    }

    /// Body of a loop-like statement: the `body` field, or the statements
    /// following the header when the grammar inlines the colon form.
    fn loop_body(&self, node: Node, header: usize) -> Result<Vec<Stmt>, ReadError> {
        if let Some(body) = node.child_by_field_name("body") {
            return self.read_body(body);
        }
        let mut cursor = node.walk();
        let rest: Vec<Node> = node
            .named_children(&mut cursor)
            .skip(header)
            .collect();
        match rest.as_slice() {
            [single] if single.kind() != "comment" => self.read_body(*single),
            _ => self.read_items(rest),
        }
    }

    fn read_stmt(&self, node: Node) -> Result<Option<Stmt>, ReadError> {
        let stmt = match node.kind() {
            "php_tag" | "empty_statement" => return Ok(None),
            "comment" => return Ok(self.read_comment(node)),
            "text" => Stmt::InlineHtml(self.node_text(node).to_string()),
            "text_interpolation" => {
                let text: String = named(node)
                    .into_iter()
                    .filter(|c| c.kind() == "text")
                    .map(|c| self.node_text(c))
                    .collect();
                if text.is_empty() {
                    return Ok(None);
                }
                Stmt::InlineHtml(text)
            }

            "expression_statement" => {
                let Some(inner) = named(node).into_iter().next() else {
                    return Ok(None);
                };
                match self.read_expr(inner)? {
                    Expr::Throw(value) => Stmt::Throw(*value),
                    Expr::Exit(value) => Stmt::Exit(value.map(|v| *v)),
                    expr => Stmt::Expr(expr),
                }
            }
            "echo_statement" => {
                let mut args = Vec::new();
                for child in named(node) {
                    args.extend(self.read_expr_list(child)?);
                }
                Stmt::Echo(args)
            }
            "exit_statement" => {
                let value = named(node).into_iter().next().map(|n| self.read_expr(n)).transpose()?;
                Stmt::Exit(value)
            }
            "return_statement" => {
                let value = named(node).into_iter().next().map(|n| self.read_expr(n)).transpose()?;
                Stmt::Return(value)
            }
            "break_statement" => {
                let level = named(node).into_iter().next().map(|n| self.read_expr(n)).transpose()?;
                Stmt::Break(level)
            }
            "continue_statement" => {
                let level = named(node).into_iter().next().map(|n| self.read_expr(n)).transpose()?;
                Stmt::Continue(level)
            }

            "if_statement" => Stmt::If(self.read_if(node)?),
            "while_statement" => Stmt::While {
                test: self.read_condition(node)?,
                body: self.loop_body(node, 1)?,
            },
            "do_statement" => Stmt::DoWhile {
                body: self.read_body(self.field(node, "body")?)?,
                test: self.read_condition(node)?,
            },
            "for_statement" => self.read_for(node)?,
            "foreach_statement" => self.read_foreach(node)?,
            "switch_statement" => self.read_switch(node)?,
            "try_statement" => self.read_try(node)?,
            "compound_statement" => Stmt::Block(self.read_body(node)?),

            "function_definition" => Stmt::Function(self.read_function(node)?),
            "class_declaration" => Stmt::Class(self.read_class(node, ClassKind::Class)?),
            "trait_declaration" => Stmt::Class(self.read_class(node, ClassKind::Trait)?),
            "interface_declaration" => Stmt::Interface(self.read_interface(node)?),
            "enum_declaration" => Stmt::Enum(Enum {
                name: self.node_text(self.field(node, "name")?).to_string(),
                members: self.read_members(self.field(node, "body")?)?,
            }),

            "namespace_definition" => Stmt::Namespace {
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n).to_string()),
                body: match node.child_by_field_name("body") {
                    Some(body) => self.read_body(body)?,
                    None => Vec::new(),
                },
            },
            "namespace_use_declaration" => Stmt::Use(parse_use(self.node_text(node))),
            "const_declaration" => Stmt::Const(self.read_const_elements(node)?),
            "global_declaration" => Stmt::Global(
                named(node)
                    .into_iter()
                    .map(|n| self.read_expr(n))
                    .collect::<Result<_, _>>()?,
            ),
            "function_static_declaration" => Stmt::Static(self.read_static_vars(node)?),
            "unset_statement" => Stmt::Unset(
                named(node)
                    .into_iter()
                    .map(|n| self.read_expr(n))
                    .collect::<Result<_, _>>()?,
            ),
            "declare_statement" => self.read_declare(node)?,

            kind => {
                tracing::debug!(kind, "unmodelled statement, lowering children");
                let children = self.read_items(
                    named(node)
                        .into_iter()
                        .filter(|c| STATEMENT_KINDS.contains(&c.kind())),
                )?;
                Stmt::Unknown {
                    kind: kind.to_string(),
                    children,
                }
            }
        };
        Ok(Some(stmt))
    }

    /// The `condition` of a control statement, without its parentheses.
    fn read_condition(&self, node: Node) -> Result<Expr, ReadError> {
        let cond = self.field(node, "condition")?;
        self.read_unparenthesized(cond)
    }

    fn read_unparenthesized(&self, node: Node) -> Result<Expr, ReadError> {
        if node.kind() == "parenthesized_expression" {
            if let Some(inner) = named(node).into_iter().next() {
                return self.read_expr(inner);
            }
        }
        self.read_expr(node)
    }

    fn read_if(&self, node: Node) -> Result<If, ReadError> {
        let test = self.read_condition(node)?;
        let body = match node.child_by_field_name("body") {
            Some(body) => self.read_body(body)?,
            None => {
                let cond_id = self.field(node, "condition")?.id();
                self.read_items(named(node).into_iter().filter(|c| {
                    c.id() != cond_id && !matches!(c.kind(), "else_if_clause" | "else_clause")
                }))?
            }
        };

        let mut cursor = node.walk();
        let mut clauses: Vec<Node> = node
            .children_by_field_name("alternative", &mut cursor)
            .collect();
        if clauses.is_empty() {
            clauses = named(node)
                .into_iter()
                .filter(|c| matches!(c.kind(), "else_if_clause" | "else_clause"))
                .collect();
        }

        let mut alternate = None;
        for clause in clauses.into_iter().rev() {
            match clause.kind() {
                "else_if_clause" => {
                    let inner = If {
                        test: self.read_condition(clause)?,
                        body: self.clause_body(clause, 1)?,
                        alternate: alternate.take(),
                    };
                    alternate = Some(Else::If(Box::new(inner)));
                }
                _ => {
                    let else_body = clause.child_by_field_name("body");
                    alternate = Some(match else_body {
                        // `else if` spelled as two words
                        Some(b) if b.kind() == "if_statement" => Else::If(Box::new(self.read_if(b)?)),
                        _ => Else::Block(self.clause_body(clause, 0)?),
                    });
                }
            }
        }

        Ok(If {
            test,
            body,
            alternate,
        })
    }

    fn clause_body(&self, clause: Node, header: usize) -> Result<Vec<Stmt>, ReadError> {
        self.loop_body(clause, header)
    }

    fn read_for(&self, node: Node) -> Result<Stmt, ReadError> {
        let mut sections: [Vec<Expr>; 3] = Default::default();
        let mut section = 0;
        let mut in_header = false;
        let mut header_end = 0;

        for child in all_children(node) {
            match child.kind() {
                "(" if !in_header => in_header = true,
                ";" if in_header => section = (section + 1).min(2),
                ")" if in_header => {
                    header_end = child.end_byte();
                    break;
                }
                "comment" => {}
                _ if in_header && child.is_named() => {
                    sections[section].extend(self.read_expr_list(child)?);
                }
                _ => {}
            }
        }

        let body = match node.child_by_field_name("body") {
            Some(body) => self.read_body(body)?,
            None => {
                let rest: Vec<Node> = all_children(node)
                    .into_iter()
                    .filter(|c| c.start_byte() >= header_end && c.is_named())
                    .collect();
                match rest.as_slice() {
                    [single] => self.read_body(*single)?,
                    _ => self.read_items(rest)?,
                }
            }
        };

        let [init, test, update] = sections;
        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    fn read_foreach(&self, node: Node) -> Result<Stmt, ReadError> {
        let parts = named(node);
        let (source, binding) = match parts.as_slice() {
            [source, binding, ..] => (*source, *binding),
            _ => {
                return Err(ReadError::UnexpectedNode {
                    expected: "foreach source and binding".into(),
                    got: self.node_text(node).chars().take(40).collect(),
                });
            }
        };

        let (key, value_node) = if matches!(binding.kind(), "pair" | "foreach_pair") {
            let pair = named(binding);
            match pair.as_slice() {
                [k, v] => (Some(self.read_expr(*k)?), *v),
                _ => (None, binding),
            }
        } else {
            (None, binding)
        };

        let (by_ref, value_node) = match value_node.kind() {
            "by_ref" => (
                true,
                named(value_node).into_iter().next().unwrap_or(value_node),
            ),
            _ => (false, value_node),
        };
        let value = match self.read_expr(value_node)? {
            Expr::Array(items) => array_to_pattern(items),
            other => other,
        };

        Ok(Stmt::Foreach(Foreach {
            source: self.read_expr(source)?,
            key,
            value,
            by_ref,
            body: self.loop_body(node, 2)?,
        }))
    }

    fn read_switch(&self, node: Node) -> Result<Stmt, ReadError> {
        let test = self.read_condition(node)?;
        let block = match node.child_by_field_name("body") {
            Some(b) => b,
            None => named(node)
                .into_iter()
                .find(|c| c.kind() == "switch_block")
                .ok_or_else(|| ReadError::UnexpectedNode {
                    expected: "switch_block".into(),
                    got: node.kind().into(),
                })?,
        };

        let mut cases = Vec::new();
        for arm in named(block) {
            match arm.kind() {
                "case_statement" => {
                    let value = match arm.child_by_field_name("value") {
                        Some(v) => v,
                        None => named(arm).into_iter().next().ok_or_else(|| {
                            ReadError::UnexpectedNode {
                                expected: "case value".into(),
                                got: "nothing".into(),
                            }
                        })?,
                    };
                    let value_id = value.id();
                    cases.push(Case {
                        test: Some(self.read_expr(value)?),
                        body: self.read_items(
                            all_children(arm).into_iter().filter(|c| c.id() != value_id),
                        )?,
                    });
                }
                "default_statement" => cases.push(Case {
                    test: None,
                    body: self.read_items(all_children(arm))?,
                }),
                _ => {}
            }
        }

        Ok(Stmt::Switch { test, cases })
    }

    fn read_try(&self, node: Node) -> Result<Stmt, ReadError> {
        let body = self.read_body(self.field(node, "body")?)?;
        let mut catches = Vec::new();
        let mut finally = None;

        for clause in named(node) {
            match clause.kind() {
                "catch_clause" => {
                    let types = match clause.child_by_field_name("type") {
                        Some(t) if t.kind() == "type_list" => named(t)
                            .into_iter()
                            .map(|n| normalize_type(self.node_text(n)))
                            .collect(),
                        Some(t) => vec![normalize_type(self.node_text(t))],
                        None => Vec::new(),
                    };
                    let var = clause
                        .child_by_field_name("name")
                        .map(|n| variable_name(self.node_text(n)));
                    catches.push(Catch {
                        types,
                        var,
                        body: self.read_body(self.field(clause, "body")?)?,
                    });
                }
                "finally_clause" => {
                    finally = Some(self.read_body(self.field(clause, "body")?)?);
                }
                _ => {}
            }
        }

        Ok(Stmt::Try {
            body,
            catches,
            finally,
        })
    }

    fn read_function(&self, node: Node) -> Result<Function, ReadError> {
        Ok(Function {
            name: self.node_text(self.field(node, "name")?).to_string(),
            params: self.read_params(self.field(node, "parameters")?)?,
            body: self.read_body(self.field(node, "body")?)?,
            doc: self.doc_comment(node),
        })
    }

    fn read_params(&self, node: Node) -> Result<Vec<Param>, ReadError> {
        let mut params = Vec::new();
        for child in named(node) {
            let (variadic, promoted) = match child.kind() {
                "simple_parameter" => (false, false),
                "variadic_parameter" => (true, false),
                "property_promotion_parameter" => (false, true),
                _ => continue,
            };
            let mut name_node = self.field(child, "name")?;
            let mut by_ref = all_children(child)
                .iter()
                .any(|c| matches!(c.kind(), "reference_modifier" | "&"));
            if name_node.kind() == "by_ref" {
                by_ref = true;
                name_node = named(name_node).into_iter().next().unwrap_or(name_node);
            }
            let default = child
                .child_by_field_name("default_value")
                .map(|d| self.read_expr(d))
                .transpose()?;
            params.push(Param {
                name: variable_name(self.node_text(name_node)),
                default,
                variadic,
                by_ref,
                promoted,
            });
        }
        Ok(params)
    }

    fn class_names(&self, clause: Node) -> Vec<String> {
        named(clause)
            .into_iter()
            .filter(|c| matches!(c.kind(), "name" | "qualified_name"))
            .map(|c| self.node_text(c).to_string())
            .collect()
    }

    fn read_class(&self, node: Node, kind: ClassKind) -> Result<Class, ReadError> {
        let mut extends = None;
        let mut implements = Vec::new();
        for child in named(node) {
            match child.kind() {
                "base_clause" => extends = self.class_names(child).into_iter().next(),
                "class_interface_clause" => implements = self.class_names(child),
                _ => {}
            }
        }
        Ok(Class {
            kind,
            name: self.node_text(self.field(node, "name")?).to_string(),
            extends,
            implements,
            members: self.read_members(self.field(node, "body")?)?,
        })
    }

    fn read_interface(&self, node: Node) -> Result<Interface, ReadError> {
        let extends = named(node)
            .into_iter()
            .filter(|c| c.kind() == "base_clause")
            .flat_map(|c| self.class_names(c))
            .collect();
        let mut methods = Vec::new();
        let mut constants = Vec::new();
        for member in self.read_members(self.field(node, "body")?)? {
            match member {
                Member::Method(method) => methods.push(method),
                Member::Const(items) => constants.extend(items),
                _ => {}
            }
        }
        Ok(Interface {
            name: self.node_text(self.field(node, "name")?).to_string(),
            extends,
            methods,
            constants,
        })
    }

    fn has_modifier(&self, node: Node, kind: &str) -> bool {
        all_children(node).iter().any(|c| c.kind() == kind)
    }

    fn read_members(&self, list: Node) -> Result<Vec<Member>, ReadError> {
        let mut members = Vec::new();
        for child in all_children(list) {
            if !child.is_named() {
                continue;
            }
            match child.kind() {
                "comment" => {
                    if let Some(Stmt::Comment { text, .. }) = self.read_comment(child) {
                        members.push(Member::Comment(text));
                    }
                }
                "property_declaration" => {
                    let is_static = self.has_modifier(child, "static_modifier");
                    for element in named(child)
                        .into_iter()
                        .filter(|c| c.kind() == "property_element")
                    {
                        members.push(Member::Property(self.read_property(element, is_static)?));
                    }
                }
                "const_declaration" => {
                    members.push(Member::Const(self.read_const_elements(child)?));
                }
                "method_declaration" => {
                    let body = child
                        .child_by_field_name("body")
                        .map(|b| self.read_body(b))
                        .transpose()?;
                    members.push(Member::Method(Method {
                        name: self.node_text(self.field(child, "name")?).to_string(),
                        params: self.read_params(self.field(child, "parameters")?)?,
                        body,
                        is_static: self.has_modifier(child, "static_modifier"),
                        doc: self.doc_comment(child),
                    }));
                }
                "use_declaration" => members.push(Member::TraitUse(self.class_names(child))),
                "enum_case" => {
                    let name = self.node_text(self.field(child, "name")?).to_string();
                    let value = match child.child_by_field_name("value") {
                        Some(v) => Some(self.read_expr(v)?),
                        None => named(child)
                            .into_iter()
                            .nth(1)
                            .map(|v| self.read_expr(v))
                            .transpose()?,
                    };
                    members.push(Member::Case(EnumCase { name, value }));
                }
                "attribute_list" => {}
                kind => members.push(Member::Unknown(kind.to_string())),
            }
        }
        Ok(members)
    }

    fn read_property(&self, element: Node, is_static: bool) -> Result<Property, ReadError> {
        let parts = named(element);
        let name_node = element
            .child_by_field_name("name")
            .or_else(|| parts.iter().copied().find(|c| c.kind() == "variable_name"))
            .ok_or_else(|| ReadError::UnexpectedNode {
                expected: "property name".into(),
                got: self.node_text(element).into(),
            })?;
        let value_node = element
            .child_by_field_name("default_value")
            .or_else(|| parts.iter().copied().find(|c| c.id() != name_node.id()))
            .map(|c| {
                if c.kind() == "property_initializer" {
                    named(c).into_iter().next().unwrap_or(c)
                } else {
                    c
                }
            });
        Ok(Property {
            name: variable_name(self.node_text(name_node)),
            value: value_node.map(|v| self.read_expr(v)).transpose()?,
            is_static,
        })
    }

    fn read_const_elements(&self, node: Node) -> Result<Vec<ConstItem>, ReadError> {
        let mut items = Vec::new();
        for element in named(node)
            .into_iter()
            .filter(|c| c.kind() == "const_element")
        {
            let parts = named(element);
            if let [name, .., value] = parts.as_slice() {
                items.push(ConstItem {
                    name: self.node_text(*name).to_string(),
                    value: self.read_expr(*value)?,
                });
            }
        }
        Ok(items)
    }

    fn read_static_vars(&self, node: Node) -> Result<Vec<StaticVar>, ReadError> {
        let mut vars = Vec::new();
        for decl in named(node)
            .into_iter()
            .filter(|c| c.kind() == "static_variable_declaration")
        {
            let parts = named(decl);
            let name_node = match decl.child_by_field_name("name") {
                Some(n) => n,
                None => match parts.first() {
                    Some(n) => *n,
                    None => continue,
                },
            };
            let value_node = decl
                .child_by_field_name("value")
                .or_else(|| parts.get(1).copied());
            vars.push(StaticVar {
                name: variable_name(self.node_text(name_node)),
                value: value_node.map(|v| self.read_expr(v)).transpose()?,
            });
        }
        Ok(vars)
    }

    fn read_declare(&self, node: Node) -> Result<Stmt, ReadError> {
        let mut directives = Vec::new();
        let mut body = Vec::new();
        for child in named(node) {
            if child.kind() == "declare_directive" {
                let text = self.node_text(child);
                let (key, value) = text.split_once('=').unwrap_or((text, ""));
                directives.push((key.trim().to_string(), value.trim().to_string()));
            } else {
                body.extend(self.read_body(child)?);
            }
        }
        Ok(Stmt::Declare { directives, body })
    }

    /// Expressions of a comma sequence, flattened.
    fn read_expr_list(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        if node.kind() == "sequence_expression" {
            let mut out = Vec::new();
            for child in named(node) {
                out.extend(self.read_expr_list(child)?);
            }
            Ok(out)
        } else {
            Ok(vec![self.read_expr(node)?])
        }
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        match node.kind() {
            "parenthesized_expression" => match named(node).into_iter().next() {
                Some(inner) => Ok(Expr::Paren(Box::new(self.read_expr(inner)?))),
                None => Ok(Expr::Unknown("parenthesized_expression".into())),
            },

            // Names and variables
            "variable_name" => Ok(Expr::Variable(variable_name(self.node_text(node)))),
            "name" => Ok(self.read_name(self.node_text(node))),
            "qualified_name" | "namespace_name" => Ok(Expr::Name(self.node_text(node).to_string())),
            "relative_scope" => Ok(match self.node_text(node).to_ascii_lowercase().as_str() {
                "parent" => Expr::ParentRef,
                "static" => Expr::StaticRef,
                _ => Expr::SelfRef,
            }),

            // Literals
            "integer" | "float" => Ok(Expr::Number(self.node_text(node).to_string())),
            "boolean" => Ok(Expr::Bool(self.node_text(node).eq_ignore_ascii_case("true"))),
            "null" => Ok(Expr::Null),
            "string" => Ok(self.read_string(node)),
            "encapsed_string" => self.read_encapsed(node),

            // Operators
            "binary_expression" => {
                let op = match node.child_by_field_name("operator") {
                    Some(op) => self.node_text(op),
                    None => self.anonymous_token(node).unwrap_or(""),
                };
                Ok(Expr::binary(
                    self.read_expr(self.field(node, "left")?)?,
                    op.to_ascii_lowercase(),
                    self.read_expr(self.field(node, "right")?)?,
                ))
            }
            "unary_op_expression" => {
                let op = match node.child_by_field_name("operator") {
                    Some(op) => self.node_text(op),
                    None => self.anonymous_token(node).unwrap_or(""),
                };
                let operand = match node.child_by_field_name("argument") {
                    Some(arg) => arg,
                    None => self.last_named(node)?,
                };
                let operand = Box::new(self.read_expr(operand)?);
                Ok(if op == "@" {
                    Expr::Suppress(operand)
                } else {
                    Expr::Unary {
                        op: op.to_string(),
                        operand,
                    }
                })
            }
            "error_suppression_expression" => {
                Ok(Expr::Suppress(Box::new(self.read_expr(self.last_named(node)?)?)))
            }
            "update_expression" => {
                let children = all_children(node);
                let prefix = children
                    .first()
                    .is_some_and(|c| matches!(c.kind(), "++" | "--"));
                let op = children
                    .iter()
                    .find(|c| matches!(c.kind(), "++" | "--"))
                    .map(|c| c.kind())
                    .unwrap_or("++");
                Ok(Expr::Update {
                    op: op.to_string(),
                    prefix,
                    operand: Box::new(self.read_expr(self.last_named(node)?)?),
                })
            }
            "assignment_expression" => {
                let left = self.field(node, "left")?;
                let target = match self.read_expr(left)? {
                    Expr::Array(items) => array_to_pattern(items),
                    other => other,
                };
                Ok(Expr::Assign {
                    target: Box::new(target),
                    op: "=".into(),
                    value: Box::new(self.read_expr(self.field(node, "right")?)?),
                })
            }
            "reference_assignment_expression" => Ok(Expr::AssignRef {
                target: Box::new(self.read_expr(self.field(node, "left")?)?),
                value: Box::new(self.read_expr(self.field(node, "right")?)?),
            }),
            "augmented_assignment_expression" => {
                let op = match node.child_by_field_name("operator") {
                    Some(op) => self.node_text(op),
                    None => self.anonymous_token(node).unwrap_or("="),
                };
                Ok(Expr::Assign {
                    target: Box::new(self.read_expr(self.field(node, "left")?)?),
                    op: op.to_string(),
                    value: Box::new(self.read_expr(self.field(node, "right")?)?),
                })
            }
            "conditional_expression" => Ok(Expr::Ternary {
                test: Box::new(self.read_expr(self.field(node, "condition")?)?),
                consequent: node
                    .child_by_field_name("body")
                    .map(|b| self.read_expr(b).map(Box::new))
                    .transpose()?,
                alternate: Box::new(self.read_expr(self.field(node, "alternative")?)?),
            }),
            "cast_expression" => {
                let kind = match node.child_by_field_name("type") {
                    Some(t) => self.node_text(t),
                    None => named(node)
                        .first()
                        .map(|t| self.node_text(*t))
                        .unwrap_or(""),
                };
                let value = match node.child_by_field_name("value") {
                    Some(v) => v,
                    None => self.last_named(node)?,
                };
                Ok(Expr::Cast {
                    kind: kind.trim_matches(|c| c == '(' || c == ')').trim().to_string(),
                    expr: Box::new(self.read_expr(value)?),
                })
            }
            "sequence_expression" => {
                let parts = named(node);
                match parts.as_slice() {
                    [left, right] => Ok(Expr::binary(
                        self.read_expr(*left)?,
                        ",",
                        self.read_expr(*right)?,
                    )),
                    _ => Ok(Expr::Unknown("sequence_expression".into())),
                }
            }

            // Keyword expressions
            "clone_expression" => Ok(Expr::Clone(Box::new(self.read_expr(self.last_named(node)?)?))),
            "print_intrinsic" => Ok(Expr::Print(Box::new(self.read_expr(self.last_named(node)?)?))),
            "throw_expression" => Ok(Expr::Throw(Box::new(self.read_expr(self.last_named(node)?)?))),
            "exit_statement" => Ok(Expr::Exit(
                named(node)
                    .into_iter()
                    .next()
                    .map(|n| self.read_expr(n).map(Box::new))
                    .transpose()?,
            )),
            "include_expression" | "include_once_expression" | "require_expression"
            | "require_once_expression" => {
                let kind = match node.kind() {
                    "include_expression" => IncludeKind::Include,
                    "include_once_expression" => IncludeKind::IncludeOnce,
                    "require_expression" => IncludeKind::Require,
                    _ => IncludeKind::RequireOnce,
                };
                Ok(Expr::Include {
                    kind,
                    target: Box::new(self.read_expr(self.last_named(node)?)?),
                })
            }

            // Calls and access
            "function_call_expression" => self.read_function_call(node),
            "member_call_expression" | "nullsafe_member_call_expression" => {
                let callee = Expr::Member {
                    object: Box::new(self.read_expr(self.field(node, "object")?)?),
                    property: self.read_member_name(self.field(node, "name")?)?,
                    nullsafe: node.kind().starts_with("nullsafe"),
                };
                Ok(Expr::Call {
                    callee: Box::new(callee),
                    args: self.read_arguments(self.field(node, "arguments")?)?,
                })
            }
            "member_access_expression" | "nullsafe_member_access_expression" => Ok(Expr::Member {
                object: Box::new(self.read_expr(self.field(node, "object")?)?),
                property: self.read_member_name(self.field(node, "name")?)?,
                nullsafe: node.kind().starts_with("nullsafe"),
            }),
            "scoped_call_expression" => {
                let callee = Expr::StaticMember {
                    scope: Box::new(self.read_expr(self.field(node, "scope")?)?),
                    member: self.read_member_name(self.field(node, "name")?)?,
                };
                Ok(Expr::Call {
                    callee: Box::new(callee),
                    args: self.read_arguments(self.field(node, "arguments")?)?,
                })
            }
            "scoped_property_access_expression" => {
                let name = self.field(node, "name")?;
                let member = match name.kind() {
                    "variable_name" => MemberName::Ident(variable_name(self.node_text(name))),
                    _ => self.read_member_name(name)?,
                };
                Ok(Expr::StaticMember {
                    scope: Box::new(self.read_expr(self.field(node, "scope")?)?),
                    member,
                })
            }
            "class_constant_access_expression" => {
                let parts = named(node);
                match parts.as_slice() {
                    [scope, .., name] => Ok(Expr::StaticMember {
                        scope: Box::new(self.read_expr(*scope)?),
                        member: MemberName::Ident(self.node_text(*name).to_string()),
                    }),
                    _ => Ok(Expr::Unknown(node.kind().into())),
                }
            }
            "subscript_expression" => {
                let parts = named(node);
                match parts.as_slice() {
                    [object] => Ok(Expr::Index {
                        object: Box::new(self.read_expr(*object)?),
                        index: None,
                    }),
                    [object, index, ..] => Ok(Expr::index(
                        self.read_expr(*object)?,
                        self.read_expr(*index)?,
                    )),
                    [] => Ok(Expr::Unknown(node.kind().into())),
                }
            }
            "object_creation_expression" => self.read_new(node),

            // Compound literals
            "array_creation_expression" => Ok(Expr::Array(self.read_array_items(node)?)),
            "list_literal" => Ok(Expr::List(self.read_list_items(node)?)),
            "by_ref" => self.read_expr(self.last_named(node)?),
            "variadic_unpacking" => Ok(Expr::Spread(Box::new(self.read_expr(self.last_named(node)?)?))),
            "argument" => self.read_argument(node),

            // Functions
            "anonymous_function" | "anonymous_function_creation_expression" => {
                let mut uses = Vec::new();
                for clause in named(node)
                    .into_iter()
                    .filter(|c| c.kind() == "anonymous_function_use_clause")
                {
                    for var in named(clause) {
                        let by_ref = var.kind() == "by_ref";
                        uses.push(ClosureUse {
                            name: variable_name(self.node_text(var).trim_start_matches('&').trim()),
                            by_ref,
                        });
                    }
                }
                Ok(Expr::Closure {
                    params: self.read_params(self.field(node, "parameters")?)?,
                    uses,
                    body: self.read_body(self.field(node, "body")?)?,
                })
            }
            "arrow_function" => Ok(Expr::ArrowFn {
                params: self.read_params(self.field(node, "parameters")?)?,
                body: Box::new(self.read_expr(self.field(node, "body")?)?),
            }),
            "match_expression" => self.read_match(node),

            kind => {
                tracing::debug!(kind, "unmodelled expression");
                Ok(Expr::Unknown(kind.to_string()))
            }
        }
    }

    fn read_name(&self, text: &str) -> Expr {
        if MAGIC_CONSTANTS.contains(&text) {
            return Expr::MagicConst(text.to_string());
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "null" => Expr::Null,
            _ => Expr::Name(text.to_string()),
        }
    }

    fn anonymous_token(&self, node: Node) -> Option<&'a str> {
        all_children(node)
            .into_iter()
            .find(|c| !c.is_named())
            .map(|c| self.node_text(c).trim())
    }

    fn last_named<'t>(&self, node: Node<'t>) -> Result<Node<'t>, ReadError> {
        named(node)
            .into_iter()
            .last()
            .ok_or_else(|| ReadError::UnexpectedNode {
                expected: format!("operand of {}", node.kind()),
                got: "nothing".into(),
            })
    }

    fn read_member_name(&self, node: Node) -> Result<MemberName, ReadError> {
        Ok(match node.kind() {
            "name" | "reserved_identifier" => MemberName::Ident(self.node_text(node).to_string()),
            _ => MemberName::Dynamic(Box::new(self.read_expr(node)?)),
        })
    }

    fn read_function_call(&self, node: Node) -> Result<Expr, ReadError> {
        let function = self.field(node, "function")?;
        let args = self.read_arguments(self.field(node, "arguments")?)?;
        if function.kind() == "name" {
            match self.node_text(function).to_ascii_lowercase().as_str() {
                "isset" => return Ok(Expr::Isset(args)),
                "empty" => {
                    if let Some(arg) = args.into_iter().next() {
                        return Ok(Expr::Empty(Box::new(arg)));
                    }
                    return Ok(Expr::Unknown("empty".into()));
                }
                "exit" | "die" => return Ok(Expr::Exit(args.into_iter().next().map(Box::new))),
                _ => {}
            }
        }
        Ok(Expr::call(self.read_expr(function)?, args))
    }

    fn read_arguments(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        named(node)
            .into_iter()
            .map(|arg| self.read_expr(arg))
            .collect()
    }

    /// A call argument; named arguments keep only their value.
    fn read_argument(&self, node: Node) -> Result<Expr, ReadError> {
        self.read_expr(self.last_named(node)?)
    }

    fn read_new(&self, node: Node) -> Result<Expr, ReadError> {
        let mut class = None;
        let mut args = Vec::new();
        for child in named(node) {
            match child.kind() {
                "arguments" => args = self.read_arguments(child)?,
                "anonymous_class" => return Ok(Expr::Unknown("anonymous_class".into())),
                _ if class.is_none() => class = Some(self.read_expr(child)?),
                _ => {}
            }
        }
        let class = class.ok_or_else(|| ReadError::UnexpectedNode {
            expected: "class name after `new`".into(),
            got: self.node_text(node).into(),
        })?;
        Ok(Expr::New {
            class: Box::new(class),
            args,
        })
    }

    fn read_array_element(&self, node: Node) -> Result<ArrayItem, ReadError> {
        let children = all_children(node);
        let has_arrow = children.iter().any(|c| c.kind() == "=>");
        let parts = named(node);
        let mut item = match (has_arrow, parts.as_slice()) {
            (true, [key, .., value]) => {
                ArrayItem::keyed(self.read_expr(*key)?, self.read_expr(*value)?)
            }
            (_, [.., value]) => ArrayItem::value(self.read_expr(*value)?),
            (_, []) => ArrayItem::value(Expr::Unknown(node.kind().into())),
        };
        item.by_ref = children.iter().any(|c| c.kind() == "&")
            || parts.last().is_some_and(|v| v.kind() == "by_ref");
        if let Expr::Spread(inner) = item.value {
            item.value = *inner;
            item.spread = true;
        }
        Ok(item)
    }

    fn read_array_items(&self, node: Node) -> Result<Vec<ArrayItem>, ReadError> {
        let mut items = Vec::new();
        for child in named(node) {
            if child.kind() == "array_element_initializer" {
                items.push(self.read_array_element(child)?);
            } else {
                items.push(ArrayItem::value(self.read_expr(child)?));
            }
        }
        Ok(items)
    }

    /// Destructuring slots; `None` marks a skipped position (`[$a, , $c]`).
    fn read_list_items(&self, node: Node) -> Result<Vec<Option<ArrayItem>>, ReadError> {
        let mut slots = Vec::new();
        let mut segment: Vec<Node> = Vec::new();
        let mut keyed = false;

        let flush = |segment: &mut Vec<Node>, keyed: &mut bool| -> Result<Option<ArrayItem>, ReadError> {
            let slot = match (segment.as_slice(), *keyed) {
                ([], _) => None,
                ([single], false) if single.kind() == "array_element_initializer" => {
                    Some(self.read_array_element(*single)?)
                }
                ([key, .., value], true) => Some(ArrayItem::keyed(
                    self.read_expr(*key)?,
                    self.read_pattern(*value)?,
                )),
                ([.., value], false) => Some(ArrayItem::value(self.read_pattern(*value)?)),
                ([_], true) => None,
            };
            segment.clear();
            *keyed = false;
            Ok(slot.map(|mut item| {
                if let Expr::List(_) = item.value {
                    return item;
                }
                if let Expr::Array(inner) = item.value {
                    item.value = array_to_pattern(inner);
                }
                item
            }))
        };

        for child in all_children(node) {
            match child.kind() {
                "list" | "(" | ")" | "[" | "]" | "comment" => {}
                "," => slots.push(flush(&mut segment, &mut keyed)?),
                "=>" => keyed = true,
                _ if child.is_named() => segment.push(child),
                _ => {}
            }
        }
        if !segment.is_empty() {
            slots.push(flush(&mut segment, &mut keyed)?);
        }
        Ok(slots)
    }

    fn read_pattern(&self, node: Node) -> Result<Expr, ReadError> {
        Ok(match self.read_expr(node)? {
            Expr::Array(items) => array_to_pattern(items),
            other => other,
        })
    }

    fn read_match(&self, node: Node) -> Result<Expr, ReadError> {
        let subject = self.read_condition(node)?;
        let block = self.field(node, "body")?;
        let mut arms = Vec::new();
        for arm in named(block) {
            let body_node = match arm.child_by_field_name("return_expression") {
                Some(b) => b,
                None => self.last_named(arm)?,
            };
            let body = self.read_expr(body_node)?;
            match arm.kind() {
                "match_conditional_expression" => {
                    let conditions = match arm.child_by_field_name("conditional_expressions") {
                        Some(list) => named(list)
                            .into_iter()
                            .map(|c| self.read_expr(c))
                            .collect::<Result<_, _>>()?,
                        None => Vec::new(),
                    };
                    arms.push(MatchArm { conditions, body });
                }
                "match_default_expression" => arms.push(MatchArm {
                    conditions: Vec::new(),
                    body,
                }),
                _ => {}
            }
        }
        Ok(Expr::Match {
            subject: Box::new(subject),
            arms,
        })
    }

    fn read_string(&self, node: Node) -> Expr {
        let text = self.node_text(node);
        let text = text.strip_prefix(['b', 'B']).unwrap_or(text);
        if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            Expr::single(decode_single(inner))
        } else if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            Expr::double(decode_double(inner))
        } else {
            Expr::double(decode_double(text))
        }
    }

    fn read_encapsed(&self, node: Node) -> Result<Expr, ReadError> {
        let text = self.node_text(node);
        let open = text.find('"').map(|i| i + 1).unwrap_or(0);
        let start = node.start_byte() + open;
        let end = node.end_byte().saturating_sub(1).max(start);
        self.read_fragments(node, start, end)
    }

    /// Split an interpolating string region into text and expression fragments.
    fn read_fragments(
        &self,
        node: Node,
        start: usize,
        end: usize,
    ) -> Result<Expr, ReadError> {
        let mut fragments = Vec::new();
        let mut pos = start;

        let push_text = |raw: &str, fragments: &mut Vec<Fragment>| {
            let text = decode_double(raw);
            if !text.is_empty() {
                fragments.push(Fragment::Text(text));
            }
        };

        for child in named(node) {
            if TEXT_KINDS.contains(&child.kind()) || child.start_byte() < pos {
                continue;
            }
            let mut raw = self.source.get(pos..child.start_byte()).unwrap_or("");
            let mut after = child.end_byte();
            let mut dollar_brace = false;
            if let Some(stripped) = raw.strip_suffix("${") {
                raw = stripped;
                dollar_brace = true;
            } else if let Some(stripped) = raw.strip_suffix('{') {
                raw = stripped;
            }
            if raw.len() < child.start_byte() - pos && self.source[after..].starts_with('}') {
                after += 1;
            }
            push_text(raw, &mut fragments);
            let expr = match (dollar_brace, child.kind()) {
                (true, "name") => Expr::Variable(self.node_text(child).to_string()),
                _ => self.read_expr(child)?,
            };
            fragments.push(Fragment::Expr(expr));
            pos = after;
        }
        if pos < end {
            push_text(self.source.get(pos..end).unwrap_or(""), &mut fragments);
        }

        if fragments.iter().all(|f| matches!(f, Fragment::Text(_))) {
            let value: String = fragments
                .into_iter()
                .filter_map(|f| match f {
                    Fragment::Text(t) => Some(t),
                    Fragment::Expr(_) => None,
                })
                .collect();
            return Ok(Expr::double(value));
        }
        Ok(Expr::Interpolated(fragments))
    }
}

/// `$name` → `name`.
fn variable_name(text: &str) -> String {
    text.trim().trim_start_matches('&').trim_start_matches('$').to_string()
}

fn normalize_type(text: &str) -> String {
    text.trim().trim_start_matches('\\').to_string()
}

/// Reinterpret an array literal on the left of `=` as a destructuring pattern.
fn array_to_pattern(items: Vec<ArrayItem>) -> Expr {
    Expr::List(
        items
            .into_iter()
            .map(|mut item| {
                if let Expr::Array(inner) = item.value {
                    item.value = array_to_pattern(inner);
                }
                Some(item)
            })
            .collect(),
    )
}

/// Parse the text of a `use` import declaration.
///
/// Handles aliases (`use A\B as C;`) and groups (`use A\{B, C as D};`).
fn parse_use(text: &str) -> Vec<UseItem> {
    let body = text.trim().trim_end_matches(';').trim();
    let body = strip_keyword(body, "use");
    let body = strip_keyword(strip_keyword(body, "function"), "const");

    let (prefix, list) = match (body.find('{'), body.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            body[..open].trim().trim_end_matches('\\'),
            &body[open + 1..close],
        ),
        _ => ("", body),
    };

    list.split(',')
        .filter_map(|clause| {
            let clause = strip_keyword(strip_keyword(clause.trim(), "function"), "const");
            let tokens: Vec<&str> = clause.split_whitespace().collect();
            let (path, alias) = match tokens.as_slice() {
                [] => return None,
                [path, as_kw, alias] if as_kw.eq_ignore_ascii_case("as") => (*path, Some(*alias)),
                [path, ..] => (*path, None),
            };
            let path = path.trim_start_matches('\\');
            let path = if prefix.is_empty() {
                path.to_string()
            } else {
                format!("{}\\{path}", prefix.trim_start_matches('\\'))
            };
            Some(UseItem {
                path,
                alias: alias.map(str::to_string),
            })
        })
        .collect()
}

fn strip_keyword<'s>(text: &'s str, keyword: &str) -> &'s str {
    match text.get(..keyword.len()) {
        Some(head)
            if head.eq_ignore_ascii_case(keyword)
                && text[keyword.len()..].starts_with(char::is_whitespace) =>
        {
            text[keyword.len()..].trim_start()
        }
        _ => text,
    }
}
