//! Typed PHP syntax tree.
//!
//! The reader lowers tree-sitter's untyped nodes into this closed set of
//! kinds. Anything outside the set survives as an `Unknown` variant that keeps
//! the original node kind so the emitter can degrade instead of failing.

/// A parsed PHP file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Echo(Vec<Expr>),
    Return(Option<Expr>),
    If(If),
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        test: Expr,
    },
    For {
        init: Vec<Expr>,
        test: Vec<Expr>,
        update: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Foreach(Foreach),
    Switch {
        test: Expr,
        cases: Vec<Case>,
    },
    Break(Option<Expr>),
    Continue(Option<Expr>),
    Try {
        body: Vec<Stmt>,
        catches: Vec<Catch>,
        finally: Option<Vec<Stmt>>,
    },
    Throw(Expr),
    Exit(Option<Expr>),
    Function(Function),
    Class(Class),
    Interface(Interface),
    Enum(Enum),
    Namespace {
        name: Option<String>,
        body: Vec<Stmt>,
    },
    Use(Vec<UseItem>),
    Const(Vec<ConstItem>),
    Global(Vec<Expr>),
    Static(Vec<StaticVar>),
    Unset(Vec<Expr>),
    Declare {
        directives: Vec<(String, String)>,
        body: Vec<Stmt>,
    },
    InlineHtml(String),
    /// Source comment. `trailing` comments share a line with the previous
    /// statement.
    Comment {
        text: String,
        trailing: bool,
    },
    Block(Vec<Stmt>),
    Noop,
    /// A statement kind the reader does not model. Children are the
    /// statements the reader could still lower from inside it.
    Unknown {
        kind: String,
        children: Vec<Stmt>,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn echo(args: Vec<Expr>) -> Self {
        Stmt::Echo(args)
    }

    pub fn if_stmt(test: Expr, body: Vec<Stmt>, alternate: Option<Else>) -> Self {
        Stmt::If(If {
            test,
            body,
            alternate,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub test: Expr,
    pub body: Vec<Stmt>,
    pub alternate: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    If(Box<If>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Foreach {
    pub source: Expr,
    pub key: Option<Expr>,
    pub value: Expr,
    pub by_ref: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// `None` marks the `default` arm.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub types: Vec<String>,
    pub var: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub variadic: bool,
    pub by_ref: bool,
    /// Constructor property promotion (`public function __construct(private $x)`).
    pub promoted: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            variadic: false,
            by_ref: false,
            promoted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub doc: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
            doc: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Trait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub kind: ClassKind,
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Property(Property),
    Const(Vec<ConstItem>),
    Method(Method),
    TraitUse(Vec<String>),
    Case(EnumCase),
    Comment(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Option<Expr>,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for abstract and interface methods.
    pub body: Option<Vec<Stmt>>,
    pub is_static: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<Method>,
    pub constants: Vec<ConstItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstItem {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticVar {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseItem {
    pub path: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

impl IncludeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IncludeKind::Include => "include",
            IncludeKind::IncludeOnce => "include_once",
            IncludeKind::Require => "require",
            IncludeKind::RequireOnce => "require_once",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub by_ref: bool,
    pub spread: bool,
}

impl ArrayItem {
    pub fn value(value: Expr) -> Self {
        Self {
            key: None,
            value,
            by_ref: false,
            spread: false,
        }
    }

    pub fn keyed(key: Expr, value: Expr) -> Self {
        Self {
            key: Some(key),
            value,
            by_ref: false,
            spread: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    /// Empty for the `default` arm.
    pub conditions: Vec<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberName {
    Ident(String),
    Dynamic(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `$name`, stored without the sigil.
    Variable(String),
    /// Bare or qualified name as written (`strlen`, `\Foo\Bar`).
    Name(String),
    String {
        value: String,
        double_quoted: bool,
    },
    Interpolated(Vec<Fragment>),
    Number(String),
    Bool(bool),
    Null,
    MagicConst(String),
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Suppress(Box<Expr>),
    Update {
        op: String,
        prefix: bool,
        operand: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: String,
        value: Box<Expr>,
    },
    AssignRef {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        test: Box<Expr>,
        /// `None` for the short form `a ?: b`.
        consequent: Option<Box<Expr>>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Spread(Box<Expr>),
    Member {
        object: Box<Expr>,
        property: MemberName,
        nullsafe: bool,
    },
    StaticMember {
        scope: Box<Expr>,
        member: MemberName,
    },
    Index {
        object: Box<Expr>,
        index: Option<Box<Expr>>,
    },
    Array(Vec<ArrayItem>),
    List(Vec<Option<ArrayItem>>),
    New {
        class: Box<Expr>,
        args: Vec<Expr>,
    },
    Closure {
        params: Vec<Param>,
        uses: Vec<ClosureUse>,
        body: Vec<Stmt>,
    },
    ArrowFn {
        params: Vec<Param>,
        body: Box<Expr>,
    },
    Isset(Vec<Expr>),
    Empty(Box<Expr>),
    Cast {
        kind: String,
        expr: Box<Expr>,
    },
    Clone(Box<Expr>),
    Print(Box<Expr>),
    Exit(Option<Box<Expr>>),
    Include {
        kind: IncludeKind,
        target: Box<Expr>,
    },
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Throw(Box<Expr>),
    SelfRef,
    ParentRef,
    StaticRef,
    Paren(Box<Expr>),
    Unknown(String),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Number(text.into())
    }

    pub fn single(value: impl Into<String>) -> Self {
        Expr::String {
            value: value.into(),
            double_quoted: false,
        }
    }

    pub fn double(value: impl Into<String>) -> Self {
        Expr::String {
            value: value.into(),
            double_quoted: true,
        }
    }

    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            op: "=".into(),
            value: Box::new(value),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: MemberName::Ident(property.into()),
            nullsafe: false,
        }
    }

    pub fn static_member(scope: Expr, member: impl Into<String>) -> Self {
        Expr::StaticMember {
            scope: Box::new(scope),
            member: MemberName::Ident(member.into()),
        }
    }

    pub fn index(object: Expr, index: Expr) -> Self {
        Expr::Index {
            object: Box::new(object),
            index: Some(Box::new(index)),
        }
    }

    /// Unwrap redundant parentheses.
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren(inner) => inner.unparen(),
            other => other,
        }
    }
}
