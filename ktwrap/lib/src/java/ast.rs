//! Owned Java declaration, statement and expression model.
//!
//! Everything here is produced by [`crate::java::lower`] from a tree-sitter
//! tree and holds no reference to the tree or the source buffer, so parsed
//! units can be cached, cloned and shared freely.

use std::path::PathBuf;

/// One parsed `.java` file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Absolute path of the file on disk.
    pub path: PathBuf,
    /// The source root the file was found under.
    pub root: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted name without the trailing `.*` of wildcard imports.
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Simple name, e.g. `NonNull` for `@lombok.NonNull`.
    pub name: String,
    /// Raw argument text without the surrounding parentheses.
    pub arguments: Option<String>,
}

/// Modifier keywords plus annotations attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub keywords: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    pub fn is_public(&self) -> bool {
        self.has("public")
    }

    pub fn is_static(&self) -> bool {
        self.has("static")
    }
}

/// A type as written in source, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(String),
    Void,
    /// A possibly qualified name (`List`, `Map.Entry`, `java.io.File`).
    /// Type arguments belong to the last segment.
    Named { path: Vec<String>, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    Wildcard(Option<WildcardBound>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardBound {
    Extends(Box<TypeExpr>),
    Super(Box<TypeExpr>),
}

impl TypeExpr {
    /// The last path segment of a named type.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Self::Named { path, .. } => path.last().map(String::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeExpr>,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub javadoc: Option<String>,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeExpr>,
    /// `implements` list for classes, `extends` list for interfaces.
    pub interfaces: Vec<TypeExpr>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub nested: Vec<TypeDecl>,
}

impl TypeDecl {
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.has("abstract")
    }
}

/// One declarator of a field declaration (`int a, b;` yields two).
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub modifiers: Modifiers,
    pub javadoc: Option<String>,
    pub has_initializer: bool,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub varargs: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub javadoc: Option<String>,
    pub type_params: Vec<TypeParam>,
    pub return_type: TypeExpr,
    pub params: Vec<Param>,
    /// `None` for abstract and interface methods.
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Modifiers,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    LocalVar {
        ty: TypeExpr,
        declarators: Vec<(String, Option<Expr>)>,
    },
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<Vec<Stmt>>,
        finally: Option<Vec<Stmt>>,
    },
    Return(Option<Expr>),
    /// Any statement kind outside the modelled vocabulary.
    Other { kind: String, text: String },
}

impl Stmt {
    /// Statements of a block, or the statement itself.
    pub fn flatten(&self) -> Vec<&Stmt> {
        match self {
            Self::Block(stmts) => stmts.iter().collect(),
            other => vec![other],
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Name(String),
    StringLiteral(String),
    /// Numbers, booleans, `null`, characters: kept as source text.
    Literal(String),
    This,
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
    MethodCall {
        object: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    New {
        ty: TypeExpr,
        args: Vec<Expr>,
    },
    Cast {
        ty: TypeExpr,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Paren(Box<Expr>),
    Lambda {
        params: Vec<String>,
        body: LambdaBody,
    },
    /// Source text of an expression shape outside the modelled vocabulary.
    Other(String),
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

impl Expr {
    /// Visits this expression and every nested expression, depth first.
    pub fn walk(&self, visit: &mut dyn FnMut(&Expr)) {
        visit(self);
        match self {
            Self::FieldAccess { object, .. } => object.walk(visit),
            Self::MethodCall { object, args, .. } => {
                if let Some(object) = object {
                    object.walk(visit);
                }
                args.iter().for_each(|a| a.walk(visit));
            }
            Self::New { args, .. } => args.iter().for_each(|a| a.walk(visit)),
            Self::Cast { expr, .. } | Self::Paren(expr) => expr.walk(visit),
            Self::Unary { operand, .. } => operand.walk(visit),
            Self::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Lambda { body, .. } => match body {
                LambdaBody::Expr(expr) => expr.walk(visit),
                LambdaBody::Block(stmts) => stmts.iter().for_each(|s| s.walk_exprs(visit)),
            },
            _ => {}
        }
    }

    /// The receiver at the bottom of a call chain (`a` in `a.b().c()`).
    pub fn chain_root(&self) -> &Expr {
        let mut current = self;
        while let Self::MethodCall {
            object: Some(object),
            ..
        } = current
        {
            current = object;
        }
        current
    }
}

impl Stmt {
    /// Visits every expression contained in this statement.
    pub fn walk_exprs(&self, visit: &mut dyn FnMut(&Expr)) {
        match self {
            Self::Block(stmts) => stmts.iter().for_each(|s| s.walk_exprs(visit)),
            Self::LocalVar { declarators, .. } => declarators
                .iter()
                .filter_map(|(_, init)| init.as_ref())
                .for_each(|e| e.walk(visit)),
            Self::Expr(expr) => expr.walk(visit),
            Self::Return(expr) => {
                if let Some(expr) = expr {
                    expr.walk(visit);
                }
            }
            Self::If {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.walk(visit);
                then_branch.walk_exprs(visit);
                if let Some(else_branch) = else_branch {
                    else_branch.walk_exprs(visit);
                }
            }
            Self::Try {
                body,
                catches,
                finally,
            } => {
                body.iter().for_each(|s| s.walk_exprs(visit));
                catches.iter().flatten().for_each(|s| s.walk_exprs(visit));
                finally.iter().flatten().for_each(|s| s.walk_exprs(visit));
            }
            Self::Other { .. } => {}
        }
    }
}
