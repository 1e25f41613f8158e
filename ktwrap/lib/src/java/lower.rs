//! Lowers tree-sitter-java syntax trees into the owned model in [`super::ast`].
//!
//! Only the shapes the generator consumes are modelled; anything else is
//! kept as raw text (`Stmt::Other`, `Expr::Other`) so nothing is silently
//! lost before the transcriber decides what to do with it.

use tree_sitter::Node;

use super::ast::{
    Annotation, CompilationUnit, ConstructorDecl, Expr, FieldDecl, Import, LambdaBody,
    MethodDecl, Modifiers, Param, Stmt, TypeDecl, TypeExpr, TypeKind, TypeParam, WildcardBound,
};

/// Lowering state for one file.
pub(crate) struct Lowerer<'src> {
    source: &'src str,
}

impl<'src> Lowerer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node<'_>) -> &'src str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Fills package, imports and top-level types of `unit` from `root`.
    pub(crate) fn lower_program(&self, root: Node<'_>, unit: &mut CompilationUnit) {
        for child in named_children(root) {
            match child.kind() {
                "package_declaration" => {
                    unit.package = named_children(child)
                        .into_iter()
                        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                        .map(|n| compact(self.text(n)));
                }
                "import_declaration" => unit.imports.push(self.lower_import(child)),
                _ => {
                    if let Some(decl) = self.lower_type_decl(child) {
                        unit.types.push(decl);
                    }
                }
            }
        }
    }

    fn lower_import(&self, node: Node<'_>) -> Import {
        let mut path = String::new();
        let mut wildcard = false;
        let mut is_static = false;
        for child in all_children(node) {
            match child.kind() {
                "scoped_identifier" | "identifier" => path = compact(self.text(child)),
                "asterisk" => wildcard = true,
                "static" => is_static = true,
                _ => {}
            }
        }
        Import {
            path,
            wildcard,
            is_static,
        }
    }

    fn lower_type_decl(&self, node: Node<'_>) -> Option<TypeDecl> {
        let kind = match node.kind() {
            "class_declaration" => TypeKind::Class,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "annotation_type_declaration" => TypeKind::Annotation,
            _ => return None,
        };

        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())?;

        let mut decl = TypeDecl {
            name,
            kind,
            modifiers: self.lower_modifiers(node),
            javadoc: self.javadoc_for(node),
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|n| self.lower_type_params(n))
                .unwrap_or_default(),
            superclass: node
                .child_by_field_name("superclass")
                .and_then(|n| type_children(n).into_iter().next())
                .map(|n| self.lower_type(n)),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            nested: Vec::new(),
        };

        for child in named_children(node) {
            if matches!(child.kind(), "super_interfaces" | "extends_interfaces") {
                for list in named_children(child) {
                    if list.kind() == "type_list" {
                        decl.interfaces
                            .extend(type_children(list).into_iter().map(|t| self.lower_type(t)));
                    }
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.lower_body(body, &mut decl);
        }

        Some(decl)
    }

    fn lower_body(&self, body: Node<'_>, decl: &mut TypeDecl) {
        let is_interface = decl.kind == TypeKind::Interface;
        for member in named_children(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    decl.fields.extend(self.lower_fields(member));
                }
                "method_declaration" => {
                    if let Some(mut method) = self.lower_method(member) {
                        // Interface members are implicitly public.
                        if is_interface && !method.modifiers.has("private") {
                            method.modifiers.keywords.push("public".to_string());
                        }
                        decl.methods.push(method);
                    }
                }
                "constructor_declaration" | "compact_constructor_declaration" => {
                    decl.constructors.push(ConstructorDecl {
                        modifiers: self.lower_modifiers(member),
                        params: member
                            .child_by_field_name("parameters")
                            .map(|p| self.lower_params(p))
                            .unwrap_or_default(),
                    });
                }
                "enum_body_declarations" => self.lower_body(member, decl),
                _ => {
                    if let Some(mut nested) = self.lower_type_decl(member) {
                        if is_interface && !nested.modifiers.is_public() {
                            nested.modifiers.keywords.push("public".to_string());
                        }
                        decl.nested.push(nested);
                    }
                }
            }
        }
    }

    fn lower_fields(&self, node: Node<'_>) -> Vec<FieldDecl> {
        let modifiers = self.lower_modifiers(node);
        let javadoc = self.javadoc_for(node);
        let Some(ty) = node.child_by_field_name("type").map(|t| self.lower_type(t)) else {
            return Vec::new();
        };

        let mut cursor = node.walk();
        node.children_by_field_name("declarator", &mut cursor)
            .filter_map(|declarator| {
                let name = declarator.child_by_field_name("name")?;
                Some(FieldDecl {
                    name: self.text(name).to_string(),
                    ty: wrap_dimensions(ty.clone(), declarator, self),
                    modifiers: modifiers.clone(),
                    javadoc: javadoc.clone(),
                    has_initializer: declarator.child_by_field_name("value").is_some(),
                })
            })
            .collect()
    }

    fn lower_method(&self, node: Node<'_>) -> Option<MethodDecl> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())?;
        let return_type = node
            .child_by_field_name("type")
            .map(|t| self.lower_type(t))
            .unwrap_or(TypeExpr::Void);

        Some(MethodDecl {
            name,
            modifiers: self.lower_modifiers(node),
            javadoc: self.javadoc_for(node),
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|n| self.lower_type_params(n))
                .unwrap_or_default(),
            return_type,
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.lower_params(p))
                .unwrap_or_default(),
            body: node
                .child_by_field_name("body")
                .map(|b| self.lower_block(b)),
        })
    }

    fn lower_params(&self, node: Node<'_>) -> Vec<Param> {
        named_children(node)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "formal_parameter" => Some(Param {
                    name: param
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())?,
                    ty: self.lower_type(param.child_by_field_name("type")?),
                    varargs: false,
                }),
                "spread_parameter" => {
                    let ty = type_children(param).into_iter().next()?;
                    let name = named_children(param)
                        .into_iter()
                        .find(|n| n.kind() == "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"))?;
                    Some(Param {
                        name: self.text(name).to_string(),
                        ty: TypeExpr::Array(Box::new(self.lower_type(ty))),
                        varargs: true,
                    })
                }
                _ => None,
            })
            .collect()
    }

    fn lower_type_params(&self, node: Node<'_>) -> Vec<TypeParam> {
        named_children(node)
            .into_iter()
            .filter(|n| n.kind() == "type_parameter")
            .filter_map(|param| {
                let children = named_children(param);
                let name = children
                    .iter()
                    .find(|n| matches!(n.kind(), "type_identifier" | "identifier"))
                    .map(|n| self.text(*n).to_string())?;
                let bounds = children
                    .iter()
                    .find(|n| n.kind() == "type_bound")
                    .map(|b| {
                        type_children(*b)
                            .into_iter()
                            .map(|t| self.lower_type(t))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(TypeParam { name, bounds })
            })
            .collect()
    }

    fn lower_modifiers(&self, node: Node<'_>) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let Some(mods) = all_children(node)
            .into_iter()
            .find(|n| n.kind() == "modifiers")
        else {
            return modifiers;
        };

        for child in all_children(mods) {
            match child.kind() {
                "marker_annotation" | "annotation" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or_default();
                    let arguments = child.child_by_field_name("arguments").map(|a| {
                        let raw = self.text(a).trim();
                        raw.trim_start_matches('(')
                            .trim_end_matches(')')
                            .trim()
                            .to_string()
                    });
                    modifiers.annotations.push(Annotation {
                        name: name.rsplit('.').next().unwrap_or(name).to_string(),
                        arguments,
                    });
                }
                kind if !child.is_named() => modifiers.keywords.push(kind.to_string()),
                _ => {}
            }
        }
        modifiers
    }

    /// The `/** ... */` comment directly preceding a declaration.
    fn javadoc_for(&self, node: Node<'_>) -> Option<String> {
        let mut previous = node.prev_sibling();
        while let Some(sibling) = previous {
            match sibling.kind() {
                "block_comment" => {
                    let text = self.text(sibling);
                    return text.starts_with("/**").then(|| text.to_string());
                }
                "line_comment" => previous = sibling.prev_sibling(),
                _ => return None,
            }
        }
        None
    }

    pub(crate) fn lower_type(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" => {
                TypeExpr::Primitive(self.text(node).trim().to_string())
            }
            "void_type" => TypeExpr::Void,
            "type_identifier" | "identifier" => TypeExpr::Named {
                path: vec![self.text(node).to_string()],
                args: Vec::new(),
            },
            "scoped_type_identifier" => {
                let mut path = Vec::new();
                for child in named_children(node) {
                    match child.kind() {
                        "type_identifier" => path.push(self.text(child).to_string()),
                        "scoped_type_identifier" | "generic_type" => {
                            if let TypeExpr::Named { path: inner, .. } = self.lower_type(child) {
                                path.extend(inner);
                            }
                        }
                        _ => {}
                    }
                }
                TypeExpr::Named {
                    path,
                    args: Vec::new(),
                }
            }
            "generic_type" => {
                let mut path = Vec::new();
                let mut args = Vec::new();
                for child in named_children(node) {
                    match child.kind() {
                        "type_arguments" => {
                            args = named_children(child)
                                .into_iter()
                                .filter(|n| !is_comment(*n) && !is_annotation(*n))
                                .map(|n| self.lower_type(n))
                                .collect();
                        }
                        "type_identifier" | "scoped_type_identifier" => {
                            if let TypeExpr::Named { path: inner, .. } = self.lower_type(child) {
                                path = inner;
                            }
                        }
                        _ => {}
                    }
                }
                TypeExpr::Named { path, args }
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .map(|e| self.lower_type(e))
                    .unwrap_or(TypeExpr::Void);
                let depth = node
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d).matches('[').count())
                    .unwrap_or(1);
                (0..depth).fold(element, |ty, _| TypeExpr::Array(Box::new(ty)))
            }
            "wildcard" => {
                let children = all_children(node);
                let is_super = children.iter().any(|c| c.kind() == "super");
                let bound = type_children(node)
                    .into_iter()
                    .next()
                    .map(|t| Box::new(self.lower_type(t)));
                TypeExpr::Wildcard(bound.map(|b| {
                    if is_super {
                        WildcardBound::Super(b)
                    } else {
                        WildcardBound::Extends(b)
                    }
                }))
            }
            "annotated_type" => type_children(node)
                .into_iter()
                .last()
                .map(|t| self.lower_type(t))
                .unwrap_or(TypeExpr::Void),
            _ => TypeExpr::Named {
                path: vec![compact(self.text(node))],
                args: Vec::new(),
            },
        }
    }

    fn lower_block(&self, node: Node<'_>) -> Vec<Stmt> {
        named_children(node)
            .into_iter()
            .filter(|n| !is_comment(*n))
            .map(|n| self.lower_stmt(n))
            .collect()
    }

    pub(crate) fn lower_stmt(&self, node: Node<'_>) -> Stmt {
        match node.kind() {
            "block" | "constructor_body" => Stmt::Block(self.lower_block(node)),
            "local_variable_declaration" => {
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| self.lower_type(t))
                    .unwrap_or(TypeExpr::Void);
                let mut cursor = node.walk();
                let declarators = node
                    .children_by_field_name("declarator", &mut cursor)
                    .filter_map(|d| {
                        let name = self.text(d.child_by_field_name("name")?).to_string();
                        let value = d.child_by_field_name("value").map(|v| self.lower_expr(v));
                        Some((name, value))
                    })
                    .collect();
                Stmt::LocalVar { ty, declarators }
            }
            "expression_statement" => named_children(node)
                .into_iter()
                .find(|n| !is_comment(*n))
                .map(|e| Stmt::Expr(self.lower_expr(e)))
                .unwrap_or_else(|| self.other_stmt(node)),
            "if_statement" => {
                let condition = node
                    .child_by_field_name("condition")
                    .map(|c| self.lower_expr(c))
                    .unwrap_or_else(|| Expr::Other(String::new()));
                let Some(consequence) = node.child_by_field_name("consequence") else {
                    return self.other_stmt(node);
                };
                Stmt::If {
                    condition: unparen(condition),
                    then_branch: Box::new(self.lower_stmt(consequence)),
                    else_branch: node
                        .child_by_field_name("alternative")
                        .map(|a| Box::new(self.lower_stmt(a))),
                }
            }
            "try_statement" | "try_with_resources_statement" => {
                let body = node
                    .child_by_field_name("body")
                    .map(|b| self.lower_block(b))
                    .unwrap_or_default();
                let mut catches = Vec::new();
                let mut finally = None;
                for child in named_children(node) {
                    match child.kind() {
                        "catch_clause" => catches.push(
                            child
                                .child_by_field_name("body")
                                .map(|b| self.lower_block(b))
                                .unwrap_or_default(),
                        ),
                        "finally_clause" => {
                            finally = named_children(child)
                                .into_iter()
                                .find(|n| n.kind() == "block")
                                .map(|b| self.lower_block(b));
                        }
                        _ => {}
                    }
                }
                Stmt::Try {
                    body,
                    catches,
                    finally,
                }
            }
            "return_statement" => Stmt::Return(
                named_children(node)
                    .into_iter()
                    .find(|n| !is_comment(*n))
                    .map(|e| self.lower_expr(e)),
            ),
            _ => self.other_stmt(node),
        }
    }

    fn other_stmt(&self, node: Node<'_>) -> Stmt {
        Stmt::Other {
            kind: node.kind().to_string(),
            text: self.text(node).to_string(),
        }
    }

    pub(crate) fn lower_expr(&self, node: Node<'_>) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "this" => Expr::This,
            "string_literal" => Expr::StringLiteral(unescape_java_string(self.text(node))),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "character_literal"
            | "true"
            | "false"
            | "null_literal" => Expr::Literal(self.text(node).to_string()),
            "parenthesized_expression" => named_children(node)
                .into_iter()
                .find(|n| !is_comment(*n))
                .map(|inner| Expr::Paren(Box::new(self.lower_expr(inner))))
                .unwrap_or_else(|| Expr::Other(self.text(node).to_string())),
            "field_access" => {
                let (Some(object), Some(field)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("field"),
                ) else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::FieldAccess {
                    object: Box::new(self.lower_expr(object)),
                    field: self.text(field).to_string(),
                }
            }
            "method_invocation" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::MethodCall {
                    object: node
                        .child_by_field_name("object")
                        .map(|o| Box::new(self.lower_expr(o))),
                    name: self.text(name).to_string(),
                    args: self.lower_args(node),
                }
            }
            "object_creation_expression" => {
                let Some(ty) = node.child_by_field_name("type") else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::New {
                    ty: self.lower_type(ty),
                    args: self.lower_args(node),
                }
            }
            "cast_expression" => {
                let (Some(ty), Some(value)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("value"),
                ) else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::Cast {
                    ty: self.lower_type(ty),
                    expr: Box::new(self.lower_expr(value)),
                }
            }
            "binary_expression" => {
                let (Some(left), Some(op), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                ) else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::Binary {
                    left: Box::new(self.lower_expr(left)),
                    op: self.text(op).to_string(),
                    right: Box::new(self.lower_expr(right)),
                }
            }
            "unary_expression" => {
                let (Some(op), Some(operand)) = (
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("operand"),
                ) else {
                    return Expr::Other(self.text(node).to_string());
                };
                Expr::Unary {
                    op: self.text(op).to_string(),
                    operand: Box::new(self.lower_expr(operand)),
                }
            }
            "lambda_expression" => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|p| match p.kind() {
                        "identifier" => vec![self.text(p).to_string()],
                        "inferred_parameters" => named_children(p)
                            .into_iter()
                            .filter(|n| n.kind() == "identifier")
                            .map(|n| self.text(n).to_string())
                            .collect(),
                        _ => self
                            .lower_params(p)
                            .into_iter()
                            .map(|param| param.name)
                            .collect(),
                    })
                    .unwrap_or_default();
                let body = match node.child_by_field_name("body") {
                    Some(b) if b.kind() == "block" => LambdaBody::Block(self.lower_block(b)),
                    Some(b) => LambdaBody::Expr(Box::new(self.lower_expr(b))),
                    None => LambdaBody::Block(Vec::new()),
                };
                Expr::Lambda { params, body }
            }
            _ => Expr::Other(self.text(node).to_string()),
        }
    }

    fn lower_args(&self, node: Node<'_>) -> Vec<Expr> {
        node.child_by_field_name("arguments")
            .map(|args| {
                named_children(args)
                    .into_iter()
                    .filter(|n| !is_comment(*n))
                    .map(|n| self.lower_expr(n))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn wrap_dimensions(ty: TypeExpr, declarator: Node<'_>, lowerer: &Lowerer<'_>) -> TypeExpr {
    match declarator.child_by_field_name("dimensions") {
        Some(dims) => (0..lowerer.text(dims).matches('[').count())
            .fold(ty, |ty, _| TypeExpr::Array(Box::new(ty))),
        None => ty,
    }
}

fn unparen(expr: Expr) -> Expr {
    match expr {
        Expr::Paren(inner) => *inner,
        other => other,
    }
}

fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Named children that denote types (skips comments, annotations, keywords).
fn type_children(node: Node<'_>) -> Vec<Node<'_>> {
    named_children(node)
        .into_iter()
        .filter(|n| {
            matches!(
                n.kind(),
                "integral_type"
                    | "floating_point_type"
                    | "boolean_type"
                    | "void_type"
                    | "type_identifier"
                    | "scoped_type_identifier"
                    | "generic_type"
                    | "array_type"
                    | "annotated_type"
                    | "wildcard"
            )
        })
        .collect()
}

fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn is_annotation(node: Node<'_>) -> bool {
    matches!(node.kind(), "marker_annotation" | "annotation")
}

/// Removes all whitespace from a dotted name.
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Decodes a Java string literal (including its quotes) into its value.
fn unescape_java_string(literal: &str) -> String {
    let inner = literal
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
        .or_else(|| literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('s') => out.push(' '),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_common_sequences() {
        assert_eq!(unescape_java_string(r#""chat_id""#), "chat_id");
        assert_eq!(unescape_java_string(r#""a\"b\\c\n""#), "a\"b\\c\n");
    }

    #[test]
    fn compact_strips_whitespace_in_names() {
        assert_eq!(compact("org . telegram\n.meta"), "org.telegram.meta");
    }
}
