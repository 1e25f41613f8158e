//! Kotlin type names and code fragments.
//!
//! Code is kept as segments of text and type references so the file writer
//! can decide, after everything is built, which names get imported and
//! which must be written fully qualified.

use super::file::Imports;

/// A Kotlin class, possibly nested (`Outer.Inner`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName {
    pub package: String,
    /// Top-level name first, then nested names.
    pub simple_names: Vec<String>,
}

impl ClassName {
    pub fn new(package: impl Into<String>, simple: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple.into()],
        }
    }

    /// Splits a dotted name at the first segment starting with an uppercase
    /// letter: `a.b.Outer.Inner` becomes package `a.b`, names `[Outer, Inner]`.
    pub fn best_guess(fqn: &str) -> Self {
        let segments: Vec<&str> = fqn.split('.').collect();
        let split = segments
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_ascii_uppercase()))
            .unwrap_or(segments.len().saturating_sub(1));
        Self {
            package: segments[..split].join("."),
            simple_names: segments[split..].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn simple_name(&self) -> &str {
        self.simple_names.last().map(String::as_str).unwrap_or_default()
    }

    pub fn top_level_name(&self) -> &str {
        self.simple_names.first().map(String::as_str).unwrap_or_default()
    }

    /// The top-level class this name is nested in (or itself).
    pub fn top_level(&self) -> ClassName {
        Self {
            package: self.package.clone(),
            simple_names: self.simple_names.iter().take(1).cloned().collect(),
        }
    }

    pub fn nested(&self, name: impl Into<String>) -> ClassName {
        let mut nested = self.clone();
        nested.simple_names.push(name.into());
        nested
    }

    pub fn canonical(&self) -> String {
        let names = self.simple_names.join(".");
        if self.package.is_empty() {
            names
        } else {
            format!("{}.{names}", self.package)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    Out,
    In,
}

/// A Kotlin type. Nullability is a flag on the type, not part of its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KotlinType {
    Class {
        class: ClassName,
        args: Vec<KotlinType>,
        nullable: bool,
    },
    TypeVar {
        name: String,
        nullable: bool,
    },
    /// `*` projection.
    Star,
    Projection {
        variance: Variance,
        ty: Box<KotlinType>,
    },
    /// `(params) -> returns`.
    Lambda {
        params: Vec<KotlinType>,
        returns: Box<KotlinType>,
    },
}

impl KotlinType {
    pub fn class(class: ClassName) -> Self {
        Self::Class {
            class,
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn parameterized(class: ClassName, args: Vec<KotlinType>) -> Self {
        Self::Class {
            class,
            args,
            nullable: false,
        }
    }

    pub fn type_var(name: impl Into<String>) -> Self {
        Self::TypeVar {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn kotlin(simple: &str) -> Self {
        Self::class(ClassName::new("kotlin", simple))
    }

    /// The same type with the given nullability. Projections and `*`
    /// carry no nullability of their own and are returned unchanged.
    pub fn with_nullable(&self, value: bool) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Class { nullable, .. } | Self::TypeVar { nullable, .. } => *nullable = value,
            Self::Star | Self::Projection { .. } | Self::Lambda { .. } => {}
        }
        copy
    }

    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Self::Class { nullable: true, .. } | Self::TypeVar { nullable: true, .. }
        )
    }

    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            Self::Class { class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Class { class, .. } if class.canonical() == "kotlin.Unit")
    }

    /// Every class referenced by this type, including type arguments.
    pub fn collect_classes(&self, out: &mut Vec<ClassName>) {
        match self {
            Self::Class { class, args, .. } => {
                out.push(class.clone());
                args.iter().for_each(|a| a.collect_classes(out));
            }
            Self::Projection { ty, .. } => ty.collect_classes(out),
            Self::Lambda { params, returns } => {
                params.iter().for_each(|p| p.collect_classes(out));
                returns.collect_classes(out);
            }
            Self::TypeVar { .. } | Self::Star => {}
        }
    }

    pub fn render(&self, imports: &Imports) -> String {
        match self {
            Self::Class {
                class,
                args,
                nullable,
            } => {
                let mut out = imports.name_of(class);
                if !args.is_empty() {
                    let args: Vec<_> = args.iter().map(|a| a.render(imports)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                if *nullable {
                    out.push('?');
                }
                out
            }
            Self::TypeVar { name, nullable } => {
                if *nullable {
                    format!("{name}?")
                } else {
                    name.clone()
                }
            }
            Self::Star => "*".to_string(),
            Self::Projection { variance, ty } => {
                let keyword = match variance {
                    Variance::Out => "out",
                    Variance::In => "in",
                };
                format!("{keyword} {}", ty.render(imports))
            }
            Self::Lambda { params, returns } => {
                let params: Vec<_> = params.iter().map(|p| p.render(imports)).collect();
                format!("({}) -> {}", params.join(", "), returns.render(imports))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Type(KotlinType),
}

/// An inline code fragment: an expression or the text of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    segments: Vec<Segment>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut code = Self::new();
        code.push_str(text);
        code
    }

    pub fn push_str(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(&text),
            _ => self.segments.push(Segment::Text(text)),
        }
        self
    }

    pub fn push_type(&mut self, ty: KotlinType) -> &mut Self {
        self.segments.push(Segment::Type(ty));
        self
    }

    pub fn append(&mut self, other: Code) -> &mut Self {
        for segment in other.segments {
            match segment {
                Segment::Text(text) => {
                    self.push_str(text);
                }
                Segment::Type(ty) => {
                    self.push_type(ty);
                }
            }
        }
        self
    }

    /// Joins fragments with `separator`.
    pub fn join(parts: Vec<Code>, separator: &str) -> Code {
        let mut joined = Code::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined.push_str(separator);
            }
            joined.append(part);
        }
        joined
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The fragment's text with types written by their simple names.
    /// Used for structural checks, never for output.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.clone(),
                Segment::Type(ty) => match ty {
                    KotlinType::Class { class, .. } => class.simple_names.join("."),
                    other => format!("{other:?}"),
                },
            })
            .collect()
    }

    pub fn collect_classes(&self, out: &mut Vec<ClassName>) {
        for segment in &self.segments {
            if let Segment::Type(ty) = segment {
                ty.collect_classes(out);
            }
        }
    }

    pub fn render(&self, imports: &Imports) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.clone(),
                Segment::Type(ty) => ty.render(imports),
            })
            .collect()
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Code::text(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Code::text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Statement(Code),
    /// `<code> {`, indenting what follows. Code already opening a lambda
    /// (`thenApply { stream ->`) gets no extra brace.
    Begin(Code),
    /// `} <code> {`.
    Next(Code),
    End,
}

/// A sequence of statements with nested control flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    lines: Vec<Line>,
}

impl CodeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statement(&mut self, code: impl Into<Code>) -> &mut Self {
        self.lines.push(Line::Statement(code.into()));
        self
    }

    pub fn begin_control_flow(&mut self, code: impl Into<Code>) -> &mut Self {
        self.lines.push(Line::Begin(code.into()));
        self
    }

    pub fn next_control_flow(&mut self, code: impl Into<Code>) -> &mut Self {
        self.lines.push(Line::Next(code.into()));
        self
    }

    pub fn end_control_flow(&mut self) -> &mut Self {
        self.lines.push(Line::End);
        self
    }

    pub fn extend(&mut self, other: CodeBlock) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of plain statements, control-flow lines excluded.
    pub fn statement_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, Line::Statement(_)))
            .count()
    }

    pub fn collect_classes(&self, out: &mut Vec<ClassName>) {
        for line in &self.lines {
            match line {
                Line::Statement(code) | Line::Begin(code) | Line::Next(code) => {
                    code.collect_classes(out)
                }
                Line::End => {}
            }
        }
    }

    /// Renders each line at `depth` levels of `indent`, one per line with a
    /// trailing newline.
    pub fn render(&self, imports: &Imports, indent: &str, depth: usize) -> String {
        let mut out = String::new();
        let mut level = depth;
        for line in &self.lines {
            match line {
                Line::Statement(code) => {
                    push_line(&mut out, indent, level, &code.render(imports));
                }
                Line::Begin(code) => {
                    let text = code.render(imports);
                    if text.ends_with("->") {
                        push_line(&mut out, indent, level, &text);
                    } else {
                        push_line(&mut out, indent, level, &format!("{text} {{"));
                    }
                    level += 1;
                }
                Line::Next(code) => {
                    level = level.saturating_sub(1);
                    push_line(&mut out, indent, level, &format!("}} {} {{", code.render(imports)));
                    level += 1;
                }
                Line::End => {
                    level = level.saturating_sub(1);
                    push_line(&mut out, indent, level, "}");
                }
            }
        }
        out
    }
}

fn push_line(out: &mut String, indent: &str, level: usize, text: &str) {
    for line in text.lines() {
        for _ in 0..level {
            out.push_str(indent);
        }
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_guess_splits_package_from_nested_names() {
        let name = ClassName::best_guess("org.telegram.meta.api.objects.Message.Entity");
        assert_eq!(name.package, "org.telegram.meta.api.objects");
        assert_eq!(name.simple_names, vec!["Message", "Entity"]);
        assert_eq!(name.top_level().canonical(), "org.telegram.meta.api.objects.Message");
    }

    #[test]
    fn code_merges_adjacent_text() {
        let mut code = Code::text("parts.add(");
        code.push_str("x").push_str(")");
        assert_eq!(code.segments.len(), 1);
        assert_eq!(code.plain_text(), "parts.add(x)");
    }

    #[test]
    fn code_block_indents_control_flow() {
        let mut block = CodeBlock::new();
        block
            .begin_control_flow("if (a != null)")
            .statement("obj.a = a")
            .next_control_flow("else")
            .statement("obj.b = b")
            .end_control_flow();
        let rendered = block.render(&Imports::default(), "    ", 1);
        assert_eq!(
            rendered,
            "    if (a != null) {\n        obj.a = a\n    } else {\n        obj.b = b\n    }\n"
        );
        assert_eq!(block.statement_count(), 2);
    }

    #[test]
    fn lambda_openers_keep_their_own_brace() {
        let mut block = CodeBlock::new();
        block
            .begin_control_flow("return future.thenApply { stream ->")
            .statement("stream")
            .end_control_flow();
        assert_eq!(
            block.render(&Imports::default(), "    ", 0),
            "return future.thenApply { stream ->\n    stream\n}\n"
        );
    }
}
