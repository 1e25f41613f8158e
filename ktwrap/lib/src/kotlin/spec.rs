//! Declarations: functions, parameters, annotations and classes.

use super::code::{ClassName, Code, CodeBlock, KotlinType};
use super::file::Imports;
use super::{escape_identifier, string_literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Override,
    Open,
    Abstract,
    Inline,
    Suspend,
}

impl Modifier {
    fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Override => "override",
            Self::Open => "open",
            Self::Abstract => "abstract",
            Self::Inline => "inline",
            Self::Suspend => "suspend",
        }
    }
}

fn render_modifiers(modifiers: &[Modifier]) -> String {
    let mut sorted = modifiers.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
        .iter()
        .map(|m| format!("{} ", m.keyword()))
        .collect()
}

fn render_kdoc(kdoc: Option<&str>, pad: &str) -> String {
    let Some(kdoc) = kdoc else {
        return String::new();
    };
    let mut out = format!("{pad}/**\n");
    for line in kdoc.lines() {
        if line.is_empty() {
            out.push_str(&format!("{pad} *\n"));
        } else {
            out.push_str(&format!("{pad} * {line}\n"));
        }
    }
    out.push_str(&format!("{pad} */\n"));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSpec {
    pub class: ClassName,
    pub members: Vec<Code>,
}

impl AnnotationSpec {
    /// `@Deprecated(message = "...")`.
    pub fn deprecated(message: &str) -> Self {
        Self {
            class: ClassName::new("kotlin", "Deprecated"),
            members: vec![Code::text(format!("message = {}", string_literal(message)))],
        }
    }

    fn collect_classes(&self, out: &mut Vec<ClassName>) {
        out.push(self.class.clone());
        self.members.iter().for_each(|m| m.collect_classes(out));
    }

    fn render(&self, imports: &Imports) -> String {
        let name = imports.name_of(&self.class);
        if self.members.is_empty() {
            format!("@{name}")
        } else {
            let members: Vec<_> = self.members.iter().map(|m| m.render(imports)).collect();
            format!("@{name}({})", members.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariable {
    pub name: String,
    pub bounds: Vec<KotlinType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: KotlinType,
    pub default: Option<Code>,
    /// Parameter modifiers such as `crossinline` or `vararg`.
    pub modifiers: Vec<String>,
    /// For primary-constructor parameters that also declare a property,
    /// e.g. `override val`.
    pub property: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: KotlinType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            modifiers: Vec::new(),
            property: None,
        }
    }

    /// A nullable parameter defaulting to `null`.
    pub fn optional(name: impl Into<String>, ty: KotlinType) -> Self {
        let mut param = Self::new(name, ty.with_nullable(true));
        param.default = Some(Code::text("null"));
        param
    }

    pub fn with_default(mut self, default: impl Into<Code>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_modifier(mut self, modifier: &str) -> Self {
        self.modifiers.push(modifier.to_string());
        self
    }

    pub fn as_property(mut self, declaration: &str) -> Self {
        self.property = Some(declaration.to_string());
        self
    }

    fn collect_classes(&self, out: &mut Vec<ClassName>) {
        self.ty.collect_classes(out);
        if let Some(default) = &self.default {
            default.collect_classes(out);
        }
    }

    fn render(&self, imports: &Imports) -> String {
        let mut out = String::new();
        for modifier in &self.modifiers {
            out.push_str(modifier);
            out.push(' ');
        }
        if let Some(property) = &self.property {
            out.push_str(property);
            out.push(' ');
        }
        out.push_str(&escape_identifier(&self.name));
        out.push_str(": ");
        out.push_str(&self.ty.render(imports));
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(&default.render(imports));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunSpec {
    pub name: String,
    pub kdoc: Option<String>,
    pub annotations: Vec<AnnotationSpec>,
    pub modifiers: Vec<Modifier>,
    pub type_variables: Vec<TypeVariable>,
    pub receiver: Option<KotlinType>,
    pub params: Vec<ParamSpec>,
    pub returns: Option<KotlinType>,
    /// `None` renders an abstract declaration with no body.
    pub body: Option<CodeBlock>,
}

impl FunSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kdoc: None,
            annotations: Vec::new(),
            modifiers: Vec::new(),
            type_variables: Vec::new(),
            receiver: None,
            params: Vec::new(),
            returns: None,
            body: Some(CodeBlock::new()),
        }
    }

    pub fn body_mut(&mut self) -> &mut CodeBlock {
        self.body.get_or_insert_with(CodeBlock::new)
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_deprecated(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| a.class.canonical() == "kotlin.Deprecated")
    }

    pub(crate) fn collect_classes(&self, out: &mut Vec<ClassName>) {
        self.annotations.iter().for_each(|a| a.collect_classes(out));
        for var in &self.type_variables {
            var.bounds.iter().for_each(|b| b.collect_classes(out));
        }
        if let Some(receiver) = &self.receiver {
            receiver.collect_classes(out);
        }
        self.params.iter().for_each(|p| p.collect_classes(out));
        if let Some(returns) = &self.returns {
            returns.collect_classes(out);
        }
        if let Some(body) = &self.body {
            body.collect_classes(out);
        }
    }

    pub(crate) fn render(&self, imports: &Imports, indent: &str, depth: usize) -> String {
        let pad = indent.repeat(depth);
        let mut out = render_kdoc(self.kdoc.as_deref(), &pad);
        for annotation in &self.annotations {
            out.push_str(&format!("{pad}{}\n", annotation.render(imports)));
        }

        out.push_str(&pad);
        out.push_str(&render_modifiers(&self.modifiers));
        out.push_str("fun ");

        // Single-bound variables go inline, multi-bound ones to a where clause.
        let mut where_clauses = Vec::new();
        if !self.type_variables.is_empty() {
            let vars: Vec<String> = self
                .type_variables
                .iter()
                .map(|v| match v.bounds.as_slice() {
                    [] => v.name.clone(),
                    [bound] => format!("{} : {}", v.name, bound.render(imports)),
                    bounds => {
                        for bound in bounds {
                            where_clauses.push(format!("{} : {}", v.name, bound.render(imports)));
                        }
                        v.name.clone()
                    }
                })
                .collect();
            out.push_str(&format!("<{}> ", vars.join(", ")));
        }

        if let Some(receiver) = &self.receiver {
            out.push_str(&receiver.render(imports));
            out.push('.');
        }
        out.push_str(&escape_identifier(&self.name));

        let params: Vec<String> = self.params.iter().map(|p| p.render(imports)).collect();
        if params.is_empty() {
            out.push_str("()");
        } else {
            let inner = indent.repeat(depth + 1);
            out.push_str("(\n");
            for param in &params {
                out.push_str(&format!("{inner}{param},\n"));
            }
            out.push_str(&format!("{pad})"));
        }

        if let Some(returns) = &self.returns
            && !returns.is_unit()
        {
            out.push_str(": ");
            out.push_str(&returns.render(imports));
        }
        if !where_clauses.is_empty() {
            out.push_str(" where ");
            out.push_str(&where_clauses.join(", "));
        }

        match &self.body {
            None => out.push('\n'),
            Some(body) => {
                out.push_str(" {\n");
                out.push_str(&body.render(imports, indent, depth + 1));
                out.push_str(&format!("{pad}}}\n"));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub kdoc: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub primary_constructor: Option<Vec<ParamSpec>>,
    pub superclass: Option<KotlinType>,
    /// Arguments passed to the superclass constructor; `None` when the
    /// supertype is written without a call.
    pub superclass_args: Option<Vec<String>>,
    pub superinterfaces: Vec<KotlinType>,
    pub functions: Vec<FunSpec>,
}

impl TypeSpec {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kdoc: None,
            modifiers: Vec::new(),
            primary_constructor: None,
            superclass: None,
            superclass_args: None,
            superinterfaces: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub(crate) fn collect_classes(&self, out: &mut Vec<ClassName>) {
        if let Some(params) = &self.primary_constructor {
            params.iter().for_each(|p| p.collect_classes(out));
        }
        if let Some(superclass) = &self.superclass {
            superclass.collect_classes(out);
        }
        self.superinterfaces.iter().for_each(|s| s.collect_classes(out));
        self.functions.iter().for_each(|f| f.collect_classes(out));
    }

    pub(crate) fn render(&self, imports: &Imports, indent: &str) -> String {
        let mut out = render_kdoc(self.kdoc.as_deref(), "");
        out.push_str(&render_modifiers(&self.modifiers));
        out.push_str("class ");
        out.push_str(&self.name);

        if let Some(params) = &self.primary_constructor {
            if params.is_empty() {
                out.push_str("()");
            } else {
                out.push_str("(\n");
                for param in params {
                    out.push_str(&format!("{indent}{},\n", param.render(imports)));
                }
                out.push(')');
            }
        }

        let mut supertypes = Vec::new();
        if let Some(superclass) = &self.superclass {
            let mut rendered = superclass.render(imports);
            if let Some(args) = &self.superclass_args {
                rendered.push_str(&format!("({})", args.join(", ")));
            }
            supertypes.push(rendered);
        }
        supertypes.extend(self.superinterfaces.iter().map(|s| s.render(imports)));
        if !supertypes.is_empty() {
            out.push_str(" : ");
            out.push_str(&supertypes.join(", "));
        }

        if self.functions.is_empty() {
            out.push('\n');
            return out;
        }

        out.push_str(" {\n");
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&function.render(imports, indent, 1));
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_function_with_receiver_bounds_and_defaults() {
        let mut fun = FunSpec::new("sendMessage");
        fun.modifiers.push(Modifier::Suspend);
        fun.receiver = Some(KotlinType::class(ClassName::new("org.bots", "TelegramClient")));
        fun.params.push(ParamSpec::new("chatId", KotlinType::kotlin("String")));
        fun.params.push(ParamSpec::optional("text", KotlinType::kotlin("String")));
        fun.returns = Some(KotlinType::kotlin("Unit"));
        fun.body_mut().statement("this.executeAsync(apiMethod).await()");

        let rendered = fun.render(&Imports::default(), "    ", 0);
        assert_eq!(
            rendered,
            "suspend fun TelegramClient.sendMessage(\n    chatId: String,\n    text: String? = null,\n) {\n    this.executeAsync(apiMethod).await()\n}\n"
        );
    }

    #[test]
    fn multiple_bounds_move_to_where_clause() {
        let mut fun = FunSpec::new("executeK");
        fun.type_variables.push(TypeVariable {
            name: "T".into(),
            bounds: vec![KotlinType::kotlin("Comparable"), KotlinType::kotlin("CharSequence")],
        });
        fun.returns = Some(KotlinType::type_var("T"));
        fun.body = None;
        let rendered = fun.render(&Imports::default(), "    ", 0);
        assert_eq!(rendered, "fun <T> executeK(): T where T : Comparable, T : CharSequence\n");
    }

    #[test]
    fn deprecated_annotation_escapes_message() {
        let annotation = AnnotationSpec::deprecated("Use \"chatId\" instead");
        assert_eq!(
            annotation.render(&Imports::default()),
            "@Deprecated(message = \"Use \\\"chatId\\\" instead\")"
        );
    }
}
