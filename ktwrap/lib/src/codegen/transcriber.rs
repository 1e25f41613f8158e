//! Transcription of a multipart-building Java method body into Kotlin that
//! fills a `parts` list.
//!
//! The vocabulary is small and fixed. `try` keeps only its body, `if/else`
//! keeps its resolved condition and licenses unconditional emission inside,
//! local variables become `val`s and builder chains rooted at the builder
//! variable unroll into one `parts.add(...)` per recognized link:
//!
//! ```text
//! builder.addPart(SendPhoto.CHATID_FIELD, method.getChatId())
//!        .addInputFile(SendPhoto.PHOTO_FIELD, method.getPhoto(), true);
//! ```
//!
//! becomes
//!
//! ```text
//! parts.add(StringPart(SendPhoto.CHATID_FIELD, sendPhoto.chatId))
//! sendPhoto.photo?.let {
//!     parts.add(FilePart(SendPhoto.PHOTO_FIELD, it))
//! }
//! ```
//!
//! Statements that only serve the Java method itself (URL building, HTTP
//! request assembly, dispatch) are recognized by call name or constructed
//! type and skipped. Any other shape is dropped, or rejected in strict mode.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::ClassDescriptor;
use crate::error::KtWrapError;
use crate::java::{Expr, JavaType, LambdaBody, Stmt, TypeExpr};
use crate::kotlin::{ClassName, Code, CodeBlock, KotlinType, string_literal};
use crate::source_index::{Scope, SourceIndex};
use crate::type_mapper::TypeMapper;

/// The builder operations and skip lists transcription understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Package holding `StringPart`, `JsonPart` and `FilePart`.
    pub part_package: String,
    /// Builder method adding a string part.
    pub string_part: String,
    /// Builder method adding a JSON part.
    pub json_part: String,
    /// Builder method adding a file part.
    pub file_part: String,
    /// Statements calling any of these methods are skipped.
    pub ignored_calls: Vec<String>,
    /// Statements constructing or declaring any of these types are skipped.
    pub ignored_types: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            part_package: String::new(),
            string_part: "addPart".to_string(),
            json_part: "addJsonPart".to_string(),
            file_part: "addInputFile".to_string(),
            ignored_calls: ["buildUrl", "sendRequest", "assertParamNotNull", "accept"]
                .map(String::from)
                .to_vec(),
            ignored_types: ["TelegramMultipartBuilder", "Request.Builder"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    String,
    Json,
    File,
}

impl PartKind {
    fn class_name(self) -> &'static str {
        match self {
            Self::String => "StringPart",
            Self::Json => "JsonPart",
            Self::File => "FilePart",
        }
    }
}

/// Everything a transcription pass resolves against.
#[derive(Debug, Clone)]
pub struct TranscriptionContext<'a> {
    pub index: &'a SourceIndex,
    pub mapper: &'a TypeMapper,
    /// Scope of the class declaring the transcribed statements.
    pub scope: Scope<'a>,
    /// Name of the method being generated, for diagnostics.
    pub method: &'a str,
    /// The generated method's parameter.
    pub param: &'a str,
    pub param_class: &'a ClassDescriptor,
    /// `@NonNull` properties of `param_class`.
    pub non_null: &'a BTreeSet<String>,
    /// A formal parameter name in the statements that stands for `param`.
    pub replaced_param: Option<&'a str>,
    /// Root receiver name of builder chains.
    pub builder_var: &'a str,
    pub vocabulary: &'a Vocabulary,
    pub strict: bool,
}

/// Accumulates the transcription of one generated method body.
///
/// Several statement lists may be appended (a template body, then a
/// call-site lambda); they share the duplicate-key guard because they fill
/// one request.
#[derive(Debug, Default)]
pub struct StatementTranscriber {
    out: CodeBlock,
    keys: BTreeSet<String>,
}

impl StatementTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcribes one statement list on its own.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::UnknownPrimitive`] from type resolution, or
    /// [`KtWrapError::UntranscribableStatement`] in strict mode.
    pub fn transcribe(stmts: &[Stmt], ctx: &TranscriptionContext<'_>) -> Result<CodeBlock, KtWrapError> {
        let mut transcriber = Self::new();
        transcriber.append(stmts, ctx)?;
        Ok(transcriber.finish())
    }

    /// Transcribes `stmts` after what was appended so far.
    ///
    /// ## Errors
    /// See [`StatementTranscriber::transcribe`].
    pub fn append(&mut self, stmts: &[Stmt], ctx: &TranscriptionContext<'_>) -> Result<(), KtWrapError> {
        let mut pass = Pass {
            ctx,
            out: &mut self.out,
        };
        for stmt in stmts {
            pass.statement(stmt, false, &mut self.keys)?;
        }
        Ok(())
    }

    pub fn finish(self) -> CodeBlock {
        self.out
    }
}

struct Pass<'c, 'a> {
    ctx: &'c TranscriptionContext<'a>,
    out: &'c mut CodeBlock,
}

impl Pass<'_, '_> {
    fn statement(&mut self, stmt: &Stmt, non_null: bool, keys: &mut BTreeSet<String>) -> Result<(), KtWrapError> {
        if matches!(stmt, Stmt::Expr(_) | Stmt::LocalVar { .. } | Stmt::Return(_)) && self.is_ignored(stmt) {
            return Ok(());
        }

        match stmt {
            Stmt::Block(stmts) => {
                for stmt in stmts {
                    self.statement(stmt, non_null, keys)?;
                }
            }
            Stmt::Try { body, .. } => {
                for stmt in body {
                    self.statement(stmt, non_null, keys)?;
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut head = Code::text("if (");
                head.append(self.expr(condition)?).push_str(")");
                self.out.begin_control_flow(head);

                let mut then_keys = keys.clone();
                for stmt in then_branch.flatten() {
                    self.statement(stmt, true, &mut then_keys)?;
                }
                let mut else_keys = keys.clone();
                if let Some(else_branch) = else_branch {
                    self.out.next_control_flow("else");
                    for stmt in else_branch.flatten() {
                        self.statement(stmt, true, &mut else_keys)?;
                    }
                }
                self.out.end_control_flow();
                keys.extend(then_keys);
                keys.extend(else_keys);
            }
            Stmt::LocalVar { declarators, .. } => {
                for (name, init) in declarators {
                    if let Some(init) = init {
                        let mut code = Code::text(format!("val {name} = "));
                        code.append(self.expr(init)?);
                        self.out.statement(code);
                    }
                }
            }
            Stmt::Expr(expr @ Expr::MethodCall { .. }) if self.is_builder_chain(expr) => {
                self.builder_chain(expr, non_null, keys)?;
            }
            Stmt::Expr(_) | Stmt::Return(_) => self.drop_statement("expression", stmt)?,
            Stmt::Other { kind, .. } => self.drop_statement(kind, stmt)?,
        }
        Ok(())
    }

    fn drop_statement(&self, kind: &str, stmt: &Stmt) -> Result<(), KtWrapError> {
        let text = describe(stmt);
        if self.ctx.strict {
            return Err(KtWrapError::UntranscribableStatement {
                method: self.ctx.method.to_string(),
                kind: kind.to_string(),
                text,
            });
        }
        debug!(method = self.ctx.method, kind, %text, "Dropping untranscribable statement");
        Ok(())
    }

    /// Whether the statement calls an ignored method or builds an ignored
    /// type anywhere inside it.
    fn is_ignored(&self, stmt: &Stmt) -> bool {
        let vocabulary = self.ctx.vocabulary;
        let ignored_type = |ty: &TypeExpr| {
            type_text(ty).is_some_and(|text| vocabulary.ignored_types.iter().any(|t| *t == text))
        };

        if let Stmt::LocalVar { ty, .. } = stmt
            && ignored_type(ty)
        {
            return true;
        }

        let mut ignored = false;
        stmt.walk_exprs(&mut |expr| match expr {
            Expr::MethodCall { name, .. } if vocabulary.ignored_calls.contains(name) => ignored = true,
            Expr::New { ty, .. } if ignored_type(ty) => ignored = true,
            _ => {}
        });
        if ignored {
            debug!(method = self.ctx.method, statement = %describe(stmt), "Skipping ignored statement");
        }
        ignored
    }

    fn is_builder_chain(&self, expr: &Expr) -> bool {
        matches!(expr.chain_root(), Expr::Name(name) if name == self.ctx.builder_var)
    }

    /// Handles each call of `a.b(..).c(..)`, innermost (oldest) first.
    fn builder_chain(&mut self, expr: &Expr, non_null: bool, keys: &mut BTreeSet<String>) -> Result<(), KtWrapError> {
        let mut chain = Vec::new();
        let mut current = expr;
        while let Expr::MethodCall {
            object: Some(object),
            name,
            args,
        } = current
        {
            chain.push((name.as_str(), args.as_slice()));
            current = object;
        }
        for (name, args) in chain.into_iter().rev() {
            self.builder_call(name, args, non_null, keys)?;
        }
        Ok(())
    }

    fn builder_call(
        &mut self,
        name: &str,
        args: &[Expr],
        non_null: bool,
        keys: &mut BTreeSet<String>,
    ) -> Result<(), KtWrapError> {
        let vocabulary = self.ctx.vocabulary;
        let kind = if name == vocabulary.string_part {
            PartKind::String
        } else if name == vocabulary.json_part {
            PartKind::Json
        } else if name == vocabulary.file_part {
            PartKind::File
        } else {
            return Ok(());
        };
        let [key_expr, value_expr, ..] = args else {
            return Ok(());
        };

        let key = self.expr(key_expr)?;
        let value = self.expr(value_expr)?;
        let key_text = key.plain_text();
        if !keys.insert(key_text.clone()) {
            debug!(method = self.ctx.method, key = %key_text, "Dropping duplicate part key");
            return Ok(());
        }

        let accessor = value.plain_text();
        let relative = accessor.split_once('.').map_or("", |(_, rest)| rest);
        let non_null = non_null || self.ctx.non_null.contains(relative) || never_null(value_expr);
        let last = accessor.rsplit('.').next().unwrap_or(accessor.as_str());
        let is_string = match value_expr {
            Expr::StringLiteral(_) => true,
            Expr::Cast { ty, .. } | Expr::New { ty, .. } => {
                self.ctx.index.resolve_type(&self.ctx.scope, ty)?.fqn() == Some("java.lang.String")
            }
            _ => self
                .ctx
                .param_class
                .field(last)
                .is_some_and(|f| f.ty.fqn() == Some("java.lang.String")),
        };
        let stringify = kind == PartKind::String && !is_string;

        // Suffixes below bind tighter than operators.
        let value = if is_atomic(value_expr) {
            value
        } else {
            let mut wrapped = Code::text("(");
            wrapped.append(value).push_str(")");
            wrapped
        };

        let part = KotlinType::class(ClassName::new(&vocabulary.part_package, kind.class_name()));
        let add = |value: Code| {
            let mut code = Code::text("parts.add(");
            code.push_type(part.clone())
                .push_str("(")
                .append(key.clone())
                .push_str(", ")
                .append(value);
            if stringify {
                code.push_str(".toString()");
            }
            code.push_str("))");
            code
        };

        if non_null {
            self.out.statement(add(value));
        } else {
            let mut guard = value;
            guard.push_str("?.let");
            self.out
                .begin_control_flow(guard)
                .statement(add(Code::text("it")))
                .end_control_flow();
        }
        Ok(())
    }

    fn exprs(&self, exprs: &[Expr]) -> Result<Code, KtWrapError> {
        let parts = exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Code::join(parts, ", "))
    }

    fn kotlin_type(&self, ty: &TypeExpr) -> Result<KotlinType, KtWrapError> {
        let java = self.ctx.index.resolve_type(&self.ctx.scope, ty)?;
        Ok(self.ctx.mapper.map(&java))
    }

    fn expr(&self, expr: &Expr) -> Result<Code, KtWrapError> {
        let mut code = Code::new();
        match expr {
            Expr::New { ty, args } => {
                code.push_type(self.kotlin_type(ty)?)
                    .push_str("(")
                    .append(self.exprs(args)?)
                    .push_str(")");
            }
            Expr::Cast { ty, expr } => {
                // Java casts let `null` through.
                let java = self.ctx.index.resolve_type(&self.ctx.scope, ty)?;
                let target = self
                    .ctx
                    .mapper
                    .map(&java)
                    .with_nullable(!matches!(java, JavaType::Primitive(_)));
                code.push_str("(")
                    .append(self.expr(expr)?)
                    .push_str(" as ")
                    .push_type(target)
                    .push_str(")");
            }
            Expr::MethodCall { object, name, args } => {
                if let Some(object) = object {
                    code.append(self.expr(object)?).push_str(".");
                    if let Some(property) = getter_property(name)
                        && args.is_empty()
                    {
                        code.push_str(property);
                        return Ok(code);
                    }
                }
                code.push_str(format!("{name}("))
                    .append(self.exprs(args)?)
                    .push_str(")");
            }
            Expr::FieldAccess { object, field } => {
                match self
                    .ctx
                    .index
                    .resolve_field_constant(&self.ctx.scope, object, field)
                {
                    Some(owner) => {
                        code.push_type(KotlinType::class(self.ctx.mapper.map_class(&owner)));
                    }
                    None => {
                        code.append(self.expr(object)?);
                    }
                }
                code.push_str(format!(".{field}"));
            }
            Expr::Name(name) => {
                if self.ctx.replaced_param == Some(name.as_str()) {
                    code.push_str(self.ctx.param);
                } else {
                    code.push_str(name.as_str());
                }
            }
            Expr::StringLiteral(value) => {
                code.push_str(string_literal(value));
            }
            Expr::Literal(text) | Expr::Other(text) => {
                code.push_str(text.as_str());
            }
            Expr::This => {
                code.push_str("this");
            }
            Expr::Binary { left, op, right } => {
                code.append(self.expr(left)?)
                    .push_str(format!(" {op} "))
                    .append(self.expr(right)?);
            }
            Expr::Unary { op, operand } => {
                code.push_str(op.as_str()).append(self.expr(operand)?);
            }
            Expr::Paren(inner) => {
                code.push_str("(").append(self.expr(inner)?).push_str(")");
            }
            Expr::Lambda { params, body } => {
                code.push_str("{ ");
                if !params.is_empty() {
                    code.push_str(format!("{} -> ", params.join(", ")));
                }
                match body {
                    LambdaBody::Expr(body) => {
                        code.append(self.expr(body)?);
                    }
                    LambdaBody::Block(_) => {
                        if self.ctx.strict {
                            return Err(KtWrapError::UntranscribableStatement {
                                method: self.ctx.method.to_string(),
                                kind: "lambda".to_string(),
                                text: "block-bodied lambda expression".to_string(),
                            });
                        }
                        debug!(method = self.ctx.method, "Dropping block-bodied lambda body");
                    }
                }
                code.push_str(" }");
            }
        }
        Ok(code)
    }
}

/// `getChatId` → `chatId`.
fn getter_property(name: &str) -> Option<String> {
    let rest = name.strip_prefix("get")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// Dotted name of a named type (`Request.Builder`).
fn type_text(ty: &TypeExpr) -> Option<String> {
    match ty {
        TypeExpr::Named { path, .. } => Some(path.join(".")),
        _ => None,
    }
}

/// Short description of a statement for diagnostics.
fn describe(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Other { text, .. } => text.clone(),
        Stmt::Expr(Expr::MethodCall { name, .. }) => format!("call to `{name}`"),
        Stmt::Expr(_) => "expression statement".to_string(),
        Stmt::Return(_) => "return statement".to_string(),
        Stmt::LocalVar { declarators, .. } => {
            let names: Vec<_> = declarators.iter().map(|(n, _)| n.as_str()).collect();
            format!("declaration of `{}`", names.join(", "))
        }
        Stmt::If { .. } => "if statement".to_string(),
        Stmt::Try { .. } => "try statement".to_string(),
        Stmt::Block(_) => "block".to_string(),
    }
}

/// Renders as a single postfix-safe operand.
fn is_atomic(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Name(_)
            | Expr::StringLiteral(_)
            | Expr::Literal(_)
            | Expr::This
            | Expr::FieldAccess { .. }
            | Expr::MethodCall { .. }
            | Expr::New { .. }
            | Expr::Cast { .. }
            | Expr::Paren(_)
    )
}

fn never_null(expr: &Expr) -> bool {
    match expr {
        Expr::New { .. } | Expr::StringLiteral(_) => true,
        Expr::Literal(text) => text != "null",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::java::{TypeDecl, parse_source};
    use crate::kotlin::Imports;
    use crate::source_index::TypeRef;

    const SEND_PHOTO: &str = r#"
        package org.meta.api.methods.send;
        import lombok.*;
        @Data
        public class SendPhoto extends SendMediaBotMethod<Message> {
            public static final String PHOTO_FIELD = "photo";
            public static final String CAPTION_FIELD = "caption";
            public static final String HAS_SPOILER_FIELD = "has_spoiler";
            @NonNull private InputFile photo;
            private String caption;
            private Boolean hasSpoiler;
            private Integer messageThreadId;
        }
    "#;

    const MEDIA_BASE: &str = r#"
        package org.meta.api.methods.send;
        public abstract class SendMediaBotMethod<T> {
            public static final String CHATID_FIELD = "chat_id";
            @NonNull private String chatId;
        }
    "#;

    const CLIENT: &str = r#"
        package org.client;
        import org.meta.api.methods.send.*;

        public class Client {
            private <T> T executeMediaMethod(SendMediaBotMethod<T> method, Consumer<TelegramMultipartBuilder> setup) {
                try {
                    assertParamNotNull(method, "method");
                    String url = buildUrl(method.getMethod());
                    TelegramMultipartBuilder builder = new TelegramMultipartBuilder(objectMapper);
                    builder.addPart(SendMediaBotMethod.CHATID_FIELD, method.getChatId())
                           .addPart(SendMediaBotMethod.CHATID_FIELD, method.getChatId());
                    setup.accept(builder);
                    return sendRequest(method, url, builder.build());
                } catch (IOException e) {
                    throw new TelegramApiException(e);
                }
            }

            public CompletableFuture<Message> executeAsync(SendPhoto sendPhoto) {
                return executeMediaMethod(sendPhoto, builder -> {
                    builder.addInputFile(SendPhoto.PHOTO_FIELD, sendPhoto.getPhoto(), true)
                           .addPart(SendPhoto.CAPTION_FIELD, sendPhoto.getCaption())
                           .addPart(SendPhoto.HAS_SPOILER_FIELD, sendPhoto.getHasSpoiler());
                    if (sendPhoto.hasMessageThreadId()) {
                        builder.addPart("message_thread_id", sendPhoto.getMessageThreadId());
                    } else {
                        builder.addJsonPart("reply_markup", sendPhoto.getReplyMarkup());
                    }
                    synchronized (this) { }
                });
            }

            private void extraParts(SendPhoto sendPhoto, TelegramMultipartBuilder builder) {
                builder.addPart("caption_text", (String) sendPhoto.getCaption())
                       .addInputFile("thumbnail", new InputFile(sendPhoto.getCaption()))
                       .addPart("next_thread", sendPhoto.getMessageThreadId() + 1)
                       .addPart("limit", (int) sendPhoto.getMessageThreadId());
            }
        }
    "#;

    struct Fixture {
        index: SourceIndex,
        mapper: TypeMapper,
        class: ClassDescriptor,
        non_null: BTreeSet<String>,
        vocabulary: Vocabulary,
    }

    fn fixture() -> Fixture {
        let units = [SEND_PHOTO, MEDIA_BASE, CLIENT]
            .iter()
            .map(|s| parse_source(&PathBuf::from("T.java"), &PathBuf::from("."), s).unwrap())
            .collect();
        let index = SourceIndex::from_units(Vec::new(), units);
        let class = ClassDescriptor::build(&index, "org.meta.api.methods.send.SendPhoto").unwrap();
        let non_null = class.non_null_fields();
        Fixture {
            index,
            mapper: TypeMapper::new(),
            class,
            non_null,
            vocabulary: Vocabulary {
                part_package: "org.bots.core".to_string(),
                ..Vocabulary::default()
            },
        }
    }

    fn client(fixture: &Fixture) -> TypeRef<'_> {
        fixture.index.find_type("org.client.Client").unwrap()
    }

    fn context<'a>(fixture: &'a Fixture, client: &TypeRef<'a>, replaced: Option<&'a str>, builder: &'a str) -> TranscriptionContext<'a> {
        TranscriptionContext {
            index: &fixture.index,
            mapper: &fixture.mapper,
            scope: client.scope(),
            method: "executeAsync",
            param: "sendPhoto",
            param_class: &fixture.class,
            non_null: &fixture.non_null,
            replaced_param: replaced,
            builder_var: builder,
            vocabulary: &fixture.vocabulary,
            strict: false,
        }
    }

    fn method<'a>(decl: &'a TypeDecl, name: &str) -> &'a [Stmt] {
        decl.method(name).and_then(|m| m.body.as_deref()).unwrap()
    }

    fn lambda_body(decl: &TypeDecl) -> Vec<Stmt> {
        let body = method(decl, "executeAsync");
        let Stmt::Return(Some(Expr::MethodCall { args, .. })) = &body[0] else {
            panic!("unexpected body shape");
        };
        let Expr::Lambda {
            body: LambdaBody::Block(stmts),
            ..
        } = &args[1]
        else {
            panic!("expected lambda");
        };
        stmts.clone()
    }

    fn render(block: &CodeBlock) -> String {
        block.render(&Imports::default(), "    ", 0)
    }

    #[test]
    fn template_skips_plumbing_and_substitutes_the_parameter() {
        let fixture = fixture();
        let client = client(&fixture);
        let ctx = context(&fixture, &client, Some("method"), "builder");
        let block = StatementTranscriber::transcribe(method(client.decl, "executeMediaMethod"), &ctx).unwrap();

        assert_eq!(
            render(&block),
            "parts.add(StringPart(SendMediaBotMethod.CHATID_FIELD, sendPhoto.chatId))\n"
        );
    }

    #[test]
    fn lambda_body_respects_nullability_and_branches() {
        let fixture = fixture();
        let client = client(&fixture);
        let ctx = context(&fixture, &client, None, "builder");
        let block = StatementTranscriber::transcribe(&lambda_body(client.decl), &ctx).unwrap();

        assert_eq!(
            render(&block),
            "parts.add(FilePart(SendPhoto.PHOTO_FIELD, sendPhoto.photo))\n\
             sendPhoto.caption?.let {\n    parts.add(StringPart(SendPhoto.CAPTION_FIELD, it))\n}\n\
             sendPhoto.hasSpoiler?.let {\n    parts.add(StringPart(SendPhoto.HAS_SPOILER_FIELD, it.toString()))\n}\n\
             if (sendPhoto.hasMessageThreadId()) {\n    \
             parts.add(StringPart(\"message_thread_id\", sendPhoto.messageThreadId.toString()))\n\
             } else {\n    parts.add(JsonPart(\"reply_markup\", sendPhoto.replyMarkup))\n}\n"
        );

        let mut classes = Vec::new();
        block.collect_classes(&mut classes);
        assert!(classes.iter().any(|c| c.canonical() == "org.bots.core.FilePart"));
        assert!(classes.iter().any(|c| c.canonical() == "org.meta.api.methods.send.SendPhoto"));
    }

    #[test]
    fn constructions_casts_and_compound_values() {
        let fixture = fixture();
        let client = client(&fixture);
        let ctx = context(&fixture, &client, None, "builder");
        let block = StatementTranscriber::transcribe(method(client.decl, "extraParts"), &ctx).unwrap();

        assert_eq!(
            render(&block),
            "(sendPhoto.caption as String?)?.let {\n    parts.add(StringPart(\"caption_text\", it))\n}\n\
             parts.add(FilePart(\"thumbnail\", InputFile(sendPhoto.caption)))\n\
             (sendPhoto.messageThreadId + 1)?.let {\n    parts.add(StringPart(\"next_thread\", it.toString()))\n}\n\
             (sendPhoto.messageThreadId as Int)?.let {\n    parts.add(StringPart(\"limit\", it.toString()))\n}\n"
        );
    }

    #[test]
    fn appended_lists_share_the_duplicate_key_guard() {
        let fixture = fixture();
        let client = client(&fixture);
        let template = context(&fixture, &client, Some("method"), "builder");
        let mut transcriber = StatementTranscriber::new();
        transcriber
            .append(method(client.decl, "executeMediaMethod"), &template)
            .unwrap();
        transcriber
            .append(method(client.decl, "executeMediaMethod"), &template)
            .unwrap();
        assert_eq!(transcriber.finish().statement_count(), 1);
    }

    #[test]
    fn strict_mode_rejects_unknown_statements() {
        let fixture = fixture();
        let client = client(&fixture);
        let mut ctx = context(&fixture, &client, None, "builder");
        ctx.strict = true;
        let err = StatementTranscriber::transcribe(&lambda_body(client.decl), &ctx).unwrap_err();
        assert!(matches!(err, KtWrapError::UntranscribableStatement { .. }));
    }

    #[test]
    fn getter_names_become_properties() {
        assert_eq!(getter_property("getChatId").as_deref(), Some("chatId"));
        assert_eq!(getter_property("get"), None);
        assert_eq!(getter_property("hasChatId"), None);
    }
}
