//! The multipart client class.
//!
//! JSON requests share one generic `executeAsync`. Requests carrying files
//! each get an override whose body is transcribed from the Java client's
//! template method plus the call site's builder lambda. Download helpers and
//! URL plumbing are fixed.

use tracing::{debug, instrument, warn};

use super::transcriber::{StatementTranscriber, TranscriptionContext, Vocabulary};
use crate::catalog::ClassDescriptor;
use crate::error::KtWrapError;
use crate::java::{Expr, LambdaBody, MethodDecl, Stmt};
use crate::kotlin::{
    ClassName, Code, FunSpec, KotlinType, Modifier, ParamSpec, TypeSpec, TypeVariable, escape_identifier,
};
use crate::members::NonNullCache;
use crate::source_index::{SourceIndex, TypeRef};
use crate::type_mapper::TypeMapper;

const COMPLETABLE_FUTURE: &str = "java.util.concurrent.CompletableFuture";
const MULTIPART_METHOD: &str = "executeAsync";

/// Names the generated client depends on.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Simple name of the generated class.
    pub name: String,
    /// FQN of the Java client whose multipart methods are transcribed.
    pub source: String,
    /// Name of the Java client's shared multipart method.
    pub template: String,
    /// Package of the transport types, the parts and the abstract base.
    pub core_package: String,
    pub base_class: String,
    /// FQN of the generic request type (`BotApiMethod`).
    pub api_method: String,
    pub telegram_url: String,
    /// FQN of the remote file descriptor passed to the download helpers.
    pub remote_file: String,
    pub api_exception: String,
    /// Simple name of the Java multipart builder type.
    pub multipart_builder: String,
    /// Builder variable used when no lambda names one.
    pub builder_var: String,
    pub vocabulary: Vocabulary,
    pub strict: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            name: "DefaultKTelegramClient".to_string(),
            source: String::new(),
            template: "executeMediaMethod".to_string(),
            core_package: String::new(),
            base_class: "AbstractKTelegramClient".to_string(),
            api_method: "org.telegram.telegrambots.meta.api.methods.botapimethods.BotApiMethod".to_string(),
            telegram_url: "org.telegram.telegrambots.meta.TelegramUrl".to_string(),
            remote_file: "org.telegram.telegrambots.meta.api.objects.File".to_string(),
            api_exception: "org.telegram.telegrambots.meta.exceptions.TelegramApiException".to_string(),
            multipart_builder: "TelegramMultipartBuilder".to_string(),
            builder_var: "builder".to_string(),
            vocabulary: Vocabulary::default(),
            strict: false,
        }
    }
}

pub struct ClientEmitter<'a> {
    index: &'a SourceIndex,
    mapper: &'a TypeMapper,
    cache: &'a NonNullCache,
}

impl<'a> ClientEmitter<'a> {
    pub fn new(index: &'a SourceIndex, mapper: &'a TypeMapper, cache: &'a NonNullCache) -> Self {
        Self { index, mapper, cache }
    }

    /// Builds the client class.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::TypeNotFound`] when the Java client is not
    /// indexed, [`KtWrapError::TemplateNotFound`] when it has no template
    /// method, and propagates transcription errors.
    #[instrument(skip_all, fields(client = %settings.name, source = %settings.source))]
    pub fn emit(&self, settings: &ClientSettings) -> Result<TypeSpec, KtWrapError> {
        let source = self
            .index
            .find_type(&settings.source)
            .ok_or_else(|| KtWrapError::TypeNotFound {
                fqn: settings.source.clone(),
            })?;
        let template = source
            .decl
            .method(&settings.template)
            .filter(|m| m.body.is_some())
            .ok_or_else(|| KtWrapError::TemplateNotFound {
                class: settings.source.clone(),
                method: settings.template.clone(),
            })?;

        let names = Names::new(settings, self.mapper);
        let mut client = TypeSpec::class(&settings.name);
        client.modifiers.push(Modifier::Open);
        client.superclass = Some(KotlinType::class(ClassName::new(&settings.core_package, &settings.base_class)));
        client.superclass_args = Some(Vec::new());
        client.primary_constructor = Some(constructor(&names));

        client.functions.push(json_execute(&names));
        for method in &source.decl.methods {
            if let Some(function) = self.multipart_execute(&source, method, template, settings, &names)? {
                client.functions.push(function);
            }
        }
        client.functions.push(download_stream(&names));
        client.functions.push(download_file(&names));
        client.functions.push(exception_handling(&names));
        client.functions.extend(url_helpers());
        Ok(client)
    }

    fn multipart_execute(
        &self,
        source: &TypeRef<'_>,
        method: &MethodDecl,
        template: &MethodDecl,
        settings: &ClientSettings,
        names: &Names,
    ) -> Result<Option<FunSpec>, KtWrapError> {
        let Some(body) = method.body.as_deref() else {
            return Ok(None);
        };
        let [param] = method.params.as_slice() else {
            return Ok(None);
        };
        if method.name != MULTIPART_METHOD {
            return Ok(None);
        }
        let scope = source.scope().with_type_params(&method.type_params);
        let param_type = self.index.resolve_type(&scope, &param.ty)?;
        // The generic JSON overload takes a type variable.
        let Some(param_fqn) = param_type.fqn() else {
            return Ok(None);
        };

        let mut calls_template = false;
        let mut builds_multipart = false;
        for stmt in body {
            stmt.walk_exprs(&mut |expr| match expr {
                Expr::MethodCall { name, .. } if *name == settings.template => calls_template = true,
                Expr::New { ty, .. } if ty.simple_name() == Some(settings.multipart_builder.as_str()) => {
                    builds_multipart = true
                }
                _ => {}
            });
        }
        if !calls_template && !builds_multipart {
            return Ok(None);
        }

        let class = match ClassDescriptor::build(self.index, param_fqn) {
            Ok(class) => class,
            Err(KtWrapError::TypeNotFound { fqn }) => {
                warn!(%fqn, "No parsed source for multipart parameter class, skipping");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let non_null = self.cache.get(&class);

        let param_name = escape_identifier(&param.name);
        let ctx = TranscriptionContext {
            index: self.index,
            mapper: self.mapper,
            scope: source.scope(),
            method: &method.name,
            param: &param_name,
            param_class: &class,
            non_null: non_null.as_ref(),
            replaced_param: None,
            builder_var: &settings.builder_var,
            vocabulary: &settings.vocabulary,
            strict: settings.strict,
        };
        let mut transcriber = StatementTranscriber::new();
        match template_call(body, &settings.template) {
            Some(args) => {
                let template_ctx = TranscriptionContext {
                    replaced_param: template.params.first().map(|p| p.name.as_str()),
                    ..ctx.clone()
                };
                transcriber.append(template.body.as_deref().unwrap_or_default(), &template_ctx)?;

                if let Some(Expr::Lambda { params, body }) = args.get(1) {
                    let lambda_ctx = TranscriptionContext {
                        builder_var: params.first().map_or(settings.builder_var.as_str(), String::as_str),
                        ..ctx
                    };
                    match body {
                        LambdaBody::Block(stmts) => transcriber.append(stmts, &lambda_ctx)?,
                        LambdaBody::Expr(expr) => {
                            transcriber.append(&[Stmt::Expr(expr.as_ref().clone())], &lambda_ctx)?
                        }
                    }
                }
            }
            None => transcriber.append(body, &ctx)?,
        }
        let transcribed = transcriber.finish();
        debug!(
            method = %method.name,
            param = %param_fqn,
            statements = transcribed.statement_count(),
            "Transcribed multipart method"
        );

        let mut fun = FunSpec::new(MULTIPART_METHOD);
        fun.modifiers.push(Modifier::Override);
        fun.params.push(ParamSpec::new(&param.name, self.mapper.map(&param_type)));
        fun.returns = Some(self.mapper.map(&self.index.resolve_type(&scope, &method.return_type)?));

        let mut parts = Code::text("val parts = mutableListOf<");
        parts.push_type(names.part.clone()).push_str(">()");
        fun.body_mut()
            .begin_control_flow(format!("return withExceptionHandling({param_name}.method)"))
            .statement(format!("val url = getBotUrl() + {param_name}.method"))
            .statement(parts)
            .extend(transcribed)
            .statement(format!(
                "executor.executeMultipart(url, parts).thenApply {{ responseJson -> deserializer.deserialize(responseJson, {param_name}) }}"
            ))
            .end_control_flow();
        Ok(Some(fun))
    }
}

/// Kotlin types the fixed members reference.
struct Names {
    core: String,
    part: KotlinType,
    future: ClassName,
    api_method: ClassName,
    telegram_url: KotlinType,
    remote_file: KotlinType,
    api_exception: KotlinType,
}

impl Names {
    fn new(settings: &ClientSettings, mapper: &TypeMapper) -> Self {
        Self {
            core: settings.core_package.clone(),
            part: KotlinType::class(ClassName::new(&settings.core_package, "Part")),
            future: ClassName::best_guess(COMPLETABLE_FUTURE),
            api_method: mapper.map_class(&settings.api_method),
            telegram_url: KotlinType::class(mapper.map_class(&settings.telegram_url)),
            remote_file: KotlinType::class(mapper.map_class(&settings.remote_file)),
            api_exception: KotlinType::class(mapper.map_class(&settings.api_exception)),
        }
    }

    fn core_type(&self, name: &str) -> KotlinType {
        KotlinType::class(ClassName::new(&self.core, name))
    }

    fn future_of(&self, value: KotlinType) -> KotlinType {
        KotlinType::parameterized(self.future.clone(), vec![value])
    }
}

fn constructor(names: &Names) -> Vec<ParamSpec> {
    let mut default_url = Code::new();
    default_url.push_type(names.telegram_url.clone()).push_str(".DEFAULT_URL");
    vec![
        ParamSpec::new("token", KotlinType::kotlin("String")).as_property("override val"),
        ParamSpec::new("telegramUrl", names.telegram_url.clone())
            .with_default(default_url)
            .as_property("override val"),
        ParamSpec::new("executor", names.core_type("HttpExecutor")).as_property("override val"),
        ParamSpec::new("serializer", names.core_type("BotSerializer")).as_property("override val"),
        ParamSpec::new("deserializer", names.core_type("BotDeserializer")).as_property("override val"),
    ]
}

fn json_execute(names: &Names) -> FunSpec {
    let t = KotlinType::type_var("T");
    let mut fun = FunSpec::new(MULTIPART_METHOD);
    fun.modifiers.push(Modifier::Override);
    fun.type_variables = vec![
        TypeVariable {
            name: "T".to_string(),
            bounds: vec![KotlinType::class(ClassName::new("java.io", "Serializable"))],
        },
        TypeVariable {
            name: "M".to_string(),
            bounds: vec![KotlinType::parameterized(names.api_method.clone(), vec![t.clone()])],
        },
    ];
    fun.params.push(ParamSpec::new("method", KotlinType::type_var("M")));
    fun.returns = Some(names.future_of(t));
    fun.body_mut()
        .begin_control_flow("return withExceptionHandling(method.method)")
        .statement("val url = getBotUrl() + method.method")
        .statement("val jsonBody = serializer.serialize(method)")
        .statement(
            "executor.executeJson(url, jsonBody).thenApply { responseJson -> deserializer.deserialize(responseJson, method) }",
        )
        .end_control_flow();
    fun
}

fn download_stream(names: &Names) -> FunSpec {
    let mut fun = FunSpec::new("downloadFileAsStreamAsync");
    fun.modifiers.push(Modifier::Override);
    fun.params.push(ParamSpec::new("file", names.remote_file.clone()));
    fun.returns = Some(names.future_of(KotlinType::class(ClassName::new("java.io", "InputStream"))));

    let mut file_path = Code::text("val filePath = file.filePath ?: throw ");
    file_path
        .push_type(names.api_exception.clone())
        .push_str("(\"File path is empty\")");
    fun.body_mut()
        .begin_control_flow("return withExceptionHandling(file.filePath ?: \"file\")")
        .statement(file_path)
        .statement("val fileUrl = getBotFileUrl() + filePath")
        .statement("executor.downloadFile(fileUrl)")
        .end_control_flow();
    fun
}

fn download_file(names: &Names) -> FunSpec {
    let local_file = KotlinType::class(ClassName::new("java.io", "File"));
    let mut fun = FunSpec::new("downloadFileAsync");
    fun.modifiers.push(Modifier::Override);
    fun.params.push(ParamSpec::new("file", names.remote_file.clone()));
    fun.returns = Some(names.future_of(local_file.clone()));

    let mut temp = Code::text("val outputFile = ");
    temp.push_type(local_file)
        .push_str(".createTempFile(\"telegram\", \"download\")");
    fun.body_mut()
        .begin_control_flow("return downloadFileAsStreamAsync(file).thenApply { stream ->")
        .statement(temp)
        .begin_control_flow("stream.use { input ->")
        .begin_control_flow("outputFile.outputStream().use { output ->")
        .statement("input.copyTo(output)")
        .end_control_flow()
        .end_control_flow()
        .statement("outputFile")
        .end_control_flow();
    fun
}

fn exception_handling(names: &Names) -> FunSpec {
    let future_t = names.future_of(KotlinType::type_var("T"));
    let mut fun = FunSpec::new("withExceptionHandling");
    fun.modifiers.extend([Modifier::Protected, Modifier::Inline]);
    fun.type_variables.push(TypeVariable {
        name: "T".to_string(),
        bounds: Vec::new(),
    });
    fun.params.push(ParamSpec::new("methodName", KotlinType::kotlin("String")));
    fun.params.push(
        ParamSpec::new(
            "block",
            KotlinType::Lambda {
                params: Vec::new(),
                returns: Box::new(future_t.clone()),
            },
        )
        .with_modifier("crossinline"),
    );
    fun.returns = Some(future_t);

    let future = KotlinType::class(names.future.clone());
    let mut api_catch = Code::text("catch (e: ");
    api_catch.push_type(names.api_exception.clone()).push_str(")");
    let mut api_failed = Code::new();
    api_failed.push_type(future.clone()).push_str(".failedFuture(e)");
    let mut io_catch = Code::text("catch (e: ");
    io_catch
        .push_type(KotlinType::class(ClassName::new("java.io", "IOException")))
        .push_str(")");
    let mut io_failed = Code::new();
    io_failed
        .push_type(future)
        .push_str(".failedFuture(")
        .push_type(names.api_exception.clone())
        .push_str("(\"Unable to execute $methodName\", e))");

    fun.body_mut()
        .begin_control_flow("return try")
        .statement("block()")
        .next_control_flow(api_catch)
        .statement(api_failed)
        .next_control_flow(io_catch)
        .statement(io_failed)
        .end_control_flow();
    fun
}

fn url_helpers() -> Vec<FunSpec> {
    [
        (
            "getTelegramUrl",
            "return telegramUrl.let { \"${it.schema}://${it.host}:${it.port}\" + if (it.isTestServer) \"/test\" else \"\" }",
        ),
        ("getBotFileUrl", "return \"${getTelegramUrl()}/file/bot$token/\""),
        ("getBotUrl", "return \"${getTelegramUrl()}/bot$token/\""),
    ]
    .into_iter()
    .map(|(name, body)| {
        let mut fun = FunSpec::new(name);
        fun.modifiers.push(Modifier::Private);
        fun.returns = Some(KotlinType::kotlin("String"));
        fun.body_mut().statement(body);
        fun
    })
    .collect()
}

/// Arguments of the first call to `template` anywhere in `body`.
fn template_call<'s>(body: &'s [Stmt], template: &str) -> Option<&'s [Expr]> {
    body.iter().find_map(|stmt| find_call(stmt, template))
}

fn find_call<'s>(stmt: &'s Stmt, template: &str) -> Option<&'s [Expr]> {
    match stmt {
        Stmt::Expr(expr) | Stmt::Return(Some(expr)) => find_call_expr(expr, template),
        Stmt::LocalVar { declarators, .. } => declarators
            .iter()
            .filter_map(|(_, init)| init.as_ref())
            .find_map(|e| find_call_expr(e, template)),
        Stmt::Block(stmts) | Stmt::Try { body: stmts, .. } => stmts.iter().find_map(|s| find_call(s, template)),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => find_call(then_branch, template).or_else(|| else_branch.as_deref().and_then(|e| find_call(e, template))),
        Stmt::Return(None) | Stmt::Other { .. } => None,
    }
}

fn find_call_expr<'s>(expr: &'s Expr, template: &str) -> Option<&'s [Expr]> {
    match expr {
        Expr::MethodCall { name, args, .. } if name == template => Some(args.as_slice()),
        Expr::MethodCall { object, args, .. } => object
            .as_deref()
            .and_then(|o| find_call_expr(o, template))
            .or_else(|| args.iter().find_map(|a| find_call_expr(a, template))),
        Expr::Cast { expr, .. } | Expr::Paren(expr) => find_call_expr(expr, template),
        _ => None,
    }
}
