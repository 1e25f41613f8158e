//! Bridges between future-returning Java methods and Kotlin callers.
//!
//! [`AsyncWrapperEmitter::suspend_wrappers`] turns
//! `CompletableFuture<Message> sendAsync(SendMessage m)` into
//! `suspend fun Client.sendK(m: SendMessage): Message`, awaiting the future.
//! [`AsyncWrapperEmitter::blocking_bridge`] goes the other way for
//! interfaces that pair `execute` with `executeAsync`, implementing the
//! blocking member by joining the async one.

use tracing::{debug, instrument};

use crate::error::KtWrapError;
use crate::java::{JavaType, MethodDecl};
use crate::kotlin::{
    AnnotationSpec, ClassName, Code, FunSpec, KotlinType, Modifier, ParamSpec, TypeSpec, TypeVariable,
    escape_identifier, string_literal,
};
use crate::source_index::{SourceIndex, TypeRef};
use crate::type_mapper::TypeMapper;

const SUPER_DEPRECATED: &str = "Super method is deprecated";

pub struct AsyncWrapperEmitter<'a> {
    index: &'a SourceIndex,
    mapper: &'a TypeMapper,
}

/// A source method with every type resolved in its own scope.
struct ResolvedMethod<'d> {
    decl: &'d MethodDecl,
    type_params: Vec<TypeVariable>,
    params: Vec<JavaType>,
    returns: JavaType,
}

impl<'a> AsyncWrapperEmitter<'a> {
    pub fn new(index: &'a SourceIndex, mapper: &'a TypeMapper) -> Self {
        Self { index, mapper }
    }

    /// Suspend extension functions on `source` for each public method
    /// returning a `CompletableFuture`. The name swaps `Async` for `K`;
    /// methods without `Async` in their name would be shadowed by the member
    /// and are skipped, as are protected ones an extension cannot reach.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::TypeNotFound`] if `source` is not indexed.
    #[instrument(skip(self))]
    pub fn suspend_wrappers(&self, source: &str) -> Result<Vec<FunSpec>, KtWrapError> {
        let type_ref = self.find(source)?;
        let receiver = self.receiver_type(&type_ref);

        let mut functions = Vec::new();
        for method in self.resolve_methods(&type_ref)? {
            let decl = method.decl;
            if !method.returns.is_future() || decl.modifiers.is_static() {
                continue;
            }
            if decl.modifiers.has("protected") {
                debug!(method = %decl.name, "Protected method is not reachable from an extension, skipping");
                continue;
            }
            if !decl.modifiers.is_public() {
                continue;
            }
            let name = decl.name.replace("Async", "K");
            if name == decl.name {
                debug!(method = %decl.name, "Name has no `Async` to replace, skipping");
                continue;
            }

            let mut fun = self.signature(&name, &method);
            fun.modifiers.push(Modifier::Suspend);
            fun.receiver = Some(receiver.clone());

            let returns = future_value(&method.returns).map(|v| self.mapper.map(&v));
            let call = format!("{}({}).await()", escape_identifier(&decl.name), call_args(decl));
            match returns {
                Some(returns) if !returns.is_unit() => {
                    fun.body_mut().statement(format!("return {call}"));
                    fun.returns = Some(returns);
                }
                _ => {
                    fun.body_mut().statement(call);
                }
            }
            functions.push(fun);
        }
        Ok(functions)
    }

    /// `abstract class Abstract<Name> : <Name>` implementing every blocking
    /// method that has an `<name>Async` sibling by joining that sibling.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::TypeNotFound`] if `source` is not indexed.
    #[instrument(skip(self))]
    pub fn blocking_bridge(&self, source: &str) -> Result<TypeSpec, KtWrapError> {
        let type_ref = self.find(source)?;
        let methods = self.resolve_methods(&type_ref)?;

        let mut bridge = TypeSpec::class(format!("Abstract{}", type_ref.decl.name));
        bridge.modifiers.push(Modifier::Abstract);
        bridge.superinterfaces.push(self.receiver_type(&type_ref));

        for method in &methods {
            let decl = method.decl;
            if method.returns.is_future() || decl.modifiers.has("default") || decl.modifiers.is_static() {
                continue;
            }
            let async_name = format!("{}Async", decl.name);
            let has_sibling = methods
                .iter()
                .any(|m| m.decl.name == async_name && m.params.len() == method.params.len());
            if !has_sibling {
                debug!(method = %decl.name, "No async sibling, skipping");
                continue;
            }

            let mut fun = self.signature(&decl.name, method);
            fun.modifiers.push(Modifier::Override);
            let call = format!("{async_name}({}).join()", call_args(decl));
            if method.returns == JavaType::Void {
                fun.body_mut().statement(call);
            } else {
                fun.body_mut().statement(format!("return {call}"));
                fun.returns = Some(self.mapper.map(&method.returns));
            }
            bridge.functions.push(fun);
        }
        Ok(bridge)
    }

    fn find(&self, fqn: &str) -> Result<TypeRef<'a>, KtWrapError> {
        self.index
            .find_type(fqn)
            .ok_or_else(|| KtWrapError::TypeNotFound { fqn: fqn.to_string() })
    }

    /// The source type with `*` for each of its type parameters.
    fn receiver_type(&self, type_ref: &TypeRef<'_>) -> KotlinType {
        KotlinType::parameterized(
            self.mapper.map_class(type_ref.fqn),
            type_ref.decl.type_params.iter().map(|_| KotlinType::Star).collect(),
        )
    }

    fn resolve_methods<'d>(&self, type_ref: &TypeRef<'d>) -> Result<Vec<ResolvedMethod<'d>>, KtWrapError> {
        let class_scope = type_ref.scope();
        type_ref
            .decl
            .methods
            .iter()
            .map(|decl| {
                let scope = class_scope.with_type_params(&decl.type_params);
                let type_params = decl
                    .type_params
                    .iter()
                    .map(|p| {
                        let bounds = p
                            .bounds
                            .iter()
                            .map(|b| self.index.resolve_type(&scope, b))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(self.mapper.map_type_param(&p.name, &bounds))
                    })
                    .collect::<Result<_, KtWrapError>>()?;
                Ok(ResolvedMethod {
                    decl,
                    type_params,
                    params: decl
                        .params
                        .iter()
                        .map(|p| self.index.resolve_type(&scope, &p.ty))
                        .collect::<Result<_, _>>()?,
                    returns: self.index.resolve_type(&scope, &decl.return_type)?,
                })
            })
            .collect()
    }

    /// Name, type variables, parameters and deprecation; body and return
    /// type are left to the caller.
    fn signature(&self, name: &str, method: &ResolvedMethod<'_>) -> FunSpec {
        let decl = method.decl;
        let mut fun = FunSpec::new(name);
        if decl.modifiers.has_annotation("Deprecated") {
            fun.annotations.push(AnnotationSpec {
                class: ClassName::new("kotlin", "Deprecated"),
                members: vec![Code::text(string_literal(SUPER_DEPRECATED))],
            });
        }
        fun.type_variables = method.type_params.clone();

        for (param, ty) in decl.params.iter().zip(&method.params) {
            let spec = match (param.varargs, ty) {
                (true, JavaType::Array(element)) => {
                    ParamSpec::new(&param.name, self.mapper.map(element)).with_modifier("vararg")
                }
                _ => ParamSpec::new(&param.name, self.mapper.map(ty)),
            };
            fun.params.push(spec);
        }
        fun
    }
}

/// The value type of a `CompletableFuture<T>`, with wildcard bounds unwrapped.
fn future_value(future: &JavaType) -> Option<JavaType> {
    match future.args().first()? {
        JavaType::Wildcard {
            bound: Some(bound),
            is_super: false,
        } => Some(bound.as_ref().clone()),
        JavaType::Wildcard { .. } => Some(JavaType::class("java.lang.Object")),
        other => Some(other.clone()),
    }
}

/// Forwarded argument list, spreading varargs.
fn call_args(decl: &MethodDecl) -> String {
    decl.params
        .iter()
        .map(|p| {
            let name = escape_identifier(&p.name);
            if p.varargs { format!("*{name}") } else { name }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
