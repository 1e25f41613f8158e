//! Construction functions generated from a class's setters.
//!
//! Two styles share one body shape: instantiate the class, apply required
//! setters unconditionally and optional ones behind a null check.
//!
//! ```text
//! fun sendMessage(chatId: String, text: String? = null): SendMessage
//! suspend fun TelegramClient.sendMessage(chatId: String, text: String? = null): Message
//! ```

use tracing::debug;

use super::decapitalize;
use crate::catalog::ClassDescriptor;
use crate::kotlin::{
    AnnotationSpec, ClassName, Code, FunSpec, KotlinType, Modifier, ParamSpec, escape_identifier,
};
use crate::members::{Combination, MemberModel, Mutator};
use crate::type_mapper::TypeMapper;

const SERIALIZABLE: &str = "java.io.Serializable";

#[derive(Debug, Clone)]
pub enum BuilderStyle {
    /// `fun sendMessage(...): SendMessage` returning the built object.
    Object,
    /// `suspend fun Receiver.sendMessage(...)` executing the built request.
    ApiCall {
        receiver: ClassName,
        /// Name of the receiver's future-returning execute method.
        execute: String,
        /// FQN of the request base type whose first type argument is the
        /// response type.
        base: String,
    },
}

pub struct BuilderEmitter<'a> {
    mapper: &'a TypeMapper,
}

impl<'a> BuilderEmitter<'a> {
    pub fn new(mapper: &'a TypeMapper) -> Self {
        Self { mapper }
    }

    /// One function per setter combination of `model`. Returns nothing for
    /// a class without setters, or an API-call class whose response type
    /// cannot be determined.
    pub fn emit(&self, class: &ClassDescriptor, model: &MemberModel, style: &BuilderStyle) -> Vec<FunSpec> {
        if model.is_empty() {
            debug!(class = %class.fqn, "No setters, skipping");
            return Vec::new();
        }

        let response = match style {
            BuilderStyle::Object => None,
            BuilderStyle::ApiCall { base, .. } => {
                let Some(first) = class.supertype_args(base).and_then(|args| args.first()) else {
                    debug!(class = %class.fqn, %base, "No response type argument, skipping");
                    return Vec::new();
                };
                Some(if first.fqn() == Some(SERIALIZABLE) {
                    KotlinType::kotlin("Unit")
                } else {
                    self.mapper.map(first)
                })
            }
        };

        model
            .combinations()
            .iter()
            .map(|combination| self.function(class, model, combination, style, response.as_ref()))
            .collect()
    }

    fn function(
        &self,
        class: &ClassDescriptor,
        model: &MemberModel,
        combination: &Combination<'_>,
        style: &BuilderStyle,
        response: Option<&KotlinType>,
    ) -> FunSpec {
        let class_type = KotlinType::class(ClassName::best_guess(&class.fqn));
        let mut fun = FunSpec::new(decapitalize(&class.simple_name));

        for mutator in &combination.required {
            fun.params.push(ParamSpec::new(&mutator.property, mutator.kotlin_type.clone()));
        }
        for mutator in &combination.optional {
            fun.params.push(ParamSpec::optional(&mutator.property, mutator.kotlin_type.clone()));
        }
        if let Some(message) = model.deprecation_for(combination) {
            fun.annotations.push(AnnotationSpec::deprecated(&message));
        }

        let target = match style {
            BuilderStyle::Object => "obj",
            BuilderStyle::ApiCall { .. } => "apiMethod",
        };
        let body = fun.body_mut();
        let mut create = Code::text(format!("val {target} = "));
        create.push_type(class_type.clone()).push_str("()");
        body.statement(create);

        for mutator in &combination.required {
            body.statement(assignment(target, mutator));
        }
        for mutator in &combination.optional {
            let name = escape_identifier(&mutator.property);
            body.begin_control_flow(format!("if ({name} != null)"))
                .statement(assignment(target, mutator))
                .end_control_flow();
        }

        match (style, response) {
            (BuilderStyle::ApiCall { receiver, execute, .. }, Some(response)) => {
                fun.modifiers.push(Modifier::Suspend);
                fun.receiver = Some(KotlinType::class(receiver.clone()));
                fun.kdoc = Some(format!(
                    "Extension function for [{receiver}.{execute}] and [{class}].\n\n@see {class}",
                    receiver = receiver.simple_names.join("."),
                    class = class.simple_name,
                ));
                let call = format!("this.{execute}({target}).await()");
                let body = fun.body_mut();
                if response.is_unit() {
                    body.statement(call);
                } else {
                    let mut ret = Code::text(format!("return {call} as "));
                    ret.push_type(response.clone());
                    body.statement(ret);
                }
                fun.returns = Some(response.clone());
            }
            _ => {
                fun.body_mut().statement(format!("return {target}"));
                fun.returns = Some(class_type);
            }
        }
        fun
    }
}

/// `obj.chatId = chatId` when the setter takes the field's own type,
/// otherwise `obj.setChatId(chatId)`.
fn assignment(target: &str, mutator: &Mutator) -> String {
    let name = escape_identifier(&mutator.property);
    if mutator.property_access {
        format!("{target}.{name} = {name}")
    } else {
        format!("{target}.{}({name})", mutator.setter)
    }
}
