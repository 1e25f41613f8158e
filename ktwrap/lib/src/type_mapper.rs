//! Java to Kotlin type mapping.
//!
//! A fixed table covers primitives, boxed wrappers, `String`, `Object` and
//! the collection interfaces. Parameterized types map their arguments
//! recursively and any other class passes through under its own name.
//! Results are always non-null; callers pick nullability per use site.

use crate::java::{JavaType, Primitive};
use crate::kotlin::{ClassName, KotlinType, TypeVariable, Variance};

const CLASS_TABLE: &[(&str, &str, &str)] = &[
    ("java.lang.Object", "kotlin", "Any"),
    ("java.lang.String", "kotlin", "String"),
    ("java.lang.Integer", "kotlin", "Int"),
    ("java.lang.Long", "kotlin", "Long"),
    ("java.lang.Short", "kotlin", "Short"),
    ("java.lang.Byte", "kotlin", "Byte"),
    ("java.lang.Float", "kotlin", "Float"),
    ("java.lang.Double", "kotlin", "Double"),
    ("java.lang.Character", "kotlin", "Char"),
    ("java.lang.Boolean", "kotlin", "Boolean"),
    ("java.lang.CharSequence", "kotlin", "CharSequence"),
    ("java.lang.Void", "kotlin", "Unit"),
    ("java.util.List", "kotlin.collections", "List"),
    ("java.util.Map", "kotlin.collections", "Map"),
    ("java.util.Set", "kotlin.collections", "Set"),
    ("java.util.Collection", "kotlin.collections", "Collection"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, ty: &JavaType) -> KotlinType {
        match ty {
            JavaType::Primitive(p) => KotlinType::kotlin(primitive_name(*p)),
            JavaType::Void => KotlinType::kotlin("Unit"),
            JavaType::Class { fqn, args } => {
                let class = self.map_class(fqn);
                KotlinType::parameterized(class, args.iter().map(|a| self.map(a)).collect())
            }
            JavaType::Array(element) => match element.as_ref() {
                JavaType::Primitive(p) => KotlinType::kotlin(&format!("{}Array", primitive_name(*p))),
                other => KotlinType::parameterized(ClassName::new("kotlin", "Array"), vec![self.map(other)]),
            },
            JavaType::TypeVar(name) => KotlinType::type_var(name),
            JavaType::Wildcard { bound: None, .. } => KotlinType::Star,
            JavaType::Wildcard {
                bound: Some(bound),
                is_super,
            } => KotlinType::Projection {
                variance: if *is_super { Variance::In } else { Variance::Out },
                ty: Box::new(self.map(bound)),
            },
        }
    }

    /// The Kotlin class for a Java FQN, through the fixed table.
    pub fn map_class(&self, fqn: &str) -> ClassName {
        CLASS_TABLE
            .iter()
            .find(|(java, _, _)| *java == fqn)
            .map(|(_, package, simple)| ClassName::new(*package, *simple))
            .unwrap_or_else(|| ClassName::best_guess(fqn))
    }

    /// A type variable with its bounds mapped. `Object` bounds are dropped
    /// since they say nothing in Kotlin.
    pub fn map_type_param(&self, name: &str, bounds: &[JavaType]) -> TypeVariable {
        TypeVariable {
            name: name.to_string(),
            bounds: bounds
                .iter()
                .filter(|b| b.fqn() != Some("java.lang.Object"))
                .map(|b| self.map(b))
                .collect(),
        }
    }
}

fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Boolean => "Boolean",
        Primitive::Byte => "Byte",
        Primitive::Short => "Short",
        Primitive::Int => "Int",
        Primitive::Long => "Long",
        Primitive::Char => "Char",
        Primitive::Float => "Float",
        Primitive::Double => "Double",
    }
}
