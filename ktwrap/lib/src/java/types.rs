//! Resolved Java types.
//!
//! A [`JavaType`] is what a [`super::TypeExpr`] becomes once every name in it
//! has been resolved to a fully-qualified class name by the source index.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::KtWrapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    /// Parses a Java primitive keyword.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::UnknownPrimitive`] for anything outside the eight
    /// primitive keywords.
    pub fn from_keyword(keyword: &str) -> Result<Self, KtWrapError> {
        Ok(match keyword {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "char" => Self::Char,
            "float" => Self::Float,
            "double" => Self::Double,
            other => {
                return Err(KtWrapError::UnknownPrimitive {
                    name: other.to_string(),
                });
            }
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Primitive(Primitive),
    Void,
    Class { fqn: String, args: Vec<JavaType> },
    Array(Box<JavaType>),
    TypeVar(String),
    /// `?` (no bound), `? extends T` or `? super T`.
    Wildcard {
        bound: Option<Box<JavaType>>,
        is_super: bool,
    },
}

impl JavaType {
    pub fn class(fqn: impl Into<String>) -> Self {
        Self::Class {
            fqn: fqn.into(),
            args: Vec::new(),
        }
    }

    /// The fully-qualified name of a class type.
    pub fn fqn(&self) -> Option<&str> {
        match self {
            Self::Class { fqn, .. } => Some(fqn),
            _ => None,
        }
    }

    pub fn args(&self) -> &[JavaType] {
        match self {
            Self::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// The type with generic arguments stripped, rendered as source text.
    ///
    /// Two setters whose parameter erasures are equal accept the same
    /// runtime class, which is how overrides and field matches are decided.
    pub fn erasure(&self) -> String {
        match self {
            Self::Primitive(p) => p.keyword().to_string(),
            Self::Void => "void".to_string(),
            Self::Class { fqn, .. } => fqn.clone(),
            Self::Array(element) => format!("{}[]", element.erasure()),
            Self::TypeVar(name) => name.clone(),
            Self::Wildcard { bound, .. } => bound
                .as_ref()
                .map(|b| b.erasure())
                .unwrap_or_else(|| "java.lang.Object".to_string()),
        }
    }

    /// Replaces type variables according to `bindings`.
    pub fn substitute(&self, bindings: &BTreeMap<String, JavaType>) -> JavaType {
        match self {
            Self::TypeVar(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Class { fqn, args } => Self::Class {
                fqn: fqn.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            Self::Array(element) => Self::Array(Box::new(element.substitute(bindings))),
            Self::Wildcard { bound, is_super } => Self::Wildcard {
                bound: bound.as_ref().map(|b| Box::new(b.substitute(bindings))),
                is_super: *is_super,
            },
            Self::Primitive(_) | Self::Void => self.clone(),
        }
    }

    /// Whether this is `CompletableFuture<...>`.
    pub fn is_future(&self) -> bool {
        self.fqn() == Some("java.util.concurrent.CompletableFuture")
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.keyword()),
            Self::Void => f.write_str("void"),
            Self::Class { fqn, args } => {
                f.write_str(fqn)?;
                if !args.is_empty() {
                    let args: Vec<_> = args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            Self::Array(element) => write!(f, "{element}[]"),
            Self::TypeVar(name) => f.write_str(name),
            Self::Wildcard { bound: None, .. } => f.write_str("?"),
            Self::Wildcard {
                bound: Some(bound),
                is_super,
            } => write!(f, "? {} {bound}", if *is_super { "super" } else { "extends" }),
        }
    }
}
