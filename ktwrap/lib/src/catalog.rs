//! The reflected view of the wrapped library, rebuilt from its sources.
//!
//! A compiled class exposes members its source does not spell out: Lombok
//! accessors, implicit constructors, members inherited through generic
//! superclasses. [`ClassDescriptor::build`] reconstructs that surface from
//! the parsed declarations, flattening the superclass chain once so later
//! stages never walk it again. [`TypeCatalog::scan`] enumerates the
//! classes a target generates for.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::KtWrapError;
use crate::java::{self, Annotation, FieldDecl, JavaType, MethodDecl, Modifiers, TypeKind};
use crate::source_index::{MAX_SUPERCLASS_DEPTH, Scope, SourceIndex, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    fn of(modifiers: &Modifiers) -> Self {
        if modifiers.has("public") {
            Self::Public
        } else if modifiers.has("protected") {
            Self::Protected
        } else if modifiers.has("private") {
            Self::Private
        } else {
            Self::Package
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    /// Declared type with the superclass chain's type arguments applied.
    pub ty: JavaType,
    pub declaring_class: String,
    /// Carries a `@NonNull` marker.
    pub non_null: bool,
    pub is_static: bool,
    pub deprecated: bool,
    /// Text of the field's javadoc `@deprecated` tag.
    pub deprecation_note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<(String, JavaType)>,
    pub return_type: JavaType,
    pub type_params: Vec<(String, Vec<JavaType>)>,
    pub declaring_class: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_default: bool,
    pub deprecated: bool,
    pub deprecation_note: Option<String>,
    /// Generated by Lombok rather than written in source.
    pub synthesized: bool,
}

impl MethodDescriptor {
    /// Name plus erased parameter types; equal keys override each other.
    fn signature_key(&self) -> String {
        let params: Vec<_> = self.params.iter().map(|(_, ty)| ty.erasure()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// One class of the wrapped library as the generator sees it.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub fqn: String,
    pub simple_name: String,
    pub package: String,
    pub kind: TypeKind,
    pub is_public: bool,
    pub is_abstract: bool,
    pub default_constructible: bool,
    /// Class-level deprecation message, present iff the class is deprecated.
    pub deprecation: Option<String>,
    pub type_params: Vec<String>,
    /// Every supertype, superclass chain first, with type arguments
    /// substituted down to this class.
    pub ancestors: Vec<JavaType>,
    /// Fields across the superclass chain, subclass first, unique by name.
    pub fields: Vec<FieldDescriptor>,
    /// Methods across the superclass chain, subclass first, unique by
    /// name and erased parameter types.
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Builds the descriptor for an indexed type.
    ///
    /// ## Errors
    /// Returns [`KtWrapError::TypeNotFound`] if `fqn` is not indexed and
    /// propagates [`KtWrapError::UnknownPrimitive`] from member types.
    pub fn build(index: &SourceIndex, fqn: &str) -> Result<Self, KtWrapError> {
        let type_ref = index.find_type(fqn).ok_or_else(|| KtWrapError::TypeNotFound {
            fqn: fqn.to_string(),
        })?;
        let decl = type_ref.decl;

        let deprecation = decl.modifiers.has_annotation("Deprecated").then(|| {
            decl.javadoc
                .as_deref()
                .and_then(java::deprecated_tag)
                .unwrap_or_else(|| format!("Class {} is deprecated.", decl.name))
        });

        let mut descriptor = Self {
            fqn: type_ref.fqn.to_string(),
            simple_name: decl.name.clone(),
            package: type_ref.package().to_string(),
            kind: decl.kind,
            is_public: decl.modifiers.is_public(),
            is_abstract: decl.is_abstract() || decl.kind == TypeKind::Interface,
            default_constructible: is_default_constructible(index, &type_ref),
            deprecation,
            type_params: decl.type_params.iter().map(|p| p.name.clone()).collect(),
            ancestors: collect_ancestors(index, &type_ref)?,
            fields: Vec::new(),
            methods: Vec::new(),
        };
        descriptor.flatten_members(index, type_ref)?;
        Ok(descriptor)
    }

    fn flatten_members(&mut self, index: &SourceIndex, start: TypeRef<'_>) -> Result<(), KtWrapError> {
        let mut seen_fields = BTreeSet::new();
        let mut seen_methods = BTreeSet::new();
        let mut current = Some((start, BTreeMap::new()));
        let mut depth = 0;

        while let Some((type_ref, bindings)) = current.take() {
            let scope = type_ref.scope();
            let decl = type_ref.decl;

            for field in &decl.fields {
                if !seen_fields.insert(field.name.clone()) {
                    continue;
                }
                let ty = index.resolve_type(&scope, &field.ty)?.substitute(&bindings);
                self.fields.push(FieldDescriptor {
                    name: field.name.clone(),
                    ty,
                    declaring_class: type_ref.fqn.to_string(),
                    non_null: field.modifiers.has_annotation("NonNull"),
                    is_static: field.modifiers.is_static(),
                    deprecated: field.modifiers.has_annotation("Deprecated"),
                    deprecation_note: field.javadoc.as_deref().and_then(java::deprecated_tag),
                });
            }

            let mut declared = Vec::new();
            for method in &decl.methods {
                declared.push(describe_method(index, &scope, type_ref.fqn, method, &bindings)?);
            }
            for field in &decl.fields {
                if let Some(setter) = synthesize_setter(index, &scope, &type_ref, field, &bindings)? {
                    declared.push(setter);
                }
            }
            for method in declared {
                if seen_methods.insert(method.signature_key()) {
                    self.methods.push(method);
                }
            }

            depth += 1;
            if depth > MAX_SUPERCLASS_DEPTH {
                break;
            }
            let Some(JavaType::Class { fqn, args }) = index.superclass_of(&type_ref)? else {
                break;
            };
            let Some(parent) = index.find_type(&fqn) else {
                break;
            };
            let args: Vec<JavaType> = args.iter().map(|a| a.substitute(&bindings)).collect();
            current = Some((parent, bind(&parent, &args)));
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of `@NonNull` fields across the whole chain.
    pub fn non_null_fields(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter(|f| f.non_null)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Type arguments this class supplies to `base`, e.g. `[Message]` for
    /// `SendPhoto` and `BotApiMethod`.
    pub fn supertype_args(&self, base: &str) -> Option<&[JavaType]> {
        self.ancestors
            .iter()
            .find(|a| a.fqn() == Some(base))
            .map(JavaType::args)
    }

    pub fn is_assignable_to(&self, base: &str) -> bool {
        self.fqn == base || self.ancestors.iter().any(|a| a.fqn() == Some(base))
    }
}

/// Type-variable bindings for `type_ref` given the arguments a subclass passed.
fn bind(type_ref: &TypeRef<'_>, args: &[JavaType]) -> BTreeMap<String, JavaType> {
    type_ref
        .decl
        .type_params
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.name.clone(), arg.clone()))
        .collect()
}

fn collect_ancestors(index: &SourceIndex, start: &TypeRef<'_>) -> Result<Vec<JavaType>, KtWrapError> {
    let mut ancestors: Vec<JavaType> = Vec::new();
    let mut visited = BTreeSet::from([start.fqn.to_string()]);
    let mut queue = VecDeque::from([(*start, BTreeMap::new())]);

    while let Some((type_ref, bindings)) = queue.pop_front() {
        let scope = type_ref.scope();
        let supertypes = index
            .superclass_of(&type_ref)?
            .into_iter()
            .chain(
                type_ref
                    .decl
                    .interfaces
                    .iter()
                    .map(|i| index.resolve_type(&scope, i))
                    .collect::<Result<Vec<_>, _>>()?,
            );

        for supertype in supertypes {
            let supertype = supertype.substitute(&bindings);
            let Some(fqn) = supertype.fqn().map(str::to_string) else {
                continue;
            };
            if !visited.insert(fqn.clone()) {
                continue;
            }
            if let Some(parent) = index.find_type(&fqn) {
                queue.push_back((parent, bind(&parent, supertype.args())));
            }
            ancestors.push(supertype);
        }
    }
    Ok(ancestors)
}

fn describe_method(
    index: &SourceIndex,
    class_scope: &Scope<'_>,
    declaring_class: &str,
    method: &MethodDecl,
    class_bindings: &BTreeMap<String, JavaType>,
) -> Result<MethodDescriptor, KtWrapError> {
    let scope = class_scope.with_type_params(&method.type_params);
    // Method type variables shadow the class's.
    let mut bindings = class_bindings.clone();
    for param in &method.type_params {
        bindings.remove(&param.name);
    }

    let params = method
        .params
        .iter()
        .map(|p| Ok((p.name.clone(), index.resolve_type(&scope, &p.ty)?.substitute(&bindings))))
        .collect::<Result<Vec<_>, KtWrapError>>()?;
    let type_params = method
        .type_params
        .iter()
        .map(|p| {
            let bounds = p
                .bounds
                .iter()
                .map(|b| Ok(index.resolve_type(&scope, b)?.substitute(&bindings)))
                .collect::<Result<Vec<_>, KtWrapError>>()?;
            Ok((p.name.clone(), bounds))
        })
        .collect::<Result<Vec<_>, KtWrapError>>()?;

    Ok(MethodDescriptor {
        name: method.name.clone(),
        params,
        return_type: index.resolve_type(&scope, &method.return_type)?.substitute(&bindings),
        type_params,
        declaring_class: declaring_class.to_string(),
        visibility: Visibility::of(&method.modifiers),
        is_static: method.modifiers.is_static(),
        is_default: method.modifiers.has("default"),
        deprecated: method.modifiers.has_annotation("Deprecated"),
        deprecation_note: method.javadoc.as_deref().and_then(java::deprecated_tag),
        synthesized: false,
    })
}

/// `@Setter(AccessLevel.X)` and friends restrict access unless `X` is `PUBLIC`.
fn restricts_access(annotation: &Annotation) -> bool {
    annotation
        .arguments
        .as_deref()
        .is_some_and(|args| args.contains("AccessLevel.") && !args.contains("AccessLevel.PUBLIC"))
}

/// The Lombok setter a field produces, if any.
fn synthesize_setter(
    index: &SourceIndex,
    scope: &Scope<'_>,
    owner: &TypeRef<'_>,
    field: &FieldDecl,
    bindings: &BTreeMap<String, JavaType>,
) -> Result<Option<MethodDescriptor>, KtWrapError> {
    let class_modifiers = &owner.decl.modifiers;
    if field.modifiers.is_static() || field.modifiers.has("final") {
        return Ok(None);
    }

    let wants_setter = match field.modifiers.annotation("Setter") {
        Some(setter) => !restricts_access(setter),
        None => {
            class_modifiers.has_annotation("Data")
                || class_modifiers
                    .annotation("Setter")
                    .is_some_and(|s| !restricts_access(s))
        }
    };
    if !wants_setter {
        return Ok(None);
    }

    let is_primitive_boolean = matches!(&field.ty, java::TypeExpr::Primitive(p) if p == "boolean");
    let base = match field.name.strip_prefix("is") {
        Some(rest) if is_primitive_boolean && rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
        _ => field.name.as_str(),
    };
    let name = format!("set{}", capitalize(base));

    let clashes = owner.decl.methods.iter().any(|m| {
        m.name.eq_ignore_ascii_case(&name)
            && m.params.len() == 1
            && !m.modifiers.has_annotation("Tolerate")
    });
    if clashes {
        return Ok(None);
    }

    Ok(Some(MethodDescriptor {
        name,
        params: vec![(
            field.name.clone(),
            index.resolve_type(scope, &field.ty)?.substitute(bindings),
        )],
        return_type: JavaType::Void,
        type_params: Vec::new(),
        declaring_class: owner.fqn.to_string(),
        visibility: Visibility::Public,
        is_static: false,
        is_default: false,
        deprecated: field.modifiers.has_annotation("Deprecated"),
        deprecation_note: field.javadoc.as_deref().and_then(java::deprecated_tag),
        synthesized: true,
    }))
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_default_constructible(index: &SourceIndex, type_ref: &TypeRef<'_>) -> bool {
    let decl = type_ref.decl;
    if decl.kind != TypeKind::Class {
        return false;
    }

    // Inner (non-static) classes need an enclosing instance.
    if let Some((parent, _)) = type_ref.fqn.rsplit_once('.')
        && let Some(outer) = index.find_type(parent)
        && outer.decl.kind != TypeKind::Interface
        && !decl.modifiers.is_static()
    {
        return false;
    }

    let modifiers = &decl.modifiers;
    let public_lombok = |name: &str| modifiers.annotation(name).map(|a| !restricts_access(a));

    if public_lombok("NoArgsConstructor") == Some(true) {
        return true;
    }
    if !decl.constructors.is_empty() {
        return decl
            .constructors
            .iter()
            .any(|c| c.params.is_empty() && c.modifiers.is_public());
    }

    let instance_fields: Vec<&FieldDecl> = decl
        .fields
        .iter()
        .filter(|f| !f.modifiers.is_static())
        .collect();
    let required_args = instance_fields
        .iter()
        .filter(|f| {
            (f.modifiers.has("final") && !f.has_initializer) || f.modifiers.has_annotation("NonNull")
        })
        .count();

    if let Some(public) = public_lombok("RequiredArgsConstructor") {
        return public && required_args == 0;
    }
    if let Some(public) = public_lombok("AllArgsConstructor") {
        return public && instance_fields.is_empty();
    }
    if ["Builder", "SuperBuilder", "NoArgsConstructor"]
        .iter()
        .any(|a| modifiers.has_annotation(a))
    {
        return false;
    }
    if modifiers.has_annotation("Data") {
        return required_args == 0;
    }
    true
}

/// Compiled class entries, as listed from a jar or classes directory.
#[derive(Debug, Clone, Default)]
pub struct ClasspathListing {
    classes: BTreeSet<String>,
}

impl ClasspathListing {
    /// ## Errors
    /// Returns an error if the listing file cannot be read.
    pub fn load(path: &Path) -> Result<Self, KtWrapError> {
        let text = std::fs::read_to_string(path).map_err(|source| KtWrapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// One entry per line, `a/b/C$D.class`. Anonymous classes (a `$`
    /// segment made of digits) and non-class lines are skipped.
    pub fn parse(text: &str) -> Self {
        let classes = text
            .lines()
            .filter_map(|line| class_entry_fqn(line.trim()))
            .collect();
        Self { classes }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

fn class_entry_fqn(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(".class")?;
    let (package, name) = stem.rsplit_once('/').unwrap_or(("", stem));
    if name == "module-info" || name == "package-info" {
        return None;
    }
    let names: Vec<&str> = name.split('$').collect();
    if names
        .iter()
        .any(|n| n.is_empty() || n.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let mut fqn = package.replace('/', ".");
    for n in names {
        if !fqn.is_empty() {
            fqn.push('.');
        }
        fqn.push_str(n);
    }
    Some(fqn)
}

/// Enumerates generation candidates.
pub struct TypeCatalog;

impl TypeCatalog {
    /// Public, concrete, default-constructible classes under `namespace`
    /// assignable to `base`, sorted by FQN.
    ///
    /// Candidates come from `listing` when given, otherwise from every
    /// indexed type. A listed class without parsed source is skipped with a
    /// warning; a class of the wrong shape is skipped silently.
    ///
    /// ## Errors
    /// Propagates [`KtWrapError::UnknownPrimitive`] from member types.
    #[instrument(skip(index, listing), fields(namespace = %namespace))]
    pub fn scan(
        index: &SourceIndex,
        listing: Option<&ClasspathListing>,
        namespace: &str,
        base: Option<&str>,
    ) -> Result<Vec<ClassDescriptor>, KtWrapError> {
        let in_namespace = |fqn: &str| {
            namespace.is_empty()
                || fqn == namespace
                || fqn.strip_prefix(namespace).is_some_and(|rest| rest.starts_with('.'))
        };

        let candidates: BTreeSet<&str> = match listing {
            Some(listing) => listing.classes().filter(|f| in_namespace(f)).collect(),
            None => index.fqns().filter(|f| in_namespace(f)).collect(),
        };

        let mut classes = Vec::new();
        for fqn in candidates {
            if index.find_type(fqn).is_none() {
                warn!(%fqn, "No parsed source for class, skipping");
                continue;
            }
            let class = ClassDescriptor::build(index, fqn)?;
            let reason = if class.kind != TypeKind::Class {
                Some("not a class")
            } else if !class.is_public {
                Some("not public")
            } else if class.is_abstract {
                Some("abstract")
            } else if !class.default_constructible {
                Some("no public no-arg constructor")
            } else if base.is_some_and(|b| !class.is_assignable_to(b)) {
                Some("not assignable to base type")
            } else {
                None
            };
            match reason {
                Some(reason) => debug!(%fqn, reason, "Filtered out candidate"),
                None => classes.push(class),
            }
        }
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::java::parse_source;

    fn index(files: &[(&str, &str)]) -> SourceIndex {
        let units = files
            .iter()
            .map(|(path, source)| parse_source(&PathBuf::from(path), &PathBuf::from("."), source).unwrap())
            .collect();
        SourceIndex::from_units(Vec::new(), units)
    }

    const BASE: &str = r#"
        package org.meta.api.methods;
        import lombok.*;
        public abstract class BotApiMethod<T extends java.io.Serializable> extends PartialBotApiMethod<T> {
        }
    "#;

    const PARTIAL: &str = r#"
        package org.meta.api.methods;
        import org.meta.api.interfaces.BotApiObject;
        public abstract class PartialBotApiMethod<R> implements BotApiObject {
            public String method;
        }
    "#;

    const SEND: &str = r#"
        package org.meta.api.methods.send;
        import lombok.*;
        import org.meta.api.methods.BotApiMethod;
        import org.meta.api.objects.Message;

        @Data
        @NoArgsConstructor
        public class SendMessage extends BotApiMethod<Message> {
            public static final String PATH = "sendMessage";
            @NonNull
            private String chatId;
            private Integer messageThreadId;
            /** @deprecated Use linkPreviewOptions */
            @Deprecated
            private Boolean disableWebPagePreview;
            private boolean isProtected;
            @Setter(AccessLevel.NONE)
            private String internal;

            @Tolerate
            public void setChatId(@NonNull Long chatId) { this.chatId = chatId.toString(); }
        }
    "#;

    fn meta_index() -> SourceIndex {
        index(&[
            ("BotApiMethod.java", BASE),
            ("PartialBotApiMethod.java", PARTIAL),
            ("SendMessage.java", SEND),
            (
                "BotApiObject.java",
                "package org.meta.api.interfaces; public interface BotApiObject {}",
            ),
            ("Message.java", "package org.meta.api.objects; public class Message implements org.meta.api.interfaces.BotApiObject {}"),
        ])
    }

    #[test]
    fn synthesizes_lombok_setters_and_keeps_tolerated_overloads() {
        let index = meta_index();
        let class = ClassDescriptor::build(&index, "org.meta.api.methods.send.SendMessage").unwrap();

        let setters: Vec<_> = class
            .methods
            .iter()
            .filter(|m| m.name.starts_with("set"))
            .map(|m| format!("{}({})", m.name, m.params[0].1.erasure()))
            .collect();
        assert!(setters.contains(&"setChatId(java.lang.Long)".to_string()));
        assert!(setters.contains(&"setChatId(java.lang.String)".to_string()));
        assert!(setters.contains(&"setProtected(boolean)".to_string()));
        assert!(!setters.iter().any(|s| s.starts_with("setInternal")));
        assert!(!setters.iter().any(|s| s.starts_with("setPATH")));

        let deprecated = class
            .methods
            .iter()
            .find(|m| m.name == "setDisableWebPagePreview")
            .unwrap();
        assert!(deprecated.deprecated);
        assert_eq!(deprecated.deprecation_note.as_deref(), Some("Use linkPreviewOptions"));
    }

    #[test]
    fn flattens_fields_and_resolves_generic_supertypes() {
        let index = meta_index();
        let class = ClassDescriptor::build(&index, "org.meta.api.methods.send.SendMessage").unwrap();

        assert!(class.field("method").is_some());
        assert_eq!(class.non_null_fields(), BTreeSet::from(["chatId".to_string()]));
        assert!(class.is_assignable_to("org.meta.api.interfaces.BotApiObject"));
        assert_eq!(
            class.supertype_args("org.meta.api.methods.BotApiMethod").unwrap(),
            &[JavaType::class("org.meta.api.objects.Message")]
        );
        // Substituted through the intermediate generic class.
        assert_eq!(
            class.supertype_args("org.meta.api.methods.PartialBotApiMethod").unwrap(),
            &[JavaType::class("org.meta.api.objects.Message")]
        );
        assert!(class.default_constructible);
    }

    #[test]
    fn scan_filters_abstract_and_unconstructible_classes() {
        let mut files = vec![
            ("BotApiMethod.java", BASE),
            ("PartialBotApiMethod.java", PARTIAL),
            ("SendMessage.java", SEND),
        ];
        files.push((
            "GetMe.java",
            "package org.meta.api.methods; public class GetMe extends BotApiMethod<User> { private GetMe(int x) {} }",
        ));
        files.push((
            "Hidden.java",
            "package org.meta.api.methods; class Hidden extends BotApiMethod<User> {}",
        ));
        let index = index(&files);
        let classes = TypeCatalog::scan(
            &index,
            None,
            "org.meta.api.methods",
            Some("org.meta.api.methods.BotApiMethod"),
        )
        .unwrap();
        let names: Vec<_> = classes.iter().map(|c| c.simple_name.as_str()).collect();
        assert_eq!(names, vec!["SendMessage"]);
    }

    #[test]
    fn classpath_listing_skips_anonymous_entries() {
        let listing = ClasspathListing::parse(
            "org/meta/api/methods/send/SendMessage.class\n\
             org/meta/api/objects/Message$Entity.class\n\
             org/meta/api/objects/Message$1.class\n\
             META-INF/MANIFEST.MF\n\
             module-info.class\n",
        );
        let classes: Vec<_> = listing.classes().collect();
        assert_eq!(
            classes,
            vec!["org.meta.api.methods.send.SendMessage", "org.meta.api.objects.Message.Entity"]
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn listed_class_without_source_is_skipped_with_warning() {
        let index = meta_index();
        let listing = ClasspathListing::parse(
            "org/meta/api/methods/send/SendMessage.class\norg/meta/api/methods/send/SendDice.class\n",
        );
        let classes = TypeCatalog::scan(&index, Some(&listing), "org.meta", None).unwrap();
        assert_eq!(classes.len(), 1);
        assert!(logs_contain("No parsed source for class, skipping"));
    }

    #[test]
    fn lombok_constructor_rules() {
        let index = index(&[
            ("A.java", "package p; @Data public class A { @NonNull private String a; }"),
            ("B.java", "package p; @Data public class B { private String b; }"),
            ("C.java", "package p; @NoArgsConstructor(access = AccessLevel.PRIVATE) public class C { }"),
            ("D.java", "package p; public class D { public D() {} public D(int x) {} }"),
            ("E.java", "package p; @SuperBuilder public class E { private String e; }"),
            ("F.java", "package p; public class F { public class Inner {} public static class Nested {} }"),
            (
                "G.java",
                "package p; @Data @NoArgsConstructor(force = true) public class G { @NonNull private String g; }",
            ),
        ]);
        let constructible = |fqn: &str| ClassDescriptor::build(&index, fqn).unwrap().default_constructible;
        assert!(!constructible("p.A"));
        assert!(constructible("p.B"));
        assert!(!constructible("p.C"));
        assert!(constructible("p.D"));
        assert!(!constructible("p.E"));
        assert!(!constructible("p.F.Inner"));
        assert!(constructible("p.F.Nested"));
        assert!(constructible("p.G"));
    }
}
