//! Symbol table over one or more Java source roots.
//!
//! Every `.java` file under the configured roots is parsed once. Types are
//! indexed by fully-qualified name (nested types as `Outer.Inner`) and by
//! simple name. Name resolution follows the order a reader of the library
//! would: type variables and nested types, explicit imports, wildcard
//! imports probed against each root and a table of common JDK types, the
//! file's own package, then `java.lang` as the last guess.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::error::KtWrapError;
use crate::java::{
    self, CompilationUnit, Expr, JavaType, Primitive, TypeDecl, TypeExpr, TypeParam, WildcardBound,
};

/// JDK types outside `java.lang` that API sources commonly reach through a
/// wildcard import. The JDK is never on a source root, so these cannot be
/// probed on disk.
const JDK_TYPES: &[&str] = &[
    "java.io.Closeable",
    "java.io.File",
    "java.io.IOException",
    "java.io.InputStream",
    "java.io.OutputStream",
    "java.io.Serializable",
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.net.URI",
    "java.net.URL",
    "java.time.Duration",
    "java.time.Instant",
    "java.time.LocalDate",
    "java.time.LocalDateTime",
    "java.time.OffsetDateTime",
    "java.time.ZonedDateTime",
    "java.util.ArrayList",
    "java.util.Collection",
    "java.util.Date",
    "java.util.HashMap",
    "java.util.HashSet",
    "java.util.LinkedHashMap",
    "java.util.LinkedList",
    "java.util.List",
    "java.util.Locale",
    "java.util.Map",
    "java.util.Optional",
    "java.util.Set",
    "java.util.TreeMap",
    "java.util.UUID",
    "java.util.concurrent.CompletableFuture",
    "java.util.concurrent.ExecutorService",
    "java.util.concurrent.Future",
    "java.util.concurrent.TimeUnit",
];

/// Where a type lives: the unit index plus the chain of nested-type indices.
#[derive(Debug, Clone)]
struct TypeLocation {
    unit: usize,
    path: Vec<usize>,
}

/// A located type declaration.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef<'a> {
    pub fqn: &'a str,
    pub decl: &'a TypeDecl,
    pub unit: &'a CompilationUnit,
}

impl<'a> TypeRef<'a> {
    /// The package of the compilation unit, or `""` for the default package.
    pub fn package(&self) -> &'a str {
        self.unit.package.as_deref().unwrap_or_default()
    }

    /// Resolution scope for names written inside this type's body.
    pub fn scope(&self) -> Scope<'a> {
        Scope {
            unit: self.unit,
            owner: Some(self.fqn),
            type_vars: self.decl.type_params.iter().map(|p| p.name.clone()).collect(),
        }
    }
}

/// The lexical context a name is resolved in.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    pub unit: &'a CompilationUnit,
    /// FQN of the innermost enclosing type, if any.
    pub owner: Option<&'a str>,
    pub type_vars: Vec<String>,
}

impl<'a> Scope<'a> {
    /// This scope extended with a method's own type parameters.
    pub fn with_type_params(&self, params: &[TypeParam]) -> Scope<'a> {
        let mut scope = self.clone();
        scope
            .type_vars
            .extend(params.iter().map(|p| p.name.clone()));
        scope
    }
}

/// Upper bound on superclass walks, guarding against cyclic `extends`.
pub(crate) const MAX_SUPERCLASS_DEPTH: usize = 64;

#[derive(Debug, Default)]
pub struct SourceIndex {
    roots: Vec<PathBuf>,
    units: Vec<CompilationUnit>,
    by_fqn: BTreeMap<String, TypeLocation>,
    by_simple: BTreeMap<String, Vec<String>>,
}

impl SourceIndex {
    /// Parses every `.java` file under `roots`, in root order and file-name
    /// order within each root.
    ///
    /// ## Errors
    /// Returns an error if a root does not exist or a file cannot be read
    /// or parsed.
    #[instrument(skip_all, fields(roots = roots.len()))]
    pub fn load(roots: &[PathBuf]) -> Result<Self, KtWrapError> {
        let mut index = Self {
            roots: roots.to_vec(),
            ..Self::default()
        };

        for root in roots {
            if !root.is_dir() {
                return Err(KtWrapError::MissingSourceRoot { path: root.clone() });
            }
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|e| KtWrapError::Io {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                    source: e.into(),
                })?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some("java")
                {
                    continue;
                }
                let unit = java::parse_file(path, root)?;
                index.add_unit(unit);
            }
        }

        info!(
            files = index.units.len(),
            types = index.by_fqn.len(),
            "Indexed Java sources"
        );
        Ok(index)
    }

    /// Builds an index from already-parsed units. Filesystem probing uses
    /// `roots` only.
    pub fn from_units(roots: Vec<PathBuf>, units: Vec<CompilationUnit>) -> Self {
        let mut index = Self {
            roots,
            ..Self::default()
        };
        for unit in units {
            index.add_unit(unit);
        }
        index
    }

    fn add_unit(&mut self, unit: CompilationUnit) {
        let unit_idx = self.units.len();
        let prefix = unit.package.clone().unwrap_or_default();
        for (i, decl) in unit.types.iter().enumerate() {
            self.register(&prefix, decl, TypeLocation {
                unit: unit_idx,
                path: vec![i],
            });
        }
        self.units.push(unit);
    }

    fn register(&mut self, prefix: &str, decl: &TypeDecl, location: TypeLocation) {
        let fqn = if prefix.is_empty() {
            decl.name.clone()
        } else {
            format!("{prefix}.{}", decl.name)
        };

        for (i, nested) in decl.nested.iter().enumerate() {
            let mut path = location.path.clone();
            path.push(i);
            self.register(&fqn, nested, TypeLocation {
                unit: location.unit,
                path,
            });
        }

        if self.by_fqn.contains_key(&fqn) {
            debug!(%fqn, "Type already indexed from an earlier root, keeping the first");
            return;
        }
        self.by_simple
            .entry(decl.name.clone())
            .or_default()
            .push(fqn.clone());
        self.by_fqn.insert(fqn, location);
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    /// Every indexed FQN, sorted.
    pub fn fqns(&self) -> impl Iterator<Item = &str> {
        self.by_fqn.keys().map(String::as_str)
    }

    pub fn find_type(&self, fqn: &str) -> Option<TypeRef<'_>> {
        let (key, location) = self.by_fqn.get_key_value(fqn)?;
        let unit = self.units.get(location.unit)?;
        let (first, rest) = location.path.split_first()?;
        let mut decl = unit.types.get(*first)?;
        for i in rest {
            decl = decl.nested.get(*i)?;
        }
        Some(TypeRef {
            fqn: key,
            decl,
            unit,
        })
    }

    /// FQNs of all indexed types with the given simple name, sorted.
    pub fn types_named(&self, simple: &str) -> Vec<&str> {
        let mut fqns: Vec<&str> = self
            .by_simple
            .get(simple)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default();
        fqns.sort_unstable();
        fqns
    }

    /// Whether `fqn` is indexed or a matching file exists under a root.
    fn exists(&self, fqn: &str) -> bool {
        if self.by_fqn.contains_key(fqn) {
            return true;
        }
        let relative = format!("{}.java", fqn.replace('.', "/"));
        self.roots.iter().any(|root| root.join(&relative).is_file())
    }

    /// Resolves a possibly qualified type name written in `scope`.
    ///
    /// Never fails: unresolvable names fall back to `java.lang.<Name>`.
    pub fn resolve_fqn(&self, scope: &Scope<'_>, name: &str) -> String {
        let mut segments = name.split('.');
        let head = segments.next().unwrap_or(name);
        let rest: Vec<&str> = segments.collect();

        if !rest.is_empty() && head.starts_with(|c: char| c.is_ascii_lowercase()) {
            // Already package-qualified.
            return name.to_string();
        }

        let mut fqn = self.resolve_simple(scope, head);
        for segment in rest {
            fqn.push('.');
            fqn.push_str(segment);
        }
        fqn
    }

    fn resolve_simple(&self, scope: &Scope<'_>, name: &str) -> String {
        // Nested types of the enclosing types, innermost first.
        if let Some(owner) = scope.owner {
            let mut enclosing = Some(owner);
            while let Some(outer) = enclosing {
                let candidate = format!("{outer}.{name}");
                if self.by_fqn.contains_key(&candidate) {
                    return candidate;
                }
                if outer.ends_with(&format!(".{name}")) || outer == name {
                    return outer.to_string();
                }
                enclosing = outer
                    .rsplit_once('.')
                    .map(|(parent, _)| parent)
                    .filter(|parent| self.by_fqn.contains_key(*parent));
            }
        }

        let suffix = format!(".{name}");
        if let Some(import) = scope
            .unit
            .imports
            .iter()
            .find(|i| !i.wildcard && !i.is_static && i.path.ends_with(&suffix))
        {
            return import.path.clone();
        }

        for import in scope.unit.imports.iter().filter(|i| i.wildcard && !i.is_static) {
            let candidate = format!("{}.{name}", import.path);
            if self.exists(&candidate) || JDK_TYPES.contains(&candidate.as_str()) {
                return candidate;
            }
        }

        if let Some(package) = scope.unit.package.as_deref() {
            let candidate = format!("{package}.{name}");
            if self.exists(&candidate) {
                return candidate;
            }
        } else if self.exists(name) {
            return name.to_string();
        }

        format!("java.lang.{name}")
    }

    /// Resolves a written type into a [`JavaType`].
    ///
    /// ## Errors
    /// Returns [`KtWrapError::UnknownPrimitive`] when a primitive keyword is
    /// not one of Java's eight primitives.
    pub fn resolve_type(&self, scope: &Scope<'_>, ty: &TypeExpr) -> Result<JavaType, KtWrapError> {
        Ok(match ty {
            TypeExpr::Primitive(keyword) => JavaType::Primitive(Primitive::from_keyword(keyword)?),
            TypeExpr::Void => JavaType::Void,
            TypeExpr::Array(element) => JavaType::Array(Box::new(self.resolve_type(scope, element)?)),
            TypeExpr::Wildcard(None) => JavaType::Wildcard {
                bound: None,
                is_super: false,
            },
            TypeExpr::Wildcard(Some(bound)) => {
                let (bound, is_super) = match bound {
                    WildcardBound::Extends(b) => (b, false),
                    WildcardBound::Super(b) => (b, true),
                };
                JavaType::Wildcard {
                    bound: Some(Box::new(self.resolve_type(scope, bound)?)),
                    is_super,
                }
            }
            TypeExpr::Named { path, args } => {
                if let [single] = path.as_slice()
                    && scope.type_vars.iter().any(|v| v == single)
                {
                    return Ok(JavaType::TypeVar(single.clone()));
                }
                JavaType::Class {
                    fqn: self.resolve_fqn(scope, &path.join(".")),
                    args: args
                        .iter()
                        .map(|a| self.resolve_type(scope, a))
                        .collect::<Result<_, _>>()?,
                }
            }
        })
    }

    /// Resolves the superclass of `type_ref` with generic arguments as written.
    ///
    /// ## Errors
    /// Propagates [`KtWrapError::UnknownPrimitive`] from the type arguments.
    pub fn superclass_of(&self, type_ref: &TypeRef<'_>) -> Result<Option<JavaType>, KtWrapError> {
        let scope = type_ref.scope();
        type_ref
            .decl
            .superclass
            .as_ref()
            .map(|ty| self.resolve_type(&scope, ty))
            .transpose()
    }

    /// Resolves a static field reference such as `SendPhoto.PHOTO_FIELD` to
    /// the FQN of the type that declares the field, searching superclasses.
    ///
    /// Returns `None` when the qualifier is not a type or no declaring type
    /// is indexed.
    pub fn resolve_field_constant(&self, scope: &Scope<'_>, object: &Expr, field: &str) -> Option<String> {
        let qualifier = qualified_name(object)?;
        let last = qualifier.rsplit('.').next()?;
        if !last.starts_with(|c: char| c.is_ascii_uppercase()) {
            return None;
        }

        let mut current = Some(self.resolve_fqn(scope, &qualifier));
        let mut depth = 0;
        while let Some(fqn) = current.take() {
            let type_ref = self.find_type(&fqn)?;
            if type_ref.decl.field(field).is_some() {
                return Some(fqn);
            }
            depth += 1;
            if depth > MAX_SUPERCLASS_DEPTH {
                return None;
            }
            current = self
                .superclass_of(&type_ref)
                .ok()
                .flatten()
                .and_then(|s| s.fqn().map(str::to_string));
        }
        None
    }
}

/// Dotted text of a name or field-access chain (`a.b.C`).
fn qualified_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.clone()),
        Expr::FieldAccess { object, field } => Some(format!("{}.{field}", qualified_name(object)?)),
        _ => None,
    }
}
