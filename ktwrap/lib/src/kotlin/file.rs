//! Kotlin source files and import computation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::code::ClassName;
use super::spec::{FunSpec, TypeSpec};
use super::string_literal;

/// Packages whose members Kotlin/JVM code sees without an import.
const DEFAULT_IMPORTS: &[&str] = &[
    "kotlin",
    "kotlin.annotation",
    "kotlin.collections",
    "kotlin.comparisons",
    "kotlin.io",
    "kotlin.ranges",
    "kotlin.sequences",
    "kotlin.text",
    "kotlin.jvm",
    "java.lang",
];

/// How each referenced class is written in one file.
#[derive(Debug, Clone, Default)]
pub struct Imports {
    /// Top-level classes that must be written fully qualified.
    qualified: BTreeSet<ClassName>,
    /// `import` lines, sorted.
    lines: BTreeSet<String>,
}

impl Imports {
    /// Decides imports for a file in `package` referencing `classes`.
    ///
    /// A simple name claimed by two different classes is written fully
    /// qualified everywhere; everything else is imported unless it lives in
    /// the file's own package or a default-imported one.
    pub fn compute(package: &str, classes: &[ClassName], member_imports: &BTreeSet<String>) -> Self {
        let mut by_simple: BTreeMap<&str, BTreeSet<ClassName>> = BTreeMap::new();
        for class in classes {
            by_simple
                .entry(class.top_level_name())
                .or_default()
                .insert(class.top_level());
        }

        let member_names: BTreeSet<&str> = member_imports
            .iter()
            .filter_map(|m| m.rsplit('.').next())
            .collect();

        let mut imports = Self::default();
        for (simple, tops) in by_simple {
            if tops.len() > 1 || member_names.contains(simple) {
                imports.qualified.extend(tops);
                continue;
            }
            for top in tops {
                let implicit = top.package.is_empty()
                    || top.package == package
                    || DEFAULT_IMPORTS.contains(&top.package.as_str());
                if !implicit {
                    imports.lines.insert(top.canonical());
                }
            }
        }
        imports.lines.extend(member_imports.iter().cloned());
        imports
    }

    pub fn name_of(&self, class: &ClassName) -> String {
        if self.qualified.contains(&class.top_level()) {
            class.canonical()
        } else {
            class.simple_names.join(".")
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Function(FunSpec),
    Type(TypeSpec),
}

/// One generated `.kt` file.
#[derive(Debug, Clone)]
pub struct KotlinFile {
    pub package: String,
    /// File name without the `.kt` extension.
    pub name: String,
    pub header: Option<String>,
    /// Names for the file-level `@file:Suppress(...)`.
    pub suppress: Vec<String>,
    /// Extra imports of top-level members, e.g. `kotlinx.coroutines.future.await`.
    pub member_imports: BTreeSet<String>,
    pub members: Vec<Member>,
    pub indent: String,
}

impl KotlinFile {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            header: None,
            suppress: Vec::new(),
            member_imports: BTreeSet::new(),
            members: Vec::new(),
            indent: "    ".to_string(),
        }
    }

    pub fn add_function(&mut self, function: FunSpec) -> &mut Self {
        self.members.push(Member::Function(function));
        self
    }

    pub fn add_type(&mut self, ty: TypeSpec) -> &mut Self {
        self.members.push(Member::Type(ty));
        self
    }

    pub fn add_member_import(&mut self, fqn: impl Into<String>) -> &mut Self {
        self.member_imports.insert(fqn.into());
        self
    }

    /// Path of the file relative to the output directory.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.package.split('.').filter(|s| !s.is_empty()).collect();
        path.push(format!("{}.kt", self.name));
        path
    }

    /// Renders the whole file. Output depends only on the members, so equal
    /// inputs give byte-identical text.
    pub fn render(&self) -> String {
        let mut classes = Vec::new();
        for member in &self.members {
            match member {
                Member::Function(f) => f.collect_classes(&mut classes),
                Member::Type(t) => t.collect_classes(&mut classes),
            }
        }
        let imports = Imports::compute(&self.package, &classes, &self.member_imports);

        let mut out = String::new();
        if let Some(header) = &self.header {
            for line in header.lines() {
                out.push_str(&format!("// {line}\n"));
            }
        }
        if !self.suppress.is_empty() {
            let names: Vec<_> = self.suppress.iter().map(|s| string_literal(s)).collect();
            out.push_str(&format!("@file:Suppress({})\n", names.join(", ")));
        }
        if !out.is_empty() {
            out.push('\n');
        }

        if !self.package.is_empty() {
            out.push_str(&format!("package {}\n\n", self.package));
        }

        let mut has_imports = false;
        for line in imports.lines() {
            out.push_str(&format!("import {line}\n"));
            has_imports = true;
        }
        if has_imports {
            out.push('\n');
        }

        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match member {
                Member::Function(f) => out.push_str(&f.render(&imports, &self.indent, 0)),
                Member::Type(t) => out.push_str(&t.render(&imports, &self.indent)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kotlin::{Code, KotlinType, ParamSpec};

    #[test]
    fn default_and_same_package_classes_are_not_imported() {
        let classes = vec![
            ClassName::new("kotlin", "String"),
            ClassName::new("kotlin.collections", "List"),
            ClassName::new("org.bots", "Local"),
            ClassName::new("org.meta.api", "SendMessage"),
        ];
        let imports = Imports::compute("org.bots", &classes, &BTreeSet::new());
        let lines: Vec<_> = imports.lines().collect();
        assert_eq!(lines, vec!["org.meta.api.SendMessage"]);
    }

    #[test]
    fn clashing_simple_names_are_fully_qualified() {
        let meta_file = ClassName::new("org.meta.api.objects", "File");
        let io_file = ClassName::new("java.io", "File");
        let imports = Imports::compute("org.bots", &[meta_file.clone(), io_file.clone()], &BTreeSet::new());
        assert_eq!(imports.lines().count(), 0);
        assert_eq!(imports.name_of(&meta_file), "org.meta.api.objects.File");
        assert_eq!(imports.name_of(&io_file), "java.io.File");
    }

    #[test]
    fn nested_classes_import_their_outer_class() {
        let nested = ClassName::best_guess("org.meta.api.Message.Entity");
        let imports = Imports::compute("org.bots", std::slice::from_ref(&nested), &BTreeSet::new());
        assert_eq!(imports.lines().collect::<Vec<_>>(), vec!["org.meta.api.Message"]);
        assert_eq!(imports.name_of(&nested), "Message.Entity");
    }

    #[test]
    fn renders_header_suppress_package_imports_and_members() {
        let mut file = KotlinFile::new("org.bots", "ObjectBuilders");
        file.header = Some("Generated.".to_string());
        file.suppress = vec!["unused".to_string()];
        file.add_member_import("kotlinx.coroutines.future.await");

        let send = KotlinType::class(ClassName::new("org.meta.api", "SendMessage"));
        let mut fun = FunSpec::new("sendMessage");
        fun.params.push(ParamSpec::new("chatId", KotlinType::kotlin("String")));
        fun.returns = Some(send.clone());
        let mut create = Code::text("val obj = ");
        create.push_type(send).push_str("()");
        fun.body_mut().statement(create).statement("return obj");
        file.add_function(fun);

        assert_eq!(
            file.render(),
            "// Generated.\n@file:Suppress(\"unused\")\n\npackage org.bots\n\n\
             import kotlinx.coroutines.future.await\nimport org.meta.api.SendMessage\n\n\
             fun sendMessage(\n    chatId: String,\n): SendMessage {\n    val obj = SendMessage()\n    return obj\n}\n"
        );
        assert_eq!(file.relative_path(), PathBuf::from("org/bots/ObjectBuilders.kt"));
    }
}
