//! Java source parsing.
//!
//! Files are parsed with tree-sitter and lowered straight into the owned
//! model in [`ast`]; the syntax tree itself never leaves this module.

pub mod ast;
mod lower;
pub mod types;

use std::path::Path;

use tree_sitter::Parser;

use crate::error::KtWrapError;

pub use ast::*;
pub use types::{JavaType, Primitive};

/// Reads and parses one `.java` file found under `root`.
///
/// ## Errors
/// Returns an error if the file cannot be read, the grammar cannot be
/// loaded, or tree-sitter gives up on the input.
pub fn parse_file(path: &Path, root: &Path) -> Result<CompilationUnit, KtWrapError> {
    let source = std::fs::read_to_string(path).map_err(|source| KtWrapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(path, root, &source)
}

/// Parses Java source text already in memory.
///
/// ## Errors
/// Returns an error if the grammar cannot be loaded or parsing fails.
pub fn parse_source(path: &Path, root: &Path, source: &str) -> Result<CompilationUnit, KtWrapError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_java::LANGUAGE.into())?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| KtWrapError::ParseFailed {
            path: path.to_path_buf(),
        })?;

    let mut unit = CompilationUnit {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
        package: None,
        imports: Vec::new(),
        types: Vec::new(),
    };
    lower::Lowerer::new(source).lower_program(tree.root_node(), &mut unit);
    Ok(unit)
}

/// Text of the `@deprecated` block tag of a javadoc comment, whitespace
/// collapsed. `None` when the comment has no such tag or it is empty.
pub fn deprecated_tag(javadoc: &str) -> Option<String> {
    let body = javadoc
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut collected: Option<Vec<&str>> = None;
    for line in body.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        match collected.as_mut() {
            None => {
                if let Some(rest) = line.strip_prefix("@deprecated") {
                    collected = Some(vec![rest.trim()]);
                }
            }
            Some(words) => {
                if line.starts_with('@') {
                    break;
                }
                words.push(line);
            }
        }
    }

    let text = collected?
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(source: &str) -> CompilationUnit {
        parse_source(&PathBuf::from("Test.java"), &PathBuf::from("."), source).unwrap()
    }

    #[test]
    fn lowers_package_imports_and_class_shape() {
        let unit = parse(
            r#"
            package org.example.api;

            import java.util.List;
            import org.example.base.*;
            import static org.example.Util.check;

            /** A message. */
            @Data
            public class SendMessage extends BotApiMethod<Message> implements Validable {
                @NonNull
                private String chatId;
                private List<String> tags, labels;

                public void setChatId(Long chatId) { this.chatId = chatId.toString(); }
            }
            "#,
        );

        assert_eq!(unit.package.as_deref(), Some("org.example.api"));
        assert_eq!(unit.imports.len(), 3);
        assert!(unit.imports[1].wildcard);
        assert_eq!(unit.imports[1].path, "org.example.base");
        assert!(unit.imports[2].is_static);

        let class = &unit.types[0];
        assert_eq!(class.name, "SendMessage");
        assert!(class.modifiers.is_public());
        assert!(class.modifiers.has_annotation("Data"));
        assert_eq!(class.javadoc.as_deref(), Some("/** A message. */"));
        assert_eq!(
            class.superclass,
            Some(TypeExpr::Named {
                path: vec!["BotApiMethod".into()],
                args: vec![TypeExpr::Named {
                    path: vec!["Message".into()],
                    args: vec![]
                }],
            })
        );
        assert_eq!(class.interfaces.len(), 1);

        let names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["chatId", "tags", "labels"]);
        assert!(class.fields[0].modifiers.has_annotation("NonNull"));

        let setter = class.method("setChatId").unwrap();
        assert_eq!(setter.params[0].name, "chatId");
        assert!(setter.body.is_some());
    }

    #[test]
    fn lowers_multipart_template_statements() {
        let unit = parse(
            r#"
            class Client {
                private <T> T executeMediaMethod(T method, ThrowingConsumer<TelegramMultipartBuilder> setup) {
                    try {
                        TelegramMultipartBuilder builder = new TelegramMultipartBuilder(mapper);
                        builder.addPart(SendPhoto.CHATID_FIELD, method.getChatId())
                               .addInputFile(SendPhoto.PHOTO_FIELD, method.getPhoto(), true);
                        if (method.getReplyMarkup() != null) {
                            builder.addJsonPart("reply_markup", method.getReplyMarkup());
                        }
                        setup.accept(builder);
                    } catch (IOException e) {
                        throw new TelegramApiException("Unable", e);
                    }
                    return null;
                }
            }
            "#,
        );

        let method = unit.types[0].method("executeMediaMethod").unwrap();
        assert_eq!(method.type_params[0].name, "T");
        let body = method.body.as_ref().unwrap();
        let Stmt::Try { body: inner, catches, .. } = &body[0] else {
            panic!("expected try statement, got {:?}", body[0]);
        };
        assert_eq!(catches.len(), 1);
        assert!(matches!(inner[0], Stmt::LocalVar { .. }));
        let Stmt::Expr(chain) = &inner[1] else {
            panic!("expected expression statement");
        };
        assert!(matches!(chain.chain_root(), Expr::Name(name) if name == "builder"));
        let Stmt::If { condition, .. } = &inner[2] else {
            panic!("expected if statement");
        };
        assert!(matches!(condition, Expr::Binary { op, .. } if op == "!="));
        assert!(matches!(body[1], Stmt::Return(Some(_))));
    }

    #[test]
    fn lowers_wildcards_arrays_and_bounded_type_params() {
        let unit = parse(
            r#"
            public interface TelegramClient {
                <T extends Serializable, Method extends BotApiMethod<T>> CompletableFuture<T> executeAsync(Method method);
                List<? extends PhotoSize> photos(byte[] raw, String... names);
            }
            "#,
        );
        let client = &unit.types[0];
        let execute = client.method("executeAsync").unwrap();
        assert!(execute.modifiers.is_public());
        assert_eq!(execute.type_params.len(), 2);
        assert_eq!(execute.type_params[1].bounds.len(), 1);
        assert!(execute.body.is_none());

        let photos = client.method("photos").unwrap();
        let TypeExpr::Named { args, .. } = &photos.return_type else {
            panic!("expected named return type");
        };
        assert!(matches!(args[0], TypeExpr::Wildcard(Some(WildcardBound::Extends(_)))));
        assert!(matches!(photos.params[0].ty, TypeExpr::Array(_)));
        assert!(photos.params[1].varargs);
    }

    #[test]
    fn deprecated_tag_collects_multiline_text() {
        let doc = "/**\n * Old field.\n * @deprecated Use {@link #chatId}\n *   instead.\n * @see Foo\n */";
        assert_eq!(
            deprecated_tag(doc).as_deref(),
            Some("Use {@link #chatId} instead.")
        );
        assert_eq!(deprecated_tag("/** Nothing here. */"), None);
    }
}
