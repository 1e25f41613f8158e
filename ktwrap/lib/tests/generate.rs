use std::fs;
use std::path::{Path, PathBuf};

use ktwrap_lib::{Config, GenerationReport, Generator, KtWrapError};
use tempfile::TempDir;

fn fixture_config() -> Config {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/telegram/ktwrap.toml");
    Config::load(&path).unwrap()
}

fn generate_into(dir: &Path) -> GenerationReport {
    let mut config = fixture_config();
    config.output_dir = dir.to_path_buf();
    Generator::new().run(&config).unwrap()
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

fn declarations(report: &GenerationReport, target: &str) -> usize {
    report
        .files
        .iter()
        .find(|f| f.target == target)
        .map(|f| f.declarations)
        .unwrap()
}

#[test]
fn generates_every_configured_file() {
    let out = TempDir::new().unwrap();
    let report = generate_into(out.path());

    let targets: Vec<_> = report.files.iter().map(|f| f.target.as_str()).collect();
    assert_eq!(
        targets,
        vec![
            "Objects",
            "Methods",
            "TelegramClientExtensions",
            "AbstractTelegramClient",
            "DefaultKTelegramClient",
        ]
    );
    for file in &report.files {
        assert!(file.path.exists(), "{} was not written", file.path.display());
    }
    assert_eq!(report.files[0].path, out.path().join("org/bots/objects/Objects.kt"));
    assert_eq!(report.files[4].path, out.path().join("org/bots/core/DefaultKTelegramClient.kt"));

    // Chat x2, File, Message, Ordering
    assert_eq!(declarations(&report, "Objects"), 5);
    // SendDocument, SendMessage x2, SendVoice
    assert_eq!(declarations(&report, "Methods"), 4);
    assert_eq!(declarations(&report, "TelegramClientExtensions"), 3);
    assert_eq!(declarations(&report, "AbstractTelegramClient"), 3);
    assert_eq!(declarations(&report, "DefaultKTelegramClient"), 9);
    assert_eq!(report.total_declarations(), 24);
}

#[test]
fn files_carry_header_and_suppressions() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let objects = read(out.path(), "org/bots/objects/Objects.kt");
    assert!(objects.contains("This code was automatically generated by ktwrap. Do not edit manually."));
    assert!(objects.contains("@file:Suppress(\"unused\", \"RedundantVisibilityModifier\", \"DEPRECATION\")"));
    assert!(objects.contains("package org.bots.objects\n"));
    assert!(objects.contains("import org.meta.api.objects.Ordering\n"));

    let methods = read(out.path(), "org/bots/methods/Methods.kt");
    assert!(methods.contains("import kotlinx.coroutines.future.await\n"));
    assert!(methods.contains("import org.meta.generics.TelegramClient\n"));
}

#[test]
fn function_count_is_the_product_of_overload_sizes() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let objects = read(out.path(), "org/bots/objects/Objects.kt");
    assert_eq!(objects.matches("fun chat(").count(), 2);
    assert_eq!(objects.matches("fun message(").count(), 1);
    // Not default-constructible, or abstract.
    assert!(!objects.contains("fun inputFile("));
    assert!(!objects.contains("fun replyMarkup("));

    let methods = read(out.path(), "org/bots/methods/Methods.kt");
    assert_eq!(methods.matches("suspend fun TelegramClient.sendMessage(").count(), 2);
    assert_eq!(methods.matches("suspend fun TelegramClient.sendDocument(").count(), 1);
}

#[test]
fn required_parameters_come_first_and_each_block_is_sorted() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let objects = read(out.path(), "org/bots/objects/Objects.kt");
    assert!(objects.contains(
        "fun ordering(
    bravo: Int,
    yankee: String,
    alpha: Int? = null,
    zulu: String? = null,
): Ordering {
    val obj = Ordering()
    obj.bravo = bravo
    obj.yankee = yankee
    if (alpha != null) {
        obj.alpha = alpha
    }
    if (zulu != null) {
        obj.zulu = zulu
    }
    return obj
}
"
    ));
}

#[test]
fn overloaded_property_yields_one_function_per_setter() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let objects = read(out.path(), "org/bots/objects/Objects.kt");
    assert!(objects.contains(
        "fun chat(
    id: String? = null,
): Chat {
    val obj = Chat()
    if (id != null) {
        obj.setId(id)
    }
    return obj
}
"
    ));
    assert!(objects.contains(
        "fun chat(
    id: Long? = null,
): Chat {
    val obj = Chat()
    if (id != null) {
        obj.id = id
    }
    return obj
}
"
    ));
}

#[test]
fn deprecations_of_one_combination_are_concatenated() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let methods = read(out.path(), "org/bots/methods/Methods.kt");
    assert!(methods.contains(
        "@Deprecated(message = \"This function uses deprecated parameters:\\n\
         - 'chatId': Pass the chat id as a string\\n\
         - 'disableWebPagePreview': Use linkPreviewOptions instead\\n\
         - 'replyToMessageId': Field is deprecated.\")"
    ));
    assert!(methods.contains(
        "@Deprecated(message = \"This function uses deprecated parameters:\\n\
         - 'disableWebPagePreview': Use linkPreviewOptions instead\\n\
         - 'replyToMessageId': Field is deprecated.\")"
    ));
    assert_eq!(methods.matches("@Deprecated(").count(), 2);
}

#[test]
fn api_call_builders_execute_and_await() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let methods = read(out.path(), "org/bots/methods/Methods.kt");
    assert!(methods.contains(
        "suspend fun TelegramClient.sendVoice(
    chatId: String,
    voice: InputFile,
    caption: String? = null,
    duration: Int? = null,
): Message {
    val apiMethod = SendVoice()
    apiMethod.chatId = chatId
    apiMethod.voice = voice
    if (caption != null) {
        apiMethod.caption = caption
    }
    if (duration != null) {
        apiMethod.duration = duration
    }
    return this.executeAsync(apiMethod).await() as Message
}
"
    ));
}

#[test]
fn client_wrappers_await_and_join() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let extensions = read(out.path(), "org/bots/client/TelegramClientExtensions.kt");
    assert!(extensions.contains(
        "suspend fun TelegramClient.executeK(
    sendVoice: SendVoice,
): Message {
    return executeAsync(sendVoice).await()
}
"
    ));

    let bridge = read(out.path(), "org/bots/client/AbstractTelegramClient.kt");
    assert!(bridge.contains("abstract class AbstractTelegramClient : TelegramClient {\n"));
    assert!(bridge.contains("        return executeAsync(sendDocument).join()\n"));
}

#[test]
fn presence_checked_template_parts_are_emitted_unconditionally() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let client = read(out.path(), "org/bots/core/DefaultKTelegramClient.kt");
    assert!(client.contains(
        "            parts.add(StringPart(SendDocument.CHATID_FIELD, sendDocument.chatId))
            if (sendDocument.hasCaption()) {
                parts.add(StringPart(\"caption\", sendDocument.caption))
            }
            parts.add(FilePart(SendDocument.DOCUMENT_FIELD, sendDocument.document))
            sendDocument.disableNotification?.let {
                parts.add(StringPart(SendDocument.DISABLENOTIFICATION_FIELD, it.toString()))
            }
"
    ));
}

#[test]
fn call_site_lambda_uses_its_own_builder_name() {
    let out = TempDir::new().unwrap();
    generate_into(out.path());

    let client = read(out.path(), "org/bots/core/DefaultKTelegramClient.kt");
    assert!(client.contains("            parts.add(FilePart(SendVoice.VOICE_FIELD, sendVoice.voice))\n"));
    assert!(client.contains(
        "            sendVoice.duration?.let {
                parts.add(StringPart(SendVoice.DURATION_FIELD, it.toString()))
            }
"
    ));
    // Plumbing from the template never reaches the output.
    assert!(!client.contains("buildUrl"));
    assert!(!client.contains("TelegramMultipartBuilder"));
    assert!(!client.contains("assertParamNotNull"));
    // Remote and local `File` share a simple name.
    assert!(client.contains("org.meta.api.objects.File"));
    assert!(client.contains("java.io.File"));
}

#[test]
fn second_run_is_byte_identical() {
    let out = TempDir::new().unwrap();
    let first = generate_into(out.path());
    let before: Vec<Vec<u8>> = first.files.iter().map(|f| fs::read(&f.path).unwrap()).collect();

    let second = generate_into(out.path());
    assert_eq!(first, second);
    let after: Vec<Vec<u8>> = second.files.iter().map(|f| fs::read(&f.path).unwrap()).collect();
    assert_eq!(before, after);

    let other = TempDir::new().unwrap();
    let third = generate_into(other.path());
    for (a, b) in first.files.iter().zip(&third.files) {
        assert_eq!(fs::read(&a.path).unwrap(), fs::read(&b.path).unwrap());
    }
}

#[test]
fn only_limits_generation_to_one_file() {
    let out = TempDir::new().unwrap();
    let mut config = fixture_config();
    config.output_dir = out.path().to_path_buf();

    let report = Generator::new()
        .only(Some("Methods".to_string()))
        .run(&config)
        .unwrap();
    assert_eq!(report.files.len(), 1);
    assert!(out.path().join("org/bots/methods/Methods.kt").exists());
    assert!(!out.path().join("org/bots/objects/Objects.kt").exists());

    let err = Generator::new()
        .only(Some("Nope".to_string()))
        .run(&config)
        .unwrap_err();
    assert!(matches!(err, KtWrapError::ConfigError(msg) if msg.contains("Nope")));
}

#[test]
fn dry_run_writes_nothing() {
    let out = TempDir::new().unwrap();
    let mut config = fixture_config();
    config.output_dir = out.path().join("generated");

    let report = Generator::new().dry_run(true).run(&config).unwrap();
    assert!(report.dry_run);
    assert_eq!(report.files.len(), 5);
    assert!(!config.output_dir.exists());
}

#[test]
fn empty_target_is_an_error_unless_allowed() {
    let out = TempDir::new().unwrap();
    let mut config = fixture_config();
    config.output_dir = out.path().to_path_buf();
    config.builders[0].namespace = "org.meta.api.nothing".to_string();

    let err = Generator::new()
        .only(Some("Objects".to_string()))
        .run(&config)
        .unwrap_err();
    assert!(matches!(err, KtWrapError::NoDeclarations { target } if target == "Objects"));

    config.builders[0].allow_empty = true;
    let report = Generator::new()
        .only(Some("Objects".to_string()))
        .run(&config)
        .unwrap();
    assert_eq!(report.total_declarations(), 0);
}

#[test]
fn missing_source_root_is_an_error() {
    let out = TempDir::new().unwrap();
    let mut config = fixture_config();
    config.output_dir = out.path().to_path_buf();
    config.source_roots.push(out.path().join("missing"));

    let err = Generator::new().run(&config).unwrap_err();
    assert!(matches!(err, KtWrapError::MissingSourceRoot { .. }));
}
