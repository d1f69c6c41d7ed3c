use tempfile::tempdir;
use test_log::test;

use doculisp::{
    codec::GENERATED_MARKER,
    compiler::Compiler,
    config::{DoculispConfig, CONFIG_FILE_NAME},
    files::FsFileHandler,
    paths::DocPath,
    DoculispError,
};

mod common;
use common::{create_doc_tree, read, write_tree};

fn compiler() -> Compiler<FsFileHandler> {
    Compiler::new(FsFileHandler, DoculispConfig::default())
}

#[test]
fn test_project_compiles_all_documents() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = create_doc_tree(&temp_dir);

    let project = DocPath::new("docs/docs.dlproj", &root);
    let docs = compiler().run(&project, None, false)?;
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|doc| doc.warnings.is_empty()));

    let readme = read(root.join("README.md"));
    let expected = format!(
        r#"{GENERATED_MARKER}

# Rest #

How to rest. Also see the [guide](./guide/README.md).

1. [Sleep](#sleep)
2. [Dream](#dream)

## Sleep ##

Sleep is `important`.

```
<!-- (dl (# not a directive)) -->
```

## Dream ##

#### Sometimes ####

{GENERATED_MARKER}
"#
    );
    assert_eq!(readme, expected);

    let guide = read(root.join("guide/README.md"));
    assert!(guide.contains("Back to [sleep](../README.md#sleep)."));
    Ok(())
}

#[test]
fn test_project_in_test_mode_writes_nothing() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = create_doc_tree(&temp_dir);

    let docs = compiler().run(&DocPath::new("docs/docs.dlproj", &root), None, true)?;
    assert_eq!(docs.len(), 2);
    assert!(docs[0].text.starts_with(GENERATED_MARKER));
    assert!(!root.join("README.md").exists());
    assert!(!root.join("guide").exists());
    Ok(())
}

#[test]
fn test_single_document_compiles() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = create_doc_tree(&temp_dir);

    let source = DocPath::new("docs/sections/sleep.md", &root);
    let destination = DocPath::new("out/sleep.md", &root);
    let docs = compiler().run(&source, Some(&destination), false)?;
    assert_eq!(docs[0].destination.as_ref(), Some(&destination));
    let written = read(root.join("out/sleep.md"));
    assert!(written.starts_with(&format!("{GENERATED_MARKER}\n\n# Sleep #\n\nSleep is")));
    assert_eq!(written, docs[0].text);
    Ok(())
}

#[test]
fn test_unknown_id_outside_project_fails() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = create_doc_tree(&temp_dir);

    let err = compiler()
        .run(&DocPath::new("docs/_main.md", &root), None, true)
        .unwrap_err();
    match err {
        DoculispError::Code {
            message,
            path,
            line,
            ..
        } => {
            assert!(message.contains("guide"));
            assert!(path.ends_with("docs/_main.md"));
            assert_eq!(line, 9);
        }
        other => panic!("expected a code failure, got {other}"),
    }
    Ok(())
}

#[test]
fn test_unclosed_inline_code_reports_position() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = write_tree(&temp_dir, &[("bad.md", "# Title\n\nSome `code\n")]);

    let err = compiler()
        .run(&DocPath::new("bad.md", &root), None, true)
        .unwrap_err();
    assert!(err.is_code());
    assert_eq!(err.position(), Some((3, 6)));
    Ok(())
}

#[test]
fn test_missing_source_is_general_failure() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let err = compiler()
        .run(&DocPath::new("nope.md", temp_dir.path()), None, true)
        .unwrap_err();
    assert!(err.is_general());
    Ok(())
}

#[test]
fn test_destination_rules() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = create_doc_tree(&temp_dir);

    let err = compiler()
        .run(
            &DocPath::new("docs/docs.dlproj", &root),
            Some(&DocPath::new("out.md", &root)),
            false,
        )
        .unwrap_err();
    assert!(err.is_general());

    let err = compiler()
        .run(&DocPath::new("docs/guide.md", &root), None, false)
        .unwrap_err();
    assert!(err.is_general());
    Ok(())
}

#[test]
fn test_config_controls_cycle_detection() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = write_tree(
        &temp_dir,
        &[
            (
                "loop.md",
                "<!-- (dl (section-meta (title Loop) (include (Again ./loop.md)))) -->\n<!-- (dl (content)) -->",
            ),
            (CONFIG_FILE_NAME, "check_include_cycles = false\nmax_include_depth = 4\n"),
        ],
    );
    let source = DocPath::new("loop.md", &root);

    let err = compiler().run(&source, None, true).unwrap_err();
    assert!(err.message().contains("cycle"), "{err}");

    let config = DoculispConfig::discover(&root)?;
    assert!(!config.check_include_cycles);
    let err = Compiler::new(FsFileHandler, config)
        .run(&source, None, true)
        .unwrap_err();
    assert!(err.message().contains("depth limit"), "{err}");
    Ok(())
}

#[test]
fn test_failures_serialize_for_the_command_line() -> Result<(), DoculispError> {
    let temp_dir = tempdir()?;
    let root = write_tree(
        &temp_dir,
        &[
            ("p.dlproj", "(documents (document (source ./a.md) (output ./out/a.md)) (document (source ./b.md) (output ./out/b.md)) (document (source ./c.md) (output ./out/c.md)))"),
            ("a.md", "<!-- (dl (section-meta (title))) -->"),
            ("c.md", "<!-- (dl (section-meta (title Fine))) -->"),
        ],
    );
    let err = compiler()
        .run(&DocPath::new("p.dlproj", &root), None, false)
        .unwrap_err();
    let DoculispError::Project {
        ref compiled,
        ref failures,
    } = err
    else {
        panic!("expected a project failure, got {err}");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(compiled.len(), 1);
    assert!(compiled[0].source.ends_with("c.md"));
    assert!(compiled[0].destination.ends_with("out/c.md"));
    assert!(read(root.join("out/c.md")).contains("# Fine #"));
    assert!(!root.join("out/a.md").exists());

    let json = serde_json::to_string_pretty(&err).unwrap();
    let back: DoculispError = serde_json::from_str(&json).unwrap();
    assert_eq!(back, err);
    Ok(())
}
