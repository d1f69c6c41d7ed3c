//! End-to-end tests over an in-memory file tree

use super::helpers::*;
use crate::{
    codec::{writer::GENERATED_MARKER, BulletStyle},
    compiler::Compiler,
    config::DoculispConfig,
    paths::DocPath,
    variables::{VariableTable, AUTHORS_KEY},
};
use test_log::test;

const MAIN: &str = r#"<!-- (dl (section-meta
    (title Rest)
    (author Jason Kerney)
    (include
        (Part-One ./sleep.md)
        (Part-Two ./dream.dlisp))))
-->

Intro text.

<!-- (dl (content (toc STYLE))) -->
"#;

const SLEEP: &str = r#"<!-- (dl (section-meta (title Sleep) (author Jason Kerney))) -->

Sleep is good.

<!-- (dl (# Naps)) -->

Short ones.
"#;

const DREAM: &str = "(section-meta (title Dream) (author Someone Else))";

fn compile_with_style(style: &str) -> String {
    init_logging();
    let main = MAIN.replace("STYLE", style);
    let compiler = Compiler::new(
        MemoryFileHandler::with_files(&[
            ("/docs/_main.md", &main),
            ("/docs/sleep.md", SLEEP),
            ("/docs/dream.dlisp", DREAM),
        ]),
        DoculispConfig::default(),
    );
    let docs = compiler
        .run(
            &DocPath::new("/docs/_main.md", "/"),
            Some(&DocPath::new("/README.md", "/")),
            false,
        )
        .unwrap();
    docs[0].text.clone()
}

#[test]
fn test_numbered_table_of_contents() {
    let text = compile_with_style("numbered");
    let expected = format!(
        "{GENERATED_MARKER}\n\n# Rest #\n\nIntro text.\n\n1. [Sleep](#sleep)\n2. [Dream](#dream)\n\n## Sleep ##\n\nSleep is good.\n\n### Naps ###\n\nShort ones.\n\n## Dream ##\n\n{GENERATED_MARKER}\n"
    );
    assert_eq!(text, expected);
}

#[test]
fn test_every_table_of_contents_style() {
    let expectations = [
        (BulletStyle::NoTable, None),
        (
            BulletStyle::Unlabeled,
            Some("[Sleep](#sleep)\n[Dream](#dream)"),
        ),
        (
            BulletStyle::Labeled,
            Some("[Part One: Sleep](#sleep)\n[Part Two: Dream](#dream)"),
        ),
        (
            BulletStyle::NumberedLabeled,
            Some("1. [Part One: Sleep](#sleep)\n2. [Part Two: Dream](#dream)"),
        ),
        (
            BulletStyle::Bulleted,
            Some("* [Sleep](#sleep)\n* [Dream](#dream)"),
        ),
        (
            BulletStyle::BulletedLabeled,
            Some("* [Part One: Sleep](#sleep)\n* [Part Two: Dream](#dream)"),
        ),
    ];
    for (style, toc) in expectations {
        let text = compile_with_style(style.as_str());
        match toc {
            Some(toc) => assert!(
                text.contains(&format!("Intro text.\n\n{toc}\n\n## Sleep ##")),
                "{style}: {text}"
            ),
            None => assert!(
                text.contains("Intro text.\n\n## Sleep ##"),
                "{style}: {text}"
            ),
        }
    }
}

#[test]
fn test_toc_label_is_one_level_below_title() {
    let main = MAIN.replace("(toc STYLE)", "(toc (label Table of Contents) (style bulleted))");
    let compiler = Compiler::new(
        MemoryFileHandler::with_files(&[
            ("/docs/_main.md", &main),
            ("/docs/sleep.md", SLEEP),
            ("/docs/dream.dlisp", DREAM),
        ]),
        DoculispConfig::default(),
    );
    let docs = compiler
        .run(&DocPath::new("/docs/_main.md", "/"), None, true)
        .unwrap();
    assert!(docs[0]
        .text
        .contains("## Table of Contents ##\n\n* [Sleep](#sleep)\n* [Dream](#dream)"));
}

#[test]
fn test_authors_are_collected_once() {
    let main = MAIN.replace("STYLE", "numbered");
    let compiler = Compiler::new(
        MemoryFileHandler::with_files(&[
            ("/docs/_main.md", &main),
            ("/docs/sleep.md", SLEEP),
            ("/docs/dream.dlisp", DREAM),
        ]),
        DoculispConfig::default(),
    );
    let mut variables = VariableTable::new();
    compiler
        .parse(&DocPath::new("/docs/_main.md", "/"), None, &mut variables)
        .unwrap();
    assert_eq!(
        variables.get_string_list(AUTHORS_KEY),
        vec!["Jason Kerney", "Someone Else"]
    );
}

#[test]
fn test_section_ids_link_within_and_across_documents() {
    let compiler = Compiler::new(
        MemoryFileHandler::with_files(&[
            (
                "/docs/_main.md",
                "<!-- (dl (section-meta (title Main) (include (S ./sleep.md)))) -->\n<!-- (dl (content)) -->\nJump to [naps](<!-- (dl (get-path sleep-section)) -->)",
            ),
            (
                "/docs/sleep.md",
                "<!-- (dl (section-meta (title Sleep Well) (id sleep-section))) -->\nZzz",
            ),
        ]),
        DoculispConfig::default(),
    );
    let docs = compiler
        .run(
            &DocPath::new("/docs/_main.md", "/"),
            Some(&DocPath::new("/README.md", "/")),
            false,
        )
        .unwrap();
    assert!(docs[0].text.contains("Jump to [naps](#sleep-well)"));
}
