//! Integration tests for file discovery and the analyze/fix cycle.

use prose_lint_core::{
    apply_fixes, Analyzer, Document, FileContext, FixInfo, Rule, Severity, Tier, Violation,
};
use std::fs;
use tempfile::TempDir;

/// Flags the word "teh" and offers the obvious fix.
struct Typo;

impl Rule for Typo {
    fn name(&self) -> &'static str {
        "typo"
    }

    fn code(&self) -> &'static str {
        "PL901"
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let mut out = Vec::new();
        for (index, line) in doc.lines().enumerate() {
            for (offset, _) in line.match_indices("teh") {
                let column = offset + 1;
                out.push(
                    Violation::new(
                        self.code(),
                        self.name(),
                        Severity::Warning,
                        ctx.location(index + 1, column, 3),
                        "Misspelled `the`",
                    )
                    .with_tier(Tier::AutoFix, 1.0)
                    .with_fix(FixInfo::replace(column, 3, "the")),
                );
            }
        }
        out
    }
}

fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

#[test]
fn discovers_markdown_and_honours_excludes() {
    let dir = TempDir::new().unwrap();
    write(&dir, "README.md", "teh readme\n");
    write(&dir, "docs/guide.markdown", "teh guide\n");
    write(&dir, "docs/notes.txt", "teh notes\n");
    write(&dir, "node_modules/pkg/README.md", "teh dependency\n");
    write(&dir, "drafts/wip.md", "teh draft\n");

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .exclude("**/drafts/**")
        .respect_gitignore(false)
        .rule(Typo)
        .build()
        .unwrap();
    let result = analyzer.analyze().unwrap();

    assert_eq!(result.files_checked, 2);
    let files: Vec<String> = result
        .violations
        .iter()
        .map(|v| v.location.file.display().to_string())
        .collect();
    assert_eq!(files, vec!["README.md", "docs/guide.markdown"]);
}

#[test]
fn gitignore_is_respected() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write(&dir, ".gitignore", "generated/\n");
    write(&dir, "generated/api.md", "teh api\n");
    write(&dir, "index.md", "fine\n");

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .rule(Typo)
        .build()
        .unwrap();
    let result = analyzer.analyze().unwrap();

    assert_eq!(result.files_checked, 1);
    assert!(result.violations.is_empty());
}

#[test]
fn fixes_clear_violations() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", "teh cat and teh dog\nok\n");
    let path = dir.path().join("a.md");

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .respect_gitignore(false)
        .rule(Typo)
        .build()
        .unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let violations = analyzer.analyze_content(&path, &content);
    assert_eq!(violations.len(), 2);

    let outcome = apply_fixes(&content, &violations);
    assert_eq!(outcome.content, "the cat and the dog\nok\n");
    assert!(analyzer.analyze_content(&path, &outcome.content).is_empty());
}

#[test]
fn single_file_root() {
    let dir = TempDir::new().unwrap();
    write(&dir, "one.md", "teh\n");
    write(&dir, "two.md", "teh\n");

    let analyzer = Analyzer::builder()
        .root(dir.path().join("one.md"))
        .rule(Typo)
        .build()
        .unwrap();
    let result = analyzer.analyze().unwrap();
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.violations[0].location.file.display().to_string(), "one.md");
}
