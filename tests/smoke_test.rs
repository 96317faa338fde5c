use repo2html::classify::in_vcs_dir;
use repo2html::document::{READ_FAILURE_MARKER, READ_FAILURE_OPEN};
use repo2html::page::anchor_for;
use repo2html::tree::NoTree;
use repo2html::{ClassifyPolicy, Config, Decision, PageMeta, PageRenderer, RenderedRepo, run_repo2html};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const THRESHOLD: u64 = 100;

/// readme.md (text), logo.png (binary), big.txt (threshold + 1), .git/HEAD.
fn scenario_repo(root: &Path) -> std::io::Result<()> {
    fs::write(root.join("readme.md"), "# Readme\n\n")?;
    fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])?;
    fs::write(root.join("big.txt"), "x".repeat(THRESHOLD as usize + 1))?;
    fs::create_dir(root.join(".git"))?;
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n")?;
    Ok(())
}

fn meta() -> PageMeta {
    PageMeta {
        source: "scenario".to_string(),
        revision: "unknown".to_string(),
        generated_at: "fixed".to_string(),
    }
}

fn decision_of(repo: &RenderedRepo, rel: &str) -> Decision {
    repo.records
        .iter()
        .find(|r| r.relative_path == rel)
        .map(|r| r.decision)
        .unwrap_or_else(|| panic!("no record for {rel}"))
}

#[test]
fn it_classifies_the_four_file_scenario() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    scenario_repo(temp_dir.path())?;

    let repo = RenderedRepo::scan(temp_dir.path(), &ClassifyPolicy::new(THRESHOLD), &NoTree)?;

    assert_eq!(decision_of(&repo, "readme.md"), Decision::Included);
    assert_eq!(decision_of(&repo, "logo.png"), Decision::Binary);
    assert_eq!(decision_of(&repo, "big.txt"), Decision::TooLarge);
    assert_eq!(decision_of(&repo, ".git/HEAD"), Decision::Ignored);
    assert_eq!(repo.stats.total, 4);
    assert_eq!(repo.stats.included, 1);
    assert_eq!(
        repo.stats.total,
        repo.stats.included + repo.stats.binary + repo.stats.too_large + repo.stats.ignored
    );

    // The tree never shows .git, the skip lists do.
    assert!(!repo.tree.contains(".git"));
    let page = PageRenderer::default().render(&meta(), &repo);
    assert!(page.contains("<code>.git/HEAD</code>"));
    assert!(page.contains("<code>big.txt</code> <span class=\"muted\">(101 B)</span>"));

    Ok(())
}

#[test]
fn it_keeps_reason_properties_over_a_mixed_tree() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("vendor/dep/.git/objects"))?;
    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("vendor/dep/.git/objects/pack"), vec![0u8; 500])?;
    fs::write(root.join("vendor/dep/lib.rs"), "pub fn dep() {}\n")?;
    fs::write(root.join("src/main.rs"), "fn main() {}\n")?;
    fs::write(root.join("src/huge.rs"), "/".repeat(300))?;
    fs::write(root.join("src/data.dat"), [1u8, 0, 2])?;
    fs::write(root.join(".github"), "not a vcs dir\n")?;

    let policy = ClassifyPolicy::new(THRESHOLD);
    let repo = RenderedRepo::scan(root, &policy, &NoTree)?;

    for record in &repo.records {
        let ignored = record.decision == Decision::Ignored;
        assert_eq!(ignored, in_vcs_dir(Path::new(&record.relative_path)), "{}", record.relative_path);
        if !ignored {
            assert_eq!(
                record.decision == Decision::TooLarge,
                record.size_bytes > policy.max_bytes,
                "{}",
                record.relative_path
            );
        }
    }
    assert_eq!(decision_of(&repo, "src/data.dat"), Decision::Binary);
    assert_eq!(decision_of(&repo, ".github"), Decision::Included);

    Ok(())
}

#[test]
fn it_lists_toc_in_document_order() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("b/inner"))?;
    fs::write(root.join("z.txt"), "z\n")?;
    fs::write(root.join("a.txt"), "a\n")?;
    fs::write(root.join("b/inner/c.txt"), "c\n")?;
    fs::write(root.join("b.txt"), "b\n")?;

    let repo = RenderedRepo::scan(root, &ClassifyPolicy::default(), &NoTree)?;
    let page = PageRenderer::default().render(&meta(), &repo);

    let mut last_toc = 0;
    let mut last_doc = 0;
    for (i, record) in repo.included().enumerate() {
        let toc_pos = page
            .find(&format!("<li><a href=\"#file-{}\">", anchor_for(&record.relative_path)))
            .expect("toc entry");
        assert!(toc_pos > last_toc);
        last_toc = toc_pos;

        let doc_pos = repo
            .document
            .find(&format!(
                "<document index=\"{}\">\n<source>{}</source>",
                i + 1,
                record.relative_path
            ))
            .expect("document entry");
        assert!(doc_pos >= last_doc);
        last_doc = doc_pos;
    }
    assert_eq!(repo.included().count(), 4);

    Ok(())
}

#[test]
fn it_marks_unreadable_files_in_both_views() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    fs::write(root.join("keep.rs"), "fn keep() {}\n")?;
    fs::write(root.join("vanish.rs"), "fn vanish() {}\n")?;

    let records = repo2html::collect_records(root, &ClassifyPolicy::default())?;
    fs::remove_file(root.join("vanish.rs"))?;

    let repo = RenderedRepo::from_parts(records, ".\n".to_string());
    assert!(repo.document.contains(&format!(
        "<source>vanish.rs</source>\n{READ_FAILURE_OPEN}\n{READ_FAILURE_MARKER}"
    )));
    assert!(repo.document.contains("fn keep() {}"));

    let page = PageRenderer::default().render(&meta(), &repo);
    assert!(page.contains("id=\"file-vanish-rs\""));
    assert!(page.contains("<pre class=\"error\">Failed to render:"));
    assert!(page.contains("fn keep() {}"));

    Ok(())
}

#[test]
fn it_is_idempotent_on_an_unchanged_tree() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    scenario_repo(temp_dir.path())?;
    fs::create_dir(temp_dir.path().join("src"))?;
    fs::write(temp_dir.path().join("src/lib.rs"), "pub fn f() {}\n")?;

    let policy = ClassifyPolicy::new(THRESHOLD);
    let first = RenderedRepo::scan(temp_dir.path(), &policy, &NoTree)?;
    let second = RenderedRepo::scan(temp_dir.path(), &policy, &NoTree)?;

    assert_eq!(first.tree, second.tree);
    assert_eq!(first.document, second.document);
    assert_eq!(first.records, second.records);

    let renderer = PageRenderer::default();
    assert_eq!(renderer.render(&meta(), &first), renderer.render(&meta(), &second));

    Ok(())
}

#[tokio::test]
async fn it_writes_the_page() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let project = temp_dir.path().join("project");
    fs::create_dir(&project)?;
    scenario_repo(&project)?;

    let output_path = temp_dir.path().join("out/page.html");
    let mut config = Config::for_repo(project.to_string_lossy());
    config.output_path = Some(output_path.clone());
    config.max_bytes = THRESHOLD;

    let written = run_repo2html(config).await?;
    assert_eq!(written, output_path);

    let contents = tokio::fs::read_to_string(&output_path).await?;
    assert!(contents.starts_with("<!DOCTYPE html>"));
    assert!(contents.contains("Total files: <strong>4</strong>"));
    assert!(contents.contains("Included: <strong>1</strong>"));
    assert!(contents.contains("(binary 1, too large 1, ignored 1)"));
    assert!(contents.contains("Revision: <code>unknown</code>"));
    assert!(contents.contains("<h1>Readme</h1>"));

    Ok(())
}

#[tokio::test]
async fn it_fails_on_missing_root() {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::for_repo(temp_dir.path().join("missing").to_string_lossy());
    config.output_path = Some(temp_dir.path().join("never.html"));

    assert!(run_repo2html(config).await.is_err());
    assert!(!temp_dir.path().join("never.html").exists());
}

#[cfg(feature = "restore")]
#[tokio::test]
async fn it_roundtrips_files_through_the_page() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let project = temp_dir.path().join("project");
    fs::create_dir_all(project.join("src"))?;
    let main_content = "fn main() {\n    println!(\"<&>\");\n}\n";
    let notes_content = "# Notes\n\nSome 'quoted' text.\n";
    fs::write(project.join("src/main.rs"), main_content)?;
    fs::write(project.join("NOTES.md"), notes_content)?;

    let output_path = temp_dir.path().join("page.html");
    let mut config = Config::for_repo(project.to_string_lossy());
    config.output_path = Some(output_path.clone());
    run_repo2html(config).await?;

    let restored = temp_dir.path().join("restored");
    let written = repo2html::restore_from_file(&output_path, Some(&restored)).await?;
    assert_eq!(written.len(), 2);
    assert_eq!(fs::read_to_string(restored.join("src/main.rs"))?, main_content);
    assert_eq!(fs::read_to_string(restored.join("NOTES.md"))?, notes_content);

    Ok(())
}

#[cfg(feature = "restore")]
#[tokio::test]
async fn it_restores_from_the_llm_view_when_a_readme_holds_a_textarea() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let project = temp_dir.path().join("project");
    fs::create_dir(&project)?;
    let readme = "# Demo\n\n<textarea id=\"llm-text\">nothing</textarea>\n";
    fs::write(project.join("README.md"), readme)?;
    fs::write(project.join("main.rs"), "fn main() {}\n")?;

    let output_path = temp_dir.path().join("page.html");
    let mut config = Config::for_repo(project.to_string_lossy());
    config.output_path = Some(output_path.clone());
    run_repo2html(config).await?;

    let restored = temp_dir.path().join("restored");
    let written = repo2html::restore_from_file(&output_path, Some(&restored)).await?;
    assert_eq!(written.len(), 2);
    assert_eq!(fs::read_to_string(restored.join("README.md"))?, readme);
    assert_eq!(fs::read_to_string(restored.join("main.rs"))?, "fn main() {}\n");

    Ok(())
}
