//! The human-facing HTML page.
//!
//! Everything (styles, script, the machine document) is inlined so the
//! output is a single self-contained file. The page has two views that
//! are switched client-side: the annotated human view and the raw LLM
//! document.

use crate::RenderedRepo;
use crate::classify::Decision;
use crate::filewalker::FileRecord;
use crate::utils::{escape_html, get_language_tag, human_size, is_markdown, read_text};
use anyhow::Result;
use log::{debug, warn};
use pulldown_cmark::{Event, Options, Parser, html};
use std::path::Path;

/// Converts Markdown source to HTML.
pub trait MarkdownRenderer {
    fn render(&self, source: &str) -> Result<String>;
}

/// Turns source text into HTML for a `<pre><code>` container.
///
/// Implementations must escape whatever they do not mark up.
pub trait Highlighter {
    fn highlight(&self, source: &str, path: &Path) -> Result<String>;
}

/// CommonMark with the usual GitHub extensions, via pulldown-cmark.
///
/// Raw HTML in the source is shown as text. An unclosed `<textarea>` or
/// comment would otherwise swallow the rest of the page.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonMark;

impl MarkdownRenderer for CommonMark {
    fn render(&self, source: &str) -> Result<String> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        let mut out = String::with_capacity(source.len() * 3 / 2);
        let events = Parser::new_ext(source, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        html::push_html(&mut out, events);
        Ok(out)
    }
}

/// No highlighting, only escaping.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, source: &str, _path: &Path) -> Result<String> {
        Ok(escape_html(source))
    }
}

/// Maps a relative path to an HTML id fragment.
///
/// Anything other than ASCII alphanumerics, `-` and `_` becomes `-`. Distinct
/// paths may collide (`a/b` and `a-b`); the same path always maps the same way.
pub fn anchor_for(relative_path: &str) -> String {
    relative_path
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Aggregate counts over the whole record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub total: usize,
    pub included: usize,
    pub binary: usize,
    pub too_large: usize,
    pub ignored: usize,
}

impl RenderStats {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.decision {
                Decision::Included => stats.included += 1,
                Decision::Binary => stats.binary += 1,
                Decision::TooLarge => stats.too_large += 1,
                Decision::Ignored => stats.ignored += 1,
            }
        }
        stats
    }

    pub fn skipped(&self) -> usize {
        self.binary + self.too_large + self.ignored
    }
}

/// Header information that does not come from the scan.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Repository URL or local path as given by the user.
    pub source: String,
    /// Commit id, or `unknown`.
    pub revision: String,
    pub generated_at: String,
}

struct SkipLists<'a> {
    binary: Vec<&'a FileRecord>,
    too_large: Vec<&'a FileRecord>,
    ignored: Vec<&'a FileRecord>,
}

impl<'a> SkipLists<'a> {
    fn partition(records: &'a [FileRecord]) -> Self {
        let mut lists = SkipLists {
            binary: Vec::new(),
            too_large: Vec::new(),
            ignored: Vec::new(),
        };
        for record in records {
            match record.decision {
                Decision::Included => {}
                Decision::Binary => lists.binary.push(record),
                Decision::TooLarge => lists.too_large.push(record),
                Decision::Ignored => lists.ignored.push(record),
            }
        }
        lists
    }
}

/// Renders the final page from a scanned repository.
pub struct PageRenderer {
    markdown: Box<dyn MarkdownRenderer>,
    highlighter: Box<dyn Highlighter>,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(Box::new(CommonMark), Box::new(PlainHighlighter))
    }
}

impl PageRenderer {
    pub fn new(markdown: Box<dyn MarkdownRenderer>, highlighter: Box<dyn Highlighter>) -> Self {
        Self {
            markdown,
            highlighter,
        }
    }

    pub fn render(&self, meta: &PageMeta, repo: &RenderedRepo) -> String {
        let included: Vec<&FileRecord> = repo.included().collect();

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        out.push_str(&format!(
            "<title>{} – flattened repository</title>\n",
            escape_html(&meta.source)
        ));
        out.push_str(STYLE);
        out.push_str("</head>\n<body>\n<a id=\"top\"></a>\n");

        out.push_str("<nav id=\"sidebar\">\n");
        out.push_str(&toc(&included));
        out.push_str("</nav>\n");

        out.push_str("<main>\n");
        out.push_str(&header(meta, repo));
        out.push_str(VIEW_TOGGLE);

        out.push_str("<div id=\"human-view\">\n");
        out.push_str("<section>\n<h2>Directory tree</h2>\n");
        out.push_str(&format!("<pre class=\"tree\">{}</pre>\n", escape_html(&repo.tree)));
        out.push_str("</section>\n");
        out.push_str(&skip_lists(&SkipLists::partition(&repo.records)));
        for record in &included {
            out.push_str(&self.file_section(record));
        }
        out.push_str("</div>\n");

        out.push_str(&llm_view(&repo.document));
        out.push_str("</main>\n");
        out.push_str(SCRIPT);
        out.push_str("</body>\n</html>\n");
        out
    }

    fn file_section(&self, record: &FileRecord) -> String {
        let anchor = anchor_for(&record.relative_path);
        let mut out = format!(
            "<section class=\"file-section\" id=\"file-{anchor}\">\n<h2>{} <span class=\"muted\">({})</span></h2>\n<div class=\"file-body\">\n",
            escape_html(&record.relative_path),
            human_size(record.size_bytes)
        );

        match self.render_body(record) {
            Ok(body) => out.push_str(&body),
            Err(err) => {
                warn!("Failed to render {}: {err:#}", record.relative_path);
                out.push_str(&format!(
                    "<pre class=\"error\">Failed to render: {}</pre>\n",
                    escape_html(&format!("{err:#}"))
                ));
            }
        }

        out.push_str("</div>\n<div class=\"back-top\"><a href=\"#top\">↑ Back to top</a></div>\n</section>\n");
        out
    }

    fn render_body(&self, record: &FileRecord) -> Result<String> {
        let path = Path::new(&record.relative_path);
        let text = read_text(&record.absolute_path)?;

        if is_markdown(path) {
            debug!("Markdown: {}", record.relative_path);
            let html = self.markdown.render(&text)?;
            Ok(format!("<div class=\"markdown-body\">\n{html}</div>\n"))
        } else {
            let code = self.highlighter.highlight(&text, path)?;
            let lang = get_language_tag(path);
            let class = if lang.is_empty() {
                String::new()
            } else {
                format!(" class=\"language-{lang}\"")
            };
            Ok(format!("<pre><code{class}>{code}</code></pre>\n"))
        }
    }
}

fn toc(included: &[&FileRecord]) -> String {
    let mut out = format!("<h2>Contents ({})</h2>\n<ul class=\"toc\">\n", included.len());
    for record in included {
        out.push_str(&format!(
            "<li><a href=\"#file-{}\">{}</a> <span class=\"muted\">({})</span></li>\n",
            anchor_for(&record.relative_path),
            escape_html(&record.relative_path),
            human_size(record.size_bytes)
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn header(meta: &PageMeta, repo: &RenderedRepo) -> String {
    let stats = &repo.stats;
    format!(
        "<header>\n<h1>{source}</h1>\n<p class=\"meta\">\
Revision: <code>{revision}</code> · Generated: {generated}</p>\n<p class=\"meta\">\
Total files: <strong>{total}</strong> · Included: <strong>{included}</strong> · \
Skipped: <strong>{skipped}</strong> \
(binary {binary}, too large {too_large}, ignored {ignored})</p>\n</header>\n",
        source = escape_html(&meta.source),
        revision = escape_html(&meta.revision),
        generated = escape_html(&meta.generated_at),
        total = stats.total,
        included = stats.included,
        skipped = stats.skipped(),
        binary = stats.binary,
        too_large = stats.too_large,
        ignored = stats.ignored,
    )
}

fn skip_list(id: &str, title: &str, records: &[&FileRecord]) -> String {
    let mut out = format!(
        "<details class=\"skip-list\" id=\"skipped-{id}\">\n<summary>{title} ({})</summary>\n<ul>\n",
        records.len()
    );
    for record in records {
        out.push_str(&format!(
            "<li><code>{}</code> <span class=\"muted\">({})</span></li>\n",
            escape_html(&record.relative_path),
            human_size(record.size_bytes)
        ));
    }
    out.push_str("</ul>\n</details>\n");
    out
}

fn skip_lists(lists: &SkipLists<'_>) -> String {
    let mut out = String::from("<section>\n<h2>Skipped files</h2>\n");
    out.push_str(&skip_list("binary", "Binary files", &lists.binary));
    out.push_str(&skip_list("too-large", "Too large", &lists.too_large));
    out.push_str(&skip_list("ignored", "Ignored", &lists.ignored));
    out.push_str("</section>\n");
    out
}

fn llm_view(document: &str) -> String {
    format!(
        "<div id=\"llm-view\" style=\"display:none\">\n<section>\n<h2>LLM view</h2>\n\
<p class=\"muted\">Flat document of every included file. Copy it into a model's context.</p>\n\
<button type=\"button\" onclick=\"copyDocument()\">Copy to clipboard</button>\n\
<textarea id=\"llm-text\" readonly spellcheck=\"false\">{}</textarea>\n</section>\n</div>\n",
        escape_html(document)
    )
}

const VIEW_TOGGLE: &str = "<div class=\"view-toggle\">\
<button type=\"button\" id=\"btn-human\" class=\"active\" onclick=\"showView('human')\">Human</button>\
<button type=\"button\" id=\"btn-llm\" onclick=\"showView('llm')\">LLM</button>\
</div>\n";

const STYLE: &str = r#"<style>
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; color: #1f2328; background: #fff; }
#sidebar { position: fixed; top: 0; left: 0; bottom: 0; width: 300px; overflow-y: auto; padding: 1rem; border-right: 1px solid #d0d7de; background: #f6f8fa; box-sizing: border-box; font-size: 0.85rem; }
#sidebar h2 { font-size: 1rem; margin-top: 0; }
.toc { list-style: none; padding-left: 0; margin: 0; }
.toc li { padding: 2px 0; word-break: break-all; }
main { margin-left: 300px; padding: 1.5rem 2rem; }
header h1 { margin: 0 0 0.5rem 0; font-size: 1.5rem; word-break: break-all; }
.meta { margin: 0.25rem 0; color: #59636e; }
.muted { color: #59636e; font-weight: normal; font-size: 0.85em; }
.view-toggle { margin: 1rem 0; }
.view-toggle button { padding: 0.3rem 0.9rem; border: 1px solid #d0d7de; background: #f6f8fa; cursor: pointer; }
.view-toggle button.active { background: #0969da; color: #fff; border-color: #0969da; }
pre { background: #f6f8fa; padding: 0.75rem; overflow-x: auto; border-radius: 6px; font-size: 0.85rem; line-height: 1.4; }
pre.tree { line-height: 1.25; }
pre.error { background: #ffebe9; color: #82071e; border: 1px solid #ff8182; }
.file-section { border-top: 1px solid #d0d7de; padding-top: 1rem; margin-top: 2rem; }
.file-section h2 { font-size: 1.1rem; word-break: break-all; }
.markdown-body { max-width: 60rem; }
.back-top { font-size: 0.8rem; margin-top: 0.5rem; }
.skip-list { margin: 0.5rem 0; }
.skip-list summary { cursor: pointer; }
#llm-text { width: 100%; height: 75vh; font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.8rem; box-sizing: border-box; }
@media (max-width: 900px) { #sidebar { position: static; width: auto; border-right: none; } main { margin-left: 0; } }
</style>
"#;

const SCRIPT: &str = r#"<script>
function showView(which) {
  document.getElementById('human-view').style.display = which === 'human' ? 'block' : 'none';
  document.getElementById('llm-view').style.display = which === 'llm' ? 'block' : 'none';
  document.getElementById('btn-human').classList.toggle('active', which === 'human');
  document.getElementById('btn-llm').classList.toggle('active', which === 'llm');
}
function copyDocument() {
  var text = document.getElementById('llm-text');
  if (navigator.clipboard) {
    navigator.clipboard.writeText(text.value);
  } else {
    text.select();
    document.execCommand('copy');
  }
}
</script>
"#;
