use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static CONTENT_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"[itemprop="articleBody"]"#,
        ".article-body",
        ".articleBody",
        ".article-content",
        ".entry-content",
        ".post-content",
        ".story-body",
        ".content-body",
    ]
    .iter()
    .filter_map(|css| Selector::parse(css).ok())
    .collect()
});
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe", "button", "form"];
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "main", "aside", "header", "footer", "h1", "h2", "h3", "h4",
    "h5", "h6", "ul", "ol", "li", "blockquote", "figure", "figcaption", "pre", "table", "tr",
];

/// Extract readable article text from a page.
///
/// First non-empty of: the first `<article>`, a known content container,
/// every `<p>` on the page. Paragraphs come back separated by a blank line.
pub fn extract_body(document: &Html) -> Option<String> {
    if let Some(article) = document.select(&ARTICLE).next() {
        if let Some(text) = element_paragraphs(article) {
            return Some(text);
        }
    }

    for sel in CONTENT_CONTAINERS.iter() {
        if let Some(text) = document.select(sel).next().and_then(element_paragraphs) {
            return Some(text);
        }
    }

    let joined = document
        .select(&PARAGRAPH)
        .map(|p| {
            let mut text = String::new();
            collect_text(p, &mut text);
            text
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    non_empty(normalize_paragraphs(&joined))
}

fn element_paragraphs(el: ElementRef<'_>) -> Option<String> {
    let mut text = String::new();
    collect_text(el, &mut text);
    non_empty(normalize_paragraphs(&text))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Text content of `el`, skipping non-prose elements and breaking paragraphs at block boundaries
fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                let name = e.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push_str("\n\n");
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}

/// CRLF → LF, split on blank lines, collapse whitespace inside each
/// paragraph, drop empties, rejoin with a blank line.
pub fn normalize_paragraphs(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_LINE
        .split(&text)
        .map(collapse_whitespace)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
