use crate::utils::absolutize;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static META_IMAGE: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="og:image"]"#,
        r#"meta[name="og:image"]"#,
        r#"meta[name="twitter:image"]"#,
        r#"meta[property="twitter:image"]"#,
    ]
    .iter()
    .filter_map(|css| Selector::parse(css).ok())
    .collect()
});
static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Find a representative image for an article page, as an absolute URL.
///
/// Tries social meta tags, then JSON-LD `image` properties, then the best
/// inline `<img>`. Relative URLs resolve against `page_url`.
pub fn extract_image(document: &Html, page_url: &str) -> Option<String> {
    let (found, via) = if let Some(u) = meta_image(document) {
        (u, "meta")
    } else if let Some(u) = jsonld_image(document) {
        (u, "jsonld")
    } else {
        (inline_image(document)?, "img")
    };
    let resolved = absolutize(&found, page_url);
    debug!(%page_url, via, image = %resolved, "Image found");
    (!resolved.is_empty()).then_some(resolved)
}

fn meta_image(document: &Html) -> Option<String> {
    META_IMAGE.iter().find_map(|sel| {
        document
            .select(sel)
            .filter_map(|n| n.value().attr("content"))
            .map(str::trim)
            .find(|c| !c.is_empty())
            .map(str::to_string)
    })
}

/* -------------------- JSON-LD -------------------- */

fn jsonld_image(document: &Html) -> Option<String> {
    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let Ok(v) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        if let Some(found) = scan_jsonld_value(&v) {
            return Some(found);
        }
    }
    None
}

fn scan_jsonld_value(v: &Value) -> Option<String> {
    match v {
        Value::Array(arr) => arr.iter().find_map(scan_jsonld_value),
        Value::Object(_) => pick_image_from_ld(v).or_else(|| {
            v.get("@graph")
                .and_then(Value::as_array)
                .and_then(|graph| graph.iter().find_map(pick_image_from_ld))
        }),
        _ => None,
    }
}

fn pick_image_from_ld(v: &Value) -> Option<String> {
    v.get("image")
        .and_then(image_value)
        .or_else(|| {
            v.get("mainEntityOfPage")
                .and_then(|m| m.get("image"))
                .and_then(image_value)
        })
}

/// `image` may be a string, a list of strings/objects, or an `ImageObject`
fn image_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(arr) => arr.iter().find_map(image_value),
        Value::Object(_) => v.get("url").and_then(image_value),
        _ => None,
    }
}

/* -------------------- INLINE <img> -------------------- */

fn is_candidate_src(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    let filename = path.rsplit('/').next().unwrap_or(path);
    !lower.starts_with("data:")
        && !filename.contains("logo")
        && !filename.contains("icon")
        && !path.ends_with(".svg")
}

fn dimension(value: Option<&str>) -> Option<u64> {
    let digits: String = value?.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn inline_image(document: &Html) -> Option<String> {
    let mut first: Option<String> = None;
    let mut best: Option<(u64, String)> = None;

    for img in document.select(&IMG) {
        let el = img.value();
        let Some(src) = ["src", "data-src"]
            .iter()
            .filter_map(|name| el.attr(name))
            .map(str::trim)
            .find(|s| !s.is_empty() && is_candidate_src(s))
        else {
            continue;
        };

        if first.is_none() {
            first = Some(src.to_string());
        }

        let width = dimension(el.attr("width"));
        let height = dimension(el.attr("height"));
        if width.is_none() && height.is_none() {
            continue;
        }
        let score = width.unwrap_or(0).saturating_add(height.unwrap_or(0));
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, src.to_string()));
        }
    }

    best.map(|(_, src)| src).or(first)
}
