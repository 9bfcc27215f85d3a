use crate::feeds::parser::{Field, RawEntry, parse_feed};
use crate::models::Item;
use crate::utils::{absolutize, source_host, strip_tags, truncate_chars};

/// Link precedence: plain `<link>` text, its `href`, the `rel="alternate"`
/// candidate, the first candidate, the enclosure, then FeedBurner's origLink.
fn resolve_link(entry: &RawEntry) -> Option<&str> {
    let from_link = entry.get("link").and_then(|field| match field {
        Field::Text(_) => field.text(),
        Field::Node { .. } => field.attr("href").or_else(|| field.text()),
        Field::Many(_) => {
            let candidates = field.candidates();
            candidates
                .iter()
                .find(|l| l.attr("rel") == Some("alternate"))
                .and_then(|l| l.attr("href"))
                .or_else(|| {
                    candidates
                        .first()
                        .and_then(|first| first.attr("href").or_else(|| first.text()))
                })
        }
    });

    from_link
        .or_else(|| entry.get("enclosure").and_then(|f| f.attr("url")))
        .or_else(|| entry.first_text(&["feedburner:origLink"]))
}

fn initial_image(entry: &RawEntry) -> Option<&str> {
    ["enclosure", "media:content", "media:thumbnail"]
        .iter()
        .find_map(|name| entry.get(name).and_then(|f| f.attr("url")))
}

/// Map one raw entry from `feed_url` into a canonical item
pub fn extract_item(entry: &RawEntry, feed_url: &str, description_max_chars: usize) -> Item {
    let title = entry.first_text(&["title"]).unwrap_or_default().to_string();

    let link = resolve_link(entry)
        .map(|l| absolutize(l, feed_url))
        .unwrap_or_default();

    let description = entry
        .first_text(&["description", "summary"])
        .map(|d| {
            let stripped = strip_tags(d);
            truncate_chars(stripped.trim(), description_max_chars)
                .trim_end()
                .to_string()
        })
        .unwrap_or_default();

    let pub_date = entry
        .first_text(&["pubDate", "updated", "dc:date", "published"])
        .unwrap_or_default()
        .to_string();

    let image = initial_image(entry)
        .map(|i| absolutize(i, feed_url))
        .unwrap_or_default();

    Item {
        title,
        link,
        description,
        pub_date,
        source: source_host(feed_url),
        image,
        body: String::new(),
    }
}

/// Parse a feed body and extract at most `cap` items, in document order
pub fn extract_items(
    xml: &str,
    feed_url: &str,
    cap: usize,
    description_max_chars: usize,
) -> Vec<Item> {
    parse_feed(xml, feed_url)
        .iter()
        .take(cap)
        .map(|entry| extract_item(entry, feed_url, description_max_chars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "https://www.example.com/feed/";

    fn rss(items: &str) -> String {
        format!(
            r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:feedburner="http://rssnamespace.org/feedburner/ext/1.0"><channel><title>t</title>{items}</channel></rss>"#
        )
    }

    fn atom(entries: &str) -> String {
        format!(r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title>{entries}</feed>"#)
    }

    #[test]
    fn test_rss_and_atom_links_agree() {
        let from_rss = extract_items(
            &rss("<item><title>A</title><link>https://x/a</link></item>"),
            FEED,
            3,
            150,
        );
        let from_atom = extract_items(
            &atom(r#"<entry><title>A</title><link href="https://x/a"/></entry>"#),
            FEED,
            3,
            150,
        );
        assert_eq!(from_rss[0].link, "https://x/a");
        assert_eq!(from_atom[0].link, "https://x/a");
    }

    #[test]
    fn test_alternate_link_preferred() {
        let items = extract_items(
            &atom(
                r#"<entry><title>A</title>
                <link rel="self" href="https://x/self"/>
                <link rel="alternate" href="https://x/alt"/>
                </entry>"#,
            ),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].link, "https://x/alt");
    }

    #[test]
    fn test_first_link_when_no_alternate() {
        let items = extract_items(
            &atom(
                r#"<entry><link rel="self" href="https://x/1"/><link rel="replies" href="https://x/2"/></entry>"#,
            ),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].link, "https://x/1");
    }

    #[test]
    fn test_link_falls_back_to_enclosure_then_origlink() {
        let items = extract_items(
            &rss(concat!(
                r#"<item><title>E</title><enclosure url="https://x/e.mp3"/></item>"#,
                r#"<item><title>O</title><feedburner:origLink>https://x/orig</feedburner:origLink></item>"#,
                r#"<item><title>N</title></item>"#,
            )),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].link, "https://x/e.mp3");
        assert_eq!(items[1].link, "https://x/orig");
        assert_eq!(items[2].link, "");
    }

    #[test]
    fn test_relative_link_resolved_against_feed() {
        let items = extract_items(&rss("<item><link>/news/1</link></item>"), FEED, 3, 150);
        assert_eq!(items[0].link, "https://www.example.com/news/1");
    }

    #[test]
    fn test_description_stripped_and_capped() {
        let long = "word ".repeat(100);
        let items = extract_items(
            &rss(&format!(
                "<item><title>  Spaced title  </title><link>https://x/a</link><description><![CDATA[<p>{long}</p>]]></description></item>"
            )),
            FEED,
            3,
            150,
        );
        let item = &items[0];
        assert_eq!(item.title, "Spaced title");
        assert!(!item.description.contains('<'));
        assert_eq!(item.description.chars().count(), 149);
        assert!(item.description.starts_with("word word"));
        assert!(item.description.ends_with("word"));
    }

    #[test]
    fn test_description_cut_at_space_is_trimmed() {
        let items = extract_items(
            &rss("<item><link>https://x/a</link><description>abcd efgh</description></item>"),
            FEED,
            3,
            5,
        );
        assert_eq!(items[0].description, "abcd");
    }

    #[test]
    fn test_summary_used_when_no_description() {
        let items = extract_items(
            &atom(r#"<entry><link href="https://x/a"/><summary>Escaped &lt;b&gt;bold&lt;/b&gt; text</summary></entry>"#),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].description, "Escaped bold text");
    }

    #[test]
    fn test_pub_date_precedence() {
        let items = extract_items(
            &rss(concat!(
                "<item><link>https://x/1</link><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate><dc:date>2020-01-01</dc:date></item>",
                "<item><link>https://x/2</link><dc:date>2024-02-02T00:00:00Z</dc:date></item>",
            )),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].pub_date, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(items[1].pub_date, "2024-02-02T00:00:00Z");

        let atom_items = extract_items(
            &atom(r#"<entry><link href="https://x/3"/><updated>2024-03-03T00:00:00Z</updated></entry>"#),
            FEED,
            3,
            150,
        );
        assert_eq!(atom_items[0].pub_date, "2024-03-03T00:00:00Z");
    }

    #[test]
    fn test_initial_image_sources() {
        let items = extract_items(
            &rss(concat!(
                r#"<item><link>https://x/1</link><enclosure url="https://x/1.jpg" type="image/jpeg"/></item>"#,
                r#"<item><link>https://x/2</link><media:content url="https://x/2.jpg" medium="image"/></item>"#,
                r#"<item><link>https://x/3</link><media:thumbnail url="https://x/3.jpg"/></item>"#,
                r#"<item><link>https://x/4</link></item>"#,
            )),
            FEED,
            4,
            150,
        );
        assert_eq!(items[0].image, "https://x/1.jpg");
        assert_eq!(items[1].image, "https://x/2.jpg");
        assert_eq!(items[2].image, "https://x/3.jpg");
        assert_eq!(items[3].image, "");
    }

    #[test]
    fn test_source_is_feed_host_without_www() {
        let items = extract_items(
            &rss("<item><link>https://news.other.org/a</link></item>"),
            FEED,
            3,
            150,
        );
        assert_eq!(items[0].source, "example.com");
        assert!(items[0].body.is_empty());
    }

    #[test]
    fn test_entries_capped_per_feed() {
        let many: String = (0..10)
            .map(|i| format!("<item><link>https://x/{i}</link></item>"))
            .collect();
        let items = extract_items(&rss(&many), FEED, 3, 150);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].link, "https://x/2");
    }

    #[test]
    fn test_malformed_feed_yields_no_items() {
        assert!(extract_items("<rss><channel><item>", FEED, 3, 150).is_empty());
        assert!(extract_items("not xml at all", FEED, 3, 150).is_empty());
    }
}
