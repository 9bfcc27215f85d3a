use serde::{Deserialize, Serialize};

/// One feed URL and the category it is grouped under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub category: String,
}

/// Canonical news item emitted in the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub source: String,
    pub image: String,
    pub body: String,
}

impl Item {
    /// True when the article page still has something to give us
    pub fn needs_enrichment(&self) -> bool {
        self.image.is_empty() || self.body.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub category: String,
    pub items: Vec<Item>,
}

/// Root of the JSON snapshot written at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AggregationResult {
    pub categories: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            title: "Wind farm approved".to_string(),
            link: "https://example.com/a".to_string(),
            description: "Short description".to_string(),
            pub_date: "Mon, 06 May 2024 10:00:00 GMT".to_string(),
            source: "example.com".to_string(),
            image: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_item_serializes_pub_date_key() {
        let json = serde_json::to_string(&item()).unwrap();
        assert!(json.contains(r#""pubDate":"Mon, 06 May 2024 10:00:00 GMT""#));
        assert!(!json.contains("pub_date"));
    }

    #[test]
    fn test_snapshot_shape() {
        let result = AggregationResult {
            categories: vec![Category {
                category: "Energia".to_string(),
                items: vec![item()],
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["categories"][0]["category"], "Energia");
        assert_eq!(value["categories"][0]["items"][0]["link"], "https://example.com/a");
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{"categories":[{"category":"Clima","items":[]}]}"#;
        let result: AggregationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.categories.len(), 1);
        assert_eq!(result.categories[0].category, "Clima");
        assert!(result.categories[0].items.is_empty());
    }

    #[test]
    fn test_needs_enrichment() {
        let mut it = item();
        assert!(it.needs_enrichment());
        it.image = "https://example.com/i.jpg".to_string();
        assert!(it.needs_enrichment());
        it.body = "Text".to_string();
        assert!(!it.needs_enrichment());
    }
}
