//! Product records as they are cached and persisted.

use serde::{Deserialize, Serialize};

/// Prefix of every product cache key.
pub const PRODUCT_DETAILS_PREFIX: &str = "product_details:";

/// A scraped product.
///
/// The same shape is stored as a cache entry value and as an element of the
/// persisted catalog document, so the serde names are the wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_title: String,
    /// Price text without the currency symbol. Compared verbatim.
    pub product_price: String,
    pub path_to_image: String,
}

impl ProductRecord {
    /// Whether this record was scraped at the given price.
    pub fn has_price(&self, price: &str) -> bool {
        self.product_price == price
    }
}

/// Cache key for a product title.
///
/// The title is embedded verbatim, so distinct titles never share a key.
pub fn product_cache_key(title: &str) -> String {
    format!("{PRODUCT_DETAILS_PREFIX}{title}")
}

/// File name for a product image, derived from its title.
///
/// Spaces and path separators become underscores. Products with the same
/// title share an image file.
pub fn image_file_name(title: &str, extension: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        assert_eq!(product_cache_key("Widget A"), "product_details:Widget A");
    }

    #[test]
    fn test_cache_keys_distinct() {
        let titles = ["Widget A", "Widget B", "widget a", "Widget A ", "Widget_A", ""];
        let keys: std::collections::HashSet<_> = titles.iter().map(|t| product_cache_key(t)).collect();
        assert_eq!(keys.len(), titles.len());
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name("Widget A", "jpg"), "Widget_A.jpg");
        assert_eq!(image_file_name("AC/DC Lamp", "jpg"), "AC_DC_Lamp.jpg");
        assert_eq!(image_file_name("..\\evil", "jpg"), ".._evil.jpg");
    }

    #[test]
    fn test_record_wire_names() {
        let record = ProductRecord {
            product_title: "Widget A".into(),
            product_price: "10".into(),
            path_to_image: "images/Widget_A.jpg".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["product_title"], "Widget A");
        assert_eq!(json["product_price"], "10");
        assert_eq!(json["path_to_image"], "images/Widget_A.jpg");
        assert!(record.has_price("10"));
        assert!(!record.has_price("10.00"));
    }
}
