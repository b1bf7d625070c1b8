//! Product extraction from listing page HTML.
//!
//! A listing page holds a sequence of product nodes. Each node yields a
//! [`RawProduct`] or, when a field is missing, a [`MalformedNode`]. One bad
//! node never hides the rest of the page.

use scraper::{ElementRef, Html, Selector};

use shopscrape_core::Error;

/// CSS selectors used to locate products and their fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Product nodes (default: ".products .product")
    pub product: String,

    /// Title, relative to a product node
    pub title: String,

    /// Price text, relative to a product node
    pub price: String,

    /// Thumbnail element, relative to a product node
    pub image: String,

    /// Attribute on the thumbnail holding the image URL (default: "data-lazy-src")
    pub image_attr: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            product: ".products .product".to_string(),
            title: ".woo-loop-product__title".to_string(),
            price: ".price .amount".to_string(),
            image: ".mf-product-thumbnail img".to_string(),
            image_attr: "data-lazy-src".to_string(),
        }
    }
}

/// Fields of one product as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
    pub title: String,
    pub price: String,
    /// As written in the page; may be relative.
    pub image_url: String,
}

/// A product node that could not be extracted.
#[derive(Debug)]
pub struct MalformedNode {
    /// Position among the page's product nodes, 0-based.
    pub index: usize,
    /// Title, when it was readable.
    pub title: Option<String>,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct ParsedPage {
    pub products: Vec<RawProduct>,
    pub failures: Vec<MalformedNode>,
}

#[derive(Debug, Clone)]
pub struct ProductParser {
    product: Selector,
    title: Selector,
    price: Selector,
    image: Selector,
    image_attr: String,
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::InvalidInput(format!("invalid selector {css:?}: {e}")))
}

impl ProductParser {
    pub fn new(config: &ParserConfig) -> Result<Self, Error> {
        Ok(Self {
            product: selector(&config.product)?,
            title: selector(&config.title)?,
            price: selector(&config.price)?,
            image: selector(&config.image)?,
            image_attr: config.image_attr.clone(),
        })
    }

    /// Extract every product node from a listing page, in document order.
    pub fn parse(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        for (index, node) in document.select(&self.product).enumerate() {
            match self.extract(node) {
                Ok(product) => page.products.push(product),
                Err((title, error)) => {
                    tracing::warn!(index, title = title.as_deref(), error = %error, "skipping malformed product");
                    page.failures.push(MalformedNode { index, title, error });
                }
            }
        }

        page
    }

    fn extract(&self, node: ElementRef<'_>) -> Result<RawProduct, (Option<String>, Error)> {
        let title = node
            .select(&self.title)
            .next()
            .map(|el| clean_title(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| (None, Error::MalformedProduct("missing title".into())))?;

        let malformed = |what: &str| (Some(title.clone()), Error::MalformedProduct(format!("{title}: missing {what}")));

        let price = node
            .select(&self.price)
            .next()
            .map(|el| clean_price(&el.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .ok_or_else(|| malformed("price"))?;

        let image_url = node
            .select(&self.image)
            .next()
            .and_then(|el| el.value().attr(&self.image_attr))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .ok_or_else(|| malformed("image"))?;

        Ok(RawProduct { title, price, image_url })
    }
}

/// Trim, drop trailing periods, trim again.
///
/// Only trailing periods go: ".NET Book." becomes ".NET Book", so titles
/// with a leading dot keep it in their cache key.
pub fn clean_title(raw: &str) -> String {
    raw.trim().trim_end_matches('.').trim().to_string()
}

/// Trim and drop the leading currency symbol.
///
/// A `.` directly before the first digit is a decimal point ("$.99" keeps
/// ".99") unless it ends an abbreviation such as "Rs.45". No digit at all
/// yields an empty price.
pub fn clean_price(raw: &str) -> String {
    let raw = raw.trim();
    let Some(digit) = raw.find(|c: char| c.is_ascii_digit()) else {
        return String::new();
    };

    let prefix = &raw[..digit];
    let start = match prefix.strip_suffix('.') {
        Some(before) if !before.ends_with(char::is_alphabetic) => digit - 1,
        _ => digit,
    };
    raw[start..].to_string()
}
