//! HTML parsers for catalog pages
//!
//! The crawler only depends on the [`PageParser`] trait. [`GrabCraftParser`]
//! is the implementation for grabcraft.com markup:
//!
//! | Page | Selector | Field |
//! |------|----------|-------|
//! | Home | `li` with a `cats-*` class, first `a[href]` | category links |
//! | Category | `div` whose class contains `product-box` | item boxes |
//! | Category | `h3.name a` inside an item box | title and detail URL |
//! | Detail | `div#main_pics img[src]` | image references |
//! | Detail | `td.value.tags` (comma separated text) | tags |

use crate::model::{CategoryRef, ItemDetail, ItemSummary};
use crate::url::resolve_href;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use url::Url;

/// Title used when an item box has no readable name
pub const UNKNOWN_TITLE: &str = "Unknown Build";

/// Errors raised by page parsers
#[derive(Debug, Error)]
pub enum ParseError {
    /// The home page has no category links; the markup is no longer supported
    #[error("No category links found on {url}. Check if the site structure has changed.")]
    NoCategories { url: String },

    /// A CSS selector could not be compiled
    #[error("Invalid selector {css:?}: {message}")]
    Selector { css: String, message: String },
}

/// Extracts structured records from catalog pages
pub trait PageParser {
    /// Ordered, de-duplicated category links from the home page
    ///
    /// Returns [`ParseError::NoCategories`] when none are found.
    fn category_links(&self, home_html: &str, base_url: &Url)
        -> Result<Vec<CategoryRef>, ParseError>;

    /// Items listed on a category page
    ///
    /// Items without a resolvable detail URL are dropped with a warning.
    fn item_summaries(&self, category_html: &str, category: &CategoryRef) -> Vec<ItemSummary>;

    /// Tags and image references from a detail page
    ///
    /// Missing sections yield empty fields, never an error.
    fn item_detail(&self, detail_html: &str, detail_url: &Url) -> ItemDetail;
}

/// Parser for grabcraft.com pages
#[derive(Debug, Clone)]
pub struct GrabCraftParser {
    category_item: Selector,
    first_link: Selector,
    div_with_class: Selector,
    item_name_link: Selector,
    main_pics: Selector,
    image: Selector,
    tags_cell: Selector,
}

impl GrabCraftParser {
    /// Compiles every selector used on grabcraft.com pages
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            category_item: selector("li[class]")?,
            first_link: selector("a[href]")?,
            div_with_class: selector("div[class]")?,
            item_name_link: selector("h3.name a")?,
            main_pics: selector("div#main_pics")?,
            image: selector("img[src]")?,
            tags_cell: selector("td.value.tags")?,
        })
    }

    fn is_category_item(element: &ElementRef<'_>) -> bool {
        element
            .value()
            .classes()
            .any(|class| class.starts_with("cats-"))
    }

    fn is_item_box(element: &ElementRef<'_>) -> bool {
        element
            .value()
            .attr("class")
            .map(|class| class.to_lowercase().contains("product-box"))
            .unwrap_or(false)
    }

    fn summary_from_box(
        &self,
        index: usize,
        item_box: ElementRef<'_>,
        category: &CategoryRef,
    ) -> Option<ItemSummary> {
        let link = item_box.select(&self.item_name_link).next();

        let title = link
            .map(|a| collapse_whitespace(&a.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "No build link found for build {} in category {}",
                    index,
                    category
                );
                UNKNOWN_TITLE.to_string()
            });

        let detail_url = link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_href(category.url(), href));

        let Some(detail_url) = detail_url else {
            tracing::warn!(
                "Build URL not found for build {} in category {}",
                index,
                category
            );
            return None;
        };

        Some(ItemSummary {
            title,
            detail_url,
            category_url: category.to_string(),
            discovered_at: Utc::now(),
        })
    }
}

impl PageParser for GrabCraftParser {
    fn category_links(
        &self,
        home_html: &str,
        base_url: &Url,
    ) -> Result<Vec<CategoryRef>, ParseError> {
        let document = Html::parse_document(home_html);
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for item in document
            .select(&self.category_item)
            .filter(Self::is_category_item)
        {
            let href = item
                .select(&self.first_link)
                .next()
                .and_then(|a| a.value().attr("href"));

            if let Some(url) = href.and_then(|h| resolve_href(base_url, h)) {
                if seen.insert(url.clone()) {
                    tracing::debug!("Found category: {}", url);
                    categories.push(CategoryRef::new(url));
                }
            }
        }

        if categories.is_empty() {
            return Err(ParseError::NoCategories {
                url: base_url.to_string(),
            });
        }

        Ok(categories)
    }

    fn item_summaries(&self, category_html: &str, category: &CategoryRef) -> Vec<ItemSummary> {
        let document = Html::parse_document(category_html);

        let boxes: Vec<ElementRef<'_>> = document
            .select(&self.div_with_class)
            .filter(Self::is_item_box)
            .collect();

        if boxes.is_empty() {
            tracing::warn!("No build items found in {}", category);
        }

        boxes
            .into_iter()
            .enumerate()
            .filter_map(|(index, item_box)| self.summary_from_box(index, item_box, category))
            .collect()
    }

    fn item_detail(&self, detail_html: &str, detail_url: &Url) -> ItemDetail {
        let document = Html::parse_document(detail_html);

        let image_refs = match document.select(&self.main_pics).next() {
            Some(gallery) => gallery
                .select(&self.image)
                .filter_map(|img| img.value().attr("src"))
                .filter_map(|src| resolve_href(detail_url, src))
                .collect(),
            None => {
                tracing::warn!(
                    "No image div with id 'main_pics' found in build details page: {}",
                    detail_url
                );
                Vec::new()
            }
        };

        let tags: BTreeSet<String> = match document.select(&self.tags_cell).next() {
            Some(cell) => split_tags(&cell.text().collect::<String>()),
            None => {
                tracing::warn!(
                    "No tags td with class 'value tags' found in build details page: {}",
                    detail_url
                );
                BTreeSet::new()
            }
        };

        ItemDetail { tags, image_refs }
    }
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        css: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Splits a comma separated tag cell into trimmed, non-empty tags
fn split_tags(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(collapse_whitespace)
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
