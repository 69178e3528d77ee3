//! Google Custom Search JSON API response, restricted by the `fields` parameter
//! to what the bot renders.

use serde::Deserialize;

use super::{SearchImage, SearchItem, SearchResults};

pub const FIELDS: &str = "items(title,link,displayLink,snippet,pagemap(cse_image,cse_thumbnail))";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponseDto {
    pub items: Vec<SearchItemDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchItemDto {
    pub title: String,
    pub link: String,
    pub display_link: String,
    pub snippet: String,
    pub pagemap: Option<PageMapDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageMapDto {
    pub cse_image: Vec<ImageDto>,
    pub cse_thumbnail: Vec<ImageDto>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDto {
    pub src: String,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
}

/// The API is inconsistent about quoting image sizes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(u64),
    Text(String),
}

impl Dimension {
    fn value(&self) -> Option<u32> {
        match self {
            Dimension::Number(n) => u32::try_from(*n).ok(),
            Dimension::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<ImageDto> for SearchImage {
    fn from(image: ImageDto) -> Self {
        SearchImage {
            src: image.src,
            width: image.width.as_ref().and_then(Dimension::value),
            height: image.height.as_ref().and_then(Dimension::value),
        }
    }
}

impl SearchResponseDto {
    pub fn into_results(self) -> SearchResults {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                let pagemap = item.pagemap.unwrap_or_default();
                SearchItem {
                    title: item.title,
                    link: item.link,
                    display_link: item.display_link,
                    snippet: item.snippet,
                    images: pagemap.cse_image.into_iter().map(SearchImage::from).collect(),
                    thumbnails: pagemap.cse_thumbnail.into_iter().map(SearchImage::from).collect(),
                }
            })
            .collect();

        SearchResults { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "items": [
            {
                "title": "Rust Programming Language",
                "link": "https://www.rust-lang.org/",
                "displayLink": "www.rust-lang.org",
                "snippet": "A language empowering everyone to build reliable and efficient software.",
                "pagemap": {
                    "cse_thumbnail": [{"src": "https://encrypted-tbn0.gstatic.com/images?q=rust", "width": "225", "height": "225"}],
                    "cse_image": [{"src": "https://www.rust-lang.org/static/images/rust-social.jpg"}]
                }
            },
            {
                "title": "Rust (video game)",
                "link": "https://rust.facepunch.com/",
                "displayLink": "rust.facepunch.com",
                "snippet": "The only aim in Rust is to survive."
            }
        ]
    }"#;

    #[test]
    fn maps_items_and_images() {
        let dto: SearchResponseDto = serde_json::from_str(RESPONSE).unwrap();
        let results = dto.into_results();

        assert_eq!(results.items.len(), 2);
        let first = &results.items[0];
        assert_eq!(first.display_link, "www.rust-lang.org");
        assert_eq!(first.thumbnails.len(), 1);
        assert_eq!(first.thumbnails[0].width, Some(225));
        assert_eq!(first.images[0].height, None);
        assert_eq!(
            first.thumbnail_url(),
            Some("https://encrypted-tbn0.gstatic.com/images?q=rust")
        );

        assert!(results.items[1].thumbnails.is_empty());
        assert_eq!(results.items[1].thumbnail_url(), None);
    }

    #[test]
    fn response_without_items_is_empty() {
        let dto: SearchResponseDto = serde_json::from_str("{}").unwrap();
        assert!(dto.into_results().items.is_empty());
    }

    #[test]
    fn numeric_dimensions_are_accepted() {
        let image: ImageDto = serde_json::from_str(r#"{"src": "x", "width": 64, "height": "n/a"}"#).unwrap();
        let image = SearchImage::from(image);
        assert_eq!(image.width, Some(64));
        assert_eq!(image.height, None);
    }
}
