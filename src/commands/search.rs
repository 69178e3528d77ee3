use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use tracing::error;

use super::Reply;
use crate::search::{SearchItem, SearchRequest, SearchService};

pub const NO_QUERY: &str = "No search query given.";
pub const FAILED: &str = "Sorry, I couldn't process your search request at the moment.";

const SEARCH_COLOR: u32 = 0x4285F4;

pub async fn lookup(service: &SearchService, query: &str, count: Option<u32>, country: Option<String>) -> Reply {
    let query = query.trim();
    if query.is_empty() {
        return Reply::text(NO_QUERY);
    }

    let request = SearchRequest {
        count,
        country,
        ..SearchRequest::new(query)
    };

    match service.search(&request).await {
        Ok(results) if results.items.is_empty() => Reply::text(format!("Search \"{query}\" yielded no results.")),
        Ok(results) => Reply::Embeds(results.items.iter().map(result_embed).collect()),
        Err(e) => {
            error!("Search for {} failed: {}", query, e);
            Reply::text(FAILED)
        }
    }
}

pub fn result_embed(item: &SearchItem) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&item.title)
        .url(&item.link)
        .description(&item.snippet)
        .color(SEARCH_COLOR);

    if !item.display_link.is_empty() {
        embed = embed.footer(CreateEmbedFooter::new(&item.display_link));
    }
    if let Some(thumbnail) = item.thumbnail_url() {
        embed = embed.thumbnail(thumbnail);
    }

    embed
}
