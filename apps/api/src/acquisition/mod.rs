// Content acquisition: everything that pulls text from remote pages.
// Sitemap URLs feed internal-link suggestions; competitor excerpts feed prompt context.

pub mod competitors;
pub mod http;
pub mod page_scraper;
pub mod sitemap;
