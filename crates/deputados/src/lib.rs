mod parser;
pub mod cache;
pub mod export;
pub mod names;
pub mod scraper;
pub mod types;
pub mod utils;

pub use scraper::{ScraperError, WebScraper};

pub(crate) const BASE_URL: &str = "https://www.parlamento.pt";
