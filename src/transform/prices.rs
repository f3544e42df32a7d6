//! Session prices scraped from Enrollware enroll pages.

use crate::config::toml_config::PricesConfig;
use crate::domain::model::Schedule;
use crate::utils::error::Result;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Register URL → price; `None` records a page that had no price or failed to load.
pub type PriceCache = BTreeMap<String, Option<String>>;

fn price_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*\d+(?:\.\d{2})?").unwrap())
}

/// First `$##` or `$##.##` in the page's text nodes.
pub fn extract_price(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.root_element()
        .text()
        .map(str::trim)
        .filter(|t| t.contains('$'))
        .find_map(|t| price_pattern().find(t).map(|m| m.as_str().to_string()))
}

pub struct PriceFetcher {
    client: Client,
    throttle: Duration,
}

impl PriceFetcher {
    pub fn new(config: &PricesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            throttle: Duration::from_millis(config.throttle_millis),
        })
    }

    async fn get_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Request failures are logged and reported as no price.
    pub async fn fetch_price(&self, url: &str) -> Option<String> {
        tracing::info!("💲 Fetching price from {}", url);
        let page = match self.get_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("⚠️ Request failed for {}: {}", url, e);
                return None;
            }
        };

        let price = extract_price(&page);
        match &price {
            Some(p) => tracing::info!("   → Found price: {}", p),
            None => tracing::info!("   → No price found"),
        }

        tokio::time::sleep(self.throttle).await;
        price
    }
}

/// Fills in missing session prices. Returns how many sessions gained a price.
pub async fn apply_prices(schedule: &mut Schedule, cache: &mut PriceCache, fetcher: &PriceFetcher) -> usize {
    let total = schedule.sessions.len();
    let mut updated = 0;

    for (idx, session) in schedule.sessions.iter_mut().enumerate() {
        let url = session.register_url().to_string();
        if url.is_empty() {
            continue;
        }

        if let Some(existing) = session.price.clone().filter(|p| !p.is_empty()) {
            cache.entry(url).or_insert(Some(existing));
            continue;
        }

        let price = match cache.get(&url) {
            Some(cached) => cached.clone(),
            None => {
                tracing::debug!("[{}/{}] course_id={}", idx + 1, total, session.course_id);
                let fetched = fetcher.fetch_price(&url).await;
                cache.insert(url, fetched.clone());
                fetched
            }
        };

        if let Some(price) = price {
            session.price = Some(price);
            updated += 1;
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_price_in_text() {
        let html = r#"<html><body>
            <h1>BLS Provider</h1>
            <table><tr><td>Fee:</td><td>$ 65.00</td></tr><tr><td>Book</td><td>$18</td></tr></table>
        </body></html>"#;
        assert_eq!(extract_price(html).as_deref(), Some("$ 65.00"));
    }

    #[test]
    fn test_extract_price_ignores_markup_attributes() {
        let html = r#"<div data-cost="$99.00">Price: <b>$45</b></div>"#;
        assert_eq!(extract_price(html).as_deref(), Some("$45"));
    }

    #[test]
    fn test_no_price() {
        assert_eq!(extract_price("<p>Call for pricing</p>"), None);
        assert_eq!(extract_price("<p>Only $ signs here</p>"), None);
    }
}
