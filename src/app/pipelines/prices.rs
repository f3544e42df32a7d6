use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Schedule, Storage};
use crate::transform::prices::{apply_prices, PriceCache, PriceFetcher};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Fills `price` on sessions from their enroll pages, through the on-disk cache.
pub struct PricePipeline<S: Storage> {
    storage: S,
    fetcher: PriceFetcher,
    schedule_path: String,
    cache_path: String,
}

impl<S: Storage> PricePipeline<S> {
    pub fn new(storage: S, config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            storage,
            fetcher: PriceFetcher::new(&config.prices)?,
            schedule_path: config.paths.schedule_json.clone(),
            cache_path: config.prices.cache.clone(),
        })
    }

    /// A missing or unreadable cache starts empty.
    async fn load_cache(&self) -> PriceCache {
        if !self.storage.exists(&self.cache_path).await {
            return PriceCache::new();
        }
        match files::read_json(&self.storage, &self.cache_path).await {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("⚠️ Ignoring price cache {}: {}", self.cache_path, e);
                PriceCache::new()
            }
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for PricePipeline<S> {
    type Input = (Schedule, PriceCache);
    type Output = (Schedule, PriceCache);

    fn name(&self) -> &str {
        "prices"
    }

    async fn extract(&self) -> Result<(Schedule, PriceCache)> {
        let schedule = files::read_json(&self.storage, &self.schedule_path).await?;
        let cache = self.load_cache().await;
        tracing::debug!("Price cache has {} entries", cache.len());
        Ok((schedule, cache))
    }

    async fn transform(&self, input: (Schedule, PriceCache)) -> Result<(Schedule, PriceCache)> {
        let (mut schedule, mut cache) = input;
        let updated = apply_prices(&mut schedule, &mut cache, &self.fetcher).await;
        tracing::info!("💲 Updated {} session(s) with prices", updated);
        Ok((schedule, cache))
    }

    async fn load(&self, output: (Schedule, PriceCache)) -> Result<String> {
        let (schedule, cache) = output;
        files::write_json(&self.storage, &self.schedule_path, &schedule).await?;
        files::write_json(&self.storage, &self.cache_path, &cache).await?;
        Ok(self.schedule_path.clone())
    }
}
