pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod scrape;
pub mod transform;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::{Command, CliConfig};
pub use config::toml_config::SiteConfig;

pub use app::{
    BundlePipeline, CheckPipeline, FetchPipeline, HomepagePipeline, PricePipeline, RouterPipeline,
    ScrapePipeline, SitePipeline, SiteTargets, StatusPipeline,
};
pub use crate::core::etl::EtlEngine;
pub use utils::error::{Result, SiteError};
