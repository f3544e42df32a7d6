//! Build steps wired to storage and configuration.

pub mod pipelines;

pub use pipelines::{
    BundlePipeline, CheckPipeline, FetchPipeline, HomepagePipeline, PricePipeline, RouterPipeline,
    ScrapePipeline, SitePipeline, SiteTargets, StatusPipeline,
};
