use clap::Parser;
use ew2landers::core::Pipeline;
use ew2landers::utils::{error::SiteError, logger, validation::Validate};
use ew2landers::{
    BundlePipeline, CheckPipeline, CliConfig, Command, EtlEngine, FetchPipeline, HomepagePipeline,
    LocalStorage, PricePipeline, RouterPipeline, ScrapePipeline, SiteConfig, SitePipeline,
    SiteTargets, StatusPipeline,
};
use std::path::Path;

async fn run<P: Pipeline>(pipeline: P, monitor: bool) -> Result<String, SiteError> {
    EtlEngine::new_with_monitoring(pipeline, monitor).run().await
}

async fn dispatch(cli: &CliConfig, config: SiteConfig) -> Result<Vec<String>, SiteError> {
    let storage = LocalStorage::new(&cli.root);
    let monitor = cli.monitor || config.monitoring_enabled();

    let location = match &cli.command {
        Command::Fetch { url } => {
            let mut pipeline = FetchPipeline::new(storage, &config)?;
            if let Some(url) = url {
                pipeline = pipeline.with_url(url.clone());
            }
            run(pipeline, monitor).await?
        }
        Command::Scrape { snapshot, out } => {
            let mut pipeline = ScrapePipeline::new(storage, config);
            if let Some(snapshot) = snapshot {
                pipeline = pipeline.with_snapshot(snapshot.clone());
            }
            if let Some(out) = out {
                pipeline = pipeline.with_output(out.clone());
            }
            run(pipeline, monitor).await?
        }
        Command::Check { schedule } => {
            let path = schedule.clone().unwrap_or_else(|| config.paths.schedule_json.clone());
            run(CheckPipeline::new(storage, path), monitor).await?
        }
        Command::Prices => run(PricePipeline::new(storage, &config)?, monitor).await?,
        Command::Site {
            no_landers,
            no_images,
        } => {
            let targets = SiteTargets {
                landers: !no_landers,
                images: !no_images,
            };
            run(SitePipeline::new(storage, config).with_targets(targets), monitor).await?
        }
        Command::Homepage { template, out } => {
            let mut pipeline = HomepagePipeline::new(storage, &config);
            if let Some(template) = template {
                pipeline = pipeline.with_template(template.clone());
            }
            if let Some(out) = out {
                pipeline = pipeline.with_output(out.clone());
            }
            run(pipeline, monitor).await?
        }
        Command::RouterLanders { landers_config } => {
            let mut pipeline = RouterPipeline::new(storage, config);
            if let Some(path) = landers_config {
                pipeline = pipeline.with_landers_config(path.clone());
            }
            run(pipeline, monitor).await?
        }
        Command::Status { out, soft } => {
            let mut pipeline = StatusPipeline::new(storage, &config).soft(*soft);
            if let Some(out) = out {
                pipeline = pipeline.with_output(out.clone());
            }
            run(pipeline, monitor).await?
        }
        Command::Bundle { out } => {
            let source = config.paths.output_dir.clone();
            run(BundlePipeline::new(storage, source, out.clone()), monitor).await?
        }
        Command::Build => {
            let schedule_path = config.paths.schedule_json.clone();
            return Ok(vec![
                run(ScrapePipeline::new(storage.clone(), config.clone()), monitor).await?,
                run(CheckPipeline::new(storage.clone(), schedule_path), monitor).await?,
                run(SitePipeline::new(storage.clone(), config.clone()), monitor).await?,
                run(HomepagePipeline::new(storage, &config), monitor).await?,
            ]);
        }
    };

    Ok(vec![location])
}

fn fail(e: &SiteError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_ci_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting ew2landers");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config_path = Path::new(&cli.root).join(&cli.config);
    let config = match SiteConfig::from_file(&config_path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            fail(&e);
        }
    };

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match dispatch(&cli, config).await {
        Ok(locations) => {
            for location in locations {
                println!("✅ {}", location);
            }
        }
        Err(e) => fail(&e),
    }
}
