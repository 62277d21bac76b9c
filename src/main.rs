use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imgcache::LoadOutcome;
use imgcache::infrastructure::{AppConfig, CliArgs, ConfigLoader, build_cache_service};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("imgcache={}", config.log_level)));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = match ConfigLoader::new() {
        Ok(loader) => loader.load_config(args.config.as_deref())?,
        Err(_) => match &args.config {
            Some(path) => ConfigLoader::parse_file(path)?,
            None => AppConfig::default(),
        },
    };
    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args).wrap_err("invalid configuration")?;

    init_logging(&config)?;

    info!(
        version = imgcache::VERSION,
        max_entries = config.cache.max_entries,
        max_cost_bytes = config.cache.max_cost_bytes,
        "Starting imgcache"
    );

    let service = build_cache_service(&config).wrap_err("failed to create image service")?;

    for url in &args.urls {
        for attempt in 1..=args.repeat {
            match service.load(url.as_str()).await {
                LoadOutcome::Loaded(loaded) => println!(
                    "{url} [{attempt}] {}x{} from {} ({} bytes)",
                    loaded.image.width(),
                    loaded.image.height(),
                    loaded.source,
                    loaded.image.cost()
                ),
                LoadOutcome::Failed(error) => {
                    warn!(url = %url, error = %error, "Load failed");
                    println!("{url} [{attempt}] unavailable: {error}");
                }
                LoadOutcome::Cancelled => println!("{url} [{attempt}] cancelled"),
            }
        }
    }

    println!("{}", service.stats());

    Ok(())
}
