use std::{collections::BTreeMap, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{eyre, Context, Result};
use plantleaves::prelude::*;

/// Download the Plant Leaves images and label them by file name.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File with one image URL per line.
    #[arg(long)]
    urls: PathBuf,

    /// Where downloaded images are cached. Defaults to ~/.plantleaves/downloads.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Use images already present in this directory instead of downloading.
    #[arg(long, conflicts_with = "cache_dir")]
    manual_dir: Option<PathBuf>,

    #[arg(long, default_value_t = MAX_DOWNLOAD_RETRY)]
    max_attempts: usize,

    /// Print every generated key and image path.
    #[arg(long)]
    list: bool,

    /// Decode every labelled image.
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    color_eyre::install()?;
    let args = Args::parse();

    let dataset = PlantLeaves::new(&args.urls).with_max_attempts(args.max_attempts);
    let info = dataset.info();
    log::info!("Preparing {} v{}", info.name, info.version);

    let image_files = match &args.manual_dir {
        Some(dir) => DownloadResult::from_dir(dir)
            .with_context(|| format!("reading images from {}", dir.display()))?,
        None => {
            let config = match args.cache_dir {
                Some(dir) => DownloadConfig::with_cache_dir(dir),
                None => DownloadConfig::in_home()?,
            };
            let manager = HttpDownloadManager::new(config)?;
            log::info!("Caching images in {}", manager.cache_dir().display());
            dataset
                .split_generators(&manager)
                .context("downloading Plant Leaves")?
                .into_iter()
                .find(|split| split.split == Split::Train)
                .ok_or_else(|| eyre!("no train split"))?
                .image_files
        }
    };

    let mut per_label: BTreeMap<String, usize> = BTreeMap::new();
    let mut examples = dataset.generate_examples(image_files);
    for (key, record) in examples.by_ref() {
        if args.verify {
            record
                .load_image()
                .with_context(|| format!("verifying {key}"))?;
        }
        if args.list {
            println!("{key}\t{}", record.image.display());
        }
        *per_label.entry(record.label).or_default() += 1;
    }

    let total: usize = per_label.values().sum();
    for (label, count) in &per_label {
        println!("{count:>6}  {label}");
    }
    println!("{total:>6}  records ({} files skipped)", examples.skipped());
    Ok(())
}
