use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::Error,
    manifest::{DownloadResult, UrlManifest},
};

/// Upper bound on batch download attempts. Downloads are cached, so a retry
/// only fetches what is still missing.
pub const MAX_DOWNLOAD_RETRY: usize = 10;

/// Fetches every entry of a manifest, returning the local path of each file.
pub trait DownloadManager {
    fn download(&self, manifest: &UrlManifest) -> Result<DownloadResult, Error>;
}

/// Runs `manager.download` until it succeeds, a non-transient error occurs,
/// or `max_attempts` transient failures have been seen.
pub fn download_with_retry<D: DownloadManager + ?Sized>(
    manager: &D,
    manifest: &UrlManifest,
    max_attempts: usize,
) -> Result<DownloadResult, Error> {
    let mut attempts = 0;
    loop {
        match manager.download(manifest) {
            Ok(files) => return Ok(files),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(Error::RetriesExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                log::warn!("Download attempt {attempts}/{max_attempts} failed, retrying: {err}");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub cache_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl DownloadConfig {
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            timeout: Some(Duration::from_secs(60)),
        }
    }

    /// `~/.plantleaves/downloads`
    pub fn in_home() -> Result<Self, Error> {
        Ok(Self::with_cache_dir(get_home_dir()?.join("downloads")))
    }
}

pub struct HttpDownloadManager {
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

impl HttpDownloadManager {
    pub fn new(config: DownloadConfig) -> Result<Self, Error> {
        ensure_dir(&config.cache_dir)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            cache_dir: config.cache_dir,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl DownloadManager for HttpDownloadManager {
    fn download(&self, manifest: &UrlManifest) -> Result<DownloadResult, Error> {
        log::info!(
            "Downloading {} files to: {}",
            manifest.len(),
            self.cache_dir.display()
        );
        let pb = indicatif::ProgressBar::new(manifest.len() as u64);
        let mut files = DownloadResult::default();
        for (name, url) in manifest.iter() {
            let path = download_file(&self.client, url, &self.cache_dir, name)?;
            files.insert(name, path);
            pb.inc(1);
        }
        pb.finish();
        Ok(files)
    }
}

fn ensure_dir(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn get_home_dir() -> Result<PathBuf, Error> {
    let home = homedir::get_my_home()?
        .ok_or(Error::NoHomeDir)?
        .join(".plantleaves");
    Ok(home)
}

fn download_file(
    client: &reqwest::blocking::Client,
    url: &str,
    dest_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, Error> {
    if file_name.is_empty() {
        return Err(Error::DownloadNameNotSpecified(url.to_owned()));
    }
    let downloaded_file = dest_dir.join(file_name);
    if downloaded_file.exists() {
        log::info!("File already exists: {}", downloaded_file.display());
        return Ok(downloaded_file);
    }

    log::debug!("Downloading {} to: {}", url, downloaded_file.display());
    let mut response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }

    // Only complete files are renamed into place, so they alone count as cached.
    let partial = dest_dir.join(format!("{file_name}.part"));
    if let Err(err) = stream_to_file(&mut response, &partial) {
        if let Err(cleanup) = fs::remove_file(&partial) {
            log::debug!("Could not remove {}: {cleanup}", partial.display());
        }
        return Err(err);
    }
    fs::rename(&partial, &downloaded_file)?;
    Ok(downloaded_file)
}

fn stream_to_file(source: &mut impl Read, path: &Path) -> Result<(), Error> {
    let mut dest = File::create(path)?;
    let mut buf = [0; 262144]; // 256KiB buffer
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        dest.write_all(&buf[..n])?;
    }
    dest.flush()?;
    Ok(())
}
