use std::{
    collections::{btree_map, BTreeMap, HashSet},
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use image::ImageFormat;
use walkdir::WalkDir;

use crate::error::Error;

/// Maps the last path segment of every URL to the URL itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlManifest {
    urls: BTreeMap<String, String>,
}

impl UrlManifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Reading url list from: {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// One URL per line. Blank lines are ignored, and a later URL with the
    /// same basename replaces an earlier one.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, Error> {
        let mut urls = BTreeMap::new();
        for line in reader.lines() {
            let line = line?;
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            urls.insert(basename(url).to_owned(), url.to_owned());
        }
        Ok(Self { urls })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<N: Into<String>, U: Into<String>> FromIterator<(N, U)> for UrlManifest {
    fn from_iter<T: IntoIterator<Item = (N, U)>>(iter: T) -> Self {
        Self {
            urls: iter
                .into_iter()
                .map(|(n, u)| (n.into(), u.into()))
                .collect(),
        }
    }
}

fn basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn image_extensions() -> HashSet<&'static str> {
    let mut set = HashSet::default();
    set.extend(ImageFormat::Jpeg.extensions_str());
    set.extend(ImageFormat::Png.extensions_str());
    set.extend(ImageFormat::Gif.extensions_str());
    set.extend(ImageFormat::WebP.extensions_str());
    set.extend(ImageFormat::Tiff.extensions_str());
    set.extend(ImageFormat::Bmp.extensions_str());
    set
}

/// Local paths of downloaded files, keyed by their original basename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadResult {
    files: BTreeMap<String, PathBuf>,
}

impl DownloadResult {
    /// Collects the image files already present below `parent`, for datasets
    /// that were fetched by hand.
    pub fn from_dir(parent: impl AsRef<Path>) -> Result<Self, Error> {
        let exts = image_extensions();
        let parent = parent.as_ref();
        if !parent.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", parent.display()),
            )
            .into());
        }

        let files = WalkDir::new(parent)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let ext = entry.path().extension()?.to_str()?.to_ascii_lowercase();
                exts.contains(ext.as_str()).then_some(entry)
            })
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_owned();
                Some((name, entry.into_path()))
            })
            .collect();
        Ok(Self { files })
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.files.insert(name.into(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.files.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for DownloadResult {
    fn from_iter<T: IntoIterator<Item = (N, P)>>(iter: T) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(n, p)| (n.into(), p.into()))
                .collect(),
        }
    }
}

impl IntoIterator for DownloadResult {
    type Item = (String, PathBuf);
    type IntoIter = btree_map::IntoIter<String, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}
