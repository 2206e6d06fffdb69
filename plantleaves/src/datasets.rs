use std::{
    collections::btree_map,
    fmt,
    path::{Path, PathBuf},
};

use image::{io::Reader as ImageReader, RgbImage};

use crate::{
    category::{labels::LabelMapping, resolver::FilenameLabeler},
    download::{download_with_retry, DownloadManager, MAX_DOWNLOAD_RETRY},
    error::Error,
    manifest::{DownloadResult, UrlManifest},
};

pub const NAME: &str = "plant_leaves";
pub const VERSION: &str = "0.1.0";
pub const HOMEPAGE: &str = "https://data.mendeley.com/datasets/hb74ynkjcn/1";

const CITATION: &str = r"@misc{,
  author={Siddharth Singh Chouhan, Ajay Kaul, Uday Pratap Singh, Sanjeev
Jain},
  title={A Database of Leaf Images: Practice towards Plant Conservation with
Plant Pathology},
  howpublished={Mendeley Data},
  year={2019}
}
";

const DESCRIPTION: &str = "This dataset consists of 4502 images of healthy and unhealthy plant leaves
divided into 22 categories by species and state of health. The images are in
high resolution JPG format.

Dataset URL: https://data.mendeley.com/datasets/hb74ynkjcn/1
License: http://creativecommons.org/licenses/by/4.0
";

const UNSTABLE: &str = "Each image is a separate download. Some might fail.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Image,
    Text,
    ClassLabel { names: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub citation: &'static str,
    pub urls: Vec<&'static str>,
    pub features: Vec<(&'static str, Feature)>,
    pub supervised_keys: (&'static str, &'static str),
    pub unstable: Option<&'static str>,
}

impl DatasetInfo {
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features
            .iter()
            .find_map(|(n, feature)| (*n == name).then_some(feature))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
        }
    }
}

#[derive(Debug)]
pub struct SplitGenerator {
    pub split: Split,
    pub num_shards: usize,
    pub image_files: DownloadResult,
}

/// One labelled image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub image: PathBuf,
    pub filename: String,
    pub label: String,
    pub label_index: usize,
}

impl Record {
    pub fn load_image(&self) -> Result<RgbImage, Error> {
        // Decode by content; the extension says JPG even when it lies.
        let image = ImageReader::open(&self.image)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| Error::DecodeImageError(self.image.clone(), e))?;
        Ok(image.into_rgb8())
    }
}

/// Single pass over downloaded files, yielding `("{label}/{filename}", record)`
/// for every file whose name resolves to a label.
pub struct Examples<'a> {
    files: btree_map::IntoIter<String, PathBuf>,
    labeler: FilenameLabeler<'a>,
    skipped: usize,
}

impl Examples<'_> {
    /// Files passed over so far because their name had no label.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Examples<'_> {
    type Item = (String, Record);

    fn next(&mut self) -> Option<Self::Item> {
        for (filename, image) in self.files.by_ref() {
            let Some((label, label_index)) = self.labeler.resolve_indexed(&filename) else {
                self.skipped += 1;
                continue;
            };
            let key = format!("{label}/{filename}");
            let record = Record {
                image,
                filename,
                label: label.to_owned(),
                label_index,
            };
            return Some((key, record));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.files.size_hint().1)
    }
}

/// Healthy and unhealthy plant leaves dataset.
pub struct PlantLeaves {
    labels: LabelMapping,
    urls_file: PathBuf,
    max_attempts: usize,
}

impl PlantLeaves {
    pub fn new(urls_file: impl AsRef<Path>) -> Self {
        Self {
            labels: LabelMapping::plant_leaves(),
            urls_file: urls_file.as_ref().to_owned(),
            max_attempts: MAX_DOWNLOAD_RETRY,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn labels(&self) -> &LabelMapping {
        &self.labels
    }

    pub fn info(&self) -> DatasetInfo {
        let names = self.labels.names().into_iter().map(String::from).collect();
        DatasetInfo {
            name: NAME,
            version: VERSION,
            description: DESCRIPTION,
            citation: CITATION,
            urls: vec![HOMEPAGE],
            features: vec![
                ("image", Feature::Image),
                ("image/filename", Feature::Text),
                ("label", Feature::ClassLabel { names }),
            ],
            supervised_keys: ("image", "label"),
            unstable: Some(UNSTABLE),
        }
    }

    /// Downloads every image on the url list and returns the single
    /// training split.
    ///
    /// Images are downloaded one by one from the list since there is no
    /// working batch archive.
    pub fn split_generators<D: DownloadManager + ?Sized>(
        &self,
        manager: &D,
    ) -> Result<Vec<SplitGenerator>, Error> {
        let manifest = UrlManifest::from_path(&self.urls_file)?;
        log::info!("{} urls listed in {}", manifest.len(), self.urls_file.display());
        let image_files = download_with_retry(manager, &manifest, self.max_attempts)?;
        Ok(vec![SplitGenerator {
            split: Split::Train,
            num_shards: 1,
            image_files,
        }])
    }

    pub fn generate_examples(&self, image_files: DownloadResult) -> Examples<'_> {
        Examples {
            files: image_files.into_iter(),
            labeler: FilenameLabeler::new(&self.labels),
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn files(names: &[&str]) -> DownloadResult {
        names
            .iter()
            .map(|name| (*name, PathBuf::from("/cache").join(name)))
            .collect()
    }

    #[test]
    fn unknown_codes_are_dropped() {
        let dataset = PlantLeaves::new("unused.txt");
        let mut examples =
            dataset.generate_examples(files(&["0001_leaf.JPG", "0099_leaf.JPG"]));
        let (key, record) = examples.next().unwrap();
        assert!(examples.next().is_none());
        assert_eq!(examples.skipped(), 1);

        assert_eq!(key, "Mango (P0) healthy/0001_leaf.JPG");
        assert_eq!(record.filename, "0001_leaf.JPG");
        assert_eq!(record.label, "Mango (P0) healthy");
        assert_eq!(record.label_index, 17);
        assert_eq!(record.image, PathBuf::from("/cache/0001_leaf.JPG"));
    }

    #[test]
    fn lowercase_extension_is_dropped() {
        let dataset = PlantLeaves::new("unused.txt");
        let examples: Vec<_> = dataset
            .generate_examples(files(&["0001_leaf.jpg"]))
            .collect();
        assert!(examples.is_empty());
    }

    #[test]
    fn one_record_per_matching_file_with_unique_keys() {
        let dataset = PlantLeaves::new("unused.txt");
        let names: Vec<String> = dataset
            .labels()
            .iter()
            .flat_map(|(code, _)| (0..3).map(move |i| format!("{code}_{i:04}.JPG")))
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        let keys: HashSet<String> = dataset
            .generate_examples(files(&names))
            .map(|(key, record)| {
                assert_eq!(key, format!("{}/{}", record.label, record.filename));
                key
            })
            .collect();
        assert_eq!(keys.len(), 66);
    }

    #[test]
    fn info_declares_the_class_labels() {
        let info = PlantLeaves::new("unused.txt").info();
        assert_eq!(info.version, "0.1.0");
        assert_eq!(info.supervised_keys, ("image", "label"));
        assert_eq!(info.urls, [HOMEPAGE]);
        assert!(info.citation.contains("Mendeley Data"));
        match info.feature("label") {
            Some(Feature::ClassLabel { names }) => {
                assert_eq!(names.len(), 22);
                assert_eq!(names[0], "Alstonia Scholaris (P2) diseased");
            }
            other => panic!("unexpected label feature: {other:?}"),
        }
        assert_eq!(info.feature("image/filename"), Some(&Feature::Text));
    }

    #[test]
    fn split_display() {
        assert_eq!(Split::Train.to_string(), "train");
    }
}
