pub use crate::category::labels::{LabelMapping, PLANT_LEAVES_LABELS};
pub use crate::category::resolver::{parse_code, FilenameLabeler};
pub use crate::datasets::{DatasetInfo, Examples, Feature, PlantLeaves, Record, Split, SplitGenerator};
pub use crate::download::{
    download_with_retry, DownloadConfig, DownloadManager, HttpDownloadManager, MAX_DOWNLOAD_RETRY,
};
pub use crate::error::Error;
pub use crate::manifest::{DownloadResult, UrlManifest};
