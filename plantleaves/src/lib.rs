pub mod category;
pub mod datasets;
pub mod download;
pub mod error;
pub mod manifest;
pub mod prelude;

pub use self::{
    datasets::{PlantLeaves, Record},
    download::{download_with_retry, DownloadManager, HttpDownloadManager},
    error::Error,
};
