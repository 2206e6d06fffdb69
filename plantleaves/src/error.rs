use std::io::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("homedir error: {0}")]
    Home(#[from] homedir::GetHomeError),

    #[error("home directory not found")]
    NoHomeDir,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("download name not specified: {0}")]
    DownloadNameNotSpecified(String),

    #[error("server returned status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("download failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<Error>,
    },

    #[error("invalid label mapping: {0}")]
    InvalidLabelMapping(String),

    #[error("error while decoding image '{0}': {1}")]
    DecodeImageError(std::path::PathBuf, image::ImageError),
}

impl Error {
    /// Whether re-issuing the same download could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reqwest(err) => reqwest_is_transient(err),
            Self::IO(err) => {
                // Body read failures from a blocking response arrive as
                // `io::Error` wrapping the reqwest error.
                if let Some(err) = err
                    .get_ref()
                    .and_then(|e| e.downcast_ref::<reqwest::Error>())
                {
                    return reqwest_is_transient(err);
                }
                matches!(
                    err.kind(),
                    ErrorKind::TimedOut
                        | ErrorKind::Interrupted
                        | ErrorKind::ConnectionReset
                        | ErrorKind::ConnectionAborted
                        | ErrorKind::UnexpectedEof
                )
            }
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

fn reqwest_is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.is_body()
        || err.is_request()
        || err.status().is_some_and(|s| s.is_server_error())
}
