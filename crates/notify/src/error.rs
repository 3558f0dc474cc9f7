use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("failed to read CA bundle {path}: {source}")]
    CaBundleRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CA bundle {path} contains no certificates")]
    CaBundleEmpty { path: PathBuf },

    #[error("invalid certificate in CA bundle {path}: {source}")]
    CaBundleInvalid {
        path: PathBuf,
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}
