use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to spawn loader thread for {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },

    /// A loader thread exited without reporting its result.
    #[error("asset loader for {0} stopped before finishing")]
    LoaderGone(String),
}
