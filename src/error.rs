use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load sprite {}", .path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite {} has no pixels", .path.display())]
    EmptySprite { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
