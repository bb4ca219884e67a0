use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum GeoRTreeError {
    #[error("Level {0} out of bounds")]
    LevelOutOfBounds(usize),
}

pub type Result<T> = std::result::Result<T, GeoRTreeError>;
