//! Centralized error type for the tempus umbrella crate.
//!
//! Wraps the member crate errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tempus_core::Error),

    #[error(transparent)]
    Stretch(#[from] tempus_stretch::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
