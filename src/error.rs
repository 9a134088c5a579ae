// One error type for the whole crate.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Pushing the frame to the window failed

    #[error("Config error: {0}")]
    Config(String), // config.toml could not be read or parsed

    #[error("Size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (usize, usize), // output surface dimensions
        actual: (usize, usize),   // offscreen mask dimensions
    },

    #[error("Spacing must be at least 1 pixel")]
    InvalidSpacing,
}
