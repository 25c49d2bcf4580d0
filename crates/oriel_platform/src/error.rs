//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to initialize the native platform
    #[error("platform initialization failed: {0}")]
    InitFailed(String),

    /// Failed to create a native window
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// Failed to create a hidden offscreen window
    #[error("failed to create offscreen window: {0}")]
    OffscreenWindowCreation(String),

    /// Failed to create the OpenGL context
    #[error("failed to create OpenGL context: {0}")]
    ContextCreation(String),

    /// Failed to make the OpenGL context current against a window
    #[error("failed to activate OpenGL context: {0}")]
    ContextActivation(String),

    /// An operation required a context but none exists
    #[error("no OpenGL context exists")]
    NoContext,

    /// Failed to load OpenGL function pointers
    #[error("failed to load OpenGL functions: {0}")]
    GlLoad(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
