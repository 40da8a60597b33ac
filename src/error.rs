//! Error types.

use std::path::PathBuf;

use bitflags::bitflags;
use thiserror::Error;

use crate::samples::OutOfRange;

bitflags! {
    /// Bit mask describing what failed during initialization or window creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ErrorMask: u32 {
        /// The windowing subsystem could not be initialized.
        const VIDEO_INIT = 1;
        /// A window could not be created.
        const WINDOW_CREATE = 1 << 1;
        /// A drawing surface could not be created for a window.
        const SURFACE_CREATE = 1 << 2;
        /// The font subsystem could not be initialized.
        const FONT_INIT = 1 << 4;
    }
}

impl ErrorMask {
    /// Whether any bit in the mask forbids further use.
    ///
    /// Only [`ErrorMask::FONT_INIT`] is survivable: graphs still plot, without captions.
    pub fn is_fatal(self) -> bool {
        !self.difference(Self::FONT_INIT).is_empty()
    }
}

/// Errors reported by the windowing backend.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The windowing subsystem is not available.
    #[error("windowing subsystem unavailable: {0}")]
    Unavailable(String),
    /// Creating a native window failed.
    #[error("window creation failed: {0}")]
    WindowCreation(String),
    /// Creating the drawing surface for a window failed.
    #[error("drawing surface creation failed: {0}")]
    SurfaceCreation(String),
}

impl PlatformError {
    /// The mask bit corresponding to this error.
    pub fn mask(&self) -> ErrorMask {
        match self {
            Self::Unavailable(_) => ErrorMask::VIDEO_INIT,
            Self::WindowCreation(_) => ErrorMask::WINDOW_CREATE,
            Self::SurfaceCreation(_) => ErrorMask::SURFACE_CREATE,
        }
    }
}

/// Errors reported by the font subsystem.
///
/// None of these are fatal to a graph; they only cost it captions.
#[derive(Debug, Error)]
pub enum TextError {
    /// The font subsystem could not be initialized.
    #[error("font subsystem unavailable: {0}")]
    Unavailable(String),
    /// The font file could not be read.
    #[error("failed to read font {}: {source}", .path.display())]
    Io {
        /// Font file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but is not a usable font.
    #[error("{} is not a usable font", .path.display())]
    InvalidFont {
        /// Font file path.
        path: PathBuf,
    },
    /// The text produced no pixels.
    #[error("nothing to render for {0:?}")]
    EmptyText(String),
}

/// Errors reported by graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Window or drawing-surface creation failed; the graph does not exist.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// A sample index was outside the buffer.
    #[error(transparent)]
    Index(#[from] OutOfRange),
}

impl GraphError {
    /// The mask bit corresponding to this error, if it is a construction failure.
    pub fn mask(&self) -> ErrorMask {
        match self {
            Self::Platform(err) => err.mask(),
            Self::Index(_) => ErrorMask::empty(),
        }
    }
}

/// Library initialization failed.
#[derive(Debug, Error)]
#[error("library initialization failed ({mask:?}): {source}")]
pub struct InitError {
    /// Every failed subsystem.
    pub mask: ErrorMask,
    /// The fatal failure.
    #[source]
    pub source: PlatformError,
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result alias for font operations.
pub type TextResult<T> = Result<T, TextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_failure_alone_is_not_fatal() {
        assert!(!ErrorMask::FONT_INIT.is_fatal());
        assert!(!ErrorMask::empty().is_fatal());
        assert!((ErrorMask::FONT_INIT | ErrorMask::VIDEO_INIT).is_fatal());
        assert!(ErrorMask::SURFACE_CREATE.is_fatal());
    }

    #[test]
    fn platform_errors_map_to_mask_bits() {
        let err = PlatformError::WindowCreation("no display".into());
        assert_eq!(err.mask().bits(), 1 << 1);
        let graph_err = GraphError::from(PlatformError::SurfaceCreation("lost".into()));
        assert_eq!(graph_err.mask(), ErrorMask::SURFACE_CREATE);
    }
}
