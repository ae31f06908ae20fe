use std::fmt;

use thiserror::Error;

/// Error type for every fallible modeling operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolidkitError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid parametrization: {0}")]
    InvalidParametrization(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("wire is not a planar, closed, non-self-intersecting boundary: {0}")]
    NonPlanarOrSelfIntersecting(String),

    #[error("disconnected wire: {0}")]
    DisconnectedWire(String),

    #[error("fillet failed: {0}")]
    FilletFailure(String),

    #[error("shell failed: {0}")]
    ShellFailure(String),

    #[error("loft failed: {0}")]
    LoftFailure(String),

    #[error("boolean operation failed: {0}")]
    BooleanOpFailure(String),

    #[error("iterator exhausted")]
    IteratorExhausted,

    #[error("null entity: {0}")]
    NullEntity(String),
}

/// Convenience type alias for results using [`SolidkitError`].
pub type Result<T> = std::result::Result<T, SolidkitError>;

/// A failed `build()` that hands the consumed builder back to the caller.
///
/// Builders are one-shot: `build(self)` takes ownership. On failure the
/// accumulated state is returned untouched so it can be corrected and built
/// again. Converts into [`SolidkitError`] so `?` keeps working.
#[derive(Debug)]
pub struct BuildError<B> {
    builder: B,
    error: SolidkitError,
}

impl<B> BuildError<B> {
    pub(crate) fn new(builder: B, error: SolidkitError) -> Self {
        Self { builder, error }
    }

    /// The reason the build failed.
    #[must_use]
    pub fn error(&self) -> &SolidkitError {
        &self.error
    }

    /// Recovers the builder with its accumulated state.
    #[must_use]
    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Splits into the builder and the error.
    #[must_use]
    pub fn into_parts(self) -> (B, SolidkitError) {
        (self.builder, self.error)
    }
}

impl<B> fmt::Display for BuildError<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build failed: {}", self.error)
    }
}

impl<B: fmt::Debug> std::error::Error for BuildError<B> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<B> From<BuildError<B>> for SolidkitError {
    fn from(err: BuildError<B>) -> Self {
        err.error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn build_error_returns_builder_and_converts() {
        let err = BuildError::new(vec![1, 2, 3], SolidkitError::LoftFailure("x".into()));
        assert_eq!(err.error(), &SolidkitError::LoftFailure("x".into()));
        assert!(err.to_string().contains("loft failed"));
        let converted: SolidkitError = BuildError::new(7u8, SolidkitError::IteratorExhausted).into();
        assert_eq!(converted, SolidkitError::IteratorExhausted);
        assert_eq!(err.into_builder(), vec![1, 2, 3]);
    }
}
