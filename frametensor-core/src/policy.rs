use log::warn;

pub use frametensor_utils::config::InvalidInputPolicy;

use crate::error::FrameError;

/// What a frame transform did with its output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Conversion {
    /// Every element of the output was written.
    Written,
    /// Input was unusable and the caller asked for the no-op behaviour; the
    /// output still holds whatever it held before the call.
    Skipped,
}

impl Conversion {
    pub fn is_written(self) -> bool {
        matches!(self, Conversion::Written)
    }
}

impl FrameError {
    /// Errors caused by a missing or wrongly sized buffer, as opposed to
    /// unusable geometry. Only these are subject to [`InvalidInputPolicy::Skip`].
    pub fn is_buffer_error(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidBuffer { .. }
                | FrameError::InvalidStride { .. }
                | FrameError::OutputSizeMismatch { .. }
        )
    }
}

/// Apply `policy` to the outcome of a transform's validation step.
pub(crate) fn resolve(
    policy: InvalidInputPolicy,
    operation: &str,
    validated: Result<(), FrameError>,
) -> Result<Option<Conversion>, FrameError> {
    match validated {
        Ok(()) => Ok(None),
        Err(err) if err.is_buffer_error() && policy == InvalidInputPolicy::Skip => {
            warn!("{operation}: {err}; output left untouched");
            Ok(Some(Conversion::Skipped))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaneKind;

    fn short_plane() -> FrameError {
        FrameError::InvalidBuffer {
            plane: PlaneKind::V,
            required: 8,
            actual: 0,
        }
    }

    #[test]
    fn report_policy_propagates_buffer_errors() {
        let result = resolve(InvalidInputPolicy::Report, "test", Err(short_plane()));
        assert_eq!(result, Err(short_plane()));
    }

    #[test]
    fn skip_policy_swallows_only_buffer_errors() {
        let skipped = resolve(InvalidInputPolicy::Skip, "test", Err(short_plane()));
        assert_eq!(skipped, Ok(Some(Conversion::Skipped)));

        let geometry = resolve(
            InvalidInputPolicy::Skip,
            "test",
            Err(FrameError::FrameTooSmall {
                width: 1,
                height: 8,
            }),
        );
        assert!(geometry.is_err());
    }

    #[test]
    fn valid_input_proceeds() {
        assert_eq!(resolve(InvalidInputPolicy::Skip, "test", Ok(())), Ok(None));
    }
}
