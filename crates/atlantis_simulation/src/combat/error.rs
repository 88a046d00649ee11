//! Combat error types.
//!
//! Ни одна из этих ошибок не фатальна: контроллер логирует и возвращается в Idle.

use thiserror::Error;

/// Failure while starting or continuing an attack.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComboError {
    /// Animation collaborator refused the clip (non-positive duration).
    #[error("montage for clip #{clip} failed to play (duration {duration:.3}s)")]
    AnimationFailed { clip: usize, duration: f32 },

    /// A timing window is still open; opening is rejected, never queued.
    #[error("timing window already open (progress {progress:.3})")]
    WindowAlreadyOpen { progress: f32 },
}

/// Invalid or unreadable combat tunables.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize combat config: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
