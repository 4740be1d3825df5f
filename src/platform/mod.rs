//! Platform abstraction layer
//!
//! Device orientation access and the permission prompt some browsers put in
//! front of it. The browser shell reports what it finds; the sandbox only
//! sees these types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the orientation permission stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    /// No prompt exists on this platform; orientation is available as is
    Unsupported,
    /// A prompt is required and has not been shown yet
    NotDetermined,
    /// Prompt shown, waiting for the answer
    Pending,
    Granted,
    Denied,
}

impl PermissionState {
    /// Initial state for a platform that does (or does not) gate orientation
    /// behind a prompt
    pub fn initial(needs_prompt: bool) -> Self {
        if needs_prompt {
            PermissionState::NotDetermined
        } else {
            PermissionState::Unsupported
        }
    }

    /// Orientation samples may be used
    pub fn allows_orientation(&self) -> bool {
        matches!(self, PermissionState::Unsupported | PermissionState::Granted)
    }
}

/// Why orientation is unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The user answered the prompt with anything but "granted"
    Denied,
    /// The prompt itself failed (message from the platform)
    Rejected(String),
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Denied => write!(f, "Motion sensor permission was denied"),
            PermissionError::Rejected(msg) => write!(f, "Motion sensor permission failed: {}", msg),
        }
    }
}

impl std::error::Error for PermissionError {}

/// One device orientation reading in degrees (beta → x, gamma → y)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationSample {
    pub x: f32,
    pub y: f32,
}

impl OrientationSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Browser `deviceorientation` angles; missing axes read as level
    pub fn from_beta_gamma(beta: Option<f64>, gamma: Option<f64>) -> Self {
        Self::new(beta.unwrap_or(0.0) as f32, gamma.unwrap_or(0.0) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_orientation() {
        assert!(PermissionState::Unsupported.allows_orientation());
        assert!(PermissionState::Granted.allows_orientation());
        assert!(!PermissionState::Pending.allows_orientation());
        assert!(!PermissionState::NotDetermined.allows_orientation());
        assert_eq!(PermissionState::initial(true), PermissionState::NotDetermined);
        assert_eq!(PermissionState::initial(false), PermissionState::Unsupported);
        assert!(!PermissionState::Denied.allows_orientation());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PermissionError::Rejected("NotAllowedError".into()).to_string(),
            "Motion sensor permission failed: NotAllowedError"
        );
        assert!(PermissionError::Denied.to_string().contains("denied"));
    }

    #[test]
    fn test_from_beta_gamma() {
        assert_eq!(
            OrientationSample::from_beta_gamma(Some(12.5), None),
            OrientationSample::new(12.5, 0.0)
        );
    }
}
