use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MindErrorKind {
    SensorUnavailable,
    MalformedPayload,
    InvariantViolation,
    AdvisoryFailure,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct MindError {
    pub kind: MindErrorKind,
    pub message: String,
}

impl MindError {
    pub fn new(kind: MindErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn sensor_unavailable(message: impl Into<String>) -> MindError {
    MindError::new(MindErrorKind::SensorUnavailable, message)
}

pub fn malformed_payload(message: impl Into<String>) -> MindError {
    MindError::new(MindErrorKind::MalformedPayload, message)
}

pub fn invariant_violation(message: impl Into<String>) -> MindError {
    MindError::new(MindErrorKind::InvariantViolation, message)
}

pub fn advisory_failure(message: impl Into<String>) -> MindError {
    MindError::new(MindErrorKind::AdvisoryFailure, message)
}

pub fn internal_error(message: impl Into<String>) -> MindError {
    MindError::new(MindErrorKind::Internal, message)
}
