/// Failure raised by a lifecycle callback.
///
/// Returning any of these from a callback aborts the CRUD operation that
/// fired the event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("Validation error: {message}{}", format_hint(.hint))]
    Validation {
        message: String,
        hint: Option<String>,
    },
    #[error("Callback error: {message}")]
    Callback { message: String },
    #[error("Event propagation stopped: {reason}")]
    PropagationStopped { reason: String },
}

impl EventError {
    pub fn validation(message: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn validation_with_hint(message: &str, hint: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn callback(message: &str) -> Self {
        Self::Callback {
            message: message.to_string(),
        }
    }

    pub fn propagation_stopped(reason: &str) -> Self {
        Self::PropagationStopped {
            reason: reason.to_string(),
        }
    }
}

fn format_hint(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!(" (hint: {})", h))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_with_hint() {
        let err = EventError::validation_with_hint("Email taken", "pick another");
        assert_eq!(err.to_string(), "Validation error: Email taken (hint: pick another)");

        let err = EventError::validation("Email taken");
        assert_eq!(err.to_string(), "Validation error: Email taken");
    }

    #[test]
    fn test_propagation_stopped_display() {
        let err = EventError::propagation_stopped("read-only tenant");
        assert_eq!(err.to_string(), "Event propagation stopped: read-only tenant");
    }
}
