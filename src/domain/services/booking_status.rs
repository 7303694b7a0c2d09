use crate::domain::entities::BookingStatus;
use crate::domain::errors::{EngineError, EngineResult};

/// Validates if a booking status transition is allowed
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> EngineResult<()> {
    use BookingStatus::*;

    match (from, to) {
        // Same state is always valid (no-op)
        (a, b) if a == b => Ok(()),

        (Pending, Confirmed) => Ok(()),
        (Pending, Cancelled) => Ok(()),
        (Confirmed, Pending) => Ok(()),
        (Confirmed, CheckedIn) => Ok(()),
        (Confirmed, Cancelled) => Ok(()),
        (CheckedIn, CheckedOut) => Ok(()),

        // CheckedOut and Cancelled are terminal
        _ => Err(EngineError::Validation(format!(
            "Invalid booking status transition from {} to {}",
            from, to
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn forward_lifecycle_is_allowed() {
        assert!(validate_transition(Pending, Confirmed).is_ok());
        assert!(validate_transition(Confirmed, CheckedIn).is_ok());
        assert!(validate_transition(CheckedIn, CheckedOut).is_ok());
        assert!(validate_transition(Confirmed, Confirmed).is_ok());
    }

    #[test]
    fn terminal_states_cannot_be_left() {
        assert!(validate_transition(Cancelled, Pending).is_err());
        assert!(validate_transition(CheckedOut, CheckedIn).is_err());
        assert!(validate_transition(CheckedIn, Cancelled).is_err());
    }
}
