//! Retry marker threaded through every request

/// Which attempt of a request is being sent.
///
/// A request starts as [`Attempt::Initial`]. Only an initial attempt may
/// trigger token recovery; the replay after recovery is sent as
/// [`Attempt::Retry`] and any 401 it receives is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attempt {
    #[default]
    Initial,
    Retry,
}

impl Attempt {
    /// Whether a 401 on this attempt may enter token recovery
    pub fn allows_recovery(self) -> bool {
        self == Self::Initial
    }

    /// The attempt that follows this one, if any
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initial => Some(Self::Retry),
            Self::Retry => None,
        }
    }

    pub fn is_retry(self) -> bool {
        self == Self::Retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_initial_attempt_recovers() {
        assert!(Attempt::Initial.allows_recovery());
        assert!(!Attempt::Retry.allows_recovery());
    }

    #[test]
    fn retry_is_the_last_attempt() {
        assert_eq!(Attempt::default(), Attempt::Initial);
        assert_eq!(Attempt::Initial.next(), Some(Attempt::Retry));
        assert_eq!(Attempt::Retry.next(), None);
        assert!(Attempt::Retry.is_retry());
    }
}
