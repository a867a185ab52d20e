use crate::protocol::parts::TransactionFlags;

// The lifecycle of a session.
//
// A fresh connection starts in `Dialed`, becomes `Prologed` after the
// initial handshake and `Ready` after authentication. Transaction flags
// from the server drive the transitions between `Ready` and
// `InTransaction`. `Broken` is sticky: it is entered on any unrecoverable
// I/O or protocol error, and every subsequent operation fails with a
// dead-connection error so that the connection gets discarded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SessionState {
    Dialed,
    Prologed,
    Ready,
    InTransaction,
    Broken,
    Closed,
}

impl SessionState {
    pub fn is_broken(self) -> bool {
        matches!(self, Self::Broken)
    }

    pub fn is_in_transaction(self) -> bool {
        matches!(self, Self::InTransaction)
    }

    // Digests a TransactionFlags part; returns true if the server demands
    // session termination.
    pub fn update(&mut self, ta_flags: &TransactionFlags) -> bool {
        if ta_flags.is_session_closing_error() {
            *self = Self::Broken;
            return true;
        }
        match self {
            Self::Ready | Self::InTransaction => {
                if ta_flags.is_write_transaction_started() {
                    *self = Self::InTransaction;
                } else if ta_flags.is_committed() || ta_flags.is_rolled_back() {
                    *self = Self::Ready;
                }
            }
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState;
    use crate::protocol::parts::{OptionValue, TaFlagId, TransactionFlags};

    fn flags(id: TaFlagId) -> TransactionFlags {
        let mut ta_flags = TransactionFlags::default();
        ta_flags.insert(id, OptionValue::BOOLEAN(true));
        ta_flags
    }

    #[test]
    fn write_transaction_toggles_the_state() {
        let mut state = SessionState::Ready;
        assert!(!state.update(&flags(TaFlagId::WriteTaStarted)));
        assert!(state.is_in_transaction());
        assert!(!state.update(&flags(TaFlagId::Committed)));
        assert_eq!(state, SessionState::Ready);
    }

    #[test]
    fn session_closing_error_is_sticky() {
        let mut state = SessionState::InTransaction;
        assert!(state.update(&flags(TaFlagId::SessionclosingTaError)));
        assert!(state.is_broken());
        assert!(!state.update(&flags(TaFlagId::Committed)));
        assert!(state.is_broken());
    }
}
