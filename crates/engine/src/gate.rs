//! System lock gate.
//!
//! While a transaction is open the whole system is locked: the only mutations
//! allowed are the ones that target that transaction. The gate is rebuilt from
//! the `system_state` row inside every operation's DB transaction and never
//! cached.

use crate::{EngineError, ResultEngine, system_state};

/// What an incoming request wants to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    /// A mutation of `target`, or of no particular transaction (`None`), e.g.
    /// opening a new movement.
    Mutate { target: Option<i64> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockGate {
    open_transaction_id: Option<i64>,
}

impl LockGate {
    pub fn new(open_transaction_id: Option<i64>) -> Self {
        Self {
            open_transaction_id,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.open_transaction_id.is_some()
    }

    pub fn open_transaction_id(&self) -> Option<i64> {
        self.open_transaction_id
    }

    /// Allows or denies `access`, naming the blocking transaction on denial.
    pub fn check(&self, access: Access) -> ResultEngine<()> {
        let Some(open_transaction_id) = self.open_transaction_id else {
            return Ok(());
        };
        match access {
            Access::Read => Ok(()),
            Access::Mutate { target: Some(id) } if id == open_transaction_id => Ok(()),
            Access::Mutate { .. } => Err(EngineError::SystemLocked {
                open_transaction_id,
            }),
        }
    }
}

impl From<&system_state::Model> for LockGate {
    fn from(state: &system_state::Model) -> Self {
        Self::new(state.open_transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_system_allows_everything() {
        let gate = LockGate::new(None);
        assert!(!gate.is_locked());
        assert_eq!(gate.check(Access::Read), Ok(()));
        assert_eq!(gate.check(Access::Mutate { target: None }), Ok(()));
        assert_eq!(gate.check(Access::Mutate { target: Some(9) }), Ok(()));
    }

    #[test]
    fn reads_pass_a_locked_system() {
        assert_eq!(LockGate::new(Some(4)).check(Access::Read), Ok(()));
    }

    #[test]
    fn locked_system_only_admits_the_open_transaction() {
        let gate = LockGate::new(Some(4));
        assert_eq!(gate.check(Access::Mutate { target: Some(4) }), Ok(()));
        assert_eq!(
            gate.check(Access::Mutate { target: Some(5) }),
            Err(EngineError::SystemLocked {
                open_transaction_id: 4
            })
        );
        assert_eq!(
            gate.check(Access::Mutate { target: None }),
            Err(EngineError::SystemLocked {
                open_transaction_id: 4
            })
        );
    }
}
