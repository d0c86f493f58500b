//! Command structs for engine operations.
//!
//! These types group the parameters of write operations (open, movement,
//! splits, force unlock), keeping call sites readable.

use chrono::{DateTime, Utc};

use crate::{Amount, TransactionSource};

/// Open a transaction from explicit before/after balances.
#[derive(Clone, Debug)]
pub struct OpenTransactionCmd {
    pub external_reference: String,
    pub previous_balance: Amount,
    pub new_balance: Amount,
    pub occurred_at: DateTime<Utc>,
    pub source: TransactionSource,
    pub provider_reference: Option<String>,
    pub raw_payload: Option<String>,
}

impl OpenTransactionCmd {
    /// A movement entered by hand. Its date must not be in the future.
    #[must_use]
    pub fn manual(
        external_reference: impl Into<String>,
        previous_balance: Amount,
        new_balance: Amount,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            external_reference: external_reference.into(),
            previous_balance,
            new_balance,
            occurred_at,
            source: TransactionSource::Manual,
            provider_reference: None,
            raw_payload: None,
        }
    }

    /// A movement reported by the provider callback.
    #[must_use]
    pub fn webhook(
        external_reference: impl Into<String>,
        previous_balance: Amount,
        new_balance: Amount,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source: TransactionSource::Webhook,
            ..Self::manual(external_reference, previous_balance, new_balance, occurred_at)
        }
    }

    #[must_use]
    pub fn provider_reference(mut self, reference: impl Into<String>) -> Self {
        self.provider_reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn raw_payload(mut self, payload: impl Into<String>) -> Self {
        self.raw_payload = Some(payload.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementDirection {
    /// Money left the wallet.
    Withdrawal,
    /// Money entered the wallet.
    Deposit,
}

/// Open a transaction from a movement amount.
///
/// The previous balance is the wallet's current balance, read in the same DB
/// transaction as the insert.
#[derive(Clone, Debug)]
pub struct MovementCmd {
    pub external_reference: String,
    pub direction: MovementDirection,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
    pub source: TransactionSource,
    pub provider_reference: Option<String>,
    pub raw_payload: Option<String>,
}

impl MovementCmd {
    #[must_use]
    pub fn new(
        external_reference: impl Into<String>,
        direction: MovementDirection,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            external_reference: external_reference.into(),
            direction,
            amount,
            occurred_at,
            source: TransactionSource::Webhook,
            provider_reference: None,
            raw_payload: None,
        }
    }

    #[must_use]
    pub fn source(mut self, source: TransactionSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn provider_reference(mut self, reference: impl Into<String>) -> Self {
        self.provider_reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn raw_payload(mut self, payload: impl Into<String>) -> Self {
        self.raw_payload = Some(payload.into());
        self
    }

    /// The signed balance change.
    pub fn signed_amount(&self) -> Amount {
        match self.direction {
            MovementDirection::Withdrawal => -self.amount,
            MovementDirection::Deposit => self.amount,
        }
    }
}

/// One allocation requested by `add_splits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitInput {
    pub category_id: i64,
    pub amount: Amount,
    pub description: Option<String>,
}

impl SplitInput {
    #[must_use]
    pub fn new(category_id: i64, amount: Amount) -> Self {
        Self {
            category_id,
            amount,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Discard the open transaction.
#[derive(Clone)]
pub struct ForceUnlockCmd {
    pub reason: String,
    pub admin_code: String,
}

impl ForceUnlockCmd {
    #[must_use]
    pub fn new(reason: impl Into<String>, admin_code: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            admin_code: admin_code.into(),
        }
    }
}

impl std::fmt::Debug for ForceUnlockCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceUnlockCmd")
            .field("reason", &self.reason)
            .field("admin_code", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_is_negative() {
        let cmd = MovementCmd::new(
            "QK1",
            MovementDirection::Withdrawal,
            Amount::from_units(500),
            Utc::now(),
        );
        assert_eq!(cmd.signed_amount(), Amount::from_units(-500));
        assert_eq!(cmd.source, TransactionSource::Webhook);
    }

    #[test]
    fn webhook_open_keeps_fields() {
        let cmd = OpenTransactionCmd::webhook(
            "QK2",
            Amount::from_units(10),
            Amount::from_units(20),
            Utc::now(),
        )
        .provider_reference("RCPT");
        assert_eq!(cmd.source, TransactionSource::Webhook);
        assert_eq!(cmd.external_reference, "QK2");
        assert_eq!(cmd.provider_reference.as_deref(), Some("RCPT"));
    }

    #[test]
    fn admin_code_is_not_logged() {
        let cmd = ForceUnlockCmd::new("stuck", "s3cret");
        assert!(!format!("{cmd:?}").contains("s3cret"));
    }
}
