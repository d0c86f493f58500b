//! Wire types of the petty-cash HTTP API.
//!
//! Money is always an integer number of cents in `*_minor` fields.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

pub mod error {
    use super::*;

    /// Body of every error response.
    ///
    /// Only the fields relevant to the error are present.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub open_transaction_id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub existing_transaction_id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub max_allowed_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub current_total_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub attempted_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub remaining_minor: Option<i64>,
    }

    impl ErrorBody {
        pub fn new(error: impl Into<String>) -> Self {
            Self {
                error: error.into(),
                ..Self::default()
            }
        }
    }
}

pub mod transaction {
    use super::*;

    /// Manual entry of a movement.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub external_reference: String,
        pub previous_balance_minor: i64,
        pub new_balance_minor: i64,
        /// RFC 3339 timestamp.
        pub occurred_at: DateTime<FixedOffset>,
        pub provider_reference: Option<String>,
        pub raw_payload: Option<serde_json::Value>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionOpened {
        pub transaction_id: i64,
        pub delta_minor: i64,
        pub fee_minor: i64,
        pub remaining_to_classify_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub category_id: i64,
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitsNew {
        pub splits: Vec<SplitNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitsAdded {
        pub transaction_id: i64,
        pub inserted: usize,
        pub classified_total_minor: i64,
        pub remaining_minor: i64,
        pub balanced: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub transaction_id: i64,
        pub balanced: bool,
        pub remaining_minor: i64,
        pub classified_total_minor: i64,
        pub classifiable_total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionLocked {
        pub transaction_id: i64,
        pub wallet_balance_minor: i64,
        pub locked_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub external_reference: String,
        pub provider_reference: Option<String>,
        /// `MANUAL`, `WEBHOOK` or `SYNC`.
        pub source: String,
        pub previous_balance_minor: i64,
        pub new_balance_minor: i64,
        pub delta_minor: i64,
        pub fee_minor: i64,
        pub occurred_at: DateTime<Utc>,
        /// `OPEN` or `LOCKED`.
        pub status: String,
        pub locked_at: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub split_count: Option<usize>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub id: i64,
        pub category_id: i64,
        pub category_name: String,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub is_fee: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OpenTransactionView {
        pub transaction: TransactionView,
        pub splits: Vec<SplitView>,
        pub balance: BalanceView,
    }

    /// `GET /api/transactions/open`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OpenTransactionResponse {
        pub open_transaction: Option<OpenTransactionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod system {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SystemStatus {
        pub is_locked: bool,
        pub open_transaction: Option<transaction::OpenTransactionView>,
        pub wallet_balance_minor: i64,
        pub wallet_last_updated: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        /// `ok` or `degraded`.
        pub status: String,
        pub database: bool,
        pub wallet: bool,
        pub categories: bool,
        pub system_state: bool,
    }

    #[derive(Serialize, Deserialize)]
    pub struct ForceUnlock {
        pub reason: String,
        pub admin_code: String,
    }

    impl std::fmt::Debug for ForceUnlock {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ForceUnlock")
                .field("reason", &self.reason)
                .finish_non_exhaustive()
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnlockReceipt {
        pub transaction_id: i64,
        pub external_reference: String,
        pub reason: String,
        pub unlocked_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub balance_minor: i64,
        pub last_updated: DateTime<Utc>,
        pub recent_transactions: Vec<transaction::TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletSync {
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncReceipt {
        pub transaction_id: i64,
        pub external_reference: String,
        pub previous_balance_minor: i64,
        pub new_balance_minor: i64,
        pub delta_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryEntry {
        pub transaction_id: i64,
        pub external_reference: String,
        pub source: String,
        pub occurred_at: DateTime<Utc>,
        pub locked_at: Option<DateTime<Utc>>,
        pub previous_balance_minor: i64,
        pub balance_minor: i64,
        pub delta_minor: i64,
        pub fee_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub entries: Vec<HistoryEntry>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub parent_id: Option<i64>,
        pub name: String,
        pub is_system: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNode {
        #[serde(flatten)]
        pub category: CategoryView,
        pub children: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryOption {
        pub id: i64,
        pub name: String,
        pub parent_id: Option<i64>,
        pub depth: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStat {
        pub category_id: i64,
        pub name: String,
        pub parent_id: Option<i64>,
        pub total_minor: i64,
        pub split_count: usize,
    }
}

pub mod daraja {
    //! M-Pesa (Daraja) result callback, as posted by the provider.

    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DarajaCallback {
        #[serde(rename = "Result")]
        pub result: DarajaResult,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum DarajaResultType {
        Withdrawal,
        Deposit,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct DarajaResult {
        pub result_type: DarajaResultType,
        /// `0` on success.
        pub result_code: i64,
        #[serde(default)]
        pub result_desc: Option<String>,
        #[serde(rename = "TransactionID")]
        pub transaction_id: String,
        #[serde(default)]
        pub mpesa_receipt_number: Option<String>,
        /// Shillings, sent as a number or a numeric string.
        pub transaction_amount: DarajaAmount,
        /// RFC 3339, or `YYYYMMDDHHMMSS` in East Africa Time.
        pub transaction_date: String,
        #[serde(default)]
        pub phone_number: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum DarajaAmount {
        Number(serde_json::Number),
        Text(String),
    }

    impl DarajaAmount {
        /// The amount as written by the provider.
        pub fn as_text(&self) -> String {
            match self {
                Self::Number(n) => n.to_string(),
                Self::Text(s) => s.trim().to_string(),
            }
        }
    }

    /// Acknowledgement returned to the provider.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct DarajaAck {
        pub result_code: i64,
        pub result_desc: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub transaction_id: Option<i64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_omits_absent_details() {
        let body = error::ErrorBody {
            open_transaction_id: Some(7),
            ..error::ErrorBody::new("system locked")
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "system locked", "open_transaction_id": 7})
        );
    }

    #[test]
    fn daraja_callback_parses_provider_casing() {
        let raw = serde_json::json!({
            "Result": {
                "ResultType": "Withdrawal",
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "TransactionID": "QK12ABC",
                "MpesaReceiptNumber": "QK12ABC",
                "TransactionAmount": 500,
                "TransactionDate": "20261019101500"
            }
        });
        let callback: daraja::DarajaCallback = serde_json::from_value(raw).unwrap();
        assert_eq!(
            callback.result.result_type,
            daraja::DarajaResultType::Withdrawal
        );
        assert_eq!(callback.result.transaction_id, "QK12ABC");
        assert_eq!(callback.result.transaction_amount.as_text(), "500");
    }

    #[test]
    fn daraja_amount_accepts_strings() {
        let amount: daraja::DarajaAmount = serde_json::from_str("\" 1250.50 \"").unwrap();
        assert_eq!(amount.as_text(), "1250.50");
    }

    #[test]
    fn force_unlock_debug_hides_the_code() {
        let req = system::ForceUnlock {
            reason: "stuck".to_string(),
            admin_code: "s3cret".to_string(),
        };
        assert!(!format!("{req:?}").contains("s3cret"));
    }
}
