//! Mobile-money movement records.
//!
//! A `Transaction` is one balance-changing event. It is created `Open`,
//! classified through splits and finally `Locked`, at which point the wallet
//! balance is updated to its `new_balance`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Amount, EngineError, classification::Classification};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Open,
    Locked,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Locked => "LOCKED",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "OPEN" => Ok(Self::Open),
            "LOCKED" => Ok(Self::Locked),
            other => Err(EngineError::InvalidState(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Ingress that created the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionSource {
    Manual,
    Webhook,
    Sync,
}

impl TransactionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Webhook => "WEBHOOK",
            Self::Sync => "SYNC",
        }
    }
}

impl TryFrom<&str> for TransactionSource {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "MANUAL" => Ok(Self::Manual),
            "WEBHOOK" => Ok(Self::Webhook),
            "SYNC" => Ok(Self::Sync),
            other => Err(EngineError::InvalidState(format!(
                "invalid transaction source: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub external_reference: String,
    pub provider_reference: Option<String>,
    pub source: TransactionSource,
    pub previous_balance: Amount,
    pub new_balance: Amount,
    /// `new_balance - previous_balance`, sign preserved.
    pub delta: Amount,
    pub fee: Amount,
    pub occurred_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub locked_at: Option<DateTime<Utc>>,
    pub raw_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::Open
    }

    /// Classification progress given the sum of the user splits.
    pub fn classification(&self, classified_total: Amount) -> Classification {
        Classification::new(self.delta, self.fee, classified_total)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub external_reference: String,
    pub provider_reference: Option<String>,
    pub source: String,
    pub previous_balance_minor: i64,
    pub new_balance_minor: i64,
    pub delta_minor: i64,
    pub fee_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub status: String,
    pub locked_at: Option<DateTimeUtc>,
    pub raw_payload: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields of a transaction about to be inserted.
#[derive(Clone, Debug)]
pub(crate) struct NewTransaction {
    pub external_reference: String,
    pub provider_reference: Option<String>,
    pub source: TransactionSource,
    pub previous_balance: Amount,
    pub new_balance: Amount,
    pub fee: Amount,
    pub occurred_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub raw_payload: Option<String>,
}

impl NewTransaction {
    pub fn delta(&self) -> Amount {
        self.new_balance - self.previous_balance
    }
}

impl From<&NewTransaction> for ActiveModel {
    fn from(tx: &NewTransaction) -> Self {
        let now = Utc::now();
        let locked_at = match tx.status {
            TransactionStatus::Locked => Some(now),
            TransactionStatus::Open => None,
        };
        Self {
            id: ActiveValue::NotSet,
            external_reference: ActiveValue::Set(tx.external_reference.clone()),
            provider_reference: ActiveValue::Set(tx.provider_reference.clone()),
            source: ActiveValue::Set(tx.source.as_str().to_string()),
            previous_balance_minor: ActiveValue::Set(tx.previous_balance.minor()),
            new_balance_minor: ActiveValue::Set(tx.new_balance.minor()),
            delta_minor: ActiveValue::Set(tx.delta().minor()),
            fee_minor: ActiveValue::Set(tx.fee.minor()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            locked_at: ActiveValue::Set(locked_at),
            raw_payload: ActiveValue::Set(tx.raw_payload.clone()),
            created_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            external_reference: model.external_reference,
            provider_reference: model.provider_reference,
            source: TransactionSource::try_from(model.source.as_str())?,
            previous_balance: Amount::from_minor(model.previous_balance_minor),
            new_balance: Amount::from_minor(model.new_balance_minor),
            delta: Amount::from_minor(model.delta_minor),
            fee: Amount::from_minor(model.fee_minor),
            occurred_at: model.occurred_at,
            status: TransactionStatus::try_from(model.status.as_str())?,
            locked_at: model.locked_at,
            raw_payload: model.raw_payload,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_text() {
        for status in [TransactionStatus::Open, TransactionStatus::Locked] {
            assert_eq!(TransactionStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(TransactionStatus::try_from("open").is_err());
    }

    #[test]
    fn new_transaction_derives_signed_delta() {
        let tx = NewTransaction {
            external_reference: "QK1".to_string(),
            provider_reference: None,
            source: TransactionSource::Manual,
            previous_balance: Amount::from_units(1000),
            new_balance: Amount::from_units(500),
            fee: Amount::from_units(13),
            occurred_at: Utc::now(),
            status: TransactionStatus::Open,
            raw_payload: None,
        };
        assert_eq!(tx.delta(), Amount::from_units(-500));

        let model = ActiveModel::from(&tx);
        assert_eq!(model.delta_minor, ActiveValue::Set(-50_000));
        assert_eq!(model.locked_at, ActiveValue::Set(None));
    }
}
