//! M-Pesa result callback.
//!
//! The provider payload is normalized into a [`MovementCmd`] and opened like
//! any other movement. The untouched JSON body is stored as the raw payload.

use api_types::daraja::{DarajaAck, DarajaCallback, DarajaResult, DarajaResultType};
use axum::{Json, extract::State};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use engine::{Amount, EngineError, MovementCmd, MovementDirection, TransactionSource};
use serde_json::Value;

use crate::{ServerError, server::ServerState};

/// East Africa Time, UTC+3, no daylight saving.
const EAT_OFFSET_SECS: i32 = 3 * 3600;
const COMPACT_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

fn invalid(msg: impl Into<String>) -> ServerError {
    ServerError::Engine(EngineError::Validation(msg.into()))
}

pub(crate) fn parse_transaction_date(raw: &str) -> Result<DateTime<Utc>, ServerError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    let eat = FixedOffset::east_opt(EAT_OFFSET_SECS)
        .ok_or_else(|| ServerError::Generic("invalid EAT offset".to_string()))?;
    NaiveDateTime::parse_from_str(raw, COMPACT_DATE_FORMAT)
        .ok()
        .and_then(|naive| naive.and_local_timezone(eat).single())
        .map(|date| date.with_timezone(&Utc))
        .ok_or_else(|| invalid(format!("unparseable TransactionDate '{raw}'")))
}

pub(crate) fn movement_from_result(
    result: &DarajaResult,
    raw_payload: String,
) -> Result<MovementCmd, ServerError> {
    if result.result_code != 0 {
        return Err(invalid(format!(
            "provider reported failure {}: {}",
            result.result_code,
            result.result_desc.as_deref().unwrap_or("no description")
        )));
    }

    let amount: Amount = result.transaction_amount.as_text().parse()?;
    let occurred_at = parse_transaction_date(&result.transaction_date)?;
    let direction = match result.result_type {
        DarajaResultType::Withdrawal => MovementDirection::Withdrawal,
        DarajaResultType::Deposit => MovementDirection::Deposit,
    };

    let mut cmd = MovementCmd::new(&result.transaction_id, direction, amount, occurred_at)
        .source(TransactionSource::Webhook)
        .raw_payload(raw_payload);
    if let Some(receipt) = &result.mpesa_receipt_number {
        cmd = cmd.provider_reference(receipt);
    }
    Ok(cmd)
}

pub async fn callback(
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> Result<Json<DarajaAck>, ServerError> {
    let raw_payload = payload.to_string();
    let callback: DarajaCallback = serde_json::from_value(payload)
        .map_err(|err| invalid(format!("malformed callback: {err}")))?;

    let cmd = movement_from_result(&callback.result, raw_payload)?;
    let opened = state.engine.open_movement(cmd).await?;
    tracing::info!(
        transaction_id = opened.transaction_id,
        external_reference = %callback.result.transaction_id,
        "daraja callback accepted"
    );

    Ok(Json(DarajaAck {
        result_code: 0,
        result_desc: "Accepted".to_string(),
        transaction_id: Some(opened.transaction_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::daraja::DarajaAmount;
    use chrono::TimeZone;

    fn result(amount: DarajaAmount, code: i64) -> DarajaResult {
        DarajaResult {
            result_type: DarajaResultType::Withdrawal,
            result_code: code,
            result_desc: None,
            transaction_id: "OEI2AK4Q16".to_string(),
            mpesa_receipt_number: Some("RCPT1".to_string()),
            transaction_amount: amount,
            transaction_date: "20261018143000".to_string(),
            phone_number: None,
        }
    }

    #[test]
    fn compact_dates_are_east_africa_time() {
        let parsed = parse_transaction_date("20261018143000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 18, 11, 30, 0).unwrap());
    }

    #[test]
    fn rfc3339_dates_keep_their_offset() {
        let parsed =
            parse_transaction_date("2026-10-18T14:30:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 18, 11, 30, 0).unwrap());
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(matches!(
            parse_transaction_date("yesterday"),
            Err(ServerError::Engine(EngineError::Validation(_)))
        ));
    }

    #[test]
    fn withdrawal_becomes_negative_movement() {
        let cmd = movement_from_result(&result(DarajaAmount::Text("500".into()), 0), "{}".into())
            .unwrap();
        assert_eq!(cmd.external_reference, "OEI2AK4Q16");
        assert_eq!(cmd.provider_reference.as_deref(), Some("RCPT1"));
        assert_eq!(cmd.source, TransactionSource::Webhook);
        assert_eq!(cmd.signed_amount(), Amount::from_minor(-50_000));
        assert_eq!(cmd.raw_payload.as_deref(), Some("{}"));
    }

    #[test]
    fn failed_result_code_is_rejected() {
        let outcome = movement_from_result(&result(DarajaAmount::Text("500".into()), 1), "{}".into());
        assert!(matches!(
            outcome,
            Err(ServerError::Engine(EngineError::Validation(_)))
        ));
    }
}
