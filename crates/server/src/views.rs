//! Engine values to wire types.

use api_types::transaction::{BalanceView, OpenTransactionView, SplitView, TransactionView};

pub(crate) fn transaction_view(tx: engine::Transaction, split_count: Option<usize>) -> TransactionView {
    TransactionView {
        id: tx.id,
        external_reference: tx.external_reference,
        provider_reference: tx.provider_reference,
        source: tx.source.as_str().to_string(),
        previous_balance_minor: tx.previous_balance.minor(),
        new_balance_minor: tx.new_balance.minor(),
        delta_minor: tx.delta.minor(),
        fee_minor: tx.fee.minor(),
        occurred_at: tx.occurred_at,
        status: tx.status.as_str().to_string(),
        locked_at: tx.locked_at,
        split_count,
    }
}

pub(crate) fn balance_view(check: engine::BalanceCheck) -> BalanceView {
    BalanceView {
        transaction_id: check.transaction_id,
        balanced: check.balanced,
        remaining_minor: check.remaining.minor(),
        classified_total_minor: check.classified_total.minor(),
        classifiable_total_minor: check.classifiable_total.minor(),
    }
}

pub(crate) fn open_transaction_view(detail: engine::OpenTransactionDetail) -> OpenTransactionView {
    let split_count = detail.splits.len();
    OpenTransactionView {
        transaction: transaction_view(detail.transaction, Some(split_count)),
        splits: detail
            .splits
            .into_iter()
            .map(|view| SplitView {
                id: view.split.id,
                category_id: view.split.category_id,
                category_name: view.category_name,
                amount_minor: view.split.amount.minor(),
                description: view.split.description,
                is_fee: view.split.is_fee,
            })
            .collect(),
        balance: balance_view(detail.balance),
    }
}
