use std::collections::HashMap;

use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    Amount, Category, CategoryNode, CategoryOption, ResultEngine, TransactionStatus, categories,
    splits, transactions,
};

use super::{Engine, with_tx};

/// Spending of one category over locked transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub total: Amount,
    pub split_count: usize,
}

impl Engine {
    /// The category tree, system categories included.
    pub async fn list_categories(&self) -> ResultEngine<Vec<CategoryNode>> {
        with_tx!(self, |db_tx| {
            let all = categories::Entity::find()
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(categories::build_tree(
                all.into_iter().map(Category::from).collect(),
            ))
        })
    }

    /// Categories a user may split into, flattened for a picker.
    pub async fn category_options(&self) -> ResultEngine<Vec<CategoryOption>> {
        Ok(categories::options(&self.list_categories().await?))
    }

    /// Totals per non-system category over locked transactions, largest
    /// first. Categories never used are omitted.
    pub async fn category_stats(&self) -> ResultEngine<Vec<CategoryStat>> {
        with_tx!(self, |db_tx| {
            let rows = splits::Entity::find()
                .join(JoinType::InnerJoin, splits::Relation::Transaction.def())
                .filter(transactions::Column::Status.eq(TransactionStatus::Locked.as_str()))
                .filter(splits::Column::IsFee.eq(false))
                .all(&db_tx)
                .await?;
            let mut totals: HashMap<i64, (Amount, usize)> = HashMap::new();
            for row in rows {
                let entry = totals.entry(row.category_id).or_default();
                entry.0 += Amount::from_minor(row.amount_minor);
                entry.1 += 1;
            }

            let mut stats: Vec<CategoryStat> = categories::Entity::find()
                .filter(categories::Column::IsSystem.eq(false))
                .filter(categories::Column::Id.is_in(totals.keys().copied().collect::<Vec<_>>()))
                .all(&db_tx)
                .await?
                .into_iter()
                .filter_map(|c| {
                    let (total, split_count) = totals.get(&c.id).copied()?;
                    Some(CategoryStat {
                        category_id: c.id,
                        name: c.name,
                        parent_id: c.parent_id,
                        total,
                        split_count,
                    })
                })
                .collect();
            stats.sort_by(|a, b| b.total.cmp(&a.total).then(a.category_id.cmp(&b.category_id)));
            Ok(stats)
        })
    }
}
