use sea_orm::TransactionTrait;

use crate::{EngineError, ForceUnlockCmd, ResultEngine, UnlockAudit, store};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Discards the open transaction and its splits, unlocking the system.
    ///
    /// The admin code is verified before anything is read. The deletion and
    /// its audit row are written in one unit.
    pub async fn force_unlock(&self, cmd: ForceUnlockCmd) -> ResultEngine<UnlockAudit> {
        if let Err(err) = self.admin_code.verify(&cmd.admin_code) {
            tracing::warn!("force unlock rejected: invalid admin code");
            return Err(err);
        }
        let reason = normalize_required_text(&cmd.reason, "reason")?;

        with_tx!(self, |db_tx| {
            let tx = store::open_transaction(&db_tx)
                .await?
                .ok_or(EngineError::NothingToUnlock)?;
            let audit = store::force_clear_open_transaction(&db_tx, &tx, reason).await?;
            tracing::warn!(
                transaction_id = tx.id,
                reference = %tx.external_reference,
                reason = %audit.reason,
                "open transaction force-unlocked and deleted"
            );
            Ok(audit)
        })
    }
}
