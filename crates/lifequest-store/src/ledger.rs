//! XP ledger and the award protocol

use crate::users::require_user;
use crate::{immediate, invalid_column, parse_column, SqliteStore, StoreError};
use chrono::{DateTime, Utc};
use lifequest_domain::traits::XpLedger;
use lifequest_domain::{
    calculate_level, AwardOutcome, EntryId, UserId, XpLedgerEntry, XpSource,
};
use rusqlite::{params, Connection};

/// Commit one award inside an open transaction
///
/// Appends the entry, adds `xp` to the running total and recomputes the level.
/// The caller owns the transaction; nothing here commits.
pub(crate) fn award_in_tx(
    conn: &Connection,
    base_level_xp: i64,
    user: UserId,
    xp: i64,
    source: XpSource,
    source_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<AwardOutcome, StoreError> {
    let mut current = require_user(conn, user)?;
    current.apply_xp(xp, base_level_xp, now)?;

    let entry_id = EntryId::new();
    conn.execute(
        "INSERT INTO xp_ledger (id, user_id, source, source_id, xp, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry_id.to_string(),
            user.value(),
            source.as_str(),
            source_id,
            xp,
            now,
        ],
    )?;

    conn.execute(
        "UPDATE users SET total_xp = ?1, current_level = ?2, updated_at = ?3 WHERE id = ?4",
        params![current.total_xp, current.current_level, now, user.value()],
    )?;

    tracing::debug!(
        user = %user,
        xp,
        source = %source,
        total_xp = current.total_xp,
        level = current.current_level,
        "xp awarded"
    );

    Ok(AwardOutcome {
        xp_gained: xp,
        total_xp: current.total_xp,
        current_level: current.current_level,
    })
}

impl XpLedger for SqliteStore {
    type Error = StoreError;

    fn award_xp(
        &mut self,
        user: UserId,
        xp: i64,
        source: XpSource,
        source_id: Option<i64>,
    ) -> Result<AwardOutcome, Self::Error> {
        let base_level_xp = self.rules.base_level_xp;
        let tx = immediate(&mut self.conn)?;
        let outcome = award_in_tx(&tx, base_level_xp, user, xp, source, source_id, Utc::now())?;
        tx.commit()?;
        Ok(outcome)
    }

    fn ledger_entries(&self, user: UserId) -> Result<Vec<XpLedgerEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, source, source_id, xp, created_at
             FROM xp_ledger WHERE user_id = ?1 ORDER BY rowid",
        )?;

        let entries = stmt
            .query_map(params![user.value()], |row| {
                let raw_id: String = row.get(0)?;
                let id = EntryId::from_string(&raw_id).map_err(|e| invalid_column(0, e))?;

                Ok(XpLedgerEntry {
                    id,
                    user_id: UserId(row.get(1)?),
                    source: parse_column(row, 2, "xp source", XpSource::parse)?,
                    source_id: row.get(3)?,
                    xp: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl SqliteStore {
    /// Sum of the user's ledger entries
    pub fn ledger_total(&self, user: UserId) -> Result<i64, StoreError> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(xp), 0) FROM xp_ledger WHERE user_id = ?1",
            params![user.value()],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Level the stored total maps to under this store's curve
    pub fn level_for(&self, total_xp: i64) -> u32 {
        calculate_level(total_xp, self.rules.base_level_xp)
    }
}
