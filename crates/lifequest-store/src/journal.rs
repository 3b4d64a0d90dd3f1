//! Mood log, sobriety streaks and notes

use crate::activity::already_awarded;
use crate::ledger::award_in_tx;
use crate::users::require_user;
use crate::{count, immediate, parse_column, SqliteStore, StoreError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lifequest_domain::{
    calculate_xp, CompletionOutcome, Module, Mood, MoodEntry, MoodEntryId, Note, NoteId,
    Sobriety, SobrietyId, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MOOD_COLUMNS: &str = "id, user_id, mood, date, time, note, xp_awarded";

fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    Ok(MoodEntry {
        id: MoodEntryId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        mood: parse_column(row, 2, "mood", Mood::parse)?,
        date: row.get(3)?,
        time: row.get(4)?,
        note: row.get(5)?,
        xp_awarded: row.get(6)?,
    })
}

fn load_mood(conn: &Connection, user: UserId, date: NaiveDate) -> Result<Option<MoodEntry>, StoreError> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {} FROM mood_entries WHERE user_id = ?1 AND date = ?2",
                MOOD_COLUMNS
            ),
            params![user.value(), date],
            mood_from_row,
        )
        .optional()?;
    Ok(entry)
}

const SOBRIETY_COLUMNS: &str = "id, user_id, name, started_at, ended_at, is_active";

fn sobriety_from_row(row: &Row<'_>) -> rusqlite::Result<Sobriety> {
    Ok(Sobriety {
        id: SobrietyId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        name: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        is_active: row.get(5)?,
    })
}

impl SqliteStore {
    /// Log the mood for a day
    ///
    /// One entry per (user, date): logging again updates the entry. XP is
    /// awarded for the first log of a day only; a non-blank note makes it a
    /// medium-difficulty entry instead of easy.
    pub fn log_mood(
        &mut self,
        user: UserId,
        date: NaiveDate,
        time: NaiveTime,
        mood: Mood,
        note: &str,
    ) -> Result<(MoodEntry, CompletionOutcome), StoreError> {
        let now = Utc::now();
        let tx = immediate(&mut self.conn)?;
        let owner = require_user(&tx, user)?;

        if let Some(existing) = load_mood(&tx, user, date)? {
            if existing.xp_awarded {
                tx.execute(
                    "UPDATE mood_entries SET mood = ?1, time = ?2, note = ?3 WHERE id = ?4",
                    params![mood.as_str(), time, note, existing.id.value()],
                )?;
                let outcome = already_awarded(&tx, user)?;
                let entry = load_mood(&tx, user, date)?
                    .ok_or_else(|| StoreError::not_found("mood entry", date))?;
                tx.commit()?;
                return Ok((entry, outcome));
            }
        }

        let xp = calculate_xp(
            &self.rules,
            Module::Mood.as_str(),
            MoodEntry::difficulty_for_note(note),
            None,
            Some(&owner),
        )?;

        tx.execute(
            "INSERT INTO mood_entries (user_id, mood, date, time, note, xp_awarded)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)
             ON CONFLICT (user_id, date) DO UPDATE SET
             mood = excluded.mood, time = excluded.time, note = excluded.note, xp_awarded = 1",
            params![user.value(), mood.as_str(), date, time, note],
        )?;
        let entry = load_mood(&tx, user, date)?
            .ok_or_else(|| StoreError::not_found("mood entry", date))?;

        let award = award_in_tx(
            &tx,
            self.rules.base_level_xp,
            user,
            xp,
            Module::Mood.source(),
            Some(entry.id.value()),
            now,
        )?;
        tx.commit()?;

        tracing::info!(user = %user, %date, mood = %mood, xp, "mood logged");
        Ok((entry, CompletionOutcome::awarded(award)))
    }

    /// Mood entries of a user, newest first
    pub fn mood_entries(&self, user: UserId) -> Result<Vec<MoodEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM mood_entries WHERE user_id = ?1 ORDER BY date DESC",
            MOOD_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![user.value()], mood_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Start tracking a sobriety streak
    pub fn create_sobriety(
        &mut self,
        user: UserId,
        name: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Sobriety, StoreError> {
        require_user(&self.conn, user)?;
        self.conn.execute(
            "INSERT INTO sobriety (user_id, name, started_at, is_active) VALUES (?1, ?2, ?3, 1)",
            params![user.value(), name, started_at],
        )?;
        Ok(Sobriety {
            id: SobrietyId(self.conn.last_insert_rowid()),
            user_id: user,
            name: name.to_string(),
            started_at,
            ended_at: None,
            is_active: true,
        })
    }

    /// End a running streak at `at`
    pub fn relapse(&mut self, id: SobrietyId, at: DateTime<Utc>) -> Result<Sobriety, StoreError> {
        let changed = self.conn.execute(
            "UPDATE sobriety SET is_active = 0, ended_at = ?1 WHERE id = ?2 AND is_active = 1",
            params![at, id.value()],
        )?;
        let sobriety = self
            .sobriety(id)?
            .ok_or_else(|| StoreError::not_found("sobriety", id))?;
        if changed == 0 {
            tracing::debug!(sobriety = %id, "relapse on a streak that was not running");
        }
        Ok(sobriety)
    }

    /// Start a streak over from `at`
    pub fn restart_sobriety(
        &mut self,
        id: SobrietyId,
        at: DateTime<Utc>,
    ) -> Result<Sobriety, StoreError> {
        let changed = self.conn.execute(
            "UPDATE sobriety SET is_active = 1, started_at = ?1, ended_at = NULL WHERE id = ?2",
            params![at, id.value()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("sobriety", id));
        }
        self.sobriety(id)?
            .ok_or_else(|| StoreError::not_found("sobriety", id))
    }

    /// Get a streak by ID regardless of owner
    pub fn sobriety(&self, id: SobrietyId) -> Result<Option<Sobriety>, StoreError> {
        let sobriety = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sobriety WHERE id = ?1", SOBRIETY_COLUMNS),
                params![id.value()],
                sobriety_from_row,
            )
            .optional()?;
        Ok(sobriety)
    }

    /// Streaks of a user
    pub fn sobriety_list(&self, user: UserId) -> Result<Vec<Sobriety>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sobriety WHERE user_id = ?1 ORDER BY id",
            SOBRIETY_COLUMNS
        ))?;
        let list = stmt
            .query_map(params![user.value()], sobriety_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    /// Write a note
    pub fn create_note(&mut self, user: UserId, content: &str) -> Result<Note, StoreError> {
        require_user(&self.conn, user)?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO notes (user_id, content, created_at) VALUES (?1, ?2, ?3)",
            params![user.value(), content, now],
        )?;
        Ok(Note {
            id: NoteId(self.conn.last_insert_rowid()),
            user_id: user,
            content: content.to_string(),
            created_at: now,
        })
    }

    pub(crate) fn note_count(&self, user: UserId) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE user_id = ?1",
            params![user.value()],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }

    pub(crate) fn mood_count(&self, user: UserId, mood: Option<Mood>) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM mood_entries WHERE user_id = ?1 AND (?2 IS NULL OR mood = ?2)",
            params![user.value(), mood.map(|m| m.as_str())],
            |row| row.get(0),
        )?;
        Ok(count(n))
    }
}
