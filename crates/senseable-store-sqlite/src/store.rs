//! [`SqliteStore`]: the SQLite implementation of [`ProfileStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, Transaction};

use senseable_core::{
  history::{HISTORY_LIMIT, NewRephrase, RephraseHistory},
  preference::{Preference, PreferencePatch},
  store::ProfileStore,
  tag::{NewTag, Tag, TagPatch},
  user::{NewUser, User, UserId, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    RawHistory, RawPreference, RawTag, RawUser, encode_dt, encode_familiarity,
    encode_object, encode_palette, now,
  },
  schema::SCHEMA,
};

/// Run `f` in a transaction on the connection thread, committing only when
/// it succeeds. Rule violations come back as the inner `Err`, so the caller
/// unwraps with `.await??`.
fn in_tx<T>(
  conn: &mut rusqlite::Connection,
  f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> tokio_rusqlite::Result<Result<T>> {
  let tx = conn.transaction()?;
  let out = f(&tx);
  if out.is_ok() {
    tx.commit()?;
  }
  Ok(out)
}

fn user_exists(conn: &rusqlite::Connection, id: UserId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM users WHERE user_id = ?1", [id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn email_owner(
  conn: &rusqlite::Connection,
  email: &str,
) -> rusqlite::Result<Option<UserId>> {
  conn
    .query_row("SELECT user_id FROM users WHERE email = ?1", [email], |r| r.get(0))
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SenseAble profile store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's background thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;

    let created_at = now();
    let at_str     = encode_dt(created_at);
    let name       = input.name.clone();
    let email      = input.email.clone();

    let user_id = self
      .conn
      .call(move |conn| {
        in_tx(conn, |tx| {
          if let Some(e) = &email
            && email_owner(tx, e)?.is_some()
          {
            return Err(Error::EmailTaken(e.clone()));
          }
          tx.execute(
            "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, email, at_str],
          )?;
          Ok(tx.last_insert_rowid())
        })
      })
      .await??;

    Ok(User { user_id, name: input.name, email: input.email, created_at })
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
              [id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE email = ?1", RawUser::COLUMNS),
              [email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    patch.validate()?;

    // Read, merge with `UserPatch::apply`, write back.
    self
      .conn
      .call(move |conn| {
        in_tx(conn, |tx| {
          let Some(raw) = tx
            .query_row(
              &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
              [id],
              RawUser::from_row,
            )
            .optional()?
          else {
            return Ok(None);
          };
          if let Some(e) = &patch.email
            && email_owner(tx, e)?.is_some_and(|owner| owner != id)
          {
            return Err(Error::EmailTaken(e.clone()));
          }

          let mut user = raw.into_user()?;
          patch.apply(&mut user);
          tx.execute(
            "UPDATE users SET name = ?2, email = ?3 WHERE user_id = ?1",
            rusqlite::params![id, user.name, user.email],
          )?;
          Ok(Some(user))
        })
      })
      .await?
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn get_preferences(&self, user_id: UserId) -> Result<Option<Preference>> {
    let raw: Option<RawPreference> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM preferences WHERE user_id = ?1",
                RawPreference::COLUMNS
              ),
              [user_id],
              RawPreference::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPreference::into_preference).transpose()
  }

  async fn upsert_preferences(
    &self,
    user_id: UserId,
    patch: PreferencePatch,
  ) -> Result<Preference> {
    // Ensure the row, then read, merge with `PreferencePatch::apply`, write.
    self
      .conn
      .call(move |conn| {
        in_tx(conn, |tx| {
          if !user_exists(tx, user_id)? {
            return Err(Error::UserNotFound(user_id));
          }
          tx.execute(
            "INSERT OR IGNORE INTO preferences (user_id) VALUES (?1)",
            [user_id],
          )?;
          let mut pref = tx
            .query_row(
              &format!(
                "SELECT {} FROM preferences WHERE user_id = ?1",
                RawPreference::COLUMNS
              ),
              [user_id],
              RawPreference::from_row,
            )?
            .into_preference()?;
          if patch.is_empty() {
            return Ok(pref);
          }

          patch.apply(&mut pref);
          let palette = pref.color_palette.as_ref().map(encode_palette).transpose()?;
          let other = pref.other_preferences.as_ref().map(encode_object).transpose()?;
          tx.execute(
            "UPDATE preferences
                SET accessibility_need   = ?2,
                    reading_level        = ?3,
                    preferred_complexity = ?4,
                    color_palette        = ?5,
                    other_preferences    = ?6
              WHERE user_id = ?1",
            rusqlite::params![
              user_id,
              pref.accessibility_need,
              pref.reading_level,
              pref.preferred_complexity,
              palette,
              other,
            ],
          )?;
          Ok(pref)
        })
      })
      .await?
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn create_tag(&self, input: NewTag) -> Result<Tag> {
    input.validate()?;

    let created_at = now();
    let at_str     = encode_dt(created_at);
    let user_id    = input.user_id;
    let phrase     = input.phrase.clone();
    let level_str  = encode_familiarity(input.familiarity_level);

    let tag_id = self
      .conn
      .call(move |conn| {
        in_tx(conn, |tx| {
          if !user_exists(tx, user_id)? {
            return Err(Error::UserNotFound(user_id));
          }
          tx.execute(
            "INSERT INTO tags (user_id, phrase, familiarity_level, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, phrase, level_str, at_str],
          )?;
          Ok(tx.last_insert_rowid())
        })
      })
      .await??;

    Ok(Tag {
      tag_id,
      user_id,
      phrase: input.phrase,
      familiarity_level: input.familiarity_level,
      created_at,
    })
  }

  async fn get_tag(&self, tag_id: i64) -> Result<Option<Tag>> {
    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM tags WHERE tag_id = ?1", RawTag::COLUMNS),
              [tag_id],
              RawTag::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTag::into_tag).transpose()
  }

  async fn list_tags(&self, user_id: UserId) -> Result<Vec<Tag>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM tags WHERE user_id = ?1 ORDER BY tag_id",
          RawTag::COLUMNS
        ))?;
        let rows = stmt
          .query_map([user_id], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn update_tag(&self, tag_id: i64, patch: TagPatch) -> Result<Option<Tag>> {
    patch.validate()?;

    // Read, merge with `TagPatch::apply`, write back.
    self
      .conn
      .call(move |conn| {
        in_tx(conn, |tx| {
          let Some(raw) = tx
            .query_row(
              &format!("SELECT {} FROM tags WHERE tag_id = ?1", RawTag::COLUMNS),
              [tag_id],
              RawTag::from_row,
            )
            .optional()?
          else {
            return Ok(None);
          };

          let mut tag = raw.into_tag()?;
          patch.apply(&mut tag);
          tx.execute(
            "UPDATE tags SET phrase = ?2, familiarity_level = ?3 WHERE tag_id = ?1",
            rusqlite::params![tag_id, tag.phrase, encode_familiarity(tag.familiarity_level)],
          )?;
          Ok(Some(tag))
        })
      })
      .await?
  }

  async fn delete_tag(&self, tag_id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM tags WHERE tag_id = ?1", [tag_id])?))
      .await?;
    Ok(deleted > 0)
  }

  // ── Rephrase history ──────────────────────────────────────────────────────

  async fn record_rephrase(&self, input: NewRephrase) -> Result<RephraseHistory> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let user_id    = input.user_id;
    let original   = input.original_text.clone();
    let rephrased  = input.rephrased_text.clone();
    let mode       = input.mode;

    // Count and insert share one transaction on the connection thread.
    let (history_id, version) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let prior: i64 = tx.query_row(
          "SELECT COUNT(*) FROM rephrase_history
            WHERE user_id = ?1 AND original_text = ?2",
          rusqlite::params![user_id, original],
          |r| r.get(0),
        )?;
        let version = mode.next_version(prior as u32);
        tx.execute(
          "INSERT INTO rephrase_history
             (user_id, original_text, rephrased_text, version, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![user_id, original, rephrased, version, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok((id, version))
      })
      .await?;

    tracing::debug!(user_id, history_id, version, ?mode, "recorded rephrase");

    Ok(RephraseHistory {
      history_id,
      user_id,
      original_text: input.original_text,
      rephrased_text: input.rephrased_text,
      version,
      created_at,
    })
  }

  async fn list_history(&self, user_id: UserId) -> Result<Vec<RephraseHistory>> {
    let limit = HISTORY_LIMIT as i64;

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM rephrase_history
            WHERE user_id = ?1
            ORDER BY created_at DESC, history_id DESC
            LIMIT ?2",
          RawHistory::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, limit], RawHistory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_history).collect()
  }

  // ── Bearer tokens ─────────────────────────────────────────────────────────

  async fn store_token(&self, user_id: UserId, token_hash: String) -> Result<()> {
    let at_str = encode_dt(now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO auth_tokens (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, user_id, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve_token(&self, token_hash: String) -> Result<Option<UserId>> {
    let user_id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM auth_tokens WHERE token_hash = ?1",
              [token_hash],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user_id)
  }
}
