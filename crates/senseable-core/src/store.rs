//! The `ProfileStore` trait.
//!
//! Implemented by storage backends (e.g. `senseable-store-sqlite`). The HTTP
//! layer and the rephrase pipeline depend on this abstraction only.

use std::future::Future;

use crate::{
  history::{NewRephrase, RephraseHistory},
  preference::{Preference, PreferencePatch},
  tag::{NewTag, Tag, TagPatch},
  user::{NewUser, User, UserId, UserPatch},
};

/// Abstraction over the relational store behind the service.
///
/// Every method is its own transaction; nothing here holds a transaction
/// open across calls. All methods return `Send` futures so the trait can be
/// used from axum handlers.
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Returns `None` if no user has this id.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Apply a partial profile update. Returns `None` if the user is missing.
  fn update_user(
    &self,
    id: UserId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  /// `None` means the user has not set any preferences yet.
  fn get_preferences(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Preference>, Self::Error>> + Send + '_;

  /// Insert the preference row if absent, then merge `patch` into it.
  fn upsert_preferences(
    &self,
    user_id: UserId,
    patch: PreferencePatch,
  ) -> impl Future<Output = Result<Preference, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  fn create_tag(
    &self,
    input: NewTag,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  fn get_tag(
    &self,
    tag_id: i64,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  /// All tags for a user, oldest first.
  fn list_tags(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  fn update_tag(
    &self,
    tag_id: i64,
    patch: TagPatch,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  /// Returns `false` if there was no such tag.
  fn delete_tag(
    &self,
    tag_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Rephrase history ──────────────────────────────────────────────────

  /// Append a history row, assigning its version according to
  /// `input.mode`.
  fn record_rephrase(
    &self,
    input: NewRephrase,
  ) -> impl Future<Output = Result<RephraseHistory, Self::Error>> + Send + '_;

  /// Up to [`crate::history::HISTORY_LIMIT`] rows, newest first.
  fn list_history(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<RephraseHistory>, Self::Error>> + Send + '_;

  // ── Bearer tokens ─────────────────────────────────────────────────────

  /// Remember that the token with SHA-256 digest `token_hash` belongs to
  /// `user_id`.
  fn store_token(
    &self,
    user_id: UserId,
    token_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn resolve_token(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<UserId>, Self::Error>> + Send + '_;
}
