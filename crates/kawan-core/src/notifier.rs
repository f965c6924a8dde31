//! The mention → notification pipeline.
//!
//! Invoked synchronously by the content-creation collaborator after the
//! content is persisted. Fully best-effort: a failure on one candidate is
//! logged and skipped, and the pipeline itself never fails — content
//! creation must succeed even if every mention fails to resolve.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  identity::normalize_handle,
  mention,
  notification::{AppendOutcome, NewNotification, NotificationKind},
  store::SocialStore,
};

/// Per-call summary of what the pipeline did, for logging and the
/// content-created acknowledgement.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MentionSummary {
  /// Distinct handles found in the text (after case-insensitive dedup).
  pub candidates:         usize,
  pub notified:           usize,
  /// Appends that hit the per-ledger dedup constraint (e.g. an edit
  /// reprocessing the same content).
  pub duplicates:         usize,
  pub skipped_self:       usize,
  pub skipped_unknown:    usize,
  pub skipped_not_friend: usize,
  pub failures:           usize,
}

/// Scan `text` for mentions and append a notification to every mentioned
/// accepted friend of `author`.
///
/// Order of gates per candidate: self-mention, handle resolution,
/// friendship. Each failing gate is a silent skip; only backend errors
/// count as failures, and those too are confined to their candidate.
pub async fn process_content<S>(
  store: &S,
  author: Uuid,
  content_ref: Uuid,
  text: &str,
) -> MentionSummary
where
  S: SocialStore,
{
  let mut summary = MentionSummary::default();

  let author_identity = match store.identity(author).await {
    Ok(Some(identity)) => identity,
    Ok(None) => {
      warn!(%author, "mention pipeline: author has no identity, skipping");
      return summary;
    }
    Err(e) => {
      warn!(%author, error = %e, "mention pipeline: author lookup failed");
      return summary;
    }
  };
  let author_key = normalize_handle(&author_identity.handle);

  for handle in mention::mention_handles(text) {
    summary.candidates += 1;

    if normalize_handle(&handle) == author_key {
      debug!(%author, "mention pipeline: ignoring self-mention");
      summary.skipped_self += 1;
      continue;
    }

    let target = match store.identity_by_handle(&handle).await {
      Ok(Some(identity)) => identity,
      Ok(None) => {
        debug!(handle = %handle, "mention pipeline: handle does not resolve");
        summary.skipped_unknown += 1;
        continue;
      }
      Err(e) => {
        warn!(handle = %handle, error = %e, "mention pipeline: handle lookup failed");
        summary.failures += 1;
        continue;
      }
    };

    // Hard policy boundary: mentioning a non-friend never notifies,
    // regardless of what the client validated.
    match store.are_friends(author, target.user_id).await {
      Ok(true) => {}
      Ok(false) => {
        debug!(handle = %handle, "mention pipeline: not an accepted friend");
        summary.skipped_not_friend += 1;
        continue;
      }
      Err(e) => {
        warn!(handle = %handle, error = %e, "mention pipeline: friendship check failed");
        summary.failures += 1;
        continue;
      }
    }

    let input = NewNotification {
      recipient:   target.user_id,
      kind:        NotificationKind::Mention,
      from_user:   author,
      from_handle: author_identity.handle.clone(),
      content_ref,
      message:     format!(
        "@{} mentioned you in a post",
        author_identity.handle
      ),
    };
    match store.append(input).await {
      Ok(AppendOutcome::Inserted(_)) => summary.notified += 1,
      Ok(AppendOutcome::Duplicate(_)) => summary.duplicates += 1,
      Err(e) => {
        warn!(
          recipient = %target.user_id, error = %e,
          "mention pipeline: append failed"
        );
        summary.failures += 1;
      }
    }
  }

  debug!(
    %author, %content_ref,
    candidates = summary.candidates, notified = summary.notified,
    "mention pipeline finished"
  );
  summary
}
