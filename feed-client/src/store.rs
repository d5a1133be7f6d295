//! Durable local fallback store.
//!
//! Every locally created report, plus a copy of every remote report that
//! was mutated while offline, lives in one JSON array under one storage
//! key. The array is read fully and rewritten fully on each mutation.
//!
//! Mutations are read-modify-write cycles over that whole array, so they
//! are serialized by an internal lock; two concurrent mutations on the same
//! store can never interleave and lose each other's write.

use chrono::Utc;
use tokio::sync::Mutex;

use feed_core::{
    merge_comments, merge_flags, paginate, reconcile_count, toggle_reaction, Paginated, ReportPatch,
};
use feed_types::{
    fresh_id, Comment, FeedPage, FeedSource, Flag, NewComment, NewFlag, ReactionKind, Report,
    ReportDraft, ReportId,
};

use crate::config::{PhotoConfig, StorageConfig};
use crate::error::{FeedError, StorageError};
use crate::photo::embed_data_url;
use crate::storage::KeyValueStorage;

/// Keyed-by-id report store over a [`KeyValueStorage`] backend.
pub struct LocalReportStore<S> {
    storage: S,
    key: String,
    photo: PhotoConfig,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStorage> LocalReportStore<S> {
    /// Create a store keeping its record under `config.key`.
    pub fn new(storage: S, config: &StorageConfig, photo: PhotoConfig) -> Self {
        Self {
            storage,
            key: config.key.clone(),
            photo,
            write_lock: Mutex::new(()),
        }
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// One page of the local collection, newest first.
    pub async fn list(&self, page: u32, limit: u32) -> Result<FeedPage, FeedError> {
        let mut reports = self.load().await?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let Paginated {
            items,
            next_page,
            total,
        } = paginate(&reports, page, limit);
        Ok(FeedPage {
            items,
            next_page,
            total: Some(total),
            source: FeedSource::Local,
        })
    }

    /// Look up one report.
    pub async fn get(&self, id: &ReportId) -> Result<Report, FeedError> {
        self.load()
            .await?
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// One page of a report's comments, oldest first.
    pub async fn comments(
        &self,
        id: &ReportId,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Comment>, FeedError> {
        let report = self.get(id).await?;
        Ok(paginate(&report.comments, page, limit))
    }

    /// Save a new report under a fresh local id.
    ///
    /// An attached photo is embedded as a downsized JPEG data URL. A photo
    /// that cannot be decoded is dropped; the report is still saved.
    pub async fn add(&self, draft: &ReportDraft) -> Result<Report, FeedError> {
        let photo_url = self.embed_photo(draft).await;
        let report = Report::from_draft(ReportId::local(), draft, photo_url, Utc::now());

        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;
        reports.insert(0, report.clone());
        self.save(&reports).await?;

        tracing::debug!("Saved report {} locally", report.id);
        Ok(report)
    }

    /// Store the caller's copy of a remote report so it can be mutated
    /// offline.
    ///
    /// The caller's copy replaces content, status, tallies and the viewer
    /// reaction of any stored copy. Comments and flags of both copies are
    /// merged by id.
    pub async fn adopt(&self, report: &Report) -> Result<Report, FeedError> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;

        let adopted = match reports.iter_mut().find(|r| r.id == report.id) {
            Some(existing) => {
                let mut fresh = report.clone();
                fresh.comments = merge_comments(&existing.comments, &report.comments);
                fresh.comments_count = reconcile_count(
                    existing.comments_count.max(report.comments_count),
                    fresh.comments.len(),
                    None,
                );
                fresh.flags = merge_flags(&existing.flags, &report.flags);
                *existing = fresh.clone();
                fresh
            }
            None => {
                reports.push(report.clone());
                report.clone()
            }
        };

        self.save(&reports).await?;
        tracing::debug!("Adopted report {} into local store", report.id);
        Ok(adopted)
    }

    /// Append a comment with a fresh id and timestamp.
    pub async fn add_comment(
        &self,
        id: &ReportId,
        comment: &NewComment,
    ) -> Result<Report, FeedError> {
        let patch = ReportPatch {
            comment: Some(Comment {
                id: fresh_id(),
                name: comment.name.clone(),
                text: comment.text.clone(),
                created_at: Utc::now(),
            }),
            ..ReportPatch::default()
        };
        self.mutate(id, |report| patch.apply(report)).await
    }

    /// Toggle the viewer's reaction.
    ///
    /// `kind` is validated before the store is touched.
    pub async fn toggle_reaction(&self, id: &ReportId, kind: &str) -> Result<Report, FeedError> {
        let kind: ReactionKind = kind.parse()?;
        self.mutate(id, |report| toggle_reaction(report, kind)).await
    }

    /// Append a moderation flag.
    pub async fn add_flag(&self, id: &ReportId, flag: &NewFlag) -> Result<Report, FeedError> {
        let patch = ReportPatch {
            flag: Some(Flag {
                id: fresh_id(),
                reason: flag.reason.clone(),
                details: flag.details.clone(),
                created_at: Utc::now(),
            }),
            ..ReportPatch::default()
        };
        self.mutate(id, |report| patch.apply(report)).await
    }

    async fn mutate<F>(&self, id: &ReportId, apply: F) -> Result<Report, FeedError>
    where
        F: FnOnce(&mut Report),
    {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;
        let report = reports
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| not_found(id))?;
        apply(report);
        let updated = report.clone();

        self.save(&reports).await?;
        Ok(updated)
    }

    async fn load(&self) -> Result<Vec<Report>, FeedError> {
        let Some(raw) = self.storage.read(&self.key).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            FeedError::Storage(StorageError::Corrupt {
                key: self.key.clone(),
                reason: e.to_string(),
            })
        })
    }

    async fn save(&self, reports: &[Report]) -> Result<(), FeedError> {
        let raw = serde_json::to_string(reports).map_err(StorageError::from)?;
        self.storage.write(&self.key, &raw).await?;
        Ok(())
    }

    /// Decode and re-encode on the blocking pool.
    async fn embed_photo(&self, draft: &ReportDraft) -> Option<String> {
        let photo = draft.photo.as_ref()?;
        if !self.photo.embed_offline {
            return None;
        }

        let bytes = photo.bytes.clone();
        let config = self.photo.clone();
        let embedded = tokio::task::spawn_blocking(move || embed_data_url(&bytes, &config)).await;

        match embedded {
            Ok(Ok(url)) => Some(url),
            Ok(Err(e)) => {
                tracing::warn!("Dropping photo {} from local report: {}", photo.file_name, e);
                None
            }
            Err(e) => {
                tracing::warn!("Photo embedding task for {} failed: {}", photo.file_name, e);
                None
            }
        }
    }
}

fn not_found(id: &ReportId) -> FeedError {
    FeedError::NotFound {
        report_id: id.clone(),
    }
}
