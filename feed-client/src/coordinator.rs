//! Remote-first, local-fallback coordination.
//!
//! Every read and mutation tries the remote gateway first. Any gateway
//! failure (network, timeout, non-2xx, unusable body) sends the same
//! operation to the [`LocalReportStore`] instead:
//!
//! - reads absorb the failure completely; the returned page only records
//!   which store answered it
//! - writes return [`SyncOutcome::SavedLocally`] carrying the absorbed error
//! - local storage failures have nowhere left to go and surface as
//!   [`FeedError`]

use chrono::Utc;
use serde_json::Value;

use feed_core::{
    merge_comments, normalize_comment_page, normalize_created, normalize_page, reconcile_count,
    toggle_reaction, ReportPatch,
};
use feed_types::{
    fresh_id, Comment, FeedPage, FeedSource, Flag, NewComment, NewFlag, ReactionKind, Report,
    ReportDraft,
};

use crate::config::{ClientConfig, ConfigError};
use crate::error::{FeedError, GatewayError};
use crate::gateway::{HttpGateway, ReportsGateway};
use crate::storage::{FileStorage, KeyValueStorage};
use crate::store::LocalReportStore;

/// Result of a write that may have been absorbed by the local store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome<T> {
    /// The remote service accepted the write.
    Synced(T),
    /// The remote failed; the write was saved locally and is not synced.
    SavedLocally {
        /// The locally saved result.
        value: T,
        /// Why the remote call was abandoned.
        reason: GatewayError,
    },
}

impl<T> SyncOutcome<T> {
    /// The resulting value, wherever it was saved.
    pub fn value(&self) -> &T {
        match self {
            SyncOutcome::Synced(value) | SyncOutcome::SavedLocally { value, .. } => value,
        }
    }

    /// Consume the outcome, keeping the value.
    pub fn into_value(self) -> T {
        match self {
            SyncOutcome::Synced(value) | SyncOutcome::SavedLocally { value, .. } => value,
        }
    }

    /// True if the remote service accepted the write.
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }

    /// The absorbed gateway error, if the write fell back.
    pub fn reason(&self) -> Option<&GatewayError> {
        match self {
            SyncOutcome::Synced(_) => None,
            SyncOutcome::SavedLocally { reason, .. } => Some(reason),
        }
    }
}

/// A report with one more page of comments merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentsPage {
    /// The report with merged comments and a reconciled count.
    pub report: Report,
    /// Next comment page, `None` when exhausted.
    pub next_page: Option<u32>,
    /// Store that answered.
    pub source: FeedSource,
}

/// Routes feed reads and mutations between the remote service and the
/// local store.
pub struct FeedSyncCoordinator<G, S> {
    gateway: G,
    store: LocalReportStore<S>,
    asset_base: String,
    page_limit: u32,
}

impl FeedSyncCoordinator<HttpGateway, FileStorage> {
    /// Build a coordinator talking HTTP and persisting under
    /// `config.storage.data_dir`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let gateway = HttpGateway::new(&config.api)?;
        let storage = FileStorage::new(config.storage.data_dir.clone(), config.storage.max_bytes);
        Ok(Self::new(gateway, storage, config))
    }
}

impl<G: ReportsGateway, S: KeyValueStorage> FeedSyncCoordinator<G, S> {
    /// Create a coordinator over the given gateway and storage backend.
    pub fn new(gateway: G, storage: S, config: &ClientConfig) -> Self {
        Self {
            gateway,
            store: LocalReportStore::new(storage, &config.storage, config.photo.clone()),
            asset_base: config.api.asset_base_url.clone(),
            page_limit: config.feed.page_limit,
        }
    }

    /// The remote gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The local fallback store.
    pub fn store(&self) -> &LocalReportStore<S> {
        &self.store
    }

    /// Configured feed page size.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    // ===========================================
    // Reads
    // ===========================================

    /// Load one page of the feed using the configured page size.
    pub async fn feed_page(&self, page: u32) -> Result<FeedPage, FeedError> {
        self.feed_page_with_limit(page, self.page_limit).await
    }

    /// Load one page of the feed.
    ///
    /// Remote failures are absorbed; check [`FeedPage::source`] to tell the
    /// two stores apart.
    pub async fn feed_page_with_limit(&self, page: u32, limit: u32) -> Result<FeedPage, FeedError> {
        let remote = self
            .gateway
            .list_reports(page, limit)
            .await
            .and_then(|payload| {
                normalize_page(&payload, page, limit, &self.asset_base)
                    .ok_or_else(|| malformed("no report collection in feed response"))
            });

        match remote {
            Ok(feed) => {
                tracing::debug!("Loaded feed page {} remotely ({} reports)", page, feed.items.len());
                Ok(feed)
            }
            Err(e) => {
                tracing::warn!("Feed page {} falling back to local store: {}", page, e);
                self.store.list(page, limit).await
            }
        }
    }

    /// Load one page of comments for `report` and merge it in.
    ///
    /// `comments_count` never decreases. A report the local store has never
    /// seen falls back to itself unchanged.
    pub async fn load_comments(
        &self,
        report: &Report,
        page: u32,
        limit: u32,
    ) -> Result<CommentsPage, FeedError> {
        let remote = self
            .gateway
            .list_comments(&report.id, page, limit)
            .await
            .and_then(|payload| {
                normalize_comment_page(&payload, page, limit)
                    .ok_or_else(|| malformed("no comment collection in response"))
            });

        let (incoming, next_page, total, source) = match remote {
            Ok(fetched) => (
                fetched.comments,
                fetched.next_page,
                fetched.total,
                FeedSource::Remote,
            ),
            Err(e) => {
                tracing::warn!(
                    "Comments for {} falling back to local store: {}",
                    report.id,
                    e
                );
                match self.store.comments(&report.id, page, limit).await {
                    Ok(local) => (
                        local.items,
                        local.next_page,
                        Some(local.total),
                        FeedSource::Local,
                    ),
                    Err(FeedError::NotFound { .. }) => (Vec::new(), None, None, FeedSource::Local),
                    Err(e) => return Err(e),
                }
            }
        };

        let mut updated = report.clone();
        let merged = merge_comments(&updated.comments, &incoming);
        updated.comments_count = reconcile_count(updated.comments_count, merged.len(), total);
        updated.comments = merged;

        Ok(CommentsPage {
            report: updated,
            next_page,
            source,
        })
    }

    // ===========================================
    // Writes
    // ===========================================

    /// Submit a new report.
    ///
    /// A rejected or unreachable remote still saves the report locally under
    /// a fresh id and answers `SavedLocally`.
    pub async fn submit_report(&self, draft: &ReportDraft) -> Result<SyncOutcome<Report>, FeedError> {
        let remote = self.gateway.create_report(draft).await.and_then(|payload| {
            normalize_created(&payload, draft, Utc::now(), &self.asset_base)
                .ok_or_else(|| malformed("created report has no id"))
        });

        match remote {
            Ok(report) => {
                tracing::debug!("Report {} created remotely", report.id);
                Ok(SyncOutcome::Synced(report))
            }
            Err(reason) => {
                tracing::warn!("Report submission falling back to local store: {}", reason);
                let report = self.store.add(draft).await?;
                Ok(SyncOutcome::SavedLocally {
                    value: report,
                    reason,
                })
            }
        }
    }

    /// Toggle the viewer's reaction on `report`.
    ///
    /// An unknown `kind` is rejected before any I/O. The caller must not
    /// start a second toggle on the same report until this one returns.
    pub async fn toggle_reaction(
        &self,
        report: &Report,
        kind: &str,
    ) -> Result<SyncOutcome<Report>, FeedError> {
        let kind: ReactionKind = kind.parse()?;

        match self.gateway.toggle_reaction(&report.id, kind).await {
            Ok(payload) => {
                let mut updated = report.clone();
                toggle_reaction(&mut updated, kind);
                self.patch(&payload).apply(&mut updated);
                Ok(SyncOutcome::Synced(updated))
            }
            Err(reason) => {
                tracing::warn!("Reaction on {} falling back to local store: {}", report.id, reason);
                self.adopt_if_remote(report).await?;
                let value = self.store.toggle_reaction(&report.id, kind.as_str()).await?;
                Ok(SyncOutcome::SavedLocally { value, reason })
            }
        }
    }

    /// Post a comment on `report`.
    pub async fn add_comment(
        &self,
        report: &Report,
        comment: &NewComment,
    ) -> Result<SyncOutcome<Report>, FeedError> {
        match self.gateway.create_comment(&report.id, comment).await {
            Ok(payload) => {
                let mut patch = self.patch(&payload);
                if !patch.carries_comment() {
                    patch.comment = Some(Comment {
                        id: fresh_id(),
                        name: comment.name.clone(),
                        text: comment.text.clone(),
                        created_at: Utc::now(),
                    });
                }
                let mut updated = report.clone();
                patch.apply(&mut updated);
                Ok(SyncOutcome::Synced(updated))
            }
            Err(reason) => {
                tracing::warn!("Comment on {} falling back to local store: {}", report.id, reason);
                self.adopt_if_remote(report).await?;
                let value = self.store.add_comment(&report.id, comment).await?;
                Ok(SyncOutcome::SavedLocally { value, reason })
            }
        }
    }

    /// Flag `report` for moderation.
    pub async fn flag_report(
        &self,
        report: &Report,
        flag: &NewFlag,
    ) -> Result<SyncOutcome<Report>, FeedError> {
        match self.gateway.flag_report(&report.id, flag).await {
            Ok(payload) => {
                let mut patch = self.patch(&payload);
                if !patch.carries_flag() {
                    patch.flag = Some(Flag {
                        id: fresh_id(),
                        reason: flag.reason.clone(),
                        details: flag.details.clone(),
                        created_at: Utc::now(),
                    });
                }
                let mut updated = report.clone();
                patch.apply(&mut updated);
                Ok(SyncOutcome::Synced(updated))
            }
            Err(reason) => {
                tracing::warn!("Flag on {} falling back to local store: {}", report.id, reason);
                self.adopt_if_remote(report).await?;
                let value = self.store.add_flag(&report.id, flag).await?;
                Ok(SyncOutcome::SavedLocally { value, reason })
            }
        }
    }

    fn patch(&self, payload: &Value) -> ReportPatch {
        ReportPatch::from_response(payload, &self.asset_base)
    }

    /// Remote reports are not in the local store until first mutated
    /// offline. Local ones must already be there.
    async fn adopt_if_remote(&self, report: &Report) -> Result<(), FeedError> {
        if !report.id.is_local() {
            self.store.adopt(report).await?;
        }
        Ok(())
    }
}

fn malformed(reason: &str) -> GatewayError {
    GatewayError::MalformedResponse(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayRequest, MockGateway};
    use crate::storage::MemoryStorage;
    use feed_types::{PetStatus, ReactionCounts, ReportId};
    use serde_json::json;

    type TestCoordinator = FeedSyncCoordinator<MockGateway, MemoryStorage>;

    fn coordinator() -> (TestCoordinator, MockGateway) {
        let gateway = MockGateway::new();
        let config = ClientConfig::default().with_asset_base_url("https://api.example.org");
        let coordinator = FeedSyncCoordinator::new(gateway.clone(), MemoryStorage::new(), &config);
        (coordinator, gateway)
    }

    fn draft() -> ReportDraft {
        ReportDraft {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            phone_number: "555-0100".into(),
            pet_status: PetStatus::Found,
            location: "Parque Central".into(),
            description: None,
            photo: None,
        }
    }

    fn remote_report() -> Report {
        let mut report = Report::from_draft(ReportId::new("srv-1"), &draft(), None, Utc::now());
        report.reactions.set(ReactionKind::Like, 3);
        report
    }

    // ===========================================
    // SyncOutcome
    // ===========================================

    #[test]
    fn sync_outcome_accessors() {
        let synced = SyncOutcome::Synced(1);
        assert!(synced.is_synced());
        assert!(synced.reason().is_none());
        assert_eq!(*synced.value(), 1);

        let local = SyncOutcome::SavedLocally {
            value: 2,
            reason: GatewayError::NetworkUnavailable("down".into()),
        };
        assert!(!local.is_synced());
        assert!(local.reason().is_some());
        assert_eq!(local.into_value(), 2);
    }

    // ===========================================
    // Feed
    // ===========================================

    #[tokio::test]
    async fn feed_uses_remote_and_drops_records_without_id() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({
            "data": {"reports": [{"_id": "a", "status": "FOUND"}, {"name": "no id"}]},
        }));

        let page = coordinator.feed_page(1).await.unwrap();

        assert_eq!(page.source, FeedSource::Remote);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].pet_status, PetStatus::Found);
        assert_eq!(
            gateway.last_request(),
            Some(GatewayRequest::ListReports { page: 1, limit: 10 })
        );
    }

    #[tokio::test]
    async fn feed_falls_back_silently() {
        let (coordinator, gateway) = coordinator();
        coordinator.store().add(&draft()).await.unwrap();
        gateway.reject_next(503, "maintenance");

        let page = coordinator.feed_page(1).await.unwrap();

        assert_eq!(page.source, FeedSource::Local);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn feed_without_items_counts_as_failure() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({"message": "ok"}));

        let page = coordinator.feed_page(1).await.unwrap();
        assert_eq!(page.source, FeedSource::Local);
    }

    // ===========================================
    // Submission
    // ===========================================

    #[tokio::test]
    async fn submit_synced() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({"id": "srv-9", "photoUrl": "/uploads/p.jpg"}));

        let outcome = coordinator.submit_report(&draft()).await.unwrap();

        assert!(outcome.is_synced());
        let report = outcome.into_value();
        assert_eq!(report.id, ReportId::new("srv-9"));
        assert_eq!(report.pet_status, PetStatus::Found);
        assert_eq!(
            report.photo_url.as_deref(),
            Some("https://api.example.org/uploads/p.jpg")
        );
        assert!(coordinator.store().list(1, 10).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn submit_rejected_is_saved_locally() {
        let (coordinator, gateway) = coordinator();
        gateway.reject_next(422, "phone number invalid");

        let outcome = coordinator.submit_report(&draft()).await.unwrap();

        assert!(matches!(
            outcome.reason(),
            Some(GatewayError::RemoteRejected { status: 422, .. })
        ));
        let report = outcome.into_value();
        assert!(report.id.is_local());
        assert_eq!(report.reactions, ReactionCounts::zero());

        let listed = coordinator.store().list(1, 10).await.unwrap();
        assert_eq!(listed.items[0].id, report.id);
    }

    #[tokio::test]
    async fn submit_without_id_in_answer_falls_back() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({"ok": true}));

        let outcome = coordinator.submit_report(&draft()).await.unwrap();
        assert!(matches!(
            outcome.reason(),
            Some(GatewayError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn submit_storage_failure_is_hard_error() {
        let storage = MemoryStorage::new();
        let gateway = MockGateway::new();
        let coordinator =
            FeedSyncCoordinator::new(gateway.clone(), storage.clone(), &ClientConfig::default());
        gateway.set_offline(true);
        storage.fail_next_write();

        let result = coordinator.submit_report(&draft()).await;
        assert!(matches!(result, Err(FeedError::Storage(_))));
    }

    // ===========================================
    // Reactions
    // ===========================================

    #[tokio::test]
    async fn reaction_synced_with_empty_answer_applies_transition() {
        let (coordinator, _) = coordinator();
        let report = remote_report();

        let outcome = coordinator.toggle_reaction(&report, "like").await.unwrap();

        assert!(outcome.is_synced());
        let updated = outcome.into_value();
        assert_eq!(updated.my_reaction, Some(ReactionKind::Like));
        assert_eq!(updated.reactions.get(ReactionKind::Like), 4);
    }

    #[tokio::test]
    async fn reaction_synced_prefers_server_counts() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({
            "reactions": {"like": 10, "heart": 2},
            "myReaction": "heart"
        }));

        let updated = coordinator
            .toggle_reaction(&remote_report(), "heart")
            .await
            .unwrap()
            .into_value();

        assert_eq!(updated.reactions.get(ReactionKind::Like), 10);
        assert_eq!(updated.reactions.get(ReactionKind::Heart), 2);
        assert_eq!(updated.my_reaction, Some(ReactionKind::Heart));
    }

    #[tokio::test]
    async fn reaction_synced_with_sparse_full_report_keeps_viewer_state() {
        let (coordinator, gateway) = coordinator();
        let report = remote_report();
        gateway.queue_response(json!({
            "report": {"id": "srv-1", "location": "Plaza", "reactions": {"like": 4}}
        }));

        let liked = coordinator
            .toggle_reaction(&report, "like")
            .await
            .unwrap()
            .into_value();

        assert_eq!(liked.my_reaction, Some(ReactionKind::Like));
        assert_eq!(liked.reactions.get(ReactionKind::Like), 4);
        assert_eq!(liked.pet_status, PetStatus::Found);
        assert_eq!(liked.location, "Plaza");

        // Second toggle on the returned copy withdraws the like exactly once
        let unliked = coordinator
            .toggle_reaction(&liked, "like")
            .await
            .unwrap()
            .into_value();
        assert_eq!(unliked.my_reaction, None);
        assert_eq!(unliked.reactions.get(ReactionKind::Like), 3);
    }

    #[tokio::test]
    async fn reaction_invalid_kind_makes_no_request() {
        let (coordinator, gateway) = coordinator();

        let result = coordinator.toggle_reaction(&remote_report(), "wave").await;

        assert!(matches!(result, Err(FeedError::InvalidReaction(_))));
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn reaction_offline_adopts_remote_report() {
        let (coordinator, gateway) = coordinator();
        gateway.set_offline(true);
        let report = remote_report();

        let outcome = coordinator.toggle_reaction(&report, "like").await.unwrap();

        assert!(!outcome.is_synced());
        let updated = outcome.into_value();
        assert_eq!(updated.reactions.get(ReactionKind::Like), 4);
        assert_eq!(coordinator.store().get(&report.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn reaction_offline_on_unknown_local_report_is_not_found() {
        let (coordinator, gateway) = coordinator();
        gateway.set_offline(true);
        let mut report = remote_report();
        report.id = ReportId::local();

        let result = coordinator.toggle_reaction(&report, "like").await;
        assert!(matches!(result, Err(FeedError::NotFound { .. })));
    }

    // ===========================================
    // Comments
    // ===========================================

    #[tokio::test]
    async fn comment_synced_from_bare_comment_answer() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({
            "id": "c1",
            "text": "saw it near the bakery",
            "createdAt": "2024-03-01T10:00:00Z"
        }));
        let comment = NewComment {
            name: None,
            text: "saw it near the bakery".into(),
        };

        let updated = coordinator
            .add_comment(&remote_report(), &comment)
            .await
            .unwrap()
            .into_value();

        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].id, "c1");
        assert_eq!(updated.comments_count, 1);
    }

    #[tokio::test]
    async fn comment_synced_without_entity_is_synthesized() {
        let (coordinator, gateway) = coordinator();
        gateway.queue_response(json!({"ok": true}));
        let comment = NewComment {
            name: Some("Luis".into()),
            text: "on my way".into(),
        };

        let outcome = coordinator
            .add_comment(&remote_report(), &comment)
            .await
            .unwrap();

        assert!(outcome.is_synced());
        let updated = outcome.into_value();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].name.as_deref(), Some("Luis"));
        assert_eq!(updated.comments_count, 1);
    }

    #[tokio::test]
    async fn comment_offline_on_local_report() {
        let (coordinator, gateway) = coordinator();
        let report = coordinator.store().add(&draft()).await.unwrap();
        gateway.set_offline(true);
        let comment = NewComment {
            name: None,
            text: "hope you find her".into(),
        };

        let outcome = coordinator.add_comment(&report, &comment).await.unwrap();

        assert!(!outcome.is_synced());
        assert_eq!(outcome.value().comments.len(), 1);
        assert_eq!(
            coordinator.store().get(&report.id).await.unwrap().comments_count,
            1
        );
    }

    #[tokio::test]
    async fn load_comments_merges_and_keeps_count() {
        let (coordinator, gateway) = coordinator();
        let mut report = remote_report();
        report.comments = vec![Comment {
            id: "a".into(),
            name: None,
            text: "first".into(),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        }];
        report.comments_count = 9;
        gateway.queue_response(json!({"comments": [
            {"id": "b", "text": "second", "createdAt": "2024-01-02T00:00:00Z"},
            {"id": "a", "text": "first", "createdAt": "2024-01-01T00:00:00Z"}
        ], "total": 4}));

        let page = coordinator.load_comments(&report, 1, 20).await.unwrap();

        let ids: Vec<&str> = page.report.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(page.report.comments_count, 9);
        assert_eq!(page.source, FeedSource::Remote);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn load_comments_offline_for_unknown_report_is_unchanged() {
        let (coordinator, gateway) = coordinator();
        gateway.set_offline(true);
        let report = remote_report();

        let page = coordinator.load_comments(&report, 1, 20).await.unwrap();

        assert_eq!(page.report, report);
        assert_eq!(page.source, FeedSource::Local);
        assert_eq!(page.next_page, None);
    }

    // ===========================================
    // Flags
    // ===========================================

    #[tokio::test]
    async fn flag_synced_and_offline() {
        let (coordinator, gateway) = coordinator();
        let report = remote_report();
        let flag = NewFlag {
            reason: "spam".into(),
            details: String::new(),
        };

        gateway.queue_response(json!({"flag": {
            "id": "f1", "reason": "spam", "createdAt": "2024-02-01T00:00:00Z"
        }}));
        let synced = coordinator.flag_report(&report, &flag).await.unwrap();
        assert!(synced.is_synced());
        assert_eq!(synced.value().flags[0].id, "f1");

        gateway.set_offline(true);
        let local = coordinator.flag_report(&report, &flag).await.unwrap();
        assert!(!local.is_synced());
        assert_eq!(local.value().flags.len(), 1);
        assert_eq!(
            gateway.last_request(),
            Some(GatewayRequest::FlagReport {
                report_id: report.id.clone(),
                flag: flag.clone()
            })
        );
    }
}
