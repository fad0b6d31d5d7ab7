//! The reconciliation loop: inventory, candidate selection, and the
//! download/upload pass over one target.

use postersync_core::fulfillment::{FulfillmentState, MissingImage, SlotKey};
use postersync_core::{ArtworkEntry, CandidateSet, LibraryTarget, MediaKind, MediaServer, SetSource};
use tokio::sync::mpsc;

use crate::error::SyncError;
use crate::events::SyncEvent;
use crate::policy::SyncPolicy;

/// Label Kometa stamps on items it has overlaid.
const KOMETA_OVERLAY_LABEL: &str = "Overlay";

/// How reconciling one target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Inventory was already complete; nothing was fetched or uploaded.
    AlreadyComplete,
    /// Every required image is now in place.
    Complete,
    /// Some images are still missing after exhausting the candidates.
    Partial { missing: Vec<MissingImage> },
    /// No eligible set was published for this target.
    NoCandidates,
}

impl SyncOutcome {
    pub fn display_name(&self) -> &'static str {
        match self {
            SyncOutcome::AlreadyComplete => "already complete",
            SyncOutcome::Complete => "complete",
            SyncOutcome::Partial { .. } => "partial",
            SyncOutcome::NoCandidates => "no candidates",
        }
    }
}

/// Result of one target's reconciliation pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub title: String,
    pub kind: MediaKind,
    pub outcome: SyncOutcome,
    pub uploaded: u32,
    pub failed: u32,
    /// Titles of the sets that contributed at least one attempt.
    pub sets_used: Vec<String>,
}

/// Reconcile one target against the source's published sets.
///
/// Per-image failures are logged and leave that image missing; the pass
/// continues. Auth rejections from either service abort with a fatal
/// error.
pub async fn reconcile<S: MediaServer, C: SetSource>(
    server: &S,
    source: &C,
    policy: &SyncPolicy,
    target: &LibraryTarget,
    kometa: bool,
    events: mpsc::UnboundedSender<SyncEvent>,
) -> Result<SyncReport, SyncError> {
    let events = &events;
    let title = target.title().to_owned();
    let _ = events.send(SyncEvent::TargetStarted {
        title: title.clone(),
    });

    let mut state = FulfillmentState::for_target(target);
    if state.is_complete() {
        log::debug!("'{title}' already has all required artwork");
        return finish(events, title, target.kind(), SyncOutcome::AlreadyComplete, 0, 0, vec![]);
    }

    let _ = events.send(SyncEvent::FetchingSets {
        title: title.clone(),
    });
    let sets = match target.kind() {
        MediaKind::Show => source.show_sets(target.tmdb_id()).await,
        MediaKind::Movie => source.movie_sets(target.tmdb_id()).await,
        MediaKind::Collection => source.collection_sets(target.tmdb_id()).await,
    }
    .map_err(SyncError::set_fetch)?;

    let eligible = policy.select(sets);
    if eligible.is_empty() {
        log::info!("No eligible sets published for '{title}'");
        return finish(events, title, target.kind(), SyncOutcome::NoCandidates, 0, 0, vec![]);
    }

    let mut uploaded = 0;
    let mut failed = 0;
    let mut sets_used = Vec::new();
    for set in &eligible {
        let (set_uploaded, set_failed) =
            apply_entries(server, source, &mut state, set, kometa, &title, events).await?;
        if set_uploaded + set_failed > 0 {
            sets_used.push(format!("{} by {}", set.title, set.username));
        }
        uploaded += set_uploaded;
        failed += set_failed;
        if state.is_complete() {
            break;
        }
    }

    let outcome = if state.is_complete() {
        SyncOutcome::Complete
    } else {
        SyncOutcome::Partial {
            missing: state.missing(),
        }
    };
    finish(events, title, target.kind(), outcome, uploaded, failed, sets_used)
}

/// Apply one specific set to a target, skipping the eligibility policy.
/// Backs the `set` subcommand.
pub async fn apply_set<S: MediaServer, C: SetSource>(
    server: &S,
    source: &C,
    set: &CandidateSet,
    target: &LibraryTarget,
    kometa: bool,
    events: mpsc::UnboundedSender<SyncEvent>,
) -> Result<SyncReport, SyncError> {
    let events = &events;
    let title = target.title().to_owned();
    let _ = events.send(SyncEvent::TargetStarted {
        title: title.clone(),
    });

    let mut state = FulfillmentState::for_target(target);
    if state.is_complete() {
        return finish(events, title, target.kind(), SyncOutcome::AlreadyComplete, 0, 0, vec![]);
    }

    let (uploaded, failed) =
        apply_entries(server, source, &mut state, set, kometa, &title, events).await?;
    let sets_used = if uploaded + failed > 0 {
        vec![format!("{} by {}", set.title, set.username)]
    } else {
        Vec::new()
    };

    let outcome = if state.is_complete() {
        SyncOutcome::Complete
    } else {
        SyncOutcome::Partial {
            missing: state.missing(),
        }
    };
    finish(events, title, target.kind(), outcome, uploaded, failed, sets_used)
}

fn finish(
    events: &mpsc::UnboundedSender<SyncEvent>,
    title: String,
    kind: MediaKind,
    outcome: SyncOutcome,
    uploaded: u32,
    failed: u32,
    sets_used: Vec<String>,
) -> Result<SyncReport, SyncError> {
    let _ = events.send(SyncEvent::TargetFinished {
        title: title.clone(),
        outcome: outcome.clone(),
    });
    Ok(SyncReport {
        title,
        kind,
        outcome,
        uploaded,
        failed,
        sets_used,
    })
}

/// Walk one set's entries against the still-unfulfilled slots.
/// Returns (uploaded, failed) counts.
async fn apply_entries<S: MediaServer, C: SetSource>(
    server: &S,
    source: &C,
    state: &mut FulfillmentState,
    set: &CandidateSet,
    kometa: bool,
    title: &str,
    events: &mpsc::UnboundedSender<SyncEvent>,
) -> Result<(u32, u32), SyncError> {
    let mut uploaded = 0;
    let mut failed = 0;
    let mut announced = false;

    for entry in &set.entries {
        let Some(key) = state.resolve(entry.scope) else {
            continue;
        };
        if !state.needs(key, entry.kind) {
            continue;
        }
        if !announced {
            announced = true;
            log::info!("Using set '{}' by {} for '{title}'", set.title, set.username);
            let _ = events.send(SyncEvent::UsingSet {
                title: title.to_owned(),
                set_title: set.title.clone(),
                username: set.username.clone(),
            });
        }
        if apply_entry(server, source, state, key, entry, kometa, title, events).await? {
            uploaded += 1;
        } else {
            failed += 1;
        }
        if state.is_complete() {
            break;
        }
    }

    Ok((uploaded, failed))
}

/// Download one asset and push it to the server. Ok(false) means the
/// image failed but the pass may continue.
async fn apply_entry<S: MediaServer, C: SetSource>(
    server: &S,
    source: &C,
    state: &mut FulfillmentState,
    key: SlotKey,
    entry: &ArtworkEntry,
    kometa: bool,
    title: &str,
    events: &mpsc::UnboundedSender<SyncEvent>,
) -> Result<bool, SyncError> {
    let (item_id, label) = match state.slot(key) {
        Some(slot) => (slot.item_id().to_owned(), slot.label().to_owned()),
        None => return Ok(false),
    };

    let _ = events.send(SyncEvent::Uploading {
        title: title.to_owned(),
        label: label.clone(),
        kind: entry.kind,
    });

    let bytes = match source.download_asset(&entry.asset_id).await {
        Ok(bytes) => bytes,
        Err(err) if err.is_auth() => return Err(SyncError::auth(err)),
        Err(err) => {
            log::warn!("Failed to download {} for {label}: {err}", entry.kind);
            let _ = events.send(SyncEvent::ImageFailed {
                title: title.to_owned(),
                label,
                kind: entry.kind,
                message: err.to_string(),
            });
            return Ok(false);
        }
    };

    match server.upload_image(&item_id, entry.kind, &bytes).await {
        Ok(()) => {
            state.fulfill(key, entry.kind);
            log::debug!("Uploaded {} for {label}", entry.kind);
            if kometa {
                // label removal must never fail the upload
                if let Err(err) = server.remove_label(&item_id, KOMETA_OVERLAY_LABEL).await {
                    log::warn!("Failed to remove '{KOMETA_OVERLAY_LABEL}' label from {label}: {err}");
                }
            }
            Ok(true)
        }
        Err(err) if err.is_auth() => Err(SyncError::auth(err)),
        Err(err) => {
            log::warn!("Failed to upload {} for {label}: {err}", entry.kind);
            let _ = events.send(SyncEvent::ImageFailed {
                title: title.to_owned(),
                label,
                kind: entry.kind,
                message: err.to_string(),
            });
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use postersync_core::{
        ArtworkScope, Collection, Episode, ImageKind, ItemImages, Library, Movie, Season,
        ServiceError, Show, TmdbId,
    };

    use super::*;

    #[derive(Default)]
    struct MockServer {
        uploads: Mutex<Vec<(String, ImageKind)>>,
        labels_removed: Mutex<Vec<String>>,
        fail_items: Vec<String>,
        fail_labels: bool,
        auth_fail: bool,
    }

    impl MockServer {
        fn uploads(&self) -> Vec<(String, ImageKind)> {
            self.uploads.lock().unwrap().clone()
        }

        fn labels_removed(&self) -> Vec<String> {
            self.labels_removed.lock().unwrap().clone()
        }
    }

    impl MediaServer for MockServer {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn validate(&self) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn libraries(&self) -> Result<Vec<Library>, ServiceError> {
            Ok(Vec::new())
        }

        async fn shows(&self, _library: &Library) -> Result<Vec<Show>, ServiceError> {
            Ok(Vec::new())
        }

        async fn movies(&self, _library: &Library) -> Result<Vec<Movie>, ServiceError> {
            Ok(Vec::new())
        }

        async fn collections(&self, _library: &Library) -> Result<Vec<Collection>, ServiceError> {
            Ok(Vec::new())
        }

        async fn upload_image(
            &self,
            item_id: &str,
            kind: ImageKind,
            _bytes: &[u8],
        ) -> Result<(), ServiceError> {
            if self.auth_fail {
                return Err(ServiceError::auth("401"));
            }
            if self.fail_items.iter().any(|i| i == item_id) {
                return Err(ServiceError::api("500: upload rejected"));
            }
            self.uploads
                .lock()
                .unwrap()
                .push((item_id.to_owned(), kind));
            Ok(())
        }

        async fn remove_label(&self, item_id: &str, _label: &str) -> Result<(), ServiceError> {
            if self.fail_labels {
                return Err(ServiceError::api("label removal rejected"));
            }
            self.labels_removed.lock().unwrap().push(item_id.to_owned());
            Ok(())
        }
    }

    enum Listing {
        Ok,
        NetworkErr,
        AuthErr,
    }

    struct MockSource {
        sets: Vec<CandidateSet>,
        downloads: Mutex<Vec<String>>,
        fail_assets: Vec<String>,
        listing: Listing,
    }

    impl MockSource {
        fn new(sets: Vec<CandidateSet>) -> Self {
            Self {
                sets,
                downloads: Mutex::new(Vec::new()),
                fail_assets: Vec::new(),
                listing: Listing::Ok,
            }
        }

        fn downloads(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }

        fn list(&self) -> Result<Vec<CandidateSet>, ServiceError> {
            match self.listing {
                Listing::Ok => Ok(self.sets.clone()),
                Listing::NetworkErr => Err(ServiceError::network("connection refused")),
                Listing::AuthErr => Err(ServiceError::auth("403")),
            }
        }
    }

    impl SetSource for MockSource {
        async fn validate(&self) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn show_sets(&self, _tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError> {
            self.list()
        }

        async fn movie_sets(&self, _tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError> {
            self.list()
        }

        async fn collection_sets(
            &self,
            _tmdb_id: TmdbId,
        ) -> Result<Vec<CandidateSet>, ServiceError> {
            self.list()
        }

        async fn get_set(&self, set_id: u64) -> Result<CandidateSet, ServiceError> {
            self.sets
                .iter()
                .find(|s| s.id == set_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(format!("set {set_id}")))
        }

        async fn download_asset(&self, asset_id: &str) -> Result<Vec<u8>, ServiceError> {
            self.downloads.lock().unwrap().push(asset_id.to_owned());
            if self.fail_assets.iter().any(|a| a == asset_id) {
                return Err(ServiceError::network("asset fetch failed"));
            }
            Ok(vec![0xff, 0xd8, 0xff])
        }
    }

    fn entry(asset: &str, kind: ImageKind, scope: ArtworkScope) -> ArtworkEntry {
        ArtworkEntry {
            asset_id: asset.to_owned(),
            kind,
            scope,
        }
    }

    fn cset(id: u64, username: &str, entries: Vec<ArtworkEntry>) -> CandidateSet {
        CandidateSet {
            id,
            title: format!("Set {id}"),
            username: username.to_owned(),
            media_kind: MediaKind::Show,
            tmdb_id: TmdbId(100),
            updated: None,
            entries,
        }
    }

    fn bare_show() -> LibraryTarget {
        LibraryTarget::Show(Show {
            item_id: "show-1".into(),
            tmdb_id: TmdbId(100),
            title: "Example".into(),
            year: Some(2020),
            images: ItemImages::default(),
            seasons: Vec::new(),
        })
    }

    /// A show whose only gap is the S01E01 title card.
    fn show_missing_one_titlecard() -> LibraryTarget {
        let stocked = ItemImages {
            poster: true,
            backdrop: true,
            title_card: true,
        };
        LibraryTarget::Show(Show {
            item_id: "show-1".into(),
            tmdb_id: TmdbId(100),
            title: "Example".into(),
            year: Some(2020),
            images: stocked,
            seasons: vec![Season {
                item_id: "season-1".into(),
                number: 1,
                images: stocked,
                episodes: vec![Episode {
                    item_id: "ep-1".into(),
                    number: 1,
                    title: "Pilot".into(),
                    images: ItemImages::default(),
                }],
            }],
        })
    }

    fn events() -> (
        mpsc::UnboundedSender<SyncEvent>,
        mpsc::UnboundedReceiver<SyncEvent>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn complete_target_touches_nothing() {
        let target = LibraryTarget::Movie(Movie {
            item_id: "movie-1".into(),
            tmdb_id: TmdbId(42),
            title: "Feature".into(),
            year: None,
            images: ItemImages {
                poster: true,
                backdrop: true,
                title_card: false,
            },
        });
        let server = MockServer::default();
        let source = MockSource::new(vec![cset(
            1,
            "alice",
            vec![entry(
                "a1",
                ImageKind::Poster,
                ArtworkScope::Movie {
                    tmdb_id: TmdbId(42),
                },
            )],
        )]);
        let (tx, _rx) = events();

        let report = reconcile(&server, &source, &SyncPolicy::default(), &target, false, tx.clone())
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::AlreadyComplete);
        assert!(source.downloads().is_empty());
        assert!(server.uploads().is_empty());
    }

    #[tokio::test]
    async fn single_set_completes_a_show() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![set]);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.uploaded, 2);
        assert_eq!(
            server.uploads(),
            vec![
                ("show-1".to_owned(), ImageKind::Poster),
                ("show-1".to_owned(), ImageKind::Backdrop),
            ]
        );
    }

    #[tokio::test]
    async fn upload_failure_never_reports_complete() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer {
            fail_items: vec!["show-1".into()],
            ..MockServer::default()
        };
        let source = MockSource::new(vec![set]);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        match &report.outcome {
            SyncOutcome::Partial { missing } => assert_eq!(missing.len(), 2),
            other => panic!("expected partial, got {other:?}"),
        }
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn download_failure_is_contained() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("bad-asset", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let mut source = MockSource::new(vec![set]);
        source.fail_assets = vec!["bad-asset".into()];
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.failed, 1);
        match &report.outcome {
            SyncOutcome::Partial { missing } => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].kind, ImageKind::Poster);
            }
            other => panic!("expected partial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn excluded_publishers_assets_are_never_fetched() {
        let excluded = cset(
            1,
            "badactor",
            vec![entry(
                "excluded-titlecard",
                ImageKind::TitleCard,
                ArtworkScope::Episode {
                    season: 1,
                    episode: 1,
                },
            )],
        );
        let good = cset(
            2,
            "alice",
            vec![entry(
                "good-titlecard",
                ImageKind::TitleCard,
                ArtworkScope::Episode {
                    season: 1,
                    episode: 1,
                },
            )],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![excluded, good]);
        let policy = SyncPolicy::new(vec!["BadActor".into()], vec![], false);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &policy,
            &show_missing_one_titlecard(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(source.downloads(), vec!["good-titlecard".to_owned()]);
        assert_eq!(
            server.uploads(),
            vec![("ep-1".to_owned(), ImageKind::TitleCard)]
        );
    }

    #[tokio::test]
    async fn priority_publisher_wins_over_publish_order() {
        let first_published = cset(
            1,
            "bob",
            vec![entry("bob-poster", ImageKind::Poster, ArtworkScope::Show)],
        );
        let priority = cset(
            2,
            "alice",
            vec![
                entry("alice-poster", ImageKind::Poster, ArtworkScope::Show),
                entry("alice-backdrop", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![first_published, priority]);
        let policy = SyncPolicy::new(vec![], vec!["alice".into()], false);
        let (tx, _rx) = events();

        let report = reconcile(&server, &source, &policy, &bare_show(), false, tx.clone())
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        // alice's set satisfied everything, bob's was never needed
        assert_eq!(
            source.downloads(),
            vec!["alice-poster".to_owned(), "alice-backdrop".to_owned()]
        );
    }

    #[tokio::test]
    async fn only_priority_with_empty_list_yields_no_candidates() {
        let set = cset(
            1,
            "alice",
            vec![entry("poster-1", ImageKind::Poster, ArtworkScope::Show)],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![set]);
        let policy = SyncPolicy::new(vec![], vec![], true);
        let (tx, _rx) = events();

        let report = reconcile(&server, &source, &policy, &bare_show(), false, tx.clone())
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::NoCandidates);
        assert!(source.downloads().is_empty());
    }

    #[tokio::test]
    async fn later_sets_fill_remaining_gaps() {
        let partial = cset(
            1,
            "alice",
            vec![entry("alice-poster", ImageKind::Poster, ArtworkScope::Show)],
        );
        let rest = cset(
            2,
            "bob",
            vec![
                entry("bob-poster", ImageKind::Poster, ArtworkScope::Show),
                entry("bob-backdrop", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![partial, rest]);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        // poster from the first set, backdrop from the second; bob's
        // poster was skipped because the kind was already fulfilled
        assert_eq!(
            source.downloads(),
            vec!["alice-poster".to_owned(), "bob-backdrop".to_owned()]
        );
        assert_eq!(report.sets_used.len(), 2);
    }

    #[tokio::test]
    async fn auth_rejection_is_fatal() {
        let server = MockServer::default();
        let mut source = MockSource::new(Vec::new());
        source.listing = Listing::AuthErr;
        let (tx, _rx) = events();

        let err = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn listing_failure_is_not_fatal() {
        let server = MockServer::default();
        let mut source = MockSource::new(Vec::new());
        source.listing = Listing::NetworkErr;
        let (tx, _rx) = events();

        let err = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, SyncError::SetFetch(_)));
    }

    #[tokio::test]
    async fn kometa_label_removal_follows_uploads() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![set]);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            true,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(
            server.labels_removed(),
            vec!["show-1".to_owned(), "show-1".to_owned()]
        );
    }

    #[tokio::test]
    async fn kometa_label_failure_does_not_fail_uploads() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer {
            fail_labels: true,
            ..MockServer::default()
        };
        let source = MockSource::new(vec![set]);
        let (tx, _rx) = events();

        let report = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            true,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.uploaded, 2);
    }

    #[tokio::test]
    async fn apply_set_skips_the_policy() {
        // publisher would be excluded by a sweep policy; direct set
        // application uses it anyway
        let set = cset(
            1,
            "badactor",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![set.clone()]);
        let (tx, _rx) = events();

        let report = apply_set(&server, &source, &set, &bare_show(), false, tx.clone())
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.uploaded, 2);
    }

    #[tokio::test]
    async fn rerun_after_completion_is_a_no_op() {
        let set = cset(
            1,
            "alice",
            vec![
                entry("poster-1", ImageKind::Poster, ArtworkScope::Show),
                entry("backdrop-1", ImageKind::Backdrop, ArtworkScope::Show),
            ],
        );
        let server = MockServer::default();
        let source = MockSource::new(vec![set]);
        let (tx, _rx) = events();

        let first = reconcile(
            &server,
            &source,
            &SyncPolicy::default(),
            &bare_show(),
            false,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(first.outcome, SyncOutcome::Complete);

        // the next run sees the uploaded artwork in the inventory
        let synced = LibraryTarget::Show(Show {
            item_id: "show-1".into(),
            tmdb_id: TmdbId(100),
            title: "Example".into(),
            year: Some(2020),
            images: ItemImages {
                poster: true,
                backdrop: true,
                title_card: false,
            },
            seasons: Vec::new(),
        });
        let second = reconcile(&server, &source, &SyncPolicy::default(), &synced, false, tx.clone())
            .await
            .unwrap();
        assert_eq!(second.outcome, SyncOutcome::AlreadyComplete);
        assert_eq!(server.uploads().len(), 2);
        assert_eq!(source.downloads().len(), 2);
    }
}
