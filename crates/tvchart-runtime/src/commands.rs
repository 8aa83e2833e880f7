use async_trait::async_trait;
use tvchart_api::traits::EpisodeMetadata;
use tvchart_api::{ConnectionError, ConnectionErrorKind};
use tvchart_core::models::{sort_by_title, EpisodeDescriptor, Library};

use crate::command::{Command, CommandContext, UndoableCommand};
use crate::error::CommandError;

/// Replace the library with a fresh full fetch. Returns the number of shows.
#[derive(Debug, Default)]
pub struct LoadData;

#[async_trait]
impl Command for LoadData {
    type Output = usize;

    async fn execute(&mut self, ctx: &CommandContext) -> Result<usize, CommandError> {
        let mut shows = ctx.backend.fetch_all_shows().await?;
        sort_by_title(&mut shows);
        let count = shows.len();
        *ctx.library.write().await = Library::new(shows);
        tracing::info!(count, "Library loaded");
        Ok(count)
    }
}

/// Look up catalog details for one episode.
#[derive(Debug)]
pub struct LoadMetadata {
    pub episode: EpisodeDescriptor,
}

impl LoadMetadata {
    pub fn new(episode: EpisodeDescriptor) -> Self {
        Self { episode }
    }
}

#[async_trait]
impl Command for LoadMetadata {
    type Output = EpisodeMetadata;

    async fn execute(&mut self, ctx: &CommandContext) -> Result<EpisodeMetadata, CommandError> {
        let catalog_id = {
            let library = ctx.library.read().await;
            library
                .find_episode(&self.episode)
                .and_then(|_| library.find_show(self.episode.show_id))
                .map(|show| show.catalog_id.clone())
                .ok_or(CommandError::EpisodeNotFound(self.episode))?
        };

        ctx.metadata
            .get_episode_metadata(&catalog_id, self.episode.season, self.episode.episode_index)
            .await
            .map_err(|e| {
                CommandError::from(ConnectionError::new(
                    ConnectionErrorKind::LoadShowMetadataFailed,
                    e,
                ))
            })
    }
}

/// Mark a single episode watched or unwatched.
#[derive(Debug)]
pub struct UpdateEpisodeStatus {
    pub episode: EpisodeDescriptor,
    pub watched: bool,
}

impl UpdateEpisodeStatus {
    pub fn new(episode: EpisodeDescriptor, watched: bool) -> Self {
        Self { episode, watched }
    }

    /// Submit `watched` for the episode, restoring the local flag to `previous` if the
    /// server rejects it. `previous` is `None` when the episode is not loaded.
    async fn submit(
        &self,
        ctx: &CommandContext,
        watched: bool,
        previous: Option<bool>,
    ) -> Result<(), CommandError> {
        let (on, off) = if watched {
            (vec![self.episode], Vec::new())
        } else {
            (Vec::new(), vec![self.episode])
        };
        if let Err(e) = ctx
            .backend
            .update_episode_status(self.episode.show_id, &on, &off)
            .await
        {
            tracing::warn!(episode = %self.episode, error = %e, "Status update failed, reverting");
            if let Some(previous) = previous {
                if ctx.set_watched(&self.episode, previous).await.is_none() {
                    tracing::debug!(episode = %self.episode, "Episode gone, nothing to restore");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl Command for UpdateEpisodeStatus {
    type Output = ();

    async fn execute(&mut self, ctx: &CommandContext) -> Result<(), CommandError> {
        let previous = ctx
            .set_watched(&self.episode, self.watched)
            .await
            .ok_or(CommandError::EpisodeNotFound(self.episode))?;
        self.submit(ctx, self.watched, Some(previous)).await
    }

    fn into_undoable(self: Box<Self>) -> Option<Box<dyn UndoableCommand>> {
        Some(self)
    }
}

#[async_trait]
impl UndoableCommand for UpdateEpisodeStatus {
    fn undo_description(&self) -> String {
        if self.watched {
            "Mark Episode Watched".into()
        } else {
            "Mark Episode Unwatched".into()
        }
    }

    /// An episode missing after a reload is still submitted, only the local flip is skipped.
    async fn undo(&mut self, ctx: &CommandContext) -> Result<(), CommandError> {
        let previous = ctx.set_watched(&self.episode, !self.watched).await;
        if previous.is_none() {
            tracing::debug!(episode = %self.episode, "Undoing status of an unloaded episode");
        }
        self.submit(ctx, !self.watched, previous).await
    }
}

/// Mark every unwatched episode up to and including `target` as watched.
#[derive(Debug)]
pub struct MarkWatchedUpTo {
    pub target: EpisodeDescriptor,
    /// Episodes this command actually changed; empty until executed.
    updated: Vec<EpisodeDescriptor>,
}

impl MarkWatchedUpTo {
    pub fn new(target: EpisodeDescriptor) -> Self {
        Self {
            target,
            updated: Vec::new(),
        }
    }

    pub fn updated(&self) -> &[EpisodeDescriptor] {
        &self.updated
    }
}

#[async_trait]
impl Command for MarkWatchedUpTo {
    /// The episodes that changed from unwatched to watched.
    type Output = Vec<EpisodeDescriptor>;

    async fn execute(
        &mut self,
        ctx: &CommandContext,
    ) -> Result<Vec<EpisodeDescriptor>, CommandError> {
        let show_id = self.target.show_id;
        self.updated = {
            let mut library = ctx.library.write().await;
            if library.find_episode(&self.target).is_none() {
                return Err(CommandError::EpisodeNotFound(self.target));
            }
            library
                .find_show_mut(show_id)
                .map(|show| show.mark_watched_up_to(self.target))
                .unwrap_or_default()
        };

        if let Err(e) = ctx
            .backend
            .update_episode_status(show_id, &self.updated, &[])
            .await
        {
            tracing::warn!(
                episode = %self.target,
                count = self.updated.len(),
                error = %e,
                "Bulk update failed, reverting"
            );
            ctx.set_all_watched(show_id, &self.updated, false).await;
            return Err(e.into());
        }
        Ok(self.updated.clone())
    }

    fn into_undoable(self: Box<Self>) -> Option<Box<dyn UndoableCommand>> {
        Some(self)
    }
}

#[async_trait]
impl UndoableCommand for MarkWatchedUpTo {
    fn undo_description(&self) -> String {
        let count = self.updated.len();
        format!(
            "Mark {count} Episode{} Watched",
            if count == 1 { "" } else { "s" }
        )
    }

    async fn undo(&mut self, ctx: &CommandContext) -> Result<(), CommandError> {
        let show_id = self.target.show_id;
        ctx.set_all_watched(show_id, &self.updated, false).await;

        if let Err(e) = ctx
            .backend
            .update_episode_status(show_id, &[], &self.updated)
            .await
        {
            tracing::warn!(episode = %self.target, error = %e, "Undo failed, restoring");
            ctx.set_all_watched(show_id, &self.updated, true).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;
    use tvchart_api::error::{ApiError, MetadataError, TransportError};
    use tvchart_api::traits::{Backend, MetadataService};
    use tvchart_core::codec::decode_seasons;
    use tvchart_core::models::Show;

    use super::*;

    pub(crate) type Update = (i64, Vec<EpisodeDescriptor>, Vec<EpisodeDescriptor>);

    /// Backend double: serves a fixed show list and records status updates.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub(crate) shows: Mutex<Vec<Show>>,
        pub(crate) fail: AtomicBool,
        pub(crate) updates: Mutex<Vec<Update>>,
        pub(crate) gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        pub(crate) fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub(crate) fn updates(&self) -> Vec<Update> {
            self.updates.lock().unwrap().clone()
        }

        fn failure(kind: ConnectionErrorKind) -> ConnectionError {
            let cause = TransportError::NoReachableServers { causes: Vec::new() };
            ConnectionError::new(kind, ApiError::Transport(cause))
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn fetch_all_shows(&self) -> Result<Vec<Show>, ConnectionError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::failure(ConnectionErrorKind::LoadShowsFailed));
            }
            Ok(self.shows.lock().unwrap().clone())
        }

        async fn update_episode_status(
            &self,
            show_id: i64,
            watched: &[EpisodeDescriptor],
            unwatched: &[EpisodeDescriptor],
        ) -> Result<(), ConnectionError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::failure(ConnectionErrorKind::UpdateStatusFailed));
            }
            self.updates
                .lock()
                .unwrap()
                .push((show_id, watched.to_vec(), unwatched.to_vec()));
            Ok(())
        }
    }

    pub(crate) struct FakeMetadata;

    #[async_trait]
    impl MetadataService for FakeMetadata {
        async fn get_episode_metadata(
            &self,
            catalog_id: &str,
            season: u32,
            episode_index: u32,
        ) -> Result<EpisodeMetadata, MetadataError> {
            if catalog_id.is_empty() {
                return Err(MetadataError::Parse("no catalog id".into()));
            }
            Ok(EpisodeMetadata {
                season,
                episode: Some(episode_index + 1),
                title: format!("{catalog_id}-{season}-{episode_index}"),
                length: "30 min.".into(),
                synopsis: None,
            })
        }
    }

    pub(crate) fn show(id: i64, title: &str, season_maps: &[&str], watched: &[&str]) -> Show {
        Show::new(id, title, format!("tvm{id}"), decode_seasons(season_maps, watched).unwrap())
    }

    pub(crate) fn context_with(backend: FakeBackend) -> (CommandContext, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let ctx = CommandContext::new(backend.clone(), Arc::new(FakeMetadata));
        (ctx, backend)
    }

    /// Context with one show (id 1) already loaded.
    pub(crate) async fn loaded_context(
        season_maps: &[&str],
        watched: &[&str],
    ) -> (CommandContext, Arc<FakeBackend>) {
        let (ctx, backend) = context_with(FakeBackend::default());
        *ctx.library.write().await = Library::new(vec![show(1, "Severance", season_maps, watched)]);
        (ctx, backend)
    }

    async fn watched_map(ctx: &CommandContext, season: u32) -> String {
        let library = ctx.library.read().await;
        let show = library.find_show(1).unwrap();
        tvchart_core::codec::watched_map(show.season(season).unwrap())
    }

    #[tokio::test]
    async fn test_load_data_sorts_and_replaces_library() {
        let backend = FakeBackend::default();
        *backend.shows.lock().unwrap() = vec![
            show(1, "The Wire", &[".."], &[]),
            show(2, "Andor", &["..."], &[]),
        ];
        let (ctx, _) = context_with(backend);

        let count = LoadData.execute(&ctx).await.unwrap();
        assert_eq!(count, 2);
        let library = ctx.library.read().await;
        assert_eq!(library.shows()[0].title, "Andor");
        assert!(library.find_show(1).is_some());
    }

    #[tokio::test]
    async fn test_load_data_failure_keeps_library() {
        let (ctx, backend) = loaded_context(&[".."], &[]).await;
        backend.set_failing(true);

        let err = LoadData.execute(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Connection(ref e) if e.kind == ConnectionErrorKind::LoadShowsFailed
        ));
        assert_eq!(ctx.library.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_is_applied_before_server_answers() {
        let gate = Arc::new(Notify::new());
        let (ctx, _) = context_with(FakeBackend {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        *ctx.library.write().await = Library::new(vec![show(1, "Severance", &["..."], &[])]);

        let mut cmd = UpdateEpisodeStatus::new(EpisodeDescriptor::new(1, 1, 1), true);
        let (result, seen) = tokio::join!(cmd.execute(&ctx), async {
            let seen = watched_map(&ctx, 1).await;
            gate.notify_one();
            seen
        });
        result.unwrap();
        assert_eq!(seen, ".x.");
    }

    #[tokio::test]
    async fn test_update_status_reverts_on_failure() {
        let (ctx, backend) = loaded_context(&["..."], &[".x."]).await;
        backend.set_failing(true);

        for (index, watched) in [(0, true), (1, false)] {
            let mut cmd = UpdateEpisodeStatus::new(EpisodeDescriptor::new(1, 1, index), watched);
            let err = cmd.execute(&ctx).await.unwrap_err();
            assert!(matches!(err, CommandError::Connection(_)));
            assert_eq!(watched_map(&ctx, 1).await, ".x.");
        }
        assert!(backend.updates().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_submits_one_sided_batch() {
        let (ctx, backend) = loaded_context(&["..", "S."], &[]).await;
        let desc = EpisodeDescriptor::new(1, 2, 0);

        UpdateEpisodeStatus::new(desc, true).execute(&ctx).await.unwrap();
        UpdateEpisodeStatus::new(desc, false).execute(&ctx).await.unwrap();

        assert_eq!(
            backend.updates(),
            vec![(1, vec![desc], vec![]), (1, vec![], vec![desc])]
        );
        assert_eq!(watched_map(&ctx, 2).await, "..");
    }

    #[tokio::test]
    async fn test_update_status_undo_failure_restores_flag() {
        let (ctx, backend) = loaded_context(&["..."], &[]).await;
        let mut cmd = UpdateEpisodeStatus::new(EpisodeDescriptor::new(1, 1, 2), true);
        cmd.execute(&ctx).await.unwrap();
        assert_eq!(watched_map(&ctx, 1).await, "..x");

        backend.set_failing(true);
        assert!(cmd.undo(&ctx).await.is_err());
        assert_eq!(watched_map(&ctx, 1).await, "..x");

        backend.set_failing(false);
        cmd.undo(&ctx).await.unwrap();
        assert_eq!(watched_map(&ctx, 1).await, "...");
    }

    #[tokio::test]
    async fn test_undo_of_unloaded_episode_still_submits() {
        let (ctx, backend) = loaded_context(&["..."], &[]).await;
        let desc = EpisodeDescriptor::new(1, 1, 2);
        let mut cmd = UpdateEpisodeStatus::new(desc, true);
        cmd.execute(&ctx).await.unwrap();

        *ctx.library.write().await = Library::new(vec![show(1, "Severance", &[".."], &[])]);

        backend.set_failing(true);
        assert!(matches!(cmd.undo(&ctx).await, Err(CommandError::Connection(_))));
        assert_eq!(watched_map(&ctx, 1).await, "..");

        backend.set_failing(false);
        cmd.undo(&ctx).await.unwrap();
        assert_eq!(backend.updates().last().unwrap(), &(1, vec![], vec![desc]));
        assert_eq!(watched_map(&ctx, 1).await, "..");
    }

    #[tokio::test]
    async fn test_unknown_episode() {
        let (ctx, backend) = loaded_context(&[".."], &[]).await;
        let missing = EpisodeDescriptor::new(1, 1, 5);

        let err = UpdateEpisodeStatus::new(missing, true)
            .execute(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::EpisodeNotFound(d) if d == missing));

        let err = MarkWatchedUpTo::new(missing).execute(&ctx).await.unwrap_err();
        assert!(matches!(err, CommandError::EpisodeNotFound(_)));
        assert!(backend.updates().is_empty());
    }

    #[tokio::test]
    async fn test_mark_watched_up_to_records_only_changes() {
        let (ctx, backend) = loaded_context(&[".+.", "S..."], &["x.", ".x.."]).await;
        let target = EpisodeDescriptor::new(1, 2, 2);

        let mut cmd = MarkWatchedUpTo::new(target);
        let changed = cmd.execute(&ctx).await.unwrap();
        assert_eq!(
            changed,
            vec![
                EpisodeDescriptor::new(1, 1, 1),
                EpisodeDescriptor::new(1, 2, 0),
                EpisodeDescriptor::new(1, 2, 2),
            ]
        );
        assert_eq!(watched_map(&ctx, 1).await, "xx");
        assert_eq!(watched_map(&ctx, 2).await, "xxx.");
        assert_eq!(backend.updates(), vec![(1, changed.clone(), vec![])]);
        assert_eq!(cmd.undo_description(), "Mark 3 Episodes Watched");

        let mut again = MarkWatchedUpTo::new(target);
        assert!(again.execute(&ctx).await.unwrap().is_empty());
        assert_eq!(again.undo_description(), "Mark 0 Episodes Watched");
    }

    #[tokio::test]
    async fn test_mark_watched_up_to_reverts_only_recorded_on_failure() {
        let (ctx, backend) = loaded_context(&["...."], &[".x.x"]).await;
        backend.set_failing(true);

        let mut cmd = MarkWatchedUpTo::new(EpisodeDescriptor::new(1, 1, 2));
        assert!(cmd.execute(&ctx).await.is_err());
        assert_eq!(watched_map(&ctx, 1).await, ".x.x");
    }

    #[tokio::test]
    async fn test_mark_watched_up_to_undo() {
        let (ctx, backend) = loaded_context(&["...."], &[".x.."]).await;
        let mut cmd = MarkWatchedUpTo::new(EpisodeDescriptor::new(1, 1, 2));
        cmd.execute(&ctx).await.unwrap();
        assert_eq!(watched_map(&ctx, 1).await, "xxx.");

        backend.set_failing(true);
        assert!(cmd.undo(&ctx).await.is_err());
        assert_eq!(watched_map(&ctx, 1).await, "xxx.");

        backend.set_failing(false);
        cmd.undo(&ctx).await.unwrap();
        assert_eq!(watched_map(&ctx, 1).await, ".x..");
        let updates = backend.updates();
        assert_eq!(updates.last().unwrap().2, cmd.updated().to_vec());
        assert_eq!(cmd.undo_description(), "Mark 2 Episodes Watched");
    }

    #[tokio::test]
    async fn test_load_metadata() {
        let (ctx, _) = loaded_context(&["..", "..."], &[]).await;

        let meta = LoadMetadata::new(EpisodeDescriptor::new(1, 2, 1))
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(meta.title, "tvm1-2-1");

        let err = LoadMetadata::new(EpisodeDescriptor::new(1, 3, 0))
            .execute(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::EpisodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_metadata_failure_is_wrapped() {
        let (ctx, _) = context_with(FakeBackend::default());
        let mut s = show(4, "Untracked", &["."], &[]);
        s.catalog_id.clear();
        *ctx.library.write().await = Library::new(vec![s]);

        let err = LoadMetadata::new(EpisodeDescriptor::new(4, 1, 0))
            .execute(&ctx)
            .await
            .unwrap_err();
        match err {
            CommandError::Connection(e) => {
                assert_eq!(e.kind, ConnectionErrorKind::LoadShowMetadataFailed)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
