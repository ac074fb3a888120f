//! Pipeline driver.
//!
//! Sequences the per-game steps in a fixed order: cache check, fetch,
//! backup write, overlay composition. Progress events are pushed to an mpsc
//! channel for whatever surface is listening; the driver itself never
//! prints.

use tokio::sync::mpsc;
use tracing::info;

use steamgrid_grid::{FetchOutcome, Game, GridCache, OverlayMap, SourceResolver, apply_overlay};
use steamgrid_steam::{Paths, SteamError, User};

use crate::PipelineError;
use crate::report::{GameRef, RunReport};

/// Supplies each user's game library to the pipeline.
#[async_trait::async_trait]
pub trait GameSource: Send + Sync {
    async fn games(&self, user: &User) -> Result<Vec<Game>, SteamError>;
}

/// Progress signals emitted while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Coarse stage transition, not tied to a game counter.
    Status { status: String },
    /// Per-game progress within the current user's library.
    Progress {
        current: usize,
        total: usize,
        status: String,
    },
}

/// Runs the artwork pipeline for every user, one game at a time.
pub struct Pipeline {
    resolver: SourceResolver,
    overlays: OverlayMap,
    events_tx: mpsc::Sender<PipelineEvent>,
    events_rx: Option<mpsc::Receiver<PipelineEvent>>,
}

impl Pipeline {
    /// Creates a pipeline with a resolver and the overlays for this run.
    ///
    /// The overlay map is loaded once and read-only from here on.
    pub fn new(resolver: SourceResolver, overlays: OverlayMap) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            resolver,
            overlays,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<PipelineEvent>> {
        self.events_rx.take()
    }

    /// Processes every game of every user.
    ///
    /// Hard errors (unexpected HTTP statuses, undecodable images, filesystem
    /// failures) abort the whole run. Games without artwork anywhere are
    /// collected in the report instead.
    pub async fn run<S: GameSource>(
        &self,
        paths: &Paths,
        users: &[User],
        source: &S,
    ) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for user in users {
            self.status(format!("Loading games for {}", user.name)).await;
            let games = source.games(user).await?;
            info!(user = %user.name, games = games.len(), "library loaded");

            let cache = GridCache::new(paths.grid_dir(&user.steam_id32));
            let total = games.len();

            for (index, game) in games.into_iter().enumerate() {
                let current = index + 1;
                self.progress(
                    current,
                    total,
                    format!("Processing {} ({current}/{total})", game.display_label()),
                )
                .await;

                let (game, outcome) = cache.resolve_or_fetch(&self.resolver, game).await?;
                match outcome {
                    FetchOutcome::NotFound => {
                        report.not_found.push(GameRef::from(&game));
                        continue;
                    }
                    FetchOutcome::Found { from_search } => {
                        if from_search {
                            report.search_found.push(GameRef::from(&game));
                        }
                    }
                }

                apply_overlay(game, &self.overlays)?;
            }
        }

        Ok(report)
    }

    async fn status(&self, status: String) {
        let _ = self.events_tx.send(PipelineEvent::Status { status }).await;
    }

    async fn progress(&self, current: usize, total: usize, status: String) {
        let _ = self
            .events_tx
            .send(PipelineEvent::Progress {
                current,
                total,
                status,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn mock_server(status: u16, body: Vec<u8>) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = vec![0u8; 8192];
                let _ = stream.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, handle)
    }

    struct StubSource {
        games: Vec<Game>,
    }

    #[async_trait::async_trait]
    impl GameSource for StubSource {
        async fn games(&self, _user: &User) -> Result<Vec<Game>, SteamError> {
            Ok(self.games.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl GameSource for FailingSource {
        async fn games(&self, _user: &User) -> Result<Vec<Game>, SteamError> {
            Err(SteamError::ProfileNotFound)
        }
    }

    fn user() -> User {
        User {
            name: "Alice".into(),
            steam_id32: "123".into(),
            steam_id64: "76561197960265851".into(),
        }
    }

    fn game(id: &str, name: &str) -> Game {
        Game {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn resolver_with_primary(primary: &str) -> SourceResolver {
        SourceResolver::new().unwrap().with_bases(
            primary,
            "http://127.0.0.1:1",
            "http://127.0.0.1:1",
        )
    }

    fn offline_resolver() -> SourceResolver {
        resolver_with_primary("http://127.0.0.1:1")
    }

    fn steam_fixture() -> (tempfile::TempDir, Paths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        paths.ensure_grid_dir("123").unwrap();
        (tmp, paths)
    }

    #[tokio::test]
    async fn run_fetches_and_reports_clean() {
        let (_tmp, paths) = steam_fixture();
        let (url, handle) = mock_server(200, b"jpeg-bytes".to_vec()).await;

        let mut pipeline = Pipeline::new(resolver_with_primary(&url), OverlayMap::new());
        let mut events = pipeline.take_events().unwrap();

        let source = StubSource {
            games: vec![game("440", "Team Fortress 2")],
        };
        let report = pipeline.run(&paths, &[user()], &source).await.unwrap();

        assert!(report.is_clean());
        let grid_dir = paths.grid_dir("123");
        assert_eq!(fs::read(grid_dir.join("440.jpg")).unwrap(), b"jpeg-bytes");
        assert_eq!(
            fs::read(grid_dir.join("440 (original).jpg")).unwrap(),
            b"jpeg-bytes"
        );

        drop(pipeline);
        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            seen.push(event);
        }
        assert_eq!(
            seen[0],
            PipelineEvent::Status {
                status: "Loading games for Alice".into()
            }
        );
        assert_eq!(
            seen[1],
            PipelineEvent::Progress {
                current: 1,
                total: 1,
                status: "Processing Team Fortress 2 (1/1)".into()
            }
        );

        handle.abort();
    }

    #[tokio::test]
    async fn missing_artwork_is_recorded_not_fatal() {
        let (_tmp, paths) = steam_fixture();

        let mut pipeline = Pipeline::new(offline_resolver(), OverlayMap::new());
        drop(pipeline.take_events());

        let source = StubSource {
            games: vec![game("570", ""), game("440", "Team Fortress 2")],
        };
        // "440" has cached artwork already; only "570" should be missing.
        let grid_dir = paths.grid_dir("123");
        fs::write(grid_dir.join("440 (original).jpg"), b"cached").unwrap();

        let report = pipeline.run(&paths, &[user()], &source).await.unwrap();

        assert_eq!(report.not_found, vec![GameRef::from(&game("570", ""))]);
        assert!(report.search_found.is_empty());
    }

    #[tokio::test]
    async fn search_found_games_are_flagged() {
        let (_tmp, paths) = steam_fixture();

        let (image_url, h0) = mock_server(200, b"searched".to_vec()).await;
        let search_body = format!(
            r#"{{"responseData":{{"results":[{{"width":"460","height":"215","visibleUrl":"x","unescapedUrl":"{image_url}/grid.jpg"}}]}}}}"#
        );
        let (miss, h1) = mock_server(404, Vec::new()).await;
        let (search, h2) = mock_server(200, search_body.into_bytes()).await;
        let resolver =
            SourceResolver::new()
                .unwrap()
                .with_bases(miss.as_str(), miss.as_str(), search.as_str());

        let mut pipeline = Pipeline::new(resolver, OverlayMap::new());
        drop(pipeline.take_events());

        let source = StubSource {
            games: vec![game("999", "Obscure Game")],
        };
        let report = pipeline.run(&paths, &[user()], &source).await.unwrap();

        assert_eq!(report.search_found.len(), 1);
        assert_eq!(report.search_found[0].name, "Obscure Game");
        assert!(report.not_found.is_empty());

        h0.abort();
        h1.abort();
        h2.abort();
    }

    #[tokio::test]
    async fn hard_error_aborts_run() {
        let (_tmp, paths) = steam_fixture();
        let (url, handle) = mock_server(500, b"boom".to_vec()).await;

        let mut pipeline = Pipeline::new(resolver_with_primary(&url), OverlayMap::new());
        drop(pipeline.take_events());

        let source = StubSource {
            games: vec![game("440", "Team Fortress 2"), game("570", "Dota 2")],
        };
        let err = pipeline.run(&paths, &[user()], &source).await.unwrap_err();
        assert!(matches!(err, PipelineError::Grid(_)));

        handle.abort();
    }

    #[tokio::test]
    async fn game_source_error_aborts_run() {
        let (_tmp, paths) = steam_fixture();

        let mut pipeline = Pipeline::new(offline_resolver(), OverlayMap::new());
        drop(pipeline.take_events());

        let err = pipeline
            .run(&paths, &[user()], &FailingSource)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Steam(_)));
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let (_tmp, paths) = steam_fixture();
        let (url, handle) = mock_server(200, b"jpeg-bytes".to_vec()).await;

        let source = StubSource {
            games: vec![game("440", "Team Fortress 2")],
        };
        let grid_dir = paths.grid_dir("123");

        let mut pipeline = Pipeline::new(resolver_with_primary(&url), OverlayMap::new());
        drop(pipeline.take_events());
        pipeline.run(&paths, &[user()], &source).await.unwrap();
        let first_working = fs::read(grid_dir.join("440.jpg")).unwrap();
        let first_backup = fs::read(grid_dir.join("440 (original).jpg")).unwrap();

        // Second run resolves from the backup; no overlays change anything.
        pipeline.run(&paths, &[user()], &source).await.unwrap();
        assert_eq!(fs::read(grid_dir.join("440.jpg")).unwrap(), first_working);
        assert_eq!(
            fs::read(grid_dir.join("440 (original).jpg")).unwrap(),
            first_backup
        );

        handle.abort();
    }
}
