#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::IntoResponse;
use setlist_api::error::{AppError, AppResult};
use setlist_api::service::SetlistService;
use setlist_client::api::SetlistApi;
use setlist_client::error::{ClientError, ClientResult};
use setlist_client::selection::MemorySelectionStore;
use setlist_client::sync::{Notice, Synchronizer};
use setlist_core::models::{
    CopySetlist, CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, SongPosition,
    UpdateSetlist, UpdateSong,
};
use setlist_core::types::DbId;
use setlist_db::MemoryStore;
use setlist_events::EventBus;
use tokio::sync::mpsc;

/// Debounce delay used by synchronizer tests.
pub const DEBOUNCE: Duration = Duration::from_millis(50);

/// Long enough for a debounced edit to be submitted and answered.
pub const SETTLE: Duration = Duration::from_millis(300);

/// [`SetlistApi`] served in-process by a [`SetlistService`].
///
/// Errors go through the server's real `IntoResponse` mapping, so the
/// client sees the same status and body it would over HTTP.
pub struct ServiceApi {
    service: Arc<SetlistService>,
    calls: Mutex<HashMap<&'static str, usize>>,
    latency: Mutex<Duration>,
}

impl ServiceApi {
    pub fn new(service: Arc<SetlistService>) -> Self {
        Self {
            service,
            calls: Mutex::new(HashMap::new()),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// Delay every title update by `latency` before it reaches the service.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    async fn lag(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// How many times `operation` was called.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
    }
}

async fn lift<T>(result: AppResult<T>) -> ClientResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(to_client_error(err).await),
    }
}

async fn to_client_error(err: AppError) -> ClientError {
    let response = err.into_response();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    ClientError::Api {
        status,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

#[async_trait]
impl SetlistApi for ServiceApi {
    async fn list_setlists(&self) -> ClientResult<Vec<Setlist>> {
        self.record("list_setlists");
        lift(self.service.list_setlists().await).await
    }

    async fn get_setlist(&self, id: DbId) -> ClientResult<SetlistWithSongs> {
        self.record("get_setlist");
        lift(self.service.get_setlist(id).await).await
    }

    async fn create_setlist(&self, input: &CreateSetlist) -> ClientResult<Setlist> {
        self.record("create_setlist");
        lift(self.service.create_setlist(input.clone()).await).await
    }

    async fn copy_setlist(&self, id: DbId, input: &CopySetlist) -> ClientResult<SetlistWithSongs> {
        self.record("copy_setlist");
        lift(self.service.copy_setlist(id, input.clone()).await).await
    }

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> ClientResult<Setlist> {
        self.record("update_setlist");
        self.lag().await;
        lift(self.service.update_setlist(id, input.clone()).await).await
    }

    async fn clear_logo(&self, id: DbId) -> ClientResult<Setlist> {
        self.record("clear_logo");
        lift(self.service.clear_logo(id).await).await
    }

    async fn remove_setlist(&self, id: DbId) -> ClientResult<()> {
        self.record("remove_setlist");
        lift(self.service.remove_setlist(id).await).await
    }

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> ClientResult<Song> {
        self.record("add_song");
        lift(self.service.add_song(setlist_id, input.clone()).await).await
    }

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> ClientResult<Song> {
        self.record("update_song");
        self.lag().await;
        lift(
            self.service
                .update_song(setlist_id, song_id, input.clone())
                .await,
        )
        .await
    }

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> ClientResult<()> {
        self.record("delete_song");
        lift(self.service.delete_song(setlist_id, song_id).await).await
    }

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> ClientResult<Vec<Song>> {
        self.record("reorder_songs");
        lift(self.service.reorder_songs(setlist_id, positions).await).await
    }

    async fn clear_songs(&self, setlist_id: DbId) -> ClientResult<u64> {
        self.record("clear_songs");
        lift(self.service.clear_songs(setlist_id).await).await
    }
}

/// A synchronizer wired to an in-memory server.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<EventBus>,
    pub service: Arc<SetlistService>,
    pub api: Arc<ServiceApi>,
    pub selection: Arc<MemorySelectionStore>,
    pub sync: Synchronizer,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::remembering(None)
    }

    /// Start with `remembered` as the persisted selection.
    pub fn remembering(remembered: Option<DbId>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(EventBus::default());
        let service = Arc::new(SetlistService::new(store.clone(), Arc::clone(&bus)));
        let api = Arc::new(ServiceApi::new(Arc::clone(&service)));
        let selection = Arc::new(MemorySelectionStore::new(remembered));
        let (sync, notices) = Synchronizer::new(api.clone(), selection.clone(), DEBOUNCE);
        Self {
            store,
            bus,
            service,
            api,
            selection,
            sync,
            notices,
        }
    }

    pub async fn setlist(&self, title: &str) -> Setlist {
        self.service
            .create_setlist(CreateSetlist {
                title: Some(title.into()),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn song(&self, setlist_id: DbId, title: &str) -> Song {
        self.service
            .add_song(
                setlist_id,
                CreateSong {
                    title: title.into(),
                    position: None,
                },
            )
            .await
            .unwrap()
    }

    /// Song titles of the client's selected setlist, in display order.
    pub async fn local_titles(&self) -> Vec<String> {
        self.sync
            .state()
            .await
            .songs
            .into_iter()
            .map(|s| s.title)
            .collect()
    }

    /// Song titles as the server has them.
    pub async fn server_titles(&self, setlist_id: DbId) -> Vec<String> {
        self.service
            .get_setlist(setlist_id)
            .await
            .unwrap()
            .songs
            .into_iter()
            .map(|s| s.title)
            .collect()
    }

    pub fn next_notice(&mut self) -> Notice {
        self.notices.try_recv().expect("expected a notice")
    }
}
