//! REST client for the setlist HTTP endpoints.
//!
//! [`SetlistApi`] is the seam the synchronizer talks to; [`HttpApi`]
//! implements it with [`reqwest`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use setlist_core::models::{
    ClearedSongs, CopySetlist, CreateSetlist, CreateSong, ReorderSongs, Setlist,
    SetlistWithSongs, Song, SongPosition, UpdateSetlist, UpdateSong,
};
use setlist_core::types::DbId;

use crate::error::{ClientError, ClientResult};

/// Remote operations on setlists and songs.
#[async_trait]
pub trait SetlistApi: Send + Sync {
    async fn list_setlists(&self) -> ClientResult<Vec<Setlist>>;

    async fn get_setlist(&self, id: DbId) -> ClientResult<SetlistWithSongs>;

    async fn create_setlist(&self, input: &CreateSetlist) -> ClientResult<Setlist>;

    async fn copy_setlist(&self, id: DbId, input: &CopySetlist) -> ClientResult<SetlistWithSongs>;

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> ClientResult<Setlist>;

    async fn clear_logo(&self, id: DbId) -> ClientResult<Setlist>;

    async fn remove_setlist(&self, id: DbId) -> ClientResult<()>;

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> ClientResult<Song>;

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> ClientResult<Song>;

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> ClientResult<()>;

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> ClientResult<Vec<Song>>;

    /// Delete every song of a setlist; returns how many were removed.
    async fn clear_songs(&self, setlist_id: DbId) -> ClientResult<u64>;
}

/// HTTP client for one setlist server.
pub struct HttpApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpApi {
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:3000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.api_url)
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, else an
    /// [`ClientError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SetlistApi for HttpApi {
    async fn list_setlists(&self) -> ClientResult<Vec<Setlist>> {
        let response = self.client.get(self.url("/setlists")).send().await?;
        Self::parse_response(response).await
    }

    async fn get_setlist(&self, id: DbId) -> ClientResult<SetlistWithSongs> {
        let response = self
            .client
            .get(self.url(&format!("/setlists/{id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create_setlist(&self, input: &CreateSetlist) -> ClientResult<Setlist> {
        let response = self
            .client
            .post(self.url("/setlists"))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn copy_setlist(&self, id: DbId, input: &CopySetlist) -> ClientResult<SetlistWithSongs> {
        let response = self
            .client
            .post(self.url(&format!("/setlists/{id}/copy")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> ClientResult<Setlist> {
        let response = self
            .client
            .put(self.url(&format!("/setlists/{id}")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn clear_logo(&self, id: DbId) -> ClientResult<Setlist> {
        let response = self
            .client
            .delete(self.url(&format!("/setlists/{id}/logo")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn remove_setlist(&self, id: DbId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/setlists/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> ClientResult<Song> {
        let response = self
            .client
            .post(self.url(&format!("/setlists/{setlist_id}/songs")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> ClientResult<Song> {
        let response = self
            .client
            .put(self.url(&format!("/setlists/{setlist_id}/songs/{song_id}")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/setlists/{setlist_id}/songs/{song_id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> ClientResult<Vec<Song>> {
        let body = ReorderSongs {
            songs: positions.to_vec(),
        };
        let response = self
            .client
            .put(self.url(&format!("/setlists/{setlist_id}/songs/reorder")))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn clear_songs(&self, setlist_id: DbId) -> ClientResult<u64> {
        let response = self
            .client
            .delete(self.url(&format!("/setlists/{setlist_id}/songs")))
            .send()
            .await?;
        let cleared: ClearedSongs = Self::parse_response(response).await?;
        Ok(cleared.deleted)
    }
}
