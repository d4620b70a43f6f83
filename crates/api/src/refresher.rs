//! HTTP refresher: fetches a character's profile page and records a
//! snapshot of it.
//!
//! Parsing the page into character stats is handled elsewhere; this only
//! proves the page is reachable, stores what was fetched and stamps the
//! character as refreshed.

use std::time::Duration;

use async_trait::async_trait;
use mu_tracker_core::character::{CharacterRefresher, RefreshError};
use mu_tracker_core::hashing::sha256_hex;
use mu_tracker_core::types::DbId;
use mu_tracker_db::models::character::CreateCharacterSnapshot;
use mu_tracker_db::repositories::{CharacterRepo, CharacterSnapshotRepo};
use mu_tracker_db::DbPool;

pub struct HttpCharacterRefresher {
    client: reqwest::Client,
    pool: DbPool,
    timeout: Duration,
}

impl HttpCharacterRefresher {
    pub fn new(pool: DbPool, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mu-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            pool,
            timeout,
        })
    }

    fn fetch_error(&self, err: reqwest::Error) -> RefreshError {
        if err.is_timeout() {
            RefreshError::Timeout(self.timeout.as_secs())
        } else {
            RefreshError::Fetch(err.to_string())
        }
    }
}

#[async_trait]
impl CharacterRefresher for HttpCharacterRefresher {
    async fn refresh(&self, id: DbId, url: &str) -> Result<bool, RefreshError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(character_id = id, %status, "Character page returned non-success status");
            return Ok(false);
        }

        let body = response.bytes().await.map_err(|e| self.fetch_error(e))?;

        let snapshot = CreateCharacterSnapshot {
            character_id: id,
            http_status: status.as_u16() as i16,
            content_hash: sha256_hex(&body),
            content_length: body.len() as i64,
        };
        CharacterSnapshotRepo::insert(&self.pool, &snapshot)
            .await
            .map_err(|e| RefreshError::Store(e.to_string()))?;

        CharacterRepo::mark_refreshed(&self.pool, id)
            .await
            .map_err(|e| RefreshError::Store(e.to_string()))
    }
}
