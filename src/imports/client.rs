// RAWG catalog-import client
//
// RAWG is the seed source for the catalog: an admin names a title, we
// take the provider's best match and create the game from it. Pricing
// and ratings are filled in afterwards by their own pipelines.

use axum::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;

/// Errors from the catalog-import provider
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("import provider returned {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
}

/// A game as described by the import provider, before it becomes a
/// catalog record
#[derive(Debug, Clone)]
pub struct ImportedGame {
    pub title: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub release_date: Option<NaiveDate>,
}

/// Search seam over the import provider
#[async_trait]
pub trait GameImportSource: Send + Sync {
    /// Provider matches for a title, best match first
    async fn search(&self, title: &str) -> Result<Vec<ImportedGame>, ImportError>;
}

#[derive(Debug, Deserialize)]
struct RawgSearchResponse {
    #[serde(default)]
    results: Vec<RawgGame>,
}

#[derive(Debug, Deserialize)]
struct RawgGame {
    name: String,
    background_image: Option<String>,
    released: Option<NaiveDate>,
    #[serde(default)]
    genres: Vec<RawgGenre>,
}

#[derive(Debug, Deserialize)]
struct RawgGenre {
    name: String,
}

impl From<RawgGame> for ImportedGame {
    fn from(game: RawgGame) -> Self {
        Self {
            title: game.name,
            cover_url: game.background_image,
            genres: game.genres.into_iter().map(|genre| genre.name).collect(),
            release_date: game.released,
        }
    }
}

/// RAWG search client
#[derive(Clone)]
pub struct RawgClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RawgClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.rawg_api_url.trim_end_matches('/').to_string(),
            api_key: config.rawg_api_key.clone(),
        }
    }
}

#[async_trait]
impl GameImportSource for RawgClient {
    async fn search(&self, title: &str) -> Result<Vec<ImportedGame>, ImportError> {
        let response = self
            .http
            .get(format!("{}/games", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("search", title),
                ("page_size", "5"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Status {
                endpoint: "games",
                status,
            });
        }

        let body: RawgSearchResponse = response.json().await?;
        Ok(body.results.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_provider_payload_onto_the_import_model() {
        let payload = r#"{
            "results": [{
                "name": "Hollow Knight",
                "background_image": "https://media.rawg.io/media/games/hk.jpg",
                "released": "2017-02-24",
                "genres": [{"name": "Platformer"}, {"name": "Indie"}]
            }]
        }"#;

        let parsed: RawgSearchResponse = serde_json::from_str(payload).unwrap();
        let imported: ImportedGame = parsed.results.into_iter().next().unwrap().into();

        assert_eq!(imported.title, "Hollow Knight");
        assert_eq!(
            imported.cover_url.as_deref(),
            Some("https://media.rawg.io/media/games/hk.jpg")
        );
        assert_eq!(imported.genres, vec!["Platformer", "Indie"]);
        assert_eq!(
            imported.release_date,
            NaiveDate::from_ymd_opt(2017, 2, 24)
        );
    }

    #[test]
    fn tolerates_sparse_provider_records() {
        let payload = r#"{"results": [{"name": "Obscure Jam Game"}]}"#;

        let parsed: RawgSearchResponse = serde_json::from_str(payload).unwrap();
        let imported: ImportedGame = parsed.results.into_iter().next().unwrap().into();

        assert_eq!(imported.title, "Obscure Jam Game");
        assert!(imported.cover_url.is_none());
        assert!(imported.genres.is_empty());
        assert!(imported.release_date.is_none());
    }
}
