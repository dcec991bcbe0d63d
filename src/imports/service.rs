use tracing::info;

use crate::error::ApiError;
use crate::games::models::{CreateGameRequest, Game};
use crate::games::repository::{GameRepository, GameStore};
use crate::games::GameService;
use crate::imports::client::{GameImportSource, RawgClient};

/// Imports games into the catalog from the external provider
///
/// Creation goes through the regular catalog service, so an imported
/// game gets the same cache invalidation and initial price-sync request
/// as a hand-entered one.
#[derive(Clone)]
pub struct GameImportService<I: GameImportSource = RawgClient, S: GameStore = GameRepository> {
    source: I,
    games: GameService<S>,
}

impl<I: GameImportSource, S: GameStore> GameImportService<I, S> {
    /// Create a new GameImportService
    pub fn new(source: I, games: GameService<S>) -> Self {
        Self { source, games }
    }

    /// Import the provider's best match for a title
    ///
    /// Fails with 404 when the provider knows no such game and with 409
    /// when a game with the imported title already exists.
    pub async fn import_by_title(&self, title: &str) -> Result<Game, ApiError> {
        let matches = self
            .source
            .search(title)
            .await
            .map_err(|e| ApiError::InternalError(format!("Import provider unavailable: {}", e)))?;

        let best = matches.into_iter().next().ok_or_else(|| ApiError::NotFound {
            resource: "Importable game".to_string(),
            id: title.to_string(),
        })?;

        if self.games.find_by_title(&best.title).await?.is_some() {
            return Err(ApiError::Conflict {
                message: format!("Game '{}' already exists in the catalog", best.title),
            });
        }

        info!("Importing '{}' from the catalog provider", best.title);
        self.games
            .create_game(CreateGameRequest {
                title: best.title,
                description: None,
                cover_url: best.cover_url,
                genres: best.genres,
                company_id: None,
                release_date: best.release_date,
            })
            .await
    }
}
