// IGDB metadata client (Twitch credential exchange + company logo lookup)

use axum::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::metadata::error::MetadataError;
use crate::metadata::token_cache::{CatalogTokenCache, IssuedToken, TokenExchanger};

/// Client-credentials exchange against the Twitch identity endpoint
#[derive(Clone)]
pub struct TwitchAuthClient {
    http: Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
    expires_in: i64,
}

impl TwitchAuthClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            auth_url: config.twitch_auth_url.clone(),
            client_id: config.twitch_client_id.clone(),
            client_secret: config.twitch_client_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenExchanger for TwitchAuthClient {
    async fn exchange(&self) -> Result<IssuedToken, MetadataError> {
        let response = self
            .http
            .post(&self.auth_url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                endpoint: "oauth2/token",
                status,
            });
        }

        let token: TwitchTokenResponse = response.json().await?;
        Ok(IssuedToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IgdbCompany {
    #[allow(dead_code)]
    name: String,
    logo: Option<IgdbLogo>,
}

#[derive(Debug, Deserialize)]
struct IgdbLogo {
    url: String,
}

/// IGDB lookup used to enrich companies with a logo
///
/// Enrichment is strictly best-effort: any failure along the way (token
/// exchange, provider error, no match) degrades to `None` and the company
/// is stored without a logo.
pub struct IgdbClient {
    http: Client,
    api_url: String,
    client_id: String,
    tokens: CatalogTokenCache<TwitchAuthClient>,
}

impl IgdbClient {
    pub fn new(http: Client, config: &Config) -> Self {
        let auth = TwitchAuthClient::new(http.clone(), config);
        Self {
            http,
            api_url: config.igdb_api_url.trim_end_matches('/').to_string(),
            client_id: config.twitch_client_id.clone(),
            tokens: CatalogTokenCache::new(auth),
        }
    }

    /// Best-effort logo URL for a company name
    pub async fn find_company_logo(&self, name: &str) -> Option<String> {
        let token = match self.tokens.get_valid_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Metadata token unavailable, skipping logo lookup: {}", e);
                return None;
            }
        };

        match self.query_company(name, &token).await {
            Ok(logo) => logo,
            Err(e) => {
                warn!("Logo lookup failed for '{}': {}", name, e);
                None
            }
        }
    }

    async fn query_company(&self, name: &str, token: &str) -> Result<Option<String>, MetadataError> {
        // IGDB takes its query as a plain-text body
        let body = format!(
            "fields name, logo.url; where name ~ \"{}\" & logo != null; limit 1;",
            name.replace('"', "")
        );

        let response = self
            .http
            .post(format!("{}/companies", self.api_url))
            .header("Client-ID", &self.client_id)
            .bearer_auth(token)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                endpoint: "companies",
                status,
            });
        }

        let companies: Vec<IgdbCompany> = response.json().await?;
        Ok(companies
            .into_iter()
            .next()
            .and_then(|company| company.logo)
            .map(|logo| normalize_logo_url(&logo.url)))
    }
}

/// Normalize an IGDB image URL into something servable
///
/// The provider returns protocol-relative thumbnail URLs; upgrade the
/// scheme and swap the thumbnail size for the medium logo size.
fn normalize_logo_url(url: &str) -> String {
    let with_scheme = if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    };
    with_scheme.replace("t_thumb", "t_logo_med")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_protocol_relative_thumbnail_urls() {
        let url = "//images.igdb.com/igdb/image/upload/t_thumb/abc123.png";
        assert_eq!(
            normalize_logo_url(url),
            "https://images.igdb.com/igdb/image/upload/t_logo_med/abc123.png"
        );
    }

    #[test]
    fn leaves_absolute_urls_alone_except_for_size() {
        let url = "https://images.igdb.com/igdb/image/upload/t_thumb/abc123.png";
        assert_eq!(
            normalize_logo_url(url),
            "https://images.igdb.com/igdb/image/upload/t_logo_med/abc123.png"
        );
    }
}
