//! PubMed E-utilities: identifier search and article summaries.

pub mod types;

use reqwest::Client;
use tracing::debug;
use url::Url;

use types::{ESearchResponse, ESummaryResponse};

const API_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
/// Appended to every search term to bias results toward medicinal literature.
const QUERY_QUALIFIER: &str = "medicinal";
pub const DEFAULT_RETMAX: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum PubMedError {
    #[error("PubMed request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("PubMed request failed: status {0}")]
    Status(u16),

    #[error("invalid PubMed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no title in summary for {0}")]
    MissingTitle(String),
}

/// Searchable index of article records.
pub trait LiteratureIndex {
    /// Identifiers for `query` in relevance order, at most `retmax` of them.
    fn search_ids(
        &self,
        query: &str,
        retmax: u32,
    ) -> impl Future<Output = Result<Vec<String>, PubMedError>> + Send;

    fn fetch_title(&self, id: &str) -> impl Future<Output = Result<String, PubMedError>> + Send;
}

#[derive(Clone)]
pub struct PubMedClient {
    http: Client,
    base_url: String,
}

impl PubMedClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, PubMedError> {
        let mut url = Url::parse(&format!("{}/{name}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("db", "pubmed")
            .extend_pairs(params)
            .append_pair("retmode", "json");
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, PubMedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PubMedError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

impl LiteratureIndex for PubMedClient {
    async fn search_ids(&self, query: &str, retmax: u32) -> Result<Vec<String>, PubMedError> {
        let term = format!("{query} {QUERY_QUALIFIER}");
        let retmax = retmax.to_string();
        let url = self.endpoint(
            "esearch.fcgi",
            &[("term", term.as_str()), ("retmax", retmax.as_str())],
        )?;

        let body: ESearchResponse = self.get_json(url).await?;
        let ids = body.esearchresult.map(|r| r.idlist).unwrap_or_default();
        debug!(%term, count = ids.len(), "esearch complete");
        Ok(ids)
    }

    async fn fetch_title(&self, id: &str) -> Result<String, PubMedError> {
        let url = self.endpoint("esummary.fcgi", &[("id", id)])?;
        let body: ESummaryResponse = self.get_json(url).await?;
        body.title_of(id)
            .map(str::to_string)
            .ok_or_else(|| PubMedError::MissingTitle(id.to_string()))
    }
}
