//! Full-text retrieval from the PMC Open Access BioC service and passage extraction.

mod parser;

pub use parser::parse_passages;

use parser::XML_DECL;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use tracing::debug;

const API_BASE: &str = "https://www.ncbi.nlm.nih.gov/research/bionlp/RESTful/pmcoa.cgi";
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 20_000_000;

#[derive(Debug, thiserror::Error)]
pub enum BiocError {
    #[error("BioC request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("BioC request failed: status {0}")]
    Status(u16),

    #[error("BioC response too large (>{0} bytes)")]
    TooLarge(usize),
}

/// Source of raw full-text markup for an article.
pub trait FullTextSource {
    /// `Ok(None)` when the service answered but had no XML document for `id`.
    fn fetch_document(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<String>, BiocError>> + Send;
}

#[derive(Clone)]
pub struct BiocClient {
    http: Client,
    base_url: String,
    max_bytes: usize,
}

impl BiocClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    async fn download(&self, id: &str) -> Result<String, BiocError> {
        let id = utf8_percent_encode(id, NON_ALPHANUMERIC);
        let url = format!("{}/BioC_xml/{id}/unicode", self.base_url);

        let mut response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BiocError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.max_bytes
        {
            return Err(BiocError::TooLarge(self.max_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_bytes {
                return Err(BiocError::TooLarge(self.max_bytes));
            }
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl FullTextSource for BiocClient {
    async fn fetch_document(&self, id: &str) -> Result<Option<String>, BiocError> {
        let body = self.download(id).await?;
        if body.trim().starts_with(XML_DECL) {
            debug!(id, bytes = body.len(), "BioC document fetched");
            Ok(Some(body))
        } else {
            debug!(id, "BioC response is not XML");
            Ok(None)
        }
    }
}
