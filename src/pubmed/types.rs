use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ESearchResponse {
    pub esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct ESearchResult {
    #[serde(default)]
    pub idlist: Vec<String>,
}

/// `result` maps each requested uid to its summary, next to a `uids` array.
#[derive(Debug, Deserialize)]
pub struct ESummaryResponse {
    pub result: Option<HashMap<String, serde_json::Value>>,
}

impl ESummaryResponse {
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.result
            .as_ref()?
            .get(id)?
            .get("title")?
            .as_str()
    }
}
