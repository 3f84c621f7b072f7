//! Remote gist target (GitHub Gist API shape)
//!
//! The ledger is the content of one named file inside the gist.

use super::StorageTarget;
use crate::ledger::LedgerDocument;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

pub const GIST_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GIST_FILE: &str = "db.json";

#[derive(Clone)]
pub struct GistTarget {
    client: Client,
    base_url: String,
    token: String,
    gist_id: String,
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

impl GistTarget {
    pub fn new(
        client: Client,
        base_url: &str,
        token: String,
        gist_id: String,
        file_name: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            gist_id,
            file_name,
        }
    }

    #[inline]
    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.base_url, self.gist_id)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, "clubhouse-backend")
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String> {
        let resp = self
            .request(self.client.get(raw_url))
            .send()
            .await
            .context("GET gist raw file failed")?;
        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("GET gist raw file {}", resp.status()));
        }
        resp.text().await.context("Failed to read gist raw file")
    }
}

#[async_trait]
impl StorageTarget for GistTarget {
    fn name(&self) -> &'static str {
        "gist"
    }

    async fn save(&self, doc: &LedgerDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc).context("Failed to serialize ledger")?;
        let mut files = serde_json::Map::new();
        files.insert(self.file_name.clone(), json!({ "content": content }));
        let body = json!({ "files": files });

        let resp = self
            .request(self.client.patch(self.gist_url()))
            .json(&body)
            .send()
            .await
            .context("PATCH gist failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("PATCH gist {}: {}", status, text));
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<LedgerDocument>> {
        let resp = self
            .request(self.client.get(self.gist_url()))
            .send()
            .await
            .context("GET gist failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GET gist {}: {}", status, text));
        }

        let gist = resp
            .json::<GistResponse>()
            .await
            .context("Failed to parse gist response")?;
        let Some(file) = gist.files.get(&self.file_name) else {
            return Ok(None);
        };

        let content = match (&file.content, file.truncated, &file.raw_url) {
            (_, true, Some(raw_url)) => self.fetch_raw(raw_url).await?,
            (Some(content), _, _) => content.clone(),
            _ => return Ok(None),
        };

        let doc = serde_json::from_str(&content)
            .with_context(|| format!("Malformed ledger in gist file {}", self.file_name))?;
        Ok(Some(doc))
    }
}
