//! Remote blob-store target (JSONBin-style API)
//!
//! `PUT {base}/b/{bin}` with the document plus `lastUpdated`;
//! `GET {base}/b/{bin}/latest` answers `{"record": <document>}`.

use super::StorageTarget;
use crate::ledger::LedgerDocument;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const JSONBIN_API_BASE: &str = "https://api.jsonbin.io/v3";
const API_KEY_HEADER: &str = "X-Master-Key";

#[derive(Clone)]
pub struct JsonBinTarget {
    client: Client,
    base_url: String,
    api_key: String,
    bin_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BinRecordOut<'a> {
    #[serde(flatten)]
    document: &'a LedgerDocument,
    last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
struct BinLatest {
    record: LedgerDocument,
}

impl JsonBinTarget {
    pub fn new(client: Client, base_url: &str, api_key: String, bin_id: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bin_id,
        }
    }

    #[inline]
    fn bin_url(&self) -> String {
        format!("{}/b/{}", self.base_url, self.bin_id)
    }
}

#[async_trait]
impl StorageTarget for JsonBinTarget {
    fn name(&self) -> &'static str {
        "jsonbin"
    }

    async fn save(&self, doc: &LedgerDocument) -> Result<()> {
        let body = BinRecordOut {
            document: doc,
            last_updated: Utc::now(),
        };

        let resp = self
            .client
            .put(self.bin_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .context("PUT bin failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("PUT bin {}: {}", status, text));
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<LedgerDocument>> {
        let resp = self
            .client
            .get(format!("{}/latest", self.bin_url()))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("GET bin failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GET bin {}: {}", status, text));
        }

        let latest = resp
            .json::<BinLatest>()
            .await
            .context("Failed to parse bin record")?;
        Ok(Some(latest.record))
    }
}
