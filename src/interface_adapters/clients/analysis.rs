use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{authorize, read_json, send, trim_base};
use crate::domain::{AnalysisApi, AnalyzeResult, ClientError};
use crate::interface_adapters::protocol::AnalyzeRequest;
use crate::use_cases::Session;

// Thin reqwest client for the analysis service. Its responses are not enveloped.
#[derive(Clone)]
pub struct AnalysisClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl AnalysisClient {
    pub fn new(
        base_url: impl AsRef<str>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: trim_base(base_url.as_ref()),
            session,
        })
    }
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn analyze(&self, content: &str) -> Result<AnalyzeResult, ClientError> {
        let url = format!("{}/api/analyze", self.base_url);
        let request = self.http.post(url).json(&AnalyzeRequest { content });
        let res = send(authorize(request, &self.session)).await?;
        read_json(res).await
    }
}
