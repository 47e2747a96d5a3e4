//! DadosJusBr download client
//!
//! One GET per organ-month returning the organ's payroll as CSV text:
//! `<base_url>?anos=<year>&meses=<month>&orgaos=<id>`.

use async_trait::async_trait;
use std::time::Duration;

use extrateto_common::MesReferencia;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("extrateto-sync/", env!("CARGO_PKG_VERSION"));

/// Source of one organ's monthly CSV payload
///
/// Implemented by the HTTP client; tests substitute fixture sources.
#[async_trait]
pub trait OrgaoSource: Send + Sync {
    async fn fetch_csv(&self, orgao_id: &str, mes: MesReferencia) -> Result<String, FetchError>;
}

/// HTTP client for the upstream download endpoint
pub struct DadosJusBrClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DadosJusBrClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn network_error(&self, orgao_id: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                orgao: orgao_id.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                orgao: orgao_id.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl OrgaoSource for DadosJusBrClient {
    async fn fetch_csv(&self, orgao_id: &str, mes: MesReferencia) -> Result<String, FetchError> {
        let year = mes.year().to_string();
        let month = mes.month().to_string();

        tracing::debug!(orgao = %orgao_id, mes = %mes, url = %self.base_url, "Requesting organ CSV");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("anos", year.as_str()), ("meses", month.as_str()), ("orgaos", orgao_id)])
            .send()
            .await
            .map_err(|e| self.network_error(orgao_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                orgao: orgao_id.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.network_error(orgao_id, e))
    }
}
