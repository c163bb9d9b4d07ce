use reqwest::{Client, Url};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::page::PortalPage;
use crate::error::TariffError;

/// HTTP session with the tariff portal
///
/// Holds the cookie jar and the last rendered page. Every selection posts the
/// form back the way the browser does when a dropdown changes. Dropping the
/// session releases the client's connection pool and cookie jar and takes it
/// off the `live` count it was opened with.
pub struct PortalSession {
    client: Client,
    url: Url,
    page: Option<PortalPage>,
    requests: usize,
    live: Arc<AtomicUsize>,
}

impl PortalSession {
    pub fn open(
        url: &str,
        timeout: Duration,
        user_agent: &str,
        live: Arc<AtomicUsize>,
    ) -> Result<Self, TariffError> {
        let url = Url::parse(url)
            .map_err(|e| TariffError::Extraction(format!("invalid portal URL '{}': {}", url, e)))?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TariffError::Extraction(format!("failed to build HTTP client: {}", e)))?;

        live.fetch_add(1, Ordering::SeqCst);
        debug!(url = %url, "Portal session opened");
        Ok(Self {
            client,
            url,
            page: None,
            requests: 0,
            live,
        })
    }

    /// Load the portal's start page
    pub async fn load(&mut self) -> Result<&PortalPage, TariffError> {
        let response = self.client.get(self.url.clone()).send().await?;
        self.accept(response).await
    }

    /// Choose `value` in the dropdown labelled `label`
    pub async fn select(&mut self, label: &str, value: &str) -> Result<&PortalPage, TariffError> {
        let page = self.page()?;
        let dropdown = page.dropdown(label)?;
        if !dropdown.offers(value) {
            return Err(TariffError::Extraction(format!(
                "option '{}' is not offered by the '{}' dropdown (available: {})",
                value,
                label,
                dropdown.options.join(", ")
            )));
        }

        let fields = page.postback_fields(&dropdown.name, value);
        let target = match page.action.as_deref() {
            Some(action) if !action.is_empty() => self.url.join(action).map_err(|e| {
                TariffError::Extraction(format!("invalid form action '{}': {}", action, e))
            })?,
            _ => self.url.clone(),
        };

        debug!(label, value, target = %target, "Posting back dropdown change");
        let response = self.client.post(target).form(&fields).send().await?;
        self.accept(response).await
    }

    pub fn page(&self) -> Result<&PortalPage, TariffError> {
        self.page
            .as_ref()
            .ok_or_else(|| TariffError::Extraction("portal page not loaded".to_string()))
    }

    async fn accept(&mut self, response: reqwest::Response) -> Result<&PortalPage, TariffError> {
        self.requests += 1;

        let status = response.status();
        if !status.is_success() {
            return Err(TariffError::Extraction(format!(
                "portal responded with HTTP {}",
                status
            )));
        }

        // Postbacks answer from the form's action URL
        self.url = response.url().clone();
        let body = response.text().await?;
        let page = PortalPage::parse(body)?;

        Ok(self.page.insert(page))
    }
}

impl Drop for PortalSession {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(url = %self.url, requests = self.requests, "Portal session closed");
    }
}
