use reqwest::StatusCode;
use tracing::{error, info};

use crate::error::ApiError;
use crate::metrics::{CRM_ERRORS_TOTAL, CRM_FORWARDED_TOTAL};
use crate::models::{ApplicationForm, LeadForm};

// Retry text shown to the client when the corresponding endpoint's
// forwarding fails
pub const SUBMIT_FAILED: &str = "Failed to submit application. Please try again later.";
pub const UPDATE_FAILED: &str = "Failed to update application. Please try again later.";

// Thin client for the CRM candidates API
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CrmClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    // New lead: POST {base_url}
    pub async fn create_lead(&self, form: &LeadForm) -> Result<serde_json::Value, ApiError> {
        let request = self.client.post(&self.base_url).json(form);
        self.send("create_lead", SUBMIT_FAILED, request).await
    }

    // Existing candidate identified by token: PUT {base_url}/{token}
    pub async fn update_candidate(
        &self,
        token: &str,
        form: &ApplicationForm,
    ) -> Result<serde_json::Value, ApiError> {
        let request = self
            .client
            .put(format!("{}/{}", self.base_url, token))
            .json(form);
        self.send("update_candidate", UPDATE_FAILED, request).await
    }

    async fn send(
        &self,
        operation: &'static str,
        failure_message: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                CRM_ERRORS_TOTAL.inc();
                error!(operation, error = %e, "CRM request failed");
                ApiError::CrmUnreachable {
                    message: failure_message,
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            CRM_ERRORS_TOTAL.inc();
            // Upstream bodies can contain candidate data, keep them out of
            // client responses
            let body = response.text().await.unwrap_or_default();
            error!(operation, %status, %body, "CRM rejected the request");
            return Err(ApiError::CrmRejected {
                message: failure_message,
            });
        }

        let data = parse_body(response, status, failure_message).await?;
        CRM_FORWARDED_TOTAL.inc();
        info!(operation, %status, "forwarded to CRM");
        Ok(data)
    }
}

async fn parse_body(
    response: reqwest::Response,
    status: StatusCode,
    failure_message: &'static str,
) -> Result<serde_json::Value, ApiError> {
    response.json().await.map_err(|e| {
        CRM_ERRORS_TOTAL.inc();
        error!(%status, error = %e, "CRM returned a non-JSON body");
        ApiError::CrmRejected {
            message: failure_message,
        }
    })
}
