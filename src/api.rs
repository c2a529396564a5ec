//! Thin client over the athlete, activity list and activity update endpoints.
//!
//! All calls are sequential; nothing here retries.

use indicatif::ProgressBar;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::{AccessToken, Activity, ActivityUpdate, Athlete, StravaConfig, StravaError};

/// Filters for [`StravaClient::fetch_activities`]. Times are epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    pub after: Option<i64>,
    pub before: Option<i64>,
    pub activity_type: Option<String>,
}

impl ActivityQuery {
    pub fn window(after: i64, before: i64) -> Self {
        Self {
            after: Some(after),
            before: Some(before),
            activity_type: None,
        }
    }

    pub fn of_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct StravaClient {
    base_url: String,
    per_page: u32,
    token: AccessToken,
    http: Client,
}

impl StravaClient {
    pub fn new(config: &StravaConfig, token: AccessToken) -> Result<Self, StravaError> {
        Ok(Self::with_http_client(config, token, config.http_client()?))
    }

    pub fn with_http_client(config: &StravaConfig, token: AccessToken, http: Client) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            token,
            http,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.token.expose_secret())
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(self.token.expose_secret())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StravaError> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| StravaError::InvalidResponse {
            message: err.to_string(),
            body,
        })
    }

    pub async fn get_athlete(&self) -> Result<Athlete, StravaError> {
        self.execute_json(self.get("/athlete")).await
    }

    /// Requests one page of the activity list.
    ///
    /// `None` means the endpoint answered with something other than an array,
    /// which ends pagination the same way an empty page does.
    pub async fn list_activities_page(
        &self,
        page: u32,
        query: &ActivityQuery,
    ) -> Result<Option<Vec<Activity>>, StravaError> {
        let mut params = vec![
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(after) = query.after {
            params.push(("after", after.to_string()));
        }
        if let Some(before) = query.before {
            params.push(("before", before.to_string()));
        }

        let value: serde_json::Value = self
            .execute_json(self.get("/athlete/activities").query(&params))
            .await?;
        if !value.is_array() {
            tracing::warn!(page, "activity list returned a non-array body");
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Walks pages from 1 until an empty page, then applies the type filter.
    ///
    /// Provider ordering is kept; pages are concatenated in request order.
    pub async fn fetch_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<Activity>, StravaError> {
        let progress = ProgressBar::new_spinner();
        progress.set_message("Fetching activities...");

        let mut activities = Vec::new();
        let mut page = 1;
        loop {
            let batch = match self.list_activities_page(page, query).await {
                Ok(Some(batch)) if !batch.is_empty() => batch,
                Ok(_) => break,
                Err(err) => {
                    progress.abandon();
                    return Err(err);
                }
            };
            activities.extend(batch);
            tracing::debug!(page, total = activities.len(), "fetched activity page");
            progress.set_message(format!("Fetched {} activities...", activities.len()));
            page += 1;
        }
        progress.finish_with_message(format!("Fetched {} activities.", activities.len()));

        if let Some(activity_type) = &query.activity_type {
            activities.retain(|activity| &activity.activity_type == activity_type);
        }
        Ok(activities)
    }

    /// Applies a single-field update.
    ///
    /// Any 2xx status is success; the response body is not inspected.
    pub async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<(), StravaError> {
        let request = self
            .put(&format!("/activities/{activity_id}"))
            .json(&update.to_body());
        let response = check_status(request.send().await?).await?;
        tracing::debug!(
            activity_id,
            field = update.field(),
            status = response.status().as_u16(),
            "activity updated"
        );
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StravaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StravaError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
