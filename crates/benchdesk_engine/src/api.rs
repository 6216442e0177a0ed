use benchdesk_core::{
    parse_event, ActionRequest, ActionResponse, FolderListing, Notification, TaskEvent, TaskId,
};
use benchdesk_logging::desk_debug;
use serde::Deserialize;

use crate::{ClientError, ClientSettings, FailureKind};

/// The backend's HTTP surface as the engine uses it.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Id of the running task, or `None` when the backend reports none.
    async fn current_task(&self) -> Result<Option<TaskId>, ClientError>;

    /// One `GET /events` round trip. `Ok(None)` when the record was malformed.
    async fn next_event(&self) -> Result<Option<TaskEvent>, ClientError>;

    async fn respond_prompt(&self, approved: bool) -> Result<(), ClientError>;

    async fn acknowledge_event(&self, event_id: &str) -> Result<(), ClientError>;

    async fn notifications(&self) -> Result<Vec<Notification>, ClientError>;

    async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError>;

    async fn delete_notification(&self, id: &str) -> Result<(), ClientError>;

    async fn fetch_yaml(
        &self,
        entity: &str,
        entity_uid: &str,
        field: &str,
    ) -> Result<String, ClientError>;

    async fn browse(&self, path: &str, with_files: bool) -> Result<FolderListing, ClientError>;

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionResponse, ClientError>;
}

#[derive(Deserialize)]
struct CurrentTask {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Deserialize)]
struct YamlContent {
    content: String,
}

#[derive(Deserialize)]
struct YamlDetail {
    detail: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.settings.endpoint(path))
            .timeout(self.settings.request_timeout)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.settings.endpoint(path))
            .timeout(self.settings.request_timeout)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<(), ClientError> {
        let response = self
            .post(path)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn current_task(&self) -> Result<Option<TaskId>, ClientError> {
        let response = self
            .get("/current_task")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: CurrentTask = check_status(response)?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(body
            .task_id
            .filter(|id| !id.is_empty())
            .map(TaskId::new))
    }

    async fn next_event(&self) -> Result<Option<TaskEvent>, ClientError> {
        // Long poll: the backend holds the request until an event exists.
        let response = self
            .client
            .get(self.settings.endpoint("/events"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let raw = check_status(response)?
            .text()
            .await
            .map_err(map_reqwest_error)?;
        match parse_event(&raw) {
            Ok(event) => Ok(Some(event)),
            Err(err) => {
                desk_debug!("dropping malformed event: {}", err);
                Ok(None)
            }
        }
    }

    async fn respond_prompt(&self, approved: bool) -> Result<(), ClientError> {
        let value = if approved { "true" } else { "false" };
        self.post_form("/events", &[("is_approved", value)]).await
    }

    async fn acknowledge_event(&self, event_id: &str) -> Result<(), ClientError> {
        self.post_form("/events/acknowledge_event", &[("event_id", event_id)])
            .await
    }

    async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        let response = self
            .get("/notifications")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?
            .json()
            .await
            .map_err(map_reqwest_error)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError> {
        self.post_form("/notifications/mark_read", &[("notification_id", id)])
            .await
    }

    async fn delete_notification(&self, id: &str) -> Result<(), ClientError> {
        self.post_form("/notifications/delete", &[("notification_id", id)])
            .await
    }

    async fn fetch_yaml(
        &self,
        entity: &str,
        entity_uid: &str,
        field: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .get("/fetch-yaml")
            .query(&[
                ("entity", entity),
                ("entity_uid", entity_uid),
                ("field_to_fetch", field),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<YamlDetail>(&raw)
                .map(|body| body.detail)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let body: YamlContent = response.json().await.map_err(map_reqwest_error)?;
        Ok(body.content)
    }

    async fn browse(&self, path: &str, with_files: bool) -> Result<FolderListing, ClientError> {
        let with_files = if with_files { "true" } else { "false" };
        let response = self
            .post("/api/browse")
            .form(&[("path", path), ("with_files", with_files)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?
            .json()
            .await
            .map_err(map_reqwest_error)
    }

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionResponse, ClientError> {
        let response = self
            .client
            .post(self.settings.endpoint(&request.endpoint))
            .form(&request.fields)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // Failed actions still carry `{status, error}` in the body.
        let status = response.status();
        let raw = response.text().await.map_err(map_reqwest_error)?;
        match serde_json::from_str::<ActionResponse>(&raw) {
            Ok(body) => Ok(body),
            Err(_) if !status.is_success() => Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )),
            Err(err) => Err(ClientError::new(FailureKind::Decode, err.to_string())),
        }
    }
}

pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
