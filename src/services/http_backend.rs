//! REST implementation of the study backend

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::backend::{
    EndFocusSession, EndStudySession, SessionRef, SessionSummary, StartFocusSession,
    StartStudySession, StudyBackend, StudySettings,
};
use crate::error::BackendError;

/// Talks to the study API over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpStudyBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStudyBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl StudyBackend for HttpStudyBackend {
    fn get_study_settings(&self) -> BoxFuture<'_, Result<StudySettings, BackendError>> {
        async move {
            debug!("Fetching study settings");
            self.send_json(self.client.get(self.url("/study/settings"))).await
        }
        .boxed()
    }

    fn start_study_session(
        &self,
        request: StartStudySession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>> {
        async move {
            let session: SessionRef = self
                .send_json(self.client.post(self.url("/study/sessions")).json(&request))
                .await?;
            info!("Study session {} started", session.id);
            Ok(session)
        }
        .boxed()
    }

    fn end_study_session(
        &self,
        session_id: String,
        request: EndStudySession,
    ) -> BoxFuture<'_, Result<SessionSummary, BackendError>> {
        async move {
            let path = format!("/study/sessions/{}/end", session_id);
            let summary = self
                .send_json(self.client.post(self.url(&path)).json(&request))
                .await?;
            info!("Study session {} ended", session_id);
            Ok(summary)
        }
        .boxed()
    }

    fn start_focus_session(
        &self,
        goal_id: String,
        request: StartFocusSession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>> {
        async move {
            let path = format!("/goals/{}/focus-sessions", goal_id);
            let session: SessionRef = self
                .send_json(self.client.post(self.url(&path)).json(&request))
                .await?;
            info!("Focus session {} started for goal {}", session.id, goal_id);
            Ok(session)
        }
        .boxed()
    }

    fn end_focus_session(
        &self,
        focus_session_id: String,
        request: EndFocusSession,
    ) -> BoxFuture<'_, Result<(), BackendError>> {
        async move {
            let path = format!("/focus-sessions/{}/end", focus_session_id);
            self.send(self.client.post(self.url(&path)).json(&request))
                .await?;
            info!(
                "Focus session {} ended after {} min",
                focus_session_id, request.duration_minutes
            );
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend =
            HttpStudyBackend::new("http://localhost:8000/api/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url("/study/settings"), "http://localhost:8000/api/study/settings");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let backend =
            HttpStudyBackend::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let err = backend.get_study_settings().await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
    }
}
