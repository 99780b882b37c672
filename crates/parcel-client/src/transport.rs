//! Action-dispatched transport shared by every client.
//!
//! The backend exposes a single URL. Writes are `POST {url}?t={millis}` with
//! a `text/plain` JSON body `{"action": ..., ...fields}`; the plain content
//! type keeps the request "simple" for the backend's CORS handling, and the
//! `t` parameter defeats intermediary caches. Reads are `GET` with the action
//! and its arguments in the query string.
//!
//! Each call goes to the wire exactly once. Retry policy belongs to callers.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GatewayError;

/// Body envelope: the action discriminator flattened together with its fields.
#[derive(Serialize)]
struct ActionEnvelope<'a, B: Serialize> {
    action: &'a str,
    #[serde(flatten)]
    body: &'a B,
}

#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, endpoint: url::Url) -> Self {
        Self { http, endpoint }
    }

    /// `POST` an action and decode its JSON reply.
    pub(crate) async fn post_action<B, R>(&self, action: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let envelope = ActionEnvelope { action, body };
        let text = serde_json::to_string(&envelope).map_err(|e| GatewayError::Serialization {
            action: action.into(),
            source: e,
        })?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("t", &chrono::Utc::now().timestamp_millis().to_string());

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(text)
            .send()
            .await
            .map_err(|e| GatewayError::Http {
                action: action.into(),
                source: e,
            })?;

        Self::decode(action, resp).await
    }

    /// `GET` an action with query arguments and decode its JSON reply.
    pub(crate) async fn get_action<R>(
        &self,
        action: &str,
        args: &[(&str, &str)],
    ) -> Result<R, GatewayError>
    where
        R: DeserializeOwned,
    {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("action", action);
            for (k, v) in args {
                pairs.append_pair(k, v);
            }
        }

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Http {
                action: action.into(),
                source: e,
            })?;

        Self::decode(action, resp).await
    }

    async fn decode<R: DeserializeOwned>(
        action: &str,
        resp: reqwest::Response,
    ) -> Result<R, GatewayError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError {
                action: action.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| GatewayError::Deserialization {
            action: action.into(),
            source: e,
        })
    }
}
