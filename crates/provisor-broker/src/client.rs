//! Blocking HTTP client for v2 service broker endpoints.
//!
//! One `invoke()` call is one HTTP round trip. The client never mutates any
//! local state; it only classifies the broker's answer into a
//! [`BrokerResponse`] for callers to act on.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::BrokerClientError;
use crate::types::{BrokerEndpoint, BrokerResponse, BrokerVerb, ServiceRoute};

/// Default bound on a single broker round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: reqwest::blocking::Client,
}

impl BrokerClient {
    /// Build a client with a bounded request timeout.
    ///
    /// An unreachable broker is not distinguished from an arbitrarily slow
    /// one beyond this timeout.
    pub fn new(timeout: Duration) -> Result<Self, BrokerClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BrokerClientError::ClientBuild)?;
        Ok(Self { http })
    }

    /// Issue one request against the broker and classify the outcome.
    ///
    /// Routes:
    /// - provision/deprovision/update → `/v2/service_instances/{instance_id}`
    /// - bind/unbind → `/v2/service_instances/{instance_id}/service_bindings/{binding_id}`
    ///
    /// Transport-level timeouts and connection failures are reported as
    /// `BrokerResponse::Retryable`, not as an `Err` — the caller decides
    /// whether to retry or surface them.
    pub fn invoke(
        &self,
        endpoint: &BrokerEndpoint,
        route: &ServiceRoute,
        verb: BrokerVerb,
    ) -> Result<BrokerResponse, BrokerClientError> {
        let url = request_url(endpoint, route, verb)?;
        tracing::debug!(verb = verb.as_str(), %url, "broker request");

        let mut req = self
            .http
            .request(verb.method(), &url)
            .basic_auth(&endpoint.username, Some(&endpoint.password));

        // PUT and PATCH carry a JSON body; broker-specific parameters are a
        // caller concern, so an empty object is sent by default.
        if matches!(
            verb,
            BrokerVerb::Provision | BrokerVerb::Bind | BrokerVerb::Update
        ) {
            req = req.json(&serde_json::json!({}));
        }

        let resp = match req.send() {
            Ok(r) => r,
            Err(e) if e.is_timeout() || e.is_connect() => {
                tracing::warn!(verb = verb.as_str(), error = %e, "broker unreachable");
                return Ok(BrokerResponse::Retryable {
                    detail: e.to_string(),
                });
            }
            Err(e) => return Err(BrokerClientError::Http(e)),
        };

        let status = resp.status();
        let body = resp.text().unwrap_or_default();

        if status.is_success() {
            let parsed = serde_json::from_str(&body).ok();
            return Ok(BrokerResponse::Success { body: parsed });
        }
        if status == StatusCode::GONE {
            return Ok(BrokerResponse::Gone);
        }
        if status.is_server_error() {
            return Ok(BrokerResponse::Retryable {
                detail: error_detail(status, &body),
            });
        }
        Ok(BrokerResponse::Rejected {
            detail: error_detail(status, &body),
        })
    }
}

fn request_url(
    endpoint: &BrokerEndpoint,
    route: &ServiceRoute,
    verb: BrokerVerb,
) -> Result<String, BrokerClientError> {
    let base = endpoint.url.trim_end_matches('/');
    if base.is_empty() {
        return Err(BrokerClientError::InvalidUrl(endpoint.url.clone()));
    }
    let mut url = format!("{base}/v2/service_instances/{}", route.instance_id);
    if verb.is_binding_verb() {
        let binding_id =
            route
                .binding_id
                .ok_or_else(|| BrokerClientError::MissingBindingId {
                    verb: verb.to_string(),
                })?;
        url.push_str(&format!("/service_bindings/{binding_id}"));
    }
    Ok(url)
}

/// Extract the broker's own error description when the body carries one,
/// falling back to the raw body and then the status code.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(description) = value.get("description").and_then(|d| d.as_str()) {
            return description.to_string();
        }
    }
    if body.trim().is_empty() {
        format!("broker returned {status}")
    } else {
        body.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn endpoint(url: &str) -> BrokerEndpoint {
        BrokerEndpoint {
            url: url.to_string(),
            username: "user".to_string(),
            password: "pass".to_string(),
        }
    }

    fn client() -> BrokerClient {
        BrokerClient::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn unbind_hits_the_binding_route_with_basic_auth() {
        let mut server = mockito::Server::new();
        let instance_id = Uuid::new_v4();
        let binding_id = Uuid::new_v4();
        let mock = server
            .mock(
                "DELETE",
                format!("/v2/service_instances/{instance_id}/service_bindings/{binding_id}")
                    .as_str(),
            )
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .with_status(200)
            .with_body("{}")
            .create();

        let resp = client()
            .invoke(
                &endpoint(&server.url()),
                &ServiceRoute::binding(instance_id, binding_id),
                BrokerVerb::Unbind,
            )
            .unwrap();

        mock.assert();
        assert!(matches!(resp, BrokerResponse::Success { .. }));
    }

    #[test]
    fn success_parses_response_body() {
        let mut server = mockito::Server::new();
        let instance_id = Uuid::new_v4();
        server
            .mock(
                "PUT",
                format!("/v2/service_instances/{instance_id}").as_str(),
            )
            .with_status(201)
            .with_body(r#"{"dashboard_url":"https://dash.example.com"}"#)
            .create();

        let resp = client()
            .invoke(
                &endpoint(&server.url()),
                &ServiceRoute::instance(instance_id),
                BrokerVerb::Provision,
            )
            .unwrap();

        match resp {
            BrokerResponse::Success { body: Some(body) } => {
                assert_eq!(body["dashboard_url"], "https://dash.example.com");
            }
            other => panic!("expected Success with body, got {other:?}"),
        }
    }

    #[test]
    fn gone_is_reported_as_gone() {
        let mut server = mockito::Server::new();
        let instance_id = Uuid::new_v4();
        server
            .mock(
                "DELETE",
                format!("/v2/service_instances/{instance_id}").as_str(),
            )
            .with_status(410)
            .with_body("{}")
            .create();

        let resp = client()
            .invoke(
                &endpoint(&server.url()),
                &ServiceRoute::instance(instance_id),
                BrokerVerb::Deprovision,
            )
            .unwrap();
        assert_eq!(resp, BrokerResponse::Gone);
    }

    #[test]
    fn server_error_is_retryable() {
        let mut server = mockito::Server::new();
        let instance_id = Uuid::new_v4();
        server
            .mock(
                "DELETE",
                format!("/v2/service_instances/{instance_id}").as_str(),
            )
            .with_status(503)
            .create();

        let resp = client()
            .invoke(
                &endpoint(&server.url()),
                &ServiceRoute::instance(instance_id),
                BrokerVerb::Deprovision,
            )
            .unwrap();
        assert!(matches!(resp, BrokerResponse::Retryable { .. }));
    }

    #[test]
    fn client_error_carries_broker_detail_verbatim() {
        let mut server = mockito::Server::new();
        let instance_id = Uuid::new_v4();
        server
            .mock(
                "PATCH",
                format!("/v2/service_instances/{instance_id}").as_str(),
            )
            .with_status(422)
            .with_body(r#"{"description":"plan change not supported"}"#)
            .create();

        let resp = client()
            .invoke(
                &endpoint(&server.url()),
                &ServiceRoute::instance(instance_id),
                BrokerVerb::Update,
            )
            .unwrap();
        assert_eq!(
            resp,
            BrokerResponse::Rejected {
                detail: "plan change not supported".to_string()
            }
        );
    }

    #[test]
    fn unreachable_broker_is_retryable() {
        // Nothing listens on port 1.
        let resp = client()
            .invoke(
                &endpoint("http://127.0.0.1:1"),
                &ServiceRoute::instance(Uuid::new_v4()),
                BrokerVerb::Deprovision,
            )
            .unwrap();
        assert!(matches!(resp, BrokerResponse::Retryable { .. }));
    }

    #[test]
    fn binding_verb_without_binding_id_is_an_error() {
        let err = client()
            .invoke(
                &endpoint("http://broker.example.com"),
                &ServiceRoute::instance(Uuid::new_v4()),
                BrokerVerb::Unbind,
            )
            .unwrap_err();
        assert!(matches!(err, BrokerClientError::MissingBindingId { .. }));
    }
}
