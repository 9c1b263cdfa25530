//! Collector HTTP client
//!
//! Runners are registered under `api/workflows`; facts for a runner go to
//! `api/workflows/{uid}/facts`.

use std::collections::BTreeMap;

use serde::Serialize;
use spot_core::{compute_uid, Fact, RunnerDefinition, SpotConfig};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

const USER_AGENT: &str = concat!("spot-client/", env!("CARGO_PKG_VERSION"));
const WORKFLOWS: &str = "api/workflows";

/// Body of a runner registration: the definition plus its uid.
#[derive(Debug, Serialize)]
struct RunnerSubmission<'a> {
    uid: String,
    #[serde(flatten)]
    definition: &'a RunnerDefinition,
}

/// Client for a fact collector
#[derive(Debug, Clone)]
pub struct CollectorClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl CollectorClient {
    /// Create a client for the collector at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(CollectorClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create client from configuration
    pub fn from_config(config: &SpotConfig) -> Result<Self> {
        Self::new(&config.collector_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `segments` onto the base address.
    pub fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment.trim_matches('/'));
        }
        url
    }

    /// Register a runner definition.
    pub async fn submit_runner(&self, definition: &RunnerDefinition) -> Result<()> {
        let uid = compute_uid(definition);
        info!(uid = %uid, "submitting runner");

        let body = RunnerSubmission { uid, definition };
        self.post(&self.url(&[WORKFLOWS]), &body).await
    }

    /// Upload one fact for the runner `uid`.
    pub async fn submit_fact(&self, uid: &str, fact: &Fact) -> Result<()> {
        self.post(&self.url(&[WORKFLOWS, uid, "facts"]), &fact.payload())
            .await
    }

    /// Upload facts in order, stopping at the first failure.
    pub async fn submit_facts(&self, uid: &str, facts: &[Fact]) -> Result<()> {
        for fact in facts {
            self.submit_fact(uid, fact).await?;
        }
        info!(uid = %uid, count = facts.len(), "submitted facts");
        Ok(())
    }

    /// Runner definitions known to the collector, keyed by uid.
    pub async fn list_runners(&self) -> Result<BTreeMap<String, RunnerDefinition>> {
        let url = self.url(&[WORKFLOWS]);
        let response = self.http_client.get(&url).send().await?;
        check_status(&response, &url)?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            url,
            message: e.to_string(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<()> {
        debug!(url = %url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        check_status(&response, url)
    }
}

fn check_status(response: &reqwest::Response, url: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_core::{Assignment, ParamValue};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn definition() -> RunnerDefinition {
        RunnerDefinition::new(
            "echo 1.0",
            "1.0",
            vec!["sleep {{ t }}".to_string()],
            vec!["t:float".to_string()],
        )
    }

    fn fact() -> Fact {
        let mut assignment = Assignment::new();
        assignment.insert("t".to_string(), ParamValue::Float(0.5));
        let mut fact = Fact::new("abc", "1.0", assignment);
        fact.append("sleep 0.5", 0.5, true);
        fact
    }

    #[test]
    fn test_url_joins_segments() {
        let client = CollectorClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url(&[WORKFLOWS, "abc", "facts"]),
            "http://localhost:5000/api/workflows/abc/facts"
        );
        assert_eq!(client.url(&[]), "http://localhost:5000");
    }

    #[test]
    fn test_from_config_uses_collector_url() {
        let config = SpotConfig::from_env().with_collector_url("http://collector:8080");
        let client = CollectorClient::from_config(&config).unwrap();
        assert_eq!(client.url(&[WORKFLOWS]), "http://collector:8080/api/workflows");
    }

    #[tokio::test]
    async fn test_submit_runner_posts_definition_with_uid() {
        let server = MockServer::start().await;
        let definition = definition();
        let uid = compute_uid(&definition);

        Mock::given(method("POST"))
            .and(path("/api/workflows"))
            .and(body_json(serde_json::json!({
                "uid": uid,
                "version-command": "echo 1.0",
                "version": "1.0",
                "run-commands": ["sleep {{ t }}"],
                "parameters": ["t:float"],
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = CollectorClient::new(&server.uri()).unwrap();
        client.submit_runner(&definition).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_fact_posts_payload() {
        let server = MockServer::start().await;
        let fact = fact();
        let expected = serde_json::to_value(fact.payload()).unwrap();

        Mock::given(method("POST"))
            .and(path("/api/workflows/abc/facts"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let client = CollectorClient::new(&server.uri()).unwrap();
        client
            .submit_facts("abc", &[fact.clone(), fact])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = CollectorClient::new(&server.uri()).unwrap();
        let err = client
            .submit_facts("abc", &[fact(), fact()])
            .await
            .unwrap_err();

        match err {
            ClientError::Status { status, url } => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/api/workflows/abc/facts"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_runners_decodes_map() {
        let server = MockServer::start().await;
        let definition = definition();
        let uid = compute_uid(&definition);

        let mut body = serde_json::Map::new();
        body.insert(uid.clone(), serde_json::to_value(&definition).unwrap());

        Mock::given(method("GET"))
            .and(path("/api/workflows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = CollectorClient::new(&server.uri()).unwrap();
        let runners = client.list_runners().await.unwrap();
        assert_eq!(runners.len(), 1);
        assert_eq!(runners[&uid], definition);
    }

    #[tokio::test]
    async fn test_list_runners_rejects_unexpected_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
            .mount(&server)
            .await;

        let client = CollectorClient::new(&server.uri()).unwrap();
        let err = client.list_runners().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
