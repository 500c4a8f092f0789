use crate::actors::messages::{ActorError, AppError, GenerationRequest, LlmMessage, ModelStatus};
use crate::actors::traits::LlmActor;
use crate::config::LlmConfig;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// A handle to the `LlmActor`.
///
/// This struct provides a public, cloneable interface for sending messages to the
/// running LLM actor. It abstracts away the `mpsc::Sender`. Status is read from
/// the runner's published snapshot, never through the message queue.
#[derive(Clone)]
pub struct LlmActorHandle {
    sender: mpsc::Sender<LlmMessage>,
    status: watch::Receiver<ModelStatus>,
}

impl LlmActorHandle {
    /// Creates a new `LlmActor` and returns a handle to it.
    ///
    /// This will spawn the `LlmActorRunner` in a new Tokio task. The runner checks
    /// the Ollama runtime (optionally starting it) and pulls the model before
    /// serving requests; failures there are logged and requests still go through.
    pub fn new(config: LlmConfig) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = LlmActorRunner::new(receiver, config);
        let status = actor.subscribe();
        tokio::spawn(async move { actor.run().await });
        Self { sender, status }
    }

    async fn request<T>(
        &self,
        msg: LlmMessage,
        recv: oneshot::Receiver<T>,
        limit: Duration,
    ) -> Result<T, AppError> {
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(ActorError::Internal(e.to_string())))?;
        timeout(limit, recv)
            .await?
            .map_err(|e| AppError::Actor(ActorError::Internal(e.to_string())))
    }
}

#[async_trait]
impl LlmActor for LlmActorHandle {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = LlmMessage::Generate {
            request,
            responder: send,
        };
        self.request(msg, recv, HANDLE_TIMEOUT).await?
    }

    async fn status(&self) -> Result<ModelStatus, AppError> {
        Ok(self.status.borrow().clone())
    }

    async fn unload(&self) -> Result<(), AppError> {
        let (send, recv) = oneshot::channel();
        self.request(LlmMessage::Unload { responder: send }, recv, UNLOAD_TIMEOUT)
            .await?
    }
}

// --- Constants ---
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);
const HANDLE_TIMEOUT: Duration = Duration::from_secs(130);
const UNLOAD_TIMEOUT: Duration = Duration::from_secs(5);
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);
const PULL_TIMEOUT: Duration = Duration::from_secs(300);
const STARTUP_RETRIES: u32 = 15;
const TOP_P: f32 = 0.9;
const REPEAT_PENALTY: f32 = 1.1;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

// --- Actor Runner (Internal Logic) ---
struct LlmActorRunner {
    receiver: mpsc::Receiver<LlmMessage>,
    child: Option<tokio::process::Child>,
    config: LlmConfig,
    client: Client,
    model_loaded: bool,
    reachable: bool,
    last_activity: i64,
    status_tx: watch::Sender<ModelStatus>,
}

impl Drop for LlmActorRunner {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.start_kill() {
                Ok(_) => info!("ollama serve process termination initiated"),
                Err(e) => error!("Failed to kill ollama serve process: {}", e),
            }
        }
    }
}

impl LlmActorRunner {
    fn new(receiver: mpsc::Receiver<LlmMessage>, config: LlmConfig) -> Self {
        let (status_tx, _) = watch::channel(ModelStatus {
            loaded: false,
            model_name: config.model_name.clone(),
            server_url: config.server_url.clone(),
            reachable: false,
            last_activity: 0,
        });
        Self {
            receiver,
            child: None,
            config,
            client: Client::new(),
            model_loaded: false,
            reachable: false,
            last_activity: 0,
            status_tx,
        }
    }

    fn subscribe(&self) -> watch::Receiver<ModelStatus> {
        self.status_tx.subscribe()
    }

    /// Makes the current flags visible to every handle.
    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }

    async fn run(mut self) {
        info!("LlmActor started for model {}", self.config.model_name);

        self.prepare().await;
        self.publish();

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("LlmActor stopped");
    }

    /// Check the runtime, start it if allowed, and make sure the model is present.
    async fn prepare(&mut self) {
        let models = match self.list_models().await {
            Ok(models) => models,
            Err(e) if self.config.autostart => {
                info!("Ollama not reachable ({}), attempting to start it", e);
                if let Err(e) = self.start_server().await {
                    warn!("Failed to start Ollama, requests will use demo mode: {}", e);
                    return;
                }
                match self.list_models().await {
                    Ok(models) => models,
                    Err(e) => {
                        warn!("Ollama started but model list failed: {}", e);
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Ollama not reachable, requests will use demo mode: {}", e);
                return;
            }
        };
        self.publish();

        if self.has_model(&models) {
            info!("Model {} available", self.config.model_name);
            self.model_loaded = true;
            return;
        }

        info!("Model {} not found, pulling...", self.config.model_name);
        match self.pull_model().await {
            Ok(()) => {
                info!("Model {} pulled successfully", self.config.model_name);
                self.model_loaded = true;
            }
            Err(e) => error!("Error pulling model: {}", e),
        }
    }

    fn has_model(&self, models: &[String]) -> bool {
        let name = &self.config.model_name;
        let latest = format!("{}:latest", name);
        models.iter().any(|m| m == name || *m == latest)
    }

    async fn start_server(&mut self) -> Result<(), AppError> {
        let binary = which::which("ollama").map_err(|e| {
            AppError::Config(format!("ollama binary not found in PATH: {}", e))
        })?;

        info!("Starting Ollama using {:?}", binary);
        let child = Command::new(&binary)
            .arg("serve")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);

        let retry_interval = Duration::from_secs(1);
        for attempt in 1..=STARTUP_RETRIES {
            tokio::time::sleep(retry_interval).await;
            match self.list_models().await {
                Ok(_) => {
                    info!("Ollama is ready after {} attempts", attempt);
                    return Ok(());
                }
                Err(e) => debug!("Health check attempt {} failed: {}", attempt, e),
            }
        }

        Err(AppError::Actor(ActorError::LlmError(format!(
            "Ollama failed to become ready after {} seconds",
            STARTUP_RETRIES
        ))))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.server_url, endpoint)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn build_request(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(self.url(endpoint)).json(payload))
    }

    async fn list_models(&mut self) -> Result<Vec<String>, AppError> {
        let request = self.authorize(self.client.get(self.url("api/tags"))).send();
        let result = timeout(TAGS_TIMEOUT, request).await;
        let res = match result {
            Ok(Ok(res)) => res,
            Ok(Err(e)) => {
                self.reachable = false;
                return Err(e.into());
            }
            Err(e) => {
                self.reachable = false;
                return Err(e.into());
            }
        };
        self.reachable = true;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Actor(ActorError::LlmError(format!(
                "Model list failed with status {}",
                status
            ))));
        }

        let tags: TagsResponse = res.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull_model(&self) -> Result<(), AppError> {
        let payload = serde_json::json!({
            "name": self.config.model_name,
            "stream": false
        });
        let request = self.build_request("api/pull", &payload).send();
        let res = timeout(PULL_TIMEOUT, request).await??;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Actor(ActorError::LlmError(format!(
                "Failed to pull model with status {}: {}",
                status, body
            ))));
        }
        Ok(())
    }

    async fn handle_message(&mut self, msg: LlmMessage) {
        match msg {
            LlmMessage::Generate {
                request,
                mut responder,
            } => {
                if responder.is_closed() {
                    debug!("Caller already gone, skipping generation");
                    return;
                }

                // Stop the model call as soon as the caller drops its receiver
                let outcome = tokio::select! {
                    result = self.generate_completion(request) => Some(result),
                    _ = responder.closed() => None,
                };
                self.publish();
                match outcome {
                    Some(result) => {
                        let _ = responder.send(result);
                    }
                    None => warn!("Caller dropped while generating, request cancelled"),
                }
            }
            LlmMessage::Unload { responder } => {
                let result = self.unload_model().await;
                self.publish();
                let _ = responder.send(result);
            }
        }
    }

    fn status(&self) -> ModelStatus {
        ModelStatus {
            loaded: self.model_loaded,
            model_name: self.config.model_name.clone(),
            server_url: self.config.server_url.clone(),
            reachable: self.reachable,
            last_activity: self.last_activity,
        }
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.config.model_name, max_tokens = request.max_tokens)
    )]
    async fn generate_completion(
        &mut self,
        request: GenerationRequest,
    ) -> Result<String, AppError> {
        debug!("LLM generating for prompt of {} chars", request.prompt.len());

        let mut payload = serde_json::json!({
            "model": self.config.model_name,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature,
                "top_p": TOP_P,
                "repeat_penalty": REPEAT_PENALTY
            }
        });

        if let Some(system) = request.system_prompt {
            payload["system"] = serde_json::Value::String(system);
        }

        let request_future = self.build_request("api/generate", &payload).send();

        let res = match timeout(COMPLETION_TIMEOUT, request_future).await {
            Ok(Ok(res)) => res,
            Ok(Err(e)) => {
                self.reachable = false;
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        self.reachable = true;

        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Actor(ActorError::LlmError(format!(
                "Completion request failed with status {}: {}",
                status, body
            ))));
        }

        let completion: GenerateResponse = res.json().await?;
        if let Some(count) = completion.eval_count {
            debug!("Runtime reported {} evaluated tokens", count);
        }

        self.model_loaded = true;
        self.last_activity = Utc::now().timestamp();

        Ok(completion.response.trim().to_string())
    }

    async fn unload_model(&mut self) -> Result<(), AppError> {
        if !self.model_loaded {
            return Ok(());
        }

        let payload = serde_json::json!({
            "model": self.config.model_name,
            "keep_alive": 0
        });
        let request = self.build_request("api/generate", &payload).send();
        let res = timeout(UNLOAD_TIMEOUT, request).await??;

        if !res.status().is_success() {
            return Err(AppError::Actor(ActorError::LlmError(format!(
                "Unload request failed with status {}",
                res.status()
            ))));
        }

        self.model_loaded = false;
        info!("Model {} unloaded", self.config.model_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_url: String) -> LlmConfig {
        LlmConfig {
            server_url,
            model_name: "llama2:7b".to_string(),
            auth_token: None,
            autostart: false,
        }
    }

    async fn setup_test_actor(config: LlmConfig) -> LlmActorHandle {
        let (sender, receiver) = mpsc::channel(32);
        let mut actor = LlmActorRunner::new(receiver, config);
        let status = actor.subscribe();

        // `prepare` is skipped so no health check or pull is issued.
        tokio::spawn(async move {
            while let Some(msg) = actor.receiver.recv().await {
                actor.handle_message(msg).await;
            }
        });

        LlmActorHandle { sender, status }
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            system_prompt: Some("system".to_string()),
            max_tokens: 64,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn test_generate_completion_success() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama2:7b",
                "stream": false,
                "system": "system",
                "options": { "num_predict": 64 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama2:7b",
                "response": "  Vamos conversar sobre isso.  ",
                "done": true,
                "eval_count": 5
            })))
            .mount(&mock_server)
            .await;

        let result = handle.generate(request("Olá")).await;

        assert_eq!(result.unwrap(), "Vamos conversar sobre isso.");

        let status = handle.status().await.unwrap();
        assert!(status.loaded);
        assert!(status.reachable);
        assert!(status.last_activity > 0);
    }

    #[tokio::test]
    async fn test_generate_completion_server_error() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let result = handle.generate(request("Olá")).await;

        match result {
            Err(AppError::Actor(ActorError::LlmError(msg))) => {
                assert!(msg.contains("Completion request failed with status 500"));
                assert!(msg.contains("Internal Server Error"));
            }
            other => panic!("Expected LlmError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_unreachable_server() {
        // Nothing listens on port 9
        let handle = setup_test_actor(test_config("http://127.0.0.1:9".to_string())).await;

        let result = handle.generate(request("Olá")).await;
        assert!(matches!(result, Err(AppError::Actor(_))));

        let status = handle.status().await.unwrap();
        assert!(!status.reachable);
        assert!(!status.loaded);
    }

    #[tokio::test]
    async fn test_auth_token_is_sent() {
        let mock_server = MockServer::start().await;
        let mut config = test_config(mock_server.uri());
        config.auth_token = Some("secret".to_string());
        let handle = setup_test_actor(config).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .mount(&mock_server)
            .await;

        assert_eq!(handle.generate(request("Olá")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_prepare_pulls_missing_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{ "name": "phi3:mini" }]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .and(body_partial_json(json!({ "name": "llama2:7b" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (_sender, receiver) = mpsc::channel(1);
        let mut runner = LlmActorRunner::new(receiver, test_config(mock_server.uri()));
        runner.prepare().await;

        assert!(runner.reachable);
        assert!(runner.model_loaded);
    }

    #[tokio::test]
    async fn test_prepare_finds_existing_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{ "name": "llama2:7b" }]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let (_sender, receiver) = mpsc::channel(1);
        let mut runner = LlmActorRunner::new(receiver, test_config(mock_server.uri()));
        runner.prepare().await;

        assert!(runner.model_loaded);
    }

    #[tokio::test]
    async fn test_unload_after_generation() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "keep_alive": 0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "" })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "oi" })))
            .mount(&mock_server)
            .await;

        handle.generate(request("Olá")).await.unwrap();
        handle.unload().await.unwrap();

        assert!(!handle.status().await.unwrap().loaded);
    }

    #[tokio::test]
    async fn test_status_available_during_generation() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "ok" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let generating = tokio::spawn({
            let handle = handle.clone();
            async move { handle.generate(request("Olá")).await }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let status = timeout(Duration::from_millis(500), handle.status())
            .await
            .expect("status must not wait behind the generation")
            .unwrap();
        assert!(!status.loaded);

        assert_eq!(generating.await.unwrap().unwrap(), "ok");
        assert!(handle.status().await.unwrap().loaded);
    }

    #[tokio::test]
    async fn test_abandoned_requests_never_reach_model() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "prompt": "abandoned" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "no" })))
            .expect(0)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .mount(&mock_server)
            .await;

        for _ in 0..3 {
            let (responder, recv) = oneshot::channel();
            drop(recv);
            let msg = LlmMessage::Generate {
                request: request("abandoned"),
                responder,
            };
            handle.sender.send(msg).await.unwrap();
        }

        // Queued behind the abandoned messages, so they are all handled first.
        assert_eq!(handle.generate(request("live")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_dropped_caller_cancels_generation() {
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(test_config(mock_server.uri())).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "prompt": "slow" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late" }))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "fast" })))
            .mount(&mock_server)
            .await;

        let slow = tokio::spawn({
            let handle = handle.clone();
            async move { handle.generate(request("slow")).await }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        slow.abort();

        let result = timeout(Duration::from_secs(2), handle.generate(request("fast")))
            .await
            .expect("actor still busy with the abandoned generation");
        assert_eq!(result.unwrap(), "fast");
    }

    #[test]
    fn test_has_model_matches_latest_tag() {
        let (_sender, receiver) = mpsc::channel(1);
        let mut config = test_config("http://localhost".to_string());
        config.model_name = "llama2".to_string();
        let runner = LlmActorRunner::new(receiver, config);

        assert!(runner.has_model(&["llama2:latest".to_string()]));
        assert!(!runner.has_model(&["llama2:13b".to_string()]));
    }
}
