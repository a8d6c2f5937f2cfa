//! Upstream text-to-speech and alignment calls

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::timing::WordTimings;
use crate::config::TtsConfig;
use crate::error::TtsError;

/// Synthesized audio plus its word timings
#[derive(Debug, Clone)]
pub struct Speech {
    /// MPEG audio bytes
    pub audio: Vec<u8>,
    pub timings: WordTimings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Forwards synthesis requests to the voice provider
#[derive(Debug, Clone)]
pub struct TtsProxy {
    config: TtsConfig,
    client: reqwest::Client,
    api_key: Option<String>,
    alignment_key: Option<String>,
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

impl TtsProxy {
    /// Build a proxy, reading API keys from the configured environment variables
    pub fn new(config: &TtsConfig) -> Result<Self, TtsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = env_key(&config.api_key_env);
        if api_key.is_none() {
            tracing::warn!("{} is not set, TTS requests will fail", config.api_key_env);
        }

        Ok(Self {
            config: config.clone(),
            client,
            api_key,
            alignment_key: env_key(&config.alignment.api_key_env),
        })
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn with_alignment_key(mut self, key: Option<String>) -> Self {
        self.alignment_key = key;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Synthesize `text` and attach word timings
    pub async fn synthesize(&self, text: &str) -> Result<Speech, TtsError> {
        let api_key = self.api_key.as_deref().ok_or(TtsError::MissingApiKey)?;
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let url = format!(
            "{}/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        );
        let body = SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        tracing::debug!("Requesting speech for {} chars", text.len());
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("TTS provider returned {}: {}", status, message);
            return Err(TtsError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response.bytes().await?.to_vec();
        let timings = self.timings(text).await;
        tracing::info!(
            "Synthesized {} bytes of speech ({} words, {:?} timings)",
            audio.len(),
            timings.words.len(),
            timings.source
        );

        Ok(Speech { audio, timings })
    }

    /// Provider timings when alignment is enabled and succeeds, otherwise
    /// the per-word estimate
    pub async fn timings(&self, text: &str) -> WordTimings {
        if self.config.alignment.enabled {
            match self.align(text).await {
                Ok(words) => return WordTimings::from_provider(words),
                Err(e) => tracing::warn!("Alignment unavailable, estimating timings: {}", e),
            }
        }
        WordTimings::estimate(text, self.config.word_duration_ms)
    }

    /// Ask the alignment provider for word timings
    pub async fn align(&self, text: &str) -> Result<Vec<Value>, TtsError> {
        let key = self
            .alignment_key
            .as_deref()
            .ok_or_else(|| TtsError::Alignment("alignment API key is not set".to_string()))?;

        let payload = json!({
            "model": self.config.alignment.model,
            "options": { "output_format": "json" },
            "input": [{
                "type": "text",
                "text": text,
                "provider": { "name": "elevenlabs", "voiceId": self.config.voice_id },
            }],
        });

        let response = self
            .client
            .post(&self.config.alignment.endpoint)
            .header("x-api-key", key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Alignment(format!("{}: {}", status, body)));
        }

        let mut body: Value = response.json().await?;
        match body.get_mut("words").map(Value::take) {
            Some(Value::Array(words)) => Ok(words),
            _ => Err(TtsError::Alignment("response has no words array".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::timing::TimingSource;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    /// Local stand-in for the voice and alignment providers
    async fn spawn_provider() -> String {
        async fn speak(
            Path(voice): Path<String>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Vec<u8>) {
            if headers.get("xi-api-key").and_then(|v| v.to_str().ok()) != Some("good-key") {
                return (StatusCode::UNAUTHORIZED, b"invalid api key".to_vec());
            }
            assert_eq!(voice, "voice-1");
            assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
            (StatusCode::OK, b"ID3fake-mpeg".to_vec())
        }

        async fn align(headers: HeaderMap) -> Json<Value> {
            assert_eq!(headers.get("x-api-key").unwrap(), "sync-key");
            Json(json!({ "words": [{ "text": "hello", "start": 0.0, "end": 0.4 }] }))
        }

        let app = Router::new()
            .route("/v1/text-to-speech/:voice", post(speak))
            .route("/align", post(align));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base: &str) -> TtsConfig {
        let mut config = TtsConfig {
            base_url: format!("{}/v1", base),
            voice_id: "voice-1".to_string(),
            api_key_env: "MIMIC3D_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        config.alignment.endpoint = format!("{}/align", base);
        config.alignment.api_key_env = "MIMIC3D_TEST_UNSET_SYNC_KEY".to_string();
        config
    }

    #[tokio::test]
    async fn test_missing_key() {
        let proxy = TtsProxy::new(&config("http://127.0.0.1:9")).unwrap();
        assert!(!proxy.is_configured());
        assert!(matches!(
            proxy.synthesize("hello").await,
            Err(TtsError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_empty_text() {
        let proxy = TtsProxy::new(&config("http://127.0.0.1:9"))
            .unwrap()
            .with_api_key(Some("good-key".to_string()));
        assert!(matches!(proxy.synthesize("  ").await, Err(TtsError::EmptyText)));
    }

    #[tokio::test]
    async fn test_synthesize_with_estimate() {
        let base = spawn_provider().await;
        let proxy = TtsProxy::new(&config(&base))
            .unwrap()
            .with_api_key(Some("good-key".to_string()));

        let speech = proxy.synthesize("hello brave new world").await.unwrap();
        assert_eq!(speech.audio, b"ID3fake-mpeg");
        assert_eq!(speech.timings.source, TimingSource::Estimate);
        assert_eq!(speech.timings.estimated_duration_ms(), 1200);
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status() {
        let base = spawn_provider().await;
        let proxy = TtsProxy::new(&config(&base))
            .unwrap()
            .with_api_key(Some("bad-key".to_string()));

        let err = proxy.synthesize("hello").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.client_message(), "TTS provider error: invalid api key");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on the discard port
        let proxy = TtsProxy::new(&config("http://127.0.0.1:9"))
            .unwrap()
            .with_api_key(Some("good-key".to_string()));

        let err = proxy.synthesize("hello").await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.client_message(), "Failed to generate speech");
    }

    #[tokio::test]
    async fn test_alignment_words_pass_through() {
        let base = spawn_provider().await;
        let mut config = config(&base);
        config.alignment.enabled = true;
        let proxy = TtsProxy::new(&config)
            .unwrap()
            .with_api_key(Some("good-key".to_string()))
            .with_alignment_key(Some("sync-key".to_string()));

        let speech = proxy.synthesize("hello").await.unwrap();
        assert_eq!(speech.timings.source, TimingSource::Provider);
        assert_eq!(
            speech.timings.words,
            vec![json!({ "text": "hello", "start": 0.0, "end": 0.4 })]
        );
    }

    #[tokio::test]
    async fn test_alignment_without_key_falls_back() {
        let mut config = config("http://127.0.0.1:9");
        config.alignment.enabled = true;
        let proxy = TtsProxy::new(&config).unwrap();

        let timings = proxy.timings("one two").await;
        assert_eq!(timings.source, TimingSource::Estimate);
        assert_eq!(timings.words.len(), 2);
    }
}
