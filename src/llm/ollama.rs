use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, TextGenerator};
use crate::config::OllamaConfig;
use crate::errors::ProviderError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking client for a local ollama instance.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{endpoint}", self.config.base_url)
    }

    /// Request an embedding for `text`.
    pub fn try_embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            prompt: text,
            stream: false,
        };

        let resp = self
            .client
            .post(self.url("embeddings"))
            .timeout(self.config.embed_timeout)
            .json(&request)
            .send()?;

        let body: EmbeddingResponse = parse_json(resp)?;
        if body.embedding.is_empty() {
            return Err(ProviderError::Malformed("empty embedding".to_string()));
        }

        Ok(body.embedding)
    }

    /// Request a completion for `prompt` at temperature 0.
    pub fn try_generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        json_mode: bool,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            model: &self.config.generation_model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
            system: system_prompt,
            format: json_mode.then_some("json"),
        };

        let resp = self
            .client
            .post(self.url("generate"))
            .timeout(self.config.generate_timeout)
            .json(&request)
            .send()?;

        let body: GenerateResponse = parse_json(resp)?;
        Ok(body.response)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::blocking::Response,
) -> Result<T, ProviderError> {
    let status = resp.status();
    let text = resp.text()?;

    if !status.is_success() {
        return Err(ProviderError::Status { status, body: text });
    }

    serde_json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))
}

impl EmbeddingProvider for OllamaClient {
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.try_embed(text) {
            Ok(embedding) => Some(embedding),
            Err(err) => {
                log::warn!(
                    "embedding request failed (model={}): {err}",
                    self.config.embedding_model
                );
                if let ProviderError::Reqwest(_) = err {
                    log::warn!("make sure ollama is running and the embedding model is pulled");
                }
                None
            }
        }
    }
}

impl TextGenerator for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        json_mode: bool,
    ) -> Option<String> {
        log::debug!("generating with model '{}'", self.config.generation_model);
        match self.try_generate(prompt, system_prompt, json_mode) {
            Ok(response) => Some(response),
            Err(err) => {
                log::warn!(
                    "generate request failed (model={}): {err}",
                    self.config.generation_model
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    /// Serves exactly one http request with the given status and body.
    /// The received request body is sent back through the returned channel.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }

            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            tx.send(String::from_utf8(request_body).unwrap()).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    fn client_for(base_url: &str) -> OllamaClient {
        let mut config = OllamaConfig::new(base_url);
        config.embed_timeout = Duration::from_secs(5);
        config.generate_timeout = Duration::from_secs(5);
        OllamaClient::new(config).unwrap()
    }

    #[test]
    fn test_embed_success() {
        let (url, rx) = serve_once("200 OK", r#"{"embedding":[0.5,-1.0,2.0]}"#);
        let client = client_for(&url);

        let embedding = client.embed("apple banana").unwrap();
        assert_eq!(embedding, vec![0.5, -1.0, 2.0]);

        let request: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        assert_eq!(request["model"], "nomic-embed-text");
        assert_eq!(request["prompt"], "apple banana");
        assert_eq!(request["stream"], false);
    }

    #[test]
    fn test_embed_non_success_status() {
        let (url, _rx) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let client = client_for(&url);

        let err = client.try_embed("text").unwrap_err();
        assert!(matches!(err, ProviderError::Status { .. }));
    }

    #[test]
    fn test_embed_malformed_payload() {
        let (url, _rx) = serve_once("200 OK", r#"{"vector":[1.0]}"#);
        let client = client_for(&url);

        assert!(matches!(
            client.try_embed("text"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_embed_empty_vector_is_failure() {
        let (url, _rx) = serve_once("200 OK", r#"{"embedding":[]}"#);
        let client = client_for(&url);

        assert!(client.embed("text").is_none());
    }

    #[test]
    fn test_embed_unreachable_host() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = client_for(&format!("http://127.0.0.1:{port}"));

        assert!(client.embed("text").is_none());
    }

    #[test]
    fn test_embed_timeout_is_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // accept and never answer within the client's limit
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
        });

        let mut config = OllamaConfig::new(&format!("http://{addr}"));
        config.embed_timeout = Duration::from_millis(300);
        let client = OllamaClient::new(config).unwrap();

        let start = Instant::now();
        assert!(client.embed("slow").is_none());
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_generate_json_mode() {
        let (url, rx) = serve_once(
            "200 OK",
            r#"{"model":"llama3","response":"{\"rating\": 7}","done":true}"#,
        );
        let client = client_for(&url);

        let response = client.generate("rate this", Some("be strict"), true).unwrap();
        assert_eq!(response, r#"{"rating": 7}"#);

        let request: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        assert_eq!(request["model"], "llama3");
        assert_eq!(request["format"], "json");
        assert_eq!(request["system"], "be strict");
        assert_eq!(request["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_generate_omits_optional_fields() {
        let (url, rx) = serve_once("200 OK", r#"{"response":"ok"}"#);
        let client = client_for(&url);

        client.generate("hi", None, false).unwrap();

        let request: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        assert!(request.get("format").is_none());
        assert!(request.get("system").is_none());
    }
}
