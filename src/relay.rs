use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::models::{ChatChunk, ChatMessage, ChatRequest};

// Fixed sampling temperature for prompt generation
const TEMPERATURE: f32 = 0.7;

// Issue the single streaming completion request. Failures here happen before
// anything has been written to the client, so the caller can still answer
// with a JSON error.
pub async fn open_stream(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    prompt: &str,
) -> Result<reqwest::Response, reqwest::Error> {
    let request = ChatRequest {
        model: provider.model.clone(),
        temperature: TEMPERATURE,
        messages: vec![ChatMessage::user(prompt)],
        stream: true,
    };

    client
        .post(format!("{}/chat/completions", provider.base_url))
        .bearer_auth(&provider.api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()
}

// Incremental decoder for the upstream event-stream body. Bytes are buffered
// until a newline arrives, so a multi-byte character split across network
// chunks is reassembled before JSON decoding.
pub struct ChunkDecoder {
    buf: Vec<u8>,
    done: bool,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            done: false,
        }
    }

    // True once the upstream has sent its end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.done
    }

    // Feed raw bytes from the upstream body; returns the content fragments
    // completed by this chunk, in arrival order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }
        self.buf.extend_from_slice(bytes);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            let Some(payload) = line.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim_start();
            if payload == "[DONE]" {
                self.done = true;
                self.buf.clear();
                break;
            }

            match serde_json::from_str::<ChatChunk>(payload) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);
                    if let Some(content) = content {
                        if !content.is_empty() {
                            fragments.push(content);
                        }
                    }
                }
                Err(err) => debug!(error = %err, "skipping undecodable upstream line"),
            }
        }
        fragments
    }
}

// Lazy, ordered, finite stream of text fragments. Dropping it drops the
// upstream response, which aborts the provider call when the client goes
// away mid-stream. A transport error after streaming has begun ends the
// stream early: the client sees truncated output, not an error record.
pub fn fragment_stream(upstream: reqwest::Response) -> impl Stream<Item = String> {
    let body = upstream.bytes_stream().boxed();
    stream::unfold(
        (body, ChunkDecoder::new(), VecDeque::new()),
        |(mut body, mut decoder, mut pending)| async move {
            loop {
                if let Some(fragment) = pending.pop_front() {
                    return Some((fragment, (body, decoder, pending)));
                }
                if decoder.is_done() {
                    return None;
                }
                match body.next().await {
                    Some(Ok(bytes)) => pending.extend(decoder.feed(&bytes)),
                    Some(Err(err)) => {
                        warn!(error = %err, "upstream stream failed mid-flight, output truncated");
                        return None;
                    }
                    None => return None,
                }
            }
        },
    )
}
