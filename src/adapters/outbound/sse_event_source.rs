// Push source over a server-sent events endpoint.
//
// Purpose
// - Open the shared queue change stream and hand each `message` payload upstream as raw text.
//
// Responsibilities
// - Reconnect on its own after connect failures, bad statuses, stream errors and server closes,
//   waiting the server-advertised `retry` interval (3 s until one is seen).
// - Report every interruption as an error item; the stream itself never ends.
// - Resume with `Last-Event-ID` when the server tags its events.

use std::time::Duration;

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use crate::core::ports::{PushError, PushEventSource, PushStream};

pub const DEFAULT_RETRY: Duration = Duration::from_secs(3);

type SseStream = BoxStream<'static, Result<Event, EventStreamError<reqwest::Error>>>;

enum Phase {
    Connect { delay: Option<Duration> },
    Streaming(SseStream),
}

#[derive(Clone)]
struct Endpoint {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl Endpoint {
    async fn open(&self, last_event_id: Option<&str>) -> Result<SseStream, PushError> {
        let mut request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(id) = last_event_id {
            request = request.header("Last-Event-ID", id);
        }
        let response = request
            .send()
            .await
            .map_err(|e| PushError::Connect(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        Ok(response.bytes_stream().eventsource().boxed())
    }
}

// `phase` holds a stream that is not `Sync`: never hold `&self` across an await.
struct Connection {
    endpoint: Endpoint,
    retry: Duration,
    last_event_id: Option<String>,
    phase: Phase,
}

impl Connection {
    async fn next(mut self) -> Option<(Result<String, PushError>, Self)> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Connect { delay: None }) {
                Phase::Connect { delay } => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    let opened = self.endpoint.open(self.last_event_id.as_deref()).await;
                    match opened {
                        Ok(stream) => {
                            debug!(url = %self.endpoint.url, "push stream connected");
                            self.phase = Phase::Streaming(stream);
                        }
                        Err(error) => {
                            self.phase = Phase::Connect {
                                delay: Some(self.retry),
                            };
                            return Some((Err(error), self));
                        }
                    }
                }
                Phase::Streaming(mut stream) => match stream.next().await {
                    Some(Ok(event)) => {
                        if let Some(retry) = event.retry {
                            self.retry = retry;
                        }
                        if !event.id.is_empty() {
                            self.last_event_id = Some(event.id.clone());
                        }
                        self.phase = Phase::Streaming(stream);
                        let is_message = event.event.is_empty() || event.event == "message";
                        if is_message && !event.data.trim().is_empty() {
                            return Some((Ok(event.data), self));
                        }
                    }
                    Some(Err(error)) => {
                        self.phase = Phase::Connect {
                            delay: Some(self.retry),
                        };
                        return Some((Err(PushError::Stream(error.to_string())), self));
                    }
                    None => {
                        self.phase = Phase::Connect {
                            delay: Some(self.retry),
                        };
                        return Some((Err(PushError::Closed), self));
                    }
                },
            }
        }
    }
}

pub struct SseEventSource {
    endpoint: Endpoint,
}

impl SseEventSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                url: url.into(),
                api_token,
            },
        }
    }
}

impl PushEventSource for SseEventSource {
    fn subscribe(&self) -> PushStream {
        let connection = Connection {
            endpoint: self.endpoint.clone(),
            retry: DEFAULT_RETRY,
            last_event_id: None,
            phase: Phase::Connect { delay: None },
        };
        futures::stream::unfold(connection, Connection::next).boxed()
    }
}
