// Copyright 2026 KMFlow Engineering

//! An in-memory stream backend for tests and local development, playing
//! the same role `dashflow-streaming::backends::memory` plays for that
//! crate's test suite: no broker required, consumer-group offset tracking
//! preserved, messages lost on drop.

use super::traits::{DurableStream, StreamConsumer, StreamProducer};
use crate::errors::{Result, StreamError};
use crate::message::StreamMessage;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Soft cap on stored messages per topic, to avoid unbounded growth in
/// long-running test processes.
pub const DEFAULT_MAX_MESSAGES_PER_TOPIC: usize = 100_000;

const NOTIFICATION_CHANNEL_CAPACITY: usize = 1024;

struct TopicData {
    messages: tokio::sync::RwLock<Vec<StreamMessage>>,
    next_offset: AtomicI64,
    sender: broadcast::Sender<()>,
}

impl TopicData {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self {
            messages: tokio::sync::RwLock::new(Vec::new()),
            next_offset: AtomicI64::new(0),
            sender,
        }
    }
}

struct ConsumerGroupOffsets {
    offsets: DashMap<String, i64>,
}

/// In-memory implementation of [`DurableStream`].
pub struct InMemoryStream {
    topics: Arc<DashMap<String, Arc<TopicData>>>,
    consumer_groups: Arc<DashMap<String, Arc<ConsumerGroupOffsets>>>,
    closed: AtomicBool,
    max_messages_per_topic: usize,
}

impl InMemoryStream {
    /// A backend with the default per-topic message cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_messages_per_topic(DEFAULT_MAX_MESSAGES_PER_TOPIC)
    }

    /// A backend with a caller-chosen per-topic message cap.
    #[must_use]
    pub fn with_max_messages_per_topic(max_messages_per_topic: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            consumer_groups: Arc::new(DashMap::new()),
            closed: AtomicBool::new(false),
            max_messages_per_topic,
        }
    }

    fn get_or_create_topic(&self, topic: &str) -> Arc<TopicData> {
        self.topics.entry(topic.to_string()).or_insert_with(|| Arc::new(TopicData::new())).clone()
    }

    fn get_or_create_group(&self, group_id: &str) -> Arc<ConsumerGroupOffsets> {
        self.consumer_groups
            .entry(group_id.to_string())
            .or_insert_with(|| Arc::new(ConsumerGroupOffsets { offsets: DashMap::new() }))
            .clone()
    }

    /// Number of undelivered-or-delivered messages retained for `topic`,
    /// for test assertions about exactly-once-visible graph state under
    /// replay (S6).
    pub async fn topic_message_count(&self, topic: &str) -> usize {
        match self.topics.get(topic) {
            Some(t) => t.messages.read().await.len(),
            None => 0,
        }
    }
}

impl Default for InMemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStream for InMemoryStream {
    type Producer = InMemoryProducer;
    type Consumer = InMemoryConsumer;

    async fn producer(&self, topic: &str) -> Result<Self::Producer> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(StreamError::Closed);
        }
        Ok(InMemoryProducer {
            topic: topic.to_string(),
            topic_data: self.get_or_create_topic(topic),
            max_messages_per_topic: self.max_messages_per_topic,
        })
    }

    async fn consumer(&self, topic: &str, group_id: &str) -> Result<Self::Consumer> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(StreamError::Closed);
        }
        let topic_data = self.get_or_create_topic(topic);
        let group = self.get_or_create_group(group_id);
        let start_offset = group.offsets.get(topic).map_or(0, |r| *r);
        Ok(InMemoryConsumer {
            topic: topic.to_string(),
            group_id: group_id.to_string(),
            topic_data,
            group_offsets: group,
            current_offset: start_offset,
            receiver: None,
        })
    }

    async fn health_check(&self) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            Err(StreamError::Closed)
        } else {
            Ok(())
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Producer half of [`InMemoryStream`].
pub struct InMemoryProducer {
    topic: String,
    topic_data: Arc<TopicData>,
    max_messages_per_topic: usize,
}

#[async_trait]
impl StreamProducer for InMemoryProducer {
    async fn send(&self, message: StreamMessage) -> Result<()> {
        let mut messages = self.topic_data.messages.write().await;
        if messages.len() >= self.max_messages_per_topic {
            return Err(StreamError::Backend(format!(
                "topic '{}' exceeded max_messages_per_topic={}",
                self.topic, self.max_messages_per_topic
            )));
        }
        self.topic_data.next_offset.fetch_add(1, Ordering::SeqCst);
        messages.push(message);
        let _ = self.topic_data.sender.send(());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

/// Consumer half of [`InMemoryStream`], scoped to one topic and group.
pub struct InMemoryConsumer {
    topic: String,
    group_id: String,
    topic_data: Arc<TopicData>,
    group_offsets: Arc<ConsumerGroupOffsets>,
    current_offset: i64,
    receiver: Option<broadcast::Receiver<()>>,
}

#[async_trait]
impl StreamConsumer for InMemoryConsumer {
    async fn next(&mut self) -> Option<Result<StreamMessage>> {
        loop {
            {
                let messages = self.topic_data.messages.read().await;
                if let Some(message) = messages.get(self.current_offset as usize) {
                    self.current_offset += 1;
                    return Some(Ok(message.clone()));
                }
            }
            if self.receiver.is_none() {
                self.receiver = Some(self.topic_data.sender.subscribe());
            }
            if let Some(ref mut rx) = self.receiver {
                match rx.recv().await {
                    Ok(()) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        }
    }

    async fn next_timeout(&mut self, timeout: Duration) -> Option<Result<StreamMessage>> {
        tokio::time::timeout(timeout, self.next()).await.unwrap_or(None)
    }

    async fn commit(&mut self) -> Result<()> {
        self.group_offsets.offsets.insert(self.topic.clone(), self.current_offset);
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn group_id(&self) -> &str {
        &self.group_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kmflow_core::domain::TaskKind;
    use serde_json::json;

    fn msg(task_id: &str) -> StreamMessage {
        StreamMessage::first_attempt("e1", task_id, TaskKind::Ingest, json!({}))
    }

    #[tokio::test]
    async fn send_and_receive_round_trips_in_order() {
        let backend = InMemoryStream::new();
        let producer = backend.producer("evidence.ingested").await.unwrap();
        let mut consumer = backend.consumer("evidence.ingested", "projector").await.unwrap();

        producer.send(msg("t1")).await.unwrap();
        producer.send(msg("t2")).await.unwrap();

        let first = consumer.next_timeout(Duration::from_millis(100)).await.unwrap().unwrap();
        let second = consumer.next_timeout(Duration::from_millis(100)).await.unwrap().unwrap();
        assert_eq!(first.task_id, "t1");
        assert_eq!(second.task_id, "t2");
    }

    #[tokio::test]
    async fn new_consumer_in_same_group_resumes_from_committed_offset() {
        let backend = InMemoryStream::new();
        let producer = backend.producer("evidence.ingested").await.unwrap();
        for i in 0..3 {
            producer.send(msg(&format!("t{i}"))).await.unwrap();
        }

        let mut first_consumer = backend.consumer("evidence.ingested", "group").await.unwrap();
        let _ = first_consumer.next_timeout(Duration::from_millis(100)).await;
        let _ = first_consumer.next_timeout(Duration::from_millis(100)).await;
        first_consumer.commit().await.unwrap();

        let second_consumer = backend.consumer("evidence.ingested", "group").await.unwrap();
        assert_eq!(second_consumer.current_offset, 2);
    }

    #[tokio::test]
    async fn timeout_returns_none_when_no_message_arrives() {
        let backend = InMemoryStream::new();
        let _ = backend.producer("empty").await.unwrap();
        let mut consumer = backend.consumer("empty", "group").await.unwrap();
        assert!(consumer.next_timeout(Duration::from_millis(30)).await.is_none());
    }

    #[tokio::test]
    async fn closed_backend_rejects_new_producers_and_consumers() {
        let backend = InMemoryStream::new();
        backend.close().await.unwrap();
        assert!(matches!(backend.producer("x").await, Err(StreamError::Closed)));
        assert!(matches!(backend.consumer("x", "g").await, Err(StreamError::Closed)));
    }

    #[tokio::test]
    async fn distinct_engagements_do_not_interleave_across_topics() {
        let backend = InMemoryStream::new();
        let producer_a = backend.producer("topic-a").await.unwrap();
        let producer_b = backend.producer("topic-b").await.unwrap();
        let mut consumer_a = backend.consumer("topic-a", "g").await.unwrap();
        let mut consumer_b = backend.consumer("topic-b", "g").await.unwrap();

        producer_a.send(msg("a1")).await.unwrap();
        producer_b.send(msg("b1")).await.unwrap();

        let from_a = consumer_a.next_timeout(Duration::from_millis(100)).await.unwrap().unwrap();
        let from_b = consumer_b.next_timeout(Duration::from_millis(100)).await.unwrap().unwrap();
        assert_eq!(from_a.task_id, "a1");
        assert_eq!(from_b.task_id, "b1");
    }
}
