use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use async_trait::async_trait;
use tracing::instrument;
use super::prelude::*;
use rdkafka::{ClientConfig, message::OwnedHeaders, producer::{FutureProducer, FutureRecord}};
use crate::{APP_NAME, model::{contact::Contact, events::{ContactSubmitted, OtpIssued}}, utils::{config::Configuration, errors::{AgriError, ErrorCode}, notifier::Notifier}};

const EVENT_VERSION: u8 = 1;

///
/// Hands notifications to the mailer service over Kafka.
///
pub struct KafkaNotifier {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaNotifier {
    pub fn new(config: &Configuration) -> Result<Self, AgriError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka_servers)
            .set("message.timeout.ms", format!("{}", config.kafka_timeout))
            .create()
            .map_err(|err| ErrorCode::KafkaSendError.with_msg(&format!("Producer creation error: {}", err)))?;

        Ok(KafkaNotifier { producer, timeout: Duration::from_millis(config.kafka_timeout as u64) })
    }

    #[instrument(name="kafka:send", skip(self, event))]
    async fn send<T: Serialize + Sync>(&self, topic: &str, key: &str, event: &T) -> Result<(), AgriError> {
        let payload = serde_json::to_string(event)?;

        self.producer
            .send(
                FutureRecord::to(topic)
                    .payload(&payload)
                    .key(key) // Partition by recipient so their messages stay in order.
                    .headers(OwnedHeaders::new()
                        .add("version", &format!("{}", EVENT_VERSION))
                        .add("sender", APP_NAME)),
                self.timeout,
            )
            .await?;
        Ok(())
    }

    fn delivered(result: Result<(), AgriError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Notification not sent: {}", err);
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn send_otp(&self, email: &str, name: &str, otp: &str, expiry_minutes: i64) -> bool {
        let event = OtpIssued {
            email: email.to_string(),
            name: name.to_string(),
            otp: otp.to_string(),
            expiry_minutes,
            issued_at: Utc::now(),
        };

        Self::delivered(self.send(TOPIC_RESET_OTP_ISSUED, email, &event).await)
    }

    async fn send_contact(&self, contact: &Contact) -> bool {
        let event = ContactSubmitted {
            contact_id: contact.contact_id.clone(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            message: contact.message.clone(),
            submitted_at: contact.created_at,
        };

        Self::delivered(self.send(TOPIC_CONTACT_SUBMITTED, &contact.email, &event).await)
    }
}
