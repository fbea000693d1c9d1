pub mod producer;

use std::time::Duration;
use super::{config::Configuration, errors::{AgriError, ErrorCode}};
use rdkafka::{ClientConfig, admin::{AdminClient, AdminOptions, NewTopic, TopicReplication}, client::DefaultClientContext};

pub mod prelude {
    pub const TOPIC_RESET_OTP_ISSUED:    &str = "agrinova.reset.otp.issued";
    pub const TOPIC_CONTACT_SUBMITTED:   &str = "agrinova.contact.submitted";
}

const TOPICS: [&str; 2] = [prelude::TOPIC_RESET_OTP_ISSUED, prelude::TOPIC_CONTACT_SUBMITTED];

///
/// Pre-create the topics the mailer listens to - auto-create isn't reliable in the driver.
///
pub async fn create_topics(config: &Configuration) -> Result<(), AgriError> {
    tracing::info!("Creating kafka topics {:?}", TOPICS);

    let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.kafka_servers)
        .create()
        .map_err(|err| ErrorCode::KafkaSendError.with_msg(&format!("Admin client creation failed: {}", err)))?;

    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_millis(config.kafka_timeout as u64)));

    let topics = TOPICS
        .iter()
        .map(|topic| NewTopic::new(topic, 1, TopicReplication::Fixed(1)))
        .collect::<Vec<NewTopic>>();

    admin_client.create_topics(&topics, &opts)
        .await
        .map_err(|err| ErrorCode::KafkaSendError.with_msg(&format!("Cant create topics: {}", err)))?;

    Ok(())
}
