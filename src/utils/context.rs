use std::{future::Future, sync::Arc, time::Duration};
use parking_lot::RwLock;
use chrono::{DateTime, Utc};
use crate::db::{ContactStore, LedgerStore, OtpStore, Stores, UserStore};
use crate::model::algorithm::ArgonPolicy;
use super::{config::Configuration, errors::AgriError, identity::{GoogleTokenInfo, IdentityVerifier}, notifier::{self, Notifier}, otp::{CodeGenerator, RandomCodeGenerator}, time_provider::TimeProvider};

///
/// The context is available to all gRPC service endpoints and gives them access to the stores,
/// the notifier, config, etc.
///
pub struct ServiceContext {
    config: Configuration,
    stores: Stores,
    argon_policy: ArgonPolicy,
    notifier: Arc<dyn Notifier>,
    generator: Arc<dyn CodeGenerator>,
    identity: Arc<dyn IdentityVerifier>,
    time_provider: RwLock<TimeProvider>,
}

impl ServiceContext {
    pub fn new(config: Configuration, stores: Stores) -> Result<Self, AgriError> {
        Ok(ServiceContext {
            argon_policy: ArgonPolicy::from_config(&config),
            notifier: default_notifier(&config)?,
            generator: Arc::new(RandomCodeGenerator),
            identity: Arc::new(GoogleTokenInfo::new(config.google_client_id.clone())?),
            time_provider: RwLock::new(TimeProvider::default()),
            config,
            stores,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_identity_verifier(mut self, identity: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = identity;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn users(&self) -> &dyn UserStore {
        self.stores.users.as_ref()
    }

    pub fn otps(&self) -> &dyn OtpStore {
        self.stores.otps.as_ref()
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.stores.ledger.as_ref()
    }

    pub fn contacts(&self) -> &dyn ContactStore {
        self.stores.contacts.as_ref()
    }

    pub fn argon_policy(&self) -> &ArgonPolicy {
        &self.argon_policy
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn generator(&self) -> &dyn CodeGenerator {
        self.generator.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityVerifier {
        self.identity.as_ref()
    }

    ///
    /// Run a delivery, giving up after the configured notifier timeout.
    ///
    pub async fn notify<F>(&self, what: &str, delivery: F) -> bool
    where
        F: Future<Output = bool>,
    {
        notifier::bounded(Duration::from_millis(self.config.notifier_timeout_ms), what, delivery).await
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Set or clear the fixed time.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
    }

    pub fn time_fixed(&self) -> bool {
        self.time_provider.read().is_fixed()
    }
}

#[cfg(feature = "kafka")]
fn default_notifier(config: &Configuration) -> Result<Arc<dyn Notifier>, AgriError> {
    Ok(Arc::new(super::kafka::producer::KafkaNotifier::new(config)?))
}

#[cfg(not(feature = "kafka"))]
fn default_notifier(_config: &Configuration) -> Result<Arc<dyn Notifier>, AgriError> {
    Ok(Arc::new(notifier::LogNotifier))
}
