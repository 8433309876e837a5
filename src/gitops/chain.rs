// ABOUTME: Primary/fallback trigger selection as explicit composition.
// ABOUTME: Tries the primary once, warns, then tries the fallback.

use async_trait::async_trait;

use super::error::TriggerError;
use super::traits::SyncTrigger;
use super::types::TriggerAck;
use crate::types::UnitName;

/// Composes two triggers with a defined preference order.
///
/// The choice is made here by injection, never by probing the environment
/// for installed tooling.
pub struct FallbackTrigger<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackTrigger<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: SyncTrigger, F: SyncTrigger> SyncTrigger for FallbackTrigger<P, F> {
    async fn trigger(&self, unit: &UnitName) -> Result<TriggerAck, TriggerError> {
        let primary_err = match self.primary.trigger(unit).await {
            Ok(ack) => return Ok(ack),
            Err(e) => e,
        };

        tracing::warn!(
            unit = %unit,
            "primary trigger failed ({}), attempting fallback",
            primary_err
        );

        match self.fallback.trigger(unit).await {
            Ok(ack) => Ok(ack),
            Err(fallback_err) => Err(TriggerError::AllMethodsFailed {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }
}
