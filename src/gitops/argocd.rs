// ABOUTME: Primary trigger and status probe backed by the API client.
// ABOUTME: The probe treats a missing application as {Unregistered, Unknown}.

use async_trait::async_trait;

use super::client::{ApiError, ApiErrorKind, ArgoApi};
use super::error::{ProbeError, TriggerError};
use super::traits::{StatusProbe, SyncTrigger};
use super::types::{TriggerAck, TriggerMethod, UnitStatus};
use crate::types::UnitName;

/// Primary trigger: a direct sync request through the API client.
#[derive(Debug, Clone)]
pub struct ApiTrigger {
    api: ArgoApi,
}

impl ApiTrigger {
    pub fn new(api: ArgoApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SyncTrigger for ApiTrigger {
    async fn trigger(&self, unit: &UnitName) -> Result<TriggerAck, TriggerError> {
        self.api
            .sync_application(unit)
            .await
            .map_err(trigger_error)?;

        tracing::debug!(unit = %unit, "sync request accepted");
        Ok(TriggerAck {
            method: TriggerMethod::Client,
        })
    }
}

/// Status probe reading the application's sync/health pair.
#[derive(Debug, Clone)]
pub struct ApiProbe {
    api: ArgoApi,
}

impl ApiProbe {
    pub fn new(api: ArgoApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StatusProbe for ApiProbe {
    async fn probe(&self, unit: &UnitName) -> Result<UnitStatus, ProbeError> {
        match self.api.get_application(unit).await {
            Ok(Some(app)) => Ok(app.unit_status()),
            Ok(None) => Ok(UnitStatus::missing()),
            Err(e) => Err(probe_error(e)),
        }
    }
}

fn trigger_error(e: ApiError) -> TriggerError {
    match e {
        ApiError::Rejected { status, message } => TriggerError::Rejected { status, message },
        other => TriggerError::Unreachable(other.to_string()),
    }
}

fn probe_error(e: ApiError) -> ProbeError {
    match e {
        ApiError::Rejected { status, message } => ProbeError::Rejected { status, message },
        e if e.kind() == ApiErrorKind::Decode => ProbeError::Decode(e.to_string()),
        e => ProbeError::Unreachable(e.to_string()),
    }
}
