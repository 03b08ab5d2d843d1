//! Best-effort startup chain: status, then describe, then define.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AdapterConfig;
use crate::core::SolrApi;
use crate::error::AdapterResult;

use super::SolrService;

/// A stage of the startup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    /// Core admin status check.
    Status,
    /// Managed schema read.
    Describe,
    /// Schema reconciliation.
    Define,
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupStage::Status => write!(f, "status"),
            StartupStage::Describe => write!(f, "describe"),
            StartupStage::Define => write!(f, "define"),
        }
    }
}

/// What happened to one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage completed.
    Succeeded,
    /// The stage failed; later stages were skipped.
    Failed {
        /// Error description.
        message: String,
    },
    /// The stage did not run.
    Skipped {
        /// Why it did not run.
        reason: String,
    },
}

impl StageOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        StageOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// Returns true for [`StageOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed { .. })
    }
}

/// Per-stage outcome of one startup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Core status check.
    pub status: StageOutcome,
    /// Schema read.
    pub describe: StageOutcome,
    /// Schema reconciliation.
    pub define: StageOutcome,
}

impl StartupReport {
    /// Returns the stages in execution order.
    pub fn stages(&self) -> [(StartupStage, &StageOutcome); 3] {
        [
            (StartupStage::Status, &self.status),
            (StartupStage::Describe, &self.describe),
            (StartupStage::Define, &self.define),
        ]
    }

    /// Returns the stage that failed, if any.
    pub fn failed_stage(&self) -> Option<StartupStage> {
        self.stages()
            .into_iter()
            .find(|(_, outcome)| outcome.is_failed())
            .map(|(stage, _)| stage)
    }

    /// Returns true if no stage failed.
    pub fn is_healthy(&self) -> bool {
        self.failed_stage().is_none()
    }
}

impl<C: SolrApi + ?Sized + 'static> SolrService<C> {
    /// Creates the service and spawns the startup chain on the current tokio
    /// runtime.
    ///
    /// Returns as soon as the configuration is validated. The service serves
    /// requests whatever the chain's outcome; the handle resolves to the
    /// report, which is also kept on the service.
    pub fn start(
        config: AdapterConfig,
        client: Arc<C>,
    ) -> AdapterResult<(Arc<Self>, JoinHandle<StartupReport>)> {
        let service = Arc::new(Self::new(config, client)?);
        let task_service = Arc::clone(&service);
        let handle = tokio::spawn(async move { task_service.run_startup().await });
        Ok((service, handle))
    }
}

impl<C: SolrApi + ?Sized> SolrService<C> {
    /// Runs status, describe and define in order.
    ///
    /// A failed stage skips the stages after it; nothing done by an earlier
    /// stage is undone. Define is skipped when the schema is not managed.
    pub async fn run_startup(&self) -> StartupReport {
        let core = self.config().core_name().to_string();

        let report = match self.status().await {
            Err(e) => {
                warn!(core = %core, error = %e, "Engine status check failed");
                StartupReport {
                    status: StageOutcome::Failed {
                        message: e.to_string(),
                    },
                    describe: StageOutcome::skipped("status failed"),
                    define: StageOutcome::skipped("status failed"),
                }
            }
            Ok(_) => {
                info!(core = %core, "Engine core is reachable");
                match self.describe().await {
                    Err(e) => {
                        warn!(core = %core, error = %e, "Reading managed schema failed");
                        StartupReport {
                            status: StageOutcome::Succeeded,
                            describe: StageOutcome::Failed {
                                message: e.to_string(),
                            },
                            define: StageOutcome::skipped("describe failed"),
                        }
                    }
                    Ok(observed) => {
                        info!(core = %core, fields = observed.len(), "Managed schema described");
                        let define = if !self.config().managed_schema {
                            StageOutcome::skipped("managed schema disabled")
                        } else {
                            match self.reconcile(&observed).await {
                                Ok(result) => {
                                    info!(
                                        core = %core,
                                        added = result.added.len(),
                                        conflicts = result.conflicts.len(),
                                        "Schema reconciled"
                                    );
                                    StageOutcome::Succeeded
                                }
                                Err(e) => {
                                    warn!(core = %core, error = %e, "Schema reconciliation failed");
                                    StageOutcome::Failed {
                                        message: e.to_string(),
                                    }
                                }
                            }
                        };
                        StartupReport {
                            status: StageOutcome::Succeeded,
                            describe: StageOutcome::Succeeded,
                            define,
                        }
                    }
                }
            }
        };

        *self.startup.write() = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_stage() {
        let report = StartupReport {
            status: StageOutcome::Succeeded,
            describe: StageOutcome::Failed {
                message: "boom".to_string(),
            },
            define: StageOutcome::skipped("describe failed"),
        };
        assert_eq!(report.failed_stage(), Some(StartupStage::Describe));
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_skipped_is_not_failure() {
        let report = StartupReport {
            status: StageOutcome::Succeeded,
            describe: StageOutcome::Succeeded,
            define: StageOutcome::skipped("managed schema disabled"),
        };
        assert!(report.is_healthy());
        assert_eq!(StartupStage::Define.to_string(), "define");
    }
}
