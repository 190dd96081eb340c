//! Asynchronous fixture discovery driven by the [`LoadBarrier`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::discovery::{discover, DiscoveredFixture, FixtureClassifier, FixtureKind};
use super::{FixtureSet, LoadBarrier};
use crate::config::FixtureConfig;
use crate::error::FixtureError;

/// Summary of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub documents: Vec<String>,
    pub images: Vec<String>,
    /// Files with an unrecognized suffix
    pub skipped: usize,
    /// Files below a dot-prefixed path component
    pub hidden: usize,
}

impl DiscoveryReport {
    pub fn loaded(&self) -> usize {
        self.documents.len() + self.images.len()
    }
}

/// Walks a fixture root and loads every recognized file concurrently.
#[derive(Debug)]
pub struct FixtureLoader {
    classifier: FixtureClassifier,
    fixtures: FixtureSet,
    barrier: Arc<LoadBarrier>,
    settle_timeout: Option<Duration>,
}

impl FixtureLoader {
    pub fn new(config: &FixtureConfig) -> Self {
        Self {
            classifier: FixtureClassifier::from_config(config),
            fixtures: FixtureSet::new(),
            barrier: Arc::new(LoadBarrier::new()),
            settle_timeout: config.settle_timeout(),
        }
    }

    /// Load into an existing registry instead of a fresh one.
    pub fn with_fixture_set(mut self, fixtures: FixtureSet) -> Self {
        self.fixtures = fixtures;
        self
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    pub fn barrier(&self) -> &Arc<LoadBarrier> {
        &self.barrier
    }

    /// Reset the barrier and install the action run once every fixture is in.
    ///
    /// Must precede [`FixtureLoader::begin_discovery`].
    pub fn configure_barrier<F>(&self, on_settled: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.barrier.configure(on_settled);
    }

    /// Enumerate `root`, load every recognized fixture and wait for the
    /// barrier to fire.
    ///
    /// The first read or parse failure aborts the run; loads still in flight
    /// are cancelled and the barrier never fires.
    pub async fn begin_discovery(&self, root: &Path) -> Result<DiscoveryReport, FixtureError> {
        let walk_root = root.to_path_buf();
        let classifier = self.classifier.clone();
        let discovery =
            tokio::task::spawn_blocking(move || discover(&walk_root, &classifier)).await??;

        let mut report = DiscoveryReport {
            skipped: discovery.skipped,
            hidden: discovery.hidden,
            ..DiscoveryReport::default()
        };
        let mut tasks = JoinSet::new();
        for fixture in discovery.fixtures {
            match fixture.kind {
                FixtureKind::Document => report.documents.push(fixture.name.clone()),
                FixtureKind::Image => report.images.push(fixture.name.clone()),
            }
            self.barrier.register();
            tasks.spawn(load_fixture(
                self.fixtures.clone(),
                Arc::clone(&self.barrier),
                fixture,
            ));
        }
        self.barrier.finish_discovery();
        info!(
            root = %root.display(),
            documents = report.documents.len(),
            images = report.images.len(),
            skipped = report.skipped,
            hidden = report.hidden,
            "fixture discovery finished"
        );

        let settled = self.barrier.settled();
        let wait = async {
            while let Some(joined) = tasks.join_next().await {
                joined??;
            }
            settled.await.map_err(|_| FixtureError::BarrierClosed)
        };

        match self.settle_timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                FixtureError::SettleTimeout {
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    outstanding: self.barrier.outstanding(),
                }
            })??,
            None => wait.await?,
        }

        report.documents.sort();
        report.images.sort();
        Ok(report)
    }
}

async fn load_fixture(
    fixtures: FixtureSet,
    barrier: Arc<LoadBarrier>,
    fixture: DiscoveredFixture,
) -> Result<(), FixtureError> {
    let content = tokio::fs::read(&fixture.path)
        .await
        .map_err(|source| FixtureError::Read {
            path: fixture.path.clone(),
            source,
        })?;
    let size = content.len();

    match fixture.kind {
        FixtureKind::Document => {
            fixtures.load_document(fixture.name.as_str(), content)?;
        }
        FixtureKind::Image => {
            fixtures.load_image(fixture.name.as_str(), content);
        }
    }
    debug!(fixture = %fixture.name, bytes = size, "fixture loaded");

    barrier.complete();
    Ok(())
}
