//! Sampling benchmark runner.
//!
//! A run brings a database up, opens one client session and times a fixed
//! number of sequential sampling calls:
//!
//! 1. Ensure the database exists (created from a graph when given one)
//! 2. Reset the environment (best effort)
//! 3. Start the server and connect
//! 4. Time each sampling call with a monotonic clock
//! 5. Close the session and stop the server, also when a trial failed
//!
//! Only the sampling call sits inside the timed section; server start,
//! connection setup and teardown are excluded.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use graphbench_config::BenchmarkSettings;
use graphbench_core::{
    node_label, FeatureMatrix, Graph, NeighborSampler, SampledSubgraph, TimingStats,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::client::{Connector, Session};
use crate::error::BackendError;
use crate::reset::{EnvironmentReset, NoopReset};
use crate::traits::Driver;
use crate::types::ServerInfo;

/// Backend label used for in-memory baseline reports.
pub const IN_MEMORY_BACKEND: &str = "memory";

// ============================================================================
// Plan
// ============================================================================

/// Workload of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkPlan {
    /// Number of timed sampling calls
    pub trials: usize,

    /// Seed nodes per call
    pub num_seeds: usize,

    /// Neighbours drawn per hop
    pub fan_out: Vec<usize>,

    /// Fetch features of sampled nodes inside the timed section
    pub fetch_features: bool,

    /// Tensor store the features are read from
    pub store_name: String,
}

impl Default for BenchmarkPlan {
    fn default() -> Self {
        Self {
            trials: 10,
            num_seeds: 64,
            fan_out: vec![5, 5],
            fetch_features: false,
            store_name: "feat".to_string(),
        }
    }
}

impl BenchmarkPlan {
    /// Plan from the `[benchmark]` config section.
    pub fn from_settings(settings: &BenchmarkSettings, store_name: impl Into<String>) -> Self {
        Self {
            trials: settings.trials,
            num_seeds: settings.num_seeds,
            fan_out: settings.fan_out.clone(),
            fetch_features: settings.fetch_features,
            store_name: store_name.into(),
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.trials == 0 {
            return Err(BackendError::configuration(
                "trials must be greater than zero",
            ));
        }
        if self.num_seeds == 0 {
            return Err(BackendError::configuration(
                "num_seeds must be greater than zero",
            ));
        }
        if self.fan_out.is_empty() {
            return Err(BackendError::configuration("fan_out must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Samplers
// ============================================================================

/// Anything that can draw a random subgraph.
#[async_trait]
pub trait Sampler: Send {
    async fn sample(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError>;
}

#[async_trait]
impl Sampler for NeighborSampler {
    async fn sample(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError> {
        Ok(NeighborSampler::sample(self, num_seeds, fan_out))
    }
}

/// In-memory sampler that also gathers feature rows, like a data loader would.
pub struct InMemorySampler {
    sampler: NeighborSampler,
    features: Option<FeatureMatrix>,
}

impl InMemorySampler {
    pub fn new(sampler: NeighborSampler, features: Option<FeatureMatrix>) -> Self {
        Self { sampler, features }
    }
}

#[async_trait]
impl Sampler for InMemorySampler {
    async fn sample(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError> {
        let mut batch = self.sampler.sample(num_seeds, fan_out);
        if let Some(ref features) = self.features {
            batch.features = Some(
                batch
                    .node_ids
                    .iter()
                    .filter_map(|&node| features.row(node).map(<[f32]>::to_vec))
                    .collect(),
            );
        }
        Ok(batch)
    }
}

/// Sampler backed by a client session.
pub struct SessionSampler {
    session: Box<dyn Session>,
    feature_store: Option<String>,
}

impl SessionSampler {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self {
            session,
            feature_store: None,
        }
    }

    /// Also fetch `N<i>` vectors from `store` for every sampled node.
    pub fn with_features(mut self, store: impl Into<String>) -> Self {
        self.feature_store = Some(store.into());
        self
    }

    /// Close the underlying session.
    pub async fn close(mut self) -> Result<(), BackendError> {
        self.session.close().await
    }
}

#[async_trait]
impl Sampler for SessionSampler {
    async fn sample(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError> {
        let mut batch = self.session.subgraph(num_seeds, fan_out).await?;
        if let Some(ref store) = self.feature_store {
            let keys: Vec<String> = batch.node_ids.iter().map(|&n| node_label(n)).collect();
            batch.features = Some(self.session.get_tensors(store, &keys).await?);
        }
        Ok(batch)
    }
}

/// Run `plan.trials` sequential sampling calls and time each one in seconds.
pub async fn time_trials<S: Sampler + ?Sized>(
    sampler: &mut S,
    plan: &BenchmarkPlan,
) -> Result<Vec<f64>, BackendError> {
    let mut timings = Vec::with_capacity(plan.trials);
    for trial in 0..plan.trials {
        let start = Instant::now();
        let batch = sampler.sample(plan.num_seeds, &plan.fan_out).await?;
        let elapsed = start.elapsed().as_secs_f64();

        trace!(
            "Trial {}: {} nodes, {} edges in {:.6}s",
            trial,
            batch.num_nodes(),
            batch.edges.len(),
            elapsed
        );
        timings.push(elapsed);
    }
    Ok(timings)
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of one benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// Backend name (`memory` for the baseline)
    pub backend: String,

    /// Database sampled, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Workload
    pub plan: BenchmarkPlan,

    /// Per-trial durations in seconds
    pub timings: Vec<f64>,

    /// Summary of `timings`
    pub stats: TimingStats,
}

impl BenchmarkReport {
    fn new(
        backend: impl Into<String>,
        database: Option<String>,
        plan: BenchmarkPlan,
        timings: Vec<f64>,
    ) -> Result<Self, BackendError> {
        let stats = TimingStats::from_samples(&timings)
            .ok_or_else(|| BackendError::configuration("no trials were run"))?;
        Ok(Self {
            backend: backend.into(),
            database,
            plan,
            timings,
            stats,
        })
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.database {
            Some(ref name) => write!(f, "{} '{}'", self.backend, name)?,
            None => write!(f, "{}", self.backend)?,
        }
        writeln!(
            f,
            ": {} trials, {} seeds, fan-out {:?}",
            self.plan.trials, self.plan.num_seeds, self.plan.fan_out
        )?;
        write!(f, "{}", self.stats)
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs sampling benchmarks against a database driver.
pub struct SamplingBenchmark {
    driver: Box<dyn Driver>,
    connector: Arc<dyn Connector>,
    reset: Box<dyn EnvironmentReset>,
    plan: BenchmarkPlan,
}

impl SamplingBenchmark {
    pub fn new(driver: Box<dyn Driver>, connector: Arc<dyn Connector>) -> Self {
        Self {
            driver,
            connector,
            reset: Box::new(NoopReset),
            plan: BenchmarkPlan::default(),
        }
    }

    /// Reset hook run before the server starts.
    pub fn with_reset(mut self, reset: Box<dyn EnvironmentReset>) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_plan(mut self, plan: BenchmarkPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn plan(&self) -> &BenchmarkPlan {
        &self.plan
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Give the driver back, e.g. to delete the database afterwards.
    pub fn into_driver(self) -> Box<dyn Driver> {
        self.driver
    }

    /// Benchmark database `name`, creating it from `graph` when absent.
    pub async fn run(
        &mut self,
        name: &str,
        graph: Option<&Graph>,
    ) -> Result<BenchmarkReport, BackendError> {
        self.plan.validate()?;

        if !self.driver.exists(name).await? {
            let Some(graph) = graph else {
                return Err(BackendError::not_found(name));
            };
            self.driver.create(name, graph).await?;
        }

        if let Err(e) = self.reset.reset().await {
            warn!("Environment reset '{}' failed: {}", self.reset.name(), e);
        }

        let info = self.driver.start_server(name).await?;
        let sampled = self.sample_server(&info).await;
        let stopped = self.driver.stop_server().await;
        let timings = sampled?;
        stopped?;

        let report = BenchmarkReport::new(
            self.driver.kind().to_string(),
            Some(name.to_string()),
            self.plan.clone(),
            timings,
        )?;
        info!(
            "Benchmark of '{}' finished: mean {:.6}s over {} trials",
            name, report.stats.mean, report.stats.count
        );
        Ok(report)
    }

    async fn sample_server(&self, info: &ServerInfo) -> Result<Vec<f64>, BackendError> {
        let session = self.connector.connect(&info.host, info.port).await?;
        let mut sampler = SessionSampler::new(session);
        if self.plan.fetch_features {
            sampler = sampler.with_features(self.plan.store_name.clone());
        }

        debug!(
            "Sampling '{}' on port {}: {} trials",
            info.name, info.port, self.plan.trials
        );
        let timed = time_trials(&mut sampler, &self.plan).await;
        let closed = sampler.close().await;
        let timings = timed?;
        closed?;
        Ok(timings)
    }
}

/// Benchmark the in-memory sampler over `graph` as a baseline.
pub async fn run_in_memory(
    graph: &Graph,
    plan: &BenchmarkPlan,
    seed: Option<u64>,
) -> Result<BenchmarkReport, BackendError> {
    plan.validate()?;

    let sampler = match seed {
        Some(seed) => NeighborSampler::with_seed(graph, seed),
        None => NeighborSampler::new(graph),
    };
    let features = if plan.fetch_features {
        graph.features().cloned()
    } else {
        None
    };
    let mut sampler = InMemorySampler::new(sampler, features);

    let timings = time_trials(&mut sampler, plan).await?;
    BenchmarkReport::new(IN_MEMORY_BACKEND, None, plan.clone(), timings)
}
