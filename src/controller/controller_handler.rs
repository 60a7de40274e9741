use super::clock::CycleClock;
use super::types::{CycleReport, MonitorState, MonitorStats};
use crate::configuration::config::Config;
use crate::connection_tracking::{
    dedup_by_identity, AgeRegistry, ConnectionParser, EvictionPolicy,
};
use crate::error_handling::types::{ControllerError, EnumeratorError};
use crate::system_tools::{
    CommandEnumerator, CommandTerminator, ConnectionEnumerator, ConnectionTerminator,
};
use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};

/// The monitor loop.
///
/// Owns the [`AgeRegistry`] for the whole process lifetime and drives one cycle at a time:
/// poll the enumerator, parse, reconcile the registry, evict expired connections, sleep.
/// Cycles never overlap, so the registry needs no locking.
///
/// No error escapes a cycle. Enumerator failures abort the current cycle only, malformed
/// lines are skipped and termination failures are logged and counted.
pub struct Controller<E, T> {
    config: Config,
    enumerator: E,
    terminator: T,
    parser: ConnectionParser,
    policy: EvictionPolicy,
    registry: AgeRegistry,
    state: MonitorState,
    stats: MonitorStats,
}

impl Controller<CommandEnumerator, CommandTerminator> {
    /// Builds a controller backed by the external tools named in `config`.
    pub fn from_config(config: Config) -> Result<Self, ControllerError> {
        let enumerator = CommandEnumerator::new(&config.enumerator);
        let terminator = CommandTerminator::new(&config.terminator);
        Self::new(config, enumerator, terminator)
    }
}

impl<E, T> Controller<E, T>
where
    E: ConnectionEnumerator,
    T: ConnectionTerminator,
{
    pub fn new(config: Config, enumerator: E, terminator: T) -> Result<Self, ControllerError> {
        config.validate()?;
        let max_age = config.max_connection_age()?;

        info!(
            "Monitor configured: interval {}s, maximum connection age {}s, enumerator `{}`, terminator `{}`",
            config.monitor_interval_secs,
            config.max_connection_age_secs,
            config.enumerator.program,
            config.terminator.program
        );

        Ok(Self {
            parser: ConnectionParser::new(&config.enumerator),
            policy: EvictionPolicy::new(max_age),
            registry: AgeRegistry::new(),
            state: MonitorState::Idle,
            stats: MonitorStats::default(),
            config,
            enumerator,
            terminator,
        })
    }

    /// Runs cycles forever, sleeping the configured interval after each one.
    pub async fn run(&mut self) {
        info!("Starting connection monitor");
        let interval = self.config.monitor_interval();
        let clock = CycleClock::start();

        loop {
            let report = self.run_cycle(clock.now()).await;
            debug!("Cycle finished: {:?}", report);

            tokio::time::sleep(interval).await;
            self.transition(MonitorState::Idle);
        }
    }

    /// Runs one full cycle using `now` as the cycle's clock.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        info!("Monitoring established connections...");
        let mut report = CycleReport::default();

        self.transition(MonitorState::Polling);
        let output = match self.poll().await {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to list connections, skipping this cycle: {}", e);
                report.enumerator_failed = true;
                report.tracked = self.registry.len();
                return self.finish_cycle(report);
            }
        };

        self.transition(MonitorState::Parsing);
        let listing = self.parser.parse(&output);
        report.observed = listing.records.len();
        report.skipped_lines = listing.issues.len();
        if !listing.issues.is_empty() {
            warn!("Skipped {} malformed connection line(s)", listing.issues.len());
        }

        self.transition(MonitorState::Reconciling);
        let records = dedup_by_identity(listing.records);
        report.unique = records.len();
        let summary = self.registry.reconcile(&records, now);
        debug!(
            "Registry reconciled: {} new, {} closed, {} still open",
            summary.inserted, summary.removed, summary.retained
        );

        self.transition(MonitorState::Evicting);
        let expired = self.policy.select(&records, &self.registry, now);
        report.expired = expired.len();

        for aged in expired {
            let record = aged.record;
            info!(
                "Killing connection: {} (age {}s > {}s)",
                record,
                aged.age.num_seconds(),
                self.policy.max_age().num_seconds()
            );

            match self.terminator.terminate(&record).await {
                // the entry stays until a poll stops listing the connection, so one that
                // survives the reset keeps its age and is evicted again next cycle
                Ok(()) => {
                    info!("Connection killed successfully: {}", record.identity());
                    report.evicted += 1;
                }
                Err(e) => {
                    error!("Failed to drop connection {}: {}", record.identity(), e);
                    report.failed_terminations += 1;
                }
            }
        }

        report.tracked = self.registry.len();
        self.finish_cycle(report)
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    pub fn registry(&self) -> &AgeRegistry {
        &self.registry
    }

    async fn poll(&self) -> Result<String, EnumeratorError> {
        let retries = self.config.enumerator.retries;
        let mut attempt = 0;

        loop {
            match self.enumerator.list_connections().await {
                Ok(output) => return Ok(output),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!("{} (attempt {}/{}), retrying", e, attempt, retries + 1);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn finish_cycle(&mut self, report: CycleReport) -> CycleReport {
        self.stats.record(&report);
        self.transition(MonitorState::Sleeping);
        report
    }

    fn transition(&mut self, next: MonitorState) {
        trace!("Monitor state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
