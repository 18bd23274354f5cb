use crate::error::ReadError;
use crate::exposition::{Delivery, Exposition};
use crate::reader::RawSource;
use crate::{convert, ChannelRegistry};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

/// Fixed-period deadlines. Each deadline is the previous one plus the period, so the time
/// spent inside a cycle never shifts later ticks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Schedule {
    next: Instant,
    period: Duration,
}

impl Schedule {
    /// First tick one period after `start`.
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            next: start + period,
            period,
        }
    }

    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn advance(&mut self) -> Instant {
        self.next += self.period;
        self.next
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed,
    /// A read failed on channel `index`; later channels were not visited.
    Aborted { index: usize, error: ReadError },
}

#[derive(Debug)]
pub struct CycleReport {
    pub published: usize,
    pub dropped: usize,
    pub skipped_zero: usize,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed)
    }
}

/// Drives the read, convert, publish cycle over every channel.
pub struct Sampler<R> {
    registry: ChannelRegistry,
    reader: R,
    exposition: Exposition,
    period: Duration,
}

impl<R: RawSource> Sampler<R> {
    pub fn new(
        registry: ChannelRegistry,
        reader: R,
        exposition: Exposition,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            reader,
            exposition,
            period,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn exposition(&self) -> &Exposition {
        &self.exposition
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// One pass over all channels in registry order.
    ///
    /// A zero reading leaves that channel's last value in place. The first read failure
    /// ends the cycle; channels already published in this cycle keep their new value.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport {
            published: 0,
            dropped: 0,
            skipped_zero: 0,
            outcome: CycleOutcome::Completed,
        };
        let mut computed = Vec::with_capacity(self.registry.len());
        for channel in self.registry.channels() {
            let raw = match self.reader.read_raw(channel.index) {
                Ok(raw) => raw,
                Err(e) => {
                    error!(
                        id = channel.index,
                        channel = %channel.name,
                        error = %e,
                        "failed to read value"
                    );
                    report.outcome = CycleOutcome::Aborted {
                        index: channel.index,
                        error: e,
                    };
                    break;
                }
            };
            if raw == 0 {
                debug!(channel = %channel.name, "zero reading, keeping last value");
                report.skipped_zero += 1;
                continue;
            }
            let value = convert(channel, raw);
            computed.push((channel.index, value));
            match self.exposition.publish_value(channel, value).await {
                Delivery::Sent => report.published += 1,
                Delivery::Dropped => report.dropped += 1,
            }
        }
        for (index, value) in computed {
            self.registry.record(index, value);
        }
        report
    }

    /// Run cycles on a drift-free schedule until `shutdown` resolves. Shutdown is only
    /// observed between cycles.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let schedule = Schedule::starting_at(Instant::now(), self.period);
        self.run_with_schedule(schedule, shutdown).await;
    }

    pub async fn run_with_schedule<F>(&mut self, mut schedule: Schedule, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            channels = self.registry.len(),
            period_ms = schedule.period().as_millis() as u64,
            "sampling started"
        );
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("sampling stopped");
                    return;
                }
                _ = sleep_until(schedule.next_deadline()) => {}
            }
            let report = self.run_cycle().await;
            if report.dropped > 0 {
                warn!(dropped = report.dropped, "cycle finished with dropped updates");
            }
            schedule.advance();
        }
    }
}
