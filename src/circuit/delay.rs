//! Fixed-latency delay line over solver time
//!
//! The solver evaluates at trial times that can repeat or move backwards.
//! Samples recorded at or after the newest time form the forward history,
//! kept sorted with at most one sample per time. A sample recorded behind
//! the newest time is a rollback rewrite: it answers queries up to that
//! newest time (the horizon) and is invisible past it, so a rejected trial
//! step never leaks into answers beyond the point it rolled back from.

use crate::core::config::DelayConfig;
use crate::core::error::Result;
use crate::core::types::Time;

/// Slack when comparing `sample.time <= query - delay`, absorbs the rounding
/// in the subtraction (0.15 - 0.1 < 0.05 in binary floating point)
const TIME_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: Time,
    pub value: f64,
}

/// Sample written behind the newest forward time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewrite {
    pub sample: Sample,
    /// Newest forward time when the rewrite was recorded
    pub horizon: Time,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelayLine {
    delay_time: f64,
    default_signal: f64,
    history: Vec<Sample>,
    rewrites: Vec<Rewrite>,
}

impl DelayLine {
    pub fn new(config: &DelayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            delay_time: config.delay_time,
            default_signal: config.default_signal,
            history: Vec::new(),
            rewrites: Vec::new(),
        })
    }

    pub fn delay_time(&self) -> f64 {
        self.delay_time
    }

    pub fn default_signal(&self) -> f64 {
        self.default_signal
    }

    /// Record the upstream signal at `time`, then answer with the value it
    /// held `delay_time` earlier.
    pub fn evaluate(&mut self, time: Time, signal: f64) -> f64 {
        self.record(time, signal);
        self.delayed_value(time)
    }

    pub fn record(&mut self, time: Time, value: f64) {
        let newest = self.history.last().map(|s| s.time);
        match newest {
            Some(horizon) if time < horizon => self.rewrite(time, value, horizon),
            Some(horizon) if time == horizon => {
                if let Some(last) = self.history.last_mut() {
                    last.value = value;
                }
            }
            _ => self.history.push(Sample { time, value }),
        }
    }

    fn rewrite(&mut self, time: Time, value: f64, horizon: Time) {
        let rewrite = Rewrite {
            sample: Sample { time, value },
            horizon,
        };
        let idx = self.rewrites.partition_point(|r| r.sample.time < time);
        match self.rewrites.get_mut(idx) {
            Some(existing) if existing.sample.time == time => *existing = rewrite,
            _ => self.rewrites.insert(idx, rewrite),
        }
    }

    /// Latest sample at or before `time - delay_time` visible at `time`,
    /// or the default.
    ///
    /// Samples recorded at or after `time` never answer, however small the
    /// delay.
    pub fn delayed_value(&self, time: Time) -> f64 {
        let target = self.look_back(time);
        let reaches = |t: Time| t <= target && t < time;

        let forward = self.history[..self.history.partition_point(|s| reaches(s.time))]
            .last()
            .copied();
        let rewritten = self.rewrites[..self.rewrites.partition_point(|r| reaches(r.sample.time))]
            .iter()
            .rev()
            .find(|r| r.horizon >= time)
            .map(|r| r.sample);

        match (forward, rewritten) {
            (Some(f), Some(r)) if f.time > r.time => f.value,
            (_, Some(r)) => r.value,
            (Some(f), None) => f.value,
            (None, None) => self.default_signal,
        }
    }

    /// Drop samples no query at or after `accepted_time` can reach.
    ///
    /// The newest forward sample old enough for `accepted_time` is kept, since
    /// it keeps answering until a later one becomes old enough.
    pub fn prune(&mut self, accepted_time: Time) {
        let target = self.look_back(accepted_time);
        let reachable = self
            .history
            .partition_point(|s| s.time <= target && s.time < accepted_time);
        if reachable > 1 {
            self.history.drain(..reachable - 1);
        }
        let anchor = match self.history.first() {
            Some(first) if reachable > 0 => first.time,
            _ => Time::NEG_INFINITY,
        };
        self.rewrites
            .retain(|r| r.horizon >= accepted_time && r.sample.time >= anchor);
    }

    /// Forward history in time order
    pub fn samples(&self) -> &[Sample] {
        &self.history
    }

    /// Rollback rewrites in time order
    pub fn rewrites(&self) -> &[Rewrite] {
        &self.rewrites
    }

    /// Samples held, forward and rewritten
    pub fn len(&self) -> usize {
        self.history.len() + self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.rewrites.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.rewrites.clear();
    }

    /// Look-back time for a query at `time`. The slack never exceeds half
    /// the delay.
    fn look_back(&self, time: Time) -> Time {
        time - self.delay_time + TIME_TOLERANCE.min(self.delay_time * 0.5)
    }
}
