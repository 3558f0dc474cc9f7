//! When to report: change-triggered, startup, and escalating reminders.

use std::time::{Duration, SystemTime};

use wgmon_types::{PeerKey, SortedBuckets};

/// Number of reminder stages. The last stage repeats indefinitely.
const STAGES: usize = 5;

/// The escalating reminder schedule: five delays, each at least as long as
/// the previous. Stage `n` past the last one keeps using the final delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchedule([Duration; STAGES]);

impl ReportSchedule {
    pub fn new(delays: [Duration; STAGES]) -> Self {
        Self(delays)
    }

    pub fn delay(&self, counter: usize) -> Duration {
        self.0[counter.min(STAGES - 1)]
    }
}

impl Default for ReportSchedule {
    /// 6 hours, 1 day, 2 days, 3 days, 7 days.
    fn default() -> Self {
        const HOUR: u64 = 60 * 60;

        Self([
            Duration::from_secs(6 * HOUR),
            Duration::from_secs(24 * HOUR),
            Duration::from_secs(48 * HOUR),
            Duration::from_secs(72 * HOUR),
            Duration::from_secs(7 * 24 * HOUR),
        ])
    }
}

/// The per-cycle outcome of consulting the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDecision {
    /// Whether to render and dispatch a report this cycle.
    pub should_report: bool,
    /// Whether the report is (also) a reminder escalation.
    pub should_remind: bool,
    /// Whether every change this cycle is a peer returning. Such good-news
    /// reports are announced but do not count against the reminder cadence.
    pub only_returns: bool,
}

/// Decides per cycle whether a report is due, and tracks the reminder
/// cadence across cycles.
///
/// `last_report_time` and the reminder counter only move in [`commit`],
/// strictly after dispatch has completed, so a failed dispatch leaves the
/// cadence untouched and the report is retried by the next trigger.
///
/// [`commit`]: ReportScheduler::commit
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    schedule: ReportSchedule,
    last_report_time: Option<SystemTime>,
    reminder_counter: usize,
}

impl ReportScheduler {
    pub fn new(schedule: ReportSchedule) -> Self {
        Self {
            schedule,
            last_report_time: None,
            reminder_counter: 0,
        }
    }

    pub fn reminder_counter(&self) -> usize {
        self.reminder_counter
    }

    pub fn last_report_time(&self) -> Option<SystemTime> {
        self.last_report_time
    }

    /// The delay the current escalation stage requires between reminders.
    pub fn current_delay(&self) -> Duration {
        self.schedule.delay(self.reminder_counter)
    }

    pub fn decide(
        &self,
        now: SystemTime,
        just_started: bool,
        changed: &[PeerKey],
        buckets: &SortedBuckets,
    ) -> CycleDecision {
        let overdue = match self.last_report_time {
            // Never reported: any outage is immediately overdue.
            None => true,
            Some(last) => now
                .duration_since(last)
                .map(|elapsed| elapsed >= self.current_delay())
                .unwrap_or(false),
        };

        let should_remind = !buckets.all_present() && overdue;
        let changed_anything = !changed.is_empty();
        let should_report = changed_anything || just_started || should_remind;

        let only_returns = changed_anything
            && !buckets.just_returned.is_empty()
            && changed.iter().all(|key| {
                buckets
                    .just_returned
                    .iter()
                    .any(|peer| peer.key() == key)
            });

        CycleDecision {
            should_report,
            should_remind,
            only_returns,
        }
    }

    /// Record the outcome of this cycle's dispatch.
    pub fn commit(
        &mut self,
        now: SystemTime,
        decision: CycleDecision,
        all_present: bool,
        success: bool,
    ) {
        if !decision.should_report || decision.only_returns || !success {
            return;
        }

        self.last_report_time = Some(now);

        if all_present {
            self.reminder_counter = 0;
        } else if decision.should_remind {
            self.reminder_counter = (self.reminder_counter + 1).min(STAGES - 1);
        }
    }
}
