// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Wall-clock trigger for update cycles
//!
//! `Schedule` decides when the next cycle is due; `UpdateScheduler` owns a
//! background thread that wakes once a second, and fires
//! [`UpdateOrchestrator::try_run_configured_cycle`] when the due time passes.
//! A tick that finds the previous cycle still running is skipped.

use crate::error::{UpdaterError, UpdaterResult};
use crate::orchestrator::{CycleStats, UpdateOrchestrator};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, warn};

const TICK: StdDuration = StdDuration::from_secs(1);

/// When update cycles run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Schedule {
    /// Fixed interval from the previous due time
    Every { minutes: u32 },
    /// Every hour at `minute`
    Hourly { minute: u32 },
    /// Every day at `hour:minute` local time
    Daily { hour: u32, minute: u32 },
    /// Every week on `weekday` at `hour:minute` local time
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Daily { hour: 3, minute: 0 }
    }
}

impl Schedule {
    pub fn validate(&self) -> UpdaterResult<()> {
        let (hour, minute) = match *self {
            Schedule::Every { minutes } => {
                if minutes == 0 {
                    return Err(UpdaterError::InvalidSchedule(
                        "interval must be at least one minute".to_string(),
                    ));
                }
                return Ok(());
            }
            Schedule::Hourly { minute } => (0, minute),
            Schedule::Daily { hour, minute } => (hour, minute),
            Schedule::Weekly { hour, minute, .. } => (hour, minute),
        };

        if hour > 23 {
            return Err(UpdaterError::InvalidSchedule(format!("hour {} out of range 0-23", hour)));
        }
        if minute > 59 {
            return Err(UpdaterError::InvalidSchedule(format!(
                "minute {} out of range 0-59",
                minute
            )));
        }
        Ok(())
    }

    /// First due time strictly after `after`, in the same timezone
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> DateTime<Tz> {
        let local = after.naive_local();
        let date = local.date();

        let due = match *self {
            Schedule::Every { minutes } => {
                return after.clone() + Duration::minutes(i64::from(minutes.max(1)));
            }
            Schedule::Hourly { minute } => {
                let candidate = date.and_time(clock(local.hour(), minute));
                if candidate <= local {
                    candidate + Duration::hours(1)
                } else {
                    candidate
                }
            }
            Schedule::Daily { hour, minute } => {
                let candidate = date.and_time(clock(hour, minute));
                if candidate <= local {
                    candidate + Duration::days(1)
                } else {
                    candidate
                }
            }
            Schedule::Weekly {
                weekday,
                hour,
                minute,
            } => {
                let ahead = (7 + weekday.num_days_from_monday() - local.weekday().num_days_from_monday()) % 7;
                let candidate = (date + Duration::days(i64::from(ahead))).and_time(clock(hour, minute));
                if candidate <= local {
                    candidate + Duration::weeks(1)
                } else {
                    candidate
                }
            }
        };

        resolve(&after.timezone(), due).unwrap_or_else(|| after.clone() + Duration::hours(1))
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Every { minutes } => write!(f, "every {} minutes", minutes),
            Schedule::Hourly { minute } => write!(f, "hourly at :{:02}", minute),
            Schedule::Daily { hour, minute } => write!(f, "daily at {:02}:{:02}", hour, minute),
            Schedule::Weekly {
                weekday,
                hour,
                minute,
            } => write!(f, "weekly on {} at {:02}:{:02}", weekday, hour, minute),
        }
    }
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

// None inside a DST gap
fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Background runner for a configured orchestrator
pub struct UpdateScheduler {
    orchestrator: Arc<UpdateOrchestrator>,
    schedule: Schedule,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl UpdateScheduler {
    pub fn new(orchestrator: Arc<UpdateOrchestrator>, schedule: Schedule) -> UpdaterResult<Self> {
        schedule.validate()?;
        Ok(Self {
            orchestrator,
            schedule,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    pub fn next_run(&self) -> DateTime<Local> {
        self.schedule.next_after(&Local::now())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one configured cycle on the calling thread, waiting for any
    /// cycle already in progress
    pub fn run_now(&self) -> CycleStats {
        info!("Manual update triggered");
        self.orchestrator.run_configured_cycle()
    }

    /// Start the background thread. No-op when already started.
    pub fn start(&mut self) -> UpdaterResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scheduler already running");
            return Ok(());
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        let running = Arc::clone(&self.running);
        let schedule = self.schedule;

        let handle = thread::Builder::new()
            .name("neodict-scheduler".to_string())
            .spawn(move || run_loop(&orchestrator, schedule, &running))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                UpdaterError::Io(e)
            })?;

        self.handle = Some(handle);
        info!(schedule = %self.schedule, next_run = %self.next_run(), "Scheduler started");
        Ok(())
    }

    /// Start the loop and block the calling thread on it. The loop runs
    /// until the process is terminated.
    pub fn run_blocking(&mut self) -> UpdaterResult<()> {
        self.start()?;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Scheduler thread panicked");
            }
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Signal the thread and wait for it. A cycle in progress finishes first.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Scheduler thread panicked");
            }
            info!("Scheduler stopped");
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(orchestrator: &UpdateOrchestrator, schedule: Schedule, running: &AtomicBool) {
    let mut due = schedule.next_after(&Local::now());

    while running.load(Ordering::SeqCst) {
        let now = Local::now();
        if now >= due {
            match orchestrator.try_run_configured_cycle() {
                Some(stats) if stats.is_success() => {
                    debug!(added = stats.added, updated = stats.updated, "Scheduled cycle finished");
                }
                Some(stats) => {
                    error!(status = ?stats.status, "Scheduled cycle failed");
                }
                None => {
                    warn!("Previous cycle still running, skipping scheduled run");
                }
            }
            due = schedule.next_after(&Local::now());
            info!(next_run = %due, "Next update scheduled");
        }
        thread::sleep(TICK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_daily_later_today() {
        let schedule = Schedule::Daily { hour: 3, minute: 0 };
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 1, 30)), at(2024, 5, 1, 3, 0));
    }

    #[test]
    fn test_daily_rolls_to_tomorrow() {
        let schedule = Schedule::Daily { hour: 3, minute: 0 };
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 3, 0)), at(2024, 5, 2, 3, 0));
        assert_eq!(schedule.next_after(&at(2024, 12, 31, 22, 0)), at(2025, 1, 1, 3, 0));
    }

    #[test]
    fn test_hourly() {
        let schedule = Schedule::Hourly { minute: 15 };
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 10, 5)), at(2024, 5, 1, 10, 15));
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 10, 20)), at(2024, 5, 1, 11, 15));
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 23, 20)), at(2024, 5, 2, 0, 15));
    }

    #[test]
    fn test_weekly() {
        // 2024-05-01 is a Wednesday
        let schedule = Schedule::Weekly {
            weekday: Weekday::Mon,
            hour: 9,
            minute: 0,
        };
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 12, 0)), at(2024, 5, 6, 9, 0));

        let same_day = Schedule::Weekly {
            weekday: Weekday::Wed,
            hour: 9,
            minute: 0,
        };
        assert_eq!(same_day.next_after(&at(2024, 5, 1, 8, 0)), at(2024, 5, 1, 9, 0));
        assert_eq!(same_day.next_after(&at(2024, 5, 1, 12, 0)), at(2024, 5, 8, 9, 0));
    }

    #[test]
    fn test_every() {
        let schedule = Schedule::Every { minutes: 90 };
        assert_eq!(schedule.next_after(&at(2024, 5, 1, 12, 0)), at(2024, 5, 1, 13, 30));
    }

    #[test]
    fn test_validate() {
        assert!(Schedule::Daily { hour: 24, minute: 0 }.validate().is_err());
        assert!(Schedule::Hourly { minute: 60 }.validate().is_err());
        assert!(Schedule::Every { minutes: 0 }.validate().is_err());
        assert!(Schedule::default().validate().is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Schedule::Daily { hour: 3, minute: 5 }.to_string(), "daily at 03:05");
        assert_eq!(Schedule::Hourly { minute: 0 }.to_string(), "hourly at :00");
    }
}
