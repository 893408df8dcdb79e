//! Stage 4: Place tasks on the calendar
//!
//! Tasks are visited in topological order (ties by declaration order). Each
//! one gets the earliest slot that starts after all of its dependencies end
//! and does not overlap anything already booked for its assignee.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::planner::config::ScheduleOptions;
use crate::planner::dependency_graph::DependencyGraph;
use crate::planner::error::{PlanError, PlanResult};
use crate::planner::types::{Roster, ScheduledTask, Task};
use project_planner_sdk::log_info;
use tracing::debug;

/// Working-day arithmetic for the configured calendar
#[derive(Debug, Clone, Copy)]
pub struct WorkCalendar {
    skip_weekends: bool,
}

impl WorkCalendar {
    pub fn new(skip_weekends: bool) -> Self {
        Self { skip_weekends }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.skip_weekends || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// First working day on or after `date`
    pub fn align(&self, mut date: NaiveDate) -> PlanResult<NaiveDate> {
        while !self.is_working_day(date) {
            date = next_day(date)?;
        }
        Ok(date)
    }

    /// Last day of a `days`-long working interval beginning at `start`
    pub fn end_for(&self, start: NaiveDate, days: u32) -> PlanResult<NaiveDate> {
        let mut end = start;
        let mut remaining = days.saturating_sub(1);
        while remaining > 0 {
            end = next_day(end)?;
            if self.is_working_day(end) {
                remaining -= 1;
            }
        }
        Ok(end)
    }
}

fn next_day(date: NaiveDate) -> PlanResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| PlanError::scheduling(format!("date overflow after {}", date)))
}

/// Working days needed for an estimate, never less than one
pub fn duration_days(estimated_hours: u32, hours_per_day: u32) -> u32 {
    estimated_hours.div_ceil(hours_per_day).max(1)
}

/// Schedule validated tasks; output keeps the input order
pub fn generate_calendar(
    tasks: &[Task],
    roster: &Roster,
    options: &ScheduleOptions,
) -> PlanResult<Vec<ScheduledTask>> {
    if options.hours_per_day == 0 {
        return Err(PlanError::scheduling("hours per day must be positive"));
    }
    if let Some(task) = tasks.iter().find(|t| !roster.contains(&t.assignee)) {
        return Err(PlanError::scheduling(format!(
            "task '{}' reached the calendar with unknown assignee '{}'",
            task.id, task.assignee
        )));
    }

    // Upstream validation guarantees a DAG; anything else is an internal fault
    let graph = DependencyGraph::build(tasks).map_err(|e| PlanError::scheduling(e.to_string()))?;
    let order = graph.topological_order()?;

    let calendar = WorkCalendar::new(options.skip_weekends);
    let project_start = calendar.align(options.start_date)?;
    log_info!(
        "Scheduling {} tasks from {} ({} h/day{})",
        tasks.len(),
        project_start,
        options.hours_per_day,
        if options.skip_weekends { ", weekdays only" } else { "" }
    );

    let mut slots: Vec<Option<(NaiveDate, NaiveDate)>> = vec![None; tasks.len()];
    let mut booked: HashMap<&str, Vec<(NaiveDate, NaiveDate)>> = HashMap::new();

    for idx in order {
        let task = &tasks[idx];

        let mut earliest = project_start;
        for &dep in graph.dependencies_of(idx) {
            let (_, dep_end) = slots[dep].ok_or_else(|| {
                PlanError::scheduling(format!(
                    "dependency '{}' of '{}' was not scheduled first",
                    graph.id(dep),
                    task.id
                ))
            })?;
            earliest = earliest.max(next_day(dep_end)?);
        }

        let days = duration_days(task.estimated_hours, options.hours_per_day);
        let intervals = booked.entry(task.assignee.as_str()).or_default();

        let mut start = calendar.align(earliest)?;
        let mut end = calendar.end_for(start, days)?;
        while !options.allow_double_booking {
            let clash = intervals
                .iter()
                .find(|&&(busy_start, busy_end)| busy_start <= end && start <= busy_end)
                .map(|&(_, busy_end)| busy_end);
            match clash {
                Some(busy_end) => {
                    start = calendar.align(next_day(busy_end)?)?;
                    end = calendar.end_for(start, days)?;
                }
                None => break,
            }
        }

        debug!("{} -> {}..{} ({})", task.id, start, end, task.assignee);
        intervals.push((start, end));
        slots[idx] = Some((start, end));
    }

    tasks
        .iter()
        .zip(slots)
        .map(|(task, slot)| {
            let (start_date, end_date) = slot.ok_or_else(|| {
                PlanError::scheduling(format!("task '{}' was never scheduled", task.id))
            })?;
            Ok(ScheduledTask {
                task: task.clone(),
                start_date,
                end_date,
            })
        })
        .collect()
}
