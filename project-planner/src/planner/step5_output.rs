//! Stage 5: Aggregate the final plan
//!
//! Pure and deterministic: the same schedule always produces the same plan.
//! The scheduler's guarantees are re-checked here and any violation is
//! reported as a consistency error rather than written out.

use std::collections::{BTreeMap, HashMap};

use crate::planner::error::{PlanError, PlanResult};
use crate::planner::types::{
    same_name, Analytics, ProjectDetails, ProjectPlan, ScheduledTask, TagStats, Timeline, Workload,
};

/// Bucket for tasks whose phase is missing or not on the roadmap
pub const UNPHASED: &str = "Unphased";

pub fn aggregate_plan(
    organization: &str,
    details: &ProjectDetails,
    scheduled: &[ScheduledTask],
) -> PlanResult<ProjectPlan> {
    let index = check_consistency(scheduled)?;
    let analytics = compute_analytics(details, scheduled, &index)?;

    Ok(ProjectPlan {
        organization: organization.to_string(),
        details: details.clone(),
        tasks: scheduled.to_vec(),
        analytics,
    })
}

/// Verify ids are unique, intervals are well formed and dependencies finish first
fn check_consistency(scheduled: &[ScheduledTask]) -> PlanResult<HashMap<&str, usize>> {
    if scheduled.is_empty() {
        return Err(PlanError::consistency("schedule contains no tasks"));
    }

    let mut index = HashMap::with_capacity(scheduled.len());
    for (i, st) in scheduled.iter().enumerate() {
        if index.insert(st.task.id.as_str(), i).is_some() {
            return Err(PlanError::consistency(format!(
                "task id '{}' appears more than once",
                st.task.id
            )));
        }
        if st.end_date < st.start_date {
            return Err(PlanError::consistency(format!(
                "task '{}' ends ({}) before it starts ({})",
                st.task.id, st.end_date, st.start_date
            )));
        }
    }

    for st in scheduled {
        for dep in &st.task.dependencies {
            let &j = index.get(dep.as_str()).ok_or_else(|| {
                PlanError::consistency(format!(
                    "task '{}' depends on '{}', which is not in the schedule",
                    st.task.id, dep
                ))
            })?;
            if scheduled[j].end_date >= st.start_date {
                return Err(PlanError::consistency(format!(
                    "task '{}' starts {} but its dependency '{}' ends {}",
                    st.task.id, st.start_date, dep, scheduled[j].end_date
                )));
            }
        }
    }

    Ok(index)
}

fn compute_analytics(
    details: &ProjectDetails,
    scheduled: &[ScheduledTask],
    index: &HashMap<&str, usize>,
) -> PlanResult<Analytics> {
    let mut workload: BTreeMap<String, Workload> = BTreeMap::new();
    let mut tags: BTreeMap<_, TagStats> = BTreeMap::new();
    let mut phases: BTreeMap<String, usize> = details
        .roadmap
        .iter()
        .map(|phase| (phase.name.clone(), 0))
        .collect();
    let mut total_estimated_hours = 0u64;

    for st in scheduled {
        let hours = u64::from(st.task.estimated_hours);
        total_estimated_hours += hours;

        let entry = workload.entry(st.task.assignee.clone()).or_default();
        entry.task_count += 1;
        entry.estimated_hours += hours;

        let tag = tags.entry(st.task.tag).or_default();
        tag.count += 1;
        tag.total_days += st.calendar_days();

        let phase = st
            .task
            .phase
            .as_deref()
            .and_then(|name| {
                details
                    .roadmap
                    .iter()
                    .find(|p| same_name(&p.name, name.trim()))
            })
            .map_or(UNPHASED, |p| p.name.as_str());
        *phases.entry(phase.to_string()).or_insert(0) += 1;
    }

    let timeline = timeline(scheduled)?;

    Ok(Analytics {
        total_tasks: scheduled.len(),
        total_estimated_hours,
        timeline,
        workload,
        phases,
        tags,
        critical_path: critical_path(scheduled, index),
    })
}

fn timeline(scheduled: &[ScheduledTask]) -> PlanResult<Timeline> {
    let start_date = scheduled
        .iter()
        .map(|st| st.start_date)
        .min()
        .ok_or_else(|| PlanError::consistency("schedule contains no tasks"))?;
    let end_date = scheduled
        .iter()
        .map(|st| st.end_date)
        .max()
        .ok_or_else(|| PlanError::consistency("schedule contains no tasks"))?;

    Ok(Timeline {
        start_date,
        end_date,
        total_days: (end_date - start_date).num_days() + 1,
    })
}

/// Walk back from the last-finishing task, always through the dependency
/// that ends latest. Ties go to the earlier-declared task.
fn critical_path(scheduled: &[ScheduledTask], index: &HashMap<&str, usize>) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = latest_ending(scheduled, 0..scheduled.len());
    while let Some(i) = current {
        path.push(scheduled[i].task.id.clone());
        let deps = scheduled[i]
            .task
            .dependencies
            .iter()
            .filter_map(|d| index.get(d.as_str()).copied());
        current = latest_ending(scheduled, deps);
    }

    path.reverse();
    path
}

fn latest_ending(
    scheduled: &[ScheduledTask],
    candidates: impl Iterator<Item = usize>,
) -> Option<usize> {
    candidates.fold(None, |best, i| match best {
        Some(b) if scheduled[b].end_date >= scheduled[i].end_date => Some(b),
        _ => Some(i),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::types::{Objective, Phase, Priority, Task, TaskTag};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn details() -> ProjectDetails {
        ProjectDetails {
            title: "Landing Page".to_string(),
            description: "A landing page".to_string(),
            summary: String::new(),
            objectives: vec![Objective {
                objective: "Launch".to_string(),
                description: String::new(),
            }],
            key_points: Vec::new(),
            roadmap: vec![
                Phase {
                    name: "Design".to_string(),
                    description: String::new(),
                },
                Phase {
                    name: "Build".to_string(),
                    description: String::new(),
                },
            ],
        }
    }

    fn scheduled(
        id: &str,
        assignee: &str,
        deps: &[&str],
        phase: Option<&str>,
        tag: TaskTag,
        start: u32,
        end: u32,
    ) -> ScheduledTask {
        ScheduledTask {
            task: Task {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                assignee: assignee.to_string(),
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                estimated_hours: (end + 1).saturating_sub(start) * 8,
                priority: Priority::Medium,
                phase: phase.map(str::to_string),
                tag,
            },
            start_date: date(start),
            end_date: date(end),
        }
    }

    fn sample() -> Vec<ScheduledTask> {
        vec![
            scheduled("T1", "Bob", &[], Some("design"), TaskTag::Design, 3, 4),
            scheduled("T2", "Alice", &["T1"], Some("Build"), TaskTag::Development, 5, 7),
            scheduled("T3", "Alice", &[], None, TaskTag::Research, 3, 3),
            scheduled("T4", "Bob", &["T2", "T3"], Some("Launch"), TaskTag::Testing, 10, 10),
        ]
    }

    #[test]
    fn test_analytics() {
        let plan = aggregate_plan("Acme", &details(), &sample()).unwrap();
        let a = &plan.analytics;

        assert_eq!(plan.organization, "Acme");
        assert_eq!(a.total_tasks, 4);
        assert_eq!(a.total_estimated_hours, 16 + 24 + 8 + 8);
        assert_eq!(a.timeline.start_date, date(3));
        assert_eq!(a.timeline.end_date, date(10));
        assert_eq!(a.timeline.total_days, 8);

        assert_eq!(a.workload.len(), 2);
        assert_eq!(a.workload["Alice"].task_count, 2);
        assert_eq!(a.workload["Alice"].estimated_hours, 32);
        assert_eq!(a.workload["Bob"].estimated_hours, 24);

        assert_eq!(a.phases["Design"], 1);
        assert_eq!(a.phases["Build"], 1);
        assert_eq!(a.phases[UNPHASED], 2);

        assert_eq!(a.tags[&TaskTag::Development].count, 1);
        assert_eq!(a.tags[&TaskTag::Development].total_days, 3);
    }

    #[test]
    fn test_critical_path_follows_latest_dependency() {
        let plan = aggregate_plan("Acme", &details(), &sample()).unwrap();
        assert_eq!(plan.analytics.critical_path, vec!["T1", "T2", "T4"]);
    }

    #[test]
    fn test_empty_roadmap_phase_is_listed() {
        let tasks = vec![scheduled("T1", "Bob", &[], Some("Design"), TaskTag::Design, 3, 3)];
        let plan = aggregate_plan("Acme", &details(), &tasks).unwrap();
        assert_eq!(plan.analytics.phases["Build"], 0);
        assert!(!plan.analytics.phases.contains_key(UNPHASED));
    }

    #[test]
    fn test_non_ascii_phase_matches_ignoring_case() {
        let mut details = details();
        details.roadmap[0].name = "Étude".to_string();
        let tasks = vec![scheduled("T1", "Bob", &[], Some("ÉTUDE"), TaskTag::Research, 3, 3)];
        let plan = aggregate_plan("Acme", &details, &tasks).unwrap();
        assert_eq!(plan.analytics.phases["Étude"], 1);
        assert!(!plan.analytics.phases.contains_key(UNPHASED));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let first = aggregate_plan("Acme", &details(), &sample()).unwrap();
        let second = aggregate_plan("Acme", &details(), &sample()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_dependency_overlap_is_consistency_error() {
        let tasks = vec![
            scheduled("T1", "Bob", &[], None, TaskTag::Other, 3, 4),
            scheduled("T2", "Alice", &["T1"], None, TaskTag::Other, 4, 5),
        ];
        let err = aggregate_plan("Acme", &details(), &tasks).unwrap_err();
        assert!(matches!(err, PlanError::Consistency(_)));
    }

    #[test]
    fn test_end_before_start_is_consistency_error() {
        let tasks = vec![scheduled("T1", "Bob", &[], None, TaskTag::Other, 5, 4)];
        let err = aggregate_plan("Acme", &details(), &tasks).unwrap_err();
        assert!(err.to_string().contains("ends"));
    }

    #[test]
    fn test_duplicate_id_is_consistency_error() {
        let tasks = vec![
            scheduled("T1", "Bob", &[], None, TaskTag::Other, 3, 3),
            scheduled("T1", "Alice", &[], None, TaskTag::Other, 4, 4),
        ];
        let err = aggregate_plan("Acme", &details(), &tasks).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_schedule_is_consistency_error() {
        assert!(matches!(
            aggregate_plan("Acme", &details(), &[]),
            Err(PlanError::Consistency(_))
        ));
    }
}
