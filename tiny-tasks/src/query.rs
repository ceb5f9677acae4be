//! Parses and applies `GET /tasks` query filters: `?completed=` and
//! `?completed_on=`.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Task;

#[derive(Debug, Default)]
pub struct ListFilters {
    completed: Option<bool>,
    completed_on: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl ListFilters {
    pub fn parse(params: &std::collections::HashMap<String, String>) -> Result<Self, String> {
        let mut filters = ListFilters::default();

        if let Some(raw) = params.get("completed") {
            filters.completed = Some(parse_bool_strict(raw)?);
        }

        if let Some(day) = params.get("completed_on") {
            filters.completed_on = Some(parse_utc_day_range(day)?);
        }

        Ok(filters)
    }

    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        if self.completed.is_none() && self.completed_on.is_none() {
            return tasks;
        }

        tasks
            .into_iter()
            .filter(|t| {
                if let Some(want) = self.completed {
                    if t.completed_at.is_some() != want {
                        return false;
                    }
                }

                if let Some((start, end)) = self.completed_on {
                    match t.completed_at {
                        Some(ct) if ct >= start && ct < end => {}
                        _ => return false,
                    }
                }

                true
            })
            .collect()
    }
}

fn parse_bool_strict(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("completed must be true or false".to_string()),
    }
}

fn parse_utc_day_range(day: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| "completed_on must be YYYY-MM-DD".to_string())?;
    let start = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let end = start + chrono::Duration::days(1);
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn task(completed_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id: "t1".into(),
            title: "x".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at,
        }
    }

    #[test]
    fn no_params_returns_everything() {
        let filters = ListFilters::parse(&HashMap::new()).unwrap();
        let tasks = vec![task(None), task(Some(Utc::now()))];
        assert_eq!(filters.apply(tasks).len(), 2);
    }

    #[test]
    fn completed_true_filters_to_done_tasks() {
        let mut params = HashMap::new();
        params.insert("completed".to_string(), "true".to_string());
        let filters = ListFilters::parse(&params).unwrap();

        let tasks = vec![task(None), task(Some(Utc::now()))];
        let out = filters.apply(tasks);
        assert_eq!(out.len(), 1);
        assert!(out[0].completed_at.is_some());
    }

    #[test]
    fn invalid_completed_value_is_rejected() {
        let mut params = HashMap::new();
        params.insert("completed".to_string(), "maybe".to_string());
        assert!(ListFilters::parse(&params).is_err());
    }

    #[test]
    fn completed_on_filters_to_the_given_day() {
        let day = "2026-02-25";
        let mut params = HashMap::new();
        params.insert("completed_on".to_string(), day.to_string());
        let filters = ListFilters::parse(&params).unwrap();

        let in_day = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let out_of_day = in_day + chrono::Duration::days(2);

        let tasks = vec![task(Some(in_day)), task(Some(out_of_day)), task(None)];
        let out = filters.apply(tasks);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn invalid_completed_on_is_rejected() {
        let mut params = HashMap::new();
        params.insert("completed_on".to_string(), "not-a-date".to_string());
        assert!(ListFilters::parse(&params).is_err());
    }
}
