use crate::error::AppError;
use crate::model::{Task, TaskCounts};
use crate::storage::{KeyValueMedium, PersistentStore, Update};
use crate::view::{Projection, ViewQuery};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const TASKS_KEY: &str = "tasks";

/// The task collection, persisted under [`TASKS_KEY`].
pub struct TaskList<M> {
    store: PersistentStore<Vec<Task>, M>,
}

impl<M: KeyValueMedium> TaskList<M> {
    pub fn open(medium: M) -> Self {
        Self {
            store: PersistentStore::open(medium, TASKS_KEY, Vec::new()),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.get()
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::from_tasks(self.tasks())
    }

    pub fn view(&self, query: &ViewQuery) -> Projection<'_, Task> {
        query.project_tasks(self.tasks())
    }

    pub fn last_persist_error(&self) -> Option<&AppError> {
        self.store.last_persist_error()
    }

    /// Appends a task. Blank text is ignored and leaves the list untouched.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc();
        let created_at = now
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        let task = Task {
            id: next_id(self.tasks(), now)?,
            text: trimmed.to_string(),
            completed: false,
            created_at,
        };

        let added = task.clone();
        self.store.set(Update::with(move |tasks: &Vec<Task>| {
            let mut next = tasks.clone();
            next.push(task);
            next
        }));
        tracing::info!(id = added.id, "task added");

        Ok(Some(added))
    }

    pub fn toggle(&mut self, id: i64) -> Result<Task, AppError> {
        let mut toggled = self.find(id)?.clone();
        toggled.completed = !toggled.completed;

        let replacement = toggled.clone();
        self.store.set(Update::with(move |tasks: &Vec<Task>| {
            tasks
                .iter()
                .map(|task| {
                    if task.id == id {
                        replacement.clone()
                    } else {
                        task.clone()
                    }
                })
                .collect()
        }));

        Ok(toggled)
    }

    pub fn delete(&mut self, id: i64) -> Result<Task, AppError> {
        let removed = self.find(id)?.clone();

        self.store.set(Update::with(|tasks: &Vec<Task>| {
            tasks.iter().filter(|task| task.id != id).cloned().collect()
        }));

        Ok(removed)
    }

    fn find(&self, id: i64) -> Result<&Task, AppError> {
        self.tasks()
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }
}

/// Millisecond timestamp, bumped past the newest id so ids stay unique
/// when tasks are added within the same millisecond.
fn next_id(tasks: &[Task], now: OffsetDateTime) -> Result<i64, AppError> {
    let millis = (now.unix_timestamp_nanos() / 1_000_000) as i64;
    match tasks.iter().map(|task| task.id).max() {
        Some(newest) if newest >= millis => newest
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task id space exhausted")),
        _ => Ok(millis),
    }
}

/// Parses a task id given on the command line.
pub fn parse_task_id(raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    trimmed
        .parse()
        .map_err(|_| AppError::invalid_input(format!("invalid task id '{trimmed}'")))
}

#[cfg(test)]
mod tests {
    use super::{TASKS_KEY, TaskList, next_id, parse_task_id};
    use crate::model::{Task, TaskCounts};
    use crate::storage::{FileMedium, KeyValueMedium, MemoryMedium};
    use crate::view::{StatusFilter, ViewQuery};
    use std::num::NonZeroUsize;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskboard-{nanos}-{name}"))
    }

    fn stored_tasks(medium: &MemoryMedium) -> Vec<Task> {
        let payload = medium.get_item(TASKS_KEY).unwrap().unwrap();
        serde_json::from_str(&payload).unwrap()
    }

    #[test]
    fn add_toggle_delete_scenario() {
        let medium = MemoryMedium::new();
        let mut list = TaskList::open(medium.clone());
        assert!(list.tasks().is_empty());

        let task = list.add("Buy milk").unwrap().unwrap();
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].text, "Buy milk");
        assert!(!list.tasks()[0].completed);
        OffsetDateTime::parse(&list.tasks()[0].created_at, &Rfc3339).unwrap();

        let toggled = list.toggle(task.id).unwrap();
        assert!(toggled.completed);
        assert!(stored_tasks(&medium)[0].completed);

        let removed = list.delete(task.id).unwrap();
        assert_eq!(removed.id, task.id);
        assert!(list.tasks().is_empty());
        assert!(stored_tasks(&medium).is_empty());
    }

    #[test]
    fn add_trims_text() {
        let mut list = TaskList::open(MemoryMedium::new());

        let task = list.add("  Walk dog  ").unwrap().unwrap();

        assert_eq!(task.text, "Walk dog");
    }

    #[test]
    fn add_ignores_blank_text() {
        let medium = MemoryMedium::new();
        let mut list = TaskList::open(medium.clone());

        assert_eq!(list.add("   ").unwrap(), None);
        assert_eq!(list.add("").unwrap(), None);

        assert!(list.tasks().is_empty());
        assert!(medium.is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut list = TaskList::open(MemoryMedium::new());

        let first = list.add("one").unwrap().unwrap();
        let second = list.add("two").unwrap().unwrap();
        let third = list.add("three").unwrap().unwrap();

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn next_id_moves_past_future_ids() {
        let now = OffsetDateTime::now_utc();
        let future = Task {
            id: i64::MAX / 2,
            text: "future".to_string(),
            completed: false,
            created_at: "2025-12-20T00:00:00Z".to_string(),
        };

        assert_eq!(next_id(&[future], now).unwrap(), i64::MAX / 2 + 1);
    }

    #[test]
    fn add_after_max_id_reports_exhausted_ids() {
        let medium = MemoryMedium::new();
        medium
            .set_item(
                TASKS_KEY,
                r#"[{"id":9223372036854775807,"text":"last","completed":false,"createdAt":"2025-12-20T00:00:00Z"}]"#,
            )
            .unwrap();
        let mut list = TaskList::open(medium.clone());

        let err = list.add("next").unwrap_err();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].id, i64::MAX);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut list = TaskList::open(MemoryMedium::new());
        let task = list.add("demo").unwrap().unwrap();

        list.toggle(task.id).unwrap();
        let restored = list.toggle(task.id).unwrap();

        assert!(!restored.completed);
    }

    #[test]
    fn toggle_and_delete_reject_unknown_id() {
        let medium = MemoryMedium::new();
        let mut list = TaskList::open(medium.clone());
        list.add("demo").unwrap();
        let before = medium.get_item(TASKS_KEY).unwrap();

        assert_eq!(list.toggle(1).unwrap_err().code(), "invalid_input");
        assert_eq!(list.delete(1).unwrap_err().code(), "invalid_input");

        assert_eq!(medium.get_item(TASKS_KEY).unwrap(), before);
        assert_eq!(list.tasks().len(), 1);
    }

    #[test]
    fn counts_track_active_and_completed() {
        let mut list = TaskList::open(MemoryMedium::new());
        let first = list.add("one").unwrap().unwrap();
        list.add("two").unwrap();
        list.add("three").unwrap();
        list.toggle(first.id).unwrap();

        assert_eq!(
            list.counts(),
            TaskCounts {
                all: 3,
                active: 2,
                completed: 1,
            }
        );
    }

    #[test]
    fn view_applies_status_filter() {
        let mut list = TaskList::open(MemoryMedium::new());
        let first = list.add("one").unwrap().unwrap();
        list.add("two").unwrap();
        list.toggle(first.id).unwrap();

        let mut query = ViewQuery::new(NonZeroUsize::new(10).unwrap());
        query.set_filter(StatusFilter::Completed);
        let completed = list.view(&query);
        assert_eq!(completed.total_matched, 1);
        assert_eq!(completed.items[0].id, first.id);

        query.set_filter(StatusFilter::Active);
        let active = list.view(&query);
        assert_eq!(active.total_matched, 1);
        assert_eq!(active.items[0].text, "two");
    }

    #[test]
    fn open_reads_camel_case_payload() {
        let dir = temp_dir("payload-shape");
        let medium = FileMedium::new(&dir);
        medium
            .set_item(
                TASKS_KEY,
                "[{\"id\":1734652800000,\"text\":\"Buy milk\",\"completed\":false,\"createdAt\":\"2024-12-20T00:00:00.000Z\"}]",
            )
            .unwrap();

        let list = TaskList::open(medium);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].id, 1_734_652_800_000);
        assert_eq!(list.tasks()[0].created_at, "2024-12-20T00:00:00.000Z");
    }

    #[test]
    fn open_corrupt_tasks_falls_back_to_empty() {
        let medium = MemoryMedium::new();
        medium.set_item(TASKS_KEY, "not json").unwrap();

        let list = TaskList::open(medium);

        assert!(list.tasks().is_empty());
    }

    #[test]
    fn persist_failure_keeps_tasks_in_memory() {
        let medium = MemoryMedium::with_quota(8);
        let mut list = TaskList::open(medium.clone());

        list.add("too large for quota").unwrap();

        assert_eq!(list.tasks().len(), 1);
        assert!(list.last_persist_error().is_some());
        assert!(medium.is_empty());
    }

    #[test]
    fn parse_task_id_validates_input() {
        assert_eq!(parse_task_id(" 42 ").unwrap(), 42);
        assert_eq!(parse_task_id("  ").unwrap_err().code(), "invalid_input");
        assert_eq!(parse_task_id("abc").unwrap_err().code(), "invalid_input");
    }
}
