use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_EXPECTED_POMODOROS: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub pomodoros: u32,
    pub expected_pomodoros: u32,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    pub fn over_budget(&self) -> bool {
        self.pomodoros >= self.expected_pomodoros
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TaskError {
    #[error("task title is empty")]
    EmptyTitle,
    #[error("task not found: {0}")]
    NotFound(String),
}

/// Ordered task list, newest first.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, title: &str, expected: u32) -> Result<&Task, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        self.tasks.insert(
            0,
            Task {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                completed: false,
                pomodoros: 0,
                expected_pomodoros: expected.clamp(1, MAX_EXPECTED_POMODOROS),
                created_at: chrono::Utc::now().timestamp_millis(),
            },
        );
        Ok(&self.tasks[0])
    }

    pub fn toggle(&mut self, id: &str) -> Result<bool, TaskError> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task, TaskError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        Ok(self.tasks.remove(idx))
    }

    pub fn record_pomodoro(&mut self, id: &str) -> Result<u32, TaskError> {
        let task = self.find_mut(id)?;
        task.pomodoros = task.pomodoros.saturating_add(1);
        Ok(task.pomodoros)
    }

    pub fn active(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    /// Tasks in display order: active first, then completed.
    pub fn display_order(&self) -> Vec<&Task> {
        self.active().chain(self.completed()).collect()
    }

    /// The task credited with a finished work interval: `preferred` when it
    /// is still an active task, otherwise the first active task.
    pub fn focus_target(&self, preferred: Option<&str>) -> Option<&Task> {
        preferred
            .and_then(|id| self.get(id))
            .filter(|t| !t.completed)
            .or_else(|| self.active().next())
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list_with(titles: &[&str]) -> TaskList {
        let mut list = TaskList::default();
        for title in titles {
            list.add(title, 1).unwrap();
        }
        list
    }

    fn id_of(list: &TaskList, title: &str) -> String {
        list.tasks().iter().find(|t| t.title == title).unwrap().id.clone()
    }

    #[test]
    fn add_prepends_trimmed_task() {
        let mut list = list_with(&["first"]);
        let task = list.add("  second  ", 3).unwrap().clone();

        assert_eq!(task.title, "second");
        assert_eq!(task.pomodoros, 0);
        assert_eq!(task.expected_pomodoros, 3);
        assert!(!task.completed);
        assert_eq!(list.tasks()[0].id, task.id);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut list = TaskList::default();
        assert_eq!(list.add("   ", 1).unwrap_err(), TaskError::EmptyTitle);
        assert!(list.is_empty());
    }

    #[test]
    fn add_clamps_estimate() {
        let mut list = TaskList::default();
        assert_eq!(list.add("a", 0).unwrap().expected_pomodoros, 1);
        assert_eq!(list.add("b", 99).unwrap().expected_pomodoros, MAX_EXPECTED_POMODOROS);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut list = list_with(&["write report"]);
        let id = id_of(&list, "write report");
        let before = list.get(&id).unwrap().clone();

        assert_eq!(list.toggle(&id), Ok(true));
        assert_eq!(list.toggle(&id), Ok(false));

        assert_eq!(list.get(&id).unwrap(), &before);
    }

    #[test]
    fn delete_removes_only_that_task() {
        let mut list = list_with(&["a", "b", "c"]);
        let b = id_of(&list, "b");

        let removed = list.delete(&b).unwrap();

        assert_eq!(removed.title, "b");
        let titles: Vec<&str> = list.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut list = list_with(&["a"]);
        assert_eq!(list.toggle("nope"), Err(TaskError::NotFound("nope".into())));
        assert!(list.delete("nope").is_err());
        assert!(list.record_pomodoro("nope").is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn record_pomodoro_only_increases() {
        let mut list = list_with(&["a"]);
        let id = id_of(&list, "a");
        assert_eq!(list.record_pomodoro(&id), Ok(1));
        assert_eq!(list.record_pomodoro(&id), Ok(2));
        list.toggle(&id).unwrap();
        list.toggle(&id).unwrap();
        assert_eq!(list.get(&id).unwrap().pomodoros, 2);
        assert!(list.get(&id).unwrap().over_budget());
    }

    #[test]
    fn partitions_and_display_order() {
        let mut list = list_with(&["a", "b", "c"]);
        let b = id_of(&list, "b");
        list.toggle(&b).unwrap();

        let active: Vec<&str> = list.active().map(|t| t.title.as_str()).collect();
        let order: Vec<&str> = list.display_order().iter().map(|t| t.title.as_str()).collect();

        assert_eq!(active, vec!["c", "a"]);
        assert_eq!(list.completed().count(), 1);
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn focus_target_falls_back_to_first_active() {
        let mut list = list_with(&["a", "b"]);
        let a = id_of(&list, "a");
        let b = id_of(&list, "b");

        assert_eq!(list.focus_target(Some(&a)).unwrap().id, a);
        list.toggle(&a).unwrap();
        assert_eq!(list.focus_target(Some(&a)).unwrap().id, b);
        assert_eq!(list.focus_target(None).unwrap().id, b);
        list.toggle(&b).unwrap();
        assert!(list.focus_target(None).is_none());
    }

    #[test]
    fn serializes_as_plain_array_with_camel_case() {
        let list = list_with(&["a"]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["expectedPomodoros"], 1);
        assert!(json[0]["createdAt"].is_i64());

        let back: TaskList = serde_json::from_value(json).unwrap();
        assert_eq!(back, list);
    }
}
