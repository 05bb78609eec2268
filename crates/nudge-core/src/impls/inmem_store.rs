//! In-memory reminder store (tests and local development).

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    Advancement, Category, CategoryId, NewReminder, NudgeError, Reminder, ReminderId,
};
use crate::ports::ReminderStore;

/// In-memory store state.
#[derive(Default)]
struct InMemoryStoreState {
    /// All reminders (single source of truth), ordered by id.
    reminders: BTreeMap<ReminderId, Reminder>,

    categories: Vec<Category>,

    next_reminder_id: i64,

    next_category_id: i64,

    /// Fail the next `apply_advancements` call before touching anything.
    fail_next_commit: bool,

    /// Number of successfully committed batches.
    commits: usize,
}

impl InMemoryStoreState {
    fn allocate_reminder_id(&mut self) -> ReminderId {
        self.next_reminder_id += 1;
        ReminderId::new(self.next_reminder_id)
    }

    fn allocate_category_id(&mut self) -> CategoryId {
        self.next_category_id += 1;
        CategoryId::new(self.next_category_id)
    }
}

/// Transactional semantics match the SQLite store: a batch is applied to a
/// copy and swapped in only when every row checks out.
#[derive(Default)]
pub struct InMemoryReminderStore {
    state: Mutex<InMemoryStoreState>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch commit fail with a `Storage` error.
    pub fn fail_next_commit(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next_commit = true;
        }
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> usize {
        self.state.lock().map(|s| s.commits).unwrap_or_default()
    }

    /// Look up one reminder by id.
    pub fn get(&self, id: ReminderId) -> Option<Reminder> {
        self.state.lock().ok()?.reminders.get(&id).cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryStoreState>, NudgeError> {
        self.state
            .lock()
            .map_err(|_| NudgeError::storage("in-memory store lock poisoned"))
    }
}

impl ReminderStore for InMemoryReminderStore {
    fn due_on(&self, date: NaiveDate) -> Result<Vec<Reminder>, NudgeError> {
        let state = self.lock()?;
        Ok(state
            .reminders
            .values()
            .filter(|r| r.is_due_on(date))
            .cloned()
            .collect())
    }

    fn apply_advancements(&self, batch: &[Advancement]) -> Result<(), NudgeError> {
        let mut state = self.lock()?;
        if state.fail_next_commit {
            state.fail_next_commit = false;
            return Err(NudgeError::storage("commit failed"));
        }

        let mut staged = state.reminders.clone();
        for adv in batch {
            let reminder = staged
                .get_mut(&adv.id)
                .ok_or(NudgeError::ConcurrentModification(adv.id))?;
            if reminder.due_date != adv.expected_due_date
                || reminder.occurrence_count != adv.expected_occurrence_count
            {
                return Err(NudgeError::ConcurrentModification(adv.id));
            }
            reminder.due_date = adv.next_due_date;
            reminder.occurrence_count = adv.occurrence_count;
            reminder.last_occurrence = Some(adv.last_occurrence);
        }

        state.reminders = staged;
        state.commits += 1;
        Ok(())
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>, NudgeError> {
        Ok(self.lock()?.reminders.values().cloned().collect())
    }

    fn insert_reminder(
        &self,
        reminder: &NewReminder,
        created: DateTime<Utc>,
    ) -> Result<ReminderId, NudgeError> {
        reminder.validate()?;
        let mut state = self.lock()?;

        let category = match reminder.category {
            Some(id) => Some(
                state
                    .categories
                    .iter()
                    .find(|c| c.id == id)
                    .cloned()
                    .ok_or_else(|| NudgeError::Validation(format!("{id} does not exist")))?,
            ),
            None => None,
        };

        let id = state.allocate_reminder_id();
        state.reminders.insert(
            id,
            Reminder {
                id,
                name: reminder.name.clone(),
                description: reminder.description.clone(),
                due_date: reminder.due_date,
                priority: reminder.priority,
                recurrence: reminder.recurrence,
                category,
                last_occurrence: None,
                occurrence_count: 0,
                created,
            },
        );
        Ok(id)
    }

    fn find_category(&self, name: &str) -> Result<Option<Category>, NudgeError> {
        let state = self.lock()?;
        Ok(state.categories.iter().find(|c| c.name == name).cloned())
    }

    fn create_category(&self, name: &str) -> Result<Category, NudgeError> {
        let mut state = self.lock()?;
        if state.categories.iter().any(|c| c.name == name) {
            return Err(NudgeError::storage(format!(
                "category '{name}' already exists"
            )));
        }
        let category = Category {
            id: state.allocate_category_id(),
            name: name.to_string(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }
}
