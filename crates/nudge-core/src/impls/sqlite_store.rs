//! SQLite reminder store.
//!
//! One connection per store, guarded by a mutex. Every batch of advancements
//! runs in a single `IMMEDIATE` transaction so a concurrent writer cannot
//! interleave with it.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior, params};

use crate::domain::{
    Advancement, Category, CategoryId, NewReminder, NudgeError, Reminder, ReminderId,
};
use crate::ports::ReminderStore;

/// Embedded schema, applied on every open.
const SCHEMA_SQL: &str = include_str!("schema.sql");

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_REMINDERS: &str = "
    SELECT r.id, r.name, r.description, r.due_date, r.priority, r.recurring,
           r.category_id, c.name, r.last_occurrence, r.occurrence_count, r.created
    FROM reminders r
    LEFT JOIN categories c ON c.id = r.category_id";

impl From<rusqlite::Error> for NudgeError {
    fn from(err: rusqlite::Error) -> Self {
        NudgeError::storage_with_source("sqlite", err)
    }
}

/// A reminder row before the recurrence kind is validated.
struct ReminderRow {
    id: i64,
    name: String,
    description: Option<String>,
    due_date: NaiveDate,
    priority: i64,
    recurring: String,
    category_id: Option<i64>,
    category_name: Option<String>,
    last_occurrence: Option<DateTime<Utc>>,
    occurrence_count: i64,
    created: DateTime<Utc>,
}

impl ReminderRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            due_date: row.get(3)?,
            priority: row.get(4)?,
            recurring: row.get(5)?,
            category_id: row.get(6)?,
            category_name: row.get(7)?,
            last_occurrence: row.get(8)?,
            occurrence_count: row.get(9)?,
            created: row.get(10)?,
        })
    }

    fn into_reminder(self) -> Result<Reminder, NudgeError> {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id: CategoryId::new(id),
                name,
            }),
            _ => None,
        };
        let occurrence_count = u32::try_from(self.occurrence_count).map_err(|_| {
            NudgeError::storage(format!(
                "reminder {} has invalid occurrence_count {}",
                self.id, self.occurrence_count
            ))
        })?;

        Ok(Reminder {
            id: ReminderId::new(self.id),
            name: self.name,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            recurrence: self.recurring.parse()?,
            category,
            last_occurrence: self.last_occurrence,
            occurrence_count,
            created: self.created,
        })
    }
}

pub struct SqliteReminderStore {
    conn: Mutex<Connection>,
}

impl SqliteReminderStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    ///
    /// An existing non-empty file must carry the SQLite header.
    pub fn open(path: &Path) -> Result<Self, NudgeError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                NudgeError::storage_with_source(
                    format!("failed to create db directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        check_sqlite_header(path)?;

        let conn = Connection::open(path).map_err(|e| {
            NudgeError::storage_with_source(format!("failed to open db at {}", path.display()), e)
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        let store = Self::init(conn)?;
        tracing::debug!(path = %path.display(), journal_mode = %journal_mode, "reminder db initialized");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, NudgeError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, NudgeError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| NudgeError::storage_with_source("failed to apply schema", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, NudgeError> {
        self.conn
            .lock()
            .map_err(|_| NudgeError::storage("sqlite connection lock poisoned"))
    }

    fn query_reminders(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Reminder>, NudgeError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, ReminderRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ReminderRow::into_reminder).collect()
    }
}

fn check_sqlite_header(path: &Path) -> Result<(), NudgeError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(NudgeError::storage_with_source(
                format!("cannot access {}", path.display()),
                e,
            ));
        }
    };
    let len = file
        .metadata()
        .map_err(|e| NudgeError::storage_with_source("cannot stat db file", e))?
        .len();
    if len == 0 {
        return Ok(());
    }

    let mut header = [0u8; 16];
    let valid = file.read_exact(&mut header).is_ok() && &header == SQLITE_HEADER;
    if !valid {
        return Err(NudgeError::storage(format!(
            "{} exists and is not a valid SQLite database",
            path.display()
        )));
    }
    Ok(())
}

impl ReminderStore for SqliteReminderStore {
    fn due_on(&self, date: NaiveDate) -> Result<Vec<Reminder>, NudgeError> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_REMINDERS} WHERE r.due_date = ?1 ORDER BY r.id");
        Self::query_reminders(&conn, &sql, params![date])
    }

    fn apply_advancements(&self, batch: &[Advancement]) -> Result<(), NudgeError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE reminders
                 SET due_date = ?1, occurrence_count = ?2, last_occurrence = ?3
                 WHERE id = ?4 AND due_date = ?5 AND occurrence_count = ?6",
            )?;
            for adv in batch {
                let changed = stmt.execute(params![
                    adv.next_due_date,
                    adv.occurrence_count,
                    adv.last_occurrence,
                    adv.id.get(),
                    adv.expected_due_date,
                    adv.expected_occurrence_count,
                ])?;
                if changed != 1 {
                    // dropping `tx` rolls back everything applied so far
                    return Err(NudgeError::ConcurrentModification(adv.id));
                }
            }
        }
        tx.commit()
            .map_err(|e| NudgeError::storage_with_source("failed to commit advancement batch", e))
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>, NudgeError> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_REMINDERS} ORDER BY r.id");
        Self::query_reminders(&conn, &sql, params![])
    }

    fn insert_reminder(
        &self,
        reminder: &NewReminder,
        created: DateTime<Utc>,
    ) -> Result<ReminderId, NudgeError> {
        reminder.validate()?;
        let conn = self.lock()?;

        if let Some(category) = reminder.category {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM categories WHERE id = ?1",
                    params![category.get()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Err(NudgeError::Validation(format!("{category} does not exist")));
            }
        }

        conn.execute(
            "INSERT INTO reminders
                (name, description, due_date, priority, recurring, category_id, occurrence_count, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                reminder.name,
                reminder.description,
                reminder.due_date,
                reminder.priority,
                reminder.recurrence.as_str(),
                reminder.category.map(|c| c.get()),
                created,
            ],
        )?;
        Ok(ReminderId::new(conn.last_insert_rowid()))
    }

    fn find_category(&self, name: &str) -> Result<Option<Category>, NudgeError> {
        let conn = self.lock()?;
        let category = conn
            .query_row(
                "SELECT id, name FROM categories WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Category {
                        id: CategoryId::new(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    fn create_category(&self, name: &str) -> Result<Category, NudgeError> {
        let conn = self.lock()?;
        match conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name]) {
            Ok(_) => Ok(Category {
                id: CategoryId::new(conn.last_insert_rowid()),
                name: name.to_string(),
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(NudgeError::storage(format!("category '{name}' already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Recurrence;
    use chrono::TimeZone;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn open_creates_parent_directories_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("nudge.db");

        {
            let store = SqliteReminderStore::open(&path).unwrap();
            let bills = store.create_category("bills").unwrap();
            store
                .insert_reminder(
                    &NewReminder::new("Pay rent", day(1, 31))
                        .with_recurrence(Recurrence::Monthly)
                        .with_priority(7)
                        .with_category(bills.id),
                    at(1, 1, 0),
                )
                .unwrap();
        }

        let reopened = SqliteReminderStore::open(&path).unwrap();
        let all = reopened.list_reminders().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Pay rent");
        assert_eq!(all[0].recurrence, Recurrence::Monthly);
        assert_eq!(all[0].priority, 7);
        assert_eq!(all[0].category.as_ref().map(|c| c.name.as_str()), Some("bills"));
        assert_eq!(all[0].created, at(1, 1, 0));
    }

    #[test]
    fn open_rejects_files_that_are_not_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "definitely not a database").unwrap();

        let err = SqliteReminderStore::open(&path).err().unwrap();
        assert!(err.to_string().contains("not a valid SQLite database"));
    }

    #[test]
    fn open_accepts_an_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        File::create(&path).unwrap();

        let store = SqliteReminderStore::open(&path).unwrap();
        assert!(store.list_reminders().unwrap().is_empty());
    }

    #[test]
    fn due_on_matches_exact_date_in_id_order() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        for name in ["b", "a"] {
            store
                .insert_reminder(&NewReminder::new(name, day(3, 1)), at(1, 1, 0))
                .unwrap();
        }
        store
            .insert_reminder(&NewReminder::new("other", day(3, 2)), at(1, 1, 0))
            .unwrap();

        let due = store.due_on(day(3, 1)).unwrap();
        let names: Vec<_> = due.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(due.iter().all(|r| r.category.is_none()));

        assert_eq!(store.due_on(day(3, 1)).unwrap(), due);
    }

    #[test]
    fn advancement_batch_is_persisted() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        let id = store
            .insert_reminder(
                &NewReminder::new("Pay rent", day(1, 31)).with_recurrence(Recurrence::Monthly),
                at(1, 1, 0),
            )
            .unwrap();
        let reminder = store.due_on(day(1, 31)).unwrap().remove(0);

        store
            .apply_advancements(&[reminder.advance(at(1, 31, 8)).unwrap()])
            .unwrap();

        assert!(store.due_on(day(1, 31)).unwrap().is_empty());
        let moved = store.due_on(day(2, 29)).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, id);
        assert_eq!(moved[0].occurrence_count, 1);
        assert_eq!(moved[0].last_occurrence, Some(at(1, 31, 8)));
    }

    #[test]
    fn stale_row_rolls_back_the_whole_batch() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        for name in ["a", "b"] {
            store
                .insert_reminder(
                    &NewReminder::new(name, day(5, 1)).with_recurrence(Recurrence::Daily),
                    at(1, 1, 0),
                )
                .unwrap();
        }
        let due = store.due_on(day(5, 1)).unwrap();
        let batch: Vec<_> = due.iter().map(|r| r.advance(at(5, 1, 8)).unwrap()).collect();

        // another run already advanced "b"
        store.apply_advancements(&batch[1..]).unwrap();

        let err = store.apply_advancements(&batch).unwrap_err();
        assert!(matches!(err, NudgeError::ConcurrentModification(id) if id == due[1].id));

        let a = store.due_on(day(5, 1)).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].occurrence_count, 0);
    }

    #[test]
    fn unknown_recurrence_in_storage_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nudge.db");
        let store = SqliteReminderStore::open(&path).unwrap();
        store
            .insert_reminder(&NewReminder::new("x", day(4, 1)), at(1, 1, 0))
            .unwrap();

        let raw = Connection::open(&path).unwrap();
        raw.execute("UPDATE reminders SET recurring = 'fortnightly'", [])
            .unwrap();

        let err = store.due_on(day(4, 1)).unwrap_err();
        assert!(matches!(err, NudgeError::UnknownRecurrence(s) if s == "fortnightly"));
    }

    #[test]
    fn category_names_are_unique() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        let bills = store.create_category("bills").unwrap();

        let err = store.create_category("bills").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.find_category("bills").unwrap(), Some(bills));
        assert_eq!(store.find_category("Bills").unwrap(), None);
    }

    #[test]
    fn insert_rejects_missing_category() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        let err = store
            .insert_reminder(
                &NewReminder::new("x", day(4, 1)).with_category(CategoryId::new(12)),
                at(1, 1, 0),
            )
            .unwrap_err();
        assert!(matches!(err, NudgeError::Validation(_)));
    }
}
