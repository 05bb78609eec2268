//! CycleCoordinatorBuilder - コーディネーターの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - silent でないのに Notifier が無ければ build() で BuildError を返す
//! - つまり送信手段が無いまま状態を進めることはない

use std::sync::Arc;

use crate::app::coordinator::{CycleCoordinator, CycleOptions};
use crate::ports::{Clock, CycleIdGenerator, Notifier, ReminderStore, SystemClock, UlidCycleIdGenerator};

/// Builds a [`CycleCoordinator`].
///
/// # 使用例
/// ```ignore
/// let coordinator = CycleCoordinatorBuilder::new(store)
///     .notifier(Arc::new(GotifyNotifier::from_settings(&GotifySettings::from_env()?)?))
///     .build()?;
/// let report = coordinator.run(None).await?;
/// ```
pub struct CycleCoordinatorBuilder {
    store: Arc<dyn ReminderStore>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn CycleIdGenerator>>,
    options: CycleOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("a notifier is required unless the cycle runs in silent mode")]
    MissingNotifier,
}

impl CycleCoordinatorBuilder {
    /// Defaults: system clock, ULID cycle ids, notifying mode.
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self {
            store,
            notifier: None,
            clock: Arc::new(SystemClock),
            ids: None,
            options: CycleOptions::default(),
        }
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn CycleIdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn options(mut self, options: CycleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<CycleCoordinator, BuildError> {
        if !self.options.silent && self.notifier.is_none() {
            return Err(BuildError::MissingNotifier);
        }

        let ids = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidCycleIdGenerator::new(Arc::clone(&self.clock))),
        };

        Ok(CycleCoordinator {
            store: self.store,
            notifier: self.notifier,
            clock: self.clock,
            ids,
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryReminderStore, RecordingNotifier};

    fn store() -> Arc<dyn ReminderStore> {
        Arc::new(InMemoryReminderStore::new())
    }

    #[test]
    fn notifying_mode_requires_a_notifier() {
        let result = CycleCoordinatorBuilder::new(store()).build();
        assert!(matches!(result, Err(BuildError::MissingNotifier)));
    }

    #[test]
    fn silent_mode_builds_without_notifier() {
        let coordinator = CycleCoordinatorBuilder::new(store())
            .options(CycleOptions { silent: true })
            .build()
            .unwrap();
        assert!(coordinator.options().silent);
    }

    #[test]
    fn notifying_mode_builds_with_notifier() {
        let result = CycleCoordinatorBuilder::new(store())
            .notifier(Arc::new(RecordingNotifier::new()))
            .build();
        assert!(result.is_ok());
    }
}
