use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use tracing::info;
use wa_core::AutomationError;
use wa_runtime::AutomationEngine;

/// Engines keyed by request id. Each engine sits behind its own mutex; a
/// call that finds the engine in use is rejected instead of queued.
#[derive(Default)]
pub struct EngineHost {
    engines: Mutex<BTreeMap<String, Arc<Mutex<AutomationEngine>>>>,
}

impl EngineHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, id: &str, engine: AutomationEngine) -> Result<(), AutomationError> {
        let mut engines = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        if engines.contains_key(id) {
            return Err(AutomationError::new(
                "HOST_DUPLICATE_ID",
                format!("Engine \"{}\" already exists.", id),
            ));
        }
        engines.insert(id.to_string(), Arc::new(Mutex::new(engine)));
        info!(id, "engine registered");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            info!(id, "engine removed");
        }
        removed
    }

    pub fn ids(&self) -> Vec<String> {
        self.engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn with_engine<T>(
        &self,
        id: &str,
        action: impl FnOnce(&mut AutomationEngine) -> Result<T, AutomationError>,
    ) -> Result<T, AutomationError> {
        let engine = self
            .engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| {
                AutomationError::new("HOST_UNKNOWN_ID", format!("Engine \"{}\" does not exist.", id))
            })?;

        let mut guard = match engine.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(AutomationError::new(
                    "HOST_INTERPRETER_BUSY",
                    format!("Engine \"{}\" is busy with another request.", id),
                ))
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(AutomationError::new(
                    "HOST_INTERPRETER_POISONED",
                    format!("Engine \"{}\" panicked earlier; remove and recreate it.", id),
                ))
            }
        };
        action(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;
    use std::thread;

    use wa_driver::DriverFixture;

    use crate::{create_engine, CreateEngineOptions, DriverConfig};

    fn engine(script: &str) -> AutomationEngine {
        create_engine(CreateEngineOptions {
            driver: DriverConfig::Fixture(DriverFixture::default()),
            session_id: None,
            script: Some(script.to_string()),
        })
        .expect("engine should build")
    }

    #[test]
    fn registers_runs_and_removes_engines() {
        let host = EngineHost::new();
        host.create("b", engine("ASK_USER b")).expect("create b");
        host.create("a", engine("SAVE_TO_VARIABLE k v")).expect("create a");
        assert_eq!(host.ids(), vec!["a".to_string(), "b".to_string()]);

        let duplicate = host.create("a", engine("")).expect_err("duplicate id");
        assert_eq!(duplicate.code, "HOST_DUPLICATE_ID");

        let report = host
            .with_engine("a", |engine| engine.run())
            .expect("run should pass");
        assert!(report.completed);

        assert!(host.remove("a"));
        assert!(!host.remove("a"));
        let missing = host
            .with_engine("a", |engine| engine.run())
            .expect_err("engine was removed");
        assert_eq!(missing.code, "HOST_UNKNOWN_ID");
    }

    #[test]
    fn concurrent_use_of_one_engine_is_rejected() {
        let host = Arc::new(EngineHost::new());
        host.create("shared", engine("ASK_USER hold")).expect("create");

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let worker = {
            let host = host.clone();
            thread::spawn(move || {
                host.with_engine("shared", |engine| {
                    entered_tx.send(()).expect("signal entry");
                    release_rx.recv().expect("wait for release");
                    engine.run()
                })
            })
        };

        entered_rx.recv().expect("worker should enter");
        let busy = host
            .with_engine("shared", |engine| engine.confirm())
            .expect_err("engine is in use");
        assert_eq!(busy.code, "HOST_INTERPRETER_BUSY");

        release_tx.send(()).expect("release worker");
        let report = worker
            .join()
            .expect("worker should not panic")
            .expect("run should pass");
        assert!(report.waiting_for_user);

        host.with_engine("shared", |engine| engine.confirm())
            .expect("confirm should pass after release");
    }
}
