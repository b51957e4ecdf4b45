use std::{
    collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use super::{KeyValueStorage, StorageEvent};

/// Storage kept in memory and shared by every handle created from the same
/// root with [`MemoryStorage::new_handle`]
///
/// A handle is only told about changes to keys it has read, written or
/// polled itself. Changes made before that are not reported.
#[derive(Debug)]
pub struct MemoryStorage {
    area: Arc<Mutex<MemoryArea>>,
    handle_id: usize,
}

#[derive(Debug, Default)]
struct MemoryArea {
    items: HashMap<String, String>,
    handles: BTreeMap<usize, HandleState>,
    next_handle_id: usize,
}

#[derive(Debug, Default)]
struct HandleState {
    watched_keys: BTreeSet<String>,
    /// Foreign changes to `watched_keys` not yet taken
    pending: VecDeque<StorageEvent>,
}

impl MemoryArea {
    fn register(&mut self) -> usize {
        let result = self.next_handle_id;
        self.next_handle_id += 1;
        self.handles.insert(result, HandleState::default());
        result
    }

    fn watch(&mut self, handle_id: usize, key: &str) {
        if let Some(state) = self.handles.get_mut(&handle_id) {
            if !state.watched_keys.contains(key) {
                state.watched_keys.insert(key.to_string());
            }
        }
    }

    fn notify_others(&mut self, writer: usize, event: StorageEvent) {
        for (_, state) in self.handles.iter_mut().filter(|(id, _)| **id != writer) {
            if state.watched_keys.contains(&event.key) {
                state.pending.push_back(event.clone());
            }
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        let mut area = MemoryArea::default();
        let handle_id = area.register();
        Self {
            area: Arc::new(Mutex::new(area)),
            handle_id,
        }
    }

    /// A new handle on the same storage, like another window of the app
    pub fn new_handle(&self) -> Self {
        let handle_id = self.area.lock().expect("mutex poisoned").register();
        Self {
            area: Arc::clone(&self.area),
            handle_id,
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        if let Ok(mut area) = self.area.lock() {
            area.handles.remove(&self.handle_id);
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        let mut area = self.area.lock().expect("mutex poisoned");
        area.watch(self.handle_id, key);
        Ok(area.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut area = self.area.lock().expect("mutex poisoned");
        area.watch(self.handle_id, key);
        area.items.insert(key.to_string(), value.to_string());
        area.notify_others(
            self.handle_id,
            StorageEvent {
                key: key.to_string(),
                new_value: Some(value.to_string()),
            },
        );
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> anyhow::Result<()> {
        let mut area = self.area.lock().expect("mutex poisoned");
        area.watch(self.handle_id, key);
        if area.items.remove(key).is_some() {
            area.notify_others(
                self.handle_id,
                StorageEvent {
                    key: key.to_string(),
                    new_value: None,
                },
            );
        }
        Ok(())
    }

    fn take_foreign_changes(&mut self, key: &str) -> anyhow::Result<Vec<StorageEvent>> {
        let mut area = self.area.lock().expect("mutex poisoned");
        area.watch(self.handle_id, key);
        let Some(state) = area.handles.get_mut(&self.handle_id) else {
            return Ok(Vec::new());
        };
        let (result, others): (Vec<_>, Vec<_>) =
            state.pending.drain(..).partition(|e| e.key == key);
        state.pending.extend(others);
        Ok(result)
    }
}
