use std::collections::HashMap;
use std::sync::Mutex;

/// The browser facilities the page logic needs: key/value storage,
/// navigation and blocking alerts.
pub trait Host {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
    fn navigate(&self, href: &str);
    fn alert(&self, message: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Navigate(String),
    Alert(String),
}

/// Host with in-memory storage that records navigations and alerts.
#[derive(Default)]
pub struct MemoryHost {
    storage: Mutex<HashMap<String, String>>,
    events: Mutex<Vec<HostEvent>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.set_item(key, value);
        self
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().expect("host events lock poisoned").clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Alert(msg) => Some(msg),
                HostEvent::Navigate(_) => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Navigate(href) => Some(href),
                HostEvent::Alert(_) => None,
            })
            .collect()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().expect("host events lock poisoned").push(event);
    }
}

impl Host for MemoryHost {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage
            .lock()
            .expect("host storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.storage
            .lock()
            .expect("host storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.storage
            .lock()
            .expect("host storage lock poisoned")
            .remove(key);
    }

    fn navigate(&self, href: &str) {
        self.record(HostEvent::Navigate(href.to_string()));
    }

    fn alert(&self, message: &str) {
        self.record(HostEvent::Alert(message.to_string()));
    }
}
