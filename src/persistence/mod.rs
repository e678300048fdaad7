//! LocalStorage persistence
//!
//! Small typed wrappers over the browser's LocalStorage. Natively there is
//! no storage: loads return `None` and saves report `false`.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read a raw string value
#[cfg(target_arch = "wasm32")]
pub fn load_string(key: &str) -> Option<String> {
    storage()?.get_item(key).ok().flatten()
}

/// Write a raw string value; returns whether it was stored
#[cfg(target_arch = "wasm32")]
pub fn save_string(key: &str, value: &str) -> bool {
    match storage() {
        Some(storage) => match storage.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to store {}: {:?}", key, e);
                false
            }
        },
        None => false,
    }
}

#[cfg(target_arch = "wasm32")]
pub fn remove(key: &str) {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(key);
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load_string(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_string(_key: &str, _value: &str) -> bool {
    false
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove(_key: &str) {}

/// Read and decode a JSON value. Corrupt data is logged and treated as absent.
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = load_string(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value; returns whether it was stored
pub fn save_json<T: Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save_string(key, &json),
        Err(e) => {
            log::warn!("Failed to encode {}: {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_storage_is_empty() {
        assert!(!save_string("stack_tower_test", "value"));
        assert_eq!(load_string("stack_tower_test"), None);
        assert_eq!(load_json::<Vec<u32>>("stack_tower_test"), None);
        assert!(!save_json("stack_tower_test", &vec![1u32, 2, 3]));
    }
}
