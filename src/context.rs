// Copyright (c) 2026 the translog authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contextual key/value lookup for routing decisions.
//!
//! The router reads routing keys (transaction filename, directory, close
//! signal) through the `ContextLookup` capability instead of a global,
//! so embedders decide where those values live. A thread-local store is
//! provided for hosts that scope context to the handling thread.

use std::cell::RefCell;
use std::collections::HashMap;

/// Read-only access to contextual string values keyed by name.
pub trait ContextLookup {
    /// Look up the value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

impl ContextLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

thread_local! {
    static THREAD_VALUES: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Set a context value for the current thread.
pub fn put(key: &str, value: &str) {
    THREAD_VALUES.with(|values| {
        values.borrow_mut().insert(key.to_string(), value.to_string());
    });
}

/// Get a context value for the current thread.
pub fn get(key: &str) -> Option<String> {
    THREAD_VALUES.with(|values| values.borrow().get(key).cloned())
}

/// Remove a context value for the current thread.
pub fn remove(key: &str) {
    THREAD_VALUES.with(|values| {
        values.borrow_mut().remove(key);
    });
}

/// Clear all context values for the current thread.
pub fn clear() {
    THREAD_VALUES.with(|values| values.borrow_mut().clear());
}

/// `ContextLookup` over the current thread's context values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadContext;

impl ContextLookup for ThreadContext {
    fn get(&self, key: &str) -> Option<String> {
        get(key)
    }
}
