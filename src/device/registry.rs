// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity map of pod handles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::PodId;

use super::Pod;

/// Hands out one shared [`Pod`] per pod id.
///
/// Repeated lookups of the same pod return the same `Arc`, so cached
/// capabilities and the poll loop are shared by every holder.
pub struct PodRegistry<A> {
    pods: RwLock<HashMap<PodId, Arc<Pod<A>>>>,
}

impl<A> PodRegistry<A> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pods: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the pod registered under `id`.
    #[must_use]
    pub fn get(&self, id: &PodId) -> Option<Arc<Pod<A>>> {
        self.pods.read().get(id).cloned()
    }

    /// Returns the pod registered under `id`, creating it with `create` if
    /// absent.
    pub fn get_or_insert_with(&self, id: &PodId, create: impl FnOnce() -> Pod<A>) -> Arc<Pod<A>> {
        if let Some(pod) = self.get(id) {
            return pod;
        }
        let mut pods = self.pods.write();
        Arc::clone(
            pods.entry(id.clone())
                .or_insert_with(|| Arc::new(create())),
        )
    }

    /// Returns the ids of the registered pods.
    #[must_use]
    pub fn ids(&self) -> Vec<PodId> {
        self.pods.read().keys().cloned().collect()
    }

    /// Returns the number of registered pods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pods.read().len()
    }

    /// Returns `true` if no pod is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pods.read().is_empty()
    }
}

impl<A> Default for PodRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for PodRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodRegistry")
            .field("pods", &self.ids())
            .finish()
    }
}
