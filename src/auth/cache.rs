// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request memoization of identity-provider services.
//!
//! A request enters a scope with [`ServiceCache::enter_scope`] and passes the
//! resulting [`ServiceScope`] down explicitly. Within that scope the verifier
//! and the identity client are each constructed at most once, on first use.
//! Dropping the [`ScopeGuard`] ends the scope and releases both instances;
//! lookups with a stale scope return `None` and construct nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use uuid::Uuid;

use crate::config::GateConfig;

type Factory<T> = Box<dyn Fn(&GateConfig) -> T + Send + Sync>;

/// Key identifying one request's service scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceScope(Uuid);

impl fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct Slots<V, P> {
    verifier: Option<Arc<V>>,
    client: Option<Arc<P>>,
}

impl<V, P> Default for Slots<V, P> {
    fn default() -> Self {
        Self {
            verifier: None,
            client: None,
        }
    }
}

struct Registry<V, P>(Mutex<HashMap<ServiceScope, Slots<V, P>>>);

impl<V, P> Registry<V, P> {
    fn lock(&self) -> MutexGuard<'_, HashMap<ServiceScope, Slots<V, P>>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

trait ReleaseScope: Send + Sync {
    fn release(&self, scope: ServiceScope);
}

impl<V: Send + Sync, P: Send + Sync> ReleaseScope for Registry<V, P> {
    fn release(&self, scope: ServiceScope) {
        self.lock().remove(&scope);
    }
}

/// Ends its scope when dropped.
pub struct ScopeGuard {
    scope: ServiceScope,
    registry: Weak<dyn ReleaseScope>,
}

impl ScopeGuard {
    pub fn scope(&self) -> ServiceScope {
        self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.release(self.scope);
            tracing::trace!(scope = %self.scope, "Service scope ended");
        }
    }
}

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeGuard").field(&self.scope).finish()
    }
}

/// Lazily built, scope-keyed verifier and identity client.
pub struct ServiceCache<V, P> {
    config: Arc<GateConfig>,
    verifier_factory: Factory<V>,
    client_factory: Factory<P>,
    registry: Arc<Registry<V, P>>,
}

impl<V, P> ServiceCache<V, P>
where
    V: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Create a cache that builds services from `config` with the given
    /// factories.
    pub fn new<FV, FP>(config: GateConfig, verifier_factory: FV, client_factory: FP) -> Self
    where
        FV: Fn(&GateConfig) -> V + Send + Sync + 'static,
        FP: Fn(&GateConfig) -> P + Send + Sync + 'static,
    {
        Self {
            config: Arc::new(config),
            verifier_factory: Box::new(verifier_factory),
            client_factory: Box::new(client_factory),
            registry: Arc::new(Registry(Mutex::new(HashMap::new()))),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Start a new scope with no services constructed yet.
    pub fn enter_scope(&self) -> ScopeGuard {
        let scope = ServiceScope(Uuid::new_v4());
        self.registry.lock().insert(scope, Slots::default());
        tracing::trace!(scope = %scope, "Service scope entered");

        let registry: Arc<dyn ReleaseScope> = self.registry.clone();
        ScopeGuard {
            scope,
            registry: Arc::downgrade(&registry),
        }
    }

    pub fn is_active(&self, scope: &ServiceScope) -> bool {
        self.registry.lock().contains_key(scope)
    }

    /// Number of scopes currently holding entries.
    pub fn active_scopes(&self) -> usize {
        self.registry.lock().len()
    }

    /// The scope's verifier, constructed on first use.
    pub fn verifier(&self, scope: &ServiceScope) -> Option<Arc<V>> {
        let mut entries = self.registry.lock();
        let slots = entries.get_mut(scope)?;
        let verifier = slots.verifier.get_or_insert_with(|| {
            tracing::debug!(scope = %scope, "Constructing credential verifier");
            Arc::new((self.verifier_factory)(self.config()))
        });
        Some(Arc::clone(verifier))
    }

    /// The scope's identity-provider client, constructed on first use.
    pub fn identity_client(&self, scope: &ServiceScope) -> Option<Arc<P>> {
        let mut entries = self.registry.lock();
        let slots = entries.get_mut(scope)?;
        let client = slots.client.get_or_insert_with(|| {
            tracing::debug!(scope = %scope, "Constructing identity provider client");
            Arc::new((self.client_factory)(self.config()))
        });
        Some(Arc::clone(client))
    }
}
