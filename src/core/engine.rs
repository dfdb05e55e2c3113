use crate::config::ClientParams;
use crate::core::client::build_client;
use crate::core::completion::{completion_channel, Completion};
use crate::core::executor::resolve_executor;
use crate::domain::model::{ObjectKey, TransferBuffer};
use crate::domain::ports::{ObjClient, SharedExecutor};
use crate::utils::error::{ObjError, Result};
use std::sync::Arc;
use tracing::info;

/// The two client slots an engine may hold.
#[derive(Debug, Clone, Default)]
pub struct EngineClientSet {
    pub standard: Option<Arc<dyn ObjClient>>,
    pub accelerated: Option<Arc<dyn ObjClient>>,
}

impl EngineClientSet {
    pub fn get(&self, slot: ActiveSlot) -> Option<&Arc<dyn ObjClient>> {
        match slot {
            ActiveSlot::Standard => self.standard.as_ref(),
            ActiveSlot::Accelerated => self.accelerated.as_ref(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<dyn ObjClient>> {
        self.standard.iter().chain(self.accelerated.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSlot {
    Standard,
    Accelerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePreference {
    #[default]
    Accelerated,
    Standard,
}

/// Picks the slot used for the data path: the preferred slot when filled, else the other one.
pub fn select_active(set: &EngineClientSet, preference: ActivePreference) -> Option<ActiveSlot> {
    let order = match preference {
        ActivePreference::Accelerated => [ActiveSlot::Accelerated, ActiveSlot::Standard],
        ActivePreference::Standard => [ActiveSlot::Standard, ActiveSlot::Accelerated],
    };
    order.into_iter().find(|slot| set.get(*slot).is_some())
}

/// Owns the engine's clients and exposes exactly one of them for data-path operations.
#[derive(Debug)]
pub struct ObjEngine {
    clients: EngineClientSet,
    active_slot: ActiveSlot,
    active: Arc<dyn ObjClient>,
}

impl ObjEngine {
    /// Builds the accelerated (or vendor, when `accel_type` is set) client from `params`.
    /// The standard slot stays empty.
    pub fn new(params: &ClientParams, executor: Option<SharedExecutor>) -> Result<Self> {
        let executor = resolve_executor(executor)?;
        let variant = params.accelerated_variant()?;
        let client = build_client(variant, params, Some(executor.clone()))?;

        let clients = EngineClientSet {
            standard: None,
            accelerated: Some(client),
        };

        let engine = Self::assemble(clients, executor, ActivePreference::Accelerated)?;
        info!(variant = %engine.active.variant(), "object storage engine initialized");
        Ok(engine)
    }

    /// Composes an engine from pre-built clients. A missing accelerated client is built from
    /// `params` exactly as [`ObjEngine::new`] would.
    pub fn with_clients(
        params: &ClientParams,
        executor: Option<SharedExecutor>,
        standard: Option<Arc<dyn ObjClient>>,
        accelerated: Option<Arc<dyn ObjClient>>,
    ) -> Result<Self> {
        let executor = resolve_executor(executor)?;
        let accelerated = match accelerated {
            Some(client) => client,
            None => build_client(params.accelerated_variant()?, params, Some(executor.clone()))?,
        };

        let clients = EngineClientSet {
            standard,
            accelerated: Some(accelerated),
        };
        Self::assemble(clients, executor, ActivePreference::Accelerated)
    }

    /// Composes an engine from clients alone, with no fallback construction.
    pub fn from_client_set(
        clients: EngineClientSet,
        executor: SharedExecutor,
        preference: ActivePreference,
    ) -> Result<Self> {
        Self::assemble(clients, executor, preference)
    }

    fn assemble(
        clients: EngineClientSet,
        executor: SharedExecutor,
        preference: ActivePreference,
    ) -> Result<Self> {
        let active_slot = select_active(&clients, preference).ok_or_else(|| ObjError::ConfigError {
            message: "engine requires at least one object client".to_string(),
        })?;
        let active = clients
            .get(active_slot)
            .cloned()
            .ok_or_else(|| ObjError::ConfigError {
                message: format!("selected slot {:?} is empty", active_slot),
            })?;

        for client in clients.iter() {
            client.set_executor(executor.clone());
        }

        Ok(Self {
            clients,
            active_slot,
            active,
        })
    }

    /// The client every data-path operation goes through.
    pub fn active_client(&self) -> &dyn ObjClient {
        self.active.as_ref()
    }

    pub fn active_slot(&self) -> ActiveSlot {
        self.active_slot
    }

    pub fn clients(&self) -> &EngineClientSet {
        &self.clients
    }

    /// Swaps the executor of every client the engine holds.
    /// Operations already issued keep running where they were scheduled.
    pub fn set_executor(&self, executor: SharedExecutor) {
        for client in self.clients.iter() {
            client.set_executor(executor.clone());
        }
    }

    pub fn put(&self, key: &ObjectKey, buffer: &TransferBuffer) -> Completion {
        let (callback, completion) = completion_channel();
        self.active_client().put_object_async(key, buffer, callback);
        completion
    }

    pub fn get(&self, key: &ObjectKey, buffer: &TransferBuffer) -> Completion {
        let (callback, completion) = completion_channel();
        self.active_client().get_object_async(key, buffer, callback);
        completion
    }

    /// Blocking; see [`ObjClient::check_object_exists`].
    pub fn exists(&self, key: &ObjectKey) -> bool {
        self.active_client().check_object_exists(key)
    }
}
