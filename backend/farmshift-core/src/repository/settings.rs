// src/repository/settings.rs
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::keys;
use crate::error::StoreError;
use crate::model::{ConfirmationSettings, VacationDefaults};
use crate::store::{decode, ItemStore, Precondition};

const CONFIRMATION: &str = "CONFIRMATION";
const VACATION_DEFAULT: &str = "VACATION_DEFAULT";

/// Singleton settings documents. Missing documents read as their defaults.
pub struct SettingsRepo {
    store: Arc<dyn ItemStore>,
}

impl SettingsRepo {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub async fn confirmation(&self) -> Result<ConfirmationSettings, StoreError> {
        self.load(CONFIRMATION).await
    }

    pub async fn set_confirmation(&self, settings: &ConfirmationSettings) -> Result<(), StoreError> {
        self.store_doc(CONFIRMATION, settings).await
    }

    pub async fn vacation_defaults(&self) -> Result<VacationDefaults, StoreError> {
        self.load(VACATION_DEFAULT).await
    }

    pub async fn set_vacation_defaults(&self, defaults: &VacationDefaults) -> Result<(), StoreError> {
        self.store_doc(VACATION_DEFAULT, defaults).await
    }

    async fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        let key = keys::settings(name);
        match self.store.get(&key).await? {
            Some(item) => decode(&key, item),
            None => Ok(T::default()),
        }
    }

    async fn store_doc<T: Serialize + Sync>(&self, name: &str, doc: &T) -> Result<(), StoreError> {
        self.store
            .put(keys::settings(name), serde_json::to_value(doc)?, Precondition::None)
            .await?;
        Ok(())
    }
}
