// src/repository/requirements.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::keys;
use super::RequirementStore;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::model::{RequirementScope, RequirementSet};
use crate::store::{decode, ItemStore, Precondition};

#[derive(Serialize, Deserialize)]
struct RequirementDocument {
    requirements: RequirementSet,
    updated_at: NaiveDateTime,
}

pub struct RequirementRepo {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl RequirementRepo {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Replaces the whole set stored at `scope`.
    pub async fn put(
        &self,
        scope: RequirementScope,
        requirements: RequirementSet,
    ) -> Result<(), StoreError> {
        let document = RequirementDocument {
            requirements,
            updated_at: self.clock.now(),
        };
        self.store
            .put(
                keys::requirement(scope),
                serde_json::to_value(&document)?,
                Precondition::None,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RequirementStore for RequirementRepo {
    async fn get(&self, scope: RequirementScope) -> Result<Option<RequirementSet>, StoreError> {
        let key = keys::requirement(scope);
        match self.store.get(&key).await? {
            Some(item) => Ok(Some(decode::<RequirementDocument>(&key, item)?.requirements)),
            None => Ok(None),
        }
    }
}
