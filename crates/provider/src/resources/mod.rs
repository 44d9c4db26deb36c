//! Resource Implementations
//!
//! Implements the lifecycle operations for each resource type and the
//! registry the provider dispatches through.

pub mod bucket;

use async_trait::async_trait;

use crate::client::RunscopeApi;
use crate::error::{Error, Result};
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

use bucket::BucketResource;

/// Trait for resource operations
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name
    fn type_name(&self) -> &'static str;

    /// Noun used in error messages
    fn kind(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    /// Create the remote entity from configuration and set the identity
    async fn create(&self, client: &dyn RunscopeApi, data: &mut ResourceData) -> Result<()>;

    /// Refresh attributes. Clears the identity when the entity is gone.
    async fn read(&self, client: &dyn RunscopeApi, data: &mut ResourceData) -> Result<()>;

    /// Delete the remote entity
    async fn delete(&self, client: &dyn RunscopeApi, data: &ResourceData) -> Result<()>;

    /// Adopt an existing entity by identity
    async fn import(
        &self,
        client: &dyn RunscopeApi,
        mut data: ResourceData,
    ) -> Result<Vec<ResourceData>> {
        let key = data.id().to_string();

        self.read(client, &mut data).await?;

        if !data.exists() {
            return Err(Error::ImportNotFound {
                kind: self.kind(),
                key,
            });
        }

        Ok(vec![data])
    }
}

static RESOURCES: &[&dyn Resource] = &[&BucketResource];

/// Every registered resource
pub fn all() -> &'static [&'static dyn Resource] {
    RESOURCES
}

/// Find a resource by type name
pub fn lookup(type_name: &str) -> Result<&'static dyn Resource> {
    RESOURCES
        .iter()
        .copied()
        .find(|r| r.type_name() == type_name)
        .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))
}
