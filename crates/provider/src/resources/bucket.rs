//! Bucket Resource handler for Terraform

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::Resource;
use crate::client::{Bucket, RunscopeApi};
use crate::error::{Error, Result};
use crate::schema::{Attribute, ResourceSchema};
use crate::state::ResourceData;

pub struct BucketResource;

impl BucketResource {
    fn bucket_from_data(data: &ResourceData) -> Result<Bucket> {
        let name = data
            .get_optional_string("name")
            .ok_or_else(|| Error::MissingAttribute("name".to_string()))?;
        let team_uuid = data
            .get_optional_string("team_uuid")
            .ok_or_else(|| Error::MissingAttribute("team_uuid".to_string()))?;

        Ok(Bucket::new(name, team_uuid))
    }
}

#[async_trait]
impl Resource for BucketResource {
    fn type_name(&self) -> &'static str {
        "runscope_bucket"
    }

    fn kind(&self) -> &'static str {
        "bucket"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(0)
            .with_attribute(
                Attribute::computed_string("id")
                    .with_description("Bucket key assigned by Runscope."),
            )
            .with_attribute(
                Attribute::required_string("name")
                    .force_new()
                    .with_description("Name of the bucket."),
            )
            .with_attribute(
                Attribute::required_string("team_uuid")
                    .force_new()
                    .with_description("UUID of the team that owns the bucket."),
            )
    }

    async fn create(&self, client: &dyn RunscopeApi, data: &mut ResourceData) -> Result<()> {
        let bucket = Self::bucket_from_data(data)?;
        info!("Creating bucket for name: {}", bucket.name);
        debug!("bucket create: {:?}", bucket);

        let created = client
            .create_bucket(&bucket)
            .await
            .map_err(|source| Error::Create {
                kind: self.kind(),
                source,
            })?;

        data.set_id(created.key);
        info!("bucket key: {}", data.id());

        self.read(client, data).await
    }

    async fn read(&self, client: &dyn RunscopeApi, data: &mut ResourceData) -> Result<()> {
        let key = data.id().to_string();
        info!(
            "Reading bucket for id: {} name: {}",
            key,
            data.get_string("name")
        );

        let bucket = match client.read_bucket(&key).await {
            Ok(bucket) => bucket,
            Err(e) if e.is_absent() => {
                warn!("bucket {} no longer readable ({}), removing from state", key, e);
                data.set_id("");
                return Ok(());
            }
            Err(source) => {
                return Err(Error::Read {
                    kind: self.kind(),
                    source,
                })
            }
        };

        data.set_string("team_uuid", bucket.team_id());
        data.set_string("name", bucket.name);
        Ok(())
    }

    async fn delete(&self, client: &dyn RunscopeApi, data: &ResourceData) -> Result<()> {
        let key = data.id();
        info!(
            "Deleting bucket with key: {} name: {}",
            key,
            data.get_string("name")
        );

        client
            .delete_bucket(key)
            .await
            .map_err(|source| Error::Delete {
                kind: self.kind(),
                source,
            })
    }
}
