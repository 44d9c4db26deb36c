//! Runscope Provider Implementation
//!
//! Dispatches host requests to the registered resources and reports every
//! failure as a diagnostic rather than an error, the way the plugin protocol
//! expects.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::client::{RunscopeApi, RunscopeClient};
use crate::config::ProviderConfig;
use crate::diagnostic::{has_errors, Diagnostic};
use crate::error::{Error, Result};
use crate::resources;
use crate::schema::{self, ResourceSchema};
use crate::state::{DynamicValue, ResourceData};

/// Provider and resource schemas
#[derive(Debug, Clone)]
pub struct ProviderSchemas {
    pub provider: ResourceSchema,
    pub resource_schemas: HashMap<String, ResourceSchema>,
}

/// Result of planning a resource change
#[derive(Debug, Clone, Default)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    /// Attributes whose change forces a replacement
    pub requires_replace: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadResponse {
    /// Null when the resource no longer exists
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ImportResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runscope Terraform Provider
#[derive(Clone, Default)]
pub struct RunscopeProvider {
    /// API client, set by `configure`
    client: Arc<RwLock<Option<Arc<dyn RunscopeApi>>>>,
}

impl RunscopeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with an already configured API capability
    pub fn with_client(client: Arc<dyn RunscopeApi>) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
        }
    }

    async fn get_client(&self) -> Result<Arc<dyn RunscopeApi>> {
        self.client.read().await.clone().ok_or(Error::NotConfigured)
    }

    pub fn get_schema(&self) -> ProviderSchemas {
        info!("GetProviderSchema called");

        ProviderSchemas {
            provider: schema::provider_schema(),
            resource_schemas: resources::all()
                .iter()
                .map(|r| (r.type_name().to_string(), r.schema()))
                .collect(),
        }
    }

    pub async fn configure(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        info!("ConfigureProvider called");

        let mut diagnostics = schema::provider_schema().validate(config);
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        match Self::connect(config, &mut diagnostics) {
            Ok(client) => {
                info!("Configured Runscope API at {}", client.api_url());
                *self.client.write().await = Some(Arc::new(client));
            }
            Err(e) => {
                error!("Failed to configure provider: {}", e);
                diagnostics.push(Diagnostic::error("Failed to configure provider", e.to_string()));
            }
        }

        diagnostics
    }

    fn connect(config: &DynamicValue, diagnostics: &mut Vec<Diagnostic>) -> Result<RunscopeClient> {
        let config = ProviderConfig::from_value(config)?;

        if config.api_url.starts_with("http://") {
            diagnostics.push(
                Diagnostic::warning(
                    "Insecure API URL",
                    format!(
                        "{} does not use TLS, the access token is sent in clear text.",
                        config.api_url
                    ),
                )
                .for_attribute("api_url"),
            );
        }

        RunscopeClient::new(&config).map_err(Error::Client)
    }

    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: &DynamicValue,
    ) -> Vec<Diagnostic> {
        debug!("ValidateResourceConfig called for {}", type_name);

        match resources::lookup(type_name) {
            Ok(resource) => resource.schema().validate(config),
            Err(e) => vec![Diagnostic::error("Invalid resource type", e.to_string())],
        }
    }

    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior_state: &DynamicValue,
        proposed_new_state: &DynamicValue,
    ) -> PlannedChange {
        debug!("PlanResourceChange called for {}", type_name);

        let resource = match resources::lookup(type_name) {
            Ok(resource) => resource,
            Err(e) => {
                return PlannedChange {
                    diagnostics: vec![Diagnostic::error("Invalid resource type", e.to_string())],
                    ..Default::default()
                }
            }
        };

        // Destroy
        if proposed_new_state.is_null() {
            return PlannedChange::default();
        }

        // Create: the key is only known after apply
        if prior_state.is_null() {
            return PlannedChange {
                planned_state: replace_id(proposed_new_state, DynamicValue::Null),
                ..Default::default()
            };
        }

        let requires_replace = resource.schema().requires_replace(prior_state, proposed_new_state);
        let id = if requires_replace.is_empty() {
            prior_state.get("id").cloned().unwrap_or_default()
        } else {
            info!("{} must be replaced, changed: {:?}", type_name, requires_replace);
            DynamicValue::Null
        };

        PlannedChange {
            planned_state: replace_id(proposed_new_state, id),
            requires_replace,
            diagnostics: vec![],
        }
    }

    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> ApplyResponse {
        info!("ApplyResourceChange called for {}", type_name);

        let (new_state, result) = match (prior_state.is_null(), planned_state.is_null()) {
            // Create
            (true, false) => {
                let mut data = ResourceData::from_state(planned_state);
                let result = self.create(type_name, &mut data).await;
                // A key assigned before a failed read-back stays in state
                (data.to_state(), result)
            }
            // Delete
            (false, true) => match self.delete(type_name, prior_state).await {
                Ok(()) => (DynamicValue::Null, Ok(())),
                Err(e) => (prior_state.clone(), Err(e)),
            },
            // Update
            (false, false) => match self.update(type_name, prior_state, planned_state) {
                Ok(state) => (state, Ok(())),
                Err(e) => (prior_state.clone(), Err(e)),
            },
            // No change
            (true, true) => (DynamicValue::Null, Ok(())),
        };

        let diagnostics = match result {
            Ok(()) => vec![],
            Err(e) => {
                error!("ApplyResourceChange failed for {}: {}", type_name, e);
                vec![Diagnostic::error("Failed to apply resource change", e.to_string())]
            }
        };

        ApplyResponse {
            new_state,
            diagnostics,
        }
    }

    async fn create(&self, type_name: &str, data: &mut ResourceData) -> Result<()> {
        let resource = resources::lookup(type_name)?;
        let client = self.get_client().await?;

        resource.create(client.as_ref(), data).await
    }

    async fn delete(&self, type_name: &str, prior: &DynamicValue) -> Result<()> {
        let resource = resources::lookup(type_name)?;
        let client = self.get_client().await?;

        resource
            .delete(client.as_ref(), &ResourceData::from_state(prior))
            .await
    }

    fn update(
        &self,
        type_name: &str,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        let resource = resources::lookup(type_name)?;

        let changed = resource.schema().changed_attributes(prior, planned);
        if !changed.is_empty() {
            return Err(Error::UpdateUnsupported {
                type_name: type_name.to_string(),
                attributes: changed,
            });
        }

        Ok(prior.clone())
    }

    pub async fn read_resource(
        &self,
        type_name: &str,
        current_state: &DynamicValue,
    ) -> ReadResponse {
        info!("ReadResource called for {}", type_name);

        if current_state.is_null() {
            return ReadResponse::default();
        }

        let result = async {
            let resource = resources::lookup(type_name)?;
            let client = self.get_client().await?;

            let mut data = ResourceData::from_state(current_state);
            resource.read(client.as_ref(), &mut data).await?;
            Ok::<_, Error>(data)
        }
        .await;

        match result {
            Ok(data) => {
                if !data.exists() {
                    warn!("{} no longer exists, removing from state", type_name);
                }
                ReadResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResponse {
                new_state: current_state.clone(),
                diagnostics: vec![Diagnostic::error("Failed to read resource", e.to_string())],
            },
        }
    }

    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> ImportResponse {
        info!("ImportResourceState called for {} with ID {}", type_name, id);

        let result = async {
            let resource = resources::lookup(type_name)?;
            let client = self.get_client().await?;

            resource
                .import(client.as_ref(), ResourceData::with_id(id))
                .await
        }
        .await;

        match result {
            Ok(imported) => ImportResponse {
                imported_resources: imported
                    .iter()
                    .map(|data| ImportedResource {
                        type_name: type_name.to_string(),
                        state: data.to_state(),
                    })
                    .collect(),
                diagnostics: vec![],
            },
            Err(e) => ImportResponse {
                imported_resources: vec![],
                diagnostics: vec![Diagnostic::error("Failed to import resource", e.to_string())],
            },
        }
    }
}

/// Copy of a state object with its `id` replaced
fn replace_id(state: &DynamicValue, id: DynamicValue) -> DynamicValue {
    match state {
        DynamicValue::Map(map) => {
            let mut map = map.clone();
            map.insert("id".to_string(), id);
            DynamicValue::Map(map)
        }
        other => other.clone(),
    }
}
