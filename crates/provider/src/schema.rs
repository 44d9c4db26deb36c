//! Resource and provider schemas
//!
//! A schema lists the attributes a resource accepts, which of them the user
//! must set, which the API computes, and which force a replacement when they
//! change. Validation and plan diffing are driven from here.

use crate::diagnostic::Diagnostic;
use crate::state::DynamicValue;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

impl AttributeType {
    fn accepts(&self, value: &DynamicValue) -> bool {
        match self {
            AttributeType::String => matches!(value, DynamicValue::String(_)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
        }
    }
}

/// A single schema attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub ty: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value destroys and recreates the resource
    pub force_new: bool,
    pub sensitive: bool,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            ty,
            description: "",
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
        }
    }

    pub fn required_string(name: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(name, AttributeType::String)
        }
    }

    pub fn optional_string(name: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(name, AttributeType::String)
        }
    }

    pub fn computed_string(name: &'static str) -> Self {
        Self {
            computed: true,
            ..Self::new(name, AttributeType::String)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Computed attributes the user may not set
    fn read_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }
}

/// Attribute schema for a resource type or the provider block
#[derive(Debug, Clone, Default)]
pub struct ResourceSchema {
    pub version: i64,
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    pub fn new(version: i64) -> Self {
        Self {
            version,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration object against this schema.
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for attr in &self.attributes {
            let value = set_value(config, attr.name);

            match value {
                None if attr.required => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!(
                                "The argument \"{}\" is required, but no definition was found.",
                                attr.name
                            ),
                        )
                        .for_attribute(attr.name),
                    );
                }
                Some(_) if attr.read_only() => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Value for unconfigurable attribute",
                            format!(
                                "Can't configure a value for \"{}\": \
                                 its value will be decided automatically.",
                                attr.name
                            ),
                        )
                        .for_attribute(attr.name),
                    );
                }
                Some(v) if !attr.ty.accepts(v) => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Incorrect attribute value type",
                            format!("Attribute \"{}\" must be a {}.", attr.name, attr.ty.name()),
                        )
                        .for_attribute(attr.name),
                    );
                }
                Some(DynamicValue::String(s)) if attr.required && s.is_empty() => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Invalid value for required argument",
                            format!("The argument \"{}\" must not be empty.", attr.name),
                        )
                        .for_attribute(attr.name),
                    );
                }
                _ => {}
            }
        }

        if let Some(map) = config.as_map() {
            let mut unknown: Vec<&String> = map
                .keys()
                .filter(|key| self.attribute(key).is_none())
                .collect();
            unknown.sort();

            for key in unknown {
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here.", key),
                    )
                    .for_attribute(key.as_str()),
                );
            }
        }

        diagnostics
    }

    /// Force-new attributes whose value differs between prior and proposed
    /// state, in schema order.
    pub fn requires_replace(&self, prior: &DynamicValue, proposed: &DynamicValue) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| a.force_new)
            .filter(|a| set_value(prior, a.name) != set_value(proposed, a.name))
            .map(|a| a.name.to_string())
            .collect()
    }

    /// User-settable attributes whose value differs, in schema order.
    pub fn changed_attributes(&self, prior: &DynamicValue, proposed: &DynamicValue) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| !a.read_only())
            .filter(|a| set_value(prior, a.name) != set_value(proposed, a.name))
            .map(|a| a.name.to_string())
            .collect()
    }
}

/// Attribute value, treating null as unset
fn set_value<'a>(value: &'a DynamicValue, key: &str) -> Option<&'a DynamicValue> {
    value.get(key).filter(|v| !v.is_null())
}

/// Schema of the provider block
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new(0)
        .with_attribute(
            Attribute::optional_string("access_token")
                .sensitive()
                .with_description("Runscope API access token. Defaults to RUNSCOPE_ACCESS_TOKEN."),
        )
        .with_attribute(Attribute::optional_string("api_url").with_description(
            "Runscope API base URL. Defaults to RUNSCOPE_API_URL or https://api.runscope.com.",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{make_state, null_value, string_value};

    fn bucket_like() -> ResourceSchema {
        ResourceSchema::new(0)
            .with_attribute(Attribute::computed_string("id"))
            .with_attribute(Attribute::required_string("name").force_new())
            .with_attribute(Attribute::required_string("team_uuid").force_new())
    }

    #[test]
    fn test_valid_config() {
        let config = make_state(vec![
            ("id", null_value()),
            ("name", string_value("api-tests")),
            ("team_uuid", string_value("t-123")),
        ]);
        assert!(bucket_like().validate(&config).is_empty());
    }

    #[test]
    fn test_missing_required() {
        let config = make_state(vec![("name", string_value("api-tests"))]);
        let diags = bucket_like().validate(&config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Missing required argument");
        assert_eq!(diags[0].attribute.as_deref(), Some("team_uuid"));
    }

    #[test]
    fn test_null_config_reports_every_required() {
        let diags = bucket_like().validate(&null_value());
        let attrs: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert_eq!(attrs, vec!["name".to_string(), "team_uuid".to_string()]);
    }

    #[test]
    fn test_computed_and_unknown_attributes() {
        let config = make_state(vec![
            ("id", string_value("bkt-abc")),
            ("name", string_value("api-tests")),
            ("team_uuid", string_value("t-123")),
            ("color", string_value("blue")),
        ]);
        let diags = bucket_like().validate(&config);
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Value for unconfigurable attribute", "Unsupported argument"]
        );
    }

    #[test]
    fn test_empty_required_string() {
        let config = make_state(vec![
            ("name", string_value("")),
            ("team_uuid", string_value("t-123")),
        ]);
        let diags = bucket_like().validate(&config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Invalid value for required argument");
        assert_eq!(diags[0].attribute.as_deref(), Some("name"));
    }

    #[test]
    fn test_wrong_type() {
        let config = make_state(vec![
            ("name", DynamicValue::Bool(true)),
            ("team_uuid", string_value("t-123")),
        ]);
        let diags = bucket_like().validate(&config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Incorrect attribute value type");
    }

    #[test]
    fn test_requires_replace() {
        let prior = make_state(vec![
            ("id", string_value("bkt-abc")),
            ("name", string_value("api-tests")),
            ("team_uuid", string_value("t-123")),
        ]);
        let same = prior.clone();
        assert!(bucket_like().requires_replace(&prior, &same).is_empty());

        let renamed = make_state(vec![
            ("id", string_value("bkt-abc")),
            ("name", string_value("smoke-tests")),
            ("team_uuid", string_value("t-123")),
        ]);
        assert_eq!(
            bucket_like().requires_replace(&prior, &renamed),
            vec!["name".to_string()]
        );
        assert_eq!(
            bucket_like().changed_attributes(&prior, &renamed),
            vec!["name".to_string()]
        );
    }

    #[test]
    fn test_provider_schema() {
        let schema = provider_schema();
        assert!(schema.attribute("access_token").unwrap().sensitive);
        assert!(!schema.attribute("api_url").unwrap().required);
    }
}
