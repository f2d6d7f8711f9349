use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::db::form_schema_repository::FormSchemaRepository;
use crate::models::form_schema::{FieldSchema, FormSchema, NewField};

#[derive(Debug, Error)]
pub enum FormSchemaError {
    #[error("Form ID and customer ID are required")]
    MissingIds,
    #[error("Unknown form: {0}")]
    UnknownForm(String),
    #[error("Field {0} is required")]
    MissingFieldAttribute(&'static str),
    #[error("Unsupported field type: {0}")]
    UnsupportedType(String),
    #[error("Select fields need at least one option")]
    EmptyOptions,
    #[error("Schema store failed: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordAction {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub action_type: &'static str,
}

pub const RECORD_ACTIONS: [RecordAction; 2] = [
    RecordAction {
        key: "get-contacts",
        name: "Contacts",
        action_type: "default",
    },
    RecordAction {
        key: "get-clients",
        name: "Clients",
        action_type: "default",
    },
];

/// `get-contacts` and `contacts` name the same form.
pub fn normalize_form_id(form_id: &str) -> String {
    let trimmed = form_id.trim();
    trimmed.strip_prefix("get-").unwrap_or(trimmed).to_string()
}

fn schema_of(fields: Vec<(&str, FieldSchema)>, required: &[&str]) -> FormSchema {
    FormSchema {
        properties: fields
            .into_iter()
            .map(|(name, field)| (name.to_string(), field))
            .collect(),
        required: required.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn default_schema(form_id: &str) -> Option<FormSchema> {
    let schema = match form_id {
        "contacts" => schema_of(
            vec![
                ("id", FieldSchema::string("ID")),
                ("name", FieldSchema::string("Name")),
                ("email", FieldSchema::string("Email").with_format("email")),
                ("phone", FieldSchema::string("Phone Number").with_format("phone")),
                (
                    "status",
                    FieldSchema::string("Status")
                        .with_options(&["Active", "Inactive", "Pending"])
                        .with_default("Active"),
                ),
            ],
            &["id", "name", "email"],
        ),
        "companies" => schema_of(
            vec![
                ("id", FieldSchema::string("ID")),
                ("name", FieldSchema::string("Company Name")),
                ("website", FieldSchema::string("Website").with_format("uri")),
                (
                    "industry",
                    FieldSchema::string("Industry").with_options(&[
                        "Technology",
                        "Healthcare",
                        "Finance",
                        "Manufacturing",
                        "Retail",
                        "Other",
                    ]),
                ),
                (
                    "size",
                    FieldSchema::string("Company Size").with_options(&[
                        "1-10", "11-50", "51-200", "201-500", "501-1000", "1000+",
                    ]),
                ),
            ],
            &["id", "name"],
        ),
        "tasks" => schema_of(
            vec![
                ("id", FieldSchema::string("ID")),
                ("name", FieldSchema::string("Name")),
                ("taskName", FieldSchema::string("Task Name")),
                ("description", FieldSchema::string("Description")),
                (
                    "status",
                    FieldSchema::string("Status").with_options(&[
                        "Not Started",
                        "In Progress",
                        "Completed",
                        "Deferred",
                    ]),
                ),
                (
                    "priority",
                    FieldSchema::string("Priority").with_options(&["Low", "Medium", "High", "Urgent"]),
                ),
                ("dueDate", FieldSchema::string("Due Date").with_format("date")),
                ("assignedTo", FieldSchema::string("Assigned To")),
            ],
            &["id", "name", "taskName"],
        ),
        "clients" => schema_of(
            vec![
                ("id", FieldSchema::string("ID")),
                ("name", FieldSchema::string("Name")),
                ("email", FieldSchema::string("Email").with_format("email")),
                ("phone", FieldSchema::string("Phone Number").with_format("phone")),
                (
                    "status",
                    FieldSchema::string("Status").with_options(&["Active", "Inactive", "Pending"]),
                ),
            ],
            &[],
        ),
        _ => return None,
    };
    Some(schema)
}

/// Maps a dialog field onto its JSON-schema property.
pub fn field_schema(field: &NewField) -> Result<FieldSchema, FormSchemaError> {
    let title = field.title.trim();
    if title.is_empty() {
        return Err(FormSchemaError::MissingFieldAttribute("title"));
    }
    let schema = FieldSchema::string(title);
    match field.field_type.trim() {
        "string" | "" => Ok(schema),
        "email" => Ok(schema.with_format("email")),
        "phone" => Ok(schema.with_format("phone")),
        "select" => {
            let options: Vec<String> = field
                .options
                .iter()
                .flatten()
                .map(|opt| opt.trim().to_string())
                .filter(|opt| !opt.is_empty())
                .collect();
            if options.is_empty() {
                return Err(FormSchemaError::EmptyOptions);
            }
            Ok(FieldSchema {
                options: Some(options),
                ..schema
            })
        }
        other => Err(FormSchemaError::UnsupportedType(other.to_string())),
    }
}

fn validate_ids(form_id: &str, customer_id: &str) -> Result<String, FormSchemaError> {
    let form_id = normalize_form_id(form_id);
    if form_id.is_empty() || customer_id.trim().is_empty() {
        return Err(FormSchemaError::MissingIds);
    }
    Ok(form_id)
}

/// Stored schema for the customer, falling back to the built-in default.
pub async fn load_schema(
    repo: &dyn FormSchemaRepository,
    form_id: &str,
    customer_id: &str,
) -> Result<FormSchema, FormSchemaError> {
    let form_id = validate_ids(form_id, customer_id)?;
    if let Some(stored) = repo.find_schema(customer_id.trim(), &form_id).await? {
        return Ok(stored);
    }
    default_schema(&form_id).ok_or(FormSchemaError::UnknownForm(form_id))
}

/// Adds `field` to the customer's schema, replacing any field of the same name.
pub async fn add_field(
    repo: &dyn FormSchemaRepository,
    form_id: &str,
    customer_id: &str,
    field: &NewField,
) -> Result<FormSchema, FormSchemaError> {
    let form_id = validate_ids(form_id, customer_id)?;
    let customer_id = customer_id.trim();
    let name = field.name.trim();
    if name.is_empty() {
        return Err(FormSchemaError::MissingFieldAttribute("name"));
    }
    let property = field_schema(field)?;

    let mut schema = match repo.find_schema(customer_id, &form_id).await? {
        Some(stored) => stored,
        None => default_schema(&form_id).unwrap_or_default(),
    };
    let replaced = schema.properties.insert(name.to_string(), property).is_some();
    repo.upsert_schema(customer_id, &form_id, &schema).await?;

    info!(%customer_id, %form_id, field = %name, replaced, "form schema field saved");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock_db::MockFormSchemaRepository;

    fn field(name: &str, title: &str, field_type: &str, options: Option<Vec<&str>>) -> NewField {
        NewField {
            name: name.into(),
            title: title.into(),
            field_type: field_type.into(),
            options: options.map(|o| o.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn defaults_cover_known_forms() {
        let contacts = default_schema("contacts").unwrap();
        assert_eq!(contacts.required, vec!["id", "name", "email"]);
        assert_eq!(
            contacts.properties["status"].default,
            Some(serde_json::Value::String("Active".into()))
        );
        assert_eq!(default_schema("tasks").unwrap().properties.len(), 8);
        assert!(default_schema("clients").unwrap().required.is_empty());
        assert!(default_schema("invoices").is_none());
    }

    #[test]
    fn record_action_keys_normalize_to_form_ids() {
        for action in RECORD_ACTIONS.iter() {
            assert!(default_schema(&normalize_form_id(action.key)).is_some());
        }
    }

    #[test]
    fn select_options_are_trimmed_and_filtered() {
        let schema =
            field_schema(&field("tier", "Tier", "select", Some(vec![" Gold", "", "Silver "])))
                .unwrap();
        assert_eq!(schema.options, Some(vec!["Gold".into(), "Silver".into()]));
    }

    #[test]
    fn select_without_options_is_rejected() {
        assert!(matches!(
            field_schema(&field("tier", "Tier", "select", Some(vec![" ", ""]))),
            Err(FormSchemaError::EmptyOptions)
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            field_schema(&field("n", "N", "number", None)),
            Err(FormSchemaError::UnsupportedType(t)) if t == "number"
        ));
    }

    #[tokio::test]
    async fn load_falls_back_to_default() {
        let repo = MockFormSchemaRepository::default();
        let schema = load_schema(&repo, "get-contacts", "cust_1").await.unwrap();
        assert_eq!(schema, default_schema("contacts").unwrap());
    }

    #[tokio::test]
    async fn load_unknown_form_without_stored_schema_fails() {
        let repo = MockFormSchemaRepository::default();
        assert!(matches!(
            load_schema(&repo, "invoices", "cust_1").await,
            Err(FormSchemaError::UnknownForm(_))
        ));
    }

    #[tokio::test]
    async fn add_field_extends_default_and_persists_per_customer() {
        let repo = MockFormSchemaRepository::default();

        let schema = add_field(&repo, "contacts", "cust_1", &field("fax", "Fax", "phone", None))
            .await
            .unwrap();

        assert_eq!(schema.properties["fax"].format.as_deref(), Some("phone"));
        assert!(schema.properties.contains_key("email"));
        let stored = load_schema(&repo, "contacts", "cust_1").await.unwrap();
        assert_eq!(stored, schema);
        let other = load_schema(&repo, "contacts", "cust_2").await.unwrap();
        assert!(!other.properties.contains_key("fax"));
    }

    #[tokio::test]
    async fn add_field_replaces_by_name() {
        let repo = MockFormSchemaRepository::default();
        add_field(&repo, "clients", "cust_1", &field("status", "State", "string", None))
            .await
            .unwrap();

        let schema = load_schema(&repo, "clients", "cust_1").await.unwrap();
        assert_eq!(schema.properties["status"], FieldSchema::string("State"));
    }

    #[tokio::test]
    async fn add_field_to_custom_form_starts_empty() {
        let repo = MockFormSchemaRepository::default();
        let schema = add_field(&repo, "invoices", "cust_1", &field("total", "Total", "string", None))
            .await
            .unwrap();
        assert_eq!(schema.properties.len(), 1);
    }

    #[tokio::test]
    async fn add_field_requires_name() {
        let repo = MockFormSchemaRepository::default();
        assert!(matches!(
            add_field(&repo, "contacts", "cust_1", &field(" ", "Fax", "string", None)).await,
            Err(FormSchemaError::MissingFieldAttribute("name"))
        ));
    }
}
