use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered customer and the warehouse box assigned to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub box_number: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: String,
    /// Assigned by the client before creation.
    #[serde(skip)]
    pub box_number: String,
}

/// Payload for updating an existing customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    pub box_number: Option<String>,
}

impl Customer {
    /// Identity snapshot embedded in the documents this customer owns.
    pub fn info(&self) -> CustomerInfo {
        CustomerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Customer identity as copied onto a BuyForMe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(format!("invalid email address: {email}")),
    }
}
