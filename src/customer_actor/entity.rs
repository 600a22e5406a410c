use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::customer::{validate_email, validate_name};
use crate::domain::{Customer, CustomerCreate, CustomerPatch, CustomerQuery};

impl Entity for Customer {
    type Id = String;
    type CreateParams = CustomerCreate;
    type Patch = CustomerPatch;
    type Query = CustomerQuery;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Customer from registration parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the customer
    /// * `params` - Name, email and the pre-assigned box number
    fn from_create_params(id: String, params: CustomerCreate) -> Result<Self, String> {
        validate_name(&params.name)?;
        validate_email(&params.email)?;
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email: params.email.trim().to_lowercase(),
            box_number: params.box_number,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.box_number)
    }

    fn matches(&self, query: &CustomerQuery) -> bool {
        query.box_number.as_ref().map_or(true, |number| &self.box_number == number)
    }

    /// Updates the customer's profile information.
    ///
    /// # Fields Updated
    /// - `name`: display name
    /// - `email`: contact address
    fn on_update(&mut self, patch: CustomerPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            validate_name(&name)?;
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            self.email = email.trim().to_lowercase();
        }
        Ok(())
    }

    /// Customers have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
