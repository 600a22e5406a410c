use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::customer_actor::CustomerError;
use crate::domain::identifiers::new_box_number;
use crate::domain::{Customer, CustomerCreate, CustomerPatch};

const BOX_NUMBER_ATTEMPTS: usize = 10;

/// Client for interacting with the Customer actor.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl_basic_client!(CustomerClient, Customer, CustomerError, customer);

impl CustomerClient {
    /// Registers a customer and assigns them a box number.
    ///
    /// Box numbers are unique in the store; a collision retries with a new one.
    #[instrument(skip(self, name, email))]
    pub async fn register(&self, name: String, email: String) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        for _ in 0..BOX_NUMBER_ATTEMPTS {
            let params = CustomerCreate {
                name: name.clone(),
                email: email.clone(),
                box_number: new_box_number(),
            };
            match self.inner.create(params).await.map_err(CustomerError::from) {
                Ok(id) => {
                    let customer = self.require(&id).await?;
                    info!(customer_id = %id, box_number = %customer.box_number, "Customer registered");
                    return Ok(customer);
                }
                Err(CustomerError::AlreadyExists(number)) => {
                    warn!(box_number = %number, "Box number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(CustomerError::AlreadyExists(format!(
            "no free box number after {BOX_NUMBER_ATTEMPTS} attempts"
        )))
    }

    #[instrument(skip(self))]
    pub async fn update_customer(&self, id: String, patch: CustomerPatch) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(CustomerError::from)
    }

    /// Fetches a customer, treating absence as an error.
    pub async fn require(&self, id: &str) -> Result<Customer, CustomerError> {
        self.get_customer(id.to_string())
            .await?
            .ok_or_else(|| CustomerError::NotFound(id.to_string()))
    }
}
