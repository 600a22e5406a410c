use tracing::{debug, error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::box_actor::{BoxAction, BoxActionResult, BoxContentError};
use crate::clients::CustomerClient;
use crate::customer_actor::CustomerError;
use crate::domain::{BoxContent, BoxContentCreate, BoxContentPatch, BoxContentQuery, BoxStatus, BoxSummary, ItemCondition};

/// Client for interacting with the box-contents actor.
#[derive(Clone)]
pub struct BoxClient {
    inner: ResourceClient<BoxContent>,
    customer_client: CustomerClient,
}

impl_client_methods!(BoxClient, BoxContent, BoxContentError, item);

impl BoxClient {
    pub fn new(inner: ResourceClient<BoxContent>, customer_client: CustomerClient) -> Self {
        Self { inner, customer_client }
    }

    /// Records a physical arrival into the customer's box.
    #[instrument(skip(self, params), fields(customer_id = %params.customer_id))]
    pub async fn arrive(&self, mut params: BoxContentCreate) -> Result<BoxContent, BoxContentError> {
        let customer = match self.customer_client.require(&params.customer_id).await {
            Ok(customer) => customer,
            Err(CustomerError::NotFound(id)) => return Err(BoxContentError::InvalidCustomer(id)),
            Err(e) => {
                error!(error = %e, "Customer lookup failed");
                return Err(BoxContentError::InvalidCustomer(e.to_string()));
            }
        };
        if params.box_number.is_empty() {
            params.box_number = customer.box_number;
        } else if params.box_number != customer.box_number {
            return Err(BoxContentError::ValidationError(format!(
                "box {} does not belong to customer {}",
                params.box_number, customer.id
            )));
        }

        debug!("Sending request");
        let id = self.inner.create(params).await?;
        let item = self.require(&id).await?;
        info!(item_id = %item.id, box_number = %item.box_number, "Item arrived");
        Ok(item)
    }

    pub async fn require(&self, id: &str) -> Result<BoxContent, BoxContentError> {
        self.get_item(id.to_string())
            .await?
            .ok_or_else(|| BoxContentError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_item(&self, id: String, patch: BoxContentPatch) -> Result<BoxContent, BoxContentError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(BoxContentError::from)
    }

    /// A customer's items, most recent arrival first.
    pub async fn contents_for_customer(
        &self,
        customer_id: &str,
        status: Option<BoxStatus>,
    ) -> Result<Vec<BoxContent>, BoxContentError> {
        let mut items = self.find_items(BoxContentQuery::for_customer(customer_id, status)).await?;
        items.sort_by(|a, b| b.arrival_date.cmp(&a.arrival_date).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, customer_id: &str) -> Result<BoxSummary, BoxContentError> {
        let items = self.find_items(BoxContentQuery::for_customer(customer_id, None)).await?;
        Ok(BoxSummary::from_contents(customer_id, &items))
    }

    #[instrument(skip(self, notes, photos))]
    pub async fn inspect(
        &self,
        id: String,
        inspected_by: String,
        condition: ItemCondition,
        notes: Option<String>,
        photos: Vec<String>,
    ) -> Result<BoxContent, BoxContentError> {
        self.transition(
            id,
            BoxAction::Inspect {
                inspected_by,
                condition,
                notes,
                photos,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn mark_ready_for_packing(&self, id: String, staff_id: String) -> Result<BoxContent, BoxContentError> {
        self.transition(id, BoxAction::MarkReadyForPacking { staff_id }).await
    }

    #[instrument(skip(self))]
    pub async fn pack(
        &self,
        id: String,
        packed_by: String,
        package_reference: Option<String>,
    ) -> Result<BoxContent, BoxContentError> {
        self.transition(
            id,
            BoxAction::Pack {
                packed_by,
                package_reference,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn ship(&self, id: String, carrier: String, tracking_number: String) -> Result<BoxContent, BoxContentError> {
        self.transition(id, BoxAction::Ship { carrier, tracking_number }).await
    }

    #[instrument(skip(self))]
    pub async fn deliver(&self, id: String) -> Result<BoxContent, BoxContentError> {
        self.transition(id, BoxAction::Deliver).await
    }

    #[instrument(skip(self, reason))]
    pub async fn return_item(&self, id: String, reason: String, recorded_by: String) -> Result<BoxContent, BoxContentError> {
        self.transition(id, BoxAction::Return { reason, recorded_by }).await
    }

    #[instrument(skip(self, reason))]
    pub async fn dispose(&self, id: String, reason: String, recorded_by: String) -> Result<BoxContent, BoxContentError> {
        self.transition(id, BoxAction::Dispose { reason, recorded_by }).await
    }

    /// Returns the item and whether the flag was newly set.
    #[instrument(skip(self))]
    pub async fn request_packing(&self, customer_id: &str, item_id: &str) -> Result<(BoxContent, bool), BoxContentError> {
        self.owned_by(item_id, customer_id).await?;
        let action = BoxAction::RequestPacking {
            customer_id: customer_id.to_string(),
        };
        self.customer_flag(item_id, action).await
    }

    /// Returns the item and whether the flag was newly set.
    #[instrument(skip(self))]
    pub async fn confirm_packing(&self, customer_id: &str, item_id: &str) -> Result<(BoxContent, bool), BoxContentError> {
        self.owned_by(item_id, customer_id).await?;
        let action = BoxAction::ConfirmPacking {
            customer_id: customer_id.to_string(),
        };
        self.customer_flag(item_id, action).await
    }

    async fn owned_by(&self, item_id: &str, customer_id: &str) -> Result<BoxContent, BoxContentError> {
        let item = self.require(item_id).await?;
        if item.customer_id != customer_id {
            return Err(BoxContentError::Forbidden(item.id));
        }
        Ok(item)
    }

    async fn transition(&self, id: String, action: BoxAction) -> Result<BoxContent, BoxContentError> {
        debug!("Sending request");
        let item = self.inner.perform_action(id, action).await?.into_item();
        info!(item_id = %item.id, status = %item.status, "Item moved");
        Ok(item)
    }

    async fn customer_flag(&self, item_id: &str, action: BoxAction) -> Result<(BoxContent, bool), BoxContentError> {
        debug!("Sending request");
        match self.inner.perform_action(item_id.to_string(), action).await? {
            BoxActionResult::CustomerFlag { changed, item } => {
                if changed {
                    info!(item_id = %item.id, "Customer flag set");
                }
                Ok((item, changed))
            }
            BoxActionResult::Transitioned(item) => Ok((item, true)),
        }
    }
}
