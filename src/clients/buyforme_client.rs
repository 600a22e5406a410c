use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::buyforme_actor::{BuyForMeAction, BuyForMeActionResult, BuyForMeError};
use crate::clients::CustomerClient;
use crate::customer_actor::CustomerError;
use crate::domain::identifiers::{new_batch_id, new_request_number};
use crate::domain::{
    BatchLink, BuyForMeCreate, BuyForMePatch, BuyForMeQuery, BuyForMeRequest, LineItem, RequestStatistics,
    RequestStatus, SubStatus,
};

pub const REQUEST_NUMBER_ATTEMPTS: usize = 20;

/// Client for interacting with the BuyForMe request actor.
///
/// Submissions are validated against the customer registry before any
/// document is written.
#[derive(Clone)]
pub struct BuyForMeClient {
    inner: ResourceClient<BuyForMeRequest>,
    customer_client: CustomerClient,
}

impl_client_methods!(BuyForMeClient, BuyForMeRequest, BuyForMeError, request);

impl BuyForMeClient {
    pub fn new(inner: ResourceClient<BuyForMeRequest>, customer_client: CustomerClient) -> Self {
        Self { inner, customer_client }
    }

    /// Draws request numbers until one is not present in the store.
    #[instrument(skip(self))]
    pub async fn generate_request_number(&self) -> Result<String, BuyForMeError> {
        for attempt in 1..=REQUEST_NUMBER_ATTEMPTS {
            let candidate = new_request_number();
            let taken = self
                .find_requests(BuyForMeQuery::by_request_number(candidate.clone()))
                .await?;
            if taken.is_empty() {
                return Ok(candidate);
            }
            warn!(attempt, request_number = %candidate, "Request number already taken");
        }
        Err(BuyForMeError::RequestNumberExhausted(REQUEST_NUMBER_ATTEMPTS))
    }

    /// Creates a document under a fresh unique request number.
    ///
    /// The store rejects duplicates too, so a number claimed between the
    /// check and the insert is retried rather than reported.
    pub async fn create_with_unique_number(
        &self,
        build: impl Fn(String) -> BuyForMeCreate,
    ) -> Result<BuyForMeRequest, BuyForMeError> {
        for _ in 0..REQUEST_NUMBER_ATTEMPTS {
            let number = self.generate_request_number().await?;
            match self.inner.create(build(number)).await.map_err(BuyForMeError::from) {
                Ok(id) => return self.require(&id).await,
                Err(BuyForMeError::DuplicateRequestNumber(number)) => {
                    warn!(request_number = %number, "Lost request number race, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(BuyForMeError::RequestNumberExhausted(REQUEST_NUMBER_ATTEMPTS))
    }

    /// Submits one request per line item. Several items share a batch.
    #[instrument(skip(self, items, notes), fields(item_count = items.len()))]
    pub async fn submit(
        &self,
        customer_id: String,
        items: Vec<LineItem>,
        notes: Option<String>,
    ) -> Result<Vec<BuyForMeRequest>, BuyForMeError> {
        info!("Processing submission");

        // Step 1: Validate customer
        let customer = match self.customer_client.require(&customer_id).await {
            Ok(customer) => customer,
            Err(CustomerError::NotFound(id)) => {
                error!("Customer not found");
                return Err(BuyForMeError::InvalidCustomer(id));
            }
            Err(e) => {
                error!(error = %e, "Customer validation failed");
                return Err(BuyForMeError::InvalidCustomer(format!("Customer validation failed: {e}")));
            }
        };

        // Step 2: Validate every item before writing anything
        if items.is_empty() {
            return Err(BuyForMeError::ValidationError("at least one item is required".to_string()));
        }
        for item in &items {
            item.validate().map_err(BuyForMeError::ValidationError)?;
        }

        // Step 3: One document per item
        let size = items.len() as u32;
        let batch_id = (size > 1).then(new_batch_id);
        let info = customer.info();
        let mut created = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let request = self
                .create_with_unique_number(|number| {
                    let params = BuyForMeCreate::submission(number, info.clone(), item.clone(), notes.clone());
                    match &batch_id {
                        Some(batch_id) => params.in_batch(BatchLink {
                            batch_id: batch_id.clone(),
                            original_batch_number: None,
                            index: index as u32,
                            size,
                        }),
                        None => params,
                    }
                })
                .await?;
            info!(request_number = %request.request_number, "Request created");
            created.push(request);
        }
        Ok(created)
    }

    #[instrument(skip(self, note))]
    pub async fn update_status(
        &self,
        id: String,
        status: RequestStatus,
        sub_status: Option<SubStatus>,
        actor_id: String,
        note: Option<String>,
    ) -> Result<BuyForMeRequest, BuyForMeError> {
        debug!("Sending request");
        let action = BuyForMeAction::UpdateStatus {
            status,
            sub_status,
            actor_id,
            note,
        };
        match self.inner.perform_action(id, action).await? {
            BuyForMeActionResult::UpdateStatus(request) => {
                info!(request_number = %request.request_number, status = %request.status, "Status updated");
                Ok(request)
            }
            other => Err(BuyForMeError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }

    #[instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        id: String,
        customer_id: String,
        reason: Option<String>,
    ) -> Result<BuyForMeRequest, BuyForMeError> {
        self.get_for_customer(&id, &customer_id).await?;
        let action = BuyForMeAction::Cancel { customer_id, reason };
        match self.inner.perform_action(id, action).await? {
            BuyForMeActionResult::Cancel(request) => {
                info!(request_number = %request.request_number, "Request cancelled by customer");
                Ok(request)
            }
            other => Err(BuyForMeError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }

    #[instrument(skip(self, notes))]
    pub async fn update_admin_notes(&self, id: String, notes: String) -> Result<BuyForMeRequest, BuyForMeError> {
        let patch = BuyForMePatch {
            admin_notes: Some(notes),
            customer_notes: None,
        };
        self.inner.update(id, patch).await.map_err(BuyForMeError::from)
    }

    #[instrument(skip(self, notes))]
    pub async fn update_customer_notes(
        &self,
        id: String,
        customer_id: String,
        notes: String,
    ) -> Result<BuyForMeRequest, BuyForMeError> {
        let request = self.get_for_customer(&id, &customer_id).await?;
        if request.status != RequestStatus::Pending {
            return Err(BuyForMeError::TransitionRejected(format!(
                "customer notes are locked while {}",
                request.status
            )));
        }
        let patch = BuyForMePatch {
            admin_notes: None,
            customer_notes: Some(notes),
        };
        self.inner.update(id, patch).await.map_err(BuyForMeError::from)
    }

    /// Requests in `status` (and `sub_status`, when given), newest first.
    pub async fn get_by_status(
        &self,
        status: RequestStatus,
        sub_status: Option<SubStatus>,
    ) -> Result<Vec<BuyForMeRequest>, BuyForMeError> {
        self.find_sorted(BuyForMeQuery::by_status(status, sub_status)).await
    }

    /// A customer's requests, newest first.
    pub async fn get_by_customer(&self, customer_id: &str) -> Result<Vec<BuyForMeRequest>, BuyForMeError> {
        self.find_sorted(BuyForMeQuery::by_customer(customer_id)).await
    }

    pub async fn find_sorted(&self, query: BuyForMeQuery) -> Result<Vec<BuyForMeRequest>, BuyForMeError> {
        let mut requests = self.find_requests(query).await?;
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.request_number.cmp(&b.request_number))
        });
        Ok(requests)
    }

    #[instrument(skip(self))]
    pub async fn get_statistics(&self) -> Result<RequestStatistics, BuyForMeError> {
        let requests = self.find_requests(BuyForMeQuery::all()).await?;
        Ok(RequestStatistics::from_requests(&requests))
    }

    /// Fetches a request owned by `customer_id`.
    pub async fn get_for_customer(&self, id: &str, customer_id: &str) -> Result<BuyForMeRequest, BuyForMeError> {
        let request = self.require(id).await?;
        if request.customer.id != customer_id {
            return Err(BuyForMeError::Forbidden(request.request_number));
        }
        Ok(request)
    }

    pub async fn require(&self, id: &str) -> Result<BuyForMeRequest, BuyForMeError> {
        self.get_request(id.to_string())
            .await?
            .ok_or_else(|| BuyForMeError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete_request(&self, id: String) -> Result<(), BuyForMeError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(BuyForMeError::from)
    }
}
