use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::config::Config;
use super::persistence::JsonCollection;
use crate::actor_framework::{ResourceActor, ResourceClient};
use crate::clients::{BoxClient, BuyForMeClient, CustomerClient};
use crate::domain::{BoxContent, BuyForMeRequest, Customer};

pub const CUSTOMERS_FILE: &str = "customers.json";
pub const REQUESTS_FILE: &str = "buyforme_requests.json";
pub const BOX_CONTENTS_FILE: &str = "box_contents.json";

/// The application system: one actor per collection, wired together through their clients.
pub struct MarketplaceSystem {
    pub customer_client: CustomerClient,
    pub buyforme_client: BuyForMeClient,
    pub box_client: BoxClient,
    handles: Vec<JoinHandle<()>>,
}

fn next_id(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    move || format!("{prefix}_{}", Uuid::new_v4().simple())
}

impl MarketplaceSystem {
    /// Actors without persistence, for tests and dry runs.
    pub fn in_memory(buffer: usize) -> Self {
        let (customer_actor, customers) = ResourceActor::<Customer>::new(buffer, next_id("cust"));
        let (request_actor, requests) = ResourceActor::<BuyForMeRequest>::new(buffer, next_id("req"));
        let (box_actor, boxes) = ResourceActor::<BoxContent>::new(buffer, next_id("box"));
        Self::start(customer_actor, request_actor, box_actor, customers, requests, boxes)
    }

    /// Loads every collection from `config.data_dir` and persists mutations back to it.
    pub fn load(config: &Config) -> Result<Self> {
        let dir = config.data_dir.as_path();
        let customer_file = JsonCollection::new(dir, CUSTOMERS_FILE);
        let request_file = JsonCollection::new(dir, REQUESTS_FILE);
        let box_file = JsonCollection::new(dir, BOX_CONTENTS_FILE);

        let (customer_actor, customers) = ResourceActor::<Customer>::new(config.channel_buffer, next_id("cust"));
        let customer_actor = customer_actor
            .with_documents(customer_file.load()?)
            .with_sink(customer_file);

        let (request_actor, requests) =
            ResourceActor::<BuyForMeRequest>::new(config.channel_buffer, next_id("req"));
        let request_actor = request_actor
            .with_documents(request_file.load()?)
            .with_sink(request_file);

        let (box_actor, boxes) = ResourceActor::<BoxContent>::new(config.channel_buffer, next_id("box"));
        let box_actor = box_actor.with_documents(box_file.load()?).with_sink(box_file);

        info!(data_dir = %dir.display(), "Collections loaded");
        Ok(Self::start(customer_actor, request_actor, box_actor, customers, requests, boxes))
    }

    fn start(
        customer_actor: ResourceActor<Customer>,
        request_actor: ResourceActor<BuyForMeRequest>,
        box_actor: ResourceActor<BoxContent>,
        customers: ResourceClient<Customer>,
        requests: ResourceClient<BuyForMeRequest>,
        boxes: ResourceClient<BoxContent>,
    ) -> Self {
        let customer_client = CustomerClient::new(customers);
        let buyforme_client = BuyForMeClient::new(requests, customer_client.clone());
        let box_client = BoxClient::new(boxes, customer_client.clone());

        let handles = vec![
            tokio::spawn(customer_actor.run()),
            tokio::spawn(request_actor.run()),
            tokio::spawn(box_actor.run()),
        ];

        Self {
            customer_client,
            buyforme_client,
            box_client,
            handles,
        }
    }

    /// Drops the clients, which closes the channels, then waits for every actor to drain.
    ///
    /// Clones handed out (e.g. to the HTTP state) must be dropped first.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down system...");
        drop(self.customer_client);
        drop(self.buyforme_client);
        drop(self.box_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                anyhow::bail!("Actor task failed: {e}");
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
