#[cfg(test)]
mod tests {
    use crate::actor_framework::{Entity, FrameworkError};
    use crate::box_actor::BoxContentError;
    use crate::buyforme_actor::BuyForMeError;
    use crate::clients::{BoxClient, BuyForMeClient, CustomerClient};
    use crate::domain::identifiers::is_valid_request_number;
    use crate::domain::{BoxContent, BoxContentCreate, BuyForMeRequest, Customer};
    use crate::migration::migrate_individual_requests;
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_delete, expect_get, expect_list};
    use crate::test_support::{legacy_request, line_item};
    use chrono::Utc;
    use tokio::sync::mpsc;

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            box_number: "HH123456".to_string(),
            created_at: Utc::now(),
        }
    }

    type Requests = mpsc::Receiver<crate::actor_framework::ResourceRequest<BuyForMeRequest>>;

    fn buyforme_client() -> (
        BuyForMeClient,
        mpsc::Receiver<crate::actor_framework::ResourceRequest<Customer>>,
        Requests,
    ) {
        let (customer_inner, customer_rx) = create_mock_client::<Customer>(10);
        let (request_inner, request_rx) = create_mock_client::<BuyForMeRequest>(10);
        let client = BuyForMeClient::new(request_inner, CustomerClient::new(customer_inner));
        (client, customer_rx, request_rx)
    }

    /// Answers the create and the follow-up read the client issues for one new request.
    async fn acknowledge_create(request_rx: &mut Requests, id: &str) -> BuyForMeRequest {
        let (params, responder) = expect_create(request_rx).await.expect("Expected Request Create");
        let stored = BuyForMeRequest::from_create_params(id.to_string(), params).unwrap();
        responder.send(Ok(id.to_string())).unwrap();

        let (get_id, responder) = expect_get(request_rx).await.expect("Expected Request Get");
        assert_eq!(get_id, id);
        responder.send(Ok(Some(stored.clone()))).unwrap();
        stored
    }

    #[tokio::test]
    async fn test_submission_flow_retries_taken_request_number() {
        // 1. Setup Mocks
        let (client, mut customer_rx, mut request_rx) = buyforme_client();

        // 2. Execute submission in background
        let task = tokio::spawn(async move {
            client
                .submit("cust_1".to_string(), vec![line_item("lamp", 1, 40.0)], Some("gift".to_string()))
                .await
        });

        // 3. Verify Interactions

        // Customer is validated first
        let (customer_id, responder) = expect_get(&mut customer_rx).await.expect("Expected Customer Get");
        assert_eq!(customer_id, "cust_1");
        responder.send(Ok(Some(customer("cust_1")))).unwrap();

        // First candidate number is already taken
        let (query, responder) = expect_list(&mut request_rx).await.expect("Expected number check");
        let taken = query.request_number.clone().unwrap();
        assert!(is_valid_request_number(&taken));
        let existing = legacy_request("req_0", &taken, "cust_9", 1);
        responder.send(Ok(vec![existing])).unwrap();

        // Second candidate is free
        let (query, responder) = expect_list(&mut request_rx).await.expect("Expected number check");
        assert!(query.request_number.is_some());
        responder.send(Ok(vec![])).unwrap();

        let stored = acknowledge_create(&mut request_rx, "req_1").await;
        assert_eq!(stored.customer.id, "cust_1");
        assert_eq!(stored.batch_id, None);
        assert_eq!(stored.customer_notes.as_deref(), Some("gift"));

        // 4. Verify Result
        let created = task.await.unwrap().unwrap();
        assert_eq!(created, vec![stored]);
    }

    #[tokio::test]
    async fn test_submission_for_unknown_customer_writes_nothing() {
        let (client, mut customer_rx, mut request_rx) = buyforme_client();
        let task = tokio::spawn(async move { client.submit("ghost".to_string(), vec![line_item("lamp", 1, 1.0)], None).await });

        let (_, responder) = expect_get(&mut customer_rx).await.expect("Expected Customer Get");
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Err(BuyForMeError::InvalidCustomer("ghost".to_string())));
        assert!(request_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_conflict_draws_a_new_number() {
        let (client, mut customer_rx, mut request_rx) = buyforme_client();
        let task = tokio::spawn(async move { client.submit("cust_1".to_string(), vec![line_item("lamp", 1, 1.0)], None).await });

        let (_, responder) = expect_get(&mut customer_rx).await.expect("Expected Customer Get");
        responder.send(Ok(Some(customer("cust_1")))).unwrap();

        // Number looked free but another writer claimed it before the insert
        let (_, responder) = expect_list(&mut request_rx).await.expect("Expected number check");
        responder.send(Ok(vec![])).unwrap();
        let (params, responder) = expect_create(&mut request_rx).await.expect("Expected Request Create");
        responder
            .send(Err(FrameworkError::Conflict(params.request_number.clone())))
            .unwrap();

        let (_, responder) = expect_list(&mut request_rx).await.expect("Expected number check");
        responder.send(Ok(vec![])).unwrap();
        acknowledge_create(&mut request_rx, "req_2").await;

        let created = task.await.unwrap().unwrap();
        assert_eq!(created[0].id, "req_2");
    }

    #[tokio::test]
    async fn test_migration_deletes_original_after_all_children_saved() {
        let (client, _customer_rx, mut request_rx) = buyforme_client();
        let task = tokio::spawn(async move { migrate_individual_requests(&client, false).await });

        let (query, responder) = expect_list(&mut request_rx).await.expect("Expected multi-item scan");
        assert!(query.multi_item_only);
        responder
            .send(Ok(vec![legacy_request("old_1", "BFM10000001", "cust_1", 2)]))
            .unwrap();

        let (query, responder) = expect_list(&mut request_rx).await.expect("Expected children lookup");
        assert_eq!(query.original_batch_number.as_deref(), Some("BFM10000001"));
        responder.send(Ok(vec![])).unwrap();

        let mut children = Vec::new();
        for index in 0..2 {
            let (_, responder) = expect_list(&mut request_rx).await.expect("Expected number check");
            responder.send(Ok(vec![])).unwrap();
            children.push(acknowledge_create(&mut request_rx, &format!("req_{index}")).await);
        }
        assert_eq!(children[0].batch_id, children[1].batch_id);
        assert_eq!(children[1].batch_index, Some(1));
        assert_eq!(children[1].original_batch_number.as_deref(), Some("BFM10000001"));

        let (deleted, responder) = expect_delete(&mut request_rx).await.expect("Expected original Delete");
        assert_eq!(deleted, "old_1");
        responder.send(Ok(())).unwrap();

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.records_migrated, 1);
        assert_eq!(report.requests_created, 2);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_packing_request_checks_owner_before_acting() {
        let (customer_inner, _customer_rx) = create_mock_client::<Customer>(10);
        let (box_inner, mut box_rx) = create_mock_client::<BoxContent>(10);
        let client = BoxClient::new(box_inner, CustomerClient::new(customer_inner));

        let item = BoxContent::from_create_params(
            "box_1".to_string(),
            BoxContentCreate {
                customer_id: "cust_1".to_string(),
                box_number: "HH123456".to_string(),
                request_id: None,
                request_number: None,
                product_name: "Lamp".to_string(),
                description: None,
                quantity: 1,
                weight_kg: None,
                received_by: "staff_1".to_string(),
                arrival_date: None,
            },
        )
        .unwrap();

        let stranger = client.clone();
        let task = tokio::spawn(async move { stranger.request_packing("cust_2", "box_1").await });
        let (_, responder) = expect_get(&mut box_rx).await.expect("Expected Box Get");
        responder.send(Ok(Some(item.clone()))).unwrap();
        assert_eq!(task.await.unwrap(), Err(BoxContentError::Forbidden("box_1".to_string())));

        let task = tokio::spawn(async move { client.request_packing("cust_1", "box_1").await });
        let (_, responder) = expect_get(&mut box_rx).await.expect("Expected Box Get");
        responder.send(Ok(Some(item.clone()))).unwrap();
        let (id, action, responder) = expect_action(&mut box_rx).await.expect("Expected Box Action");
        assert_eq!(id, "box_1");
        let mut flagged = item;
        let result = flagged.handle_action(action).unwrap();
        responder.send(Ok(result)).unwrap();

        let (updated, changed) = task.await.unwrap().unwrap();
        assert!(changed);
        assert!(updated.requested_packing);
    }
}
