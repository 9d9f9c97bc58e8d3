use uuid::Uuid;
use vehicle_registry::models::customer::{CustomerFilters, CustomerPatch, NewCustomer};
use vehicle_registry::repositories::InMemoryRecordStore;
use vehicle_registry::services::CustomerService;
use vehicle_registry::utils::errors::AppError;

fn setup() -> (InMemoryRecordStore, CustomerService<InMemoryRecordStore>) {
    let store = InMemoryRecordStore::new();
    let service = CustomerService::new(store.clone());
    (store, service)
}

fn maria() -> NewCustomer {
    NewCustomer {
        name: "Maria Silva".to_string(),
        cpf: "529.982.247-25".to_string(),
        email: "maria@example.com".to_string(),
        phone: "(11) 98765-4321".to_string(),
    }
}

fn joao() -> NewCustomer {
    NewCustomer {
        name: "João Souza".to_string(),
        cpf: "111.444.777-35".to_string(),
        email: "joao@example.com".to_string(),
        phone: "(21) 3456-7890".to_string(),
    }
}

#[tokio::test]
async fn test_create_customer() {
    let (_, service) = setup();

    let customer = service.create(maria()).await.unwrap();

    assert_eq!(customer.name, "Maria Silva");
    assert_eq!(customer.cpf, "52998224725");
    assert_eq!(customer.phone, "11987654321");
    assert!(customer.deleted_at.is_none());
    assert_eq!(service.find_by_id(customer.id).await.unwrap(), customer);
}

#[tokio::test]
async fn test_create_with_invalid_cpf_writes_nothing() {
    let (store, service) = setup();

    let request = NewCustomer {
        cpf: "529.982.247-26".to_string(),
        ..maria()
    };
    let err = service.create(request).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(store.all_customers().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_cpf_is_rejected() {
    let (store, service) = setup();
    service.create(maria()).await.unwrap();

    // Misma CPF con otra puntuación
    let request = NewCustomer {
        cpf: "52998224725".to_string(),
        ..joao()
    };
    let err = service.create(request).await.unwrap_err();

    match err {
        AppError::DuplicateValue { resource, field, value } => {
            assert_eq!(resource, "Customer");
            assert_eq!(field, "CPF");
            assert_eq!(value, "52998224725");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.all_customers().await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_email_is_case_insensitive() {
    let (_, service) = setup();
    service.create(maria()).await.unwrap();

    let request = NewCustomer {
        email: "MARIA@example.com".to_string(),
        ..joao()
    };
    let err = service.create(request).await.unwrap_err();

    assert_eq!(err.to_string(), "Customer with email maria@example.com already exists");
}

#[tokio::test]
async fn test_cpf_of_soft_deleted_customer_can_be_reused() {
    let (_, service) = setup();
    let first = service.create(maria()).await.unwrap();
    service.soft_delete(first.id).await.unwrap();

    let second = service.create(maria()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.cpf, first.cpf);
}

#[tokio::test]
async fn test_empty_patch_does_not_touch_store() {
    let (store, service) = setup();
    let before = store.transactions_started();

    let err = service
        .partial_update(Uuid::new_v4(), CustomerPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptyPatch));
    assert_eq!(store.transactions_started(), before);
}

#[tokio::test]
async fn test_partial_update_only_changes_supplied_fields() {
    let (_, service) = setup();
    let customer = service.create(maria()).await.unwrap();

    let patch = CustomerPatch {
        phone: Some("(31) 99999-8888".to_string()),
        ..Default::default()
    };
    let updated = service.partial_update(customer.id, patch).await.unwrap();

    assert_eq!(updated.phone, "31999998888");
    assert_eq!(updated.name, customer.name);
    assert_eq!(updated.cpf, customer.cpf);
    assert_eq!(updated.email, customer.email);
    assert_eq!(updated.created_at, customer.created_at);
}

#[tokio::test]
async fn test_update_to_own_values_is_not_a_duplicate() {
    let (_, service) = setup();
    let customer = service.create(maria()).await.unwrap();

    let patch = CustomerPatch {
        cpf: Some("529.982.247-25".to_string()),
        email: Some("maria@example.com".to_string()),
        ..Default::default()
    };
    let updated = service.partial_update(customer.id, patch).await.unwrap();

    assert_eq!(updated.cpf, customer.cpf);
    assert_eq!(updated.email, customer.email);
}

#[tokio::test]
async fn test_update_to_another_customers_email_is_rejected() {
    let (_, service) = setup();
    let maria = service.create(maria()).await.unwrap();
    let joao = service.create(joao()).await.unwrap();

    let patch = CustomerPatch {
        name: Some("João Pedro Souza".to_string()),
        email: Some(maria.email.clone()),
        ..Default::default()
    };
    let err = service.partial_update(joao.id, patch).await.unwrap_err();

    assert!(matches!(err, AppError::DuplicateValue { .. }));
    // El nombre válido tampoco se aplicó
    assert_eq!(service.find_by_id(joao.id).await.unwrap().name, "João Souza");
}

#[tokio::test]
async fn test_partial_update_validates_present_fields() {
    let (_, service) = setup();
    let customer = service.create(maria()).await.unwrap();

    let patch = CustomerPatch {
        phone: Some("(11) 88765-4321".to_string()),
        ..Default::default()
    };
    let err = service.partial_update(customer.id, patch).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(service.find_by_id(customer.id).await.unwrap().phone, "11987654321");
}

#[tokio::test]
async fn test_partial_update_unknown_customer() {
    let (_, service) = setup();
    let patch = CustomerPatch {
        name: Some("Ninguém".to_string()),
        ..Default::default()
    };

    let err = service.partial_update(Uuid::new_v4(), patch).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound { resource: "Customer", .. }));
}

#[tokio::test]
async fn test_soft_delete() {
    let (store, service) = setup();
    let customer = service.create(maria()).await.unwrap();

    service.soft_delete(customer.id).await.unwrap();

    assert!(matches!(
        service.find_by_id(customer.id).await.unwrap_err(),
        AppError::NotFound { .. }
    ));
    assert!(matches!(
        service.soft_delete(customer.id).await.unwrap_err(),
        AppError::NotFound { .. }
    ));
    assert!(service.list(&CustomerFilters::default()).await.unwrap().is_empty());

    let stored = store.all_customers().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].deleted_at.is_some());
}

#[tokio::test]
async fn test_list_with_name_filter() {
    let (_, service) = setup();
    service.create(maria()).await.unwrap();
    service.create(joao()).await.unwrap();

    let all = service.list(&CustomerFilters::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let filters = CustomerFilters {
        name: Some("silva".to_string()),
    };
    let filtered = service.list(&filters).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Maria Silva");
}
