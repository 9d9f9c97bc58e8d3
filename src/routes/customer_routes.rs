use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::customer_dto::CustomerResponse;
use crate::dto::ApiResponse;
use crate::models::customer::{CustomerFilters, CustomerPatch, NewCustomer};
use crate::repositories::RecordStore;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::json::AppJson;

pub fn create_customer_router<S: RecordStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_customer::<S>).get(list_customers::<S>))
        .route(
            "/:id",
            get(get_customer::<S>)
                .patch(update_customer::<S>)
                .delete(delete_customer::<S>),
        )
}

async fn create_customer<S: RecordStore>(
    State(state): State<AppState<S>>,
    AppJson(request): AppJson<NewCustomer>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), AppError> {
    let customer = state.customers.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            customer.into(),
            "Customer created successfully",
        )),
    ))
}

async fn list_customers<S: RecordStore>(
    State(state): State<AppState<S>>,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, AppError> {
    let customers = state.customers.list(&filters).await?;
    Ok(Json(ApiResponse::success(
        customers.into_iter().map(CustomerResponse::from).collect(),
    )))
}

async fn get_customer<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let customer = state.customers.find_by_id(id).await?;
    Ok(Json(ApiResponse::success(customer.into())))
}

async fn update_customer<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<CustomerPatch>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let customer = state.customers.partial_update(id, patch).await?;
    Ok(Json(ApiResponse::success_with_message(
        customer.into(),
        "Customer updated successfully",
    )))
}

async fn delete_customer<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.customers.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
