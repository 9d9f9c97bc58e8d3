use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::vehicle_dto::VehicleResponse;
use crate::dto::ApiResponse;
use crate::models::vehicle::{NewVehicle, VehicleFilters, VehiclePatch};
use crate::repositories::RecordStore;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::json::AppJson;

pub fn create_vehicle_router<S: RecordStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_vehicle::<S>).get(list_vehicles::<S>))
        .route("/plate/:plate", get(get_vehicle_by_plate::<S>))
        .route(
            "/:id",
            get(get_vehicle::<S>)
                .patch(update_vehicle::<S>)
                .delete(delete_vehicle::<S>),
        )
}

async fn create_vehicle<S: RecordStore>(
    State(state): State<AppState<S>>,
    AppJson(request): AppJson<NewVehicle>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), AppError> {
    let vehicle = state.vehicles.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle created successfully",
        )),
    ))
}

async fn list_vehicles<S: RecordStore>(
    State(state): State<AppState<S>>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let vehicles = state.vehicles.list(&filters).await?;
    Ok(Json(ApiResponse::success(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    )))
}

async fn get_vehicle<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let vehicle = state.vehicles.find_by_id(id).await?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}

async fn get_vehicle_by_plate<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(plate): Path<String>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let vehicle = state.vehicles.find_by_license_plate(&plate).await?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}

async fn update_vehicle<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<VehiclePatch>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let vehicle = state.vehicles.partial_update(id, patch).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehicle updated successfully",
    )))
}

async fn delete_vehicle<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.vehicles.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
