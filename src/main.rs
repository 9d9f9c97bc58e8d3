use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

use vehicle_registry::config::database::{mask_database_url, DatabaseConfig};
use vehicle_registry::config::environment::{EnvironmentConfig, StoreBackend};
use vehicle_registry::repositories::{InMemoryRecordStore, PgRecordStore, RecordStore};
use vehicle_registry::routes::create_router;
use vehicle_registry::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚗 Vehicle Registry - API de customers y vehículos");
    info!("================================================");

    let addr: SocketAddr = config.server_url().parse()?;

    match config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            info!("🗄️  Conectando a {}", mask_database_url(&db_config.url));

            let pool = match db_config.create_pool().await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };

            let store = PgRecordStore::new(pool);
            store.ensure_schema().await?;
            serve(store, config, addr).await
        }
        StoreBackend::Memory => {
            warn!("⚠️  STORE_BACKEND=memory: los datos se pierden al reiniciar");
            serve(InMemoryRecordStore::new(), config, addr).await
        }
    }
}

async fn serve<S: RecordStore>(store: S, config: EnvironmentConfig, addr: SocketAddr) -> Result<()> {
    let app = create_router(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health - Health check");
    info!("👤 Customers:");
    info!("   POST   /api/customers - Crear customer");
    info!("   GET    /api/customers - Listar customers (?name=)");
    info!("   GET    /api/customers/:id - Obtener customer");
    info!("   PATCH  /api/customers/:id - Actualizar campos de customer");
    info!("   DELETE /api/customers/:id - Borrado lógico de customer");
    info!("🚗 Vehicles:");
    info!("   POST   /api/vehicles - Crear vehículo");
    info!("   GET    /api/vehicles - Listar vehículos (?brand=&model=&color=)");
    info!("   GET    /api/vehicles/:id - Obtener vehículo");
    info!("   GET    /api/vehicles/plate/:plate - Buscar por placa");
    info!("   PATCH  /api/vehicles/:id - Actualizar campos de vehículo");
    info!("   DELETE /api/vehicles/:id - Borrado lógico de vehículo");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
