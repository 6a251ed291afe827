use club_engine::services::{HttpFuelPriceProvider, LocalFileStorage};
use club_engine::{ClubManager, setup_environment};
use shared::models::MaintenanceDue;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    let config = setup_environment()?;

    tracing::info!(
        environment = %config.environment,
        database = %config.database_path.display(),
        tz = %config.timezone,
        "Club engine starting..."
    );

    // 2. 打开数据库
    let manager = ClubManager::new(&config)?;

    // 3. 附件存储 (Hobbs 照片, 油料收据)
    let uploads = LocalFileStorage::from_config(&config);
    tracing::info!(
        dir = %uploads.dir().display(),
        max_bytes = config.max_upload_bytes,
        "Attachment storage ready"
    );

    // 4. 油价刷新 (best effort)
    if let Some(url) = &config.fuel_price_url {
        match HttpFuelPriceProvider::new(url, config.fuel_price_timeout_ms) {
            Ok(provider) => {
                manager.refresh_fuel_prices(&provider).await;
            }
            Err(e) => tracing::warn!(error = %e, "Fuel price provider unavailable"),
        }
    }

    // 5. 机队维护概览
    let overview = manager.fleet_maintenance_overview()?;
    for summary in &overview {
        match summary.status {
            MaintenanceDue::Overdue => tracing::warn!(
                aircraft = %summary.registration,
                items = summary.items.len(),
                "Maintenance OVERDUE"
            ),
            MaintenanceDue::Warning => tracing::warn!(
                aircraft = %summary.registration,
                "Maintenance due soon"
            ),
            MaintenanceDue::Ok => tracing::info!(aircraft = %summary.registration, "Maintenance OK"),
        }
    }

    tracing::info!(aircraft = overview.len(), epoch = %manager.epoch(), "Club engine ready");
    Ok(())
}
