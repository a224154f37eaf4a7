use std::sync::Arc;
use tracing::{error, info, warn};

use worldpay_gateway_connector::{
    application::services::{NotificationOrigin, NotificationService},
    infrastructure::{
        adapters::{DnsHostnameResolver, InMemoryPaymentRepository, MonitoringAdapter, ReqwestGatewayTransport},
        gateways::WorldpayGateway,
        http::HttpServer,
    },
    shared::logging::LoggingUtils,
    AppConfig,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = LoggingUtils::initialize(&config.logging.level, &config.logging.format, config.logging.structured) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Worldpay gateway connector...");

    let transport = match ReqwestGatewayTransport::new(config.worldpay.connect_timeout(), config.worldpay.read_timeout()) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            error!("Failed to build gateway transport: {}", e);
            std::process::exit(1);
        }
    };

    let monitoring = match MonitoringAdapter::new() {
        Ok(monitoring) => Arc::new(monitoring),
        Err(e) => {
            error!("Failed to register metrics: {}", e);
            std::process::exit(1);
        }
    };

    let repository = Arc::new(InMemoryPaymentRepository::new());
    warn!(
        "Payment store is in-memory and starts empty; notifications for payments not recorded \
         in this process are acknowledged as unknown"
    );
    let gateway = Arc::new(WorldpayGateway::new(transport, config.worldpay.clone(), monitoring.clone()));
    let notification_service = Arc::new(NotificationService::new(
        gateway,
        repository.clone(),
        Arc::new(DnsHostnameResolver),
        monitoring.clone(),
        NotificationOrigin::from(&config.worldpay),
    ));

    let server = HttpServer::new(config, notification_service, repository, monitoring);
    info!("Server starting on {}", server.config().server_address());

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
