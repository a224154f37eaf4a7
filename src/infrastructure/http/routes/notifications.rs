//! Gateway notification routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::NotificationService;
use crate::config::AppConfig;
use crate::infrastructure::http::handlers::handle_worldpay_notification;
use crate::infrastructure::http::utils::with_notification_service;

pub struct NotificationRoutes;

impl NotificationRoutes {
    /// `POST /v1/api/notifications/worldpay`
    pub fn create_worldpay_route(
        config: &AppConfig,
        service: Arc<NotificationService>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path!("v1" / "api" / "notifications" / "worldpay")
            .and(warp::post())
            .and(warp::body::content_length_limit(config.server.max_request_size))
            .and(warp::body::bytes())
            .and(warp::header::optional::<String>("x-forwarded-for"))
            .and(with_notification_service(service))
            .and_then(handle_worldpay_notification)
    }
}
