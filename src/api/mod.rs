use actix_web::web;

pub mod auth;
pub mod envelope;
pub mod health;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod validation;

/// Все маршруты под `/api`: сначала выделенные auth-обработчики, затем таблица прокси
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::init_routes)
            .configure(routes::init_routes),
    );
}

/// Неизвестный путь: тот же конверт, что и у остальных ошибок
pub async fn not_found() -> actix_web::HttpResponse {
    actix_web::HttpResponse::NotFound().json(envelope::Envelope::<()>::failure(
        "Resource not found",
        Some("NOT_FOUND".to_string()),
    ))
}
