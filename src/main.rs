use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use productly_gateway::api::{self, auth, health, middleware::RequestIdentity};
use productly_gateway::app_state::AppState;
use productly_gateway::config::Config;
use productly_gateway::services::password;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");
    let state = AppState::new(config.clone()).expect("Failed to build upstream client");

    #[derive(OpenApi)]
    #[openapi(
        paths(
            // Auth
            auth::login,
            auth::register,
            auth::refresh,
            auth::logout,
            auth::verify_session,
            auth::validate_password,
            // Health
            health::health,
        ),
        components(
            schemas(
                auth::LoginRequest,
                auth::RegisterRequest,
                auth::PasswordValidationRequest,
                auth::PasswordValidationResponse,
                auth::VerifySessionResponse,
                auth::SoftReason,
                password::PasswordStrength,
                password::StrengthLevel,
                health::HealthResponse,
            )
        ),
        tags(
            (name = "Auth", description = "Session flows with cookie handling"),
            (name = "Health", description = "Liveness probe")
        )
    )]
    struct ApiDoc;

    let host = config.host.clone();
    let port = config.port;
    let workers = config.effective_workers();
    let origins = config.cors_origins();
    let max_body = config.effective_max_body_bytes();

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Proxying to {}", state.upstream.base_url());
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);
    if config.is_production() {
        log::info!("Production mode: session cookies are marked Secure");
    }

    let state = web::Data::new(state);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(middleware::Condition::new(!origins.is_empty(), cors))
            .wrap(RequestIdentity)
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_body))
            .service(health::health)
            .configure(api::init_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .default_service(web::to(api::not_found))
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
