//! Fake backend for integration tests.
//!
//! Binds an actix server to an ephemeral port, records every request it
//! receives and answers according to a small script keyed by path.

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

pub const UPSTREAM_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub cookie: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.calls().pop().expect("upstream was not called")
    }

    fn push(&self, call: Recorded) {
        self.0.lock().unwrap().push(call);
    }
}

pub struct FakeUpstream {
    pub base_url: String,
    pub recorder: Recorder,
    handle: ServerHandle,
}

impl FakeUpstream {
    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn cookie_has(req: &HttpRequest, pair: &str) -> bool {
    header_value(req, header::COOKIE)
        .map(|c| c.split("; ").any(|p| p == pair))
        .unwrap_or(false)
}

async fn scripted(req: HttpRequest, body: web::Bytes, recorder: web::Data<Recorder>) -> HttpResponse {
    let path = req
        .path()
        .strip_prefix(UPSTREAM_PREFIX)
        .unwrap_or(req.path())
        .to_string();
    let parsed: Option<Value> = serde_json::from_slice(&body).ok();

    recorder.push(Recorded {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.query_string().to_string(),
        cookie: header_value(&req, header::COOKIE),
        authorization: header_value(&req, header::AUTHORIZATION),
        request_id: header_value(&req, header::HeaderName::from_static("x-request-id")),
        body: parsed.clone(),
    });

    match (req.method().as_str(), path.as_str()) {
        ("POST", "/auth/login") => HttpResponse::Ok()
            .append_header((header::SET_COOKIE, "accessToken=acc-1; Path=/; HttpOnly"))
            .append_header((header::SET_COOKIE, "sessionToken=ses-1; Path=/; HttpOnly"))
            .json(json!({"success": true, "data": {"user": {"id": "u1"}}, "message": "Login successful"})),
        ("POST", "/auth/register") => HttpResponse::Created()
            .append_header((header::SET_COOKIE, "sessionToken=ses-new; Path=/; HttpOnly"))
            .json(json!({"success": true, "data": parsed, "message": "Account created"})),
        ("POST", "/auth/logout") => {
            if cookie_has(&req, "sessionToken=broken") {
                HttpResponse::InternalServerError().json(json!({"message": "logout store unavailable"}))
            } else {
                HttpResponse::Ok()
                    .append_header((header::SET_COOKIE, "sessionToken=; Max-Age=0"))
                    .append_header((header::SET_COOKIE, "locale=en; Path=/"))
                    .json(json!({"success": true}))
            }
        }
        ("POST", "/auth/refresh") => {
            if cookie_has(&req, "refreshToken=good") {
                HttpResponse::Ok()
                    .append_header((header::SET_COOKIE, "accessToken=acc-2; Path=/; HttpOnly"))
                    .json(json!({"success": true, "message": "Token refreshed"}))
            } else {
                HttpResponse::Unauthorized().json(json!({"message": "Invalid refresh token"}))
            }
        }
        ("GET", "/auth/verify-session") => {
            if cookie_has(&req, "sessionToken=good") {
                HttpResponse::Ok().json(json!({"data": {"valid": true, "userId": "u1"}}))
            } else if cookie_has(&req, "sessionToken=revoked") {
                HttpResponse::Ok().json(json!({"data": {"valid": false}}))
            } else {
                HttpResponse::Unauthorized().json(json!({"message": "Session expired"}))
            }
        }
        ("POST", "/auth/validate-password") => {
            let password = parsed
                .as_ref()
                .and_then(|b| b.get("password"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            match password {
                "Explode-Backend-1" => HttpResponse::BadGateway().finish(),
                "Company-Name-1" => HttpResponse::Ok()
                    .json(json!({"data": {"valid": false}, "message": "Password contains company name"})),
                _ => HttpResponse::Ok().json(json!({"data": {"valid": true}})),
            }
        }
        ("GET", "/invitations/forbidden") => HttpResponse::Forbidden()
            .json(json!({"success": false, "message": "Only admins can view invitations"})),
        ("GET", "/invitations/forbidden-silent") => HttpResponse::Forbidden().finish(),
        ("GET", "/invitations/expired") => HttpResponse::Unauthorized()
            .json(json!({"success": false, "message": "jwt expired"})),
        ("GET", "/invitations/missing") => HttpResponse::NotFound()
            .json(json!({"success": false, "message": "Invitation not found", "code": "NOT_FOUND"})),
        ("GET", "/invitations/broken") => HttpResponse::ServiceUnavailable()
            .body("upstream maintenance"),
        ("POST", "/invitations/accept") => HttpResponse::Ok()
            .append_header((header::SET_COOKIE, "sessionToken=ses-inv; Path=/; HttpOnly"))
            .json(json!({"success": true, "message": "Invitation accepted"})),
        ("POST", "/invitations") => HttpResponse::Created()
            .append_header((header::SET_COOKIE, "tracking=1"))
            .json(json!({"success": true, "data": parsed, "message": "Invitation sent"})),
        ("PATCH", "/organization") => HttpResponse::NoContent().finish(),
        _ => HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "method": req.method().as_str(),
                "path": path.clone(),
                "query": req.query_string(),
                "body": parsed,
            }
        })),
    }
}

pub async fn spawn_upstream() -> FakeUpstream {
    let recorder = Recorder::default();
    let data = web::Data::new(recorder.clone());
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake upstream");
    let addr = listener.local_addr().expect("fake upstream address");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(scripted))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen fake upstream")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    FakeUpstream {
        base_url: format!("http://{}{}", addr, UPSTREAM_PREFIX),
        recorder,
        handle,
    }
}

/// Base URL with nothing listening behind it
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{}/api/v1", addr)
}

/// Builds the gateway service the way `main` does, against the given backend
macro_rules! gateway {
    (config: $config:expr) => {{
        let state = productly_gateway::app_state::AppState::new($config).expect("app state");
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(productly_gateway::api::middleware::RequestIdentity)
                .app_data(actix_web::web::Data::new(state))
                .service(productly_gateway::api::health::health)
                .configure(productly_gateway::api::init_routes)
                .default_service(actix_web::web::to(productly_gateway::api::not_found)),
        )
        .await
    }};
    ($base_url:expr) => {
        gateway!(config: productly_gateway::config::Config::with_base_url($base_url))
    };
}
