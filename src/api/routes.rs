use actix_web::web;

use super::proxy::{Access, CookiePolicy, ProxyRoute, Verb, proxy_handler};

use Access::{Public, Session};
use CookiePolicy::{ForwardSetCookie, Passthrough};
use Verb::{Delete, Get, Patch, Post, Put};

const fn route(
    path: &'static str,
    methods: &'static [Verb],
    upstream: &'static str,
    access: Access,
    cookies: CookiePolicy,
) -> ProxyRoute {
    ProxyRoute {
        path,
        methods,
        upstream,
        access,
        cookies,
    }
}

// Статические сегменты идут раньше параметризованных соседей
// (`/invitations/accept` до `/invitations/{id}`).
pub const ROUTES: &[ProxyRoute] = &[
    // --- Auth ---
    route("/auth/me", &[Get], "auth/me", Session, Passthrough),
    route("/auth/forgot-password", &[Post], "auth/forgot-password", Public, Passthrough),
    route("/auth/reset-password", &[Post], "auth/reset-password", Public, Passthrough),
    route("/auth/verify-email", &[Post], "auth/verify-email", Public, ForwardSetCookie),
    route("/auth/change-password", &[Post], "auth/change-password", Session, Passthrough),
    route("/auth/sessions", &[Get], "auth/sessions", Session, Passthrough),
    route("/auth/sessions/{id}", &[Delete], "auth/sessions/{id}", Session, Passthrough),
    // --- Users ---
    route("/users", &[Get], "users", Session, Passthrough),
    route("/users/{id}", &[Get, Patch, Delete], "users/{id}", Session, Passthrough),
    // --- Invitations ---
    route("/invitations", &[Get, Post], "invitations", Session, Passthrough),
    route("/invitations/accept", &[Post], "invitations/accept", Public, ForwardSetCookie),
    route("/invitations/{id}", &[Get, Delete], "invitations/{id}", Session, Passthrough),
    route("/invitations/{id}/resend", &[Post], "invitations/{id}/resend", Session, Passthrough),
    // --- Roles & permissions ---
    route("/roles", &[Get, Post], "roles", Session, Passthrough),
    route("/roles/{id}", &[Get, Put, Delete], "roles/{id}", Session, Passthrough),
    route("/roles/{id}/permissions", &[Get, Put], "roles/{id}/permissions", Session, Passthrough),
    route("/permissions", &[Get], "permissions", Session, Passthrough),
    // --- Organization ---
    route("/organization", &[Get, Patch], "organization", Session, Passthrough),
    route("/dashboard/stats", &[Get], "dashboard/stats", Session, Passthrough),
    // --- Marketing site ---
    route("/contact", &[Post], "contact", Public, Passthrough),
];

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    for proxy_route in ROUTES {
        cfg.service(
            web::resource(proxy_route.path)
                .app_data(web::Data::new(*proxy_route))
                .route(web::route().to(proxy_handler)),
        );
    }
}
