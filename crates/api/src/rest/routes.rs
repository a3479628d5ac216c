//! Route-Definitionen fuer die REST-API (/api/...)

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::rest::{handlers, middleware as mw, AppState};

/// Erstellt den vollstaendigen /api/-Router
///
/// Oeffentliche, angemeldete und Admin-Routen sind getrennte Router, damit
/// das Auth-Gate nur dort laeuft, wo es gebraucht wird.
pub fn api_router(state: &AppState) -> Router<AppState> {
    let oeffentlich = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/products", get(handlers::produkte::list_products))
        .route("/api/products/:id", get(handlers::produkte::get_product));

    let angemeldet = Router::new()
        // Auth
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/logout-all", post(handlers::auth::logout_all))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        // Profil
        .route(
            "/api/users/profile",
            get(handlers::benutzer::get_profile)
                .put(handlers::benutzer::update_profile)
                .delete(handlers::benutzer::delete_profile),
        )
        // Produkte
        .route("/api/products", post(handlers::produkte::create_product))
        .route(
            "/api/products/:id",
            put(handlers::produkte::update_product).delete(handlers::produkte::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::authentifizieren,
        ));

    // Zuletzt hinzugefuegter Layer laeuft zuerst: Auth vor Admin-Pruefung
    let admin = Router::new()
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route(
            "/api/admin/users/:id",
            get(handlers::admin::get_user)
                .put(handlers::admin::update_user)
                .delete(handlers::admin::delete_user),
        )
        .route("/api/admin/products", post(handlers::produkte::create_product))
        .route(
            "/api/admin/products/:id",
            put(handlers::produkte::update_product).delete(handlers::produkte::delete_product),
        )
        .route_layer(middleware::from_fn(mw::admin_erforderlich))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::authentifizieren,
        ));

    oeffentlich.merge(angemeldet).merge(admin)
}
