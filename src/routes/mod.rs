use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{auth, bookings, destinations, health, roles, users};
use crate::middleware::auth::{auth_middleware, require_roles, ADMINS, READERS, WRITERS};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes (no token required)
    let public_routes = Router::new().route("/auth/login", post(auth::login));

    // Each method carries its own required-role set
    let protected_routes = Router::new()
        .route(
            "/destinations",
            post(destinations::create_destination)
                .route_layer(middleware::from_fn_with_state(WRITERS, require_roles))
                .merge(
                    get(destinations::list_destinations)
                        .route_layer(middleware::from_fn_with_state(READERS, require_roles)),
                ),
        )
        .route(
            "/destinations/{id}",
            get(destinations::get_destination)
                .route_layer(middleware::from_fn_with_state(READERS, require_roles))
                .merge(
                    patch(destinations::update_destination)
                        .route_layer(middleware::from_fn_with_state(WRITERS, require_roles)),
                )
                .merge(
                    delete(destinations::delete_destination)
                        .route_layer(middleware::from_fn_with_state(ADMINS, require_roles)),
                ),
        )
        .route(
            "/bookings",
            post(bookings::create_booking)
                .route_layer(middleware::from_fn_with_state(WRITERS, require_roles))
                .merge(
                    get(bookings::list_bookings)
                        .route_layer(middleware::from_fn_with_state(READERS, require_roles)),
                ),
        )
        .route(
            "/bookings/{id}",
            get(bookings::get_booking)
                .route_layer(middleware::from_fn_with_state(READERS, require_roles))
                .merge(
                    patch(bookings::update_booking)
                        .route_layer(middleware::from_fn_with_state(WRITERS, require_roles)),
                )
                .merge(
                    delete(bookings::cancel_booking)
                        .route_layer(middleware::from_fn_with_state(ADMINS, require_roles)),
                ),
        )
        .route(
            "/roles",
            post(roles::create_role)
                .route_layer(middleware::from_fn_with_state(ADMINS, require_roles))
                .merge(
                    get(roles::list_roles)
                        .route_layer(middleware::from_fn_with_state(READERS, require_roles)),
                ),
        )
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .route_layer(middleware::from_fn_with_state(READERS, require_roles))
                .merge(
                    patch(roles::update_role)
                        .delete(roles::delete_role)
                        .route_layer(middleware::from_fn_with_state(ADMINS, require_roles)),
                ),
        )
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Routes restricted to ADMIN for every method
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/roles", patch(users::update_user_roles))
        .route_layer(middleware::from_fn_with_state(ADMINS, require_roles))
}
