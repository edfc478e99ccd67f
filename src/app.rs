use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::database::models::Role;
use crate::handlers;
use crate::middleware::{
    authenticate, authorize, classify_failures, panic_to_failure, parse_body, rate_limit, AllowedRoles,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/mba/api/v1";

/// Roles allowed to change movie records
const STAFF: AllowedRoles = AllowedRoles(&[Role::Admin, Role::Manager]);

/// Full application router
pub fn router(state: AppState) -> Router {
    with_stages(routes(&state), state)
}

/// Every route, without the global request stages. A known path hit with
/// an unrouted method is reported like any other unmatched route, so each
/// method router carries the not-found fallback.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::route_not_found))
        .route("/health", get(handlers::health).fallback(handlers::route_not_found))
        .nest(API_PREFIX, api_routes(state))
        .fallback(handlers::route_not_found)
}

/// Wrap routes in the global request stages, outermost first: tracing,
/// CORS, failure classification, panic capture, rate limiting, body
/// parsing. Authentication and authorization are per-route.
pub fn with_stages(routes: Router<AppState>, state: AppState) -> Router {
    let stages = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), classify_failures))
        .layer(CatchPanicLayer::custom(panic_to_failure))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(from_fn_with_state(state.clone(), parse_body));

    let router = routes.layer(stages);

    let router = if state.config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new().merge(auth_public_routes()).merge(movie_routes(state))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route(
            "/auth/register",
            post(auth::register_post).fallback(handlers::route_not_found),
        )
        .route(
            "/auth/login",
            post(auth::login_post).fallback(handlers::route_not_found),
        )
}

fn movie_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::movies;

    let authenticated = || from_fn_with_state(state.clone(), authenticate);
    let staff_only = || from_fn_with_state(STAFF, authorize);

    Router::new()
        .route(
            "/movies",
            post(movies::movie_create)
                .route_layer(staff_only())
                .route_layer(authenticated())
                .fallback(handlers::route_not_found),
        )
        .route(
            "/movies/:id",
            get(movies::movie_show)
                .route_layer(authenticated())
                .merge(
                    delete(movies::movie_delete)
                        .route_layer(staff_only())
                        .route_layer(authenticated()),
                )
                .fallback(handlers::route_not_found),
        )
}
