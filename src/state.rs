use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::{ClientRateLimiter, FailureClassifier};
use crate::services::{AuthService, MovieService};

/// Shared, read-only application state handed to every stage
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub movies: Arc<MovieService>,
    pub auth: Arc<AuthService>,
    pub classifier: FailureClassifier,
    pub limiter: Option<Arc<ClientRateLimiter>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.security));
        let movies = Arc::new(MovieService::new(store.clone()));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            tokens.clone(),
            config.security.bcrypt_cost,
        ));
        let limiter = ClientRateLimiter::from_config(&config.api).map(Arc::new);

        Self {
            classifier: FailureClassifier::new(config.environment),
            config: Arc::new(config),
            store,
            tokens,
            movies,
            auth,
            limiter,
        }
    }
}
