pub mod auth_service;
pub mod movie_service;

pub use auth_service::{AuthService, LoginSession, RegisteredUser};
pub use movie_service::MovieService;
