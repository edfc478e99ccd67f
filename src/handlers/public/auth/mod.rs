// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition; neither requires a token.

pub mod login; // POST /auth/login
pub mod register; // POST /auth/register

pub use login::login_post;
pub use register::register_post;
