// handlers/protected/movies/mod.rs - Movie record handlers

pub mod create; // POST /movies
pub mod delete; // DELETE /movies/:id
pub mod show; // GET /movies/:id

pub use create::movie_create;
pub use delete::movie_delete;
pub use show::movie_show;
