// handlers/protected/mod.rs - Handlers behind bearer-token authentication

pub mod movies;
