pub mod movie;
pub mod user;

pub use movie::{Movie, MovieInput, MovieRow, ReleaseStatus};
pub use user::{NewUser, Role, User, UserRow};
