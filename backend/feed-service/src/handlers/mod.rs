/// HTTP handlers, grouped by route scope.
pub mod auth;
pub mod feed;

pub use auth::{login, signup};
pub use feed::{create_post, delete_post, get_post, get_posts, update_post};
