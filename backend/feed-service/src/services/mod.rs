pub mod posts;
pub mod storage;

pub use posts::{FeedPage, PostService, ITEMS_PER_PAGE};
