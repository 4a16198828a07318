/// Database access layer.
///
/// Plain query functions over a `PgPool`, one module per entity.
pub mod post_repo;
pub mod user_repo;
