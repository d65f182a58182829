pub mod apply;
pub mod destroy;
pub mod health;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod validate;
