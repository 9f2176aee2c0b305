// handlers/public/mod.rs - Public handlers (no identity required)

pub mod health;
pub mod users;

pub use health::health;
pub use users::user_register;
