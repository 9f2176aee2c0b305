// handlers/protected/mod.rs - Handlers acting on behalf of the caller
//
// Every handler takes the `RequestIdentity` inserted by the JWT middleware and
// passes it to the services, which answer 401 when it is anonymous.

pub mod items;
pub mod lists;
pub mod shares;
pub mod users;

pub use items::{item_delete, item_post, items_get};
pub use lists::{list_delete, list_get, list_post, list_put, lists_get};
pub use shares::{share_post, unshare_post};
pub use users::user_get;
