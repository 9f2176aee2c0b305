pub mod error;
pub mod todo_service;
pub mod user_service;

pub use error::{ServiceError, ServiceResult};
pub use todo_service::{ListUpdate, MediaUpload, NewItem, NewList, ShareRequest, TodoService};
pub use user_service::UserService;
