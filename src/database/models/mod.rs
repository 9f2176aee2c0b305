pub mod user;
pub mod todo_list;
pub mod todo_item;
pub mod share;

pub use user::User;
pub use todo_list::TodoList;
pub use todo_item::{MediaType, PriorityType, StatusType, TodoItem};
pub use share::{PermissionType, TodoListShare};
