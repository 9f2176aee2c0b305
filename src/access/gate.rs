//! Access Gate: one place that decides who may read or write a list.
//!
//! [`decide`] is the pure policy; [`AccessGate::resolve`] loads the list and the
//! relations an operation asked for, then applies it.

use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{TodoList, TodoListShare};
use crate::database::store::{StoreError, TodoStore};
use crate::services::error::{ServiceError, ServiceResult};

/// What an operation needs loaded and which relationship it requires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessNeed {
    pub load_items: bool,
    pub load_shares: bool,
    pub require_owner: bool,
    pub require_edit: bool,
}

impl AccessNeed {
    /// Read access, nothing loaded
    pub const fn read() -> Self {
        Self {
            load_items: false,
            load_shares: false,
            require_owner: false,
            require_edit: false,
        }
    }

    pub const fn items(mut self) -> Self {
        self.load_items = true;
        self
    }

    pub const fn shares(mut self) -> Self {
        self.load_shares = true;
        self
    }

    pub const fn owner(mut self) -> Self {
        self.require_owner = true;
        self
    }

    pub const fn edit(mut self) -> Self {
        self.require_edit = true;
        self
    }
}

/// Relationship that granted access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Owner,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    OwnerRequired,
    EditRequired,
    NoRelationship,
}

impl AccessDenied {
    pub fn message(&self) -> &'static str {
        match self {
            AccessDenied::OwnerRequired => "You are not the owner of this list",
            AccessDenied::EditRequired => "You are not the owner or lack edit permission to this list",
            AccessDenied::NoRelationship => "You are not the owner or lack view/edit permission to this list",
        }
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(denied: AccessDenied) -> Self {
        ServiceError::forbidden(denied.message())
    }
}

/// The permission policy. Order matters: owner first, then owner-only
/// operations, then the edit requirement, then any share at all.
pub fn decide(
    owner_id: Uuid,
    shares: &[TodoListShare],
    actor: Uuid,
    need: AccessNeed,
) -> Result<AccessLevel, AccessDenied> {
    if actor == owner_id {
        return Ok(AccessLevel::Owner);
    }
    if need.require_owner {
        return Err(AccessDenied::OwnerRequired);
    }

    let grant = shares
        .iter()
        .find(|share| share.shared_with_user_id == actor)
        .map(|share| share.permission);

    let can_edit = grant.map(|p| p.can_edit()).unwrap_or(false);
    if need.require_edit && !can_edit {
        return Err(AccessDenied::EditRequired);
    }

    match grant {
        Some(_) if can_edit => Ok(AccessLevel::Editor),
        Some(_) => Ok(AccessLevel::Viewer),
        None => Err(AccessDenied::NoRelationship),
    }
}

pub struct AccessGate {
    store: Arc<dyn TodoStore>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Fetch the list, load the requested relations and apply [`decide`].
    ///
    /// Non-owners are checked against their own share even when shares were
    /// not requested; in that case only that single share is looked up and
    /// the returned list carries no shares.
    pub async fn resolve(&self, list_id: Uuid, actor: Uuid, need: AccessNeed) -> ServiceResult<(TodoList, AccessLevel)> {
        let failed = |err: StoreError| ServiceError::from_store(err, "resolve_access", Some(list_id), Some(actor));

        let mut list = self
            .store
            .find_list(list_id)
            .await
            .map_err(failed)?
            .ok_or_else(|| ServiceError::not_found("The todo list cannot be found"))?;

        if need.load_items {
            list.items = self.store.list_items(list_id).await.map_err(failed)?;
        }
        if need.load_shares {
            list.shares = self.store.list_shares(list_id).await.map_err(failed)?;
        }

        let decision = if need.load_shares || list.is_owner(actor) {
            decide(list.owner_id, &list.shares, actor, need)
        } else {
            let own: Vec<TodoListShare> = self
                .store
                .find_share(list_id, actor)
                .await
                .map_err(failed)?
                .into_iter()
                .collect();
            decide(list.owner_id, &own, actor, need)
        };

        match decision {
            Ok(level) => {
                tracing::debug!(%list_id, user_id = %actor, ?level, ?need, "Access granted");
                Ok((list, level))
            }
            Err(denied) => {
                tracing::warn!(%list_id, user_id = %actor, ?denied, "Access denied");
                Err(denied.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::PermissionType;

    #[derive(Debug, Clone, Copy)]
    enum Role {
        Owner,
        SharedEditor,
        SharedViewer,
        Stranger,
    }

    struct Fixture {
        owner: Uuid,
        editor: Uuid,
        viewer: Uuid,
        stranger: Uuid,
        shares: Vec<TodoListShare>,
    }

    impl Fixture {
        fn new() -> Self {
            let list_id = Uuid::new_v4();
            let editor = Uuid::new_v4();
            let viewer = Uuid::new_v4();
            Self {
                owner: Uuid::new_v4(),
                editor,
                viewer,
                stranger: Uuid::new_v4(),
                shares: vec![
                    TodoListShare::new(list_id, editor, PermissionType::Edit),
                    TodoListShare::new(list_id, viewer, PermissionType::View),
                ],
            }
        }

        fn user(&self, role: Role) -> Uuid {
            match role {
                Role::Owner => self.owner,
                Role::SharedEditor => self.editor,
                Role::SharedViewer => self.viewer,
                Role::Stranger => self.stranger,
            }
        }
    }

    #[test]
    fn decision_table() {
        use AccessDenied::*;
        use AccessLevel::*;

        let f = Fixture::new();
        // (role, require_owner, require_edit, expected)
        let table: Vec<(Role, bool, bool, Result<AccessLevel, AccessDenied>)> = vec![
            (Role::Owner, false, false, Ok(Owner)),
            (Role::Owner, false, true, Ok(Owner)),
            (Role::Owner, true, false, Ok(Owner)),
            (Role::Owner, true, true, Ok(Owner)),
            (Role::SharedEditor, false, false, Ok(Editor)),
            (Role::SharedEditor, false, true, Ok(Editor)),
            (Role::SharedEditor, true, false, Err(OwnerRequired)),
            (Role::SharedEditor, true, true, Err(OwnerRequired)),
            (Role::SharedViewer, false, false, Ok(Viewer)),
            (Role::SharedViewer, false, true, Err(EditRequired)),
            (Role::SharedViewer, true, false, Err(OwnerRequired)),
            (Role::SharedViewer, true, true, Err(OwnerRequired)),
            (Role::Stranger, false, false, Err(NoRelationship)),
            (Role::Stranger, false, true, Err(EditRequired)),
            (Role::Stranger, true, false, Err(OwnerRequired)),
            (Role::Stranger, true, true, Err(OwnerRequired)),
        ];

        for (role, require_owner, require_edit, expected) in table {
            let need = AccessNeed {
                require_owner,
                require_edit,
                ..AccessNeed::read()
            };
            let got = decide(f.owner, &f.shares, f.user(role), need);
            assert_eq!(got, expected, "role={:?} owner={} edit={}", role, require_owner, require_edit);
        }
    }

    #[test]
    fn load_flags_do_not_change_the_decision() {
        let f = Fixture::new();
        for need in [AccessNeed::read().items(), AccessNeed::read().shares(), AccessNeed::read().items().shares()] {
            assert_eq!(decide(f.owner, &[], f.owner, need), Ok(AccessLevel::Owner));
            assert_eq!(decide(f.owner, &f.shares, f.stranger, need), Err(AccessDenied::NoRelationship));
        }
    }

    #[tokio::test]
    async fn resolve_missing_list_is_not_found() {
        let gate = AccessGate::new(Arc::new(MemoryStore::new()));
        let err = gate.resolve(Uuid::new_v4(), Uuid::new_v4(), AccessNeed::read()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_checks_own_share_without_loading_all_shares() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let list = TodoList::new(owner, Some("trip".to_string()));
        store.insert_list(&list).await.unwrap();
        store
            .insert_share(&TodoListShare::new(list.id, viewer, PermissionType::View))
            .await
            .unwrap();
        let gate = AccessGate::new(store);

        let (loaded, level) = gate.resolve(list.id, viewer, AccessNeed::read().items()).await.unwrap();
        assert_eq!(level, AccessLevel::Viewer);
        assert!(loaded.shares.is_empty());

        let err = gate.resolve(list.id, viewer, AccessNeed::read().edit()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn resolve_store_failure_is_unknown() {
        let store = Arc::new(MemoryStore::new());
        let list = TodoList::new(Uuid::new_v4(), None);
        store.insert_list(&list).await.unwrap();
        store.inject_failure("list_items");
        let gate = AccessGate::new(store);

        let err = gate.resolve(list.id, list.owner_id, AccessNeed::read().items()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unknown(_)));
    }
}
