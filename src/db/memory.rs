use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::models::User;
use crate::db::operations::UserRepository;
use crate::error::DatabaseError;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: HashMap<i64, User>,
}

/// In-process user store with the same uniqueness rules as the `users` table.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut table = self.table.write().await;

        if table.rows.values().any(|u| u.email == email) {
            return Err(DatabaseError::Duplicate);
        }

        table.next_id += 1;
        let user = User::new(table.next_id, email.to_string(), password_hash.to_string());
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<(), DatabaseError> {
        self.table.write().await.rows.remove(&user.id);
        Ok(())
    }
}
