//! InMemory Client Repository 実装
//!
//! ドメイン層が定義する ClientRepository trait の具体的な実装。
//! PeerId と Username の 2 つの HashMap を 1 つの Mutex で保護し、
//! 両者が常に同じ Client の集合を指すことを保証します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Client, ClientRepository, PeerId, RepositoryError, Username};

#[derive(Default)]
struct ClientTable {
    by_id: HashMap<PeerId, Arc<Client>>,
    by_username: HashMap<Username, Arc<Client>>,
}

/// インメモリ Client Repository 実装
#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: Mutex<ClientTable>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn register(&self, client: Arc<Client>) -> Result<(), RepositoryError> {
        let mut clients = self.clients.lock().await;

        if clients.by_username.contains_key(&client.username) {
            return Err(RepositoryError::NameTaken(
                client.username.as_str().to_string(),
            ));
        }

        clients
            .by_username
            .insert(client.username.clone(), client.clone());
        clients.by_id.insert(client.id.clone(), client);
        Ok(())
    }

    async fn find_by_id(&self, peer_id: &PeerId) -> Result<Arc<Client>, RepositoryError> {
        let clients = self.clients.lock().await;
        clients
            .by_id
            .get(peer_id)
            .cloned()
            .ok_or_else(|| RepositoryError::ClientNotFound(peer_id.as_str().to_string()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Arc<Client>, RepositoryError> {
        let clients = self.clients.lock().await;
        clients
            .by_username
            .get(username)
            .cloned()
            .ok_or_else(|| RepositoryError::ClientNotFound(username.as_str().to_string()))
    }

    async fn find_many(&self, peer_ids: &[PeerId]) -> Vec<Arc<Client>> {
        let clients = self.clients.lock().await;
        peer_ids
            .iter()
            .filter_map(|peer_id| {
                let found = clients.by_id.get(peer_id).cloned();
                if found.is_none() {
                    tracing::debug!("Client '{}' not registered, skipping", peer_id);
                }
                found
            })
            .collect()
    }

    async fn remove(&self, peer_id: &PeerId, username: &Username) {
        let mut clients = self.clients.lock().await;

        clients.by_id.remove(peer_id);
        // 同じ名前で再登録した別のクライアントの対応は消さない
        if clients
            .by_username
            .get(username)
            .is_some_and(|client| &client.id == peer_id)
        {
            clients.by_username.remove(username);
        }
    }

    async fn count(&self) -> usize {
        self.clients.lock().await.by_id.len()
    }
}
