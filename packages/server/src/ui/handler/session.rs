//! Registry cleanup bound to the lifetime of an identified connection.

use std::sync::Arc;

use crate::{domain::Client, usecase::DisconnectClientUseCase};

/// Removes the client from the registries exactly once when the session ends.
///
/// The normal exit path calls [`SessionGuard::release`]. If the session task
/// ends any other way (panic, abort) the cleanup is spawned from `Drop`.
pub struct SessionGuard {
    client: Arc<Client>,
    usecase: Arc<DisconnectClientUseCase>,
    armed: bool,
}

impl SessionGuard {
    pub fn new(client: Arc<Client>, usecase: Arc<DisconnectClientUseCase>) -> Self {
        Self {
            client,
            usecase,
            armed: true,
        }
    }

    /// Run the cleanup now and disarm the guard.
    pub async fn release(mut self) {
        self.armed = false;
        self.usecase.execute(&self.client).await;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let client = self.client.clone();
        let usecase = self.usecase.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    "Session of '{}' ended abnormally, cleaning up",
                    client.username
                );
                handle.spawn(async move {
                    usecase.execute(&client).await;
                });
            }
            Err(_) => {
                tracing::error!(
                    "No runtime available to clean up session of '{}'",
                    client.username
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientRepository, PeerIdFactory, Timestamp, Username},
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryClientRepository, InMemoryRoomRepository},
        },
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn setup() -> (
        Arc<InMemoryClientRepository>,
        Arc<DisconnectClientUseCase>,
        Arc<Client>,
    ) {
        let clients = Arc::new(InMemoryClientRepository::new());
        let usecase = Arc::new(DisconnectClientUseCase::new(
            Arc::new(InMemoryRoomRepository::new()),
            clients.clone(),
            Arc::new(WebSocketMessagePusher::new()),
        ));
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = Arc::new(Client::new(
            PeerIdFactory::generate(),
            Username::new("alice".to_string()).unwrap(),
            "127.0.0.1:50000".parse().unwrap(),
            Timestamp::new(1000),
            tx,
        ));
        clients.register(client.clone()).await.unwrap();
        (clients, usecase, client)
    }

    #[tokio::test]
    async fn test_release_cleans_up() {
        // テスト項目: release で登録簿から削除される
        // given (前提条件):
        let (clients, usecase, client) = setup().await;
        let guard = SessionGuard::new(client, usecase);

        // when (操作):
        guard.release().await;

        // then (期待する結果):
        assert_eq!(clients.count().await, 0);
    }

    #[tokio::test]
    async fn test_drop_without_release_cleans_up() {
        // テスト項目: release されずに破棄された場合もクリーンアップが実行される
        // given (前提条件):
        let (clients, usecase, client) = setup().await;
        let guard = SessionGuard::new(client, usecase);

        // when (操作):
        drop(guard);

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), async {
            while clients.count().await > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("cleanup should run after drop");
    }

    #[tokio::test]
    async fn test_cleanup_runs_when_task_panics() {
        // テスト項目: セッションのタスクが panic してもクリーンアップが実行される
        // given (前提条件):
        let (clients, usecase, client) = setup().await;

        // when (操作):
        let task = tokio::spawn(async move {
            let _guard = SessionGuard::new(client, usecase);
            panic!("session failed");
        });
        assert!(task.await.is_err());

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), async {
            while clients.count().await > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("cleanup should run after panic");
    }
}
