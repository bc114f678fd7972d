//! Live chat relay
//!
//! A single task owns the registry of open sockets. Handles talk to it
//! over one channel, so registration, removal and delivery never race.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::Message;
use crate::observability::{CHAT_CONNECTIONS_ACTIVE, CHAT_MESSAGES_TOTAL};

enum HubCommand {
    Register {
        user_id: Uuid,
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<String>,
    },
    Unregister {
        user_id: Uuid,
        connection_id: Uuid,
    },
    Deliver {
        recipient_id: Uuid,
        payload: String,
        response: oneshot::Sender<bool>,
    },
    Online {
        user_id: Uuid,
        response: oneshot::Sender<bool>,
    },
    Count {
        response: oneshot::Sender<usize>,
    },
}

type Registry = HashMap<Uuid, HashMap<Uuid, mpsc::UnboundedSender<String>>>;

fn connection_count(registry: &Registry) -> usize {
    registry.values().map(HashMap::len).sum()
}

async fn hub_loop(mut rx: mpsc::UnboundedReceiver<HubCommand>) {
    let mut registry: Registry = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            HubCommand::Register {
                user_id,
                connection_id,
                sender,
            } => {
                registry
                    .entry(user_id)
                    .or_default()
                    .insert(connection_id, sender);
                debug!(user_id = %user_id, connection_id = %connection_id, "Chat connection registered");
            }
            HubCommand::Unregister {
                user_id,
                connection_id,
            } => {
                if let Some(conns) = registry.get_mut(&user_id) {
                    conns.remove(&connection_id);
                    if conns.is_empty() {
                        registry.remove(&user_id);
                    }
                }
                debug!(user_id = %user_id, connection_id = %connection_id, "Chat connection closed");
            }
            HubCommand::Deliver {
                recipient_id,
                payload,
                response,
            } => {
                let mut delivered = false;
                if let Some(conns) = registry.get_mut(&recipient_id) {
                    // Sockets whose writer is gone are pruned here
                    conns.retain(|_, tx| tx.send(payload.clone()).is_ok());
                    delivered = !conns.is_empty();
                    if conns.is_empty() {
                        registry.remove(&recipient_id);
                    }
                }
                let _ = response.send(delivered);
            }
            HubCommand::Online { user_id, response } => {
                let _ = response.send(registry.contains_key(&user_id));
            }
            HubCommand::Count { response } => {
                let _ = response.send(connection_count(&registry));
            }
        }
        metrics::gauge!(CHAT_CONNECTIONS_ACTIVE).set(connection_count(&registry) as f64);
    }
    debug!("Chat hub stopped");
}

/// One registered socket. Outbound frames arrive on `receiver`.
pub struct ConnectionHandle {
    pub user_id: Uuid,
    pub connection_id: Uuid,
    pub receiver: mpsc::UnboundedReceiver<String>,
}

/// Cloneable handle to the relay task.
#[derive(Clone)]
pub struct ChatHub {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl ChatHub {
    /// Spawn the relay task. It stops once every handle is dropped.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(hub_loop(rx));
        Self { tx }
    }

    fn send(&self, cmd: HubCommand) {
        if self.tx.send(cmd).is_err() {
            warn!("Chat hub is not running");
        }
    }

    pub fn register(&self, user_id: Uuid) -> ConnectionHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();
        self.send(HubCommand::Register {
            user_id,
            connection_id,
            sender,
        });
        ConnectionHandle {
            user_id,
            connection_id,
            receiver,
        }
    }

    pub fn unregister(&self, user_id: Uuid, connection_id: Uuid) {
        self.send(HubCommand::Unregister {
            user_id,
            connection_id,
        });
    }

    /// Forward a stored message to the recipient's live sockets.
    /// Returns `false` when the recipient is offline; the message then
    /// stays available through the history endpoint only.
    pub async fn deliver(&self, message: &Message) -> bool {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                warn!(message_id = %message.id, error = %e, "Could not encode chat message");
                return false;
            }
        };
        let (response, rx) = oneshot::channel();
        self.send(HubCommand::Deliver {
            recipient_id: message.recipient_id,
            payload,
            response,
        });
        let delivered = rx.await.unwrap_or(false);
        metrics::counter!(CHAT_MESSAGES_TOTAL, "delivered" => delivered.to_string()).increment(1);
        delivered
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        let (response, rx) = oneshot::channel();
        self.send(HubCommand::Online { user_id, response });
        rx.await.unwrap_or(false)
    }

    pub async fn connection_count(&self) -> usize {
        let (response, rx) = oneshot::channel();
        self.send(HubCommand::Count { response });
        rx.await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_to(recipient_id: Uuid) -> Message {
        Message::new(Uuid::new_v4(), Uuid::new_v4(), recipient_id, "halo").unwrap()
    }

    #[tokio::test]
    async fn delivers_to_every_socket_of_recipient() {
        let hub = ChatHub::spawn();
        let user = Uuid::new_v4();
        let mut phone = hub.register(user);
        let mut laptop = hub.register(user);
        assert_eq!(hub.connection_count().await, 2);

        let msg = message_to(user);
        assert!(hub.deliver(&msg).await);

        for conn in [&mut phone, &mut laptop] {
            let frame = conn.receiver.recv().await.unwrap();
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value["content"], "halo");
            assert_eq!(value["recipient_id"], msg.recipient_id.to_string());
        }
    }

    #[tokio::test]
    async fn offline_recipient_is_dropped() {
        let hub = ChatHub::spawn();
        assert!(!hub.deliver(&message_to(Uuid::new_v4())).await);
    }

    #[tokio::test]
    async fn unregister_and_closed_sockets() {
        let hub = ChatHub::spawn();
        let user = Uuid::new_v4();
        let conn = hub.register(user);
        assert!(hub.is_online(user).await);

        hub.unregister(user, conn.connection_id);
        assert!(!hub.is_online(user).await);
        assert_eq!(hub.connection_count().await, 0);

        // A socket whose receiver vanished without unregistering
        let gone = hub.register(user);
        drop(gone);
        assert!(!hub.deliver(&message_to(user)).await);
        assert!(!hub.is_online(user).await);
    }
}
