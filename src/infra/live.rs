//! Table change notification backing live query subscriptions.

use rusqlite::hooks::Action;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableChange {
    pub table: String,
    pub op: ChangeOp,
    pub rowid: i64,
}

/// Fan-out point for row changes. Cloning shares the subscriber list, so
/// the hook closure and the pool can hold the same hub.
#[derive(Debug, Clone, Default)]
pub struct ChangeHub {
    subscribers: Arc<Mutex<Vec<Sender<TableChange>>>>,
}

impl ChangeHub {
    pub fn subscribe(&self) -> Receiver<TableChange> {
        let (tx, rx) = channel();
        self.subscribers.lock().expect("subscriber lock").push(tx);
        rx
    }

    fn publish(&self, change: TableChange) {
        let mut subs = self.subscribers.lock().expect("subscriber lock");
        // Dropped receivers fall out of the list here.
        subs.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Route the connection's update hook into `hub`. The hook only reports row
/// changes; DDL from schema provisioning never reaches subscribers.
pub fn install(conn: &Connection, hub: ChangeHub) {
    conn.update_hook(Some(
        move |action: Action, _db: &str, table: &str, rowid: i64| {
            let op = match action {
                Action::SQLITE_INSERT => ChangeOp::Insert,
                Action::SQLITE_UPDATE => ChangeOp::Update,
                Action::SQLITE_DELETE => ChangeOp::Delete,
                _ => return,
            };
            hub.publish(TableChange {
                table: table.to_string(),
                op,
                rowid,
            });
        },
    ));
}
