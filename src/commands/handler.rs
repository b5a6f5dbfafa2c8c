//! Command Executor
//!
//! This module interprets parsed commands against the storage engine and
//! produces the response to write back. It is a pure dispatch over the
//! verb with no other side effects:
//!
//! | Verb    | Action           | Success        | Failure                  |
//! |---------|------------------|----------------|--------------------------|
//! | SET     | `storage.put`    | `OK`           | `ERROR`                  |
//! | GET     | `storage.get`    | `OK` + value   | `NOTFOUND` / `ERROR`     |
//! | DEL     | `storage.delete` | `OK`           | `ERROR` (invalid key)    |
//! | UNKNOWN | none             | -              | `ERROR`                  |
//!
//! Key validation happens inside the storage layer; the executor only
//! translates storage outcomes into wire responses.

use crate::protocol::{Command, Response, Verb};
use crate::storage::{Storage, StorageError};
use std::sync::Arc;
use tracing::warn;

/// Executes commands against a storage engine.
///
/// Cheap to clone; clones share the same storage.
pub struct CommandHandler<S: Storage> {
    /// The storage engine
    storage: Arc<S>,
}

impl<S: Storage> Clone for CommandHandler<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> CommandHandler<S> {
    /// Creates a new command handler over the given storage engine.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Executes a command and returns the response to send.
    ///
    /// Never fails: every storage outcome, including faults, maps to a
    /// response the connection handler can write.
    pub fn execute(&self, command: Command) -> Response {
        match command.verb {
            Verb::Set => self.set(&command.key, &command.value),
            Verb::Get => self.get(&command.key),
            Verb::Del => self.delete(&command.key),
            Verb::Unknown => Response::error(),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Response {
        match self.storage.put(key, value) {
            Ok(()) => Response::ok(),
            Err(e) => {
                warn!(key, error = %e, "SET failed");
                Response::error()
            }
        }
    }

    fn get(&self, key: &str) -> Response {
        match self.storage.get(key) {
            Ok(Some(value)) => Response::ok_with(value),
            Ok(None) => Response::not_found(),
            Err(e) => {
                warn!(key, error = %e, "GET failed");
                Response::error()
            }
        }
    }

    fn delete(&self, key: &str) -> Response {
        match self.storage.delete(key) {
            Ok(()) => Response::ok(),
            Err(e @ StorageError::InvalidKey(_)) => {
                warn!(key, error = %e, "DEL rejected");
                Response::error()
            }
            // FsStorage::delete only fails on invalid keys; other
            // engines may surface I/O faults here.
            Err(e) => {
                warn!(key, error = %e, "DEL failed");
                Response::error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_request;
    use crate::storage::FsStorage;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn test_handler() -> (TempDir, CommandHandler<FsStorage>) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FsStorage::open(dir.path()).unwrap());
        (dir, CommandHandler::new(storage))
    }

    fn run(handler: &CommandHandler<FsStorage>, line: &[u8]) -> Response {
        handler.execute(parse_request(line).unwrap())
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, handler) = test_handler();

        assert_eq!(run(&handler, b"SET name Ariz"), Response::ok());
        assert_eq!(
            run(&handler, b"GET name"),
            Response::ok_with(Bytes::from("Ariz"))
        );
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, handler) = test_handler();
        assert_eq!(run(&handler, b"GET nothing"), Response::not_found());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (_dir, handler) = test_handler();

        run(&handler, b"SET k v1");
        run(&handler, b"SET k v2");
        assert_eq!(run(&handler, b"GET k"), Response::ok_with(Bytes::from("v2")));
    }

    #[test]
    fn test_set_with_empty_value() {
        let (_dir, handler) = test_handler();

        assert_eq!(run(&handler, b"SET empty"), Response::ok());
        assert_eq!(
            run(&handler, b"GET empty"),
            Response::ok_with(Bytes::new())
        );
    }

    #[test]
    fn test_delete_always_ok() {
        let (_dir, handler) = test_handler();

        run(&handler, b"SET name Ariz");
        assert_eq!(run(&handler, b"DEL name"), Response::ok());
        // Second delete of the same key is still success
        assert_eq!(run(&handler, b"DEL name"), Response::ok());
        assert_eq!(run(&handler, b"GET name"), Response::not_found());
    }

    #[test]
    fn test_unknown_verb_is_error() {
        let (_dir, handler) = test_handler();
        assert_eq!(run(&handler, b"PUT name Ariz"), Response::error());
        assert_eq!(run(&handler, b"get name"), Response::error());
    }

    #[test]
    fn test_invalid_key_is_error() {
        let (_dir, handler) = test_handler();

        assert_eq!(run(&handler, b"SET ../escape v"), Response::error());
        assert_eq!(run(&handler, b"GET ../escape"), Response::error());
        assert_eq!(run(&handler, b"DEL ../escape"), Response::error());
    }

    #[test]
    fn test_clones_share_storage() {
        let (_dir, handler) = test_handler();
        let other = handler.clone();

        run(&handler, b"SET shared yes");
        assert_eq!(
            run(&other, b"GET shared"),
            Response::ok_with(Bytes::from("yes"))
        );
    }
}
