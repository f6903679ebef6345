// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific persistence code.
//!
//! Rideline runs on `SQLite` by default (development, tests) and on
//! MySQL/MariaDB by explicit opt-in. Almost everything in this crate is
//! backend-agnostic Diesel DSL; what cannot be is quarantined here:
//!
//! - connection initialization and migration execution
//! - PRAGMA / system-variable configuration
//! - the last-inserted-ID workaround, which differs per backend
//!
//! Domain queries and mutations stay out of this module and work on both
//! backends. The single deliberate exception to that rule is the native
//! spherical-distance ride ordering, which only `MySQL` can provide (see
//! `queries::rides`).

pub mod mysql;
pub mod sqlite;

use diesel::{Connection, MysqlConnection, SqliteConnection};

use crate::error::PersistenceError;

/// Per-backend operations that have no backend-agnostic Diesel DSL.
///
/// Implemented for both connection types so the `backend_fn!`-generated
/// query and mutation bodies can call these uniformly; everything else about
/// those bodies is identical across backends.
pub trait PersistenceBackend: Connection {
    /// Returns the row ID assigned by the most recent insert on this
    /// connection. Diesel's `RETURNING` support is uneven across backends,
    /// so inserts read the ID back explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that the backend enforces foreign keys. Run once at
    /// startup; the rides schema depends on referential integrity.
    ///
    /// # Errors
    ///
    /// Returns an error if enforcement is off or cannot be determined.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }
}

impl PersistenceBackend for MysqlConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        mysql::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        mysql::verify_foreign_key_enforcement(self)
    }
}
