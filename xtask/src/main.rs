// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Project automation for the Rideline workspace.
//!
//! Two jobs live here: the CI entry point (`cargo xtask ci` chains lints,
//! build, and tests) and the opt-in MariaDB infrastructure that the standard
//! test run never touches.
//!
//! `cargo test` stays fast and `SQLite`-only. Everything that needs a real
//! `MySQL`-family server is explicit:
//!
//! - `cargo xtask test-mariadb` provisions a throwaway `MariaDB` container,
//!   points the `#[ignore]`d backend validation tests at it, and tears the
//!   container down whether or not the tests pass.
//! - `cargo xtask verify-migrations` applies `migrations/` to an in-memory
//!   `SQLite` database and `migrations_mysql/` to a `MariaDB` container, then
//!   compares the resulting schemas structurally. The two directories must
//!   stay semantically identical; this command is what enforces it.
//!
//! Tests never start infrastructure themselves and never skip silently: when
//! a required service is missing the command fails loudly.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::process::Output;
use std::thread::sleep;
use std::time::Duration;

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::eyre::{Context, eyre};
use color_eyre::Result;
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run the full CI pipeline (lint, deny, machete, build, test)
    CI,

    /// Build all targets
    #[command(visible_alias = "b")]
    Build,

    /// Type-check all targets
    #[command(visible_alias = "c")]
    Check,

    /// Produce an lcov coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Run cargo-deny over the dependency tree
    #[command(visible_alias = "cd")]
    Deny,

    /// Flag unused dependencies with cargo-machete
    #[command(visible_alias = "m")]
    Machete,

    /// Run every lint (clippy, docs, formatting, typos)
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build docs with docs.rs flags, warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Apply formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Apply typo fixes
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run lib and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests only
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests only
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Run the ignored MariaDB backend validation tests in a container
    #[command(visible_alias = "tm")]
    TestMariadb,

    /// Check that the SQLite and MySQL migrations produce the same schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => cargo(&["build", "--all-targets", "--all-features"]),
            Self::Check => cargo(&["check", "--all-targets", "--all-features"]),
            Self::Coverage => cargo(&[
                "llvm-cov",
                "--lcov",
                "--output-path",
                "target/lcov.info",
                "--all-features",
            ]),
            Self::Deny => cargo(&["deny", "check"]),
            Self::Machete => {
                cmd!("cargo-machete").run_with_trace()?;
                Ok(())
            }
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => cargo_nightly(&["fmt", "--all", "--check"]),
            Self::LintTypos => {
                cmd!("typos").run_with_trace()?;
                Ok(())
            }
            Self::FixClippy => cargo(&[
                "clippy",
                "--all-targets",
                "--all-features",
                "--fix",
                "--allow-dirty",
                "--allow-staged",
                "--",
                "-D",
                "warnings",
            ]),
            Self::FixFormatting => cargo_nightly(&["fmt", "--all"]),
            Self::FixTypos => {
                cmd!("typos", "-w").run_with_trace()?;
                Ok(())
            }
            Self::Test => test(),
            Self::TestDocs => cargo(&["test", "--doc", "--all-features"]),
            Self::TestLibs => cargo(&["test", "--all-targets", "--all-features"]),
            Self::TestMariadb => test_mariadb(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    cargo(&["deny", "check"])?;
    cmd!("cargo-machete").run_with_trace()?;
    cargo(&["build", "--all-targets", "--all-features"])?;
    test()
}

fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    cargo_nightly(&["fmt", "--all", "--check"])?;
    cmd!("typos").run_with_trace()?;
    Ok(())
}

fn lint_clippy() -> Result<()> {
    cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Builds docs for every default workspace package the way docs.rs would.
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

fn test() -> Result<()> {
    cargo(&["test", "--all-targets", "--all-features"])?;
    // Doc tests go last; they are the slow part.
    cargo(&["test", "--doc", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain.
fn cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain.
fn cargo_nightly(args: &[&str]) -> Result<()> {
    // CARGO is set because xtask itself runs under cargo; it would pin the
    // child to the wrong toolchain.
    cmd("cargo", args)
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// A throwaway MariaDB container.
///
/// Construction starts the container and blocks until the server answers a
/// trivial query (or a timeout expires). Dropping it stops and removes the
/// container, so cleanup happens on every exit path, including panics inside
/// the borrowing code.
struct MariaDbContainer {
    name: &'static str,
    database: &'static str,
    user: &'static str,
    password: &'static str,
    port: u16,
}

impl MariaDbContainer {
    const READY_TIMEOUT_SECS: u32 = 30;

    fn start(
        name: &'static str,
        database: &'static str,
        user: &'static str,
        password: &'static str,
        port: u16,
    ) -> Result<Self> {
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        // A previous run may have left a container of the same name behind.
        let _ = cmd!("docker", "rm", "-f", name).run();

        tracing::info!(name, port, "Starting MariaDB container");
        cmd!(
            "docker",
            "run",
            "--name",
            name,
            "-e",
            format!("MARIADB_DATABASE={database}"),
            "-e",
            format!("MARIADB_USER={user}"),
            "-e",
            format!("MARIADB_PASSWORD={password}"),
            "-e",
            "MARIADB_ROOT_PASSWORD=root_password",
            "-p",
            format!("{port}:3306"),
            "-d",
            "mariadb:11"
        )
        .run_with_trace()
        .wrap_err("Failed to start MariaDB container")?;

        let container = Self {
            name,
            database,
            user,
            password,
            port,
        };
        container.wait_until_ready()?;
        Ok(container)
    }

    fn wait_until_ready(&self) -> Result<()> {
        tracing::info!("Waiting for MariaDB to accept connections");
        for attempt in 1..=Self::READY_TIMEOUT_SECS {
            sleep(Duration::from_secs(1));
            tracing::debug!(attempt, "Probing MariaDB");
            let probe = cmd!(
                "docker",
                "exec",
                self.name,
                "mariadb",
                "-u",
                self.user,
                format!("-p{}", self.password),
                "-e",
                "SELECT 1"
            )
            .run();
            if probe.is_ok() {
                tracing::info!("MariaDB is ready");
                return Ok(());
            }
        }
        Err(eyre!(
            "MariaDB did not become ready within {} seconds",
            Self::READY_TIMEOUT_SECS
        ))
    }

    fn url(&self) -> String {
        format!(
            "mysql://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.database
        )
    }
}

impl Drop for MariaDbContainer {
    fn drop(&mut self) {
        tracing::info!(name = self.name, "Removing MariaDB container");
        let _ = cmd!("docker", "rm", "-f", self.name).run();
    }
}

/// Run the `#[ignore]`d backend validation tests against a real MariaDB.
///
/// The tests live in `rideline-persistence` and refuse to run unless both
/// `DATABASE_URL` and `RIDELINE_TEST_BACKEND=mariadb` are set, which only
/// this command does. Port 3307 is used so a local MySQL on 3306 is not
/// disturbed. The container is removed whether or not the tests pass.
fn test_mariadb() -> Result<()> {
    tracing::info!("Starting MariaDB backend validation");

    let container = MariaDbContainer::start(
        "rideline-test-mariadb",
        "rideline_test",
        "rideline",
        "test_password",
        3307,
    )?;

    tracing::info!("Running MariaDB backend validation tests");
    cmd!(
        "cargo",
        "test",
        "--package",
        "rideline-persistence",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.url())
    .env("RIDELINE_TEST_BACKEND", "mariadb")
    .run_with_trace()
    .wrap_err("MariaDB backend validation tests failed")?;

    tracing::info!("MariaDB backend validation passed");
    Ok(())
}

/// Check that `migrations/` and `migrations_mysql/` agree.
///
/// Applies each directory to its own backend (in-memory `SQLite`, a MariaDB
/// container on port 3308), introspects both resulting schemas into a
/// normalized form, and reports every structural difference at once. Type
/// names are normalized to coarse classes (integer/real/text/blob) because
/// the backends will never agree on spellings.
fn verify_migrations() -> Result<()> {
    use diesel_migrations::MigrationHarness;

    const SQLITE_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        diesel_migrations::embed_migrations!("../crates/persistence/migrations");
    const MYSQL_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        diesel_migrations::embed_migrations!("../crates/persistence/migrations_mysql");

    tracing::info!("Verifying migration schema parity");

    let container = MariaDbContainer::start(
        "rideline-verify-migrations",
        "rideline_verify",
        "rideline",
        "verify_password",
        3308,
    )?;

    tracing::info!("Applying SQLite migrations");
    let mut sqlite_conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut sqlite_conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;
    sqlite_conn
        .run_pending_migrations(SQLITE_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {e}"))?;

    tracing::info!("Applying MySQL migrations");
    let url = container.url();
    let mut mysql_conn =
        MysqlConnection::establish(&url).wrap_err("Failed to connect to MariaDB")?;
    mysql_conn
        .run_pending_migrations(MYSQL_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply MySQL migrations: {e}"))?;

    tracing::info!("Introspecting schemas");
    let sqlite_schema = introspect_sqlite(&mut sqlite_conn)?;
    let mysql_schema = introspect_mysql(&mut mysql_conn, container.database)?;

    let differences = diff_schemas(&sqlite_schema, &mysql_schema);
    if differences.is_empty() {
        tracing::info!("Schema parity verified");
        Ok(())
    } else {
        Err(eyre!(
            "Schema parity check failed:\n{}",
            differences.join("\n")
        ))
    }
}

/// Backend-neutral schema snapshot. Everything is held in ordered
/// collections so two snapshots compare structurally.
#[derive(Debug, Default, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Table {
    // column name -> (normalized type, nullable)
    columns: BTreeMap<String, (String, bool)>,
    primary_key: BTreeSet<String>,
    // (from column, to table, to column)
    foreign_keys: BTreeSet<(String, String, String)>,
    // each set is the column list of one unique constraint
    unique_constraints: BTreeSet<Vec<String>>,
    // plain (non-unique) index column lists
    indexes: BTreeSet<Vec<String>>,
}

#[allow(clippy::too_many_lines)]
fn introspect_sqlite(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct NameRow {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnRow {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyRow {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexRow {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    let mut schema = Schema::default();

    let tables: Vec<NameRow> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' \
         AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' \
         ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnRow> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to read columns of {}", table.name))?;
        for col in columns {
            info.columns.insert(
                col.name.clone(),
                (normalize_sqlite_type(&col.r#type), col.notnull == 0),
            );
            if col.pk > 0 {
                info.primary_key.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyRow> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to read foreign keys of {}", table.name))?;
        for fk in fks {
            info.foreign_keys.insert((fk.from, fk.table, fk.to));
        }

        let indexes: Vec<IndexRow> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to read indexes of {}", table.name))?;
        for idx in indexes {
            let members: Vec<NameRow> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to read index members of {}", idx.name))?;
            let columns: Vec<String> = members.into_iter().map(|m| m.name).collect();

            // Origin 'u' marks unique constraints, including the
            // sqlite_autoindex_* entries generated for inline UNIQUE.
            if idx.origin == "u" {
                info.unique_constraints.insert(columns);
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                info.indexes.insert(columns);
            }
        }

        schema.tables.insert(table.name, info);
    }

    Ok(schema)
}

#[allow(clippy::too_many_lines)]
fn introspect_mysql(conn: &mut MysqlConnection, db_name: &str) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableRow {
        #[diesel(sql_type = Text)]
        table_name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnRow {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
        #[diesel(sql_type = Text)]
        column_key: String,
    }

    #[derive(QueryableByName)]
    #[allow(clippy::struct_field_names)]
    struct ForeignKeyRow {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        referenced_table_name: String,
        #[diesel(sql_type = Text)]
        referenced_column_name: String,
    }

    #[derive(QueryableByName)]
    struct IndexRow {
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Integer)]
        non_unique: i32,
    }

    let mut schema = Schema::default();

    let tables: Vec<TableRow> = diesel::sql_query(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = ? AND table_name != '__diesel_schema_migrations' \
         ORDER BY table_name",
    )
    .bind::<Text, _>(db_name)
    .load(conn)
    .wrap_err("Failed to list MySQL tables")?;

    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnRow> = diesel::sql_query(
            "SELECT column_name, data_type, is_nullable, column_key \
             FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to read columns of {}", table.table_name))?;
        for col in columns {
            info.columns.insert(
                col.column_name.clone(),
                (normalize_mysql_type(&col.data_type), col.is_nullable == "YES"),
            );
            if col.column_key == "PRI" {
                info.primary_key.insert(col.column_name);
            }
        }

        let fks: Vec<ForeignKeyRow> = diesel::sql_query(
            "SELECT column_name, referenced_table_name, referenced_column_name \
             FROM information_schema.key_column_usage \
             WHERE table_schema = ? AND table_name = ? \
               AND referenced_table_name IS NOT NULL \
             ORDER BY column_name",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to read foreign keys of {}",
            table.table_name
        ))?;
        for fk in fks {
            info.foreign_keys.insert((
                fk.column_name,
                fk.referenced_table_name,
                fk.referenced_column_name,
            ));
        }

        // Unique indexes model the unique constraints; the rest are plain
        // indexes. PRIMARY is tracked separately above.
        let indexes: Vec<IndexRow> = diesel::sql_query(
            "SELECT index_name, column_name, non_unique \
             FROM information_schema.statistics \
             WHERE table_schema = ? AND table_name = ? AND index_name != 'PRIMARY' \
             ORDER BY index_name, seq_in_index",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to read indexes of {}", table.table_name))?;

        let mut grouped: BTreeMap<String, (bool, Vec<String>)> = BTreeMap::new();
        for idx in indexes {
            let entry = grouped
                .entry(idx.index_name)
                .or_insert_with(|| (idx.non_unique != 0, Vec::new()));
            entry.1.push(idx.column_name);
        }
        for (_, (non_unique, columns)) in grouped {
            if non_unique {
                info.indexes.insert(columns);
            } else {
                info.unique_constraints.insert(columns);
            }
        }

        schema.tables.insert(table.table_name, info);
    }

    Ok(schema)
}

/// Collapse a `SQLite` type affinity into a coarse class.
fn normalize_sqlite_type(declared: &str) -> String {
    let upper = declared.to_uppercase();
    let class = if upper.contains("INT") {
        "integer"
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        "text"
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        "real"
    } else if upper.contains("BLOB") {
        "blob"
    } else {
        "text"
    };
    class.to_string()
}

/// Collapse a `MySQL` data type into the same coarse class.
fn normalize_mysql_type(data_type: &str) -> String {
    let class = match data_type.to_uppercase().as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => "integer",
        "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => "real",
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => "blob",
        _ => "text",
    };
    class.to_string()
}

/// Structural comparison of two schema snapshots.
///
/// Returns one line per difference; an empty result means parity. InnoDB
/// auto-creates a single-column index for every foreign key, so such an
/// index existing only on the `MySQL` side is tolerated.
#[allow(clippy::too_many_lines)]
fn diff_schemas(sqlite: &Schema, mysql: &Schema) -> Vec<String> {
    let mut diffs: Vec<String> = Vec::new();

    let sqlite_tables: BTreeSet<&String> = sqlite.tables.keys().collect();
    let mysql_tables: BTreeSet<&String> = mysql.tables.keys().collect();
    for missing in sqlite_tables.difference(&mysql_tables) {
        diffs.push(format!("table '{missing}' exists only in SQLite"));
    }
    for extra in mysql_tables.difference(&sqlite_tables) {
        diffs.push(format!("table '{extra}' exists only in MySQL"));
    }

    for name in sqlite_tables.intersection(&mysql_tables) {
        let s = &sqlite.tables[*name];
        let m = &mysql.tables[*name];

        let s_cols: BTreeSet<&String> = s.columns.keys().collect();
        let m_cols: BTreeSet<&String> = m.columns.keys().collect();
        for col in s_cols.difference(&m_cols) {
            diffs.push(format!("{name}.{col} exists only in SQLite"));
        }
        for col in m_cols.difference(&s_cols) {
            diffs.push(format!("{name}.{col} exists only in MySQL"));
        }

        for col in s_cols.intersection(&m_cols) {
            let (s_type, s_nullable) = &s.columns[*col];
            let (m_type, m_nullable) = &m.columns[*col];
            if s_type != m_type {
                diffs.push(format!(
                    "{name}.{col}: type {s_type} (SQLite) vs {m_type} (MySQL)"
                ));
            }
            if s_nullable != m_nullable {
                diffs.push(format!(
                    "{name}.{col}: nullable {s_nullable} (SQLite) vs {m_nullable} (MySQL)"
                ));
            }
        }

        if s.primary_key != m.primary_key {
            diffs.push(format!(
                "{name}: primary key {:?} (SQLite) vs {:?} (MySQL)",
                s.primary_key, m.primary_key
            ));
        }
        if s.foreign_keys != m.foreign_keys {
            diffs.push(format!(
                "{name}: foreign keys {:?} (SQLite) vs {:?} (MySQL)",
                s.foreign_keys, m.foreign_keys
            ));
        }
        if s.unique_constraints != m.unique_constraints {
            diffs.push(format!(
                "{name}: unique constraints {:?} (SQLite) vs {:?} (MySQL)",
                s.unique_constraints, m.unique_constraints
            ));
        }

        let fk_columns: BTreeSet<&String> = m.foreign_keys.iter().map(|(from, _, _)| from).collect();
        for idx in s.indexes.difference(&m.indexes) {
            diffs.push(format!("{name}: index on {idx:?} missing in MySQL"));
        }
        for idx in m.indexes.difference(&s.indexes) {
            let is_implicit_fk_index = idx.len() == 1 && fk_columns.contains(&idx[0]);
            if !is_implicit_fk_index {
                diffs.push(format!("{name}: unexpected index on {idx:?} in MySQL"));
            }
        }
    }

    diffs
}

/// Extension trait for `duct::Expression` that logs the command before
/// running it, and again on failure (the original line may have scrolled
/// away).
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
