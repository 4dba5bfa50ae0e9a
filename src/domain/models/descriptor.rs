//! Connection descriptors.
//!
//! A descriptor identifies how to reach a database. Two engines are
//! supported: an embedded SQLite file and a networked MySQL server.
//!
//! Parsing accepts both the SQLAlchemy-style URIs sent by the web front-end
//! (`sqlite:///mydata.db`, `mysql+pymysql://user:pw@host:3306/db`) and plain
//! `sqlite://` / `mysql://` forms.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::MysqlConfig;
use crate::domain::errors::DomainError;

const DEFAULT_MYSQL_PORT: u16 = 3306;
const MEMORY_PATH: &str = ":memory:";

/// Database engine a descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Embedded SQLite.
    Sqlite,
    /// MySQL or MariaDB.
    MySql,
}

impl Dialect {
    /// Lowercase engine name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a specific database. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    /// A SQLite file, or `:memory:`.
    Sqlite {
        /// File path.
        path: PathBuf,
    },
    /// A MySQL server.
    MySql {
        /// Server host.
        host: String,
        /// Server port.
        port: u16,
        /// Login user.
        user: String,
        /// Login password.
        password: String,
        /// Database (schema) name.
        database: String,
    },
}

impl ConnectionDescriptor {
    /// Descriptor for an embedded SQLite file.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite { path: path.into() }
    }

    /// Descriptor for a MySQL server.
    pub fn mysql(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self::MySql {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Descriptor for the MySQL server described by configuration.
    pub fn from_mysql_config(config: &MysqlConfig) -> Self {
        Self::mysql(
            config.host.clone(),
            config.port,
            config.user.clone(),
            config.password.clone(),
            config.database.clone(),
        )
    }

    /// Engine the descriptor points at.
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite { .. } => Dialect::Sqlite,
            Self::MySql { .. } => Dialect::MySql,
        }
    }

    /// Path of a SQLite descriptor, `None` for server databases.
    pub fn sqlite_path(&self) -> Option<&Path> {
        match self {
            Self::Sqlite { path } => Some(path.as_path()),
            Self::MySql { .. } => None,
        }
    }

    /// Whether this is an in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.sqlite_path()
            .is_some_and(|p| p.as_os_str() == MEMORY_PATH)
    }

    /// Render the descriptor with the password masked, for logs.
    pub fn redacted(&self) -> String {
        match self {
            Self::Sqlite { .. } => self.to_string(),
            Self::MySql {
                host,
                port,
                user,
                password,
                database,
            } => {
                let mask = if password.is_empty() { "" } else { ":***" };
                format!(
                    "mysql://{}{}@{}:{}/{}",
                    urlencoding::encode(user),
                    mask,
                    host,
                    port,
                    database
                )
            }
        }
    }

    fn parse_sqlite(rest: &str) -> Self {
        // SQLAlchemy puts three slashes before a relative path and four before
        // an absolute one; a bare `sqlite://name.db` is taken as relative.
        let path = rest
            .strip_prefix("///")
            .or_else(|| rest.strip_prefix("//"))
            .unwrap_or(rest);
        let path = path.split('?').next().unwrap_or_default();

        if path.is_empty() {
            Self::sqlite(MEMORY_PATH)
        } else {
            Self::sqlite(path)
        }
    }

    fn parse_mysql(input: &str, rest: &str) -> Result<Self, DomainError> {
        let url = url::Url::parse(&format!("mysql://{rest}"))
            .map_err(|e| DomainError::Connection(format!("Invalid database URI '{input}': {e}")))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DomainError::Connection(format!("Database URI '{input}' has no host")))?;

        let database = url.path().trim_start_matches('/');
        if database.is_empty() {
            return Err(DomainError::Connection(format!(
                "Database URI '{input}' has no database name"
            )));
        }

        Ok(Self::mysql(
            host,
            url.port().unwrap_or(DEFAULT_MYSQL_PORT),
            decode_component(input, url.username())?,
            decode_component(input, url.password().unwrap_or_default())?,
            decode_component(input, database)?,
        ))
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(DomainError::Connection("Database URI is empty".to_string()));
        }

        let (scheme, rest) = input
            .split_once(':')
            .ok_or_else(|| DomainError::Connection(format!("Invalid database URI '{input}'")))?;

        // Driver suffixes such as `+pymysql` only matter to other runtimes.
        let engine = scheme.split('+').next().unwrap_or(scheme).to_lowercase();

        match engine.as_str() {
            "sqlite" => Ok(Self::parse_sqlite(rest)),
            "mysql" | "mariadb" => {
                let rest = rest.strip_prefix("//").ok_or_else(|| {
                    DomainError::Connection(format!("Invalid database URI '{input}'"))
                })?;
                Self::parse_mysql(input, rest)
            }
            other => Err(DomainError::Connection(format!(
                "Unsupported database engine '{other}' in URI '{input}'"
            ))),
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite { path } => write!(f, "sqlite:///{}", path.display()),
            Self::MySql {
                host,
                port,
                user,
                password,
                database,
            } => write!(
                f,
                "mysql://{}:{}@{}:{}/{}",
                urlencoding::encode(user),
                urlencoding::encode(password),
                host,
                port,
                database
            ),
        }
    }
}

/// Percent-decode one URI component, rejecting sequences that are not UTF-8.
fn decode_component(input: &str, value: &str) -> Result<String, DomainError> {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .map_err(|e| DomainError::Connection(format!("Invalid database URI '{input}': {e}")))
}
