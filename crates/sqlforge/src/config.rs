//! TOML configuration: dialect selection and table declarations.
//!
//! ```toml
//! [dialect]
//! kind = "postgres"
//! encryption_key_param = "appKey"
//!
//! [[tables]]
//! name = "user"
//! table = "app_user"
//!
//! [[tables.fields]]
//! name = "email"
//! column = "user_email"
//! encrypted = true
//! ```

use crate::dialect::{AnsiDialect, DefaultDialect, Dialect, PostgresDialect};
use crate::error::{SqlError, SqlResult};
use crate::schema::{FieldDescriptor, Registry, TableDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialect: DialectConfig,
    pub tables: Vec<TableDef>,
}

impl Config {
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> SqlResult<String> {
        toml::to_string(self).map_err(|e| SqlError::Config(e.to_string()))
    }

    /// The configured dialect.
    pub fn dialect(&self) -> Arc<dyn Dialect> {
        self.dialect.build()
    }

    /// A registry holding every configured table.
    pub fn registry(&self) -> SqlResult<Registry> {
        let mut registry = Registry::new();
        for table in &self.tables {
            registry.declare(table.build()?);
        }
        Ok(registry)
    }
}

/// Dialect selection, tagged by `kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialectConfig {
    #[default]
    Default,
    Postgres {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        encryption_key_param: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        digest: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        salt: Option<String>,
    },
    Ansi,
}

impl DialectConfig {
    pub fn build(&self) -> Arc<dyn Dialect> {
        match self {
            DialectConfig::Default => Arc::new(DefaultDialect),
            DialectConfig::Postgres {
                encryption_key_param,
                digest,
                salt,
            } => {
                let mut dialect = PostgresDialect::new();
                if let Some(key) = encryption_key_param {
                    dialect = dialect.encryption_key_param(key);
                }
                if let Some(digest) = digest {
                    dialect = dialect.digest(digest);
                }
                if let Some(salt) = salt {
                    dialect = dialect.salt(salt);
                }
                Arc::new(dialect)
            }
            DialectConfig::Ansi => Arc::new(AnsiDialect),
        }
    }
}

/// Serializable table declaration. Calculated fields are code-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Logical name.
    pub name: String,
    /// Physical name; defaults to the logical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TableDef {
    pub fn build(&self) -> SqlResult<Arc<TableDescriptor>> {
        let physical = self.table.as_deref().unwrap_or(&self.name);
        self.fields
            .iter()
            .fold(TableDescriptor::builder(&self.name, physical), |b, f| {
                b.field(f.build())
            })
            .build()
    }

    pub fn from_descriptor(table: &TableDescriptor) -> Self {
        Self {
            name: table.name().to_string(),
            table: (table.table() != table.name()).then(|| table.table().to_string()),
            fields: table.fields().iter().map(FieldDef::from_descriptor).collect(),
        }
    }
}

/// Serializable column declaration.
///
/// `cc`, `created_at` and `updated_at` override the flags inferred from the
/// column suffix when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Physical column; defaults to the logical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hashed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub password_hashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bool>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDef {
    pub fn build(&self) -> FieldDescriptor {
        let column = self.column.as_deref().unwrap_or(&self.name);
        let mut field = FieldDescriptor::new(&self.name, column);
        field.encrypted = self.encrypted;
        field.hashed = self.hashed;
        field.password_hashed = self.password_hashed;
        if let Some(cc) = self.cc {
            field.cc = cc;
        }
        if let Some(on) = self.created_at {
            field.insert_timestamp = on;
        }
        if let Some(on) = self.updated_at {
            field.update_timestamp = on;
        }
        field
    }

    /// Serializable form, listing only flags that differ from inference.
    pub fn from_descriptor(field: &FieldDescriptor) -> Self {
        let inferred = FieldDescriptor::new(&field.name, &field.column);
        let differs = |a: bool, b: bool| (a != b).then_some(a);
        Self {
            name: field.name.clone(),
            column: (field.column != field.name).then(|| field.column.clone()),
            encrypted: field.encrypted,
            hashed: field.hashed,
            password_hashed: field.password_hashed,
            cc: differs(field.cc, inferred.cc),
            created_at: differs(field.insert_timestamp, inferred.insert_timestamp),
            updated_at: differs(field.update_timestamp, inferred.update_timestamp),
        }
    }
}
