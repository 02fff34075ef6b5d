//! Backend-specific SQL syntax.
//!
//! A [`Dialect`] supplies the SQL text for field transforms (encryption,
//! hashing, password hashing), the current timestamp, named parameters, NVL
//! and the trailing syntax of statements. Every method has a default, so the
//! default dialect is a plain `impl Dialect for DefaultDialect {}`.

mod ansi;
mod postgres;

pub use ansi::AnsiDialect;
pub use postgres::PostgresDialect;

use crate::error::SqlResult;
use crate::stmt::{Clauses, Insert, Select, Update};
use std::fmt::Debug;
use std::sync::{Arc, LazyLock, RwLock};

/// Backend syntax hooks.
pub trait Dialect: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "default"
    }

    /// Expression storing `value` encrypted.
    fn encrypt_field(&self, value: &str) -> String {
        value.to_string()
    }

    /// Expression reading an encrypted `value` back as plaintext.
    fn decrypt_field(&self, value: &str) -> String {
        value.to_string()
    }

    /// One-way digest of `value`.
    fn hash_field(&self, value: &str) -> String {
        value.to_string()
    }

    /// Salted password hash of `value`.
    fn hash_pw_field(&self, value: &str) -> String {
        value.to_string()
    }

    /// Hash of a candidate password using the salt of the `stored` hash; the
    /// result is compared against `stored`.
    fn hash_pw_field_val(&self, value: &str, _stored: &str) -> String {
        value.to_string()
    }

    /// Current timestamp.
    fn now(&self) -> String {
        "CURRENT_TIMESTAMP".to_string()
    }

    /// Placeholder text for a named parameter.
    fn named_parameter(&self, name: &str) -> String {
        name.to_string()
    }

    /// NVL / COALESCE of two rendered expressions.
    fn null_value(&self, value: &str, fallback: &str) -> String {
        format!("coalesce({value}, {fallback})")
    }

    /// Post-process the clauses of a rendered SELECT.
    fn finish_select(&self, clauses: &mut Clauses, select: &Select) -> SqlResult<()> {
        if let Some(limit) = select.row_limit() {
            clauses.push("limit", format!("limit {limit}"));
        }
        Ok(())
    }

    /// Post-process the clauses of a rendered INSERT.
    fn finish_insert(&self, _clauses: &mut Clauses, _insert: &Insert) -> SqlResult<()> {
        Ok(())
    }

    /// Post-process the clauses of a rendered UPDATE.
    fn finish_update(&self, _clauses: &mut Clauses, _update: &Update) -> SqlResult<()> {
        Ok(())
    }
}

/// All hooks at their defaults: identity transforms, `CURRENT_TIMESTAMP`,
/// bare parameter names and `limit N`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDialect;

impl Dialect for DefaultDialect {}

static DEFAULT_DIALECT: LazyLock<RwLock<Arc<dyn Dialect>>> =
    LazyLock::new(|| RwLock::new(Arc::new(DefaultDialect)));

/// Process-wide dialect used by the `*_default` convenience renderers.
pub fn default_dialect() -> Arc<dyn Dialect> {
    let guard = DEFAULT_DIALECT.read().unwrap_or_else(|e| e.into_inner());
    Arc::clone(&guard)
}

/// Replace the process-wide dialect. Intended for application setup.
pub fn set_default_dialect(dialect: Arc<dyn Dialect>) {
    tracing::debug!(dialect = dialect.name(), "default dialect replaced");
    let mut guard = DEFAULT_DIALECT.write().unwrap_or_else(|e| e.into_inner());
    *guard = dialect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transforms_are_identity() {
        let d = DefaultDialect;
        assert_eq!(d.encrypt_field("'x'"), "'x'");
        assert_eq!(d.decrypt_field("t.c"), "t.c");
        assert_eq!(d.hash_field("'x'"), "'x'");
        assert_eq!(d.hash_pw_field("'x'"), "'x'");
        assert_eq!(d.hash_pw_field_val("'x'", "t.c"), "'x'");
        assert_eq!(d.now(), "CURRENT_TIMESTAMP");
        assert_eq!(d.named_parameter("id"), "id");
        assert_eq!(d.null_value("a", "b"), "coalesce(a, b)");
    }

    #[test]
    fn postgres_templates() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.encrypt_field("'secret'"),
            "encode(pgp_sym_encrypt('secret', $[encryptionKey]), 'hex')"
        );
        assert_eq!(
            d.decrypt_field("t.c"),
            "case when t.c is not null then pgp_sym_decrypt(decode(t.c, 'hex'), $[encryptionKey]) else null end"
        );
        assert_eq!(d.hash_field("'x'"), "encode(digest('x', 'sha256'), 'hex')");
        assert_eq!(d.hash_pw_field("'x'"), "crypt('x', gen_salt('bf'))");
        assert_eq!(d.hash_pw_field_val("'x'", "t.pw"), "crypt('x', t.pw)");
        assert_eq!(d.now(), "now()");
        assert_eq!(d.named_parameter("id"), "$[id]");
    }

    #[test]
    fn postgres_overrides() {
        let d = PostgresDialect::new()
            .encryption_key_param("key")
            .digest("sha512")
            .salt("md5");
        assert!(d.encrypt_field("v").contains("$[key]"));
        assert_eq!(d.hash_field("v"), "encode(digest(v, 'sha512'), 'hex')");
        assert_eq!(d.hash_pw_field("v"), "crypt(v, gen_salt('md5'))");
    }

    #[test]
    fn ansi_placeholders() {
        let d = AnsiDialect;
        assert_eq!(d.named_parameter("id"), ":id");
        assert_eq!(d.now(), "CURRENT_TIMESTAMP");
        assert_eq!(d.name(), "ansi");
    }
}
