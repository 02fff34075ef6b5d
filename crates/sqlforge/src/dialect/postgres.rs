use super::Dialect;

/// PostgreSQL with pgcrypto.
///
/// Encryption uses `pgp_sym_encrypt` with the key bound as a named parameter,
/// hex-encoded for storage in text columns.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    key_param: String,
    digest: String,
    salt: String,
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self {
            key_param: "encryptionKey".to_string(),
            digest: "sha256".to_string(),
            salt: "bf".to_string(),
        }
    }
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the parameter carrying the symmetric key.
    pub fn encryption_key_param(mut self, name: impl Into<String>) -> Self {
        self.key_param = name.into();
        self
    }

    /// `digest()` algorithm for hashed fields.
    pub fn digest(mut self, algorithm: impl Into<String>) -> Self {
        self.digest = algorithm.into();
        self
    }

    /// `gen_salt()` algorithm for password fields.
    pub fn salt(mut self, algorithm: impl Into<String>) -> Self {
        self.salt = algorithm.into();
        self
    }

    fn key(&self) -> String {
        self.named_parameter(&self.key_param)
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn encrypt_field(&self, value: &str) -> String {
        format!("encode(pgp_sym_encrypt({value}, {}), 'hex')", self.key())
    }

    fn decrypt_field(&self, value: &str) -> String {
        format!(
            "case when {value} is not null then pgp_sym_decrypt(decode({value}, 'hex'), {}) else null end",
            self.key()
        )
    }

    fn hash_field(&self, value: &str) -> String {
        format!("encode(digest({value}, '{}'), 'hex')", self.digest)
    }

    fn hash_pw_field(&self, value: &str) -> String {
        format!("crypt({value}, gen_salt('{}'))", self.salt)
    }

    fn hash_pw_field_val(&self, value: &str, stored: &str) -> String {
        format!("crypt({value}, {stored})")
    }

    fn now(&self) -> String {
        "now()".to_string()
    }

    fn named_parameter(&self, name: &str) -> String {
        format!("$[{name}]")
    }
}
