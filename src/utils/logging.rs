//! Structured Logging with Sensitive Data Redaction
//!
//! Log lines are built as a [`LogEntry`] and handed to `tracing`, so the
//! subscriber installed by the binary decides format and filtering. Fields
//! are redacted on the way in based on their key:
//! - seed phrases, passwords, private keys and vault crypto material are
//!   replaced by a length marker
//! - public keys and addresses keep a short prefix and suffix
//! - signatures keep a longer prefix and suffix

use std::fmt;

/// Target used for every vault log line
pub const LOG_TARGET: &str = "meh_vault";

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let redacted = redact_if_sensitive(key, &value.to_string());
        self.fields.push((key, redacted));
        self
    }

    /// Add a field with explicit redaction
    pub fn redacted_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, redact_value(&value.to_string())));
        self
    }

    /// Add an address or public key field (partial redaction)
    pub fn address_field(mut self, key: &'static str, address: &str) -> Self {
        self.fields.push((key, redact_address(address)));
        self
    }

    /// `key=value` pairs joined by spaces
    pub fn render_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Emit the entry through `tracing`
    pub fn log(self) {
        let fields = self.render_fields();
        let module = self.module;
        let message = self.message.as_str();

        match self.level {
            LogLevel::Debug => {
                tracing::debug!(target: LOG_TARGET, module, fields = %fields, "{}", message)
            }
            LogLevel::Info => {
                tracing::info!(target: LOG_TARGET, module, fields = %fields, "{}", message)
            }
            LogLevel::Warn => {
                tracing::warn!(target: LOG_TARGET, module, fields = %fields, "{}", message)
            }
            LogLevel::Error => {
                tracing::error!(target: LOG_TARGET, module, fields = %fields, "{}", message)
            }
        }
    }
}

/// Redact a value if the key suggests it's sensitive
pub fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    let fully_redacted_keys = [
        "private", "secret", "seed", "mnemonic", "phrase", "password", "passphrase",
        "ciphertext", "salt", "keypair",
    ];
    if key_lower == "iv" || fully_redacted_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_value(value);
    }

    let address_keys = ["address", "public_key", "pubkey", "recipient"];
    if address_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_address(value);
    }

    if key_lower.contains("signature") {
        return redact_signature(value);
    }

    value.to_string()
}

/// Fully redact a sensitive value
pub fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.chars().count();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (first 6 and last 4 chars, 8 with `0x`)
pub fn redact_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 8 } else { 6 };
    keep_ends(trimmed, prefix_len, 4)
}

/// Signatures are long Base58 strings; keep enough to match an explorer entry
fn redact_signature(signature: &str) -> String {
    let trimmed = signature.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    keep_ends(trimmed, 10, 6)
}

fn keep_ends(value: &str, prefix_len: usize, suffix_len: usize) -> String {
    // Not ASCII means not an address; never slice through a char boundary
    if !value.is_ascii() || value.len() <= prefix_len + suffix_len + 3 {
        return redact_value(value);
    }

    format!(
        "{}...{}",
        &value[..prefix_len],
        &value[value.len() - suffix_len..]
    )
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vault_log {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)*) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg,
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// `log_debug!("vault", "message", key = value, ...)`
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__vault_log!(Debug, $module, $msg $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__vault_log!(Info, $module, $msg $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__vault_log!(Warn, $module, $msg $(, $key = $value)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__vault_log!(Error, $module, $msg $(, $key = $value)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL_ADDRESS: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("correcthorse"), "[REDACTED:12chars]");
    }

    #[test]
    fn test_redact_address() {
        let eth = redact_address("0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(eth, "0x9858Ef...da94");

        let sol = redact_address(SOL_ADDRESS);
        assert_eq!(sol, "HAgk14...Kpqk");

        assert!(redact_address("short").contains("REDACTED"));
    }

    #[test]
    fn test_seed_phrase_never_leaks() {
        let phrase = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon about";
        let redacted = redact_if_sensitive("seed_phrase", phrase);
        assert!(!redacted.contains("abandon"));
        assert!(redact_if_sensitive("password", "hunter22").contains("REDACTED"));
        assert!(redact_if_sensitive("salt", "AAAAAAAAAAAAAAAAAAAAAA==").contains("REDACTED"));
    }

    #[test]
    fn test_non_sensitive_passthrough() {
        assert_eq!(redact_if_sensitive("wallet_count", "3"), "3");
        assert_eq!(redact_if_sensitive("chain", "solana"), "solana");
        assert_eq!(redact_if_sensitive("derivation_path", "m/44'/501'/0'/0'"), "m/44'/501'/0'/0'");
    }

    #[test]
    fn test_non_ascii_does_not_panic() {
        let value = "ééééééééééééééééééééé";
        assert!(redact_address(value).contains("REDACTED"));
    }

    #[test]
    fn test_log_entry_fields() {
        let entry = LogEntry::new(LogLevel::Info, "vault", "Wallet added")
            .field("wallet_id", 2)
            .field("private_key", "deadbeefdeadbeef")
            .address_field("public_key", SOL_ADDRESS);

        let rendered = entry.render_fields();
        assert!(rendered.contains("wallet_id=2"));
        assert!(rendered.contains("private_key=[REDACTED:16chars]"));
        assert!(rendered.contains("public_key=HAgk14...Kpqk"));
        entry.log();
    }

    #[test]
    fn test_macros_expand() {
        crate::log_debug!("test", "plain");
        crate::log_info!("test", "with fields", wallet_count = 3, chain = "solana");
        crate::log_warn!("test", "trailing comma", password = "hunter22",);
        crate::log_error!("test", format!("error {}", 1));
    }
}
