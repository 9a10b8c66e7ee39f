//! SNMPv3 user credentials.
//!
//! One [`UserStore`] instance is created at startup and passed by reference
//! to whatever needs credentials. It is backed by a flat text table with one
//! user per line:
//!
//! ```text
//! name authProto authPass privProto privPass
//! ```
//!
//! Protocols are numeric codes ([`AuthProtocol::code`], [`PrivProtocol::code`],
//! 0 for none) and `-` stands for an empty secret. Columns are padded to a
//! fixed width on save and split on whitespace on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{EncodeErrorKind, Error, Result};
use crate::message::SecurityLevel;
use crate::v3::{AuthProtocol, PrivProtocol};

const EMPTY_SECRET: &str = "-";
const NAME_WIDTH: usize = 32;
const SECRET_WIDTH: usize = 40;

/// Credentials of one user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub auth: Option<AuthProtocol>,
    pub auth_password: String,
    pub privacy: Option<PrivProtocol>,
    pub priv_password: String,
}

impl UserEntry {
    /// A user without authentication or privacy.
    pub fn no_auth() -> Self {
        Self::default()
    }

    pub fn with_auth(protocol: AuthProtocol, password: impl Into<String>) -> Self {
        Self {
            auth: Some(protocol),
            auth_password: password.into(),
            ..Self::default()
        }
    }

    pub fn with_privacy(mut self, protocol: PrivProtocol, password: impl Into<String>) -> Self {
        self.privacy = Some(protocol);
        self.priv_password = password.into();
        self
    }

    /// Lowest level a message for this user may carry.
    pub fn security_level(&self) -> SecurityLevel {
        match (self.auth, self.privacy) {
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            (None, _) => SecurityLevel::NoAuthNoPriv,
        }
    }

    /// Privacy needs an authentication protocol to localize its key.
    pub fn validate(&self) -> Result<()> {
        if self.privacy.is_some() && self.auth.is_none() {
            return Err(Error::encode(EncodeErrorKind::PrivWithoutAuth));
        }
        Ok(())
    }
}

impl std::fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEntry")
            .field("auth", &self.auth)
            .field("privacy", &self.privacy)
            .finish_non_exhaustive()
    }
}

/// Mapping from user name to credentials.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: BTreeMap<String, UserEntry>,
    path: Option<PathBuf>,
}

impl UserStore {
    /// An empty store with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table at `path`, remembering it for [`save`](Self::save).
    ///
    /// A missing file yields an empty store. Malformed lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::io(e)),
        };

        let mut users = BTreeMap::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((name, entry)) => {
                    users.insert(name, entry);
                }
                None => {
                    tracing::warn!(target: "netman_snmp::user_store", { line = number + 1, path = %path.display() }, "skipping malformed user record");
                }
            }
        }

        tracing::debug!(target: "netman_snmp::user_store", { users = users.len(), path = %path.display() }, "user store loaded");
        Ok(Self {
            users,
            path: Some(path.to_path_buf()),
        })
    }

    /// Rewrite the whole backing table from memory.
    ///
    /// A store that was not loaded from a file has nowhere to save to.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::config("user_store", "store has no backing file"))?;
        self.save_to(path)
    }

    /// Write the table to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = String::new();
        for (name, entry) in &self.users {
            out.push_str(&format_line(name, entry));
            out.push('\n');
        }
        std::fs::write(path, out).map_err(Error::io)
    }

    /// Add a user. Fails if the name is taken.
    pub fn add_user(&mut self, name: impl Into<String>, entry: UserEntry) -> Result<()> {
        let name = name.into();
        if self.users.contains_key(&name) {
            return Err(Error::UserExists { name: name.into() });
        }
        entry.validate()?;
        let storable = is_token(&name)
            && [&entry.auth_password, &entry.priv_password]
                .iter()
                .all(|s| s.is_empty() || is_token(s));
        if !storable {
            return Err(Error::config(
                "user_store",
                "names and secrets must be non-empty and free of whitespace",
            ));
        }
        self.users.insert(name, entry);
        Ok(())
    }

    /// Look a user up. Fails if absent.
    pub fn get_user(&self, name: &str) -> Result<&UserEntry> {
        self.users
            .get(name)
            .ok_or_else(|| Error::UserNotFound { name: name.into() })
    }

    /// Remove a user. Absent names are ignored.
    pub fn remove_user(&mut self, name: &str) {
        self.users.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    /// Users in name order.
    pub fn users(&self) -> impl Iterator<Item = (&str, &UserEntry)> {
        self.users.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s != EMPTY_SECRET && !s.chars().any(char::is_whitespace)
}

fn secret_field(secret: &str) -> &str {
    if secret.is_empty() { EMPTY_SECRET } else { secret }
}

fn format_line(name: &str, entry: &UserEntry) -> String {
    format!(
        "{:<nw$} {} {:<sw$} {} {:<sw$}",
        name,
        entry.auth.map_or(0, AuthProtocol::code),
        secret_field(&entry.auth_password),
        entry.privacy.map_or(0, PrivProtocol::code),
        secret_field(&entry.priv_password),
        nw = NAME_WIDTH,
        sw = SECRET_WIDTH,
    )
    .trim_end()
    .to_string()
}

fn parse_line(line: &str) -> Option<(String, UserEntry)> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?;
    let auth = AuthProtocol::from_code(fields.next()?.parse().ok()?)?;
    let auth_password = fields.next()?;
    let privacy = PrivProtocol::from_code(fields.next()?.parse().ok()?)?;
    let priv_password = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let secret = |s: &str| if s == EMPTY_SECRET { String::new() } else { s.to_string() };
    let entry = UserEntry {
        auth,
        auth_password: secret(auth_password),
        privacy,
        priv_password: secret(priv_password),
    };
    entry.validate().ok()?;
    Some((name.to_string(), entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_get_remove() {
        let mut store = UserStore::new();
        store
            .add_user("admin", UserEntry::with_auth(AuthProtocol::Md5, "maplesyrup"))
            .unwrap();
        assert_eq!(store.get_user("admin").unwrap().auth, Some(AuthProtocol::Md5));

        assert!(matches!(
            store.add_user("admin", UserEntry::no_auth()),
            Err(Error::UserExists { .. })
        ));
        assert!(matches!(store.get_user("nobody"), Err(Error::UserNotFound { .. })));

        store.remove_user("nobody");
        store.remove_user("admin");
        assert!(store.is_empty());
    }

    #[test]
    fn test_configured_security_level() {
        assert_eq!(UserEntry::no_auth().security_level(), SecurityLevel::NoAuthNoPriv);
        let auth = UserEntry::with_auth(AuthProtocol::Sha256, "maplesyrup");
        assert_eq!(auth.security_level(), SecurityLevel::AuthNoPriv);
        assert_eq!(
            auth.with_privacy(PrivProtocol::Aes128, "privpass123").security_level(),
            SecurityLevel::AuthPriv
        );
    }

    #[test]
    fn test_privacy_requires_auth() {
        let mut store = UserStore::new();
        let entry = UserEntry::no_auth().with_privacy(PrivProtocol::Des, "secret12");
        assert!(store.add_user("bad", entry).is_err());
    }

    #[test]
    fn test_whitespace_rejected() {
        let mut store = UserStore::new();
        assert!(
            store
                .add_user("two words", UserEntry::no_auth())
                .is_err()
        );
        assert!(
            store
                .add_user("ok", UserEntry::with_auth(AuthProtocol::Md5, "pass word"))
                .is_err()
        );
    }

    #[test]
    fn test_line_format_is_fixed_width() {
        let line = format_line(
            "admin",
            &UserEntry::with_auth(AuthProtocol::Sha1, "authpass").with_privacy(PrivProtocol::Aes128, "privpass"),
        );
        assert_eq!(&line[..NAME_WIDTH], format!("{:<32}", "admin"));
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields, ["admin", "2", "authpass", "2", "privpass"]);
    }

    #[test]
    fn test_parse_line() {
        let (name, entry) = parse_line("guest 0 - 0 -").unwrap();
        assert_eq!(name, "guest");
        assert_eq!(entry, UserEntry::no_auth());

        assert!(parse_line("short 1 pass").is_none());
        assert!(parse_line("bad 9 pass 0 -").is_none());
        assert!(parse_line("bad x pass 0 -").is_none());
        assert!(parse_line("privonly 0 - 1 secret").is_none());
        assert!(parse_line("extra 0 - 0 - more").is_none());
    }
}
