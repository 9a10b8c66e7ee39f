//! USM authentication (RFC 3414 section 6, RFC 7860).
//!
//! Passwords are expanded to a master key, localized to one engine ID and
//! used as the HMAC key over the whole message. The digest is truncated to
//! the protocol's MAC length and written into `msgAuthenticationParameters`,
//! which is zero-filled while the digest is computed.

use digest::core_api::BlockSizeUser;
use digest::{Digest, KeyInit, Mac};
use hmac::SimpleHmac;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::AuthProtocol;
use super::usm::UsmSecurityParams;
use crate::error::{AuthErrorKind, Error, Result};

/// Bytes of repeated password hashed into the master key.
const EXPANSION_SIZE: usize = 1_048_576;

/// A key localized to one authoritative engine.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LocalizedKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: AuthProtocol,
}

impl LocalizedKey {
    /// Derive from a password: expand, hash, then localize to `engine_id`.
    pub fn from_password(protocol: AuthProtocol, password: &[u8], engine_id: &[u8]) -> Self {
        let mut master = password_to_key(protocol, password);
        let key = localize_key(protocol, &master, engine_id);
        master.zeroize();
        Self { key, protocol }
    }

    /// Wrap an already localized key.
    pub fn from_bytes(protocol: AuthProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn mac_len(&self) -> usize {
        self.protocol.mac_len()
    }

    /// Truncated HMAC over `data`.
    pub fn compute_hmac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = match self.protocol {
            AuthProtocol::Md5 => hmac::<md5::Md5>(&self.key, data)?,
            AuthProtocol::Sha1 => hmac::<sha1::Sha1>(&self.key, data)?,
            AuthProtocol::Sha224 => hmac::<sha2::Sha224>(&self.key, data)?,
            AuthProtocol::Sha256 => hmac::<sha2::Sha256>(&self.key, data)?,
            AuthProtocol::Sha384 => hmac::<sha2::Sha384>(&self.key, data)?,
            AuthProtocol::Sha512 => hmac::<sha2::Sha512>(&self.key, data)?,
        };
        mac.truncate(self.mac_len());
        Ok(mac)
    }

    /// Constant-time check of `expected` against the HMAC of `data`.
    pub fn verify_hmac(&self, data: &[u8], expected: &[u8]) -> Result<bool> {
        let computed = self.compute_hmac(data)?;
        Ok(computed.len() == expected.len() && bool::from(computed.ct_eq(expected)))
    }
}

impl std::fmt::Debug for LocalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn hmac<D>(key: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + BlockSizeUser + Clone,
{
    let mut mac = <SimpleHmac<D> as KeyInit>::new_from_slice(key)
        .map_err(|_| Error::auth(None, AuthErrorKind::NoAuthKey))?;
    Mac::update(&mut mac, data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Password-to-key expansion (RFC 3414 A.2): hash 1 MiB of the repeated password.
pub fn password_to_key(protocol: AuthProtocol, password: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => expand::<md5::Md5>(password),
        AuthProtocol::Sha1 => expand::<sha1::Sha1>(password),
        AuthProtocol::Sha224 => expand::<sha2::Sha224>(password),
        AuthProtocol::Sha256 => expand::<sha2::Sha256>(password),
        AuthProtocol::Sha384 => expand::<sha2::Sha384>(password),
        AuthProtocol::Sha512 => expand::<sha2::Sha512>(password),
    }
}

fn expand<D: Digest>(password: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return vec![0u8; <D as Digest>::output_size()];
    }

    let mut hasher = D::new();
    let mut chunk = [0u8; 64];
    let mut index = 0;
    for _ in 0..EXPANSION_SIZE / chunk.len() {
        for byte in &mut chunk {
            *byte = password[index % password.len()];
            index += 1;
        }
        hasher.update(chunk);
    }
    chunk.zeroize();
    hasher.finalize().to_vec()
}

/// Key localization: `H(Ku || engineID || Ku)`.
pub fn localize_key(protocol: AuthProtocol, master: &[u8], engine_id: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => localize::<md5::Md5>(master, engine_id),
        AuthProtocol::Sha1 => localize::<sha1::Sha1>(master, engine_id),
        AuthProtocol::Sha224 => localize::<sha2::Sha224>(master, engine_id),
        AuthProtocol::Sha256 => localize::<sha2::Sha256>(master, engine_id),
        AuthProtocol::Sha384 => localize::<sha2::Sha384>(master, engine_id),
        AuthProtocol::Sha512 => localize::<sha2::Sha512>(master, engine_id),
    }
}

fn localize<D: Digest>(master: &[u8], engine_id: &[u8]) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(master);
    hasher.update(engine_id);
    hasher.update(master);
    hasher.finalize().to_vec()
}

/// Sign an encoded message in place.
///
/// The message must carry a zero-filled authentication field of the key's
/// MAC length.
pub fn sign_message(key: &LocalizedKey, message: &mut [u8]) -> Result<()> {
    let (offset, len) = UsmSecurityParams::find_auth_params_offset(message)
        .ok_or_else(|| Error::auth(None, AuthErrorKind::AuthParamsNotFound))?;
    if len != key.mac_len() {
        return Err(Error::auth(
            None,
            AuthErrorKind::WrongMacLength {
                expected: key.mac_len(),
                actual: len,
            },
        ));
    }

    let mac = key.compute_hmac(message)?;
    message[offset..offset + len].copy_from_slice(&mac);
    Ok(())
}

/// Verify the digest of a received message.
pub fn verify_message(key: &LocalizedKey, message: &[u8]) -> Result<()> {
    let (offset, len) = UsmSecurityParams::find_auth_params_offset(message)
        .ok_or_else(|| Error::auth(None, AuthErrorKind::AuthParamsNotFound))?;
    if len != key.mac_len() {
        return Err(Error::auth(
            None,
            AuthErrorKind::WrongMacLength {
                expected: key.mac_len(),
                actual: len,
            },
        ));
    }

    let received = &message[offset..offset + len];
    let mut zeroed = message.to_vec();
    zeroed[offset..offset + len].fill(0);

    if key.verify_hmac(&zeroed, received)? {
        Ok(())
    } else {
        Err(Error::auth(None, AuthErrorKind::HmacMismatch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, V3Message};
    use crate::pdu::{Pdu, PduType};
    use crate::util::{decode_hex, encode_hex};
    use bytes::Bytes;

    const ENGINE_ID: &str = "000000000000000000000002";

    #[test]
    fn test_md5_password_to_key_rfc3414() {
        let key = password_to_key(AuthProtocol::Md5, b"maplesyrup");
        assert_eq!(encode_hex(&key), "9faf3283884e92834ebc9847d8edd963");
    }

    #[test]
    fn test_md5_localization_rfc3414() {
        let engine_id = decode_hex(ENGINE_ID).unwrap();
        let key = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", &engine_id);
        assert_eq!(encode_hex(key.as_bytes()), "526f5eed9fcce26f8964c2930787d82b");
    }

    #[test]
    fn test_sha1_localization_rfc3414() {
        let master = password_to_key(AuthProtocol::Sha1, b"maplesyrup");
        assert_eq!(encode_hex(&master), "9fb5cc0381497b3793528939ff788d5d79145211");

        let engine_id = decode_hex(ENGINE_ID).unwrap();
        let key = LocalizedKey::from_password(AuthProtocol::Sha1, b"maplesyrup", &engine_id);
        assert_eq!(
            encode_hex(key.as_bytes()),
            "6695febc9288e36282235fc7151f128497b38f3f"
        );
    }

    #[test]
    fn test_empty_password_gives_zero_key() {
        let key = password_to_key(AuthProtocol::Md5, b"");
        assert_eq!(key, vec![0u8; 16]);
    }

    #[test]
    fn test_localization_is_deterministic() {
        let engine_id = decode_hex(ENGINE_ID).unwrap();
        let a = LocalizedKey::from_password(AuthProtocol::Md5, b"authpass123", &engine_id);
        let b = LocalizedKey::from_password(AuthProtocol::Md5, b"authpass123", &engine_id);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(
            a.compute_hmac(b"message body").unwrap(),
            b.compute_hmac(b"message body").unwrap()
        );

        let other = LocalizedKey::from_password(AuthProtocol::Md5, b"authpass123", b"other-engine");
        assert_ne!(a.as_bytes(), other.as_bytes());
    }

    #[test]
    fn test_mac_lengths() {
        for (protocol, len) in [
            (AuthProtocol::Md5, 12),
            (AuthProtocol::Sha1, 12),
            (AuthProtocol::Sha224, 16),
            (AuthProtocol::Sha256, 24),
            (AuthProtocol::Sha384, 32),
            (AuthProtocol::Sha512, 48),
        ] {
            let key = LocalizedKey::from_bytes(protocol, vec![0x42; protocol.digest_len()]);
            assert_eq!(key.compute_hmac(b"x").unwrap().len(), len);
        }
    }

    fn signed_message(key: &LocalizedKey) -> Vec<u8> {
        let params = UsmSecurityParams::new(
            Bytes::from_static(b"\x80\x00\x1f\x88\x04test"),
            3,
            1000,
            Bytes::from_static(b"admin"),
        )
        .with_auth_placeholder(key.mac_len());
        let msg = V3Message::new(
            MsgGlobalData::new(77, MsgFlags::new(SecurityLevel::AuthNoPriv, true)),
            params.encode(),
            ScopedPdu::new(
                Bytes::new(),
                Bytes::new(),
                Pdu::request(PduType::GetRequest, 77, vec![]),
            ),
        );
        let mut bytes = msg.encode().to_vec();
        sign_message(key, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_sign_then_verify() {
        let key = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", b"engine");
        let bytes = signed_message(&key);

        let (offset, len) = UsmSecurityParams::find_auth_params_offset(&bytes).unwrap();
        assert!(bytes[offset..offset + len].iter().any(|&b| b != 0));
        verify_message(&key, &bytes).unwrap();
    }

    #[test]
    fn test_tampered_message_fails() {
        let key = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", b"engine");
        let mut bytes = signed_message(&key);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        assert!(matches!(
            verify_message(&key, &bytes),
            Err(Error::AuthenticationFailed {
                kind: AuthErrorKind::HmacMismatch,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", b"engine");
        let bytes = signed_message(&key);
        let wrong = LocalizedKey::from_password(AuthProtocol::Md5, b"wrongpassword", b"engine");
        assert!(verify_message(&wrong, &bytes).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, vec![0xAB; 16]);
        assert!(!format!("{:?}", key).contains("171"));
        assert!(format!("{:?}", key).contains("REDACTED"));
    }
}
