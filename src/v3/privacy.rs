//! USM privacy: DES-CBC (RFC 3414 section 8) and AES-128-CFB (RFC 3826).
//!
//! The privacy key is localized from the privacy password with the user's
//! authentication hash. The per-message salt travels in
//! `msgPrivacyParameters`.

use bytes::Bytes;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::auth::{localize_key, password_to_key};
use super::{AuthProtocol, PrivProtocol};
use crate::error::{CryptoErrorKind, Error, Result};

const SALT_LEN: usize = 8;
const DES_BLOCK: usize = 8;

/// Localized privacy key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: PrivProtocol,
}

impl PrivKey {
    /// Derive from the privacy password, localized with the auth protocol's hash.
    pub fn from_password(
        auth_protocol: AuthProtocol,
        protocol: PrivProtocol,
        password: &[u8],
        engine_id: &[u8],
    ) -> Result<Self> {
        let mut master = password_to_key(auth_protocol, password);
        let mut localized = localize_key(auth_protocol, &master, engine_id);
        master.zeroize();

        if localized.len() < protocol.key_len() {
            localized.zeroize();
            return Err(Error::encrypt(None, CryptoErrorKind::InvalidKeyLength));
        }
        localized.truncate(protocol.key_len());
        Ok(Self {
            key: localized,
            protocol,
        })
    }

    pub fn from_bytes(protocol: PrivProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> PrivProtocol {
        self.protocol
    }

    /// Encrypt a scoped PDU, returning `(ciphertext, privParameters)`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        if self.key.len() < self.protocol.key_len() {
            return Err(Error::encrypt(None, CryptoErrorKind::InvalidKeyLength));
        }
        match self.protocol {
            PrivProtocol::Des => self.encrypt_des(plaintext, engine_boots, salt as u32),
            PrivProtocol::Aes128 => self.encrypt_aes(plaintext, engine_boots, engine_time, salt),
        }
    }

    /// Decrypt a received `encryptedPDU`.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        priv_params: &[u8],
    ) -> Result<Bytes> {
        if self.key.len() < self.protocol.key_len() {
            return Err(Error::decrypt(None, CryptoErrorKind::InvalidKeyLength));
        }
        if priv_params.len() != SALT_LEN {
            return Err(Error::decrypt(
                None,
                CryptoErrorKind::InvalidPrivParamsLength {
                    expected: SALT_LEN,
                    actual: priv_params.len(),
                },
            ));
        }
        match self.protocol {
            PrivProtocol::Des => self.decrypt_des(ciphertext, priv_params),
            PrivProtocol::Aes128 => {
                self.decrypt_aes(ciphertext, engine_boots, engine_time, priv_params)
            }
        }
    }

    fn des_iv(&self, salt: &[u8]) -> [u8; 8] {
        let pre_iv = &self.key[8..16];
        let mut iv = [0u8; 8];
        for (i, byte) in iv.iter_mut().enumerate() {
            *byte = pre_iv[i] ^ salt[i];
        }
        iv
    }

    fn encrypt_des(&self, plaintext: &[u8], engine_boots: u32, counter: u32) -> Result<(Bytes, Bytes)> {
        use cbc::cipher::block_padding::NoPadding;
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};
        type DesCbc = cbc::Encryptor<des::Des>;

        let mut salt = [0u8; SALT_LEN];
        salt[..4].copy_from_slice(&engine_boots.to_be_bytes());
        salt[4..].copy_from_slice(&counter.to_be_bytes());
        let iv = self.des_iv(&salt);

        let padded_len = plaintext.len().div_ceil(DES_BLOCK) * DES_BLOCK;
        let mut buffer = vec![0u8; padded_len];
        buffer[..plaintext.len()].copy_from_slice(plaintext);

        let cipher = DesCbc::new_from_slices(&self.key[..8], &iv)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        let ciphertext = cipher
            .encrypt_padded_mut::<NoPadding>(&mut buffer, padded_len)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::CipherError))?;

        Ok((Bytes::copy_from_slice(ciphertext), Bytes::copy_from_slice(&salt)))
    }

    fn decrypt_des(&self, ciphertext: &[u8], salt: &[u8]) -> Result<Bytes> {
        use cbc::cipher::block_padding::NoPadding;
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};
        type DesCbc = cbc::Decryptor<des::Des>;

        if ciphertext.is_empty() || ciphertext.len() % DES_BLOCK != 0 {
            return Err(Error::decrypt(
                None,
                CryptoErrorKind::InvalidCiphertextLength {
                    length: ciphertext.len(),
                    block_size: DES_BLOCK,
                },
            ));
        }

        let iv = self.des_iv(salt);
        let cipher = DesCbc::new_from_slices(&self.key[..8], &iv)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        let mut buffer = ciphertext.to_vec();
        let plaintext = cipher
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::CipherError))?;

        Ok(Bytes::copy_from_slice(plaintext))
    }

    fn aes_iv(engine_boots: u32, engine_time: u32, salt: &[u8]) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..4].copy_from_slice(&engine_boots.to_be_bytes());
        iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
        iv[8..].copy_from_slice(salt);
        iv
    }

    fn encrypt_aes(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
        type Aes128Cfb = cfb_mode::Encryptor<aes::Aes128>;

        let salt = salt.to_be_bytes();
        let iv = Self::aes_iv(engine_boots, engine_time, &salt);

        let mut buffer = plaintext.to_vec();
        let cipher = Aes128Cfb::new_from_slices(&self.key[..16], &iv)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        cipher.encrypt(&mut buffer);

        Ok((Bytes::from(buffer), Bytes::copy_from_slice(&salt)))
    }

    fn decrypt_aes(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: &[u8],
    ) -> Result<Bytes> {
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
        type Aes128Cfb = cfb_mode::Decryptor<aes::Aes128>;

        let iv = Self::aes_iv(engine_boots, engine_time, salt);
        let mut buffer = ciphertext.to_vec();
        let cipher = Aes128Cfb::new_from_slices(&self.key[..16], &iv)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        cipher.decrypt(&mut buffer);

        Ok(Bytes::from(buffer))
    }
}

impl std::fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
