//! SNMPv3 exchanges under the User-based Security Model.
//!
//! The exchange tracks the authoritative engine it talks to. Before that
//! engine is known, requests go out with whatever engine ID, boots and time
//! are configured (often empty or zero); the agent answers with a REPORT,
//! the exchange learns the engine state from it and the caller sends again.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;

use super::community::with_request_id;
use super::{DEFAULT_TIMEOUT, Outgoing};
use crate::error::{AuthErrorKind, CryptoErrorKind, EncodeErrorKind, Error, Result};
use crate::message::{
    Message, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, USM_SECURITY_MODEL, V3Message,
    V3MessageData,
};
use crate::notification::Notification;
use crate::oid::Oid;
use crate::pdu::{BulkParams, Pdu, PduType};
use crate::session::Session;
use crate::transport::{RecvFilter, Transport};
use crate::user_store::{UserEntry, UserStore};
use crate::v3::auth::{sign_message, verify_message};
use crate::v3::{LocalizedKey, PrivKey, ReportReason, UsmSecurityParams};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Engine time never exceeds this (RFC 3414 section 2.2.1).
const MAX_ENGINE_TIME: u32 = i32::MAX as u32;

/// What this side knows about the authoritative engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    pub engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
    synced_at: Option<Instant>,
}

impl EngineState {
    /// Known engine ID, boots and time not yet learned.
    pub fn new(engine_id: impl Into<Bytes>) -> Self {
        Self {
            engine_id: engine_id.into(),
            ..Self::default()
        }
    }

    /// True once boots and time were learned from the engine.
    pub fn is_synchronized(&self) -> bool {
        self.synced_at.is_some()
    }

    /// Learn the engine's identity and clock.
    pub fn update(&mut self, engine_id: Bytes, engine_boots: u32, engine_time: u32) {
        self.engine_id = engine_id;
        self.engine_boots = engine_boots;
        self.engine_time = engine_time;
        self.synced_at = Some(Instant::now());
    }

    /// Engine time now: the learned value plus seconds elapsed since.
    pub fn estimated_time(&self) -> u32 {
        let elapsed = self
            .synced_at
            .map_or(0, |at| at.elapsed().as_secs().min(u64::from(MAX_ENGINE_TIME)) as u32);
        self.engine_time.saturating_add(elapsed).min(MAX_ENGINE_TIME)
    }
}

/// A user's keys localized to one engine.
#[derive(Debug, Clone, Default)]
pub struct UserKeys {
    pub auth: Option<LocalizedKey>,
    pub privacy: Option<PrivKey>,
}

impl UserKeys {
    /// Localize the user's passwords to `engine_id`.
    pub fn derive(entry: &UserEntry, engine_id: &[u8]) -> Result<Self> {
        let auth = entry
            .auth
            .map(|protocol| LocalizedKey::from_password(protocol, entry.auth_password.as_bytes(), engine_id));
        let privacy = match (entry.auth, entry.privacy) {
            (Some(auth), Some(protocol)) => Some(PrivKey::from_password(
                auth,
                protocol,
                entry.priv_password.as_bytes(),
                engine_id,
            )?),
            (None, Some(_)) => return Err(Error::encode(EncodeErrorKind::PrivWithoutAuth)),
            (_, None) => None,
        };
        Ok(Self { auth, privacy })
    }

    /// Highest level these keys can produce.
    pub fn security_level(&self) -> SecurityLevel {
        match (&self.auth, &self.privacy) {
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            _ => SecurityLevel::NoAuthNoPriv,
        }
    }
}

/// Encode a v3 message, encrypting and signing it as its flags demand.
pub fn seal_v3(
    global: MsgGlobalData,
    mut params: UsmSecurityParams,
    scoped: &ScopedPdu,
    keys: &UserKeys,
    salt: u64,
) -> Result<Bytes> {
    let level = global.msg_flags.security_level;

    let data = if level.requires_priv() {
        let key = keys
            .privacy
            .as_ref()
            .ok_or_else(|| Error::encrypt(None, CryptoErrorKind::NoPrivKey))?;
        let (ciphertext, priv_params) = key.encrypt(
            &scoped.encode_to_bytes(),
            params.engine_boots,
            params.engine_time,
            salt,
        )?;
        params.priv_params = priv_params;
        V3MessageData::Encrypted(ciphertext)
    } else {
        V3MessageData::Plaintext(scoped.clone())
    };

    let auth_key = if level.requires_auth() {
        let key = keys
            .auth
            .as_ref()
            .ok_or_else(|| Error::auth(None, AuthErrorKind::NoAuthKey))?;
        params = params.with_auth_placeholder(key.mac_len());
        Some(key)
    } else {
        None
    };

    let msg = V3Message {
        global_data: global,
        security_params: params.encode(),
        data,
    };
    let mut bytes = msg.encode().to_vec();
    if let Some(key) = auth_key {
        sign_message(key, &mut bytes)?;
    }
    Ok(Bytes::from(bytes))
}

/// Verify and decrypt a received v3 message, yielding its scoped PDU.
///
/// `raw` is the datagram `msg` was decoded from.
pub fn open_v3(
    msg: &V3Message,
    raw: &[u8],
    params: &UsmSecurityParams,
    keys: &UserKeys,
) -> Result<ScopedPdu> {
    if msg.security_level().requires_auth() {
        let key = keys
            .auth
            .as_ref()
            .ok_or_else(|| Error::auth(None, AuthErrorKind::NoAuthKey))?;
        verify_message(key, raw)?;
    }

    match &msg.data {
        V3MessageData::Plaintext(scoped) => Ok(scoped.clone()),
        V3MessageData::Encrypted(ciphertext) => {
            let key = keys
                .privacy
                .as_ref()
                .ok_or_else(|| Error::decrypt(None, CryptoErrorKind::NoPrivKey))?;
            let plaintext = key.decrypt(
                ciphertext,
                params.engine_boots,
                params.engine_time,
                &params.priv_params,
            )?;
            ScopedPdu::decode_plaintext(plaintext)
                .map_err(|_| Error::decrypt(None, CryptoErrorKind::CipherError))
        }
    }
}

fn with_target(err: Error, origin: SocketAddr) -> Error {
    match err {
        Error::AuthenticationFailed { kind, .. } => Error::AuthenticationFailed {
            target: Some(origin),
            kind,
        },
        Error::DecryptionFailed { kind, .. } => Error::DecryptionFailed {
            target: Some(origin),
            kind,
        },
        other => other,
    }
}

/// A USM-secured request/response exchange for one user.
#[derive(Debug)]
pub struct UsmExchange {
    user_name: String,
    context_name: Bytes,
    engine: EngineState,
    timeout: Duration,
    outgoing: Outgoing,
    last_msg_id: Option<i32>,
    response: Option<Pdu>,
    key_cache: HashMap<(String, Bytes), UserKeys>,
}

impl UsmExchange {
    /// Exchange for `user_name` against the engine `engine_id`, which may be
    /// empty when it is to be discovered.
    pub fn new(
        engine_id: impl Into<Bytes>,
        context_name: impl Into<Bytes>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            context_name: context_name.into(),
            engine: EngineState::new(engine_id),
            timeout: DEFAULT_TIMEOUT,
            outgoing: Outgoing::default(),
            last_msg_id: None,
            response: None,
            key_cache: HashMap::new(),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn context_name(&self) -> &[u8] {
        &self.context_name
    }

    pub fn engine(&self) -> &EngineState {
        &self.engine
    }

    /// Replace the engine state, e.g. with one learned by another exchange.
    pub fn set_engine(&mut self, engine: EngineState) {
        self.engine = engine;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Append a binding. Fails after a send until [`clear`](Self::clear).
    pub fn add_varbind(&mut self, oid: Oid, value: Value) -> Result<()> {
        self.outgoing.add(oid, value)
    }

    pub fn varbinds(&self) -> &[VarBind] {
        self.outgoing.varbinds()
    }

    /// Reset for reuse. Engine state and cached keys are kept.
    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.last_msg_id = None;
        self.response = None;
    }

    /// Forget cached keys, e.g. after a user's passwords changed.
    pub fn clear_key_cache(&mut self) {
        self.key_cache.clear();
    }

    /// msgID (and request-id) of the last send.
    pub fn last_msg_id(&self) -> Option<i32> {
        self.last_msg_id
    }

    /// The last accepted response or notification.
    pub fn response(&self) -> Option<&Pdu> {
        self.response.as_ref()
    }

    /// The i-th binding of the last response.
    pub fn varbind(&self, index: usize) -> Option<&VarBind> {
        self.response.as_ref()?.varbind(index)
    }

    fn keys(&mut self, user: &str, entry: &UserEntry, engine_id: &Bytes) -> Result<UserKeys> {
        let cache_key = (user.to_string(), engine_id.clone());
        if let Some(keys) = self.key_cache.get(&cache_key) {
            return Ok(keys.clone());
        }
        tracing::debug!(target: "netman_snmp::usm", { snmp.user = user, snmp.engine_id = %crate::util::encode_hex(engine_id) }, "localizing keys");
        let keys = UserKeys::derive(entry, engine_id)?;
        self.key_cache.insert(cache_key, keys.clone());
        Ok(keys)
    }

    /// Build the msgGlobalData and security parameters for an outgoing message.
    ///
    /// Flags follow the user's configured protocols; the engine fields carry
    /// the estimated engine time.
    pub fn generate_header(
        &mut self,
        store: &UserStore,
        msg_id: i32,
        reportable: bool,
    ) -> Result<(MsgGlobalData, UsmSecurityParams, UserKeys)> {
        let entry = store.get_user(&self.user_name)?;
        let engine_id = self.engine.engine_id.clone();
        let user = self.user_name.clone();
        let keys = self.keys(&user, entry, &engine_id)?;

        let flags = MsgFlags::new(keys.security_level(), reportable);
        let params = UsmSecurityParams::new(
            engine_id,
            self.engine.engine_boots,
            self.engine.estimated_time(),
            Bytes::from(user.into_bytes()),
        );
        Ok((MsgGlobalData::new(msg_id, flags), params, keys))
    }

    /// Send the varbind list as a `pdu_type` request, returning its msgID.
    ///
    /// The msgID and the request-id are the same value from `session`.
    pub async fn send_request<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        pdu_type: PduType,
        transport: &T,
        dest: SocketAddr,
    ) -> Result<i32> {
        if pdu_type == PduType::GetBulkRequest {
            return self
                .send_bulk_request(session, store, BulkParams::default(), transport, dest)
                .await;
        }
        store.get_user(&self.user_name)?;
        let varbinds = self.outgoing.take_for_send()?;
        let id = session.next_request_id();
        self.send_pdu(session, store, Pdu::request(pdu_type, id, varbinds), transport, dest)
            .await
    }

    /// Send a GETBULK request.
    pub async fn send_bulk_request<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        bulk: BulkParams,
        transport: &T,
        dest: SocketAddr,
    ) -> Result<i32> {
        store.get_user(&self.user_name)?;
        let varbinds = self.outgoing.take_for_send()?;
        let id = session.next_request_id();
        self.send_pdu(session, store, Pdu::get_bulk(id, bulk, varbinds), transport, dest)
            .await
    }

    async fn send_pdu<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        pdu: Pdu,
        transport: &T,
        dest: SocketAddr,
    ) -> Result<i32> {
        let msg_id = pdu.request_id;
        let pdu_type = pdu.pdu_type;
        let (global, params, keys) = self.generate_header(store, msg_id, true)?;
        let scoped = ScopedPdu::new(self.engine.engine_id.clone(), self.context_name.clone(), pdu);
        let data = seal_v3(global, params, &scoped, &keys, session.next_salt())?;

        self.last_msg_id = Some(msg_id);
        self.response = None;

        tracing::trace!(target: "netman_snmp::usm", { snmp.target = %dest, snmp.msg_id = msg_id, snmp.pdu_type = %pdu_type, snmp.security_level = ?keys.security_level(), snmp.bytes = data.len() }, "sending v3 request");
        transport.send_to(&data, dest).await?;
        Ok(msg_id)
    }

    /// Decode a datagram and validate its header.
    ///
    /// Checks the version, the msgID when one is expected, and the security
    /// model. A non-USM message is reported to its origin when reportable.
    pub async fn check_header<T: Transport>(
        &self,
        session: &Session,
        transport: &T,
        data: Bytes,
        origin: SocketAddr,
        expected_msg_id: Option<i32>,
    ) -> Result<(V3Message, UsmSecurityParams)> {
        let msg = match Message::decode(data)? {
            Message::V3(msg) => msg,
            Message::Community(other) => {
                return Err(Error::VersionMismatch {
                    expected: Version::V3,
                    actual: other.version,
                });
            }
        };

        if let Some(expected) = expected_msg_id
            && msg.msg_id() != expected
        {
            return Err(Error::RequestIdMismatch {
                expected,
                actual: msg.msg_id(),
            });
        }

        let model = msg.global_data.msg_security_model;
        if model != USM_SECURITY_MODEL {
            self.reject(session, transport, origin, &msg, 0, ReportReason::UnknownSecurityModels)
                .await;
            return Err(Error::UnsupportedSecurityModel {
                target: Some(origin),
                model,
            });
        }

        let params = UsmSecurityParams::decode(msg.security_params.clone())?;
        Ok((msg, params))
    }

    /// Count a security failure and send a REPORT if the message asked for one.
    async fn reject<T: Transport>(
        &self,
        session: &Session,
        transport: &T,
        origin: SocketAddr,
        msg: &V3Message,
        request_id: i32,
        reason: ReportReason,
    ) {
        tracing::warn!(target: "netman_snmp::usm", { snmp.source = %origin, snmp.msg_id = msg.msg_id(), reason = %reason }, "rejecting v3 message");
        if msg.is_reportable() {
            if let Err(e) = self
                .send_report_to(session, transport, origin, msg.msg_id(), request_id, reason)
                .await
            {
                tracing::debug!(target: "netman_snmp::usm", { snmp.target = %origin, error = %e }, "failed to send report");
            }
        } else {
            session.increment_stat(reason);
        }
    }

    /// Send a REPORT for `reason` to `origin`.
    ///
    /// Reports go out noAuthNoPriv, not reportable, echoing `msg_id`, and
    /// carry the incremented statistics counter.
    pub async fn send_report_to<T: Transport>(
        &self,
        session: &Session,
        transport: &T,
        origin: SocketAddr,
        msg_id: i32,
        request_id: i32,
        reason: ReportReason,
    ) -> Result<()> {
        let counter = session.increment_stat(reason);
        let params = UsmSecurityParams::new(
            self.engine.engine_id.clone(),
            self.engine.engine_boots,
            self.engine.estimated_time(),
            Bytes::new(),
        );
        let scoped = ScopedPdu::new(
            self.engine.engine_id.clone(),
            self.context_name.clone(),
            Pdu::report(request_id, reason.oid(), counter),
        );
        let msg = V3Message::new(
            MsgGlobalData::new(msg_id, MsgFlags::new(SecurityLevel::NoAuthNoPriv, false)),
            params.encode(),
            scoped,
        );
        transport.send_to(&msg.encode(), origin).await
    }

    /// Authenticate and decrypt for the user named in `params`.
    ///
    /// A message below `required` is rejected with `UnsupportedSecLevels`,
    /// except a plaintext REPORT, which is how an agent answers discovery.
    #[allow(clippy::too_many_arguments)]
    async fn open<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        transport: &T,
        origin: SocketAddr,
        msg: &V3Message,
        raw: &[u8],
        params: &UsmSecurityParams,
        required: SecurityLevel,
    ) -> Result<ScopedPdu> {
        let plaintext_report = msg
            .scoped_pdu()
            .is_some_and(|scoped| scoped.pdu.pdu_type == PduType::Report);
        if msg.security_level() < required && !plaintext_report {
            self.reject(session, transport, origin, msg, 0, ReportReason::UnsupportedSecLevels)
                .await;
            return Err(Error::UnsupportedSecLevel {
                target: Some(origin),
            });
        }

        if !msg.security_level().requires_auth() {
            return open_v3(msg, raw, params, &UserKeys::default());
        }

        let user = String::from_utf8_lossy(&params.username).into_owned();
        let entry = match store.get_user(&user) {
            Ok(entry) => entry,
            Err(_) => {
                self.reject(session, transport, origin, msg, 0, ReportReason::UnknownUserNames)
                    .await;
                return Err(Error::UnknownUser {
                    target: Some(origin),
                    name: user.into(),
                });
            }
        };
        let keys = self.keys(&user, entry, &params.engine_id)?;
        if msg.security_level() > keys.security_level() {
            self.reject(session, transport, origin, msg, 0, ReportReason::UnsupportedSecLevels)
                .await;
            return Err(Error::UnsupportedSecLevel {
                target: Some(origin),
            });
        }

        open_v3(msg, raw, params, &keys).map_err(|e| {
            let reason = match e {
                Error::DecryptionFailed { .. } => ReportReason::DecryptionErrors,
                _ => ReportReason::WrongDigests,
            };
            session.increment_stat(reason);
            tracing::warn!(target: "netman_snmp::usm", { snmp.source = %origin, error = %e }, "v3 message failed security checks");
            with_target(e, origin)
        })
    }

    /// Reject with `UnknownEngineIds` unless `engine_id` is the configured engine.
    ///
    /// An empty configured engine ID accepts any engine.
    async fn check_engine<T: Transport>(
        &self,
        session: &Session,
        transport: &T,
        origin: SocketAddr,
        msg: &V3Message,
        request_id: i32,
        engine_id: &Bytes,
    ) -> Result<()> {
        if self.engine.engine_id.is_empty() || &self.engine.engine_id == engine_id {
            return Ok(());
        }
        self.reject(session, transport, origin, msg, request_id, ReportReason::UnknownEngineIds)
            .await;
        Err(Error::UnknownEngineId {
            target: Some(origin),
        })
    }

    /// Reject with `UnknownUserNames` unless the store knows the user.
    #[allow(clippy::too_many_arguments)]
    async fn check_user<T: Transport>(
        &self,
        session: &Session,
        store: &UserStore,
        transport: &T,
        origin: SocketAddr,
        msg: &V3Message,
        request_id: i32,
        user: &[u8],
    ) -> Result<()> {
        let name = String::from_utf8_lossy(user);
        if store.contains(&name) {
            return Ok(());
        }
        self.reject(session, transport, origin, msg, request_id, ReportReason::UnknownUserNames)
            .await;
        Err(Error::UnknownUser {
            target: Some(origin),
            name: name.into(),
        })
    }

    /// Receive and validate the response to the last request.
    ///
    /// A REPORT updates the engine state and fails with
    /// [`Error::ReportReceived`]; the caller decides whether to send again.
    /// A digest mismatch fails with [`Error::AuthenticationFailed`] and is
    /// not reported to the peer.
    pub async fn recv_response<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        transport: &T,
        filter: RecvFilter,
        expected: PduType,
    ) -> Result<&Pdu> {
        let expected_id = self.last_msg_id.unwrap_or(0);
        let (data, origin) = transport
            .recv_from(filter, self.timeout)
            .await
            .map_err(|e| with_request_id(e, expected_id))?;

        let (msg, params) = self
            .check_header(session, transport, data.clone(), origin, Some(expected_id))
            .await?;
        let required = store.get_user(&self.user_name)?.security_level();
        let scoped = self
            .open(session, store, transport, origin, &msg, &data, &params, required)
            .await?;
        let pdu = scoped.pdu;

        if pdu.pdu_type == PduType::Report {
            let oid = pdu
                .varbinds
                .first()
                .map(|vb| vb.oid.clone())
                .unwrap_or_default();
            tracing::debug!(target: "netman_snmp::usm", { snmp.source = %origin, snmp.engine_id = %crate::util::encode_hex(&params.engine_id), snmp.engine_boots = params.engine_boots, snmp.engine_time = params.engine_time, report = %oid }, "learned engine state from report");
            self.engine
                .update(params.engine_id, params.engine_boots, params.engine_time);
            self.response = Some(pdu);
            return Err(Error::ReportReceived {
                target: Some(origin),
                oid,
            });
        }

        if pdu.pdu_type != expected {
            return Err(Error::UnexpectedPduType {
                expected,
                actual: pdu.pdu_type,
            });
        }
        self.check_engine(session, transport, origin, &msg, pdu.request_id, &params.engine_id)
            .await?;
        self.check_user(session, store, transport, origin, &msg, pdu.request_id, &params.username)
            .await?;

        if scoped.context_name != self.context_name {
            return Err(Error::ContextNameMismatch {
                target: Some(origin),
            });
        }
        if pdu.request_id != expected_id {
            return Err(Error::RequestIdMismatch {
                expected: expected_id,
                actual: pdu.request_id,
            });
        }

        if msg.security_level().requires_auth() {
            self.engine
                .update(params.engine_id, params.engine_boots, params.engine_time);
        }

        tracing::trace!(target: "netman_snmp::usm", { snmp.source = %origin, snmp.msg_id = expected_id, snmp.varbinds = pdu.varbinds.len() }, "v3 response accepted");
        Ok(self.response.insert(pdu))
    }

    /// Receive a Trap(v2) or InformRequest.
    ///
    /// The msgID is not checked. Informs are acknowledged to their origin
    /// with the same msgID and request-id.
    pub async fn recv_trap<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        transport: &T,
        filter: RecvFilter,
    ) -> Result<Notification> {
        let (data, origin) = transport.recv_from(filter, self.timeout).await?;
        let (msg, params) = self
            .check_header(session, transport, data.clone(), origin, None)
            .await?;

        self.check_engine(session, transport, origin, &msg, 0, &params.engine_id)
            .await?;
        self.check_user(session, store, transport, origin, &msg, 0, &params.username)
            .await?;
        let sender = String::from_utf8_lossy(&params.username);
        let required = store.get_user(&sender)?.security_level();
        let scoped = self
            .open(session, store, transport, origin, &msg, &data, &params, required)
            .await?;
        let pdu = scoped.pdu;

        if !matches!(pdu.pdu_type, PduType::TrapV2 | PduType::InformRequest) {
            return Err(Error::NotNotification {
                actual: pdu.pdu_type,
            });
        }

        if pdu.pdu_type == PduType::InformRequest {
            let ack = ScopedPdu::new(
                scoped.context_engine_id.clone(),
                scoped.context_name.clone(),
                pdu.to_response(),
            );
            self.acknowledge(session, store, transport, origin, &msg, &params, &ack)
                .await?;
        }

        self.response = Some(pdu.clone());
        Ok(Notification {
            origin,
            version: Version::V3,
            pdu,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn acknowledge<T: Transport>(
        &mut self,
        session: &Session,
        store: &UserStore,
        transport: &T,
        origin: SocketAddr,
        inform: &V3Message,
        params: &UsmSecurityParams,
        ack: &ScopedPdu,
    ) -> Result<()> {
        let user = String::from_utf8_lossy(&params.username).into_owned();
        let keys = match inform.security_level() {
            SecurityLevel::NoAuthNoPriv => UserKeys::default(),
            _ => {
                let entry = store.get_user(&user)?;
                self.keys(&user, entry, &params.engine_id)?
            }
        };

        let global = MsgGlobalData::new(
            inform.msg_id(),
            MsgFlags::new(inform.security_level(), false),
        );
        let ack_params = UsmSecurityParams::new(
            params.engine_id.clone(),
            params.engine_boots,
            params.engine_time,
            params.username.clone(),
        );
        let data = seal_v3(global, ack_params, ack, &keys, session.next_salt())?;

        tracing::trace!(target: "netman_snmp::usm", { snmp.target = %origin, snmp.msg_id = inform.msg_id(), snmp.request_id = ack.pdu.request_id }, "acknowledging inform");
        transport.send_to(&data, origin).await
    }
}
