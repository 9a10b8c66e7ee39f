//! SNMPv3 requests through the client against simulated agents.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use common::*;
use netman_snmp::exchange::UserKeys;
use netman_snmp::message::{SecurityLevel, V3Message};
use netman_snmp::v3::{AuthProtocol, UsmSecurityParams};
use netman_snmp::{Client, Error, ManagerConfig, ReportReason, UserEntry, Value};

fn agent_addr() -> SocketAddr {
    "192.0.2.40:161".parse().unwrap()
}

fn net() -> AgentNet {
    AgentNet::new().with_agent(
        agent_addr(),
        SimAgent::new(system_table("edge-rtr")).users(user_store()),
    )
}

fn client(user: &str) -> Client<AgentNet> {
    Client::usm(
        net(),
        agent_addr(),
        Arc::new(user_store()),
        user,
        Bytes::new(),
        Bytes::new(),
        Duration::from_millis(50),
    )
    .unwrap()
}

fn sent_levels(client: &Client<AgentNet>) -> Vec<SecurityLevel> {
    client
        .transport()
        .sent()
        .into_iter()
        .map(|(data, _)| V3Message::decode(data).unwrap().security_level())
        .collect()
}

#[tokio::test]
async fn cold_start_discovers_engine_for_every_level() {
    for (user, level) in [
        ("noauth", SecurityLevel::NoAuthNoPriv),
        ("md5user", SecurityLevel::AuthNoPriv),
        ("desuser", SecurityLevel::AuthPriv),
        ("aesuser", SecurityLevel::AuthPriv),
    ] {
        let client = client(user);
        let varbinds = client.get(&[sys_name()]).await.unwrap();
        assert_eq!(varbinds[0].value.as_str(), Some("edge-rtr"), "{user}");

        let engine = client.engine().await.unwrap();
        assert_eq!(engine.engine_id.as_ref(), ENGINE_ID);
        assert_eq!(engine.engine_boots, ENGINE_BOOTS);
        assert!(engine.engine_time >= ENGINE_TIME);

        // discovery probe, then the real request
        let levels = sent_levels(&client);
        assert_eq!(levels.len(), 2, "{user}");
        assert_eq!(levels[1], level, "{user}");
    }
}

#[tokio::test]
async fn discovered_engine_is_reused() {
    let client = client("md5user");
    client.get(&[sys_name()]).await.unwrap();
    client.get(&[sys_descr()]).await.unwrap();
    assert_eq!(client.transport().sent().len(), 3);
}

#[tokio::test]
async fn msg_ids_follow_request_ids() {
    let client = client("aesuser");
    client.get(&[sys_name()]).await.unwrap();
    client.get(&[sys_name()]).await.unwrap();
    let ids: Vec<i32> = client
        .transport()
        .sent()
        .into_iter()
        .map(|(data, _)| V3Message::decode(data).unwrap().msg_id())
        .collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn agent_reboot_resynchronizes_once() {
    let client = client("md5user");
    client.get(&[sys_name()]).await.unwrap();

    client
        .transport()
        .set_engine_clock(agent_addr(), ENGINE_BOOTS + 1, 12);
    let varbinds = client.get(&[sys_name()]).await.unwrap();
    assert_eq!(varbinds[0].value.as_str(), Some("edge-rtr"));

    let engine = client.engine().await.unwrap();
    assert_eq!(engine.engine_boots, ENGINE_BOOTS + 1);
    assert_eq!(client.transport().sent().len(), 4);
}

#[tokio::test]
async fn unknown_user_at_agent_is_reported() {
    let mut store = user_store();
    store
        .add_user("ghost", UserEntry::with_auth(AuthProtocol::Md5, AUTH_PASSWORD))
        .unwrap();
    let client = Client::usm(
        net(),
        agent_addr(),
        Arc::new(store),
        "ghost",
        Bytes::new(),
        Bytes::new(),
        Duration::from_millis(50),
    )
    .unwrap();

    let err = client.get(&[sys_name()]).await.unwrap_err();
    match err {
        Error::ReportReceived { oid, .. } => {
            assert_eq!(ReportReason::from_oid(&oid), Some(ReportReason::UnknownUserNames));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn wrong_password_gets_no_answer() {
    let mut agent_users = user_store();
    agent_users.remove_user("md5user");
    agent_users
        .add_user("md5user", UserEntry::with_auth(AuthProtocol::Md5, "another-pass"))
        .unwrap();
    let net = AgentNet::new().with_agent(
        agent_addr(),
        SimAgent::new(system_table("edge-rtr")).users(agent_users),
    );
    let client = Client::usm(
        net,
        agent_addr(),
        Arc::new(user_store()),
        "md5user",
        Bytes::new(),
        Bytes::new(),
        Duration::from_millis(50),
    )
    .unwrap();

    let err = client.get(&[sys_name()]).await.unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn configured_engine_skips_discovery() {
    let config = ManagerConfig {
        snmp_port: 161,
        engine_id: netman_snmp::util::encode_hex(ENGINE_ID),
        ..Default::default()
    };
    let client = Client::from_config(
        net(),
        agent_addr().ip(),
        &config,
        Arc::new(user_store()),
        Some("noauth"),
    )
    .unwrap();

    client.get(&[sys_name()]).await.unwrap();
    assert_eq!(client.transport().sent().len(), 1);
}

#[tokio::test]
async fn set_over_auth_priv() {
    let client = client("desuser");
    client
        .set(&[(sys_contact(), Value::from("ops@example.net"))])
        .await
        .unwrap();
    assert_eq!(
        client.transport().value_at(agent_addr(), &sys_contact()),
        Some(Value::from("ops@example.net"))
    );
}

#[test]
fn localized_keys_depend_on_engine() {
    let store = user_store();
    let entry = store.get_user("aesuser").unwrap();

    let a = UserKeys::derive(entry, ENGINE_ID).unwrap();
    let again = UserKeys::derive(entry, ENGINE_ID).unwrap();
    let other = UserKeys::derive(entry, b"\x80\x00\x1f\x88\x80other").unwrap();

    let key = |k: &UserKeys| k.auth.as_ref().unwrap().as_bytes().to_vec();
    assert_eq!(key(&a), key(&again));
    assert_ne!(key(&a), key(&other));
    assert_eq!(a.security_level(), SecurityLevel::AuthPriv);
}

#[tokio::test]
async fn cold_start_request_carries_empty_engine_fields() {
    for (user, mac_len) in [("noauth", 0), ("md5user", 12), ("aesuser", 24)] {
        let client = client(user);
        client.get(&[sys_name()]).await.unwrap();

        let (first, target) = client.transport().sent().remove(0);
        assert_eq!(target, agent_addr());
        let msg = V3Message::decode(first).unwrap();
        assert!(msg.is_reportable(), "{user}");
        assert_eq!(msg.msg_id(), 1);

        let params = UsmSecurityParams::decode(msg.security_params.clone()).unwrap();
        assert!(params.engine_id.is_empty(), "{user}");
        assert_eq!((params.engine_boots, params.engine_time), (0, 0), "{user}");
        assert_eq!(params.username.as_ref(), user.as_bytes());
        // signed and encrypted under keys localized to the empty engine ID
        assert_eq!(params.auth_params.len(), mac_len, "{user}");
        assert_eq!(msg.scoped_pdu().is_none(), user == "aesuser", "{user}");
    }
}
