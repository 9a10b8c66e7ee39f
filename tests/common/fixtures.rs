//! Common OIDs, credentials and agent tables.

use netman_snmp::v3::{AuthProtocol, PrivProtocol};
use netman_snmp::{Oid, UserEntry, UserStore, Value, oid};

pub const ENGINE_ID: &[u8] = b"\x80\x00\x1f\x88\x80netman01";
pub const ENGINE_BOOTS: u32 = 3;
pub const ENGINE_TIME: u32 = 4200;

pub const AUTH_PASSWORD: &str = "authpass123";
pub const PRIV_PASSWORD: &str = "privpass123";

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}
pub fn sys_services() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)
}

/// 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

/// A full `system` group plus a short interfaces table.
pub fn system_table(name: &str) -> Vec<(Oid, Value)> {
    vec![
        (sys_descr(), Value::from("Linux router 6.1")),
        (
            sys_object_id(),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 8072, 3, 2, 10)),
        ),
        (sys_uptime(), Value::TimeTicks(123_456)),
        (sys_contact(), Value::from("noc@example.net")),
        (sys_name(), Value::from(name)),
        (sys_location(), Value::from("rack 4")),
        (sys_services(), Value::Integer(72)),
        (oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2)),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), Value::from("lo")),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 2), Value::from("eth0")),
    ]
}

/// One user per security level and protocol family.
pub fn user_store() -> UserStore {
    let mut store = UserStore::new();
    store.add_user("noauth", UserEntry::no_auth()).unwrap();
    store
        .add_user("md5user", UserEntry::with_auth(AuthProtocol::Md5, AUTH_PASSWORD))
        .unwrap();
    store
        .add_user(
            "desuser",
            UserEntry::with_auth(AuthProtocol::Md5, AUTH_PASSWORD)
                .with_privacy(PrivProtocol::Des, PRIV_PASSWORD),
        )
        .unwrap();
    store
        .add_user(
            "aesuser",
            UserEntry::with_auth(AuthProtocol::Sha256, AUTH_PASSWORD)
                .with_privacy(PrivProtocol::Aes128, PRIV_PASSWORD),
        )
        .unwrap();
    store
}
