#![no_main]

use libfuzzer_sys::fuzz_target;

use netman_snmp::oid::Oid;

fuzz_target!(|data: &[u8]| {
    if let Ok(oid) = Oid::from_ber(data) {
        let _ = oid.to_string();
    }

    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(oid) = Oid::parse(s)
    {
        assert_eq!(Oid::parse(&oid.to_string()).ok(), Some(oid));
    }
});
