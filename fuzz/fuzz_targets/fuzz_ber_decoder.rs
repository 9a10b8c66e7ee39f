#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use netman_snmp::ber::{Decoder, decode_length};
use netman_snmp::value::Value;
use netman_snmp::varbind::{VarBind, decode_varbind_list};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let _ = decode_length(data, 0);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_integer();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_octet_string();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_oid();

    let mut decoder = Decoder::new(bytes.clone());
    if let Ok(mut seq) = decoder.read_sequence() {
        while seq.skip_tlv().is_ok() && !seq.is_empty() {}
    }

    // a successful decode must re-encode to the same value
    let mut decoder = Decoder::new(bytes.clone());
    if let Ok(value) = Value::decode(&mut decoder) {
        let mut again = Decoder::new(value.to_ber());
        assert_eq!(Value::decode(&mut again).ok(), Some(value));
    }

    let mut decoder = Decoder::new(bytes.clone());
    let _ = VarBind::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    let _ = decode_varbind_list(&mut decoder);
});
