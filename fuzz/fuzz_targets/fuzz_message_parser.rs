#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use netman_snmp::ber::Decoder;
use netman_snmp::message::{CommunityMessage, Message, ScopedPdu, V3Message};
use netman_snmp::pdu::Pdu;
use netman_snmp::v3::UsmSecurityParams;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let _ = Message::decode(bytes.clone());
    let _ = CommunityMessage::decode(bytes.clone());

    if let Ok(msg) = V3Message::decode(bytes.clone()) {
        let _ = UsmSecurityParams::decode(msg.security_params.clone());
    }
    let _ = UsmSecurityParams::find_auth_params_offset(data);
    let _ = UsmSecurityParams::decode(bytes.clone());
    let _ = ScopedPdu::decode_plaintext(bytes.clone());

    let mut decoder = Decoder::new(bytes);
    let _ = Pdu::decode(&mut decoder);
});
