#![no_main]

use libfuzzer_sys::fuzz_target;
use smime::asn1::Value;
use smime::sigdata::{detach, SignedData};

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 3 {
        0 => { let _ = Value::decode(data); },
        1 => { let _ = detach(data); },
        2 => { let _ = SignedData::decode(data); },
        _ => panic!("what?"),
    }
});
