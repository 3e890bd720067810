//! Fuzz target: `Pt2262Codec::decode`
//!
//! Interprets the input as little-endian `u32` pulse widths and decodes
//! them as a captured burst.  The decoder must never panic, and any code
//! it reports must re-encode to a burst that decodes to the same code.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use homeesp::rf::codec::MAX_PULSES;
use homeesp::rf::{FrameCodec, ProtocolTiming, Pt2262Codec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(codec) = Pt2262Codec::new(ProtocolTiming::default()) else {
        return;
    };
    let pulses: Vec<u32> = data
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    if let Some(msg) = codec.decode(&pulses) {
        assert!(msg.bits >= 8 && msg.bits <= 32, "bit count out of range");

        let mut clean: heapless::Vec<u32, MAX_PULSES> = heapless::Vec::new();
        codec.encode(&msg, &mut clean).expect("decoded message re-encodes");
        assert_eq!(codec.decode(&clean), Some(msg));
    }
});
