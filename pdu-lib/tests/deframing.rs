mod common;

use std::io::{Seek, SeekFrom, Write};

use common::{corrupt, random_bits, rng, SYNC};
use rand::Rng;
use pdu_utils::deframer::{
    deframe, unpack_bytes, BitFormat, Deframer, DeframerConfig, Frame, OutputPolicy,
    RecoveryPolicy,
};
use pdu_utils::pdu::{Pdu, Value, BIT_INDEX, BIT_REVERSED, PDU_NUM};
use pdu_utils::{ConfigError, Error};

fn new_deframer(
    threshold: usize,
    burst_len: usize,
    output: OutputPolicy,
    recovery: RecoveryPolicy,
) -> Deframer {
    let config = DeframerConfig::builder()
        .access_code("10110100")
        .burst_len(burst_len)
        .threshold(threshold)
        .output(output)
        .recovery(recovery)
        .build();
    Deframer::new(&config).unwrap()
}

fn check_laws(frames: &[Frame], burst_len: usize, sync_len: usize, output: OutputPolicy) {
    let expected_len = match output {
        OutputPolicy::Discard => burst_len - sync_len,
        OutputPolicy::Fix | OutputPolicy::Keep => burst_len,
    };
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.frame_index, i as u64, "frame indexes must be gapless");
        assert_eq!(frame.payload.len(), expected_len, "bad payload length for {output}");
        if output == OutputPolicy::Fix {
            assert_eq!(frame.payload[..sync_len], SYNC);
        }
    }
    for pair in frames.windows(2) {
        assert!(
            pair[1].start_position >= pair[0].start_position + burst_len as u64,
            "frames overlap: {:?} {:?}",
            pair[0].start_position,
            pair[1].start_position
        );
    }
}

#[test]
fn scenario_strict_discard_exact() {
    let mut data = vec![1, 1, 1];
    data.extend(SYNC.repeat(6));
    let mut deframer = new_deframer(0, 16, OutputPolicy::Discard, RecoveryPolicy::Strict);

    let pdus: Vec<Pdu> = deframer
        .push_bits(&data)
        .into_iter()
        .map(Pdu::from)
        .collect();

    assert_eq!(pdus.len(), 3);
    for (i, (pdu, bit_index)) in pdus.iter().zip([3u64, 19, 35]).enumerate() {
        let expected = Pdu::new(SYNC.to_vec())
            .with_meta(BIT_REVERSED, false)
            .with_meta(PDU_NUM, i as u64)
            .with_meta(BIT_INDEX, bit_index);
        assert_eq!(pdu, &expected);
    }
}

#[test]
fn scenario_error_tolerance() {
    let mut rng = rng(2);
    for _ in 0..20 {
        let mut one = corrupt(&mut rng, &SYNC, 1);
        one.extend([0; 8]);
        let mut deframer = new_deframer(1, 16, OutputPolicy::Keep, RecoveryPolicy::Reset);
        assert_eq!(deframer.push_bits(&one).len(), 1, "{one:?}");

        let mut two = corrupt(&mut rng, &SYNC, 2);
        two.extend([0; 8]);
        let mut deframer = new_deframer(1, 16, OutputPolicy::Keep, RecoveryPolicy::Reset);
        assert!(deframer.push_bits(&two).is_empty(), "{two:?}");
    }
}

#[test]
fn scenario_fix_and_keep() {
    let mut rng = rng(3);
    for _ in 0..20 {
        let received = corrupt(&mut rng, &SYNC, 1);
        let mut data = received.clone();
        data.extend(random_bits(&mut rng, 8));

        let mut fix = new_deframer(1, 16, OutputPolicy::Fix, RecoveryPolicy::Strict);
        let frames = fix.push_bits(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload[..8], SYNC);
        assert_eq!(frames[0].payload[8..], data[8..]);

        let mut keep = new_deframer(1, 16, OutputPolicy::Keep, RecoveryPolicy::Strict);
        let frames = keep.push_bits(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, data);
        assert_ne!(frames[0].payload[..8], SYNC);
    }
}

#[test]
fn permissive_reversed_metadata() {
    let inverted: Vec<u8> = SYNC.iter().map(|b| b ^ 1).collect();
    let mut data = vec![0, 0, 0];
    data.extend(&inverted);
    data.extend([1, 1, 0, 0]);
    let mut deframer = new_deframer(0, 12, OutputPolicy::Fix, RecoveryPolicy::Permissive);

    let pdus: Vec<Pdu> = deframer
        .push_bits(&data)
        .into_iter()
        .map(Pdu::from)
        .collect();

    assert_eq!(pdus.len(), 1);
    assert_eq!(pdus[0].get(BIT_REVERSED), Some(&Value::Bool(true)));
    assert_eq!(pdus[0].get(BIT_INDEX), Some(&Value::U64(3)));
    assert_eq!(pdus[0].data[..8], SYNC);
    assert_eq!(pdus[0].data[8..], [1, 1, 0, 0]);
}

#[test]
fn laws_hold_over_noisy_streams() {
    let mut rng = rng(7);
    for recovery in [
        RecoveryPolicy::Strict,
        RecoveryPolicy::Reset,
        RecoveryPolicy::Permissive,
    ] {
        for output in [OutputPolicy::Discard, OutputPolicy::Fix, OutputPolicy::Keep] {
            let mut data = Vec::new();
            for _ in 0..50 {
                let gap = rng.gen_range(0..40);
                data.extend(random_bits(&mut rng, gap));
                let errors = rng.gen_range(0..=1);
                data.extend(corrupt(&mut rng, &SYNC, errors));
                data.extend(random_bits(&mut rng, 24));
            }
            let mut deframer = new_deframer(1, 32, output, recovery);

            let frames = deframer.push_bits(&data);

            assert!(!frames.is_empty(), "{recovery} {output}");
            check_laws(&frames, 32, 8, output);
            assert_eq!(deframer.position(), data.len() as u64);
            for frame in &frames {
                assert!(frame.start_position + 32 <= data.len() as u64);
            }
        }
    }
}

#[test]
fn frames_in_back_to_back_stream_are_all_found() {
    let mut rng = rng(11);
    let mut data = random_bits(&mut rng, 5);
    let mut payloads = Vec::new();
    for _ in 0..100 {
        data.extend(SYNC);
        let payload = random_bits(&mut rng, 56);
        data.extend(&payload);
        payloads.push(payload);
    }

    let mut deframer = new_deframer(0, 64, OutputPolicy::Discard, RecoveryPolicy::Strict);
    let frames = deframer.push_bits(&data);

    assert_eq!(frames.len(), 100);
    for (i, (frame, payload)) in frames.iter().zip(&payloads).enumerate() {
        assert_eq!(frame.start_position, 5 + 64 * i as u64);
        assert_eq!(&frame.payload, payload);
    }
    assert_eq!(deframer.stats().lock_losses, 0);
}

#[test]
fn construction_errors() {
    let cases = [
        ("", "", 16, RecoveryPolicy::Permissive),
        ("", "0001", 16, RecoveryPolicy::Reset),
        ("000101001010101", "0101011100111", 8, RecoveryPolicy::Permissive),
        ("7", "", 8, RecoveryPolicy::Permissive),
        ("1010", "one zero one", 8, RecoveryPolicy::Permissive),
        ("0xzz", "", 8, RecoveryPolicy::Strict),
    ];
    for (access_code, tail_sync, burst_len, recovery) in cases {
        let config = DeframerConfig::builder()
            .access_code(access_code)
            .tail_sync(tail_sync)
            .burst_len(burst_len)
            .output(OutputPolicy::Keep)
            .recovery(recovery)
            .build();
        let zult = Deframer::new(&config);
        assert!(
            matches!(zult, Err(Error::Config(_))),
            "expected config error for {access_code:?}/{tail_sync:?}"
        );
    }

    let config = DeframerConfig::builder()
        .access_code("")
        .burst_len(16)
        .recovery(RecoveryPolicy::Permissive)
        .build();
    assert!(matches!(
        Deframer::new(&config),
        Err(Error::Config(ConfigError::EmptyAccessCode))
    ));
}

#[test]
fn deframe_from_file() {
    let mut bytes = vec![0x00, 0x00];
    for i in 0..5u8 {
        bytes.extend([0xb4, i, 0xff - i]);
    }
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&bytes).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let deframer = new_deframer(0, 24, OutputPolicy::Discard, RecoveryPolicy::Strict);
    let frames: Vec<Frame> = deframe(file, deframer, BitFormat::Packed)
        .map(Result::unwrap)
        .collect();

    assert_eq!(frames.len(), 5);
    for (i, frame) in frames.iter().enumerate() {
        let i = u8::try_from(i).unwrap();
        assert_eq!(frame.start_position, 16 + 24 * u64::from(i));
        assert_eq!(frame.payload, unpack_bytes(&[i, 0xff - i]));
    }
}
