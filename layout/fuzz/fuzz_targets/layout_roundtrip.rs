#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use commonware_layout::{record, Codec, Config, Endian, ErrorKind};
use libfuzzer_sys::fuzz_target;

record! {
    #[derive(Debug, Default)]
    struct Inner {
        #[field(order = 0)]
        a: i8,
        #[field(order = 1)]
        b: u16,
    }
}

record! {
    #[derive(Debug, Default)]
    struct Sample {
        #[field(order = 0)]
        flag: bool,
        #[field(order = 1, bytes = 1)]
        small: i16,
        #[field(order = 2, bytes = 5)]
        wide: i64,
        #[field(order = 3)]
        ratio: f64,
        #[field(order = 4)]
        letter: char,
        #[field(order = 5, bytes = 6)]
        code: String,
        #[field(order = 6, length = 3)]
        samples: Vec<i32>,
        #[field(order = 7)]
        inner: Inner,
        #[field(order = 8, bytes = 4)]
        raw: Bytes,
        #[field(order = 9)]
        rest: String,
    }
}

#[derive(Arbitrary, Debug)]
struct SampleInput {
    flag: bool,
    small: i16,
    wide: i64,
    ratio: f64,
    letter: char,
    code: String,
    samples: Vec<i32>,
    a: i8,
    b: u16,
    raw: Vec<u8>,
    rest: String,
}

impl From<SampleInput> for Sample {
    fn from(input: SampleInput) -> Self {
        Self {
            flag: input.flag,
            small: input.small,
            wide: input.wide,
            ratio: input.ratio,
            letter: input.letter,
            code: input.code,
            samples: input.samples,
            inner: Inner {
                a: input.a,
                b: input.b,
            },
            raw: Bytes::from(input.raw),
            rest: input.rest,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    Bytes { little: bool, data: &'a [u8] },
    Record { little: bool, sample: SampleInput },
}

fn codec(little: bool) -> Codec {
    let endian = if little { Endian::Little } else { Endian::Big };
    Codec::new(Config::default().with_endian(endian).with_strict(true))
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::Bytes { little, data } => {
            let codec = codec(little);
            let decoded = match codec.decode::<Sample>(data) {
                Ok(decoded) => decoded,
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::Data, "unexpected error: {err}");
                    return;
                }
            };

            // Anything that decodes must encode back to the same bytes
            let encoded = codec
                .encode(&decoded)
                .expect("Failed to encode a successfully decoded input!");
            assert_eq!(&encoded[..], data);
        }
        FuzzInput::Record { little, sample } => {
            let codec = codec(little);
            let sample = Sample::from(sample);
            let encoded = match codec.encode(&sample) {
                Ok(encoded) => encoded,
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::Value, "unexpected error: {err}");
                    return;
                }
            };
            assert_eq!(codec.encoded_size(&sample).unwrap(), encoded.len());

            // Re-encoding a decoded value is stable
            let decoded = codec
                .decode::<Sample>(encoded.clone())
                .expect("Failed to decode a successfully encoded input!");
            assert_eq!(codec.encode(&decoded).unwrap(), encoded);
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
