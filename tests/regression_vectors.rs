use lzwin::compress::{decoder, encoder};
use lzwin::config::Config;

#[derive(Debug)]
struct Vector {
    name: String,
    lookahead: usize,
    input: Vec<u8>,
    stream: Vec<u8>,
}

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    assert!(
        s.len().is_multiple_of(2),
        "hex string must have even length"
    );
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn load_vectors() -> Vec<Vector> {
    let manifest = include_str!("vectors/manifest.tsv");
    manifest
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let parts: Vec<_> = line.split('|').collect();
            assert_eq!(parts.len(), 4, "invalid vector row: {line}");
            Vector {
                name: parts[0].to_string(),
                lookahead: parts[1].parse().unwrap(),
                input: hex_to_bytes(parts[2]),
                stream: hex_to_bytes(parts[3]),
            }
        })
        .collect()
}

fn config(v: &Vector) -> Config {
    Config::default().with_lookahead(v.lookahead)
}

#[test]
fn vector_database_is_non_empty() {
    let vectors = load_vectors();
    assert!(!vectors.is_empty());
}

#[test]
fn encoder_output_is_stable() {
    for v in load_vectors() {
        let stream = encoder::encode_all(&v.input, &config(&v));
        assert_eq!(stream, v.stream, "vector {}", v.name);
    }
}

#[test]
fn decoder_reproduces_inputs() {
    for v in load_vectors() {
        let decoded = decoder::decode_all(&v.stream, &Config::default())
            .unwrap_or_else(|e| panic!("vector {}: {e}", v.name));
        assert_eq!(decoded, v.input, "vector {}", v.name);
    }
}

#[test]
fn no_vector_expands_beyond_literal_overhead() {
    for v in load_vectors() {
        let bound = v.input.len() + v.input.len().div_ceil(127);
        assert!(v.stream.len() <= bound, "vector {}", v.name);
    }
}
