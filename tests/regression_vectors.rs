use dvpl::DvplError;

#[derive(Debug)]
struct Vector {
    name: String,
    outcome: String,
    container: Vec<u8>,
    original: Vec<u8>,
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
                outcome: parts[1].to_string(),
                container: hex_to_bytes(parts[2]),
                original: hex_to_bytes(parts[3]),
            }
        })
        .collect()
}

fn error_name(e: &DvplError) -> &'static str {
    match e {
        DvplError::Truncated { .. } => "Truncated",
        DvplError::InvalidMagic { .. } => "InvalidMagic",
        DvplError::SizeMismatch { .. } => "SizeMismatch",
        DvplError::ChecksumMismatch { .. } => "ChecksumMismatch",
        DvplError::StoredSizeMismatch { .. } => "StoredSizeMismatch",
        DvplError::DecodedSizeMismatch { .. } => "DecodedSizeMismatch",
        DvplError::UnknownType(_) => "UnknownType",
        DvplError::Compression(_) => "Compression",
        DvplError::TooLarge(_) => "TooLarge",
    }
}

#[test]
fn vector_database_is_non_empty() {
    let vectors = load_vectors();
    assert!(!vectors.is_empty());
    assert!(vectors.iter().any(|v| v.outcome == "ok"));
    assert!(vectors.iter().any(|v| v.outcome != "ok"));
}

#[test]
fn decode_all_vectors() {
    for v in load_vectors() {
        match (v.outcome.as_str(), dvpl::decode(&v.container)) {
            ("ok", Ok(decoded)) => assert_eq!(decoded, v.original, "vector {}", v.name),
            ("ok", Err(e)) => panic!("vector {}: unexpected error {e}", v.name),
            (expected, Ok(_)) => panic!("vector {}: expected {expected}, decoded fine", v.name),
            (expected, Err(e)) => assert_eq!(error_name(&e), expected, "vector {}", v.name),
        }
    }
}

#[test]
fn valid_vectors_reencode_to_decodable_containers() {
    for v in load_vectors().into_iter().filter(|v| v.outcome == "ok") {
        let packed = dvpl::encode(&v.original).unwrap();
        assert_eq!(dvpl::decode(&packed).unwrap(), v.original, "vector {}", v.name);
    }
}
