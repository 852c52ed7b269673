//! Property-based tests for the memory store using proptest.
//!
//! These tests check invariants that must hold for arbitrary inputs:
//!
//! - Sanitized filenames are always a single, well-formed path component
//! - The codec returns record bodies byte-for-byte
//! - A created record reads back with the same metadata, body and tier
//! - Compression selection never includes a goal or rule

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tempfile::tempdir;

    use crate::memory::codec::{decode, encode};
    use crate::memory::naming::{sanitize_filename, validate_filename};
    use crate::memory::store::FileMemoryStore;
    use crate::memory::types::{NewRecord, RecordMeta, RecordType, Tier};

    fn tier() -> impl Strategy<Value = Tier> {
        prop::sample::select(Tier::ALL.to_vec())
    }

    fn record_type() -> impl Strategy<Value = RecordType> {
        prop_oneof![
            Just(RecordType::Memory),
            Just(RecordType::Goal),
            Just(RecordType::Rule),
        ]
    }

    // =========================================================================
    // Naming
    // =========================================================================

    proptest! {
        /// Filenames only contain lowercase letters, digits and underscores
        /// before the extension.
        #[test]
        fn sanitized_filename_is_well_formed(title in ".*") {
            let filename = sanitize_filename(&title);
            prop_assert!(filename.ends_with(".md"));

            let stem = &filename[..filename.len() - 3];
            prop_assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!stem.contains("__"), "runs must collapse: {}", filename);
            prop_assert!(validate_filename(&filename).is_ok());
        }

        /// Case never affects the derived filename.
        #[test]
        fn sanitize_ignores_ascii_case(title in "[a-zA-Z0-9 ]{0,40}") {
            prop_assert_eq!(
                sanitize_filename(&title.to_uppercase()),
                sanitize_filename(&title.to_lowercase())
            );
        }
    }

    // =========================================================================
    // Codec
    // =========================================================================

    proptest! {
        /// Arbitrary UTF-8 bodies and titles survive encoding.
        #[test]
        fn codec_preserves_body_and_meta(
            title in "[a-zA-Z0-9 ,.:#!?'\"&*-]{0,30}",
            body in "\\PC*(\n\\PC*){0,5}",
            tier in tier(),
            record_type in record_type(),
            tags in prop::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let mut meta = RecordMeta::new(title, record_type, tier);
            meta.tags = tags;
            let path = std::path::Path::new("prop.md");

            let encoded = encode(&meta, &body, path).unwrap();
            let (decoded_meta, decoded_body) = decode(&encoded, path).unwrap();

            prop_assert_eq!(decoded_meta, meta);
            prop_assert_eq!(decoded_body, body);
        }
    }

    // =========================================================================
    // Store
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Whatever goes into create comes back out of read.
        #[test]
        fn create_then_read_round_trips(
            title in "[a-zA-Z0-9 ,.:#!?'\"&*-]{0,30}",
            body in "\\PC*(\n\\PC*){0,5}",
            tier in tier(),
            record_type in record_type(),
            tags in prop::collection::vec("[a-z]{1,8}", 0..4),
            related in prop::collection::vec("[a-z_]{1,8}\\.md", 0..3),
        ) {
            let dir = tempdir().unwrap();
            let store = FileMemoryStore::open_at(dir.path()).unwrap();

            let placement = store
                .create(
                    NewRecord::new(title.clone(), body.clone())
                        .with_tier(tier)
                        .with_type(record_type)
                        .with_tags(tags.clone())
                        .with_related(related.clone()),
                )
                .unwrap();
            prop_assert_eq!(&placement.filename, &sanitize_filename(&title));
            prop_assert_eq!(placement.tier, tier);

            let record = store.read(&placement.filename, None).unwrap();
            prop_assert_eq!(record.location, tier);
            prop_assert_eq!(record.content, body);
            prop_assert_eq!(record.meta.title, title);
            prop_assert_eq!(record.meta.tags, tags);
            prop_assert_eq!(record.meta.related, related);
            prop_assert_eq!(record.meta.record_type, record_type);
            prop_assert_eq!(record.meta.tier, tier);
            prop_assert_eq!(record.meta.protected, record_type.is_protected());
            prop_assert_eq!(record.meta.created_at, record.meta.updated_at);
            prop_assert!(record.meta.extra.is_empty());
        }

        /// Compression selection covers exactly the unprotected records of a tier.
        #[test]
        fn compression_never_selects_protected(
            entries in prop::collection::vec((record_type(), tier()), 1..8),
            target in tier(),
        ) {
            let dir = tempdir().unwrap();
            let store = FileMemoryStore::open_at(dir.path()).unwrap();

            let mut expected = Vec::new();
            for (i, (record_type, tier)) in entries.iter().enumerate() {
                let placement = store
                    .create(
                        NewRecord::new(format!("Note {}", i), "body")
                            .with_type(*record_type)
                            .with_tier(*tier),
                    )
                    .unwrap();
                if *tier == target && !record_type.is_protected() {
                    expected.push(placement.filename);
                }
            }

            let mut selected = store.compression_candidates(target).unwrap().files;
            selected.sort();
            expected.sort();
            prop_assert_eq!(selected, expected);
        }
    }
}
