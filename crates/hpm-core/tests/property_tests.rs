use hpm_core::resolve::{ResolutionContext, SeedMapping};
use hpm_core::{ConfigDocument, flatten, unflatten};
use proptest::prelude::*;

/// Documents without empty containers, so every node owns at least one leaf.
fn document() -> impl Strategy<Value = ConfigDocument> {
    let leaf = "[a-zA-Z0-9/_. ;&-]{0,12}".prop_map(ConfigDocument::Scalar);
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(ConfigDocument::Sequence),
            prop::collection::vec(("[a-zA-Z_]{1,8}", inner), 1..4)
                .prop_map(|pairs| ConfigDocument::Mapping(pairs.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn test_flatten_then_unflatten_rebuilds_document(doc in document()) {
        let entries = flatten(&doc);
        prop_assert_eq!(entries.len(), doc.leaf_count());

        let rebuilt = unflatten(&entries).unwrap();
        prop_assert_eq!(rebuilt, doc);
    }

    #[test]
    fn test_flattened_paths_are_unique(doc in document()) {
        let entries = flatten(&doc);
        let mut paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();
        paths.sort();
        paths.dedup();
        prop_assert_eq!(paths.len(), entries.len());
    }

    #[test]
    fn test_values_without_tokens_resolve_unchanged(doc in document()) {
        let entries = flatten(&doc);
        let seed = SeedMapping::new();
        let resolved = ResolutionContext::new(&seed).resolve(&entries);

        prop_assert_eq!(resolved.len(), entries.len());
        for (entry, out) in entries.iter().zip(&resolved) {
            prop_assert_eq!(&out.value, &entry.value);
            prop_assert!(out.undefined.is_empty());
        }
    }

    #[test]
    fn test_parse_accepts_its_own_serialization(doc in document()) {
        let text = serde_json::to_string(&doc).unwrap();
        prop_assert_eq!(ConfigDocument::parse(&text).unwrap(), doc);
    }
}
