// colonycore-core/tests/property_laws.rs
// ============================================================================
// Module: Core Property-Based Tests
// Description: Property tests for the encode/decode round-trip law and the
// extension container's deep-clone isolation guarantee, across randomly
// generated entity fields and payloads.
// Purpose: Detect round-trip and aliasing regressions across wide input
// ranges, not just the hand-picked cases the colocated unit tests cover.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use colonycore_core::Base;
use colonycore_core::Container;
use colonycore_core::EntityCodec;
use colonycore_core::Hook;
use colonycore_core::Organism;
use colonycore_core::OrganismStage;
use colonycore_core::PluginId;
use colonycore_core::Timestamp;
use colonycore_core::dedupe_ids;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

fn organism_stage_strategy() -> impl Strategy<Value = OrganismStage> {
    prop_oneof![
        Just(OrganismStage::Planned),
        Just(OrganismStage::EmbryoLarva),
        Just(OrganismStage::Juvenile),
        Just(OrganismStage::Adult),
        Just(OrganismStage::Retired),
        Just(OrganismStage::Deceased),
    ]
}

fn json_object_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        ".*".prop_map(Value::String),
    ];

    let tree = leaf.prop_recursive(max_depth, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|map| {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key, value);
                }
                Value::Object(object)
            }),
        ]
    });

    prop::collection::btree_map("[a-z]{1,8}", tree, 0..6).prop_map(|map| {
        let mut object = serde_json::Map::new();
        for (key, value) in map {
            object.insert(key, value);
        }
        Value::Object(object)
    })
}

fn organism_with(name: String, species: String, stage: OrganismStage, attributes: Value) -> Organism {
    let mut organism = Organism {
        base: Base::placeholder(),
        name,
        species,
        line: "wild-type".to_string(),
        stage,
        cohort_id: None,
        housing_id: None,
        protocol_id: None,
        project_id: None,
        extensions: Container::new(),
    };
    organism.base.id = "O1".to_string();
    organism.extensions.set(Hook::parse("entity.organism.attributes").expect("known hook"), &PluginId::core(), attributes).expect("object shape");
    organism
}

proptest! {
    /// Round-trip law (spec. 8): `Decode(Encode(E)) == E` for every entity.
    #[test]
    fn organism_round_trips_through_encode_decode(
        name in ".{0,16}",
        species in ".{0,16}",
        stage in organism_stage_strategy(),
        attributes in json_object_strategy(2),
    ) {
        let organism = organism_with(name, species, stage, attributes);
        let encoded = organism.encode();
        let decoded = Organism::decode(&encoded).expect("round-trip decode succeeds");
        prop_assert_eq!(decoded, organism);
    }

    /// Extension container law (spec. 8): a payload set via `Set(h,p,v)`
    /// returned by a later `Get(h,p)` is JSON-equal to `v` regardless of
    /// mutations to the caller's copy of `v` after `Set`.
    #[test]
    fn container_get_is_isolated_from_post_set_mutation(
        mut payload in json_object_strategy(2),
        extra_key in "[a-z]{1,8}",
    ) {
        let hook = Hook::parse("entity.organism.attributes").expect("known hook");
        let plugin = PluginId::new("frog-plugin");
        let mut container = Container::new();
        let original = payload.clone();
        container.set(hook, &plugin, payload.clone()).expect("object shape accepted");

        if let Value::Object(map) = &mut payload {
            map.insert(extra_key, json!("mutated-after-set"));
        }

        let (stored, present) = container.get(hook, &plugin);
        prop_assert!(present);
        prop_assert_eq!(stored, original);
    }

    /// Id-list dedup (spec. 9, Open Questions): deduping is idempotent and
    /// preserves first-occurrence order regardless of how many duplicates
    /// are interleaved.
    #[test]
    fn dedupe_ids_is_idempotent_and_order_preserving(ids in prop::collection::vec("[a-z]{1,4}", 0..12)) {
        let once = dedupe_ids(ids.clone());
        let twice = dedupe_ids(once.clone());
        prop_assert_eq!(&once, &twice);

        let mut seen = std::collections::BTreeSet::new();
        let mut expected = Vec::new();
        for id in &ids {
            if seen.insert(id.clone()) {
                expected.push(id.clone());
            }
        }
        prop_assert_eq!(once, expected);
    }

    /// Timestamp ordering invariant: a `Base` built at one instant never
    /// reports `updated_at` preceding `created_at`.
    #[test]
    fn base_placeholder_never_has_created_after_updated(_seed in any::<u8>()) {
        let base = Base::placeholder();
        prop_assert!(base.created_at <= base.updated_at);
        let _ = Timestamp::now();
    }
}
