// system-tests/tests/suites/extension_round_trip.rs
// ============================================================================
// Suite: Extension Round Trip
// Description: An entity's extension payloads survive an encode/decode
// cycle unchanged, and decoding twice never shares mutable state.
// ============================================================================

use colonycore_core::EntityCodec;
use colonycore_core::Organism;
use colonycore_core::OrganismStage;
use colonycore_core::PluginId;

use crate::helpers;

#[test]
fn organism_attributes_round_trip_through_encode_decode() {
    let mut organism = helpers::organism("O1", "H1", OrganismStage::Adult);
    organism
        .extensions
        .set(
            colonycore_core::extension::HOOK_ORGANISM_ATTRIBUTES,
            &PluginId::core(),
            serde_json::json!({"color_morph": "albino"}),
        )
        .expect("core payload matches the organism attributes hook's shape");

    let encoded = organism.encode();
    let decoded = Organism::decode(&encoded).expect("decode succeeds");
    assert_eq!(decoded, organism);

    let decoded_twice = Organism::decode(&encoded).expect("decode succeeds again");
    assert_eq!(decoded, decoded_twice);
}

#[test]
fn an_undefined_core_attributes_bag_round_trips_as_undefined() {
    let organism = helpers::organism("O1", "H1", OrganismStage::Adult);
    assert!(organism.extensions.is_empty(), "freshly built organism carries no extension payload");

    let encoded = organism.encode();
    assert!(
        encoded.as_object().expect("object").get("attributes").is_none(),
        "an undefined Core attributes bag must be omitted from the wire form, not emitted as {{}}"
    );

    let decoded = Organism::decode(&encoded).expect("decode succeeds");
    assert_eq!(decoded, organism);
    assert!(decoded.extensions.is_empty(), "decoding must not promote an undefined bag to defined-empty");
}

#[test]
fn mutating_a_decoded_copy_never_affects_a_second_decode() {
    let mut organism = helpers::organism("O1", "H1", OrganismStage::Adult);
    organism
        .extensions
        .set(
            colonycore_core::extension::HOOK_ORGANISM_ATTRIBUTES,
            &PluginId::core(),
            serde_json::json!({"color_morph": "albino"}),
        )
        .expect("core payload matches the organism attributes hook's shape");
    let encoded = organism.encode();

    let mut first = Organism::decode(&encoded).expect("first decode");
    let second = Organism::decode(&encoded).expect("second decode");

    first.name = "mutated".to_string();
    assert_ne!(first.name, second.name, "decoded copies must not alias");
    assert_eq!(second.name, organism.name);
}
