//! # Addressing
//!
//! Topic construction across lanes and the path-component rules every
//! producer and boundary relies on.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shared_types::topics::{reject_topic, topic_for, validate_path_component};
    use shared_types::{ContractError, Envelope, Lane, ScopeLevel, SignalKind};

    const LANES: [Lane; 9] = [
        Lane::Driver,
        Lane::Modulator,
        Lane::Command,
        Lane::Global,
        Lane::Error,
        Lane::Gate,
        Lane::Reflect,
        Lane::Video,
        Lane::Audio,
    ];

    #[test]
    fn test_path_component_table() {
        let cases = [
            ("living_room", true),
            ("V1", true),
            ("node-7", true),
            ("a_b-C_9", true),
            ("", false),
            ("..", false),
            ("a/b", false),
            ("a\\b", false),
            ("living room", false),
            ("caf\u{e9}", false),
            ("x.y", false),
        ];

        for (value, valid) in cases {
            assert_eq!(
                validate_path_component("scope", value).is_ok(),
                valid,
                "unexpected verdict for {value:?}"
            );
        }
    }

    /// Address-sensitive lanes need a nucleus; the rest never do; media
    /// lanes have no topic at all.
    #[test]
    fn test_nucleus_requirement_per_lane() {
        for lane in LANES {
            let mut env = Envelope::new(lane, SignalKind::Driver, ScopeLevel::Room, "living_room", 1);
            let topic = topic_for(&env);

            match lane {
                Lane::Video | Lane::Audio => {
                    assert!(matches!(topic, Err(ContractError::MediaLaneNotRoutable { .. })));
                }
                lane if lane.is_address_sensitive() => {
                    assert!(matches!(topic, Err(ContractError::MissingNucleus { .. })));
                    env.nucleus = Some("lgn".into());
                    assert!(topic_for(&env).unwrap().ends_with("/nucleus/lgn"));
                }
                _ => assert!(topic.is_ok(), "{lane:?} should not need a nucleus"),
            }
        }
    }

    #[test]
    fn test_reject_topic_for_living_room() {
        assert_eq!(
            reject_topic(ScopeLevel::Room, "living_room").unwrap(),
            "/X/reflect/room/living_room/lane/reject"
        );
    }

    proptest! {
        #[test]
        fn prop_valid_components_accepted(value in "[a-zA-Z0-9_-]{1,32}") {
            prop_assert!(validate_path_component("nucleus", &value).is_ok());
        }

        #[test]
        fn prop_separator_always_rejected(left in "[a-z]{0,8}", right in "[a-z]{0,8}", sep in "[/\\\\]") {
            let value = format!("{left}{sep}{right}");
            prop_assert!(validate_path_component("nucleus", &value).is_err());
        }

        #[test]
        fn prop_driver_topic_shape(scope in "[a-z_]{1,16}", nucleus in "[a-z0-9]{1,8}") {
            let env = Envelope::driver(ScopeLevel::House, scope.clone(), nucleus.clone(), 0);
            prop_assert_eq!(
                topic_for(&env).unwrap(),
                format!("/A/driver/house/{scope}/nucleus/{nucleus}")
            );
        }
    }
}
