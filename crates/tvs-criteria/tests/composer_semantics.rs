use std::collections::BTreeSet;

use serde_json::json;
use tvs_core::{EntityId, ErrorKind};
use tvs_criteria::{select, CriteriaBlock, Predicate, TargetingCriteria};
use tvs_fields::Operator;

mod fixtures;

use fixtures::{catalog, household, person};

fn ids(raw: &[&str]) -> BTreeSet<EntityId> {
    raw.iter().map(|id| EntityId::new(*id)).collect()
}

#[test]
fn empty_criteria_selects_everyone() {
    let population = vec![
        household("HH-1", 2, "North"),
        household("HH-2", 7, "South"),
        household("HH-3", 4, "East"),
    ];
    let selected = select(&TargetingCriteria::default(), &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1", "HH-2", "HH-3"]));
}

#[test]
fn blocks_are_or_of_and() {
    let population = vec![
        household("HH-1", 8, "North"),
        household("HH-2", 8, "South"),
        household("HH-3", 2, "South").with_attribute("has_latrine", json!(false)),
        household("HH-4", 2, "West"),
    ];
    let criteria = TargetingCriteria {
        household_blocks: vec![
            CriteriaBlock::household(vec![
                Predicate::new("size", Operator::Gte, vec![json!(5)]),
                Predicate::new("village", Operator::Equals, vec![json!("North")]),
            ]),
            CriteriaBlock::household(vec![Predicate::new(
                "has_latrine",
                Operator::Equals,
                vec![json!(false)],
            )]),
        ],
        ..TargetingCriteria::default()
    };
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1", "HH-3"]));
}

#[test]
fn individual_blocks_need_one_matching_member() {
    let population = vec![
        household("HH-1", 3, "North")
            .with_member(person("I-1", 34, "MALE"), true)
            .with_member(person("I-2", 4, "FEMALE"), false),
        household("HH-2", 3, "North").with_member(person("I-3", 40, "FEMALE"), true),
        household("HH-3", 1, "South").with_member(person("I-4", 3, "MALE"), true),
        household("HH-4", 0, "North"),
    ];
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "village",
            Operator::Equals,
            vec![json!("North")],
        )])],
        individual_blocks: vec![CriteriaBlock::individual(vec![Predicate::new(
            "age",
            Operator::Lte,
            vec![json!(5)],
        )])],
        ..TargetingCriteria::default()
    };
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1"]));
}

#[test]
fn individual_blocks_alone_restrict_by_members() {
    let population = vec![
        household("HH-1", 3, "North").with_member(person("I-1", 70, "FEMALE"), true),
        household("HH-2", 3, "North").with_member(person("I-2", 30, "FEMALE"), true),
    ];
    let criteria = TargetingCriteria {
        individual_blocks: vec![CriteriaBlock::individual(vec![Predicate::new(
            "age",
            Operator::Gte,
            vec![json!(60)],
        )])],
        ..TargetingCriteria::default()
    };
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1"]));
}

#[test]
fn explicit_ids_and_exclusions() {
    let population = vec![
        household("HH-1", 9, "North"),
        household("HH-2", 1, "North"),
        household("HH-3", 9, "South"),
    ];
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "size",
            Operator::Gte,
            vec![json!(5)],
        )])],
        household_ids: ids(&["HH-2"]),
        excluded_household_ids: ids(&["HH-3"]),
        ..TargetingCriteria::default()
    };
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1", "HH-2"]));

    let only_ids = TargetingCriteria {
        household_ids: ids(&["HH-3", "HH-404"]),
        ..TargetingCriteria::default()
    };
    let selected = select(&only_ids, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-3"]));
}

#[test]
fn missing_round_never_matches_and_never_fails() {
    let population = vec![
        household("HH-1", 2, "North").with_round("water_score", 1, json!(10)),
        household("HH-2", 2, "North").with_round("water_score", 2, json!(10)),
        household("HH-3", 2, "North"),
    ];
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "water_score",
            Operator::Lte,
            vec![json!(50)],
        )
        .in_round(2)])],
        ..TargetingCriteria::default()
    };
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-2"]));

    let later_round = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "water_score",
            Operator::Gte,
            vec![json!(0)],
        )
        .in_round(3)])],
        ..TargetingCriteria::default()
    };
    let selected = select(&later_round, &population, &catalog()).expect("select");
    assert!(selected.is_empty());
}

#[test]
fn first_error_aborts_selection() {
    let population = vec![
        household("HH-1", 2, "North"),
        household("HH-2", 2, "North").with_attribute("size", json!("two")),
        household("HH-3", 2, "North"),
    ];
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "size",
            Operator::Gte,
            vec![json!(1)],
        )])],
        ..TargetingCriteria::default()
    };
    let err = select(&criteria, &population, &catalog()).expect_err("abort");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.info().context["record"], "HH-2");
}

#[test]
fn invalid_criteria_fail_even_without_population() {
    let unknown = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "income",
            Operator::Gte,
            vec![json!(1)],
        )])],
        ..TargetingCriteria::default()
    };
    assert_eq!(
        select(&unknown, &[], &catalog()).expect_err("unknown").kind(),
        ErrorKind::NotFound
    );

    let wrong_scope = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "age",
            Operator::Gte,
            vec![json!(1)],
        )])],
        ..TargetingCriteria::default()
    };
    let err = select(&wrong_scope, &[], &catalog()).expect_err("scope");
    assert_eq!(err.info().code, "field_scope_mismatch");

    let misplaced = TargetingCriteria {
        individual_blocks: vec![CriteriaBlock::household(vec![])],
        ..TargetingCriteria::default()
    };
    let err = select(&misplaced, &[], &catalog()).expect_err("kind");
    assert_eq!(err.info().code, "block_kind_mismatch");

    let reversed = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "size",
            Operator::Between,
            vec![json!(10), json!(1)],
        )])],
        ..TargetingCriteria::default()
    };
    assert_eq!(
        select(&reversed, &[], &catalog()).expect_err("range").kind(),
        ErrorKind::InvalidRange
    );
}

#[test]
fn criteria_deserialize_from_boundary_json() {
    let raw = json!({
        "household_blocks": [
            {"kind": "HOUSEHOLD", "predicates": [
                {"field_name": "residence_status", "operator": "IN",
                 "arguments": ["IDP", "REFUGEE"]}
            ]}
        ],
        "individual_blocks": [
            {"kind": "INDIVIDUAL", "predicates": [
                {"field_name": "muac", "operator": "BETWEEN",
                 "arguments": [0, 11.5], "round_number": 1}
            ]}
        ]
    });
    let criteria: TargetingCriteria = serde_json::from_value(raw).expect("criteria");
    let population = vec![
        household("HH-1", 4, "North")
            .with_attribute("residence_status", json!("IDP"))
            .with_member(
                person("I-1", 2, "MALE").with_round("muac", 1, json!(11.0)),
                false,
            ),
        household("HH-2", 4, "North")
            .with_attribute("residence_status", json!("HOST"))
            .with_member(
                person("I-2", 2, "MALE").with_round("muac", 1, json!(10.0)),
                false,
            ),
    ];
    let selected = select(&criteria, &population, &catalog()).expect("select");
    assert_eq!(selected, ids(&["HH-1"]));
}
