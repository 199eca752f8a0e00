use chrono::{TimeZone, Utc};
use serde_json::json;
use tvs_core::{AreaId, EntityId, ErrorKind};
use tvs_criteria::{CriteriaBlock, EntityRecord, Household, Predicate, TargetingCriteria};
use tvs_fields::source::from_yaml_slice;
use tvs_fields::{FieldCatalog, FieldRegistry, FieldSource, Operator};
use tvs_plan::{build, build_at, PlanAssembler};
use tvs_sampling::{AgeFilter, PlanStatus, SamplingParameters, SexFilter};

const FIELDS: &str = r#"
fields:
  - name: size
    kind: CORE
    value_type: NUMBER
  - name: village
    kind: CORE
    value_type: STRING
  - name: food_score
    kind: PERIODIC
    pdu_data:
      subtype: NUMBER
      number_of_rounds: 2
      rounds_names: [baseline, endline]
  - name: age
    kind: CORE
    value_type: NUMBER
    associated_with: INDIVIDUAL
  - name: sex
    kind: CORE
    value_type: CHOICE
    associated_with: INDIVIDUAL
    choices:
      - { value: MALE, label: Male }
      - { value: FEMALE, label: Female }
"#;

fn source() -> FieldSource {
    from_yaml_slice(FIELDS.as_bytes()).expect("field source")
}

fn catalog() -> FieldCatalog {
    source().into_catalog().expect("catalog")
}

fn population(count: usize) -> Vec<Household> {
    (0..count)
        .map(|idx| {
            let head = EntityRecord::new(format!("IND-{idx:04}").as_str())
                .with_attribute("age", json!(20 + (idx % 50)))
                .with_attribute("sex", json!(if idx % 3 == 0 { "MALE" } else { "FEMALE" }));
            Household::new(format!("HH-{idx:04}").as_str())
                .in_area(format!("AREA-{}", idx % 4).as_str())
                .with_attribute("size", json!(1 + idx % 9))
                .with_attribute("village", json!(if idx % 2 == 0 { "North" } else { "South" }))
                .with_round("food_score", 1, json!(idx % 40))
                .with_member(head, true)
        })
        .collect()
}

fn large_households() -> TargetingCriteria {
    TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "size",
            Operator::Gte,
            vec![json!(5)],
        )])],
        ..TargetingCriteria::default()
    }
}

#[test]
fn full_list_plan_covers_the_selection() {
    let households = population(90);
    let plan = build(
        &large_households(),
        &SamplingParameters::full_list(),
        &households,
        &catalog(),
    )
    .expect("plan");
    let expected: Vec<EntityId> = households
        .iter()
        .filter(|household| household.attributes["size"].as_u64().unwrap_or(0) >= 5)
        .map(|household| household.id.clone())
        .collect();
    assert_eq!(plan.eligible_population_size(), expected.len());
    assert_eq!(plan.sampled_ids(), expected.as_slice());
    assert_eq!(plan.status(), PlanStatus::Draft);
    assert_eq!(
        plan.criteria().expect("echo")["household_blocks"][0]["predicates"][0]["field_name"],
        "size"
    );
}

#[test]
fn random_plan_respects_invariants_and_exclusions() {
    let households = population(1200);
    let mut sampling = SamplingParameters::random(95, 10.0, 42);
    sampling.excluded_admin_areas = [AreaId::new("AREA-1")].into_iter().collect();
    sampling.excluded_record_ids = [EntityId::new("HH-0004"), EntityId::new("HH-0008")]
        .into_iter()
        .collect();
    let criteria = TargetingCriteria {
        excluded_household_ids: [EntityId::new("HH-0000")].into_iter().collect(),
        ..TargetingCriteria::default()
    };
    let plan = build(&criteria, &sampling, &households, &catalog()).expect("plan");
    assert!(plan.sample_size() >= 1);
    assert!(plan.sample_size() <= plan.eligible_population_size());
    assert_eq!(plan.stratification().received, 1199);
    assert_eq!(plan.stratification().removed_by_id, 2);
    for id in plan.sampled_ids() {
        assert!(!sampling.excluded_record_ids.contains(id));
        assert_ne!(id.as_str(), "HH-0000");
        let household = households.iter().find(|h| &h.id == id).expect("household");
        assert_ne!(household.admin_area, Some(AreaId::new("AREA-1")));
    }
}

#[test]
fn head_of_household_drives_stratification() {
    let households = vec![
        Household::new("HH-A").with_member(
            EntityRecord::new("P-A")
                .with_attribute("age", json!(35))
                .with_attribute("sex", json!("FEMALE")),
            true,
        ),
        Household::new("HH-B").with_member(
            EntityRecord::new("P-B")
                .with_attribute("age", json!(70))
                .with_attribute("sex", json!("FEMALE")),
            true,
        ),
        Household::new("HH-C").with_member(
            EntityRecord::new("P-C")
                .with_attribute("age", json!(35))
                .with_attribute("sex", json!("MALE")),
            true,
        ),
        Household::new("HH-D").with_member(
            EntityRecord::new("P-D")
                .with_attribute("age", json!(35))
                .with_attribute("sex", json!("FEMALE")),
            false,
        ),
    ];
    let mut sampling = SamplingParameters::full_list();
    sampling.age_filter = Some(AgeFilter { min: 18, max: 60 });
    sampling.sex_filter = Some(SexFilter::Female);
    let plan = build(&TargetingCriteria::default(), &sampling, &households, &catalog())
        .expect("plan");
    assert_eq!(plan.sampled_ids(), &[EntityId::new("HH-A")]);
    assert_eq!(plan.stratification().removed_by_age, 2);
    assert_eq!(plan.stratification().removed_by_sex, 1);
}

#[test]
fn empty_selection_yields_empty_plan() {
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "village",
            Operator::Equals,
            vec![json!("Nowhere")],
        )])],
        ..TargetingCriteria::default()
    };
    let plan = build(
        &criteria,
        &SamplingParameters::random(99, 5.0, 1),
        &population(30),
        &catalog(),
    )
    .expect("plan");
    assert_eq!(plan.eligible_population_size(), 0);
    assert_eq!(plan.sample_size(), 0);
    assert!(plan.sampled_ids().is_empty());
}

#[test]
fn bad_criteria_fail_even_without_population() {
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "income",
            Operator::Gte,
            vec![json!(10)],
        )])],
        ..TargetingCriteria::default()
    };
    let err = build(&criteria, &SamplingParameters::full_list(), &[], &catalog())
        .expect_err("unknown field");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn bad_sampling_parameters_fail_before_selection() {
    let err = build(
        &TargetingCriteria::default(),
        &SamplingParameters::random(95, 150.0, 0),
        &population(5),
        &catalog(),
    )
    .expect_err("margin");
    assert_eq!(err.kind(), ErrorKind::InvalidSamplingParameters);
}

#[test]
fn periodic_round_without_value_is_not_selected() {
    let criteria = TargetingCriteria {
        household_blocks: vec![CriteriaBlock::household(vec![Predicate::new(
            "food_score",
            Operator::Gte,
            vec![json!(0)],
        )
        .in_round(2)])],
        ..TargetingCriteria::default()
    };
    let plan = build(
        &criteria,
        &SamplingParameters::full_list(),
        &population(10),
        &catalog(),
    )
    .expect("plan");
    assert_eq!(plan.eligible_population_size(), 0);
}

#[test]
fn rebuilding_is_byte_identical() {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let households = population(400);
    let sampling = SamplingParameters::random(97, 5.0, 1234);
    let first = build_at(&large_households(), &sampling, &households, &catalog(), created_at)
        .expect("first");
    let second = build_at(&large_households(), &sampling, &households, &catalog(), created_at)
        .expect("second");
    assert_eq!(
        tvs_core::serde::to_canonical_json_bytes(&first).expect("first bytes"),
        tvs_core::serde::to_canonical_json_bytes(&second).expect("second bytes")
    );
}

#[test]
fn assembler_uses_registry_snapshot() {
    let registry = FieldRegistry::from_source(&source()).expect("registry");
    let assembler = PlanAssembler::new(registry.clone());
    let plan = assembler
        .build(&large_households(), &SamplingParameters::full_list(), &population(20))
        .expect("plan");
    assert!(plan.eligible_population_size() > 0);

    let mut reduced = source();
    reduced.fields.retain(|field| field.name != "size");
    registry.reload(&reduced).expect("reload");
    let err = assembler
        .build(&large_households(), &SamplingParameters::full_list(), &population(20))
        .expect_err("size removed");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
