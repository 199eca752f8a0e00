use chrono::{TimeZone, Utc};
use serde_json::json;
use tvs_core::{AreaId, EntityId, ErrorKind};
use tvs_sampling::{
    plan, plan_with_context, AgeFilter, PlanContext, PlanStatus, SamplingCandidate,
    SamplingParameters, Sex, SexFilter,
};

fn population(count: usize) -> Vec<SamplingCandidate> {
    (0..count)
        .map(|idx| SamplingCandidate {
            id: EntityId::new(format!("HH-{idx:05}")),
            age: Some(18 + (idx % 60) as u32),
            sex: Some(if idx % 2 == 0 { Sex::Female } else { Sex::Male }),
            admin_area: Some(AreaId::new(format!("AREA-{}", idx % 5))),
        })
        .collect()
}

fn context() -> PlanContext {
    PlanContext {
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        criteria: None,
    }
}

#[test]
fn full_list_takes_everyone_in_id_order() {
    for count in [0usize, 1, 17, 250] {
        let mut eligible = population(count);
        eligible.reverse();
        let built = plan(&SamplingParameters::full_list(), &eligible).expect("plan");
        assert_eq!(built.sample_size(), built.eligible_population_size());
        assert_eq!(built.sample_size(), count);
        let mut sorted = built.sampled_ids().to_vec();
        sorted.sort();
        assert_eq!(sorted, built.sampled_ids());
    }
}

#[test]
fn random_regression_scenario() {
    let params = SamplingParameters::random(95, 10.0, 2024);
    let built = plan(&params, &population(1000)).expect("plan");
    assert_eq!(built.eligible_population_size(), 1000);
    assert_eq!(built.sample_size(), 88);
    assert_eq!(built.sampled_ids().len(), 88);
    assert_eq!(built.status(), PlanStatus::Draft);
}

#[test]
fn random_selection_is_reproducible() {
    let params = SamplingParameters::random(99, 5.0, 77);
    let eligible = population(500);
    let first = plan_with_context(&params, &eligible, context()).expect("first");
    let second = plan_with_context(&params, &eligible, context()).expect("second");
    assert_eq!(first.sampled_ids(), second.sampled_ids());
    assert_eq!(
        tvs_core::serde::to_canonical_json_bytes(&first).expect("bytes"),
        tvs_core::serde::to_canonical_json_bytes(&second).expect("bytes")
    );

    let reseeded = SamplingParameters::random(99, 5.0, 78);
    let third = plan_with_context(&reseeded, &eligible, context()).expect("third");
    assert_eq!(third.sample_size(), first.sample_size());
    assert_ne!(third.sampled_ids(), first.sampled_ids());
}

#[test]
fn input_order_does_not_change_sample() {
    let params = SamplingParameters::random(95, 5.0, 5);
    let eligible = population(300);
    let mut shuffled = eligible.clone();
    shuffled.reverse();
    let a = plan_with_context(&params, &eligible, context()).expect("a");
    let b = plan_with_context(&params, &shuffled, context()).expect("b");
    assert_eq!(a.sampled_ids(), b.sampled_ids());
}

#[test]
fn empty_random_population_is_not_an_error() {
    let built = plan(&SamplingParameters::random(95, 5.0, 1), &[]).expect("plan");
    assert_eq!(built.eligible_population_size(), 0);
    assert_eq!(built.sample_size(), 0);
    assert!(built.sampled_ids().is_empty());
}

#[test]
fn single_candidate_is_always_sampled() {
    let built = plan(&SamplingParameters::random(90, 100.0, 3), &population(1)).expect("plan");
    assert_eq!(built.sample_size(), 1);
}

#[test]
fn invalid_parameters_create_no_plan() {
    let eligible = population(10);
    for params in [
        SamplingParameters::random(95, 0.0, 0),
        SamplingParameters::random(95, 150.0, 0),
        SamplingParameters::random(80, 5.0, 0),
    ] {
        let err = plan(&params, &eligible).expect_err("invalid");
        assert_eq!(err.kind(), ErrorKind::InvalidSamplingParameters);
    }
    let mut missing = SamplingParameters::random(95, 5.0, 0);
    missing.margin_of_error = None;
    let err = plan(&missing, &eligible).expect_err("missing margin");
    assert_eq!(err.info().context["parameter"], "margin_of_error");

    let mut reversed_age = SamplingParameters::full_list();
    reversed_age.age_filter = Some(AgeFilter { min: 60, max: 18 });
    assert!(plan(&reversed_age, &eligible).is_err());
}

#[test]
fn stratified_random_plan() {
    let mut params = SamplingParameters::random(95, 10.0, 9);
    params.sex_filter = Some(SexFilter::Female);
    params.age_filter = Some(AgeFilter { min: 20, max: 40 });
    params.excluded_admin_areas = [AreaId::new("AREA-0")].into_iter().collect();
    let eligible = population(2000);
    let built = plan(&params, &eligible).expect("plan");
    let report = built.stratification();
    assert_eq!(report.received, 2000);
    assert_eq!(
        built.eligible_population_size(),
        2000 - report.removed_by_age - report.removed_by_sex - report.removed_by_area
    );
    for id in built.sampled_ids() {
        let candidate = eligible.iter().find(|c| &c.id == id).expect("candidate");
        assert_eq!(candidate.sex, Some(Sex::Female));
        assert!((20..=40).contains(&candidate.age.expect("age")));
        assert_ne!(candidate.admin_area, Some(AreaId::new("AREA-0")));
    }
}

#[test]
fn lifecycle_transitions() {
    let mut built = plan(&SamplingParameters::full_list(), &population(3)).expect("plan");
    assert!(!built.can_receive_responses());
    built.finish().expect_err("draft cannot finish");
    built.activate().expect("activate");
    assert!(built.can_receive_responses());
    built.activate().expect_err("already active");
    built.finish().expect("finish");
    assert!(built.status().is_terminal());
    let err = built.discard().expect_err("terminal");
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(err.info().context["from"], "FINISHED");

    let mut draft = plan(&SamplingParameters::full_list(), &population(3)).expect("plan");
    draft.discard().expect("discard draft");
    draft.activate().expect_err("discarded is terminal");
}

#[test]
fn provenance_records_seed_and_hashes() {
    let params = SamplingParameters::random(95, 10.0, 31);
    let with_criteria = PlanContext {
        criteria: Some(json!({"household_blocks": []})),
        ..context()
    };
    let built = plan_with_context(&params, &population(50), with_criteria).expect("plan");
    let provenance = built.provenance();
    assert_eq!(provenance.seed, 31);
    assert_eq!(provenance.created_at, built.created_at());
    assert_eq!(provenance.criteria_hash.len(), 64);
    assert_eq!(provenance.population_hash.len(), 64);
    assert!(built.criteria().is_some());
}

#[test]
fn parameters_deserialize_from_boundary_json() {
    let params: SamplingParameters = serde_json::from_value(json!({
        "type": "RANDOM",
        "confidence_interval": 95,
        "margin_of_error": 10,
        "sex_filter": "ALL",
        "age_filter": {"min": 0, "max": 120},
        "excluded_admin_areas": ["AREA-1"],
        "excluded_record_ids": ["HH-00001"],
        "seed": 4
    }))
    .expect("params");
    assert_eq!(params.validate().expect("valid"), Some((95, 10.0)));
    let built = plan(&params, &population(10)).expect("plan");
    assert!(!built.sampled_ids().contains(&EntityId::new("HH-00001")));
}

#[test]
fn plan_survives_json_roundtrip() {
    let mut built =
        plan_with_context(&SamplingParameters::random(97, 7.5, 12), &population(40), context())
            .expect("plan");
    built.activate().expect("activate");
    let bytes = tvs_core::serde::to_canonical_json_bytes(&built).expect("encode");
    let decoded: tvs_sampling::VerificationPlan =
        tvs_core::serde::from_json_slice(&bytes).expect("decode");
    assert_eq!(decoded, built);
    assert_eq!(decoded.status(), PlanStatus::Active);
}
