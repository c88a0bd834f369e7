use super::common::*;
use crate::catalog::domain::{
    AssociationRef, CompetencyId, CompetencyInput, ConcentrationInput, GraduateCompetencyInput,
    OccupationId, OccupationInput, SchoolId, SchoolInput,
};
use crate::catalog::{
    CatalogError, CatalogService, CatalogStore, OccupationListQuery, OccupationSortKey, SchoolListQuery,
    SortOrder,
};
use std::sync::Arc;

#[test]
fn create_occupation_rejects_duplicate_code() {
    let (service, _) = build_service();
    service
        .create_occupation(occupation_input("OK-1", "Junior Programmer", &["U1"]))
        .expect("first create");

    match service.create_occupation(occupation_input("OK-1", "Other", &[])) {
        Err(CatalogError::Conflict(message)) => {
            assert_eq!(message, "Occupation code already exists")
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn create_occupation_requires_code_and_name() {
    let (service, _) = build_service();
    let err = service
        .create_occupation(OccupationInput {
            code: Some("   ".to_string()),
            name: Some("Programmer".to_string()),
            competencies: None,
        })
        .expect_err("blank code rejected");
    assert!(matches!(err, CatalogError::InvalidInput(_)));
}

#[test]
fn create_occupation_rejects_repeated_unit_codes() {
    let (service, store) = build_service();
    let err = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U1"]))
        .expect_err("duplicate unit code rejected");
    assert!(matches!(err, CatalogError::InvalidInput(_)));

    assert!(store.list_occupations().expect("list").is_empty());
}

#[test]
fn list_occupations_filters_sorts_and_pages() {
    let (service, _) = build_service();
    for (code, name) in [
        ("OK-3", "Network Technician"),
        ("OK-1", "Junior Programmer"),
        ("OK-2", "Senior Programmer"),
        ("AK-9", "Accountant"),
    ] {
        service
            .create_occupation(occupation_input(code, name, &[]))
            .expect("create");
    }

    let page = service
        .list_occupations(OccupationListQuery {
            search_name: Some("PROGRAMMER".to_string()),
            sort_by: Some(OccupationSortKey::Name),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        })
        .expect("list");
    let codes: Vec<_> = page.items.iter().map(|o| o.code.as_str()).collect();
    assert_eq!(codes, vec!["OK-2", "OK-1"]);
    assert_eq!(page.meta.total_count, 2);

    let page = service
        .list_occupations(OccupationListQuery {
            search_code: Some("ok".to_string()),
            limit: Some(2),
            page: Some(2),
            ..Default::default()
        })
        .expect("list");
    let codes: Vec<_> = page.items.iter().map(|o| o.code.as_str()).collect();
    assert_eq!(codes, vec!["OK-3"]);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.meta.current_page, 2);
}

#[test]
fn search_requires_query_and_caps_results() {
    let (service, _) = build_service();
    assert!(matches!(
        service.search_occupations(Some("  ")),
        Err(CatalogError::InvalidInput(_))
    ));
    assert!(matches!(
        service.search_occupations(None),
        Err(CatalogError::InvalidInput(_))
    ));

    for index in 0..12 {
        service
            .create_occupation(occupation_input(
                &format!("TKJ-{index:02}"),
                "Network Technician",
                &[],
            ))
            .expect("create");
    }
    service
        .create_occupation(occupation_input("RPL-1", "Web Developer", &[]))
        .expect("create");

    let hits = service.search_occupations(Some("tkj")).expect("search");
    assert_eq!(hits.len(), 10);

    let hits = service.search_occupations(Some("developer")).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "RPL-1");
}

#[test]
fn find_by_name_is_case_insensitive_exact() {
    let (service, _) = build_service();
    service
        .create_occupation(occupation_input("OK-1", "Junior Programmer", &["U1"]))
        .expect("create");

    let found = service
        .find_occupation_by_name("junior programmer")
        .expect("found");
    assert_eq!(found.code, "OK-1");
    assert_eq!(found.competencies.len(), 1);

    assert!(matches!(
        service.find_occupation_by_name("junior"),
        Err(CatalogError::NotFound("occupation"))
    ));
}

#[test]
fn update_occupation_checks_code_and_replaces_competencies() {
    let (service, _) = build_service();
    let first = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U2"]))
        .expect("create");
    service
        .create_occupation(occupation_input("OK-2", "Technician", &[]))
        .expect("create");

    let err = service
        .update_occupation(
            &first.id,
            OccupationInput {
                code: Some("OK-2".to_string()),
                ..Default::default()
            },
        )
        .expect_err("code collision rejected");
    assert!(matches!(err, CatalogError::Conflict(_)));

    let renamed = service
        .update_occupation(
            &first.id,
            OccupationInput {
                name: Some("Junior Programmer".to_string()),
                ..Default::default()
            },
        )
        .expect("rename");
    assert_eq!(renamed.code, "OK-1");
    assert_eq!(renamed.name, "Junior Programmer");
    assert_eq!(renamed.competencies.len(), 2);

    let replaced = service
        .update_occupation(
            &first.id,
            OccupationInput {
                competencies: Some(vec![competency_input("U9", "Deploy")]),
                ..Default::default()
            },
        )
        .expect("replace");
    assert_eq!(replaced.competencies.len(), 1);
    assert_eq!(replaced.competencies[0].unit_code.as_deref(), Some("U9"));
}

#[test]
fn update_missing_occupation_is_not_found() {
    let (service, _) = build_service();
    let err = service
        .update_occupation(&OccupationId("occ-missing".to_string()), Default::default())
        .expect_err("missing");
    assert!(matches!(err, CatalogError::NotFound("occupation")));
}

#[test]
fn competency_unit_codes_are_unique_per_occupation() {
    let (service, _) = build_service();
    let first = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1"]))
        .expect("create");
    let second = service
        .create_occupation(occupation_input("OK-2", "Technician", &[]))
        .expect("create");

    let err = service
        .create_competency(&first.id, competency_input("U1", "Duplicate"))
        .expect_err("duplicate unit code");
    assert!(matches!(err, CatalogError::Conflict(_)));

    let other = service
        .create_competency(&second.id, competency_input("U1", "Same unit elsewhere"))
        .expect("unit codes are scoped per occupation");
    assert_eq!(other.occupation_id, second.id);

    let without_code = service
        .create_competency(
            &first.id,
            CompetencyInput {
                unit_code: None,
                name: Some("Uncoded".to_string()),
                standard_competency: None,
            },
        )
        .expect("unit code optional");
    assert!(without_code.unit_code.is_none());
}

#[test]
fn update_competency_keeps_absent_fields_and_checks_siblings() {
    let (service, _) = build_service();
    let occupation = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U2"]))
        .expect("create");
    let u2 = unit_id(&occupation, "U2");

    let err = service
        .update_competency(
            &occupation.id,
            &u2,
            CompetencyInput {
                unit_code: Some("U1".to_string()),
                ..Default::default()
            },
        )
        .expect_err("sibling unit code");
    assert!(matches!(err, CatalogError::Conflict(_)));

    let updated = service
        .update_competency(
            &occupation.id,
            &u2,
            CompetencyInput {
                name: Some("Review code".to_string()),
                standard_competency: Some(String::new()),
                ..Default::default()
            },
        )
        .expect("update");
    assert_eq!(updated.unit_code.as_deref(), Some("U2"));
    assert_eq!(updated.name, "Review code");
    assert!(updated.standard_competency.is_none());
}

#[test]
fn competency_lookups_are_scoped_to_their_occupation() {
    let (service, _) = build_service();
    let first = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1"]))
        .expect("create");
    let second = service
        .create_occupation(occupation_input("OK-2", "Technician", &[]))
        .expect("create");
    let u1 = unit_id(&first, "U1");

    assert!(matches!(
        service.get_competency(&second.id, &u1),
        Err(CatalogError::NotFound("competency"))
    ));
    assert!(matches!(
        service.delete_competency(&second.id, &u1),
        Err(CatalogError::NotFound("competency"))
    ));
}

#[test]
fn competency_detail_lists_holding_schools() {
    let (service, _) = build_service();
    let occupation = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U2"]))
        .expect("create");
    let u1 = unit_id(&occupation, "U1");

    let mut input = school_input("SMK Negeri 1", "Bandung");
    input.competencies = Some(refs(&[&u1]));
    let school = service.create_school(input).expect("school");

    let details = service
        .list_competencies(&occupation.id)
        .expect("competencies");
    assert_eq!(details.len(), 2);
    let holders: Vec<_> = details
        .iter()
        .map(|detail| detail.school_ids.clone())
        .collect();
    assert_eq!(holders, vec![vec![school.school.id.clone()], Vec::new()]);
}

#[test]
fn create_school_normalizes_input() {
    let (service, _) = build_service();
    let view = service
        .create_school(school_input("SMK Negeri 2", "Cimahi"))
        .expect("create");

    assert_eq!(view.school.external_links, vec!["https://example.sch.id"]);
    assert_eq!(view.graduate_percent, 75.0);

    let err = service
        .create_school(SchoolInput {
            city: None,
            ..school_input("SMK Negeri 3", "Cimahi")
        })
        .expect_err("city required");
    assert!(matches!(err, CatalogError::InvalidInput(_)));
}

#[test]
fn create_school_rejects_unknown_references() {
    let (service, _) = build_service();
    let mut input = school_input("SMK Negeri 4", "Bogor");
    input.competencies = Some(vec![AssociationRef {
        id: "cmp-missing".to_string(),
    }]);

    let err = service.create_school(input).expect_err("unknown competency");
    assert!(matches!(err, CatalogError::InvalidInput(_)));
}

#[test]
fn graduate_percent_is_zero_without_students() {
    let (service, _) = build_service();
    let mut input = school_input("SMK Kosong", "Garut");
    input.student_count = Some(0);
    input.graduate_count = Some(0);
    let view = service.create_school(input).expect("create");
    assert_eq!(view.graduate_percent, 0.0);
}

#[test]
fn list_schools_puts_exact_name_first_then_alphabetical() {
    let (service, _) = build_service();
    for (name, city) in [
        ("SMK Negeri 10", "Bandung"),
        ("SMK Negeri 1", "Bandung"),
        ("SMK Bakti", "Jakarta"),
        ("SMA Taruna", "Bandung"),
    ] {
        service
            .create_school(school_input(name, city))
            .expect("create");
    }

    let page = service
        .list_schools(SchoolListQuery {
            search: Some("smk negeri 1".to_string()),
            ..Default::default()
        })
        .expect("list");
    let names: Vec<_> = page
        .items
        .iter()
        .map(|view| view.school.name.as_str())
        .collect();
    assert_eq!(names, vec!["SMK Negeri 1", "SMK Negeri 10"]);

    let page = service
        .list_schools(SchoolListQuery {
            city: Some("bandung".to_string()),
            ..Default::default()
        })
        .expect("list");
    let names: Vec<_> = page
        .items
        .iter()
        .map(|view| view.school.name.as_str())
        .collect();
    assert_eq!(names, vec!["SMA Taruna", "SMK Negeri 1", "SMK Negeri 10"]);
    assert_eq!(page.meta.total_count, 3);
}

#[test]
fn list_schools_searches_descriptions() {
    let (service, _) = build_service();
    let mut input = school_input("SMK Pariwisata", "Denpasar");
    input.description = Some("Hospitality and culinary programs".to_string());
    service.create_school(input).expect("create");
    service
        .create_school(school_input("SMK Teknik", "Denpasar"))
        .expect("create");

    let page = service
        .list_schools(SchoolListQuery {
            search: Some("CULINARY".to_string()),
            ..Default::default()
        })
        .expect("list");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].school.name, "SMK Pariwisata");
}

#[test]
fn update_school_replaces_supplied_associations_only() {
    let (service, _) = build_service();
    let occupation = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U2"]))
        .expect("create");
    let concentration = service
        .create_concentration(ConcentrationInput {
            name: Some("Rekayasa Perangkat Lunak".to_string()),
        })
        .expect("concentration");

    let mut input = school_input("SMK Negeri 1", "Bandung");
    input.competencies = Some(refs(&[&unit_id(&occupation, "U1")]));
    input.concentrations = Some(vec![AssociationRef {
        id: concentration.id.0.clone(),
    }]);
    let created = service.create_school(input).expect("create");

    let updated = service
        .update_school(
            &created.school.id,
            SchoolInput {
                student_count: Some(300),
                competencies: Some(refs(&[&unit_id(&occupation, "U2")])),
                ..Default::default()
            },
        )
        .expect("update");

    assert_eq!(updated.school.name, "SMK Negeri 1");
    assert_eq!(updated.school.student_count, 300);
    assert_eq!(updated.graduate_percent, 50.0);
    assert_eq!(updated.school.competencies.len(), 1);
    assert_eq!(
        updated.school.competencies[0].competency_id,
        unit_id(&occupation, "U2")
    );
    assert_eq!(updated.school.concentrations.len(), 1);
}

#[test]
fn school_competency_links_follow_store_invariants() {
    let (service, _) = build_service();
    let occupation = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1"]))
        .expect("create");
    let school = service
        .create_school(school_input("SMK Negeri 1", "Bandung"))
        .expect("create");
    let u1 = unit_id(&occupation, "U1");
    let input = GraduateCompetencyInput {
        competency_id: Some(u1.0.clone()),
    };

    let link = service
        .add_school_competency(&school.school.id, input.clone())
        .expect("link");
    assert_eq!(link.competency.name, "Competency U1");
    assert!(matches!(
        service.add_school_competency(&school.school.id, input),
        Err(CatalogError::Conflict(_))
    ));
    assert!(matches!(
        service.add_school_competency(
            &school.school.id,
            GraduateCompetencyInput {
                competency_id: Some("cmp-missing".to_string()),
            }
        ),
        Err(CatalogError::NotFound("competency"))
    ));
    assert!(matches!(
        service.add_school_competency(&school.school.id, GraduateCompetencyInput::default()),
        Err(CatalogError::InvalidInput(_))
    ));

    assert_eq!(
        service
            .list_school_competencies(&school.school.id)
            .expect("list")
            .len(),
        1
    );
    assert!(matches!(
        service.remove_school_competency(&school.school.id, None),
        Err(CatalogError::InvalidInput(_))
    ));
    service
        .remove_school_competency(&school.school.id, Some(u1.0.as_str()))
        .expect("remove");
    assert!(matches!(
        service.remove_school_competency(&school.school.id, Some(u1.0.as_str())),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn deleting_competency_unlinks_schools() {
    let (service, _) = build_service();
    let occupation = service
        .create_occupation(occupation_input("OK-1", "Programmer", &["U1", "U2"]))
        .expect("create");
    let mut input = school_input("SMK Negeri 1", "Bandung");
    input.competencies = Some(refs(&[
        &unit_id(&occupation, "U1"),
        &unit_id(&occupation, "U2"),
    ]));
    let school = service.create_school(input).expect("create");

    service
        .delete_competency(&occupation.id, &unit_id(&occupation, "U1"))
        .expect("delete");

    let held = service
        .list_school_competencies(&school.school.id)
        .expect("list");
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].competency_id, unit_id(&occupation, "U2"));
}

#[test]
fn concentrations_are_unique_case_insensitively() {
    let (service, _) = build_service();
    service
        .create_concentration(ConcentrationInput {
            name: Some("Teknik Komputer dan Jaringan".to_string()),
        })
        .expect("create");
    assert!(matches!(
        service.create_concentration(ConcentrationInput {
            name: Some("teknik komputer dan jaringan".to_string()),
        }),
        Err(CatalogError::Conflict(_))
    ));
    assert_eq!(service.list_concentrations().expect("list").len(), 1);
}

#[test]
fn missing_records_are_not_found() {
    let (service, _) = build_service();
    assert!(matches!(
        service.get_school(&SchoolId("sch-missing".to_string())),
        Err(CatalogError::NotFound("school"))
    ));
    assert!(matches!(
        service.delete_school(&SchoolId("sch-missing".to_string())),
        Err(CatalogError::NotFound("school"))
    ));
    assert!(matches!(
        service.delete_occupation(&OccupationId("occ-missing".to_string())),
        Err(CatalogError::NotFound("occupation"))
    ));
    assert!(matches!(
        service.get_competency(
            &OccupationId("occ-missing".to_string()),
            &CompetencyId("cmp-missing".to_string())
        ),
        Err(CatalogError::NotFound("occupation"))
    ));
}

#[test]
fn store_outages_surface_as_store_errors() {
    let service = CatalogService::new(Arc::new(UnavailableStore));
    assert!(matches!(
        service.list_schools(SchoolListQuery::default()),
        Err(CatalogError::Store(_))
    ));
    assert!(matches!(
        service.create_occupation(occupation_input("OK-1", "Programmer", &[])),
        Err(CatalogError::Store(_))
    ));
}
