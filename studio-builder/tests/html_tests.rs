use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use studio_builder::html::{self, RecoverySource, RecoveryWarning, RenderOptions};
use studio_builder::markers::{extract_markers, KNOWN_MARKERS};
use studio_builder::{
    recover_contract, BuilderConfig, BuilderEngine, DocumentTree, Element, FormModel,
    IdGenerator, Money, SectionKind,
};

fn get_demo_path(relative: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("demos");
    path.push(relative);
    path
}

fn load_form(relative: &str) -> FormModel {
    let yaml = fs::read_to_string(get_demo_path(relative)).unwrap();
    let mut form: FormModel = serde_yaml::from_str(&yaml).unwrap();
    let sections = std::mem::take(&mut form.sections);
    form.set_sections(sections);
    form
}

fn section_summary(form: &FormModel) -> Vec<(String, String, SectionKind, usize)> {
    form.sections
        .iter()
        .map(|s| (s.title.clone(), s.content.clone(), s.kind, s.order))
        .collect()
}

fn without_sections(form: &FormModel) -> FormModel {
    FormModel {
        sections: Vec::new(),
        ..form.clone()
    }
}

/// Generated output has several top-level nodes; wrap it so it parses as one XML document.
fn assert_well_formed(markup: &str) {
    let wrapped = format!("<document>{}</document>", markup);
    if let Err(e) = roxmltree::Document::parse(&wrapped) {
        panic!("markup is not well-formed: {}\n{}", e, markup);
    }
}

// Generation
#[test]
fn test_render_is_deterministic() {
    let form = load_form("forms/studio.yaml");
    let options = RenderOptions::default();
    assert_eq!(html::render_form(&form, &options), html::render_form(&form, &options));

    let json = fs::read_to_string(get_demo_path("trees/saved-tree.json")).unwrap();
    let elements: Vec<Element> = serde_json::from_str(&json).unwrap();
    let tree = DocumentTree::from_elements(elements);
    assert_eq!(html::render_tree(&tree), html::render_tree(&tree));
}

#[test]
fn test_rendered_contract_is_well_formed() {
    let form = load_form("forms/studio.yaml");
    assert_well_formed(&html::render_form(&form, &RenderOptions::default()));
    assert_well_formed(&html::render_form(
        &form,
        &RenderOptions {
            embed_form_data: false,
        },
    ));
}

#[test]
fn test_rendered_tree_is_well_formed() {
    let json = fs::read_to_string(get_demo_path("trees/saved-tree.json")).unwrap();
    let elements: Vec<Element> = serde_json::from_str(&json).unwrap();
    let engine =
        BuilderEngine::with_tree(DocumentTree::from_elements(elements), &BuilderConfig::default())
            .unwrap();
    let markup = html::render_tree(engine.tree());
    assert_well_formed(&markup);
    assert!(markup.contains("font-size:28px;"));
    assert!(markup.contains("data-source=\"student\""));
}

#[test]
fn test_rendered_contract_carries_every_known_marker() {
    let form = load_form("forms/studio.yaml");
    let markup = html::render_form(&form, &RenderOptions::default());
    let found = extract_markers(&markup);
    for name in KNOWN_MARKERS {
        assert!(found.iter().any(|m| m == name), "missing {{{{{}}}}}", name);
    }
}

#[test]
fn test_fixed_fields_behind_bold_labels() {
    let form = load_form("forms/studio.yaml");
    let markup = html::render_form(&form, &RenderOptions::default());
    assert!(markup.contains("<strong>Late Fee:</strong> $20.00"));
    assert!(markup.contains("<strong>Elite Division:</strong> $175.00 per month"));
    assert!(markup.contains("Tuition is due on the 5th of each month."));
    assert!(markup.contains("Invoices are sent on the 28th of each month."));
    assert!(markup.contains("7 days after the due date"));
}

// Recovery round trips
#[test]
fn test_round_trip_through_markup() {
    let form = load_form("forms/studio.yaml");
    let markup = html::render_form(
        &form,
        &RenderOptions {
            embed_form_data: false,
        },
    );
    let recovery = html::recover(&markup, &mut IdGenerator::counter("section"));
    assert_eq!(recovery.source, RecoverySource::Markup);
    assert_eq!(recovery.warnings, vec![]);

    let back = FormModel::hydrate(recovery, &FormModel::default());
    assert_eq!(without_sections(&back), without_sections(&form));
    assert_eq!(section_summary(&back), section_summary(&form));
}

#[test]
fn test_round_trip_through_data_island() {
    let form = load_form("forms/studio.yaml");
    let markup = html::render_form(&form, &RenderOptions::default());
    let (back, recovery) = recover_contract(&markup, &BuilderConfig::default());
    assert_eq!(recovery.source, RecoverySource::DataIsland);
    assert!(!recovery.is_degraded());
    assert_eq!(back, form);
}

#[test]
fn test_recover_hand_written_contract() {
    let markup = fs::read_to_string(get_demo_path("contracts/legacy-contract.html")).unwrap();
    let (form, recovery) = recover_contract(&markup, &BuilderConfig::default());

    assert_eq!(recovery.source, RecoverySource::Markup);
    assert_eq!(recovery.warnings, vec![RecoveryWarning::Unversioned]);
    assert_eq!(form.company_name, "Tiny Toes Ballet");
    assert_eq!(form.company_phone, "(555) 010-4400");
    assert_eq!(form.company_address, "");
    assert_eq!(form.season, "2024-2025");
    assert_eq!(form.recreational_fee, Money::from_dollars(80));
    assert_eq!(form.competitive_fee, Money::from_dollars(120));
    assert_eq!(form.elite_fee, Money::from_dollars(150));
    assert_eq!(form.registration_fee, Money::from_dollars(45));
    assert_eq!(form.payment_due_day, 10);
    assert_eq!(form.invoice_day, 1);
    assert_eq!(form.late_fee, Money::from_dollars(10));
    assert_eq!(form.late_fee_grace_days, 3);
    assert_eq!(form.termination_notice_days, 14);

    let titles: Vec<_> = form
        .sections
        .iter()
        .map(|s| (s.title.as_str(), s.kind))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("Program Overview", SectionKind::Paragraph),
            ("Photo & Video Policy", SectionKind::Policy),
        ]
    );
    assert_eq!(
        form.sections[1].content,
        "<p>The studio may photograph classes for its website.</p>"
    );
}

#[test]
fn test_contract_without_sections_falls_back() {
    let markup = fs::read_to_string(get_demo_path("contracts/no-sections.html")).unwrap();
    let (form, recovery) = recover_contract(&markup, &BuilderConfig::default());

    assert!(recovery.is_degraded());
    assert!(recovery
        .warnings
        .contains(&RecoveryWarning::DefaultSectionsSubstituted {
            unrecognized_headings: 2
        }));
    let titles: Vec<_> = form.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Attendance Policy",
            "Injury & Liability Policy",
            "Conduct Policy"
        ]
    );
    assert_eq!(form.company_name, "Studio Contract");
    assert_eq!(form.late_fee, FormModel::default().late_fee);
}

#[test]
fn test_section_ids_follow_config_prefix() {
    let markup = fs::read_to_string(get_demo_path("contracts/legacy-contract.html")).unwrap();
    let config = BuilderConfig::from_path(get_demo_path("config/builder.yaml")).unwrap();
    let (form, _) = recover_contract(&markup, &config);
    let ids: Vec<_> = form.sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["clause-1", "clause-2"]);
}
