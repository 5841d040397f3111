//! Multi-file catalog loading and selection, against on-disk fixtures.

use semantiq::{Catalog, SelectFilters};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rules")
}

#[test]
fn loads_every_yaml_file_under_the_fixture_directory() {
    let catalog = Catalog::load(&[fixtures()]);
    assert_eq!(catalog.rules().len(), 4, "{:?}", catalog.rules().iter().map(|r| &r.id).collect::<Vec<_>>());
}

#[test]
fn malformed_file_becomes_an_issue_not_a_load_failure() {
    let catalog = Catalog::load(&[fixtures()]);
    assert_eq!(catalog.issues().len(), 1);
    let issue = &catalog.issues()[0];
    assert!(issue.file.ends_with("broken.yaml"));
}

#[test]
fn select_filters_by_lang_and_country() {
    let catalog = Catalog::load(&[fixtures()]);

    let ru_only = catalog.select(SelectFilters { langs: &["ru"], ..Default::default() });
    let keys: Vec<&str> = ru_only.field_rules().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["snils"]);

    let ru_country = catalog.select(SelectFilters { countries: &["RU"], ..Default::default() });
    assert_eq!(ru_country.field_rules().count(), 3, "country-less rules (web's) are unaffected by the country filter");

    let fr_country = catalog.select(SelectFilters { countries: &["FR"], ..Default::default() });
    assert_eq!(fr_country.field_rules().count(), 2, "ru_local declares RU, so it alone is excluded");
}

#[test]
fn select_drops_imprecise_rules_by_default_only_when_asked() {
    let catalog = Catalog::load(&[fixtures()]);

    let strict = catalog.select(SelectFilters { ignore_imprecise: true, ..Default::default() });
    assert_eq!(strict.data_rules().count(), 0);

    let lenient = catalog.select(SelectFilters { ignore_imprecise: false, ..Default::default() });
    assert_eq!(lenient.data_rules().count(), 1);
}

#[test]
fn context_filter_is_additive_with_lang_filter() {
    let catalog = Catalog::load(&[fixtures()]);
    let web_only = catalog.select(SelectFilters { contexts: &["web"], ..Default::default() });
    let keys: Vec<&str> = web_only.field_rules().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["email", "username"]);
}
