//! End-to-end scenarios, exercised entirely through the public API.

use semantiq::{Catalog, ClassifyOptions, NullDateParser, Value, classify, compile_grammar};
use std::io::Write;

fn rules_dir(contents: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut f = std::fs::File::create(dir.path().join("rules.yaml")).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    dir
}

fn record(pairs: &[(&str, &str)]) -> semantiq::Record {
    pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
}

#[test]
fn s1_email_by_field_name() {
    let dir = rules_dir(
        r#"
name: t
rules:
  email:
    key: email
    name: Email
    type: field
    match: text
    rule: "email,e_mail,email_address"
"#,
    );
    let catalog = Catalog::load(&[dir.path()]);
    let records = vec![record(&[("Email", "a@b")]), record(&[("Email", "c@d")])];
    let report = classify(records, &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();

    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].field, "Email");
    assert_eq!(report.data[0].matches.len(), 1);
    assert_eq!(report.data[0].matches[0].key, "email");
    assert_eq!(report.data[0].matches[0].confidence_pct, 100.0);
}

#[test]
fn s2_iso_alpha2_confidence_is_80_percent() {
    let dir = rules_dir(
        r#"
name: t
rules:
  cc:
    key: countrycode_alpha2
    name: Country code
    type: data
    match: text
    rule: "us,ca,de,fr"
"#,
    );
    let catalog = Catalog::load(&[dir.path()]);
    let records = ["us", "ca", "de", "zz", "fr"].into_iter().map(|v| record(&[("code", v)])).collect::<Vec<_>>();
    let report = classify(records, &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();
    assert_eq!(report.data[0].matches[0].confidence_pct, 80.00);
}

#[test]
fn s3_year_grammar_longest_alternative() {
    let dir = rules_dir(
        r#"
name: t
rules:
  yr:
    key: year
    name: Year
    type: data
    match: ppr
    rule: "(Literal('1') + Word(nums, exact=3)) ^ (Literal('2') + Word('01', exact=1) + Word(nums, exact=2))"
    minlen: 4
    maxlen: 4
"#,
    );
    let catalog = Catalog::load(&[dir.path()]);
    let records = ["1999", "2012", "2100", "2200", "abcd"].into_iter().map(|v| record(&[("yr", v)])).collect::<Vec<_>>();
    let report = classify(records, &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();
    assert_eq!(report.data[0].matches[0].confidence_pct, 60.00);
}

#[test]
fn s4_imprecise_gating_both_branches() {
    let dir = rules_dir(
        r#"
name: t
rules:
  cc:
    key: countrycode_alpha2
    name: Country code
    type: data
    match: text
    rule: "us,ca,de,fr"
    imprecise: 1
"#,
    );
    let catalog = Catalog::load(&[dir.path()]);
    let records = ["us", "ca", "de", "zz", "fr"].into_iter().map(|v| record(&[("code", v)])).collect::<Vec<_>>();

    let gated = classify(records.clone(), &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();
    assert!(gated.data[0].matches.is_empty());

    let opts = ClassifyOptions { ignore_imprecise: false, ..ClassifyOptions::default() };
    let included = classify(records, &catalog, &opts, &NullDateParser, None).unwrap();
    assert_eq!(included.data[0].matches[0].confidence_pct, 80.00);
}

#[test]
fn s5_stop_on_match() {
    let dir = rules_dir(
        r#"
name: t
rules:
  high:
    key: a
    name: A
    type: data
    match: text
    rule: "x"
    priority: 90
  low:
    key: b
    name: B
    type: data
    match: text
    rule: "x"
    priority: 10
"#,
    );
    let catalog = Catalog::load(&[dir.path()]);
    let records = vec![record(&[("f", "x")])];

    let default_opts = ClassifyOptions::default();
    let both = classify(records.clone(), &catalog, &default_opts, &NullDateParser, None).unwrap();
    assert_eq!(both.data[0].matches.len(), 2);
    assert_eq!(both.data[0].matches[0].key, "a");
    assert_eq!(both.data[0].matches[1].key, "b");

    let stop_opts = ClassifyOptions { stop_on_match: true, ..ClassifyOptions::default() };
    let stopped = classify(records, &catalog, &stop_opts, &NullDateParser, None).unwrap();
    assert_eq!(stopped.data[0].matches.len(), 1);
    assert_eq!(stopped.data[0].matches[0].key, "a");
}

#[test]
fn s6_safe_compile_rejection() {
    let err = compile_grammar("__import__('os').system('x')").unwrap_err();
    assert_eq!(err.kind, semantiq::GrammarErrorKind::Unsafe);
}
