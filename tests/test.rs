use std::cmp::Ordering;
use std::fs;

use phontier::{
    load_pairs, FeatureTable, FeatureValue, LearnerBuilder, LearnerConfig, NaturalClass,
    ScenarioSuite, SegmentInventory, SegmentSequence, Statistics,
};

#[test]
fn scenario_suite_has_cases() {
    let suite = ScenarioSuite::default();
    let cases = suite.available_cases().expect("scenario discovery should succeed");
    assert!(!cases.is_empty(), "expected at least one scenario");
    assert!(cases.iter().any(|case| case.config.is_some()));
}

#[test]
fn inventory_interns_symbols() {
    let mut inv = SegmentInventory::bundled().expect("bundled table");
    let a = inv.get_or_add("a").expect("a");
    let again = inv.get_or_add("a").expect("a");
    assert_eq!(a, again, "interning must avoid duplicates");
    assert_eq!(inv.len(), 1);
    assert!(inv.get_or_add("not-a-segment").is_err());
}

#[test]
fn natural_class_extension() {
    let mut inv = SegmentInventory::bundled().expect("bundled table");
    inv.add_segments_by_str("p a t i k u").expect("segments");
    let voiceless = NaturalClass::parse(["-voi", "-syl"]).expect("class");
    let stops: Vec<_> = inv.extension(&voiceless).into_iter().map(|id| inv.symbol(id)).collect();
    assert_eq!(stops.len(), 3);
    assert_eq!(inv.render_set(&inv.extension_complement(&voiceless)), "{a,i,u}");
    assert_eq!(voiceless.to_string(), "[-syl,-voi]");
}

#[test]
fn sequences_compare_by_symbols() {
    let mut inv = SegmentInventory::bundled().expect("bundled table");
    let word = inv.sequence("t a t a").expect("sequence");
    let prefix = inv.sequence("t a").expect("sequence");
    assert!(word.starts_with(prefix.as_slice()));
    assert!(word.ends_with(prefix.as_slice()));
    assert_eq!(&prefix + &prefix, word);
    assert_eq!(word.concat_symbols(&inv), "tata");
    assert_eq!(word.slice(1, 3).render(&inv), "a t");
    assert_eq!(SegmentSequence::default().len(), 0);

    // "t" was registered before "a", so only the symbol order puts "a" first.
    let a = inv.sequence("a").expect("sequence");
    assert!(prefix < a);
    assert_eq!(a.cmp_symbols(&prefix, &inv), Ordering::Less);
    assert_eq!(prefix.cmp_symbols(&word, &inv), Ordering::Less);
    assert_eq!(word.cmp_symbols(&word.clone(), &inv), Ordering::Equal);
}

#[test]
fn custom_feature_tables_and_pair_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table_path = dir.path().join("features.csv");
    fs::write(&table_path, "sym,syl,voi\na,+,+\nt,-,-\nd,-,+\n").expect("write table");
    let pairs_path = dir.path().join("pairs.csv");
    fs::write(&pairs_path, "# final voicing\na d a,a d a\na T,a t\nT a,d a\n")
        .expect("write pairs");

    let table = FeatureTable::load(&table_path, ',').expect("table");
    assert_eq!(table.len(), 3);
    let pairs = load_pairs(&pairs_path, ',').expect("pairs");
    assert_eq!(pairs.len(), 3);

    let mut learner = LearnerBuilder::new().feature_table(table).build().expect("learner");
    learner
        .train(pairs.iter().map(|pair| (pair.ur.as_str(), pair.sr.as_str())))
        .expect("train");
    let abstract_t = learner.inventory().lookup("T").expect("synthesized");
    assert_eq!(
        learner.inventory().value(abstract_t, "voi").expect("voi"),
        FeatureValue::Underspecified
    );
    assert!(learner.stats().count(Statistics::SEARCH_ITERATIONS) >= 2);
}

#[test]
fn configuration_from_toml() {
    let config = LearnerConfig::from_toml_str("disharmony = false\nmax_class_literals = 1\n")
        .expect("config");
    assert!(config.harmony);
    assert!(!config.disharmony);
    assert_eq!(config.max_class_literals, 1);

    let learner = LearnerBuilder::new().with_config(config.clone()).build().expect("learner");
    assert_eq!(learner.config(), &config);
}

#[test]
fn report_serialises_to_json() {
    let mut learner = LearnerBuilder::new().disharmony(false).build().expect("learner");
    learner.train([("a S", "a s"), ("i S", "i ʃ")]).expect("train");
    let json = learner.report().to_json().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["rule"], learner.render_rule());
    assert_eq!(value["stats"]["pairs"], 2);
}
