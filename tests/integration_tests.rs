//! End-to-end tests: configuration on disk, lexicons on disk, matching.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use phonmatch::prelude::*;
use tempfile::TempDir;

const FEATURES: &str = r#"{
    "id": "phon",
    "features": ["cons,consonantal", "voice", "cont", "high"]
}"#;

/// Dimensions in canonical order: cons, cont, high, voice
const CONFIG: &str = r#"{
    "featureSets": [{ "path": "features.json" }],
    "encodings": [
        { "id": "ipa", "features": "phon", "patterns": [
            { "input": "θ", "features": ["+cons", "+cont", "-voice"] },
            { "input": "t", "features": ["+cons", "-cont", "-voice"] },
            { "input": "d", "features": ["+cons", "-cont", "+voice"] },
            { "input": "k", "features": ["+cons", "-cont", "-voice", "+high"] },
            { "input": "a", "features": ["-cons", "+voice", "-high"] },
            { "input": "i", "features": ["-cons", "+voice", "+high"] },
            { "input": "n", "features": ["+cons", "+voice"] }
        ]},
        { "id": "latin", "features": "phon", "patterns": [
            { "input": "th", "output": "θ", "ipa": "θ" },
            { "input": "t", "ipa": "t" },
            { "input": "d", "ipa": "d" },
            { "input": "k", "ipa": "k" },
            { "input": "c", "output": "k", "ipa": "k" },
            { "input": "a", "ipa": "a" },
            { "input": "i", "ipa": "i" },
            { "input": "n", "ipa": "n" },
            { "input": "_h", "features": ["+cont"] }
        ]},
        { "id": "arpa", "features": "phon", "patterns": [
            { "input": "TH", "ipa": "θ" },
            { "input": "T", "ipa": "t" },
            { "input": "D", "ipa": "d" },
            { "input": "K", "ipa": "k" },
            { "input": "AH0", "ipa": "a" },
            { "input": "AH1", "ipa": "a" },
            { "input": "IY1", "ipa": "i" },
            { "input": "N", "ipa": "n" }
        ]}
    ],
    "lexicons": [
        { "id": "english", "kind": "cmudict", "path": "cmudict.txt", "encoding": "arpa" },
        { "id": "romani", "kind": "json", "path": "romlex.json", "encoding": "latin" }
    ],
    "hypotheses": [{
        "id": "readings",
        "encoding": "latin",
        "groups": [{ "name": "guesses", "entries": [
            { "input": ["dain", "daiin"], "lemma": "dain", "definition": "proposed" }
        ]}]
    }],
    "matcher": {
        "lexicons": ["english", "romani"],
        "options": 3,
        "tolerance": 0.0,
        "hypotheses": "readings"
    },
    "input": { "encoding": "latin" }
}"#;

const CMUDICT: &str = ";;; tiny test dictionary
TAN  T AH1 N
DAN  D AH1 N
THIN  TH IY1 N
KIT  K IY1 T
TAN  T AH0 N
";

const ROMLEX: &str = r#"{
    "languages": [{ "code": "rmn", "name": "Romani" }],
    "entries": [
        { "lemma": "kan", "partOfSpeech": "n", "definition": "ear", "srcLangCode": "rmn" },
        { "lemma": "dand", "entry": "dand", "partOfSpeech": "n", "definition": "tooth", "srcLangCode": "rmn" }
    ]
}"#;

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("features.json"), FEATURES).unwrap();
    fs::write(dir.join("cmudict.txt"), CMUDICT).unwrap();
    fs::write(dir.join("romlex.json"), ROMLEX).unwrap();
    let config = dir.join("config.json");
    fs::write(&config, CONFIG).unwrap();
    config
}

#[test]
fn test_configuration_assembles() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();

    assert!(resources.errors().is_empty(), "{:?}", resources.errors());
    assert_eq!(resources.encoders().len(), 3);
    assert_eq!(resources.encoders()[0].encoding().name(), "ipa");

    let features = resources.feature_set("phon").unwrap();
    let names: Vec<_> = features.dimension_names().collect();
    assert_eq!(names, vec!["consonantal", "cont", "high", "voice"]);

    // the only recorded problem is the duplicate CMU entry
    let all: Vec<String> = resources.all_errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(all, vec!["lexicon 'english': duplicate lemma 'TAN'"]);
    assert_eq!(resources.lexicon("english").unwrap().len(), 4);
    assert_eq!(resources.lexicon("romani").unwrap().len(), 2);
}

#[test]
fn test_ipa_patterns_resolve_through_ipa_encoding() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();
    let latin = resources.encoder("latin").unwrap();
    let ipa = resources.encoder("IPA").unwrap();

    assert_eq!(latin.encode("thin"), ipa.encode("θin"));

    let result = latin.text_and_phones("cat");
    assert_eq!(result.text, "kat");
    assert_eq!(result.phones, ipa.encode("kat"));
}

#[test]
fn test_template_overlay_end_to_end() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();
    let latin = resources.encoder("latin").unwrap();
    let features = latin.features();

    // "kh": k with +cont laid over it, h contributes no phone of its own
    let phones = latin.encode("kha");
    assert_eq!(phones.len(), 2);
    assert_eq!(features.feature_spec(&phones[0]), vec!["+consonantal", "+cont", "+high", "-voice"]);
}

#[test]
fn test_matching_across_lexicons() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();
    let encoder = resources.input_encoder().unwrap();
    let mut matcher = resources.matcher().unwrap();

    let query = encoder.text_and_phones("tan");
    let options = matcher.match_token("tan", &query.phones).to_vec();
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].text(), "TAN");
    assert_eq!(options[0].distance, Some(0.0));
    assert_eq!(options[0].kind, MatchKind::Lexicon("english".into()));

    let distances: Vec<f64> = options.iter().map(|o| o.distance.unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));

    let query = encoder.text_and_phones("kan");
    let options = matcher.match_token("kan", &query.phones);
    assert_eq!(options[0].text(), "kan");
    assert_eq!(options[0].kind, MatchKind::Lexicon("romani".into()));
    assert_eq!(options[0].entry.definition.as_deref(), Some("n: kan (Romani)"));
}

#[test]
fn test_hypotheses_are_emitted_first() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();
    let encoder = resources.input_encoder().unwrap();
    let mut matcher = resources.matcher().unwrap();

    let phones = encoder.encode("daiin");
    let options = matcher.match_token("daiin", &phones);
    assert!(options[0].is_hypothesis());
    assert_eq!(options[0].text(), "dain");
    assert!(options[0].distance.is_some());
    assert!(options[1..].iter().all(|o| !o.is_hypothesis()));
}

#[test]
fn test_tokenized_line_matches_every_token() {
    let dir = TempDir::new().unwrap();
    let resources = Resources::from_path(write_fixture(dir.path())).unwrap();
    let encoder = resources.input_encoder().unwrap();
    let mut matcher = resources.matcher().unwrap();

    let tokens: Vec<&str> = tokenize("tan.kit dan", resources.delimiters()).collect();
    assert_eq!(tokens, vec!["tan", "kit", "dan"]);

    let best: Vec<String> = tokens
        .iter()
        .map(|token| {
            let phones = encoder.encode(token);
            matcher.match_token(token, &phones)[0].text().to_string()
        })
        .collect();
    assert_eq!(best, vec!["TAN", "KIT", "DAN"]);
    assert_eq!(matcher.cache_len(), 3);
}

#[test]
fn test_manual_pipeline_without_configuration() {
    let features = Arc::new(FeatureSet::from_names(["Cons", "Voice"], 1.0, -1.0));
    let encoding = Arc::new(Encoding::new(
        "latin",
        Arc::clone(&features),
        vec![EncodingPattern::new("th", vec![vec![1.0, -1.0]]).with_output("θ")],
    ));
    let encoder = Encoder::new(encoding);

    let result = encoder.text_and_phones("path");
    assert_eq!(result.text, "paθ");
    assert_eq!(result.phones.len(), "path".chars().count() - 1);
}
