use std::fs;
use std::path::PathBuf;

use talkie_dict::talkie::pack;
use talkie_dict::{
    compile, order_sources, CompileOptions, Compiler, DictionaryPacker, Histogram, RawDeclaration,
    SourceFile, TalkieError,
};

fn fixture_path(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    for part in parts {
        p.push(part);
    }
    p
}

fn load_source(name: &str) -> SourceFile {
    let path = fixture_path(&["sources", name]);
    let text =
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    SourceFile::new(name, text)
}

/// Both vocabularies in directory-listing order (uk sorts before us).
fn fixture_sources() -> Vec<SourceFile> {
    vec![load_source("vocab_uk_small.ino"), load_source("vocab_us_small.ino")]
}

const EXPECTED_US_CANONICAL: &str = "\
const byte spHELLO [] PROGMEM = {
  0x01,0x02,0x03,0x04
};
const byte spYES [] PROGMEM = {
  0x0A,0x0B,0x0C
};
const byte spNO [] PROGMEM = {
  0x0D,0x0E
};
";

const EXPECTED_UK_CANONICAL: &str = "\
const byte spHELLO [] PROGMEM = {
  0x05,0x06
};
const byte spZERO [] PROGMEM = {
  0x21,0x22,0x23
};
";

#[test]
fn fixtures_standardize_to_canonical_text() {
    let output = compile(&fixture_sources(), CompileOptions::default()).expect("compile fixtures");

    let (uk_origin, uk) = &output.files[0];
    assert_eq!(uk_origin, "vocab_uk_small.ino");
    assert_eq!(uk.text, EXPECTED_UK_CANONICAL);
    assert_eq!((uk.words, uk.bytes, uk.duplicates), (2, 5, 0));

    let (us_origin, us) = &output.files[1];
    assert_eq!(us_origin, "vocab_us_small.ino");
    assert_eq!(us.text, EXPECTED_US_CANONICAL, "commented declaration should be recovered");
    assert_eq!(
        (us.words, us.bytes, us.duplicates),
        (3, 9, 1),
        "second spHELLO in the US file should be dropped"
    );
}

#[test]
fn fixtures_pack_prefers_first_marker_sources() {
    let output = compile(&fixture_sources(), CompileOptions::default()).expect("compile fixtures");
    let report = output.report;

    assert!(report.failures.is_empty(), "unexpected failures: {:?}", report.failures);
    assert_eq!(
        report.artifact.index_text(),
        "hello:4:0\nno:2:4\nyes:3:6\nzero:3:9\n",
        "US variant of hello must win even though the UK file was read first"
    );
    assert_eq!(
        report.artifact.data,
        vec![0x01, 0x02, 0x03, 0x04, 0x0D, 0x0E, 0x0A, 0x0B, 0x0C, 0x21, 0x22, 0x23]
    );
    assert_eq!(report.stats.words, 4);
    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.data_bytes, 12);
    assert_eq!(report.stats.index_bytes, 34);
    assert_eq!(report.stats.histogram.count(2), 1);
    assert_eq!(report.stats.histogram.count(3), 2);
    assert_eq!(report.stats.histogram.count(4), 1);
}

#[test]
fn fixtures_global_totals_count_each_name_once() {
    let output = compile(&fixture_sources(), CompileOptions::default()).expect("compile fixtures");
    assert_eq!(output.summary.global_words, 4);
    // hello is first seen in the UK file (2 bytes), then yes, no and zero.
    assert_eq!(output.summary.global_bytes, 2 + 3 + 2 + 3);

    let table = output.summary.to_string();
    assert!(table.contains("Input File"), "missing header in:\n{}", table);
    assert!(
        table.ends_with("Processed 2 files, 4 globally unique words (10 bytes)."),
        "unexpected footer in:\n{}",
        table
    );
}

#[test]
fn index_offsets_are_contiguous_and_sorted() {
    let output = compile(&fixture_sources(), CompileOptions::default()).expect("compile fixtures");
    let artifact = &output.report.artifact;

    let mut expected_offset = 0u32;
    for record in &artifact.index {
        assert_eq!(record.offset, expected_offset, "gap before {}", record.name);
        expected_offset += record.length;
    }
    assert_eq!(expected_offset as usize, artifact.data.len());

    for win in artifact.index.windows(2) {
        assert!(win[0].name < win[1].name, "{} sorted after {}", win[0].name, win[1].name);
    }
}

#[test]
fn canonical_output_reloads_into_identical_dictionary() {
    let options = CompileOptions::default();
    let direct = compile(&fixture_sources(), options.clone()).expect("compile fixtures");

    let mut compiler = Compiler::new(options.clone()).expect("compiler");
    let origins: Vec<&str> = direct.files.iter().map(|(origin, _)| origin.as_str()).collect();
    for origin in order_sources(origins, &options) {
        let (_, file) = direct.files.iter().find(|(o, _)| o == origin).expect("file");
        compiler.load_canonical(origin, &file.text).expect("reload canonical text");
    }
    let reloaded = compiler.finish();

    assert_eq!(reloaded.artifact, direct.report.artifact);
}

#[test]
fn scenario_a_single_declaration() {
    let source = SourceFile::new("a.ino", "const byte spTEST [] PROGMEM = {0x0A,0x0B,0x0C};\n");
    let output = compile(&[source], CompileOptions::default()).expect("compile");

    let declaration = &output.files[0].1.declarations[0];
    assert_eq!(declaration.name, "test");
    assert_eq!(declaration.identifier, "spTEST");
    assert_eq!(declaration.bytes, vec![0x0A, 0x0B, 0x0C]);

    assert_eq!(output.report.artifact.data, vec![0x0A, 0x0B, 0x0C]);
    assert_eq!(output.report.artifact.index_text(), "test:3:0\n");
}

#[test]
fn scenario_b_entries_sorted_by_name() {
    let text = "const byte spFOO [] PROGMEM = {0x01};\nconst byte spBAR [] PROGMEM = {0x02,0x03};\n";
    let output = compile(&[SourceFile::new("b.ino", text)], CompileOptions::default()).expect("compile");

    assert_eq!(output.report.artifact.data, vec![0x02, 0x03, 0x01]);
    assert_eq!(output.report.artifact.index_text(), "bar:2:0\nfoo:1:2\n");
}

#[test]
fn scenario_c_duplicate_keeps_first_payload() {
    let text = "const byte spFOO [] PROGMEM = {0x01};\nconst byte spfoo [] PROGMEM = {0x02,0x03};\n";
    let output = compile(&[SourceFile::new("c.ino", text)], CompileOptions::default()).expect("compile");

    assert_eq!(output.files[0].1.duplicates, 1);
    assert_eq!(output.report.artifact.data, vec![0x01]);
    assert_eq!(output.report.artifact.index_text(), "foo:1:0\n");
}

#[test]
fn scenario_c_packer_collapses_duplicates_across_inputs() {
    let options = CompileOptions::default();
    let compiler = Compiler::new(options).expect("compiler");
    let first = compiler.parse_source("one.ino", "const byte spFOO [] PROGMEM = {0x01};").expect("parse");
    let second = compiler.parse_source("two.ino", "const byte SPFoo [] PROGMEM = {0x09,0x09};").expect("parse");

    let mut packer = DictionaryPacker::new();
    assert!(packer.is_empty());
    assert!(packer.insert("one.ino", first[0].clone()));
    assert!(!packer.insert("two.ino", second[0].clone()));
    assert_eq!((packer.len(), packer.duplicates()), (1, 1));
    let report = packer.pack();

    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.artifact.data, vec![0x01]);
    assert!(report.failures.is_empty());
}

#[test]
fn scenario_d_undecodable_entry_is_skipped() {
    let text = "\
const byte spBAD [] PROGMEM = {
  0x01,0xZZ
};
const byte spGOOD [] PROGMEM = {
  0x07
};
";
    let mut compiler = Compiler::new(CompileOptions::default()).expect("compiler");
    assert_eq!(compiler.load_canonical("d.h", text).expect("load"), 2);
    let report = compiler.finish();

    assert_eq!(report.artifact.data, vec![0x07]);
    assert_eq!(report.artifact.index_text(), "good:1:0\n");
    assert_eq!(report.stats.words, 1);

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.name, "bad");
    assert_eq!(failure.origin, "d.h");
    assert_eq!(failure.tokens, vec!["0x01".to_string(), "0xZZ".to_string()]);
    assert!(
        matches!(&failure.error, TalkieError::MalformedByteToken { token, .. } if token == "0xZZ"),
        "unexpected error: {:?}",
        failure.error
    );
}

#[test]
fn unsplittable_byte_item_is_skipped_when_packing() {
    let text = "\
const byte spBAD [] PROGMEM = {
  0x01,0x-1
};
const byte spGOOD [] PROGMEM = {
  0x07
};
";
    let mut compiler = Compiler::new(CompileOptions::default()).expect("compiler");
    assert_eq!(compiler.load_canonical("d.h", text).expect("load"), 2);
    let report = compiler.finish();

    assert_eq!(report.artifact.index_text(), "good:1:0\n");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "bad");
    assert_eq!(report.failures[0].tokens, vec!["0x01".to_string(), "0x - 1".to_string()]);
}

#[test]
fn malformed_duplicate_does_not_stop_loading() {
    let first = "const byte spGOOD [] PROGMEM = {\n  0x05\n};\n";
    let second = "const byte spGOOD [] PROGMEM = {\n  0x07 0x08\n};\n";
    let mut compiler = Compiler::new(CompileOptions::default()).expect("compiler");
    compiler.load_canonical("a.h", first).expect("load first");
    compiler.load_canonical("b.h", second).expect("load second");
    let report = compiler.finish();

    assert_eq!(report.artifact.data, vec![0x05]);
    assert_eq!(report.stats.duplicates, 1);
    assert!(report.failures.is_empty());
}

#[test]
fn one_shot_pack_sorts_and_skips() {
    let declarations = vec![
        RawDeclaration {
            identifier: "spZED".to_string(),
            name: "zed".to_string(),
            tokens: vec!["0x02".to_string()],
        },
        RawDeclaration {
            identifier: "spBAD".to_string(),
            name: "bad".to_string(),
            tokens: vec!["0xZZ".to_string()],
        },
        RawDeclaration {
            identifier: "spALPHA".to_string(),
            name: "alpha".to_string(),
            tokens: vec!["0x01".to_string(), "0x0F".to_string()],
        },
    ];
    let report = pack::pack(declarations);

    assert_eq!(report.artifact.index_text(), "alpha:2:0\nzed:1:2\n");
    assert_eq!(report.artifact.data, vec![0x01, 0x0F, 0x02]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].origin, "<input>");
}

#[test]
fn strict_standardize_rejects_undecodable_bytes() {
    let text = "\n// header\nconst byte spBAD [] PROGMEM = {0x01,0xZZ};\n";
    let err = compile(&[SourceFile::new("bad.ino", text)], CompileOptions::default()).unwrap_err();
    match err {
        TalkieError::At { origin, line, inner } => {
            assert_eq!(origin, "bad.ino");
            assert_eq!(line, 3);
            assert!(matches!(*inner, TalkieError::MalformedByteToken { ref token, .. } if token == "0xZZ"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn sources_ordered_first_middle_final() {
    let options = CompileOptions::default();
    let ordered = order_sources(
        vec!["a_uk_.h", "plain.h", "b_us_.h", "c_uk_.h", "other.h", "d_us_.h"],
        &options,
    );
    assert_eq!(ordered, vec!["b_us_.h", "d_us_.h", "plain.h", "other.h", "a_uk_.h", "c_uk_.h"]);
}

#[test]
fn histogram_renders_wrapped_cells() {
    let mut histogram = Histogram::default();
    for length in 1..=8 {
        histogram.record(length * 100);
    }
    histogram.record(100);

    let rendered = histogram.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    // Eight 13-character cells: the line is flushed after the eighth pushes it past 100.
    assert_eq!(lines.len(), 1, "rendered:\n{}", rendered);
    assert!(lines[0].starts_with("  [  100:  2]  [  200:  1]"));

    histogram.record(900);
    assert_eq!(histogram.to_string().lines().count(), 2);
}

#[test]
fn artifact_is_written_to_both_files() {
    let output = compile(&fixture_sources(), CompileOptions::default()).expect("compile fixtures");
    let dir = tempfile::tempdir().expect("tempdir");
    let data_path = dir.path().join("out").join("talkie.dat");
    let index_path = dir.path().join("out").join("talkie.ndx");

    output.report.artifact.write_to(&data_path, &index_path).expect("write artifact");

    assert_eq!(fs::read(&data_path).expect("data"), output.report.artifact.data);
    assert_eq!(
        fs::read_to_string(&index_path).expect("index"),
        "hello:4:0\nno:2:4\nyes:3:6\nzero:3:9\n"
    );
}

#[test]
fn zero_wrap_width_is_rejected() {
    let options = CompileOptions { wrap_width: 0, ..CompileOptions::default() };
    assert!(matches!(Compiler::new(options), Err(TalkieError::InvalidOption(_))));
}

#[test]
fn unknown_encoding_is_rejected() {
    let options = CompileOptions { encoding: "no-such-encoding".to_string(), ..CompileOptions::default() };
    assert!(matches!(Compiler::new(options), Err(TalkieError::InvalidOption(_))));
}

#[test]
fn latin1_sources_are_decoded() {
    let options = CompileOptions { encoding: "windows-1252".to_string(), ..CompileOptions::default() };
    let compiler = Compiler::new(options).expect("compiler");
    let bytes = b"// caf\xE9\nconst byte spCAFE [] PROGMEM = {0x01};\n";
    let text = compiler.decode_source(bytes).expect("decode");
    assert!(text.starts_with("// caf\u{e9}"));
    assert_eq!(compiler.parse_source("cafe.ino", &text).expect("parse").len(), 1);
}
