use std::fs;

use assert_cmd::Command;
use lit_triage::data::{
    sample::{Sample, SampleType},
    sample_set::{SampleSet, WriteOptions},
};

fn cmd() -> Command {
    Command::cargo_bin("lit-triage").expect("binary exists")
}

#[test]
fn cli_help_runs() {
    cmd().arg("--help").assert().success();
}

#[test]
fn figtext_reads_stdin() {
    cmd()
        .args(["figtext", "--mode", "legends"])
        .write_stdin("Figure 1: cap text\n\nSome other para\n\nFigure 2: cap2")
        .assert()
        .success()
        .stdout("Figure 1: cap text\n----------\nFigure 2: cap2\n----------\n");
}

#[test]
fn preprocess_drops_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("samples.txt");
    let output = dir.path().join("out.txt");

    let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
    for (id, title) in [("1", "Mouse models"), ("2", "Zebrafish fins")] {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample.set_id(id).set_title(title);
        set.add_sample(sample).unwrap();
    }
    set.write_path(&input, WriteOptions::default()).unwrap();

    cmd()
        .arg("preprocess")
        .arg(&input)
        .args(["--steps", "rejectIfNoMice,featureTransform", "--omit-rejects", "-o"])
        .arg(&output)
        .assert()
        .success();

    let mut result = SampleSet::new(None);
    result.read_text(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(result.sample_ids(false), vec!["1"]);
    assert_eq!(result.samples(false)[0].title(), "mice models");
}

fn read_output(path: &std::path::Path) -> SampleSet {
    let mut set = SampleSet::new(None);
    set.read_text(&fs::read_to_string(path).unwrap()).unwrap();
    set
}

#[test]
fn rows_converts_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rows.csv");
    let output = dir.path().join("samples.txt");
    fs::write(
        &input,
        "pubmed,isdiscard,journal,title,abstract,ext_text\n\
         11,0,Genes Dev,Mouse knockouts;,A1,see Table 1;\n\
         12,1,Cell,T2|x,A2,X2\n",
    )
    .unwrap();

    cmd()
        .arg("rows")
        .arg(&input)
        .args(["--sample-type", "PrimTriageClassifiedSample", "--host", "dbhost", "-o"])
        .arg(&output)
        .assert()
        .success();

    let set = read_output(&output);
    assert_eq!(set.sample_type(), Some(SampleType::PrimTriageClassified));
    assert_eq!(set.meta_item("host"), Some("dbhost"));
    assert_eq!(set.sample_ids(false), vec!["11", "12"]);
    assert_eq!(set.num_positives(), 1);
    assert_eq!(set.num_negatives(), 1);
    let first = set.samples(false)[0];
    assert_eq!(first.title(), "Mouse knockouts;");
    assert_eq!(first.extracted_text(), "see Table 1;");
    assert_eq!(set.samples(false)[1].title(), "T2 x");
}

#[test]
fn split_partitions_samples() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("samples.txt");
    let retained = dir.path().join("retained.txt");
    let leftover = dir.path().join("leftover.txt");

    let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
    for i in 0..10 {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample.set_id(i.to_string()).set_title("title");
        set.add_sample(sample).unwrap();
    }
    set.write_path(&input, WriteOptions::default()).unwrap();

    cmd()
        .arg("split")
        .arg(&input)
        .args(["--fraction", "0.3", "--seed", "4", "--retained"])
        .arg(&retained)
        .arg("--leftover")
        .arg(&leftover)
        .assert()
        .success();

    let retained = read_output(&retained);
    let leftover = read_output(&leftover);
    assert_eq!(retained.len(), 3);
    assert_eq!(leftover.len(), 7);
    let mut ids: Vec<&str> = retained
        .sample_ids(false)
        .into_iter()
        .chain(leftover.sample_ids(false))
        .collect();
    ids.sort_unstable_by_key(|id| id.parse::<u32>().unwrap());
    assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
}
