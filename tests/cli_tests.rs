//! End-to-end tests of the `msi-scan` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const CHR1: &str = "GGATCCGTAGCTTGACCACACACACACACAGTTCAGGCTAGCATCGGAATTCCGATTAGCAAAAAAAAAAAATGCGTCAGT";

fn msi_scan() -> Command {
    Command::cargo_bin("msi-scan").unwrap()
}

/// Reference with one contig and a BED of three loci, the last without a repeat
fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ref.fa"), format!(">chr1 test\n{CHR1}\n")).unwrap();
    std::fs::write(
        dir.path().join("loci.bed"),
        "track name=msi\nchr1\t18\t30\tCA_locus\nchr1\t60\t72\tA_locus\nchr1\t0\t8\tnone\n",
    )
    .unwrap();
    dir
}

fn path_arg(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

#[test]
fn test_help_lists_subcommands() {
    msi_scan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("identify"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_identify_writes_profiles() {
    let dir = fixtures();
    let d = dir.path();

    msi_scan()
        .args(["identify", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv"), "-t", "2"])
        .assert()
        .success();

    let table = std::fs::read_to_string(d.join("profiles.tsv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two loci with repeats:\n{table}");
    assert!(lines[0].starts_with("chrom\tchromStart\tchromEnd"));
    assert_eq!(lines[1], "chr1\t18\t30\t8\t40\tCA\t2\t16\t30\t14\t7\t\t");
    assert_eq!(lines[2], "chr1\t60\t72\t50\t80\tA\t1\t60\t72\t12\t12\t\t");
}

#[test]
fn test_identify_with_flanks() {
    let dir = fixtures();
    let d = dir.path();

    msi_scan()
        .args(["identify", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv"), "--flank-len", "4"])
        .assert()
        .success();

    let table = std::fs::read_to_string(d.join("profiles.tsv")).unwrap();
    assert!(table.contains("\tCA\t2\t16\t30\t14\t7\tTGAC\tGTTC"));
}

#[test]
fn test_identify_missing_input() {
    let dir = fixtures();
    let d = dir.path();

    msi_scan()
        .args(["identify", "-b", &path_arg(d, "missing.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("missing.bed"));

    assert!(!d.join("profiles.tsv").exists());
}

#[test]
fn test_identify_rejects_unit_length() {
    let dir = fixtures();
    let d = dir.path();

    msi_scan()
        .args(["identify", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv"), "--max-unit-len", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max-unit-len"));
}

#[test]
fn test_identify_unknown_contig() {
    let dir = fixtures();
    let d = dir.path();
    std::fs::write(d.join("other.bed"), "chr9\t10\t20\n").unwrap();

    msi_scan()
        .args(["identify", "-b", &path_arg(d, "other.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chr9"));
}

/// Write a profile table for the scan tests
fn write_profiles(d: &Path) {
    msi_scan()
        .args(["identify", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "profiles.tsv")])
        .assert()
        .success();
}

#[test]
fn test_scan_missing_index() {
    let dir = fixtures();
    let d = dir.path();
    write_profiles(d);
    std::fs::write(d.join("tumor.bam"), b"").unwrap();

    msi_scan()
        .args(["scan", "-p", &path_arg(d, "profiles.tsv")])
        .args(["-o", &path_arg(d, "counts.tsv"), &path_arg(d, "tumor.bam")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index not found"))
        .stderr(predicate::str::contains("tumor.bam"));

    assert!(!d.join("counts.tsv").exists());
}

#[test]
fn test_scan_unsupported_alignment_format() {
    let dir = fixtures();
    let d = dir.path();
    write_profiles(d);
    std::fs::write(d.join("reads.sam"), b"").unwrap();

    msi_scan()
        .args(["scan", "-p", &path_arg(d, "profiles.tsv")])
        .args(["-o", &path_arg(d, "counts.tsv"), &path_arg(d, "reads.sam")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported alignment format"));
}

#[test]
fn test_scan_missing_alignment() {
    let dir = fixtures();
    let d = dir.path();
    write_profiles(d);

    msi_scan()
        .args(["scan", "-p", &path_arg(d, "profiles.tsv")])
        .args(["-o", &path_arg(d, "counts.tsv"), &path_arg(d, "absent.bam")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.bam"));
}

#[test]
fn test_run_checks_inputs_before_work() {
    let dir = fixtures();
    let d = dir.path();

    msi_scan()
        .args(["run", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "counts.tsv"), &path_arg(d, "absent.bam")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.bam"));

    assert!(!d.join("counts.profiles.tsv").exists());
}

#[test]
fn test_run_checks_index_before_identify() {
    let dir = fixtures();
    let d = dir.path();
    std::fs::write(d.join("tumor.bam"), b"").unwrap();

    msi_scan()
        .args(["run", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "counts.tsv"), &path_arg(d, "tumor.bam")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index not found"));

    assert!(!d.join("counts.profiles.tsv").exists());
    assert!(!d.join("counts.tsv").exists());
}

/// `chr1` with the CA run at 16..30 and the A run at 60..72 resized
#[cfg(unix)]
fn variant(ca_copies: usize, a_copies: usize) -> String {
    format!(
        "{}{}{}{}{}",
        &CHR1[..16],
        "CA".repeat(ca_copies),
        &CHR1[30..60],
        "A".repeat(a_copies),
        &CHR1[72..]
    )
}

#[cfg(unix)]
fn sam_text(reads: &[(&str, String)]) -> String {
    let mut text = String::from("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:81\n");
    for (name, seq) in reads {
        text.push_str(&format!(
            "{name}\t0\tchr1\t1\t60\t{}M\t*\t0\t0\t{seq}\t*\n",
            seq.len()
        ));
    }
    text
}

/// Two indexed read-sets and a samtools stand-in that prints their reads
#[cfg(unix)]
fn alignment_fixtures(d: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let tumor = sam_text(&[
        ("t1", variant(7, 12)),
        ("t2", variant(6, 12)),
        ("t3", variant(7, 10)),
    ]);
    let normal = sam_text(&[("n1", variant(7, 12)), ("n2", variant(7, 12))]);
    std::fs::write(d.join("tumor.sam"), tumor).unwrap();
    std::fs::write(d.join("normal.sam"), normal).unwrap();
    for name in ["tumor.bam", "tumor.bam.bai", "normal.bam", "normal.bam.bai"] {
        std::fs::write(d.join(name), b"").unwrap();
    }

    let samtools = d.join("samtools");
    std::fs::write(
        &samtools,
        format!(
            "#!/bin/sh\ncase \"$*\" in\n  *normal.bam*) cat '{}' ;;\n  *) cat '{}' ;;\nesac\n",
            d.join("normal.sam").display(),
            d.join("tumor.sam").display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&samtools, std::fs::Permissions::from_mode(0o755)).unwrap();
    samtools.display().to_string()
}

#[cfg(unix)]
fn expected_rows(d: &Path, delimiter: &str) -> Vec<String> {
    let tumor = path_arg(d, "tumor.bam");
    let normal = path_arg(d, "normal.bam");
    let rows = [
        (&tumor, "18", "30", "CA", "2", "7", "7", "2"),
        (&tumor, "18", "30", "CA", "2", "7", "6", "1"),
        (&tumor, "60", "72", "A", "1", "12", "12", "2"),
        (&tumor, "60", "72", "A", "1", "12", "10", "1"),
        (&normal, "18", "30", "CA", "2", "7", "7", "2"),
        (&normal, "60", "72", "A", "1", "12", "12", "2"),
    ];
    let header = [
        "source",
        "chrom",
        "chromStart",
        "chromEnd",
        "repeat_unit",
        "repeat_unit_length",
        "ref_repeat_times",
        "observed_repeat_times",
        "read_count",
    ];

    std::iter::once(header.join(delimiter))
        .chain(rows.iter().map(|row| {
            let (source, start, end, unit, len, reference, observed, count) = *row;
            [source.as_str(), "chr1", start, end, unit, len, reference, observed, count]
                .join(delimiter)
        }))
        .collect()
}

#[cfg(unix)]
#[test]
fn test_scan_two_read_sets() {
    let dir = fixtures();
    let d = dir.path();
    write_profiles(d);
    let samtools = alignment_fixtures(d);

    msi_scan()
        .args(["scan", "-p", &path_arg(d, "profiles.tsv")])
        .args(["-o", &path_arg(d, "counts.csv"), "--samtools", &samtools])
        .args(["--edge-margin", "5", "-t", "2"])
        .args([&path_arg(d, "tumor.bam"), &path_arg(d, "normal.bam")])
        .assert()
        .success();

    let table = std::fs::read_to_string(d.join("counts.csv")).unwrap();
    let lines: Vec<String> = table.lines().map(str::to_string).collect();
    assert_eq!(lines, expected_rows(d, ","), "{table}");
}

#[cfg(unix)]
#[test]
fn test_run_identifies_then_scans() {
    let dir = fixtures();
    let d = dir.path();
    let samtools = alignment_fixtures(d);

    msi_scan()
        .args(["run", "-b", &path_arg(d, "loci.bed"), "-r", &path_arg(d, "ref.fa")])
        .args(["-o", &path_arg(d, "counts.tsv"), "--samtools", &samtools])
        .args(["--edge-margin", "5"])
        .args([&path_arg(d, "tumor.bam"), &path_arg(d, "normal.bam")])
        .assert()
        .success();

    let profiles = std::fs::read_to_string(d.join("counts.profiles.tsv")).unwrap();
    assert_eq!(profiles.lines().count(), 3);

    let table = std::fs::read_to_string(d.join("counts.tsv")).unwrap();
    let lines: Vec<String> = table.lines().map(str::to_string).collect();
    assert_eq!(lines, expected_rows(d, "\t"), "{table}");
    assert_eq!(lines.iter().filter(|l| l.starts_with("source")).count(), 1);
}
