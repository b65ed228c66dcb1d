use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use nalgebra::Vector3;
use precision_analysis::geometry::{EulerZyx, Point, Transform};
use precision_analysis::io::{format_record, PoseRecord};
use predicates::prelude::*;
use std::process::Command;

fn record(id: usize, t: &Transform) -> String {
    let point = Point::from_orientation(t.translation, EulerZyx::from_rotation(&t.rotation));
    format_record(&PoseRecord::new(id.to_string(), point))
}

/// Writes two pose files related by fixed X and Y transforms.
fn write_pose_pair(dir: &assert_fs::TempDir, n: usize) -> (String, String) {
    let x = Transform::compose(
        EulerZyx::from_degrees(20.0, -10.0, 35.0).to_rotation(),
        Vector3::new(12.0, -5.0, 30.0),
    );
    let y = Transform::compose(
        EulerZyx::from_degrees(-60.0, 15.0, 12.0).to_rotation(),
        Vector3::new(-200.0, 150.0, 40.0),
    );
    let mut a_text = String::new();
    let mut b_text = String::new();
    for i in 0..n {
        let f = i as f64;
        let b = Transform::compose(
            EulerZyx::from_degrees(20.0 * f, 15.0 * (1.3 * f).sin(), 17.0 * (0.7 * f).cos())
                .to_rotation(),
            Vector3::new(100.0 + 10.0 * f, 50.0 * f.sin(), 20.0 * f.cos()),
        );
        let a = y * b * x.inverse();
        a_text.push_str(&record(i, &a));
        a_text.push('\n');
        b_text.push_str(&record(i, &b));
        b_text.push('\n');
    }
    let fa = dir.child("a.txt");
    let fb = dir.child("b.txt");
    fa.write_str(&a_text).unwrap();
    fb.write_str(&b_text).unwrap();
    (
        fa.path().to_str().unwrap().to_string(),
        fb.path().to_str().unwrap().to_string(),
    )
}

#[test]
fn calibrate_all_methods() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (a, b) = write_pose_pair(&dir, 8);

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "--file-a", a.as_str(), "--file-b", b.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Translation errors (mm):"))
        .stdout(predicate::str::contains("Rotation errors (deg):"))
        .stdout(predicate::str::contains("| tsai-lenz"))
        .stdout(predicate::str::contains("| shah"))
        .stdout(predicate::str::contains("ERR").not());
    dir.close().unwrap();
}

#[test]
fn calibrate_single_method_prints_matrices() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (a, b) = write_pose_pair(&dir, 8);

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "-m", "park", "-a", a.as_str(), "-b", b.as_str(), "--print-xy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| park-martin"))
        .stdout(predicate::str::contains("| daniilidis").not())
        .stdout(predicate::str::contains("X =\n[ "))
        .stdout(predicate::str::contains("Y =\n[ "))
        .stdout(predicate::str::contains("[ 0.0000 0.0000 0.0000 1.0000 ]"));
    dir.close().unwrap();
}

#[test]
fn calibrate_json_report() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (a, b) = write_pose_pair(&dir, 6);

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "-m", "shah", "-a", a.as_str(), "-b", b.as_str(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"method\": \"shah\""))
        .stdout(predicate::str::contains("\"poses\": 6"))
        .stdout(predicate::str::contains("\"rmse\""));
    dir.close().unwrap();
}

#[test]
fn calibrate_reports_failing_methods() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (a, b) = write_pose_pair(&dir, 2);

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "-a", a.as_str(), "-b", b.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\| tsai-lenz\s+\| ERR\s+\|").unwrap());
    dir.close().unwrap();
}

#[test]
fn calibrate_unknown_method() {
    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "--method", "magic"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown method 'magic'"));
}

#[test]
fn calibrate_missing_file() {
    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "-a", "/no/such/a.txt", "-b", "/no/such/b.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Error reading inputs"));
}

#[test]
fn calibrate_rejects_non_finite_values() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (_, b) = write_pose_pair(&dir, 5);
    let bad = dir.child("bad.txt");
    bad.write_str("0 nan 1 2 0 0 0\n1 1 2 3 10 20 30\n").unwrap();

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["calibrate", "-a", bad.path().to_str().unwrap(), "-b", b.as_str()])
        .assert()
        .success()
        .stderr(predicate::str::contains("X value 'nan' is not finite"));
    dir.close().unwrap();
}

#[test]
fn parse_command() {
    let file = assert_fs::NamedTempFile::new("poses.txt").unwrap();
    file.write_str("0 100.0 200.0 300.0 45.0 30.0 15.0\nnot a pose\n1, 1, 2, 3, 0, 0, 90\n")
        .unwrap();

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args(["parse", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0: 100.000,200.000,300.000 | 45.000,30.000,15.000",
        ))
        .stdout(predicate::str::contains("1: 1.000,2.000,3.000 | 0.000,0.000,90.000"))
        .stdout(predicate::str::contains("Parsed 2 points"));
}

#[test]
fn gaussian_noise_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("in.txt");
    input
        .write_str("0 100.0 200.0 300.0 45.0 30.0 15.0\n1 101.0 201.0 301.0 46.0 31.0 16.0\n")
        .unwrap();
    let output = dir.child("out.txt");

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args([
            "noise",
            "gaussian",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--pos-std",
            "0",
            "--rot-std",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 records"));

    output.assert(predicate::str::starts_with(
        "0 100.000000 200.000000 300.000000 45.000000 30.000000 15.000000\n1 ",
    ));
    dir.close().unwrap();
}

#[test]
fn gaussian_noise_rejects_correlation() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("in.txt");
    input.write_str("0 1 2 3 0 0 0\n").unwrap();
    let output = dir.child("out.txt");

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args([
            "noise",
            "gaussian",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--correlation",
            "1.5",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid noise settings"));

    output.assert(predicate::path::missing());
    dir.close().unwrap();
}

#[test]
fn perlin_noise_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("in.txt");
    input
        .write_str("A 0 0 0 0 0 0\nB 1 1 1 10 10 10\nC 2 2 2 20 20 20\n")
        .unwrap();
    let output = dir.child("out.txt");

    Command::cargo_bin("precision_analysis_cli")
        .unwrap()
        .args([
            "noise",
            "perlin",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--pos-scale",
            "2.0",
            "--seed",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 records"));

    output.assert(predicate::str::contains("\nB ").and(predicate::str::contains("\nC ")));
    dir.close().unwrap();
}
