use std::fs::File;
use std::io::Write;

use acc_config::{load_gain_schedule_csv, read_gain_schedule_csv};
use rstest::rstest;
use tempfile::tempdir;

const GOOD: &str = "mode,alpha,tau,beta
no_wave,0.15,2.0,0.424
into_wave,0.7,2.4,0.23
in_wave,0.2,2.5,0.35
out_of_wave,1.1,2.4,0.24
";

#[rstest]
fn loads_complete_schedule_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gains.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(GOOD.as_bytes()).unwrap();
    drop(f);

    let t = load_gain_schedule_csv(&path).unwrap();
    assert_eq!(t.no_wave.beta, 0.424);
    assert_eq!(t.into_wave.alpha, 0.7);
    assert_eq!(t.in_wave.tau, 2.5);
    assert_eq!(t.out_of_wave.alpha, 1.1);
}

#[rstest]
fn tolerates_whitespace_around_fields() {
    let csv = "mode, alpha, tau, beta\n no_wave ,0.1,1,0.2\ninto_wave,0.1,1,0.2\nin_wave,0.1,1,0.2\nout_of_wave,0.1,1,0.2\n";
    let t = read_gain_schedule_csv(csv.as_bytes()).unwrap();
    assert_eq!(t.no_wave.alpha, 0.1);
}

#[rstest]
#[case::wrong_headers("mode,a,t,b\nno_wave,1,1,1\n", "headers 'mode,alpha,tau,beta'")]
#[case::unknown_mode(
    "mode,alpha,tau,beta\ncruise,1,1,1\n",
    "unknown mode 'cruise'"
)]
#[case::duplicate(
    "mode,alpha,tau,beta\nno_wave,1,1,1\nno_wave,1,1,1\n",
    "more than once"
)]
#[case::missing(
    "mode,alpha,tau,beta\nno_wave,1,1,1\nin_wave,1,1,1\n",
    "missing modes: into_wave, out_of_wave"
)]
#[case::not_a_number("mode,alpha,tau,beta\nno_wave,fast,1,1\n", "invalid CSV row 2")]
#[case::non_finite("mode,alpha,tau,beta\nno_wave,NaN,1,1\n", "alpha for no_wave must be finite")]
fn rejects_bad_schedule(#[case] csv: &str, #[case] expected: &str) {
    let err = read_gain_schedule_csv(csv.as_bytes()).unwrap_err();
    assert!(
        format!("{err}").contains(expected),
        "expected '{expected}', got '{err}'"
    );
}

#[rstest]
fn missing_file_names_path() {
    let dir = tempdir().unwrap();
    let err = load_gain_schedule_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err}").contains("nope.csv"));
}
