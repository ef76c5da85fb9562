use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn file_with(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const PORTFOLIO: &str = "name,shares,price\nAA,100,32.20\nIBM,50,91.10\nCAT,150,83.44\n";

const RIDES: &str = "route,date,daytype,rides\n\
                     22,02/02/2011,W,1000\n\
                     22,02/03/2011,W,1100\n\
                     22,06/01/2001,W,400\n\
                     3,02/02/2011,W,700\n\
                     3,06/01/2001,W,900\n";

fn tabula() -> Command {
    Command::cargo_bin("tabula").unwrap()
}

#[test]
fn show_text_table() {
    let file = file_with(".csv", PORTFOLIO);
    tabula()
        .args(["show", "--types", "str,int,float", "--columns", "name,price"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(" name  price\n-------------\n   AA   32.2\n  IBM   91.1\n  CAT  83.44\n");
}

#[test]
fn show_csv_slice_in_row_layout() {
    let file = file_with(".csv", PORTFOLIO);
    tabula()
        .args(["show", "--format", "csv", "--layout", "rows", "--start", "1", "--end", "2"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("name,shares,price\nIBM,50,91.10\n");
}

#[test]
fn show_html() {
    let file = file_with(".csv", PORTFOLIO);
    tabula()
        .args(["show", "-f", "html", "-c", "name"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<tr> <th>name</th> </tr>\n<tr> <td>AA</td> </tr>"));
}

#[test]
fn unknown_format_fails_before_reading() {
    tabula()
        .args(["show", "--format", "xml", "/nonexistent/file.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown output format 'xml'"));
}

#[test]
fn missing_column_fails() {
    let file = file_with(".csv", PORTFOLIO);
    tabula()
        .args(["show", "--columns", "name,sector"])
        .arg(file.path())
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("no field 'sector'"));
}

#[test]
fn sum_with_skipped_rows() {
    let file = file_with(".csv", "route,date,daytype,rides\n22,02/02/2011,W,1000\n22,02/03/2011,W,x\n22,02/04/2011,W,1100\n");
    tabula()
        .args(["show", "--types", "str,str,str,int", "--sum", "rides"])
        .arg(file.path())
        .assert()
        .code(1)
        .stdout("2100\n")
        .stderr(predicate::str::contains("Skipped line 3"));
}

#[test]
fn portfolio_cost_csv_and_dat() {
    let csv = file_with(".csv", "name,shares,price\nAA,100,10.0\nIBM,50,2.0\n");
    tabula()
        .arg("cost")
        .arg(csv.path())
        .assert()
        .success()
        .stdout("Total portfolio cost: 1100\n");

    let dat = file_with(".dat", "AA 100 10.0\nIBM 50 2.0\n");
    tabula()
        .args(["cost", "--show", "csv"])
        .arg(dat.path())
        .assert()
        .success()
        .stdout("name,shares,price\nAA,100,10\nIBM,50,2\n\nTotal portfolio cost: 1100\n");
}

#[test]
fn portfolio_cost_with_skipped_rows() {
    let csv = file_with(".csv", "name,shares,price\nAA,100,10.0\nIBM,x,2.0\n");
    tabula()
        .arg("cost")
        .arg(csv.path())
        .assert()
        .code(1)
        .stdout("Total portfolio cost: 1000\n");

    let dat = file_with(".dat", "AA 100 10.0\nIBM x 2.0\n");
    tabula()
        .arg("cost")
        .arg(dat.path())
        .assert()
        .code(1)
        .stdout("Total portfolio cost: 1000\n");
}

#[test]
fn rides_report() {
    let file = file_with(".csv", RIDES);
    tabula()
        .args(["rides", "--route", "22", "--date", "02/02/2011", "--format", "csv"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Routes: 2\n"))
        .stdout(predicate::str::contains("Rides on route 22 on February 02, 2011: 1000\n"))
        .stdout(predicate::str::contains("route,rides\n22,2500\n3,1600\n"))
        .stdout(predicate::str::contains("Greatest increase 2001 to 2011:\n22: 1700\n"));
}
