use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_boundary_numerical_values() {
    let location = "L".repeat(50);
    let row = format!(
        "process_payment, ST1CUSTOMER, 18446744073709551615, 18446744073709551615, ST3VENDOR, 9223372036854775807, BTC, {location}, 30, 20"
    );
    let file = common::calls_file(&[common::SET_ESCROW, &row]).unwrap();

    let mut cmd = Command::new(cargo_bin!("escrow-ledger"));
    cmd.arg(file.path()).arg("--owner").arg("ST1OWNER");

    // fee = floor(9223372036854775807 / 100)
    cmd.assert().success().stdout(predicate::str::contains(format!(
        "18446744073709551615,ST1CUSTOMER,ST3VENDOR,9131138316486228049,92233720368547758,pending,18446744073709551615,BTC,{location},30,20"
    )));
}

#[test]
fn test_out_of_range_fields_are_rejected() {
    let long_location = "L".repeat(51);
    let too_long = format!(
        "process_payment, ST1CUSTOMER, 1, 1, ST3VENDOR, 10, STX, {long_location}, 0, 0"
    );
    let file = common::calls_file(&[
        common::SET_ESCROW,
        &too_long,
        "process_payment, ST1CUSTOMER, 1, 2, ST3VENDOR, 10, STX, Depot, 31, 0",
        "process_payment, ST1CUSTOMER, 1, 3, ST3VENDOR, 10, STX, Depot, 0, 21",
        "process_payment, ST1CUSTOMER, 1, 4, ST3VENDOR, 10, EUR, Depot, 0, 0",
        "process_payment, ST1CUSTOMER, 1, 5, ST1CUSTOMER, 10, STX, Depot, 0, 0",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("escrow-ledger"));
    cmd.arg(file.path()).arg("--owner").arg("ST1OWNER");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pending").not())
        .stderr(predicate::str::contains("code=116"))
        .stderr(predicate::str::contains("code=117"))
        .stderr(predicate::str::contains("code=118"))
        .stderr(predicate::str::contains("code=115"))
        .stderr(predicate::str::contains("code=107"));
}

#[test]
fn test_grace_and_interest_outside_u32() {
    let dir = tempfile::tempdir().unwrap();
    let receipts = dir.path().join("receipts.csv");
    let file = common::calls_file(&[
        common::SET_ESCROW,
        "process_payment, ST1CUSTOMER, 1, 1, ST3VENDOR, 1000, STX, Depot, 4294967296, 0",
        "process_payment, ST1CUSTOMER, 1, 2, ST3VENDOR, 1000, STX, Depot, -1, 0",
        "process_payment, ST1CUSTOMER, 1, 3, ST3VENDOR, 1000, STX, Depot, 0, -20",
        "process_payment, ST1CUSTOMER, 1, 4, ST3VENDOR, 9223372036854775808, STX, Depot, 0, 0",
        "get_payment_count, ST1CUSTOMER, 2",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("escrow-ledger"));
    cmd.arg(file.path())
        .arg("--owner")
        .arg("ST1OWNER")
        .arg("--receipts")
        .arg(&receipts);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "2,ST1CUSTOMER,ST3VENDOR,990,10,pending,1,STX,Depot,-1,0",
        ))
        .stdout(predicate::str::contains(
            "3,ST1CUSTOMER,ST3VENDOR,990,10,pending,1,STX,Depot,0,-20",
        ))
        .stdout(predicate::str::contains("1,ST1CUSTOMER").not())
        .stderr(predicate::str::contains("Error reading call"));

    // The amount past i64::MAX is skipped as malformed; its line is not reused.
    let receipts = std::fs::read_to_string(receipts).unwrap();
    let lines: Vec<&str> = receipts.lines().collect();
    assert_eq!(
        lines,
        vec![
            "line,call,success,value",
            "1,set_escrow_account,true,true",
            "2,process_payment,false,117",
            "3,process_payment,true,2",
            "4,process_payment,true,3",
            "6,get_payment_count,true,2",
        ]
    );
}
