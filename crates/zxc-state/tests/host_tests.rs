//! Transactions through the reference host: nested calls, creates and rollback

use zxc_crypto::create_address;
use zxc_evm::{Message, Revision, StatusCode, VmConfig, H256, U256};
use zxc_primitives::Address;
use zxc_state::{Account, MemoryHost};

const ALICE: Address = Address::from_bytes([0xA1; 20]);
const BOB: Address = Address::from_bytes([0xB0; 20]);
const CONTRACT: Address = Address::from_bytes([0xC0; 20]);
const CALLEE: Address = Address::from_bytes([0xCE; 20]);

/// Runtime code returning the word 42
const RUNTIME: &str = "602a60005260206000f3";

fn code(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str.replace(' ', "")).unwrap()
}

fn word(n: u64) -> H256 {
    H256::from_word(&U256::from(n))
}

fn word_bytes(value: U256) -> Vec<u8> {
    H256::from_word(&value).as_bytes().to_vec()
}

/// Init code that deploys `RUNTIME`
fn init_code() -> Vec<u8> {
    code(&format!("69{RUNTIME} 6000 52 600a 6016 f3"))
}

fn funded_host(revision: Revision) -> MemoryHost {
    let mut host = MemoryHost::new(VmConfig::for_revision(revision));
    host.set_account(ALICE, Account::with_balance(U256::from(1_000_000u64)));
    host
}

// ==================== Calls ====================

#[test]
fn test_plain_value_transfer() {
    let mut host = funded_host(Revision::Istanbul);
    let msg = Message::call(ALICE, BOB, 50_000).with_value(U256::from(10u64));
    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.gas_left, 50_000);
    assert_eq!(host.balance(&BOB), U256::from(10u64));
    assert_eq!(host.balance(&ALICE), U256::from(999_990u64));
}

#[test]
fn test_value_transfer_without_funds() {
    let mut host = funded_host(Revision::Istanbul);
    let msg = Message::call(BOB, ALICE, 50_000).with_value(U256::one());
    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.status_code, StatusCode::Failure);
    assert!(host.account(&BOB).is_none());
}

#[test]
fn test_call_chain_stops_at_depth_limit() {
    // CALL(self, all gas), then increment slot 0
    let program = code("6000 6000 6000 6000 6000 30 5a f1 50 6000 54 6001 01 6000 55 00");
    let config = VmConfig {
        max_call_depth: 4,
        ..VmConfig::default()
    };
    let mut host = MemoryHost::new(config);
    host.deploy(CONTRACT, program);

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 1_000_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    // Frames at depth 0 through 4 each ran to completion
    assert_eq!(host.storage(&CONTRACT, &word(0)), word(5));
}

#[test]
fn test_call_chain_at_default_depth_limit() {
    let program = code("6000 6000 6000 6000 6000 30 5a f1 50 6000 54 6001 01 6000 55 00");
    let mut host = MemoryHost::default();
    assert_eq!(host.config().max_call_depth, 1024);
    host.deploy(CONTRACT, program);

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 1_000_000_000_000_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    // Depths 0 through 1024 all ran; only the call out of depth 1024 failed
    assert_eq!(host.storage(&CONTRACT, &word(0)), word(1025));
}

#[test]
fn test_reverted_callee_rolls_back() {
    let mut host = funded_host(Revision::Istanbul);
    host.set_account(CONTRACT, Account::with_balance(U256::from(10u64)));
    // SSTORE(0, 1), LOG0, REVERT
    host.deploy(CALLEE, code("6001 6000 55 6000 6000 a0 6000 6000 fd"));
    // CALL callee with value 5, return the success flag
    host.deploy(
        CONTRACT,
        code(&format!(
            "6000 6000 6000 6000 6005 73{} 61ffff f1 6000 52 6020 6000 f3",
            hex::encode(CALLEE.as_bytes())
        )),
    );

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 200_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.output, vec![0u8; 32]);
    assert!(outcome.logs.is_empty());
    assert_eq!(host.storage(&CALLEE, &word(0)), H256::ZERO);
    assert_eq!(host.balance(&CONTRACT), U256::from(10u64));
    assert_eq!(host.balance(&CALLEE), U256::zero());
}

#[test]
fn test_failed_transaction_discards_logs() {
    let mut host = funded_host(Revision::Istanbul);
    // LOG0 then an invalid instruction
    host.deploy(CONTRACT, code("6000 6000 a0 fe"));
    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::InvalidInstruction);
    assert_eq!(outcome.result.gas_left, 0);
    assert!(outcome.logs.is_empty());
    assert!(host.logs().is_empty());
}

#[test]
fn test_logs_are_returned() {
    let mut host = funded_host(Revision::Istanbul);
    // MSTORE8(0, 0xab), LOG1(0, 1, topic 7)
    host.deploy(CONTRACT, code("60ab 6000 53 6007 6001 6000 a1 00"));
    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.logs.len(), 1);
    assert_eq!(outcome.logs[0].address, CONTRACT);
    assert_eq!(outcome.logs[0].topics, vec![word(7)]);
    assert_eq!(outcome.logs[0].data, vec![0xab]);
}

// ==================== Storage and sub-state ====================

#[test]
fn test_sstore_clear_refund() {
    let mut host = funded_host(Revision::Istanbul);
    host.deploy(CONTRACT, code("6000 6000 55 00"));
    let mut account = host.account(&CONTRACT).cloned().unwrap();
    account.set_storage_value(word(0), word(1));
    host.set_account(CONTRACT, account);

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.gas_used(100_000), 5006);
    assert_eq!(outcome.substate.refunds, 15_000);
    assert_eq!(host.storage(&CONTRACT, &word(0)), H256::ZERO);
}

#[test]
fn test_sstore_set_then_reset_is_cheap_in_istanbul() {
    let mut host = funded_host(Revision::Istanbul);
    // SSTORE(0, 1), SSTORE(0, 2)
    host.deploy(CONTRACT, code("6001 6000 55 6002 6000 55 00"));
    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.result.gas_used(100_000), 12 + 20_000 + 800);
    assert_eq!(host.storage(&CONTRACT, &word(0)), word(2));
}

#[test]
fn test_sstore_clear_after_modify_refunds_in_istanbul() {
    let mut host = funded_host(Revision::Istanbul);
    // SSTORE(0, 6), SSTORE(0, 0) on a slot holding 5
    host.deploy(CONTRACT, code("6006 6000 55 6000 6000 55 00"));
    let mut account = host.account(&CONTRACT).cloned().unwrap();
    account.set_storage_value(word(0), word(5));
    host.set_account(CONTRACT, account);

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.gas_used(100_000), 12 + 5_000 + 5_000);
    assert_eq!(outcome.substate.refunds, 15_000);
    assert_eq!(host.storage(&CONTRACT, &word(0)), H256::ZERO);
}

#[test]
fn test_selfdestruct_applied_at_finalize() {
    let mut host = funded_host(Revision::Istanbul);
    host.set_account(CONTRACT, Account::with_balance(U256::from(77u64)));
    host.deploy(
        CONTRACT,
        code(&format!("73{} ff", hex::encode(BOB.as_bytes()))),
    );

    let outcome = host.execute_transaction(&Message::call(ALICE, CONTRACT, 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert!(outcome.substate.selfdestructs.contains(&CONTRACT));
    assert!(host.account(&CONTRACT).is_none());
    assert_eq!(host.balance(&BOB), U256::from(77u64));
}

// ==================== Creates ====================

#[test]
fn test_create_deploys_runtime() {
    let mut host = funded_host(Revision::Istanbul);
    let outcome = host.execute_transaction(&Message::create(ALICE, init_code(), 100_000));
    let expected = create_address(&ALICE, 0);

    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.create_address, Some(expected));
    // 18 for the init code, 200 per deployed byte
    assert_eq!(outcome.result.gas_left, 100_000 - 18 - 2_000);
    assert_eq!(host.code(&expected), code(RUNTIME).as_slice());
    assert_eq!(host.nonce(&ALICE), 1);
    assert_eq!(host.nonce(&expected), 1);

    let outcome = host.execute_transaction(&Message::call(ALICE, expected, 100_000));
    assert_eq!(outcome.result.output, word_bytes(U256::from(42u64)));
}

#[test]
fn test_nested_create_from_factory() {
    let mut host = funded_host(Revision::Istanbul);
    // CALLDATACOPY(0, 0, size), CREATE(0, 0, size), return the address
    host.deploy(CONTRACT, code("36 6000 6000 37 36 6000 6000 f0 6000 52 6020 6000 f3"));

    let msg = Message::call(ALICE, CONTRACT, 200_000).with_input(init_code());
    let outcome = host.execute_transaction(&msg);
    let expected = create_address(&CONTRACT, 0);

    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.output, word_bytes(expected.to_word()));
    assert_eq!(host.code(&expected), code(RUNTIME).as_slice());
    assert_eq!(host.nonce(&CONTRACT), 1);
}

#[test]
fn test_reverted_create_keeps_sender_nonce() {
    let mut host = funded_host(Revision::Istanbul);
    let outcome = host.execute_transaction(&Message::create(ALICE, code("6000 6000 fd"), 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::Revert);
    assert_eq!(outcome.result.create_address, None);
    assert!(host.account(&create_address(&ALICE, 0)).is_none());
    assert_eq!(host.nonce(&ALICE), 1);
}

#[test]
fn test_code_deposit_out_of_gas() {
    let init = init_code();

    let mut host = funded_host(Revision::Istanbul);
    let outcome = host.execute_transaction(&Message::create(ALICE, init.clone(), 118));
    assert_eq!(outcome.result.status_code, StatusCode::OutOfGas);
    assert!(host.account(&create_address(&ALICE, 0)).is_none());

    // Frontier keeps the account but drops the code
    let mut host = funded_host(Revision::Frontier);
    let outcome = host.execute_transaction(&Message::create(ALICE, init, 118));
    let expected = create_address(&ALICE, 0);
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.create_address, Some(expected));
    assert_eq!(outcome.result.gas_left, 100);
    assert!(host.account(&expected).is_some());
    assert!(host.code(&expected).is_empty());
}

#[test]
fn test_create_collision() {
    let mut host = funded_host(Revision::Istanbul);
    host.deploy(create_address(&ALICE, 0), vec![0x00]);
    let outcome = host.execute_transaction(&Message::create(ALICE, init_code(), 100_000));
    assert_eq!(outcome.result.status_code, StatusCode::Failure);
    assert_eq!(outcome.result.gas_left, 0);
}

// ==================== Ledger tables ====================

/// MSTORE8 't' at 0, copy call data to 32, CREATETABLE(ADDRESS, "t", data)
fn create_table_program(trailer: &str) -> Vec<u8> {
    code(&format!(
        "6074 6000 53 36 6000 6020 37 36 6020 6001 6000 30 c0 {trailer}"
    ))
}

#[test]
fn test_create_table_opcode() {
    let mut host = funded_host(Revision::Istanbul);
    host.deploy(CONTRACT, create_table_program("6000 52 6020 6000 f3"));
    let msg = Message::call(ALICE, CONTRACT, 100_000).with_input(br#"["k","v"]"#.to_vec());

    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert_eq!(outcome.result.output, word_bytes(U256::one()));
    let table = host.tables().table(&CONTRACT, "t").unwrap();
    assert_eq!(table.columns, vec!["k".to_string(), "v".to_string()]);

    // Second creation fails with status 1, reported as 0 on the stack
    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.output, vec![0u8; 32]);
}

#[test]
fn test_unsubmitted_table_transaction_is_rolled_back() {
    let mut host = funded_host(Revision::Istanbul);
    // TRANSBEGIN, CREATETABLE, STOP without TRANSCOMMIT
    let mut program = code("c8");
    program.extend(create_table_program("00"));
    host.deploy(CONTRACT, program);
    let msg = Message::call(ALICE, CONTRACT, 100_000).with_input(br#"["k"]"#.to_vec());

    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.status_code, StatusCode::Success);
    assert!(host.tables().is_empty());
}

#[test]
fn test_table_changes_revert_with_frame() {
    let mut host = funded_host(Revision::Istanbul);
    // CREATETABLE then REVERT
    host.deploy(CONTRACT, create_table_program("6000 6000 fd"));
    let msg = Message::call(ALICE, CONTRACT, 100_000).with_input(br#"["k"]"#.to_vec());

    let outcome = host.execute_transaction(&msg);
    assert_eq!(outcome.result.status_code, StatusCode::Revert);
    assert!(host.tables().is_empty());
}
