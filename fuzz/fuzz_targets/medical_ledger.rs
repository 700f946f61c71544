#![no_main]

//! Fuzz harness for `medical_ledger`.
//!
//! # What is fuzzed
//!
//! | Target               | What we are looking for                             |
//! |----------------------|-----------------------------------------------------|
//! | `add_record`         | Indices are dense; rejected writes leave no trace   |
//! | `verify_record`      | Verification never reverts; bad indices rejected    |
//! | `grant/revoke`       | Last write wins                                     |
//! | Audited reads        | One audit entry per successful read, none otherwise |
//! | Audit hash chain     | `verify_audit_chain` holds after every sequence     |
//!
//! Every contract call must either succeed or fail with a `LedgerError`; a
//! host-level failure is a crash.

extern crate alloc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use medical_ledger::{LedgerError, MedicalLedgerContract, MedicalLedgerContractClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Env, String};

const PATIENTS: usize = 3;
const PROVIDERS: usize = 3;

// ── Fuzz input types ──────────────────────────────────────────────────────────

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Grant { patient: u8, provider: u8 },
    Revoke { patient: u8, provider: u8 },
    /// `hash_len == 0` submits an empty hash.
    Add { provider: u8, patient: u8, hash_len: u8 },
    Verify { patient: u8, index: u32 },
    /// `purpose_len == 0` reads with the configured default purpose.
    Read { provider: u8, patient: u8, purpose_len: u8 },
    Page { provider: u8, patient: u8, start: u32, limit: u32 },
    Advance { delta: u16 },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// ASCII string of `len` bytes cycling `a`..`z`, clamped to 64 bytes.
fn synthetic_str(len: u8) -> alloc::string::String {
    let n = (len as usize).min(64);
    (0..n).map(|i| (b'a' + (i % 26) as u8) as char).collect()
}

/// Unwraps a `try_*` result, treating host failures as crashes.
fn contract_result<T, C: core::fmt::Debug, I: core::fmt::Debug>(
    result: Result<Result<T, C>, Result<LedgerError, I>>,
) -> Result<T, LedgerError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(err)) => Err(err),
        Ok(Err(conv)) => panic!("return value failed to decode: {:?}", conv),
        Err(Err(invoke)) => panic!("host failure: {:?}", invoke),
    }
}

// ── Fuzz entry point ──────────────────────────────────────────────────────────

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(MedicalLedgerContract, ());
    let client = MedicalLedgerContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let validator = Address::generate(&env);
    client.initialize(&admin, &validator);

    let patients: alloc::vec::Vec<String> = (0..PATIENTS)
        .map(|i| String::from_str(&env, &alloc::format!("patient-{}", i)))
        .collect();
    let providers: alloc::vec::Vec<Address> =
        (0..PROVIDERS).map(|_| Address::generate(&env)).collect();

    // Shadow state: grants, verified flags per record, successful reads.
    let mut granted = [[false; PROVIDERS]; PATIENTS];
    let mut verified: [alloc::vec::Vec<bool>; PATIENTS] = Default::default();
    let mut reads = [0u32; PATIENTS];

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::Grant { patient, provider } => {
                let (p, q) = (patient as usize % PATIENTS, provider as usize % PROVIDERS);
                client.grant_access(&admin, &patients[p], &providers[q]);
                granted[p][q] = true;
            }

            FuzzAction::Revoke { patient, provider } => {
                let (p, q) = (patient as usize % PATIENTS, provider as usize % PROVIDERS);
                client.revoke_access(&admin, &patients[p], &providers[q]);
                granted[p][q] = false;
            }

            FuzzAction::Add {
                provider,
                patient,
                hash_len,
            } => {
                let (p, q) = (patient as usize % PATIENTS, provider as usize % PROVIDERS);
                let hash = String::from_str(&env, &synthetic_str(hash_len));
                let result = contract_result(client.try_add_record(
                    &providers[q],
                    &patients[p],
                    &hash,
                    &String::from_str(&env, "fuzz"),
                ));

                match (granted[p][q], hash_len == 0) {
                    (false, _) => assert_eq!(result, Err(LedgerError::PermissionDenied)),
                    (true, true) => assert_eq!(result, Err(LedgerError::InvalidInput)),
                    (true, false) => {
                        assert_eq!(result, Ok(verified[p].len() as u32));
                        verified[p].push(false);
                    }
                }
            }

            FuzzAction::Verify { patient, index } => {
                let p = patient as usize % PATIENTS;
                let result =
                    contract_result(client.try_verify_record(&validator, &patients[p], &index));
                if (index as usize) < verified[p].len() {
                    assert_eq!(result, Ok(()));
                    verified[p][index as usize] = true;
                } else {
                    assert_eq!(result, Err(LedgerError::InvalidIndex));
                }
            }

            FuzzAction::Read {
                provider,
                patient,
                purpose_len,
            } => {
                let (p, q) = (patient as usize % PATIENTS, provider as usize % PROVIDERS);
                let result = if purpose_len == 0 {
                    contract_result(client.try_get_records(&providers[q], &patients[p]))
                } else {
                    let purpose = String::from_str(&env, &synthetic_str(purpose_len));
                    contract_result(client.try_get_records_for_purpose(
                        &providers[q],
                        &patients[p],
                        &purpose,
                    ))
                };

                if granted[p][q] {
                    let records = result.expect("granted read");
                    assert_eq!(records.len() as usize, verified[p].len());
                    for (i, record) in records.iter().enumerate() {
                        assert_eq!(record.verified, verified[p][i]);
                    }
                    reads[p] += 1;
                } else {
                    assert_eq!(result, Err(LedgerError::PermissionDenied));
                }
            }

            FuzzAction::Page {
                provider,
                patient,
                start,
                limit,
            } => {
                let (p, q) = (patient as usize % PATIENTS, provider as usize % PROVIDERS);
                let result = contract_result(client.try_get_records_page(
                    &providers[q],
                    &patients[p],
                    &None,
                    &start,
                    &limit,
                ));
                match result {
                    Ok(page) => {
                        assert!(granted[p][q]);
                        assert!(page.len() <= limit);
                        reads[p] += 1;
                    }
                    Err(LedgerError::PermissionDenied) => assert!(!granted[p][q]),
                    Err(LedgerError::InvalidInput) => assert!(limit == 0 || limit > 50),
                    Err(other) => panic!("unexpected error {:?}", other),
                }
            }

            FuzzAction::Advance { delta } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now.saturating_add(delta as u64));
            }
        }
    }

    for (p, patient) in patients.iter().enumerate() {
        assert_eq!(client.record_count(patient) as usize, verified[p].len());
        assert_eq!(client.get_audit_head(&admin, patient).count, reads[p]);
        assert!(client.verify_audit_chain(&admin, patient));
    }
});
