//! Model-based property tests for the medical ledger.
//!
//! Random operation sequences are applied both to the contract and to a plain
//! in-memory model; after every step the observable ledger state must match
//! the model, and rejected calls must leave it untouched.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

use std::collections::HashMap;

use medical_ledger::{LedgerError, MedicalLedgerContract, MedicalLedgerContractClient};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, Env, String};

const PATIENTS: usize = 2;
const PROVIDERS: usize = 3;

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Grant {
        #[proptest(strategy = "0..PATIENTS")]
        patient: usize,
        #[proptest(strategy = "0..PROVIDERS")]
        provider: usize,
    },
    Revoke {
        #[proptest(strategy = "0..PATIENTS")]
        patient: usize,
        #[proptest(strategy = "0..PROVIDERS")]
        provider: usize,
    },
    Add {
        #[proptest(strategy = "0..PATIENTS")]
        patient: usize,
        #[proptest(strategy = "0..PROVIDERS")]
        provider: usize,
    },
    Verify {
        #[proptest(strategy = "0..PATIENTS")]
        patient: usize,
        #[proptest(strategy = "0u32..6")]
        index: u32,
    },
    Read {
        #[proptest(strategy = "0..PATIENTS")]
        patient: usize,
        #[proptest(strategy = "0..PROVIDERS")]
        provider: usize,
    },
}

#[derive(Default)]
struct Model {
    grants: HashMap<(usize, usize), bool>,
    verified: HashMap<usize, std::vec::Vec<bool>>,
    reads: HashMap<usize, std::vec::Vec<usize>>,
}

impl Model {
    fn permitted(&self, patient: usize, provider: usize) -> bool {
        self.grants.get(&(patient, provider)).copied().unwrap_or(false)
    }

    fn records(&mut self, patient: usize) -> &mut std::vec::Vec<bool> {
        self.verified.entry(patient).or_default()
    }
}

struct Fixture {
    env: Env,
    client: MedicalLedgerContractClient<'static>,
    admin: Address,
    validator: Address,
    providers: std::vec::Vec<Address>,
    patients: std::vec::Vec<String>,
}

impl Fixture {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        let contract_id = env.register(MedicalLedgerContract, ());
        let client = MedicalLedgerContractClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        let validator = Address::generate(&env);
        client.initialize(&admin, &validator);

        let providers = (0..PROVIDERS).map(|_| Address::generate(&env)).collect();
        let patients = (0..PATIENTS)
            .map(|i| String::from_str(&env, if i == 0 { "patient-a" } else { "patient-b" }))
            .collect();

        Self {
            env,
            client,
            admin,
            validator,
            providers,
            patients,
        }
    }

    fn apply(&self, model: &mut Model, op: &Op) -> Result<(), TestCaseError> {
        let client = &self.client;
        match *op {
            Op::Grant { patient, provider } => {
                client.grant_access(&self.admin, &self.patients[patient], &self.providers[provider]);
                model.grants.insert((patient, provider), true);
            }
            Op::Revoke { patient, provider } => {
                client.revoke_access(&self.admin, &self.patients[patient], &self.providers[provider]);
                model.grants.insert((patient, provider), false);
            }
            Op::Add { patient, provider } => {
                let result = client.try_add_record(
                    &self.providers[provider],
                    &self.patients[patient],
                    &String::from_str(&self.env, "hash"),
                    &String::from_str(&self.env, "label"),
                );
                if model.permitted(patient, provider) {
                    let expected = model.records(patient).len() as u32;
                    prop_assert_eq!(result, Ok(Ok(expected)));
                    model.records(patient).push(false);
                } else {
                    prop_assert_eq!(result, Err(Ok(LedgerError::PermissionDenied)));
                }
            }
            Op::Verify { patient, index } => {
                let result = client.try_verify_record(&self.validator, &self.patients[patient], &index);
                let records = model.records(patient);
                if (index as usize) < records.len() {
                    prop_assert_eq!(result, Ok(Ok(())));
                    records[index as usize] = true;
                } else {
                    prop_assert_eq!(result, Err(Ok(LedgerError::InvalidIndex)));
                }
            }
            Op::Read { patient, provider } => {
                let result = client.try_get_records(&self.providers[provider], &self.patients[patient]);
                if model.permitted(patient, provider) {
                    let records = result.expect("permitted read").expect("decodes");
                    let expected = model.records(patient).clone();
                    prop_assert_eq!(records.len() as usize, expected.len());
                    for (i, record) in records.iter().enumerate() {
                        prop_assert_eq!(record.verified, expected[i]);
                    }
                    model.reads.entry(patient).or_default().push(provider);
                } else {
                    prop_assert_eq!(result, Err(Ok(LedgerError::PermissionDenied)));
                }
            }
        }
        Ok(())
    }

    fn check(&self, model: &mut Model) -> Result<(), TestCaseError> {
        for (p, patient) in self.patients.iter().enumerate() {
            prop_assert_eq!(
                self.client.record_count(patient) as usize,
                model.records(p).len()
            );

            let logs = self.client.get_access_logs(&self.admin, patient);
            let reads = model.reads.get(&p).cloned().unwrap_or_default();
            prop_assert_eq!(logs.len() as usize, reads.len());
            for (i, entry) in logs.iter().enumerate() {
                prop_assert_eq!(&entry.accessed_by, &self.providers[reads[i]]);
            }
            prop_assert!(self.client.verify_audit_chain(&self.admin, patient));

            for (q, provider) in self.providers.iter().enumerate() {
                prop_assert_eq!(self.client.is_permitted(patient, provider), model.permitted(p, q));
            }
        }
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// **Property**: the ledger tracks a simple model of grants, appends,
    /// verifications and audited reads through any operation sequence.
    #[test]
    fn prop_ledger_matches_model(ops in proptest::collection::vec(any::<Op>(), 1..30)) {
        let fixture = Fixture::new();
        let mut model = Model::default();

        for op in &ops {
            fixture.apply(&mut model, op)?;
            fixture.check(&mut model)?;
        }
    }

    /// **Property**: verification never reverts, however often it is repeated.
    #[test]
    fn prop_verification_is_monotonic(repeats in 1usize..5, records in 1u32..5) {
        let fixture = Fixture::new();
        let patient = &fixture.patients[0];
        let provider = &fixture.providers[0];
        fixture.client.grant_access(&fixture.admin, patient, provider);
        for _ in 0..records {
            fixture.client.add_record(
                provider,
                patient,
                &String::from_str(&fixture.env, "hash"),
                &String::from_str(&fixture.env, "label"),
            );
        }

        for _ in 0..repeats {
            fixture.client.verify_record(&fixture.validator, patient, &0);
        }

        let records = fixture.client.get_records(provider, patient);
        prop_assert!(records.get(0).unwrap().verified);
        for record in records.iter().skip(1) {
            prop_assert!(!record.verified);
        }
    }
}
