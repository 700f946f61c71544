//! # Medical Ledger Testing Framework
//!
//! A reusable testing harness for the medical ledger contract supporting
//! property-based testing, invariant checking, state exploration, and a
//! declarative scenario DSL.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs             — Core TestEnv, ledger harness, snapshots
//! ├── generators.rs      — Property-based action generators
//! ├── invariants.rs      — State invariant definitions & verification
//! ├── state_explorer.rs  — Action-sequence exploration with invariant checks
//! └── scenario_dsl.rs    — Declarative test scenario builder
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_framework::{LedgerTestHarness, invariants::InvariantSet};
//!
//! let harness = LedgerTestHarness::new(2, 3);
//! harness.grant(0, 1);
//! harness.add_record(1, 0, "hash");
//! InvariantSet::ledger_defaults().assert_all(&harness.snapshot());
//! ```

extern crate std;


use medical_ledger::{
    audit, records, AccessLogEntry, AuditHead, LedgerError, MedicalLedgerContract,
    MedicalLedgerContractClient, MedicalRecord,
};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String,
};

// ── Core Test Environment ────────────────────────────────────────────────────

/// A high-level test environment that wraps the Soroban `Env` and provides
/// time control and address management.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    /// Generate a fresh Soroban address (cached for re-use).
    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Generate `n` distinct addresses.
    pub fn generate_addresses(&mut self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| self.generate_address()).collect()
    }

    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    pub fn string(&self, value: &str) -> String {
        String::from_str(&self.env, value)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Ledger Harness ───────────────────────────────────────────────────────────

/// Pre-wired ledger fixture: an initialized contract, a pool of patients and
/// a pool of providers addressed by index.
pub struct LedgerTestHarness {
    pub env: TestEnv,
    pub client: MedicalLedgerContractClient<'static>,
    pub contract_id: Address,
    pub admin: Address,
    pub validator: Address,
    pub providers: std::vec::Vec<Address>,
    pub patients: std::vec::Vec<String>,
}

impl LedgerTestHarness {
    /// Deploy and initialize a ledger with `num_patients` patient ids and
    /// `num_providers` provider addresses, none of them granted yet.
    pub fn new(num_patients: usize, num_providers: usize) -> Self {
        let mut env = TestEnv::new();
        let contract_id = env.env.register(MedicalLedgerContract, ());
        let client = MedicalLedgerContractClient::new(&env.env, &contract_id);

        let admin = env.generate_address();
        let validator = env.generate_address();
        client.initialize(&admin, &validator);

        let providers = env.generate_addresses(num_providers);
        let patients = (0..num_patients)
            .map(|i| String::from_str(&env.env, &std::format!("patient-{}", i)))
            .collect();

        Self {
            env,
            client,
            contract_id,
            admin,
            validator,
            providers,
            patients,
        }
    }

    pub fn patient(&self, index: usize) -> &String {
        &self.patients[index % self.patients.len()]
    }

    pub fn provider(&self, index: usize) -> &Address {
        &self.providers[index % self.providers.len()]
    }

    /// Admin grants `provider` access to `patient`.
    pub fn grant(&self, patient: usize, provider: usize) {
        self.client
            .grant_access(&self.admin, self.patient(patient), self.provider(provider));
    }

    pub fn revoke(&self, patient: usize, provider: usize) {
        self.client
            .revoke_access(&self.admin, self.patient(patient), self.provider(provider));
    }

    /// Append a record on behalf of `provider`; returns the new index.
    pub fn add_record(&self, provider: usize, patient: usize, hash: &str) -> u32 {
        self.client.add_record(
            self.provider(provider),
            self.patient(patient),
            &self.env.string(hash),
            &self.env.string("Low risk"),
        )
    }

    pub fn verify(&self, patient: usize, index: u32) {
        self.client
            .verify_record(&self.validator, self.patient(patient), &index);
    }

    /// Audited read of every record of `patient` by `provider`.
    pub fn read(&self, provider: usize, patient: usize) -> soroban_sdk::Vec<MedicalRecord> {
        self.client
            .get_records(self.provider(provider), self.patient(patient))
    }

    pub fn try_read(
        &self,
        provider: usize,
        patient: usize,
    ) -> Result<soroban_sdk::Vec<MedicalRecord>, LedgerError> {
        match self
            .client
            .try_get_records(self.provider(provider), self.patient(patient))
        {
            Ok(Ok(records)) => Ok(records),
            Err(Ok(e)) => Err(e),
            other => panic!("unexpected host result: {:?}", other),
        }
    }

    /// Snapshot of all observable ledger state, taken without going through
    /// the audited read path.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let env = &self.env.env;
        let patients = self
            .patients
            .iter()
            .map(|patient_id| {
                let (records, access_logs, audit_head) = env.as_contract(&self.contract_id, || {
                    let count = records::record_count(env, patient_id);
                    (
                        records::load_range(env, patient_id, 0, count),
                        audit::entries(env, patient_id),
                        audit::head(env, patient_id),
                    )
                });
                let permitted = self
                    .providers
                    .iter()
                    .map(|p| self.client.is_permitted(patient_id, p))
                    .collect();

                PatientSnapshot {
                    patient_id: patient_id.clone(),
                    records: records.iter().collect(),
                    access_logs: access_logs.iter().collect(),
                    audit_head,
                    chain_valid: self.client.verify_audit_chain(&self.admin, patient_id),
                    patient_seq: self.client.patient_seq(patient_id),
                    permitted,
                }
            })
            .collect();

        LedgerSnapshot {
            timestamp: self.env.timestamp(),
            patients,
        }
    }
}

/// Observable state of one patient at a point in time.
#[derive(Debug, Clone)]
pub struct PatientSnapshot {
    pub patient_id: String,
    pub records: std::vec::Vec<MedicalRecord>,
    pub access_logs: std::vec::Vec<AccessLogEntry>,
    pub audit_head: AuditHead,
    pub chain_valid: bool,
    pub patient_seq: u64,
    /// Grant state per provider, in harness provider order.
    pub permitted: std::vec::Vec<bool>,
}

/// Immutable snapshot of ledger state, one entry per harness patient.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub timestamp: u64,
    pub patients: std::vec::Vec<PatientSnapshot>,
}

impl LedgerSnapshot {
    pub fn total_records(&self) -> usize {
        self.patients.iter().map(|p| p.records.len()).sum()
    }

    pub fn total_reads(&self) -> usize {
        self.patients.iter().map(|p| p.access_logs.len()).sum()
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single test action, used by the state explorer.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Ok,
    /// The contract rejected the action with this error code.
    ExpectedError(u32),
    UnexpectedError(std::string::String),
}

/// Summary of a test run with coverage metrics.
#[derive(Debug, Clone)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
    pub entry_points_hit: std::collections::HashSet<std::string::String>,
    pub transitions_observed: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self {
            actions_executed: 0,
            invariant_checks: 0,
            invariant_violations: std::vec::Vec::new(),
            entry_points_hit: std::collections::HashSet::new(),
            transitions_observed: 0,
        }
    }

    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// Coverage ratio: entry points hit / total known entry points.
    pub fn entry_point_coverage(&self, total_entry_points: usize) -> f64 {
        if total_entry_points == 0 {
            return 0.0;
        }
        self.entry_points_hit.len() as f64 / total_entry_points as f64
    }
}

impl Default for TestRunSummary {
    fn default() -> Self {
        Self::new()
    }
}
