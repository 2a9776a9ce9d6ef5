//! In-memory ledger for store tests.
//!
//! Executes the two programs the store talks to: the system program's
//! `CreateAccountWithSeed` and the dodo program's create/update/remove.
//! Transactions are atomic; a failing instruction leaves no trace except
//! its execution log, which is kept per signature like an RPC node would.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};

use anyhow::anyhow;
use async_trait::async_trait;
use record_store_client::{LedgerConnection, StoreError};
use record_store_core::{
    codec,
    dodo::{DODO_ACCOUNT_SCHEMA, DODO_SIZE},
    Dodo, DodoInstruction, RecordLayout,
};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    rent::Rent,
    signature::Signature,
    system_instruction::SystemInstruction,
    system_program,
    transaction::Transaction,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerAccount {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, LedgerAccount>,
    statuses: HashMap<Signature, bool>,
    logs: HashMap<Signature, Vec<String>>,
    transactions: usize,
}

/// Instruction as seen by a program: data plus `(key, is_signer)` accounts.
struct Invocation<'a> {
    data: &'a [u8],
    accounts: Vec<(Pubkey, bool)>,
}

impl Invocation<'_> {
    fn account(&self, position: usize) -> Result<(Pubkey, bool), String> {
        self.accounts
            .get(position)
            .copied()
            .ok_or_else(|| "NotEnoughAccountKeys".to_string())
    }
}

pub struct InMemoryLedger {
    program_id: Pubkey,
    rent: Rent,
    state: Mutex<LedgerState>,
    withhold_confirmations: AtomicBool,
    reject_in_preflight: AtomicBool,
}

impl InMemoryLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            rent: Rent::default(),
            state: Mutex::new(LedgerState::default()),
            withhold_confirmations: AtomicBool::new(false),
            reject_in_preflight: AtomicBool::new(false),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    pub fn account(&self, address: &Pubkey) -> Option<LedgerAccount> {
        self.state().accounts.get(address).cloned()
    }

    /// Place an account directly, bypassing any program.
    pub fn insert_account(&self, address: Pubkey, account: LedgerAccount) {
        self.state().accounts.insert(address, account);
    }

    /// Place an encoded dodo owned by the program at `address`.
    pub fn insert_dodo(&self, address: Pubkey, dodo: &Dodo) {
        let data = codec::encode(&DODO_ACCOUNT_SCHEMA, &dodo.to_fields()).unwrap();
        self.insert_account(
            address,
            LedgerAccount {
                lamports: self.rent.minimum_balance(DODO_SIZE),
                owner: self.program_id,
                data,
            },
        );
    }

    pub fn remove_account(&self, address: &Pubkey) -> Option<LedgerAccount> {
        self.state().accounts.remove(address)
    }

    /// Number of transactions received, failed ones included.
    pub fn transaction_count(&self) -> usize {
        self.state().transactions
    }

    /// While set, `confirm` times out instead of reporting a status.
    pub fn withhold_confirmations(&self, withhold: bool) {
        self.withhold_confirmations.store(withhold, Ordering::SeqCst);
    }

    /// While set, a failing transaction is refused at send time with its
    /// simulation logs, the way an RPC node with preflight checks does.
    pub fn reject_in_preflight(&self, reject: bool) {
        self.reject_in_preflight.store(reject, Ordering::SeqCst);
    }

    pub fn logs_for(&self, signature: &Signature) -> Vec<String> {
        self.state().logs.get(signature).cloned().unwrap_or_default()
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, LedgerAccount>,
        transaction: &Transaction,
        logs: &mut Vec<String>,
    ) -> Result<(), String> {
        let message = &transaction.message;
        for ix in &message.instructions {
            let program_id = message.account_keys[ix.program_id_index as usize];
            let invocation = Invocation {
                data: &ix.data,
                accounts: ix
                    .accounts
                    .iter()
                    .map(|&i| (message.account_keys[i as usize], message.is_signer(i as usize)))
                    .collect(),
            };

            logs.push(format!("Program {} invoke [1]", program_id));
            let result = if program_id == system_program::id() {
                self.run_system(accounts, &invocation, logs)
            } else if program_id == self.program_id {
                self.run_dodo(accounts, &invocation, logs)
            } else {
                Err("IncorrectProgramId".to_string())
            };

            match result {
                Ok(()) => logs.push(format!("Program {} success", program_id)),
                Err(err) => {
                    logs.push(format!("Program {} failed: {}", program_id, err));
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn run_system(
        &self,
        accounts: &mut HashMap<Pubkey, LedgerAccount>,
        invocation: &Invocation<'_>,
        logs: &mut Vec<String>,
    ) -> Result<(), String> {
        let instruction: SystemInstruction =
            bincode::deserialize(invocation.data).map_err(|_| "invalid instruction data".to_string())?;

        match instruction {
            SystemInstruction::CreateAccountWithSeed {
                base,
                seed,
                lamports,
                space,
                owner,
            } => {
                let (funder, funder_signed) = invocation.account(0)?;
                let (to, _) = invocation.account(1)?;
                let base_signed = base == funder
                    || invocation.accounts.iter().any(|&(key, signed)| key == base && signed);
                if !funder_signed || !base_signed {
                    return Err("missing required signature for instruction".to_string());
                }

                let expected = Pubkey::create_with_seed(&base, &seed, &owner)
                    .map_err(|e| e.to_string())?;
                if expected != to {
                    logs.push(format!(
                        "Create: address {} does not match derived address {}",
                        to, expected
                    ));
                    return Err("custom program error: 0x5".to_string());
                }

                if accounts.contains_key(&to) {
                    logs.push(format!(
                        "Create Account: account Address {{ address: {}, base: Some({}) }} already in use",
                        to, base
                    ));
                    return Err("custom program error: 0x0".to_string());
                }

                accounts.insert(
                    to,
                    LedgerAccount {
                        lamports,
                        owner,
                        data: vec![0; space as usize],
                    },
                );
                Ok(())
            }
            _ => Err("unsupported system instruction".to_string()),
        }
    }

    fn run_dodo(
        &self,
        accounts: &mut HashMap<Pubkey, LedgerAccount>,
        invocation: &Invocation<'_>,
        logs: &mut Vec<String>,
    ) -> Result<(), String> {
        let fail = |logs: &mut Vec<String>, message: &str| {
            logs.push(format!("Program log: Error: {}", message));
            Err("custom program error: 0x1".to_string())
        };

        let instruction = match DodoInstruction::unpack(invocation.data) {
            Ok(instruction) => instruction,
            Err(e) => return fail(logs, &e.to_string()),
        };

        let (signer, signed) = invocation.account(0)?;
        let (address, _) = invocation.account(1)?;
        if !signed {
            return fail(logs, "Owner must sign");
        }

        let account = match accounts.get_mut(&address) {
            Some(account) if account.owner == self.program_id => account,
            Some(_) => return fail(logs, "Account not owned by program"),
            None => return fail(logs, "Account does not exist"),
        };

        match instruction {
            DodoInstruction::Create {
                title,
                tagline,
                state,
                create_time,
                update_time,
            } => {
                logs.push("Program log: Instruction: Create".to_string());
                if account.data.len() != DODO_SIZE || account.data.iter().any(|&b| b != 0) {
                    return fail(logs, "Dodo already initialized");
                }
                let dodo = Dodo {
                    title,
                    tagline,
                    state,
                    create_time,
                    update_time,
                    creator: signer,
                };
                account.data = match codec::encode(&DODO_ACCOUNT_SCHEMA, &dodo.to_fields()) {
                    Ok(data) => data,
                    Err(e) => return fail(logs, &e.to_string()),
                };
                Ok(())
            }
            DodoInstruction::Update { state, update_time } => {
                logs.push("Program log: Instruction: Update".to_string());
                let mut dodo = match Dodo::decode(&account.data) {
                    Ok(dodo) if dodo.creator == signer => dodo,
                    Ok(_) => return fail(logs, "Only the creator may update"),
                    Err(e) => return fail(logs, &e.to_string()),
                };
                dodo.state = state;
                dodo.update_time = update_time;
                account.data = match codec::encode(&DODO_ACCOUNT_SCHEMA, &dodo.to_fields()) {
                    Ok(data) => data,
                    Err(e) => return fail(logs, &e.to_string()),
                };
                Ok(())
            }
            DodoInstruction::Remove => {
                logs.push("Program log: Instruction: Remove".to_string());
                match Dodo::decode(&account.data) {
                    Ok(dodo) if dodo.creator == signer => {}
                    Ok(_) => return fail(logs, "Only the creator may remove"),
                    Err(e) => return fail(logs, &e.to_string()),
                }
                let lamports = account.lamports;
                accounts.remove(&address);
                if let Some(owner) = accounts.get_mut(&signer) {
                    owner.lamports = owner.lamports.saturating_add(lamports);
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LedgerConnection for InMemoryLedger {
    async fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state().accounts.get(address).map(|a| a.data.clone()))
    }

    async fn minimum_balance_for(&self, width: usize) -> Result<u64, StoreError> {
        Ok(self.rent.minimum_balance(width))
    }

    async fn latest_checkpoint(&self) -> Result<Hash, StoreError> {
        Ok(Hash::new_unique())
    }

    async fn send_signed_transaction(&self, transaction: &Transaction) -> Result<Signature, StoreError> {
        transaction
            .verify()
            .map_err(|e| StoreError::Internal(anyhow!("signature verification failed: {}", e)))?;
        let signature = transaction.signatures[0];

        let mut state = self.state();
        state.transactions += 1;

        let mut staged = state.accounts.clone();
        let mut logs = Vec::new();
        let result = self.execute(&mut staged, transaction, &mut logs);
        let ok = result.is_ok();
        tracing::debug!(%signature, ok, "Executed transaction");
        match result {
            Ok(()) => state.accounts = staged,
            Err(reason) if self.reject_in_preflight.load(Ordering::SeqCst) => {
                return Err(StoreError::TransactionRejected { reason, logs });
            }
            Err(_) => {}
        }

        state.statuses.insert(signature, ok);
        state.logs.insert(signature, logs);
        Ok(signature)
    }

    async fn confirm(&self, signature: &Signature) -> Result<bool, StoreError> {
        if self.withhold_confirmations.load(Ordering::SeqCst) {
            return Err(StoreError::ConfirmationTimeout { timeout_ms: 0 });
        }
        self.state()
            .statuses
            .get(signature)
            .copied()
            .ok_or(StoreError::ConfirmationTimeout { timeout_ms: 0 })
    }

    async fn execution_log(&self, signature: &Signature) -> Result<Vec<String>, StoreError> {
        Ok(self.logs_for(signature))
    }
}
