//! In-memory wallet, RPC and backend doubles shared by the unit tests.

use crate::backend::{Endpoint, ProofBackend};
use crate::config::{Cluster, ClusterNetwork};
use crate::error::WalletError;
use crate::operations::OperationContext;
use crate::solana::connection::{LatestBlockhash, RpcConnection, SimulationReport};
use crate::solana::transaction::AddSignature;
use crate::state::{Notifier, OperationLog, PendingBalanceTracker, QueryCache};
use crate::wallet::WalletAdapter;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use solana_account::Account;
use solana_hash::Hash;
use solana_keypair::Keypair;
use solana_message::{VersionedMessage, legacy::Message};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use solana_transaction::versioned::VersionedTransaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const FAKE_RPC_ENDPOINT: &str = "http://fake.rpc";

/// Legacy SOL transfer paid by `payer`, carrying one empty signature slot.
pub fn transfer_transaction(payer: &Keypair, lamports: u64, blockhash: Hash) -> VersionedTransaction {
    payer_transaction(&payer.pubkey(), lamports, blockhash)
}

pub fn payer_transaction(payer: &Pubkey, lamports: u64, blockhash: Hash) -> VersionedTransaction {
    let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), lamports);
    let message = Message::new_with_blockhash(&[ix], Some(payer), &blockhash);
    VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::Legacy(message),
    }
}

/// Transaction that needs both `payer` and `cosigner` to sign.
pub fn cosigned_transaction(payer: &Pubkey, cosigner: &Pubkey, blockhash: Hash) -> VersionedTransaction {
    let recipient = Pubkey::new_unique();
    let ixs = [
        system_instruction::transfer(payer, &recipient, 1),
        system_instruction::transfer(cosigner, &recipient, 1),
    ];
    let message = Message::new_with_blockhash(&ixs, Some(payer), &blockhash);
    VersionedTransaction {
        signatures: vec![Signature::default(); 2],
        message: VersionedMessage::Legacy(message),
    }
}

pub struct FakeWallet {
    keypair: Keypair,
    message_signing: bool,
    message_rejection: Option<String>,
    signed_messages: Mutex<Vec<Vec<u8>>>,
    sign_all_calls: Mutex<Vec<usize>>,
    signed_transactions: AtomicUsize,
}

impl FakeWallet {
    pub fn connected() -> Self {
        Self {
            keypair: Keypair::new(),
            message_signing: true,
            message_rejection: None,
            signed_messages: Mutex::new(Vec::new()),
            sign_all_calls: Mutex::new(Vec::new()),
            signed_transactions: AtomicUsize::new(0),
        }
    }

    pub fn without_message_signing() -> Self {
        Self {
            message_signing: false,
            ..Self::connected()
        }
    }

    pub fn rejecting_messages(reason: &str) -> Self {
        Self {
            message_rejection: Some(reason.to_string()),
            ..Self::connected()
        }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn signed_messages(&self) -> Vec<Vec<u8>> {
        self.signed_messages.lock().unwrap().clone()
    }

    /// Bundle size of every `sign_all_transactions` call.
    pub fn sign_all_calls(&self) -> Vec<usize> {
        self.sign_all_calls.lock().unwrap().clone()
    }

    pub fn signed_transactions(&self) -> usize {
        self.signed_transactions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletAdapter for FakeWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn supports_message_signing(&self) -> bool {
        self.message_signing
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        if let Some(reason) = &self.message_rejection {
            return Err(WalletError::WalletRejected(reason.clone()));
        }
        self.signed_messages.lock().unwrap().push(message.to_vec());
        Ok(self.keypair.sign_message(message))
    }

    async fn sign_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        transaction.add_signature(&self.keypair)?;
        self.signed_transactions.fetch_add(1, Ordering::SeqCst);
        Ok(transaction)
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<VersionedTransaction>,
    ) -> Result<Vec<VersionedTransaction>, WalletError> {
        self.sign_all_calls.lock().unwrap().push(transactions.len());
        let mut signed = Vec::with_capacity(transactions.len());
        for mut transaction in transactions {
            transaction.add_signature(&self.keypair)?;
            signed.push(transaction);
        }
        Ok(signed)
    }
}

pub struct FakeConnection {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    blockhash: Hash,
    rent_error: Option<String>,
    failing_simulation: Option<usize>,
    failing_confirmation: Option<usize>,
    rent_queries: Mutex<Vec<usize>>,
    simulated: Mutex<Vec<VersionedTransaction>>,
    sent: Mutex<Vec<VersionedTransaction>>,
    confirmed: Mutex<Vec<Signature>>,
    confirm_calls: AtomicUsize,
    account_reads: AtomicUsize,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            blockhash: Hash::new_unique(),
            rent_error: None,
            failing_simulation: None,
            failing_confirmation: None,
            rent_queries: Mutex::new(Vec::new()),
            simulated: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
            confirm_calls: AtomicUsize::new(0),
            account_reads: AtomicUsize::new(0),
        }
    }

    /// Rent the fake charges for `space` bytes.
    pub fn rent_for(space: usize) -> u64 {
        (128 + space as u64) * 6_960
    }

    pub fn failing_rent(mut self, message: &str) -> Self {
        self.rent_error = Some(message.to_string());
        self
    }

    /// Simulation number `index` (zero based) reports an error.
    pub fn failing_simulation_at(mut self, index: usize) -> Self {
        self.failing_simulation = Some(index);
        self
    }

    pub fn failing_confirmation_at(mut self, index: usize) -> Self {
        self.failing_confirmation = Some(index);
        self
    }

    pub fn with_account_data(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.set_account_data(address, data);
        self
    }

    pub fn set_account_data(&self, address: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: Self::rent_for(data.len()),
            data,
            owner: spl_token_2022::id(),
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn rent_queries(&self) -> Vec<usize> {
        self.rent_queries.lock().unwrap().clone()
    }

    pub fn simulated_count(&self) -> usize {
        self.simulated.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<Signature> {
        self.sent_transactions()
            .iter()
            .map(|tx| tx.signatures[0])
            .collect()
    }

    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn confirmed(&self) -> Vec<Signature> {
        self.confirmed.lock().unwrap().clone()
    }

    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcConnection for FakeConnection {
    fn rpc_endpoint(&self) -> String {
        FAKE_RPC_ENDPOINT.to_string()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WalletError> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, WalletError> {
        if let Some(message) = &self.rent_error {
            return Err(WalletError::Rpc(message.clone()));
        }
        self.rent_queries.lock().unwrap().push(space);
        Ok(Self::rent_for(space))
    }

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, WalletError> {
        Ok(LatestBlockhash {
            blockhash: self.blockhash,
            last_valid_block_height: 1_000,
        })
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationReport, WalletError> {
        let mut simulated = self.simulated.lock().unwrap();
        let index = simulated.len();
        simulated.push(transaction.clone());

        if self.failing_simulation == Some(index) {
            return Ok(SimulationReport {
                err: Some(r#"{"InstructionError":[0,{"Custom":1}]}"#.to_string()),
                logs: vec!["Program log: insufficient funds".to_string()],
            });
        }
        Ok(SimulationReport::default())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        if transaction.signatures.iter().any(|sig| *sig == Signature::default()) {
            return Err(WalletError::TransactionFailed(
                "signature verification failure".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        latest: &LatestBlockhash,
    ) -> Result<(), WalletError> {
        let index = self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_confirmation == Some(index) {
            return Err(WalletError::TransactionFailed(format!(
                "{signature} was not confirmed before blockhash {} expired",
                latest.blockhash
            )));
        }
        self.confirmed.lock().unwrap().push(*signature);
        Ok(())
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<VersionedTransaction, WalletError> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .find(|tx| tx.signatures[0] == *signature)
            .cloned()
            .ok_or_else(|| WalletError::Rpc(format!("Can not fetch transaction {signature}")))
    }
}

type Responder = Box<dyn Fn(Option<&Value>) -> Result<Value, WalletError> + Send + Sync>;

/// Backend double answering from canned values or closures, recording every
/// request it receives.
#[derive(Default)]
pub struct FakeBackend {
    responders: HashMap<(Endpoint, Method), Responder>,
    requests: Mutex<Vec<(Endpoint, Method, Option<Value>)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, endpoint: Endpoint, method: Method, response: Value) -> Self {
        self.with_handler(endpoint, method, move |_| Ok(response.clone()))
    }

    pub fn with_handler<F>(mut self, endpoint: Endpoint, method: Method, handler: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<Value, WalletError> + Send + Sync + 'static,
    {
        self.responders.insert((endpoint, method), Box::new(handler));
        self
    }

    pub fn failing(self, endpoint: Endpoint, method: Method, message: &str) -> Self {
        let message = message.to_string();
        self.with_handler(endpoint, method, move |_| {
            Err(WalletError::backend(endpoint.path(), message.clone()))
        })
    }

    pub fn requests(&self) -> Vec<(Endpoint, Method, Option<Value>)> {
        self.requests.lock().unwrap().clone()
    }

    /// Body of the last request sent to `endpoint` with `method`.
    pub fn last_body(&self, endpoint: Endpoint, method: Method) -> Option<Value> {
        self.requests()
            .into_iter()
            .rev()
            .find(|(e, m, _)| *e == endpoint && *m == method)
            .and_then(|(_, _, body)| body)
    }
}

#[async_trait]
impl ProofBackend for FakeBackend {
    async fn request(
        &self,
        endpoint: Endpoint,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, WalletError> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint, method.clone(), body.clone()));
        match self.responders.get(&(endpoint, method)) {
            Some(responder) => responder(body.as_ref()),
            None => Err(WalletError::backend(endpoint.path(), "no canned response")),
        }
    }
}

/// Doubles wired into an [`OperationContext`], with handles kept for
/// assertions.
pub struct TestHarness {
    pub ctx: OperationContext,
    pub wallet: Arc<FakeWallet>,
    pub connection: Arc<FakeConnection>,
    pub backend: Arc<FakeBackend>,
}

impl TestHarness {
    pub fn new(wallet: FakeWallet, connection: FakeConnection, backend: FakeBackend) -> Self {
        let wallet = Arc::new(wallet);
        let connection = Arc::new(connection);
        let backend = Arc::new(backend);
        let cache = Arc::new(QueryCache::new());

        let ctx = OperationContext {
            wallet: wallet.clone(),
            connection: connection.clone(),
            backend: backend.clone(),
            cache: cache.clone(),
            pending: PendingBalanceTracker::new(cache, connection.clone()),
            log: Arc::new(OperationLog::new()),
            notifier: Arc::new(Notifier::new(Cluster::new(
                ClusterNetwork::Devnet,
                FAKE_RPC_ENDPOINT,
            ))),
            priority_fee_lamports: 100_000_000,
            shutdown: CancellationToken::new(),
        };

        Self {
            ctx,
            wallet,
            connection,
            backend,
        }
    }
}
