//! CLI commands for the wallet
//!
//! Implements all command handlers for the CLI interface. The CLI is the
//! host: it persists the wallet between invocations and supplies the
//! file-backed ledger and outbox.

use crate::crypto::{KeyPair, Secp256k1Verifier};
use crate::multisig::{Address, BalanceLedger, PublicKey, Signature, SignatureSet, WalletContract};
use crate::storage::{HostSnapshot, JsonLedger, Outbox, Storage, StorageConfig};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// The wallet as hosted by the CLI
pub type HostedWallet = WalletContract<JsonLedger, Secp256k1Verifier, Outbox>;

/// Application state
pub struct AppState {
    pub storage: Storage,
    pub wallet: HostedWallet,
}

impl AppState {
    /// Load the wallet and its collaborators from the data directory
    pub fn load(config: StorageConfig) -> CliResult<Self> {
        let storage = Storage::new(config)?;
        let HostSnapshot {
            wallet,
            ledger,
            outbox,
        } = storage.load()?;

        let wallet = WalletContract::restore(wallet, ledger, Secp256k1Verifier::new(), outbox)?;
        Ok(Self { storage, wallet })
    }

    /// Save the wallet, ledger and outbox in one write
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&HostSnapshot {
            wallet: self.wallet.state(),
            ledger: self.wallet.ledger().clone(),
            outbox: self.wallet.broadcaster().clone(),
        })?;
        Ok(())
    }
}

/// Admin commands authenticate with the caller's private key
fn caller_address(private_key: &str) -> CliResult<Address> {
    Ok(KeyPair::from_private_key_hex(private_key)?.address())
}

fn signature_set(signatures: Vec<Signature>) -> CliResult<SignatureSet> {
    Ok(SignatureSet::new(signatures)?)
}

/// Generate a signer key pair
pub fn cmd_keygen() -> CliResult<()> {
    let key = KeyPair::generate();

    println!("🔐 New signer key generated!");
    println!("   📍 Address:     {}", key.address());
    println!("   🔑 Public Key:  {}", key.public_key());
    println!("   🗝️  Private Key: {}", key.private_key_hex());
    println!("\n   ⚠️  Store the private key safely; it is not saved anywhere.");

    Ok(())
}

/// Create a new wallet
pub fn cmd_init(config: StorageConfig, owner: Address, required: u32) -> CliResult<()> {
    let storage = Storage::new(config)?;

    if storage.exists() {
        println!("⚠️  Wallet already exists at {:?}", storage.data_dir());
        return Ok(());
    }

    let wallet = WalletContract::initialize(
        owner,
        required,
        JsonLedger::new(),
        Secp256k1Verifier::new(),
        Outbox::new(),
    );
    let state = AppState { storage, wallet };
    state.save()?;

    println!("✅ Wallet initialized!");
    println!("   📁 Data directory: {:?}", state.storage.data_dir());
    println!("   👤 Owner: {}", owner);
    println!("   ✍️  Required signatures: {}", required);

    Ok(())
}

/// Authorize a signer
pub fn cmd_signer_add(
    state: &mut AppState,
    owner_key: &str,
    public_key: PublicKey,
    address: Option<Address>,
) -> CliResult<()> {
    let caller = caller_address(owner_key)?;
    let signer = address.unwrap_or_else(|| public_key.address());
    state.wallet.add_authorized_signer(&caller, signer, public_key)?;
    state.save()?;

    println!("✅ Signer authorized: {}", signer);
    println!("   Wallet is now {}", state.wallet.description());
    Ok(())
}

/// Revoke a signer
pub fn cmd_signer_remove(
    state: &mut AppState,
    owner_key: &str,
    signer: &Address,
) -> CliResult<()> {
    let caller = caller_address(owner_key)?;
    let present = state.wallet.registry().contains(signer);
    state.wallet.remove_authorized_signer(&caller, signer)?;
    state.save()?;

    if present {
        println!("🗑️  Signer removed: {}", signer);
    } else {
        println!("ℹ️  {} was not an authorized signer", signer);
    }
    println!("   Wallet is now {}", state.wallet.description());
    Ok(())
}

/// List authorized signers
pub fn cmd_signer_list(state: &AppState) -> CliResult<()> {
    let registry = state.wallet.registry();
    if registry.is_empty() {
        println!("📭 No authorized signers. Add one with: multisig signer add");
        return Ok(());
    }

    println!("📋 Authorized signers ({}):", state.wallet.description());
    for (address, key) in registry.iter() {
        println!("   {} ({})", address, key);
    }
    Ok(())
}

/// Change the signature threshold
pub fn cmd_threshold(state: &mut AppState, owner_key: &str, required: u32) -> CliResult<()> {
    let caller = caller_address(owner_key)?;
    state.wallet.update_required_signatures(&caller, required)?;
    state.save()?;

    println!("✅ Required signatures set to {}", required);
    if required as usize > state.wallet.registry().len() {
        println!(
            "   ⚠️  Only {} signer(s) are authorized; transfers fail until more are added",
            state.wallet.registry().len()
        );
    }
    Ok(())
}

/// Credit the wallet account in the local ledger
pub fn cmd_fund(config: StorageConfig, amount: u128) -> CliResult<()> {
    let storage = Storage::new(config)?;
    let mut snapshot = storage.load()?;
    let owner = snapshot.wallet.owner;

    let balance = snapshot.ledger.credit(&owner, amount)?;
    storage.save(&snapshot)?;

    println!("💰 Credited {} to {}", amount, owner);
    println!("   New balance: {}", balance);
    Ok(())
}

/// Show the wallet balance, optionally checking it against an amount
pub fn cmd_balance(state: &AppState, amount: Option<u128>) -> CliResult<()> {
    let owner = state.wallet.owner();
    println!("💰 Balance for {}", owner);
    println!("   Total: {}", state.wallet.ledger().balance(owner));

    if let Some(amount) = amount {
        let sufficient = state.wallet.has_sufficient_balance(amount)?;
        println!(
            "   {} Sufficient for {}",
            if sufficient { "✅" } else { "❌" },
            amount
        );
    }
    Ok(())
}

/// Sign the next transfer intent with a signer's private key
pub fn cmd_sign(state: &AppState, private_key: &str, to: Address, amount: u128) -> CliResult<()> {
    let key = KeyPair::from_private_key_hex(private_key)?;
    let intent = state.wallet.transfer_intent(to, amount);
    let signature = key.sign_intent(&intent)?;

    println!("✍️  Signed transfer of {} to {} (nonce {})", amount, to, intent.nonce);
    println!("{}", signature);
    Ok(())
}

/// Check signatures for the next transfer without executing it
pub fn cmd_verify(
    state: &AppState,
    to: Address,
    amount: u128,
    signatures: Vec<Signature>,
) -> CliResult<()> {
    let signatures = signature_set(signatures)?;
    let intent = state.wallet.transfer_intent(to, amount);

    if state.wallet.verify_signatures(&intent, &signatures)? {
        println!("✅ Signatures satisfy {}", state.wallet.description());
    } else {
        println!("❌ Signatures do not satisfy {}", state.wallet.description());
    }
    Ok(())
}

/// Execute a transfer
pub fn cmd_execute(
    state: &mut AppState,
    to: Address,
    amount: u128,
    signatures: Vec<Signature>,
) -> CliResult<()> {
    let signatures = signature_set(signatures)?;
    let transfer = state.wallet.execute_transaction(to, amount, &signatures)?;
    state.save()?;

    println!("✅ Transfer executed!");
    println!("   📤 From:   {}", transfer.from);
    println!("   📥 To:     {}", transfer.to);
    println!("   💸 Amount: {}", transfer.amount);
    println!("   #️⃣  Nonce:  {}", transfer.nonce);
    println!(
        "   💰 Remaining balance: {}",
        state.wallet.ledger().balance(&transfer.from)
    );
    Ok(())
}

/// Display wallet information
pub fn cmd_show(state: &AppState) -> CliResult<()> {
    let wallet = &state.wallet;
    let stats = state.storage.stats()?;

    println!("🏦 Wallet {}", wallet.owner());
    println!("   ├─ Policy: {}", wallet.description());
    println!("   ├─ Nonce: {}", wallet.nonce());
    println!("   ├─ Balance: {}", wallet.ledger().balance(wallet.owner()));
    println!("   ├─ Outbox: {} transfer(s)", wallet.broadcaster().len());
    println!("   └─ Backups: {}", stats.backup_count);
    Ok(())
}
