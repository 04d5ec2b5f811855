//! Transaction lifecycle: construction, freeze, chunking, signing.
//!
//! A transaction owns a 2-D grid of signed cells, flattened as
//! `row * node_count + column`: one row per chunk identifier, one column per
//! candidate node. The grid is sparse and lazily populated; only the cells a
//! submission attempt (or an export) touches are ever serialized, unless
//! eager signing materializes everything at freeze time.
//!
//! Freezing locks the identifier and node lists and fixes the grid shape.
//! After that, structural setters fail fast while signatures may still be
//! added; the frozen value can be shared across concurrent signers and
//! executors.

mod account_create;
mod any;
mod batch;
mod network_freeze;
mod topic_create;
mod topic_submit;
mod transfer;

pub use account_create::AccountCreateTransaction;
pub use any::AnyTransaction;
pub use batch::BatchTransaction;
pub use network_freeze::NetworkFreezeTransaction;
pub use topic_create::TopicCreateTransaction;
pub use topic_submit::TopicMessageSubmitTransaction;
pub use transfer::TransferTransaction;

use crate::client::Client;
use crate::config::{ChunkConfig, SigningMode};
use crate::error::ClientError;
use crate::locked_list::LockableList;
use crate::signing::Signer;
use meridian_proto::{
    decode_body, decode_signed_transactions, encode_body, encode_for_transmission,
    encode_signed_transactions, ChunkInfo, CustomFeeLimit, OperationKind, OperationPayload,
    SignatureMap, SignedTransaction, TopicMessageSubmitPayload, TransactionBody,
};
use meridian_types::{AccountId, Hash, KeyPair, PublicKey, Signature, TransactionId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fallback max fee per operation kind, applied when neither the transaction
/// nor the client names one.
fn default_max_fee_for(kind: OperationKind) -> u64 {
    match kind {
        OperationKind::Transfer | OperationKind::TopicMessageSubmit => 100_000_000,
        OperationKind::AccountCreate | OperationKind::TopicCreate => 500_000_000,
        OperationKind::Batch => 200_000_000,
        OperationKind::NetworkFreeze => 0,
    }
}

/// Sparse cell grid, flattened row-major.
#[derive(Debug, Default)]
struct CellGrid {
    node_count: usize,
    cells: Vec<Option<SignedTransaction>>,
}

impl CellGrid {
    fn resize(&mut self, rows: usize, columns: usize) {
        self.node_count = columns;
        self.cells = vec![None; rows * columns];
    }

    fn slot_index(&self, row: usize, column: usize) -> usize {
        row * self.node_count + column
    }

    fn clear_row(&mut self, row: usize) {
        for column in 0..self.node_count {
            let index = self.slot_index(row, column);
            self.cells[index] = None;
        }
    }
}

/// Aggregate root of the construction/signing/execution pipeline.
///
/// Typed wrappers ([`TransferTransaction`] and friends) fix the payload kind
/// at construction and deref to this core.
pub struct Transaction {
    payload: OperationPayload,
    payer_account_id: Option<AccountId>,
    max_fee: Option<u64>,
    memo: String,
    valid_duration_seconds: u64,
    batch_key: Option<PublicKey>,
    custom_fee_limits: Vec<CustomFeeLimit>,
    signing_mode: SigningMode,
    regenerate_transaction_ids: Option<bool>,
    chunk_config: ChunkConfig,
    transaction_ids: LockableList<TransactionId>,
    node_account_ids: LockableList<AccountId>,
    /// Set when the caller pinned the identifier list; suppresses
    /// regeneration on expiry.
    explicit_transaction_ids: bool,
    signers: Vec<Arc<dyn Signer>>,
    cells: Mutex<CellGrid>,
    frozen: bool,
}

impl Transaction {
    pub(crate) fn new(payload: OperationPayload) -> Self {
        Self {
            payload,
            payer_account_id: None,
            max_fee: None,
            memo: String::new(),
            valid_duration_seconds: 120,
            batch_key: None,
            custom_fee_limits: Vec::new(),
            signing_mode: SigningMode::default(),
            regenerate_transaction_ids: None,
            chunk_config: ChunkConfig::default(),
            transaction_ids: LockableList::new(),
            node_account_ids: LockableList::new(),
            explicit_transaction_ids: false,
            signers: Vec::new(),
            cells: Mutex::new(CellGrid::default()),
            frozen: false,
        }
    }

    // ── Accessors ──

    /// Kind of the payload, resolved by static match.
    pub fn operation_kind(&self) -> OperationKind {
        OperationKind::of(&self.payload)
    }

    /// The logical payload.
    pub fn payload(&self) -> &OperationPayload {
        &self.payload
    }

    /// Whether any lock bit is set.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The payer, once resolved or set.
    pub fn payer_account_id(&self) -> Option<AccountId> {
        self.payer_account_id
    }

    /// Identifier of the chunk row the cursor points at.
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_ids.current().copied()
    }

    /// All chunk identifiers, in row order.
    pub fn transaction_ids(&self) -> &[TransactionId] {
        self.transaction_ids.items()
    }

    /// Candidate node accounts, in column order.
    pub fn node_account_ids(&self) -> &[AccountId] {
        self.node_account_ids.items()
    }

    /// The memo.
    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Explicit or resolved max fee.
    pub fn max_fee(&self) -> Option<u64> {
        self.max_fee
    }

    /// The signing strategy.
    pub fn signing_mode(&self) -> SigningMode {
        self.signing_mode
    }

    // ── Setters (pre-freeze only) ──

    fn require_mutable(&self) -> Result<(), ClientError> {
        if self.frozen || self.transaction_ids.is_locked() || self.node_account_ids.is_locked() {
            return Err(ClientError::Immutable);
        }
        Ok(())
    }

    pub(crate) fn payload_mut(&mut self) -> Result<&mut OperationPayload, ClientError> {
        self.require_mutable()?;
        Ok(&mut self.payload)
    }

    /// Set the payer account.
    pub fn set_payer_account_id(&mut self, payer: AccountId) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.payer_account_id = Some(payer);
        Ok(self)
    }

    /// Pin the identifier explicitly. Locks the identifier list and
    /// suppresses regeneration on expiry.
    pub fn set_transaction_id(&mut self, id: TransactionId) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        let mut ids = LockableList::new();
        ids.force_push(id);
        ids.lock();
        self.transaction_ids = ids;
        self.explicit_transaction_ids = true;
        self.payer_account_id = Some(id.payer);
        Ok(self)
    }

    /// Replace the candidate node account list.
    pub fn set_node_account_ids(
        &mut self,
        accounts: Vec<AccountId>,
    ) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        let mut nodes = LockableList::new();
        for account in accounts {
            nodes.force_push(account);
        }
        self.node_account_ids = nodes;
        Ok(self)
    }

    /// Set the max fee.
    pub fn set_max_fee(&mut self, max_fee: u64) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.max_fee = Some(max_fee);
        Ok(self)
    }

    /// Set the memo.
    pub fn set_memo(&mut self, memo: impl Into<String>) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.memo = memo.into();
        Ok(self)
    }

    /// Set the validity window length.
    pub fn set_valid_duration(&mut self, duration: Duration) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.valid_duration_seconds = duration.as_secs();
        Ok(self)
    }

    /// Restrict consensus to batches signed by `key`.
    pub fn set_batch_key(&mut self, key: PublicKey) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.batch_key = Some(key);
        Ok(self)
    }

    /// Append a custom fee cap.
    pub fn add_custom_fee_limit(
        &mut self,
        limit: CustomFeeLimit,
    ) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.custom_fee_limits.push(limit);
        Ok(self)
    }

    /// Choose eager or on-demand signing.
    pub fn set_signing_mode(&mut self, mode: SigningMode) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.signing_mode = mode;
        Ok(self)
    }

    /// Explicitly enable or disable identifier regeneration on expiry.
    /// Unset defers to the client default at execution time.
    pub fn set_regenerate_transaction_ids(
        &mut self,
        regenerate: bool,
    ) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.regenerate_transaction_ids = Some(regenerate);
        Ok(self)
    }

    /// Set the chunk size in bytes. Must be positive.
    pub fn set_chunk_size(&mut self, size: usize) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        if size == 0 {
            return Err(ClientError::InvalidChunkConfig);
        }
        self.chunk_config.chunk_size = size;
        Ok(self)
    }

    /// Cap the number of chunks. Must be positive.
    pub fn set_max_chunks(&mut self, max: usize) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        if max == 0 {
            return Err(ClientError::InvalidChunkConfig);
        }
        self.chunk_config.max_chunks = max;
        Ok(self)
    }

    /// Set the valid-start spacing between chunk identifiers.
    pub fn set_chunk_interval_nanos(&mut self, nanos: u64) -> Result<&mut Self, ClientError> {
        self.require_mutable()?;
        self.chunk_config.chunk_interval_nanos = nanos;
        Ok(self)
    }

    // ── Chunking ──

    /// Number of chunk rows this payload needs. Defaults to one; a
    /// zero-length payload still needs one chunk. Fails when the configured
    /// maximum is exceeded, before any network call.
    pub fn required_chunks(&self) -> Result<usize, ClientError> {
        match &self.payload {
            OperationPayload::TopicMessageSubmit(p) => {
                if self.chunk_config.chunk_size == 0 || self.chunk_config.max_chunks == 0 {
                    return Err(ClientError::InvalidChunkConfig);
                }
                let required = p.message.len().div_ceil(self.chunk_config.chunk_size).max(1);
                if required > self.chunk_config.max_chunks {
                    return Err(ClientError::TooManyChunks {
                        message_len: p.message.len(),
                        required,
                        max: self.chunk_config.max_chunks,
                    });
                }
                Ok(required)
            }
            _ => Ok(1),
        }
    }

    // ── Freeze ──

    /// Freeze without a client. Payer and node list must already be set.
    pub async fn freeze(&mut self) -> Result<&mut Self, ClientError> {
        self.freeze_with(None).await
    }

    /// Transition open → frozen. Idempotent: re-freezing changes nothing.
    ///
    /// Resolves the payer (explicit, else the client operator), the max fee
    /// (explicit → client default → operation default) and the node list
    /// (explicit, else the client pool); generates one identifier per chunk
    /// row; locks the identifier and node lists; and, under eager signing,
    /// serializes and signs every cell immediately.
    pub async fn freeze_with(
        &mut self,
        client: Option<&Client>,
    ) -> Result<&mut Self, ClientError> {
        if self.frozen {
            return Ok(self);
        }

        if self.payer_account_id.is_none() {
            self.payer_account_id = client.and_then(Client::operator_account_id);
        }
        let payer = self.payer_account_id.ok_or(ClientError::MissingPayerAccount)?;

        if self.max_fee.is_none() {
            self.max_fee = client.and_then(Client::default_max_fee);
        }
        if self.max_fee.is_none() {
            self.max_fee = Some(default_max_fee_for(self.operation_kind()));
        }

        if self.node_account_ids.is_empty() {
            let accounts = client.map(Client::node_account_ids).unwrap_or_default();
            if accounts.is_empty() {
                return Err(ClientError::MissingNodeList);
            }
            for account in accounts {
                self.node_account_ids.force_push(account);
            }
        }

        let chunks = self.required_chunks()?;
        let interval = self.chunk_config.chunk_interval_nanos;
        if self.transaction_ids.is_empty() {
            let first = TransactionId::generate(payer);
            for index in 0..chunks {
                self.transaction_ids
                    .force_push(first.offset_by(interval * index as u64));
            }
        } else {
            // Pinned identifier: derive any missing chunk rows from it.
            let first = self.transaction_ids.items()[0];
            for index in self.transaction_ids.len()..chunks {
                self.transaction_ids
                    .force_push(first.offset_by(interval * index as u64));
            }
        }

        self.transaction_ids.lock();
        self.node_account_ids.lock();

        let rows = self.transaction_ids.len();
        let columns = self.node_account_ids.len();
        self.cells.lock().resize(rows, columns);
        self.frozen = true;

        debug!(
            kind = self.operation_kind().as_str(),
            rows,
            nodes = columns,
            "Transaction frozen"
        );

        if self.signing_mode == SigningMode::Eager {
            self.sign_all_cells().await?;
        }

        Ok(self)
    }

    // ── Signing registry ──

    /// Register a `(public key, signer)` pair, de-duplicated by the key's
    /// raw bytes; the first registration wins and later ones are no-ops.
    ///
    /// On a frozen transaction under eager signing, every existing cell is
    /// signed immediately. Under on-demand signing the pair is recorded and
    /// each cell is signed lazily, once, when first serialized.
    pub async fn sign_with(
        &mut self,
        signer: Arc<dyn Signer>,
    ) -> Result<&mut Self, ClientError> {
        let public_key = signer.public_key();
        if self.signers.iter().any(|s| s.public_key() == public_key) {
            return Ok(self);
        }
        self.signers.push(signer);

        if self.frozen && self.signing_mode == SigningMode::Eager {
            self.sign_all_cells().await?;
        }
        Ok(self)
    }

    /// Register an in-process keypair as a signer.
    pub async fn sign(&mut self, keypair: KeyPair) -> Result<&mut Self, ClientError> {
        self.sign_with(Arc::new(keypair)).await
    }

    /// Append an externally computed signature to every serialized cell.
    /// Requires the transaction to be frozen.
    pub fn add_signature(
        &mut self,
        public_key: PublicKey,
        signature: Signature,
    ) -> Result<&mut Self, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        self.materialize_all_cells()?;
        {
            let mut grid = self.cells.lock();
            for cell in grid.cells.iter_mut().flatten() {
                cell.signature_map.add(public_key, signature.clone());
            }
        }
        Ok(self)
    }

    /// Remove one key's signature from every cell, and deregister any signer
    /// for that key. Removing a never-added key's signature is an error.
    pub fn remove_signature(&mut self, public_key: &PublicKey) -> Result<&mut Self, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        self.signers.retain(|s| s.public_key() != *public_key);

        let mut removed = false;
        {
            let mut grid = self.cells.lock();
            for cell in grid.cells.iter_mut().flatten() {
                removed |= cell.signature_map.remove(public_key);
            }
        }
        if !removed {
            return Err(ClientError::SignatureNotFound { key: *public_key });
        }
        Ok(self)
    }

    /// Remove every signature and deregister every signer.
    pub fn remove_all_signatures(&mut self) -> Result<&mut Self, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        self.signers.clear();
        {
            let mut grid = self.cells.lock();
            for cell in grid.cells.iter_mut().flatten() {
                cell.signature_map.clear();
            }
        }
        Ok(self)
    }

    // ── Cell materialization ──

    fn build_body(&self, row: usize, column: usize) -> TransactionBody {
        let ids = self.transaction_ids.items();
        let nodes = self.node_account_ids.items();

        let payload = match &self.payload {
            OperationPayload::TopicMessageSubmit(p) => {
                let size = self.chunk_config.chunk_size.max(1);
                let start = (row * size).min(p.message.len());
                let end = (start + size).min(p.message.len());
                OperationPayload::TopicMessageSubmit(TopicMessageSubmitPayload {
                    topic_id: p.topic_id,
                    message: p.message[start..end].to_vec(),
                    chunk_info: Some(ChunkInfo {
                        initial_transaction_id: ids[0],
                        total: ids.len() as u32,
                        number: row as u32 + 1,
                    }),
                })
            }
            other => other.clone(),
        };

        TransactionBody {
            transaction_id: ids[row],
            node_account_id: nodes[column],
            max_fee: self.max_fee.unwrap_or(0),
            valid_duration_seconds: self.valid_duration_seconds,
            memo: self.memo.clone(),
            batch_key: self.batch_key,
            custom_fee_limits: self.custom_fee_limits.clone(),
            payload,
        }
    }

    /// Serialize the body of one cell, if not already done.
    fn materialize_cell(&self, row: usize, column: usize) -> Result<(), ClientError> {
        let mut grid = self.cells.lock();
        let index = grid.slot_index(row, column);
        if grid.cells[index].is_none() {
            let body_bytes = encode_body(&self.build_body(row, column))?;
            grid.cells[index] = Some(SignedTransaction {
                body_bytes,
                signature_map: SignatureMap::new(),
            });
        }
        Ok(())
    }

    fn materialize_all_cells(&self) -> Result<(), ClientError> {
        for row in 0..self.transaction_ids.len() {
            for column in 0..self.node_account_ids.len() {
                self.materialize_cell(row, column)?;
            }
        }
        Ok(())
    }

    fn with_cell<R>(
        &self,
        row: usize,
        column: usize,
        f: impl FnOnce(&mut SignedTransaction) -> R,
    ) -> R {
        let mut grid = self.cells.lock();
        let index = grid.slot_index(row, column);
        match grid.cells[index].as_mut() {
            Some(cell) => f(cell),
            None => unreachable!("cell ({row}, {column}) accessed before materialization"),
        }
    }

    /// The fully signed cell at `(row, column)`, serializing and lazily
    /// signing it on first use. Each registered key signs a cell at most
    /// once. The mutex is never held across a signer suspension.
    pub(crate) async fn signed_cell(
        &self,
        row: usize,
        column: usize,
    ) -> Result<SignedTransaction, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        self.materialize_cell(row, column)?;

        for signer in &self.signers {
            let public_key = signer.public_key();
            let pending_body = self.with_cell(row, column, |cell| {
                if cell.signature_map.contains(&public_key) {
                    None
                } else {
                    Some(cell.body_bytes.clone())
                }
            });
            if let Some(body_bytes) = pending_body {
                let signature = signer.sign(&body_bytes).await;
                self.with_cell(row, column, |cell| {
                    cell.signature_map.add(public_key, signature);
                });
            }
        }

        Ok(self.with_cell(row, column, |cell| cell.clone()))
    }

    pub(crate) async fn sign_all_cells(&self) -> Result<(), ClientError> {
        for row in 0..self.transaction_ids.len() {
            for column in 0..self.node_account_ids.len() {
                self.signed_cell(row, column).await?;
            }
        }
        Ok(())
    }

    // ── Export / import ──

    /// Serialize every cell (applying any pending on-demand signatures) into
    /// the wire form: enveloped cells, wrapped in a list container when more
    /// than one cell exists.
    pub async fn to_bytes(&self) -> Result<Vec<u8>, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        self.sign_all_cells().await?;

        let mut cells = Vec::with_capacity(self.transaction_ids.len() * self.node_account_ids.len());
        for row in 0..self.transaction_ids.len() {
            for column in 0..self.node_account_ids.len() {
                cells.push(self.with_cell(row, column, |cell| cell.clone()));
            }
        }
        Ok(encode_signed_transactions(&cells)?)
    }

    /// Content hash of the cursor row's first-column cell, as transmitted.
    pub async fn transaction_hash(&self) -> Result<Hash, ClientError> {
        if !self.frozen {
            return Err(ClientError::NotFrozen);
        }
        let row = self.transaction_ids.index();
        let cell = self.signed_cell(row, 0).await?;
        Ok(Hash::from_bytes(&encode_for_transmission(&cell)?))
    }

    /// Rebuild a frozen transaction from exported bytes.
    ///
    /// Cells are kept verbatim, so a following [`to_bytes`](Self::to_bytes)
    /// reproduces the input byte-for-byte. The identifier list counts as
    /// pinned: imported transactions never regenerate on expiry.
    pub(crate) fn from_encoded_cells(bytes: &[u8]) -> Result<Self, ClientError> {
        let cells = decode_signed_transactions(bytes)?;
        if cells.is_empty() {
            return Err(ClientError::MalformedImport {
                reason: "no transaction cells".into(),
            });
        }

        let bodies = cells
            .iter()
            .map(|cell| decode_body(&cell.body_bytes))
            .collect::<Result<Vec<_>, _>>()?;

        // Row order by first appearance; column order from the first row.
        let mut ids: Vec<TransactionId> = Vec::new();
        for body in &bodies {
            if !ids.contains(&body.transaction_id) {
                ids.push(body.transaction_id);
            }
        }
        let mut nodes: Vec<AccountId> = Vec::new();
        for body in &bodies {
            if body.transaction_id == ids[0] {
                nodes.push(body.node_account_id);
            }
        }
        if nodes.is_empty() || ids.len() * nodes.len() != bodies.len() {
            return Err(ClientError::MalformedImport {
                reason: "cell count does not form a grid".into(),
            });
        }

        for (index, body) in bodies.iter().enumerate() {
            let row = index / nodes.len();
            let column = index % nodes.len();
            if body.transaction_id != ids[row] || body.node_account_id != nodes[column] {
                return Err(ClientError::MalformedImport {
                    reason: "cells are not in row-major order".into(),
                });
            }
            let template = &bodies[row * nodes.len()];
            let mut normalized = body.clone();
            normalized.node_account_id = template.node_account_id;
            if normalized != *template {
                return Err(ClientError::MalformedImport {
                    reason: "cells in a row differ beyond the target node".into(),
                });
            }
        }

        let first = &bodies[0];
        let payload = match &first.payload {
            OperationPayload::TopicMessageSubmit(p) => {
                let mut message = Vec::new();
                for row in 0..ids.len() {
                    if let OperationPayload::TopicMessageSubmit(chunk) =
                        &bodies[row * nodes.len()].payload
                    {
                        message.extend_from_slice(&chunk.message);
                    }
                }
                OperationPayload::TopicMessageSubmit(TopicMessageSubmitPayload {
                    topic_id: p.topic_id,
                    message,
                    chunk_info: None,
                })
            }
            other => other.clone(),
        };

        let mut transaction_ids = LockableList::new();
        for id in &ids {
            transaction_ids.force_push(*id);
        }
        transaction_ids.lock();
        let mut node_account_ids = LockableList::new();
        for node in &nodes {
            node_account_ids.force_push(*node);
        }
        node_account_ids.lock();

        let grid = CellGrid {
            node_count: nodes.len(),
            cells: cells.into_iter().map(Some).collect(),
        };

        Ok(Self {
            payload,
            payer_account_id: Some(ids[0].payer),
            max_fee: Some(first.max_fee),
            memo: first.memo.clone(),
            valid_duration_seconds: first.valid_duration_seconds,
            batch_key: first.batch_key,
            custom_fee_limits: first.custom_fee_limits.clone(),
            signing_mode: SigningMode::default(),
            regenerate_transaction_ids: None,
            chunk_config: ChunkConfig::default(),
            transaction_ids,
            node_account_ids,
            explicit_transaction_ids: true,
            signers: Vec::new(),
            cells: Mutex::new(grid),
            frozen: true,
        })
    }

    // ── Execution support ──

    pub(crate) fn current_row(&self) -> usize {
        self.transaction_ids.index()
    }

    pub(crate) fn advance_row(&mut self) {
        self.transaction_ids.advance();
    }

    /// Whether expired identifiers may regenerate: pinning wins, then the
    /// transaction's explicit flag, then the client default.
    pub(crate) fn effective_regeneration(&self, client: &Client) -> bool {
        if self.explicit_transaction_ids {
            return false;
        }
        self.regenerate_transaction_ids
            .unwrap_or_else(|| client.default_regenerate_transaction_ids())
    }

    /// Replace the identifier of every pending chunk row (cursor onward)
    /// with a fresh one and drop those rows' cells, forcing re-serialization
    /// with the new identifiers.
    pub(crate) fn regenerate_pending_ids(&mut self) -> Result<(), ClientError> {
        let payer = self.payer_account_id.ok_or(ClientError::MissingPayerAccount)?;
        let interval = self.chunk_config.chunk_interval_nanos;
        let cursor = self.transaction_ids.index();
        let rows = self.transaction_ids.len();

        let fresh = TransactionId::generate(payer);
        let mut grid = self.cells.lock();
        for (offset, row) in (cursor..rows).enumerate() {
            self.transaction_ids
                .force_set(row, fresh.offset_by(interval * offset as u64));
            grid.clear_row(row);
        }
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("kind", &self.operation_kind())
            .field("frozen", &self.frozen)
            .field("payer", &self.payer_account_id)
            .field("rows", &self.transaction_ids.len())
            .field("nodes", &self.node_account_ids.len())
            .field("signers", &self.signers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_proto::TransferPayload;

    fn open_transfer() -> Transaction {
        Transaction::new(OperationPayload::Transfer(TransferPayload::default()))
    }

    #[test]
    fn test_non_chunkable_requires_one_chunk() {
        let tx = open_transfer();
        assert_eq!(tx.required_chunks().unwrap(), 1);
    }

    #[test]
    fn test_chunk_math() {
        let mut tx = Transaction::new(OperationPayload::TopicMessageSubmit(
            TopicMessageSubmitPayload {
                topic_id: meridian_types::TopicId::new(7),
                message: vec![0u8; 2500],
                chunk_info: None,
            },
        ));
        tx.set_chunk_size(1000).unwrap();
        assert_eq!(tx.required_chunks().unwrap(), 3);

        tx.set_max_chunks(2).unwrap();
        assert!(matches!(
            tx.required_chunks(),
            Err(ClientError::TooManyChunks {
                required: 3,
                max: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_length_payload_needs_one_chunk() {
        let tx = Transaction::new(OperationPayload::TopicMessageSubmit(
            TopicMessageSubmitPayload {
                topic_id: meridian_types::TopicId::new(7),
                message: vec![],
                chunk_info: None,
            },
        ));
        assert_eq!(tx.required_chunks().unwrap(), 1);
    }

    #[test]
    fn test_zero_chunk_config_rejected() {
        let mut tx = open_transfer();
        assert!(matches!(
            tx.set_chunk_size(0),
            Err(ClientError::InvalidChunkConfig)
        ));
        assert!(matches!(
            tx.set_max_chunks(0),
            Err(ClientError::InvalidChunkConfig)
        ));
    }

    #[tokio::test]
    async fn test_setters_rejected_after_freeze() {
        let mut tx = open_transfer();
        tx.set_payer_account_id(AccountId::new(2)).unwrap();
        tx.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
        tx.freeze().await.unwrap();

        assert!(matches!(
            tx.set_memo("late"),
            Err(ClientError::Immutable)
        ));
        assert!(matches!(
            tx.set_max_fee(1),
            Err(ClientError::Immutable)
        ));
        assert!(matches!(
            tx.set_node_account_ids(vec![AccountId::new(4)]),
            Err(ClientError::Immutable)
        ));
    }

    #[tokio::test]
    async fn test_freeze_requires_payer() {
        let mut tx = open_transfer();
        tx.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
        assert!(matches!(
            tx.freeze().await,
            Err(ClientError::MissingPayerAccount)
        ));
    }

    #[tokio::test]
    async fn test_freeze_requires_nodes() {
        let mut tx = open_transfer();
        tx.set_payer_account_id(AccountId::new(2)).unwrap();
        assert!(matches!(
            tx.freeze().await,
            Err(ClientError::MissingNodeList)
        ));
    }

    #[tokio::test]
    async fn test_freeze_is_idempotent() {
        let mut tx = open_transfer();
        tx.set_payer_account_id(AccountId::new(2)).unwrap();
        tx.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
        tx.freeze().await.unwrap();
        let ids: Vec<_> = tx.transaction_ids().to_vec();

        tx.freeze().await.unwrap();
        assert_eq!(tx.transaction_ids(), ids.as_slice());
    }

    #[test]
    fn test_pinning_locks_every_setter() {
        // Any lock bit makes the transaction immutable, so structural
        // setters must run before the identifier is pinned.
        let pinned = TransactionId::generate(AccountId::new(2));
        let mut tx = open_transfer();
        tx.set_transaction_id(pinned).unwrap();
        assert!(matches!(
            tx.set_node_account_ids(vec![AccountId::new(3)]),
            Err(ClientError::Immutable)
        ));
    }

    #[tokio::test]
    async fn test_pinned_id_survives_freeze() {
        let pinned = TransactionId::generate(AccountId::new(2));
        let mut tx = open_transfer();
        tx.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
        tx.set_transaction_id(pinned).unwrap();
        tx.freeze().await.unwrap();
        assert_eq!(tx.transaction_ids(), &[pinned]);
    }

    #[tokio::test]
    async fn test_regeneration_replaces_pending_rows() {
        let mut tx = open_transfer();
        tx.set_payer_account_id(AccountId::new(2)).unwrap();
        tx.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
        tx.freeze().await.unwrap();
        let before = tx.transaction_ids()[0];

        tx.regenerate_pending_ids().unwrap();
        let after = tx.transaction_ids()[0];
        assert!(after.valid_start > before.valid_start);
    }
}
