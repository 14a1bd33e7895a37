use super::types::{EncodedTransaction, MessageAccount, Pubkey};
use crate::{
    error::DecodeError,
    types::{BridgeMessage, TxReference},
};
use alloy::primitives::{B256, Bytes};

/// First data byte of the bridge program's post-message instruction.
pub const POST_MESSAGE_INSTRUCTION: u8 = 0x01;
/// Position of the message account in the post-message instruction's account list.
pub const MESSAGE_ACCOUNT_SLOT: usize = 1;

const POSTED_MESSAGE_MAGIC: &[u8] = b"msg";

/// Static account keys followed by the addresses loaded through lookup
/// tables, in the order instruction indices refer to them.
pub fn account_keys(transaction: &EncodedTransaction) -> Vec<Pubkey> {
    let mut keys = transaction.transaction.message.account_keys.clone();
    if let Some(loaded) = transaction
        .meta
        .as_ref()
        .and_then(|meta| meta.loaded_addresses.as_ref())
    {
        keys.extend(loaded.writable.iter().copied());
        keys.extend(loaded.readonly.iter().copied());
    }
    keys
}

/// Finds the account written by the first post-message instruction that
/// targets `program`, looking at top-level instructions and then inner ones.
/// Returns `None` when the program is not referenced or never posts.
pub fn find_message_account(
    transaction: &EncodedTransaction,
    program: &Pubkey,
) -> Result<Option<Pubkey>, DecodeError> {
    let keys = account_keys(transaction);
    let Some(program_index) = keys.iter().position(|key| key == program) else {
        return Ok(None);
    };

    let inner = transaction
        .meta
        .iter()
        .flat_map(|meta| meta.inner_instructions.iter().flatten())
        .flat_map(|inner| inner.instructions.iter());

    for instruction in transaction.transaction.message.instructions.iter().chain(inner) {
        if usize::from(instruction.program_id_index) != program_index {
            continue;
        }
        let data = bs58::decode(&instruction.data).into_vec().map_err(|err| {
            DecodeError::MalformedInstruction(format!("instruction data is not base58: {err}"))
        })?;
        if data.first() != Some(&POST_MESSAGE_INSTRUCTION) {
            continue;
        }

        let account = instruction
            .accounts
            .get(MESSAGE_ACCOUNT_SLOT)
            .and_then(|index| keys.get(usize::from(*index)))
            .ok_or_else(|| {
                DecodeError::MalformedInstruction(
                    "post-message instruction does not reference a message account".to_string(),
                )
            })?;
        return Ok(Some(*account));
    }

    Ok(None)
}

/// Little-endian reader over account data.
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.data.len() < len {
            return None;
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Some(head)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N).and_then(|bytes| bytes.try_into().ok())
    }

    fn u8(&mut self) -> Option<u8> {
        self.array::<1>().map(|[b]| b)
    }

    fn u16(&mut self) -> Option<u16> {
        self.array().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Option<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Option<u64> {
        self.array().map(u64::from_le_bytes)
    }
}

struct PostedMessage {
    consistency_level: u8,
    nonce: u32,
    sequence: u64,
    emitter_chain: u16,
    emitter_address: [u8; 32],
    payload: Vec<u8>,
}

fn read_posted_message(data: &[u8]) -> Option<PostedMessage> {
    let mut reader = Reader {
        data: data.strip_prefix(POSTED_MESSAGE_MAGIC)?,
    };
    let _version = reader.u8()?;
    let consistency_level = reader.u8()?;
    let _observation_time = reader.u32()?;
    let _signature_account = reader.take(32)?;
    let _submission_time = reader.u32()?;
    let nonce = reader.u32()?;
    let sequence = reader.u64()?;
    let emitter_chain = reader.u16()?;
    let emitter_address = reader.array::<32>()?;
    let payload_len = usize::try_from(reader.u32()?).ok()?;
    let payload = reader.take(payload_len)?.to_vec();

    Some(PostedMessage {
        consistency_level,
        nonce,
        sequence,
        emitter_chain,
        emitter_address,
        payload,
    })
}

/// Decodes a posted-message account owned by the bridge program.
pub fn parse_posted_message(
    account: &MessageAccount,
    program: &Pubkey,
    reference: &TxReference,
) -> Result<BridgeMessage, DecodeError> {
    let malformed = |reason: &str| DecodeError::MalformedAccount {
        account: account.address.to_string(),
        reason: reason.to_string(),
    };

    if account.owner != *program {
        return Err(malformed("account is not owned by the bridge program"));
    }
    if !account.data.starts_with(POSTED_MESSAGE_MAGIC) {
        return Err(malformed("account is not a posted message"));
    }
    let message =
        read_posted_message(&account.data).ok_or_else(|| malformed("posted message is truncated"))?;

    Ok(BridgeMessage {
        emitter_chain: message.emitter_chain,
        emitter_address: B256::from(message.emitter_address),
        sequence: message.sequence,
        nonce: message.nonce,
        consistency_level: message.consistency_level,
        payload: Bytes::from(message.payload),
        tx_reference: reference.raw.clone(),
        observation_reference: Bytes::copy_from_slice(account.address.as_ref()),
    })
}
