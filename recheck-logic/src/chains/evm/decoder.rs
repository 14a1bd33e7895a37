use super::abi::IBridgeCore::LogMessagePublished;
use crate::{
    error::DecodeError,
    types::{BridgeMessage, Chain, TxReference},
};
use alloy::{
    network::ReceiptResponse,
    primitives::Address,
    rpc::types::{Log, TransactionReceipt},
    sol_types::SolEvent,
};

/// Extracts bridge messages from a successful receipt. A reverted
/// transaction never carries valid messages.
pub fn decode_receipt(
    chain: Chain,
    contract: Address,
    reference: &TxReference,
    receipt: &TransactionReceipt,
) -> Result<Vec<BridgeMessage>, DecodeError> {
    if !receipt.status() {
        return Err(DecodeError::FailedTransaction(reference.raw.clone()));
    }
    decode_logs(chain, contract, reference, receipt.inner.logs())
}

/// Decodes every `LogMessagePublished` emitted by `contract`, in log order.
/// Logs from other contracts or with other signatures are ignored.
pub fn decode_logs(
    chain: Chain,
    contract: Address,
    reference: &TxReference,
    logs: &[Log],
) -> Result<Vec<BridgeMessage>, DecodeError> {
    logs.iter()
        .enumerate()
        .filter(|(_, log)| {
            log.address() == contract
                && log.topic0() == Some(&LogMessagePublished::SIGNATURE_HASH)
        })
        .map(|(index, log)| {
            let event = log
                .log_decode::<LogMessagePublished>()
                .map_err(|err| DecodeError::MalformedLog {
                    index,
                    reason: err.to_string(),
                })?
                .inner
                .data;

            Ok(BridgeMessage {
                emitter_chain: chain.id(),
                emitter_address: event.sender.into_word(),
                sequence: event.sequence,
                nonce: event.nonce,
                consistency_level: event.consistencyLevel,
                payload: event.payload,
                tx_reference: reference.raw.clone(),
                observation_reference: reference.bytes.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bridge_log, evm_reference};
    use alloy::primitives::{B256, Bytes, LogData};
    use pretty_assertions::assert_eq;

    fn contract() -> Address {
        Address::repeat_byte(0x25)
    }

    #[test]
    fn decodes_bridge_logs_in_order() {
        let reference = evm_reference(Chain::Ethereum, 0xaa);
        let logs = vec![
            bridge_log(contract(), Address::repeat_byte(0x11), 7, b"first"),
            bridge_log(contract(), Address::repeat_byte(0x12), 8, b"second"),
        ];

        let messages = decode_logs(Chain::Ethereum, contract(), &reference, &logs).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].emitter_chain, 2);
        assert_eq!(
            messages[0].emitter_address,
            Address::repeat_byte(0x11).into_word()
        );
        assert_eq!(messages[0].sequence, 7);
        assert_eq!(messages[0].payload, Bytes::from_static(b"first"));
        assert_eq!(messages[0].observation_reference, reference.bytes);
        assert_eq!(messages[0].tx_reference, reference.raw);
        assert_eq!(messages[1].sequence, 8);
    }

    #[test]
    fn emitter_address_is_left_padded_sender() {
        let reference = evm_reference(Chain::Base, 0xaa);
        let logs = vec![bridge_log(contract(), Address::repeat_byte(0x11), 1, b"")];

        let message = &decode_logs(Chain::Base, contract(), &reference, &logs).unwrap()[0];

        let mut expected = [0u8; 32];
        expected[12..].copy_from_slice(&[0x11; 20]);
        assert_eq!(message.emitter_address, B256::from(expected));
        assert_eq!(message.emitter_chain, 30);
    }

    #[test]
    fn ignores_logs_from_other_contracts_and_events() {
        let reference = evm_reference(Chain::Ethereum, 0xaa);
        let mut unrelated_event = bridge_log(contract(), Address::repeat_byte(0x11), 3, b"");
        unrelated_event.inner.data = LogData::new_unchecked(
            vec![B256::repeat_byte(0xee)],
            unrelated_event.inner.data.data.clone(),
        );
        let logs = vec![
            bridge_log(Address::repeat_byte(0x99), Address::repeat_byte(0x11), 1, b""),
            unrelated_event,
        ];

        let messages = decode_logs(Chain::Ethereum, contract(), &reference, &logs).unwrap();

        assert!(messages.is_empty());
    }

    #[test]
    fn truncated_event_data_is_malformed() {
        let reference = evm_reference(Chain::Ethereum, 0xaa);
        let mut log = bridge_log(contract(), Address::repeat_byte(0x11), 3, b"payload");
        let topics = log.inner.data.topics().to_vec();
        log.inner.data = LogData::new_unchecked(topics, Bytes::from_static(&[0u8; 10]));
        let logs = vec![
            bridge_log(Address::repeat_byte(0x99), Address::repeat_byte(0x11), 1, b""),
            log,
        ];

        let result = decode_logs(Chain::Ethereum, contract(), &reference, &logs);

        assert!(matches!(result, Err(DecodeError::MalformedLog { index: 1, .. })));
    }
}
