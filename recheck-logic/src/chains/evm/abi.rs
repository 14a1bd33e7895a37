use alloy::sol;

sol! {
    interface IBridgeCore {
        #[derive(Debug)]
        event LogMessagePublished(
            address indexed sender,
            uint64 sequence,
            uint32 nonce,
            bytes payload,
            uint8 consistencyLevel
        );
    }
}
