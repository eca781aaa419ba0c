use alloy::sol;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Gateway {
        function nonces(address owner) external view returns (uint256);
    }
);
