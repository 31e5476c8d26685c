//! EthereumClient against ethers' MockProvider.
//!
//! MockProvider answers requests last-pushed-first.

use dewallet::blockchain::contract::token_balance_of;
use dewallet::blockchain::{BlockchainClient, EthereumClient};
use dewallet::core::abi::abi_word_uint256;
use dewallet::core::config::NetworkConfig;
use dewallet::WalletError;
use ethers::providers::{MockProvider, MockResponse, Provider};
use ethers::types::{Address, Bytes, U256};
use serde_json::json;

const OWNER: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";

fn create_mock_client() -> (EthereumClient<MockProvider>, MockProvider) {
    let mock = MockProvider::new();
    let handle = mock.clone();
    let provider = Provider::new(mock);
    (EthereumClient::new_with_provider(provider, 11155111), handle)
}

#[test]
fn test_new_rejects_bad_url() {
    let network = NetworkConfig { rpc_url: "not a url".into(), ..Default::default() };
    assert!(matches!(EthereumClient::new(&network), Err(WalletError::ConfigError(_))));
}

#[test]
fn test_new_does_not_connect() {
    // Nothing listens here; construction must still succeed.
    let network = NetworkConfig { rpc_url: "http://127.0.0.1:9".into(), ..Default::default() };
    let client = EthereumClient::new(&network).unwrap();
    assert_eq!(client.get_network_name(), "sepolia");
    assert_eq!(client.chain_id(), 11155111);
}

#[tokio::test]
async fn test_get_balance_zero() {
    let (client, mock) = create_mock_client();
    mock.push::<U256, _>(U256::zero()).unwrap();
    assert_eq!(client.get_balance(OWNER).await.unwrap(), "0");
}

#[tokio::test]
async fn test_get_balance_formats_ether() {
    let (client, mock) = create_mock_client();
    mock.push_response(MockResponse::Value(json!(U256::exp10(17) * 15)));
    assert_eq!(client.get_balance(OWNER).await.unwrap(), "1.5");
}

#[tokio::test]
async fn test_get_balance_invalid_address() {
    let (client, _mock) = create_mock_client();
    assert!(matches!(client.get_balance("0x1234").await, Err(WalletError::AddressError(_))));
    assert!(client.get_balance("").await.is_err());
}

#[tokio::test]
async fn test_get_chain_id() {
    let (client, mock) = create_mock_client();
    mock.push::<U256, _>(U256::from(11155111u64)).unwrap();
    assert_eq!(client.get_chain_id().await.unwrap(), 11155111);
}

#[tokio::test]
async fn test_token_balance_of_decodes_word() {
    let (client, mock) = create_mock_client();
    let word = abi_word_uint256(U256::from(2_500_000u64));
    mock.push::<Bytes, _>(Bytes::from(word.to_vec())).unwrap();

    let owner: Address = OWNER.parse().unwrap();
    let raw = token_balance_of(&client, Address::repeat_byte(0x1c), owner).await.unwrap();
    assert_eq!(raw, U256::from(2_500_000u64));
}

#[tokio::test]
async fn test_token_balance_of_short_return() {
    let (client, mock) = create_mock_client();
    mock.push::<Bytes, _>(Bytes::from(vec![0u8; 4])).unwrap();
    let res = token_balance_of(&client, Address::repeat_byte(0x1c), Address::repeat_byte(0x02)).await;
    assert!(res.is_err());
}
