//! Contract address derivation for CREATE and CREATE2

use crate::hash::keccak256;
use rlp::RlpStream;
use zxc_primitives::{Address, H256};

/// Address of a contract created by `sender` at account nonce `nonce`:
/// the last 20 bytes of `keccak256(rlp([sender, nonce]))`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    let hash = keccak256(&stream.out());
    tail_address(&hash)
}

/// Address of a contract created through CREATE2:
/// the last 20 bytes of `keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))`.
pub fn create2_address(sender: &Address, salt: &H256, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);

    let mut data = Vec::with_capacity(1 + 20 + 32 + 32);
    data.push(0xff);
    data.extend_from_slice(sender.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(code_hash.as_bytes());

    tail_address(&keccak256(&data))
}

fn tail_address(hash: &H256) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}
