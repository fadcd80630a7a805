// SPDX-License-Identifier: Apache-2.0

//! Deterministic test data generators for abuse simulation.

use serde_json::{json, Value};

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Generate a pool of client IPs in the 10.x.x.x range.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            format!("10.{a}.{b}.{c}")
        })
        .collect()
}

/// A syntactically valid 44 character Base58 address, unique per seed.
///
/// The seed is spelled out in Base58 digits first, which guarantees two
/// seeds never produce the same address; the remainder is filled from a
/// seeded LCG.
pub fn base58_address(seed: usize) -> String {
    let mut chars = Vec::with_capacity(44);
    let mut n = seed;
    loop {
        chars.push(BASE58_ALPHABET[n % 58] as char);
        n /= 58;
        if n == 0 {
            break;
        }
    }
    let mut state = seed as u64;
    while chars.len() < 44 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        chars.push(BASE58_ALPHABET[(state >> 33) as usize % 58] as char);
    }
    chars.into_iter().collect()
}

/// Generate distinct valid wallet addresses.
pub fn generate_wallets(count: usize) -> Vec<String> {
    (0..count).map(|i| base58_address(i * 2 + 1)).collect()
}

/// Generate distinct valid mint addresses.
pub fn generate_mints(count: usize) -> Vec<String> {
    (0..count).map(|i| base58_address(i * 2 + 100_000)).collect()
}

/// A well-formed submission body for the given pair.
pub fn submission_body(wallet: &str, mint: &str, index: usize) -> Value {
    json!({
        "wallet": wallet,
        "mint": mint,
        "name": format!("Token {index}"),
        "symbol": format!("TK{}", index % 100),
        "image": format!("https://cdn.example.com/token-{index}.png"),
        "description": format!("Metadata for token number {index}."),
    })
}

/// Bodies that must each fail validation, for garbage-flood scenarios.
pub fn garbage_bodies() -> Vec<Value> {
    vec![
        // Nothing at all
        json!({}),
        // Missing everything but the addresses
        json!({
            "wallet": base58_address(1),
            "mint": base58_address(2),
        }),
        // Wallet too short for an address
        {
            let mut body = submission_body(&base58_address(3), &base58_address(4), 0);
            body["wallet"] = json!("short");
            body
        },
        // Ambiguous Base58 characters in the mint
        {
            let mut body = submission_body(&base58_address(5), &base58_address(6), 1);
            body["mint"] = json!("O0Il".repeat(11));
            body
        },
        // Non-string field
        {
            let mut body = submission_body(&base58_address(7), &base58_address(8), 2);
            body["name"] = json!(["not", "a", "string"]);
            body
        },
        // Oversized description
        {
            let mut body = submission_body(&base58_address(9), &base58_address(10), 3);
            body["description"] = json!("x".repeat(2000));
            body
        },
        // Image without an http scheme
        {
            let mut body = submission_body(&base58_address(11), &base58_address(12), 4);
            body["image"] = json!("ipfs://QmSomeHash");
            body
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ips_are_unique() {
        let ips = generate_ips(256);
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn generated_addresses_look_valid() {
        for wallet in generate_wallets(50) {
            assert_eq!(wallet.len(), 44);
            assert!(wallet
                .bytes()
                .all(|b| BASE58_ALPHABET.contains(&b)), "{wallet}");
        }
    }

    #[test]
    fn wallets_and_mints_do_not_collide() {
        let wallets = generate_wallets(100);
        let mints = generate_mints(100);
        let all: std::collections::HashSet<_> = wallets.iter().chain(mints.iter()).collect();
        assert_eq!(all.len(), 200);
    }
}
