use crate::error::QuoterError;
use crate::types::Hop;
use soroban_sdk::{Address, Bytes, Env, Vec};

// Wire format: token0 | fee0 | token1 | fee1 | ... | tokenN
//
// Tokens are the 56 character strkey of the address (G... or C...), fees are
// 3 bytes big-endian. A path of N hops is TOKEN_LEN + N * HOP_LEN bytes.

/// Length of an encoded token
pub const TOKEN_LEN: u32 = 56;
/// Length of an encoded fee
pub const FEE_LEN: u32 = 3;
/// Offset from one token to the next
pub const HOP_LEN: u32 = TOKEN_LEN + FEE_LEN;
/// Largest fee that fits its field
pub const MAX_ENCODED_FEE: u32 = 0x00FF_FFFF;

/// Encode `tokens[0], fees[0], tokens[1], ...` as a path
pub fn encode_path(env: &Env, tokens: &Vec<Address>, fees: &Vec<u32>) -> Result<Bytes, QuoterError> {
    if tokens.len() < 2 || tokens.len() != fees.len() + 1 {
        return Err(QuoterError::InvalidPath);
    }

    let mut path = Bytes::new(env);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            let fee = fees.get(i as u32 - 1).ok_or(QuoterError::InvalidPath)?;
            if fee > MAX_ENCODED_FEE {
                return Err(QuoterError::InvalidPath);
            }
            path.extend_from_slice(&fee.to_be_bytes()[1..]);
        }
        write_token(&mut path, &token)?;
    }
    Ok(path)
}

/// Number of hops in `path`
pub fn num_pools(path: &Bytes) -> Result<u32, QuoterError> {
    let len = path.len();
    if len < TOKEN_LEN + HOP_LEN || (len - TOKEN_LEN) % HOP_LEN != 0 {
        return Err(QuoterError::InvalidPath);
    }
    Ok((len - TOKEN_LEN) / HOP_LEN)
}

/// First hop of `path`, and the rest of the path starting at that hop's
/// `token_out` if another hop follows
pub fn decode_first_pool(path: &Bytes) -> Result<(Hop, Option<Bytes>), QuoterError> {
    let pools = num_pools(path)?;
    let hop = read_hop(path, 0)?;
    let rest = (pools > 1).then(|| path.slice(HOP_LEN..));
    Ok((hop, rest))
}

/// Last hop of `path`, and the path up to that hop's `token_in` if another
/// hop precedes it
pub fn decode_last_pool(path: &Bytes) -> Result<(Hop, Option<Bytes>), QuoterError> {
    let pools = num_pools(path)?;
    let offset = (pools - 1) * HOP_LEN;
    let hop = read_hop(path, offset)?;
    let prefix = (pools > 1).then(|| path.slice(..offset + TOKEN_LEN));
    Ok((hop, prefix))
}

/// Every hop of `path` in order
pub fn decode_path(env: &Env, path: &Bytes) -> Result<Vec<Hop>, QuoterError> {
    let mut hops = Vec::new(env);
    let mut remaining = Some(path.clone());
    while let Some(current) = remaining {
        let (hop, rest) = decode_first_pool(&current)?;
        hops.push_back(hop);
        remaining = rest;
    }
    Ok(hops)
}

fn read_hop(path: &Bytes, offset: u32) -> Result<Hop, QuoterError> {
    Ok(Hop {
        token_in: read_token(path, offset)?,
        fee: read_fee(path, offset + TOKEN_LEN),
        token_out: read_token(path, offset + HOP_LEN)?,
    })
}

fn write_token(path: &mut Bytes, token: &Address) -> Result<(), QuoterError> {
    let strkey = token.to_string();
    if strkey.len() != TOKEN_LEN {
        return Err(QuoterError::InvalidPath);
    }
    let mut buf = [0u8; TOKEN_LEN as usize];
    strkey.copy_into_slice(&mut buf);
    path.extend_from_slice(&buf);
    Ok(())
}

fn read_token(path: &Bytes, offset: u32) -> Result<Address, QuoterError> {
    let field = path.slice(offset..offset + TOKEN_LEN);
    let mut strkey = [0u8; TOKEN_LEN as usize];
    field.copy_into_slice(&mut strkey);
    if !is_address_strkey(&strkey) {
        return Err(QuoterError::InvalidPath);
    }
    Ok(Address::from_string_bytes(&field))
}

const ACCOUNT_VERSION: u8 = 6 << 3; // G...
const CONTRACT_VERSION: u8 = 2 << 3; // C...
/// Version byte, 32 byte key, 2 byte checksum
const RAW_STRKEY_LEN: usize = 35;

/// True for an account or contract strkey: base32 alphabet, known version
/// byte and a matching CRC16-XModem checksum
fn is_address_strkey(strkey: &[u8; TOKEN_LEN as usize]) -> bool {
    let mut raw = [0u8; RAW_STRKEY_LEN];
    let mut written = 0;
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &c in strkey {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return false,
        };
        acc = (acc << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            raw[written] = (acc >> bits) as u8;
            written += 1;
            acc &= (1 << bits) - 1;
        }
    }

    let version = raw[0];
    if version != ACCOUNT_VERSION && version != CONTRACT_VERSION {
        return false;
    }
    let checksum = u16::from_le_bytes([raw[RAW_STRKEY_LEN - 2], raw[RAW_STRKEY_LEN - 1]]);
    crc16_xmodem(&raw[..RAW_STRKEY_LEN - 2]) == checksum
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn read_fee(path: &Bytes, offset: u32) -> u32 {
    let mut buf = [0u8; 4];
    path.slice(offset..offset + FEE_LEN)
        .copy_into_slice(&mut buf[1..]);
    u32::from_be_bytes(buf)
}
