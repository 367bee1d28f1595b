//! Legacy packet obfuscation
//!
//! Words 1..=5 of every packet are enciphered with a 6-round XXTEA whose
//! key depends on the current time and the sender's address. Both sides
//! derive the same key as long as their GNSS clocks agree to within the
//! 64-second key window.

const DELTA: u32 = 0x9e37_79b9;
const ROUNDS: u32 = 6;

/// Key schedule table, the upper half is used on odd 2^23-second epochs
pub const KEY_TABLE: [u32; 8] = [
    0xe432_76df,
    0xdca8_3759,
    0x9802_b8ac,
    0x4675_a56b,
    0xfc78_ea65,
    0x804b_90ea,
    0xb765_42cd,
    0x329d_fa32,
];

pub const KEY_MULTIPLIER: u32 = 0x045d_9f3b;
pub const KEY_MASK: u32 = 0x87b5_62f4;

/// Integer hash used to spread the key material
pub fn obscure(key: u32, seed: u32) -> u32 {
    let m1 = seed.wrapping_mul(key ^ (key >> 16));
    let m2 = seed.wrapping_mul(m1 ^ (m1 >> 16));
    m2 ^ (m2 >> 16)
}

/// Derive the 128-bit key for a packet.
///
/// `address` is the sender's 24-bit address shifted left by 8 and
/// truncated back to 24 bits.
pub fn make_key(timestamp: u32, address: u32) -> [u32; 4] {
    let base = if (timestamp >> 23) & 1 == 1 { 4 } else { 0 };
    let mix = (timestamp >> 6) ^ address;
    std::array::from_fn(|i| obscure(KEY_TABLE[base + i] ^ mix, KEY_MULTIPLIER) ^ KEY_MASK)
}

#[inline]
fn mx(sum: u32, y: u32, z: u32, p: usize, e: usize, key: &[u32; 4]) -> u32 {
    (((z >> 5) ^ (y << 2)).wrapping_add((y >> 3) ^ (z << 4)))
        ^ ((sum ^ y).wrapping_add(key[(p & 3) ^ e] ^ z))
}

/// Encipher `v` in place
pub fn encrypt(v: &mut [u32], key: &[u32; 4]) {
    let n = v.len();
    if n < 2 {
        return;
    }

    let mut sum: u32 = 0;
    let mut z = v[n - 1];
    for _ in 0..ROUNDS {
        sum = sum.wrapping_add(DELTA);
        let e = ((sum >> 2) & 3) as usize;
        for p in 0..n - 1 {
            let y = v[p + 1];
            v[p] = v[p].wrapping_add(mx(sum, y, z, p, e, key));
            z = v[p];
        }
        let y = v[0];
        v[n - 1] = v[n - 1].wrapping_add(mx(sum, y, z, n - 1, e, key));
        z = v[n - 1];
    }
}

/// Decipher `v` in place
pub fn decrypt(v: &mut [u32], key: &[u32; 4]) {
    let n = v.len();
    if n < 2 {
        return;
    }

    let mut sum = ROUNDS.wrapping_mul(DELTA);
    let mut y = v[0];
    for _ in 0..ROUNDS {
        let e = ((sum >> 2) & 3) as usize;
        for p in (1..n).rev() {
            let z = v[p - 1];
            v[p] = v[p].wrapping_sub(mx(sum, y, z, p, e, key));
            y = v[p];
        }
        let z = v[n - 1];
        v[0] = v[0].wrapping_sub(mx(sum, y, z, 0, e, key));
        y = v[0];
        sum = sum.wrapping_sub(DELTA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obscure_zero() {
        assert_eq!(obscure(0, KEY_MULTIPLIER), 0);
    }

    #[test]
    fn test_key_depends_on_time_window() {
        let addr = (0x123456 << 8) & 0x00FF_FFFF;
        // Same 64-second window
        assert_eq!(make_key(1_700_000_000, addr), make_key(1_700_000_000 + 1, addr));
        // Next window
        let t = 1_700_000_000 & !0x3F;
        assert_ne!(make_key(t, addr), make_key(t + 64, addr));
        // Different sender
        assert_ne!(make_key(t, addr), make_key(t, addr ^ 0x100));
    }

    #[test]
    fn test_decrypt_inverts_encrypt() {
        let key = make_key(1_650_000_000, 0x345600);
        let plain = [0x0123_4567, 0x89ab_cdef, 0xdead_beef, 0x0000_0000, 0xffff_ffff];
        let mut v = plain;
        encrypt(&mut v, &key);
        assert_ne!(v, plain);
        decrypt(&mut v, &key);
        assert_eq!(v, plain);
    }

    #[test]
    fn test_wrong_key_garbles() {
        let plain = [1, 2, 3, 4, 5];
        let mut v = plain;
        encrypt(&mut v, &make_key(1_650_000_000, 0x345600));
        decrypt(&mut v, &make_key(1_650_000_000, 0x345700));
        assert_ne!(v, plain);
    }
}
