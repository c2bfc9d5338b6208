//! SM3 cryptographic hash algorithm (GB/T 32905-2016).
//!
//! A 256-bit Merkle-Damgård hash over 512-bit blocks, used throughout the
//! GM/T suite (SM2 signatures, SM9 hash-to-range, KDFs).

use gmcore_types::CryptoError;

/// SM3 output size in bytes.
pub const SM3_OUTPUT_SIZE: usize = 32;

/// SM3 block size in bytes.
pub const SM3_BLOCK_SIZE: usize = 64;

const IV: [u32; 8] = [
    0x7380166f, 0x4914b2b9, 0x172442d7, 0xda8a0600, 0xa96f30bc, 0x163138aa, 0xe38dee4d, 0xb0fb0e4e,
];

#[inline]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), SM3_BLOCK_SIZE);

    let mut w = [0u32; 68];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    for i in 16..68 {
        w[i] = p1(w[i - 16] ^ w[i - 9] ^ w[i - 3].rotate_left(15))
            ^ w[i - 13].rotate_left(7)
            ^ w[i - 6];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for j in 0..64 {
        let t = if j < 16 { 0x79cc4519u32 } else { 0x7a879d8au32 };
        let ss1 = a
            .rotate_left(12)
            .wrapping_add(e)
            .wrapping_add(t.rotate_left(j as u32 % 32))
            .rotate_left(7);
        let ss2 = ss1 ^ a.rotate_left(12);
        let (ff, gg) = if j < 16 {
            (a ^ b ^ c, e ^ f ^ g)
        } else {
            ((a & b) | (a & c) | (b & c), (e & f) | (!e & g))
        };
        let tt1 = ff
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(w[j] ^ w[j + 4]);
        let tt2 = gg.wrapping_add(h).wrapping_add(ss1).wrapping_add(w[j]);

        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s ^= v;
    }
}

/// Streaming SM3 hash context.
#[derive(Clone)]
pub struct Sm3 {
    state: [u32; 8],
    /// Total bytes absorbed.
    count: u64,
    buffer: [u8; SM3_BLOCK_SIZE],
    buffered: usize,
}

impl Sm3 {
    pub fn new() -> Self {
        Self {
            state: IV,
            count: 0,
            buffer: [0u8; SM3_BLOCK_SIZE],
            buffered: 0,
        }
    }

    /// Absorb `data` into the hash state.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.count += data.len() as u64;

        let mut rest = data;
        if self.buffered > 0 {
            let take = rest.len().min(SM3_BLOCK_SIZE - self.buffered);
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&rest[..take]);
            self.buffered += take;
            rest = &rest[take..];
            if self.buffered == SM3_BLOCK_SIZE {
                let block = self.buffer;
                compress(&mut self.state, &block);
                self.buffered = 0;
            }
        }

        let mut chunks = rest.chunks_exact(SM3_BLOCK_SIZE);
        for block in &mut chunks {
            compress(&mut self.state, block);
        }
        let tail = chunks.remainder();
        self.buffer[..tail.len()].copy_from_slice(tail);
        self.buffered = tail.len();
        Ok(())
    }

    /// Pad, finish and return the digest. The context is left in its
    /// padded state; call [`Sm3::reset`] to reuse it.
    pub fn finish(&mut self) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let bit_len = self.count.wrapping_mul(8);

        let mut tail = [0u8; 2 * SM3_BLOCK_SIZE];
        tail[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
        tail[self.buffered] = 0x80;
        let blocks = if self.buffered + 9 <= SM3_BLOCK_SIZE { 1 } else { 2 };
        let total = blocks * SM3_BLOCK_SIZE;
        tail[total - 8..total].copy_from_slice(&bit_len.to_be_bytes());
        for block in tail[..total].chunks_exact(SM3_BLOCK_SIZE) {
            compress(&mut self.state, block);
        }

        let mut out = [0u8; SM3_OUTPUT_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(out)
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::provider::Digest for Sm3 {
    fn output_size(&self) -> usize {
        SM3_OUTPUT_SIZE
    }
    fn block_size(&self) -> usize {
        SM3_BLOCK_SIZE
    }
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Sm3::update(self, data)
    }
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SM3_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SM3_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Sm3::finish(self)?;
        out[..SM3_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }
    fn reset(&mut self) {
        Sm3::reset(self)
    }
}
