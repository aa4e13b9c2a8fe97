use core::fmt;
use memchr::memmem;

/// Facilities for searching bytes.
pub trait ByteSearcher {
    /// Search for ourselves in a slice of bytes.
    /// The length of the slice is unspecified and may be 0.
    /// \return the next index of ourselves in the slice, or None.
    fn find_in(&self, rhs: &[u8]) -> Option<usize>;
}

/// A literal byte sequence that every match must begin with.
#[derive(Clone)]
pub struct LiteralPrefix {
    bytes: Box<[u8]>,
    finder: memmem::Finder<'static>,
}

impl LiteralPrefix {
    pub fn new(bytes: &[u8]) -> LiteralPrefix {
        LiteralPrefix {
            bytes: bytes.into(),
            finder: memmem::Finder::new(bytes).into_owned(),
        }
    }

    /// \return the literal bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteSearcher for LiteralPrefix {
    #[inline(always)]
    fn find_in(&self, rhs: &[u8]) -> Option<usize> {
        match self.bytes.len() {
            0 => Some(0),
            1 => memchr::memchr(self.bytes[0], rhs),
            _ => self.finder.find(rhs),
        }
    }
}

impl fmt::Debug for LiteralPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LiteralPrefix({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

/// A helper function for formatting bitmaps, using - ranges.
fn format_bitmap<Func>(name: &str, f: &mut fmt::Formatter<'_>, contains: Func) -> fmt::Result
where
    Func: Fn(u8) -> bool,
{
    write!(f, "{}[", name)?;
    let mut idx: usize = 0;
    let mut maybe_space = "";
    while idx < 256 {
        // Compute the next value not contained.
        let mut end = idx;
        while end < 256 && contains(end as u8) {
            end += 1;
        }
        match end - idx {
            0 => (),
            1 => write!(f, "{}{}", maybe_space, idx)?,
            _ => write!(f, "{}{}-{}", maybe_space, idx, end - 1)?,
        };
        if end > idx {
            maybe_space = " ";
        }
        idx = end + 1
    }
    write!(f, "]")
}

/// A bitmap covering all bytes.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
pub struct ByteBitmap([u16; 16]);

impl ByteBitmap {
    /// Construct from a sequence of bytes.
    pub fn new(bytes: &[u8]) -> ByteBitmap {
        let mut bb = ByteBitmap::default();
        for &b in bytes {
            bb.set(b)
        }
        bb
    }

    /// \return whether this bitmap contains a given byte val.
    #[inline(always)]
    pub fn contains(&self, val: u8) -> bool {
        let byte = val >> 4;
        let bit = val & 0xF;
        (self.0[byte as usize] & (1 << bit)) != 0
    }

    /// Set a bit in this bitmap.
    #[inline(always)]
    pub fn set(&mut self, val: u8) {
        let byte = val >> 4;
        let bit = val & 0xF;
        self.0[byte as usize] |= 1 << bit;
    }

    /// Update ourselves from another bitmap, in place.
    pub fn bitor(&mut self, rhs: &ByteBitmap) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs |= *rhs;
        }
    }

    /// Count number of set bits.
    pub fn count_bits(&self) -> u32 {
        self.0.iter().map(|v| v.count_ones()).sum()
    }

    /// \return all set bytes, as a vec.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_vec(&self) -> Vec<u8> {
        (0..=255).filter(|b| self.contains(*b)).collect()
    }
}

impl ByteSearcher for ByteBitmap {
    #[inline(always)]
    fn find_in(&self, bytes: &[u8]) -> Option<usize> {
        // Few distinct bytes go to memchr's vectorized searchers.
        match self.count_bits() {
            1 => {
                let v = self.to_vec();
                memchr::memchr(v[0], bytes)
            }
            2 => {
                let v = self.to_vec();
                memchr::memchr2(v[0], v[1], bytes)
            }
            3 => {
                let v = self.to_vec();
                memchr::memchr3(v[0], v[1], v[2], bytes)
            }
            _ => bytes.iter().position(|&b| self.contains(b)),
        }
    }
}

impl fmt::Debug for ByteBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_bitmap("ByteBitmap", f, |v| self.contains(v))
    }
}
