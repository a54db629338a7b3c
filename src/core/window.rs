use smallvec::SmallVec;

use crate::core::basecursor::BaseCursor;
use crate::core::encoder::Encoder;
use crate::core::error::Error;
use crate::core::symbol::{BaseCode, SymbolTable};

/// Slides over a byte sequence producing one canonical k-mer code per
/// position. Windows touching a degenerate symbol either fail or, with
/// `skip_degenerates` set, are skipped entirely.
pub struct StrictWindow<'a> {
    seq: &'a [u8],
    encoder: Encoder,
    skip_degenerates: bool,
    pos: isize,
}

impl<'a> StrictWindow<'a> {
    pub fn new(k: u32, skip_degenerates: bool, seq: &'a [u8]) -> Result<Self, Error> {
        Ok(StrictWindow {
            seq,
            encoder: Encoder::new(k)?,
            skip_degenerates,
            pos: -1,
        })
    }

    fn limit(&self) -> isize {
        self.seq.len() as isize - self.encoder.k() as isize + 1
    }

    /// Advances to the next valid window. Returns `false` once the window
    /// has walked past the last valid start position.
    pub fn next(&mut self) -> bool {
        loop {
            self.pos += 1;
            if self.pos >= self.limit() {
                return false;
            }
            if self.skip_degenerates {
                let k = self.encoder.k() as usize;
                let start = self.pos as usize;
                let window = &self.seq[start..start + k];
                if let Some(offset) = window.iter().position(|&b| SymbolTable::is_degenerate(b)) {
                    // Every window overlapping this position also contains
                    // it, wherever in the window it falls; jump straight
                    // past it.
                    self.pos += offset as isize;
                    continue;
                }
            }
            return true;
        }
    }

    pub fn position(&self) -> usize {
        self.pos as usize
    }

    /// Encodes the current window. Fails `InvalidSymbol` for a non-IUPAC
    /// byte, or `DegenerateBase` if a degenerate symbol is present and
    /// `skip_degenerates` is false.
    pub fn code(&self) -> Result<u64, Error> {
        let k = self.encoder.k() as usize;
        let start = self.pos as usize;
        let window = &self.seq[start..start + k];
        let mut buf: SmallVec<[BaseCode; 32]> = SmallVec::with_capacity(k);
        let mut degenerate = false;
        for (i, &b) in window.iter().enumerate() {
            let codes = SymbolTable::codes(b).map_err(|_| Error::InvalidSymbol {
                symbol: b as char,
                position: start + i,
            })?;
            if codes.len() > 1 {
                degenerate = true;
            }
            buf.push(codes[0]);
        }
        if degenerate && !self.skip_degenerates {
            return Err(Error::DegenerateBase {
                kmer: String::from_utf8_lossy(window).into_owned(),
            });
        }
        Ok(self.encoder.encode(&buf))
    }
}

/// Slides over a byte sequence, enumerating every canonical k-mer variant
/// consistent with degenerate symbols at each window, subject to a cap on
/// the number of variants any single window may expand to.
pub struct ExpandingWindow<'a> {
    seq: &'a [u8],
    encoder: Encoder,
    max_variants: u32,
    cursors: Vec<BaseCursor>,
    window_start: isize,
    product: u64,
    variant_emitted: u64,
    exhausted: bool,
}

impl<'a> ExpandingWindow<'a> {
    pub fn new(k: u32, max_variants: u32, seq: &'a [u8]) -> Result<Self, Error> {
        let encoder = Encoder::new(k)?;
        let k = encoder.k() as usize;
        let mut w = ExpandingWindow {
            seq,
            encoder,
            max_variants,
            cursors: vec![BaseCursor::new(); k],
            window_start: 0,
            product: 1,
            variant_emitted: 0,
            exhausted: seq.len() < k,
        };
        if !w.exhausted {
            w.load_window(0)?;
        }
        Ok(w)
    }

    fn limit(&self) -> isize {
        self.seq.len() as isize - self.encoder.k() as isize + 1
    }

    fn load_window(&mut self, start: isize) -> Result<(), Error> {
        let k = self.encoder.k() as usize;
        let bytes = &self.seq[start as usize..start as usize + k];
        for (cursor, &b) in self.cursors.iter_mut().zip(bytes) {
            cursor.set(b).map_err(|_| Error::InvalidSymbol {
                symbol: b as char,
                position: start as usize,
            })?;
        }
        let product: u64 = self.cursors.iter().map(|c| c.len() as u64).product();
        if self.max_variants > 0 && product > self.max_variants as u64 {
            return Err(Error::VariantExplosion {
                kmer: String::from_utf8_lossy(bytes).into_owned(),
                position: start as usize,
                product,
                cap: self.max_variants,
            });
        }
        // Seed every cursor one step before its own start. Retreating only
        // the rightmost cursor would leave the others at position 0, so the
        // very first odometer step (which always rolls the rightmost
        // cursor over) would spuriously carry into a neighbour that never
        // actually advanced. Retreating all of them means the first step's
        // roll-over chain runs to completion with nothing left to carry
        // into, landing exactly on the all-zero first variant.
        for cursor in self.cursors.iter_mut() {
            cursor.retreat();
        }
        self.product = product;
        self.variant_emitted = 0;
        self.window_start = start;
        Ok(())
    }

    /// Advances to the next variant, sliding the window when the current
    /// one's variants are exhausted. Returns `false` once the sequence is
    /// fully consumed.
    pub fn next(&mut self) -> Result<bool, Error> {
        loop {
            if self.exhausted {
                return Ok(false);
            }
            if self.variant_emitted == self.product {
                let next_start = self.window_start + 1;
                if next_start >= self.limit() {
                    self.exhausted = true;
                    return Ok(false);
                }
                self.load_window(next_start)?;
                continue;
            }
            let k = self.cursors.len();
            for i in (0..k).rev() {
                if self.cursors[i].advance() {
                    break;
                }
            }
            self.variant_emitted += 1;
            return Ok(true);
        }
    }

    pub fn position(&self) -> usize {
        self.window_start as usize
    }

    /// 0-based index of the current variant within the current window.
    pub fn variant(&self) -> usize {
        (self.variant_emitted - 1) as usize
    }

    pub fn code(&self) -> u64 {
        let codes: SmallVec<[BaseCode; 32]> = self.cursors.iter().map(|c| c.current()).collect();
        self.encoder.encode(&codes)
    }
}
