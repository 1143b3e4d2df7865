mod decompress;
pub use decompress::{DecompressError, Decompressed, Decompressor};

/// Upper two bits of a control byte select the token kind
const TYPE_MASK: u8 = 0xc0;
/// Lower six bits hold the run length minus one
const LEN_MASK: u8 = 0x3f;

const END: u8 = 0x00;

/// A single command of a GB-compressed stream.
///
/// Counts are already biased, i.e. `count` is the number of times the
/// operation is applied, in the range `1..=64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Copy the next `count` bytes of the stream to the output
    Literal { count: u8 },
    /// Emit `value` `count` times
    RepeatByte { value: u8, count: u8 },
    /// Emit the pair `value` `count` times (`2 * count` bytes)
    RepeatWord { value: [u8; 2], count: u8 },
    /// Copy `count` bytes from `offset` bytes relative to the current output
    /// position. Valid offsets are negative.
    RepeatPattern { offset: i16, count: u8 },
    End,
}

impl Token {
    /// Decode the token introduced by `control`, pulling its operands from
    /// `decompressor`.
    pub(crate) fn decode(control: u8, decompressor: &mut Decompressor) -> Result<Self, DecompressError> {
        if control == END {
            return Ok(Self::End);
        }

        let count = (control & LEN_MASK) + 1;

        let token = match (control & TYPE_MASK) >> 6 {
            0 => Self::RepeatByte {
                value: decompressor.read()?,
                count,
            },
            1 => Self::RepeatWord {
                value: [decompressor.read()?, decompressor.read()?],
                count,
            },
            2 => {
                let lower = decompressor.read()?;
                let upper = decompressor.read()?;

                Self::RepeatPattern {
                    offset: i16::from_le_bytes([lower, upper]),
                    count,
                }
            }
            3 => Self::Literal { count },
            _ => {
                return Err(DecompressError::UnknownToken {
                    control,
                    position: decompressor.read_position() - 1,
                })
            }
        };

        Ok(token)
    }
}

/// Decompress all of `src` into `dst`, returning the number of bytes written.
///
/// This is the plain memory path: writes are immediate and ungated. Output
/// that does not fit into `dst` fails with [`DecompressError::OutputOverflow`],
/// leaving the bytes written so far in place.
pub fn decompress_into(src: &[u8], dst: &mut [u8]) -> Result<usize, DecompressError> {
    let capacity = dst.len();
    let mut decompressor = Decompressor::new(src, 0);
    let mut written = 0;

    while let Some(value) = decompressor.decode_next()? {
        let slot = dst
            .get_mut(written)
            .ok_or(DecompressError::OutputOverflow { capacity })?;
        *slot = value;
        written += 1;
    }

    Ok(written)
}
