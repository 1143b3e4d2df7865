use super::Token;
use thiserror::Error;

/// Pull-based decoder for a GB-compressed stream.
///
/// Bytes are produced one at a time by [`Decompressor::decode_next`], so a
/// caller can gate every single write. All output produced so far is kept
/// around to resolve back-references.
#[derive(Debug, Clone)]
pub struct Decompressor<'a> {
    src: &'a [u8],

    /// used for reporting the compressed size
    start_index: usize,
    /// index to read from
    read_index: usize,

    /// everything produced so far, back-references read from here
    history: Vec<u8>,
    run: Run,
}

/// The token currently being expanded
#[derive(Debug, Clone, Copy)]
enum Run {
    Idle,
    Literal { remaining: usize },
    RepeatByte { value: u8, remaining: usize },
    RepeatWord { value: [u8; 2], remaining: usize },
    RepeatPattern { back: usize, remaining: usize },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Decompressed {
    pub data: Vec<u8>,
    /// compressed bytes consumed, including the end marker
    pub bytes_read: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Back-reference at {position:#x} with offset {offset} does not point into the {available} bytes produced so far")]
    MalformedStream {
        position: usize,
        offset: i16,
        available: usize,
    },
    #[error("Unknown control byte {control:#04x} at {position:#x}")]
    UnknownToken { control: u8, position: usize },
    #[error("Stream ended at {position:#x} before an end marker")]
    TruncatedStream { position: usize },
    #[error("Output does not fit into a destination of {capacity} bytes")]
    OutputOverflow { capacity: usize },
}

impl Run {
    fn remaining(&self) -> usize {
        match *self {
            Run::Literal { remaining }
            | Run::RepeatByte { remaining, .. }
            | Run::RepeatWord { remaining, .. }
            | Run::RepeatPattern { remaining, .. } => remaining,
            Run::Idle | Run::Finished => 0,
        }
    }

    fn advance(self) -> Self {
        let run = match self {
            Run::Literal { remaining } => Run::Literal {
                remaining: remaining - 1,
            },
            Run::RepeatByte { value, remaining } => Run::RepeatByte {
                value,
                remaining: remaining - 1,
            },
            Run::RepeatWord { value, remaining } => Run::RepeatWord {
                value,
                remaining: remaining - 1,
            },
            Run::RepeatPattern { back, remaining } => Run::RepeatPattern {
                back,
                remaining: remaining - 1,
            },
            other => other,
        };

        if matches!(run, Run::Finished) || run.remaining() > 0 {
            run
        } else {
            Run::Idle
        }
    }
}

impl<'a> Decompressor<'a> {
    /// Start decoding `src` at `offset`. Compressed assets are usually
    /// embedded somewhere inside a larger ROM image.
    pub fn new(src: &'a [u8], offset: usize) -> Self {
        Self {
            src,
            start_index: offset,
            read_index: offset,
            history: Vec::new(),
            run: Run::Idle,
        }
    }

    /// Decode the whole stream.
    pub fn decompress(mut self) -> Result<Decompressed, DecompressError> {
        while self.decode_next()?.is_some() {}

        Ok(Decompressed {
            bytes_read: self.bytes_read(),
            data: self.history,
        })
    }

    /// Produce the next output byte, or `None` once the end marker was read.
    ///
    /// Errors are fatal: the decoder is finished afterwards and keeps
    /// returning `Ok(None)`.
    pub fn decode_next(&mut self) -> Result<Option<u8>, DecompressError> {
        match self.step() {
            Ok(value) => Ok(value),
            Err(err) => {
                self.run = Run::Finished;
                Err(err)
            }
        }
    }

    fn step(&mut self) -> Result<Option<u8>, DecompressError> {
        if matches!(self.run, Run::Idle) {
            self.run = self.next_run()?;
        }

        let value = match self.run {
            Run::Idle | Run::Finished => return Ok(None),
            Run::Literal { .. } => self.read()?,
            Run::RepeatByte { value, .. } => value,
            Run::RepeatWord { value, remaining } => value[remaining % 2],
            Run::RepeatPattern { back, .. } => self.history[self.history.len() - back],
        };

        self.run = self.run.advance();
        self.history.push(value);

        Ok(Some(value))
    }

    /// Read the next control byte and set up the run it describes.
    fn next_run(&mut self) -> Result<Run, DecompressError> {
        let position = self.read_index;
        let control = self.read()?;

        let token = Token::decode(control, self)?;
        log::trace!("token at {:#x}: {:?}", position, token);

        let run = match token {
            Token::End => Run::Finished,
            Token::Literal { count } => Run::Literal {
                remaining: count as usize,
            },
            Token::RepeatByte { value, count } => Run::RepeatByte {
                value,
                remaining: count as usize,
            },
            Token::RepeatWord { value, count } => Run::RepeatWord {
                value,
                remaining: count as usize * 2,
            },
            Token::RepeatPattern { offset, count } => {
                let back = -i32::from(offset);
                let available = self.history.len();

                if back <= 0 || back as usize > available {
                    return Err(DecompressError::MalformedStream {
                        position,
                        offset,
                        available,
                    });
                }

                Run::RepeatPattern {
                    back: back as usize,
                    remaining: count as usize,
                }
            }
        };

        Ok(run)
    }

    pub(crate) fn read(&mut self) -> Result<u8, DecompressError> {
        let value = *self
            .src
            .get(self.read_index)
            .ok_or(DecompressError::TruncatedStream {
                position: self.read_index,
            })?;
        self.read_index += 1;

        Ok(value)
    }

    /// Current read position in the source
    pub fn read_position(&self) -> usize {
        self.read_index
    }

    pub fn bytes_read(&self) -> usize {
        self.read_index - self.start_index
    }

    /// Number of bytes produced so far
    pub fn produced(&self) -> usize {
        self.history.len()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.run, Run::Finished)
    }
}

impl Iterator for Decompressor<'_> {
    type Item = Result<u8, DecompressError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next().transpose()
    }
}
