//! # NMEA Sentence Feed
//!
//! Assembles raw receiver bytes into sentences and keeps the latest fix.
//!
//! Only GGA sentences update the fix; everything else is counted and
//! dropped. A GGA sentence reporting fix quality 0 clears the fix.

use nmea::sentences::FixType;
use nmea::ParseResult;
use tracing::{debug, trace};

use super::Fix;

/// Longest line kept before it is discarded as noise (NMEA allows 82)
const MAX_SENTENCE_LEN: usize = 128;

/// Incremental NMEA parser state
#[derive(Debug, Default)]
pub struct NmeaFeed {
    line: Vec<u8>,
    fix: Option<Fix>,
    chars_processed: u64,
    sentences_parsed: u64,
    sentences_failed: u64,
}

impl NmeaFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume raw receiver bytes
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.chars_processed += 1;

            match byte {
                b'\n' => {
                    let line = std::mem::take(&mut self.line);
                    self.handle_line(&line);
                }
                b'$' => {
                    // Start of sentence resyncs even mid-line
                    self.line.clear();
                    self.line.push(byte);
                }
                _ if self.line.len() < MAX_SENTENCE_LEN => self.line.push(byte),
                _ => {
                    trace!("Discarding overlong NMEA line");
                    self.line.clear();
                }
            }
        }
    }

    /// Latest valid fix
    pub fn fix(&self) -> Option<Fix> {
        self.fix
    }

    /// Forget the current fix
    ///
    /// Called when the receiver stops talking; a fix is only current while
    /// sentences keep arriving.
    pub fn clear_fix(&mut self) {
        self.fix = None;
    }

    /// Bytes consumed so far
    pub fn chars_processed(&self) -> u64 {
        self.chars_processed
    }

    /// Sentences parsed successfully
    pub fn sentences_parsed(&self) -> u64 {
        self.sentences_parsed
    }

    /// Sentences rejected (bad checksum, malformed, unsupported)
    pub fn sentences_failed(&self) -> u64 {
        self.sentences_failed
    }

    fn handle_line(&mut self, raw: &[u8]) {
        let Ok(text) = std::str::from_utf8(raw) else {
            self.sentences_failed += 1;
            return;
        };

        let sentence = text.trim_end_matches('\r');
        if !sentence.starts_with('$') {
            return;
        }

        match nmea::parse_str(sentence) {
            Ok(ParseResult::GGA(gga)) => {
                self.sentences_parsed += 1;

                let valid = !matches!(gga.fix_type, None | Some(FixType::Invalid));
                self.fix = match (valid, gga.latitude, gga.longitude, gga.fix_time) {
                    (true, Some(latitude), Some(longitude), Some(time)) => Some(Fix {
                        latitude,
                        longitude,
                        time,
                    }),
                    _ => None,
                };
                trace!("GGA: {:?}", self.fix);
            }
            Ok(_) => self.sentences_parsed += 1,
            Err(e) => {
                self.sentences_failed += 1;
                debug!("Rejected NMEA sentence {:?}: {:?}", sentence, e);
            }
        }
    }
}
