//! Oracle client: the four generative operations behind one retry wrapper.
//!
//! Requests live in a pending table and are advanced by game ticks. A
//! rate-limited attempt is resubmitted after an exponential backoff delay
//! ([`retry::Backoff`]); any other transport failure is terminal and mapped
//! to the operation's own failure contract — combine propagates, the single
//! emoji falls back to a sparkle, companion generation falls back to the
//! error-born descriptor, extraction fails the session start.
//!
//! The client touches neither the combination cache nor game state; callers
//! consult [`cache::RecipeCache`] before submitting and apply replies from
//! [`OracleClient::tick`] themselves.

pub mod cache;
pub mod parse;
pub mod retry;

use crate::net::{Transport, TransportError};
use parse::{CompanionSpec, Extraction};
use retry::Backoff;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    /// Rate limit retries exhausted.
    #[error("the oracle is overloaded")]
    Exhausted,
    /// Terminal transport failure (network down, hook missing, …).
    #[error("oracle transport failed: {0}")]
    Transport(String),
    /// Unusable extraction reply.
    #[error("malformed extraction reply: {0}")]
    Malformed(String),
}

fn map_terminal(error: TransportError) -> OracleError {
    match error {
        TransportError::RateLimited(_) => OracleError::Exhausted,
        TransportError::Failed(msg) => OracleError::Transport(msg),
    }
}

#[derive(Debug, Clone)]
enum RequestKind {
    Combine { a: String, b: String, language: String },
    SingleEmoji { text: String },
    Companion { contexts: Vec<String> },
    Extract { source: String },
}

/// A completed oracle operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    /// `Ok(Some)` success, `Ok(None)` no relation, `Err` transport/exhaustion.
    Combined(Result<Option<parse::Combination>, OracleError>),
    /// Emoji glyph for a custom concept. `Err` only on a hard transport
    /// failure — the deduct-then-refund path in the economy depends on it.
    SingleEmoji(Result<String, OracleError>),
    /// Companion descriptor; generation never fails.
    Companion(CompanionSpec),
    /// Seed concepts + detected language; failure here is fatal to setup.
    Extracted(Result<Extraction, OracleError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OracleEvent {
    pub id: RequestId,
    pub reply: OracleReply,
}

struct Pending {
    id: RequestId,
    kind: RequestKind,
    /// 0-based attempt currently in flight (or about to be resubmitted).
    attempt: u32,
    /// Ticks until resubmission; 0 means waiting on the transport.
    delay_ticks: u32,
}

pub struct OracleClient {
    backoff: Backoff,
    next_id: RequestId,
    pending: Vec<Pending>,
}

impl OracleClient {
    pub fn new() -> Self {
        Self {
            backoff: Backoff::oracle_default(),
            next_id: 1,
            pending: Vec::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn begin_combine<T: Transport>(
        &mut self,
        transport: &mut T,
        a: &str,
        b: &str,
        language: &str,
    ) -> RequestId {
        self.begin(
            transport,
            RequestKind::Combine {
                a: a.to_string(),
                b: b.to_string(),
                language: language.to_string(),
            },
        )
    }

    pub fn begin_single_emoji<T: Transport>(&mut self, transport: &mut T, text: &str) -> RequestId {
        self.begin(transport, RequestKind::SingleEmoji { text: text.to_string() })
    }

    pub fn begin_companion<T: Transport>(
        &mut self,
        transport: &mut T,
        contexts: Vec<String>,
    ) -> RequestId {
        self.begin(transport, RequestKind::Companion { contexts })
    }

    pub fn begin_extract<T: Transport>(&mut self, transport: &mut T, source: &str) -> RequestId {
        self.begin(transport, RequestKind::Extract { source: source.to_string() })
    }

    fn begin<T: Transport>(&mut self, transport: &mut T, kind: RequestKind) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        transport.submit(id, &build_prompt(&kind));
        self.pending.push(Pending {
            id,
            kind,
            attempt: 0,
            delay_ticks: 0,
        });
        id
    }

    /// Advance backoff timers, resubmit due retries, and collect finished
    /// replies. Call once per game tick batch.
    pub fn tick<T: Transport>(&mut self, transport: &mut T, delta_ticks: u32) -> Vec<OracleEvent> {
        // Resubmit requests whose backoff delay has elapsed.
        for p in &mut self.pending {
            if p.delay_ticks > 0 {
                p.delay_ticks = p.delay_ticks.saturating_sub(delta_ticks);
                if p.delay_ticks == 0 {
                    transport.submit(p.id, &build_prompt(&p.kind));
                }
            }
        }

        let mut events = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            let p = &mut self.pending[i];
            if p.delay_ticks > 0 {
                i += 1;
                continue;
            }
            match transport.take_response(p.id) {
                None => i += 1,
                Some(Ok(text)) => {
                    let reply = parse_reply(&p.kind, &text);
                    events.push(OracleEvent { id: p.id, reply });
                    self.pending.swap_remove(i);
                }
                Some(Err(error)) => {
                    if self.backoff.should_retry(p.attempt, &error) {
                        p.delay_ticks = self.backoff.delay_ticks(p.attempt);
                        p.attempt += 1;
                        i += 1;
                    } else {
                        let reply = terminal_reply(&p.kind, error);
                        events.push(OracleEvent { id: p.id, reply });
                        self.pending.swap_remove(i);
                    }
                }
            }
        }
        events
    }
}

/// Successful transport reply → operation result.
fn parse_reply(kind: &RequestKind, text: &str) -> OracleReply {
    match kind {
        RequestKind::Combine { .. } => OracleReply::Combined(Ok(parse::parse_combination(text))),
        RequestKind::SingleEmoji { .. } => OracleReply::SingleEmoji(Ok(parse::parse_emoji_reply(text))),
        RequestKind::Companion { .. } => OracleReply::Companion(parse::parse_companion(text)),
        RequestKind::Extract { .. } => OracleReply::Extracted(
            parse::parse_extraction(text).map_err(OracleError::Malformed),
        ),
    }
}

/// Terminal transport failure → the operation's failure contract.
fn terminal_reply(kind: &RequestKind, error: TransportError) -> OracleReply {
    match kind {
        RequestKind::Combine { .. } => OracleReply::Combined(Err(map_terminal(error))),
        RequestKind::SingleEmoji { .. } => match error {
            // Quota exhaustion degrades to the fallback glyph; only a hard
            // failure reaches the caller (and triggers the cost refund).
            TransportError::RateLimited(_) => {
                OracleReply::SingleEmoji(Ok(parse::FALLBACK_EMOJI.to_string()))
            }
            TransportError::Failed(msg) => {
                OracleReply::SingleEmoji(Err(OracleError::Transport(msg)))
            }
        },
        RequestKind::Companion { .. } => OracleReply::Companion(CompanionSpec::error_born()),
        RequestKind::Extract { .. } => OracleReply::Extracted(Err(map_terminal(error))),
    }
}

fn build_prompt(kind: &RequestKind) -> String {
    match kind {
        RequestKind::Combine { a, b, language } => format!(
            "Task: Synthesize \"{a}\" + \"{b}\".\n\
             Language: {language}\n\
             Rules:\n\
             1. If they have no logical, metaphorical, or pop-culture connection, return \"NULL\".\n\
             2. No simple stacking.\n\
             3. Provide 2 hex colors representing the result.\n\
             4. Output format: Result|Emoji|Hex1|Hex2\n\
             Example: Lava|🌋|#FF4500|#8B0000"
        ),
        RequestKind::SingleEmoji { text } => format!(
            "Task: Provide one relevant emoji for the concept \"{text}\".\n\
             Output: the emoji only.\n\
             Example: Input \"Black Hole\" -> Output \"🕳️\""
        ),
        RequestKind::Companion { contexts } => format!(
            "Task: Create a cute fantasy companion inspired by: \"{}\".\n\
             Output format: Name|Emoji|HexColor|ShortDescription\n\
             Example: Lava Slime|🌋|#FF4500|A warm, bubbly friend.\n\
             Rules:\n\
             1. Name is 1-3 words.\n\
             2. Color is a bright/neon hex.\n\
             3. Description is at most 5 words.",
            contexts.join(", ")
        ),
        RequestKind::Extract { source } => {
            let clipped: String = source.chars().take(2000).collect();
            format!(
                "Analyze: \"{clipped}\".\n\
                 1. Detect the language.\n\
                 2. Extract 20 concepts (nouns) in that language.\n\
                 Return JSON: {{ \"language\": \"Detected Language\", \
                 \"concepts\": [{{ \"text\": \"Concept\", \"emoji\": \"💡\" }}] }}"
            )
        }
    }
}
