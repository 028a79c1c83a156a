//! Word-by-word reveal of a finished assistant reply.
//!
//! [`StreamingReveal`] is a pure state machine: it never sleeps or touches the store. Callers feed
//! it `start`/`on_tick`/`cancel` and apply the returned [`RevealEffect`]s in order. Every reveal
//! carries a generation; ticks from an older generation produce no effects, which is what makes a
//! cancelled reveal safe to leave in flight.

use std::time::Duration;

use parley_protocol::MessageId;
use rand::Rng;

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(30);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(80);

/// Bounds of the uniformly random inter-token delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RevealConfig {
    /// Swaps the bounds when they were given in the wrong order.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        if min_delay <= max_delay {
            Self {
                min_delay,
                max_delay,
            }
        } else {
            Self {
                min_delay: max_delay,
                max_delay: min_delay,
            }
        }
    }

    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        rng.random_range(self.min_delay..=self.max_delay)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEffect {
    /// Replace the message content with the revealed prefix.
    UpdateContent {
        message_id: MessageId,
        content: String,
    },
    /// Deliver `on_tick(generation)` after `delay`.
    Schedule { generation: u64, delay: Duration },
    /// The reveal finished; clear the streaming flag.
    MarkDone { message_id: MessageId },
}

struct ActiveReveal {
    message_id: MessageId,
    tokens: Vec<String>,
    revealed: usize,
    content: String,
}

pub struct StreamingReveal {
    config: RevealConfig,
    generation: u64,
    active: Option<ActiveReveal>,
}

impl StreamingReveal {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            generation: 0,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts revealing `full_text` into `message_id`, superseding any reveal in progress.
    ///
    /// Tokens are the pieces between single spaces, so joining every revealed token with `" "`
    /// reproduces `full_text` exactly.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        full_text: &str,
        message_id: MessageId,
        rng: &mut R,
    ) -> Vec<RevealEffect> {
        if let Some(previous) = self.cancel() {
            tracing::debug!(message_id = %previous, "superseded reveal in progress");
        }

        if full_text.is_empty() {
            return vec![
                RevealEffect::UpdateContent {
                    message_id,
                    content: String::new(),
                },
                RevealEffect::MarkDone { message_id },
            ];
        }

        let tokens: Vec<String> = full_text.split(' ').map(str::to_string).collect();
        let first = tokens.first().cloned().unwrap_or_default();
        tracing::trace!(%message_id, tokens = tokens.len(), "starting reveal");

        self.active = Some(ActiveReveal {
            message_id,
            tokens,
            revealed: 1,
            content: first.clone(),
        });
        vec![
            RevealEffect::UpdateContent {
                message_id,
                content: first,
            },
            self.schedule_next(rng),
        ]
    }

    /// Advances the reveal if `generation` is current.
    pub fn on_tick<R: Rng + ?Sized>(&mut self, generation: u64, rng: &mut R) -> Vec<RevealEffect> {
        if generation != self.generation {
            return Vec::new();
        }
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };

        let Some(token) = active.tokens.get(active.revealed) else {
            let message_id = active.message_id;
            self.active = None;
            return vec![RevealEffect::MarkDone { message_id }];
        };

        active.content.push(' ');
        active.content.push_str(token);
        active.revealed += 1;
        let update = RevealEffect::UpdateContent {
            message_id: active.message_id,
            content: active.content.clone(),
        };
        vec![update, self.schedule_next(rng)]
    }

    /// Invalidates all pending ticks. Returns the message that was being revealed, if any.
    pub fn cancel(&mut self) -> Option<MessageId> {
        self.generation += 1;
        self.active.take().map(|active| active.message_id)
    }

    fn schedule_next<R: Rng + ?Sized>(&self, rng: &mut R) -> RevealEffect {
        RevealEffect::Schedule {
            generation: self.generation,
            delay: self.config.sample_delay(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Runs a reveal to completion, collecting every content update in order.
    fn drive(reveal: &mut StreamingReveal, text: &str, id: MessageId) -> (Vec<String>, bool) {
        let mut rng = rng();
        let mut contents = Vec::new();
        let mut done = false;
        let mut pending = reveal.start(text, id, &mut rng);
        while !pending.is_empty() {
            let mut next = Vec::new();
            for effect in pending {
                match effect {
                    RevealEffect::UpdateContent { content, .. } => contents.push(content),
                    RevealEffect::MarkDone { .. } => done = true,
                    RevealEffect::Schedule { generation, .. } => {
                        next.extend(reveal.on_tick(generation, &mut rng));
                    }
                }
            }
            pending = next;
        }
        (contents, done)
    }

    #[test]
    fn reveals_prefixes_in_order_and_ends_with_full_text() {
        let mut reveal = StreamingReveal::new(RevealConfig::default());
        let (contents, done) = drive(&mut reveal, "Hello there, friend", MessageId::new());

        assert_eq!(
            contents,
            vec![
                "Hello".to_string(),
                "Hello there,".to_string(),
                "Hello there, friend".to_string(),
            ]
        );
        assert!(done);
        assert!(!reveal.is_active());
    }

    #[test]
    fn double_spaces_are_preserved() {
        let mut reveal = StreamingReveal::new(RevealConfig::default());
        let text = "a  b\nc ";
        let (contents, done) = drive(&mut reveal, text, MessageId::new());
        assert_eq!(contents.last().map(String::as_str), Some(text));
        assert_eq!(contents.len(), 4);
        assert!(done);
    }

    #[test]
    fn empty_text_finishes_immediately() {
        let mut reveal = StreamingReveal::new(RevealConfig::default());
        let id = MessageId::new();
        let effects = reveal.start("", id, &mut rng());
        assert_eq!(
            effects,
            vec![
                RevealEffect::UpdateContent {
                    message_id: id,
                    content: String::new(),
                },
                RevealEffect::MarkDone { message_id: id },
            ]
        );
        assert!(!reveal.is_active());
    }

    #[test]
    fn stale_ticks_are_ignored_after_restart() {
        let mut reveal = StreamingReveal::new(RevealConfig::default());
        let mut rng = rng();
        let first = MessageId::new();
        let second = MessageId::new();

        reveal.start("one two three", first, &mut rng);
        let stale_generation = reveal.generation;
        reveal.start("four five", second, &mut rng);

        assert!(reveal.on_tick(stale_generation, &mut rng).is_empty());
        let effects = reveal.on_tick(reveal.generation, &mut rng);
        assert_eq!(
            effects[0],
            RevealEffect::UpdateContent {
                message_id: second,
                content: "four five".to_string(),
            }
        );
    }

    #[test]
    fn cancel_returns_interrupted_message_and_silences_ticks() {
        let mut reveal = StreamingReveal::new(RevealConfig::default());
        let mut rng = rng();
        let id = MessageId::new();
        reveal.start("a b c", id, &mut rng);
        let generation = reveal.generation;

        assert_eq!(reveal.cancel(), Some(id));
        assert!(reveal.on_tick(generation, &mut rng).is_empty());
        assert_eq!(reveal.cancel(), None);
    }

    #[test]
    fn delays_stay_within_bounds() {
        let config = RevealConfig::new(Duration::from_millis(80), Duration::from_millis(30));
        assert_eq!(config.min_delay, Duration::from_millis(30));

        let mut rng = rng();
        for _ in 0..200 {
            let delay = config.sample_delay(&mut rng);
            assert!(delay >= config.min_delay && delay <= config.max_delay);
        }

        let fixed = RevealConfig::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(fixed.sample_delay(&mut rng), Duration::ZERO);
    }
}
