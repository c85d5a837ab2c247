//! Evolved prompt composition.
//!
//! The evolved prompt is the configured base text plus a single version
//! block rendered from a structured [`PromptVersion`] record. Clients send
//! the full rendered text back with the next trigger, so [`EvolvedPrompt::parse`]
//! recognizes the version marker in inbound blobs and evicts the prior block
//! before a new one is appended. Invariant: a rendered prompt carries at most
//! one version block and never exceeds [`MAX_PROMPT_CHARS`].

use revoice_types::{PromptVersion, SpeakerRole, TranscriptEntry};

/// Hard ceiling on the rendered prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Start of the version block, followed by the version number and `]`.
const VERSION_MARKER: &str = "[Version ";

/// User utterances must be strictly longer than this to qualify as quotes.
/// Skips "ok" / "yeah" style acknowledgements.
const MIN_QUOTE_CHARS: usize = 12;

/// Number of quotes kept per version block.
const MAX_QUOTES: usize = 2;

/// A prompt as the base text plus an optional structured version record.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolvedPrompt {
    /// The prompt text without any version block.
    pub base: String,
    /// The version record rendered as the single version block.
    pub version: Option<PromptVersion>,
}

impl EvolvedPrompt {
    /// Splits an inbound prompt blob into base text and (discarded) prior
    /// version block.
    ///
    /// Rendering always appends the block at the end, so everything from the
    /// version marker onward is the prior block. Exactly one block is
    /// evicted; text without a marker is kept whole.
    pub fn parse(text: &str) -> Self {
        let base = match find_version_marker(text) {
            Some(idx) => text[..idx].trim().to_string(),
            None => text.trim().to_string(),
        };
        Self {
            base,
            version: None,
        }
    }

    /// Attaches the version record to render as the new block.
    pub fn with_version(mut self, version: PromptVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Renders the full prompt text: base plus exactly one version block.
    ///
    /// When the rendered text would exceed [`MAX_PROMPT_CHARS`], the session
    /// snapshot section is dropped first; if the text is still over the
    /// ceiling it is truncated to exactly the ceiling.
    pub fn render(&self) -> String {
        let Some(version) = &self.version else {
            return self.base.clone();
        };

        let full = join(&self.base, &render_version_block(version, true));
        if char_len(&full) <= MAX_PROMPT_CHARS {
            return full;
        }

        tracing::debug!(
            chars = char_len(&full),
            ceiling = MAX_PROMPT_CHARS,
            "prompt over ceiling, dropping session snapshot"
        );

        let compact = join(&self.base, &render_version_block(version, false));
        if char_len(&compact) <= MAX_PROMPT_CHARS {
            return compact;
        }

        compact.chars().take(MAX_PROMPT_CHARS).collect()
    }
}

/// Selects up to two salient user quotes from a transcript.
///
/// Longest utterances first, as a cheap proxy for content richness. Each
/// quote gets its first letter capitalized and a single trailing period
/// stripped so rendering can add its own punctuation.
pub fn pick_top_quotes(transcript: &[TranscriptEntry]) -> Vec<String> {
    let mut candidates: Vec<&str> = transcript
        .iter()
        .filter(|entry| entry.role == SpeakerRole::User)
        .map(|entry| entry.message.trim())
        .filter(|text| char_len(text) > MIN_QUOTE_CHARS)
        .collect();

    candidates.sort_by_key(|text| std::cmp::Reverse(char_len(text)));

    candidates
        .into_iter()
        .take(MAX_QUOTES)
        .map(clean_quote)
        .collect()
}

fn clean_quote(text: &str) -> String {
    let text = text.strip_suffix('.').unwrap_or(text);
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join(base: &str, block: &str) -> String {
    if base.is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{}", base, block)
    }
}

/// Finds the byte offset of a genuine version marker: `[Version ` followed
/// by digits and `]`. Lookalike text without the number is not a marker.
fn find_version_marker(text: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(VERSION_MARKER) {
        let idx = search_from + rel;
        let rest = &text[idx + VERSION_MARKER.len()..];
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && rest[digits..].starts_with(']') {
            return Some(idx);
        }
        search_from = idx + VERSION_MARKER.len();
    }
    None
}

fn render_version_block(version: &PromptVersion, include_snapshot: bool) -> String {
    let mut block = format!("[Version {}] - Improved from latest session\n", version.number);

    if include_snapshot {
        block.push_str("### Session Snapshot\n");
        block.push_str(&format!("-> Main theme: {}\n", version.theme));
        block.push_str(&format!("-> Dominant emotion: {}\n", version.emotion));
        block.push_str(&format!("-> Suggested next step: {}\n", version.next_step));
        block.push('\n');
    }

    block.push_str("=> Key user quotes\n");
    block.push_str(&render_quotes(&version.quotes));
    block.push_str("\n\n");

    block.push_str("=> Follow-up cue\n");
    block.push_str("Ask how often the user practised the suggested next step and what felt helpful.\n\n");

    block.push_str("=> Metadata (dev-only)\n");
    block.push_str(&format!(
        "Duration {}s · {} user msgs / {} agent msgs · ID {}",
        version.duration_secs, version.user_messages, version.agent_messages, version.conversation_id
    ));

    block
}

fn render_quotes(quotes: &[String]) -> String {
    if quotes.is_empty() {
        return "**No salient quotes captured.**".to_string();
    }

    quotes
        .iter()
        .enumerate()
        .map(|(i, quote)| {
            let label = if i == 0 { "**Top concern:**" } else { "**Second:**" };
            format!("{} “{}.”", label, quote)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_version(number: u32) -> PromptVersion {
        PromptVersion {
            number,
            theme: "work stress".to_string(),
            emotion: "anxious".to_string(),
            next_step: "Practice a short breathing exercise daily".to_string(),
            quotes: vec![
                "I have been feeling overwhelmed at work lately".to_string(),
                "My manager keeps adding deadlines".to_string(),
            ],
            duration_secs: 75,
            user_messages: 3,
            agent_messages: 4,
            conversation_id: "conv-1".to_string(),
        }
    }

    fn marker_count(text: &str) -> usize {
        text.matches("[Version ").count()
    }

    #[test]
    fn render_appends_exactly_one_block() {
        let rendered = EvolvedPrompt::parse("You are a calm listener.")
            .with_version(sample_version(2))
            .render();

        assert!(rendered.starts_with("You are a calm listener."));
        assert_eq!(marker_count(&rendered), 1);
        assert!(rendered.contains("[Version 2] - Improved from latest session"));
        assert!(rendered.contains("### Session Snapshot"));
        assert!(rendered.contains("-> Main theme: work stress"));
        assert!(rendered.contains("**Top concern:**"));
        assert!(rendered.contains("ID conv-1"));
    }

    #[test]
    fn composing_again_evicts_the_prior_block() {
        let first = EvolvedPrompt::parse("You are a calm listener.")
            .with_version(sample_version(2))
            .render();

        let second = EvolvedPrompt::parse(&first)
            .with_version(sample_version(3))
            .render();

        assert_eq!(marker_count(&second), 1);
        assert!(second.contains("[Version 3]"));
        assert!(!second.contains("[Version 2]"));
        assert!(second.starts_with("You are a calm listener."));
    }

    #[test]
    fn parse_keeps_text_without_marker_whole() {
        let prompt = EvolvedPrompt::parse("  Just a base prompt.  ");
        assert_eq!(prompt.base, "Just a base prompt.");
    }

    #[test]
    fn parse_ignores_lookalike_markers() {
        let text = "Mention [Version history] in your answer.";
        let prompt = EvolvedPrompt::parse(text);
        assert_eq!(prompt.base, text);
    }

    #[test]
    fn render_without_version_is_the_base() {
        let prompt = EvolvedPrompt::parse("Base only.");
        assert_eq!(prompt.render(), "Base only.");
    }

    #[test]
    fn over_ceiling_drops_snapshot_first() {
        let version = sample_version(2);
        let compact_len = render_version_block(&version, false).chars().count();

        // Sized so the full block overflows but the compact one fits.
        let base: String = "x".repeat(MAX_PROMPT_CHARS - compact_len - 2);
        let rendered = EvolvedPrompt { base, version: Some(version) }.render();

        assert!(rendered.chars().count() <= MAX_PROMPT_CHARS);
        assert!(!rendered.contains("### Session Snapshot"));
        assert_eq!(marker_count(&rendered), 1);
    }

    #[test]
    fn oversized_base_is_truncated_to_the_ceiling() {
        let base: String = "y".repeat(MAX_PROMPT_CHARS + 500);
        let rendered = EvolvedPrompt {
            base,
            version: Some(sample_version(2)),
        }
        .render();

        assert_eq!(rendered.chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn quotes_prefer_longest_meaningful_user_lines() {
        let transcript = vec![
            TranscriptEntry {
                role: SpeakerRole::Agent,
                message: "How has your week been going so far?".to_string(),
            },
            TranscriptEntry {
                role: SpeakerRole::User,
                message: "ok".to_string(),
            },
            TranscriptEntry {
                role: SpeakerRole::User,
                message: "my manager keeps adding deadlines.".to_string(),
            },
            TranscriptEntry {
                role: SpeakerRole::User,
                message: "i have been feeling overwhelmed at work lately.".to_string(),
            },
        ];

        let quotes = pick_top_quotes(&transcript);
        assert_eq!(
            quotes,
            vec![
                "I have been feeling overwhelmed at work lately".to_string(),
                "My manager keeps adding deadlines".to_string(),
            ]
        );
    }

    #[test]
    fn no_qualifying_quotes_renders_fallback_line() {
        let transcript = vec![TranscriptEntry {
            role: revoice_types::SpeakerRole::User,
            message: "yeah".to_string(),
        }];
        assert!(pick_top_quotes(&transcript).is_empty());

        let mut version = sample_version(2);
        version.quotes = vec![];
        let rendered = EvolvedPrompt::parse("Base.")
            .with_version(version)
            .render();
        assert!(rendered.contains("**No salient quotes captured.**"));
    }
}
