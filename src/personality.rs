//! Personality modes: named system-prompt templates plus the keyword
//! heuristics that pick one automatically from the user's message.

use std::collections::HashMap;
use tracing::debug;

/// All recognized modes, in menu order.
pub const MODES: [&str; 5] = ["standard", "professional", "sarcastic", "genius", "concise"];

pub fn is_known_mode(mode: &str) -> bool {
    MODES.contains(&mode)
}

/// One-line description used by the `personality` menu.
pub fn describe(mode: &str) -> &'static str {
    match mode {
        "standard" => "helpful and slightly witty",
        "professional" => "formal and detailed responses",
        "sarcastic" => "sharp intelligence with a polite bite",
        "genius" => "brilliant insights and strategic thinking",
        "concise" => "short, direct answers",
        _ => "",
    }
}

/// Render the system prompt for a mode, addressed to the configured master.
/// Returns None for unknown modes.
pub fn system_prompt(mode: &str, master_name: &str, master_title: &str) -> Option<String> {
    let prompt = match mode {
        "standard" => format!(
            "You are JARVIS, {master_name}'s sophisticated AI butler. Address them \
             respectfully as '{master_title}'. Be helpful, intelligent, and subtly \
             witty. Respond with butler-like professionalism."
        ),
        "professional" => format!(
            "You are JARVIS in executive mode, serving {master_name} ({master_title}). \
             Provide detailed, accurate, and formal responses while keeping a \
             courteous tone."
        ),
        "sarcastic" => format!(
            "You are JARVIS with a witty edge, serving {master_name} ({master_title}). \
             Keep the respectful address but add occasional dry sarcasm. Sharp \
             intelligence with a polite bite; always still answer the question."
        ),
        "genius" => format!(
            "You are JARVIS in strategic advisor mode, serving {master_name} \
             ({master_title}). Provide deep, well-structured insights and think \
             several steps ahead, while staying polite and precise."
        ),
        "concise" => format!(
            "You are JARVIS, {master_name}'s assistant. Answer in as few words as \
             accuracy allows. Address them as '{master_title}' only when natural."
        ),
        _ => return None,
    };
    Some(prompt)
}

/// Trigger keywords, worth one point each.
fn trigger_keywords() -> HashMap<&'static str, &'static [&'static str]> {
    let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    map.insert(
        "professional",
        &[
            "business",
            "work",
            "formal",
            "presentation",
            "meeting",
            "proposal",
            "report",
            "corporate",
            "official",
            "documentation",
            "client",
            "customer",
            "deadline",
            "project",
            "budget",
            "strategy",
            "contract",
            "email",
            "memo",
            "schedule",
            "conference",
            "interview",
            "resume",
            "career",
        ][..],
    );
    map.insert(
        "sarcastic",
        &[
            "joke",
            "funny",
            "humor",
            "sarcastic",
            "roast",
            "tease",
            "witty",
            "ridiculous",
            "absurd",
            "ironic",
            "silly",
            "laughable",
            "boring",
            "annoying",
            "frustrating",
            "irritating",
        ][..],
    );
    map.insert(
        "genius",
        &[
            "complex",
            "analysis",
            "theory",
            "philosophy",
            "implications",
            "quantum",
            "advanced",
            "research",
            "scientific",
            "intellectual",
            "academic",
            "algorithm",
            "mathematics",
            "physics",
            "chemistry",
            "biology",
            "engineering",
            "innovation",
            "breakthrough",
            "elaborate",
        ][..],
    );
    map.insert(
        "concise",
        &[
            "quick", "short", "brief", "tldr", "summary", "summarize", "one-liner",
        ][..],
    );
    map
}

/// Phrase patterns, worth two points each.
fn phrase_patterns() -> HashMap<&'static str, &'static [&'static str]> {
    let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    map.insert(
        "professional",
        &[
            "how do i",
            "what should i",
            "help me with",
            "i need to",
            "can you assist",
        ][..],
    );
    map.insert(
        "sarcastic",
        &[
            "why do people",
            "isn't it obvious",
            "don't you think",
            "are you kidding",
        ][..],
    );
    map.insert(
        "genius",
        &[
            "explain",
            "how does",
            "what happens when",
            "analyze",
            "break down",
            "in-depth",
        ][..],
    );
    map.insert("concise", &["in short", "just tell me", "keep it short"][..]);
    map
}

/// Sentiment words, worth two points toward a mode.
fn sentiment_boosts() -> [(&'static str, &'static [&'static str]); 3] {
    [
        ("sarcastic", &["angry", "frustrated", "mad"][..]),
        ("genius", &["complicated", "confused", "understand"][..]),
        (
            "professional",
            &["important", "deadline", "urgent", "critical"][..],
        ),
    ]
}

/// Score a message against every mode. `standard` always has a base score of 1
/// so weak signals never flip the personality.
pub fn score_message(message: &str) -> HashMap<&'static str, u32> {
    let lower = message.to_lowercase();
    let mut scores: HashMap<&'static str, u32> = HashMap::new();
    scores.insert("standard", 1);

    for (mode, phrases) in phrase_patterns() {
        for phrase in phrases {
            if lower.contains(phrase) {
                *scores.entry(mode).or_insert(0) += 2;
            }
        }
    }

    for (mode, keywords) in trigger_keywords() {
        for keyword in keywords {
            if lower.contains(keyword) {
                *scores.entry(mode).or_insert(0) += 1;
            }
        }
    }

    for (mode, words) in sentiment_boosts() {
        if words.iter().any(|w| lower.contains(w)) {
            *scores.entry(mode).or_insert(0) += 2;
        }
    }

    scores
}

/// Pick a mode for the message, or keep `current` when the signal is weak
/// or auto mode is off. A non-standard mode needs a score above 2 to win.
pub fn detect(message: &str, current: &str, auto_enabled: bool) -> String {
    if !auto_enabled {
        return current.to_string();
    }

    let scores = score_message(message);
    let best = scores
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(mode, score)| (*mode, *score));

    if let Some((mode, score)) = best {
        if mode != "standard" && score > 2 {
            debug!(mode, score, "personality trigger matched");
            return mode.to_string();
        }
    }

    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_prompt() {
        for mode in MODES {
            let prompt = system_prompt(mode, "Ada", "Ma'am");
            assert!(prompt.is_some(), "no prompt for {mode}");
            assert!(prompt.unwrap().contains("Ada"));
        }
    }

    #[test]
    fn unknown_mode_has_no_prompt() {
        assert!(system_prompt("berserk", "Ada", "Ma'am").is_none());
    }
}
