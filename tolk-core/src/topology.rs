//! Room addressing and automatic language selection.
//!
//! Every room name used for `join`, `offer`, `answer` and `ice-candidate` is built here.
//! The selection functions are pure: two clients looking at the same room document
//! settle on the same sub-rooms.

use crate::model::{Language, Role, RoomDetails, RoomName};
use crate::utils::SUB_ROOM_SEPARATOR;

/// `base` when `lang` is empty, otherwise `base::lang`.
pub fn sub_room_name(base: &str, lang: &str) -> RoomName {
    let lang = lang.trim();
    if lang.is_empty() {
        RoomName::from(base)
    } else {
        RoomName(format!("{}{}{}", base, SUB_ROOM_SEPARATOR, lang))
    }
}

/// Sub-room a participant with `role` belongs to for the given languages.
///
/// Speakers broadcast into their source room, listeners sit in their target room and a
/// relay has one slot on each side; [`relay_rooms`] returns both.
pub fn room_for_role(base: &str, role: Role, src: Option<&str>, tgt: Option<&str>) -> RoomName {
    match role {
        Role::Speaker => sub_room_name(base, src.unwrap_or_default()),
        _ => sub_room_name(base, tgt.unwrap_or_default()),
    }
}

/// Upstream (source) and downstream (target) rooms of a relay.
pub fn relay_rooms(base: &str, src: Option<&str>, tgt: Option<&str>) -> (RoomName, RoomName) {
    (
        sub_room_name(base, src.unwrap_or_default()),
        sub_room_name(base, tgt.unwrap_or_default()),
    )
}

/// Insertion-ordered occurrence counter; keeps first-seen order for tie-breaks.
#[derive(Default)]
struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, code: &str) {
        match self.entries.iter_mut().find(|(c, _)| c == code) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((code.to_owned(), 1)),
        }
    }

    fn count(&self, code: &str) -> usize {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Highest count, ties to the earliest entry.
    fn best(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (code, n) in &self.entries {
            if best.is_none_or(|(_, top)| *n > top) {
                best = Some((code.as_str(), *n));
            }
        }
        best.map(|(code, _)| code)
    }
}

fn speaker_languages(details: &RoomDetails) -> Vec<&str> {
    let mut codes: Vec<&str> = Vec::new();
    for speaker in &details.speakers {
        for lang in &speaker.languages {
            let code = lang.code.trim();
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

fn pairs(details: &RoomDetails) -> impl Iterator<Item = (&str, &str)> {
    details
        .translators
        .iter()
        .flat_map(|t| t.pairs.iter())
        .map(|p| (p.source.code.trim(), p.target.code.trim()))
}

/// Source language a room should be broadcast in when none was chosen explicitly.
///
/// `None` means no audio path can be determined; callers fall back to the base room.
pub fn choose_auto_source_language(details: &RoomDetails) -> Option<String> {
    let speaker_codes = speaker_languages(details);
    if let [only] = speaker_codes.as_slice() {
        return Some((*only).to_owned());
    }

    let mut coverage = Tally::default();
    for (src, _) in pairs(details) {
        if !src.is_empty() {
            coverage.add(src);
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for code in &speaker_codes {
        let score = coverage.count(code);
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((*code, score));
        }
    }
    if let Some((code, _)) = best {
        return Some(code.to_owned());
    }

    pairs(details)
        .map(|(src, _)| src)
        .find(|src| !src.is_empty())
        .map(str::to_owned)
}

/// Target language a relay should emit for `source` when none was chosen explicitly.
pub fn choose_auto_target_language(details: &RoomDetails, source: &str) -> Option<String> {
    let mut counts = Tally::default();
    for (src, tgt) in pairs(details) {
        if src == source && !tgt.is_empty() {
            counts.add(tgt);
        }
    }
    if let Some(code) = counts.best() {
        return Some(code.to_owned());
    }

    pairs(details)
        .map(|(_, tgt)| tgt)
        .find(|tgt| !tgt.is_empty())
        .map(str::to_owned)
}

/// One entry of the listener language picker.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageOption {
    pub language: Language,
    /// The speaker talks in this language; no relay is involved.
    pub original: bool,
}

impl LanguageOption {
    pub fn label(&self) -> String {
        if self.original {
            format!("{} (Original)", self.language.name)
        } else {
            self.language.name.clone()
        }
    }
}

/// Languages a listener can pick: speaker languages first, then translator targets.
pub fn language_options(details: &RoomDetails) -> Vec<LanguageOption> {
    let mut options: Vec<LanguageOption> = Vec::new();
    for speaker in &details.speakers {
        for lang in &speaker.languages {
            if lang.code.trim().is_empty() {
                continue;
            }
            match options.iter_mut().find(|o| o.language.code == lang.code) {
                Some(existing) => existing.original = true,
                None => options.push(LanguageOption {
                    language: lang.clone(),
                    original: true,
                }),
            }
        }
    }
    for translator in &details.translators {
        for pair in &translator.pairs {
            let target = &pair.target;
            if target.code.trim().is_empty() || options.iter().any(|o| o.language.code == target.code) {
                continue;
            }
            options.push(LanguageOption {
                language: target.clone(),
                original: false,
            });
        }
    }
    options
}

/// Language a listener tunes into: `explicit` when the room offers it, otherwise the
/// first listed option.
pub fn default_listener_language(details: &RoomDetails, explicit: Option<&str>) -> Option<String> {
    let options = language_options(details);
    let by_param = explicit
        .filter(|code| !code.is_empty())
        .and_then(|code| options.iter().find(|o| o.language.code == code));
    by_param
        .or(options.first())
        .map(|o| o.language.code.clone())
}
