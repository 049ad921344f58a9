use regex::Regex;
use scraper::ElementRef;

pub(crate) fn class_matches(el: &ElementRef, pattern: &Regex) -> bool {
    el.value().attr("class").map_or(false, |v| pattern.is_match(v))
}

pub(crate) fn id_matches(el: &ElementRef, pattern: &Regex) -> bool {
    el.value().attr("id").map_or(false, |v| pattern.is_match(v))
}

/// Element text with whitespace runs collapsed to single spaces.
pub(crate) fn normalized_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
