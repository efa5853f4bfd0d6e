use super::*;

#[test]
fn decodes_numeric_and_named_entities() {
    assert_eq!(decode_html_entities("Tom &amp; Jerry"), "Tom & Jerry");
    assert_eq!(decode_html_entities("it&#39;s"), "it's");
    assert_eq!(decode_html_entities("it&#x27;s"), "it's");
    assert_eq!(decode_html_entities("&lt;b&gt;"), "<b>");
    assert_eq!(decode_html_entities("&quot;Partners&quot;"), "\"Partners\"");
}

#[test]
fn unknown_entities_are_left_alone() {
    assert_eq!(decode_html_entities("a &bogus; b"), "a &bogus; b");
    assert_eq!(decode_html_entities("AT&T"), "AT&T");
    assert_eq!(decode_html_entities("&#xFFFFFF;"), "&#xFFFFFF;");
}

#[test]
fn normalize_strips_diacritics_and_punctuation() {
    assert_eq!(normalize_text("Café  Noir, L'Été!"), "cafe noir l ete");
    assert_eq!(normalize_text("  Extra   Gum: 'Partners'  "), "extra gum partners");
    assert_eq!(normalize_text(""), "");
    assert_eq!(normalize_text("!!!"), "");
}

#[test]
fn tokenize_drops_short_tokens_and_stopwords() {
    let tokens = tokenize("The Official Extra Gum Commercial - Partners (2015) HD");
    let expected: Vec<&str> = vec!["2015", "extra", "gum", "partners"];
    assert_eq!(tokens.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn tokenize_empty_inputs() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("a an of to").is_empty());
    assert!(tokenize("official commercial campaign").is_empty());
}

#[test]
fn tokenize_is_case_and_accent_insensitive() {
    assert_eq!(tokenize("Crème BRÛLÉE"), tokenize("creme brulee"));
}

#[test]
fn phrase_matching_respects_word_boundaries() {
    assert!(contains_phrase("extra gum partners 2015", "extra gum"));
    assert!(contains_phrase("extra gum partners 2015", "2015"));
    assert!(contains_phrase("gum", "gum"));
    assert!(!contains_phrase("extra gummy bears", "gum"));
    assert!(!contains_phrase("extra gum", ""));
    assert!(!contains_phrase("", "gum"));
}
