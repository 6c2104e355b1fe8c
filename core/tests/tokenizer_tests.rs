use tfidf_core::tokenizer::{tokenize, word_count};

#[test]
fn it_lowercases_and_strips_punctuation() {
    let words = tokenize("Running, runner's RUN! The café's menu.");
    assert_eq!(words, vec!["running", "runners", "run", "the", "cafés", "menu"]);
}

#[test]
fn it_keeps_stopwords_and_digits() {
    let words = tokenize("The 3 quick foxes and the lazy dog");
    assert!(words.contains(&"the".to_string()));
    assert!(words.contains(&"and".to_string()));
    assert!(words.contains(&"3".to_string()));
}

#[test]
fn it_splits_on_any_whitespace_run() {
    assert_eq!(tokenize("  alpha\t\tbeta\n\ngamma  "), vec!["alpha", "beta", "gamma"]);
    assert!(tokenize("").is_empty());
    assert!(tokenize(" \n\t ").is_empty());
}

#[test]
fn symbols_between_letters_join_the_word() {
    // deleted, not replaced with a space
    assert_eq!(tokenize("e-mail re:view"), vec!["email", "review"]);
}

#[test]
fn word_count_is_unnormalized() {
    let text = "Hello, world! -- ok";
    assert_eq!(word_count(text), 4);
    assert_eq!(tokenize(text).len(), 3);
}
