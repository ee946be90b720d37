//! Property tests for passage splitting.

use proptest::prelude::*;
use senti_core::parser::{parse_content, split_passages, ParseError};

/// A line with no leading/trailing whitespace and at least one visible char.
fn line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]([a-zA-Z0-9 ,.!?']{0,24}[a-zA-Z0-9.!?])?"
}

/// One passage: a few non-blank lines joined by single linefeeds.
fn passage() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 1..4).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn blob_without_blank_line_is_one_passage(
        lead in "[ \t]{0,3}",
        body in passage(),
        trail in "[ \t\n]{0,3}",
    ) {
        prop_assume!(trail.matches('\n').count() <= 1);
        let blob = format!("{lead}{body}{trail}");
        let passages = split_passages(&blob);
        prop_assert_eq!(passages, vec![blob.trim().to_string()]);
    }

    #[test]
    fn join_with_blank_line_round_trips(items in prop::collection::vec(passage(), 1..8)) {
        let blob = items.join("\n\n");
        let passages = parse_content("input.txt", blob.as_bytes()).unwrap();
        prop_assert_eq!(passages, items);
    }

    #[test]
    fn crlf_and_lf_agree(items in prop::collection::vec(passage(), 1..6)) {
        let lf = items.join("\n\n");
        let crlf = lf.replace('\n', "\r\n");
        prop_assert_eq!(split_passages(&lf), split_passages(&crlf));
    }

    #[test]
    fn whitespace_only_input_fails(blob in "[ \t\r\n]{0,40}") {
        let err = parse_content("blank.txt", blob.as_bytes()).unwrap_err();
        prop_assert!(matches!(err, ParseError::NoValidText));
    }

    #[test]
    fn passages_are_trimmed_and_non_empty(blob in "[a-z \t\r\n]{0,80}") {
        for passage in split_passages(&blob) {
            prop_assert!(!passage.is_empty());
            prop_assert_eq!(passage.trim(), passage.as_str());
        }
    }
}

#[test]
fn reviews_file_splits_into_two_passages() {
    let passages = parse_content(
        "reviews.txt",
        b"Great product!\n\nTerrible service.\n\n",
    )
    .unwrap();
    assert_eq!(passages, vec!["Great product!", "Terrible service."]);
}
