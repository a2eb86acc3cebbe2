use bitmark_babel::breakscape::{breakscape, unbreakscape, BreakscapeOptions};
use bitmark_babel::{TextFormat, TextLocation};
use proptest::prelude::*;

fn any_options() -> impl Strategy<Value = BreakscapeOptions> {
    (
        prop::sample::select(TextFormat::ALL.to_vec()),
        prop::sample::select(TextLocation::ALL.to_vec()),
    )
        .prop_map(|(format, location)| BreakscapeOptions::new(format, location))
}

fn markup_heavy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "*", "**", "`", "_", "!", "=", "^", "^^", "[", "]", ".", "@", "#", "|", "•", "\n",
            "a", "text ", "[.", "[^.", "==",
        ]),
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn unbreakscape_undoes_breakscape(text in markup_heavy_text(), options in any_options()) {
        let escaped = breakscape(&text, options);
        prop_assert_eq!(unbreakscape(escaped.as_str(), options), text);
    }

    #[test]
    fn arbitrary_text_round_trips(text in ".*", options in any_options()) {
        let escaped = breakscape(&text, options);
        prop_assert_eq!(unbreakscape(escaped.as_str(), options), text);
    }
}

#[test]
fn breakscaped_text_has_no_doubled_half_marks() {
    let options = BreakscapeOptions::new(TextFormat::BitmarkPlusPlus, TextLocation::Body);
    let escaped = breakscape("**bold** and __it__ ==x==", options);
    for pair in ["**", "__", "=="] {
        assert!(!escaped.as_str().contains(pair), "{escaped}");
    }
}
