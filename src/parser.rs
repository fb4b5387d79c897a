//! Daily report parser
//!
//! Expected input, one answer per line:
//!
//! ```text
//! да          <- woke up at 6:30
//! 3           <- pull-up sets
//! да          <- homework done
//! нет         <- asleep by 9 PM
//! нет         <- extra exercises
//! Сложновато  <- notes
//! ```
//!
//! Only the sixth line becomes the notes; anything after it is ignored.

use crate::error::ReportError;
use crate::model::ReportDraft;

/// Number of answers a report must contain
pub const REQUIRED_ANSWERS: usize = 6;

const AFFIRMATIVE: [&str; 3] = ["да", "yes", "y"];

/// Parse a free-text report into a draft.
pub fn parse_report(text: &str) -> Result<ReportDraft, ReportError> {
    let lines: Vec<&str> = text.trim().lines().collect();

    if lines.len() < REQUIRED_ANSWERS {
        return Err(ReportError::InsufficientAnswers { got: lines.len() });
    }

    Ok(ReportDraft {
        woke_up_630: parse_yes(lines[0]),
        turnik_sets: parse_count(lines[1])?,
        homework_done: parse_yes(lines[2]),
        sleep_9pm: parse_yes(lines[3]),
        extra_exercises: parse_yes(lines[4]),
        notes: lines[5].to_string(),
    })
}

/// Anything that is not a recognised "yes" counts as "no".
pub fn parse_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Digits-only answers are parsed; everything else (signs, words, blanks) is 0.
pub fn parse_count(answer: &str) -> Result<u32, ReportError> {
    let answer = answer.trim();
    if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
        return Ok(0);
    }

    answer
        .parse()
        .map_err(|e| ReportError::MalformedAnswers(format!("set count {:?}: {}", answer, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_report() {
        let draft = parse_report("да\n3\nда\nнет\nнет\nСложновато").unwrap();

        assert_eq!(
            draft,
            ReportDraft {
                woke_up_630: true,
                turnik_sets: 3,
                homework_done: true,
                sleep_9pm: false,
                extra_exercises: false,
                notes: "Сложновато".to_string(),
            }
        );
    }

    #[test]
    fn test_too_few_lines() {
        assert_eq!(
            parse_report("да\n3\nда"),
            Err(ReportError::InsufficientAnswers { got: 3 })
        );
        assert_eq!(
            parse_report(""),
            Err(ReportError::InsufficientAnswers { got: 0 })
        );
    }

    #[test]
    fn test_surrounding_whitespace_does_not_count_as_lines() {
        let err = parse_report("\n\nда\n3\nда\nнет\nнет\n\n").unwrap_err();
        assert_eq!(err, ReportError::InsufficientAnswers { got: 5 });
    }

    #[test]
    fn test_boolean_normalization() {
        for yes in ["да", "ДА", "Да", "yes", "YES", "y", " да "] {
            assert!(parse_yes(yes), "{:?} should be yes", yes);
        }
        for no in ["нет", "", "maybe", "no", "n", "дa"] {
            assert!(!parse_yes(no), "{:?} should be no", no);
        }
    }

    #[test]
    fn test_count_parsing() {
        assert_eq!(parse_count("3"), Ok(3));
        assert_eq!(parse_count(" 12 "), Ok(12));
        assert_eq!(parse_count("three"), Ok(0));
        assert_eq!(parse_count("-1"), Ok(0));
        assert_eq!(parse_count("+2"), Ok(0));
        assert_eq!(parse_count("2.5"), Ok(0));
        assert_eq!(parse_count(""), Ok(0));
        assert_eq!(parse_count("٣"), Ok(0));
    }

    #[test]
    fn test_count_overflow_is_malformed() {
        let err = parse_report("да\n99999999999999999999\nда\nнет\nнет\nнет").unwrap_err();
        assert!(matches!(err, ReportError::MalformedAnswers(_)));
    }

    #[test]
    fn test_only_sixth_line_is_notes() {
        let draft = parse_report("y\n0\nn\ny\ny\nfirst note\nsecond note").unwrap();
        assert_eq!(draft.notes, "first note");
        assert_eq!(draft.turnik_sets, 0);
        assert!(draft.sleep_9pm);
        assert!(draft.extra_exercises);
    }

    #[test]
    fn test_crlf_input() {
        let draft = parse_report("да\r\n2\r\nнет\r\nда\r\nнет\r\nустал\r\n").unwrap();
        assert!(draft.woke_up_630);
        assert_eq!(draft.turnik_sets, 2);
        assert_eq!(draft.notes, "устал");
    }
}
