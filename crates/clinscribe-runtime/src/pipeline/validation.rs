//! Validation step: raw model text → typed clinical output.

use std::panic::{catch_unwind, AssertUnwindSafe};

use clinscribe_core::{
    decode_clinical_output, ClinicalOutput, DecodeError, PipelineState, StageError, StateUpdate,
};

use super::panic_message;

/// Run the validation step for one item.
///
/// Always sets both `parsed_output` and `errors`. The error list is fresh:
/// earlier messages are not carried over, so callers that need the
/// generation errors must keep them (see [`super::PipelineRun`]).
/// A missing raw response is decoded as empty text, which fails to parse.
pub fn validate(state: &PipelineState) -> StateUpdate {
    let name = state.item().name();
    let raw = state.raw_response().unwrap_or("");

    match guarded(|| decode_clinical_output(raw)) {
        Ok(output) => {
            tracing::debug!(file = %name, "Output validated");
            StateUpdate::new()
                .parsed_output(Some(output))
                .errors(Vec::new())
        }
        Err(errors) => {
            tracing::warn!(file = %name, errors = errors.len(), "Output rejected");
            StateUpdate::new()
                .parsed_output(None)
                .errors(errors.iter().map(ToString::to_string).collect())
        }
    }
}

/// Run a decode, turning decode failures and panics into stage errors.
fn guarded(
    decode: impl FnOnce() -> Result<ClinicalOutput, DecodeError>,
) -> Result<ClinicalOutput, Vec<StageError>> {
    match catch_unwind(AssertUnwindSafe(decode)) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(StageError::from_decode(e)),
        Err(payload) => Err(vec![StageError::Unknown(panic_message(payload.as_ref()))]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::VALID_OUTPUT;
    use clinscribe_core::{ErrorCategory, InputItem, RiskLevel};

    fn state_with(raw: Option<&str>) -> PipelineState {
        let item = InputItem::new("case1.txt", "patient reports anxiety").unwrap();
        PipelineState::new(item, "v2")
            .apply(StateUpdate::new().raw_response(raw.map(str::to_string)))
    }

    fn run(state: PipelineState) -> PipelineState {
        let update = validate(&state);
        state.apply(update)
    }

    #[test]
    fn test_valid_output_is_parsed() {
        let next = run(state_with(Some(VALID_OUTPUT)));
        assert!(next.is_success());
        let output = next.parsed_output().unwrap();
        assert_eq!(output.risk_assessment().level(), RiskLevel::Medium);
        assert_eq!(output.themes().len(), 3);
    }

    #[test]
    fn test_missing_raw_is_a_parse_error() {
        let next = run(state_with(None));
        assert!(next.parsed_output().is_none());
        assert_eq!(next.errors().len(), 1);
        assert_eq!(ErrorCategory::of(&next.errors()[0]), Some(ErrorCategory::Syntax));
    }

    #[test]
    fn test_non_json_is_a_parse_error() {
        let next = run(state_with(Some("Sure! Here is the analysis: ...")));
        assert!(next.errors()[0].starts_with("JSON Parse Error: "));
    }

    #[test]
    fn test_constraint_violation_names_the_field() {
        let raw = VALID_OUTPUT.replace(
            r#"["ansiedade", "sono", "preocupação"]"#,
            r#"["ansiedade", "sono"]"#,
        );
        let next = run(state_with(Some(&raw)));

        assert!(next.parsed_output().is_none());
        assert_eq!(next.errors().len(), 1);
        assert!(next.errors()[0].starts_with("Validation Error: "));
        assert!(next.errors()[0].contains("themes"), "{}", next.errors()[0]);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let raw = VALID_OUTPUT
            .replace(r#""médio""#, r#""critical""#)
            .replace(
                r#"["ansiedade generalizada", "insônia inicial"]"#,
                r#"["ansiedade generalizada"]"#,
            );
        let next = run(state_with(Some(&raw)));

        assert_eq!(next.errors().len(), 2, "{:?}", next.errors());
        assert!(next.errors().iter().any(|e| e.contains("hypotheses")));
        assert!(next
            .errors()
            .iter()
            .any(|e| e.contains("risk_assessment.level")));
    }

    #[test]
    fn test_panicking_decode_is_an_unknown_error() {
        let errors = guarded(|| panic!("decoder invariant broken")).unwrap_err();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages, ["Unknown Error: decoder invariant broken"]);
        assert_eq!(errors[0].category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_guarded_passes_decoder_results_through() {
        assert!(guarded(|| decode_clinical_output(VALID_OUTPUT)).is_ok());

        let errors = guarded(|| decode_clinical_output("{")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_prior_errors_are_replaced() {
        let state = state_with(None).apply(
            StateUpdate::new().errors(vec!["Generation Error: API error: 500 - boom".to_string()]),
        );
        let next = run(state);

        assert_eq!(next.errors().len(), 1);
        assert!(next.errors()[0].starts_with("JSON Parse Error: "));
    }

    #[test]
    fn test_success_clears_prior_errors() {
        let state = state_with(Some(VALID_OUTPUT))
            .apply(StateUpdate::new().errors(vec!["stale".to_string()]));
        assert!(run(state).is_success());
    }
}
