//! Parser for ReAct-formatted model output.
//!
//! A completion is either a tool call:
//!
//! ```text
//! Thought: I should look at the tables.
//! Action: sql_db_list_tables
//! Action Input:
//! ```
//!
//! or a final answer (`Final Answer: ...`). Anything else is a parse error
//! whose observation is fed back to the model.

use thiserror::Error;

const ACTION_LABEL: &str = "Action:";
const ACTION_INPUT_LABEL: &str = "Action Input:";
const FINAL_ANSWER_LABEL: &str = "Final Answer:";
const OBSERVATION_LABEL: &str = "\nObservation";

/// One step decided by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// Call a tool.
    Action {
        /// Tool name.
        tool: String,
        /// Tool input.
        input: String,
        /// The raw completion, kept for the scratchpad.
        log: String,
    },
    /// Stop with an answer.
    Finish {
        /// Text after `Final Answer:`.
        answer: String,
        /// Full model output.
        log: String,
    },
}

/// Model output that fits neither form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No `Action:` and no final answer.
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,
    /// `Action:` without `Action Input:`.
    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,
    /// Both a final answer and an action.
    #[error("Parsing LLM output produced both a final answer and a parse-able action: {0}")]
    FinalAnswerAndAction(String),
}

impl ParseError {
    /// Observation shown to the model on its next turn.
    pub fn observation(&self) -> String {
        match self {
            Self::MissingAction | Self::MissingActionInput => self.to_string(),
            Self::FinalAnswerAndAction(_) => "Invalid or incomplete response".to_string(),
        }
    }
}

/// Parse one model completion.
pub fn parse(output: &str) -> Result<AgentStep, ParseError> {
    let text = strip_code_fence(output);
    let has_final = text.contains(FINAL_ANSWER_LABEL);

    if let Some((tool, input)) = parse_action(text) {
        if has_final {
            return Err(ParseError::FinalAnswerAndAction(output.to_string()));
        }
        return Ok(AgentStep::Action {
            tool,
            input,
            log: output.to_string(),
        });
    }

    if let Some(idx) = text.find(FINAL_ANSWER_LABEL) {
        let answer = text[idx + FINAL_ANSWER_LABEL.len()..].trim().to_string();
        return Ok(AgentStep::Finish {
            answer,
            log: output.to_string(),
        });
    }

    if text.contains(ACTION_LABEL) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::MissingAction)
    }
}

fn parse_action(text: &str) -> Option<(String, String)> {
    let action_start = text.find(ACTION_LABEL)? + ACTION_LABEL.len();
    let rest = &text[action_start..];
    let input_idx = rest.find(ACTION_INPUT_LABEL)?;

    let tool = rest[..input_idx].trim().to_string();
    let mut input = &rest[input_idx + ACTION_INPUT_LABEL.len()..];
    if let Some(end) = input.find(OBSERVATION_LABEL) {
        input = &input[..end];
    }
    let input = input.trim().trim_matches('"').trim().to_string();

    Some((tool, input))
}

/// Drop a surrounding markdown code fence, if the whole completion is one.
fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return output;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return output;
    };
    // Skip the language tag line.
    match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let out = "Thought: I should list tables.\nAction: sql_db_list_tables\nAction Input: ";
        match parse(out).unwrap() {
            AgentStep::Action { tool, input, log } => {
                assert_eq!(tool, "sql_db_list_tables");
                assert_eq!(input, "");
                assert_eq!(log, out);
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_action_strips_quotes_and_trailing_observation() {
        let out = "Action: sql_db_schema\nAction Input: \"employees, sales\"\nObservation: made up";
        let step = parse(out).unwrap();
        assert!(matches!(
            step,
            AgentStep::Action { ref tool, ref input, .. }
                if tool == "sql_db_schema" && input == "employees, sales"
        ));
    }

    #[test]
    fn test_parse_multiline_action_input() {
        let out = "Thought: query it\nAction: sql_db_query\nAction Input: SELECT name\nFROM employees\nLIMIT 10";
        let AgentStep::Action { input, .. } = parse(out).unwrap() else {
            panic!("expected action");
        };
        assert_eq!(input, "SELECT name\nFROM employees\nLIMIT 10");
    }

    #[test]
    fn test_parse_final_answer() {
        let out = "Thought: I now know the final answer\nFinal Answer: There are 3 employees.";
        assert_eq!(
            parse(out).unwrap(),
            AgentStep::Finish {
                answer: "There are 3 employees.".to_string(),
                log: out.to_string(),
            }
        );
    }

    #[test]
    fn test_final_answer_and_action_is_error() {
        let out = "Action: sql_db_query\nAction Input: SELECT 1\nFinal Answer: 1";
        let err = parse(out).unwrap_err();
        assert!(matches!(err, ParseError::FinalAnswerAndAction(_)));
        assert_eq!(err.observation(), "Invalid or incomplete response");
    }

    #[test]
    fn test_missing_action() {
        let err = parse("I think the answer is 42.").unwrap_err();
        assert_eq!(err, ParseError::MissingAction);
        assert_eq!(
            err.observation(),
            "Invalid Format: Missing 'Action:' after 'Thought:'"
        );
    }

    #[test]
    fn test_missing_action_input() {
        let err = parse("Thought: hmm\nAction: sql_db_query").unwrap_err();
        assert_eq!(err, ParseError::MissingActionInput);
    }

    #[test]
    fn test_code_fenced_output() {
        let out = "```text\nThought: done\nFinal Answer: yes\n```";
        let AgentStep::Finish { answer, .. } = parse(out).unwrap() else {
            panic!("expected finish");
        };
        assert_eq!(answer, "yes");
    }
}
