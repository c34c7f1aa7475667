//! Splits a token stream across the action tree.
//!
//! Each node owns the tokens up to the first bare token that is not an
//! option value; that token must name one of the node's child actions, and
//! everything after it is handed to that child.

use crate::error::{ActionError, Error};
use crate::node::ParserNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// The previous option, if any, is complete.
    BetweenOptions,
    /// The previous option may still take the next token as its value.
    InsideOptionValue,
}

pub struct ActionScanner<'n, 'a> {
    node: &'n ParserNode<'a>,
}

impl<'n, 'a> ActionScanner<'n, 'a> {
    pub fn new(node: &'n ParserNode<'a>) -> Self {
        Self { node }
    }

    /// Position of the child action token in `args`, if any.
    pub fn next_action(&self, args: &[String]) -> Result<Option<usize>, ActionError> {
        let flags = self.node.flags();
        let mut state = ScanState::BetweenOptions;
        for (pos, token) in args.iter().enumerate() {
            let dashed = flags.has_prefix(token);
            let next = match (state, dashed) {
                (ScanState::BetweenOptions, false) => {
                    if self.node.child(token).is_some() {
                        return Ok(Some(pos));
                    }
                    return Err(ActionError {
                        token: token.clone(),
                    });
                }
                (ScanState::BetweenOptions, true) if flags.is_self_contained(token) => {
                    ScanState::BetweenOptions
                }
                (ScanState::BetweenOptions, true) => ScanState::InsideOptionValue,
                (ScanState::InsideOptionValue, false) => ScanState::BetweenOptions,
                (ScanState::InsideOptionValue, true) => ScanState::InsideOptionValue,
            };
            tracing::trace!(node = self.node.name(), token = %token, from = ?state, to = ?next, "scan");
            state = next;
        }
        Ok(None)
    }
}

/// Parse `args` against `node` and its descendants.
///
/// Returns the field names of the invoked actions, root first. The child
/// action is resolved before this node's options are parsed, so an unknown
/// action leaves every field untouched.
pub fn dispatch(node: &mut ParserNode<'_>, args: &[String]) -> Result<Vec<String>, Error> {
    dispatch_within(node, args, &mut Vec::new())
}

/// Like [`dispatch`], but records in `entered` the action token of every
/// node descended into. On error the last entry names the failing scope.
pub(crate) fn dispatch_within(
    node: &mut ParserNode<'_>,
    args: &[String],
    entered: &mut Vec<String>,
) -> Result<Vec<String>, Error> {
    let split = ActionScanner::new(node).next_action(args)?;
    let end = split.unwrap_or(args.len());
    node.flags_mut().parse(&args[..end])?;

    let Some(pos) = split else {
        return Ok(Vec::new());
    };
    let key = args[pos].as_str();
    let field = node.field_name(key).unwrap_or(key).to_string();
    let child = node.child_mut(key).ok_or_else(|| ActionError {
        token: key.to_string(),
    })?;
    tracing::debug!(action = key, field = %field, "dispatching");
    entered.push(key.to_string());
    let mut chain = vec![field];
    chain.extend(dispatch_within(child, &args[pos + 1..], entered)?);
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::BindingKind;
    use crate::error::{ConversionError, FlagError};
    use crate::flagset::FlagValue;
    use pretty_assertions::assert_eq;

    struct Text<'a>(&'a mut String);

    impl FlagValue for Text<'_> {
        fn render(&self) -> String {
            self.0.clone()
        }

        fn set(&mut self, input: &str) -> Result<(), ConversionError> {
            *self.0 = input.to_string();
            Ok(())
        }
    }

    struct Switch<'a>(&'a mut bool);

    impl FlagValue for Switch<'_> {
        fn render(&self) -> String {
            self.0.to_string()
        }

        fn set(&mut self, input: &str) -> Result<(), ConversionError> {
            *self.0 = input == "true";
            Ok(())
        }

        fn is_bool_flag(&self) -> bool {
            true
        }
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn stops_at_first_bare_token_outside_a_value() {
        let mut node = ParserNode::new("root", "", "-");
        node.add_action("act".into(), "Act", String::new()).unwrap();
        let scanner = ActionScanner::new(&node);
        assert_eq!(
            scanner.next_action(&args(&["-x", "1", "act", "-y"])),
            Ok(Some(2))
        );
        assert_eq!(scanner.next_action(&args(&["-x", "-y", "act"])), Ok(None));
        assert_eq!(scanner.next_action(&args(&[])), Ok(None));
        assert_eq!(
            scanner.next_action(&args(&["-x", "1", "other"])),
            Err(ActionError {
                token: "other".into()
            })
        );
    }

    #[test]
    fn self_contained_options_do_not_swallow_the_action() {
        let mut verbose = false;
        let mut node = ParserNode::new("root", "", "-");
        node.flags_mut()
            .define("verbose", "", BindingKind::Scalar, Box::new(Switch(&mut verbose)))
            .unwrap();
        node.add_action("act".into(), "Act", String::new()).unwrap();
        let scanner = ActionScanner::new(&node);
        assert_eq!(scanner.next_action(&args(&["-verbose", "act"])), Ok(Some(1)));
        assert_eq!(scanner.next_action(&args(&["-x=1", "act"])), Ok(Some(1)));
    }

    #[test]
    fn dispatch_walks_the_chain() {
        let mut outer = String::new();
        let mut inner = String::new();
        let chain = {
            let mut node = ParserNode::new("root", "", "-");
            node.flags_mut()
                .define("x", "", BindingKind::Scalar, Box::new(Text(&mut outer)))
                .unwrap();
            let child = node.add_action("act".into(), "Act", String::new()).unwrap();
            child
                .flags_mut()
                .define("y", "", BindingKind::Scalar, Box::new(Text(&mut inner)))
                .unwrap();
            dispatch(&mut node, &args(&["-x", "1", "act", "-y", "2"])).unwrap()
        };
        assert_eq!(chain, vec!["Act"]);
        assert_eq!(outer, "1");
        assert_eq!(inner, "2");
    }

    #[test]
    fn unknown_action_parses_nothing() {
        let mut outer = String::from("before");
        let err = {
            let mut node = ParserNode::new("root", "", "-");
            node.flags_mut()
                .define("x", "", BindingKind::Scalar, Box::new(Text(&mut outer)))
                .unwrap();
            dispatch(&mut node, &args(&["-x", "1", "badact"])).unwrap_err()
        };
        assert_eq!(
            err,
            Error::Action(ActionError {
                token: "badact".into()
            })
        );
        assert_eq!(outer, "before");
    }

    #[test]
    fn option_errors_surface_from_the_owning_node() {
        let mut node = ParserNode::new("root", "", "-");
        node.add_action("act".into(), "Act", String::new()).unwrap();
        let err = dispatch(&mut node, &args(&["act", "-nope", "1"])).unwrap_err();
        assert_eq!(err, Error::Flag(FlagError::Unknown("-nope".into())));
    }

    #[test]
    fn terminator_does_not_take_the_action_as_a_value() {
        let mut outer = String::new();
        let mut inner = String::new();
        let chain = {
            let mut node = ParserNode::new("root", "", "-");
            node.flags_mut()
                .define("x", "", BindingKind::Scalar, Box::new(Text(&mut outer)))
                .unwrap();
            let child = node.add_action("act".into(), "Act", String::new()).unwrap();
            child
                .flags_mut()
                .define("y", "", BindingKind::Scalar, Box::new(Text(&mut inner)))
                .unwrap();
            assert_eq!(
                ActionScanner::new(&node).next_action(&args(&["-x", "1", "--", "act"])),
                Ok(Some(3))
            );
            dispatch(&mut node, &args(&["-x", "1", "--", "act", "-y", "2"])).unwrap()
        };
        assert_eq!(chain, vec!["Act"]);
        assert_eq!(outer, "1");
        assert_eq!(inner, "2");
    }

    #[test]
    fn failing_scope_is_recorded() {
        let mut node = ParserNode::new("root", "", "-");
        let child = node.add_action("act".into(), "Act", String::new()).unwrap();
        child.add_action("deep".into(), "Deep", String::new()).unwrap();

        let mut entered = Vec::new();
        let err = dispatch_within(&mut node, &args(&["act", "deep", "-h"]), &mut entered)
            .unwrap_err();
        assert!(err.is_help());
        assert_eq!(entered, vec!["act", "deep"]);

        let mut entered = Vec::new();
        let err = dispatch_within(&mut node, &args(&["-h=1", "act"]), &mut entered).unwrap_err();
        assert!(err.is_help());
        assert!(entered.is_empty());
    }
}
